//! Generator for the signed comparison circuit.
//!
//! On two's-complement inputs `a` (alice) and `b` (bob) the circuit
//! outputs two bits `(gt, ne)`: `gt = 1` iff `b > a` and `ne = 1` iff
//! `a != b`. Input wires are most significant bit first, so wire 0 and
//! wire `n_bits` carry the sign bits.

use crate::circuit::Circuit;
use crate::gate::{Gate, GateOp, WireId};

/// Default comparator width.
pub const DEFAULT_WIDTH: usize = 32;

struct Builder {
    next: WireId,
    gates: Vec<Gate>,
}

impl Builder {
    fn gate(&mut self, op: GateOp, inputs: Vec<WireId>) -> WireId {
        let id = self.next;
        self.next += 1;
        self.gates.push(Gate { id, op, inputs });
        id
    }
}

/// Emit the `n_bits`-wide signed greater/not-equal circuit.
///
/// Wire ids are dense and assigned in emission order, so the gate list
/// is topologically ordered by construction.
pub fn comparator(n_bits: usize) -> Circuit {
    assert!((2..=64).contains(&n_bits), "unsupported comparator width");

    let alice: Vec<WireId> = (0..n_bits).collect();
    let bob: Vec<WireId> = (n_bits..2 * n_bits).collect();
    let mut builder = Builder { next: 2 * n_bits, gates: Vec::new() };

    // Per-bit building blocks: equality, and "bob's bit wins" (b_i AND
    // NOT a_i, the unsigned strictly-greater test at one position).
    let mut eq = Vec::with_capacity(n_bits);
    let mut bob_wins_bit = Vec::with_capacity(n_bits);
    for i in 0..n_bits {
        eq.push(builder.gate(GateOp::Xnor, vec![alice[i], bob[i]]));
        let not_a = builder.gate(GateOp::Not, vec![alice[i]]);
        bob_wins_bit.push(builder.gate(GateOp::And, vec![not_a, bob[i]]));
    }

    // Unsigned ladder, most significant bit down: b > a iff at some
    // position bob's bit wins while all higher bits are equal.
    let mut unsigned_gt = bob_wins_bit[0];
    let mut eq_prefix = eq[0];
    for i in 1..n_bits {
        let term = builder.gate(GateOp::And, vec![eq_prefix, bob_wins_bit[i]]);
        unsigned_gt = builder.gate(GateOp::Or, vec![unsigned_gt, term]);
        if i + 1 < n_bits {
            eq_prefix = builder.gate(GateOp::And, vec![eq_prefix, eq[i]]);
        }
    }

    // Sign fix: when the signs differ, alice's sign bit alone decides
    // (alice negative means bob is greater). When they agree, the
    // unsigned ladder is already correct for two's complement.
    let sign_diff = builder.gate(GateOp::Xor, vec![alice[0], bob[0]]);
    let diff_sign_term = builder.gate(GateOp::And, vec![alice[0], sign_diff]);
    let same_sign_term = builder.gate(GateOp::And, vec![eq[0], unsigned_gt]);
    let gt = builder.gate(GateOp::Or, vec![diff_sign_term, same_sign_term]);

    // ne: the values differ somewhere. eq_prefix covers every bit above
    // the least significant one at this point.
    let ne = builder.gate(GateOp::Nand, vec![eq_prefix, eq[n_bits - 1]]);

    Circuit {
        name: format!("cmp-{n_bits}bit-signed"),
        n_bits,
        alice_inputs: alice,
        bob_inputs: bob,
        outputs: vec![gt, ne],
        gates: builder.gates,
    }
}
