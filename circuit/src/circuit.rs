//! The immutable circuit description shared by both parties.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::CircuitError;
use crate::gate::{Gate, WireId};

/// A boolean circuit with owner-partitioned input wires.
///
/// Gates are stored in topological order: every gate input is either an
/// input wire or the output of an earlier gate. [`Circuit::validate`]
/// checks this together with the other structural invariants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,
    /// Input width per party.
    pub n_bits: usize,
    /// Alice's input wires, most significant bit first.
    pub alice_inputs: Vec<WireId>,
    /// Bob's input wires, most significant bit first.
    pub bob_inputs: Vec<WireId>,
    /// Output wires, in decode order.
    pub outputs: Vec<WireId>,
    pub gates: Vec<Gate>,
}

impl Circuit {
    /// One past the largest wire id, sizing dense per-wire tables.
    pub fn wire_count(&self) -> usize {
        self.alice_inputs
            .iter()
            .chain(self.bob_inputs.iter())
            .chain(self.gates.iter().flat_map(|g| {
                g.inputs.iter().chain(std::iter::once(&g.id))
            }))
            .chain(self.outputs.iter())
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.alice_inputs.len() != self.bob_inputs.len() {
            return Err(CircuitError::InputWidthMismatch {
                alice: self.alice_inputs.len(),
                bob: self.bob_inputs.len(),
            });
        }
        if self.n_bits != self.alice_inputs.len() {
            return Err(CircuitError::WidthMismatch {
                n_bits: self.n_bits,
                actual: self.alice_inputs.len(),
            });
        }

        let mut driven = HashSet::new();
        for &w in self.alice_inputs.iter().chain(self.bob_inputs.iter()) {
            if !driven.insert(w) {
                return Err(CircuitError::DuplicateWire(w));
            }
        }

        let mut gate_outputs = HashSet::new();
        for gate in &self.gates {
            let expected = gate.op.arity();
            if gate.inputs.len() != expected {
                return Err(CircuitError::BadArity {
                    gate: gate.id,
                    op: gate.op.name(),
                    expected,
                    actual: gate.inputs.len(),
                });
            }
            for &input in &gate.inputs {
                if !driven.contains(&input) {
                    return Err(CircuitError::UnknownWire(input));
                }
            }
            if !driven.insert(gate.id) {
                return Err(CircuitError::DuplicateWire(gate.id));
            }
            gate_outputs.insert(gate.id);
        }

        for &output in &self.outputs {
            if !gate_outputs.contains(&output) {
                return Err(CircuitError::BadOutput(output));
            }
        }
        Ok(())
    }

    /// Evaluate the circuit in plaintext.
    ///
    /// Bit slices are most significant bit first, matching the input
    /// wire ordering. Returns one bit per output wire.
    pub fn eval(&self, alice_bits: &[bool], bob_bits: &[bool]) -> Result<Vec<bool>, CircuitError> {
        if alice_bits.len() != self.alice_inputs.len() {
            return Err(CircuitError::InputLenMismatch {
                expected: self.alice_inputs.len(),
                actual: alice_bits.len(),
            });
        }
        if bob_bits.len() != self.bob_inputs.len() {
            return Err(CircuitError::InputLenMismatch {
                expected: self.bob_inputs.len(),
                actual: bob_bits.len(),
            });
        }

        let mut wires: Vec<Option<bool>> = vec![None; self.wire_count()];
        for (&w, &bit) in self.alice_inputs.iter().zip(alice_bits) {
            wires[w] = Some(bit);
        }
        for (&w, &bit) in self.bob_inputs.iter().zip(bob_bits) {
            wires[w] = Some(bit);
        }

        let mut scratch = Vec::with_capacity(2);
        for gate in &self.gates {
            scratch.clear();
            for &input in &gate.inputs {
                scratch.push(wires[input].ok_or(CircuitError::UnknownWire(input))?);
            }
            wires[gate.id] = Some(gate.op.eval(&scratch));
        }

        self.outputs
            .iter()
            .map(|&w| wires[w].ok_or(CircuitError::UnknownWire(w)))
            .collect()
    }
}
