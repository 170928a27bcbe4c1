use crate::WireId;

/// A structural defect in a circuit description.
///
/// Every variant is fatal: a circuit that fails validation is rejected
/// before any wire label is generated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CircuitError {
    #[error("wire {0} used before it is driven")]
    UnknownWire(WireId),

    #[error("wire {0} driven twice")]
    DuplicateWire(WireId),

    #[error("gate {gate}: {op} expects {expected} inputs, got {actual}")]
    BadArity {
        gate: WireId,
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("output wire {0} is not a gate output")]
    BadOutput(WireId),

    #[error("input widths differ: alice {alice}, bob {bob}")]
    InputWidthMismatch { alice: usize, bob: usize },

    #[error("circuit width {n_bits} does not match its {actual} input wires per party")]
    WidthMismatch { n_bits: usize, actual: usize },

    #[error("expected {expected} input bits, got {actual}")]
    InputLenMismatch { expected: usize, actual: usize },
}
