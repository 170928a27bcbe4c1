use circuit::{CircuitError, WireId};
use crypto_core::CryptoError;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("no label pair generated for wire {0}")]
    UninitializedLabel(WireId),

    #[error("{wires} input wires but {bits} input bits")]
    InputLenMismatch { wires: usize, bits: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("no label held for wire {0}")]
    UninitializedLabel(WireId),

    #[error("garbled gate {actual} does not match circuit gate {expected}")]
    GateMismatch { expected: WireId, actual: WireId },

    #[error("gate {gate} has {actual} rows, expected {expected}")]
    RowCount {
        gate: WireId,
        expected: usize,
        actual: usize,
    },

    #[error("row decryption failed at gate {gate}")]
    Decryption { gate: WireId },

    #[error("row at gate {gate} did not decrypt to a label")]
    BadLabel { gate: WireId },

    #[error("decode info for wire {expected} does not match output wire {actual}")]
    DecodeMismatch { expected: WireId, actual: WireId },
}
