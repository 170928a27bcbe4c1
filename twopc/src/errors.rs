//! Session-level errors.
//!
//! Nothing here is retried: every error aborts the single-shot session.

use std::io::{self, ErrorKind};

use circuit::CircuitError;

use crate::garble::{EvaluatorError, GeneratorError};
use crate::ot::OtError;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty input set")]
    EmptyInput,

    #[error("input {value} is outside the {n_bits}-bit signed range")]
    InputOutOfRange { value: i64, n_bits: usize },

    #[error("malformed circuit: {0}")]
    Malformed(#[from] CircuitError),

    #[error("integrity failure: {0}")]
    Crypto(String),

    #[error("oblivious transfer received a group element outside the subgroup")]
    OtGroup,

    #[error("session timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(#[source] io::Error),

    #[error("unexpected {got} message during {state}")]
    UnexpectedMessage {
        state: &'static str,
        got: &'static str,
    },

    #[error("session parameters disagree: ours {ours}, theirs {theirs}")]
    ParameterMismatch { ours: String, theirs: String },

    #[error("invalid verdict bits gt={gt} ne={ne}")]
    InvalidVerdict { gt: bool, ne: bool },
}

impl ProtocolError {
    /// Classify an I/O failure: timer expiry is `Timeout`, everything
    /// else is `Transport`.
    pub fn from_io(e: io::Error) -> Self {
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => ProtocolError::Timeout,
            _ => ProtocolError::Transport(e),
        }
    }

    /// The process exit code the front-end reports for this error:
    /// 2 input error, 3 protocol abort, 4 transport error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProtocolError::EmptyInput | ProtocolError::InputOutOfRange { .. } => 2,
            ProtocolError::Transport(_) => 4,
            _ => 3,
        }
    }
}

impl From<GeneratorError> for ProtocolError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::Circuit(c) => ProtocolError::Malformed(c),
            other => ProtocolError::Crypto(other.to_string()),
        }
    }
}

impl From<EvaluatorError> for ProtocolError {
    fn from(e: EvaluatorError) -> Self {
        ProtocolError::Crypto(e.to_string())
    }
}

impl From<OtError> for ProtocolError {
    fn from(e: OtError) -> Self {
        match e {
            OtError::Group => ProtocolError::OtGroup,
            OtError::Crypto(c) => ProtocolError::Crypto(c.to_string()),
            OtError::UnexpectedMessage(got) => ProtocolError::UnexpectedMessage {
                state: "oblivious transfer",
                got,
            },
            OtError::Io(e) => ProtocolError::from_io(e),
        }
    }
}
