pub mod errors;
pub mod garble;
pub mod msg;
pub mod ot;
pub mod protocol;

pub use errors::ProtocolError;
pub use garble::*;
pub use msg::Message;
pub use ot::*;
pub use protocol::{
    clear_verdict, run_as_evaluator, run_as_garbler, Role, SessionParams, SessionState, Verdict,
    DEFAULT_SCALE,
};
