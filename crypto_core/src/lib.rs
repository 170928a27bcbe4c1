pub mod block;
pub mod channel;
pub mod cipher;
pub mod utils;

pub use crate::block::Block;
pub use crate::cipher::{derive_key, derive_key_from_bytes, open, seal, CryptoError, RowKey};

pub use channel::*;
