//! 1-out-of-2 oblivious transfer.

pub mod dh;
pub mod errors;

pub use dh::*;
pub use errors::OtError;

use crypto_core::{Block, IOChannel};
use rand::{CryptoRng, Rng};

/// Sender side of a batch of 1-of-2 transfers, one per evaluator input
/// wire.
pub trait OtSender {
    /// Transfer one of each `(m0, m1)` pair; the chooser picks which.
    /// The sender learns nothing about the choices.
    fn send<C: IOChannel, R: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        inputs: &[(Block, Block)],
        rng: &mut R,
    ) -> Result<(), OtError>;
}

/// Chooser side of a batch of 1-of-2 transfers.
pub trait OtReceiver {
    /// Retrieve `m_c` for each choice bit `c`, learning nothing about
    /// the other message.
    fn receive<C: IOChannel, R: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        choices: &[bool],
        rng: &mut R,
    ) -> Result<Vec<Block>, OtError>;
}
