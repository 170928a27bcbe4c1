//! Diffie-Hellman 1-of-2 oblivious transfer over ristretto255.
//!
//! Per transfer the sender publishes `A = g^a`; the chooser replies
//! `B = g^b` for choice 0 or `B = A * g^b` for choice 1 and holds
//! `k = A^b`. The sender derives `k0 = B^a` and `k1 = (B / A)^a`;
//! exactly one equals the chooser's `k`, and the payloads are sealed
//! under keys hashed from them. Group parameters are fixed and
//! well-known; every transfer draws fresh scalars so instances for
//! different wires stay uncorrelated.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, Rng};

use crypto_core::{derive_key_from_bytes, open, seal, Block, IOChannel};

use super::errors::OtError;
use super::{OtReceiver, OtSender};
use crate::msg::{receive_message, send_message, Message};

/// Decode a compressed point, rejecting anything outside the group.
fn decode_point(bytes: &[u8; 32]) -> Result<RistrettoPoint, OtError> {
    CompressedRistretto(*bytes).decompress().ok_or(OtError::Group)
}

fn point_key(tweak: u64, point: &RistrettoPoint) -> crypto_core::RowKey {
    derive_key_from_bytes(tweak, point.compress().as_bytes())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DhOtSender;

impl OtSender for DhOtSender {
    fn send<C: IOChannel, R: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        inputs: &[(Block, Block)],
        rng: &mut R,
    ) -> Result<(), OtError> {
        for (i, (m0, m1)) in inputs.iter().enumerate() {
            let a = Scalar::random(rng);
            let big_a = RistrettoPoint::mul_base(&a);
            send_message(channel, &Message::OtCommit { point: big_a.compress().to_bytes() })?;

            let big_b = match receive_message(channel)? {
                Message::OtChoice { point } => decode_point(&point)?,
                other => return Err(OtError::UnexpectedMessage(other.name())),
            };

            let k0 = big_b * a;
            let k1 = (big_b - big_a) * a;
            let tweak = i as u64;
            let c0 = seal(&point_key(tweak, &k0), tweak, 0, m0.as_ref())?;
            let c1 = seal(&point_key(tweak, &k1), tweak, 1, m1.as_ref())?;
            send_message(channel, &Message::OtPayload { c0, c1 })?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DhOtReceiver;

impl OtReceiver for DhOtReceiver {
    fn receive<C: IOChannel, R: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        choices: &[bool],
        rng: &mut R,
    ) -> Result<Vec<Block>, OtError> {
        let mut labels = Vec::with_capacity(choices.len());
        for (i, &choice) in choices.iter().enumerate() {
            let big_a = match receive_message(channel)? {
                Message::OtCommit { point } => decode_point(&point)?,
                other => return Err(OtError::UnexpectedMessage(other.name())),
            };

            let b = Scalar::random(rng);
            let mut big_b = RistrettoPoint::mul_base(&b);
            if choice {
                big_b += big_a;
            }
            send_message(channel, &Message::OtChoice { point: big_b.compress().to_bytes() })?;

            let shared = big_a * b;
            let (c0, c1) = match receive_message(channel)? {
                Message::OtPayload { c0, c1 } => (c0, c1),
                other => return Err(OtError::UnexpectedMessage(other.name())),
            };
            let tweak = i as u64;
            let chosen = if choice { &c1 } else { &c0 };
            let plaintext = open(&point_key(tweak, &shared), tweak, choice as u32, chosen)?;
            let label =
                Block::try_from_slice(&plaintext).ok_or(crypto_core::CryptoError)?;
            labels.push(label);
        }
        Ok(labels)
    }
}
