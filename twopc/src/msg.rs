//! The wire messages exchanged between the two roles.
//!
//! Every message travels as a 4-byte big-endian length frame around a
//! bincode-encoded tagged record. Bincode's fixed-width encoding is
//! canonical, so hashes over payloads are reproducible, and an unknown
//! tag fails decoding outright.

use circuit::{Circuit, WireId};
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind, Result};

use crate::garble::{GarbledTables, WireLabel};
use crypto_core::IOChannel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Session parameters proposed by the garbler.
    Hello { n_bits: u32, scale: u32 },
    /// The evaluator's echo of the accepted parameters.
    HelloAck { n_bits: u32, scale: u32 },
    /// Circuit topology, garbled gate tables and output decode table.
    GarbledCircuit {
        circuit: Circuit,
        tables: GarbledTables,
    },
    /// The garbler's own input labels, one per garbler input wire.
    GarblerInputs { labels: Vec<WireLabel> },
    /// OT round 1, sender commitment (a compressed group element).
    OtCommit { point: [u8; 32] },
    /// OT round 2, chooser response (a compressed group element).
    OtChoice { point: [u8; 32] },
    /// OT round 3, the two encrypted labels.
    OtPayload { c0: Vec<u8>, c1: Vec<u8> },
    /// Decoded output bits, evaluator to garbler.
    OutputBits { bits: Vec<(WireId, bool)> },
}

impl Message {
    /// The tag name, for logs and error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Hello { .. } => "Hello",
            Message::HelloAck { .. } => "HelloAck",
            Message::GarbledCircuit { .. } => "GarbledCircuit",
            Message::GarblerInputs { .. } => "GarblerInputs",
            Message::OtCommit { .. } => "OtCommit",
            Message::OtChoice { .. } => "OtChoice",
            Message::OtPayload { .. } => "OtPayload",
            Message::OutputBits { .. } => "OutputBits",
        }
    }
}

/// Frame and send one message.
pub fn send_message<C: IOChannel>(channel: &mut C, msg: &Message) -> Result<()> {
    let payload =
        bincode::serialize(msg).map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
    log::trace!("send {} ({} bytes)", msg.name(), payload.len());
    channel.write_frame(&payload)?;
    channel.flush()
}

/// Receive and decode one message.
pub fn receive_message<C: IOChannel>(channel: &mut C) -> Result<Message> {
    let payload = channel.read_frame()?;
    let msg: Message =
        bincode::deserialize(&payload).map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
    log::trace!("recv {} ({} bytes)", msg.name(), payload.len());
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_core::local_channel_pair;
    use std::thread;

    #[test]
    fn message_roundtrip() {
        let (mut tx, mut rx) = local_channel_pair();
        let messages = vec![
            Message::Hello { n_bits: 32, scale: 10 },
            Message::OtCommit { point: [7u8; 32] },
            Message::OutputBits { bits: vec![(5, true), (6, false)] },
        ];
        let sent = messages.clone();
        let handle = thread::spawn(move || {
            for msg in &sent {
                send_message(&mut tx, msg).unwrap();
            }
        });
        for msg in &messages {
            assert_eq!(&receive_message(&mut rx).unwrap(), msg);
        }
        handle.join().unwrap();
    }

    #[test]
    fn unknown_tag_rejected() {
        let (mut tx, mut rx) = local_channel_pair();
        let handle = thread::spawn(move || {
            // A variant index far past the enum's last tag.
            tx.write_frame(&99u32.to_le_bytes()).unwrap();
            tx.flush().unwrap();
        });
        let err = receive_message(&mut rx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        handle.join().unwrap();
    }

    #[test]
    fn truncated_payload_rejected() {
        let (mut tx, mut rx) = local_channel_pair();
        let handle = thread::spawn(move || {
            tx.write_frame(&[0u8; 2]).unwrap();
            tx.flush().unwrap();
        });
        let err = receive_message(&mut rx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        handle.join().unwrap();
    }
}
