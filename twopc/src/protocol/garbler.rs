//! The garbler's side of the session.

use circuit::Circuit;
use crypto_core::utils::to_twos_complement_bits;
use crypto_core::{Block, IOChannel};
use rand::{CryptoRng, Rng};

use super::{
    local_maximum, verdict_from_output_bits, Role, Session, SessionParams, SessionState, Verdict,
};
use crate::errors::ProtocolError;
use crate::garble::{encode_inputs, garble, GeneratorError};
use crate::msg::Message;
use crate::ot::{DhOtSender, OtSender};

/// Run one session as the garbler and return the verdict.
///
/// Garbles the circuit, ships topology, tables and decode info, hands
/// over its own input labels directly and the evaluator's via OT, then
/// receives the decoded output bits.
pub fn run_as_garbler<C: IOChannel, R: Rng + CryptoRng>(
    channel: &mut C,
    rng: &mut R,
    circ: &Circuit,
    inputs: &[i64],
    params: SessionParams,
) -> Result<Verdict, ProtocolError> {
    let mut session = Session::new(channel, Role::Garbler);
    match drive(&mut session, rng, circ, inputs, params) {
        Ok(verdict) => {
            debug_assert_eq!(session.state(), SessionState::Done);
            Ok(verdict)
        }
        Err(e) => {
            session.abort();
            Err(e)
        }
    }
}

fn drive<C: IOChannel, R: Rng + CryptoRng>(
    session: &mut Session<'_, C>,
    rng: &mut R,
    circ: &Circuit,
    inputs: &[i64],
    params: SessionParams,
) -> Result<Verdict, ProtocolError> {
    let local_max = local_maximum(inputs, params.n_bits)?;
    if circ.n_bits != params.n_bits {
        return Err(ProtocolError::ParameterMismatch {
            ours: format!("{} bits", params.n_bits),
            theirs: format!("{}-bit circuit", circ.n_bits),
        });
    }
    log::info!("garbler: local maximum computed over {} inputs", inputs.len());

    session.send(&Message::Hello {
        n_bits: params.n_bits as u32,
        scale: params.scale,
    })?;
    match session.recv()? {
        Message::HelloAck { n_bits, scale }
            if n_bits as usize == params.n_bits && scale == params.scale => {}
        Message::HelloAck { n_bits, scale } => {
            return Err(ProtocolError::ParameterMismatch {
                ours: format!("{} bits, scale {}", params.n_bits, params.scale),
                theirs: format!("{n_bits} bits, scale {scale}"),
            });
        }
        other => return Err(session.unexpected(&other)),
    }
    session.advance();

    let (tables, label_table) = garble(rng, circ)?;
    log::debug!(
        "garbler: {} gates garbled for '{}'",
        tables.gates.len(),
        circ.name
    );
    session.send(&Message::GarbledCircuit {
        circuit: circ.clone(),
        tables,
    })?;

    let input_bits = to_twos_complement_bits(local_max, params.n_bits);
    let labels = encode_inputs(&label_table, &circ.alice_inputs, &input_bits)?;
    session.send(&Message::GarblerInputs { labels })?;

    let pairs: Vec<(Block, Block)> = circ
        .bob_inputs
        .iter()
        .map(|&w| {
            label_table
                .pair(w)
                .map(|p| (p.get(false), p.get(true)))
                .ok_or(GeneratorError::UninitializedLabel(w))
        })
        .collect::<Result<_, _>>()?;
    DhOtSender.send(session.channel(), &pairs, rng)?;
    session.advance();
    session.advance();

    let bits = match session.recv()? {
        Message::OutputBits { bits } => bits,
        other => return Err(session.unexpected(&other)),
    };
    session.advance();

    let verdict = verdict_from_output_bits(&circ.outputs, &bits)?;
    session.advance();
    log::info!("garbler: verdict {verdict}");
    Ok(verdict)
}
