//! The evaluator's side of the session.

use circuit::Circuit;
use crypto_core::utils::to_twos_complement_bits;
use crypto_core::IOChannel;
use rand::{CryptoRng, Rng};

use super::{
    local_maximum, verdict_from_output_bits, Role, Session, SessionParams, SessionState, Verdict,
};
use crate::errors::ProtocolError;
use crate::garble::{decode_outputs, eval, WireLabel};
use crate::msg::Message;
use crate::ot::{DhOtReceiver, OtReceiver};

/// Run one session as the evaluator and return the verdict.
///
/// Receives the garbled circuit, fetches its own input labels via OT,
/// walks the gates, decodes the outputs and reports them back.
pub fn run_as_evaluator<C: IOChannel, R: Rng + CryptoRng>(
    channel: &mut C,
    rng: &mut R,
    circ: &Circuit,
    inputs: &[i64],
    params: SessionParams,
) -> Result<Verdict, ProtocolError> {
    let mut session = Session::new(channel, Role::Evaluator);
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
    log::info!(
        "evaluator: local maximum computed over {} inputs",
        inputs.len()
    );

    match session.recv()? {
        Message::Hello { n_bits, scale }
            if n_bits as usize == params.n_bits && scale == params.scale => {}
        Message::Hello { n_bits, scale } => {
            return Err(ProtocolError::ParameterMismatch {
                ours: format!("{} bits, scale {}", params.n_bits, params.scale),
                theirs: format!("{n_bits} bits, scale {scale}"),
            });
        }
        other => return Err(session.unexpected(&other)),
    }
    session.send(&Message::HelloAck {
        n_bits: params.n_bits as u32,
        scale: params.scale,
    })?;
    session.advance();

    let (received, tables) = match session.recv()? {
        Message::GarbledCircuit { circuit, tables } => (circuit, tables),
        other => return Err(session.unexpected(&other)),
    };
    received.validate()?;
    if received != *circ {
        return Err(ProtocolError::ParameterMismatch {
            ours: circ.name.clone(),
            theirs: received.name,
        });
    }
    if tables.gates.len() != received.gates.len() {
        return Err(ProtocolError::Crypto(format!(
            "{} garbled gates for {} circuit gates",
            tables.gates.len(),
            received.gates.len()
        )));
    }
    if tables.decode_info.len() != received.outputs.len() {
        return Err(ProtocolError::Crypto(format!(
            "{} decode entries for {} output wires",
            tables.decode_info.len(),
            received.outputs.len()
        )));
    }
    log::debug!(
        "evaluator: received '{}' with {} garbled gates",
        received.name,
        tables.gates.len()
    );

    let alice_labels = match session.recv()? {
        Message::GarblerInputs { labels } => labels,
        other => return Err(session.unexpected(&other)),
    };
    if alice_labels.len() != received.alice_inputs.len()
        || alice_labels
            .iter()
            .zip(&received.alice_inputs)
            .any(|(wl, &w)| wl.id != w)
    {
        return Err(ProtocolError::Crypto(
            "garbler input labels do not cover the garbler's input wires".into(),
        ));
    }

    let choices = to_twos_complement_bits(local_max, params.n_bits);
    let own_labels = DhOtReceiver.receive(session.channel(), &choices, rng)?;
    session.advance();

    let mut input_labels = alice_labels;
    input_labels.extend(
        received
            .bob_inputs
            .iter()
            .zip(own_labels)
            .map(|(&id, label)| WireLabel { id, label }),
    );
    session.advance();

    let output_labels = eval(&received, &tables, &input_labels)?;
    let bits = decode_outputs(&output_labels, &tables.decode_info)?;
    session.send(&Message::OutputBits { bits: bits.clone() })?;
    session.advance();

    let verdict = verdict_from_output_bits(&received.outputs, &bits)?;
    session.advance();
    log::info!("evaluator: verdict {verdict}");
    Ok(verdict)
}
