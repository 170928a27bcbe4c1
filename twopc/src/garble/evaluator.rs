//! Gate-by-gate evaluation of a garbled circuit.

use circuit::{Circuit, WireId};
use crypto_core::{derive_key, open, Block};

use super::errors::EvaluatorError;
use super::gc::{GarbledTables, OutputDecodeInfo, WireLabel};

/// Walk the gates in topological order, decrypting one row per gate.
///
/// `input_labels` must hold exactly one label for every input wire the
/// circuit uses. Returns the labels of the output wires, in output
/// order.
pub fn eval(
    circ: &Circuit,
    tables: &GarbledTables,
    input_labels: &[WireLabel],
) -> Result<Vec<WireLabel>, EvaluatorError> {
    let mut wires: Vec<Option<Block>> = vec![None; circ.wire_count()];
    for wl in input_labels {
        wires[wl.id] = Some(wl.label);
    }

    for (gate, garbled) in circ.gates.iter().zip(tables.gates.iter()) {
        if gate.id != garbled.id {
            return Err(EvaluatorError::GateMismatch {
                expected: gate.id,
                actual: garbled.id,
            });
        }
        let k = gate.inputs.len();
        if garbled.rows.len() != 1 << k {
            return Err(EvaluatorError::RowCount {
                gate: gate.id,
                expected: 1 << k,
                actual: garbled.rows.len(),
            });
        }

        let mut row = 0usize;
        let mut labels = Vec::with_capacity(k);
        for &w in &gate.inputs {
            let label = wires[w].ok_or(EvaluatorError::UninitializedLabel(w))?;
            row = row << 1 | label.lsb() as usize;
            labels.push(label);
        }

        let key = derive_key(gate.id as u64, &labels);
        let plaintext = open(&key, gate.id as u64, row as u32, &garbled.rows[row])
            .map_err(|_| EvaluatorError::Decryption { gate: gate.id })?;
        let label = Block::try_from_slice(&plaintext)
            .ok_or(EvaluatorError::BadLabel { gate: gate.id })?;
        wires[gate.id] = Some(label);
    }

    let outputs = circ
        .outputs
        .iter()
        .map(|&w| {
            let label = wires[w].ok_or(EvaluatorError::UninitializedLabel(w))?;
            Ok(WireLabel { id: w, label })
        })
        .collect();

    // Intermediate labels must not outlive the walk.
    for wire in wires.iter_mut().flatten() {
        unsafe { std::ptr::write_volatile(wire, Block::default()) };
    }
    outputs
}

/// Map held output labels back to plaintext bits via the decode table.
pub fn decode_outputs(
    output_labels: &[WireLabel],
    decode_info: &[OutputDecodeInfo],
) -> Result<Vec<(WireId, bool)>, EvaluatorError> {
    output_labels
        .iter()
        .zip(decode_info)
        .map(|(wl, info)| {
            if wl.id != info.id {
                return Err(EvaluatorError::DecodeMismatch {
                    expected: info.id,
                    actual: wl.id,
                });
            }
            Ok((wl.id, wl.label.lsb() ^ info.zero_select))
        })
        .collect()
}
