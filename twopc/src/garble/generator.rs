//! Garbling: label generation and table construction.

use circuit::{Circuit, WireId};
use crypto_core::{derive_key, seal, Block};
use rand::{CryptoRng, Rng};

use super::errors::GeneratorError;
use super::gc::{GarbledGate, GarbledTables, LabelPair, OutputDecodeInfo, WireLabel, WireLabelTable};

/// Draw a fresh label pair: two uniformly random labels with
/// complementary select bits, the bit-to-select assignment itself
/// uniformly random.
fn random_pair<R: Rng + CryptoRng>(rng: &mut R) -> LabelPair {
    let zero_select = rng.gen::<bool>();
    LabelPair {
        labels: [
            rng.gen::<Block>().with_lsb(zero_select),
            rng.gen::<Block>().with_lsb(!zero_select),
        ],
    }
}

/// Garble `circ`: generate the wire-label table and encrypt every
/// gate's truth table.
///
/// Row `r` of a gate holds the output label for the input-bit
/// combination whose labels carry select bits concatenating to `r`, so
/// the evaluator indexes its row directly and decrypts exactly once.
pub fn garble<R: Rng + CryptoRng>(
    rng: &mut R,
    circ: &Circuit,
) -> Result<(GarbledTables, WireLabelTable), GeneratorError> {
    circ.validate()?;

    let mut table = WireLabelTable::new(circ.wire_count());
    for &w in circ.alice_inputs.iter().chain(circ.bob_inputs.iter()) {
        table.insert(w, random_pair(rng));
    }
    for gate in &circ.gates {
        table.insert(gate.id, random_pair(rng));
    }

    let mut gates = Vec::with_capacity(circ.gates.len());
    for gate in &circ.gates {
        let k = gate.inputs.len();
        let out_pair = table
            .pair(gate.id)
            .ok_or(GeneratorError::UninitializedLabel(gate.id))?;

        let mut rows = vec![Vec::new(); 1 << k];
        let mut input_bits = vec![false; k];
        let mut input_labels = vec![Block::default(); k];
        for combo in 0..1u32 << k {
            let mut row = 0usize;
            for (j, &w) in gate.inputs.iter().enumerate() {
                let bit = combo >> (k - 1 - j) & 1 != 0;
                let label = table
                    .pair(w)
                    .ok_or(GeneratorError::UninitializedLabel(w))?
                    .get(bit);
                input_bits[j] = bit;
                input_labels[j] = label;
                row = row << 1 | label.lsb() as usize;
            }
            let out_label = out_pair.get(gate.op.eval(&input_bits));
            let key = derive_key(gate.id as u64, &input_labels);
            rows[row] = seal(&key, gate.id as u64, row as u32, out_label.as_ref())?;
        }
        gates.push(GarbledGate { id: gate.id, rows });
    }

    let decode_info = circ
        .outputs
        .iter()
        .map(|&w| {
            let pair = table.pair(w).ok_or(GeneratorError::UninitializedLabel(w))?;
            Ok(OutputDecodeInfo {
                id: w,
                zero_select: pair.get(false).lsb(),
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    Ok((GarbledTables { gates, decode_info }, table))
}

/// Pick the labels encoding `bits` on `wires`, in order.
pub fn encode_inputs(
    table: &WireLabelTable,
    wires: &[WireId],
    bits: &[bool],
) -> Result<Vec<WireLabel>, GeneratorError> {
    if wires.len() != bits.len() {
        return Err(GeneratorError::InputLenMismatch {
            wires: wires.len(),
            bits: bits.len(),
        });
    }
    wires
        .iter()
        .zip(bits)
        .map(|(&id, &bit)| {
            let pair = table.pair(id).ok_or(GeneratorError::UninitializedLabel(id))?;
            Ok(WireLabel {
                id,
                label: pair.get(bit),
            })
        })
        .collect()
}
