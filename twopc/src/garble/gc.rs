//! Garbled-circuit data types.

use circuit::WireId;
use crypto_core::Block;
use serde::{Deserialize, Serialize};

/// A single wire label held for a specific wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireLabel {
    /// Wire id.
    pub id: WireId,
    /// The held label.
    pub label: Block,
}

/// Both labels of one wire, indexed by the logical bit they encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPair {
    pub labels: [Block; 2],
}

impl LabelPair {
    #[inline]
    pub fn get(&self, bit: bool) -> Block {
        self.labels[bit as usize]
    }
}

/// The garbler's full wire-label table. Never leaves the garbler; its
/// backing storage is overwritten when the session ends.
pub struct WireLabelTable {
    pairs: Vec<Option<LabelPair>>,
}

impl WireLabelTable {
    pub fn new(wire_count: usize) -> Self {
        Self {
            pairs: vec![None; wire_count],
        }
    }

    #[inline]
    pub fn insert(&mut self, id: WireId, pair: LabelPair) {
        self.pairs[id] = Some(pair);
    }

    #[inline]
    pub fn pair(&self, id: WireId) -> Option<LabelPair> {
        self.pairs.get(id).copied().flatten()
    }
}

impl Drop for WireLabelTable {
    fn drop(&mut self) {
        let zero = LabelPair {
            labels: [Block::default(); 2],
        };
        for pair in self.pairs.iter_mut().flatten() {
            // Volatile so the wipe is not optimized away.
            unsafe { std::ptr::write_volatile(pair, zero) };
        }
    }
}

/// One garbled gate: `2^k` authenticated ciphertexts for a `k`-input
/// gate, row-indexed by the concatenated select bits of the input
/// labels in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarbledGate {
    /// Output wire id, equal to the gate id.
    pub id: WireId,
    pub rows: Vec<Vec<u8>>,
}

/// Which select bit the zero label of an output wire carries. The bit a
/// held output label decodes to is its select bit XOR this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputDecodeInfo {
    pub id: WireId,
    pub zero_select: bool,
}

/// Everything the evaluator needs besides the topology and its own
/// input labels: the per-gate tables and the output decode table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarbledTables {
    pub gates: Vec<GarbledGate>,
    pub decode_info: Vec<OutputDecodeInfo>,
}
