#![allow(dead_code)]

use fargo_consensus::{BlockId, ChainIndex};
use fargo_shared_types::BlockHeader;

pub const GENESIS_TIME: i64 = 1_400_000_000;

pub fn header(height: u32, timestamp: i64, bits: u32, is_proof_of_stake: bool) -> BlockHeader {
    BlockHeader {
        version: 1,
        previous_block_hash: [height as u8; 32],
        merkle_root: [0u8; 32],
        timestamp,
        bits,
        nonce: 0,
        height,
        is_proof_of_stake,
    }
}

/// Builds a straight chain from `(timestamp, bits)` pairs, genesis first.
pub fn build_chain(blocks: &[(i64, u32)]) -> (ChainIndex, Vec<BlockId>) {
    let mut index = ChainIndex::new();
    let mut ids = Vec::with_capacity(blocks.len());
    let mut parent = None;
    for (height, (timestamp, bits)) in blocks.iter().enumerate() {
        let id = index
            .insert(header(height as u32, *timestamp, *bits, false), parent)
            .expect("straight chain links");
        ids.push(id);
        parent = Some(id);
    }
    (index, ids)
}

/// `len` blocks `gap` seconds apart, all carrying `bits`.
pub fn uniform_chain(len: usize, gap: i64, bits: u32) -> (ChainIndex, Vec<BlockId>) {
    let blocks: Vec<(i64, u32)> = (0..len)
        .map(|height| (GENESIS_TIME + height as i64 * gap, bits))
        .collect();
    build_chain(&blocks)
}
