//! Arena-backed block index and the backward walks the retarget rules need.
//!
//! Entries are addressed by [`BlockId`] and never removed, so a parent link
//! always points at an older entry and the graph cannot cycle. Every entry
//! carries the cumulative chain work up to and including itself.

use fargo_shared_types::BlockHeader;
use log::trace;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::work;

/// Stable handle to an entry in a [`ChainIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(usize);

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainIndexError {
    #[error("Block {0} is not in the index")]
    UnknownBlock(BlockId),
    #[error("Parent block {0} is not in the index")]
    UnknownParent(BlockId),
    #[error("Block at height {height} has no parent")]
    MissingParent { height: u32 },
    #[error("Index already holds a genesis block")]
    DuplicateGenesis,
    #[error("Child height {child} does not follow parent height {parent}")]
    HeightMismatch { parent: u32, child: u32 },
    #[error("No ancestor at height {height}")]
    MissingAncestor { height: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndexEntry {
    pub header: BlockHeader,
    /// `None` only for genesis
    pub parent: Option<BlockId>,
    /// Total work from genesis through this block
    pub chain_work: U256,
}

impl BlockIndexEntry {
    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn timestamp(&self) -> i64 {
        self.header.timestamp
    }

    pub fn bits(&self) -> u32 {
        self.header.bits
    }

    pub fn is_proof_of_stake(&self) -> bool {
        self.header.is_proof_of_stake
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    entries: Vec<BlockIndexEntry>,
    best: Option<BlockId>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Result<&BlockIndexEntry, ChainIndexError> {
        self.entries.get(id.0).ok_or(ChainIndexError::UnknownBlock(id))
    }

    /// The entry with the most cumulative work; the first one inserted wins ties.
    pub fn tip(&self) -> Option<BlockId> {
        self.best
    }

    /// Adds `header` on top of `parent` and returns its handle.
    ///
    /// Only a height-0 header may omit its parent, and only once. The entry's
    /// chain work is the parent's plus the header's own block proof.
    pub fn insert(
        &mut self,
        header: BlockHeader,
        parent: Option<BlockId>,
    ) -> Result<BlockId, ChainIndexError> {
        let parent_work = match parent {
            Some(parent_id) => {
                let parent_entry = self
                    .entries
                    .get(parent_id.0)
                    .ok_or(ChainIndexError::UnknownParent(parent_id))?;
                if parent_entry.height().checked_add(1) != Some(header.height) {
                    return Err(ChainIndexError::HeightMismatch {
                        parent: parent_entry.height(),
                        child: header.height,
                    });
                }
                parent_entry.chain_work
            }
            None => {
                if header.height != 0 {
                    return Err(ChainIndexError::MissingParent {
                        height: header.height,
                    });
                }
                if !self.entries.is_empty() {
                    return Err(ChainIndexError::DuplicateGenesis);
                }
                U256::zero()
            }
        };

        let chain_work = work::accumulate(parent_work, header.bits);
        let id = BlockId(self.entries.len());
        self.entries.push(BlockIndexEntry {
            header,
            parent,
            chain_work,
        });

        let is_better = match self.best {
            Some(best) => chain_work > self.entries[best.0].chain_work,
            None => true,
        };
        if is_better {
            self.best = Some(id);
        }

        Ok(id)
    }

    /// Iterates from `start` back to genesis, `start` first.
    pub fn ancestors(&self, start: BlockId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            next: Some(start),
        }
    }

    /// Walks back from `start` to the most recent block whose proof-of-stake flag
    /// equals `want_proof_of_stake`. Stops at genesis when nothing matches.
    pub fn find_last_matching(
        &self,
        start: BlockId,
        want_proof_of_stake: bool,
    ) -> Result<BlockId, ChainIndexError> {
        let mut id = start;
        loop {
            let entry = self.get(id)?;
            match entry.parent {
                Some(parent) if entry.is_proof_of_stake() != want_proof_of_stake => id = parent,
                _ => return Ok(id),
            }
        }
    }

    /// Up to `max_len` blocks ending at `start`, newest first. Shorter when genesis
    /// is reached.
    pub fn collect_window(
        &self,
        start: BlockId,
        max_len: usize,
    ) -> Result<Vec<BlockId>, ChainIndexError> {
        self.get(start)?;
        let window: Vec<BlockId> = self
            .ancestors(start)
            .take(max_len)
            .map(|(id, _)| id)
            .collect();
        trace!("collected {} of {} blocks back from {}", window.len(), max_len, start);
        Ok(window)
    }

    /// The ancestor of `start` at `height`, or `None` if `height` is above it.
    pub fn ancestor(&self, start: BlockId, height: u32) -> Result<Option<BlockId>, ChainIndexError> {
        if self.get(start)?.height() < height {
            return Ok(None);
        }
        Ok(self
            .ancestors(start)
            .find(|(_, entry)| entry.height() == height)
            .map(|(id, _)| id))
    }
}

/// Iterator over a block and its ancestors, see [`ChainIndex::ancestors`].
pub struct Ancestors<'a> {
    index: &'a ChainIndex,
    next: Option<BlockId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (BlockId, &'a BlockIndexEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let entry = self.index.entries.get(id.0)?;
        self.next = entry.parent;
        Some((id, entry))
    }
}
