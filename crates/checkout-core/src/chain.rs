use crate::error::{ChainError, LedgerError, Result};
use crate::validate::{check_extension, validate_chain};
use crate::{Block, CheckoutRecord};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Height and hash of the current tail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub height: u64,
    pub hash: String,
}

/// In-memory, append-only sequence of blocks rooted at a genesis block.
///
/// Appends hold the write lock for the whole read-tail, build, validate, push
/// sequence, so concurrent callers are serialized and each sees the latest
/// tail. Readers only ever observe fully built blocks.
pub struct Blockchain {
    blocks: RwLock<Vec<Block>>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a chain holding only a freshly built genesis block.
    pub fn new() -> Self {
        let genesis = Block::genesis();
        info!(hash = %genesis.hash(), "genesis block created");
        Self {
            blocks: RwLock::new(vec![genesis]),
        }
    }

    /// Record a checkout after the current tail.
    ///
    /// Returns the committed block, or `LedgerError::InvalidExtension` if the
    /// candidate failed validation, in which case nothing was written.
    pub fn append(&self, payload: CheckoutRecord) -> Result<Block> {
        let mut blocks = self.blocks.write();
        let tail = blocks.last().ok_or(LedgerError::EmptyChain)?;
        let candidate = Block::create(tail, payload);
        push_validated(&mut blocks, candidate)
    }

    /// Commit a block built elsewhere, subject to the same validation as `append`.
    pub fn commit(&self, candidate: Block) -> Result<Block> {
        let mut blocks = self.blocks.write();
        push_validated(&mut blocks, candidate)
    }

    /// Ordered copy of every committed block.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }

    pub fn tail(&self) -> Result<Block> {
        self.blocks
            .read()
            .last()
            .cloned()
            .ok_or(LedgerError::EmptyChain)
    }

    pub fn head(&self) -> Result<ChainHead> {
        let tail = self.tail()?;
        Ok(ChainHead {
            height: tail.position(),
            hash: tail.hash().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Re-check every block from genesis to tail.
    pub fn validate(&self) -> std::result::Result<(), ChainError> {
        validate_chain(&self.blocks.read())
    }
}

fn push_validated(blocks: &mut Vec<Block>, candidate: Block) -> Result<Block> {
    let tail = blocks.last().ok_or(LedgerError::EmptyChain)?;
    if let Err(err) = check_extension(&candidate, tail) {
        warn!(position = candidate.position(), error = %err, "discarding invalid block");
        return Err(err.into());
    }
    debug!(
        position = candidate.position(),
        hash = %candidate.hash(),
        "block committed"
    );
    blocks.push(candidate.clone());
    Ok(candidate)
}
