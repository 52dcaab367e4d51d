//! Hash-linked, append-only ledger of book checkout events.
//!
//! A [`Block`] wraps one [`CheckoutRecord`] together with its position, a
//! wall-clock timestamp and the hash of its predecessor. [`block_hash`] is the
//! hash engine; [`validate`] holds the rules deciding whether a block may extend
//! another; [`chain::Blockchain`] owns the sequence and serializes appends.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod chain;
pub mod constants;
pub mod error;

pub use chain::{Blockchain, ChainHead};
pub use error::{ChainError, ExtensionError, LedgerError};

/// A single book-lending event, the payload of every block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRecord {
    book_id: String,
    user: String,
    checkout_date: String,
    #[serde(default)]
    is_genesis: bool,
}

impl CheckoutRecord {
    pub fn new(
        book_id: impl Into<String>,
        user: impl Into<String>,
        checkout_date: impl Into<String>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            user: user.into(),
            checkout_date: checkout_date.into(),
            is_genesis: false,
        }
    }

    /// The reserved marker payload carried by the genesis block.
    pub fn genesis() -> Self {
        Self {
            book_id: String::new(),
            user: String::new(),
            checkout_date: String::new(),
            is_genesis: true,
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn checkout_date(&self) -> &str {
        &self.checkout_date
    }

    pub fn is_genesis(&self) -> bool {
        self.is_genesis
    }

    /// Compact JSON with keys in lexicographic order. This is the payload
    /// representation fed to the hash engine, so it must never change shape.
    pub fn canonical_json(&self) -> String {
        serde_json::json!({
            "book_id": self.book_id,
            "checkout_date": self.checkout_date,
            "is_genesis": self.is_genesis,
            "user": self.user,
        })
        .to_string()
    }
}

/// Bytes hashed for a block: position (u64 LE), timestamp, canonical payload
/// JSON, previous hash.
pub fn hash_input(
    position: u64,
    timestamp: &str,
    payload: &CheckoutRecord,
    previous_hash: &str,
) -> Vec<u8> {
    let payload = payload.canonical_json();
    let mut bytes =
        Vec::with_capacity(8 + timestamp.len() + payload.len() + previous_hash.len());
    bytes.extend_from_slice(&position.to_le_bytes());
    bytes.extend_from_slice(timestamp.as_bytes());
    bytes.extend_from_slice(payload.as_bytes());
    bytes.extend_from_slice(previous_hash.as_bytes());
    bytes
}

/// The hash engine: lowercase hex SHA-256 of [`hash_input`].
pub fn block_hash(
    position: u64,
    timestamp: &str,
    payload: &CheckoutRecord,
    previous_hash: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(hash_input(position, timestamp, payload, previous_hash));
    hex::encode(hasher.finalize())
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// One committed (or candidate) entry of the ledger.
///
/// Fields are private: a block is immutable once built. External callers can
/// still obtain arbitrary blocks by deserializing them, which is why
/// [`validate::check_extension`] re-derives the hash instead of trusting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    position: u64,
    payload: CheckoutRecord,
    timestamp: String,
    hash: String,
    previous_hash: String,
}

impl Block {
    fn build(
        position: u64,
        timestamp: String,
        payload: CheckoutRecord,
        previous_hash: String,
    ) -> Self {
        let hash = block_hash(position, &timestamp, &payload, &previous_hash);
        Self {
            position,
            payload,
            timestamp,
            hash,
            previous_hash,
        }
    }

    /// First block of every chain: position 0, empty previous hash, genesis payload.
    pub fn genesis() -> Self {
        Self::build(
            constants::GENESIS_POSITION,
            now_timestamp(),
            CheckoutRecord::genesis(),
            String::new(),
        )
    }

    /// Build the block that follows `previous`, stamped with the current time.
    pub fn create(previous: &Block, payload: CheckoutRecord) -> Self {
        Self::build(
            previous.position.saturating_add(1),
            now_timestamp(),
            payload,
            previous.hash.clone(),
        )
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn payload(&self) -> &CheckoutRecord {
        &self.payload
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    /// Re-run the hash engine over the stored fields.
    pub fn recompute_hash(&self) -> String {
        block_hash(
            self.position,
            &self.timestamp,
            &self.payload,
            &self.previous_hash,
        )
    }

    pub fn is_genesis(&self) -> bool {
        self.position == constants::GENESIS_POSITION
            && self.previous_hash.is_empty()
            && self.payload.is_genesis
    }
}

pub mod validate {
    use super::Block;
    use crate::error::{ChainError, ExtensionError};

    /// Decide whether `candidate` may be appended after `previous`.
    ///
    /// Checks run in order and stop at the first failure: link, integrity, ordering.
    pub fn check_extension(candidate: &Block, previous: &Block) -> Result<(), ExtensionError> {
        if previous.hash != candidate.previous_hash {
            return Err(ExtensionError::LinkMismatch {
                expected: previous.hash.clone(),
                actual: candidate.previous_hash.clone(),
            });
        }

        if candidate.recompute_hash() != candidate.hash {
            return Err(ExtensionError::HashMismatch {
                position: candidate.position,
            });
        }

        if previous.position.checked_add(1) != Some(candidate.position) {
            return Err(ExtensionError::PositionGap {
                expected: previous.position.saturating_add(1),
                actual: candidate.position,
            });
        }

        Ok(())
    }

    pub fn is_valid_extension(candidate: &Block, previous: &Block) -> bool {
        check_extension(candidate, previous).is_ok()
    }

    /// Audit a whole exported chain, starting from its genesis block.
    pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainError> {
        let genesis = blocks.first().ok_or(ChainError::Empty)?;
        if !genesis.is_genesis() || genesis.recompute_hash() != genesis.hash {
            return Err(ChainError::BadGenesis);
        }

        for pair in blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            check_extension(current, previous).map_err(|source| ChainError::BrokenLink {
                position: current.position,
                source,
            })?;
        }
        Ok(())
    }
}
