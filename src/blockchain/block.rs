use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::crypto::hash_json;
use super::transaction::Transaction;

/// Sentinel previous-hash carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Represents a block in the ledger chain
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Index of the block in the chain (0 = genesis)
    pub index: u64,

    /// Hash of the previous block ("0" for genesis)
    pub previous_hash: String,

    /// Timestamp when the block was created
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Transactions included in this block
    pub transactions: Vec<Transaction>,

    /// Nonce found by proof of work
    pub nonce: u64,

    /// Hash of the current block (recomputed whenever the nonce changes)
    pub hash: String,
}

impl Block {
    /// Creates a new, unmined block with `nonce = 0` and an initial
    /// hash computed from the current fields.
    pub fn new(
        index: u64,
        previous_hash: String,
        timestamp: DateTime<Utc>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut block = Block {
            index,
            previous_hash,
            timestamp,
            transactions,
            nonce: 0,
            hash: String::new(),
        };

        block.hash = block.calculate_hash();
        block
    }

    /// Calculates the hash of the block.
    ///
    /// Pure function of (index, previous_hash, timestamp, transactions,
    /// nonce); changing any field changes the digest.
    pub fn calculate_hash(&self) -> String {
        let block_data = serde_json::json!({
            "index": self.index,
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
            "nonce": self.nonce,
        });

        hash_json(&block_data)
    }

    /// Mines the block in place: increments the nonce and recomputes
    /// the hash until it satisfies the proof-of-work target.
    ///
    /// Blocking and unbounded; runs until a qualifying nonce is found.
    pub fn mine(&mut self, difficulty: usize) {
        while !meets_difficulty(&self.hash, difficulty) {
            self.nonce += 1;
            self.hash = self.calculate_hash();
        }
    }
}

/// Proof-of-work predicate: the digest's first `difficulty` characters
/// must all be the zero character.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction::new("u1", serde_json::Map::new()),
            Transaction::new("u2", serde_json::Map::new()),
        ]
    }

    #[test]
    fn test_new_block() {
        let block = Block::new(1, "prev".to_string(), Utc::now(), sample_transactions());

        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, "prev");
        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, block.calculate_hash());
    }

    #[test]
    fn test_calculate_hash_is_pure() {
        let block = Block::new(1, "prev".to_string(), Utc::now(), sample_transactions());

        assert_eq!(block.calculate_hash(), block.calculate_hash());
        assert_eq!(block.calculate_hash().len(), 64);
    }

    #[test]
    fn test_calculate_hash_changes_with_fields() {
        let block = Block::new(1, "prev".to_string(), Utc::now(), sample_transactions());

        let mut changed_nonce = block.clone();
        changed_nonce.nonce += 1;

        let mut changed_prev = block.clone();
        changed_prev.previous_hash = "other".to_string();

        let mut changed_txs = block.clone();
        changed_txs.transactions.pop();

        assert_ne!(block.calculate_hash(), changed_nonce.calculate_hash());
        assert_ne!(block.calculate_hash(), changed_prev.calculate_hash());
        assert_ne!(block.calculate_hash(), changed_txs.calculate_hash());
    }

    #[test]
    fn test_mine_satisfies_difficulty() {
        for difficulty in 0..=2 {
            let mut block =
                Block::new(1, "prev".to_string(), Utc::now(), sample_transactions());
            block.mine(difficulty);

            assert!(meets_difficulty(&block.hash, difficulty));
            assert!(block.hash.starts_with(&"0".repeat(difficulty)));
            assert_eq!(block.hash, block.calculate_hash());
        }
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("00ab", 2));
        assert!(meets_difficulty("1234", 0));
        assert!(!meets_difficulty("0a00", 2));
        assert!(!meets_difficulty("0", 2));
    }
}
