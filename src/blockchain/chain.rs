use chrono::Utc;
use log::{error, info};

use std::sync::{Arc, Mutex};

use super::block::{meets_difficulty, Block, GENESIS_PREVIOUS_HASH};
use super::crypto::sha256_hex;
use super::registry::{User, UserRegistry};
use super::transaction::Transaction;

/// Default proof-of-work difficulty (leading zero characters)
const DEFAULT_DIFFICULTY: usize = 2;

/// Number of extra stretch rounds applied when deriving a public hash
const PUBLIC_HASH_ROUNDS: usize = 5;

/// The ledger: an append-only chain of blocks plus the pool of
/// transactions waiting to be mined into the next one.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks, genesis at index 0
    chain: Arc<Mutex<Vec<Block>>>,

    /// Transactions waiting to be included in the next block
    pending_transactions: Arc<Mutex<Vec<Transaction>>>,

    /// Mining difficulty (number of leading zeros required in a hash)
    difficulty: usize,

    /// Registry of users, consulted for identity derivation
    users: Arc<UserRegistry>,

    /// Serializes chain growth: held across the snapshot, the
    /// proof-of-work search and the append so concurrent miners never
    /// build on the same tip. Transaction submission does not take it.
    miner: Arc<Mutex<()>>,
}

impl Blockchain {
    /// Creates a new ledger with a genesis block at the default
    /// difficulty
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Creates a new ledger with a genesis block at the given
    /// difficulty
    pub fn with_difficulty(difficulty: usize) -> Self {
        let genesis = Self::create_genesis_block();

        Blockchain {
            chain: Arc::new(Mutex::new(vec![genesis])),
            pending_transactions: Arc::new(Mutex::new(Vec::new())),
            difficulty,
            users: Arc::new(UserRegistry::new()),
            miner: Arc::new(Mutex::new(())),
        }
    }

    /// Creates the genesis block.
    ///
    /// Not mined: the chain's first block carries no proof of work by
    /// convention.
    fn create_genesis_block() -> Block {
        Block::new(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            Utc::now(),
            Vec::new(),
        )
    }

    /// Gets the most recently appended block.
    ///
    /// The chain is never empty; an empty chain is a programming
    /// error, not a recoverable condition.
    pub fn latest_block(&self) -> Block {
        let chain = self.chain.lock().unwrap();
        chain.last().expect("chain always holds the genesis block").clone()
    }

    /// Appends a transaction to the pending pool.
    ///
    /// Unconditional: no validation, deduplication or capacity bound.
    pub fn add_transaction(&self, transaction: Transaction) {
        self.pending_transactions.lock().unwrap().push(transaction);
    }

    /// Mines the pending pool into a new block and appends it.
    ///
    /// The pool is snapshotted and cleared in one step, so the mined
    /// block holds exactly the transactions present when mining
    /// started; anything submitted while the proof-of-work loop runs
    /// waits for the next block. Concurrent mine calls are serialized,
    /// so each block builds on the tip the previous one appended.
    pub fn mine_pending_transactions(&self) -> Block {
        // Chain tip must stay stable from snapshot through append
        let _mining = self.miner.lock().unwrap();

        let transactions = std::mem::take(&mut *self.pending_transactions.lock().unwrap());

        let latest = self.latest_block();
        let mut block = Block::new(
            latest.index + 1,
            latest.hash,
            Utc::now(),
            transactions,
        );

        // CPU-bound search, deliberately outside any lock
        block.mine(self.difficulty);

        info!(
            "Mined block {} with nonce {} ({} transactions)",
            block.index,
            block.nonce,
            block.transactions.len()
        );

        self.chain.lock().unwrap().push(block.clone());
        block
    }

    /// Derives a user's public hash from their private hash and
    /// recovery key.
    ///
    /// The private hash and recovery key are concatenated and hashed,
    /// then stretched through five more rounds of hashing with the
    /// recovery key. Returns `None` if either credential is missing.
    pub fn generate_public_hash(&self, uid: &str) -> Option<String> {
        let private_hash = self.users.get_private_hash(uid);
        let recovery_key = self.users.get_user(uid).map(|user| user.recovery_key);

        let (private_hash, recovery_key) = match (private_hash, recovery_key) {
            (Some(private_hash), Some(recovery_key)) => (private_hash, recovery_key),
            _ => {
                error!("Missing private hash or recovery key for user {}", uid);
                return None;
            }
        };

        let mut public_hash = sha256_hex(format!("{}{}", private_hash, recovery_key).as_bytes());
        for _ in 0..PUBLIC_HASH_ROUNDS {
            public_hash = sha256_hex(format!("{}{}", public_hash, recovery_key).as_bytes());
        }

        Some(public_hash)
    }

    /// Checks whether a structurally identical transaction is
    /// currently in the pending pool.
    ///
    /// Scope is the pool only: once a transaction has been mined and
    /// the pool cleared, verification reports false.
    pub fn verify_transaction(&self, transaction: &Transaction) -> bool {
        let transaction_hash = transaction.digest();

        let verified = self
            .pending_transactions
            .lock()
            .unwrap()
            .iter()
            .any(|pending| pending.digest() == transaction_hash);

        if verified {
            info!("KYC verification successful for user {}", transaction.user_id);
        } else {
            error!(
                "KYC verification unsuccessful for user {}, please verify manually",
                transaction.user_id
            );
        }

        verified
    }

    /// Returns every mined transaction belonging to a user, in chain
    /// order then in-block order. Pool-only transactions are excluded.
    pub fn view_user(&self, user_id: &str) -> Vec<Transaction> {
        self.chain
            .lock()
            .unwrap()
            .iter()
            .flat_map(|block| block.transactions.iter())
            .filter(|transaction| transaction.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Registers a new user in the registry
    pub fn register_user(&self, name: impl Into<String>) -> User {
        self.users.register(name)
    }

    /// Inserts a pre-built user record with its private hash
    pub fn add_user(&self, user: User, private_hash: String) {
        self.users.add_user(user, private_hash);
    }

    /// Gets the entire chain
    pub fn get_chain(&self) -> Vec<Block> {
        self.chain.lock().unwrap().clone()
    }

    /// Gets all pending transactions
    pub fn get_pending_transactions(&self) -> Vec<Transaction> {
        self.pending_transactions.lock().unwrap().clone()
    }

    /// Gets the configured mining difficulty
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Validates the chain: every block's hash must match its
    /// contents, link to its predecessor, and (genesis excepted) carry
    /// proof of work.
    pub fn is_valid(&self) -> bool {
        let chain = self.chain.lock().unwrap();

        for i in 1..chain.len() {
            let current = &chain[i];
            let previous = &chain[i - 1];

            if current.hash != current.calculate_hash() {
                return false;
            }

            if current.previous_hash != previous.hash {
                return false;
            }

            if !meets_difficulty(&current.hash, self.difficulty) {
                return false;
            }
        }

        true
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
