// Blockchain module
//
// This module contains the core ledger implementation including:
// - Block structure and proof of work
// - Blockchain structure and pending pool
// - Transaction structure
// - User registry and identity derivation
// - Hashing utilities

pub mod block;
pub mod chain;
pub mod crypto;
pub mod registry;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::Blockchain;
pub use registry::{User, UserRegistry};
pub use transaction::Transaction;
