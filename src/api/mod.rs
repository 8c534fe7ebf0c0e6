// API module
//
// This module contains the REST API implementation for the ledger

pub mod error;
pub mod handlers;
pub mod routes;

// Re-export main components for easier access
pub use routes::configure_routes;
