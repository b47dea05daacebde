//! Persistence layer for the help desk backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - The transactional execution layer
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod tx;

pub use tx::{BoxFuture, RoleProfile, TxManager};
