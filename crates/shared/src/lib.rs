//! Shared utilities for the help desk backend.
//!
//! This crate provides leaf functionality used across all other crates:
//! - Opaque token generation and hashing
//! - Password hashing with Argon2id
//! - Access token issuing and validation (HS256)
//! - Request field validators

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
