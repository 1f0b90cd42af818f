//! Database layer
//!
//! This module provides SQLite storage for the Ladle service.
//!
//! # Architecture
//!
//! - `pool` creates the connection pool (with an in-memory variant for tests)
//! - `migrations` applies the code-embedded schema migrations
//! - `repositories` contains one trait + SQLx implementation per aggregate
//!
//! Uniqueness invariants (one favorite / cart entry / subscription per
//! (subject, object) pair, one ingredient line per (recipe, ingredient)
//! pair) are enforced with UNIQUE indexes at this layer; application-level
//! checks only exist to produce clean error messages.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
