//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository layer for database operations
//! - Seeding of default settings and multipliers

pub mod migrations;
pub mod repo;
pub mod seed;

pub use migrations::init_db;
pub use repo::{is_unique_violation, EventLogRow, Repository};
pub use seed::{seed_defaults, SeedReport};
