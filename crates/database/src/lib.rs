//! # AMU Database Crate
//!
//! This crate is the application's interface to PostgreSQL: herds, treatment
//! entries and the medication catalog.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** All SQL lives here. The rest of the workspace sees
//!   `DbRepository` methods returning `core-types` structs.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a shared
//!   `PgPool`.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool creation and schema set-up.
//! - `DbRepository`: CRUD for entries and medications, herd lookup, demo seeding.
//! - `DbError`: The specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod repository;
pub mod seed;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
