//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate blob encoding and SQLite details from the service layer.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Missing ids are reported through return values, never as errors.

pub mod kv_store;
pub mod task_store;
