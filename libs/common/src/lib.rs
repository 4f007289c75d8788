//! Common library for the agency site backend
//!
//! This crate provides the storage plumbing shared by the site services:
//! PostgreSQL pooling, the Redis client wrapper, the flat-file JSON store
//! and the error type all of them report through.

pub mod cache;
pub mod database;
pub mod error;
pub mod file_store;

pub use error::{StorageError, StorageResult};
