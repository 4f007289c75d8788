//! Backend for the agency marketing site
//!
//! Accepts public contact-form submissions and exposes a small admin API,
//! guarded by bearer-token sessions for a single configured administrator,
//! for reviewing, flagging and deleting them.

pub mod config;
pub mod contacts;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod validation;

pub use state::AppState;
