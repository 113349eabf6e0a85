//! Test utilities.
//!
//! This module provides:
//! - Test data factories with sensible defaults
//! - In-memory store and mail transport standing in for Postgres and the provider
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod factories;
mod mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use mocks::*;
