//! Travel advice edition lifecycle: domain types, validation, publish
//! payloads and the lifecycle service.
//!
//! This crate has zero internal deps so it can be used by the database
//! layer, the HTTP API and the batch worker alike.

pub mod action;
pub mod changes;
pub mod clock;
pub mod country;
pub mod edition;
pub mod error;
pub mod lifecycle;
pub mod markup;
pub mod memory;
pub mod parts;
pub mod payload;
pub mod publishing;
pub mod store;
pub mod tasks;
pub mod testing;
pub mod types;

pub use lifecycle::EditionLifecycle;
