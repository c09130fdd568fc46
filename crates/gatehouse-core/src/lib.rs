//! Core types, services, and trait definitions for Gatehouse.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and the push channel are reached only through the [`store::GateStore`]
//! and [`notify::Notifier`] traits, both injected at construction.

pub mod announcement;
pub mod broadcast;
pub mod directory;
pub mod error;
pub mod notify;
pub mod registry;
pub mod store;
pub mod user;
pub mod visitor;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
