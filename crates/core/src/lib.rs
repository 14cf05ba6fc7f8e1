//! dexlens-core
//!
//! Core library for working with decompiled Android programs.
//!
//! This crate owns the two naming dialects (binary descriptors such as
//! `Lcom/example/Foo;` and source names such as `com.example.Foo`), the
//! structural AIDL detector and implementation resolver, and the program
//! instance wrapper that exposes string-keyed lookups to frontends.
//!
//! Loading and decompiling programs is delegated to a [`provider::ProgramProvider`];
//! everything else here is pure logic over the graph it returns.

pub mod aidl;
pub mod config;
pub mod error;
pub mod instance;
pub mod model;
pub mod provider;
pub mod search;
pub mod signature;

pub use error::{CoreError, CoreResult};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
