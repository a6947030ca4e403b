//! Core components of the `quotefeed-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`QfClient`] and its builder.
//! - The primary [`QfError`] type.
//! - Shared data models like [`BarFrame`] and [`Snapshot`].
//! - The collaborator seams ([`Transport`], [`SymbolResolver`]) and the [`SampleIndex`].

/// The main client (`QfClient`), builder, retry and transport configuration.
pub mod client;
/// The primary error type (`QfError`) for the crate.
pub mod error;
/// The externally supplied sampling index and its frequency.
pub mod index;
/// Shared data models used across the fetch modules.
pub mod models;
/// Collaborator traits for transport and symbol resolution.
pub mod services;

#[cfg(feature = "dataframe")]
pub mod dataframe;

#[cfg(feature = "test-mode")]
pub(crate) mod fixtures;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::QfClient`
pub use client::{QfClient, QfClientBuilder};
pub use error::QfError;
pub use index::{Frequency, SampleIndex};
pub use models::{Bar, BarFrame, FieldValue, QuoteRecord, Snapshot, SnapshotSource};
pub use services::{BoxFuture, IdentityResolver, SymbolResolver, Transport};
