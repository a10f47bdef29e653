//! Core domain types and shared logic for folio.
//!
//! This crate defines the data model used across all other crates:
//! - Document bodies and asset reference extraction
//! - Reference set differencing
//! - Asset kinds, statuses and scopes
//! - Lifecycle planning for document writes
//! - Configuration and the injectable clock

pub mod asset;
pub mod body;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod refs;

pub use asset::{AssetKind, AssetScope, AssetStatus};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use lifecycle::{AssetPlan, AssetRef};
pub use refs::RefDiff;
