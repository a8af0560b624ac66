//! Version resolution and download bookkeeping
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Poller    │────▶│   Dotted    │────▶│   History   │
//! │ (versions)  │     │ (max, norm) │     │  (ledger)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │   Fetcher   │
//!                                         │ (packages)  │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`dotted`]: Dotted numeric versions, normalization and maximum
//! - [`history`]: Flat-file ledger of downloaded versions
//! - [`source`]: Traits for polling versions and fetching packages
//! - [`sources`]: HTTP implementations of those traits
//! - [`error`]: Error types for history, polling and downloads

pub mod dotted;
pub mod error;
pub mod history;
pub mod source;
pub mod sources;
