//! # Core Application Logic
//!
//! This module contains Atlas's query layer.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • queries (entry pts)  │
//!                    │  • cache (memo, dedup)  │
//!                    │  • explore (filter/sort)│
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    CLI     │                          │    data    │
//!     │  (views)   │                          │ (upstream) │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`queries`]: `CountryQueries`, the entry points views bind to
//! - [`cache`]: `QueryCache` and `QueryKey`
//! - [`explore`]: the filter/sort pipeline behind the explore view
//! - [`format`]: number formatting for display
//! - [`config`]: settings and their override hierarchy

pub mod cache;
pub mod config;
pub mod explore;
pub mod format;
pub mod queries;
