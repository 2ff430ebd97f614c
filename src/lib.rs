//! A Rust library for importing a LaunchBox game library into a shared,
//! deduplicated game catalog.
//!
//! # Description
//!
//! [LaunchBox](https://www.launchbox-app.com/) keeps its library as a set of
//! independently-authored on-disk sources: an emulator/platform registry,
//! one game catalog XML per platform, and free-form media directories whose
//! files are named after game titles by convention only. This crate
//! reconciles the three into normalized [`data::Game`] records: it validates
//! the registry's cross references, deduplicates games by canonical source
//! path, merges repeated metadata under field-specific rules, and attaches
//! loose image/music/video files to games through filename heuristics.
//!
//! The importer writes into a caller-owned [`data::SearchContext`], so its
//! results accumulate alongside whatever other import sources the caller
//! runs against the same context.
//!
//! # Usage
//!
//! ```no_run
//! use lib_launchbox_import::{
//!     data::{ImportSource, SearchContext},
//!     launchbox::LaunchboxImporter,
//! };
//!
//! let importer = LaunchboxImporter::new();
//! let mut ctx = SearchContext::new();
//!
//! if importer.is_detected() {
//!     importer.scan(&mut ctx);
//! }
//!
//! println!("imported {} games", ctx.games.len());
//! ```
//!
//! All failures inside a scan are non-fatal: a missing installation, a
//! malformed platform catalog or a dangling reference degrade to "fewer
//! games found" and are reported through [`tracing`] diagnostics.

pub mod data;
pub mod error;
pub mod launchbox;
mod macros;
mod parsers;
mod utils;
