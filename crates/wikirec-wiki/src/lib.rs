//! Wiki backend abstraction for wikirec.
//!
//! This crate provides a [`Wiki`] trait for the version-controlled page store
//! that wikirec pages delegate to. Storage, history and markup rendering are
//! the backend's business; callers only see [`PageRecord`] snapshots.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Wiki`] trait with `write_page()`, `update_page()`, `delete_page()` and `page()`
//! - [`PageRecord`], [`Version`] and [`Commit`] value types
//! - [`Format`] for the supported markup languages
//! - [`MemoryWiki`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use wikirec_wiki::{Commit, Format, MemoryWiki, Wiki};
//!
//! let wiki = MemoryWiki::new();
//! let commit = Commit::new("page created", "Jane Doe", "jane@example.com");
//! wiki.write_page("Home", Format::Markdown, "# Welcome", &commit)?;
//! let home = wiki.page("Home")?.expect("page exists");
//! println!("{}", home.formatted_data());
//! ```

mod format;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod wiki;

pub use format::{Format, UnknownFormat};
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryWiki;
pub use wiki::{Commit, PageRecord, Version, Wiki, WikiError};
