//! ActiveRecord-style page objects over a version-controlled wiki.
//!
//! A [`Page`] is built with an explicit [`Wiki`] backend and [`Config`],
//! given a name, content, [`Format`] and [`Commit`] metadata, and then saved,
//! updated, deleted or looked up. Storage, history and rendering stay in the
//! backend; this crate maps attribute assignment and method calls onto it and
//! records a human-readable message for every failure.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wikirec::{Commit, Config, Format, Page};
//!
//! let mut page = Page::new(wiki, Arc::new(Config::load(None)?));
//! page.set_name("Home");
//! page.set_content("# Welcome");
//! page.set_format(Format::Markdown);
//! page.set_commit(Commit::new("page created", "Jane Doe", "jane@example.com"));
//! page.try_save()?;
//! ```

mod adapter;
mod error;
mod page;

pub use adapter::{PageAdapter, PageChanges};
pub use error::{Dependency, PageError};
pub use page::{Page, PageBuilder};

pub use wikirec_config::{Config, MessageKey, Messages};
pub use wikirec_wiki::{Commit, Format, PageRecord, Version, Wiki, WikiError};
