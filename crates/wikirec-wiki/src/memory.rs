//! In-memory wiki backend for testing.
//!
//! Provides [`MemoryWiki`] for exercising page logic without a repository.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use pulldown_cmark::{Options, Parser};
use sha2::{Digest, Sha256};

use crate::format::Format;
use crate::wiki::{Commit, PageRecord, Version, Wiki, WikiError};

/// In-memory wiki.
///
/// Pages are keyed by case-insensitive name. Every write, update and delete
/// advances a single linear history; commit ids are SHA-256 digests over the
/// parent id and the committed change, so identical operation sequences yield
/// identical ids.
///
/// # Example
///
/// ```ignore
/// use wikirec_wiki::{Format, MemoryWiki, Wiki};
///
/// let wiki = MemoryWiki::new().with_page("Home", Format::Markdown, "# Welcome");
/// let page = wiki.page("home").unwrap().unwrap();
/// assert_eq!(page.raw_data(), "# Welcome");
/// ```
#[derive(Debug, Default)]
pub struct MemoryWiki {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, StoredPage>,
    head: Option<String>,
}

#[derive(Debug)]
struct StoredPage {
    name: String,
    format: Format,
    content: String,
    /// Newest first.
    versions: Vec<Version>,
}

impl StoredPage {
    fn to_record(&self) -> PageRecord {
        PageRecord::new(
            self.name.clone(),
            self.format,
            self.content.clone(),
            render(self.format, &self.content),
            self.versions.clone(),
        )
    }
}

impl State {
    /// Record a commit on top of the current head.
    fn commit(&mut self, name: &str, format: Format, content: &str, commit: &Commit) -> Version {
        let mut hasher = Sha256::new();
        if let Some(parent) = &self.head {
            hasher.update(parent.as_bytes());
        }
        for part in [
            name,
            format.as_str(),
            content,
            commit.message.as_str(),
            commit.name.as_str(),
            commit.email.as_str(),
        ] {
            hasher.update([0u8]);
            hasher.update(part.as_bytes());
        }
        let id = hex::encode(hasher.finalize());
        self.head = Some(id.clone());

        Version {
            id,
            message: commit.message.clone(),
            author_name: commit.name.clone(),
            author_email: commit.email.clone(),
            authored_at: Utc::now(),
        }
    }
}

const BACKEND: &str = "Memory";

fn page_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<(), WikiError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(WikiError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Render page source to HTML.
///
/// Only Markdown is rendered; other markups are shown as escaped source.
fn render(format: Format, content: &str) -> String {
    match format {
        Format::Markdown => {
            let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
            let mut html = String::with_capacity(content.len() * 3 / 2);
            pulldown_cmark::html::push_html(&mut html, Parser::new_ext(content, options));
            html
        }
        other => format!(
            "<pre class=\"{other}\">{}</pre>",
            html_escape::encode_text(content)
        ),
    }
}

impl MemoryWiki {
    /// Create a new empty wiki.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page, committed by a fixed test author.
    #[must_use]
    pub fn with_page(self, name: &str, format: Format, content: &str) -> Self {
        let commit = Commit::new(format!("Create {name}"), "wikirec", "wikirec@localhost");
        if let Err(e) = self.write_page(name, format, content, &commit) {
            tracing::warn!(page = %name, error = %e, "Failed to seed page");
        }
        self
    }

    /// Number of pages currently stored.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.read().pages.len()
    }

    /// Id of the most recent commit.
    #[must_use]
    pub fn head(&self) -> Option<String> {
        self.read().head.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Wiki for MemoryWiki {
    fn write_page(
        &self,
        name: &str,
        format: Format,
        content: &str,
        commit: &Commit,
    ) -> Result<PageRecord, WikiError> {
        validate_name(name)?;
        let name = name.trim();
        let key = page_key(name);

        let mut state = self.write();
        if state.pages.contains_key(&key) {
            return Err(WikiError::DuplicatePage {
                name: name.to_owned(),
            });
        }

        let version = state.commit(name, format, content, commit);
        let stored = StoredPage {
            name: name.to_owned(),
            format,
            content: content.to_owned(),
            versions: vec![version],
        };
        let record = stored.to_record();
        state.pages.insert(key, stored);

        tracing::debug!(page = %name, %format, "Wrote page");
        Ok(record)
    }

    fn update_page(
        &self,
        page: &PageRecord,
        name: Option<&str>,
        format: Option<Format>,
        content: &str,
        commit: &Commit,
    ) -> Result<PageRecord, WikiError> {
        if let Some(name) = name {
            validate_name(name)?;
        }
        let old_key = page_key(page.name());

        let mut state = self.write();
        let (current_name, current_format) = state
            .pages
            .get(&old_key)
            .map(|stored| (stored.name.clone(), stored.format))
            .ok_or_else(|| WikiError::NotFound {
                name: page.name().to_owned(),
            })?;

        let new_name = name.map_or(current_name, |n| n.trim().to_owned());
        let new_key = page_key(&new_name);
        if new_key != old_key && state.pages.contains_key(&new_key) {
            return Err(WikiError::DuplicatePage { name: new_name });
        }
        let new_format = format.unwrap_or(current_format);

        let version = state.commit(&new_name, new_format, content, commit);
        let mut stored = state
            .pages
            .remove(&old_key)
            .ok_or_else(|| WikiError::NotFound {
                name: page.name().to_owned(),
            })?;
        stored.name = new_name;
        stored.format = new_format;
        stored.content = content.to_owned();
        stored.versions.insert(0, version);

        let record = stored.to_record();
        state.pages.insert(new_key, stored);

        tracing::debug!(page = %record.name(), format = %new_format, "Updated page");
        Ok(record)
    }

    fn delete_page(&self, page: &PageRecord, commit: &Commit) -> Result<String, WikiError> {
        let key = page_key(page.name());

        let mut state = self.write();
        let Some(stored) = state.pages.remove(&key) else {
            return Err(WikiError::NotFound {
                name: page.name().to_owned(),
            });
        };
        let version = state.commit(&stored.name, stored.format, "", commit);

        tracing::debug!(page = %stored.name, commit = %version.short_id(), "Deleted page");
        Ok(version.id)
    }

    fn page(&self, name: &str) -> Result<Option<PageRecord>, WikiError> {
        Ok(self.read().pages.get(&page_key(name)).map(StoredPage::to_record))
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
