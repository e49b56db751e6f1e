//! Wiki trait, page records and error types.
//!
//! Provides the core [`Wiki`] trait for writing, updating, deleting and
//! looking up pages in a version-controlled wiki, along with [`WikiError`]
//! for failures reported by a backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::Format;

/// Commit metadata attached to every write, update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit message.
    pub message: String,
    /// Author name.
    pub name: String,
    /// Author email.
    pub email: String,
}

impl Commit {
    /// Create commit metadata.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One entry of a page's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Commit id (lowercase hex).
    pub id: String,
    /// Commit message.
    pub message: String,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
    /// When the commit was made.
    pub authored_at: DateTime<Utc>,
}

impl Version {
    /// Abbreviated commit id (first seven characters).
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }
}

/// A page as fetched from a [`Wiki`].
///
/// Records are snapshots: they do not change when the backend does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    name: String,
    format: Format,
    raw_data: String,
    formatted_data: String,
    versions: Vec<Version>,
}

impl PageRecord {
    /// Create a record. `versions` must be ordered newest first.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        format: Format,
        raw_data: impl Into<String>,
        formatted_data: impl Into<String>,
        versions: Vec<Version>,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            raw_data: raw_data.into(),
            formatted_data: formatted_data.into(),
            versions,
        }
    }

    /// Page name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Markup format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Unrendered page source.
    #[must_use]
    pub fn raw_data(&self) -> &str {
        &self.raw_data
    }

    /// Page rendered to HTML by the backend.
    #[must_use]
    pub fn formatted_data(&self) -> &str {
        &self.formatted_data
    }

    /// Page history, newest first.
    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Most recent version, if the backend tracks history.
    #[must_use]
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.first()
    }
}

/// Wiki backend error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WikiError {
    /// A page with the same name already exists.
    #[error("Cannot write {name}, found a page with the same name")]
    DuplicatePage {
        /// Name that was attempted.
        name: String,
    },
    /// The page does not exist (any more).
    #[error("Page not found: {name}")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },
    /// The backend cannot store a page under this name.
    #[error("Invalid page name: {name:?}")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
    /// Backend-specific failure.
    #[error("[{backend}] {message}")]
    Backend {
        /// Backend identifier (e.g., "Memory").
        backend: &'static str,
        /// Failure description.
        message: String,
    },
}

impl WikiError {
    /// Whether this is a duplicate-page conflict.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicatePage { .. })
    }
}

/// Version-controlled wiki storage.
///
/// Every mutating call creates a commit carrying the given [`Commit`]
/// metadata. Implementations own storage, history and rendering.
pub trait Wiki: Send + Sync {
    /// Create a new page.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::DuplicatePage`] if a page with this name exists.
    fn write_page(
        &self,
        name: &str,
        format: Format,
        content: &str,
        commit: &Commit,
    ) -> Result<PageRecord, WikiError>;

    /// Replace an existing page's content, optionally renaming it or
    /// changing its format. `None` keeps the current value.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::NotFound`] if `page` no longer exists, or
    /// [`WikiError::DuplicatePage`] if a rename collides with another page.
    fn update_page(
        &self,
        page: &PageRecord,
        name: Option<&str>,
        format: Option<Format>,
        content: &str,
        commit: &Commit,
    ) -> Result<PageRecord, WikiError>;

    /// Delete a page and return the id of the deleting commit.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::NotFound`] if `page` no longer exists.
    fn delete_page(&self, page: &PageRecord, commit: &Commit) -> Result<String, WikiError>;

    /// Look up a page by name.
    ///
    /// Returns `Ok(None)` when no page has this name.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError`] if the backend cannot be read.
    fn page(&self, name: &str) -> Result<Option<PageRecord>, WikiError>;

    /// Backend identifier used in logs.
    fn backend_name(&self) -> &'static str {
        "Wiki"
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn version(id: &str) -> Version {
        Version {
            id: id.to_owned(),
            message: "page action".to_owned(),
            author_name: "The Mosny".to_owned(),
            author_email: "mosny@zyg.li".to_owned(),
            authored_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_commit_deserialize_from_json() {
        let commit: Commit = serde_json::from_str(
            r#"{"message": "page created", "name": "Jane Doe", "email": "jane@example.com"}"#,
        )
        .unwrap();

        assert_eq!(commit, Commit::new("page created", "Jane Doe", "jane@example.com"));
    }

    #[test]
    fn test_commit_missing_field_is_rejected() {
        let result = serde_json::from_str::<Commit>(r#"{"message": "page created"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_page_record_accessors() {
        let record = PageRecord::new(
            "Home",
            Format::Markdown,
            "# Home",
            "<h1>Home</h1>\n",
            vec![version("b".repeat(64).as_str()), version("a".repeat(64).as_str())],
        );

        assert_eq!(record.name(), "Home");
        assert_eq!(record.format(), Format::Markdown);
        assert_eq!(record.raw_data(), "# Home");
        assert_eq!(record.formatted_data(), "<h1>Home</h1>\n");
        assert_eq!(record.versions().len(), 2);
        assert_eq!(record.latest_version().unwrap().id, "b".repeat(64));
    }

    #[test]
    fn test_version_short_id() {
        assert_eq!(version("0123456789abcdef").short_id(), "0123456");
        assert_eq!(version("abc").short_id(), "abc");
    }

    #[test]
    fn test_wiki_error_display() {
        let err = WikiError::DuplicatePage {
            name: "Home".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot write Home, found a page with the same name"
        );
        assert!(err.is_duplicate());

        let err = WikiError::Backend {
            backend: "Memory",
            message: "lock poisoned".to_owned(),
        };
        assert_eq!(err.to_string(), "[Memory] lock poisoned");
        assert!(!err.is_duplicate());
    }

    #[test]
    fn test_wiki_error_is_send_sync() {
        static_assertions::assert_impl_all!(WikiError: Send, Sync);
    }
}
