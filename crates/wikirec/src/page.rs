//! ActiveRecord-style page object.
//!
//! A [`Page`] holds the attributes of one wiki page (name, content, format,
//! commit metadata) and maps `save`/`update`/`delete`/`find` onto a [`Wiki`]
//! backend. Every operation comes in two flavours:
//!
//! - `save()`, `update()`, `delete()`, `find()` return `bool`/`Option` and
//!   record the failure message, readable through [`Page::error`]
//! - `try_save()`, `try_update()`, `try_delete()` return `Result<_, PageError>`
//!
//! Both flavours record the same message, so they can be mixed freely.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use wikirec_config::{Config, MessageKey};
use wikirec_wiki::{Commit, Format, PageRecord, Version, Wiki, WikiError};

use crate::error::{Dependency, PageError};

/// A wiki page with ActiveRecord-like persistence methods.
pub struct Page {
    wiki: Arc<dyn Wiki>,
    options: Arc<Config>,
    name: Option<String>,
    content: Option<String>,
    format: Option<Format>,
    commit: Option<Commit>,
    persisted: bool,
    error: Option<String>,
    loaded_page: Option<PageRecord>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("wiki", &self.wiki.backend_name())
            .field("name", &self.name)
            .field("format", &self.format)
            .field("commit", &self.commit)
            .field("persisted", &self.persisted)
            .field("error", &self.error)
            .field("loaded", &self.loaded_page.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Page`].
///
/// Both collaborators are required; attributes are applied in key order
/// through the same setters as [`Page::assign_attribute`].
#[derive(Default)]
pub struct PageBuilder {
    wiki: Option<Arc<dyn Wiki>>,
    config: Option<Arc<Config>>,
    attributes: Map<String, Value>,
}

impl PageBuilder {
    /// Set the wiki backend.
    #[must_use]
    pub fn wiki(mut self, wiki: Arc<dyn Wiki>) -> Self {
        self.wiki = Some(wiki);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    /// Add one attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a mapping of attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Build the page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Config`] if the wiki or configuration is missing,
    /// and [`PageError::UnknownAttribute`] / [`PageError::InvalidAttribute`]
    /// if an attribute cannot be applied.
    pub fn build(self) -> Result<Page, PageError> {
        let wiki = self.wiki.ok_or(PageError::Config(Dependency::Wiki))?;
        let config = self.config.ok_or(PageError::Config(Dependency::Config))?;

        let mut page = Page::new(wiki, config);
        page.assign_attributes(&self.attributes)?;
        Ok(page)
    }
}

impl Page {
    /// Create an empty page bound to a wiki and configuration.
    #[must_use]
    pub fn new(wiki: Arc<dyn Wiki>, options: Arc<Config>) -> Self {
        Self {
            wiki,
            options,
            name: None,
            content: None,
            format: None,
            commit: None,
            persisted: false,
            error: None,
            loaded_page: None,
        }
    }

    /// Start building a page.
    #[must_use]
    pub fn builder() -> PageBuilder {
        PageBuilder::default()
    }

    /// Build a page from attributes and save it.
    ///
    /// # Errors
    ///
    /// Returns the construction error, or the error of [`Page::try_save`].
    pub fn create(
        wiki: Arc<dyn Wiki>,
        options: Arc<Config>,
        attributes: Map<String, Value>,
    ) -> Result<Self, PageError> {
        let mut page = Self::builder()
            .wiki(wiki)
            .config(options)
            .attributes(attributes)
            .build()?;
        page.try_save()?;
        Ok(page)
    }

    /// Load an existing page by name.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotFound`] if `name` is empty (without querying
    /// the wiki) or there is no such page, and [`PageError::Wiki`] if the
    /// lookup itself fails.
    pub fn find_by_name(
        wiki: Arc<dyn Wiki>,
        options: Arc<Config>,
        name: &str,
    ) -> Result<Self, PageError> {
        let mut page = Self::new(wiki, options);
        if name.is_empty() {
            return Err(PageError::NotFound(page.message(MessageKey::NoPageFound)));
        }
        let found = page.lookup(name)?;
        match found {
            Some(_) => Ok(page),
            None => Err(PageError::NotFound(page.message(MessageKey::NoPageFound))),
        }
    }

    /// Page name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the page name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Page source text.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Set the page source text.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Markup format.
    #[must_use]
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Set the markup format.
    pub fn set_format(&mut self, format: Format) {
        self.format = Some(format);
    }

    /// Commit metadata for the next write.
    #[must_use]
    pub fn commit(&self) -> Option<&Commit> {
        self.commit.as_ref()
    }

    /// Set commit metadata for the next write.
    pub fn set_commit(&mut self, commit: Commit) {
        self.commit = Some(commit);
    }

    /// Apply a single attribute by name.
    ///
    /// `null` clears the attribute. A `commit` value that is not an object
    /// with `message`, `name` and `email` is stored as absent, which
    /// [`Page::is_valid`] then reports.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAttribute`] for names other than `name`,
    /// `content`, `format` and `commit`, and [`PageError::InvalidAttribute`]
    /// for non-string names, contents or formats and unknown format tags.
    pub fn assign_attribute(&mut self, name: &str, value: &Value) -> Result<(), PageError> {
        match name {
            "name" => self.name = string_attribute(name, value)?,
            "content" => self.content = string_attribute(name, value)?,
            "format" => {
                self.format = string_attribute(name, value)?
                    .map(|tag| tag.parse::<Format>())
                    .transpose()
                    .map_err(|e| PageError::InvalidAttribute {
                        name: name.to_owned(),
                        message: e.to_string(),
                    })?;
            }
            "commit" => {
                self.commit = serde_json::from_value(value.clone()).ok();
                if self.commit.is_none() && !value.is_null() {
                    tracing::debug!(value = %value, "Commit attribute is not a commit record");
                }
            }
            _ => return Err(PageError::UnknownAttribute(name.to_owned())),
        }
        Ok(())
    }

    /// Apply a mapping of attributes, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`Page::assign_attribute`].
    pub fn assign_attributes(&mut self, attributes: &Map<String, Value>) -> Result<(), PageError> {
        for (name, value) in attributes {
            self.assign_attribute(name, value)?;
        }
        Ok(())
    }

    /// Whether a save through this page has written to the wiki.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Last recorded error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Configuration this page reads its messages from.
    #[must_use]
    pub fn options(&self) -> &Config {
        &self.options
    }

    /// Wiki backend.
    #[must_use]
    pub fn wiki(&self) -> &Arc<dyn Wiki> {
        &self.wiki
    }

    /// Record fetched by the last successful `find` or update.
    #[must_use]
    pub fn loaded_page(&self) -> Option<&PageRecord> {
        self.loaded_page.as_ref()
    }

    /// URL parameter for this page: its name, once it exists in the wiki.
    #[must_use]
    pub fn to_param(&self) -> Option<&str> {
        if self.persisted || self.loaded_page.is_some() {
            self.name()
        } else {
            None
        }
    }

    /// Check that name, commit and format are set.
    ///
    /// Conditions are checked in that order and the first failure is
    /// recorded. Content is not checked.
    pub fn is_valid(&mut self) -> bool {
        self.validated().is_ok()
    }

    fn validated(&mut self) -> Result<(String, Format, Commit), PageError> {
        let Some(name) = self.name.clone().filter(|name| !name.is_empty()) else {
            return Err(PageError::Invalid(self.record(MessageKey::NameNotSetOrNil)));
        };
        let Some(commit) = self.commit.clone() else {
            return Err(PageError::Invalid(self.record(MessageKey::CommitMustBeGiven)));
        };
        let Some(format) = self.format else {
            return Err(PageError::Invalid(self.record(MessageKey::FormatNotSet)));
        };
        Ok((name, format, commit))
    }

    /// Write this page to the wiki as a new page.
    ///
    /// Returns `false` if the wiki rejects the write. When validation fails
    /// nothing is written and the result follows
    /// `compat.invalid_save_returns_true` (default `true`); check
    /// [`Page::error`] or [`Page::is_persisted`] to tell a skipped save apart.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(_) => true,
            Err(PageError::Invalid(_)) => self.options.compat.invalid_save_returns_true,
            Err(_) => false,
        }
    }

    /// Write this page to the wiki as a new page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Invalid`] if validation fails (nothing is
    /// written) and [`PageError::Wiki`] if the wiki rejects the write, e.g.
    /// because a page with this name exists.
    pub fn try_save(&mut self) -> Result<PageRecord, PageError> {
        let (name, format, commit) = self.validated()?;
        let content = self.content.as_deref().unwrap_or_default();

        tracing::debug!(page = %name, %format, "Writing page");
        match self.wiki.write_page(&name, format, content, &commit) {
            Ok(record) => {
                tracing::info!(page = %name, "Page saved");
                self.persisted = true;
                self.error = None;
                Ok(record)
            }
            Err(e) => Err(self.record_wiki_error(&name, e)),
        }
    }

    /// Replace the loaded page's content.
    ///
    /// `name` and `format`, when given, overwrite the page's attributes first
    /// and are sent along as a rename or format change. Returns `false` and
    /// records a message if `content` or `commit` is missing, if no page was
    /// loaded, or if the wiki rejects the update.
    pub fn update(
        &mut self,
        content: Option<&str>,
        commit: Option<&Commit>,
        name: Option<&str>,
        format: Option<Format>,
    ) -> bool {
        self.try_update(content, commit, name, format).is_ok()
    }

    /// Replace the loaded page's content.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::MissingArgument`] if `content` or `commit` is
    /// missing, [`PageError::NoPageFetched`] if no page was loaded, and
    /// [`PageError::Wiki`] if the wiki rejects the update.
    pub fn try_update(
        &mut self,
        content: Option<&str>,
        commit: Option<&Commit>,
        name: Option<&str>,
        format: Option<Format>,
    ) -> Result<PageRecord, PageError> {
        if let Some(name) = name {
            self.name = Some(name.to_owned());
        }
        if let Some(format) = format {
            self.format = Some(format);
        }
        let (Some(content), Some(commit)) = (content, commit) else {
            return Err(PageError::MissingArgument(
                self.record(MessageKey::CommitNotEmptyAndContentNotEmpty),
            ));
        };
        let Some(page) = self.loaded_page.as_ref() else {
            return Err(PageError::NoPageFetched(
                self.record(MessageKey::NoPageFetched),
            ));
        };

        let target = page.name().to_owned();
        tracing::debug!(page = %target, rename = ?self.name, "Updating page");
        let result = self
            .wiki
            .update_page(page, self.name.as_deref(), self.format, content, commit);

        match result {
            Ok(record) => {
                tracing::info!(page = %record.name(), "Page updated");
                self.name = Some(record.name().to_owned());
                self.format = Some(record.format());
                self.content = Some(content.to_owned());
                self.loaded_page = Some(record.clone());
                self.error = None;
                Ok(record)
            }
            Err(e) => Err(self.record_wiki_error(&target, e)),
        }
    }

    /// Delete the loaded page from the wiki.
    ///
    /// Returns `false` and records a message if `commit` is missing, if no
    /// page was loaded, or if the wiki rejects the delete. The persisted flag
    /// is left as it is.
    pub fn delete(&mut self, commit: Option<&Commit>) -> bool {
        self.try_delete(commit).is_ok()
    }

    /// Delete the loaded page and return the id of the deleting commit.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::MissingArgument`] if `commit` is missing,
    /// [`PageError::NoPageFetched`] if no page was loaded, and
    /// [`PageError::Wiki`] if the wiki rejects the delete.
    pub fn try_delete(&mut self, commit: Option<&Commit>) -> Result<String, PageError> {
        let Some(commit) = commit else {
            return Err(PageError::MissingArgument(
                self.record(MessageKey::CommitMustBeGiven),
            ));
        };
        let Some(page) = self.loaded_page.as_ref() else {
            return Err(PageError::NoPageFetched(
                self.record(MessageKey::NoPageFetched),
            ));
        };

        let target = page.name().to_owned();
        tracing::debug!(page = %target, "Deleting page");
        match self.wiki.delete_page(page, commit) {
            Ok(id) => {
                tracing::info!(page = %target, commit = %id, "Page deleted");
                self.loaded_page = None;
                self.error = None;
                Ok(id)
            }
            Err(e) => Err(self.record_wiki_error(&target, e)),
        }
    }

    /// Load a page by name.
    ///
    /// Returns `None` without contacting the wiki if `name` is empty. If the
    /// wiki has no such page, records the "no page found" message. On a hit,
    /// the page's name and format are taken from the record.
    pub fn find(&mut self, name: &str) -> Option<PageRecord> {
        if name.is_empty() {
            return None;
        }
        match self.lookup(name) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(page = %name, error = %e, "Page lookup failed");
                None
            }
        }
    }

    fn lookup(&mut self, name: &str) -> Result<Option<PageRecord>, PageError> {
        tracing::debug!(page = %name, "Looking up page");
        let found = match self.wiki.page(name) {
            Ok(found) => found,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let Some(record) = found else {
            self.record(MessageKey::NoPageFound);
            return Ok(None);
        };
        self.name = Some(record.name().to_owned());
        self.format = Some(record.format());
        self.loaded_page = Some(record.clone());
        self.error = None;
        Ok(Some(record))
    }

    /// Source text of the loaded page.
    ///
    /// Returns `None` and records "no page fetched" if nothing was loaded.
    pub fn raw_data(&mut self) -> Option<&str> {
        if self.ensure_loaded() {
            self.loaded_page.as_ref().map(PageRecord::raw_data)
        } else {
            None
        }
    }

    /// Rendered HTML of the loaded page.
    ///
    /// Returns `None` and records "no page fetched" if nothing was loaded.
    pub fn formatted_data(&mut self) -> Option<&str> {
        if self.ensure_loaded() {
            self.loaded_page.as_ref().map(PageRecord::formatted_data)
        } else {
            None
        }
    }

    /// History of the loaded page, newest first.
    ///
    /// Returns `None` and records "no page fetched" if nothing was loaded.
    pub fn versions(&mut self) -> Option<&[Version]> {
        if self.ensure_loaded() {
            self.loaded_page.as_ref().map(PageRecord::versions)
        } else {
            None
        }
    }

    fn ensure_loaded(&mut self) -> bool {
        if self.loaded_page.is_some() {
            return true;
        }
        self.record(MessageKey::NoPageFetched);
        false
    }

    fn message(&self, key: MessageKey) -> String {
        self.options.messages.get(key).to_owned()
    }

    /// Record the configured message for `key` and return it.
    fn record(&mut self, key: MessageKey) -> String {
        let message = self.message(key);
        self.error = Some(message.clone());
        message
    }

    fn record_wiki_error(&mut self, page: &str, error: WikiError) -> PageError {
        tracing::warn!(
            page = %page,
            backend = self.wiki.backend_name(),
            error = %error,
            "Wiki rejected page operation"
        );
        self.error = Some(error.to_string());
        PageError::Wiki(error)
    }
}

/// Read a string-or-null attribute value.
fn string_attribute(name: &str, value: &Value) -> Result<Option<String>, PageError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(PageError::InvalidAttribute {
            name: name.to_owned(),
            message: format!("expected a string, got {other}"),
        }),
    }
}
