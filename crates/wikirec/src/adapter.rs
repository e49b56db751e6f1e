//! Low-level page adapter.
//!
//! [`PageAdapter`] exposes the wiki calls directly, without attribute
//! validation. It remembers the last page it created, updated or found, so
//! follow-up updates and deletes can omit the target.

use std::sync::Arc;

use wikirec_config::{Config, MessageKey};
use wikirec_wiki::{Commit, Format, PageRecord, Wiki};

use crate::error::PageError;

/// Changes to apply in [`PageAdapter::update_page`].
///
/// `None` fields keep the current page's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageChanges {
    pub name: Option<String>,
    pub format: Option<Format>,
    pub content: Option<String>,
}

impl PageChanges {
    /// Change the page name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the markup format.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Replace the page content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Direct access to wiki page operations.
pub struct PageAdapter {
    wiki: Arc<dyn Wiki>,
    options: Arc<Config>,
    current: Option<PageRecord>,
}

impl PageAdapter {
    /// Create an adapter with no current page.
    #[must_use]
    pub fn new(wiki: Arc<dyn Wiki>, options: Arc<Config>) -> Self {
        Self {
            wiki,
            options,
            current: None,
        }
    }

    /// Page touched by the last successful call.
    #[must_use]
    pub fn current(&self) -> Option<&PageRecord> {
        self.current.as_ref()
    }

    /// Create a page and make it current.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Wiki`] if the wiki rejects the write.
    pub fn new_page(
        &mut self,
        name: &str,
        content: &str,
        format: Format,
        commit: &Commit,
    ) -> Result<PageRecord, PageError> {
        let record = self.wiki.write_page(name, format, content, commit)?;
        self.current = Some(record.clone());
        Ok(record)
    }

    /// Apply `changes` to the current page and make the result current.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NoPageFetched`] without a current page and
    /// [`PageError::Wiki`] if the wiki rejects the update.
    pub fn update_page(
        &mut self,
        changes: PageChanges,
        commit: &Commit,
    ) -> Result<PageRecord, PageError> {
        let Some(page) = self.current.as_ref() else {
            return Err(PageError::NoPageFetched(
                self.options.messages.get(MessageKey::NoPageFetched).to_owned(),
            ));
        };

        let content = changes.content.as_deref().unwrap_or(page.raw_data());
        let record = self.wiki.update_page(
            page,
            changes.name.as_deref(),
            changes.format,
            content,
            commit,
        )?;
        self.current = Some(record.clone());
        Ok(record)
    }

    /// Delete `page`, or the current page if `None`, and return the id of
    /// the deleting commit.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NoPageFetched`] if neither is available and
    /// [`PageError::Wiki`] if the wiki rejects the delete.
    pub fn delete_page(
        &mut self,
        commit: &Commit,
        page: Option<&PageRecord>,
    ) -> Result<String, PageError> {
        let Some(target) = page.or(self.current.as_ref()) else {
            return Err(PageError::NoPageFetched(
                self.options.messages.get(MessageKey::NoPageFetched).to_owned(),
            ));
        };

        let id = self.wiki.delete_page(target, commit)?;
        if page.is_none() || self.current.as_ref() == Some(target) {
            self.current = None;
        }
        Ok(id)
    }

    /// Look up a page by name; a hit becomes the current page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Wiki`] if the lookup fails.
    pub fn find(&mut self, name: &str) -> Result<Option<PageRecord>, PageError> {
        let found = self.wiki.page(name)?;
        if let Some(record) = &found {
            self.current = Some(record.clone());
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wikirec_wiki::MemoryWiki;

    use super::*;

    fn commit() -> Commit {
        Commit::new("page action", "The Mosny", "mosny@zyg.li")
    }

    fn adapter() -> PageAdapter {
        PageAdapter::new(Arc::new(MemoryWiki::new()), Arc::new(Config::default()))
    }

    #[test]
    fn test_new_page_becomes_current() {
        let mut adapter = adapter();

        let page = adapter
            .new_page("testpage", "content", Format::Markdown, &commit())
            .unwrap();

        assert_eq!(page.name(), "testpage");
        assert_eq!(adapter.current(), Some(&page));
    }

    #[test]
    fn test_delete_given_page() {
        let mut adapter = adapter();
        let page = adapter
            .new_page("testpage", "content", Format::Markdown, &commit())
            .unwrap();

        let id = adapter.delete_page(&commit(), Some(&page)).unwrap();

        assert!(!id.is_empty());
        assert!(adapter.current().is_none());
    }

    #[test]
    fn test_delete_current_page() {
        let mut adapter = adapter();
        adapter
            .new_page("testpage", "content", Format::Markdown, &commit())
            .unwrap();

        adapter.delete_page(&commit(), None).unwrap();

        assert!(adapter.find("testpage").unwrap().is_none());
    }

    #[test]
    fn test_delete_other_page_keeps_current() {
        let mut adapter = adapter();
        let first = adapter
            .new_page("first", "1", Format::Markdown, &commit())
            .unwrap();
        let second = adapter
            .new_page("second", "2", Format::Markdown, &commit())
            .unwrap();

        adapter.delete_page(&commit(), Some(&first)).unwrap();

        assert_eq!(adapter.current(), Some(&second));
    }

    #[test]
    fn test_delete_given_current_page_clears_it() {
        let mut adapter = adapter();
        let page = adapter
            .new_page("testpage", "content", Format::Markdown, &commit())
            .unwrap();

        adapter.delete_page(&commit(), Some(&page.clone())).unwrap();

        assert!(adapter.current().is_none());
    }

    #[test]
    fn test_delete_without_page() {
        let mut adapter = adapter();

        let err = adapter.delete_page(&commit(), None).unwrap_err();

        assert!(matches!(err, PageError::NoPageFetched(_)));
    }

    #[test]
    fn test_update_sequence() {
        let mut adapter = adapter();
        adapter
            .new_page("testpage", "content", Format::Markdown, &commit())
            .unwrap();

        let page = adapter
            .update_page(
                PageChanges::default()
                    .name("test")
                    .format(Format::Markdown)
                    .content("content"),
                &commit(),
            )
            .unwrap();
        assert_eq!(page.name(), "test");

        let page = adapter
            .update_page(PageChanges::default().content("test"), &commit())
            .unwrap();
        assert_eq!(page.raw_data(), "test");
        assert_eq!(page.name(), "test");

        let page = adapter
            .update_page(PageChanges::default().name("renamed"), &commit())
            .unwrap();
        assert_eq!(page.name(), "renamed");
        assert_eq!(page.raw_data(), "test");

        let page = adapter
            .update_page(
                PageChanges {
                    format: Some("wiki".parse().unwrap()),
                    ..Default::default()
                },
                &commit(),
            )
            .unwrap();
        assert_eq!(page.format(), Format::Mediawiki);

        adapter.delete_page(&commit(), None).unwrap();
    }

    #[test]
    fn test_update_without_current_page() {
        let mut adapter = adapter();

        let err = adapter
            .update_page(PageChanges::default().content("x"), &commit())
            .unwrap_err();

        assert_eq!(err.to_string(), "no page fetched");
    }

    #[test]
    fn test_duplicate_new_page() {
        let mut adapter = adapter();
        adapter
            .new_page("testpage", "content", Format::Markdown, &commit())
            .unwrap();

        let err = adapter
            .new_page("testpage", "again", Format::Markdown, &commit())
            .unwrap_err();

        assert!(err.is_duplicate());
    }
}
