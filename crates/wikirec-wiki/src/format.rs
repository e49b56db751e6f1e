//! Markup formats a wiki page can be written in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Markup language of a page.
///
/// Deserializes through [`FromStr`], so serialized tags accept the same
/// aliases and casing as [`str::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Format {
    Asciidoc,
    Creole,
    Markdown,
    Org,
    Pod,
    Rdoc,
    Rst,
    Tex,
    Textile,
    Mediawiki,
}

/// Error returned when a format tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown page format: {0}")]
pub struct UnknownFormat(pub String);

impl Format {
    /// All formats, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Asciidoc,
        Self::Creole,
        Self::Markdown,
        Self::Org,
        Self::Pod,
        Self::Rdoc,
        Self::Rst,
        Self::Tex,
        Self::Textile,
        Self::Mediawiki,
    ];

    /// Canonical tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asciidoc => "asciidoc",
            Self::Creole => "creole",
            Self::Markdown => "markdown",
            Self::Org => "org",
            Self::Pod => "pod",
            Self::Rdoc => "rdoc",
            Self::Rst => "rst",
            Self::Tex => "tex",
            Self::Textile => "textile",
            Self::Mediawiki => "mediawiki",
        }
    }

    /// File extension used when the page is stored in a repository.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Asciidoc => "asciidoc",
            Self::Creole => "creole",
            Self::Markdown => "md",
            Self::Org => "org",
            Self::Pod => "pod",
            Self::Rdoc => "rdoc",
            Self::Rst => "rest",
            Self::Tex => "tex",
            Self::Textile => "textile",
            Self::Mediawiki => "mediawiki",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_start_matches(':').to_ascii_lowercase();
        let format = match tag.as_str() {
            "md" => Self::Markdown,
            "wiki" => Self::Mediawiki,
            "latex" => Self::Tex,
            _ => Self::ALL
                .into_iter()
                .find(|format| format.as_str() == tag)
                .ok_or_else(|| UnknownFormat(s.to_owned()))?,
        };
        Ok(format)
    }
}

impl TryFrom<String> for Format {
    type Error = UnknownFormat;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_tags() {
        for format in Format::ALL {
            assert_eq!(format.as_str().parse::<Format>(), Ok(format));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("wiki".parse::<Format>(), Ok(Format::Mediawiki));
        assert_eq!("md".parse::<Format>(), Ok(Format::Markdown));
        assert_eq!("latex".parse::<Format>(), Ok(Format::Tex));
    }

    #[test]
    fn test_parse_symbol_style_and_case() {
        assert_eq!(":markdown".parse::<Format>(), Ok(Format::Markdown));
        assert_eq!("RDoc".parse::<Format>(), Ok(Format::Rdoc));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "docx".parse::<Format>().unwrap_err();

        assert_eq!(err, UnknownFormat("docx".to_owned()));
        assert_eq!(err.to_string(), "Unknown page format: docx");
    }

    #[test]
    fn test_display_uses_canonical_tag() {
        assert_eq!(Format::Mediawiki.to_string(), "mediawiki");
    }

    #[test]
    fn test_extension() {
        assert_eq!(Format::Markdown.extension(), "md");
        assert_eq!(Format::Rst.extension(), "rest");
    }

    #[test]
    fn test_serde_accepts_wiki_alias() {
        let format: Format = serde_json::from_str("\"wiki\"").unwrap();

        assert_eq!(format, Format::Mediawiki);
        assert_eq!(serde_json::to_string(&format).unwrap(), "\"mediawiki\"");
    }

    #[test]
    fn test_serde_matches_parse() {
        for (tag, expected) in [
            ("md", Format::Markdown),
            ("latex", Format::Tex),
            ("MARKDOWN", Format::Markdown),
            (":rdoc", Format::Rdoc),
        ] {
            let format: Format = serde_json::from_str(&format!("\"{tag}\"")).unwrap();
            assert_eq!(format, expected);
        }
    }

    #[test]
    fn test_serde_rejects_unknown() {
        let err = serde_json::from_str::<Format>("\"docx\"").unwrap_err();

        assert!(err.to_string().contains("Unknown page format: docx"));
    }
}
