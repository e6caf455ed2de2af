//! Content URI model and route matching.
//!
//! # Responsibility
//! - Parse and render `content://<authority>/<path>` identifiers.
//! - Classify a URI as the book collection or a single book.
//!
//! # Invariants
//! - Only the `content` scheme is accepted.
//! - `books/<id>` matches only when `<id>` is all ASCII digits and fits `i64`.

use crate::model::book::BookId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Default provider authority.
pub const DEFAULT_AUTHORITY: &str = "ru.kazakova_net.bookstore";
/// Path segment addressing the book collection.
pub const PATH_BOOKS: &str = "books";
pub const CONTENT_SCHEME: &str = "content";

const DIR_MIME_BASE: &str = "vnd.android.cursor.dir";
const ITEM_MIME_BASE: &str = "vnd.android.cursor.item";

/// Resource identifier: authority plus path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    authority: String,
    segments: Vec<String>,
}

impl ContentUri {
    pub fn new(authority: impl Into<String>, segments: Vec<String>) -> Self {
        Self {
            authority: authority.into(),
            segments,
        }
    }

    /// Collection URI, `content://<authority>/books`.
    pub fn books(authority: impl Into<String>) -> Self {
        Self::new(authority, vec![PATH_BOOKS.to_string()])
    }

    /// Returns a copy with `id` appended as the last path segment.
    pub fn with_appended_id(&self, id: BookId) -> Self {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Self {
            authority: self.authority.clone(),
            segments,
        }
    }

    /// Parses the last path segment as a numeric id.
    pub fn parse_id(&self) -> Option<BookId> {
        let last = self.segments.last()?;
        if last.is_empty() || !last.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        last.parse().ok()
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path without the leading slash, e.g. `books/3`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Returns whether a change to `other` concerns observers of `self`.
    ///
    /// Two URIs are related when they share an authority and one path is a
    /// prefix of the other.
    pub fn is_related(&self, other: &ContentUri) -> bool {
        if self.authority != other.authority {
            return false;
        }
        let shared = self.segments.len().min(other.segments.len());
        self.segments[..shared] == other.segments[..shared]
    }
}

impl Display for ContentUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{CONTENT_SCHEME}://{}", self.authority)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// URI parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriParseError {
    MissingScheme(String),
    UnsupportedScheme(String),
    EmptyAuthority(String),
}

impl Display for UriParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingScheme(value) => write!(f, "uri has no scheme: `{value}`"),
            Self::UnsupportedScheme(value) => write!(f, "unsupported uri scheme `{value}`"),
            Self::EmptyAuthority(value) => write!(f, "uri has no authority: `{value}`"),
        }
    }
}

impl Error for UriParseError {}

impl FromStr for ContentUri {
    type Err = UriParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| UriParseError::MissingScheme(trimmed.to_string()))?;
        if scheme != CONTENT_SCHEME {
            return Err(UriParseError::UnsupportedScheme(scheme.to_string()));
        }

        let mut parts = rest.split('/');
        let authority = parts.next().unwrap_or_default();
        if authority.is_empty() {
            return Err(UriParseError::EmptyAuthority(trimmed.to_string()));
        }
        let segments = parts
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self::new(authority, segments))
    }
}

/// Result of routing a URI against the provider's patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// `books`: every book.
    Books,
    /// `books/<id>`: one book.
    BookId(BookId),
}

impl UriMatch {
    /// MIME type describing the resource kind under `authority`.
    pub fn mime_type(self, authority: &str) -> String {
        match self {
            Self::Books => format!("{DIR_MIME_BASE}/{authority}/{PATH_BOOKS}"),
            Self::BookId(_) => format!("{ITEM_MIME_BASE}/{authority}/{PATH_BOOKS}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RouteKind {
    Books,
    BookId,
}

static ROUTES: Lazy<Vec<(Regex, RouteKind)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^books$").expect("valid books route"),
            RouteKind::Books,
        ),
        (
            Regex::new(r"^books/([0-9]+)$").expect("valid book id route"),
            RouteKind::BookId,
        ),
    ]
});

/// Routes `uri` for a provider serving `authority`.
///
/// Returns `None` for a foreign authority or an unknown path.
pub fn match_uri(authority: &str, uri: &ContentUri) -> Option<UriMatch> {
    if uri.authority() != authority {
        return None;
    }

    let path = uri.path();
    ROUTES.iter().find_map(|(pattern, kind)| {
        let captures = pattern.captures(&path)?;
        match kind {
            RouteKind::Books => Some(UriMatch::Books),
            RouteKind::BookId => captures
                .get(1)
                .and_then(|id| id.as_str().parse::<BookId>().ok())
                .map(UriMatch::BookId),
        }
    })
}
