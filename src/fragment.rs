//! Fragment module: the parameterized filter pieces produced by translators.
//!
//! Templates use `?` as their only placeholder. A `?` inside a single-quoted SQL
//! literal (such as a quoted JSON key) or a double-quoted identifier is text,
//! not a placeholder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("template `{template}` has {placeholders} placeholders but {arguments} arguments")]
    ArgumentMismatch {
        template: String,
        placeholders: usize,
        arguments: usize,
    },
    #[error("template `{0}` ends inside a quoted region")]
    UnterminatedQuote(String),
}

/// A value bound to one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlParam {
    Text(String),
    /// Serializer output, bound as `jsonb` by the composer.
    Json(String),
}

/// An immutable (template, arguments) pair.
///
/// Every fragment, however built, has exactly one argument per placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFragment")]
pub struct FilterFragment {
    template: String,
    arguments: Vec<SqlParam>,
}

#[derive(Deserialize)]
struct RawFragment {
    template: String,
    arguments: Vec<SqlParam>,
}

impl TryFrom<RawFragment> for FilterFragment {
    type Error = FragmentError;

    fn try_from(raw: RawFragment) -> Result<Self, Self::Error> {
        FilterFragment::new(raw.template, raw.arguments)
    }
}

impl FilterFragment {
    /// `arguments` are bound to the template's placeholders left to right.
    pub fn new(template: impl Into<String>, arguments: Vec<SqlParam>) -> Result<Self, FragmentError> {
        let template = template.into();
        let scan = scan_placeholders(&template);
        if scan.open_quote.is_some() {
            return Err(FragmentError::UnterminatedQuote(template));
        }
        if scan.positions.len() != arguments.len() {
            return Err(FragmentError::ArgumentMismatch {
                placeholders: scan.positions.len(),
                arguments: arguments.len(),
                template,
            });
        }
        Ok(Self { template, arguments })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn arguments(&self) -> &[SqlParam] {
        &self.arguments
    }

    pub fn into_parts(self) -> (String, Vec<SqlParam>) {
        (self.template, self.arguments)
    }

    /// Appends the template to `buf` with placeholders numbered `$next_idx`,
    /// `$next_idx + 1`, ... Returns the next unused index.
    pub fn write_sql(&self, buf: &mut String, next_idx: usize) -> usize {
        let positions = scan_placeholders(&self.template).positions;
        let mut last = 0;
        for (offset, &pos) in positions.iter().enumerate() {
            buf.push_str(&self.template[last..pos]);
            buf.push('$');
            buf.push_str(&(next_idx + offset).to_string());
            last = pos + 1;
        }
        buf.push_str(&self.template[last..]);
        next_idx + positions.len()
    }

    /// Joins fragments with `AND`, each parenthesized, keeping argument order.
    /// An empty input yields the always-true filter.
    pub fn and_all<I>(fragments: I) -> FilterFragment
    where
        I: IntoIterator<Item = FilterFragment>,
    {
        let mut parts = Vec::new();
        let mut arguments = Vec::new();
        for fragment in fragments {
            let (template, args) = fragment.into_parts();
            parts.push(format!("({})", template));
            arguments.extend(args);
        }
        let template = if parts.is_empty() {
            "TRUE".to_string()
        } else {
            parts.join(" AND ")
        };
        // Each part is balanced and consistent, so the concatenation is too.
        FilterFragment { template, arguments }
    }
}

struct PlaceholderScan {
    /// Byte offsets of each `?` placeholder.
    positions: Vec<usize>,
    /// The quote character still open at the end of the template, if any.
    open_quote: Option<char>,
}

fn scan_placeholders(template: &str) -> PlaceholderScan {
    let mut positions = Vec::new();
    let mut open_quote = None;
    for (i, c) in template.char_indices() {
        match (open_quote, c) {
            (None, '\'' | '"') => open_quote = Some(c),
            (Some(q), c) if c == q => open_quote = None,
            (None, '?') => positions.push(i),
            _ => {}
        }
    }
    PlaceholderScan { positions, open_quote }
}

/// Counts `?` placeholders outside quoted literals and identifiers.
pub fn placeholder_count(template: &str) -> usize {
    scan_placeholders(template).positions.len()
}
