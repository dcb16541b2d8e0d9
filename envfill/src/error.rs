use std::{error::Error as StdError, fmt};

use super::BoxError;

/// A single field that could not be decoded.
#[derive(Debug)]
pub struct ParseErrorItem {
    key: String,
    value: String,
    cause: BoxError,
}

impl ParseErrorItem {
    /// The resolved lookup key of the failing field.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The raw value the key held in the source.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Why the value could not be decoded.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.cause
    }
}

impl fmt::Display for ParseErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse env {}: {}", self.key, self.cause)
    }
}

impl StdError for ParseErrorItem {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

/// Every decode failure of one population call, in field declaration order.
///
/// This error is only constructed when at least one field failed, so it never
/// holds zero items. Fields that decoded fine are populated regardless of the
/// failures listed here.
///
/// # Display Format
///
/// ```text
/// 2 errors occurred:
/// 	* cannot parse env PORT: invalid digit found in string
/// 	* cannot parse env TIMEOUT: invalid duration "soon"
///
/// ```
#[derive(Debug)]
pub struct ParseError {
    items: Vec<ParseErrorItem>,
}

impl ParseError {
    pub fn items(&self) -> &[ParseErrorItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ParseErrorItem> {
        self.items
    }

    /// Returns the item recorded for `key`, if that key failed.
    pub fn get(&self, key: &str) -> Option<&ParseErrorItem> {
        self.items.iter().find(|item| item.key == key)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.items.len())?;

        for item in &self.items {
            write!(f, "\n\t* {item}")?;
        }
        write!(f, "\n\n")
    }
}

impl StdError for ParseError {}

impl IntoIterator for ParseError {
    type Item = ParseErrorItem;
    type IntoIter = std::vec::IntoIter<ParseErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseError {
    type Item = &'a ParseErrorItem;
    type IntoIter = std::slice::Iter<'a, ParseErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Accumulates failures over one scan of a record's fields.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    items: Vec<ParseErrorItem>,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, key: &str, value: String, cause: BoxError) {
        self.items.push(ParseErrorItem {
            key: key.to_owned(),
            value,
            cause,
        });
    }

    pub(crate) fn has_failures(&self) -> bool {
        !self.items.is_empty()
    }

    pub(crate) fn finish(self) -> Result<(), ParseError> {
        if self.has_failures() {
            Err(ParseError { items: self.items })
        } else {
            Ok(())
        }
    }
}
