//! Dictionary-based correction of recognized text.
//!
//! OCR models make the same mistakes over and over. A correction dictionary
//! maps a misrecognized token to what it should have been; the mapping is
//! loaded once and applied token by token.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};

/// Read-only token replacement table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionDictionary {
    entries: HashMap<String, String>,
}

impl CorrectionDictionary {
    /// Load a dictionary from a flat JSON object of string to string.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&contents).map_err(|source| Error::ResourceParseError {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(entries = entries.len(), "Loaded correction dictionary");
        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every whitespace-delimited token that has an entry.
    ///
    /// Matching is exact and case-sensitive. Lines are kept; runs of
    /// whitespace inside a line collapse to a single space.
    pub fn correct(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| {
                line.split_whitespace()
                    .map(|token| match self.get(token) {
                        Some(fixed) => {
                            trace!(token, fixed, "Corrected token");
                            fixed
                        }
                        None => token,
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Correct `text` with `dictionary`.
pub fn correct(text: &str, dictionary: &CorrectionDictionary) -> String {
    dictionary.correct(text)
}
