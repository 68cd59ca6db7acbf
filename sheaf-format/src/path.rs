//! Root-to-leaf field paths

use crate::constants::DEFAULT_PATH_DELIMITER;
use crate::error::{Result, SheafError};
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

/// Ordered sequence of field names from the root to a specific field.
///
/// Two paths are equal only if every token matches; rule lookup relies on
/// this exact identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraversablePath {
    tokens: SmallVec<[String; 4]>,
}

impl TraversablePath {
    /// Create an empty path (the synthetic root)
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a delimited path string into a path.
    ///
    /// Empty tokens (doubled, leading or trailing delimiters) are rejected.
    pub fn parse(path: &str, delimiter: char) -> Result<Self> {
        if path.is_empty() {
            return Err(SheafError::InvalidPath {
                path: path.to_string(),
                reason: "path is empty".to_string(),
            });
        }

        let mut tokens = SmallVec::new();
        for token in path.split(delimiter) {
            if token.is_empty() {
                return Err(SheafError::InvalidPath {
                    path: path.to_string(),
                    reason: format!("empty token between '{}' delimiters", delimiter),
                });
            }
            tokens.push(token.to_string());
        }

        Ok(Self { tokens })
    }

    /// Split a dot-delimited path string
    pub fn parse_dotted(path: &str) -> Result<Self> {
        Self::parse(path, DEFAULT_PATH_DELIMITER)
    }

    /// Return a new path extended by one token
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Append a token in place
    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Remove the last token
    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop()
    }

    /// Last token, if any
    pub fn leaf_name(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Join the tokens with a delimiter
    pub fn join(&self, delimiter: char) -> String {
        let mut joined = String::new();
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                joined.push(delimiter);
            }
            joined.push_str(token);
        }
        joined
    }

    /// Dot-joined form
    pub fn dotted(&self) -> String {
        self.join(DEFAULT_PATH_DELIMITER)
    }
}

impl Deref for TraversablePath {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

impl<S: Into<String>> FromIterator<S> for TraversablePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for TraversablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl Serialize for TraversablePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted())
    }
}
