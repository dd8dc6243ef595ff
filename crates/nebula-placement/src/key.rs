//! Namespaced content keys.
//!
//! Every piece of placeable content is addressed by a [`ContentKey`] of the
//! form `namespace:path`. Names written without a namespace pick up the
//! default one, so `oak_bees` and `nebula:oak_bees` are the same key.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Namespace applied to names that do not carry one.
pub const DEFAULT_NAMESPACE: &str = "nebula";

/// Errors produced when parsing a [`ContentKey`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The name was empty.
    #[error("content key is empty")]
    Empty,
    /// The namespace is empty or contains characters outside `[a-z0-9_.-]`.
    #[error("invalid namespace in content key: {0:?}")]
    InvalidNamespace(String),
    /// The path is empty or contains characters outside `[a-z0-9_.-/]`.
    #[error("invalid path in content key: {0:?}")]
    InvalidPath(String),
}

/// Namespaced identifier of a piece of generatable content.
///
/// Immutable. Equality is exact string equality on the normalized
/// `namespace:path` form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey {
    full: String,
    split: usize,
}

impl ContentKey {
    /// Parses a name, applying [`DEFAULT_NAMESPACE`] when none is given.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] if the name is empty or contains characters
    /// that are not allowed in a namespace or path.
    pub fn parse(name: &str) -> Result<Self, KeyError> {
        Self::parse_in(name, DEFAULT_NAMESPACE)
    }

    /// Parses a name, applying `default_namespace` when none is given.
    ///
    /// # Errors
    ///
    /// Same as [`ContentKey::parse`].
    pub fn parse_in(name: &str, default_namespace: &str) -> Result<Self, KeyError> {
        if name.is_empty() {
            return Err(KeyError::Empty);
        }
        let (namespace, path) = name.split_once(':').unwrap_or((default_namespace, name));
        if namespace.is_empty() || !namespace.chars().all(is_namespace_char) {
            return Err(KeyError::InvalidNamespace(namespace.to_string()));
        }
        if path.is_empty() || !path.chars().all(is_path_char) {
            return Err(KeyError::InvalidPath(path.to_string()));
        }
        Ok(Self {
            full: format!("{namespace}:{path}"),
            split: namespace.len(),
        })
    }

    /// Key in the default namespace for builtin content.
    ///
    /// Builtin paths are written in code and expected to be valid; this is
    /// checked in debug builds only.
    pub fn builtin(path: &str) -> Self {
        debug_assert!(
            !path.is_empty() && path.chars().all(is_path_char),
            "invalid builtin content path {path:?}"
        );
        Self {
            full: format!("{DEFAULT_NAMESPACE}:{path}"),
            split: DEFAULT_NAMESPACE.len(),
        }
    }

    /// The namespace part (before the `:`).
    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    /// The path part (after the `:`).
    pub fn path(&self) -> &str {
        &self.full[self.split + 1..]
    }

    /// The full `namespace:path` string.
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for ContentKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}
