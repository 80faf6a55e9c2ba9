// crates/roast-core/src/tags.rs
// ============================================================================
// Module: Tags and Tag Filter
// Description: Key/value tag sets and the selection expression language.
// Purpose: Select subsets of discovered test cases without side effects.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every test case carries a [`TagSet`] of key/value pairs such as
//! `type=smoke` or `net=yes`. A [`TagExpr`] is a conjunction of terms; a case
//! matches when its tag set is a superset of the expression. A [`TagFilter`]
//! OR-s several expressions together, and an empty filter selects everything.
//!
//! ### Grammar (informal)
//! - **Expression**: `term ("," term)*`
//! - **Term**: `key=value` (exact pair) or `key` (key present, any value)
//! - **Key / value**: one or more of `[A-Za-z0-9_.-]`
//!
//! Expressions are parsed up front so malformed input is reported before any
//! fixture is set up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted tag expression size in bytes.
const MAX_TAG_EXPR_BYTES: usize = 1024;

// ============================================================================
// SECTION: Tag Set
// ============================================================================

/// Ordered set of key/value tags attached to a test case.
///
/// # Invariants
/// - Each key maps to exactly one value; re-tagging a key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set with an additional tag.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a tag.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for a key, if tagged.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true when the set carries the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no tags are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing a tag expression.
///
/// # Invariants
/// - Positions are byte offsets into the original expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Expression was empty or whitespace.
    #[error("tag expression is empty")]
    EmptyExpression,
    /// Expression exceeded the size limit.
    #[error("tag expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual expression length in bytes.
        actual_bytes: usize,
    },
    /// A term between separators was empty.
    #[error("empty tag term at {position}")]
    EmptyTerm {
        /// Byte offset of the empty term.
        position: usize,
    },
    /// A term started with `=`.
    #[error("tag term at {position} is missing a key")]
    MissingKey {
        /// Byte offset of the term.
        position: usize,
    },
    /// A term ended with `=`.
    #[error("tag term `{key}` at {position} is missing a value")]
    MissingValue {
        /// Key of the incomplete term.
        key: String,
        /// Byte offset of the term.
        position: usize,
    },
    /// A character outside the tag alphabet was found.
    #[error("invalid character `{found}` in tag expression at {position}")]
    InvalidCharacter {
        /// Offending character.
        found: char,
        /// Byte offset of the character.
        position: usize,
    },
    /// The same key was constrained twice in one expression.
    #[error("tag key `{key}` appears more than once in one expression")]
    DuplicateKey {
        /// Repeated key.
        key: String,
    },
}

// ============================================================================
// SECTION: Tag Expressions
// ============================================================================

/// Single constraint inside a tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagTerm {
    /// The case must carry exactly this pair.
    Equals {
        /// Tag key.
        key: String,
        /// Required value.
        value: String,
    },
    /// The case must carry the key with any value.
    Present {
        /// Tag key.
        key: String,
    },
}

impl TagTerm {
    /// Returns the key constrained by this term.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Equals {
                key, ..
            }
            | Self::Present {
                key,
            } => key,
        }
    }

    /// Returns true when the tag set satisfies this term.
    #[must_use]
    pub fn matches(&self, tags: &TagSet) -> bool {
        match self {
            Self::Equals {
                key,
                value,
            } => tags.get(key) == Some(value.as_str()),
            Self::Present {
                key,
            } => tags.contains_key(key),
        }
    }
}

impl fmt::Display for TagTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals {
                key,
                value,
            } => write!(f, "{key}={value}"),
            Self::Present {
                key,
            } => f.write_str(key),
        }
    }
}

/// Conjunction of tag terms.
///
/// # Invariants
/// - Contains at least one term and no key more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExpr {
    /// Parsed terms in source order.
    terms: Vec<TagTerm>,
}

impl TagExpr {
    /// Parses a tag expression such as `type=smoke,net=yes`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] when the expression is empty, too large, or malformed.
    pub fn parse(input: &str) -> Result<Self, TagError> {
        if input.len() > MAX_TAG_EXPR_BYTES {
            return Err(TagError::InputTooLarge {
                max_bytes: MAX_TAG_EXPR_BYTES,
                actual_bytes: input.len(),
            });
        }
        if input.trim().is_empty() {
            return Err(TagError::EmptyExpression);
        }
        let mut terms = Vec::new();
        let mut seen = BTreeSet::new();
        let mut offset = 0;
        for raw in input.split(',') {
            let term = parse_term(raw, offset)?;
            if !seen.insert(term.key().to_string()) {
                return Err(TagError::DuplicateKey {
                    key: term.key().to_string(),
                });
            }
            terms.push(term);
            offset += raw.len() + 1;
        }
        Ok(Self {
            terms,
        })
    }

    /// Returns the parsed terms.
    #[must_use]
    pub fn terms(&self) -> &[TagTerm] {
        &self.terms
    }

    /// Returns true when every term is satisfied by the tag set.
    #[must_use]
    pub fn matches(&self, tags: &TagSet) -> bool {
        self.terms.iter().all(|term| term.matches(tags))
    }
}

impl FromStr for TagExpr {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TagExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

/// Parses one comma-separated term starting at `offset`.
fn parse_term(raw: &str, offset: usize) -> Result<TagTerm, TagError> {
    let leading = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    let start = offset + leading;
    if trimmed.is_empty() {
        return Err(TagError::EmptyTerm {
            position: start,
        });
    }
    match trimmed.split_once('=') {
        None => {
            validate_atom(trimmed, start)?;
            Ok(TagTerm::Present {
                key: trimmed.to_string(),
            })
        }
        Some((key, value)) => {
            let key = key.trim_end();
            if key.is_empty() {
                return Err(TagError::MissingKey {
                    position: start,
                });
            }
            validate_atom(key, start)?;
            let value_offset = start + trimmed.len() - value.len();
            let value_leading = value.len() - value.trim_start().len();
            let value = value.trim_start();
            if value.is_empty() {
                return Err(TagError::MissingValue {
                    key: key.to_string(),
                    position: start,
                });
            }
            validate_atom(value, value_offset + value_leading)?;
            Ok(TagTerm::Equals {
                key: key.to_string(),
                value: value.to_string(),
            })
        }
    }
}

/// Ensures a key or value only uses the tag alphabet.
fn validate_atom(atom: &str, offset: usize) -> Result<(), TagError> {
    match atom.char_indices().find(|(_, ch)| !is_tag_char(*ch)) {
        Some((index, found)) => Err(TagError::InvalidCharacter {
            found,
            position: offset + index,
        }),
        None => Ok(()),
    }
}

/// Returns true for characters allowed in tag keys and values.
const fn is_tag_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

// ============================================================================
// SECTION: Tag Filter
// ============================================================================

/// Disjunction of tag expressions used to select cases.
///
/// # Invariants
/// - An empty filter matches every tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    /// Expressions OR-ed together.
    exprs: Vec<TagExpr>,
}

impl TagFilter {
    /// Returns a filter that selects every case.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses each expression and combines them with OR semantics.
    ///
    /// # Errors
    ///
    /// Returns the first [`TagError`] encountered.
    pub fn parse<I, S>(exprs: I) -> Result<Self, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exprs =
            exprs.into_iter().map(|expr| TagExpr::parse(expr.as_ref())).collect::<Result<_, _>>()?;
        Ok(Self {
            exprs,
        })
    }

    /// Returns true when no expression restricts selection.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Returns the parsed expressions.
    #[must_use]
    pub fn exprs(&self) -> &[TagExpr] {
        &self.exprs
    }

    /// Returns true when the tag set matches at least one expression.
    #[must_use]
    pub fn matches(&self, tags: &TagSet) -> bool {
        self.exprs.is_empty() || self.exprs.iter().any(|expr| expr.matches(tags))
    }
}
