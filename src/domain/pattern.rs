//! Path patterns
//!
//! A path pattern is a template such as `{qual_nb_points}/{fid}.csv`. Each
//! `{key}` placeholder is replaced by the display form of the metadata value
//! stored under `key`; `{{` and `}}` stand for literal braces. Keys are taken
//! verbatim, so `{ fid }` looks up ` fid `.
//!
//! ```
//! use tsexport::domain::{Metadata, PathPattern};
//!
//! let pattern = PathPattern::parse("{qual_nb_points}/{fid}.csv").unwrap();
//! let metadata = Metadata::new().with("fid", "FID_TS_1").with("qual_nb_points", 14i64);
//! assert_eq!(pattern.render(&metadata).unwrap(), "14/FID_TS_1.csv");
//! ```

use super::metadata::Metadata;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

/// A placeholder key absent from the metadata being rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub key: String,
}

impl PathPattern {
    /// Parses a pattern
    ///
    /// # Errors
    ///
    /// Returns a description of the problem for blank patterns, unbalanced
    /// braces and empty placeholders.
    pub fn parse(source: impl Into<String>) -> Result<Self, String> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err("Path pattern cannot be empty".to_string());
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut key = String::new();
                    let mut closed = false;
                    for (_, k) in chars.by_ref() {
                        match k {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(format!(
                                    "Nested '{{' in placeholder starting at offset {pos} of pattern '{source}'"
                                ))
                            }
                            _ => key.push(k),
                        }
                    }
                    if !closed {
                        return Err(format!(
                            "Unterminated placeholder at offset {pos} of pattern '{source}'"
                        ));
                    }
                    if key.is_empty() {
                        return Err(format!(
                            "Empty placeholder at offset {pos} of pattern '{source}'"
                        ));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(key));
                }
                '}' => {
                    return Err(format!(
                        "Single '}}' at offset {pos} of pattern '{source}' (use '}}}}' for a literal brace)"
                    ))
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { source, segments })
    }

    /// The pattern as written by the user
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder keys in order of appearance, duplicates included
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(key) => Some(key.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the pattern references `key`
    pub fn references(&self, key: &str) -> bool {
        self.placeholders().any(|k| k == key)
    }

    /// Substitutes every placeholder with its metadata value
    ///
    /// # Errors
    ///
    /// Returns the first placeholder key that is absent from `metadata`.
    pub fn render(&self, metadata: &Metadata) -> Result<String, MissingKey> {
        let mut rendered = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(key) => match metadata.get(key) {
                    Some(value) => rendered.push_str(&value.to_string()),
                    None => return Err(MissingKey { key: key.clone() }),
                },
            }
        }
        Ok(rendered)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for PathPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PathPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.source.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PathPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = String::deserialize(deserializer)?;
        PathPattern::parse(source).map_err(serde::de::Error::custom)
    }
}
