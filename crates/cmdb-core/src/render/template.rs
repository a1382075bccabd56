//! Positional template interpolation
//!
//! Templates use `{}` (auto-numbered) or `{N}` (explicit) placeholders;
//! `{{` and `}}` produce literal braces. Mixing the two numbering styles is
//! rejected.

use serde_json::Value;

use crate::errors::{CmdbError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(usize),
}

/// A parsed template ready to be filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string
    ///
    /// # Errors
    ///
    /// Returns `Interpolation` for unbalanced braces, non-numeric placeholder
    /// content, or mixed auto/explicit numbering.
    pub fn parse(source: &str) -> Result<Self> {
        let fail = |reason: &str| CmdbError::Interpolation {
            template: source.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        let mut next_auto = 0usize;
        let mut saw_auto = false;
        let mut saw_explicit = false;

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut content = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => content.push(ch),
                            None => return Err(fail("unclosed placeholder")),
                        }
                    }
                    let index = if content.is_empty() {
                        saw_auto = true;
                        next_auto += 1;
                        next_auto - 1
                    } else {
                        saw_explicit = true;
                        content
                            .trim()
                            .parse::<usize>()
                            .map_err(|_| fail("placeholder is not a position"))?
                    };
                    if saw_auto && saw_explicit {
                        return Err(fail("mixed automatic and explicit numbering"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(index));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(fail("single '}' encountered")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of placeholder occurrences in the template
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder(_)))
            .count()
    }

    /// Substitute placeholders with `values`; surplus values are ignored
    ///
    /// # Errors
    ///
    /// Returns `Interpolation` when a placeholder position has no value.
    pub fn fill<S: AsRef<str>>(&self, values: &[S]) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(index) => {
                    let value = values.get(*index).ok_or_else(|| CmdbError::Interpolation {
                        template: self.source.clone(),
                        reason: format!("no value for placeholder {}", index),
                    })?;
                    out.push_str(value.as_ref());
                }
            }
        }
        Ok(out)
    }
}

/// Parse and fill in one step
///
/// # Errors
///
/// Returns `Interpolation` if the template is malformed or short of values.
pub fn interpolate<S: AsRef<str>>(template: &str, values: &[S]) -> Result<String> {
    Template::parse(template)?.fill(values)
}

/// Text form of a stored value as it appears in lines and links
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
