// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML frontmatter parsing for vault Markdown files.
//!
//! A frontmatter block is the leading run of lines delimited by lines
//! containing only `---`. Anything that is not a valid block (missing file,
//! no delimiters, broken YAML) degrades to an empty mapping with the whole
//! file as body; callers never have to handle a parse failure.

use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed frontmatter plus the remaining Markdown body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub fields: BTreeMap<String, Value>,
    pub body: String,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fetch a field as a string. Scalars are stringified; lists and maps
    /// return `None`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Fetch a field as a list of strings. A scalar string becomes a
    /// one-element list.
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Sequence(seq)) => seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Render the fields back to a YAML block between `---` delimiters,
    /// followed by the body.
    pub fn render(&self) -> String {
        if self.fields.is_empty() {
            return self.body.clone();
        }
        let yaml = serde_yaml::to_string(&self.fields).unwrap_or_default();
        format!("---\n{}---\n{}", yaml, self.body)
    }
}

/// Parse frontmatter out of file text.
pub fn parse(text: &str) -> Frontmatter {
    let Some(rest) = strip_delimiter_line(text) else {
        return Frontmatter {
            fields: BTreeMap::new(),
            body: text.to_string(),
        };
    };

    // Find the closing delimiter line within the remainder.
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']).trim() == "---" {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return match serde_yaml::from_str::<BTreeMap<String, Value>>(block) {
                Ok(fields) => Frontmatter {
                    fields,
                    body: body.to_string(),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "frontmatter block is not valid YAML, treating as body");
                    Frontmatter {
                        fields: BTreeMap::new(),
                        body: text.to_string(),
                    }
                }
            };
        }
        offset += line.len();
    }

    // Opening delimiter without a closing one: not a frontmatter block.
    Frontmatter {
        fields: BTreeMap::new(),
        body: text.to_string(),
    }
}

/// Read and parse a file. A missing or unreadable file yields an empty
/// result rather than an error.
pub fn read_file(path: &Path) -> Frontmatter {
    match std::fs::read_to_string(path) {
        Ok(text) => parse(&text),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file for frontmatter");
            }
            Frontmatter::default()
        }
    }
}

/// If the first line is a `---` delimiter, return the text after it.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let first_end = text.find('\n')?;
    let first = text[..first_end].trim_end_matches('\r');
    if first.trim() == "---" {
        Some(&text[first_end + 1..])
    } else {
        None
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
