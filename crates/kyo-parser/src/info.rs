//! Fence info-string parsing.
//!
//! Accepted shapes:
//!
//! ```text
//! python
//! python name=setup timeout=30
//! python {name="load data", timeout=30, env=dev}
//! {.python name=setup}
//! ```
//!
//! The first word is the language tag. Everything after it is a list of
//! `key=value` directives, optionally wrapped in braces and separated by
//! whitespace or commas. Values may be double-quoted. When the whole info
//! string is braced, a leading `.class` token names the language.

use std::collections::BTreeMap;

/// Parsed fence metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceInfo {
    /// Lowercased language tag as written (not yet canonicalized).
    pub language: Option<String>,
    pub name: Option<String>,
    pub timeout_seconds: Option<u32>,
    /// Unrecognized directives. Bare keys map to `"true"`.
    pub attributes: BTreeMap<String, String>,
}

impl FenceInfo {
    #[must_use]
    pub fn parse(info: &str) -> Self {
        let info = info.trim();
        let split = info
            .find(|c: char| c.is_whitespace() || c == '{')
            .unwrap_or(info.len());
        let (mut tag, rest) = info.split_at(split);

        let rest = rest.trim();
        let mut rest = rest
            .strip_prefix('{')
            .map_or(rest, |inner| inner.strip_suffix('}').unwrap_or(inner));
        if tag.is_empty()
            && let Some(class) = rest.trim_start().strip_prefix('.')
        {
            let end = class.find(is_separator).unwrap_or(class.len());
            (tag, rest) = class.split_at(end);
        }

        let mut parsed = Self {
            language: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            ..Self::default()
        };

        for (key, value) in directives(rest) {
            match key.as_str() {
                "name" if !value.is_empty() => parsed.name = Some(value),
                "timeout" => match value.parse::<u32>() {
                    Ok(secs) if secs > 0 => parsed.timeout_seconds = Some(secs),
                    _ => {
                        tracing::debug!(%value, "ignoring invalid fence timeout");
                        parsed.attributes.insert(key, value);
                    }
                },
                _ => {
                    parsed.attributes.insert(key, value);
                }
            }
        }
        parsed
    }
}

const fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Split `key=value` pairs, honoring double quotes.
fn directives(input: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| is_separator(*c)).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| !is_separator(*c) && *c != '=') {
            key.push(c);
        }

        let mut value = String::new();
        if chars.next_if_eq(&'=').is_some() {
            if chars.next_if_eq(&'"').is_some() {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        other => value.push(other),
                    }
                }
            } else {
                while let Some(c) = chars.next_if(|c| !is_separator(*c)) {
                    value.push(c);
                }
            }
        } else {
            value.push_str("true");
        }

        if !key.is_empty() {
            out.push((key.to_ascii_lowercase(), value));
        }
    }
    out
}
