//! Reading bounty settings from free-text block metadata.
//!
//! Owners configure a bounty by writing `key=value;` pairs into a block's
//! custom text, e.g. `BountyOnKill=5000;`. The key may be followed by at most
//! one whitespace character before `=` and at most one after it; the value
//! runs to the next `;` on the same line and is trimmed. The first
//! well-formed occurrence wins.

/// Why a bounty could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BountyError {
    /// The key does not appear in a `key=value;` pair.
    #[error("no `{key}=...;` entry in block metadata")]
    Missing {
        /// The key searched for.
        key: String,
    },

    /// The key is present but its value is not an integer.
    #[error("`{key}` value {value:?} is not an integer: {source}")]
    Malformed {
        /// The key searched for.
        key: String,
        /// The raw (trimmed) value.
        value: String,
        /// The underlying parse error.
        source: std::num::ParseIntError,
    },
}

/// Find the raw value for `key`.
pub fn config_value<'a>(metadata: &'a str, key: &str) -> Option<&'a str> {
    if metadata.is_empty() || key.is_empty() {
        return None;
    }
    metadata
        .match_indices(key)
        .filter_map(|(idx, _)| metadata.get(idx.saturating_add(key.len())..))
        .find_map(value_after_key)
}

/// Parse `\s?=\s?(value);` at the start of `rest`.
fn value_after_key(rest: &str) -> Option<&str> {
    let rest = skip_one_whitespace(rest);
    let rest = rest.strip_prefix('=')?;
    let line = rest.split('\n').next()?;
    let (value, _) = line.split_once(';')?;
    // `\s?` before the value: a lone whitespace char is not a value on its own.
    let value = match value.chars().next() {
        Some(c) if c.is_whitespace() && value.len() > c.len_utf8() => {
            value.get(c.len_utf8()..)?
        }
        _ => value,
    };
    if value.is_empty() {
        return None;
    }
    Some(value.trim())
}

fn skip_one_whitespace(s: &str) -> &str {
    match s.chars().next() {
        Some(c) if c.is_whitespace() && c != '\n' => s.get(c.len_utf8()..).unwrap_or(s),
        _ => s,
    }
}

/// Read an integer bounty for `key` from block metadata.
///
/// # Errors
///
/// Returns [`BountyError::Missing`] if no entry exists, or
/// [`BountyError::Malformed`] if its value does not parse as an `i64`.
pub fn read_bounty(metadata: &str, key: &str) -> Result<i64, BountyError> {
    let value = config_value(metadata, key).ok_or_else(|| BountyError::Missing {
        key: key.to_owned(),
    })?;
    value.parse::<i64>().map_err(|source| BountyError::Malformed {
        key: key.to_owned(),
        value: value.to_owned(),
        source,
    })
}
