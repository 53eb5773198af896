// ABOUTME: Parser for structured key=value parameter blobs
// ABOUTME: Comma separated pairs with optional double-quoted values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// One `key=value` entry of a params blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamPair {
    /// Key, trimmed
    pub key: String,
    /// Value, trimmed and unquoted; empty when the entry had no `=`
    pub value: String,
}

/// Split a params blob into ordered pairs
///
/// Entries are separated by commas outside double quotes. Whitespace around
/// keys, values and `=` is ignored and empty entries are skipped.
///
/// # Errors
///
/// Returns `InvalidInput` for an unterminated quote or an entry with an empty key
pub fn parse_params(raw: &str) -> AppResult<Vec<ParamPair>> {
    let mut pairs = Vec::new();
    let mut segment = String::new();
    let mut in_quotes = false;

    for ch in raw.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                segment.push(ch);
            }
            ',' if !in_quotes => {
                push_segment(&segment, &mut pairs)?;
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }
    if in_quotes {
        return Err(AppError::invalid_input("Unterminated quote in params value"));
    }
    push_segment(&segment, &mut pairs)?;
    Ok(pairs)
}

fn push_segment(segment: &str, pairs: &mut Vec<ParamPair>) -> AppResult<()> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Ok(());
    }
    let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::invalid_input(format!(
            "Params entry '{segment}' has no key"
        )));
    }
    pairs.push(ParamPair {
        key: unquote(key).to_owned(),
        value: unquote(value.trim()).to_owned(),
    });
    Ok(())
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}
