// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! String normalization for the reference relevance scorer.

use std::borrow::Cow;

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Folded form of `text` for term matching: lowercase, accents removed, one
/// space between words. `"Café   Router"` and `"cafe router"` normalize alike.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for word in strip_accents(text).split_whitespace() {
        if !folded.is_empty() {
            folded.push(' ');
        }
        folded.extend(word.chars().flat_map(char::to_lowercase));
    }
    folded
}

/// Decompose to NFD and drop the combining marks, leaving base letters.
#[cfg(feature = "unicode-normalization")]
fn strip_accents(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.nfd().filter(|&c| !is_combining_mark(c)).collect())
}

#[cfg(not(feature = "unicode-normalization"))]
fn strip_accents(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

/// Split normalized text into terms.
///
/// Package paths break on their separators, so `golang.org/x/net/http2`
/// yields `golang`, `org`, `x`, `net`, `http2`.
pub fn terms(value: &str) -> Vec<String> {
    normalize(value)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
