//! Public suffix table.
//!
//! Suffixes are stored as complete lowercased strings in a HashSet, so a
//! lookup is an ordered trial of trailing label joins, longest first. No
//! trie is needed: every trial is a single O(1) probe.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use super::data::{MULTI_LABEL_SUFFIXES, SINGLE_LABEL_SUFFIXES};
use crate::error::{ExtractError, Result};

static BUILTIN: Lazy<SuffixTable> = Lazy::new(|| {
    SuffixTable::from_suffixes(
        SINGLE_LABEL_SUFFIXES
            .iter()
            .chain(MULTI_LABEL_SUFFIXES.iter())
            .copied(),
    )
});

/// Immutable set of known public suffixes
#[derive(Debug, Clone, Default)]
pub struct SuffixTable {
    suffixes: HashSet<String>,
    /// Label count of the longest entry; longer trailing joins are never probed
    max_labels: usize,
}

impl SuffixTable {
    /// The built-in table, built once on first use and shared for the
    /// lifetime of the process.
    pub fn builtin() -> &'static SuffixTable {
        &BUILTIN
    }

    /// Build a table from suffix strings.
    ///
    /// Entries are trimmed and lowercased, and leading dots are stripped
    /// (".com.cn" and "com.cn" are the same entry). Empty entries are ignored.
    pub fn from_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for suffix in suffixes {
            let suffix = suffix.as_ref().trim().trim_start_matches('.');
            if suffix.is_empty() {
                continue;
            }
            let suffix = suffix.to_ascii_lowercase();
            table.max_labels = table.max_labels.max(suffix.split('.').count());
            table.suffixes.insert(suffix);
        }
        log::debug!(
            "built suffix table with {} entries (longest {} labels)",
            table.suffixes.len(),
            table.max_labels
        );
        table
    }

    /// Parse a table from public-suffix-list style text.
    ///
    /// `//` comments and blank lines are skipped and only the first
    /// whitespace-delimited field of a line is used. Wildcard (`*.`) and
    /// exception (`!`) rules are rejected because the table only matches
    /// suffixes verbatim.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (line_num, line) in text.lines().enumerate() {
            let line_num = line_num + 1;

            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let Some(entry) = line.split_whitespace().next() else {
                continue;
            };

            if entry.starts_with('!') || entry.contains('*') {
                return Err(ExtractError::SuffixList {
                    line: line_num,
                    message: format!("wildcard and exception rules are not supported: {}", entry),
                });
            }

            if !entry.is_ascii() {
                log::debug!("skipping non-ASCII suffix at line {}: {}", line_num, entry);
                continue;
            }

            if entry.trim_start_matches('.').split('.').any(str::is_empty) {
                return Err(ExtractError::SuffixList {
                    line: line_num,
                    message: format!("empty label in suffix: {}", entry),
                });
            }

            entries.push(entry);
        }

        Ok(Self::from_suffixes(entries))
    }

    /// Parse a table from a public-suffix-list style file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!(
                "Failed to read suffix list '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text)
    }

    /// Check whether `suffix` is an entry of the table (ASCII case-insensitive).
    pub fn contains(&self, suffix: &str) -> bool {
        self.suffixes.contains(&*lowercase(suffix))
    }

    /// Find the longest known suffix of `host`.
    ///
    /// Returns the byte offset in `host` where the matched suffix starts, so
    /// `Some(0)` means the whole host is itself a public suffix. Trailing
    /// joins are tried from the longest to the shortest and the first hit
    /// wins.
    pub fn longest_match(&self, host: &str) -> Option<usize> {
        if host.is_empty() || self.suffixes.is_empty() {
            return None;
        }

        let lowered = lowercase(host);
        let host: &str = &lowered;

        // Start offsets of every trailing join, longest first
        let starts: Vec<usize> = std::iter::once(0)
            .chain(host.match_indices('.').map(|(i, _)| i + 1))
            .collect();
        let skip = starts.len().saturating_sub(self.max_labels);

        starts
            .into_iter()
            .skip(skip)
            .find(|&start| self.suffixes.contains(&host[start..]))
    }

    /// Number of suffixes in the table
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

fn lowercase(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(s.to_ascii_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}
