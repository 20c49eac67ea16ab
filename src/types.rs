use std::collections::HashSet;

use serde::Serialize;

use crate::validator::ValidatedDomain;

/// Result of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Hostnames in order of first appearance, without repeats
    pub domains: Vec<String>,
    /// Registrable roots in order of first appearance, without repeats
    pub root_domains: Vec<String>,
}

impl Extraction {
    /// Check if nothing was found
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Order-preserving de-duplicating collector for validated domains.
///
/// Hostnames and roots are de-duplicated independently; an entry keeps the
/// position of its first occurrence.
#[derive(Debug, Default)]
pub(crate) struct ResultSet<'a> {
    seen_domains: HashSet<&'a str>,
    seen_roots: HashSet<&'a str>,
    extraction: Extraction,
}

impl<'a> ResultSet<'a> {
    pub fn insert(&mut self, validated: ValidatedDomain<'a>) {
        if self.seen_domains.insert(validated.domain) {
            self.extraction.domains.push(validated.domain.to_string());
        }
        if self.seen_roots.insert(validated.root) {
            self.extraction.root_domains.push(validated.root.to_string());
        }
    }

    pub fn finish(self) -> Extraction {
        self.extraction
    }
}
