//! Extractor module.
//!
//! Runs the decode, scan and validate pipeline over a text blob and collects
//! the distinct hostnames and registrable roots in order of first appearance.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decode::{self, DEFAULT_MAX_PASSES};
use crate::error::{ExtractError, Result};
use crate::scanner::Scanner;
use crate::suffix::SuffixTable;
use crate::types::{Extraction, ResultSet};
use crate::validator::{self, ValidatedDomain};

/// Upper bound accepted for `max_decode_passes`
pub const MAX_DECODE_PASSES_LIMIT: usize = 16;

/// Extractor options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorOptions {
    /// Run the recovery decoder before scanning
    pub decode: bool,
    /// Upper bound on decode passes
    pub max_decode_passes: usize,
    /// Reject roots that look like minified-code property accesses
    pub noise_filter: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            decode: true,
            max_decode_passes: DEFAULT_MAX_PASSES,
            noise_filter: false,
        }
    }
}

impl ExtractorOptions {
    /// Create new extractor options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable recovery decoding.
    pub fn with_decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Set the decode pass bound, clamped to `1..=MAX_DECODE_PASSES_LIMIT`.
    pub fn with_max_decode_passes(mut self, passes: usize) -> Self {
        self.max_decode_passes = passes.clamp(1, MAX_DECODE_PASSES_LIMIT);
        self
    }

    /// Enable or disable the code-noise filter.
    pub fn with_noise_filter(mut self, enabled: bool) -> Self {
        self.noise_filter = enabled;
        self
    }

    /// Load options from JSON. Missing fields take their default value.
    pub fn from_json(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!(
                "Failed to read options file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_DECODE_PASSES_LIMIT).contains(&self.max_decode_passes) {
            return Err(ExtractError::Config(format!(
                "max_decode_passes must be between 1 and {}, got {}",
                MAX_DECODE_PASSES_LIMIT, self.max_decode_passes
            )));
        }
        Ok(())
    }

    fn passes(&self) -> usize {
        self.max_decode_passes.clamp(1, MAX_DECODE_PASSES_LIMIT)
    }
}

/// Domain extractor bound to a suffix table.
///
/// Holds no mutable state; one instance can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct DomainExtractor<'t> {
    table: &'t SuffixTable,
    options: ExtractorOptions,
}

impl Default for DomainExtractor<'static> {
    fn default() -> Self {
        Self::new(SuffixTable::builtin(), ExtractorOptions::default())
    }
}

impl<'t> DomainExtractor<'t> {
    /// Create an extractor over `table`.
    pub fn new(table: &'t SuffixTable, options: ExtractorOptions) -> Self {
        Self { table, options }
    }

    /// The suffix table in use
    pub fn table(&self) -> &'t SuffixTable {
        self.table
    }

    /// The options in use
    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Extract hostnames and their registrable roots from `input`.
    pub fn extract(&self, input: impl AsRef<[u8]>) -> Extraction {
        let input = input.as_ref();

        let (text, passes) = if self.options.decode {
            decode::recover(input, self.options.passes())
        } else {
            (Cow::Borrowed(input), 0)
        };

        let mut results = ResultSet::default();
        let mut candidates = 0usize;
        for token in Scanner::new(&text) {
            candidates += 1;
            if let Some(validated) = self.validate(token.text) {
                results.insert(validated);
            }
        }
        let extraction = results.finish();

        tracing::trace!(
            bytes = input.len(),
            passes,
            candidates,
            domains = extraction.domains.len(),
            roots = extraction.root_domains.len(),
            "extracted domains"
        );

        extraction
    }

    /// Ordered, de-duplicated hostnames found in `input`.
    pub fn extract_domains(&self, input: impl AsRef<[u8]>) -> Vec<String> {
        self.extract(input).domains
    }

    /// Ordered, de-duplicated hostnames plus their registrable roots.
    pub fn extract_domains_with_roots(&self, input: impl AsRef<[u8]>) -> (Vec<String>, Vec<String>) {
        let extraction = self.extract(input);
        (extraction.domains, extraction.root_domains)
    }

    /// Ordered, de-duplicated registrable roots found in `input`.
    pub fn extract_root_domains(&self, input: impl AsRef<[u8]>) -> Vec<String> {
        self.extract(input).root_domains
    }

    /// Run only the recovery decoder.
    ///
    /// Always decodes, even when the `decode` option is off.
    pub fn try_decode(&self, input: impl AsRef<[u8]>) -> String {
        let (decoded, _) = decode::recover(input.as_ref(), self.options.passes());
        String::from_utf8_lossy(&decoded).into_owned()
    }

    /// Registrable root of a single hostname.
    ///
    /// Leading and trailing dots are ignored. A hostname that does not
    /// validate is returned as given (minus those dots).
    pub fn root_domain(&self, host: &str) -> String {
        let host = host.trim_matches('.');
        match self.validate(host) {
            Some(validated) => validated.root.to_string(),
            None => host.to_string(),
        }
    }

    /// Check whether a single hostname validates as a domain.
    pub fn has_domain_suffix(&self, host: &str) -> bool {
        self.validate(host).is_some()
    }

    fn validate<'a>(&self, token: &'a str) -> Option<ValidatedDomain<'a>> {
        if self.options.noise_filter {
            validator::validate_strict(token, self.table)
        } else {
            validator::validate(token, self.table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExtractorOptions::default();
        assert!(options.decode);
        assert_eq!(options.max_decode_passes, DEFAULT_MAX_PASSES);
        assert!(!options.noise_filter);
    }

    #[test]
    fn test_options_builder() {
        let options = ExtractorOptions::new()
            .with_decode(false)
            .with_max_decode_passes(0)
            .with_noise_filter(true);
        assert!(!options.decode);
        assert_eq!(options.max_decode_passes, 1);
        assert!(options.noise_filter);

        let options = ExtractorOptions::new().with_max_decode_passes(1000);
        assert_eq!(options.max_decode_passes, MAX_DECODE_PASSES_LIMIT);
    }

    #[test]
    fn test_options_from_json() {
        let options = ExtractorOptions::from_json(r#"{"noise_filter": true}"#).unwrap();
        assert!(options.decode);
        assert!(options.noise_filter);
        assert_eq!(options.max_decode_passes, DEFAULT_MAX_PASSES);
    }

    #[test]
    fn test_options_from_json_rejects_bad_passes() {
        let err = ExtractorOptions::from_json(r#"{"max_decode_passes": 0}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));

        let err = ExtractorOptions::from_json(r#"{"max_decode_passes": 99}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn test_options_from_json_malformed() {
        let err = ExtractorOptions::from_json("{decode").unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
    }

    #[test]
    fn test_options_from_missing_file() {
        let err = ExtractorOptions::from_file("/nonexistent/options.json").unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn test_extract_with_custom_table() {
        let table = SuffixTable::from_suffixes(["test"]);
        let extractor = DomainExtractor::new(&table, ExtractorOptions::default());

        let extraction = extractor.extract("a.example.test and b.example.com");
        assert_eq!(extraction.domains, vec!["a.example.test"]);
        assert_eq!(extraction.root_domains, vec!["example.test"]);
    }

    #[test]
    fn test_decode_disabled() {
        let extractor = DomainExtractor::new(
            SuffixTable::builtin(),
            ExtractorOptions::new().with_decode(false),
        );
        assert!(extractor
            .extract_domains("%6e%65%77%73.ifeng.com")
            .iter()
            .all(|d| d != "news.ifeng.com"));

        let extractor = DomainExtractor::default();
        assert_eq!(
            extractor.extract_domains("%6e%65%77%73.ifeng.com"),
            vec!["news.ifeng.com"]
        );
    }

    #[test]
    fn test_try_decode_ignores_decode_option() {
        let extractor = DomainExtractor::new(
            SuffixTable::builtin(),
            ExtractorOptions::new().with_decode(false),
        );
        assert_eq!(extractor.try_decode("a%2Fb"), "a/b");
    }

    #[test]
    fn test_noise_filter() {
        let js = "var e=this.prototype.to;n.slice.io;load('cdn.jsdelivr.net')";
        let lenient = DomainExtractor::default();
        let strict = DomainExtractor::new(
            SuffixTable::builtin(),
            ExtractorOptions::new().with_noise_filter(true),
        );

        let found = lenient.extract_domains(js);
        assert!(found.contains(&"this.prototype.to".to_string()));
        assert!(found.contains(&"cdn.jsdelivr.net".to_string()));

        assert_eq!(strict.extract_domains(js), vec!["cdn.jsdelivr.net"]);
    }

    #[test]
    fn test_root_domain() {
        let extractor = DomainExtractor::default();
        assert_eq!(extractor.root_domain("news.ifeng.com"), "ifeng.com");
        assert_eq!(extractor.root_domain(".www.bbc.co.uk."), "bbc.co.uk");
        assert_eq!(extractor.root_domain("com.cn"), "com.cn");
        assert_eq!(extractor.root_domain("localhost"), "localhost");
        assert_eq!(extractor.root_domain(""), "");
    }

    #[test]
    fn test_has_domain_suffix() {
        let extractor = DomainExtractor::default();
        assert!(extractor.has_domain_suffix("abc.com"));
        assert!(extractor.has_domain_suffix("bbb.com.cn"));
        assert!(!extractor.has_domain_suffix("com.cn"));
        assert!(!extractor.has_domain_suffix("1.2.3"));
        assert!(!extractor.has_domain_suffix(""));
    }

    #[test]
    fn test_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DomainExtractor<'static>>();
        assert_send_sync::<SuffixTable>();
    }
}
