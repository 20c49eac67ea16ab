//! Domain Extractor - recover and validate domain names hidden in raw traffic
//!
//! This library pulls hostnames out of text of unknown structure: raw HTTP
//! request/response dumps, HTML, minified JavaScript, JSON and CSS. It works
//! in three stages:
//! - Recovery decoding (percent encoding, `\xHH`, `\uHHHH`, escaped slashes)
//! - Lexical scanning for dot-separated label runs
//! - Suffix validation against a public suffix table, with root resolution
//!
//! Extraction never fails: garbage in, best partial result out.
//!
//! # Example
//!
//! ```rust
//! use domain_extractor::{extract_domains, extract_domains_with_roots};
//!
//! let capture = "GET / HTTP/1.1\r\n\
//!                Host: stadig.ifeng.com\r\n\
//!                Referer: https://news.ifeng.com/a/index.html\r\n\r\n";
//!
//! assert_eq!(
//!     extract_domains(capture),
//!     vec!["stadig.ifeng.com", "news.ifeng.com"]
//! );
//!
//! let (domains, roots) = extract_domains_with_roots(capture);
//! assert_eq!(domains.len(), 2);
//! assert_eq!(roots, vec!["ifeng.com"]);
//! ```
//!
//! # Validation Rules
//!
//! | Token | Result | Why |
//! |-------|--------|-----|
//! | `news.ifeng.com` | domain, root `ifeng.com` | `com` is a known suffix |
//! | `bbb.com.cn` | domain, root `bbb.com.cn` | longest suffix `com.cn` wins |
//! | `com.cn` | rejected | nothing left of the suffix |
//! | `1.2.3` | rejected | `3` is not a known suffix |

pub mod decode;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod suffix;
pub mod types;
pub mod validator;

// Re-export commonly used items
pub use error::{ExtractError, Result};
pub use extractor::{DomainExtractor, ExtractorOptions, MAX_DECODE_PASSES_LIMIT};
pub use scanner::{scan, RawToken, Scanner};
pub use suffix::SuffixTable;
pub use types::Extraction;
pub use validator::{validate, ValidatedDomain};

/// Ordered, de-duplicated hostnames found in `input`.
pub fn extract_domains(input: impl AsRef<[u8]>) -> Vec<String> {
    DomainExtractor::default().extract_domains(input)
}

/// Ordered, de-duplicated hostnames plus their registrable roots.
pub fn extract_domains_with_roots(input: impl AsRef<[u8]>) -> (Vec<String>, Vec<String>) {
    DomainExtractor::default().extract_domains_with_roots(input)
}

/// Ordered, de-duplicated registrable roots found in `input`.
pub fn extract_root_domains(input: impl AsRef<[u8]>) -> Vec<String> {
    DomainExtractor::default().extract_root_domains(input)
}

/// Registrable root of a single hostname, or the hostname itself if it
/// does not validate.
pub fn extract_root_domain(host: &str) -> String {
    DomainExtractor::default().root_domain(host)
}

/// Check whether a single hostname validates as a domain.
pub fn has_domain_suffix(host: &str) -> bool {
    DomainExtractor::default().has_domain_suffix(host)
}

/// Run only the recovery decoder.
pub fn try_decode(input: impl AsRef<[u8]>) -> String {
    decode::decode(input)
}
