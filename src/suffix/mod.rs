//! Public suffix lookup.
//!
//! The built-in table covers ccTLDs, common gTLDs and the multi-label
//! registries (`com.cn`, `co.uk`, ...) seen in practice. Custom tables can be
//! parsed from public-suffix-list style text.
//!
//! ## Example
//!
//! ```
//! use domain_extractor::SuffixTable;
//!
//! let table = SuffixTable::builtin();
//! assert!(table.contains("com.cn"));
//!
//! // Offset where the matched suffix starts
//! assert_eq!(table.longest_match("bbb.com.cn"), Some(4));
//! ```

mod data;
mod table;

pub use table::SuffixTable;
