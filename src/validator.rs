//! Suffix validation and root resolution.

use crate::suffix::SuffixTable;

/// Root labels that show up as property accesses in minified code
const CODE_WORDS: &[&str] = &[
    "a", "css", "js", "slice", "prototype", "t", "o", "this", "f", "i", "n", "c", "date", "list",
    "base64", "div", "li", "response",
];

/// A token accepted as a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedDomain<'a> {
    /// The full hostname, case preserved
    pub domain: &'a str,
    /// Registrable root: one label plus the matched suffix
    pub root: &'a str,
}

/// Validate `token` against `table`.
///
/// The longest known suffix of the token is matched first; the token is a
/// domain only if at least one label is left of that suffix. A token that is
/// exactly a public suffix (`com.cn`) or has no known suffix is rejected.
pub fn validate<'a>(token: &'a str, table: &SuffixTable) -> Option<ValidatedDomain<'a>> {
    if token.is_empty() || token.split('.').any(str::is_empty) {
        return None;
    }

    let suffix_start = table.longest_match(token)?;
    if suffix_start == 0 {
        return None;
    }

    // `suffix_start - 1` is the dot in front of the suffix
    let root_start = token[..suffix_start - 1]
        .rfind('.')
        .map(|dot| dot + 1)
        .unwrap_or(0);

    Some(ValidatedDomain {
        domain: token,
        root: &token[root_start..],
    })
}

/// Validate `token`, additionally rejecting roots that look like code.
///
/// A root label is treated as noise when it is a well-known code word
/// (`this.prototype`, `e.slice`), a single character, or camelCase.
pub fn validate_strict<'a>(token: &'a str, table: &SuffixTable) -> Option<ValidatedDomain<'a>> {
    let validated = validate(token, table)?;
    if is_noise_label(root_label(validated.root)) {
        return None;
    }
    Some(validated)
}

fn root_label(root: &str) -> &str {
    root.split('.').next().unwrap_or(root)
}

fn is_noise_label(label: &str) -> bool {
    if label.len() <= 1 {
        return true;
    }
    if CODE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(label)) {
        return true;
    }
    // camelCase identifiers: uppercase after the first character
    label.bytes().skip(1).any(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SuffixTable {
        SuffixTable::from_suffixes(["com", "cn", "org", "com.cn", "org.cn", "co.uk", "uk", "io"])
    }

    #[test]
    fn test_accepts_subdomains() {
        let table = table();
        let v = validate("stadig.ifeng.com", &table).unwrap();
        assert_eq!(v.domain, "stadig.ifeng.com");
        assert_eq!(v.root, "ifeng.com");

        let v = validate("news.ifeng.com", &table).unwrap();
        assert_eq!(v.root, "ifeng.com");
    }

    #[test]
    fn test_root_is_itself() {
        let v = validate("abc.com", &table()).unwrap();
        assert_eq!(v.domain, "abc.com");
        assert_eq!(v.root, "abc.com");
    }

    #[test]
    fn test_multi_label_suffix() {
        let table = table();
        let v = validate("bbb.com.cn", &table).unwrap();
        assert_eq!(v.root, "bbb.com.cn");

        let v = validate("a.b.bbc.co.uk", &table).unwrap();
        assert_eq!(v.root, "bbc.co.uk");
    }

    #[test]
    fn test_rejects_bare_suffix() {
        let table = table();
        assert!(validate("com.cn", &table).is_none());
        assert!(validate("org.cn", &table).is_none());
        assert!(validate("co.uk", &table).is_none());
        assert!(validate("com", &table).is_none());
    }

    #[test]
    fn test_rejects_unknown_suffix() {
        let table = table();
        assert!(validate("1.2.3", &table).is_none());
        assert!(validate("b.html", &table).is_none());
        assert!(validate("example.invalid", &table).is_none());
    }

    #[test]
    fn test_numeric_labels_use_table_only() {
        let table = table();
        let v = validate("1.2.com", &table).unwrap();
        assert_eq!(v.root, "2.com");
        assert!(validate("3.14", &table).is_none());
    }

    #[test]
    fn test_case_preserved() {
        let v = validate("News.IFeng.COM", &table()).unwrap();
        assert_eq!(v.domain, "News.IFeng.COM");
        assert_eq!(v.root, "IFeng.COM");
    }

    #[test]
    fn test_rejects_empty_labels() {
        let table = table();
        assert!(validate("", &table).is_none());
        assert!(validate("a..com", &table).is_none());
        assert!(validate(".com", &table).is_none());
        assert!(validate("abc.com.", &table).is_none());
    }

    #[test]
    fn test_strict_rejects_code_words() {
        let table = table();
        assert!(validate("this.prototype.io", &table).is_some());
        assert!(validate_strict("this.prototype.io", &table).is_none());
        assert!(validate_strict("e.a.com", &table).is_none());
        assert!(validate_strict("x.Response.com", &table).is_none());
    }

    #[test]
    fn test_strict_rejects_camel_case_root() {
        let table = table();
        assert!(validate_strict("obj.getItem.io", &table).is_none());
        assert!(validate_strict("www.Example.com", &table).is_some());
        assert!(validate_strict("cdn.feross.org", &table).is_some());
    }
}
