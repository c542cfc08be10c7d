//! Address syntax gate.
//!
//! [`validate_address`] is a pure pattern match: no trimming, no case folding,
//! no IDNA. It is the only check performed before [`extract_domain`].

use std::sync::LazyLock;

use regex::Regex;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("address pattern compiles")
});

/// Returns `true` when `address` matches the accepted grammar end-to-end:
/// a local part of letters, digits and `. _ % + -`, one `@`, then dot
/// separated labels ending with a top-level label of at least two letters.
pub fn validate_address(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

/// Domain part of an address holding exactly one `@`.
pub fn extract_domain(address: &str) -> Option<&str> {
    let (_, domain) = address.split_once('@')?;
    if domain.contains('@') {
        return None;
    }
    Some(domain)
}
