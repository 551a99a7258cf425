//! Email address validation.
//!
//! A pragmatic subset of RFC 5322: dot-atom local parts and hostname
//! domains with an alphabetic top-level label. Quoted local parts and IP
//! literals are rejected. Invalid addresses are blanked, not refused.

use std::sync::LazyLock;

use regex::Regex;

use crate::sanitize::static_regex;

/// Maximum length of the part before `@`.
const LOCAL_MAX_CHARS: usize = 64;

/// Maximum length of a whole address.
const ADDRESS_MAX_CHARS: usize = 254;

static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    static_regex(concat!(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+",
        r"[A-Za-z](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])$",
    ))
});

/// Whether `address` is a well-formed email address.
#[must_use]
pub fn is_valid(address: &str) -> bool {
    if address.len() > ADDRESS_MAX_CHARS {
        return false;
    }
    let Some((local, _)) = address.rsplit_once('@') else {
        return false;
    };
    local.len() <= LOCAL_MAX_CHARS && ADDRESS.is_match(address)
}

/// Return `address` unchanged if valid, otherwise an empty string.
#[must_use]
pub fn accept_or_blank(address: String) -> String {
    if is_valid(&address) {
        address
    } else {
        String::new()
    }
}
