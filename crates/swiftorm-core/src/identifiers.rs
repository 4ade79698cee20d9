//! SQL identifier validation and quoting.

use std::sync::OnceLock;

use regex::Regex;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// PostgreSQL truncates identifiers beyond this many bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"))
}

/// Check that a name is a plain SQL identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    name.len() <= MAX_IDENTIFIER_LEN && identifier_regex().is_match(name)
}

/// Quote an identifier with double quotes, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}
