//! Style signatures
//!
//! A glyph element's signature is its inline style declaration with the
//! absolute-position tokens removed. Two adjacent glyphs may merge into one
//! run only when their signatures are byte-identical; the layer populator
//! emits declarations in a single canonical shape, so string equality is the
//! comparison.

use regex::Regex;
use std::sync::OnceLock;

static POSITION_TOKEN: OnceLock<Regex> = OnceLock::new();

fn position_token() -> &'static Regex {
    POSITION_TOKEN.get_or_init(|| Regex::new(r"(left|top):.*?px;").unwrap())
}

/// Positioning-independent signature of an inline style declaration
///
/// Strips every `left:<value>px;` and `top:<value>px;` token and trims the
/// surrounding whitespace. Stripping is idempotent.
pub fn signature(style: &str) -> String {
    position_token().replace_all(style, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_strips_position_tokens() {
        let sig = signature("left:10px; top:100px; font-size:12px; font-family:serif;");
        assert_eq!(sig, "font-size:12px; font-family:serif;");
    }

    #[test]
    fn test_signature_strips_left_only() {
        assert_eq!(signature("left:0px; color:red;"), "color:red;");
    }

    #[test]
    fn test_signature_without_position_is_trimmed_identity() {
        assert_eq!(signature("  font-size:12px;  "), "font-size:12px;");
    }

    #[test]
    fn test_signature_is_idempotent() {
        let style = "left:3.5px; top:88px; font-size:12px;";
        let once = signature(style);
        let twice = signature(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_style_different_position_shares_signature() {
        let a = signature("left:0px; top:10px; font-size:12px;");
        let b = signature("left:60px; top:10px; font-size:12px;");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_style_differs() {
        let a = signature("left:0px; top:10px; font-size:12px;");
        let b = signature("left:0px; top:10px; font-size:14px;");
        assert_ne!(a, b);
    }
}
