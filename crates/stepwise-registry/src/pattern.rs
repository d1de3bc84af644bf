//! Parameterized step patterns.
//!
//! A pattern is literal text with optional `{placeholder}` tokens. Each token
//! matches any run of characters; everything else matches itself. Compiled
//! patterns are anchored at the start of the candidate text only.

use regex::Regex;

const PLACEHOLDER_CAPTURE: &str = "(.*)";

/// Translate a step pattern into regex source.
///
/// A token runs from `{` to the nearest `}` on the same line. A `{` with no
/// closing brace on its line is literal.
pub fn pattern_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');

    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        let tail = &rest[open + 1..];
        match tail.find(['}', '\n']) {
            Some(end) if tail[end..].starts_with('}') => {
                out.push_str(&regex::escape(&rest[..open]));
                out.push_str(PLACEHOLDER_CAPTURE);
                rest = &tail[end + 1..];
            }
            Some(end) => {
                let split = open + 1 + end + 1;
                out.push_str(&regex::escape(&rest[..split]));
                rest = &rest[split..];
            }
            None => break,
        }
    }

    out.push_str(&regex::escape(rest));
    out
}

/// Compile a step pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&pattern_to_regex(pattern))
}

/// Checks whether `text` matches `pattern`.
///
/// A pattern that fails to compile matches nothing.
pub fn matches_pattern(pattern: &str, text: &str) -> bool {
    compile_pattern(pattern).is_ok_and(|re| re.is_match(text))
}

/// Whether the pattern contains at least one placeholder token.
pub fn has_placeholders(pattern: &str) -> bool {
    pattern_to_regex(pattern).contains(PLACEHOLDER_CAPTURE)
}
