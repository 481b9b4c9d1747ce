//! Redis-style glob patterns for `keys` lookups.
//!
//! Supported syntax matches the `KEYS` command: `*`, `?`, `[abc]`, `[^a]`,
//! `[a-z]` and `\x` to match `x` literally.

use regex::Regex;

use crate::cache::CacheError;

/// Characters with special meaning in a glob pattern.
const GLOB_META: &[char] = &['*', '?', '[', ']', '\\'];

/// Escape `literal` so it matches only itself when used as a glob prefix.
pub(crate) fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if GLOB_META.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub(crate) struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    pub(crate) fn new(pattern: &str) -> Result<Self, CacheError> {
        let regex = Regex::new(&translate(pattern))
            .map_err(|e| CacheError::backend("keys", pattern, e))?;
        Ok(Self { regex })
    }

    pub(crate) fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push_str("(?s)^");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(next) => out.push_str(&regex::escape(&next.to_string())),
                None => out.push_str(r"\\"),
            },
            '[' => {
                let negated = chars.peek() == Some(&'^');
                if negated {
                    chars.next();
                }
                // (char, escaped) pairs of the class body
                let mut items: Vec<(char, bool)> = Vec::new();
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    match inner {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                items.push((escaped, true));
                            }
                        }
                        other => items.push((other, false)),
                    }
                }

                let raw: String = items.iter().map(|(c, _)| *c).collect();
                let caret = if negated { "^" } else { "" };
                if !closed {
                    out.push_str(&regex::escape(&format!("[{caret}{raw}")));
                } else if items.is_empty() {
                    // Empty classes are taken literally.
                    out.push_str(&regex::escape(&format!("[{caret}]")));
                } else {
                    out.push('[');
                    out.push_str(caret);
                    out.push_str(&class_body(&items));
                    out.push(']');
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    out
}

/// Render class items as a regex class body.
///
/// `a-z` is a range; reversed ends are swapped, so `[c-a]` matches like
/// `[a-c]`. A `-` that cannot form a range is literal.
fn class_body(items: &[(char, bool)]) -> String {
    let mut class = String::new();
    let mut i = 0;
    while i < items.len() {
        let (start, _) = items[i];
        match (items.get(i + 1), items.get(i + 2)) {
            (Some(&('-', false)), Some(&(end, _))) => {
                let (low, high) = if start <= end { (start, end) } else { (end, start) };
                push_class_char(&mut class, low);
                class.push('-');
                push_class_char(&mut class, high);
                i += 3;
            }
            _ => {
                push_class_char(&mut class, start);
                i += 1;
            }
        }
    }
    class
}

fn push_class_char(class: &mut String, c: char) {
    if matches!(c, '[' | ']' | '^' | '-' | '&' | '~' | '\\') {
        class.push('\\');
    }
    class.push(c);
}
