//! Scope selectors
//!
//! A selector is a dotted path of lowercase tokens identifying a syntactic
//! region of a document -- e.g., `text.comment.line.py` names a line comment
//! in a Python source file. Rules declare the scope they apply to and the
//! scoper tags every segment it emits; the dispatcher routes a segment to a
//! rule when the segment's selector contains every section of the rule's
//! scope, in order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named section of text (e.g., `text.heading.h2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    value: String,
}

impl Selector {
    /// Create a selector from a dotted path.
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// The raw dotted path.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The individual sections of the path.
    pub fn sections(&self) -> Vec<&str> {
        self.value.split('.').collect()
    }

    /// Whether every section of `other` appears in `self`, in order.
    pub fn contains(&self, other: &Selector) -> bool {
        let mine = self.sections();
        let mut idx = 0;
        for want in other.sections() {
            match mine[idx..].iter().position(|have| *have == want) {
                Some(found) => idx += found + 1,
                None => return false,
            }
        }
        true
    }

    /// Whether any section of the path equals `section`.
    pub fn has(&self, section: &str) -> bool {
        self.sections().contains(&section)
    }

    /// Document-level scopes run once against the accumulated summary
    /// rather than per segment.
    pub fn is_summary(&self) -> bool {
        self.value == "summary"
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections() {
        let sel = Selector::new("text.comment.line.py");
        assert_eq!(sel.sections(), vec!["text", "comment", "line", "py"]);
    }

    #[test]
    fn test_contains() {
        let segment = Selector::new("text.comment.line.py");
        assert!(segment.contains(&Selector::new("text")));
        assert!(segment.contains(&Selector::new("text.comment")));
        assert!(segment.contains(&Selector::new("comment.py")));
        assert!(segment.contains(&Selector::new("text.comment.line.py")));
        assert!(!segment.contains(&Selector::new("text.string")));
        assert!(!segment.contains(&Selector::new("py.comment")));
    }

    #[test]
    fn test_contains_is_transitive() {
        let a = Selector::new("text.heading.h2");
        let b = Selector::new("text.heading");
        let c = Selector::new("text");
        assert!(a.contains(&b));
        assert!(b.contains(&c));
        assert!(a.contains(&c));
    }

    #[test]
    fn test_has() {
        let sel = Selector::new("text.heading.h1");
        assert!(sel.has("heading"));
        assert!(sel.has("h1"));
        assert!(!sel.has("h2"));
    }

    #[test]
    fn test_summary() {
        assert!(Selector::new("summary").is_summary());
        assert!(!Selector::new("text").is_summary());
    }

    #[test]
    fn test_equality() {
        assert_eq!(Selector::new("text"), Selector::new("text"));
        assert_ne!(Selector::new("text"), Selector::new("text.list"));
    }
}
