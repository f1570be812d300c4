//! Display-name inference, elision, and printer handle assignment.
//!
//! After a register statement is parsed, the display name is inferred from
//! the textual handle of its first result unless the attribute dictionary
//! supplied one explicitly. When printing, the name clause is elided whenever
//! it is redundant with the handle the printer assigns anyway, so printing
//! followed by re-parsing is a fixed point on the name attribute.

use std::collections::HashSet;

/// Returns `true` for handles that are purely decimal numerals (`%7`) — the
/// positional, auto-generated kind that should not become a display name.
pub fn is_positional_handle(handle: &str) -> bool {
    !handle.is_empty() && handle.bytes().all(|b| b.is_ascii_digit())
}

/// Infers the display name for a node's first result.
///
/// An explicit `name` attribute always wins. Otherwise the textual handle
/// becomes the name, unless it is positional, in which case the name is empty.
pub fn infer_name(explicit: Option<String>, first_handle: &str) -> String {
    match explicit {
        Some(name) => name,
        None if is_positional_handle(first_handle) => String::new(),
        None => first_handle.to_string(),
    }
}

/// Decides whether the printer may omit an explicit name clause.
///
/// Elides when the name is empty, or when it matches the printed handle of
/// the first result with the leading sigil stripped.
pub fn can_elide_name(name: &str, printed_handle: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    printed_handle.strip_prefix('%') == Some(name)
}

/// Assigns unique textual handles to values during printing.
///
/// Seeded argument names are claimed verbatim; node results get their
/// suggestion uniquified with an `_N` suffix on collision; empty or
/// positional suggestions fall back to a fresh numeral.
#[derive(Default)]
pub struct NameTable {
    used: HashSet<String>,
    next_numeric: u32,
}

impl NameTable {
    /// Creates an empty name table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a seeded argument name, uniquifying only on collision.
    pub fn claim(&mut self, name: &str) -> String {
        if name.is_empty() {
            return self.fresh_numeric();
        }
        self.uniquify(name)
    }

    /// Assigns a handle for a node result from a suggestion.
    pub fn assign(&mut self, suggestion: &str) -> String {
        if suggestion.is_empty() || is_positional_handle(suggestion) {
            return self.fresh_numeric();
        }
        self.uniquify(suggestion)
    }

    fn uniquify(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 0u32;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn fresh_numeric(&mut self) -> String {
        loop {
            let candidate = self.next_numeric.to_string();
            self.next_numeric += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_handles() {
        assert!(is_positional_handle("7"));
        assert!(is_positional_handle("0"));
        assert!(!is_positional_handle("foo"));
        assert!(!is_positional_handle("bar2"));
        assert!(!is_positional_handle("2foo"));
        assert!(!is_positional_handle(""));
    }

    #[test]
    fn infer_from_named_handle() {
        assert_eq!(infer_name(None, "foo"), "foo");
    }

    #[test]
    fn infer_from_numeric_handle_is_empty() {
        assert_eq!(infer_name(None, "7"), "");
    }

    #[test]
    fn explicit_name_never_overwritten() {
        assert_eq!(infer_name(Some("bar".to_string()), "bar2"), "bar");
    }

    #[test]
    fn elide_empty_name() {
        assert!(can_elide_name("", "%0"));
    }

    #[test]
    fn elide_matching_handle() {
        assert!(can_elide_name("foo", "%foo"));
        assert!(!can_elide_name("foo", "%foo_0"));
        assert!(!can_elide_name("foo", "%bar"));
    }

    #[test]
    fn name_table_uniquifies() {
        let mut table = NameTable::new();
        assert_eq!(table.assign("q"), "q");
        assert_eq!(table.assign("q"), "q_0");
        assert_eq!(table.assign("q"), "q_1");
    }

    #[test]
    fn name_table_numerics_for_anonymous() {
        let mut table = NameTable::new();
        assert_eq!(table.assign(""), "0");
        assert_eq!(table.assign("7"), "1");
        assert_eq!(table.assign(""), "2");
    }

    #[test]
    fn claimed_numeric_not_reused() {
        let mut table = NameTable::new();
        assert_eq!(table.claim("0"), "0");
        assert_eq!(table.assign(""), "1");
    }

    #[test]
    fn claim_keeps_seeded_names() {
        let mut table = NameTable::new();
        assert_eq!(table.claim("clk"), "clk");
        assert_eq!(table.claim("clk"), "clk_0");
    }
}
