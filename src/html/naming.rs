//! CSS class names derived from node names.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn invalid_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("class name regex should compile"))
}

fn underscore_runs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("underscore regex should compile"))
}

/// Lowercase `[a-z0-9_-]` form of `name`. Empty names and names starting with
/// a digit get an `element_` prefix.
pub fn sanitize_class_name(name: &str) -> String {
    let replaced = invalid_chars_re().replace_all(name, "_").to_lowercase();
    let collapsed = underscore_runs_re().replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        "element".to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("element_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Per-run class name allocator.
#[derive(Debug, Default)]
pub struct ClassNamer {
    counters: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl ClassNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.counters.clear();
        self.issued.clear();
    }

    /// First use of a base name returns it bare, later uses append `_1`, `_2`, ...
    /// A suffixed name that collides with one already issued is skipped.
    pub fn next(&mut self, name: &str) -> String {
        let base = sanitize_class_name(name);
        loop {
            let count = self.counters.entry(base.clone()).or_insert(0);
            let candidate = if *count == 0 {
                base.clone()
            } else {
                format!("{base}_{count}")
            };
            *count += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercased_and_cleaned() {
        assert_eq!(sanitize_class_name("Hero Card / Title"), "hero_card_title");
        assert_eq!(sanitize_class_name("__Nav-Bar__"), "nav-bar");
        assert_eq!(sanitize_class_name("2 Columns"), "element_2_columns");
        assert_eq!(sanitize_class_name("★★"), "element");
        assert_eq!(sanitize_class_name(""), "element");
    }

    #[test]
    fn repeated_names_get_counters() {
        let mut namer = ClassNamer::new();
        assert_eq!(namer.next("Button"), "button");
        assert_eq!(namer.next("button"), "button_1");
        assert_eq!(namer.next("Button"), "button_2");
    }

    #[test]
    fn suffix_collisions_are_skipped() {
        let mut namer = ClassNamer::new();
        assert_eq!(namer.next("Item_1"), "item_1");
        assert_eq!(namer.next("Item"), "item");
        assert_eq!(namer.next("Item"), "item_2");
    }

    #[test]
    fn reset_forgets_issued_names() {
        let mut namer = ClassNamer::new();
        namer.next("Card");
        namer.reset();
        assert_eq!(namer.next("Card"), "card");
    }
}
