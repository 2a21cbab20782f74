//! Collected class rules and the fixed stylesheet preamble.

use indexmap::IndexMap;

use crate::style::CssStyleBuilder;

pub const CSS_PREAMBLE: &str = r#"/* Generated from Figma */
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

html, body {
    height: 100%;
    overflow: hidden;
}

body {
    font-family: system-ui, -apple-system, sans-serif;
    line-height: 1.6;
}

.root-container {
    position: fixed;
    top: 0;
    left: 0;
    width: 100vw;
    height: 100vh;
    overflow-y: auto;
    overflow-x: hidden;
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

@media (max-width: 768px) {
    .root-container {
        padding: 10px;
    }
}

@media (max-width: 480px) {
    .root-container {
        padding: 5px;
    }
}

svg {
    display: block;
    max-width: 100%;
    max-height: 100%;
    width: auto;
    height: auto;
}

"#;

/// One rule per class, in first-emitted order.
#[derive(Debug, Default)]
pub struct CssCollection {
    rules: IndexMap<String, CssStyleBuilder>,
}

impl CssCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: impl Into<String>, styles: CssStyleBuilder) {
        self.rules.insert(class_name.into(), styles);
    }

    pub fn get(&self, class_name: &str) -> Option<&CssStyleBuilder> {
        self.rules.get(class_name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Preamble followed by `.class { prop: value; }` blocks.
    pub fn to_css(&self) -> String {
        let mut css = String::from(CSS_PREAMBLE);
        for (class_name, styles) in &self.rules {
            css.push('.');
            css.push_str(class_name);
            css.push_str(" {\n");
            for (property, value) in styles.declarations() {
                css.push_str("    ");
                css.push_str(property);
                css.push_str(": ");
                css.push_str(value);
                css.push_str(";\n");
            }
            css.push_str("}\n\n");
        }
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_follow_the_preamble_in_insertion_order() {
        let mut collection = CssCollection::new();
        let mut card = CssStyleBuilder::new();
        card.add_style("width", "10px").add_style("height", "4px");
        collection.insert("card", card);
        let mut title = CssStyleBuilder::new();
        title.add_style("color", "rgb(0, 0, 0)");
        collection.insert("title", title);

        let css = collection.to_css();
        assert!(css.starts_with(CSS_PREAMBLE));
        assert!(css.ends_with(
            ".card {\n    width: 10px;\n    height: 4px;\n}\n\n.title {\n    color: rgb(0, 0, 0);\n}\n\n"
        ));
    }

    #[test]
    fn empty_collection_still_has_the_preamble() {
        assert_eq!(CssCollection::new().to_css(), CSS_PREAMBLE);
    }
}
