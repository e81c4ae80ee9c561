//! Heading identifiers.

use std::collections::HashMap;

use crate::ast::{Ast, NodeValue};
use crate::document::Document;
use crate::extension::AstTransformer;

/// Convert heading text (or a link fragment) to an anchor identifier.
///
/// Letters and digits are lowercased, runs of whitespace, `-` and `_` become
/// one `-`, everything else is dropped. A leading `#` is ignored.
///
/// # Examples
///
/// ```
/// use geode_markdown::heading_id;
///
/// assert_eq!(heading_id("Section One!"), "section-one");
/// assert_eq!(heading_id("#snake_case name"), "snake-case-name");
/// ```
#[must_use]
pub fn heading_id(text: &str) -> String {
    let text = text.trim().trim_start_matches('#');
    let mut id = String::with_capacity(text.len());
    let mut last_was_dash = true;

    for c in text.chars() {
        if c.is_alphanumeric() {
            id.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            id.push('-');
            last_was_dash = true;
        }
    }

    if id.ends_with('-') {
        id.pop();
    }
    id
}

/// Assigns an `id` to every heading from its plain text.
///
/// Repeated identifiers get `-1`, `-2`, ... suffixes in document order;
/// headings with no usable characters become `heading`.
#[derive(Debug, Default)]
pub struct HeadingIds;

impl AstTransformer for HeadingIds {
    fn transform(&self, ast: &mut Ast, doc: &Document) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for node in ast.descendants(ast.root()) {
            if !matches!(ast.value(node), NodeValue::Heading { id: None, .. }) {
                continue;
            }
            let mut base = heading_id(&ast.plain_text(doc, node));
            if base.is_empty() {
                base.push_str("heading");
            }
            let count = counts.entry(base.clone()).or_default();
            let unique = match *count {
                0 => base,
                n => format!("{base}-{n}"),
            };
            *count += 1;
            if let NodeValue::Heading { id, .. } = ast.value_mut(node) {
                *id = Some(unique);
            }
        }
    }
}
