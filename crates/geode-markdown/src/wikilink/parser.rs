use crate::ast::{Ast, NodeValue, Reference, ReferenceLink};
use crate::document::Line;
use crate::extension::{InlineMatch, InlineParser};

const OPEN: &str = "[[";
const EMBED_OPEN: &str = "![[";
const CLOSE: &str = "]]";

/// Recognizes `[[target]]`, `[[target|label]]` and their `![[...]]` embeds.
///
/// The reference must close on the same line. The part before the first `|`
/// is the target, whose text after the last `#` becomes the fragment. The
/// label (or the whole target when there is none) is kept as a pending
/// inline child.
#[derive(Debug, Default)]
pub struct WikilinkParser;

impl InlineParser for WikilinkParser {
    fn trigger(&self) -> &[u8] {
        b"!["
    }

    fn parse(&self, ast: &mut Ast, line: &Line<'_>) -> Option<InlineMatch> {
        let text = line.text;
        let stop = text.find(CLOSE)?;
        let (embed, open) = if text.starts_with(OPEN) {
            (false, OPEN.len())
        } else if text.starts_with(EMBED_OPEN) {
            (true, EMBED_OPEN.len())
        } else {
            return None;
        };
        if stop < open {
            return None;
        }

        let inner = &text[open..stop];
        let (target, label_start) = match inner.find('|') {
            Some(pipe) => (&inner[..pipe], open + pipe + 1),
            None => (inner, open),
        };
        if target.is_empty() || label_start >= stop {
            return None;
        }
        let (target, fragment) = match target.rfind('#') {
            Some(hash) => (&target[..hash], &target[hash + 1..]),
            None => (target, ""),
        };

        let node = ast.alloc(NodeValue::Reference(Reference {
            target: target.to_owned(),
            fragment: fragment.to_owned(),
            embed,
            has_label: label_start != open,
            link: ReferenceLink::Pending,
        }));
        let label = ast.alloc(NodeValue::PendingInline(line.sub_segment(label_start, stop)));
        ast.append_child(node, label);

        Some(InlineMatch {
            node,
            consumed: stop + CLOSE.len(),
        })
    }
}
