//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and reference each other by [`NodeId`].
//! Parent, child and sibling links are indices, so moving a run of children
//! between parents rewires links instead of copying subtrees.

use crate::document::{Document, Segment};

/// Index of a node inside an [`Ast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Discriminant of a [`NodeValue`], used as the key of renderer dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    List,
    Item,
    CodeBlock,
    HtmlBlock,
    ThematicBreak,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Group,
    Text,
    Code,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link,
    Image,
    SoftBreak,
    HardBreak,
    InlineHtml,
    TaskListMarker,
    PendingInline,
    Callout,
    CalloutTitle,
    CalloutContent,
    Reference,
}

impl NodeKind {
    /// Number of node kinds (size of a dispatch table).
    pub const COUNT: usize = NodeKind::Reference as usize + 1;

    /// Dispatch table slot for this kind.
    #[must_use]
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// Text payload of a [`NodeValue::Text`] node.
///
/// Text that matches the document buffer byte-for-byte is stored as a
/// [`Segment`]; text the base engine rewrote (entities, escapes) is owned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextValue {
    Segment(Segment),
    Owned(String),
}

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

/// Standard link or image attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Link {
    pub destination: String,
    pub title: String,
    /// Set by the external-link transform for absolute `http(s)://` and `//` URLs.
    pub external: bool,
}

/// Admonition block attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Callout {
    /// Lowercased type tag (`note`, `warning`, ...).
    pub callout_type: String,
    pub collapsible: bool,
    pub collapsed: bool,
}

/// Admonition title attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalloutTitle {
    /// Synthesized title when the marker line carried none.
    pub default_title: Option<String>,
}

/// Cross-reference (`[[target#fragment|label]]`) attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reference {
    pub target: String,
    pub fragment: String,
    pub embed: bool,
    /// Whether the label came from an explicit `|label` part.
    pub has_label: bool,
    /// Filled in by the wikilink resolve pass before rendering.
    pub link: ReferenceLink,
}

/// Where a reference points once the page index has been consulted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReferenceLink {
    /// Not looked up yet.
    #[default]
    Pending,
    Resolved(String),
    Unresolved,
    /// Sits inside the text of a standard link; only its label renders.
    Nested,
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeValue {
    Document,
    Paragraph,
    Heading { level: u8, id: Option<String> },
    BlockQuote,
    List { start: Option<u64> },
    Item,
    CodeBlock { info: Option<String>, literal: String },
    HtmlBlock { literal: String },
    ThematicBreak,
    Table { alignments: Vec<Alignment> },
    TableHead,
    TableRow,
    TableCell,
    /// Transparent container for constructs without dedicated rendering.
    Group,
    Text(TextValue),
    Code(String),
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link(Link),
    Image(Link),
    SoftBreak,
    HardBreak,
    InlineHtml(String),
    TaskListMarker(bool),
    /// Source range still waiting for inline parsing.
    PendingInline(Segment),
    Callout(Callout),
    CalloutTitle(CalloutTitle),
    CalloutContent,
    Reference(Reference),
}

impl NodeValue {
    /// Kind of this value.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Paragraph => NodeKind::Paragraph,
            Self::Heading { .. } => NodeKind::Heading,
            Self::BlockQuote => NodeKind::BlockQuote,
            Self::List { .. } => NodeKind::List,
            Self::Item => NodeKind::Item,
            Self::CodeBlock { .. } => NodeKind::CodeBlock,
            Self::HtmlBlock { .. } => NodeKind::HtmlBlock,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::Table { .. } => NodeKind::Table,
            Self::TableHead => NodeKind::TableHead,
            Self::TableRow => NodeKind::TableRow,
            Self::TableCell => NodeKind::TableCell,
            Self::Group => NodeKind::Group,
            Self::Text(_) => NodeKind::Text,
            Self::Code(_) => NodeKind::Code,
            Self::Emphasis => NodeKind::Emphasis,
            Self::Strong => NodeKind::Strong,
            Self::Strikethrough => NodeKind::Strikethrough,
            Self::Superscript => NodeKind::Superscript,
            Self::Subscript => NodeKind::Subscript,
            Self::Link(_) => NodeKind::Link,
            Self::Image(_) => NodeKind::Image,
            Self::SoftBreak => NodeKind::SoftBreak,
            Self::HardBreak => NodeKind::HardBreak,
            Self::InlineHtml(_) => NodeKind::InlineHtml,
            Self::TaskListMarker(_) => NodeKind::TaskListMarker,
            Self::PendingInline(_) => NodeKind::PendingInline,
            Self::Callout(_) => NodeKind::Callout,
            Self::CalloutTitle(_) => NodeKind::CalloutTitle,
            Self::CalloutContent => NodeKind::CalloutContent,
            Self::Reference(_) => NodeKind::Reference,
        }
    }
}

#[derive(Debug)]
struct Node {
    value: NodeValue,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

/// Document tree. Node 0 is always the [`NodeValue::Document`] root.
#[derive(Debug)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    /// Create a tree holding only the document root.
    #[must_use]
    pub fn new() -> Self {
        let mut ast = Self {
            nodes: Vec::with_capacity(64),
        };
        ast.alloc(NodeValue::Document);
        ast
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Allocate a detached node.
    pub fn alloc(&mut self, value: NodeValue) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        });
        id
    }

    /// Number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn value(&self, id: NodeId) -> &NodeValue {
        &self.nodes[id.0].value
    }

    pub fn value_mut(&mut self, id: NodeId) -> &mut NodeValue {
        &mut self.nodes[id.0].value
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.value(id).kind()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last_child
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    /// Iterate over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            ast: self,
            next: self.first_child(id),
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Insert `child` right before `sibling`, detaching it first.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        self.detach(child);
        let parent = self.nodes[sibling.0].parent;
        let prev = self.nodes[sibling.0].prev_sibling;
        {
            let node = &mut self.nodes[child.0];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = Some(sibling);
        }
        self.nodes[sibling.0].prev_sibling = Some(child);
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(child),
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = Some(child);
                }
            }
        }
    }

    /// Unlink `id` from its parent and siblings. Its own children stay attached.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.0];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Move every child of `from` that follows `after` to the end of `to`,
    /// keeping their order.
    ///
    /// Runs in O(children moved): the sibling chain is spliced once and only
    /// the moved nodes get their parent rewritten.
    pub fn reparent_after(&mut self, from: NodeId, after: NodeId, to: NodeId) {
        debug_assert_eq!(self.parent(after), Some(from));
        let Some(first) = self.nodes[after.0].next_sibling else {
            return;
        };
        let Some(last) = self.nodes[from.0].last_child else {
            return;
        };

        self.nodes[after.0].next_sibling = None;
        self.nodes[from.0].last_child = Some(after);

        let mut cursor = Some(first);
        while let Some(id) = cursor {
            self.nodes[id.0].parent = Some(to);
            cursor = self.nodes[id.0].next_sibling;
        }

        match self.nodes[to.0].last_child {
            Some(tail) => {
                self.nodes[tail.0].next_sibling = Some(first);
                self.nodes[first.0].prev_sibling = Some(tail);
            }
            None => {
                self.nodes[to.0].first_child = Some(first);
                self.nodes[first.0].prev_sibling = None;
            }
        }
        self.nodes[to.0].last_child = Some(last);
    }

    /// Depth-first enter/exit traversal of the subtree rooted at `id`.
    pub fn traverse(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            ast: self,
            root: id,
            next: Some(NodeEdge::Enter(id)),
        }
    }

    /// Every node reachable from `id`, in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.traverse(id)
            .filter_map(|edge| match edge {
                NodeEdge::Enter(node) => Some(node),
                NodeEdge::Exit(_) => None,
            })
            .collect()
    }

    /// Plain text of a subtree: text, code and breaks, with markup dropped.
    #[must_use]
    pub fn plain_text(&self, doc: &Document, id: NodeId) -> String {
        let mut out = String::new();
        for edge in self.traverse(id) {
            let NodeEdge::Enter(node) = edge else {
                continue;
            };
            match self.value(node) {
                NodeValue::Text(text) => out.push_str(doc.text(text)),
                NodeValue::Code(code) => out.push_str(code),
                NodeValue::SoftBreak | NodeValue::HardBreak => out.push(' '),
                NodeValue::PendingInline(segment) => out.push_str(doc.slice(*segment)),
                _ => {}
            }
        }
        out
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.next_sibling(current);
        Some(current)
    }
}

/// One step of a [`Traverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEdge {
    Enter(NodeId),
    Exit(NodeId),
}

/// Depth-first traversal yielding an enter and an exit edge per node.
pub struct Traverse<'a> {
    ast: &'a Ast,
    root: NodeId,
    next: Option<NodeEdge>,
}

impl Traverse<'_> {
    /// Skip the children of the node whose enter edge was yielded last.
    pub fn skip_children(&mut self, entered: NodeId) {
        if matches!(self.next, Some(NodeEdge::Enter(child)) if self.ast.parent(child) == Some(entered))
        {
            self.next = Some(NodeEdge::Exit(entered));
        }
    }
}

impl Iterator for Traverse<'_> {
    type Item = NodeEdge;

    fn next(&mut self) -> Option<NodeEdge> {
        let edge = self.next.take()?;
        self.next = match edge {
            NodeEdge::Enter(id) => match self.ast.first_child(id) {
                Some(child) => Some(NodeEdge::Enter(child)),
                None => Some(NodeEdge::Exit(id)),
            },
            NodeEdge::Exit(id) if id == self.root => None,
            NodeEdge::Exit(id) => match self.ast.next_sibling(id) {
                Some(sibling) => Some(NodeEdge::Enter(sibling)),
                None => self.ast.parent(id).map(NodeEdge::Exit),
            },
        };
        Some(edge)
    }
}
