//! Extension points of the markdown pipeline.
//!
//! Extensions contribute block parsers, inline parsers, AST transformers and
//! node renderers, each at a priority. Lower priority values go first: a
//! block or inline parser with a lower value gets first refusal on its
//! trigger byte, transformers run in ascending order, and for each node kind
//! the renderer with the lowest value wins. Built-in rendering sits below
//! every registered renderer.

use crate::ast::{Ast, NodeId, NodeKind};
use crate::document::{Document, Line, Segment};
use crate::markdown::MarkdownBuilder;
use crate::render::RenderContext;

/// Result of a successful [`BlockParser::open`].
#[derive(Clone, Copy, Debug)]
pub struct BlockStart {
    /// The block node, not yet attached.
    pub node: NodeId,
    /// Part of the opening line to feed to the block's children.
    pub remainder: Option<Segment>,
}

/// Verdict of [`BlockParser::continue_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// The line belongs to the block; the segment is handed to its children.
    Continue(Segment),
    /// The line does not belong to the block, which closes before it.
    Close,
}

/// Line-oriented recognizer for a container block.
///
/// The block scanner offers a line to every parser registered for its first
/// non-indent byte. Once a parser opens a block, following lines go to
/// [`continue_line`](Self::continue_line) until it answers
/// [`Continuation::Close`] or input ends; the collected content is parsed as
/// the block's children and then [`close`](Self::close) runs.
pub trait BlockParser: Send + Sync {
    /// Bytes that may start this block (after up to three spaces).
    fn trigger(&self) -> &[u8];

    fn open(&self, ast: &mut Ast, line: &Line<'_>) -> Option<BlockStart>;

    fn continue_line(&self, ast: &Ast, node: NodeId, line: &Line<'_>) -> Continuation;

    fn close(&self, ast: &mut Ast, node: NodeId);

    /// Whether the block may start right after paragraph text.
    fn can_interrupt_paragraph(&self) -> bool;

    /// Whether lines indented four or more columns may open the block.
    fn can_accept_indented_line(&self) -> bool;
}

/// Match produced by an [`InlineParser`].
#[derive(Clone, Copy, Debug)]
pub struct InlineMatch {
    /// The inline node, not yet attached.
    pub node: NodeId,
    /// Bytes of the line consumed, counted from the trigger.
    pub consumed: usize,
}

/// Recognizer for an inline construct starting at a trigger byte.
///
/// `line` is the rest of the current line starting at the trigger. Returning
/// `None` leaves the text to the base engine.
pub trait InlineParser: Send + Sync {
    fn trigger(&self) -> &[u8];

    fn parse(&self, ast: &mut Ast, line: &Line<'_>) -> Option<InlineMatch>;
}

/// Whole-tree pass run after parsing, before rendering.
pub trait AstTransformer: Send + Sync {
    fn transform(&self, ast: &mut Ast, doc: &Document);
}

/// Walk control returned by renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    Continue,
    /// Do not descend into the node's children (exit is still reported).
    SkipChildren,
}

/// HTML serializer for one or more node kinds.
pub trait NodeRenderer: Send + Sync {
    fn kinds(&self) -> &[NodeKind];

    fn render(&self, ctx: &mut RenderContext<'_>, node: NodeId, entering: bool) -> WalkStatus;
}

/// A bundle of parsers and renderers registered together.
pub trait Extension {
    fn extend(self, builder: &mut MarkdownBuilder);
}

/// Value tagged with its registration priority.
pub(crate) struct Prioritized<T> {
    pub value: T,
    pub priority: u32,
}

/// Stable sort by ascending priority; equal priorities keep registration order.
pub(crate) fn sort_prioritized<T>(items: &mut [Prioritized<T>]) {
    items.sort_by_key(|item| item.priority);
}

/// Dispatch table from byte to parser indices, in priority order.
pub(crate) fn trigger_table<'a, I>(triggers: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut table = vec![Vec::new(); 256];
    for (index, bytes) in triggers.into_iter().enumerate() {
        for &byte in bytes {
            table[usize::from(byte)].push(index);
        }
    }
    table
}
