//! Parsing: block scanning, the base engine adapter and inline extensions.
//!
//! Parsing happens in three passes over a [`Document`](crate::Document):
//!
//! 1. [`parse_blocks`] walks lines, letting extension block parsers claim
//!    runs of lines. Unclaimed runs go to the base engine.
//! 2. The base engine (pulldown-cmark) parses each unclaimed run. Before it
//!    does, inline extension matches are swapped for placeholders so the
//!    engine treats them as opaque text.
//! 3. [`expand_pending`] inline-parses source ranges that block parsers set
//!    aside (callout titles, reference labels).

mod base;
mod block;
mod fence;
mod inline;

pub(crate) use block::parse_blocks;
pub(crate) use inline::expand_pending;
