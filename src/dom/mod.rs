//! Minimal element tree standing in for the browser DOM: enough to load
//! navigation markup, walk ancestor chains, mutate attributes and classes,
//! and write the result back out.

mod document;
mod markup;
mod selector;

pub use document::{Document, NodeData, NodeId};
pub use markup::{parse, serialize};
pub use selector::Selector;
