use crate::asn1_error;
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::tree::FlatNode;
use bytes::Bytes;
use std::ops::Range;
use std::sync::Arc;

/// One parsed TLV: its identifier, its content, and its complete encoding.
///
/// Views borrow the flat vector produced by the parse; cloning a node clones
/// the `Arc` and the `Bytes` handles, never the bytes themselves.
#[derive(Debug, Clone)]
pub struct Node {
    pub identifier: Identifier,
    pub content: Content,
    pub encoded_bytes: Bytes,
}

impl Node {
    pub fn is_constructed(&self) -> bool {
        matches!(self.content, Content::Constructed(_))
    }
}

#[derive(Debug, Clone)]
pub enum Content {
    Primitive(Bytes),
    Constructed(Children),
}

/// The direct children of a constructed node, as a range of the shared flat
/// vector.
#[derive(Debug, Clone)]
pub struct Children {
    nodes: Arc<Vec<FlatNode>>,
    range: Range<usize>,
    parent_depth: usize,
}

impl Children {
    pub(crate) fn new(nodes: Arc<Vec<FlatNode>>, range: Range<usize>, parent_depth: usize) -> Self {
        Children {
            nodes,
            range,
            parent_depth,
        }
    }

    pub fn iter(&self) -> ChildrenIter {
        self.clone().into_iter()
    }
}

impl IntoIterator for Children {
    type Item = Node;
    type IntoIter = ChildrenIter;

    fn into_iter(self) -> ChildrenIter {
        ChildrenIter {
            nodes: self.nodes,
            cursor: self.range.start,
            end: self.range.end,
            parent_depth: self.parent_depth,
        }
    }
}

/// Single-pass cursor over direct children. `next` steps over the whole
/// subtree of the node it returns; cloning the iterator is cheap.
#[derive(Debug, Clone)]
pub struct ChildrenIter {
    nodes: Arc<Vec<FlatNode>>,
    cursor: usize,
    end: usize,
    parent_depth: usize,
}

impl ChildrenIter {
    /// The next child without advancing past it.
    pub fn peek(&self) -> Option<Node> {
        if self.cursor >= self.end {
            return None;
        }
        Some(view_node(
            &self.nodes,
            self.cursor,
            self.subtree_end(self.cursor),
        ))
    }

    /// First index past the subtree rooted at `index`: where depth falls back
    /// to the direct-child level or below.
    fn subtree_end(&self, index: usize) -> usize {
        let mut scan = index + 1;
        while scan < self.end && self.nodes[scan].depth > self.parent_depth + 1 {
            scan += 1;
        }
        scan
    }
}

impl Iterator for ChildrenIter {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.cursor >= self.end {
            return None;
        }
        let index = self.cursor;
        let subtree_end = self.subtree_end(index);
        self.cursor = subtree_end;
        Some(view_node(&self.nodes, index, subtree_end))
    }
}

/// Builds the public view of the flat node at `index`, whose subtree ends at
/// `subtree_end` (exclusive).
pub(crate) fn view_node(nodes: &Arc<Vec<FlatNode>>, index: usize, subtree_end: usize) -> Node {
    let flat = &nodes[index];
    let content = if flat.is_constructed {
        Content::Constructed(Children::new(
            nodes.clone(),
            index + 1..subtree_end,
            flat.depth,
        ))
    } else {
        Content::Primitive(
            flat.data_bytes
                .clone()
                .expect("primitive flat nodes carry data bytes"),
        )
    };
    Node {
        identifier: flat.identifier,
        content,
        encoded_bytes: flat.encoded_bytes.clone(),
    }
}

/// Promotes a parse result to its root node, verifying there is exactly one
/// root at depth 1.
pub(crate) fn root_node(nodes: Vec<FlatNode>) -> Result<Node> {
    let Some(first) = nodes.first() else {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "No ASN.1 nodes were parsed"
        ));
    };
    let root_depth = first.depth;
    if nodes.iter().skip(1).any(|node| node.depth <= root_depth) {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "Multiple root nodes at depth {}",
            root_depth
        ));
    }
    let nodes = Arc::new(nodes);
    let end = nodes.len();
    Ok(view_node(&nodes, 0, end))
}
