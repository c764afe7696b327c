use std::{cmp::Ordering, fmt};
use thiserror::Error;

use super::{bintree::TreeError, BinaryTree};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RopeError {
    #[error("position {position} is out of range for a rope of size {size}")]
    OutOfRange { position: isize, size: usize },
    #[error("range {begin}..{end} is inverted")]
    InvertedRange { begin: usize, end: usize },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Node content. A leaf's weight is the length of its own text, an internal
/// node has no text and weighs as much as its whole left subtree.
#[derive(Debug, Default)]
struct Segment {
    weight: usize,
    text: Vec<u8>,
}

impl Segment {
    fn text(text: Vec<u8>) -> Self {
        Self {
            weight: text.len(),
            text,
        }
    }

    fn weight(weight: usize) -> Self {
        Self {
            weight,
            text: Vec::new(),
        }
    }
}

type Node = BinaryTree<Segment>;

fn blank() -> Box<Node> {
    Node::leaf(Segment::default())
}

fn is_blank(node: &Node) -> bool {
    node.is_leaf() && node.content().weight == 0
}

/// A node detached on the way down to the split point.
enum Step {
    /// Descended left; `rest` is what remains of the left subtree's weight
    /// once the split is done.
    Left { node: Box<Node>, rest: usize },
    Right(Box<Node>),
}

/// Splits `node` so that the first result holds exactly `p` bytes.
///
/// The descent keeps its own stack of detached nodes, so the depth of the
/// tree never turns into call depth. Internal nodes are never left with a
/// single child and never hold an empty subtree.
fn split_node(mut node: Box<Node>, mut p: usize) -> Result<(Box<Node>, Box<Node>), TreeError> {
    let mut path = Vec::new();

    let (mut head, mut tail) = loop {
        if node.is_leaf() {
            let segment = node.content_mut();
            let tail = segment.text.split_off(p);
            segment.weight = p;
            break (node, Node::leaf(Segment::text(tail)));
        }

        let weight = node.content().weight;
        match p.cmp(&weight) {
            Ordering::Equal => {
                let right = node.extract_right().unwrap_or_else(blank);
                let left = node.extract_left().unwrap_or_else(blank);
                break (left, right);
            }
            Ordering::Less => {
                let left = node.extract_left().unwrap_or_else(blank);
                path.push(Step::Left {
                    node,
                    rest: weight - p,
                });
                node = left;
            }
            Ordering::Greater => {
                let right = node.extract_right().unwrap_or_else(blank);
                path.push(Step::Right(node));
                node = right;
                p -= weight;
            }
        }
    };

    while let Some(step) = path.pop() {
        match step {
            Step::Left { mut node, rest } => {
                // p < weight here, so the left subtree keeps `rest > 0` bytes
                debug_assert!(!is_blank(&tail));
                node.content_mut().weight = rest;
                node.insert_left(tail)?;
                tail = node;
            }
            Step::Right(mut node) => {
                // p > weight here, so the right subtree gives up at least one byte
                debug_assert!(!is_blank(&head));
                node.insert_right(head)?;
                head = node;
            }
        }
    }

    Ok((head, tail))
}

/// Binary tree of byte fragments. Structural operations consume the rope
/// they are called on and hand back ownership of the result.
#[derive(Debug)]
pub struct Rope {
    root: Box<Node>,
    len: usize,
}

impl Rope {
    pub fn new() -> Self {
        Self {
            root: blank(),
            len: 0,
        }
    }

    pub fn from_text(text: &[u8]) -> Self {
        Self::from(text.to_vec())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolves a possibly negative position. Negative positions count from
    /// the end, with `-1` meaning after the last byte.
    pub fn resolve(&self, pos: isize) -> Result<usize, RopeError> {
        let size = self.len;
        let resolved = if pos < 0 { pos + size as isize + 1 } else { pos };

        if resolved < 0 || resolved as usize > size {
            return Err(RopeError::OutOfRange {
                position: pos,
                size,
            });
        }

        Ok(resolved as usize)
    }

    pub fn resolve_range(&self, begin: isize, end: isize) -> Result<(usize, usize), RopeError> {
        let (begin, end) = (self.resolve(begin)?, self.resolve(end)?);
        if begin > end {
            return Err(RopeError::InvertedRange { begin, end });
        }

        Ok((begin, end))
    }

    pub fn split(self, p: isize) -> Result<(Rope, Rope), RopeError> {
        let p = self.resolve(p)?;
        let (left, right) = split_node(self.root, p)?;

        let left = Rope {
            root: left,
            len: p,
        };
        let right = Rope {
            root: right,
            len: self.len - p,
        };
        Ok((left, right))
    }

    pub fn join(self, other: Rope) -> Rope {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }

        let segment = Segment::weight(self.len);
        Rope {
            root: Node::new(segment, Some(self.root), Some(other.root)),
            len: self.len + other.len,
        }
    }

    pub fn insert(self, pos: isize, text: &[u8]) -> Result<Rope, RopeError> {
        let (head, tail) = self.split(pos)?;
        Ok(head.join(Rope::from_text(text).join(tail)))
    }

    pub fn delete(self, begin: isize, end: isize) -> Result<Rope, RopeError> {
        let (begin, end) = self.resolve_range(begin, end)?;
        let (rest, tail) = self.split(end as isize)?;
        let (head, _removed) = rest.split(begin as isize)?;
        Ok(head.join(tail))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = vec![&*self.root];

        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                out.extend_from_slice(&node.content().text);
                continue;
            }

            stack.extend(node.right());
            stack.extend(node.left());
        }

        out
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(&*self.root, 1)];

        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left().map(|n| (n, depth + 1)));
            stack.extend(node.right().map(|n| (n, depth + 1)));
        }

        deepest
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&*self.root];

        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                count += 1;
            }

            stack.extend(node.left());
            stack.extend(node.right());
        }

        count
    }

    /// Walks the whole tree asserting that every weight matches the size of
    /// what it describes, and that the cached length matches the total.
    #[cfg(test)]
    pub(crate) fn check_weights(&self) {
        // Post-order walk; `sizes` holds the byte count of each finished subtree.
        let mut sizes: Vec<usize> = Vec::new();
        let mut stack = vec![(&*self.root, false)];

        while let Some((node, expanded)) = stack.pop() {
            let segment = node.content();

            if node.is_leaf() {
                assert_eq!(segment.weight, segment.text.len(), "leaf weight drifted");
                sizes.push(segment.weight);
                continue;
            }

            if !expanded {
                stack.push((node, true));
                stack.extend(node.right().map(|n| (n, false)));
                stack.extend(node.left().map(|n| (n, false)));
                continue;
            }

            assert!(segment.text.is_empty(), "internal node carries text");
            let right = node.right().and_then(|_| sizes.pop()).unwrap_or(0);
            let left = node.left().and_then(|_| sizes.pop()).unwrap_or(0);
            assert_eq!(segment.weight, left, "internal weight drifted");
            sizes.push(left + right);
        }

        assert_eq!(sizes, vec![self.len]);
    }
}

impl Default for Rope {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for Rope {
    fn from(text: Vec<u8>) -> Self {
        Self {
            len: text.len(),
            root: Node::leaf(Segment::text(text)),
        }
    }
}

impl From<&[u8]> for Rope {
    fn from(text: &[u8]) -> Self {
        Self::from_text(text)
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self::from_text(text.as_bytes())
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}
