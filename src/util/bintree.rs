use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("left child is already occupied")]
    LeftOccupied,
    #[error("right child is already occupied")]
    RightOccupied,
}

/// Heap allocated binary tree node. Every node exclusively owns its children.
#[derive(Debug)]
pub struct BinaryTree<T> {
    left: Option<Box<BinaryTree<T>>>,
    right: Option<Box<BinaryTree<T>>>,
    content: T,
}

impl<T> BinaryTree<T> {
    pub fn new(content: T, left: Option<Box<Self>>, right: Option<Box<Self>>) -> Box<Self> {
        Box::new(Self {
            left,
            right,
            content,
        })
    }

    pub fn leaf(content: T) -> Box<Self> {
        Self::new(content, None, None)
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut T {
        &mut self.content
    }

    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    pub fn insert_left(&mut self, subtree: Box<Self>) -> Result<(), TreeError> {
        if self.left.is_some() {
            return Err(TreeError::LeftOccupied);
        }

        self.left = Some(subtree);
        Ok(())
    }

    pub fn insert_right(&mut self, subtree: Box<Self>) -> Result<(), TreeError> {
        if self.right.is_some() {
            return Err(TreeError::RightOccupied);
        }

        self.right = Some(subtree);
        Ok(())
    }

    pub fn extract_left(&mut self) -> Option<Box<Self>> {
        self.left.take()
    }

    pub fn extract_right(&mut self) -> Option<Box<Self>> {
        self.right.take()
    }
}

impl<T> Drop for BinaryTree<T> {
    // Children are detached onto a worklist before they drop, so each node
    // dies childless and the drop glue never recurses.
    fn drop(&mut self) {
        let mut stack: Vec<Box<BinaryTree<T>>> =
            self.left.take().into_iter().chain(self.right.take()).collect();

        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::Cell, rc::Rc};

    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn insert_left_fails_when_occupied() {
        let mut tree = BinaryTree::leaf(0);

        assert_eq!(tree.insert_left(BinaryTree::leaf(1)), Ok(()));
        assert_eq!(
            tree.insert_left(BinaryTree::leaf(2)),
            Err(TreeError::LeftOccupied)
        );
        assert_eq!(*tree.left().unwrap().content(), 1);
    }

    #[test]
    fn insert_right_does_not_overwrite() {
        let mut tree = BinaryTree::leaf(0);
        tree.insert_right(BinaryTree::leaf(1)).unwrap();

        assert_eq!(
            tree.insert_right(BinaryTree::leaf(2)),
            Err(TreeError::RightOccupied)
        );
        assert_eq!(*tree.right().unwrap().content(), 1);
    }

    #[test]
    fn extract_detaches_child() {
        let mut tree = BinaryTree::new(0, Some(BinaryTree::leaf(1)), Some(BinaryTree::leaf(2)));
        assert!(!tree.is_leaf());

        let left = tree.extract_left().unwrap();
        assert_eq!(*left.content(), 1);
        assert!(tree.left().is_none());
        assert!(tree.extract_left().is_none());

        let right = tree.extract_right().unwrap();
        assert_eq!(*right.content(), 2);
        assert!(tree.is_leaf());
    }

    #[test]
    fn drop_releases_every_payload() {
        let drops = Rc::new(Cell::new(0));
        let counted = || Counted(drops.clone());

        let tree = BinaryTree::new(
            counted(),
            Some(BinaryTree::new(
                counted(),
                Some(BinaryTree::leaf(counted())),
                None,
            )),
            Some(BinaryTree::leaf(counted())),
        );
        drop(tree);

        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn drop_survives_degenerate_depth() {
        let mut tree = BinaryTree::leaf(0u32);
        for i in 1..500_000 {
            tree = BinaryTree::new(i, Some(tree), None);
        }

        drop(tree);
    }
}
