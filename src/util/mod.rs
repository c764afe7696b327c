pub(crate) mod bintree;
pub(crate) mod rope;

pub(crate) use self::bintree::BinaryTree;
pub(crate) use self::rope::{Rope, RopeError};
