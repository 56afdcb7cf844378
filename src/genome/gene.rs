//! Gene trees
//!
//! A test case is a tree of genes: action genes (calls) own their argument
//! subtrees, primitive genes are leaves holding a value.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::genome::primitive::{PrimitiveType, PrimitiveValue};

/// Opaque identity of a gene
///
/// Stable across point mutation, replaced when a gene is resampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeneId(pub u64);

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Role a gene plays in the test case
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneKind {
    /// Root of a test case: an ordered list of top-level calls
    Sequence,
    /// Constructor invocation
    Constructor,
    /// Function or method invocation
    FunctionCall,
    /// Leaf value
    Primitive,
}

/// An invocation with an ordered argument list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionGene {
    /// Gene identity
    pub id: GeneId,
    /// Name of the invoked action
    pub name: String,
    /// Type the action produces
    pub semantic_type: String,
    /// Sequence, constructor or function call
    pub kind: GeneKind,
    /// Arguments, fixed in count and type by the action signature
    pub arguments: Vec<Gene>,
}

/// A leaf value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveGene {
    /// Gene identity
    pub id: GeneId,
    /// Declared type name
    pub semantic_type: String,
    /// Parsed domain parameters
    pub ty: PrimitiveType,
    /// Current value
    pub value: PrimitiveValue,
}

/// A node of a test-case tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Gene {
    /// Invocation node
    Action(ActionGene),
    /// Leaf node
    Primitive(PrimitiveGene),
}

impl Gene {
    /// Create an action gene
    pub fn action(
        id: GeneId,
        name: impl Into<String>,
        semantic_type: impl Into<String>,
        kind: GeneKind,
        arguments: Vec<Gene>,
    ) -> Self {
        Self::Action(ActionGene {
            id,
            name: name.into(),
            semantic_type: semantic_type.into(),
            kind,
            arguments,
        })
    }

    /// Create a primitive gene
    pub fn primitive(
        id: GeneId,
        semantic_type: impl Into<String>,
        ty: PrimitiveType,
        value: PrimitiveValue,
    ) -> Self {
        Self::Primitive(PrimitiveGene {
            id,
            semantic_type: semantic_type.into(),
            ty,
            value,
        })
    }

    pub fn id(&self) -> GeneId {
        match self {
            Self::Action(a) => a.id,
            Self::Primitive(p) => p.id,
        }
    }

    pub fn semantic_type(&self) -> &str {
        match self {
            Self::Action(a) => &a.semantic_type,
            Self::Primitive(p) => &p.semantic_type,
        }
    }

    pub fn kind(&self) -> GeneKind {
        match self {
            Self::Action(a) => a.kind,
            Self::Primitive(_) => GeneKind::Primitive,
        }
    }

    /// Check if this is an action node
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    /// Check if this is a primitive leaf
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Whether this node has argument subtrees
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Argument subtrees (empty for leaves)
    pub fn children(&self) -> &[Gene] {
        match self {
            Self::Action(a) => &a.arguments,
            Self::Primitive(_) => &[],
        }
    }

    /// Deep, fully independent clone with the same id
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Variable name used when the tree is rendered as source
    pub fn var_name(&self) -> String {
        let base: String = self
            .semantic_type()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{}", base, self.id().0)
    }

    /// Get the depth of this subtree
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Get the number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    /// Get all node positions (preorder traversal paths)
    pub fn positions(&self) -> Vec<Vec<usize>> {
        let mut positions = Vec::new();
        self.collect_positions(&[], &mut positions);
        positions
    }

    fn collect_positions(&self, path: &[usize], positions: &mut Vec<Vec<usize>>) {
        positions.push(path.to_vec());
        for (i, child) in self.children().iter().enumerate() {
            let mut child_path = path.to_vec();
            child_path.push(i);
            child.collect_positions(&child_path, positions);
        }
    }

    /// Get all node positions in breadth-first order
    pub fn breadth_first_positions(&self) -> Vec<Vec<usize>> {
        let mut positions = Vec::new();
        let mut queue: VecDeque<(Vec<usize>, &Gene)> = VecDeque::new();
        queue.push_back((Vec::new(), self));

        while let Some((path, node)) = queue.pop_front() {
            for (i, child) in node.children().iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                queue.push_back((child_path, child));
            }
            positions.push(path);
        }

        positions
    }

    /// Get a subtree at the given path
    pub fn get_subtree(&self, path: &[usize]) -> Option<&Self> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => self.children().get(idx)?.get_subtree(rest),
        }
    }

    /// Get a mutable subtree at the given path
    pub fn get_subtree_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => match self {
                Self::Action(a) => a.arguments.get_mut(idx)?.get_subtree_mut(rest),
                Self::Primitive(_) => None,
            },
        }
    }

    /// Replace a subtree at the given path
    ///
    /// Returns the replaced subtree, or `None` if the path does not exist.
    pub fn replace_subtree(&mut self, path: &[usize], new_subtree: Self) -> Option<Self> {
        let slot = self.get_subtree_mut(path)?;
        Some(std::mem::replace(slot, new_subtree))
    }

    /// Check whether two nodes may stand in for each other
    ///
    /// Nodes match when they share a semantic type and are both actions or
    /// both primitives.
    pub fn type_matches(&self, other: &Self) -> bool {
        self.semantic_type() == other.semantic_type() && self.is_action() == other.is_action()
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p.value),
            Self::Action(a) => {
                write!(f, "{}(", a.name)?;
                for (i, arg) in a.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(id: u64, v: f64) -> Gene {
        Gene::primitive(
            GeneId(id),
            "uint8",
            PrimitiveType::Numeric {
                bits: 8,
                signed: false,
                decimals: 0,
            },
            PrimitiveValue::Numeric(v),
        )
    }

    // transfer(1, approve(2, 3))
    fn sample_tree() -> Gene {
        let inner = Gene::action(
            GeneId(10),
            "approve",
            "uint8",
            GeneKind::FunctionCall,
            vec![uint(2, 2.0), uint(3, 3.0)],
        );
        Gene::action(
            GeneId(20),
            "transfer",
            "bool",
            GeneKind::FunctionCall,
            vec![uint(1, 1.0), inner],
        )
    }

    #[test]
    fn test_leaf_has_no_children() {
        let leaf = uint(1, 5.0);
        assert!(!leaf.has_children());
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.depth(), 1);
        assert_eq!(leaf.size(), 1);
    }

    #[test]
    fn test_action_without_arguments_has_no_children() {
        let call = Gene::action(GeneId(1), "pause", "void", GeneKind::FunctionCall, vec![]);
        assert!(!call.has_children());
        assert!(call.children().is_empty());
    }

    #[test]
    fn test_depth_and_size() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn test_positions_preorder() {
        let positions = sample_tree().positions();
        assert_eq!(
            positions,
            vec![vec![], vec![0], vec![1], vec![1, 0], vec![1, 1]]
        );
    }

    #[test]
    fn test_positions_breadth_first() {
        let tree = Gene::action(
            GeneId(0),
            "root",
            "T",
            GeneKind::Sequence,
            vec![sample_tree(), uint(9, 9.0)],
        );
        let positions = tree.breadth_first_positions();
        assert_eq!(positions[0], Vec::<usize>::new());
        assert_eq!(positions[1], vec![0]);
        assert_eq!(positions[2], vec![1]);
        assert_eq!(positions[3], vec![0, 0]);
        assert_eq!(positions.len(), tree.size());
    }

    #[test]
    fn test_get_and_replace_subtree() {
        let mut tree = sample_tree();
        assert_eq!(tree.get_subtree(&[1, 0]).map(|g| g.id()), Some(GeneId(2)));
        assert!(tree.get_subtree(&[0, 0]).is_none());

        let old = tree.replace_subtree(&[1, 0], uint(99, 42.0)).unwrap();
        assert_eq!(old.id(), GeneId(2));
        assert_eq!(tree.get_subtree(&[1, 0]).map(|g| g.id()), Some(GeneId(99)));
        assert!(tree.replace_subtree(&[5], uint(100, 0.0)).is_none());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = sample_tree();
        let mut copy = original.copy();
        assert_eq!(copy, original);

        copy.replace_subtree(&[0], uint(50, 200.0));
        assert_ne!(copy, original);
        assert_eq!(original.get_subtree(&[0]).map(|g| g.id()), Some(GeneId(1)));
    }

    #[test]
    fn test_display() {
        assert_eq!(sample_tree().to_string(), "transfer(1, approve(2, 3))");
    }

    #[test]
    fn test_var_name() {
        assert_eq!(uint(7, 0.0).var_name(), "uint8_7");
    }

    #[test]
    fn test_type_matches() {
        let a = uint(1, 1.0);
        let b = uint(2, 2.0);
        let call = Gene::action(GeneId(3), "f", "uint8", GeneKind::FunctionCall, vec![]);
        assert!(a.type_matches(&b));
        assert!(!a.type_matches(&call));
    }
}
