//! API model
//!
//! Catalog of the callable actions of the program under test.

use serde::{Deserialize, Serialize};

/// Whether an action creates the target or operates on it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Constructor,
    Function,
}

/// Signature of one callable action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub kind: ActionKind,
    /// Type produced by the call
    pub return_type: String,
    /// Ordered parameter types
    pub parameters: Vec<String>,
}

impl ActionDescriptor {
    pub fn function(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Function,
            return_type: return_type.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn constructor(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: &[&str],
    ) -> Self {
        Self {
            kind: ActionKind::Constructor,
            ..Self::function(name, return_type, parameters)
        }
    }
}

/// Actions available on one target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiModel {
    /// Name of the target under test
    pub target: String,
    pub actions: Vec<ActionDescriptor>,
}

impl ApiModel {
    pub fn new(target: impl Into<String>, actions: Vec<ActionDescriptor>) -> Self {
        Self {
            target: target.into(),
            actions,
        }
    }

    /// Indices of the non-constructor actions
    pub fn function_indices(&self) -> Vec<usize> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.kind == ActionKind::Function)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the actions whose return type is `semantic_type`
    pub fn producer_indices(&self, semantic_type: &str) -> Vec<usize> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.return_type == semantic_type)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_producer(&self, semantic_type: &str) -> bool {
        self.actions.iter().any(|a| a.return_type == semantic_type)
    }
}
