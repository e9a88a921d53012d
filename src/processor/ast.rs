//! AST for one machine declaration *before* validation.
//!
//! The tree owns its states outright. Initial references and transition
//! targets are plain [`Name`]s looked up per scope by the validator.

use serde::Serialize;

use crate::model::Pos;

/// A state or event name together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
    pub pos: Pos,
}

// Dumped as a bare string; positions only matter for diagnostics.
impl Serialize for Name {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.value)
    }
}

impl Name {
    pub fn new(value: impl Into<String>, pos: Pos) -> Self {
        Self {
            value: value.into(),
            pos,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// `event: target` inside an `on { … }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub event: Name,
    pub target: Name,
}

/// A list of sibling states and the declarations of which one starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scope {
    /// Every `initial` seen in this block, in source order. Validation
    /// requires exactly one when `states` is non-empty.
    #[serde(rename = "initial", serialize_with = "first_initial")]
    pub initial_decls: Vec<Name>,
    pub states: Vec<StateNode>,
}

impl Scope {
    pub fn initial(&self) -> Option<&Name> {
        self.initial_decls.first()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StateNode> {
        self.states.iter().find(|s| s.name.value == name)
    }
}

fn first_initial<S: serde::Serializer>(decls: &[Name], ser: S) -> Result<S::Ok, S::Error> {
    match decls.first() {
        Some(name) => ser.serialize_some(&name.value),
        None => ser.serialize_none(),
    }
}

/// One state in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateNode {
    pub name: Name,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub transitions: Vec<Transition>,
    pub children: Scope,
}

impl StateNode {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            is_final: false,
            transitions: Vec::new(),
            children: Scope::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Root of the tree: `machine <name>? { … }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineAst {
    /// `None` for `machine { … }`, which is exported as the module default.
    pub name: Option<Name>,
    #[serde(skip)]
    pub pos: Pos,
    #[serde(flatten)]
    pub scope: Scope,
}

impl MachineAst {
    /// Number of states at every depth.
    pub fn state_count(&self) -> usize {
        fn count(scope: &Scope) -> usize {
            scope
                .states
                .iter()
                .map(|s| 1 + count(&s.children))
                .sum()
        }
        count(&self.scope)
    }
}
