//! Typed model of the configuration literal handed to `Machine(...)`.
//!
//! Each state becomes exactly one [`StateConfig`] variant, so a final state
//! with an `on` map or a compound state without an `initial` cannot be
//! represented at all.

use crate::processor::ast::{Scope, StateNode};
use crate::processor::validator::ValidatedMachine;

/// `initial` + `states` of a machine or compound state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildStates {
    pub initial: String,
    pub states: Vec<(String, StateConfig)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateConfig {
    /// `{ type: 'final' }`
    Final,
    /// A leaf, with its `on` map when it has transitions.
    Atomic { on: Vec<(String, String)> },
    /// A state with its own sub-machine.
    Compound {
        on: Vec<(String, String)>,
        children: ChildStates,
    },
}

impl StateConfig {
    fn from_node(node: &StateNode) -> Self {
        if node.is_final {
            return StateConfig::Final;
        }

        let on = node
            .transitions
            .iter()
            .map(|t| (t.event.value.clone(), t.target.value.clone()))
            .collect();

        match ChildStates::from_scope(&node.children) {
            Some(children) => StateConfig::Compound { on, children },
            None => StateConfig::Atomic { on },
        }
    }

    /// Lowers to the generic object tree the renderer prints.
    pub fn to_js(&self) -> JsValue {
        let mut props = Vec::new();
        match self {
            StateConfig::Final => {
                props.push(("type".to_string(), JsValue::Str("final".to_string())));
            }
            StateConfig::Atomic { on } => push_on(&mut props, on),
            StateConfig::Compound { on, children } => {
                push_on(&mut props, on);
                children.push_props(&mut props);
            }
        }
        JsValue::Object(props)
    }
}

fn push_on(props: &mut Vec<(String, JsValue)>, on: &[(String, String)]) {
    if on.is_empty() {
        return;
    }
    let map = on
        .iter()
        .map(|(event, target)| (event.clone(), JsValue::Str(target.clone())))
        .collect();
    props.push(("on".to_string(), JsValue::Object(map)));
}

impl ChildStates {
    /// `None` for an empty scope; validation guarantees `initial` otherwise.
    fn from_scope(scope: &Scope) -> Option<Self> {
        let initial = scope.initial()?;
        if scope.is_empty() {
            return None;
        }
        let states = scope
            .states
            .iter()
            .map(|s| (s.name.value.clone(), StateConfig::from_node(s)))
            .collect();
        Some(ChildStates {
            initial: initial.value.clone(),
            states,
        })
    }

    fn push_props(&self, props: &mut Vec<(String, JsValue)>) {
        props.push(("initial".to_string(), JsValue::Str(self.initial.clone())));
        let states = self
            .states
            .iter()
            .map(|(name, config)| (name.clone(), config.to_js()))
            .collect();
        props.push(("states".to_string(), JsValue::Object(states)));
    }
}

/// Root configuration: the top-level `initial` and `states`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub root: ChildStates,
}

impl MachineConfig {
    pub fn from_machine(machine: &ValidatedMachine) -> Self {
        // a validated machine always has at least one state and an initial
        let root = ChildStates::from_scope(machine.scope()).unwrap_or_else(|| ChildStates {
            initial: String::new(),
            states: Vec::new(),
        });
        Self { root }
    }

    pub fn to_js(&self) -> JsValue {
        let mut props = Vec::new();
        self.root.push_props(&mut props);
        JsValue::Object(props)
    }
}

/// The subset of JS literals the generator needs. Object properties keep
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsValue {
    Str(String),
    Object(Vec<(String, JsValue)>),
}
