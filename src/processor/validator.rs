//! Semantic checks run between parsing and code generation.
//!
//! The checks run as separate passes in a fixed order so the reported error
//! does not depend on how the tree happens to be shaped:
//!
//! 1. duplicate sibling names (depth-first, declaration order)
//! 2. initial references (level by level, top level first)
//! 3. transition events and targets (depth-first, declaration order)
//! 4. final states are leaves without transitions
//! 5. names the generated module can carry (export binding, object keys)
//!
//! Only the first violation is reported.

use std::collections::{HashMap, HashSet, VecDeque};

use super::ast::{MachineAst, Name, Scope, StateNode};
use crate::error::{Error, Result, ValidationError};
use crate::model::Pos;

/// A machine that passed every check. Only [`validate`] builds one, so the
/// writers can rely on every reference resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMachine {
    ast: MachineAst,
}

impl ValidatedMachine {
    pub fn ast(&self) -> &MachineAst {
        &self.ast
    }

    pub fn name(&self) -> Option<&str> {
        self.ast.name.as_ref().map(Name::as_str)
    }

    pub fn scope(&self) -> &Scope {
        &self.ast.scope
    }
}

pub fn validate(ast: MachineAst) -> Result<ValidatedMachine> {
    check_duplicate_states(&ast.scope)?;
    check_initials(&ast)?;
    check_transitions(&ast.scope)?;
    check_final_states(&ast.scope)?;
    check_binding(&ast)?;
    check_keys(&ast.scope)?;

    tracing::debug!(states = ast.state_count(), "machine validated");
    Ok(ValidatedMachine { ast })
}

/// Sibling lookup table for one scope.
fn scope_table(scope: &Scope) -> HashMap<&str, &StateNode> {
    scope
        .states
        .iter()
        .map(|s| (s.name.as_str(), s))
        .collect()
}

fn check_duplicate_states(scope: &Scope) -> Result<()> {
    let mut seen = HashSet::new();
    for state in &scope.states {
        if !seen.insert(state.name.as_str()) {
            return Err(Error::new(
                state.name.pos,
                ValidationError::DuplicateState {
                    name: state.name.value.clone(),
                },
            ));
        }
    }

    for state in &scope.states {
        check_duplicate_states(&state.children)?;
    }
    Ok(())
}

/// The scope being checked and who owns it, for diagnostics.
struct Owner<'a> {
    label: String,
    pos: Pos,
    scope: &'a Scope,
}

fn check_initials(ast: &MachineAst) -> Result<()> {
    if ast.scope.is_empty() {
        return Err(Error::new(ast.pos, ValidationError::EmptyMachine));
    }

    let label = match &ast.name {
        Some(name) => format!("machine '{}'", name.value),
        None => "machine".to_string(),
    };
    let mut queue = VecDeque::from([Owner {
        label,
        pos: ast.pos,
        scope: &ast.scope,
    }]);

    while let Some(owner) = queue.pop_front() {
        check_scope_initial(&owner)?;

        for state in &owner.scope.states {
            queue.push_back(Owner {
                label: format!("state '{}'", state.name.value),
                pos: state.name.pos,
                scope: &state.children,
            });
        }
    }
    Ok(())
}

fn check_scope_initial(owner: &Owner<'_>) -> Result<()> {
    let scope = owner.scope;

    if let Some(extra) = scope.initial_decls.get(1) {
        return Err(Error::new(
            extra.pos,
            ValidationError::DuplicateInitial {
                scope: owner.label.clone(),
                name: extra.value.clone(),
            },
        ));
    }

    match scope.initial() {
        None if !scope.is_empty() => Err(Error::new(
            owner.pos,
            ValidationError::MissingInitial {
                scope: owner.label.clone(),
            },
        )),
        Some(initial) if scope.get(initial.as_str()).is_none() => Err(Error::new(
            initial.pos,
            ValidationError::UnresolvedInitial {
                scope: owner.label.clone(),
                name: initial.value.clone(),
            },
        )),
        _ => Ok(()),
    }
}

fn check_transitions(scope: &Scope) -> Result<()> {
    let siblings = scope_table(scope);

    for state in &scope.states {
        let mut events = HashSet::new();
        for t in &state.transitions {
            if !events.insert(t.event.as_str()) {
                return Err(Error::new(
                    t.event.pos,
                    ValidationError::DuplicateEvent {
                        state: state.name.value.clone(),
                        event: t.event.value.clone(),
                    },
                ));
            }
            if !siblings.contains_key(t.target.as_str()) {
                return Err(Error::new(
                    t.target.pos,
                    ValidationError::UnresolvedTarget {
                        state: state.name.value.clone(),
                        event: t.event.value.clone(),
                        target: t.target.value.clone(),
                    },
                ));
            }
        }

        check_transitions(&state.children)?;
    }
    Ok(())
}

fn check_final_states(scope: &Scope) -> Result<()> {
    for state in &scope.states {
        if state.is_final {
            if !state.is_leaf() {
                return Err(Error::new(
                    state.name.pos,
                    ValidationError::FinalWithChildren {
                        name: state.name.value.clone(),
                    },
                ));
            }
            if !state.transitions.is_empty() {
                return Err(Error::new(
                    state.name.pos,
                    ValidationError::FinalWithTransitions {
                        name: state.name.value.clone(),
                    },
                ));
            }
        }

        check_final_states(&state.children)?;
    }
    Ok(())
}

/// Words a module cannot bind with `export const`, plus the runtime import.
const RESERVED_BINDINGS: &[&str] = &[
    "Machine", "arguments", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in", "instanceof", "interface",
    "let", "new", "null", "package", "private", "protected", "public", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "yield",
];

fn check_binding(ast: &MachineAst) -> Result<()> {
    match &ast.name {
        Some(name) if RESERVED_BINDINGS.contains(&name.as_str()) => Err(Error::new(
            name.pos,
            ValidationError::InvalidBinding {
                name: name.value.clone(),
            },
        )),
        _ => Ok(()),
    }
}

// `__proto__:` in an object literal sets the prototype instead of a key,
// quoted or not.
fn is_reserved_key(name: &Name) -> bool {
    name.as_str() == "__proto__"
}

fn reserved_key(name: &Name) -> Error {
    Error::new(
        name.pos,
        ValidationError::ReservedKey {
            name: name.value.clone(),
        },
    )
}

fn check_keys(scope: &Scope) -> Result<()> {
    for state in &scope.states {
        if is_reserved_key(&state.name) {
            return Err(reserved_key(&state.name));
        }
        if let Some(t) = state.transitions.iter().find(|t| is_reserved_key(&t.event)) {
            return Err(reserved_key(&t.event));
        }

        check_keys(&state.children)?;
    }
    Ok(())
}
