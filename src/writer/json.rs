//! Dump the validated AST as JSON, for debugging the front end.

use crate::processor::validator::ValidatedMachine;

pub fn emit(machine: &ValidatedMachine) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(machine.ast())?;
    json.push('\n');
    Ok(json)
}
