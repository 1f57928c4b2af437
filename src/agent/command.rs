use serde::Serialize;
use serde_json::{Map, Value};

use crate::traits::{PlanTable, ToolCall};

/// What a mutation does to its target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Create,
    Update,
    Delete,
}

/// One mutation against one plan table, parsed from a planner tool call.
///
/// `id` requiredness is enforced at parse time, so update/delete carry it
/// unconditionally.
#[derive(Debug, Clone)]
pub struct MutateCommand {
    pub table: PlanTable,
    pub op: MutateOp,
}

#[derive(Debug, Clone)]
pub enum MutateOp {
    Create { data: Map<String, Value> },
    Update { id: String, data: Map<String, Value> },
    Delete { id: String },
}

/// Outcome of dispatching one command.
///
/// Exactly one of these exists per dispatched command, success or failure;
/// it is appended to the session results log and echoed back to the planner
/// as an observation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CommandAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ExecutionResult {
    pub fn ok(action: CommandAction, table: PlanTable, data: Option<Value>) -> Self {
        Self {
            action: Some(action),
            table: Some(table.name()),
            data,
            ..Self::default()
        }
    }

    pub fn failed(action: CommandAction, table: PlanTable, error: impl ToString) -> Self {
        Self {
            action: Some(action),
            table: Some(table.name()),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// A command that never reached the store (unknown name, bad payload).
    pub fn rejected(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Extract the summary from a `done` call's arguments.
pub(super) fn done_summary(arguments: &str) -> Option<String> {
    let args: Value = serde_json::from_str(arguments).ok()?;
    args["summary"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a planner tool call into a mutation command.
///
/// The error string becomes a rejected [`ExecutionResult`]; it is written
/// for the planner to read and react to on its next turn.
pub(super) fn parse_mutation(call: &ToolCall) -> Result<MutateCommand, String> {
    let table = match call.name.as_str() {
        "mutate_tasks" => PlanTable::Tasks,
        "mutate_budget" => PlanTable::BudgetItems,
        "mutate_activities" => PlanTable::Activities,
        "mutate_shopping" => PlanTable::ShoppingItems,
        "mutate_schedule" => PlanTable::ScheduleItems,
        other => return Err(format!("unknown command '{}'", other)),
    };

    let args: Value = serde_json::from_str(&call.arguments)
        .map_err(|e| format!("arguments for '{}' are not valid JSON: {}", call.name, e))?;

    let data = args["data"].as_object().cloned().unwrap_or_default();
    let id = normalize_id(&args["id"]);

    let op = match args["action"].as_str() {
        Some("create") => MutateOp::Create { data },
        Some("update") => match id {
            Some(id) => MutateOp::Update { id, data },
            None => return Err("'update' requires an id".to_string()),
        },
        Some("delete") => match id {
            Some(id) => MutateOp::Delete { id },
            None => return Err("'delete' requires an id".to_string()),
        },
        Some(other) => return Err(format!("unknown action '{}'", other)),
        None => return Err("missing 'action' field".to_string()),
    };

    Ok(MutateCommand { table, op })
}

/// The catalog declares `id` as a string, but planners routinely emit
/// numbers; accept either and normalize to text.
fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
