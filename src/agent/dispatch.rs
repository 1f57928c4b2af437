use serde_json::{json, Map, Value};
use tracing::warn;

use super::command::{CommandAction, ExecutionResult, MutateCommand, MutateOp};
use super::resolver;
use super::snapshot::PlanSnapshot;
use super::MAX_BULK_ITEMS;
use crate::traits::{PlanStore, PlanTable};

/// Execute one mutation command against the store.
///
/// Never returns an error: store and validation failures are folded into the
/// result so the session keeps going and the planner can react on its next
/// turn. Commands within a turn are dispatched strictly sequentially by the
/// caller — an auto-created activity's id must exist before the schedule
/// item referencing it goes in.
pub(super) async fn dispatch(
    store: &dyn PlanStore,
    plan_id: &str,
    snapshot: &PlanSnapshot,
    command: MutateCommand,
) -> ExecutionResult {
    let MutateCommand { table, op } = command;
    match op {
        MutateOp::Create { data } => dispatch_create(store, plan_id, snapshot, table, data).await,
        MutateOp::Update { id, data } => dispatch_update(store, snapshot, table, &id, data).await,
        MutateOp::Delete { id } => dispatch_delete(store, table, &id).await,
    }
}

async fn dispatch_create(
    store: &dyn PlanStore,
    plan_id: &str,
    snapshot: &PlanSnapshot,
    table: PlanTable,
    mut data: Map<String, Value>,
) -> ExecutionResult {
    if table == PlanTable::ShoppingItems {
        // Bulk mode: a list of entries under `data.items`.
        if let Some(Value::Array(entries)) = data.remove("items") {
            return dispatch_bulk_create(store, plan_id, snapshot, entries).await;
        }
        resolver::resolve_budget_link(&mut data, snapshot);
    }

    if table == PlanTable::ScheduleItems {
        resolver::resolve_activity_link(store, plan_id, &mut data).await;
        // Transient field, not a schedule-item column.
        data.remove("activity_name");
    }

    data.insert("event_id".to_string(), json!(plan_id));

    match store.insert(table, &Value::Object(data)).await {
        Ok(row) => ExecutionResult::ok(CommandAction::Create, table, Some(row)),
        Err(e) => ExecutionResult::failed(CommandAction::Create, table, e),
    }
}

/// Best-effort bulk insert: one entry's failure does not stop the rest, and
/// there is no rollback. `count` reflects successes only.
async fn dispatch_bulk_create(
    store: &dyn PlanStore,
    plan_id: &str,
    snapshot: &PlanSnapshot,
    entries: Vec<Value>,
) -> ExecutionResult {
    let mut created: Vec<Value> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    if entries.len() > MAX_BULK_ITEMS {
        warn!(
            entries = entries.len(),
            cap = MAX_BULK_ITEMS,
            "bulk shopping create exceeds cap; dropping excess entries"
        );
        errors.push(format!(
            "bulk create is capped at {} items; {} entries were not attempted",
            MAX_BULK_ITEMS,
            entries.len() - MAX_BULK_ITEMS
        ));
    }

    for entry in entries.into_iter().take(MAX_BULK_ITEMS) {
        let Value::Object(mut data) = entry else {
            errors.push("bulk entry is not an object".to_string());
            continue;
        };
        resolver::resolve_budget_link(&mut data, snapshot);
        data.insert("event_id".to_string(), json!(plan_id));

        match store.insert(PlanTable::ShoppingItems, &Value::Object(data)).await {
            Ok(row) => created.push(row),
            Err(e) => {
                warn!(error = %e, "bulk shopping insert failed; continuing with remaining entries");
                errors.push(e.to_string());
            }
        }
    }

    ExecutionResult {
        action: Some(CommandAction::Create),
        table: Some(PlanTable::ShoppingItems.name()),
        count: Some(created.len()),
        data: Some(Value::Array(created)),
        error: if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        },
    }
}

async fn dispatch_update(
    store: &dyn PlanStore,
    snapshot: &PlanSnapshot,
    table: PlanTable,
    id: &str,
    mut data: Map<String, Value>,
) -> ExecutionResult {
    if table == PlanTable::ShoppingItems {
        resolver::resolve_budget_link_for_update(&mut data, snapshot);
    }

    match store.update(table, id, &Value::Object(data)).await {
        Ok(rows) if rows.is_empty() => {
            // Zero rows affected: stale id or no-op patch. Not a silent success.
            ExecutionResult::failed(
                CommandAction::Update,
                table,
                "Item not found or no changes made",
            )
        }
        Ok(mut rows) => ExecutionResult::ok(CommandAction::Update, table, Some(rows.swap_remove(0))),
        Err(e) => ExecutionResult::failed(CommandAction::Update, table, e),
    }
}

async fn dispatch_delete(store: &dyn PlanStore, table: PlanTable, id: &str) -> ExecutionResult {
    match store.delete(table, id).await {
        Ok(()) => ExecutionResult::ok(CommandAction::Delete, table, None),
        Err(e) => ExecutionResult::failed(CommandAction::Delete, table, e),
    }
}
