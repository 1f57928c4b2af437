//! Heuristic repair of under-specified cross-entity references.
//!
//! Fills gaps in command data before dispatch — never deletes or overwrites
//! fields the planner set. All lookups go against the session snapshot, not
//! the live store.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::snapshot::PlanSnapshot;
use crate::traits::{PlanStore, PlanTable};

/// Fill in a missing `budget_id` on a shopping-item create.
///
/// Matches `category` (case-insensitive) against the snapshot's budget rows,
/// falling back to the first budget row when nothing matches. Leaves the
/// field unset when the plan has no budget items at all.
pub(super) fn resolve_budget_link(data: &mut Map<String, Value>, snapshot: &PlanSnapshot) {
    if data.get("budget_id").is_some_and(|v| !v.is_null()) {
        return;
    }

    let category = data
        .get("category")
        .and_then(Value::as_str)
        .unwrap_or("Miscellaneous")
        .to_string();

    if let Some(id) = budget_id_for_category(snapshot, &category) {
        info!(category = %category, budget_id = %id, "auto-resolved budget link");
        data.insert("budget_id".to_string(), id);
    } else if let Some(id) = snapshot.budget.first().and_then(|b| b.get("id")).cloned() {
        info!(category = %category, budget_id = %id, "no category match; defaulted budget link to first budget item");
        data.insert("budget_id".to_string(), id);
    } else {
        warn!(category = %category, "plan has no budget items; leaving budget_id unset");
    }
}

/// Match-only variant for shopping-item updates: a category change re-links
/// the budget only when an exact category match exists — no first-item
/// fallback, so an unrecognized category leaves the existing link alone.
pub(super) fn resolve_budget_link_for_update(
    data: &mut Map<String, Value>,
    snapshot: &PlanSnapshot,
) {
    if data.contains_key("budget_id") {
        return;
    }
    let Some(category) = data.get("category").and_then(Value::as_str).map(str::to_string)
    else {
        return;
    };

    if let Some(id) = budget_id_for_category(snapshot, &category) {
        info!(category = %category, budget_id = %id, "auto-resolved budget link on update");
        data.insert("budget_id".to_string(), id);
    }
}

fn budget_id_for_category(snapshot: &PlanSnapshot, category: &str) -> Option<Value> {
    let wanted = category.to_lowercase();
    snapshot
        .budget
        .iter()
        .find(|row| {
            row.get("category")
                .and_then(Value::as_str)
                .is_some_and(|c| c.to_lowercase() == wanted)
        })
        .and_then(|row| row.get("id"))
        .cloned()
}

/// Resolve `activity_id` for a schedule-item create, creating the activity
/// when the planner supplied only a name. A failed create leaves the link
/// unset and the schedule item still goes in.
pub(super) async fn resolve_activity_link(
    store: &dyn PlanStore,
    plan_id: &str,
    data: &mut Map<String, Value>,
) {
    if data.get("activity_id").is_some_and(|v| !v.is_null()) {
        return;
    }
    let Some(name) = data
        .get("activity_name")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return;
    };

    let row = json!({
        "event_id": plan_id,
        "name": name,
        "description": data.get("description").cloned().unwrap_or_else(|| json!("Created by Agent")),
        "notes": data.get("notes").cloned().unwrap_or_else(|| json!("")),
    });

    match store.insert(PlanTable::Activities, &row).await {
        Ok(created) => {
            if let Some(id) = created.get("id").cloned() {
                info!(activity = %name, activity_id = %id, "auto-created activity for schedule item");
                data.insert("activity_id".to_string(), id);
            }
        }
        Err(e) => {
            warn!(activity = %name, error = %e, "activity auto-create failed; scheduling without link");
        }
    }
}
