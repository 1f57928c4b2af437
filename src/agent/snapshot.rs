use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::{PlanStore, PlanTable};

/// Point-in-time copy of the plan's five collections.
///
/// Fetched once at session start and not refreshed while the session runs:
/// both the planner's context and the resolver's lookups read this copy, so
/// mutations made during the session are only visible to the planner through
/// command observations, not through the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanSnapshot {
    #[serde(default)]
    pub tasks: Vec<Value>,
    #[serde(default)]
    pub budget: Vec<Value>,
    #[serde(default)]
    pub activities: Vec<Value>,
    #[serde(default)]
    pub shopping: Vec<Value>,
    #[serde(default)]
    pub schedule: Vec<Value>,
}

impl PlanSnapshot {
    pub async fn fetch(store: &dyn PlanStore, plan_id: &str) -> anyhow::Result<Self> {
        Ok(Self {
            tasks: store.list(PlanTable::Tasks, plan_id).await?,
            budget: store.list(PlanTable::BudgetItems, plan_id).await?,
            activities: store.list(PlanTable::Activities, plan_id).await?,
            shopping: store.list(PlanTable::ShoppingItems, plan_id).await?,
            schedule: store.list(PlanTable::ScheduleItems, plan_id).await?,
        })
    }
}
