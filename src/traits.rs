use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the five plan tables the agent may mutate.
///
/// The set is closed so dispatch is exhaustively matched instead of keyed
/// off command-name strings; a planner typo surfaces as a rejected command,
/// never a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanTable {
    Tasks,
    BudgetItems,
    Activities,
    ShoppingItems,
    ScheduleItems,
}

impl PlanTable {
    /// Store-side table name.
    pub fn name(self) -> &'static str {
        match self {
            PlanTable::Tasks => "tasks",
            PlanTable::BudgetItems => "budget_items",
            PlanTable::Activities => "activities",
            PlanTable::ShoppingItems => "shopping_items",
            PlanTable::ScheduleItems => "schedule_items",
        }
    }
}

/// A single tool call as returned by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String, // JSON string
}

/// Token usage statistics from an LLM API response.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The LLM's response: either content text, tool calls, or both.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

/// Model provider — sends messages + tool defs to an LLM, gets back response.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(
        &self,
        model: &str,
        messages: &[Value],
        tools: &[Value],
    ) -> anyhow::Result<ProviderResponse>;
}

/// Entity-store client — per-table CRUD against the plan backend.
///
/// The store is authoritative for all plan data; the agent only reads a
/// point-in-time snapshot and issues independent single-row mutations.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// All rows of `table` belonging to the plan.
    async fn list(&self, table: PlanTable, plan_id: &str) -> anyhow::Result<Vec<Value>>;

    /// Insert one row, returning the created row (with its assigned id).
    async fn insert(&self, table: PlanTable, row: &Value) -> anyhow::Result<Value>;

    /// Patch one row by id, returning the affected rows (may be empty).
    async fn update(&self, table: PlanTable, id: &str, patch: &Value)
        -> anyhow::Result<Vec<Value>>;

    /// Delete one row by id. Deleting a missing row is not an error.
    async fn delete(&self, table: PlanTable, id: &str) -> anyhow::Result<()>;
}
