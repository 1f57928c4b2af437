//! Test infrastructure: MockProvider, MockPlanStore, and TestHarness.
//!
//! Provides a fully wired Agent with a scripted planner and an in-memory
//! plan store, suitable for tests that exercise the real session loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::agent::Agent;
use crate::traits::{ModelProvider, PlanStore, PlanTable, ProviderResponse, TokenUsage, ToolCall};

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

/// A recorded call to `MockProvider::chat()`.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct MockChatCall {
    pub model: String,
    pub messages: Vec<Value>,
    pub tools: Vec<Value>,
}

/// Mock planner that returns scripted responses in FIFO order.
pub struct MockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    pub call_log: Mutex<Vec<MockChatCall>>,
}

impl MockProvider {
    /// Create a provider that always returns a plain text response.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            call_log: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider with a FIFO queue of scripted responses.
    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_log: Mutex::new(Vec::new()),
        }
    }

    /// Helper: build a text-only response (no commands).
    pub fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            content: Some(text.to_string()),
            tool_calls: vec![],
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            }),
        }
    }

    /// Helper: build a response carrying one command call.
    pub fn tool_call_response(tool_name: &str, args: &str) -> ProviderResponse {
        Self::tool_calls_response(&[(tool_name, args)])
    }

    /// Helper: build a response carrying several command calls in order.
    pub fn tool_calls_response(calls: &[(&str, &str)]) -> ProviderResponse {
        ProviderResponse {
            content: None,
            tool_calls: calls
                .iter()
                .map(|(name, args)| ToolCall {
                    id: format!("call_{}", uuid::Uuid::new_v4()),
                    name: name.to_string(),
                    arguments: args.to_string(),
                })
                .collect(),
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            }),
        }
    }

    /// Helper: build a `done` completion response.
    pub fn done_response(summary: &str) -> ProviderResponse {
        Self::tool_call_response("done", &json!({"summary": summary}).to_string())
    }

    /// How many times `chat()` was called.
    pub async fn call_count(&self) -> usize {
        self.call_log.lock().await.len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn chat(
        &self,
        model: &str,
        messages: &[Value],
        tools: &[Value],
    ) -> anyhow::Result<ProviderResponse> {
        self.call_log.lock().await.push(MockChatCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
        });

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            Ok(MockProvider::text_response("Mock response"))
        } else {
            Ok(responses.remove(0))
        }
    }
}

// ---------------------------------------------------------------------------
// MockPlanStore
// ---------------------------------------------------------------------------

/// In-memory plan store with auto-increment ids and scriptable failures.
pub struct MockPlanStore {
    tables: Mutex<HashMap<PlanTable, Vec<Value>>>,
    next_id: Mutex<i64>,
    /// Any insert whose serialized row contains one of these markers fails.
    poisoned: Mutex<Vec<String>>,
    /// Log of store calls, e.g. "list tasks", "insert activities".
    pub call_log: Mutex<Vec<String>>,
}

impl MockPlanStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            next_id: Mutex::new(100),
            poisoned: Mutex::new(Vec::new()),
            call_log: Mutex::new(Vec::new()),
        }
    }

    /// Seed a table with rows. Rows keep whatever ids they carry.
    pub async fn seed(&self, table: PlanTable, rows: Vec<Value>) {
        self.tables.lock().await.insert(table, rows);
    }

    /// Make inserts fail when the serialized row contains `marker`.
    pub async fn poison_inserts_containing(&self, marker: &str) {
        self.poisoned.lock().await.push(marker.to_string());
    }

    /// Current contents of a table.
    pub async fn rows(&self, table: PlanTable) -> Vec<Value> {
        self.tables.lock().await.get(&table).cloned().unwrap_or_default()
    }

    pub async fn store_call_count(&self) -> usize {
        self.call_log.lock().await.len()
    }

    fn id_matches(row: &Value, id: &str) -> bool {
        match row.get("id") {
            Some(Value::Number(n)) => n.to_string() == id,
            Some(Value::String(s)) => s == id,
            _ => false,
        }
    }
}

#[async_trait]
impl PlanStore for MockPlanStore {
    async fn list(&self, table: PlanTable, plan_id: &str) -> anyhow::Result<Vec<Value>> {
        self.call_log
            .lock()
            .await
            .push(format!("list {}", table.name()));
        let tables = self.tables.lock().await;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row.get("event_id").and_then(Value::as_str) == Some(plan_id)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: PlanTable, row: &Value) -> anyhow::Result<Value> {
        self.call_log
            .lock()
            .await
            .push(format!("insert {}", table.name()));

        let serialized = row.to_string();
        for marker in self.poisoned.lock().await.iter() {
            if serialized.contains(marker.as_str()) {
                anyhow::bail!("insert rejected by store (marker '{}')", marker);
            }
        }

        let mut stored = row.clone();
        if stored.get("id").is_none() {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            stored["id"] = json!(*next_id);
        }

        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: PlanTable,
        id: &str,
        patch: &Value,
    ) -> anyhow::Result<Vec<Value>> {
        self.call_log
            .lock()
            .await
            .push(format!("update {}", table.name()));

        let mut tables = self.tables.lock().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(Vec::new());
        };
        let Some(row) = rows.iter_mut().find(|row| Self::id_matches(row, id)) else {
            return Ok(Vec::new());
        };

        if let (Some(row_obj), Some(patch_obj)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in patch_obj {
                row_obj.insert(key.clone(), value.clone());
            }
        }
        Ok(vec![row.clone()])
    }

    async fn delete(&self, table: PlanTable, id: &str) -> anyhow::Result<()> {
        self.call_log
            .lock()
            .await
            .push(format!("delete {}", table.name()));

        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|row| !Self::id_matches(row, id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TestHarness
// ---------------------------------------------------------------------------

/// Everything needed to run session tests against the agent.
pub struct TestHarness {
    pub agent: Agent,
    pub provider: Arc<MockProvider>,
    pub store: Arc<MockPlanStore>,
}

/// Build a fully wired agent with a scripted planner and in-memory store.
pub fn setup_test_agent(provider: MockProvider, store: MockPlanStore) -> TestHarness {
    let provider = Arc::new(provider);
    let store = Arc::new(store);
    TestHarness {
        agent: Agent::new(provider.clone(), store.clone(), "mock-model"),
        provider,
        store,
    }
}
