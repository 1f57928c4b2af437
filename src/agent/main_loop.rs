use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::command::{self, ExecutionResult};
use super::dispatch;
use super::snapshot::PlanSnapshot;
use super::tool_defs;
use super::Agent;
use crate::traits::ProviderResponse;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// The planner called `done` with a summary.
    Explicit,
    /// Iteration cap reached, or the planner stopped issuing commands.
    Capped,
}

/// One agent invocation: a goal to execute against a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalRequest {
    pub goal: String,
    pub plan_id: String,
    /// Pre-fetched snapshot; fetched from the store when absent.
    #[serde(default)]
    pub plan_context: Option<PlanSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct GoalOutcome {
    pub terminated: Termination,
    pub summary: String,
    pub results: Vec<ExecutionResult>,
}

/// Summary returned when the session ends without an explicit `done`.
const FALLBACK_SUMMARY: &str =
    "Agent completed actions but did not provide a final summary. Please check the plan for updates.";

impl Agent {
    /// Drive one full planning session for `request`.
    ///
    /// The transcript grows each iteration: one assistant turn per planner
    /// response, then one observation per dispatched command (failures
    /// included) so the planner can react on its next turn. Store failures
    /// never abort the session; a planner transport failure does.
    pub async fn run_goal(&self, request: GoalRequest) -> anyhow::Result<GoalOutcome> {
        let GoalRequest {
            goal,
            plan_id,
            plan_context,
        } = request;

        let snapshot = match plan_context {
            Some(snapshot) => snapshot,
            None => PlanSnapshot::fetch(self.store.as_ref(), &plan_id).await?,
        };
        info!(
            plan_id = %plan_id,
            tasks = snapshot.tasks.len(),
            budget = snapshot.budget.len(),
            activities = snapshot.activities.len(),
            shopping = snapshot.shopping.len(),
            schedule = snapshot.schedule.len(),
            "starting agent session"
        );

        let catalog = tool_defs::command_catalog();
        let mut transcript: Vec<Value> = vec![
            json!({"role": "system", "content": system_prompt(&goal, &snapshot)}),
            json!({"role": "user", "content": goal}),
        ];
        let mut results: Vec<ExecutionResult> = Vec::new();

        for iteration in 1..=self.max_iterations {
            info!(iteration, "planner round trip");
            let response = self
                .provider
                .chat(&self.model, &transcript, &catalog)
                .await?;
            if let Some(usage) = &response.usage {
                debug!(
                    iteration,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "planner usage"
                );
            }

            transcript.push(assistant_turn(&response));

            if response.tool_calls.is_empty() {
                // Prose instead of commands: treated as a stop, not an error.
                info!(iteration, "planner issued no commands; stopping");
                return Ok(GoalOutcome {
                    terminated: Termination::Capped,
                    summary: FALLBACK_SUMMARY.to_string(),
                    results,
                });
            }

            // A `done` anywhere in the turn ends the session immediately;
            // sibling commands from the same turn are not executed.
            if let Some(done) = response.tool_calls.iter().find(|c| c.name == "done") {
                let summary = command::done_summary(&done.arguments)
                    .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());
                info!(iteration, summary = %summary, "planner declared completion");
                return Ok(GoalOutcome {
                    terminated: Termination::Explicit,
                    summary,
                    results,
                });
            }

            for call in &response.tool_calls {
                let result = match command::parse_mutation(call) {
                    Ok(cmd) => {
                        dispatch::dispatch(self.store.as_ref(), &plan_id, &snapshot, cmd).await
                    }
                    Err(reason) => {
                        warn!(command = %call.name, reason = %reason, "rejected planner command");
                        ExecutionResult::rejected(reason)
                    }
                };

                let observation = serde_json::to_string(&result).unwrap_or_default();
                transcript.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": observation,
                }));
                results.push(result);
            }
        }

        info!(cap = self.max_iterations, "iteration cap reached");
        Ok(GoalOutcome {
            terminated: Termination::Capped,
            summary: FALLBACK_SUMMARY.to_string(),
            results,
        })
    }
}

fn system_prompt(goal: &str, snapshot: &PlanSnapshot) -> String {
    let context = serde_json::to_string_pretty(snapshot).unwrap_or_default();
    format!(
        "You are an autonomous event planning agent.\n\
         Current Date: {date}\n\
         Your goal is to execute the user's request by modifying the event plan.\n\
         \n\
         Current Plan Context:\n\
         {context}\n\
         \n\
         User Goal: \"{goal}\"\n\
         \n\
         Instructions:\n\
         1. Analyze the goal and the current plan.\n\
         2. Call the appropriate commands to achieve the goal.\n\
         3. You can make multiple command calls in one go.\n\
         4. If the goal involves consolidating, look for duplicates in the context and delete them, then create a combined item.\n\
         5. Be precise with IDs when updating or deleting.\n\
         6. You must call 'done' with a summary when you are finished.\n\
         7. After each command you will see its result in the next turn. You can then use that info if needed.\n\
         8. Loop until you are satisfied that the goal is met.",
        date = Utc::now().format("%Y-%m-%d"),
    )
}

/// Rebuild the assistant turn in OpenAI message format so the provider can
/// send the transcript back verbatim next iteration.
fn assistant_turn(response: &ProviderResponse) -> Value {
    let mut message = json!({
        "role": "assistant",
        "content": response.content,
    });
    if !response.tool_calls.is_empty() {
        message["tool_calls"] = Value::Array(
            response
                .tool_calls
                .iter()
                .map(|tc| {
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {"name": tc.name, "arguments": tc.arguments},
                    })
                })
                .collect(),
        );
    }
    message
}
