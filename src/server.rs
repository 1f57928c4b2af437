use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::agent::{Agent, GoalRequest, PlanSnapshot};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub auth_token: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/agent", post(run_agent))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Auth middleware
// ---------------------------------------------------------------------------

async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: Next,
) -> Result<impl IntoResponse, StatusCode> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token != state.auth_token {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Body of `POST /api/agent`. Fields are optional so missing ones produce a
/// 400 with a readable message instead of a deserialization error.
#[derive(Debug, Deserialize)]
struct AgentRequest {
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    plan_id: Option<String>,
    #[serde(default)]
    plan_context: Option<PlanSnapshot>,
}

async fn run_agent(State(state): State<AppState>, Json(body): Json<AgentRequest>) -> Response {
    let goal = body.goal.filter(|g| !g.trim().is_empty());
    let plan_id = body.plan_id.filter(|p| !p.trim().is_empty());
    let (Some(goal), Some(plan_id)) = (goal, plan_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "goal and plan_id are required"})),
        )
            .into_response();
    };

    match state
        .agent
        .run_goal(GoalRequest {
            goal,
            plan_id,
            plan_context: body.plan_context,
        })
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "results": outcome.results,
                "summary": outcome.summary,
                "terminated": outcome.terminated,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "agent session failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal Server Error"})),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

pub async fn start_server(state: AppState, bind_addr: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let ip: std::net::IpAddr = bind_addr
        .parse()
        .unwrap_or_else(|_| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let addr = std::net::SocketAddr::new(ip, port);
    info!("Agent server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
