//! HTTP route handlers for the web app server.
//!
//! The UI calls every operation through one RPC endpoint:
//! `POST /api/rpcs` with `{"funcname": ..., "args": [...], "kwargs": {...}}`.
//! The response body is the RPC's return value.

use std::sync::atomic::Ordering;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::{PlotResponse, RunRequest};
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<SharedState> {
    Router::new().route("/api/rpcs", post(rpc_handler)).route("/api/health", get(health_handler))
}

// ---------------------------------------------------------------------------
// POST /api/rpcs
// ---------------------------------------------------------------------------

/// RPC call envelope.
#[derive(Debug, Deserialize)]
struct RpcCall {
    funcname: String,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    kwargs: Map<String, Value>,
}

impl RpcCall {
    /// Argument by keyword, falling back to its position.
    fn arg(&self, position: usize, name: &str) -> Option<&Value> {
        self.kwargs.get(name).or_else(|| self.args.get(position))
    }
}

async fn rpc_handler(
    State(state): State<SharedState>,
    call: Result<Json<RpcCall>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(call) = call?;
    state.total_requests.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(funcname = %call.funcname, "rpc call");

    let result = match call.funcname.as_str() {
        "get_defaults" => serde_json::to_value(&state.schema)?,
        "get_version" => Value::String(state.engine.version()),
        "get_sessions" => {
            let session_id = session_id_arg(call.arg(0, "session_id"))?;
            serde_json::to_value(state.sessions.get_sessions(session_id.as_deref()))?
        }
        "plot_sim" => serde_json::to_value(plot_sim(state, &call).await?)?,
        other => return Err(AppError::not_found(format!("unknown RPC '{other}'"))),
    };
    Ok(Json(result))
}

/// `plot_sim(sim_pars, epi_pars, verbose=true, session_id=None)`.
async fn plot_sim(state: SharedState, call: &RpcCall) -> Result<PlotResponse, AppError> {
    let req = RunRequest {
        sim_pars: call.arg(0, "sim_pars").cloned(),
        epi_pars: call.arg(1, "epi_pars").cloned(),
        verbose: verbose_arg(call.arg(2, "verbose"))?,
    };
    let session_id = session_id_arg(call.arg(3, "session_id"))?;

    // Simulation is CPU-bound; keep it off the async workers.
    let resp = tokio::task::spawn_blocking(move || {
        let outcome = state.pipeline().run(&req);
        if outcome.is_success() {
            tracing::info!("plot_sim finished");
        } else {
            tracing::warn!(n_errors = outcome.errors.len(), "plot_sim finished with errors");
        }
        if let Some(id) = session_id
            && !state.sessions.record_run(&id, &outcome.pars)
        {
            tracing::debug!(session_id = %id, "run not recorded: unknown session");
        }
        outcome.into_response()
    })
    .await
    .unwrap_or_else(|e| PlotResponse::failed(format!("Sim task failed! ({e})")));

    Ok(resp)
}

/// Absent, null, false, 0 and "" all mean "no session id".
fn session_id_arg(v: Option<&Value>) -> Result<Option<String>, AppError> {
    match v {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.as_u64().map(|u| u.to_string()).unwrap_or_else(|| n.to_string()))),
        Some(other) => Err(AppError::bad_request(format!("session_id must be a string or number, got {other}"))),
    }
}

fn verbose_arg(v: Option<&Value>) -> Result<bool, AppError> {
    match v {
        None | Some(Value::Null) => Ok(true),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Some(other) => Err(AppError::bad_request(format!("verbose must be a boolean, got {other}"))),
    }
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    engine_version: String,
    uptime_s: f64,
    total_requests: u64,
    sessions: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: cw_core::VERSION,
        engine_version: state.engine.version(),
        uptime_s: state.started_at.elapsed().as_secs_f64(),
        total_requests: state.total_requests.load(Ordering::Relaxed),
        sessions: state.sessions.len(),
    })
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Transport-level failure (bad envelope, unknown RPC).
///
/// RPC results themselves never use this: stage failures travel in `err`.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(msg: String) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: msg }
    }

    fn not_found(msg: String) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: msg }
    }

    fn internal(msg: String) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: msg }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("response serialization failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use std::sync::Arc;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_app() -> (Router, SharedState) {
        let state = Arc::new(AppState::bundled());
        (router().with_state(Arc::clone(&state)), state)
    }

    async fn call(app: &Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/rpcs")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn small_run_pars() -> (Value, Value) {
        let schema = serde_json::to_value(crate::schema::get_defaults()).unwrap();
        let mut sim = schema["sim_pars"].clone();
        sim["n"]["best"] = json!(2000);
        (sim, schema["epi_pars"].clone())
    }

    #[tokio::test]
    async fn get_defaults_is_stable() {
        let (app, _) = test_app();
        let (status, a) = call(&app, json!({"funcname": "get_defaults"})).await;
        let (_, b) = call(&app, json!({"funcname": "get_defaults"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(a, b);
        let first_key = a["sim_pars"].as_object().unwrap().keys().next().unwrap().clone();
        assert_eq!(first_key, "scale");
    }

    #[tokio::test]
    async fn get_version_reports_engine() {
        let (app, _) = test_app();
        let (_, v) = call(&app, json!({"funcname": "get_version"})).await;
        assert!(v.as_str().unwrap().contains(cw_sim::VERSION_DATE));
    }

    #[tokio::test]
    async fn get_sessions_flow() {
        let (app, _) = test_app();
        let (_, first) = call(&app, json!({"funcname": "get_sessions"})).await;
        assert_eq!(first, json!({"session_id": "1", "session_list": ["1"], "err": ""}));

        let (_, second) = call(&app, json!({"funcname": "get_sessions", "args": [null]})).await;
        assert_eq!(second["session_id"], "2");

        let (_, given) = call(&app, json!({"funcname": "get_sessions", "kwargs": {"session_id": 5}})).await;
        assert_eq!(given["session_id"], "5");
        assert_eq!(given["session_list"], json!(["1", "2"]));
    }

    #[tokio::test]
    async fn plot_sim_success() {
        let (app, state) = test_app();
        let (_, s) = call(&app, json!({"funcname": "get_sessions"})).await;
        let (sim, epi) = small_run_pars();

        let (status, v) = call(
            &app,
            json!({"funcname": "plot_sim", "args": [sim, epi], "kwargs": {"verbose": false, "session_id": s["session_id"]}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["err"], "");
        assert_eq!(v["graph"]["axes"].as_array().unwrap().len(), 3);
        assert_eq!(state.sessions.state("1").unwrap()["n_runs"], 1);
    }

    #[tokio::test]
    async fn plot_sim_bad_value_still_responds() {
        let (app, _) = test_app();
        let (mut sim, epi) = small_run_pars();
        sim["seed"] = json!({"best": "not-a-number"});

        let (status, v) = call(&app, json!({"funcname": "plot_sim", "args": [sim, epi, false]})).await;
        assert_eq!(status, StatusCode::OK);
        let err = v["err"].as_str().unwrap();
        assert!(err.contains("Parameter conversion failed!"), "{err}");
        assert!(v["graph"].is_object());
    }

    #[tokio::test]
    async fn plot_sim_engine_failure_still_responds() {
        let (app, _) = test_app();
        let (mut sim, epi) = small_run_pars();
        sim["n_infected"] = json!({"best": 1e7});

        let (status, v) = call(&app, json!({"funcname": "plot_sim", "args": [sim, epi, false]})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(v["err"].as_str().unwrap().contains("Sim run failed!"));
        assert_eq!(v["graph"], json!({}));
    }

    #[tokio::test]
    async fn unknown_rpc_is_not_found() {
        let (app, _) = test_app();
        let (status, v) = call(&app, json!({"funcname": "drop_tables"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(v["error"].as_str().unwrap().contains("drop_tables"));
    }

    #[tokio::test]
    async fn malformed_envelope_gets_json_error() {
        let (app, _) = test_app();
        let (status, v) = call(&app, json!({"args": []})).await;
        assert!(status.is_client_error());
        assert!(v["error"].as_str().unwrap().contains("funcname"), "{v}");

        let request = Request::builder()
            .method("POST")
            .uri("/api/rpcs")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(v["error"].is_string());
    }

    #[tokio::test]
    async fn bad_verbose_is_rejected() {
        let (app, _) = test_app();
        let (status, _) = call(&app, json!({"funcname": "plot_sim", "kwargs": {"verbose": "loud"}})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_counts_requests() {
        let (app, _) = test_app();
        call(&app, json!({"funcname": "get_version"})).await;
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["total_requests"], 1);
    }

    #[test]
    fn session_id_coercion() {
        assert_eq!(session_id_arg(None).unwrap(), None);
        assert_eq!(session_id_arg(Some(&json!(0))).unwrap(), None);
        assert_eq!(session_id_arg(Some(&json!(""))).unwrap(), None);
        assert_eq!(session_id_arg(Some(&json!(7))).unwrap(), Some("7".to_string()));
        assert_eq!(session_id_arg(Some(&json!("abc"))).unwrap(), Some("abc".to_string()));
        assert!(session_id_arg(Some(&json!([1]))).is_err());
    }
}
