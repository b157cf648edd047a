/// Remote mode API routes
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use duaelmix_remote::{ModeRequest, SessionId, SessionRecord};
use std::collections::HashMap;

/// Raw query parameters; validation happens in the handlers so that every
/// malformed request gets the same empty 400
type RawQuery = HashMap<String, String>;

/// GET /api/v1?session=<id>&on=<0|1>
///
/// Stores the mode for the session and answers 204. A failing store is
/// logged; the caller still gets 204.
pub async fn set_mode(
    State(app_state): State<AppState>,
    Query(query): Query<RawQuery>,
) -> Result<StatusCode> {
    let request = ModeRequest::from_query(
        query.get("session").map(String::as_str),
        query.get("on").map(String::as_str),
    )?;

    let record = SessionRecord::now(request.mode);
    if let Err(e) = app_state.sessions.upsert(&request.session, record).await {
        tracing::error!("Failed to store mode for {}: {}", request.session, e);
    } else {
        tracing::info!("Session {} switched to mode {}", request.session, record.mode);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/state?session=<id>
pub async fn get_state(
    State(app_state): State<AppState>,
    Query(query): Query<RawQuery>,
) -> Result<Json<SessionRecord>> {
    let session = SessionId::parse(query.get("session").map_or("", String::as_str))?;

    app_state
        .sessions
        .get(&session)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("session {}", session)))
}
