//! HTTP handlers for the webhook endpoint

use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::SharedState;
use crate::auth::{
    Credential, credential_from_headers, verify_github_signature, verify_gitlab_token,
};
use crate::salt::all_targets_succeeded;

pub async fn root() -> &'static str {
    "salthook"
}

/// Handles git hosting webhook POST requests.
///
/// Validates the sender per provider, extracts the pushed ref, applies
/// the configured Salt state with the ref as pillar data, and reduces
/// the per-target results to a status code. The sender only ever sees
/// 200 or 400 (500 if the salt invocation itself breaks); failure
/// details go to the log.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            info!("Could not parse JSON body: {:?}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    debug!("Request JSON: {}", payload);

    match credential_from_headers(&headers) {
        Credential::GithubSignature(signature) => {
            if !verify_github_signature(&state.config.secret, &body, &signature) {
                return StatusCode::BAD_REQUEST;
            }
        }
        Credential::GitlabToken(token) => {
            if !verify_gitlab_token(&state.config.secret, &token) {
                return StatusCode::BAD_REQUEST;
            }
        }
        Credential::None => {
            if !state.config.allow_unsigned {
                error!("Rejected webhook carrying no signature or token header");
                return StatusCode::BAD_REQUEST;
            }
            debug!("No auth header present; accepting unsigned webhook");
        }
    }

    // A payload without "ref" is forwarded with a null ref, not rejected.
    let git_ref = payload.get("ref").cloned().unwrap_or(Value::Null);
    let pillar = json!({ "git_ref": git_ref });

    let ret = match state.runner.apply(&state.config.salt_state, &pillar).await {
        Ok(ret) => ret,
        Err(e) => {
            error!("State run invocation failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    debug!("Salt caller response: {:?}", ret);

    if !all_targets_succeeded(&ret) {
        error!("State application failed ({:?})", ret);
        return StatusCode::BAD_REQUEST;
    }

    info!("Processed webhook for {}", pillar["git_ref"]);
    StatusCode::OK
}
