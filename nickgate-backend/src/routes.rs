use crate::AppState;
use crate::error::AppError;
use crate::validation;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::TypedHeader;
use axum_macros::debug_handler;
use headers::Authorization;
use headers::authorization::Bearer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub(crate) struct RemarkResponse {
    nickname: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct SetRemarkRequest {
    nickname: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct SetRemarkResponse {
    inserted: bool,
}

#[derive(Deserialize)]
pub(crate) struct PrefixQuery {
    prefix: String,
}

#[derive(Serialize)]
pub(crate) struct PrefixResponse {
    account_ids: Vec<u64>,
}

#[derive(Deserialize)]
pub(crate) struct PreloginRequest {
    session_key: String,
    player: String,
    account_id: u64,
}

#[derive(Serialize)]
pub(crate) struct PreloginResponse {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct GroupMessageRequest {
    account_id: u64,
    nickname: String,
}

#[derive(Serialize)]
pub(crate) struct GroupMessageResponse {
    changed: bool,
}

fn verify_api_key(
    state: &AppState,
    auth: Option<&TypedHeader<Authorization<Bearer>>>,
) -> Result<(), AppError> {
    match auth {
        Some(TypedHeader(auth)) if auth.token() == state.api_key => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

#[debug_handler]
pub(crate) async fn get_remark(
    State(state): State<Arc<AppState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(account_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    verify_api_key(&state, auth.as_ref())?;

    let nickname = state.cache.get(account_id).await?;

    Ok((StatusCode::OK, Json(RemarkResponse { nickname })))
}

#[debug_handler]
pub(crate) async fn set_remark(
    State(state): State<Arc<AppState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(account_id): Path<u64>,
    Json(payload): Json<SetRemarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    verify_api_key(&state, auth.as_ref())?;

    if let Some(nickname) = &payload.nickname {
        validation::validate_nickname(nickname)?;
    }

    let outcome = state.cache.put(account_id, payload.nickname).await?;

    Ok((
        StatusCode::OK,
        Json(SetRemarkResponse {
            inserted: outcome.inserted(),
        }),
    ))
}

/// Account ids whose recorded nickname starts with the given prefix.
/// Reads the table directly; the cache holds only what this process touched.
#[debug_handler]
pub(crate) async fn query_by_prefix(
    State(state): State<Arc<AppState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<PrefixQuery>,
) -> Result<impl IntoResponse, AppError> {
    verify_api_key(&state, auth.as_ref())?;

    let account_ids = state
        .db
        .query_remarks_by_prefix(query.prefix)
        .await?
        .into_iter()
        .map(|remark| remark.account_id)
        .collect();

    Ok((StatusCode::OK, Json(PrefixResponse { account_ids })))
}

/// Pre-login verdict for the game-server plugin. Always 200; the verdict and
/// the kick message travel in the body.
#[debug_handler]
pub(crate) async fn prelogin(
    State(state): State<Arc<AppState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(payload): Json<PreloginRequest>,
) -> Result<impl IntoResponse, AppError> {
    verify_api_key(&state, auth.as_ref())?;

    let player = validation::validate_player_name(&payload.player)?;

    let outcome = state
        .gate
        .evaluate(
            &payload.session_key,
            player.as_str(),
            payload.account_id,
            state.bot.as_deref(),
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(PreloginResponse {
            allowed: outcome.allowed(),
            message: outcome.message().map(String::from),
        }),
    ))
}

#[debug_handler]
pub(crate) async fn group_message(
    State(state): State<Arc<AppState>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(payload): Json<GroupMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    verify_api_key(&state, auth.as_ref())?;

    validation::validate_nickname(&payload.nickname)?;

    let changed = state
        .cache
        .observe_nickname(payload.account_id, payload.nickname)
        .await?;

    Ok((StatusCode::OK, Json(GroupMessageResponse { changed })))
}
