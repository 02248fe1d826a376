// SPDX-License-Identifier: MIT

//! API routes for authenticated users (teams, scores, users CRUD).
//!
//! The auth middleware is applied in routes/mod.rs for these routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Score, Team, User};
use crate::routes::ApiResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{any, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API routes (require a valid session).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        // Teams
        .route("/api/teams", get(list_teams).post(create_team))
        .route(
            "/api/teams/{id}",
            get(get_team).put(update_team).delete(delete_team),
        )
        // Users
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/team/{team_id}", get(list_users_by_team))
        .route("/api/users/{id}/scores", get(get_user_scores))
        // Scores
        .route("/api/scores", get(list_scores).post(create_score))
        .route(
            "/api/scores/{id}",
            get(get_score).put(update_score).delete(delete_score),
        )
        // Unknown /api/* paths still pass through the gate first.
        .route("/api/{*rest}", any(api_not_found))
}

async fn api_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

// ─── Current User ────────────────────────────────────────────

/// User with related team and scores, for detail endpoints.
#[derive(Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub team: Option<Team>,
    pub scores: Vec<Score>,
}

async fn load_user_detail(state: &AppState, id: i64) -> Result<Option<UserDetail>> {
    let Some(user) = state.store.find_user_by_id(id).await? else {
        return Ok(None);
    };

    let team = match user.team_id {
        Some(team_id) => state.store.find_team_by_id(team_id).await?,
        None => None,
    };
    let scores = state.store.list_scores_for_user(user.id).await?;

    Ok(Some(UserDetail { user, team, scores }))
}

/// Get the current reconciled user.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDetail>>> {
    let detail = load_user_detail(&state, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::data(detail)))
}

// ─── Teams ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateTeamRequest {
    pub name: String,
}

/// Team with its members, for detail endpoints.
#[derive(Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub users: Vec<User>,
}

async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<Vec<Team>>>> {
    Ok(Json(ApiResponse::data(state.store.list_teams().await?)))
}

async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TeamDetail>>> {
    let team = state
        .store
        .find_team_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".to_string()))?;
    let users = state.store.list_users_by_team(team.id).await?;

    Ok(Json(ApiResponse::data(TeamDetail { team, users })))
}

async fn create_team(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Team>>)> {
    validate_name(&req.name)?;
    let team = state.store.create_team(req.name.trim()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(team, "Team created successfully")),
    ))
}

async fn update_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<ApiResponse<Team>>> {
    validate_name(&req.name)?;
    let team = state
        .store
        .update_team(id, req.name.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        team,
        "Team updated successfully",
    )))
}

async fn delete_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.store.delete_team(id).await? {
        return Err(AppError::NotFound("Team not found".to_string()));
    }
    Ok(Json(ApiResponse::message("Team deleted successfully")))
}

// ─── Users ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub team_id: i64,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<Vec<User>>>> {
    Ok(Json(ApiResponse::data(state.store.list_users().await?)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserDetail>>> {
    let detail = load_user_detail(&state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::data(detail)))
}

async fn list_users_by_team(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<User>>>> {
    Ok(Json(ApiResponse::data(
        state.store.list_users_by_team(team_id).await?,
    )))
}

async fn get_user_scores(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Score>>>> {
    if state.store.find_user_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(ApiResponse::data(
        state.store.list_scores_for_user(id).await?,
    )))
}

/// Create a user directly (administrative path, no provider identity).
/// The team must already exist.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>)> {
    validate_name(&req.name)?;
    if state.store.find_team_by_id(req.team_id).await?.is_none() {
        return Err(AppError::BadRequest("Team not found".to_string()));
    }

    let user = state.store.create_user(req.name.trim(), req.team_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User created successfully")),
    ))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(team_id) = req.team_id {
        if state.store.find_team_by_id(team_id).await?.is_none() {
            return Err(AppError::BadRequest("Team not found".to_string()));
        }
    }

    let user = state
        .store
        .update_user(id, req.name.as_deref().map(str::trim), req.team_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        user,
        "User updated successfully",
    )))
}

/// Delete a user and all their scores in one transaction.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.store.delete_user_with_scores(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(ApiResponse::message(
        "User and associated scores deleted successfully",
    )))
}

// ─── Scores ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateScoreRequest {
    pub user_id: i64,
    pub score: i64,
}

#[derive(Deserialize)]
pub struct UpdateScoreRequest {
    pub score: i64,
}

async fn list_scores(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<Vec<Score>>>> {
    Ok(Json(ApiResponse::data(state.store.list_scores().await?)))
}

async fn get_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Score>>> {
    let score = state
        .store
        .find_score_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Score not found".to_string()))?;

    Ok(Json(ApiResponse::data(score)))
}

async fn create_score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateScoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Score>>)> {
    validate_score(req.score)?;
    if state.store.find_user_by_id(req.user_id).await?.is_none() {
        return Err(AppError::BadRequest("User not found".to_string()));
    }

    let score = state.store.create_score(req.user_id, req.score).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            score,
            "Score created successfully",
        )),
    ))
}

async fn update_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateScoreRequest>,
) -> Result<Json<ApiResponse<Score>>> {
    validate_score(req.score)?;
    let score = state
        .store
        .update_score(id, req.score)
        .await?
        .ok_or_else(|| AppError::NotFound("Score not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        score,
        "Score updated successfully",
    )))
}

async fn delete_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.store.delete_score(id).await? {
        return Err(AppError::NotFound("Score not found".to_string()));
    }
    Ok(Json(ApiResponse::message("Score deleted successfully")))
}

// ─── Validation ──────────────────────────────────────────────

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_string()));
    }
    if name.len() > 200 {
        return Err(AppError::BadRequest("Name is too long".to_string()));
    }
    Ok(())
}

fn validate_score(score: i64) -> Result<()> {
    if score < 0 {
        return Err(AppError::BadRequest(
            "Score must be non-negative".to_string(),
        ));
    }
    Ok(())
}
