use crate::{error::AppError, AppState};
use analytics::WeeklyRecord;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use core_types::{parse_team, Role, TeamDescriptor};
use orchestrator::{GameEpaReport, RolePerformanceReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `?season=YYYY`, optional on every route.
#[derive(Debug, Default, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct TeamInfoResponse {
    pub team_desc: Vec<TeamDescriptor>,
}

fn season(query: Result<Query<SeasonQuery>, QueryRejection>) -> Result<Option<u16>, AppError> {
    query
        .map(|Query(q)| q.season)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// # GET /
pub async fn root() -> &'static str {
    "Welcome to the Gridiron NFL performance API"
}

/// # GET /general-team-info/:team
pub async fn general_team_info(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TeamInfoResponse>, AppError> {
    let team = parse_team(&team)?;
    let team_desc = state.orchestrator.team_info(&team).await?;
    Ok(Json(TeamInfoResponse { team_desc }))
}

async fn weekly(
    role: Role,
    team: String,
    state: Arc<AppState>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<Vec<WeeklyRecord>>, AppError> {
    let season = season(query)?;
    let team = parse_team(&team)?;
    let records = state
        .orchestrator
        .weekly_performance(&team, role, season)
        .await?;
    Ok(Json(records))
}

async fn performance(
    role: Role,
    team: String,
    state: Arc<AppState>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<RolePerformanceReport>, AppError> {
    let season = season(query)?;
    let team = parse_team(&team)?;
    let report = state.orchestrator.role_performance(&team, role, season).await?;
    Ok(Json(report))
}

/// # GET /qb-weekly-performance/:team
pub async fn qb_weekly_performance(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<Vec<WeeklyRecord>>, AppError> {
    weekly(Role::Qb, team, state, query).await
}

/// # GET /rb-weekly-performance/:team
pub async fn rb_weekly_performance(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<Vec<WeeklyRecord>>, AppError> {
    weekly(Role::Rb, team, state, query).await
}

/// # GET /wr-weekly-performance/:team
pub async fn wr_weekly_performance(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<Vec<WeeklyRecord>>, AppError> {
    weekly(Role::Wr, team, state, query).await
}

/// # GET /qb-performance/:team
/// Most recent game, season to date and the league average, side by side.
pub async fn qb_performance(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<RolePerformanceReport>, AppError> {
    performance(Role::Qb, team, state, query).await
}

/// # GET /rb-performance/:team
pub async fn rb_performance(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<RolePerformanceReport>, AppError> {
    performance(Role::Rb, team, state, query).await
}

/// # GET /wr-performance/:team
pub async fn wr_performance(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<RolePerformanceReport>, AppError> {
    performance(Role::Wr, team, state, query).await
}

/// # GET /epa-per-play/:team
/// Every play of the team's most recent game that has an EPA value.
pub async fn epa_per_play(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeasonQuery>, QueryRejection>,
) -> Result<Json<GameEpaReport>, AppError> {
    let season = season(query)?;
    let team = parse_team(&team)?;
    let report = state.orchestrator.game_epa(&team, season).await?;
    Ok(Json(report))
}
