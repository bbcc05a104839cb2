use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    debts::{
        dto::{CreateDebtRequest, DebtSummary, ListQuery, UpdateDebtRequest},
        repo::Debt,
        service,
    },
    error::ApiError,
    state::AppState,
};

pub fn debt_routes() -> Router<AppState> {
    Router::new()
        .route("/debts", post(create_debt).get(list_debts))
        .route("/debts/summary", get(get_summary))
        .route(
            "/debts/:id",
            get(get_debt).patch(update_debt).delete(delete_debt),
        )
        .route("/debts/:id/pay", patch(pay_debt))
}

#[instrument(skip(state, payload))]
pub async fn create_debt(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateDebtRequest>,
) -> Result<(StatusCode, Json<Debt>), ApiError> {
    let debt = service::create_debt(&state, user_id, payload.amount, &payload.description).await?;
    Ok((StatusCode::CREATED, Json(debt)))
}

#[instrument(skip(state))]
pub async fn list_debts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Debt>>, ApiError> {
    let debts = service::list_debts(&state, user_id, query.status).await?;
    Ok(Json(debts))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DebtSummary>, ApiError> {
    let summary = service::debt_summary(&state, user_id).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn get_debt(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Debt>, ApiError> {
    let debt = service::get_debt(&state, id, user_id).await?;
    Ok(Json(debt))
}

#[instrument(skip(state, payload))]
pub async fn update_debt(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDebtRequest>,
) -> Result<Json<Debt>, ApiError> {
    let debt = service::update_debt(&state, id, user_id, payload).await?;
    Ok(Json(debt))
}

#[instrument(skip(state))]
pub async fn pay_debt(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Debt>, ApiError> {
    let debt = service::mark_paid(&state, id, user_id).await?;
    Ok(Json(debt))
}

#[instrument(skip(state))]
pub async fn delete_debt(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::delete_debt(&state, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
