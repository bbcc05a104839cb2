use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::cache::Cache;
use crate::debts::dto::{validate_amount, validate_description, DebtSummary, UpdateDebtRequest};
use crate::debts::repo::{Debt, DebtStatus, StatusTotal};
use crate::error::ApiError;
use crate::state::AppState;

pub const LIST_TTL_SECONDS: u64 = 300;
pub const SUMMARY_TTL_SECONDS: u64 = 120;

/// All cached reads for a user live under this prefix, so a single
/// prefix delete on any write clears lists and the summary together.
pub fn user_cache_prefix(user_id: Uuid) -> String {
    format!("debts:{}:", user_id)
}

pub fn list_cache_key(user_id: Uuid, status: Option<DebtStatus>) -> String {
    let filter = match status {
        None => "ALL",
        Some(DebtStatus::Pending) => "PENDING",
        Some(DebtStatus::Paid) => "PAID",
    };
    format!("{}list:{}", user_cache_prefix(user_id), filter)
}

pub fn summary_cache_key(user_id: Uuid) -> String {
    format!("{}summary", user_cache_prefix(user_id))
}

// Cache failures never fail the request: reads fall through to the store,
// and a failed invalidation leaves at most a TTL-bounded stale window.
async fn cache_fetch<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key = %key, error = %e, "cache read failed, falling back to store");
            None
        }
    }
}

async fn cache_store<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl_seconds: u64) {
    match serde_json::to_string(value) {
        Ok(raw) => {
            if let Err(e) = cache.set(key, &raw, ttl_seconds).await {
                warn!(key = %key, error = %e, "cache write failed");
            }
        }
        Err(e) => warn!(key = %key, error = %e, "cache serialization failed"),
    }
}

async fn invalidate_user(cache: &dyn Cache, user_id: Uuid) {
    let prefix = user_cache_prefix(user_id);
    if let Err(e) = cache.delete_by_prefix(&prefix).await {
        error!(user_id = %user_id, error = %e, "cache invalidation failed; stale reads until TTL");
    }
}

/// Existence is checked before ownership: a missing debt is NotFound for
/// everyone, an existing debt owned by someone else is Forbidden.
fn check_owned(found: Option<Debt>, user_id: Uuid) -> Result<Debt, ApiError> {
    let debt = found.ok_or_else(|| ApiError::NotFound("Debt not found".into()))?;
    if debt.user_id != user_id {
        return Err(ApiError::Forbidden(
            "You can only access your own debts".into(),
        ));
    }
    Ok(debt)
}

async fn find_owned(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Debt, ApiError> {
    let found = Debt::find_by_id(&state.db, id).await?;
    check_owned(found, user_id)
}

fn ensure_pending(debt: &Debt, conflict_message: &str) -> Result<(), ApiError> {
    if debt.status == DebtStatus::Paid {
        return Err(ApiError::Conflict(conflict_message.into()));
    }
    Ok(())
}

pub async fn create_debt(
    state: &AppState,
    user_id: Uuid,
    amount: Decimal,
    description: &str,
) -> Result<Debt, ApiError> {
    let amount = validate_amount(amount)?;
    let description = validate_description(description)?;

    let debt = Debt::insert(&state.db, user_id, amount, &description).await?;
    invalidate_user(state.cache.as_ref(), user_id).await;
    Ok(debt)
}

pub async fn list_debts(
    state: &AppState,
    user_id: Uuid,
    status: Option<DebtStatus>,
) -> Result<Vec<Debt>, ApiError> {
    let key = list_cache_key(user_id, status);
    if let Some(cached) = cache_fetch::<Vec<Debt>>(state.cache.as_ref(), &key).await {
        return Ok(cached);
    }

    let debts = Debt::list_by_user(&state.db, user_id, status).await?;
    cache_store(state.cache.as_ref(), &key, &debts, LIST_TTL_SECONDS).await;
    Ok(debts)
}

pub async fn debt_summary(state: &AppState, user_id: Uuid) -> Result<DebtSummary, ApiError> {
    let key = summary_cache_key(user_id);
    if let Some(cached) = cache_fetch::<DebtSummary>(state.cache.as_ref(), &key).await {
        return Ok(cached);
    }

    let totals: Vec<StatusTotal> = Debt::status_totals(&state.db, user_id).await?;
    let summary = DebtSummary::from_totals(&totals);
    cache_store(state.cache.as_ref(), &key, &summary, SUMMARY_TTL_SECONDS).await;
    Ok(summary)
}

pub async fn get_debt(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Debt, ApiError> {
    find_owned(state, id, user_id).await
}

pub async fn update_debt(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
    changes: UpdateDebtRequest,
) -> Result<Debt, ApiError> {
    let debt = find_owned(state, id, user_id).await?;
    ensure_pending(&debt, "Cannot update a paid debt")?;

    let amount = changes.amount.map(validate_amount).transpose()?;
    let description = changes
        .description
        .as_deref()
        .map(validate_description)
        .transpose()?;

    let updated = Debt::update(&state.db, id, amount, description.as_deref()).await?;
    invalidate_user(state.cache.as_ref(), user_id).await;
    Ok(updated)
}

pub async fn mark_paid(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Debt, ApiError> {
    let debt = find_owned(state, id, user_id).await?;
    ensure_pending(&debt, "Debt is already paid")?;

    let paid = Debt::mark_paid(&state.db, id).await?;
    invalidate_user(state.cache.as_ref(), user_id).await;
    Ok(paid)
}

pub async fn delete_debt(state: &AppState, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    let debt = find_owned(state, id, user_id).await?;
    ensure_pending(&debt, "Cannot delete a paid debt")?;

    Debt::delete(&state.db, id).await?;
    invalidate_user(state.cache.as_ref(), user_id).await;
    Ok(())
}
