use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::engine::perks::{self, PerkEffect};
use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseBody {
    student_id: String,
    perk_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HintBody {
    student_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    cost: i64,
    effect: PerkEffect,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HintRedeemed {
    remaining_uses: u32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog))
        .route("/purchase", post(purchase))
        .route("/hint", post(redeem_hint))
}

async fn catalog() -> impl IntoResponse {
    let entries: Vec<CatalogEntry> = perks::catalog()
        .iter()
        .map(|def| CatalogEntry {
            id: def.id,
            name: def.name,
            description: def.description,
            icon: def.icon,
            cost: def.cost,
            effect: def.effect,
        })
        .collect();
    ok(entries)
}

async fn purchase(
    State(state): State<AppState>,
    Json(body): Json<PurchaseBody>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .engine()
        .purchase_perk(&body.student_id, &body.perk_id)
        .await?;
    Ok(ok(outcome))
}

async fn redeem_hint(
    State(state): State<AppState>,
    Json(body): Json<HintBody>,
) -> Result<impl IntoResponse, AppError> {
    let remaining = state
        .engine()
        .redeem_hint(&body.student_id)
        .await?
        .ok_or_else(|| AppError::bad_request("no hint uses available"))?;
    Ok(ok(HintRedeemed {
        remaining_uses: remaining,
    }))
}
