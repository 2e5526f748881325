use axum::{
    extract::{Path, Query, State},
    Json,
};
use ballot_indexer::{
    card::VotingCard,
    catalog::{CardFilter, VotingCatalog},
    countdown::unix_now,
    paginator::{paginate, Page},
    role::resolve_role,
    store::ActivityStats,
    ActivityRecord, BlockSummary, RefreshOutcome, TransactionView, VotingStateReader,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;
use crate::types::{
    ActivityQuery, MetaResponse, RefreshResponse, RefreshStatus, ViewerQuery, VotingsQuery,
    VotingsResponse,
};
use crate::watcher::run_refresh;

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_meta(
    State(state): State<AppState>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<MetaResponse>, AppError> {
    let (owner, viewer_role) = match query.viewer()? {
        Some(viewer) => {
            let (owner, role) = resolve_role(state.chain(), &viewer).await?;
            (Some(owner), Some(role))
        }
        None => (None, None),
    };
    let store = state.explorer.store();
    Ok(Json(MetaResponse {
        contract: state.config.contract,
        window: store.window(),
        refreshed_at: store.refreshed_at(),
        refreshing: state.explorer.is_refreshing(),
        events: store.records().len(),
        explorer_url: state.config.explorer_url.clone(),
        owner,
        viewer_role,
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("EXPLORER_BUILD_GIT_HASH"),
        build_time_unix: option_env!("EXPLORER_BUILD_TIME_UNIX"),
    }))
}

pub async fn post_refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    info!("POST /refresh - Manual refresh requested");
    let response = match run_refresh(&state).await? {
        RefreshOutcome::Refreshed(summary) => RefreshResponse {
            status: RefreshStatus::Refreshed,
            summary: Some(summary),
        },
        RefreshOutcome::Skipped => RefreshResponse {
            status: RefreshStatus::Skipped,
            summary: None,
        },
    };
    Ok(Json(response))
}

fn page_size(state: &AppState, requested: Option<usize>) -> usize {
    requested.unwrap_or(state.explorer.config().page_size)
}

pub async fn get_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Page<ActivityRecord>>, AppError> {
    let filter = query.filter()?;
    let records = state.explorer.store().filter(&filter, query.order()?);
    debug!("GET /activity - {} matching records", records.len());
    Ok(Json(paginate(
        &records,
        query.page.unwrap_or(1),
        page_size(&state, query.page_size),
        state.explorer.config().page_window,
    )))
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Page<TransactionView>>, AppError> {
    let filter = query.filter()?;
    let txs = state.explorer.store().transactions(&filter, query.order()?);
    Ok(Json(paginate(
        &txs,
        query.page.unwrap_or(1),
        page_size(&state, query.page_size),
        state.explorer.config().page_window,
    )))
}

pub async fn get_blocks(State(state): State<AppState>) -> Json<Vec<BlockSummary>> {
    Json(state.explorer.store().blocks().to_vec())
}

pub async fn get_stats(State(state): State<AppState>) -> Json<ActivityStats> {
    Json(state.explorer.store().stats())
}

pub async fn get_votings(
    State(state): State<AppState>,
    Query(query): Query<VotingsQuery>,
) -> Result<Json<VotingsResponse>, AppError> {
    let total = state.chain().voting_count().await?;
    let catalog = VotingCatalog::new(total, query.order()?)
        .with_visible(query.visible.unwrap_or(state.config.visible_votings));
    let filter = CardFilter {
        search: query.search.clone(),
        status: query.status()?,
    };
    let now = unix_now();

    let mut cards = Vec::new();
    for id in catalog.visible_ids() {
        let summary = state.chain().voting(id).await?;
        if !filter.matches(&summary, now) {
            continue;
        }
        cards.push(state.card(id, None, now).await?);
    }

    Ok(Json(VotingsResponse {
        total: catalog.total(),
        visible: catalog.visible_count(),
        has_more: catalog.has_more(),
        cards,
    }))
}

pub async fn get_voting(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<VotingCard>, AppError> {
    let viewer = query.viewer()?;
    let card = state.card(id, viewer.as_ref(), unix_now()).await?;
    Ok(Json(card))
}

pub async fn get_admin_stats() -> Json<Value> {
    info!("GET /admin/stats - Metrics requested");
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "metrics": metrics::snapshot_as_json(),
    }))
}
