use super::error::ApiError;
use super::AppState;
use crate::deadline::Deadline;
use crate::services::{PageRequest, RankedEntry, SearchHit};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

/// Raw pagination query. Parsed leniently: junk falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl LeaderboardParams {
    fn page_request(&self) -> PageRequest {
        let parse = |value: &Option<String>| value.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
        PageRequest::new(parse(&self.page), parse(&self.limit))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub username: Option<String>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/users
pub async fn insert_users(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = state
        .bootstrap
        .load(Deadline::after(state.timeouts.bootstrap))
        .await?;

    Ok(Json(json!({
        "message": "leaderboard bootstrap completed",
        "members": report.members,
    })))
}

/// GET /api/leadboard
pub async fn fetch_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<RankedEntry>>, ApiError> {
    let entries = state
        .rank_query
        .page(
            params.page_request(),
            Deadline::after(state.timeouts.leaderboard),
        )
        .await?;
    Ok(Json(entries))
}

/// GET /api/username
pub async fn search_user(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let fragment = params
        .username
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::BadRequest("username required"))?;

    let hits = state
        .search
        .search(&fragment, Deadline::after(state.timeouts.search))
        .await?;
    Ok(Json(hits))
}

/// POST /api/simulate
pub async fn simulate(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = state
        .simulator
        .simulate(
            state.simulation_updates,
            Deadline::after(state.timeouts.simulate),
        )
        .await?;

    Ok(Json(json!({
        "message": "multi-user simulation completed",
        "updates": report.updates,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiSettings;
    use crate::db::SqliteDurableStore;
    use crate::pipeline::{QueueReceiver, UpdateQueue};
    use crate::ranking::{InMemoryRankedStore, PrefixIndex, RankedStore};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    struct Harness {
        state: AppState,
        durable: Arc<SqliteDurableStore>,
        ranked: Arc<InMemoryRankedStore>,
        _receiver: QueueReceiver,
    }

    async fn harness(users: &[(&str, i64)]) -> Harness {
        let durable = Arc::new(SqliteDurableStore::open(":memory:").unwrap());
        durable
            .insert_users(users.iter().map(|(u, r)| (u.to_string(), *r)).collect())
            .await
            .unwrap();
        let ranked = Arc::new(InMemoryRankedStore::new());
        let (queue, receiver) = UpdateQueue::bounded(1000);

        let state = AppState::new(
            durable.clone(),
            ranked.clone(),
            Arc::new(PrefixIndex::new()),
            queue,
            ApiSettings {
                bootstrap_page_size: 2,
                simulation_updates: 10,
                ..Default::default()
            },
        );
        Harness {
            state,
            durable,
            ranked,
            _receiver: receiver,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_insert_then_leaderboard() {
        let h = harness(&[("A", 100), ("B", 200), ("C", 150)]).await;

        let Json(body) = insert_users(State(h.state.clone())).await.unwrap();
        assert_eq!(body["members"], 3);
        assert_eq!(h.ranked.size().await.unwrap(), 3);

        let params = LeaderboardParams {
            page: Some("1".into()),
            limit: Some("2".into()),
        };
        let Json(entries) = fetch_leaderboard(State(h.state.clone()), Query(params))
            .await
            .unwrap();
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(
            json,
            json!([
                { "username": "B", "rating": 200, "rank": 1 },
                { "username": "C", "rating": 150, "rank": 2 },
            ])
        );
    }

    #[tokio::test]
    async fn test_leaderboard_bad_params_use_defaults() {
        let h = harness(&[("A", 1)]).await;
        insert_users(State(h.state.clone())).await.unwrap();

        let params = LeaderboardParams {
            page: Some("abc".into()),
            limit: Some("500".into()),
        };
        assert_eq!(params.page_request(), PageRequest::new(None, None));

        let Json(entries) = fetch_leaderboard(State(h.state.clone()), Query(params))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_search_requires_username() {
        let h = harness(&[]).await;

        for username in [None, Some(String::new())] {
            let err = search_user(State(h.state.clone()), Query(SearchParams { username }))
                .await
                .unwrap_err();
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await, json!({ "error": "username required" }));
        }
    }

    #[tokio::test]
    async fn test_search_after_bootstrap() {
        let h = harness(&[("Bob", 10), ("Barb", 30), ("Alice", 20)]).await;
        insert_users(State(h.state.clone())).await.unwrap();

        let params = SearchParams {
            username: Some("B".into()),
        };
        let Json(hits) = search_user(State(h.state.clone()), Query(params)).await.unwrap();
        let json = serde_json::to_value(&hits).unwrap();
        assert_eq!(
            json,
            json!([
                { "rank": 1, "username": "Barb", "rating": 30 },
                { "rank": 3, "username": "Bob", "rating": 10 },
            ])
        );
    }

    #[tokio::test]
    async fn test_simulate_on_empty_leaderboard() {
        let h = harness(&[]).await;

        let response = simulate(State(h.state.clone())).await.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "leaderboard empty" }));
    }

    #[tokio::test]
    async fn test_simulate_reports_updates() {
        let h = harness(&[("A", 1), ("B", 2)]).await;
        insert_users(State(h.state.clone())).await.unwrap();

        let Json(body) = simulate(State(h.state.clone())).await.unwrap();
        assert_eq!(body["updates"], 10);
        assert_eq!(body["message"], "multi-user simulation completed");
        // Nothing is flushed without a running pipeline
        assert_eq!(h.durable.rating_of("A").await.unwrap(), Some(1));
    }
}
