use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::{allocations, grants, sync, transactions};
use engine::{Engine, source::DealSource};

/// Credential used for outbound calls to the bookkeeping API.
///
/// Read once at startup and passed explicitly; the server never persists it.
#[derive(Clone)]
pub struct SourceCredential {
    pub access_token: String,
    /// Default company when a sync request names none.
    pub company_id: Option<i64>,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub source: Arc<dyn DealSource>,
    pub credential: SourceCredential,
    /// Set while a sync run executes; concurrent requests get a 409.
    pub sync_running: Arc<AtomicBool>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/sync", post(sync::run))
        .route("/transactions", get(transactions::list))
        .route("/transactions/reset", post(transactions::reset))
        .route("/allocations", post(allocations::create))
        .route("/allocations/orphaned", get(allocations::list_orphaned))
        .route("/allocations/{id}", delete(allocations::remove))
        .route("/allocations/{id}/rebind", patch(allocations::rebind))
        .route("/grants", post(grants::create).get(grants::list))
        .route(
            "/grants/{id}/budget-items",
            post(grants::budget_item_new).get(grants::budget_items_list),
        )
        .route(
            "/grants/{id}/budget-items/reorder",
            post(grants::budget_items_reorder),
        )
        .with_state(state)
}

pub async fn run(engine: Engine, source: Arc<dyn DealSource>, credential: SourceCredential) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, source, credential, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    source: Arc<dyn DealSource>,
    credential: SourceCredential,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        source,
        credential,
        sync_running: Arc::new(AtomicBool::new(false)),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    source: Arc<dyn DealSource>,
    credential: SourceCredential,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, source, credential, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use sea_orm::Database;
    use tower::ServiceExt;

    use engine::source::{Company, DateRange, Deal, SourceError};
    use migration::MigratorTrait;

    use super::*;

    struct EmptySource;

    #[async_trait]
    impl DealSource for EmptySource {
        async fn companies(&self, _token: &str) -> Result<Vec<Company>, SourceError> {
            Ok(vec![Company {
                id: 1,
                display_name: "x".to_string(),
                role: String::new(),
            }])
        }

        async fn deals(
            &self,
            _token: &str,
            _company_id: i64,
            _range: DateRange,
            _limit: u64,
            _offset: u64,
        ) -> Result<Vec<Deal>, SourceError> {
            Ok(Vec::new())
        }

        async fn account_items(
            &self,
            _token: &str,
            _company_id: i64,
        ) -> Result<HashMap<i64, String>, SourceError> {
            Ok(HashMap::new())
        }

        async fn tags(
            &self,
            _token: &str,
            _company_id: i64,
        ) -> Result<HashMap<i64, String>, SourceError> {
            Ok(HashMap::new())
        }
    }

    async fn test_state() -> ServerState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        ServerState {
            engine: Arc::new(engine),
            source: Arc::new(EmptySource),
            credential: SourceCredential {
                access_token: "token".to_string(),
                company_id: Some(1),
            },
            sync_running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn allocation_lifecycle_over_http() {
        let app = router(test_state().await);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/grants",
                serde_json::json!({ "name": "環境整備助成" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let grant = body_json(response).await;
        let grant_id = grant["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/grants/{grant_id}/budget-items"),
                serde_json::json!({ "name": "広報費" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let item = body_json(response).await;
        let item_id = item["id"].as_str().unwrap().to_string();

        // An orphan: no detail id attached yet.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/allocations",
                serde_json::json!({ "budget_item_id": item_id, "amount": 4000 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let allocation = body_json(response).await;
        let allocation_id = allocation["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/allocations/orphaned")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let orphans = body_json(response).await;
        assert_eq!(orphans["allocations"].as_array().unwrap().len(), 1);

        // Rebinding to a line nobody synced is a 404.
        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/allocations/{allocation_id}/rebind"),
                serde_json::json!({ "detail_id": 9001 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/allocations/{allocation_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn reset_without_confirmation_is_rejected() {
        let app = router(test_state().await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/transactions/reset",
                serde_json::json!({ "confirm": false }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn concurrent_sync_gets_conflict() {
        let state = test_state().await;
        state
            .sync_running
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let app = router(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/sync",
                serde_json::json!({ "start_date": "2026-04-01", "end_date": "2026-04-30" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn empty_sync_reports_zero_counts() {
        let app = router(test_state().await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/sync",
                serde_json::json!({ "start_date": "2026-04-01", "end_date": "2026-04-30" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let summary = body_json(response).await;
        assert_eq!(summary["fetched"], 0);
        assert_eq!(summary["created"], 0);
    }
}
