//! Ledger routes.

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkout_core::{Block, ChainHead, CheckoutRecord, LedgerError};
use serde::Serialize;
use tracing::{error, info};

/// Maps ledger failures onto HTTP statuses.
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LedgerError::InvalidExtension(_) => StatusCode::CONFLICT,
            LedgerError::EmptyChain => {
                error!("ledger has no genesis block");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// GET /
pub async fn get_chain(State(state): State<AppState>) -> Json<Vec<Block>> {
    Json(state.chain.snapshot())
}

/// POST /
pub async fn append_checkout(
    State(state): State<AppState>,
    Json(record): Json<CheckoutRecord>,
) -> Result<(StatusCode, Json<Block>), ApiError> {
    let block = state.chain.append(record)?;
    info!(
        position = block.position(),
        book_id = block.payload().book_id(),
        "checkout recorded"
    );
    Ok((StatusCode::CREATED, Json(block)))
}

/// POST /block
pub async fn commit_block(
    State(state): State<AppState>,
    Json(candidate): Json<Block>,
) -> Result<(StatusCode, Json<Block>), ApiError> {
    let block = state.chain.commit(candidate)?;
    info!(position = block.position(), "external block committed");
    Ok((StatusCode::CREATED, Json(block)))
}

/// GET /chain/head
pub async fn head(State(state): State<AppState>) -> Result<Json<ChainHead>, ApiError> {
    Ok(Json(state.chain.head()?))
}

#[derive(Serialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub error: Option<String>,
}

/// GET /validate
pub async fn validate(State(state): State<AppState>) -> Json<ValidateResp> {
    match state.chain.validate() {
        Ok(()) => Json(ValidateResp {
            ok: true,
            error: None,
        }),
        Err(err) => {
            error!(error = %err, "chain audit failed");
            Json(ValidateResp {
                ok: false,
                error: Some(err.to_string()),
            })
        }
    }
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[cfg(test)]
mod tests {
    use crate::{app, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use checkout_core::{Block, Blockchain, CheckoutRecord};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> (AppState, Router) {
        let state = AppState::new(Blockchain::new());
        (state.clone(), app(state))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_chain_lists_genesis() {
        let (_, app) = test_app();
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let blocks = body.as_array().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["position"], 0);
        assert_eq!(blocks[0]["payload"]["is_genesis"], true);
        assert_eq!(blocks[0]["previous_hash"], "");
    }

    #[tokio::test]
    async fn post_checkout_commits_block() {
        let (state, app) = test_app();
        let genesis_hash = state.chain.tail().unwrap().hash().to_string();

        let response = app
            .oneshot(post_json(
                "/",
                json!({"book_id": "b1", "user": "u1", "checkout_date": "2024-01-01"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let block = body_json(response).await;
        assert_eq!(block["position"], 1);
        assert_eq!(block["previous_hash"], genesis_hash.as_str());
        assert_eq!(block["payload"]["book_id"], "b1");
        assert_eq!(state.chain.len(), 2);
        assert_eq!(state.chain.validate(), Ok(()));
    }

    #[tokio::test]
    async fn post_undecodable_checkout_is_rejected() {
        let (state, app) = test_app();
        let response = app
            .clone()
            .oneshot(post_json("/", json!({"book_id": 5})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(state.chain.len(), 1);
    }

    #[tokio::test]
    async fn post_forged_block_conflicts() {
        let (state, app) = test_app();
        let tail = state
            .chain
            .append(CheckoutRecord::new("b1", "u1", "2024-01-01"))
            .unwrap();
        let next = Block::create(&tail, CheckoutRecord::new("b2", "u2", "2024-01-02"));
        let mut forged = serde_json::to_value(next).unwrap();
        forged["previous_hash"] = json!("0000");
        let before = serde_json::to_vec(&state.chain.snapshot()).unwrap();

        let response = app.oneshot(post_json("/block", forged)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("previous hash mismatch"));
        assert_eq!(serde_json::to_vec(&state.chain.snapshot()).unwrap(), before);
    }

    #[tokio::test]
    async fn post_valid_block_is_committed() {
        let (state, app) = test_app();
        let tail = state.chain.tail().unwrap();
        let next = Block::create(&tail, CheckoutRecord::new("b1", "u1", "2024-01-01"));

        let response = app
            .oneshot(post_json("/block", serde_json::to_value(&next).unwrap()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(state.chain.tail().unwrap(), next);
    }

    #[tokio::test]
    async fn head_and_validate_report_tail() {
        let (state, app) = test_app();
        let block = state
            .chain
            .append(CheckoutRecord::new("b1", "u1", "2024-01-01"))
            .unwrap();

        let head = body_json(app.clone().oneshot(get("/chain/head")).await.unwrap()).await;
        assert_eq!(head["height"], 1);
        assert_eq!(head["hash"], block.hash());

        let audit = body_json(app.oneshot(get("/validate")).await.unwrap()).await;
        assert_eq!(audit["ok"], true);
        assert!(audit["error"].is_null());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (_, app) = test_app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn new_book_assigns_catalog_id() {
        let (state, app) = test_app();
        let response = app
            .oneshot(post_json(
                "/new",
                json!({
                    "title": "The C Programming Language",
                    "author": "Kernighan & Ritchie",
                    "publish_date": "1988-03-22",
                    "isbn": "978-0131103627"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let book = body_json(response).await;
        assert_eq!(book["id"], "034d6d1c9b9ce06b29b12ed5a37361df");
        assert_eq!(book["title"], "The C Programming Language");
        assert_eq!(state.chain.len(), 1);
    }
}
