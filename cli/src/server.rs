use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

use crate::assistant;
use pantry_core::error::PantryError;
use pantry_core::models::{ChatReply, Ingredient, IngredientDraft, Recipe, RecipeDraft};
use pantry_core::service::{
    INGREDIENT_DELETED, INGREDIENT_SAVED, PantryService, RECIPE_ADDED, TextGenerator,
};

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const GENERATION_DISABLED: &str =
    "Text generation is not configured (set GEMINI_API_KEY)";

#[derive(Clone)]
struct AppState {
    service: Arc<Mutex<PantryService>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

// --- Request / Response types ---

/// Both chatbot variants share one route; `message` selects the free-text one.
#[derive(Deserialize, Default)]
struct ChatRequest {
    message: Option<String>,
    preference: Option<String>,
    available_ingredients: Option<Vec<String>>,
}

impl ChatRequest {
    /// An empty `message` counts as absent.
    fn is_structured(&self) -> bool {
        self.message.as_deref().is_none_or(str::is_empty)
            && (self.preference.is_some() || self.available_ingredients.is_some())
    }
}

#[derive(Deserialize)]
struct GenerateTextRequest {
    prompt: Option<String>,
}

#[derive(Serialize)]
struct GenerateTextResponse {
    generated_text: String,
}

#[derive(Deserialize)]
struct RecipeQuery {
    taste: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Upstream(String),
    Rejected(StatusCode, String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::Rejected(status, msg) => (status, msg),
            Self::Internal(err) => {
                error!(error = %format!("{err:#}"), "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<PantryError> for ApiError {
    fn from(err: PantryError) -> Self {
        match err {
            PantryError::Validation(msg) => Self::BadRequest(msg),
            PantryError::NotFound(msg) => Self::NotFound(msg),
            PantryError::Upstream(msg) => Self::Upstream(msg),
            PantryError::Store(err) => Self::Internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                Self::BadRequest(rejection.body_text())
            }
            other => Self::Rejected(other.status(), other.body_text()),
        }
    }
}

// --- Middleware ---

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request"
    );
    response
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn add_update_ingredient(
    State(state): State<AppState>,
    payload: Result<Json<IngredientDraft>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(draft) = payload?;
    let saved = {
        let service = state
            .service
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        service.add_or_update_ingredient(draft)?
    };
    info!(name = %saved.name, quantity = saved.quantity, unit = %saved.unit, "ingredient saved");
    Ok(Json(MessageResponse {
        message: INGREDIENT_SAVED,
    }))
}

async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let service = state
        .service
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    Ok(Json(service.list_ingredients()?))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = state
        .service
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    service.delete_ingredient(&name)?;
    Ok(Json(MessageResponse {
        message: INGREDIENT_DELETED,
    }))
}

async fn add_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(draft) = payload?;
    let recipe = {
        let service = state
            .service
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        service.add_recipe(draft)?
    };
    info!(id = recipe.id, title = %recipe.title, "recipe added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: RECIPE_ADDED,
        }),
    ))
}

async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let taste = query.taste.as_deref().filter(|t| !t.is_empty());
    let service = state
        .service
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    Ok(Json(service.list_recipes(taste)?))
}

async fn chatbot(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload?;

    if request.is_structured() {
        let service = state
            .service
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let reply = service.suggest_reply(
            request.preference.as_deref(),
            request.available_ingredients.as_deref(),
        )?;
        return Ok(Json(reply));
    }

    let mut reply = {
        let service = state
            .service
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        service.chat(request.message.as_deref())?
    };

    if let Some(message) = request.message.as_deref() {
        reply.generated = assistant::enrich(state.generator.as_deref(), message).await;
    }

    Ok(Json(reply))
}

async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Result<Json<GenerateTextResponse>, ApiError> {
    let Json(request) = payload?;
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(PROMPT_REQUIRED.to_string()))?;

    let generator = state
        .generator
        .as_deref()
        .ok_or_else(|| PantryError::Upstream(GENERATION_DISABLED.to_string()))?;

    let generated_text = generator.generate(&prompt).await.map_err(|e| {
        warn!(error = %format!("{e:#}"), "text generation failed");
        PantryError::Upstream(e.to_string())
    })?;

    Ok(Json(GenerateTextResponse { generated_text }))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/ingredients",
            post(add_update_ingredient).get(list_ingredients),
        )
        .route("/api/ingredients/{name}", delete(delete_ingredient))
        .route("/api/recipes", post(add_recipe).get(list_recipes))
        .route("/api/chatbot", post(chatbot))
        .route("/generate_text", post(generate_text))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

// --- Server startup ---

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

pub async fn start_server(
    service: PantryService,
    generator: Option<Arc<dyn TextGenerator>>,
    port: u16,
    bind: &str,
) -> anyhow::Result<()> {
    if generator.is_none() {
        warn!("text generation disabled: no GEMINI_API_KEY or GOOGLE_API_KEY set");
    }

    let state = AppState {
        service: Arc::new(Mutex::new(service)),
        generator,
    };
    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        warn!(%bind, "listening beyond loopback; the API has no authentication");
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    info!("listening on http://{bind}:{port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
