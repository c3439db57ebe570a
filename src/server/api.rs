use crate::agent::ChatEngine;
use crate::models::api::{ ChatRequest, ChatResponse, ErrorResponse, RecipeQuery, SuggestionQuery };
use crate::models::recipe::suggest_ingredients;
use crate::recipes::RecipeFinder;
use crate::session::SessionError;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, Path, Query },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use chrono::Utc;
use tower_http::cors::{ Any, CorsLayer };
use log::warn;

#[derive(Clone)]
struct AppState {
    engine: ChatEngine,
    recipes: Arc<RecipeFinder>,
}

pub fn router(engine: ChatEngine, recipes: Arc<RecipeFinder>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/sessions", get(snapshot_handler).post(new_session_handler))
        .route("/api/sessions/{index}/select", post(select_handler))
        .route("/api/sessions/{index}/delete", post(request_delete_handler))
        .route("/api/deletion/confirm", post(confirm_delete_handler))
        .route("/api/deletion/cancel", post(cancel_delete_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/recipes", get(recipes_handler))
        .route("/api/ingredients", get(ingredients_handler))
        .layer(cors)
        .with_state(AppState { engine, recipes })
}

fn session_error(err: SessionError) -> Response {
    warn!("Rejected session request: {}", err);
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: err.to_string() })).into_response()
}

async fn snapshot_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.snapshot())
}

async fn new_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.engine.new_chat();
    Json(state.engine.snapshot())
}

async fn select_handler(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    match state.engine.select_session(index) {
        Ok(_) => Json(state.engine.snapshot()).into_response(),
        Err(e) => session_error(e),
    }
}

async fn request_delete_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>
) -> Response {
    match state.engine.request_deletion(index) {
        Ok(()) => Json(state.engine.snapshot()).into_response(),
        Err(e) => session_error(e),
    }
}

async fn confirm_delete_handler(State(state): State<AppState>) -> Response {
    match state.engine.confirm_deletion() {
        Ok(_) => Json(state.engine.snapshot()).into_response(),
        Err(e) => session_error(e),
    }
}

async fn cancel_delete_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.engine.cancel_deletion();
    Json(state.engine.snapshot())
}

async fn chat_handler(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    match state.engine.send(&req.text).await {
        Some(message) => {
            let response = ChatResponse { message, timestamp: Utc::now().timestamp() };
            Json(response).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn recipes_handler(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>
) -> impl IntoResponse {
    let fields: Vec<String> = query.ingredients.split(',').map(str::to_string).collect();
    Json(state.recipes.find(&fields).await)
}

async fn ingredients_handler(Query(query): Query<SuggestionQuery>) -> impl IntoResponse {
    Json(suggest_ingredients(&query.prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStorage;
    use crate::llm::chat::ChatClient;
    use crate::llm::ChatReply;
    use crate::models::api::ChatSnapshot;
    use crate::models::chat::{ greeting, Message };
    use crate::models::recipe::Recipe;
    use crate::recipes::{ RecipeError, RecipeProvider };
    use crate::session::SessionStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    struct EchoClient;

    #[async_trait]
    impl ChatClient for EchoClient {
        async fn complete(&self, prompt: &str) -> ChatReply {
            ChatReply::Success { text: format!("chef says: {}", prompt) }
        }

        fn get_model(&self) -> String {
            "echo".into()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    struct OneRecipe;

    #[async_trait]
    impl RecipeProvider for OneRecipe {
        fn name(&self) -> &'static str {
            "one"
        }

        async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, RecipeError> {
            Ok(vec![Recipe {
                id: "1".into(),
                title: ingredients.to_string(),
                image: None,
                instructions: vec![],
                source_url: String::new(),
            }])
        }
    }

    fn app() -> Router {
        let store = SessionStore::load(Arc::new(MemoryStorage::default()));
        let engine = ChatEngine::new(Arc::new(EchoClient), store);
        router(engine, Arc::new(RecipeFinder::new(Arc::new(OneRecipe), None)))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn fresh_app_shows_greeting() {
        let app = app();
        let response = call(&app, "GET", "/api/sessions", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: ChatSnapshot = json_body(response).await;
        assert_eq!(snapshot.active, greeting());
        assert!(snapshot.sessions.is_empty());
        assert!(!snapshot.is_typing);
    }

    #[tokio::test]
    async fn chat_round_trip_and_blank_prompt() {
        let app = app();
        let response = call(&app, "POST", "/api/chat", Some(r#"{"text":"pasta"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let reply: ChatResponse = json_body(response).await;
        assert_eq!(reply.message, Message::bot("chef says: pasta"));

        let response = call(&app, "POST", "/api/chat", Some(r#"{"text":"   "}"#)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let snapshot: ChatSnapshot = json_body(call(&app, "GET", "/api/sessions", None).await).await;
        assert_eq!(snapshot.active.len(), 3);
        assert_eq!(snapshot.sessions, vec![snapshot.active.clone()]);
    }

    #[tokio::test]
    async fn deletion_requires_confirmation() {
        let app = app();
        call(&app, "POST", "/api/chat", Some(r#"{"text":"soup"}"#)).await;
        call(&app, "POST", "/api/sessions", None).await;

        let snapshot: ChatSnapshot = json_body(call(&app, "POST", "/api/sessions/1/delete", None).await).await;
        assert_eq!(snapshot.pending_deletion, Some(1));
        assert_eq!(snapshot.sessions.len(), 2);

        let snapshot: ChatSnapshot = json_body(call(&app, "POST", "/api/deletion/cancel", None).await).await;
        assert_eq!(snapshot.pending_deletion, None);
        assert_eq!(snapshot.sessions.len(), 2);

        call(&app, "POST", "/api/sessions/1/delete", None).await;
        let snapshot: ChatSnapshot = json_body(call(&app, "POST", "/api/deletion/confirm", None).await).await;
        assert_eq!(snapshot.sessions, vec![greeting()]);
        assert_eq!(snapshot.pending_deletion, None);
    }

    #[tokio::test]
    async fn out_of_range_index_is_not_found() {
        let app = app();
        assert_eq!(call(&app, "POST", "/api/sessions/3/select", None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(call(&app, "POST", "/api/sessions/0/delete", None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recipes_and_suggestions() {
        let app = app();
        let recipes: Vec<Recipe> =
            json_body(call(&app, "GET", "/api/recipes?ingredients=tomato,,egg", None).await).await;
        assert_eq!(recipes[0].title, "tomato,egg");

        let recipes: Vec<Recipe> = json_body(call(&app, "GET", "/api/recipes", None).await).await;
        assert!(recipes.is_empty());

        let suggestions: Vec<String> =
            json_body(call(&app, "GET", "/api/ingredients?prefix=ch", None).await).await;
        assert_eq!(suggestions, vec!["chicken".to_string(), "cheese".to_string()]);
    }
}
