use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{auth_middleware, track_requests};
use crate::state::AppState;

/// Multipart framing on top of the configured file size
const MULTIPART_OVERHEAD: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.storage.max_upload_size + MULTIPART_OVERHEAD;

    // Public routes (no authentication required)
    let public_api = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh_token))
        .route("/auth/oauth", post(handlers::auth::oauth_login))
        .route(
            "/auth/password-reset/request",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        .route("/settings/currency", get(handlers::settings::currencies))
        .route("/settings/language", get(handlers::settings::languages));

    // Protected routes (bearer access token required)
    let protected_api = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        // Users
        .route(
            "/users/me",
            get(handlers::users::get_me)
                .put(handlers::users::update_me)
                .delete(handlers::users::delete_me),
        )
        .route("/users/verify-email", post(handlers::users::verify_email))
        .route(
            "/users/change-password",
            post(handlers::users::change_password),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/system",
            get(handlers::categories::system_categories),
        )
        .route(
            "/categories/:id",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        // Transactions
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route(
            "/transactions/period/:period",
            get(handlers::transactions::list_period),
        )
        .route(
            "/transactions/grouped",
            get(handlers::transactions::grouped_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::transactions::get_transaction)
                .put(handlers::transactions::update_transaction)
                .delete(handlers::transactions::delete_transaction),
        )
        .route(
            "/transactions/:id/receipt",
            post(handlers::transactions::upload_receipt)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Budgets
        .route("/budgets", post(handlers::budgets::create_budget))
        .route(
            "/budgets/monthly/:year/:month",
            get(handlers::budgets::monthly_overview),
        )
        .route(
            "/budgets/current-month",
            get(handlers::budgets::current_month),
        )
        .route("/budgets/period", get(handlers::budgets::budgets_for_period))
        .route("/budgets/quick-setup", post(handlers::budgets::quick_setup))
        .route(
            "/budgets/:id",
            get(handlers::budgets::get_budget)
                .put(handlers::budgets::update_budget)
                .delete(handlers::budgets::delete_budget),
        )
        .route(
            "/budgets/:id/deactivate",
            post(handlers::budgets::deactivate_budget),
        )
        // Profile
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route(
            "/profile/subscription/:subscription_type",
            post(handlers::profile::update_subscription),
        )
        .route(
            "/profile/financial",
            get(handlers::profile::get_financial).put(handlers::profile::update_financial),
        )
        .route(
            "/profile/accounts",
            get(handlers::profile::list_accounts).post(handlers::profile::create_account),
        )
        .route(
            "/profile/accounts/:id",
            put(handlers::profile::update_account).delete(handlers::profile::delete_account),
        )
        .route("/profile/full", get(handlers::profile::full_profile))
        // Settings
        .route(
            "/settings/currency/:code",
            put(handlers::settings::update_currency),
        )
        .route(
            "/settings/language/:code",
            put(handlers::settings::update_language),
        )
        .route(
            "/settings/notifications",
            put(handlers::settings::update_notifications),
        )
        // Notifications
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/summary",
            get(handlers::notifications::summary),
        )
        .route(
            "/notifications/mark-all-read",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/notifications/test",
            post(handlers::notifications::create_test_notification),
        )
        .route(
            "/notifications/generate-test-data",
            post(handlers::notifications::generate_test_data),
        )
        .route(
            "/notifications/:id",
            get(handlers::notifications::get_notification)
                .put(handlers::notifications::update_notification)
                .delete(handlers::notifications::delete_notification),
        )
        // Reports
        .route(
            "/reports/weekly-summary",
            get(handlers::reports::weekly_summary),
        )
        .route(
            "/reports/monthly-summary",
            get(handlers::reports::monthly_summary),
        )
        .route(
            "/reports/income-vs-expenses",
            get(handlers::reports::income_vs_expenses),
        )
        .route(
            "/reports/spending-categories",
            get(handlers::reports::spending_categories),
        )
        .route("/reports/weekly-trend", get(handlers::reports::weekly_trend))
        .route("/reports/insights", get(handlers::reports::insights))
        .route("/reports/export", post(handlers::reports::export_report))
        .route(
            "/reports/export/:id/download",
            get(handlers::reports::download_export),
        )
        .route("/reports/exports", get(handlers::reports::recent_exports))
        .route(
            "/reports/exports/:id",
            axum::routing::delete(handlers::reports::delete_export),
        )
        // Chat
        .route(
            "/chat/sessions",
            get(handlers::chat::list_sessions).post(handlers::chat::create_session),
        )
        .route(
            "/chat/sessions/:id",
            get(handlers::chat::get_session).delete(handlers::chat::delete_session),
        )
        .route(
            "/chat/sessions/:id/messages",
            post(handlers::chat::send_message),
        )
        .route(
            "/chat/sessions/:id/suggestions",
            get(handlers::chat::suggestions),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = public_api.merge(protected_api);

    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .nest(&state.config.server.api_prefix, api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(track_requests))
                .layer(cors_layer(&state.config.server.cors_allowed_origins))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use common::config::{OpenAiConfig, Settings};
    use common::db::DbPool;
    use common::services::{HttpOAuthVerifier, LogMailer, OpenAiClient};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let settings = Settings::default();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&settings.database.url)
            .unwrap();
        let state = AppState::new(
            DbPool::from_pool(pool),
            settings,
            Arc::new(LogMailer),
            Arc::new(HttpOAuthVerifier::new(None).unwrap()),
            Arc::new(OpenAiClient::new(OpenAiConfig::default()).unwrap()),
        );
        create_router(state)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_root_reports_version() {
        let response = test_router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/budgets/current-month")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_settings_options_are_public() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/settings/currency")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let codes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["USD", "EUR", "RUB", "KZT", "GBP"]);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_accepts_wildcard_and_lists() {
        cors_layer(&["*".to_string()]);
        cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
        cors_layer(&[]);
    }
}
