//! Adapter for function-as-a-service hosts: one `request -> response` entry
//! point backed by the full application, built on first use.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tokio::sync::OnceCell;
use tower::ServiceExt;

use crate::config::Config;
use crate::views;

static APP: OnceCell<Router> = OnceCell::const_new();

async fn application() -> anyhow::Result<&'static Router> {
    APP.get_or_try_init(|| async {
        let config = Config::from_env()?;
        crate::routes::build(&config).await
    })
    .await
}

/// Dispatches `request` through an already-built application.
pub async fn dispatch(app: &Router, request: Request<Body>) -> Response {
    let Ok(response) = app.clone().oneshot(request).await;
    response
}

pub async fn handler(request: Request<Body>) -> Response {
    match application().await {
        Ok(app) => dispatch(app, request).await,
        Err(e) => {
            tracing::error!(error = %e, "application failed to start");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::error_page(
                    "Server Error",
                    "The application is not available.",
                )),
            )
                .into_response()
        }
    }
}
