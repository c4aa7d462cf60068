use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::views;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Invalid stored data: {0}")]
    Corrupt(String),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { entity, id } => {
                tracing::debug!(entity, id, "lookup missed");
                (
                    StatusCode::NOT_FOUND,
                    Html(views::error_page("Not Found", "The requested page could not be found.")),
                )
                    .into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(
                        "Server Error",
                        "Something went wrong while handling your request.",
                    )),
                )
                    .into_response()
            }
        }
    }
}
