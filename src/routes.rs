use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use crate::auth;
use crate::commercials::Commercial;
use crate::config::{Config, ConfigError, validate_session_secret};
use crate::constants::*;
use crate::crud;
use crate::dashboard;
use crate::database::Db;
use crate::entity::Entity;
use crate::finances::FinancialTransaction;
use crate::programmes::Programme;
use crate::todos::TodoItem;

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn entity_routes<E: Entity>(router: Router<Db>) -> Router<Db> {
    let base = format!("{}/{}", APP_PREFIX, E::PATH);
    router
        .route(&format!("{}/", base), get(crud::list::<E>))
        .route(
            &format!("{}/add/", base),
            get(crud::create_page::<E>).post(crud::create::<E>),
        )
        .route(&format!("{}/{{id}}/", base), get(crud::detail::<E>))
        .route(
            &format!("{}/{{id}}/edit/", base),
            get(crud::edit_page::<E>).post(crud::edit::<E>),
        )
        .route(
            &format!("{}/{{id}}/delete/", base),
            get(crud::delete_page::<E>).post(crud::delete::<E>),
        )
}

/// Every page of the application, without session or tracing layers.
pub fn routes() -> Router<Db> {
    let router = Router::new()
        .route(HOME_PATH, get(auth::home))
        .route(
            &format!("{}/register/", APP_PREFIX),
            get(auth::register_page).post(auth::register),
        )
        .route(LOGIN_PATH, get(auth::login_page).post(auth::login))
        .route(
            &format!("{}/logout/", APP_PREFIX),
            get(auth::logout).post(auth::logout),
        )
        .route(DASHBOARD_PATH, get(dashboard::dashboard));

    let router = entity_routes::<Programme>(router);
    let router = entity_routes::<FinancialTransaction>(router);
    let router = entity_routes::<TodoItem>(router);
    entity_routes::<Commercial>(router)
}

/// The complete application: routes, signed cookie sessions and request
/// tracing, bound to `db`.
pub fn app(db: Db, config: &Config) -> Result<Router, ConfigError> {
    validate_session_secret(&config.session_secret)?;
    let key = Key::try_from(config.session_secret.as_bytes())
        .map_err(|e| ConfigError::InvalidSessionSecret(e.to_string()))?;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.session_secure)
        .with_name(SESSION_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_signed(key);

    Ok(routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(db))
}

/// Opens the database named by `config` and builds the application on it.
pub async fn build(config: &Config) -> anyhow::Result<Router> {
    let db = crate::database::init_db(&config.data_path).await?;
    tracing::info!(data_path = %config.data_path, "database ready");
    Ok(app(db, config)?)
}
