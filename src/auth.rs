use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;

use crate::constants::*;
use crate::database::{Db, get_i64, get_text, now_timestamp};
use crate::entity::{FormField, Widget};
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::models::{Account, LoginForm, RegisterForm};
use crate::routes::redirect;
use crate::validation::{FieldErrors, is_valid_email};
use crate::views;

/// The authenticated account making the request.
///
/// Extracting an `Actor` is what puts a handler behind the login wall:
/// requests without a logged-in session are redirected to the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match current_actor(&session).await {
            Ok(Some(actor)) => Ok(actor),
            Ok(None) => Err(redirect(LOGIN_PATH)),
            Err(e) => Err(e.into_response()),
        }
    }
}

pub async fn current_actor(session: &Session) -> Result<Option<Actor>, AppError> {
    let user_id: Option<i64> = session.get(SESSION_USER_ID).await?;
    let username: Option<String> = session.get(SESSION_USERNAME).await?;

    Ok(match (user_id, username) {
        (Some(id), Some(username)) => Some(Actor { id, username }),
        _ => None,
    })
}

async fn start_session(session: &Session, account: &Account) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID, account.id).await?;
    session.insert(SESSION_USERNAME, &account.username).await?;
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn create_account(
    db: &Db,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Account, AppError> {
    let password_hash = hash_password(password)?;
    let date_joined = now_timestamp();
    let conn = db.write().await;

    conn.execute(
        "INSERT INTO users (username, email, password_hash, date_joined) VALUES (?, ?, ?, ?)",
        (username, email, password_hash.as_str(), date_joined),
    )
    .await?;

    Ok(Account {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        date_joined,
    })
}

pub async fn get_account_by_username(db: &Db, username: &str) -> Result<Option<Account>, AppError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, username, email, password_hash, date_joined FROM users WHERE username = ?",
            [username],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(Account {
            id: get_i64(&row, 0)?,
            username: get_text(&row, 1)?,
            email: get_text(&row, 2)?,
            password_hash: get_text(&row, 3)?,
            date_joined: get_i64(&row, 4)?,
        })),
        None => Ok(None),
    }
}

/// Removes an account. Records it created stay, with their owner cleared.
pub async fn delete_account(db: &Db, id: i64) -> Result<(), AppError> {
    let conn = db.write().await;
    let affected = conn.execute("DELETE FROM users WHERE id = ?", [id]).await?;
    if affected == 0 {
        return Err(AppError::not_found("Account", id));
    }
    Ok(())
}

/// Checks a registration form, including username availability.
///
/// The outer error is an infrastructure failure; the inner one carries the
/// field errors to show on the form.
pub async fn validate_registration(
    db: &Db,
    form: &RegisterForm,
) -> Result<Result<(), FieldErrors>, AppError> {
    let mut errors = FieldErrors::new();
    let username = form.username.trim();

    if username.is_empty() {
        errors.push("username", ERR_REQUIRED);
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.push(
            "username",
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                MAX_USERNAME_LENGTH,
                username.chars().count()
            ),
        );
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.push(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    } else {
        if get_account_by_username(db, username).await?.is_some() {
            errors.push("username", ERR_USERNAME_TAKEN);
        }
    }

    let email = form.email.trim();
    if !email.is_empty() && (email.len() > MAX_EMAIL_LENGTH || !is_valid_email(email)) {
        errors.push("email", ERR_INVALID_EMAIL);
    }

    if form.password1.is_empty() {
        errors.push("password1", ERR_REQUIRED);
    }
    if form.password2.is_empty() {
        errors.push("password2", ERR_REQUIRED);
    } else if form.password1 != form.password2 {
        errors.push("password2", ERR_PASSWORD_MISMATCH);
    } else {
        if form.password1.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password2",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            );
        }
        if form.password1.chars().all(|c| c.is_ascii_digit()) {
            errors.push("password2", "This password is entirely numeric.");
        }
    }

    Ok(if errors.is_empty() { Ok(()) } else { Err(errors) })
}

fn register_fields(form: &RegisterForm) -> Vec<FormField> {
    vec![
        FormField::new("username", "Username", Widget::Text, &form.username),
        FormField::new("email", "Email address", Widget::Email, &form.email),
        FormField::new("password1", "Password", Widget::Password, ""),
        FormField::new("password2", "Password confirmation", Widget::Password, ""),
    ]
}

fn login_fields(form: &LoginForm) -> Vec<FormField> {
    vec![
        FormField::new("username", "Username", Widget::Text, &form.username),
        FormField::new("password", "Password", Widget::Password, ""),
    ]
}

async fn render_register(
    session: &Session,
    form: &RegisterForm,
    errors: &FieldErrors,
) -> Result<Html<String>, AppError> {
    let messages = flash::take(session).await?;
    let body = views::form(
        &format!("{}/register/", APP_PREFIX),
        &register_fields(form),
        errors,
        "Register",
    );
    Ok(Html(views::layout("Register", None, &messages, &body)))
}

async fn render_login(
    session: &Session,
    form: &LoginForm,
    errors: &FieldErrors,
) -> Result<Html<String>, AppError> {
    let messages = flash::take(session).await?;
    let body = views::form(LOGIN_PATH, &login_fields(form), errors, "Log In");
    Ok(Html(views::layout("Login", None, &messages, &body)))
}

pub async fn register_page(session: Session) -> Result<Html<String>, AppError> {
    render_register(&session, &RegisterForm::default(), &FieldErrors::new()).await
}

pub async fn register(
    State(db): State<Db>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = validate_registration(&db, &form).await? {
        return Ok(render_register(&session, &form, &errors).await?.into_response());
    }

    let account = match create_account(&db, form.username.trim(), form.email.trim(), &form.password1).await {
        Ok(account) => account,
        // lost a race with another registration for the same name
        Err(AppError::Database(e)) if e.to_string().contains("UNIQUE constraint failed") => {
            let mut errors = FieldErrors::new();
            errors.push("username", ERR_USERNAME_TAKEN);
            return Ok(render_register(&session, &form, &errors).await?.into_response());
        }
        Err(e) => return Err(e),
    };

    start_session(&session, &account).await?;
    tracing::info!(user_id = account.id, username = %account.username, "account registered");
    flash::success(&session, "Registration successful! You are now logged in.").await?;
    Ok(redirect(DASHBOARD_PATH))
}

pub async fn login_page(session: Session) -> Result<Html<String>, AppError> {
    render_login(&session, &LoginForm::default(), &FieldErrors::new()).await
}

pub async fn login(
    State(db): State<Db>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    let account = if username.is_empty() || form.password.is_empty() {
        None
    } else {
        match get_account_by_username(&db, username).await? {
            Some(account) if verify_password(&form.password, &account.password_hash)? => {
                Some(account)
            }
            _ => None,
        }
    };

    let Some(account) = account else {
        tracing::warn!(username, "failed login attempt");
        flash::push(&session, Level::Error, ERR_INVALID_LOGIN).await?;
        return Ok(render_login(&session, &form, &FieldErrors::new())
            .await?
            .into_response());
    };

    start_session(&session, &account).await?;
    tracing::info!(user_id = account.id, "logged in");
    flash::success(&session, format!("Welcome back, {}!", account.username)).await?;
    Ok(redirect(DASHBOARD_PATH))
}

pub async fn logout(actor: Actor, session: Session) -> Result<Response, AppError> {
    session.clear().await;
    session.cycle_id().await?;
    tracing::info!(user_id = actor.id, "logged out");
    flash::push(&session, Level::Info, "You have been logged out.").await?;
    Ok(redirect(HOME_PATH))
}

pub async fn home(session: Session) -> Result<Html<String>, AppError> {
    let actor = current_actor(&session).await?;
    let messages = flash::take(&session).await?;
    Ok(Html(views::home(actor.as_ref(), &messages)))
}
