//! List / create / detail / update / delete, written once for every
//! [`Entity`]. Each handler receives the acting account explicitly and
//! passes its id down to the store.

use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;

use crate::auth::Actor;
use crate::database::Db;
use crate::entity::{self, Entity};
use crate::error::AppError;
use crate::flash;
use crate::routes::redirect;
use crate::store;
use crate::validation::FieldErrors;
use crate::views;

async fn page(
    session: &Session,
    actor: &Actor,
    title: &str,
    body: &str,
) -> Result<Html<String>, AppError> {
    let messages = flash::take(session).await?;
    Ok(Html(views::layout(title, Some(actor), &messages, body)))
}

async fn form_page<E: Entity>(
    session: &Session,
    actor: &Actor,
    title: &str,
    action: &str,
    form: &E::Form,
    errors: &FieldErrors,
) -> Result<Html<String>, AppError> {
    let body = views::form(action, &E::form_fields(form), errors, "Save");
    page(session, actor, title, &body).await
}

pub async fn list<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
) -> Result<Html<String>, AppError> {
    let records = store::list::<E>(&db, actor.id).await?;
    page(&session, &actor, E::TITLE_PLURAL, &views::entity_list(&records)).await
}

pub async fn create_page<E: Entity>(
    actor: Actor,
    session: Session,
) -> Result<Html<String>, AppError> {
    let title = format!("Add New {}", E::TITLE);
    form_page::<E>(
        &session,
        &actor,
        &title,
        &entity::create_path::<E>(),
        &E::initial_form(),
        &FieldErrors::new(),
    )
    .await
}

pub async fn create<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
    Form(form): Form<E::Form>,
) -> Result<Response, AppError> {
    let input = match E::validate(&form) {
        Ok(input) => input,
        Err(errors) => {
            let title = format!("Add New {}", E::TITLE);
            return Ok(form_page::<E>(
                &session,
                &actor,
                &title,
                &entity::create_path::<E>(),
                &form,
                &errors,
            )
            .await?
            .into_response());
        }
    };

    let id = store::insert::<E>(&db, &input, actor.id).await?;
    tracing::info!(entity = E::TABLE, id, actor = actor.id, "record created");
    flash::success(&session, format!("{} added successfully!", E::LABEL)).await?;
    Ok(redirect(&entity::list_path::<E>()))
}

pub async fn detail<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let record = store::find::<E>(&db, id, actor.id).await?;
    page(&session, &actor, &record.summary(), &views::entity_detail(&record)).await
}

pub async fn edit_page<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let record = store::find::<E>(&db, id, actor.id).await?;
    let title = format!("Update {}", E::TITLE);
    form_page::<E>(
        &session,
        &actor,
        &title,
        &entity::edit_path::<E>(id),
        &record.to_form(),
        &FieldErrors::new(),
    )
    .await
}

pub async fn edit<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<E::Form>,
) -> Result<Response, AppError> {
    // a missing or foreign record is a 404 even when the submission is invalid
    store::find::<E>(&db, id, actor.id).await?;

    let input = match E::validate(&form) {
        Ok(input) => input,
        Err(errors) => {
            let title = format!("Update {}", E::TITLE);
            return Ok(form_page::<E>(
                &session,
                &actor,
                &title,
                &entity::edit_path::<E>(id),
                &form,
                &errors,
            )
            .await?
            .into_response());
        }
    };

    store::update::<E>(&db, id, &input, actor.id).await?;
    tracing::info!(entity = E::TABLE, id, actor = actor.id, "record updated");
    flash::success(&session, format!("{} updated successfully!", E::LABEL)).await?;
    Ok(redirect(&entity::detail_path::<E>(id)))
}

pub async fn delete_page<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let record = store::find::<E>(&db, id, actor.id).await?;
    let title = format!("Delete {}", E::TITLE);
    page(&session, &actor, &title, &views::confirm_delete(&record)).await
}

pub async fn delete<E: Entity>(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    store::delete::<E>(&db, id, actor.id).await?;
    tracing::info!(entity = E::TABLE, id, actor = actor.id, "record deleted");
    flash::success(&session, format!("{} deleted successfully!", E::LABEL)).await?;
    Ok(redirect(&entity::list_path::<E>()))
}
