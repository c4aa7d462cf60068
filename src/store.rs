use libsql::{Value, params::Params};

use crate::database::{Db, now_timestamp};
use crate::entity::Entity;
use crate::error::AppError;

pub fn select_sql<E: Entity>() -> String {
    format!(
        "SELECT id, {}, {}, created_at, updated_at FROM {}",
        E::COLUMNS.join(", "),
        E::OWNER_COLUMN,
        E::TABLE
    )
}

async fn query_all<E: Entity>(db: &Db, sql: &str, params: Vec<Value>) -> Result<Vec<E>, AppError> {
    let conn = db.read().await;
    let mut rows = conn.query(sql, Params::Positional(params)).await?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        records.push(E::from_row(&row)?);
    }
    Ok(records)
}

/// Runs `SELECT ... [WHERE <filter>] ORDER BY <order> [LIMIT <limit>]`.
pub async fn select_where<E: Entity>(
    db: &Db,
    filter: Option<&str>,
    params: Vec<Value>,
    order_by: &str,
    limit: Option<u32>,
) -> Result<Vec<E>, AppError> {
    let mut sql = select_sql::<E>();
    if let Some(filter) = filter {
        sql.push_str(&format!(" WHERE {}", filter));
    }
    sql.push_str(&format!(" ORDER BY {}", order_by));
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    query_all(db, &sql, params).await
}

/// All rows visible to `actor_id`, in list order.
pub async fn list<E: Entity>(db: &Db, actor_id: i64) -> Result<Vec<E>, AppError> {
    if E::OWNER_SCOPED {
        let filter = format!("{} = ?", E::OWNER_COLUMN);
        select_where(
            db,
            Some(filter.as_str()),
            vec![Value::Integer(actor_id)],
            E::list_order_by(),
            None,
        )
        .await
    } else {
        select_where(db, None, Vec::new(), E::list_order_by(), None).await
    }
}

fn id_filter<E: Entity>(id: i64, actor_id: i64) -> (String, Vec<Value>) {
    if E::OWNER_SCOPED {
        (
            format!("id = ? AND {} = ?", E::OWNER_COLUMN),
            vec![Value::Integer(id), Value::Integer(actor_id)],
        )
    } else {
        ("id = ?".to_string(), vec![Value::Integer(id)])
    }
}

/// Fetches one row; owner-scoped entities only match the actor's rows.
pub async fn find<E: Entity>(db: &Db, id: i64, actor_id: i64) -> Result<E, AppError> {
    let (filter, params) = id_filter::<E>(id, actor_id);
    let sql = format!("{} WHERE {}", select_sql::<E>(), filter);
    query_all::<E>(db, &sql, params)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::not_found(E::TITLE, id))
}

/// Inserts a validated record owned by `actor_id` and returns its id.
pub async fn insert<E: Entity>(db: &Db, input: &E::Input, actor_id: i64) -> Result<i64, AppError> {
    let now = now_timestamp();
    let columns = E::COLUMNS.join(", ");
    let placeholders = vec!["?"; E::COLUMNS.len() + 3].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}, {}, created_at, updated_at) VALUES ({})",
        E::TABLE,
        columns,
        E::OWNER_COLUMN,
        placeholders
    );

    let mut params = E::bind(input);
    params.push(Value::Integer(actor_id));
    params.push(Value::Integer(now));
    params.push(Value::Integer(now));

    let conn = db.write().await;
    conn.execute(&sql, Params::Positional(params)).await?;
    Ok(conn.last_insert_rowid())
}

/// Replaces every editable column. The owner and creation time are kept.
pub async fn update<E: Entity>(
    db: &Db,
    id: i64,
    input: &E::Input,
    actor_id: i64,
) -> Result<(), AppError> {
    let assignments = E::COLUMNS
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(", ");
    let (filter, filter_params) = id_filter::<E>(id, actor_id);
    let sql = format!(
        "UPDATE {} SET {}, updated_at = ? WHERE {}",
        E::TABLE,
        assignments,
        filter
    );

    let mut params = E::bind(input);
    params.push(Value::Integer(now_timestamp()));
    params.extend(filter_params);

    let conn = db.write().await;
    let affected = conn.execute(&sql, Params::Positional(params)).await?;
    if affected == 0 {
        return Err(AppError::not_found(E::TITLE, id));
    }
    Ok(())
}

pub async fn delete<E: Entity>(db: &Db, id: i64, actor_id: i64) -> Result<(), AppError> {
    let (filter, params) = id_filter::<E>(id, actor_id);
    let sql = format!("DELETE FROM {} WHERE {}", E::TABLE, filter);

    let conn = db.write().await;
    let affected = conn.execute(&sql, Params::Positional(params)).await?;
    if affected == 0 {
        return Err(AppError::not_found(E::TITLE, id));
    }
    Ok(())
}
