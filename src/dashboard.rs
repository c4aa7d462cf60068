//! Read-side summary shown after login.

use axum::{extract::State, response::Html};
use libsql::Value;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tower_sessions::Session;

use crate::auth::Actor;
use crate::commercials::Commercial;
use crate::constants::DASHBOARD_ITEMS;
use crate::database::{Db, get_i64};
use crate::entity::Entity;
use crate::error::AppError;
use crate::finances::{FinancialTransaction, TransactionKind};
use crate::flash;
use crate::programmes::Programme;
use crate::store::select_where;
use crate::todos::{PRIORITY_RANK, TodoItem};
use crate::validation::{Choice, cents_to_money, format_date, format_datetime};
use crate::views;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub upcoming_programmes: Vec<Programme>,
    pub recent_transactions: Vec<FinancialTransaction>,
    pub open_todo_items: Vec<TodoItem>,
    pub active_commercials: Vec<Commercial>,
}

pub async fn total_for(db: &Db, kind: TransactionKind) -> Result<Decimal, AppError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM financial_transactions WHERE type = ?",
            [kind.value()],
        )
        .await?;

    let cents = match rows.next().await? {
        Some(row) => get_i64(&row, 0)?,
        None => 0,
    };
    Ok(cents_to_money(cents))
}

/// Builds the dashboard for `actor_id` as of `now`.
///
/// Programmes count as upcoming from `now` on; commercials are listed while
/// their end date is today or later, so commercials without an end date
/// never appear here.
pub async fn summarize(db: &Db, actor_id: i64, now: OffsetDateTime) -> Result<Dashboard, AppError> {
    let total_income = total_for(db, TransactionKind::Income).await?;
    let total_expense = total_for(db, TransactionKind::Expense).await?;

    let now_utc = now.to_offset(time::UtcOffset::UTC);
    let now_text = format_datetime(time::PrimitiveDateTime::new(now_utc.date(), now_utc.time()));
    let today_text = format_date(now_utc.date());

    let upcoming_programmes = select_where::<Programme>(
        db,
        Some("start_time >= ?"),
        vec![Value::Text(now_text)],
        "start_time ASC, id ASC",
        Some(DASHBOARD_ITEMS),
    )
    .await?;

    let recent_transactions = select_where::<FinancialTransaction>(
        db,
        None,
        Vec::new(),
        FinancialTransaction::ORDER_BY,
        Some(DASHBOARD_ITEMS),
    )
    .await?;

    let todo_filter = format!("completed = 0 AND {} = ?", TodoItem::OWNER_COLUMN);
    let todo_order = format!("due_date IS NULL, due_date ASC, {}, id ASC", PRIORITY_RANK);
    let open_todo_items = select_where::<TodoItem>(
        db,
        Some(todo_filter.as_str()),
        vec![Value::Integer(actor_id)],
        &todo_order,
        Some(DASHBOARD_ITEMS),
    )
    .await?;

    let active_commercials = select_where::<Commercial>(
        db,
        Some("end_date >= ?"),
        vec![Value::Text(today_text)],
        "start_date ASC, id ASC",
        Some(DASHBOARD_ITEMS),
    )
    .await?;

    Ok(Dashboard {
        total_income,
        total_expense,
        net_balance: total_income - total_expense,
        upcoming_programmes,
        recent_transactions,
        open_todo_items,
        active_commercials,
    })
}

pub async fn dashboard(
    State(db): State<Db>,
    actor: Actor,
    session: Session,
) -> Result<Html<String>, AppError> {
    let summary = summarize(&db, actor.id, OffsetDateTime::now_utc()).await?;
    let messages = flash::take(&session).await?;
    Ok(Html(views::layout(
        "Dashboard",
        Some(&actor),
        &messages,
        &views::dashboard(&summary),
    )))
}
