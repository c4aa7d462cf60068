//! Server-rendered HTML pages.

use std::fmt::Write;

use crate::auth::Actor;
use crate::commercials::Commercial;
use crate::constants::*;
use crate::dashboard::Dashboard;
use crate::entity::{self, Entity, FormField, Widget};
use crate::finances::FinancialTransaction;
use crate::flash::Message;
use crate::programmes::Programme;
use crate::todos::TodoItem;
use crate::validation::FieldErrors;

const INPUT_CLASS: &str = "form-input rounded-md shadow-sm";
const SELECT_CLASS: &str = "form-select rounded-md shadow-sm";
const TEXTAREA_CLASS: &str = "form-textarea rounded-md shadow-sm";
const CHECKBOX_CLASS: &str = "form-checkbox h-5 w-5 text-purple-600 rounded-md";

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(actor: Option<&Actor>) -> String {
    match actor {
        Some(actor) => format!(
            r#"<nav><a href="{home}">GGFM</a> <a href="{dash}">Dashboard</a> <a href="{p}/programmes/">Programmes</a> <a href="{p}/finances/">Finances</a> <a href="{p}/todo/">To-Do</a> <a href="{p}/commercials/">Commercials</a> <span>{user}</span> <form method="post" action="{p}/logout/"><button type="submit">Logout</button></form></nav>"#,
            home = HOME_PATH,
            dash = DASHBOARD_PATH,
            p = APP_PREFIX,
            user = escape(&actor.username),
        ),
        None => format!(
            r#"<nav><a href="{home}">GGFM</a> <a href="{p}/login/">Login</a> <a href="{p}/register/">Register</a></nav>"#,
            home = HOME_PATH,
            p = APP_PREFIX,
        ),
    }
}

pub fn layout(title: &str, actor: Option<&Actor>, messages: &[Message], body: &str) -> String {
    let mut flashes = String::new();
    for message in messages {
        let _ = write!(
            flashes,
            r#"<div class="message {}">{}</div>"#,
            message.level.css_class(),
            escape(&message.text)
        );
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | GGFM</title></head>
<body>
{nav}
<main>
{flashes}
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(actor),
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(title, None, &[], &format!("<p>{}</p>", escape(message)))
}

pub fn home(actor: Option<&Actor>, messages: &[Message]) -> String {
    let body = match actor {
        Some(actor) => format!(
            r#"<p>Welcome, {}.</p><p><a href="{}">Go to the dashboard</a></p>"#,
            escape(&actor.username),
            DASHBOARD_PATH
        ),
        None => format!(
            r#"<p>Programme, finance, to-do and commercial records for the station.</p><p><a href="{p}/login/">Log in</a> or <a href="{p}/register/">register</a>.</p>"#,
            p = APP_PREFIX
        ),
    };
    layout("GGFM Records", actor, messages, &body)
}

fn render_field(field: &FormField, errors: &FieldErrors) -> String {
    let name = field.name;
    let value = escape(&field.value);
    let input = match &field.widget {
        Widget::Text => format!(
            r#"<input type="text" name="{name}" id="id_{name}" value="{value}" class="{INPUT_CLASS}">"#
        ),
        Widget::Email => format!(
            r#"<input type="email" name="{name}" id="id_{name}" value="{value}" class="{INPUT_CLASS}">"#
        ),
        Widget::Password => format!(
            r#"<input type="password" name="{name}" id="id_{name}" class="{INPUT_CLASS}">"#
        ),
        Widget::Date => format!(
            r#"<input type="date" name="{name}" id="id_{name}" value="{value}" class="{INPUT_CLASS}">"#
        ),
        Widget::DateTime => format!(
            r#"<input type="datetime-local" name="{name}" id="id_{name}" value="{value}" class="{INPUT_CLASS}">"#
        ),
        Widget::Number { step } => {
            let step = step.map(|s| format!(r#" step="{}""#, s)).unwrap_or_default();
            format!(
                r#"<input type="number" name="{name}" id="id_{name}" value="{value}"{step} class="{INPUT_CLASS}">"#
            )
        }
        Widget::TextArea { rows } => format!(
            r#"<textarea name="{name}" id="id_{name}" rows="{rows}" class="{TEXTAREA_CLASS}">{value}</textarea>"#
        ),
        Widget::Select(choices) => {
            let mut options = String::new();
            for (choice, label) in choices {
                let selected = if *choice == field.value { " selected" } else { "" };
                let _ = write!(
                    options,
                    r#"<option value="{}"{}>{}</option>"#,
                    escape(choice),
                    selected,
                    escape(label)
                );
            }
            format!(r#"<select name="{name}" id="id_{name}" class="{SELECT_CLASS}">{options}</select>"#)
        }
        Widget::Checkbox => {
            let checked = if crate::validation::checkbox(&field.value) { " checked" } else { "" };
            format!(
                r#"<input type="checkbox" name="{name}" id="id_{name}"{checked} class="{CHECKBOX_CLASS}">"#
            )
        }
    };

    let mut field_errors = String::new();
    for message in errors.for_field(name) {
        let _ = write!(field_errors, r#"<li>{}</li>"#, escape(message));
    }
    if !field_errors.is_empty() {
        field_errors = format!(r#"<ul class="errorlist">{}</ul>"#, field_errors);
    }

    format!(
        r#"<p><label for="id_{name}">{label}</label>{input}{field_errors}</p>"#,
        label = escape(field.label)
    )
}

/// A POST form with every field and its errors, plus an error summary
/// listing `field: message` pairs at the top.
pub fn form(action: &str, fields: &[FormField], errors: &FieldErrors, submit: &str) -> String {
    let mut summary = String::new();
    for error in errors.iter() {
        let _ = write!(
            summary,
            "<li>{}: {}</li>",
            escape(error.field),
            escape(&error.message)
        );
    }
    if !summary.is_empty() {
        summary = format!(r#"<ul class="errorlist nonfield">{}</ul>"#, summary);
    }

    let mut rendered = String::new();
    for field in fields {
        rendered.push_str(&render_field(field, errors));
    }
    format!(
        r#"{summary}<form method="post" action="{action}">{rendered}<button type="submit">{submit}</button></form>"#,
        action = escape(action),
        submit = escape(submit),
    )
}

fn table(headers: &[&str], rows: &[(String, Vec<String>)]) -> String {
    let mut out = String::from("<table><thead><tr>");
    for header in headers {
        let _ = write!(out, "<th>{}</th>", escape(header));
    }
    out.push_str("<th></th></tr></thead><tbody>");
    for (link, cells) in rows {
        out.push_str("<tr>");
        for cell in cells {
            let _ = write!(out, "<td>{}</td>", escape(cell));
        }
        let _ = write!(out, r#"<td><a href="{}">View</a></td></tr>"#, escape(link));
    }
    out.push_str("</tbody></table>");
    out
}

pub fn entity_list<E: Entity>(records: &[E]) -> String {
    let add = format!(
        r#"<p><a href="{}">Add New {}</a></p>"#,
        entity::create_path::<E>(),
        escape(E::TITLE)
    );
    if records.is_empty() {
        return format!(
            "{}<p>No {} found.</p>",
            add,
            escape(&E::TITLE_PLURAL.to_lowercase())
        );
    }
    let rows: Vec<(String, Vec<String>)> = records
        .iter()
        .map(|r| (entity::detail_path::<E>(r.id()), r.list_cells()))
        .collect();
    format!("{}{}", add, table(E::list_headers(), &rows))
}

pub fn entity_detail<E: Entity>(record: &E) -> String {
    let mut out = String::from("<dl>");
    for (label, value) in record.detail_rows() {
        let _ = write!(out, "<dt>{}</dt><dd>{}</dd>", escape(label), escape(&value));
    }
    let _ = write!(
        out,
        "<dt>Created</dt><dd>{}</dd><dt>Last Updated</dt><dd>{}</dd></dl>",
        format_timestamp(record.meta().created_at),
        format_timestamp(record.meta().updated_at)
    );
    let _ = write!(
        out,
        r#"<p><a href="{}">Edit</a> <a href="{}">Delete</a> <a href="{}">Back to list</a></p>"#,
        entity::edit_path::<E>(record.id()),
        entity::delete_path::<E>(record.id()),
        entity::list_path::<E>()
    );
    out
}

pub fn confirm_delete<E: Entity>(record: &E) -> String {
    format!(
        r#"<p>Are you sure you want to delete "{}"?</p><form method="post" action="{}"><button type="submit">Confirm Delete</button></form><p><a href="{}">Cancel</a></p>"#,
        escape(&record.summary()),
        entity::delete_path::<E>(record.id()),
        entity::detail_path::<E>(record.id())
    )
}

pub fn format_timestamp(timestamp: i64) -> String {
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|t| {
            t.format(time::macros::format_description!(
                "[year]-[month]-[day] [hour]:[minute]"
            ))
            .ok()
        })
        .unwrap_or_default()
}

fn summary_list<E: Entity>(heading: &str, records: &[E], empty: &str) -> String {
    let mut out = format!("<section><h2>{}</h2>", escape(heading));
    if records.is_empty() {
        let _ = write!(out, "<p>{}</p>", escape(empty));
    } else {
        out.push_str("<ul>");
        for record in records {
            let _ = write!(
                out,
                r#"<li><a href="{}">{}</a></li>"#,
                entity::detail_path::<E>(record.id()),
                escape(&record.summary())
            );
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
    out
}

pub fn dashboard(summary: &Dashboard) -> String {
    let mut out = format!(
        r#"<section><h2>Financial Summary</h2><dl><dt>Total Income</dt><dd>${}</dd><dt>Total Expense</dt><dd>${}</dd><dt>Net Balance</dt><dd>${}</dd></dl></section>"#,
        summary.total_income, summary.total_expense, summary.net_balance
    );
    out.push_str(&summary_list::<Programme>(
        "Upcoming Programmes",
        &summary.upcoming_programmes,
        "No upcoming programmes.",
    ));
    out.push_str(&summary_list::<FinancialTransaction>(
        "Recent Transactions",
        &summary.recent_transactions,
        "No transactions recorded.",
    ));
    out.push_str(&summary_list::<TodoItem>(
        "Your Open To-Do Items",
        &summary.open_todo_items,
        "Nothing left to do.",
    ));
    out.push_str(&summary_list::<Commercial>(
        "Active Commercials",
        &summary.active_commercials,
        "No active or upcoming commercials.",
    ));
    out
}
