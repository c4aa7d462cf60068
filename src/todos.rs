use libsql::{Row, Value};
use serde::Deserialize;
use time::Date;

use crate::constants::MAX_TASK_LENGTH;
use crate::database::{get_i64, get_opt_text, get_text, opt_text_value, text_value};
use crate::entity::{Entity, FormField, RecordMeta, Widget, display_opt};
use crate::error::AppError;
use crate::validation::{
    Choice, FieldErrors, checkbox, format_date, optional_date, optional_text, parse_date,
    required_choice, required_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Choice for Priority {
    const CHOICES: &'static [Self] = &[Priority::Low, Priority::Medium, Priority::High];

    fn value(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

macro_rules! priority_rank {
    () => {
        "CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END"
    };
}

/// Sort key for `priority`, most urgent first.
///
/// Ranked on purpose: sorting the stored strings would put medium before
/// low before high.
pub const PRIORITY_RANK: &str = priority_rank!();

/// A personal task, visible only to the account that created it.
#[derive(Debug, Clone)]
pub struct TodoItem {
    pub meta: RecordMeta,
    pub task: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub priority: Priority,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoForm {
    pub task: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
    pub completed: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInput {
    pub task: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub priority: Priority,
    pub completed: bool,
}

impl Entity for TodoItem {
    type Form = TodoForm;
    type Input = TodoInput;

    const TABLE: &'static str = "todo_items";
    const PATH: &'static str = "todo";
    const TITLE: &'static str = "To-Do Item";
    const TITLE_PLURAL: &'static str = "To-Do Items";
    const LABEL: &'static str = "To-Do item";
    const COLUMNS: &'static [&'static str] =
        &["task", "description", "due_date", "priority", "completed"];
    const OWNER_COLUMN: &'static str = "created_by";
    const ORDER_BY: &'static str = concat!(
        "due_date IS NULL, due_date ASC, ",
        priority_rank!(),
        ", created_at DESC, id DESC"
    );
    const OWNER_SCOPED: bool = true;

    // open tasks first, then by due date and urgency
    fn list_order_by() -> &'static str {
        concat!(
            "completed ASC, due_date IS NULL, due_date ASC, ",
            priority_rank!(),
            ", id DESC"
        )
    }

    fn from_row(row: &Row) -> Result<Self, AppError> {
        let due_date = match get_opt_text(row, 3)? {
            Some(raw) => Some(
                parse_date(&raw).ok_or_else(|| AppError::Corrupt(format!("bad date '{}'", raw)))?,
            ),
            None => None,
        };
        let raw_priority = get_text(row, 4)?;
        let priority = Priority::from_value(&raw_priority)
            .ok_or_else(|| AppError::Corrupt(format!("unknown priority '{}'", raw_priority)))?;

        Ok(TodoItem {
            meta: RecordMeta::from_row(row, Self::COLUMNS.len())?,
            task: get_text(row, 1)?,
            description: get_opt_text(row, 2)?,
            due_date,
            priority,
            completed: get_i64(row, 5)? != 0,
        })
    }

    fn bind(input: &TodoInput) -> Vec<Value> {
        vec![
            text_value(&input.task),
            opt_text_value(input.description.as_deref()),
            opt_text_value(input.due_date.map(format_date).as_deref()),
            text_value(input.priority.value()),
            Value::Integer(input.completed as i64),
        ]
    }

    fn validate(form: &TodoForm) -> Result<TodoInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let task = required_text(&mut errors, "task", &form.task, MAX_TASK_LENGTH);
        let description = optional_text(&mut errors, "description", &form.description, None);
        let due_date = optional_date(&mut errors, "due_date", &form.due_date);
        let priority = required_choice::<Priority>(&mut errors, "priority", &form.priority);
        let completed = checkbox(&form.completed);

        errors.finish(|| {
            Some(TodoInput {
                task: task?,
                description,
                due_date,
                priority: priority?,
                completed,
            })
        })
    }

    fn to_form(&self) -> TodoForm {
        TodoForm {
            task: self.task.clone(),
            description: self.description.clone().unwrap_or_default(),
            due_date: self.due_date.map(format_date).unwrap_or_default(),
            priority: self.priority.value().to_string(),
            completed: if self.completed { "on".to_string() } else { String::new() },
        }
    }

    fn initial_form() -> TodoForm {
        TodoForm {
            priority: Priority::default().value().to_string(),
            ..TodoForm::default()
        }
    }

    fn form_fields(form: &TodoForm) -> Vec<FormField> {
        vec![
            FormField::new("task", "Task", Widget::Text, &form.task),
            FormField::new(
                "description",
                "Description (Optional)",
                Widget::TextArea { rows: 3 },
                &form.description,
            ),
            FormField::new("due_date", "Due Date (Optional)", Widget::Date, &form.due_date),
            FormField::new("priority", "Priority", Widget::Select(Priority::options()), &form.priority),
            FormField::new("completed", "Completed", Widget::Checkbox, &form.completed),
        ]
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn summary(&self) -> String {
        format!(
            "{} (Due: {}, Priority: {})",
            self.task,
            self.due_date.map(format_date).unwrap_or_else(|| "N/A".to_string()),
            self.priority.label()
        )
    }

    fn list_headers() -> &'static [&'static str] {
        &["Task", "Due Date", "Priority", "Status"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            self.task.clone(),
            self.due_date.map(format_date).unwrap_or_else(|| "N/A".to_string()),
            self.priority.label().to_string(),
            status_label(self.completed).to_string(),
        ]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Task", self.task.clone()),
            ("Description", display_opt(&self.description)),
            (
                "Due Date",
                self.due_date.map(format_date).unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Priority", self.priority.label().to_string()),
            ("Status", status_label(self.completed).to_string()),
        ]
    }
}

fn status_label(completed: bool) -> &'static str {
    if completed { "Completed" } else { "Pending" }
}
