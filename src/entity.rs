//! Entity descriptors.
//!
//! Every record type the station tracks implements [`Entity`]: where it is
//! stored, which columns the form writes, how it is ordered, whether rows
//! are private to their creator, and how it is validated and displayed.
//! The generic store and CRUD handlers are written once against this trait.

use libsql::{Row, Value};
use serde::de::DeserializeOwned;

use crate::database::{get_i64, get_opt_i64};
use crate::error::AppError;
use crate::validation::FieldErrors;

/// Columns every table shares, read after the entity's own columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    pub id: i64,
    pub owner: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RecordMeta {
    /// `columns` is the number of entity-specific columns between `id` and
    /// the owner column.
    pub fn from_row(row: &Row, columns: usize) -> Result<Self, AppError> {
        let base = columns as i32;
        Ok(RecordMeta {
            id: get_i64(row, 0)?,
            owner: get_opt_i64(row, base + 1)?,
            created_at: get_i64(row, base + 2)?,
            updated_at: get_i64(row, base + 3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Text,
    TextArea { rows: u32 },
    Date,
    DateTime,
    Number { step: Option<&'static str> },
    Select(Vec<(&'static str, &'static str)>),
    Checkbox,
    Password,
    Email,
}

/// One input on a rendered form, carrying the value to redisplay.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub value: String,
}

impl FormField {
    pub fn new(name: &'static str, label: &'static str, widget: Widget, value: &str) -> Self {
        FormField {
            name,
            label,
            widget,
            value: value.to_string(),
        }
    }
}

pub trait Entity: Sized + Send + Sync + 'static {
    /// Raw submission; every field is a string that defaults to empty.
    type Form: DeserializeOwned + Default + Send + Sync + 'static;
    /// Validated values ready to bind to `COLUMNS`.
    type Input: Send + Sync;

    const TABLE: &'static str;
    /// Path segment under the application prefix, e.g. `programmes`.
    const PATH: &'static str;
    const TITLE: &'static str;
    const TITLE_PLURAL: &'static str;
    /// Used in flash messages: "<LABEL> added successfully!".
    const LABEL: &'static str;
    /// Editable columns, in the order `bind` produces values.
    const COLUMNS: &'static [&'static str];
    const OWNER_COLUMN: &'static str;
    const ORDER_BY: &'static str;
    /// When set, rows are only visible to the account that created them.
    const OWNER_SCOPED: bool = false;

    fn list_order_by() -> &'static str {
        Self::ORDER_BY
    }

    fn from_row(row: &Row) -> Result<Self, AppError>;
    fn bind(input: &Self::Input) -> Vec<Value>;
    fn validate(form: &Self::Form) -> Result<Self::Input, FieldErrors>;
    fn to_form(&self) -> Self::Form;
    fn initial_form() -> Self::Form {
        Self::Form::default()
    }
    fn form_fields(form: &Self::Form) -> Vec<FormField>;

    fn meta(&self) -> &RecordMeta;
    fn summary(&self) -> String;
    fn list_headers() -> &'static [&'static str];
    fn list_cells(&self) -> Vec<String>;
    fn detail_rows(&self) -> Vec<(&'static str, String)>;

    fn id(&self) -> i64 {
        self.meta().id
    }
}

pub fn list_path<E: Entity>() -> String {
    format!("{}/{}/", crate::constants::APP_PREFIX, E::PATH)
}

pub fn create_path<E: Entity>() -> String {
    format!("{}/{}/add/", crate::constants::APP_PREFIX, E::PATH)
}

pub fn detail_path<E: Entity>(id: i64) -> String {
    format!("{}/{}/{}/", crate::constants::APP_PREFIX, E::PATH, id)
}

pub fn edit_path<E: Entity>(id: i64) -> String {
    format!("{}/{}/{}/edit/", crate::constants::APP_PREFIX, E::PATH, id)
}

pub fn delete_path<E: Entity>(id: i64) -> String {
    format!("{}/{}/{}/delete/", crate::constants::APP_PREFIX, E::PATH, id)
}

pub fn display_opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "N/A".to_string())
}
