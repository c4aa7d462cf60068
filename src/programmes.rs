use libsql::{Row, Value};
use serde::Deserialize;
use time::PrimitiveDateTime;

use crate::constants::*;
use crate::database::{get_opt_text, get_text, opt_text_value, text_value};
use crate::entity::{Entity, FormField, RecordMeta, Widget, display_opt};
use crate::error::AppError;
use crate::validation::{
    FieldErrors, format_datetime, optional_datetime, optional_text, parse_datetime,
    required_datetime, required_text,
};

/// A scheduled show or station event.
#[derive(Debug, Clone)]
pub struct Programme {
    pub meta: RecordMeta,
    pub title: String,
    pub description: Option<String>,
    pub start_time: PrimitiveDateTime,
    pub end_time: Option<PrimitiveDateTime>,
    pub location: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgrammeForm {
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammeInput {
    pub title: String,
    pub description: Option<String>,
    pub start_time: PrimitiveDateTime,
    pub end_time: Option<PrimitiveDateTime>,
    pub location: Option<String>,
    pub host: Option<String>,
}

fn stored_datetime(raw: String) -> Result<PrimitiveDateTime, AppError> {
    parse_datetime(&raw).ok_or_else(|| AppError::Corrupt(format!("bad datetime '{}'", raw)))
}

/// `datetime-local` inputs want `YYYY-MM-DDTHH:MM`.
fn input_datetime(value: PrimitiveDateTime) -> String {
    format_datetime(value)
        .get(..16)
        .map(|s| s.replacen(' ', "T", 1))
        .unwrap_or_default()
}

fn display_datetime(value: PrimitiveDateTime) -> String {
    format_datetime(value).get(..16).unwrap_or_default().to_string()
}

impl Entity for Programme {
    type Form = ProgrammeForm;
    type Input = ProgrammeInput;

    const TABLE: &'static str = "programmes";
    const PATH: &'static str = "programmes";
    const TITLE: &'static str = "Programme";
    const TITLE_PLURAL: &'static str = "Programmes";
    const LABEL: &'static str = "Programme";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "start_time",
        "end_time",
        "location",
        "host",
    ];
    const OWNER_COLUMN: &'static str = "created_by";
    const ORDER_BY: &'static str = "start_time ASC, id ASC";

    fn from_row(row: &Row) -> Result<Self, AppError> {
        Ok(Programme {
            meta: RecordMeta::from_row(row, Self::COLUMNS.len())?,
            title: get_text(row, 1)?,
            description: get_opt_text(row, 2)?,
            start_time: stored_datetime(get_text(row, 3)?)?,
            end_time: get_opt_text(row, 4)?.map(stored_datetime).transpose()?,
            location: get_opt_text(row, 5)?,
            host: get_opt_text(row, 6)?,
        })
    }

    fn bind(input: &ProgrammeInput) -> Vec<Value> {
        vec![
            text_value(&input.title),
            opt_text_value(input.description.as_deref()),
            text_value(&format_datetime(input.start_time)),
            opt_text_value(input.end_time.map(format_datetime).as_deref()),
            opt_text_value(input.location.as_deref()),
            opt_text_value(input.host.as_deref()),
        ]
    }

    fn validate(form: &ProgrammeForm) -> Result<ProgrammeInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", &form.title, MAX_TITLE_LENGTH);
        let description = optional_text(&mut errors, "description", &form.description, None);
        let start_time = required_datetime(&mut errors, "start_time", &form.start_time);
        let end_time = optional_datetime(&mut errors, "end_time", &form.end_time);
        let location = optional_text(&mut errors, "location", &form.location, Some(MAX_LOCATION_LENGTH));
        let host = optional_text(&mut errors, "host", &form.host, Some(MAX_HOST_LENGTH));

        errors.finish(|| {
            Some(ProgrammeInput {
                title: title?,
                description,
                start_time: start_time?,
                end_time,
                location,
                host,
            })
        })
    }

    fn to_form(&self) -> ProgrammeForm {
        ProgrammeForm {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            start_time: input_datetime(self.start_time),
            end_time: self.end_time.map(input_datetime).unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            host: self.host.clone().unwrap_or_default(),
        }
    }

    fn form_fields(form: &ProgrammeForm) -> Vec<FormField> {
        vec![
            FormField::new("title", "Programme Title", Widget::Text, &form.title),
            FormField::new("description", "Description", Widget::TextArea { rows: 3 }, &form.description),
            FormField::new("start_time", "Start Time", Widget::DateTime, &form.start_time),
            FormField::new("end_time", "End Time (Optional)", Widget::DateTime, &form.end_time),
            FormField::new("location", "Location (Optional)", Widget::Text, &form.location),
            FormField::new("host", "Host/Presenter (Optional)", Widget::Text, &form.host),
        ]
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn summary(&self) -> String {
        format!("{} ({})", self.title, display_datetime(self.start_time))
    }

    fn list_headers() -> &'static [&'static str] {
        &["Title", "Start Time", "End Time", "Location", "Host"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            display_datetime(self.start_time),
            self.end_time.map(display_datetime).unwrap_or_else(|| "N/A".to_string()),
            display_opt(&self.location),
            display_opt(&self.host),
        ]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Description", display_opt(&self.description)),
            ("Start Time", display_datetime(self.start_time)),
            (
                "End Time",
                self.end_time.map(display_datetime).unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Location", display_opt(&self.location)),
            ("Host/Presenter", display_opt(&self.host)),
        ]
    }
}
