use libsql::{Row, Value};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::constants::*;
use crate::database::{get_i64, get_opt_i64, get_opt_text, get_text, opt_i64_value, opt_text_value, text_value};
use crate::entity::{Entity, FormField, RecordMeta, Widget, display_opt};
use crate::error::AppError;
use crate::validation::{
    FieldErrors, cents_to_money, format_date, money_to_cents, optional_date, optional_money,
    optional_text, parse_date, required_int, required_text,
};

/// A paid advertising slot.
#[derive(Debug, Clone)]
pub struct Commercial {
    pub meta: RecordMeta,
    pub title: String,
    pub advertiser: String,
    pub duration_seconds: i32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommercialForm {
    pub title: String,
    pub advertiser: String,
    pub duration_seconds: String,
    pub start_date: String,
    pub end_date: String,
    pub cost: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommercialInput {
    pub title: String,
    pub advertiser: String,
    pub duration_seconds: i32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

fn stored_date(raw: Option<String>) -> Result<Option<Date>, AppError> {
    raw.map(|raw| parse_date(&raw).ok_or_else(|| AppError::Corrupt(format!("bad date '{}'", raw))))
        .transpose()
}

fn display_date(date: Option<Date>) -> String {
    date.map(format_date).unwrap_or_else(|| "N/A".to_string())
}

fn display_cost(cost: Option<Decimal>) -> String {
    cost.map(|c| format!("${}", c)).unwrap_or_else(|| "N/A".to_string())
}

impl Entity for Commercial {
    type Form = CommercialForm;
    type Input = CommercialInput;

    const TABLE: &'static str = "commercials";
    const PATH: &'static str = "commercials";
    const TITLE: &'static str = "Commercial";
    const TITLE_PLURAL: &'static str = "Commercials";
    const LABEL: &'static str = "Commercial";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "advertiser",
        "duration_seconds",
        "start_date",
        "end_date",
        "cost_cents",
        "notes",
    ];
    const OWNER_COLUMN: &'static str = "created_by";
    const ORDER_BY: &'static str = "start_date ASC, advertiser ASC, id ASC";

    fn from_row(row: &Row) -> Result<Self, AppError> {
        let duration = get_i64(row, 3)?;
        let duration_seconds = i32::try_from(duration)
            .map_err(|_| AppError::Corrupt(format!("duration out of range: {}", duration)))?;

        Ok(Commercial {
            meta: RecordMeta::from_row(row, Self::COLUMNS.len())?,
            title: get_text(row, 1)?,
            advertiser: get_text(row, 2)?,
            duration_seconds,
            start_date: stored_date(get_opt_text(row, 4)?)?,
            end_date: stored_date(get_opt_text(row, 5)?)?,
            cost: get_opt_i64(row, 6)?.map(cents_to_money),
            notes: get_opt_text(row, 7)?,
        })
    }

    fn bind(input: &CommercialInput) -> Vec<Value> {
        vec![
            text_value(&input.title),
            text_value(&input.advertiser),
            Value::Integer(input.duration_seconds as i64),
            opt_text_value(input.start_date.map(format_date).as_deref()),
            opt_text_value(input.end_date.map(format_date).as_deref()),
            opt_i64_value(input.cost.map(money_to_cents)),
            opt_text_value(input.notes.as_deref()),
        ]
    }

    fn validate(form: &CommercialForm) -> Result<CommercialInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", &form.title, MAX_TITLE_LENGTH);
        let advertiser =
            required_text(&mut errors, "advertiser", &form.advertiser, MAX_ADVERTISER_LENGTH);
        let duration_seconds = required_int(&mut errors, "duration_seconds", &form.duration_seconds);
        let start_date = optional_date(&mut errors, "start_date", &form.start_date);
        let end_date = optional_date(&mut errors, "end_date", &form.end_date);
        let cost = optional_money(&mut errors, "cost", &form.cost);
        let notes = optional_text(&mut errors, "notes", &form.notes, None);

        errors.finish(|| {
            Some(CommercialInput {
                title: title?,
                advertiser: advertiser?,
                duration_seconds: duration_seconds?,
                start_date,
                end_date,
                cost,
                notes,
            })
        })
    }

    fn to_form(&self) -> CommercialForm {
        CommercialForm {
            title: self.title.clone(),
            advertiser: self.advertiser.clone(),
            duration_seconds: self.duration_seconds.to_string(),
            start_date: self.start_date.map(format_date).unwrap_or_default(),
            end_date: self.end_date.map(format_date).unwrap_or_default(),
            cost: self.cost.map(|c| c.to_string()).unwrap_or_default(),
            notes: self.notes.clone().unwrap_or_default(),
        }
    }

    fn form_fields(form: &CommercialForm) -> Vec<FormField> {
        vec![
            FormField::new("title", "Commercial Title", Widget::Text, &form.title),
            FormField::new("advertiser", "Advertiser", Widget::Text, &form.advertiser),
            FormField::new(
                "duration_seconds",
                "Duration (seconds)",
                Widget::Number { step: None },
                &form.duration_seconds,
            ),
            FormField::new("start_date", "Start Date (Optional)", Widget::Date, &form.start_date),
            FormField::new("end_date", "End Date (Optional)", Widget::Date, &form.end_date),
            FormField::new("cost", "Cost (Optional)", Widget::Number { step: Some("0.01") }, &form.cost),
            FormField::new("notes", "Notes (Optional)", Widget::TextArea { rows: 3 }, &form.notes),
        ]
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn summary(&self) -> String {
        format!("{} by {} ({}s)", self.title, self.advertiser, self.duration_seconds)
    }

    fn list_headers() -> &'static [&'static str] {
        &["Title", "Advertiser", "Duration", "Start Date", "End Date", "Cost"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.advertiser.clone(),
            format!("{}s", self.duration_seconds),
            display_date(self.start_date),
            display_date(self.end_date),
            display_cost(self.cost),
        ]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Advertiser", self.advertiser.clone()),
            ("Duration", format!("{} seconds", self.duration_seconds)),
            ("Start Date", display_date(self.start_date)),
            ("End Date", display_date(self.end_date)),
            ("Cost", display_cost(self.cost)),
            ("Notes", display_opt(&self.notes)),
        ]
    }
}
