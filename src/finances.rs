use libsql::{Row, Value};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::database::{get_i64, get_opt_text, get_text, opt_text_value, text_value};
use crate::entity::{Entity, FormField, RecordMeta, Widget, display_opt};
use crate::error::AppError;
use crate::validation::{
    Choice, FieldErrors, cents_to_money, format_date, money_to_cents, optional_text, parse_date,
    required_choice, required_date, required_money,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl Choice for TransactionKind {
    const CHOICES: &'static [Self] = &[TransactionKind::Income, TransactionKind::Expense];

    fn value(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Donations,
    Grants,
    Sponsorships,
    EventRevenue,
    OtherIncome,
    Salaries,
    Utilities,
    RentFacilities,
    ProgramCosts,
    Marketing,
    Equipment,
    AdminCosts,
    OtherExpense,
}

impl Category {
    pub const INCOME: &'static [Category] = &[
        Category::Donations,
        Category::Grants,
        Category::Sponsorships,
        Category::EventRevenue,
        Category::OtherIncome,
    ];

    pub const EXPENSE: &'static [Category] = &[
        Category::Salaries,
        Category::Utilities,
        Category::RentFacilities,
        Category::ProgramCosts,
        Category::Marketing,
        Category::Equipment,
        Category::AdminCosts,
        Category::OtherExpense,
    ];

    /// The kind of transaction this category is listed under.
    pub fn kind(self) -> TransactionKind {
        if Self::INCOME.contains(&self) {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }
}

impl Choice for Category {
    const CHOICES: &'static [Self] = &[
        Category::Donations,
        Category::Grants,
        Category::Sponsorships,
        Category::EventRevenue,
        Category::OtherIncome,
        Category::Salaries,
        Category::Utilities,
        Category::RentFacilities,
        Category::ProgramCosts,
        Category::Marketing,
        Category::Equipment,
        Category::AdminCosts,
        Category::OtherExpense,
    ];

    fn value(self) -> &'static str {
        match self {
            Category::Donations => "donations",
            Category::Grants => "grants",
            Category::Sponsorships => "sponsorships",
            Category::EventRevenue => "event_revenue",
            Category::OtherIncome => "other_income",
            Category::Salaries => "salaries",
            Category::Utilities => "utilities",
            Category::RentFacilities => "rent_facilities",
            Category::ProgramCosts => "program_costs",
            Category::Marketing => "marketing",
            Category::Equipment => "equipment",
            Category::AdminCosts => "admin_costs",
            Category::OtherExpense => "other_expense",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Donations => "Donations",
            Category::Grants => "Grants",
            Category::Sponsorships => "Sponsorships",
            Category::EventRevenue => "Event Revenue",
            Category::OtherIncome => "Other Income",
            Category::Salaries => "Salaries",
            Category::Utilities => "Utilities",
            Category::RentFacilities => "Rent/Facilities",
            Category::ProgramCosts => "Program Costs",
            Category::Marketing => "Marketing",
            Category::Equipment => "Equipment",
            Category::AdminCosts => "Administrative Costs",
            Category::OtherExpense => "Other Expense",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FinancialTransaction {
    pub meta: RecordMeta,
    pub date: Date,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub amount: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub date: Date,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: Decimal,
    pub description: Option<String>,
}

fn stored_choice<C: Choice>(raw: String) -> Result<C, AppError> {
    C::from_value(&raw).ok_or_else(|| AppError::Corrupt(format!("unknown choice '{}'", raw)))
}

impl Entity for FinancialTransaction {
    type Form = TransactionForm;
    type Input = TransactionInput;

    const TABLE: &'static str = "financial_transactions";
    const PATH: &'static str = "finances";
    const TITLE: &'static str = "Financial Transaction";
    const TITLE_PLURAL: &'static str = "Financial Transactions";
    const LABEL: &'static str = "Financial transaction";
    const COLUMNS: &'static [&'static str] =
        &["date", "type", "category", "amount_cents", "description"];
    const OWNER_COLUMN: &'static str = "recorded_by";
    const ORDER_BY: &'static str = "date DESC, created_at DESC, id DESC";

    fn from_row(row: &Row) -> Result<Self, AppError> {
        let raw_date = get_text(row, 1)?;
        let date = parse_date(&raw_date)
            .ok_or_else(|| AppError::Corrupt(format!("bad date '{}'", raw_date)))?;

        Ok(FinancialTransaction {
            meta: RecordMeta::from_row(row, Self::COLUMNS.len())?,
            date,
            kind: stored_choice(get_text(row, 2)?)?,
            category: stored_choice(get_text(row, 3)?)?,
            amount: cents_to_money(get_i64(row, 4)?),
            description: get_opt_text(row, 5)?,
        })
    }

    fn bind(input: &TransactionInput) -> Vec<Value> {
        vec![
            text_value(&format_date(input.date)),
            text_value(input.kind.value()),
            text_value(input.category.value()),
            Value::Integer(money_to_cents(input.amount)),
            opt_text_value(input.description.as_deref()),
        ]
    }

    // The category is checked against every category, not the ones
    // listed under the submitted type.
    fn validate(form: &TransactionForm) -> Result<TransactionInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let date = required_date(&mut errors, "date", &form.date);
        let kind = required_choice::<TransactionKind>(&mut errors, "type", &form.kind);
        let category = required_choice::<Category>(&mut errors, "category", &form.category);
        let amount = required_money(&mut errors, "amount", &form.amount);
        let description = optional_text(&mut errors, "description", &form.description, None);

        errors.finish(|| {
            Some(TransactionInput {
                date: date?,
                kind: kind?,
                category: category?,
                amount: amount?,
                description,
            })
        })
    }

    fn to_form(&self) -> TransactionForm {
        TransactionForm {
            date: format_date(self.date),
            kind: self.kind.value().to_string(),
            category: self.category.value().to_string(),
            amount: self.amount.to_string(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    fn form_fields(form: &TransactionForm) -> Vec<FormField> {
        let mut kinds = vec![("", "---------")];
        kinds.extend(TransactionKind::options());
        let mut categories = vec![("", "---------")];
        categories.extend(Category::options());

        vec![
            FormField::new("date", "Date", Widget::Date, &form.date),
            FormField::new("type", "Transaction Type", Widget::Select(kinds), &form.kind),
            FormField::new("category", "Category", Widget::Select(categories), &form.category),
            FormField::new("amount", "Amount ($)", Widget::Number { step: Some("0.01") }, &form.amount),
            FormField::new(
                "description",
                "Description (Optional)",
                Widget::TextArea { rows: 3 },
                &form.description,
            ),
        ]
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn summary(&self) -> String {
        format!(
            "{} - {}: {} - ${}",
            format_date(self.date),
            self.kind.label(),
            self.category.value(),
            self.amount
        )
    }

    fn list_headers() -> &'static [&'static str] {
        &["Date", "Type", "Category", "Amount"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            self.kind.label().to_string(),
            self.category.label().to_string(),
            format!("${}", self.amount),
        ]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Date", format_date(self.date)),
            ("Type", self.kind.label().to_string()),
            ("Category", self.category.label().to_string()),
            ("Amount", format!("${}", self.amount)),
            ("Description", display_opt(&self.description)),
        ]
    }
}
