//! Invoice entity, amount coercion and the invoice form schema

use crate::core::form::FormInput;
use crate::core::validation::validators::{
    date_format, in_list, max_minor_units, numeric, positive, required,
};
use crate::core::validation::{FieldErrors, FormSchema};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Form field names, as submitted by the invoice forms
pub mod fields {
    pub const ID: &str = "id";
    pub const CUSTOMER_ID: &str = "customerId";
    pub const AMOUNT: &str = "amount";
    pub const STATUS: &str = "status";
    pub const DATE: &str = "date";
}

pub const CUSTOMER_REQUIRED: &str = "Please select a customer";
pub const AMOUNT_NOT_A_NUMBER: &str = "Amount must be a number";
pub const AMOUNT_GREATER_THAN_ZERO: &str = "please enter amount greater than $0";
pub const AMOUNT_TOO_LARGE: &str = "Amount is too large";
pub const STATUS_REQUIRED: &str = "Please select between pending or paid";

/// Date format used for the `date` column and its JSON form
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Payment state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Pending,
}

impl InvoiceStatus {
    /// Literals accepted by the form
    pub const ALL: &'static [&'static str] = &["paid", "pending"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(InvoiceStatus::Paid),
            "pending" => Ok(InvoiceStatus::Pending),
            other => Err(format!("unknown invoice status '{}'", other)),
        }
    }
}

/// A stored invoice
///
/// `amount` is in minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Validated, typed invoice fields
///
/// This is all a create or update is allowed to write: `id` and `date` are
/// never taken from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub customer_id: String,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    /// Validate `input` against `schema` and convert it
    pub fn parse(schema: &FormSchema, input: &FormInput) -> Result<Self, FieldErrors> {
        schema.validate(input)?;

        let customer_id = input.get(fields::CUSTOMER_ID).unwrap_or_default().to_string();
        let amount_in_cents = coerce_amount(input.get(fields::AMOUNT)).and_then(to_minor_units);
        let status = input
            .get(fields::STATUS)
            .and_then(|s| s.parse::<InvoiceStatus>().ok());

        // The schema already rejected anything that fails here; this only
        // matters for a schema built without the invoice rules.
        let mut errors = FieldErrors::new();
        if customer_id.is_empty() {
            errors.push(fields::CUSTOMER_ID, CUSTOMER_REQUIRED);
        }
        let amount_in_cents = match amount_in_cents {
            Some(cents) if cents > 0 => cents,
            _ => {
                errors.push(fields::AMOUNT, AMOUNT_GREATER_THAN_ZERO);
                0
            }
        };
        let Some(status) = status else {
            errors.push(fields::STATUS, STATUS_REQUIRED);
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            customer_id,
            amount_in_cents,
            status,
        })
    }
}

/// A draft with its server-assigned creation date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl NewInvoice {
    pub fn from_draft(draft: InvoiceDraft, date: NaiveDate) -> Self {
        Self {
            customer_id: draft.customer_id,
            amount_in_cents: draft.amount_in_cents,
            status: draft.status,
            date,
        }
    }

    /// Materialize with a store-assigned id
    pub fn into_invoice(self, id: String) -> Invoice {
        Invoice {
            id,
            customer_id: self.customer_id,
            amount: self.amount_in_cents,
            status: self.status,
            date: self.date,
        }
    }
}

/// Coerce a submitted amount to a decimal
///
/// Missing or blank input coerces to zero. Surrounding whitespace is ignored
/// and scientific notation is accepted. Returns `None` for anything that is
/// not a number.
pub fn coerce_amount(raw: Option<&str>) -> Option<Decimal> {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Numeric text whose magnitude is beyond what a `Decimal` holds
///
/// Returns the approximate value so callers can tell a huge amount from a
/// huge negative one. Text that coerces normally, or is not plain decimal or
/// scientific notation, gives `None`.
pub fn out_of_range_amount(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if coerce_amount(Some(trimmed)).is_some()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.abs() >= 1.0)
}

/// Convert currency units to whole minor units, rounding half away from zero
///
/// Works on the exact decimal, so `19.995` becomes `2000`. Returns `None`
/// when the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Schema describing every invoice field
pub fn invoice_schema() -> FormSchema {
    FormSchema::new()
        .field(fields::ID, required("Invoice id is required"))
        .field(fields::CUSTOMER_ID, required(CUSTOMER_REQUIRED))
        .field(fields::AMOUNT, numeric(AMOUNT_NOT_A_NUMBER))
        .field(fields::AMOUNT, positive(AMOUNT_GREATER_THAN_ZERO))
        .field(fields::AMOUNT, max_minor_units(AMOUNT_TOO_LARGE))
        .field(fields::STATUS, in_list(InvoiceStatus::ALL, STATUS_REQUIRED))
        .field(fields::DATE, required("Invoice date is required"))
        .field(fields::DATE, date_format(DATE_FORMAT))
}

/// Fields a create form may submit
pub fn create_invoice_schema() -> FormSchema {
    invoice_schema().omit(&[fields::ID, fields::DATE])
}

/// Fields an edit form may submit
pub fn update_invoice_schema() -> FormSchema {
    invoice_schema().omit(&[fields::ID, fields::DATE])
}
