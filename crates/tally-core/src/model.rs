//! Domain model for the expense workflow
//!
//! Amounts are stored in minor currency units (pence) and only converted to
//! decimal major units at the boundaries that talk to people or the model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fixed currency scale: two decimal places, single supported currency (GBP).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Convert a decimal major-unit amount (e.g. 25.40) to minor units (2540).
pub fn to_minor_units(major: f64) -> i64 {
    (major * MINOR_UNITS_PER_MAJOR as f64).round() as i64
}

/// Convert a minor-unit amount (e.g. 2540) to decimal major units (25.40).
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR as f64
}

/// Workflow status of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ExpenseStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    /// All statuses, in workflow order
    pub const ALL: [ExpenseStatus; 4] = [
        ExpenseStatus::Draft,
        ExpenseStatus::Submitted,
        ExpenseStatus::Approved,
        ExpenseStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Draft => "Draft",
            ExpenseStatus::Submitted => "Submitted",
            ExpenseStatus::Approved => "Approved",
            ExpenseStatus::Rejected => "Rejected",
        }
    }

    /// Stable numeric id, matching the status lookup table
    pub fn status_id(&self) -> i64 {
        match self {
            ExpenseStatus::Draft => 1,
            ExpenseStatus::Submitted => 2,
            ExpenseStatus::Approved => 3,
            ExpenseStatus::Rejected => 4,
        }
    }
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ExpenseStatus::Draft),
            "submitted" => Ok(ExpenseStatus::Submitted),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// A single expense row, joined with its user/category/status names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub expense_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub status: ExpenseStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub receipt_file: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// The amount in decimal major units (e.g. 25.40 GBP)
    pub fn amount_major(&self) -> f64 {
        to_major_units(self.amount_minor)
    }
}

/// Fields for creating a new expense (enters the workflow as Draft)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub user_id: i64,
    pub category_id: i64,
    pub amount_minor: i64,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub receipt_file: Option<String>,
}

/// Fields for updating an existing expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub category_id: i64,
    pub amount_minor: i64,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub receipt_file: Option<String>,
}

/// An expense category lookup row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub category_id: i64,
    pub category_name: String,
    pub is_active: bool,
}

/// A status lookup row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status_id: i64,
    pub status_name: String,
}

/// A system user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub user_name: String,
    pub email: String,
    pub role_name: String,
    pub manager_id: Option<i64>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(to_minor_units(25.40), 2540);
        assert_eq!(to_minor_units(0.01), 1);
        assert_eq!(to_minor_units(100.0), 10_000);
        assert_eq!(to_major_units(2540), 25.40);
        assert_eq!(to_major_units(1), 0.01);
    }

    #[test]
    fn test_status_round_trip() {
        for status in ExpenseStatus::ALL {
            let parsed: ExpenseStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        // Parsing is case-insensitive
        assert_eq!("draft".parse::<ExpenseStatus>().unwrap(), ExpenseStatus::Draft);
        assert!("Pending".parse::<ExpenseStatus>().is_err());
    }

    #[test]
    fn test_status_ids_are_stable() {
        assert_eq!(ExpenseStatus::Draft.status_id(), 1);
        assert_eq!(ExpenseStatus::Rejected.status_id(), 4);
    }
}
