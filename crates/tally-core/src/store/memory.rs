//! In-memory expense store
//!
//! Backs tests and the demo server. Enforces the same workflow transitions
//! the relational layer does: submit requires Draft, approve/reject require
//! Submitted. An invalid transition reports zero affected rows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;

use crate::error::Result;
use crate::model::{
    to_minor_units, Expense, ExpenseCategory, ExpenseStatus, ExpenseUpdate, NewExpense,
    StatusRecord, User,
};

use super::ExpenseStore;

#[derive(Default)]
struct Inner {
    expenses: HashMap<i64, Expense>,
    categories: Vec<ExpenseCategory>,
    users: Vec<User>,
    next_id: i64,
}

/// Thread-safe in-process implementation of [`ExpenseStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// A store pre-populated with demo users, categories, and one expense
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            inner.users = vec![
                User {
                    user_id: 1,
                    user_name: "Alice Hartley".to_string(),
                    email: "alice@example.com".to_string(),
                    role_name: "Employee".to_string(),
                    manager_id: Some(2),
                    is_active: true,
                },
                User {
                    user_id: 2,
                    user_name: "Ben Osei".to_string(),
                    email: "ben@example.com".to_string(),
                    role_name: "Manager".to_string(),
                    manager_id: None,
                    is_active: true,
                },
            ];
            inner.categories = vec![
                ExpenseCategory {
                    category_id: 1,
                    category_name: "Travel".to_string(),
                    is_active: true,
                },
                ExpenseCategory {
                    category_id: 2,
                    category_name: "Meals".to_string(),
                    is_active: true,
                },
                ExpenseCategory {
                    category_id: 3,
                    category_name: "Equipment".to_string(),
                    is_active: true,
                },
            ];
        }
        // One submitted expense so the assistant has something to show
        let demo = NewExpense {
            user_id: 1,
            category_id: 1,
            amount_minor: to_minor_units(25.40),
            currency: "GBP".to_string(),
            expense_date: NaiveDate::from_ymd_opt(2026, 8, 18).unwrap_or_default(),
            description: Some("Taxi from airport".to_string()),
            receipt_file: None,
        };
        {
            let mut inner = store.inner.write();
            let id = inner.next_id;
            inner.next_id += 1;
            let mut expense = Self::build_expense(&inner, id, demo);
            expense.status = ExpenseStatus::Submitted;
            expense.submitted_at = Some(Utc::now());
            inner.expenses.insert(id, expense);
        }
        store
    }

    fn build_expense(inner: &Inner, expense_id: i64, new: NewExpense) -> Expense {
        let user_name = inner
            .users
            .iter()
            .find(|u| u.user_id == new.user_id)
            .map(|u| u.user_name.clone())
            .unwrap_or_default();
        let category_name = inner
            .categories
            .iter()
            .find(|c| c.category_id == new.category_id)
            .map(|c| c.category_name.clone())
            .unwrap_or_default();
        Expense {
            expense_id,
            user_id: new.user_id,
            user_name,
            category_id: new.category_id,
            category_name,
            status: ExpenseStatus::Draft,
            amount_minor: new.amount_minor,
            currency: new.currency,
            expense_date: new.expense_date,
            description: new.description,
            receipt_file: new.receipt_file,
            submitted_at: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    fn sorted(mut expenses: Vec<Expense>) -> Vec<Expense> {
        expenses.sort_by_key(|e| e.expense_id);
        expenses
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Expense>> {
        let inner = self.inner.read();
        Ok(Self::sorted(inner.expenses.values().cloned().collect()))
    }

    async fn list_by_status(&self, status: ExpenseStatus) -> Result<Vec<Expense>> {
        let inner = self.inner.read();
        Ok(Self::sorted(
            inner
                .expenses
                .values()
                .filter(|e| e.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn get_by_id(&self, expense_id: i64) -> Result<Option<Expense>> {
        Ok(self.inner.read().expenses.get(&expense_id).cloned())
    }

    async fn create(&self, expense: NewExpense) -> Result<i64> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let row = Self::build_expense(&inner, id, expense);
        inner.expenses.insert(id, row);
        Ok(id)
    }

    async fn update(&self, expense_id: i64, update: ExpenseUpdate) -> Result<u64> {
        let mut inner = self.inner.write();
        let category_name = inner
            .categories
            .iter()
            .find(|c| c.category_id == update.category_id)
            .map(|c| c.category_name.clone())
            .unwrap_or_default();
        match inner.expenses.get_mut(&expense_id) {
            Some(expense) => {
                expense.category_id = update.category_id;
                expense.category_name = category_name;
                expense.amount_minor = update.amount_minor;
                expense.currency = update.currency;
                expense.expense_date = update.expense_date;
                expense.description = update.description;
                expense.receipt_file = update.receipt_file;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn submit(&self, expense_id: i64) -> Result<u64> {
        let mut inner = self.inner.write();
        match inner.expenses.get_mut(&expense_id) {
            Some(expense) if expense.status == ExpenseStatus::Draft => {
                expense.status = ExpenseStatus::Submitted;
                expense.submitted_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn approve(&self, expense_id: i64, reviewer_id: i64) -> Result<u64> {
        let mut inner = self.inner.write();
        match inner.expenses.get_mut(&expense_id) {
            Some(expense) if expense.status == ExpenseStatus::Submitted => {
                expense.status = ExpenseStatus::Approved;
                expense.reviewed_by = Some(reviewer_id);
                expense.reviewed_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn reject(&self, expense_id: i64, reviewer_id: i64) -> Result<u64> {
        let mut inner = self.inner.write();
        match inner.expenses.get_mut(&expense_id) {
            Some(expense) if expense.status == ExpenseStatus::Submitted => {
                expense.status = ExpenseStatus::Rejected;
                expense.reviewed_by = Some(reviewer_id);
                expense.reviewed_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete(&self, expense_id: i64) -> Result<u64> {
        let removed = self.inner.write().expenses.remove(&expense_id);
        Ok(if removed.is_some() { 1 } else { 0 })
    }

    async fn list_categories(&self) -> Result<Vec<ExpenseCategory>> {
        Ok(self.inner.read().categories.clone())
    }

    async fn list_statuses(&self) -> Result<Vec<StatusRecord>> {
        Ok(ExpenseStatus::ALL
            .iter()
            .map(|s| StatusRecord {
                status_id: s.status_id(),
                status_name: s.as_str().to_string(),
            })
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().users.clone())
    }
}
