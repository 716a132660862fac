//! Per-user data snapshot
//!
//! The unit of synchronization between the local cache and the remote store.
//! Both fields are required on the wire; a document missing either one is
//! rejected rather than read as empty.

use kernel::id::CategoryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::transaction::{Transaction, TransactionType};

/// Transactions and categories owned by one identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
}

/// Partial update: present fields replace the snapshot's field wholesale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

/// Aggregates over a snapshot's transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl UserData {
    /// Apply a patch, last write wins per field
    pub fn merge(self, patch: UserDataPatch) -> Self {
        Self {
            transactions: patch.transactions.unwrap_or(self.transactions),
            categories: patch.categories.unwrap_or(self.categories),
        }
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for tx in &self.transactions {
            match tx.kind {
                TransactionType::Income => {
                    totals.income = totals.income.saturating_add(tx.amount.abs())
                }
                TransactionType::Expense => {
                    totals.expense = totals.expense.saturating_add(tx.amount.abs())
                }
            }
        }
        totals.balance = totals.income.saturating_sub(totals.expense);
        totals
    }
}

impl UserDataPatch {
    pub fn transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Some(transactions),
            categories: None,
        }
    }

    pub fn categories(categories: Vec<Category>) -> Self {
        Self {
            transactions: None,
            categories: Some(categories),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_none() && self.categories.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(amount: &str, kind: TransactionType) -> Transaction {
        Transaction::new(
            "entry",
            amount.parse().unwrap(),
            CategoryId::new("c"),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            kind,
        )
    }

    #[test]
    fn test_merge_replaces_only_present_fields() {
        let food = Category::new("Food", "#f00");
        let base = UserData {
            transactions: vec![tx("1", TransactionType::Income)],
            categories: vec![food.clone()],
        };

        let t2 = tx("2", TransactionType::Expense);
        let merged = base.merge(UserDataPatch::transactions(vec![t2.clone()]));

        assert_eq!(merged.transactions, vec![t2]);
        assert_eq!(merged.categories, vec![food]);
    }

    #[test]
    fn test_merge_with_empty_patch_is_identity() {
        let base = UserData {
            transactions: vec![tx("1", TransactionType::Income)],
            categories: vec![],
        };
        assert_eq!(base.clone().merge(UserDataPatch::default()), base);
        assert!(UserDataPatch::default().is_empty());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = serde_json::json!({ "transactions": [] });
        assert!(serde_json::from_value::<UserData>(json).is_err());

        let json = serde_json::json!({ "transactions": [], "categories": [] });
        assert_eq!(
            serde_json::from_value::<UserData>(json).unwrap(),
            UserData::default()
        );
    }

    #[test]
    fn test_patch_omits_absent_fields() {
        let json = serde_json::to_value(UserDataPatch::categories(vec![])).unwrap();
        assert_eq!(json, serde_json::json!({ "categories": [] }));
    }

    #[test]
    fn test_totals() {
        let data = UserData {
            transactions: vec![
                tx("100.00", TransactionType::Income),
                tx("30.25", TransactionType::Expense),
                tx("-9.75", TransactionType::Expense),
            ],
            categories: vec![],
        };

        let totals = data.totals();
        assert_eq!(totals.income, "100".parse().unwrap());
        assert_eq!(totals.expense, "40".parse().unwrap());
        assert_eq!(totals.balance, "60".parse().unwrap());
    }

    #[test]
    fn test_totals_saturate() {
        let mut big = tx("0", TransactionType::Income);
        big.amount = Decimal::MAX;
        let data = UserData {
            transactions: vec![big.clone(), big],
            categories: vec![],
        };

        let totals = data.totals();
        assert_eq!(totals.income, Decimal::MAX);
        assert_eq!(totals.balance, Decimal::MAX);
    }

    #[test]
    fn test_category_lookup() {
        let food = Category::new("Food", "#f00");
        let data = UserData {
            transactions: vec![],
            categories: vec![food.clone()],
        };
        assert_eq!(data.category(&food.id), Some(&food));
        assert_eq!(data.category(&CategoryId::new("nope")), None);
    }
}
