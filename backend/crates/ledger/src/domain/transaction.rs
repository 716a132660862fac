//! Transaction domain model

use chrono::NaiveDate;
use kernel::id::{CategoryId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single income or expense entry
///
/// `category` references [`Category::id`](super::category::Category) but is
/// not checked; a transaction may outlive its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: CategoryId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        category: CategoryId,
        date: NaiveDate,
        kind: TransactionType,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            description: description.into(),
            amount,
            category,
            date,
            kind,
        }
    }

    /// Amount with the sign implied by the type: income positive, expense negative
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount.abs(),
            TransactionType::Expense => -self.amount.abs(),
        }
    }
}
