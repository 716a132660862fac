//! Savings goal domain model

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::GoalId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// A savings target with progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_amount: Decimal,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Goal creation input
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub end_date: NaiveDate,
}

/// Goal edit input; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub end_date: Option<NaiveDate>,
}

impl Goal {
    /// Validate input and build a new goal stamped with `now`
    pub fn create(input: NewGoal, now: DateTime<Utc>) -> LedgerResult<Self> {
        let goal = Self {
            id: GoalId::generate(),
            name: input.name.trim().to_string(),
            target_amount: input.target_amount,
            current_amount: input.current_amount,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
        };
        goal.validate()?;
        Ok(goal)
    }

    /// Apply an edit; the goal is left untouched if the result is invalid
    pub fn apply(&mut self, update: GoalUpdate, now: DateTime<Utc>) -> LedgerResult<()> {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name.trim().to_string();
        }
        if let Some(target) = update.target_amount {
            next.target_amount = target;
        }
        if let Some(current) = update.current_amount {
            next.current_amount = current;
        }
        if let Some(end_date) = update.end_date {
            next.end_date = end_date;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Add (or, with a negative amount, withdraw) savings
    pub fn contribute(&mut self, amount: Decimal, now: DateTime<Utc>) -> LedgerResult<()> {
        let current = self
            .current_amount
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidGoal("saved amount out of range".to_string()))?;
        if current.is_sign_negative() && !current.is_zero() {
            return Err(LedgerError::InvalidGoal(
                "withdrawal exceeds saved amount".to_string(),
            ));
        }
        self.current_amount = current;
        self.updated_at = now;
        Ok(())
    }

    /// Saved fraction of the target, capped at 1
    pub fn progress(&self) -> Decimal {
        if self.target_amount.is_zero() {
            return Decimal::ONE;
        }
        // Overflow only happens far above the cap
        self.current_amount
            .checked_div(self.target_amount)
            .map_or(Decimal::ONE, |ratio| ratio.min(Decimal::ONE))
    }

    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    fn validate(&self) -> LedgerResult<()> {
        if self.name.is_empty() {
            return Err(LedgerError::InvalidGoal("name is required".to_string()));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidGoal(
                "target amount must be positive".to_string(),
            ));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(LedgerError::InvalidGoal(
                "current amount cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
