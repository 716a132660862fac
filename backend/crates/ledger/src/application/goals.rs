//! Goals Use Case
//!
//! Savings goals live only in the local cache, as a JSON list under one key.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::GoalId;
use platform::storage::KeyValueStore;
use rust_decimal::Decimal;

use crate::domain::goal::{Goal, GoalUpdate, NewGoal};
use crate::error::{LedgerError, LedgerResult};

/// Goal tracking over a local cache entry
pub struct GoalsUseCase {
    cache: Arc<dyn KeyValueStore>,
    key: String,
}

impl GoalsUseCase {
    pub fn new(cache: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All goals in insertion order
    pub fn list(&self) -> LedgerResult<Vec<Goal>> {
        match self.cache.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn get(&self, id: &GoalId) -> LedgerResult<Goal> {
        self.list()?
            .into_iter()
            .find(|g| &g.id == id)
            .ok_or_else(|| LedgerError::GoalNotFound(id.clone()))
    }

    pub fn create(&self, input: NewGoal) -> LedgerResult<Goal> {
        let goal = Goal::create(input, Utc::now())?;
        let mut goals = self.list()?;
        goals.push(goal.clone());
        self.save(&goals)?;

        tracing::info!(goal_id = %goal.id, name = %goal.name, "Goal created");
        Ok(goal)
    }

    /// Add `amount` to the saved total; a negative amount withdraws
    pub fn contribute(&self, id: &GoalId, amount: Decimal) -> LedgerResult<Goal> {
        let goal = self.modify(id, |goal| goal.contribute(amount, Utc::now()))?;

        tracing::info!(
            goal_id = %goal.id,
            amount = %amount,
            reached = goal.is_reached(),
            "Goal contribution recorded"
        );
        Ok(goal)
    }

    pub fn update(&self, id: &GoalId, update: GoalUpdate) -> LedgerResult<Goal> {
        let goal = self.modify(id, |goal| goal.apply(update, Utc::now()))?;
        tracing::info!(goal_id = %goal.id, "Goal updated");
        Ok(goal)
    }

    pub fn remove(&self, id: &GoalId) -> LedgerResult<()> {
        let mut goals = self.list()?;
        let before = goals.len();
        goals.retain(|g| &g.id != id);
        if goals.len() == before {
            return Err(LedgerError::GoalNotFound(id.clone()));
        }
        self.save(&goals)?;

        tracing::info!(goal_id = %id, "Goal removed");
        Ok(())
    }

    /// Drop every goal stored under this key
    pub fn clear(&self) -> LedgerResult<()> {
        self.cache.remove(&self.key)?;
        Ok(())
    }

    fn modify<F>(&self, id: &GoalId, f: F) -> LedgerResult<Goal>
    where
        F: FnOnce(&mut Goal) -> LedgerResult<()>,
    {
        let mut goals = self.list()?;
        let goal = goals
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| LedgerError::GoalNotFound(id.clone()))?;
        f(goal)?;
        let updated = goal.clone();
        self.save(&goals)?;
        Ok(updated)
    }

    fn save(&self, goals: &[Goal]) -> LedgerResult<()> {
        let raw = serde_json::to_string(goals)?;
        self.cache.set(&self.key, &raw)?;
        Ok(())
    }
}
