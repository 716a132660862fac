//! Goal commands - savings goals of the current identity

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use kernel::id::GoalId;
use ledger::{Goal, GoalUpdate, NewGoal};
use rust_decimal::Decimal;

use crate::Manager;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// List goals with progress
    List,
    /// Create a goal
    Create {
        name: String,
        target: Decimal,
        /// Deadline (YYYY-MM-DD)
        end_date: NaiveDate,
        /// Amount already saved
        #[arg(long, default_value = "0")]
        current: Decimal,
    },
    /// Add to (or, negative, take from) a goal's saved amount
    Contribute {
        id: String,
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
    },
    /// Edit a goal
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        target: Option<Decimal>,
        #[arg(long)]
        current: Option<Decimal>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// Delete a goal
    Remove { id: String },
}

pub async fn run(manager: &Manager, command: GoalCommands) -> Result<()> {
    let goals = manager.goals().await?;

    match command {
        GoalCommands::List => {
            let list = goals.list()?;
            if list.is_empty() {
                println!("No goals");
            }
            for goal in &list {
                print_goal(goal);
            }
        }
        GoalCommands::Create {
            name,
            target,
            end_date,
            current,
        } => {
            let goal = goals.create(NewGoal {
                name,
                target_amount: target,
                current_amount: current,
                end_date,
            })?;
            print_goal(&goal);
        }
        GoalCommands::Contribute { id, amount } => {
            print_goal(&goals.contribute(&GoalId::new(id), amount)?);
        }
        GoalCommands::Update {
            id,
            name,
            target,
            current,
            end_date,
        } => {
            let update = GoalUpdate {
                name,
                target_amount: target,
                current_amount: current,
                end_date,
            };
            print_goal(&goals.update(&GoalId::new(id), update)?);
        }
        GoalCommands::Remove { id } => {
            goals.remove(&GoalId::new(id.as_str()))?;
            println!("Removed {id}");
        }
    }
    Ok(())
}

fn print_goal(goal: &Goal) {
    let marker = if goal.is_reached() { "*" } else { " " };
    println!(
        "{marker} {:<38} {:<20} {} / {} ({}%) until {}",
        goal.id,
        goal.name,
        goal.current_amount,
        goal.target_amount,
        (goal.progress() * Decimal::ONE_HUNDRED).round_dp(0),
        goal.end_date
    );
}
