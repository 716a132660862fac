//! User commands - account directory and approval

use anyhow::Result;
use clap::Subcommand;
use session::models::{Account, UserId};

use crate::Manager;

#[derive(Subcommand)]
pub enum UserCommands {
    /// List every account
    List,
    /// Accounts whose username contains a term
    Search { term: String },
    /// Account counts
    Stats,
    /// Allow an account to sign in
    Approve { uid: String },
    /// Revoke an account's approval
    Disapprove { uid: String },
}

pub async fn run(manager: &Manager, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List => print_accounts(&manager.get_all_users().await?),
        UserCommands::Search { term } => print_accounts(&manager.search_users(&term).await?),
        UserCommands::Stats => {
            let stats = manager.user_stats().await?;
            println!(
                "total: {}, approved: {}, pending: {}",
                stats.total, stats.approved, stats.pending
            );
        }
        UserCommands::Approve { uid } => {
            manager.approve_user(&UserId::new(uid.as_str())).await?;
            println!("Approved {uid}");
        }
        UserCommands::Disapprove { uid } => {
            manager.disapprove_user(&UserId::new(uid.as_str())).await?;
            println!("Disapproved {uid}");
        }
    }
    Ok(())
}

fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts");
        return;
    }
    for account in accounts {
        let status = match (account.record.is_admin, account.record.is_approved) {
            (true, _) => "admin",
            (false, true) => "approved",
            (false, false) => "pending",
        };
        println!(
            "{:<38} {:<24} {:<9} {}",
            account.uid,
            account.record.username,
            status,
            account.record.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}
