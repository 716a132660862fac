//! Data commands - transactions and categories of the current identity

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Subcommand, ValueEnum};
use ledger::{Category, Transaction, TransactionType, UserData, UserDataPatch};
use rust_decimal::Decimal;

use super::print_json;
use crate::Manager;

#[derive(Clone, Copy, ValueEnum)]
pub enum Kind {
    Income,
    Expense,
}

impl From<Kind> for TransactionType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Income => Self::Income,
            Kind::Expense => Self::Expense,
        }
    }
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Print the data snapshot
    Show,
    /// Record an income or expense
    AddTransaction {
        description: String,
        amount: Decimal,
        /// Category name or id
        #[arg(long, short = 'c')]
        category: String,
        #[arg(long, value_enum, default_value = "expense")]
        kind: Kind,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Create a category
    AddCategory {
        name: String,
        #[arg(long, default_value = "#d4af37")]
        color: String,
    },
    /// Income, expense and balance
    Totals,
}

pub async fn run(manager: &Manager, command: DataCommands) -> Result<()> {
    match command {
        DataCommands::Show => print_json(&snapshot(manager).await?)?,
        DataCommands::AddTransaction {
            description,
            amount,
            category,
            kind,
            date,
        } => {
            let transaction = add_transaction(
                manager,
                description,
                amount,
                &category,
                kind.into(),
                date.unwrap_or_else(|| Local::now().date_naive()),
            )
            .await?;
            println!("Recorded {} {}", transaction.kind, transaction.amount);
        }
        DataCommands::AddCategory { name, color } => {
            let data = snapshot(manager).await?;
            if data.categories.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
                bail!("category {name} already exists");
            }

            let mut categories = data.categories;
            categories.push(Category::new(name.trim(), color));
            manager
                .update_user_data(UserDataPatch::categories(categories))
                .await?;
            println!("Category {name} created");
        }
        DataCommands::Totals => {
            let totals = snapshot(manager).await?.totals();
            println!("income:  {}", totals.income);
            println!("expense: {}", totals.expense);
            println!("balance: {}", totals.balance);
        }
    }
    Ok(())
}

/// Append a transaction to the snapshot, returning it once stored
async fn add_transaction(
    manager: &Manager,
    description: String,
    amount: Decimal,
    category: &str,
    kind: TransactionType,
    date: NaiveDate,
) -> Result<Transaction> {
    let data = snapshot(manager).await?;
    let Some(category) = data
        .categories
        .iter()
        .find(|c| c.id.as_str() == category || c.name.eq_ignore_ascii_case(category))
    else {
        bail!("unknown category {category}, create it with `data add-category`");
    };

    let transaction = Transaction::new(description, amount, category.id.clone(), date, kind);

    let mut transactions = data.transactions;
    transactions.push(transaction.clone());
    manager
        .update_user_data(UserDataPatch::transactions(transactions))
        .await?;
    Ok(transaction)
}

async fn snapshot(manager: &Manager) -> Result<UserData> {
    match manager.get_user_data().await {
        Some(data) => Ok(data),
        None => bail!("not signed in"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use platform::document::{Document, DocumentStore, MemoryDocumentStore};
    use platform::storage::MemoryKeyValueStore;
    use session::{
        DocumentRepository, MemoryIdentityProvider, MemoryProviderConfig, SessionConfig,
        SessionError, SessionManager,
    };

    fn build_manager(
        provider: &Arc<MemoryIdentityProvider>,
        store: &Arc<MemoryDocumentStore>,
        cache: &Arc<MemoryKeyValueStore>,
    ) -> Manager {
        SessionManager::init(
            provider.clone(),
            Arc::new(DocumentRepository::new(store.clone())),
            cache.clone(),
            SessionConfig::development(),
        )
        .unwrap()
    }

    async fn rent(manager: &Manager) -> Result<Transaction> {
        add_transaction(
            manager,
            "Rent".to_string(),
            Decimal::ONE,
            "home",
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn test_add_transaction_requires_known_category() {
        let provider = Arc::new(MemoryIdentityProvider::new(MemoryProviderConfig::fast()));
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryKeyValueStore::new());
        let manager = build_manager(&provider, &store, &cache);

        let err = rent(&manager).await.unwrap_err();
        assert!(err.to_string().contains("not signed in"));

        manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        let err = rent(&manager).await.unwrap_err();
        assert!(err.to_string().contains("unknown category"));

        manager
            .update_user_data(UserDataPatch::categories(vec![Category::new("Home", "#fff")]))
            .await
            .unwrap();
        let recorded = rent(&manager).await.unwrap();
        assert_eq!(
            manager.get_user_data().await.unwrap().transactions,
            vec![recorded]
        );
    }

    #[tokio::test]
    async fn test_failed_store_write_records_nothing() {
        let provider = Arc::new(MemoryIdentityProvider::new(MemoryProviderConfig::fast()));
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryKeyValueStore::new());
        let first = build_manager(&provider, &store, &cache);

        let uid = first.sign_up("alice", "pw1").await.unwrap();
        let mut fields = Document::new();
        fields.insert("isApproved".to_string(), true.into());
        store.update_record("users", uid.as_str(), fields).await.unwrap();
        first.sign_in("alice", "pw1", false).await.unwrap();
        first
            .update_user_data(UserDataPatch::categories(vec![Category::new("Home", "#fff")]))
            .await
            .unwrap();

        // Same cached session, but the remote snapshot is gone
        let bare = Arc::new(MemoryDocumentStore::new());
        let record = store.get_record("users", uid.as_str()).await.unwrap().unwrap();
        bare.set_record("users", uid.as_str(), record).await.unwrap();
        let second = build_manager(&provider, &bare, &cache);

        let err = rent(&second).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<SessionError>(), Some(SessionError::Store(_))));
        assert!(second.get_user_data().await.unwrap().transactions.is_empty());
    }
}
