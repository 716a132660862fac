//! Command dispatch

use anyhow::Result;
use serde::Serialize;
use session::application::RouteDecision;

use crate::{Commands, Manager};

pub mod data;
pub mod goals;
pub mod users;

pub async fn run(manager: &Manager, command: Commands) -> Result<()> {
    match command {
        Commands::SignUp { username, password } => {
            let uid = manager.sign_up(&username, &password).await?;
            println!("Account {username} created ({uid}), waiting for administrator approval");
        }
        Commands::SignIn {
            username,
            password,
            admin,
        } => {
            let identity = manager.sign_in(&username, &password, admin).await?;
            let role = if identity.is_admin { "administrator" } else { "user" };
            println!("Signed in as {} ({role})", identity.username);
        }
        Commands::SignOut => {
            let route = manager.sign_out().await?;
            println!("Signed out, continue at {route}");
        }
        Commands::Whoami => match manager.current_identity().await {
            Some(identity) => print_json(&identity)?,
            None => println!("Not signed in"),
        },
        Commands::Rename { username } => {
            let identity = manager.update_username(&username).await?;
            println!("Username changed to {}", identity.username);
        }
        Commands::Data { command } => data::run(manager, command).await?,
        Commands::Users { command } => users::run(manager, command).await?,
        Commands::Goals { command } => goals::run(manager, command).await?,
        Commands::Route { path } => match manager.check_route(&path).await {
            Some(RouteDecision::Allow) => println!("{path}: allowed"),
            Some(RouteDecision::Redirect(to)) => println!("{path}: redirect to {to}"),
            None => println!("{path}: unknown route"),
        },
    }
    Ok(())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
