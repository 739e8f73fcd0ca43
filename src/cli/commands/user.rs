use clap::Subcommand;
use serde_json::json;

use crate::cli::open_database;
use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{CreateUser, UserRole};
use crate::validation::Validate;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an account (use this to bootstrap the first admin)")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Plain-text password; stored as a bcrypt hash")]
        password: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, default_value = "admin", help = "admin or editor")]
        role: UserRole,
        #[arg(long, help = "Create the account disabled")]
        inactive: bool,
    },

    #[command(about = "List all accounts")]
    List,

    #[command(about = "Replace an account's password")]
    SetPassword {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "New plain-text password")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let users = db.users(config.security.bcrypt_cost);

    match cmd {
        UserCommands::Create { email, password, name, role, inactive } => {
            let input = CreateUser {
                email,
                name,
                password,
                role,
                is_active: if inactive { 0 } else { 1 },
            };
            input.validate()?;

            let user = users.create(input).await?;
            output_success(
                &output_format,
                &format!("Created {} user {}", user.role, user.email),
                Some(serde_json::to_value(&user)?),
            )?;
        }
        UserCommands::List => {
            let all = users.list_all().await?;
            if all.is_empty() {
                output_empty_collection(&output_format, "users", "No users found")?;
            } else {
                match output_format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&json!({ "users": all }))?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36} {:<30} {:<8} {:<7} {}", "ID", "EMAIL", "ROLE", "ACTIVE", "CREATED");
                        println!("{}", "-".repeat(100));
                        for user in &all {
                            println!(
                                "{:<36} {:<30} {:<8} {:<7} {}",
                                user.id,
                                user.email,
                                user.role,
                                if user.is_active { "yes" } else { "no" },
                                user.created_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                    }
                }
            }
        }
        UserCommands::SetPassword { email, password } => {
            if password.is_empty() {
                anyhow::bail!("Password must not be empty");
            }
            let user = users
                .get_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", email))?;
            users.set_password(user.id, &password).await?;
            output_success(&output_format, &format!("Password updated for {}", user.email), None)?;
        }
    }

    db.close().await;
    Ok(())
}
