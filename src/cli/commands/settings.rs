use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::cli::open_database;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum SettingsCommands {
    #[command(about = "Show store settings (initializes defaults on first use)")]
    Show,
}

pub async fn handle(cmd: SettingsCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = open_database(config).await?;

    match cmd {
        SettingsCommands::Show => {
            let settings = db.settings().get().await?;
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                }
                OutputFormat::Text => {
                    println!("Store name:   {}", settings.store_name);
                    println!("Currency:     {}", settings.currency);
                    println!("Accent color: {}", settings.accent_color);
                    println!(
                        "WhatsApp:     {}",
                        settings.default_whatsapp.as_deref().unwrap_or("-")
                    );
                    println!("Updated:      {}", settings.updated_at.format("%Y-%m-%d %H:%M"));
                }
            }
        }
    }

    db.close().await;
    Ok(())
}
