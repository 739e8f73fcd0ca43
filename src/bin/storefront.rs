use clap::Parser;
use storefront_api::cli::utils::output_error;
use storefront_api::cli::{Cli, OutputFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = storefront_api::cli::run(cli).await {
        match (output_format, std::env::var("CLI_VERBOSE").as_deref()) {
            (OutputFormat::Json, _) => output_error(&output_format, &e.to_string())?,
            (_, Ok("true")) | (_, Ok("1")) => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
