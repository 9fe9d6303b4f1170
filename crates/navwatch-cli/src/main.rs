//! navwatch: entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use navwatch::Extractor;
use navwatch_cli::config::Settings;
use navwatch_cli::{mail, pipeline};

#[derive(Parser)]
#[command(
    name = "navwatch",
    about = "Scrape the Vanguard LifeStrategy 100 NAV price and daily change",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the fund page, extract the figures and write the result file (default).
    Scrape {
        /// Smallest price accepted as the NAV (exclusive).
        /// Also reads from NAVWATCH_MIN_PRICE env var.
        #[arg(long)]
        min_price: Option<f64>,
    },

    /// Run the extractor over a saved HTML file and print the result as JSON.
    Extract {
        /// Path to the HTML file.
        file: PathBuf,

        /// Smallest price accepted as the NAV (exclusive).
        #[arg(long)]
        min_price: Option<f64>,
    },

    /// Send one test email using EMAIL_USER, EMAIL_PASSWORD and RECIPIENT_EMAIL.
    TestEmail,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Scrape { min_price: None }) {
        Commands::Scrape { min_price } => {
            let settings = Settings::resolve(min_price);
            if let Err(e) = pipeline::run(&settings).await {
                tracing::error!("Scraping failed: {e:#}");
                std::process::exit(1);
            }
        }

        Commands::Extract { file, min_price } => {
            let settings = Settings::resolve(min_price);
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let result = Extractor::new(settings.extract)?.extract(&html);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::TestEmail => {
            mail::load_env_file();
            println!("Testing SMTP connection...");

            let outcome = match mail::MailSettings::from_env() {
                Ok(settings) => mail::send_test_email(&settings)
                    .await
                    .map(|delivery| (delivery, settings.recipient)),
                Err(e) => Err(e),
            };

            match outcome {
                Ok((delivery, recipient)) => {
                    println!("Test email sent successfully!");
                    println!("Message ID: {}", delivery.message_id);
                    println!("Relay response: {}", delivery.response);
                    println!("Check your inbox at: {recipient}");
                }
                Err(e) => tracing::error!("Failed to send test email: {e}"),
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "navwatch", &mut std::io::stdout());
        }
    }

    Ok(())
}
