//! `folio` — command-line admin client for the Folio contact API.
//!
//! # Usage
//!
//! ```
//! folio --url http://localhost:8787/make-server list
//! folio --config ~/.config/folio/config.toml set-status contact_1717_x2k9 replied
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, ContactForm};
use folio_core::submission::ContactSubmission;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Admin client for the Folio contact API")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the API including the route prefix
  /// (default: http://localhost:8787/make-server).
  #[arg(long, env = "FOLIO_URL")]
  url: Option<String>,

  /// Shared bearer token.
  #[arg(long, env = "FOLIO_TOKEN")]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every submission, newest first.
  List,
  /// Set the status of one submission.
  SetStatus {
    id:     String,
    status: String,
  },
  /// Send a contact form submission.
  Submit {
    #[arg(long)]
    name:    String,
    #[arg(long)]
    email:   String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
    #[arg(long)]
    phone:   Option<String>,
    #[arg(long)]
    company: Option<String>,
    /// low, medium or high.
    #[arg(long)]
    urgency: Option<String>,
  },
  /// Check that the API is up.
  Health,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
      .unwrap_or_else(|| "http://localhost:8787/make-server".to_string()),
    token:    args.token.unwrap_or(file_cfg.token),
  };
  tracing::debug!(base_url = %api_config.base_url, "using API");

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List => {
      let contacts = client.list_contacts().await?;
      for c in &contacts {
        println!("{}", format_row(c));
      }
      println!("{} submission(s)", contacts.len());
    }
    Command::SetStatus { id, status } => {
      let contact = client.update_status(&id, &status).await?;
      println!("{}", format_row(&contact));
    }
    Command::Submit { name, email, subject, message, phone, company, urgency } => {
      let form = ContactForm { name, email, subject, message, phone, company, urgency };
      let id = client.submit(&form).await?;
      println!("{id}");
    }
    Command::Health => {
      let health = client.health().await?;
      println!("{}", serde_json::to_string_pretty(&health)?);
    }
  }

  Ok(())
}

/// One line per submission: when, urgency, status, who, what, id.
fn format_row(c: &ContactSubmission) -> String {
  let company = if c.company.is_empty() {
    String::new()
  } else {
    format!(" ({})", c.company)
  };
  format!(
    "{}  {:<6}  {:<8}  {} <{}>{}  {}  [{}]",
    c.timestamp, c.urgency.as_str(), c.status, c.name, c.email, company, c.subject, c.id
  )
}
