//! `cardcraft` — render, encode, and share business cards from the terminal.
//!
//! # Usage
//!
//! ```text
//! cardcraft render jane.toml -o cards/
//! cardcraft qr jane.json --plain
//! cardcraft --url https://cards.example share jane.json
//! cardcraft stats V1StGXR8
//! ```

mod client;
mod input;

use std::{
  io::Write as _,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use cardcraft_vcard::{QrEncoding, SerializeOptions, qr_payload, serialize};
use clap::{Parser, Subcommand};
use client::ApiClient;
use input::{Output, load_record};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cardcraft", version, about = "Business cards as vCard 3.0")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the cardcraft server (default: http://localhost:8080).
  #[arg(long, env = "CARDCRAFT_URL", global = true)]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Write the vCard for a record file (JSON, or TOML by extension).
  Render {
    /// Record file, or `-` for JSON on stdin.
    file:     PathBuf,
    /// Leave out the PHOTO line.
    #[arg(long)]
    no_photo: bool,
    /// Escape `\`, `,`, `;` and newlines in text values.
    #[arg(long)]
    escape:   bool,
    /// Fold lines longer than 75 octets.
    #[arg(long)]
    fold:     bool,
    /// Output file or directory; `-` or omitted for stdout.
    #[arg(short, long, value_name = "OUT")]
    output:   Option<PathBuf>,
  },
  /// Print the QR-code payload for a record file.
  Qr {
    file:  PathBuf,
    /// Emit the vCard text instead of a data URL.
    #[arg(long)]
    plain: bool,
  },
  /// Store a record on the server and print its share link.
  Share {
    file:    PathBuf,
    /// Session id to file the card under.
    #[arg(long)]
    session: Option<String>,
  },
  /// Show engagement counts for a shared card.
  Stats { shortcode: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  match args.command {
    Command::Render { file, no_photo, escape, fold, output } => {
      let record = load_record(&file)?;
      let options = SerializeOptions {
        include_photo: !no_photo,
        escape_text:   escape,
        fold_lines:    fold,
      };
      let vcard = serialize(&record, &options);
      match Output::resolve(output.as_deref(), &record) {
        Output::Stdout => {
          std::io::stdout()
            .write_all(vcard.as_bytes())
            .context("writing to stdout")?;
        }
        Output::File(path) => {
          std::fs::write(&path, vcard).with_context(|| format!("writing {}", path.display()))?;
          eprintln!("wrote {}", path.display());
        }
      }
    }

    Command::Qr { file, plain } => {
      let record = load_record(&file)?;
      if !record.is_nameable() {
        bail!("record needs a first or last name");
      }
      let encoding = if plain { QrEncoding::PlainText } else { QrEncoding::DataUrl };
      println!("{}", qr_payload(&record, encoding));
    }

    Command::Share { file, session } => {
      let record = load_record(&file)?;
      let client = ApiClient::new(base_url(args.url, args.config.as_deref())?)?;
      let shared = client.share(&record, session.as_deref()).await?;
      eprintln!("{}", shared.note());
      println!("{}", shared.share_url);
    }

    Command::Stats { shortcode } => {
      let client = ApiClient::new(base_url(args.url, args.config.as_deref())?)?;
      let a = client.analytics(&shortcode).await?;

      let name = format!("{} {}", a.card.first_name, a.card.last_name);
      println!("{} ({})", name.trim(), a.card.shortcode);
      println!("  page views    {}", a.stats.page_views);
      println!("  saves         {}", a.stats.save_clicks);
      println!("  downloads     {}", a.stats.downloads);
      println!("  QR scans      {}", a.stats.qr_scans);
      println!("  conversion    {:.1}%", a.stats.conversion_rate);

      if !a.recent_events.is_empty() {
        println!();
        println!("recent activity:");
        for e in &a.recent_events {
          let at = e.created_at.with_timezone(&chrono::Local);
          println!("  {}  {:<10}  {}", at.format("%Y-%m-%d %H:%M"), e.kind.as_ref(), e.platform());
        }
      }
    }
  }

  Ok(())
}

/// CLI flag (or `CARDCRAFT_URL`) overrides the config file, which overrides
/// the default.
fn base_url(flag: Option<String>, config: Option<&Path>) -> Result<String> {
  let file_cfg: ConfigFile = if let Some(path) = config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  Ok(
    flag
      .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  )
}
