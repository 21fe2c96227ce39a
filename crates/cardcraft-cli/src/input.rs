//! Reading contact records from disk and deciding where rendered cards go.

use std::{
  io::Read as _,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use cardcraft_core::record::ContactRecord;
use cardcraft_vcard::download_filename;

/// On-disk encodings of a [`ContactRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
  Json,
  Toml,
}

impl RecordFormat {
  /// `.toml` files are TOML; everything else, including stdin, is JSON.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("toml") => RecordFormat::Toml,
      _ => RecordFormat::Json,
    }
  }
}

pub fn parse_record(raw: &str, format: RecordFormat) -> Result<ContactRecord> {
  match format {
    RecordFormat::Json => serde_json::from_str(raw).context("parsing JSON record"),
    RecordFormat::Toml => toml::from_str(raw).context("parsing TOML record"),
  }
}

/// Load a record from `path`, or from stdin when `path` is `-`.
pub fn load_record(path: &Path) -> Result<ContactRecord> {
  let raw = if path == Path::new("-") {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("reading record from stdin")?;
    buf
  } else {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
  };
  parse_record(&raw, RecordFormat::from_path(path))
}

/// Where `render` writes its output.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
  Stdout,
  File(PathBuf),
}

impl Output {
  /// No `-o` or `-o -` means stdout; an existing directory gets the
  /// record's download file name inside it.
  pub fn resolve(output: Option<&Path>, record: &ContactRecord) -> Self {
    match output {
      None => Output::Stdout,
      Some(p) if p == Path::new("-") => Output::Stdout,
      Some(p) if p.is_dir() => Output::File(p.join(download_filename(record))),
      Some(p) => Output::File(p.to_path_buf()),
    }
  }
}
