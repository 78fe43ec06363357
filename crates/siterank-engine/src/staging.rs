//! The staging log: a newline-delimited file of associations awaiting
//! scoring.
//!
//! Each line is `"<association_id> <seniority>"`. Lines are appended one per
//! successful insertion and the whole file is removed once the ranking job
//! has consumed it.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use siterank_core::ranking::StagingEntry;
use tokio::{fs, io::AsyncWriteExt as _};

#[derive(Debug, Clone)]
pub struct StagingLog {
  path: PathBuf,
}

impl StagingLog {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// Append one entry, creating the file if needed.
  pub async fn append(&self, entry: &StagingEntry) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .await?;
    file.write_all(entry.to_line().as_bytes()).await?;
    file.flush().await
  }

  /// Every non-blank line in file order, parsed. A missing file reads as
  /// empty. A line that is not valid UTF-8 surfaces as a malformed entry
  /// without affecting its neighbours.
  pub async fn read(&self) -> std::io::Result<Vec<siterank_core::Result<StagingEntry>>> {
    let contents = match fs::read(&self.path).await {
      Ok(contents) => contents,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e),
    };
    Ok(
      contents
        .split(|byte| *byte == b'\n')
        .filter_map(|line| match std::str::from_utf8(line) {
          Ok(text) if text.trim().is_empty() => None,
          Ok(text) => Some(text.trim_end_matches('\r').parse()),
          Err(_) => Some(Err(siterank_core::Error::MalformedStagingLine(
            String::from_utf8_lossy(line).into_owned(),
          ))),
        })
        .collect(),
    )
  }

  pub async fn exists(&self) -> std::io::Result<bool> { fs::try_exists(&self.path).await }

  /// Remove the log. Removing a missing log is not an error.
  pub async fn clear(&self) -> std::io::Result<()> {
    match fs::remove_file(&self.path).await {
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }
}
