//! The ranking computation job.
//!
//! Scores are written row by row with no transaction spanning the batch, and
//! the staging log is removed only after the last line. A run interrupted
//! part-way leaves its rows in place and the next run rescores every line,
//! so a crash duplicates score rows for the lines already processed.

use serde::Serialize;
use siterank_core::{
  ranking::WeightTable,
  response::Response,
  store::CatalogStore,
};
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{Engine, Error, Result};

/// Summary of one [`Engine::run_ranking_job`] run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
  pub run_id:         Uuid,
  /// Non-blank lines found in the staging log.
  pub pending:        usize,
  /// Lines that produced score rows.
  pub processed:      usize,
  /// Lines that were malformed or named a missing association.
  pub skipped:        usize,
  pub scores_written: usize,
}

impl JobReport {
  fn empty(run_id: Uuid) -> Self {
    Self { run_id, pending: 0, processed: 0, skipped: 0, scores_written: 0 }
  }

  pub fn message(&self) -> String {
    if self.pending == 0 {
      "no pending data".to_owned()
    } else {
      format!("{} processed", self.processed)
    }
  }
}

impl<S: CatalogStore> Engine<S> {
  /// Drain the staging log into score rows.
  ///
  /// Unresolvable and malformed lines are logged and skipped. Store failures
  /// and unusable ranking parameters abort the run, leaving the log in place.
  pub async fn run_ranking_job(&self) -> Result<JobReport> {
    let run_id = Uuid::new_v4();
    self
      .drain_staging(run_id)
      .instrument(tracing::info_span!("ranking_job", %run_id))
      .await
  }

  /// Non-raising variant of [`Engine::run_ranking_job`].
  pub async fn ranking_job_response(&self) -> Response<Option<JobReport>> {
    match self.run_ranking_job().await {
      Ok(report) => {
        let message = report.message();
        Response::success_with(Some(report), message)
      }
      Err(e) => {
        tracing::error!(error = %e, "ranking job failed");
        Response::error(None, e.to_string())
      }
    }
  }

  async fn drain_staging(&self, run_id: Uuid) -> Result<JobReport> {
    let lines = self.staging.read().await?;
    let mut report = JobReport::empty(run_id);

    if lines.is_empty() {
      tracing::info!("no pending data");
      return Ok(report);
    }
    report.pending = lines.len();

    let parameters = self.store.ranking_parameters().await.map_err(Error::store)?;
    let weights = WeightTable::from_parameters(parameters)?;

    for line in lines {
      let entry = match line {
        Ok(entry) => entry,
        Err(e) => {
          tracing::warn!(error = %e, "skipping staging line");
          report.skipped += 1;
          continue;
        }
      };

      let profile = self
        .store
        .association_profile(entry.association_id)
        .await
        .map_err(Error::store)?;
      let Some(profile) = profile else {
        tracing::warn!(
          association_id = entry.association_id,
          "association not found; not scored"
        );
        report.skipped += 1;
        continue;
      };

      for score in weights.score_entry(&entry, &profile, run_id) {
        tracing::debug!(
          association_id = score.association_id,
          parameter_id = score.parameter_id,
          value = score.value,
          "recording score"
        );
        self.store.record_score(score).await.map_err(Error::store)?;
        report.scores_written += 1;
      }
      report.processed += 1;
    }

    self.staging.clear().await?;
    tracing::info!(
      processed = report.processed,
      skipped = report.skipped,
      scores = report.scores_written,
      "ranking job finished"
    );
    Ok(report)
  }
}
