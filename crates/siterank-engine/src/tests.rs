//! End-to-end tests: insert → rank → search against an in-memory store and a
//! temporary staging log.

use std::{io, sync::Arc};

use serde_json::json;
use siterank_core::{
  ValidationError,
  catalog::{
    Association, AssociationProfile, NewAssociation, NewListing, Product, Website,
  },
  dataset::{ReferenceDataset, ReferenceTable},
  ranking::{NewScore, RankingParameter, RankingScore, StagingEntry},
  response::Status,
  retrieval::RankedListing,
  store::CatalogStore,
};
use siterank_store_sqlite::{SqliteStore, Table};
use tempfile::TempDir;

use crate::{Engine, Error, Insertion, StagingLog, Unassociated};

struct Harness {
  engine: Engine<SqliteStore>,
  _dir:   TempDir,
}

fn reference_data() -> ReferenceDataset {
  let mut dataset = ReferenceDataset::default();
  dataset.insert("ranking_parameters", ReferenceTable {
    columns: "id, key, priority, grade".into(),
    data:    vec![
      vec![json!(1), json!("seniority"), json!(1), json!(3)],
      vec![json!(2), json!("ref"), json!(2), json!(2)],
      vec![json!(3), json!("keywords"), json!(3), json!(1)],
    ],
  });
  dataset.insert("products", ReferenceTable {
    columns: "name, keywords".into(),
    data:    vec![
      vec![json!("tv"), json!("tech,leisure time,")],
      vec![json!("guitar"), json!("music,leisure time,")],
      vec![json!("gadget"), json!("tech,")],
    ],
  });
  dataset
}

async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.bulk_load(&reference_data(), None).await.unwrap();
  let dir = tempfile::tempdir().unwrap();
  let staging = StagingLog::new(dir.path().join("to_be_inserted_into_ranking.txt"));
  Harness { engine: Engine::new(Arc::new(store), staging), _dir: dir }
}

fn tv_listing(url: &str, seniority: i64) -> NewListing {
  NewListing::new(url, "tv", [("a", "Tech"), ("b", "Leisure Time")], seniority)
}

async fn rows(h: &Harness, table: Table) -> usize {
  h.engine.store().count_rows(table).await.unwrap()
}

// ─── Insertion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn keyword_equality_is_set_based() {
  let h = harness().await;
  let listing = NewListing::new(
    "https://gadgets.example",
    "gadget",
    [("a", "Tech"), ("b", "tech"), ("c", "TECH")],
    10,
  );

  let insertion = h.engine.insert_association(listing).await.unwrap();

  assert!(insertion.is_associated());
  assert!(insertion.token().as_str().starts_with("https://gadgets.example/"));
  let raw = std::fs::read_to_string(h.engine.staging().path()).unwrap();
  assert_eq!(raw, "1 10\n");
}

#[tokio::test]
async fn mismatched_keywords_leave_only_a_website() {
  let h = harness().await;
  let listing =
    NewListing::new("https://tv.example", "tv", [("a", "tech")], 10).with_references(3);

  let insertion = h.engine.insert_association(listing).await.unwrap();

  assert!(matches!(insertion, Insertion::Unassociated {
    reason: Unassociated::KeywordMismatch,
    ..
  }));
  assert!(insertion.token().as_str().starts_with("https://tv.example/"));
  assert_eq!(rows(&h, Table::Websites).await, 1);
  assert_eq!(rows(&h, Table::Associations).await, 0);
  assert!(!h.engine.staging().exists().await.unwrap());

  let report = h.engine.run_ranking_job().await.unwrap();
  assert_eq!(report.message(), "no pending data");
  assert!(h.engine.search("tech").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_product_leaves_only_a_website() {
  let h = harness().await;
  let insertion = h
    .engine
    .insert_association(NewListing::new("https://x.example", "radio", [("a", "tech")], 1))
    .await
    .unwrap();

  assert!(matches!(insertion, Insertion::Unassociated {
    reason: Unassociated::ProductNotFound,
    ..
  }));
  assert_eq!(insertion.website().url, "https://x.example");
  assert_eq!(rows(&h, Table::Websites).await, 1);
  assert_eq!(rows(&h, Table::Associations).await, 0);
}

#[tokio::test]
async fn missing_fields_write_nothing() {
  let h = harness().await;
  let no_seniority = tv_listing("https://tv.example", 0);
  let no_keywords = NewListing::new("https://tv.example", "tv", Vec::<(&str, &str)>::new(), 5);

  assert!(matches!(
    h.engine.insert_association(no_seniority).await,
    Err(Error::Validation(ValidationError::MissingSeniority))
  ));
  assert!(matches!(
    h.engine.insert_association(no_keywords).await,
    Err(Error::Validation(ValidationError::MissingKeywords))
  ));
  assert_eq!(rows(&h, Table::Websites).await, 0);
  assert!(!h.engine.staging().exists().await.unwrap());
}

#[tokio::test]
async fn staging_failure_after_association_is_reported() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.bulk_load(&reference_data(), None).await.unwrap();
  let dir = tempfile::tempdir().unwrap();
  // A directory cannot be opened for appending.
  let engine = Engine::new(Arc::new(store), StagingLog::new(dir.path()));

  let result = engine.insert_association(tv_listing("https://tv.example", 10)).await;

  assert!(matches!(result, Err(Error::Staging(_))));
  assert_eq!(engine.store().count_rows(Table::Associations).await.unwrap(), 1);
}

// ─── Ranking job ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_job_is_idempotent() {
  let h = harness().await;

  for _ in 0..2 {
    let response = h.engine.ranking_job_response().await;
    assert_eq!(response.status, Status::Success);
    assert_eq!(response.message.as_deref(), Some("no pending data"));
  }
  assert_eq!(rows(&h, Table::RankingScores).await, 0);
}

#[tokio::test]
async fn one_insertion_yields_three_scores() {
  let h = harness().await;
  let insertion = h
    .engine
    .insert_association(tv_listing("https://tv.example", 10).with_references(4))
    .await
    .unwrap();
  let Insertion::Associated { association, .. } = insertion else {
    panic!("expected an association");
  };

  let report = h.engine.run_ranking_job().await.unwrap();
  assert_eq!(report.message(), "1 processed");
  assert_eq!(report.scores_written, 3);
  assert!(!h.engine.staging().exists().await.unwrap());

  let scores = h.engine.store().scores_for(association.association_id).await.unwrap();
  let summary: Vec<_> = scores.iter().map(|s| (s.parameter_id, s.value, s.grade)).collect();
  // seniority 10 * 3, ref 4 * 2, keywords 2 * 1
  assert_eq!(summary, [(1, 30.0, 3.0), (2, 8.0, 2.0), (3, 2.0, 1.0)]);
  assert!(scores.iter().all(|s| s.run_id == report.run_id));
}

#[tokio::test]
async fn unresolvable_and_malformed_lines_are_skipped() {
  let h = harness().await;
  h.engine
    .insert_association(tv_listing("https://tv.example", 10))
    .await
    .unwrap();
  h.engine
    .staging()
    .append(&StagingEntry { association_id: 999, seniority: 5 })
    .await
    .unwrap();
  {
    use std::io::Write as _;
    let mut file = std::fs::OpenOptions::new()
      .append(true)
      .open(h.engine.staging().path())
      .unwrap();
    writeln!(file, "not a staging line").unwrap();
  }

  let report = h.engine.run_ranking_job().await.unwrap();

  assert_eq!(report.pending, 3);
  assert_eq!(report.processed, 1);
  assert_eq!(report.skipped, 2);
  assert_eq!(rows(&h, Table::RankingScores).await, 3);
  assert!(!h.engine.staging().exists().await.unwrap());
}

#[tokio::test]
async fn undecodable_line_does_not_block_the_queue() {
  let h = harness().await;
  let insertion = h
    .engine
    .insert_association(tv_listing("https://tv.example", 10))
    .await
    .unwrap();
  let Insertion::Associated { association, .. } = insertion else {
    panic!("expected an association");
  };
  {
    use std::io::Write as _;
    let mut file = std::fs::OpenOptions::new()
      .append(true)
      .open(h.engine.staging().path())
      .unwrap();
    file.write_all(b"2 \xff\xfe\n").unwrap();
  }

  let report = h.engine.run_ranking_job().await.unwrap();

  assert_eq!(report.pending, 2);
  assert_eq!(report.processed, 1);
  assert_eq!(report.skipped, 1);
  let scores = h.engine.store().scores_for(association.association_id).await.unwrap();
  assert_eq!(scores.len(), 3);
  assert!(!h.engine.staging().exists().await.unwrap());

  let again = h.engine.run_ranking_job().await.unwrap();
  assert_eq!(again.message(), "no pending data");
}

#[tokio::test]
async fn empty_log_file_is_left_in_place() {
  let h = harness().await;
  std::fs::write(h.engine.staging().path(), "\n").unwrap();

  let report = h.engine.run_ranking_job().await.unwrap();

  assert_eq!(report.message(), "no pending data");
  assert!(h.engine.staging().exists().await.unwrap());
  assert_eq!(rows(&h, Table::RankingScores).await, 0);
}

#[tokio::test]
async fn restaged_lines_are_scored_again() {
  let h = harness().await;
  let insertion = h
    .engine
    .insert_association(tv_listing("https://tv.example", 10))
    .await
    .unwrap();
  let Insertion::Associated { staged, association, .. } = insertion else {
    panic!("expected an association");
  };
  let first = h.engine.run_ranking_job().await.unwrap();

  // What a crash before the log is cleared looks like to the next run.
  h.engine.staging().append(&staged).await.unwrap();
  let second = h.engine.run_ranking_job().await.unwrap();

  let scores = h.engine.store().scores_for(association.association_id).await.unwrap();
  assert_eq!(scores.len(), 6);
  assert_eq!(scores.iter().filter(|s| s.run_id == first.run_id).count(), 3);
  assert_eq!(scores.iter().filter(|s| s.run_id == second.run_id).count(), 3);
}

// ─── Retrieval ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_returns_top_three_best_first() {
  let h = harness().await;
  let mut tokens = Vec::new();
  for seniority in 1..=5 {
    let url = format!("https://tv{seniority}.example");
    let insertion = h
      .engine
      .insert_association(tv_listing(&url, seniority))
      .await
      .unwrap();
    tokens.push(insertion.token().clone());
  }
  h.engine.run_ranking_job().await.unwrap();

  let options = h.engine.search("leisure time").await.unwrap();

  assert_eq!(options.len(), 3);
  let urls: Vec<_> = options.iter().map(|o| o.product_page_url.as_str()).collect();
  assert_eq!(urls, ["https://tv5.example", "https://tv4.example", "https://tv3.example"]);
  assert_eq!(options[0].option_value, "option1");
  assert_eq!(options[0].unique_token, tokens[4]);
}

#[tokio::test]
async fn search_matches_whole_case_sensitive_tokens() {
  let h = harness().await;
  h.engine
    .insert_association(tv_listing("https://tv.example", 3))
    .await
    .unwrap();
  h.engine.run_ranking_job().await.unwrap();

  assert_eq!(h.engine.search("tech").await.unwrap().len(), 1);
  assert!(h.engine.search("Tech").await.unwrap().is_empty());
  assert!(h.engine.search("leisure").await.unwrap().is_empty());
  assert!(h.engine.search("").await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_search_response_says_no_data() {
  let h = harness().await;
  let response = h.engine.search_response("tech").await;
  assert_eq!(response.status, Status::Success);
  assert!(response.data.is_empty());
  assert_eq!(response.message.as_deref(), Some("No Data Found"));
}

// ─── Store failures ──────────────────────────────────────────────────────────

/// A backend whose every call fails.
struct Unavailable;

fn down() -> io::Error { io::Error::new(io::ErrorKind::ConnectionRefused, "store unavailable") }

impl CatalogStore for Unavailable {
  type Error = io::Error;

  async fn add_website(&self, _url: String) -> io::Result<Website> { Err(down()) }

  async fn add_association(&self, _input: NewAssociation) -> io::Result<Association> {
    Err(down())
  }

  async fn find_product(&self, _name: String) -> io::Result<Option<Product>> { Err(down()) }

  async fn association_profile(&self, _id: i64) -> io::Result<Option<AssociationProfile>> {
    Err(down())
  }

  async fn ranking_parameters(&self) -> io::Result<Vec<RankingParameter>> { Err(down()) }

  async fn record_score(&self, _input: NewScore) -> io::Result<RankingScore> { Err(down()) }

  async fn scores_for(&self, _id: i64) -> io::Result<Vec<RankingScore>> { Err(down()) }

  async fn ranked_listings(&self, _term: String) -> io::Result<Vec<RankedListing>> {
    Err(down())
  }
}

#[tokio::test]
async fn store_failures_become_error_responses() {
  let dir = tempfile::tempdir().unwrap();
  let staging = StagingLog::new(dir.path().join("pending.txt"));
  staging
    .append(&StagingEntry { association_id: 1, seniority: 10 })
    .await
    .unwrap();
  let engine = Engine::new(Arc::new(Unavailable), staging);

  let search = engine.search_response("tech").await;
  assert_eq!(search.status, Status::Error);
  assert!(search.data.is_empty());

  let job = engine.ranking_job_response().await;
  assert_eq!(job.status, Status::Error);
  assert!(job.data.is_none());
  // The log is only cleared by a run that completes.
  assert!(engine.staging().exists().await.unwrap());

  assert!(matches!(
    engine.insert_association(tv_listing("https://tv.example", 1)).await,
    Err(Error::Store(_))
  ));
}
