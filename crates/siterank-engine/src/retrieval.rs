//! Top-K search over ranked associations.

use siterank_core::{
  response::Response,
  retrieval::{SearchOption, TOP_K, select_top},
  store::CatalogStore,
};

use crate::{Engine, Error, Result};

impl<S: CatalogStore> Engine<S> {
  /// The best [`TOP_K`] associations whose product carries `term` as a
  /// keyword, best first. An empty term matches nothing.
  pub async fn search(&self, term: &str) -> Result<Vec<SearchOption>> {
    if term.is_empty() {
      return Ok(Vec::new());
    }
    let listings = self
      .store
      .ranked_listings(term.to_owned())
      .await
      .map_err(Error::store)?;
    Ok(select_top(listings, term, TOP_K))
  }

  /// Non-raising variant of [`Engine::search`]. An empty result is a success
  /// with the message `"No Data Found"`.
  pub async fn search_response(&self, term: &str) -> Response<Vec<SearchOption>> {
    match self.search(term).await {
      Ok(options) if options.is_empty() => Response::success_with(options, "No Data Found"),
      Ok(options) => Response::success(options),
      Err(e) => {
        tracing::error!(error = %e, term, "search failed");
        Response::error(Vec::new(), format!("server unavailable: {e}"))
      }
    }
  }
}
