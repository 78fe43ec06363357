//! Validated insertion of a website–product association.

use serde::Serialize;
use siterank_core::{
  catalog::{Association, NewAssociation, NewListing, UniqueToken, Website},
  ranking::StagingEntry,
  store::CatalogStore,
};

use crate::{Engine, Error, Result, token};

/// Why a recorded website did not get an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unassociated {
  ProductNotFound,
  KeywordMismatch,
}

/// The effect of a successful [`Engine::insert_association`] call.
///
/// A website row is written in both cases. Only an `Associated` outcome has
/// an association row and a staging entry behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Insertion {
  Associated {
    website:     Website,
    association: Association,
    staged:      StagingEntry,
  },
  Unassociated {
    website: Website,
    /// Generated but never persisted.
    token:   UniqueToken,
    reason:  Unassociated,
  },
}

impl Insertion {
  pub fn token(&self) -> &UniqueToken {
    match self {
      Insertion::Associated { association, .. } => &association.unique_token,
      Insertion::Unassociated { token, .. } => token,
    }
  }

  pub fn website(&self) -> &Website {
    match self {
      Insertion::Associated { website, .. } | Insertion::Unassociated { website, .. } => website,
    }
  }

  pub fn is_associated(&self) -> bool { matches!(self, Insertion::Associated { .. }) }
}

impl<S: CatalogStore> Engine<S> {
  /// Record `listing`'s website and, when its product exists and the
  /// submitted keywords equal the product's keywords as a case-insensitive
  /// set, an association plus one staging log line.
  ///
  /// A listing with a missing field is rejected before anything is written.
  pub async fn insert_association(&self, listing: NewListing) -> Result<Insertion> {
    listing.validate()?;

    let token = token::generate(&listing.url);
    let website = self
      .store
      .add_website(listing.url.clone())
      .await
      .map_err(Error::store)?;

    let product = self
      .store
      .find_product(listing.product.clone())
      .await
      .map_err(Error::store)?;

    let Some(product) = product else {
      tracing::info!(
        url = %listing.url,
        product = %listing.product,
        "product not found; website recorded without association"
      );
      return Ok(Insertion::Unassociated {
        website,
        token,
        reason: Unassociated::ProductNotFound,
      });
    };

    if !listing.matches_product(&product) {
      tracing::info!(
        url = %listing.url,
        product = %listing.product,
        "keywords do not match product; website recorded without association"
      );
      return Ok(Insertion::Unassociated {
        website,
        token,
        reason: Unassociated::KeywordMismatch,
      });
    }

    let association = self
      .store
      .add_association(NewAssociation {
        website_id:      website.website_id,
        product_id:      product.product_id,
        reference_count: listing.reference_count,
        unique_token:    token,
      })
      .await
      .map_err(Error::store)?;

    let staged = StagingEntry {
      association_id: association.association_id,
      seniority:      listing.seniority,
    };
    if let Err(e) = self.staging.append(&staged).await {
      tracing::error!(
        association_id = association.association_id,
        token = %association.unique_token,
        error = %e,
        "association recorded but not staged; it will not be scored"
      );
      return Err(e.into());
    }

    tracing::debug!(
      association_id = association.association_id,
      token = %association.unique_token,
      "association staged for ranking"
    );
    Ok(Insertion::Associated { website, association, staged })
  }
}
