//! # binder-catalog
//!
//! Resolves card names against an online card catalog.
//!
//! - [`CatalogClient`] is the lookup seam; [`HttpCatalogClient`] talks to the
//!   public API over blocking HTTP.
//! - [`CardCache`] stores resolved cards by name, in memory
//!   ([`MemoryCache`]) or in a JSON file ([`JsonFileCache`]).
//! - [`FetchPipeline`] walks a list of [`binder_extract::CardRecord`]s,
//!   serving cached names first and pacing the remaining requests.

pub mod cache;
pub mod client;
pub mod error;
pub mod model;
pub mod pipeline;

pub use cache::{CardCache, JsonFileCache, MemoryCache};
pub use client::{CatalogClient, ClientConfig, HttpCatalogClient, DEFAULT_BASE_URL};
pub use error::{CatalogError, CatalogResult};
pub use model::{
    CardFace, CardSet, CatalogCard, EnrichedCard, ImageUris, Printing, SetIndex, SetRef,
};
pub use pipeline::{FetchPipeline, FetchReport, FetchStatus, DEFAULT_DELAY};
