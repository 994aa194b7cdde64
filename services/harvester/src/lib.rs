//! Street-level imagery harvester.
//!
//! Walks each configured region along its major axis and downloads one
//! image per heading at every sampled point:
//! - Regions and tuning come from a YAML file
//! - Requests go out one at a time through an adaptive pacer
//! - Per-request failures are logged and never abort a region

pub mod client;
pub mod config;
pub mod error;
pub mod harvest;
pub mod pacing;

pub use client::{ImageLookup, ImageRequest, ImageryClient, PanoMetadata, StreetViewClient};
pub use config::HarvestConfig;
pub use error::{FetchError, FetchResult, HarvestError};
pub use harvest::{Harvester, RegionReport, RequestOutcome};
pub use pacing::RequestPacer;
