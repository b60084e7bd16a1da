//! Core library for the `sunny` weather client.
//!
//! This crate defines:
//! - The repository that turns remote calls into single-shot result streams
//! - The remote API abstraction and its Caiyun implementation
//! - Selected-place storage and configuration handling
//! - Shared domain models (places, realtime conditions, daily forecasts)
//!
//! It is used by `sunny-cli`, but any other front end can drive it the same way.

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod sky;
pub mod store;

pub use api::{CaiyunClient, WeatherApi};
pub use channel::{LatestReceiver, LatestSlot, Subscription};
pub use config::{ApiConfig, Config};
pub use error::{BranchOutcome, RepositoryError, StoreError, TransportError};
pub use model::{DailyForecast, Location, Place, Query, RealtimeConditions, Weather};
pub use repository::{Envelope, Repository};
pub use sky::Sky;
pub use store::{FilePlaceStore, MemoryPlaceStore, PlaceStore};
