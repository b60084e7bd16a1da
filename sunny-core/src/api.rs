use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::TransportError,
    model::{DailyResponse, PlaceResponse, RealtimeResponse},
};

pub mod caiyun;

pub use caiyun::CaiyunClient;

/// Remote endpoints the repository depends on.
///
/// Calls are independent and side-effect free; the repository may have
/// several in flight at once. Implementations do not retry.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn search_places(&self, query: &str) -> Result<PlaceResponse, TransportError>;

    async fn fetch_realtime(&self, lng: &str, lat: &str)
    -> Result<RealtimeResponse, TransportError>;

    async fn fetch_daily(&self, lng: &str, lat: &str) -> Result<DailyResponse, TransportError>;
}
