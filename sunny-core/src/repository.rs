//! The coordinator between callers, the remote API and the place store.
//!
//! Network operations never fail in the caller's face: each call returns a
//! fresh [`Subscription`] that later yields exactly one [`Envelope`].

use std::{future::Future, sync::Arc};

use tracing::{debug, warn};

use crate::{
    api::{CaiyunClient, WeatherApi},
    channel::{self, Subscription},
    config::Config,
    error::{BranchOutcome, RepositoryError, StoreError, TransportError},
    model::{
        DailyForecast, DailyResponse, Location, Place, Query, RealtimeConditions,
        RealtimeResponse, STATUS_OK, Weather,
    },
    store::{FilePlaceStore, PlaceStore},
};

/// Settled outcome of one repository operation.
pub type Envelope<T> = Result<T, RepositoryError>;

pub type PlacesSubscription = Subscription<Envelope<Vec<Place>>>;
pub type WeatherSubscription = Subscription<Envelope<Weather>>;

#[derive(Debug, Clone)]
pub struct Repository {
    api: Arc<dyn WeatherApi>,
    store: Arc<dyn PlaceStore>,
}

impl Repository {
    pub fn new(api: Arc<dyn WeatherApi>, store: Arc<dyn PlaceStore>) -> Self {
        Self { api, store }
    }

    /// Builds the Caiyun client and the on-disk place store from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api = CaiyunClient::new(&config.api)?;
        let store = FilePlaceStore::new(config.place_store_path()?);

        Ok(Self::new(Arc::new(api), Arc::new(store)))
    }

    /// Must be called from within a tokio runtime.
    pub fn search_places(&self, query: &str) -> PlacesSubscription {
        let api = Arc::clone(&self.api);
        let query = query.to_owned();

        fire(Query::Search(query.clone()), async move { fetch_places(api.as_ref(), &query).await })
    }

    /// Fetches realtime conditions and the daily forecast concurrently.
    ///
    /// Must be called from within a tokio runtime.
    pub fn refresh_weather(&self, lng: &str, lat: &str) -> WeatherSubscription {
        let api = Arc::clone(&self.api);
        let location = Location::new(lng, lat);

        fire(Query::Coordinates(location.clone()), async move {
            fetch_weather(api.as_ref(), &location.lng, &location.lat).await
        })
    }

    pub fn save_place(&self, place: &Place) -> Result<(), StoreError> {
        self.store.save(place)
    }

    pub fn get_saved_place(&self) -> Result<Place, StoreError> {
        self.store.load()
    }

    pub fn is_place_saved(&self) -> bool {
        self.store.has()
    }
}

/// Runs `operation` in the background and publishes its envelope.
fn fire<T, F>(query: Query, operation: F) -> Subscription<Envelope<T>>
where
    T: Send + Sync + 'static,
    F: Future<Output = Envelope<T>> + Send + 'static,
{
    let (publisher, subscription) = channel::channel();

    tokio::spawn(async move {
        let envelope = operation.await;
        match &envelope {
            Ok(_) => debug!(%query, "query settled"),
            Err(err) => warn!(%query, error = %err, "query failed"),
        }
        publisher.publish(envelope);
    });

    subscription
}

async fn fetch_places(api: &dyn WeatherApi, query: &str) -> Envelope<Vec<Place>> {
    let response = api.search_places(query).await?;

    if response.status == STATUS_OK {
        Ok(response.places)
    } else {
        Err(RepositoryError::ServerStatus { status: response.status })
    }
}

async fn fetch_weather(api: &dyn WeatherApi, lng: &str, lat: &str) -> Envelope<Weather> {
    // Both requests are in flight before either is awaited, and neither
    // cancels the other.
    let (realtime, daily) = tokio::join!(api.fetch_realtime(lng, lat), api.fetch_daily(lng, lat));

    let (realtime, daily) = match (settle_realtime(realtime), settle_daily(daily)) {
        (Ok(realtime), Ok(daily)) => (realtime, daily),
        (realtime, daily) => {
            return Err(RepositoryError::Join {
                realtime: realtime.err().unwrap_or_else(ok_outcome),
                daily: daily.err().unwrap_or_else(ok_outcome),
            });
        }
    };

    if !daily.is_aligned() {
        return Err(RepositoryError::MisalignedForecast {
            sky_days: daily.skycon.len(),
            temperature_days: daily.temperature.len(),
        });
    }

    Ok(Weather { realtime, daily })
}

fn settle_realtime(
    response: Result<RealtimeResponse, TransportError>,
) -> Result<RealtimeConditions, BranchOutcome> {
    let response = response.map_err(BranchOutcome::Failed)?;
    if response.status != STATUS_OK {
        return Err(BranchOutcome::Status(response.status));
    }
    response.result.map(|r| r.realtime).ok_or(BranchOutcome::MissingResult)
}

fn settle_daily(
    response: Result<DailyResponse, TransportError>,
) -> Result<DailyForecast, BranchOutcome> {
    let response = response.map_err(BranchOutcome::Failed)?;
    if response.status != STATUS_OK {
        return Err(BranchOutcome::Status(response.status));
    }
    response.result.map(|r| r.daily).ok_or(BranchOutcome::MissingResult)
}

fn ok_outcome() -> BranchOutcome {
    BranchOutcome::Status(STATUS_OK.to_string())
}
