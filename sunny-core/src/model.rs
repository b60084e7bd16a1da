use chrono::NaiveDate;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error as _, Unexpected},
};
use std::fmt;

/// Status sentinel the remote service reports on success.
pub const STATUS_OK: &str = "ok";

/// A place returned by the search endpoint, or restored from the place store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(rename = "formatted_address", alias = "address")]
    pub address: String,
    pub location: Location,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Coordinates are kept as the decimal strings the service hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "string_or_number")]
    pub lng: String,
    #[serde(deserialize_with = "string_or_number")]
    pub lat: String,
}

impl Location {
    pub fn new(lng: impl Into<String>, lat: impl Into<String>) -> Self {
        Self { lng: lng.into(), lat: lat.into() }
    }
}

/// The key a caller submits; it correlates a request with the result delivered later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Search(String),
    Coordinates(Location),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Search(text) => write!(f, "search {text:?}"),
            Query::Coordinates(loc) => write!(f, "{},{}", loc.lng, loc.lat),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceResponse {
    pub status: String,
    #[serde(default)]
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RealtimeResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<RealtimeResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RealtimeResult {
    pub realtime: RealtimeConditions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RealtimeConditions {
    /// Degrees Celsius.
    pub temperature: f64,
    #[serde(rename = "skycon")]
    pub sky_condition: String,
    pub air_quality: AirQuality,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirQuality {
    pub aqi: Aqi,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Aqi {
    pub chn: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<DailyResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyResult {
    pub daily: DailyForecast,
}

/// Multi-day forecast. `skycon[i]` and `temperature[i]` describe the same day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyForecast {
    pub skycon: Vec<DailySky>,
    pub temperature: Vec<TemperatureRange>,
    pub life_index: LifeIndex,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailySky {
    pub value: String,
    pub date: String,
}

impl DailySky {
    /// Calendar day of the entry, parsed from the leading `YYYY-MM-DD` of `date`.
    pub fn day(&self) -> Option<NaiveDate> {
        let prefix = self.date.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeIndex {
    pub cold_risk: Vec<LifeDescription>,
    pub dressing: Vec<LifeDescription>,
    pub ultraviolet: Vec<LifeDescription>,
    pub car_washing: Vec<LifeDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LifeDescription {
    pub desc: String,
}

/// Today's entry of every life-index category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayLifeIndex<'a> {
    pub cold_risk: &'a str,
    pub dressing: &'a str,
    pub ultraviolet: &'a str,
    pub car_washing: &'a str,
}

impl LifeIndex {
    /// Index 0 of each category, or `None` if any category is empty.
    pub fn today(&self) -> Option<TodayLifeIndex<'_>> {
        Some(TodayLifeIndex {
            cold_risk: &self.cold_risk.first()?.desc,
            dressing: &self.dressing.first()?.desc,
            ultraviolet: &self.ultraviolet.first()?.desc,
            car_washing: &self.car_washing.first()?.desc,
        })
    }
}

/// One row of the forecast with sky and temperature joined by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDay<'a> {
    pub sky: &'a DailySky,
    pub min: f64,
    pub max: f64,
}

impl DailyForecast {
    pub fn is_aligned(&self) -> bool {
        self.skycon.len() == self.temperature.len()
    }

    pub fn days(&self) -> impl Iterator<Item = ForecastDay<'_>> {
        self.skycon
            .iter()
            .zip(&self.temperature)
            .map(|(sky, temp)| ForecastDay { sky, min: temp.min, max: temp.max })
    }
}

/// Realtime conditions and daily forecast for one coordinate pair.
///
/// Only built once both halves came back with an `"ok"` status.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub realtime: RealtimeConditions,
    pub daily: DailyForecast,
}

/// The search endpoint sends coordinates as JSON numbers; the store writes strings.
/// Numbers keep the server's digits (`116.40` stays `"116.40"`).
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::invalid_type(unexpected(&other), &"a coordinate string or number")),
    }
}

fn unexpected(value: &serde_json::Value) -> Unexpected<'_> {
    match value {
        serde_json::Value::Null => Unexpected::Unit,
        serde_json::Value::Bool(b) => Unexpected::Bool(*b),
        serde_json::Value::Array(_) => Unexpected::Seq,
        _ => Unexpected::Map,
    }
}
