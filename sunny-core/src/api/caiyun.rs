use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::ApiConfig,
    error::TransportError,
    model::{DailyResponse, PlaceResponse, RealtimeResponse},
};

use super::WeatherApi;

const PLACE_SEARCH: &str = "place search";
const REALTIME: &str = "realtime";
const DAILY: &str = "daily";

/// Client for the Caiyun weather service.
#[derive(Debug, Clone)]
pub struct CaiyunClient {
    base_url: Url,
    token: String,
    lang: String,
    http: Client,
}

impl CaiyunClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let token = config.token()?.to_owned();
        let base_url = parse_base_url(&config.base_url)?;

        Ok(Self { base_url, token, lang: config.lang.clone(), http: Client::new() })
    }

    fn search_url(&self) -> Url {
        self.endpoint_url(&["v2", "place"])
    }

    fn weather_url(&self, endpoint: &'static str, lng: &str, lat: &str) -> Url {
        let coordinates = format!("{lng},{lat}");
        let file = format!("{endpoint}.json");
        self.endpoint_url(&["v2.5", &self.token, &coordinates, &file])
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `parse_base_url` rejects bases without a path, so this always applies.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let res = request.send().await.map_err(|e| TransportError::connect(endpoint, e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(status_error(endpoint, status, &body));
        }

        let body = res.text().await.map_err(|e| TransportError::connect(endpoint, e))?;
        decode_body(endpoint, &body)
    }
}

#[async_trait]
impl WeatherApi for CaiyunClient {
    async fn search_places(&self, query: &str) -> Result<PlaceResponse, TransportError> {
        let url = self.search_url();
        debug!(%query, "searching places");

        let request = self.http.get(url).query(&[
            ("query", query),
            ("token", self.token.as_str()),
            ("lang", self.lang.as_str()),
        ]);

        self.get_json(PLACE_SEARCH, request).await
    }

    async fn fetch_realtime(
        &self,
        lng: &str,
        lat: &str,
    ) -> Result<RealtimeResponse, TransportError> {
        let url = self.weather_url(REALTIME, lng, lat);
        debug!(%lng, %lat, "fetching realtime weather");

        self.get_json(REALTIME, self.http.get(url)).await
    }

    async fn fetch_daily(&self, lng: &str, lat: &str) -> Result<DailyResponse, TransportError> {
        let url = self.weather_url(DAILY, lng, lat);
        debug!(%lng, %lat, "fetching daily forecast");

        self.get_json(DAILY, self.http.get(url)).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid API base URL: {raw}"))?;

    if url.cannot_be_a_base() {
        return Err(anyhow!("Invalid API base URL: {raw} has no path to append endpoints to"));
    }

    Ok(url)
}

fn status_error(endpoint: &'static str, status: StatusCode, body: &str) -> TransportError {
    TransportError::Status { endpoint, status: status.as_u16(), body: truncate_body(body) }
}

fn decode_body<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, TransportError> {
    if body.trim().is_empty() {
        return Err(TransportError::EmptyBody { endpoint });
    }

    serde_json::from_str(body).map_err(|e| TransportError::decode(endpoint, e))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    fn client(base_url: &str) -> CaiyunClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            token: Some("TOKEN".to_string()),
            ..ApiConfig::default()
        };
        let mut client = CaiyunClient::new(&config).expect("valid config");
        client.http = Client::builder().no_proxy().build().expect("http client");
        client
    }

    /// Serves one canned HTTP response on a local port and returns its base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/")
    }

    #[test]
    fn new_requires_token() {
        let err = CaiyunClient::new(&ApiConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No API token configured"));
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        for base_url in ["not a url", "mailto:someone@example.com"] {
            let config = ApiConfig {
                base_url: base_url.into(),
                token: Some("TOKEN".into()),
                ..ApiConfig::default()
            };

            let err = CaiyunClient::new(&config).unwrap_err();
            assert!(err.to_string().contains("Invalid API base URL"), "{base_url}");
        }
    }

    #[test]
    fn weather_urls_embed_token_and_coordinates() {
        let client = client("https://api.caiyunapp.com/");

        assert_eq!(
            client.weather_url(REALTIME, "116.40", "39.90").as_str(),
            "https://api.caiyunapp.com/v2.5/TOKEN/116.40,39.90/realtime.json"
        );
        assert_eq!(
            client.weather_url(DAILY, "116.40", "39.90").as_str(),
            "https://api.caiyunapp.com/v2.5/TOKEN/116.40,39.90/daily.json"
        );
    }

    #[test]
    fn coordinates_cannot_escape_their_path_segment() {
        let client = client("https://api.caiyunapp.com/");

        let url = client.weather_url(REALTIME, "1?a=b#", "2/3");

        assert_eq!(url.path(), "/v2.5/TOKEN/1%3Fa=b%23,2%2F3/realtime.json");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let with_slash = client("http://localhost:8080/proxy/");
        let without = client("http://localhost:8080/proxy");

        assert_eq!(with_slash.search_url().as_str(), "http://localhost:8080/proxy/v2/place");
        assert_eq!(without.search_url().as_str(), "http://localhost:8080/proxy/v2/place");
    }

    #[test]
    fn status_error_keeps_code_and_truncated_body() {
        let err = status_error(DAILY, StatusCode::BAD_GATEWAY, &"x".repeat(300));

        match err {
            TransportError::Status { endpoint, status, body } => {
                assert_eq!(endpoint, DAILY);
                assert_eq!(status, 502);
                assert_eq!(body.len(), 203);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_body_classifies_empty_and_malformed_bodies() {
        let empty = decode_body::<PlaceResponse>(PLACE_SEARCH, "  \n");
        assert!(matches!(empty, Err(TransportError::EmptyBody { endpoint: PLACE_SEARCH })));

        let malformed = decode_body::<PlaceResponse>(PLACE_SEARCH, "{bad}");
        assert!(matches!(malformed, Err(TransportError::Decode { endpoint: PLACE_SEARCH, .. })));

        let ok = decode_body::<PlaceResponse>(PLACE_SEARCH, r#"{"status": "ok", "places": []}"#);
        assert_eq!(ok.unwrap().status, "ok");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "晴".repeat(250);
        let cut = truncate_body(&long);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn server_error_becomes_status_error() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\noops",
        )
        .await;

        let err = client(&base).search_places("beijing").await.unwrap_err();

        assert!(matches!(
            err,
            TransportError::Status { status: 500, ref body, .. } if body == "oops"
        ));
    }

    #[tokio::test]
    async fn status_survives_a_truncated_error_body() {
        let base = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 100\r\nconnection: close\r\n\r\nshort",
        )
        .await;

        let err = client(&base).fetch_daily("116.40", "39.90").await.unwrap_err();

        assert!(matches!(err, TransportError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn empty_ok_body_is_rejected() {
        let base =
            serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;

        let err = client(&base).fetch_realtime("116.40", "39.90").await.unwrap_err();

        assert!(matches!(err, TransportError::EmptyBody { endpoint: REALTIME }));
    }

    #[tokio::test]
    async fn malformed_ok_body_is_a_decode_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 5\r\nconnection: close\r\n\r\n{bad}",
        )
        .await;

        let err = client(&base).search_places("beijing").await.unwrap_err();

        assert!(matches!(err, TransportError::Decode { endpoint: PLACE_SEARCH, .. }));
    }

    #[tokio::test]
    async fn ok_body_decodes_into_response() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 29\r\nconnection: close\r\n\r\n{\"status\":\"ok\",\"places\":[  ]}",
        )
        .await;

        let response = client(&base).search_places("beijing").await.unwrap();

        assert_eq!(response.status, "ok");
        assert!(response.places.is_empty());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}/"))
            .fetch_realtime("116.40", "39.90")
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connect { endpoint: REALTIME, .. }));
    }
}
