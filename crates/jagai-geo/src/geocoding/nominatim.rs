use std::sync::Arc;
use std::time::Duration;

use exn::ResultExt;
use isahc::prelude::*;
use isahc::{HttpClient, Request};

use super::{Error, Geocoder, Place, ReverseFuture, Search, SearchFuture};
use crate::{percent_encode, Coordinate};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const FORMAT: &str = "jsonv2";

/// Connection settings for a Nominatim instance.
#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: concat!("JagAI/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Geocoder backed by the Nominatim HTTP API.
#[derive(Clone)]
pub struct Backend {
    client: Arc<HttpClient>,
    options: Arc<Options>,
}

impl Backend {
    pub fn new(options: Options) -> exn::Result<Self, Error> {
        let client = HttpClient::new().or_raise(|| Error::Network("create HTTP client".into()))?;
        Ok(Self {
            client: Arc::new(client),
            options: Arc::new(options),
        })
    }

    fn search_url(&self, search: &Search) -> String {
        let mut url = format!(
            "{}/search?q={}&format={FORMAT}&limit={}",
            self.options.base_url.trim_end_matches('/'),
            percent_encode(&search.text),
            search.limit,
        );
        if search.address_details {
            url.push_str("&addressdetails=1");
        }
        url
    }

    fn reverse_url(&self, at: Coordinate) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&format={FORMAT}",
            self.options.base_url.trim_end_matches('/'),
            at.latitude,
            at.longitude,
        )
    }

    async fn get(&self, url: &str, language: Option<&str>) -> exn::Result<String, Error> {
        let mut builder = Request::get(url)
            .timeout(self.options.timeout)
            .header("User-Agent", self.options.user_agent.as_str());
        if let Some(language) = language {
            builder = builder.header("Accept-Language", language);
        }
        let request = builder
            .body(())
            .or_raise(|| Error::Network("build HTTP request".into()))?;

        tracing::debug!(url, "nominatim request");
        let mut response = self
            .client
            .send_async(request)
            .await
            .or_raise(|| Error::Network(format!("send request to {url}")))?;

        let status = response.status();
        if !status.is_success() {
            exn::bail!(Error::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .or_raise(|| Error::Network("read response body".into()))
    }
}

impl Geocoder for Backend {
    fn search(&self, search: Search) -> SearchFuture<'_> {
        Box::pin(async move {
            let url = self.search_url(&search);
            let body = self.get(&url, search.language.as_deref()).await?;
            parse_search(&body)
        })
    }

    fn reverse(&self, at: Coordinate, language: Option<String>) -> ReverseFuture<'_> {
        Box::pin(async move {
            let url = self.reverse_url(at);
            let body = self.get(&url, language.as_deref()).await?;
            parse_reverse(&body)
        })
    }
}

#[derive(serde::Deserialize)]
struct SearchHit {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
}

#[derive(serde::Deserialize)]
struct ReverseHit {
    #[serde(default)]
    display_name: Option<String>,
}

/// Parse a `jsonv2` search response. Hits keep their order; hits with
/// missing or non-numeric coordinates keep their name with no position.
pub fn parse_search(body: &str) -> exn::Result<Vec<Place>, Error> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).or_raise(|| Error::Parse("search response".into()))?;
    Ok(hits
        .into_iter()
        .map(|hit| {
            let position = match (hit.lat.as_deref(), hit.lon.as_deref()) {
                (Some(lat), Some(lon)) => Coordinate::parse(lat, lon),
                _ => None,
            };
            Place {
                display_name: hit.display_name.unwrap_or_default(),
                position,
            }
        })
        .collect())
}

/// Parse a `jsonv2` reverse response. Nominatim answers an unknown location
/// with an `{"error": ..}` object, which has no display name.
pub fn parse_reverse(body: &str) -> exn::Result<Option<String>, Error> {
    let hit: ReverseHit =
        serde_json::from_str(body).or_raise(|| Error::Parse("reverse response".into()))?;
    Ok(hit.display_name.filter(|name| !name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> Backend {
        Backend::new(Options {
            base_url: base_url.to_owned(),
            ..Options::default()
        })
        .unwrap()
    }

    #[test]
    fn search_url_with_details() {
        let url = backend("https://geo.example/").search_url(
            &Search::new("12 Main St", 5).with_address_details(),
        );
        assert_eq!(
            url,
            "https://geo.example/search?q=12%20Main%20St&format=jsonv2&limit=5&addressdetails=1"
        );
    }

    #[test]
    fn search_url_without_details() {
        let url = backend("https://geo.example").search_url(&Search::new("clinic", 3));
        assert_eq!(url, "https://geo.example/search?q=clinic&format=jsonv2&limit=3");
    }

    #[test]
    fn reverse_url() {
        let url = backend(DEFAULT_BASE_URL).reverse_url(Coordinate::new(40.0, -75.0));
        assert_eq!(
            url,
            "https://nominatim.openstreetmap.org/reverse?lat=40&lon=-75&format=jsonv2"
        );
    }

    #[test]
    fn parse_search_keeps_order() {
        let body = r#"[
            {"display_name": "First Hospital", "lat": "40.01", "lon": "-75.02"},
            {"display_name": "Second Clinic", "lat": "40.5", "lon": "-75.5"}
        ]"#;
        let places = parse_search(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].display_name, "First Hospital");
        assert_eq!(places[0].position, Some(Coordinate::new(40.01, -75.02)));
        assert_eq!(places[1].display_name, "Second Clinic");
    }

    #[test]
    fn parse_search_tolerates_bad_coordinates() {
        let body = r#"[{"display_name": "Somewhere", "lat": "n/a"}, {"lat": "1", "lon": "2"}]"#;
        let places = parse_search(body).unwrap();
        assert_eq!(places[0].position, None);
        assert_eq!(places[1].display_name, "");
        assert_eq!(places[1].position, Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn parse_search_empty() {
        assert!(parse_search("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_search_rejects_non_list() {
        assert!(parse_search(r#"{"error": "rate limited"}"#).is_err());
        assert!(parse_search("<html>").is_err());
    }

    #[test]
    fn parse_reverse_display_name() {
        assert_eq!(
            parse_reverse(r#"{"display_name": "123 Main St", "lat": "40"}"#).unwrap(),
            Some("123 Main St".to_owned())
        );
    }

    #[test]
    fn parse_reverse_unable_to_geocode() {
        assert_eq!(
            parse_reverse(r#"{"error": "Unable to geocode"}"#).unwrap(),
            None
        );
        assert_eq!(parse_reverse(r#"{"display_name": ""}"#).unwrap(), None);
    }

    #[test]
    fn parse_reverse_keeps_blank_but_non_empty_name() {
        assert_eq!(
            parse_reverse(r#"{"display_name": "   "}"#).unwrap(),
            Some("   ".to_owned())
        );
    }
}
