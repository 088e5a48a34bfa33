//! Catalog client

use std::thread;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{CardSet, Printing};

/// Public catalog endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.scryfall.com";

/// Card lookups against a catalog
///
/// `search_printings` answers [`CatalogError::NotFound`] (or an empty list)
/// when no card has the exact name.
pub trait CatalogClient {
    /// Every printing of the card with exactly this name
    fn search_printings(&self, name: &str) -> CatalogResult<Vec<Printing>>;

    /// Every known set
    fn list_sets(&self) -> CatalogResult<Vec<CardSet>>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn search_printings(&self, name: &str) -> CatalogResult<Vec<Printing>> {
        (**self).search_printings(name)
    }

    fn list_sets(&self) -> CatalogResult<Vec<CardSet>> {
        (**self).list_sets()
    }
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the API, without trailing path
    pub base_url: String,
    /// Sent with every request; the public API asks clients to identify
    /// themselves
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause before each follow-up page of a paginated answer
    pub page_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("binder/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            page_delay: Duration::from_millis(100),
        }
    }
}

impl ClientConfig {
    /// Point the client at another API root
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the pause taken between the pages of one answer
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }
}

/// One page of a list response
#[derive(Debug, Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_page: Option<String>,
}

/// Blocking HTTP implementation of [`CatalogClient`]
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    config: ClientConfig,
    http: reqwest::blocking::Client,
}

impl HttpCatalogClient {
    /// Build a client from its settings
    pub fn new(config: ClientConfig) -> CatalogResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Settings in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Exact-name search URL, listing every printing
    pub fn search_url(&self, name: &str) -> CatalogResult<Url> {
        let query = format!("!\"{}\"", name);
        Url::parse_with_params(
            &self.endpoint("cards/search"),
            [("q", query.as_str()), ("unique", "prints")],
        )
        .map_err(|e| CatalogError::InvalidUrl(e.to_string()))
    }

    /// Set listing URL
    pub fn sets_url(&self) -> CatalogResult<Url> {
        Url::parse(&self.endpoint("sets")).map_err(|e| CatalogError::InvalidUrl(e.to_string()))
    }

    /// GET a URL and return the body of a successful response
    ///
    /// `Ok(None)` means the catalog answered 404.
    fn get_text(&self, url: &Url) -> CatalogResult<Option<String>> {
        tracing::debug!(%url, "catalog request");
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(Some(response.text()?))
    }

    /// Collect every page of a list endpoint
    ///
    /// `Ok(None)` when the first page is a 404.
    fn get_all<T: DeserializeOwned>(&self, first: Url) -> CatalogResult<Option<Vec<T>>> {
        collect_pages(first, self.config.page_delay, |url| self.get_text(url))
    }
}

/// Follow `next_page` links from `first`, pausing `delay` before each
/// follow-up request
fn collect_pages<T, F>(
    first: Url,
    delay: Duration,
    mut fetch: F,
) -> CatalogResult<Option<Vec<T>>>
where
    T: DeserializeOwned,
    F: FnMut(&Url) -> CatalogResult<Option<String>>,
{
    let mut items = Vec::new();
    let mut next = Some(first);
    let mut pages = 0usize;

    while let Some(url) = next.take() {
        if pages > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        pages += 1;

        let Some(body) = fetch(&url)? else {
            if items.is_empty() {
                return Ok(None);
            }
            tracing::warn!(%url, "follow-up page vanished, keeping what was read");
            break;
        };

        let page: ListPage<T> = decode_page(&body)?;
        items.extend(page.data);

        if page.has_more {
            next = match page.next_page {
                Some(link) => {
                    Some(Url::parse(&link).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?)
                }
                None => None,
            };
        }
    }

    Ok(Some(items))
}

fn decode_page<T: DeserializeOwned>(body: &str) -> CatalogResult<ListPage<T>> {
    Ok(serde_json::from_str(body)?)
}

impl CatalogClient for HttpCatalogClient {
    fn search_printings(&self, name: &str) -> CatalogResult<Vec<Printing>> {
        let url = self.search_url(name)?;
        let printings = self
            .get_all(url)?
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        tracing::debug!(name, printings = printings.len(), "card search finished");
        Ok(printings)
    }

    fn list_sets(&self) -> CatalogResult<Vec<CardSet>> {
        let url = self.sets_url()?;
        let sets = self.get_all(url.clone())?.ok_or(CatalogError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            url: url.to_string(),
        })?;
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    fn client(base: &str) -> HttpCatalogClient {
        HttpCatalogClient::new(ClientConfig::default().with_base_url(base)).unwrap()
    }

    #[test]
    fn test_search_url() {
        let url = client(DEFAULT_BASE_URL).search_url("Lightning Bolt").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.scryfall.com/cards/search?q=%21%22Lightning+Bolt%22&unique=prints"
        );

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(query[0], ("q".to_string(), "!\"Lightning Bolt\"".to_string()));
    }

    #[test]
    fn test_search_url_escapes_reserved_characters() {
        let url = client("http://localhost:8080/").search_url("Fire // Ice & Co").unwrap();
        assert!(url.as_str().starts_with("http://localhost:8080/cards/search?q="));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(query.len(), 2);
        assert_eq!(query[0].1, "!\"Fire // Ice & Co\"");
    }

    #[test]
    fn test_sets_url() {
        let url = client("https://catalog.example/v2").sets_url().unwrap();
        assert_eq!(url.as_str(), "https://catalog.example/v2/sets");
        assert!(client("not a url").sets_url().is_err());
    }

    #[test]
    fn test_decode_page() {
        let body = r#"{
            "object": "list",
            "total_cards": 2,
            "has_more": true,
            "next_page": "https://api.scryfall.com/cards/search?page=2",
            "data": [
                {"name": "Opt", "oracle_id": "o", "uri": "u1", "set": "xln", "set_name": "Ixalan"},
                {"name": "Opt", "oracle_id": "o", "uri": "u2", "set": "dom", "set_name": "Dominaria"}
            ]
        }"#;

        let page: ListPage<Printing> = decode_page(body).unwrap();
        assert!(page.has_more);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1].set, "dom");
        assert!(page.data[0].colors.is_empty());
    }

    #[test]
    fn test_collect_pages_pauses_between_pages() {
        let page = |n: u32, more: bool| {
            format!(
                r#"{{"has_more": {}, "next_page": "https://catalog.example/p{}", "data": [{}]}}"#,
                more,
                n + 1,
                n
            )
        };
        let delay = Duration::from_millis(20);
        let mut requests = Vec::new();

        let started = Instant::now();
        let items: Vec<u32> = collect_pages(
            Url::parse("https://catalog.example/p1").unwrap(),
            delay,
            |url| {
                requests.push((url.to_string(), started.elapsed()));
                let n = requests.len() as u32;
                Ok(Some(page(n, n < 3)))
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        let urls: Vec<&str> = requests.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://catalog.example/p1",
                "https://catalog.example/p2",
                "https://catalog.example/p3"
            ]
        );
        // No pause before the first request, one before each later page
        assert!(requests[0].1 < delay);
        assert!(requests[2].1 >= delay * 2);
    }

    #[test]
    fn test_collect_pages_first_page_not_found() {
        let items: Option<Vec<u32>> = collect_pages(
            Url::parse("https://catalog.example/p1").unwrap(),
            Duration::ZERO,
            |_| Ok(None),
        )
        .unwrap();
        assert!(items.is_none());
    }

    #[test]
    fn test_decode_page_rejects_garbage() {
        let err = decode_page::<Printing>("<html>").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }
}
