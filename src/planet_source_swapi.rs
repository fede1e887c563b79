use async_trait::async_trait;
use log::{debug, info};

use crate::planet::{Planet, PlanetsResponse};
use crate::planet_source::{FetchError, FetchResult, PlanetSource};

pub const DEFAULT_API_URL: &str = "https://swapi.dev/api";

/// Reads the first page of `/planets` from a SWAPI compatible catalog.
pub struct SwapiPlanetSource {
    client: reqwest::Client,
    api_url: String,
}

impl SwapiPlanetSource {
    pub fn new(api_url: &str) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn planets_url(&self) -> String {
        format!("{}/planets", self.api_url)
    }
}

#[async_trait]
impl PlanetSource for SwapiPlanetSource {
    async fn list_planets(&self) -> FetchResult<Vec<Planet>> {
        let url = self.planets_url();
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.bytes().await?;
        let page: PlanetsResponse = serde_json::from_slice(&body)?;
        info!("Fetched {} planets ({} in catalog)", page.results.len(), page.count);
        Ok(page.results)
    }
}
