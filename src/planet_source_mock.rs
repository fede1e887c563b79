use std::path::Path;

use async_trait::async_trait;
use log::debug;
use tokio::time::Duration;

use crate::planet::{Planet, PlanetsResponse};
use crate::planet_source::{FetchError, FetchResult, PlanetSource};

const BUNDLED_FIXTURE: &str = include_str!("../fixtures/planets.json");

/// Offline stand-in for the catalog.  Serves a fixed list (or a fixed failure) after an
/// optional artificial latency.
#[derive(Debug, Clone)]
pub struct PlanetSourceMock {
    answer: Result<Vec<Planet>, String>,
    latency: Duration,
}

impl PlanetSourceMock {
    pub fn new(planets: Vec<Planet>) -> Self {
        Self { answer: Ok(planets), latency: Duration::ZERO }
    }

    pub fn with_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| Planet::named(n)).collect())
    }

    pub fn failing(reason: &str) -> Self {
        Self { answer: Err(String::from(reason)), latency: Duration::ZERO }
    }

    /// The five planet page shipped in `fixtures/planets.json`.
    pub fn bundled() -> FetchResult<Self> {
        Ok(Self::new(parse_fixture(BUNDLED_FIXTURE)?))
    }

    pub fn from_fixture_file(path: impl AsRef<Path>) -> FetchResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_fixture(&contents)?))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl PlanetSource for PlanetSourceMock {
    async fn list_planets(&self) -> FetchResult<Vec<Planet>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!("list_planets: {:?}", self.answer.as_ref().map(|p| p.len()));
        self.answer.clone().map_err(FetchError::Unavailable)
    }
}

/// Accepts either a full `/planets` page or a bare array of planets.
pub fn parse_fixture(json: &str) -> FetchResult<Vec<Planet>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        let page: PlanetsResponse = serde_json::from_value(value)?;
        Ok(page.results)
    }
}
