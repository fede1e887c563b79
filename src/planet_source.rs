use async_trait::async_trait;
use thiserror::Error;

use crate::planet::Planet;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog answered with HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("could not parse planets: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unavailable(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Where the planet list comes from.  Implementations return planets in whatever order the
/// catalog gives them.
#[async_trait]
pub trait PlanetSource: Send + Sync {
    async fn list_planets(&self) -> FetchResult<Vec<Planet>>;
}
