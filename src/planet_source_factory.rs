use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::planet_source::PlanetSource;
use crate::planet_source_mock::PlanetSourceMock;
use crate::planet_source_swapi::{SwapiPlanetSource, DEFAULT_API_URL};

pub struct PlanetSourceFactory {
    api_url: String,
    fixture: Option<PathBuf>,
    force_offline: bool,
}

impl Default for PlanetSourceFactory {
    fn default() -> Self {
        Self {
            api_url: String::from(DEFAULT_API_URL),
            fixture: None,
            force_offline: false,
        }
    }
}

impl PlanetSourceFactory {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn new_maybe_fixture(api_url: &str, fixture: Option<PathBuf>, force_offline: bool) -> Self {
        Self {
            api_url: String::from(api_url),
            fixture,
            force_offline,
        }
    }

    pub fn create_source(&self) -> anyhow::Result<Arc<dyn PlanetSource>> {
        if let Some(fixture) = &self.fixture {
            info!("Reading planets from {}", fixture.display());
            Ok(Arc::new(PlanetSourceMock::from_fixture_file(fixture)?))
        } else if self.force_offline {
            info!("Offline, using the bundled planets");
            Ok(Arc::new(PlanetSourceMock::bundled()?))
        } else {
            info!("Fetching planets from {}", self.api_url);
            Ok(Arc::new(SwapiPlanetSource::new(&self.api_url)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::planet::planet_names;

    use super::*;

    #[tokio::test]
    async fn test_offline_uses_bundled_fixture() {
        let source = PlanetSourceFactory::new_maybe_fixture(DEFAULT_API_URL, None, true)
            .create_source()
            .unwrap();
        let planets = source.list_planets().await.unwrap();
        assert_eq!(planet_names(&planets)[0], "Tatooine");
    }

    #[test]
    fn test_missing_fixture_is_an_error() {
        let factory = PlanetSourceFactory::new_maybe_fixture(
            DEFAULT_API_URL,
            Some(PathBuf::from("/definitely/not/here.json")),
            false);
        assert!(factory.create_source().is_err());
    }

    #[tokio::test]
    async fn test_default_is_online() {
        assert!(PlanetSourceFactory::new().create_source().is_ok());
    }
}
