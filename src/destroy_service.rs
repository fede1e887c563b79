use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;
use tokio::time::Duration;

pub const DEFAULT_DESTROY_DELAY: Duration = Duration::from_millis(500);
pub const SHIELDED_PLANET: &str = "Alderaan";
pub const REBEL_COUNTERATTACK: &str = "Oh no! The Rebel alliance blew you up.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestroyError {
    #[error("Oh no! The Rebel alliance blew you up.")]
    RebelCounterattack { planet: String },
}

#[async_trait]
pub trait DestroyService: Send + Sync {
    /// Destroy `planet`, answering with the name of what was destroyed.
    async fn destroy(&self, planet: &str) -> Result<String, DestroyError>;
}

#[derive(Debug, Clone)]
pub struct DestroyOptions {
    pub delay: Duration,
    pub shielded_planet: String,
}

impl Default for DestroyOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DESTROY_DELAY,
            shielded_planet: String::from(SHIELDED_PLANET),
        }
    }
}

/// Pretends to fire the superlaser.  The shielded planet fails straight away; anything else
/// succeeds once the delay has passed.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDestroyService {
    options: DestroyOptions,
}

impl SimulatedDestroyService {
    pub fn new(options: DestroyOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DestroyService for SimulatedDestroyService {
    async fn destroy(&self, planet: &str) -> Result<String, DestroyError> {
        if planet == self.options.shielded_planet {
            warn!("Tried to destroy {}, the rebels fought back", planet);
            return Err(DestroyError::RebelCounterattack { planet: String::from(planet) });
        }
        tokio::time::sleep(self.options.delay).await;
        info!("Destroyed {}", planet);
        Ok(String::from(planet))
    }
}
