//! The same game as [crate::death_star_machine], kept as a handful of loose flags instead of an
//! explicit state.  Which screen shows is worked out from the flags every time one changes.

use std::sync::Arc;

use async_trait::async_trait;
use futures_signals::signal::Mutable;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::destroy_service::DestroyService;
use crate::planet::Planet;
use crate::planet_source::PlanetSource;
use crate::screen::Screen;
use crate::workflow::Workflow;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Flags {
    planets: Option<Vec<Planet>>,
    fetch_failed: bool,
    destroying: Option<String>,
    destroy_error: Option<String>,
    last_destroyed: Option<String>,
}

impl Flags {
    fn screen(&self) -> Screen {
        let planets = match &self.planets {
            Some(planets) => planets,
            None if self.fetch_failed => return Screen::PlanetFailure,
            None => return Screen::Loading,
        };
        if let Some(planet) = &self.last_destroyed {
            Screen::Destroyed { planet: planet.clone() }
        } else if let Some(message) = &self.destroy_error {
            Screen::Failure { message: message.clone() }
        } else if let Some(target) = &self.destroying {
            Screen::Destroying { planets: planets.clone(), target: target.clone() }
        } else {
            Screen::Planets { planets: planets.clone() }
        }
    }

    fn has_planet(&self, name: &str) -> bool {
        self.planets.iter().flatten().any(|p| p.name == name)
    }
}

struct Shared {
    flags: Mutex<Flags>,
    screen: Mutable<Screen>,
    planet_source: Arc<dyn PlanetSource>,
    destroy_service: Arc<dyn DestroyService>,
}

/// Cheap to clone; clones drive the same game.  Must be started from within a tokio runtime.
#[derive(Clone)]
pub struct DeathStarFlags {
    shared: Arc<Shared>,
}

impl DeathStarFlags {
    pub fn start(
        planet_source: Arc<dyn PlanetSource>,
        destroy_service: Arc<dyn DestroyService>,
    ) -> Self {
        let death_star = Self {
            shared: Arc::new(Shared {
                flags: Mutex::new(Flags::default()),
                screen: Mutable::new(Screen::Loading),
                planet_source,
                destroy_service,
            }),
        };
        let loader = death_star.clone();
        tokio::spawn(async move { loader.load().await });
        death_star
    }

    /// Planets still standing, or `None` until the catalog has answered.
    pub async fn planets(&self) -> Option<Vec<Planet>> {
        self.shared.flags.lock().await.planets.clone()
    }

    fn publish(&self, flags: &Flags) {
        let screen = flags.screen();
        debug!("Showing {:?}", screen);
        self.shared.screen.set(screen);
    }

    async fn load(&self) {
        let result = self.shared.planet_source.list_planets().await;
        let mut flags = self.shared.flags.lock().await;
        match result {
            Ok(planets) => {
                info!("Loaded {} planets", planets.len());
                flags.planets = Some(planets);
            },
            Err(err) => {
                warn!("Could not fetch planets: {}", err);
                flags.fetch_failed = true;
            },
        }
        self.publish(&flags);
    }

    async fn fire(self, target: String) {
        let result = self.shared.destroy_service.destroy(&target).await;
        let mut flags = self.shared.flags.lock().await;
        flags.destroying = None;
        match result {
            Ok(destroyed) => {
                if let Some(planets) = flags.planets.as_mut() {
                    planets.retain(|p| p.name != destroyed);
                }
                flags.last_destroyed = Some(destroyed);
            },
            Err(err) => flags.destroy_error = Some(err.to_string()),
        }
        self.publish(&flags);
    }
}

#[async_trait]
impl Workflow for DeathStarFlags {
    fn screen_feed(&self) -> Mutable<Screen> {
        self.shared.screen.clone()
    }

    async fn destroy(&self, planet: &str) {
        let mut flags = self.shared.flags.lock().await;
        if !flags.screen().accepts_destroy() {
            warn!("Not on the planet list, ignoring request to destroy {}", planet);
            return;
        }
        if !flags.has_planet(planet) {
            warn!("There is no planet named {:?}", planet);
            return;
        }
        flags.destroying = Some(String::from(planet));
        self.publish(&flags);
        drop(flags);
        tokio::spawn(self.clone().fire(String::from(planet)));
    }

    async fn back(&self) {
        let mut flags = self.shared.flags.lock().await;
        if flags.last_destroyed.take().is_some() {
            self.publish(&flags);
        } else {
            debug!("Nothing to go back from");
        }
    }
}
