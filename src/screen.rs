use std::fmt;

use futures::StreamExt;
use futures_signals::signal::{Mutable, SignalExt};

use crate::planet::Planet;

pub const TITLE: &str = "Deathstar.io";
pub const LOADING: &str = "Loading";
pub const COULD_NOT_FETCH: &str = "Could not fetch planets.";
pub const DESTROYING: &str = "Destroying a planet";

/// What the player is looking at.  Each variant carries only the data that screen can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    PlanetFailure,
    Planets { planets: Vec<Planet> },
    Destroying { planets: Vec<Planet>, target: String },
    Destroyed { planet: String },
    Failure { message: String },
}

impl Screen {
    /// Nothing can happen after a failure screen.
    pub fn is_final(&self) -> bool {
        matches!(self, Screen::PlanetFailure | Screen::Failure { .. })
    }

    pub fn planets(&self) -> Option<&[Planet]> {
        match self {
            Screen::Planets { planets } | Screen::Destroying { planets, .. } => Some(planets),
            _ => None,
        }
    }

    pub fn accepts_destroy(&self) -> bool {
        matches!(self, Screen::Planets { .. })
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Loading => write!(f, "{}", LOADING),
            Screen::PlanetFailure => write!(f, "{}", COULD_NOT_FETCH),
            Screen::Planets { planets } => write_planet_list(f, planets),
            Screen::Destroying { planets, .. } => {
                write_planet_list(f, planets)?;
                write!(f, "\n\n{}", DESTROYING)
            },
            Screen::Destroyed { planet } => write!(f, "You just destroyed {}!\n[Back]", planet),
            Screen::Failure { message } => write!(f, "{}", message),
        }
    }
}

fn write_planet_list(f: &mut fmt::Formatter<'_>, planets: &[Planet]) -> fmt::Result {
    write!(f, "{}\n", TITLE)?;
    for planet in planets {
        write!(f, "\n  {:<20} [Destroy {}]", planet.name, planet.name)?;
    }
    Ok(())
}

/// Resolve with the first screen (current one included) that satisfies `predicate`.
pub async fn wait_for_screen<P>(feed: &Mutable<Screen>, predicate: P) -> Screen
    where P: Fn(&Screen) -> bool {
    let mut screens = feed.signal_cloned().to_stream();
    while let Some(screen) = screens.next().await {
        if predicate(&screen) {
            return screen;
        }
    }
    feed.get_cloned()
}
