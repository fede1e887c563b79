//! The destroy-a-planet game as an explicit state machine:
//!
//! ```text
//! StateGraph {
//!   * Loading => [Planets, PlanetFailure]
//!   PlanetFailure (terminal)
//!   Planets => Destroying
//!   Destroying => [Destroyed, Failure]
//!   Destroyed => Planets
//!   Failure (terminal)
//! }
//! ```
//!
//! `Loading` and `Destroying` each start their service on entry and wait for its answer to come
//! back as an event, so at most one of them is ever in flight.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use futures_signals::signal::Mutable;
use log::{debug, error, info, warn};
use tokio::task::JoinError;

use state_machine::{Context, Dispatcher, GraphError, HandleResult, NotHandled, State, StateGraph, StateMachine, StateMachineDescriptor, Transition};

use crate::destroy_service::{DestroyError, DestroyService, REBEL_COUNTERATTACK};
use crate::planet::Planet;
use crate::planet_source::{FetchError, PlanetSource};
use crate::screen::Screen;
use crate::workflow::Workflow;

pub struct DeathStarContext {
    planets: Vec<Planet>,
    planet_to_destroy: Option<String>,
    failure: Option<String>,
    planet_source: Arc<dyn PlanetSource>,
    destroy_service: Arc<dyn DestroyService>,
    screen: Mutable<Screen>,
}

impl DeathStarContext {
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn planet_to_destroy(&self) -> Option<&str> {
        self.planet_to_destroy.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn show(&self, screen: Screen) {
        debug!("Showing {:?}", screen);
        self.screen.set(screen);
    }
}

#[derive(Debug)]
pub enum DeathStarEvent {
    OnPlanetsLoaded(Vec<Planet>),
    OnPlanetsFailed(FetchError),
    DoDestroy(String),
    OnDestroyed(String),
    OnDestroyFailed(DestroyError),
    DoBack,
}

type DeathStarCtx = Context<DeathStarContext, DeathStarEvent>;

#[derive(Default)]
struct Loading;
impl State for Loading {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn on_enter(&mut self, context: &mut DeathStarCtx) {
        context.user.show(Screen::Loading);
        let source = context.user.planet_source.clone();
        context.dispatcher().dispatch_when_done(async move {
            match source.list_planets().await {
                Ok(planets) => DeathStarEvent::OnPlanetsLoaded(planets),
                Err(err) => DeathStarEvent::OnPlanetsFailed(err),
            }
        });
    }

    fn handle(&mut self, context: &mut DeathStarCtx, event: DeathStarEvent) -> HandleResult<DeathStarEvent> {
        match event {
            DeathStarEvent::OnPlanetsLoaded(planets) => {
                info!("Loaded {} planets", planets.len());
                context.user.planets = planets;
                Ok(Transition::to::<Planets>())
            },
            DeathStarEvent::OnPlanetsFailed(err) => {
                warn!("Could not fetch planets: {}", err);
                Ok(Transition::to::<PlanetFailure>())
            },
            _ => Err(NotHandled::UnknownEvent(event)),
        }
    }
}

#[derive(Default)]
struct PlanetFailure;
impl State for PlanetFailure {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn on_enter(&mut self, context: &mut DeathStarCtx) {
        context.user.show(Screen::PlanetFailure);
    }

    fn handle(&mut self, _context: &mut DeathStarCtx, event: DeathStarEvent) -> HandleResult<DeathStarEvent> {
        Err(NotHandled::UnknownEvent(event))
    }
}

#[derive(Default)]
struct Planets;
impl State for Planets {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn on_enter(&mut self, context: &mut DeathStarCtx) {
        context.user.show(Screen::Planets { planets: context.user.planets.clone() });
    }

    fn handle(&mut self, context: &mut DeathStarCtx, event: DeathStarEvent) -> HandleResult<DeathStarEvent> {
        match event {
            DeathStarEvent::DoDestroy(name) => {
                if !context.user.planets.iter().any(|p| p.name == name) {
                    return Err(NotHandled::InternalError(anyhow!("there is no planet named {:?}", name)));
                }
                context.user.planet_to_destroy = Some(name);
                Ok(Transition::to::<Destroying>())
            },
            _ => Err(NotHandled::UnknownEvent(event)),
        }
    }
}

#[derive(Default)]
struct Destroying;
impl State for Destroying {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn on_enter(&mut self, context: &mut DeathStarCtx) {
        let target = match context.user.planet_to_destroy.clone() {
            Some(target) => target,
            None => {
                error!("Entered Destroying without a target");
                return;
            },
        };
        context.user.show(Screen::Destroying {
            planets: context.user.planets.clone(),
            target: target.clone(),
        });
        let service = context.user.destroy_service.clone();
        context.dispatcher().dispatch_when_done(async move {
            match service.destroy(&target).await {
                Ok(destroyed) => DeathStarEvent::OnDestroyed(destroyed),
                Err(err) => DeathStarEvent::OnDestroyFailed(err),
            }
        });
    }

    fn handle(&mut self, context: &mut DeathStarCtx, event: DeathStarEvent) -> HandleResult<DeathStarEvent> {
        match event {
            DeathStarEvent::OnDestroyed(name) => {
                context.user.planets.retain(|p| p.name != name);
                Ok(Transition::to::<Destroyed>())
            },
            DeathStarEvent::OnDestroyFailed(err) => {
                context.user.failure = Some(err.to_string());
                Ok(Transition::to::<Failure>())
            },
            DeathStarEvent::DoDestroy(name) => {
                warn!("Superlaser still charging, ignoring request to destroy {}", name);
                Ok(Transition::None)
            },
            _ => Err(NotHandled::UnknownEvent(event)),
        }
    }
}

#[derive(Default)]
struct Destroyed;
impl State for Destroyed {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn on_enter(&mut self, context: &mut DeathStarCtx) {
        let planet = context.user.planet_to_destroy.clone().unwrap_or_default();
        context.user.show(Screen::Destroyed { planet });
    }

    fn on_exit(&mut self, context: &mut DeathStarCtx) {
        context.user.planet_to_destroy = None;
    }

    fn handle(&mut self, _context: &mut DeathStarCtx, event: DeathStarEvent) -> HandleResult<DeathStarEvent> {
        match event {
            DeathStarEvent::DoBack => Ok(Transition::to::<Planets>()),
            _ => Err(NotHandled::UnknownEvent(event)),
        }
    }
}

#[derive(Default)]
struct Failure;
impl State for Failure {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn on_enter(&mut self, context: &mut DeathStarCtx) {
        let message = context.user.failure.clone().unwrap_or_else(|| String::from(REBEL_COUNTERATTACK));
        context.user.show(Screen::Failure { message });
    }

    fn handle(&mut self, _context: &mut DeathStarCtx, event: DeathStarEvent) -> HandleResult<DeathStarEvent> {
        Err(NotHandled::UnknownEvent(event))
    }
}

pub fn death_star_states() -> Result<StateGraph<DeathStarContext, DeathStarEvent>, GraphError> {
    StateGraph::builder()
        .add::<Loading>().initial()
            .transitions_to::<Planets>()
            .transitions_to::<PlanetFailure>()
        .add::<PlanetFailure>().terminal()
        .add::<Planets>().transitions_to::<Destroying>()
        .add::<Destroying>()
            .transitions_to::<Destroyed>()
            .transitions_to::<Failure>()
        .add::<Destroyed>().transitions_to::<Planets>()
        .add::<Failure>().terminal()
        .build()
}

struct DeathStarMachine {
    context: DeathStarContext,
}

impl StateMachineDescriptor for DeathStarMachine {
    type Context = DeathStarContext;
    type Event = DeathStarEvent;

    fn debug_name(&self) -> &'static str {
        "DeathStar"
    }

    fn states(&self) -> Result<StateGraph<Self::Context, Self::Event>, GraphError> {
        death_star_states()
    }

    fn into_context(self) -> Self::Context {
        self.context
    }
}

/// A running [DeathStarMachine].  Must be started from within a tokio runtime.
pub struct DeathStar {
    machine: StateMachine<DeathStarContext, DeathStarEvent>,
    dispatcher: Dispatcher<DeathStarEvent>,
    screen: Mutable<Screen>,
}

impl DeathStar {
    pub fn start(
        planet_source: Arc<dyn PlanetSource>,
        destroy_service: Arc<dyn DestroyService>,
    ) -> Result<Self, GraphError> {
        let screen = Mutable::new(Screen::Loading);
        let machine = StateMachine::start(DeathStarMachine {
            context: DeathStarContext {
                planets: vec![],
                planet_to_destroy: None,
                failure: None,
                planet_source,
                destroy_service,
                screen: screen.clone(),
            },
        })?;
        let dispatcher = machine.dispatcher();
        Ok(Self { machine, dispatcher, screen })
    }

    pub async fn shutdown(self) -> Result<DeathStarContext, JoinError> {
        self.machine.shutdown().await
    }
}

#[async_trait]
impl Workflow for DeathStar {
    fn screen_feed(&self) -> Mutable<Screen> {
        self.screen.clone()
    }

    async fn destroy(&self, planet: &str) {
        self.dispatcher.dispatch(DeathStarEvent::DoDestroy(String::from(planet))).await;
    }

    async fn back(&self) {
        self.dispatcher.dispatch(DeathStarEvent::DoBack).await;
    }
}
