//! Play the game in a terminal.  Each screen is printed as it settles; on the planet list type a
//! planet name to fire at it (or `q` to leave), and press Enter to go back after a hit.
//!
//! Run with `--print-graph` to see the states the machine variant moves through.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;

use deathstar::death_star_flags::DeathStarFlags;
use deathstar::death_star_machine::{death_star_states, DeathStar};
use deathstar::destroy_service::{DestroyOptions, SimulatedDestroyService};
use deathstar::planet_source_factory::PlanetSourceFactory;
use deathstar::planet_source_swapi::DEFAULT_API_URL;
use deathstar::screen::{wait_for_screen, Screen};
use deathstar::workflow::Workflow;
use state_machine::StateGraphPrinter;

#[derive(Parser, Debug)]
#[clap(name = "deathstar")]
struct Opts {
    #[clap(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Read planets from a JSON file instead of the catalog.
    #[clap(long)]
    fixture: Option<PathBuf>,

    /// Use the bundled planets.
    #[clap(long)]
    offline: bool,

    #[clap(long, default_value = "500")]
    destroy_delay_ms: u64,

    /// Keep state in loose flags rather than the state machine.
    #[clap(long)]
    ad_hoc: bool,

    #[clap(long)]
    print_graph: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    if opts.print_graph {
        println!("{}", StateGraphPrinter::render(&death_star_states()?));
        return Ok(());
    }

    let source = PlanetSourceFactory::new_maybe_fixture(&opts.api_url, opts.fixture.clone(), opts.offline)
        .create_source()?;
    let destroyer = Arc::new(SimulatedDestroyService::new(DestroyOptions {
        delay: Duration::from_millis(opts.destroy_delay_ms),
        ..Default::default()
    }));
    let workflow: Box<dyn Workflow> = if opts.ad_hoc {
        Box::new(DeathStarFlags::start(source, destroyer))
    } else {
        Box::new(DeathStar::start(source, destroyer)?)
    };

    let last = play(workflow.as_ref()).await?;
    if last.is_final() {
        return Err(anyhow!("Game over"));
    }
    Ok(())
}

async fn play(workflow: &dyn Workflow) -> anyhow::Result<Screen> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let screen = workflow.settled().await;
        println!("{}\n", screen);
        match &screen {
            Screen::Planets { planets } => {
                prompt("Destroy which planet? (q to quit) ")?;
                let line = match input.next_line().await? {
                    Some(line) => line,
                    None => return Ok(screen.clone()),
                };
                let name = line.trim();
                if name == "q" {
                    return Ok(screen.clone());
                }
                if !planets.iter().any(|p| p.name == name) {
                    println!("No planet named {:?}\n", name);
                    continue;
                }
                workflow.destroy(name).await;
                let next = wait_for_screen(&workflow.screen_feed(), |s| !s.accepts_destroy()).await;
                if let Screen::Destroying { .. } = next {
                    println!("{}\n", next);
                }
            },
            Screen::Destroyed { .. } => {
                prompt("Press Enter to go back ")?;
                if input.next_line().await?.is_none() {
                    return Ok(screen);
                }
                workflow.back().await;
                wait_for_screen(&workflow.screen_feed(), |s| !matches!(s, Screen::Destroyed { .. })).await;
            },
            _ => {
                debug!("Nothing left to do on {:?}", screen);
                return Ok(screen);
            },
        }
    }
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}
