//! Print the planet catalog, one name per line or as JSON with `--json`.

use std::path::PathBuf;

use clap::Parser;

use deathstar::planet::planet_names;
use deathstar::planet_source_factory::PlanetSourceFactory;
use deathstar::planet_source_swapi::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[clap(name = "list_planets")]
struct Opts {
    #[clap(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    #[clap(long)]
    fixture: Option<PathBuf>,

    #[clap(long)]
    offline: bool,

    #[clap(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let source = PlanetSourceFactory::new_maybe_fixture(&opts.api_url, opts.fixture, opts.offline)
        .create_source()?;
    let planets = source.list_planets().await?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&planets)?);
    } else {
        for name in planet_names(&planets) {
            println!("{}", name);
        }
    }
    Ok(())
}
