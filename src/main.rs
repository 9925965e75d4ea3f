use clap::Parser;
use locallens::config::{parse_radii, Config};
use locallens::facts::{FactResolver, LocationResolution, Outcome};
use locallens::location::{Coordinates, IpLocator, Locator};
use locallens::session::{Session, SessionState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LocalLens: a fun fact and a photo about wherever you are.
///
/// Resolves a place (typed, given as coordinates, or detected from your IP)
/// and prints up to three Wikipedia facts about it.
///
/// Examples:
///   locallens "Eiffel Tower"
///   locallens --query "District of Columbia"
///   locallens --lat 48.8584 --lon 2.2945
///   locallens --auto
///   locallens --serve --port 8080
#[derive(Parser)]
#[command(name = "locallens", version, about, long_about = None)]
struct Cli {
    /// Place to look up (positional). Example: locallens Prague
    #[arg(index = 1)]
    query_positional: Option<String>,

    /// Place to look up (named). Example: --query "Golden Gate Bridge"
    #[arg(long, short = 'q')]
    query: Option<String>,

    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Detect the current position from your IP address.
    #[arg(long, short = 'a')]
    auto: bool,

    /// Nearby-search radii in meters, smallest first (e.g. 300,600,1200).
    #[arg(long)]
    radii: Option<String>,

    /// Config file (JSON). Defaults to <config dir>/locallens/config.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the JSON HTTP API instead of a one-shot lookup.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

enum Trigger {
    Query(String),
    Point(Coordinates),
    Locate,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locallens=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ── Configuration ───────────────────────────────────────────

    let mut config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    if let Some(ref radii) = cli.radii {
        let parsed = parse_radii(radii).and_then(|r| {
            config.search_radii_m = r;
            config.validate().map_err(|e| e.to_string())
        });
        if let Err(e) = parsed {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start runtime: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = runtime.block_on(locallens::server::start(&cli.host, cli.port, &config)) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // ── One-shot lookup ─────────────────────────────────────────

    let trigger = pick_trigger(&cli);
    let resolver = FactResolver::from_config(&config);
    let locator = IpLocator::new(&config);

    let mut session = Session::new();
    run(&mut session, trigger, &resolver, &locator);

    let Some(resolution) = session.resolution() else {
        // Only a failed locate leaves no resolution behind.
        eprintln!("Error: {}", session.error().unwrap_or("location unavailable"));
        eprintln!("  Try a place name instead: locallens \"Prague\"");
        std::process::exit(1);
    };

    eprint!("{}", render_cards(resolution));
    match serde_json::to_string_pretty(resolution) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Cannot serialize result: {}", e);
            std::process::exit(1);
        }
    }

    if session.state() == SessionState::Error {
        if let Some(err) = session.error() {
            eprintln!("Error: {}", err);
        }
        std::process::exit(1);
    }
}

fn pick_trigger(cli: &Cli) -> Trigger {
    // Priority: --query > positional > --lat/--lon > --auto > error

    if let Some(q) = cli.query.as_ref().or(cli.query_positional.as_ref()) {
        return Trigger::Query(q.clone());
    }

    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        return match Coordinates::new(lat, lon) {
            Ok(at) => Trigger::Point(at),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
    }

    if cli.auto {
        return Trigger::Locate;
    }

    eprintln!("Error: No location specified.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  locallens \"Eiffel Tower\"");
    eprintln!("  locallens --lat 48.8584 --lon 2.2945");
    eprintln!("  locallens --auto");
    eprintln!("  locallens --serve");
    std::process::exit(1);
}

fn run(session: &mut Session, trigger: Trigger, resolver: &FactResolver, locator: &dyn Locator) {
    let (id, result) = match trigger {
        Trigger::Query(q) => {
            let id = session.begin_resolving();
            (id, resolver.resolve_from_query(&q))
        }
        Trigger::Point(at) => {
            let id = session.begin_resolving();
            (id, resolver.resolve_from_coordinates(at))
        }
        Trigger::Locate => {
            let id = session.begin_locating();
            eprintln!("  Locating...");
            let at = match locator.locate() {
                Ok(at) => at,
                Err(e) => {
                    session.locate_failed(id, &e);
                    return;
                }
            };
            session.located(id);
            eprintln!("  \u{1F4CD} {}", at);
            (id, resolver.resolve_from_coordinates(at))
        }
    };
    session.finish(id, &result);
}

fn render_cards(resolution: &LocationResolution) -> String {
    let mut out = format!("\n  \u{1F30D} {}\n", resolution.place_name);
    if let Some(at) = resolution.coordinates {
        out.push_str(&format!("  \u{1F4D0} {}\n", at));
    }
    out.push('\n');

    for (i, card) in resolution.facts.iter().enumerate() {
        match resolution.outcome {
            Outcome::Found => out.push_str(&format!("  {}. {}\n", i + 1, card.title)),
            Outcome::NotFound | Outcome::Failed => {}
        }
        out.push_str(&format!("     {}\n", card.summary));
        if let Some(ref image) = card.image {
            out.push_str(&format!("     \u{1F5BC}  {}\n", image));
        }
        if let Some(ref link) = card.link {
            out.push_str(&format!("     \u{1F517} {}\n", link));
        }
        out.push('\n');
    }
    out
}
