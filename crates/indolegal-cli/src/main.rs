//! IndoLegal - IPC to BNS benchmark playback CLI
//!
//! The `indolegal` command plays the scripted benchmark in a terminal.
//!
//! ## Commands
//!
//! - `simulate`: Play one scenario/model pair to its verdict
//! - `feed`: Stream the ambient adjudication feed
//! - `catalog`: List the scenario catalog
//! - `leaderboard`: Print the published comparison matrix
//! - `site`: Render the static page copy
//! - `check-catalog`: Validate an authored catalog file

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn, Level};

use indolegal_core::analytics::{self, LeaderboardRow, LEADERBOARD};
use indolegal_core::render;
use indolegal_core::site::Section;
use indolegal_core::{
    drive, Catalog, FeedEntry, ModelId, Pace, Page, PageEvent, PlaybackEvent, PlaybackState,
    RunOutcome, ScenarioId, SiteConfig,
};

#[derive(Parser)]
#[command(name = "indolegal")]
#[command(author = "IndoLegal-100 Research Group")]
#[command(version = indolegal_core::VERSION)]
#[command(about = "IPC to BNS benchmark playback", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// JSON config file (playback timings and feed settings)
    #[arg(long, global = true, env = "INDOLEGAL_CONFIG")]
    config: Option<PathBuf>,

    /// Scenario catalog to use instead of the built-in one
    #[arg(long, global = true, env = "INDOLEGAL_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one scenario against one model until the verdict
    Simulate {
        /// Scenario id (murder, suicide, lynching)
        #[arg(short, long, default_value = "murder")]
        scenario: ScenarioId,

        /// Model id (gpt-4o, llama-3, krutrim)
        #[arg(short, long, default_value = "gpt-4o")]
        model: ModelId,

        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Skip all waiting
        #[arg(long)]
        instant: bool,

        /// Print the final playback state as JSON instead of streaming
        #[arg(long)]
        state_json: bool,
    },

    /// Stream the ambient adjudication feed
    Feed {
        /// Number of entries to print before stopping
        #[arg(short = 'n', long, default_value_t = 10)]
        entries: u64,

        /// RNG seed for a reproducible feed
        #[arg(long)]
        seed: Option<u64>,

        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Skip all waiting
        #[arg(long)]
        instant: bool,
    },

    /// List every scenario/model pair with its recorded verdict
    Catalog {
        /// Dump the full catalog as JSON
        #[arg(long)]
        dump: bool,
    },

    /// Print the comparative performance matrix
    Leaderboard {
        /// Column to sort by (default: published rank)
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
    },

    /// Render the static page copy
    Site {
        /// Only render this section (home, simulator, methodology, analytics, team)
        #[arg(long)]
        section: Option<String>,
    },

    /// Validate a catalog file and print its digest
    CheckCatalog {
        /// Catalog JSON file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortKey {
    Accuracy,
    Bias,
    Safety,
    Logic,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    indolegal_core::init_tracing(cli.json, level);

    let config = SiteConfig::resolve(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Simulate {
            scenario,
            model,
            speed,
            instant,
            state_json,
        } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let pace = pace(speed, instant);
            let state = cmd_simulate(catalog, config, scenario, model, pace, !state_json).await?;
            if state_json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            }
            Ok(())
        }
        Commands::Feed {
            entries,
            seed,
            speed,
            instant,
        } => {
            let mut config = config;
            if seed.is_some() {
                config.feed.seed = seed;
            }
            cmd_feed(config, entries, pace(speed, instant), true).await?;
            Ok(())
        }
        Commands::Catalog { dump } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            cmd_catalog(&catalog, dump)
        }
        Commands::Leaderboard { sort } => cmd_leaderboard(sort),
        Commands::Site { section } => cmd_site(section.as_deref()),
        Commands::CheckCatalog { path } => cmd_check_catalog(&path),
    }
}

fn pace(speed: f64, instant: bool) -> Pace {
    if instant {
        Pace::instant()
    } else {
        Pace::new(speed)
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Arc<Catalog>> {
    let catalog = match path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };
    Ok(Arc::new(catalog))
}

/// Play one pair to a settled phase and return the final state.
async fn cmd_simulate(
    catalog: Arc<Catalog>,
    config: SiteConfig,
    scenario: ScenarioId,
    model: ModelId,
    pace: Pace,
    stream: bool,
) -> Result<PlaybackState> {
    let mut page = Page::new(catalog, config);
    page.mount_simulator();
    page.select_scenario(scenario)?;
    page.select_model(model)?;

    if stream {
        if let Ok(s) = page.catalog().scenario(scenario) {
            println!("{}", s.title);
            println!("Query: {}", s.query);
        }
    }

    match page.run() {
        RunOutcome::Started(run_id) => info!(%run_id, %scenario, %model, "simulation started"),
        RunOutcome::NotFound(err) => warn!(error = %err, "nothing to play"),
        RunOutcome::Ignored => {}
    }

    let mut stdout = std::io::stdout();
    let write_error: RefCell<Option<io::Error>> = RefCell::new(None);
    let summary = drive(
        &mut page,
        pace,
        |p| {
            write_error.borrow().is_some() || p.playback().map_or(true, |s| s.phase.is_settled())
        },
        |event| {
            if stream && write_error.borrow().is_none() {
                if let Err(err) = print_event(&mut stdout, event) {
                    *write_error.borrow_mut() = Some(err);
                }
            }
        },
    )
    .await;
    info!(
        steps = summary.steps,
        events = summary.events,
        virtual_ms = summary.stopped_at.as_millis() as u64,
        "simulation finished"
    );

    let state = page
        .playback()
        .cloned()
        .context("Simulator is not mounted")?;
    page.shutdown();
    if let Some(err) = write_error.into_inner() {
        return Err(err).context("Failed to write to stdout");
    }
    Ok(state)
}

fn print_event(out: &mut impl Write, event: &PageEvent) -> io::Result<()> {
    match event {
        PageEvent::Playback(PlaybackEvent::PhaseChanged { to, .. }) => {
            writeln!(out, "\n-- {to}")
        }
        PageEvent::Playback(PlaybackEvent::SearchIndicator) => {
            writeln!(out, "Searching the web...")
        }
        PageEvent::Playback(PlaybackEvent::CharRevealed(c)) => {
            write!(out, "{c}").and_then(|_| out.flush())
        }
        PageEvent::Playback(PlaybackEvent::LogLineRevealed(line)) => {
            write!(out, "{}", render::judge_log(std::slice::from_ref(line)))
        }
        PageEvent::Playback(PlaybackEvent::RubricRevealed(item)) => {
            write!(out, "{}", render::rubric(std::slice::from_ref(item)))
        }
        PageEvent::Playback(PlaybackEvent::Completed(outcome)) => {
            write!(out, "\n{}", render::verdict(outcome))
        }
        PageEvent::Playback(PlaybackEvent::NotFound { scenario, model }) => writeln!(
            out,
            "{}\nNo response for {model} on scenario {scenario}.",
            render::NOT_FOUND_TITLE
        ),
        PageEvent::Feed(entry) => writeln!(out, "{entry}"),
        PageEvent::Playback(_) => Ok(()),
    }
}

/// Run the feed alone until `count` entries have been produced.
async fn cmd_feed(config: SiteConfig, count: u64, pace: Pace, stream: bool) -> Result<Vec<FeedEntry>> {
    let catalog = Arc::new(Catalog::default());
    let mut page = Page::new(catalog, config);
    page.mount_feed();

    let mut collected = Vec::new();
    let mut stdout = std::io::stdout();
    let write_error: RefCell<Option<io::Error>> = RefCell::new(None);
    drive(
        &mut page,
        pace,
        |p| write_error.borrow().is_some() || p.feed().map_or(true, |f| f.emitted() >= count),
        |event| {
            if let PageEvent::Feed(entry) = event {
                if stream && write_error.borrow().is_none() {
                    if let Err(err) = print_event(&mut stdout, event) {
                        *write_error.borrow_mut() = Some(err);
                    }
                }
                collected.push(entry.clone());
            }
        },
    )
    .await;
    page.shutdown();
    if let Some(err) = write_error.into_inner() {
        return Err(err).context("Failed to write to stdout");
    }
    Ok(collected)
}

#[derive(Serialize)]
struct CatalogRow {
    scenario: ScenarioId,
    model: ModelId,
    verdict: &'static str,
    stamp: &'static str,
    score: String,
    search: bool,
}

fn catalog_rows(catalog: &Catalog) -> Vec<CatalogRow> {
    catalog
        .pairs()
        .into_iter()
        .filter_map(|(scenario, model)| {
            let response = catalog.response(scenario, model).ok()?;
            Some(CatalogRow {
                scenario,
                model,
                verdict: response.verdict.label(),
                stamp: response.verdict.stamp(),
                score: response.score.to_string(),
                search: response.search_triggered,
            })
        })
        .collect()
}

fn cmd_catalog(catalog: &Catalog, dump: bool) -> Result<()> {
    if dump {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }
    println!(
        "{:<10} {:<9} {:<15} {:<5} {:<6} {}",
        "SCENARIO", "MODEL", "VERDICT", "STAMP", "SCORE", "SEARCH"
    );
    for row in catalog_rows(catalog) {
        println!(
            "{:<10} {:<9} {:<15} {:<5} {:<6} {}",
            row.scenario,
            row.model,
            row.verdict,
            row.stamp,
            row.score,
            if row.search { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn sorted_leaderboard(sort: Option<SortKey>) -> Vec<LeaderboardRow> {
    match sort {
        None => LEADERBOARD.to_vec(),
        Some(SortKey::Accuracy) => analytics::ranked_by(&LEADERBOARD, |r| f32::from(r.accuracy)),
        // Lower bias ranks higher.
        Some(SortKey::Bias) => analytics::ranked_by(&LEADERBOARD, |r| -f32::from(r.legacy_bias)),
        Some(SortKey::Safety) => analytics::ranked_by(&LEADERBOARD, |r| f32::from(r.safety)),
        Some(SortKey::Logic) => analytics::ranked_by(&LEADERBOARD, |r| r.logic),
    }
}

fn cmd_leaderboard(sort: Option<SortKey>) -> Result<()> {
    let rows = sorted_leaderboard(sort);
    print!("{}", render::leaderboard(&rows)?);
    Ok(())
}

fn cmd_site(section: Option<&str>) -> Result<()> {
    let sections = match section {
        Some(anchor) => vec![Section::from_anchor(anchor)
            .with_context(|| format!("Unknown section '{anchor}'"))?],
        None => Section::ALL.to_vec(),
    };
    for section in sections {
        println!("{}", render::boundary(section.anchor(), || render::static_section(section)));
        if section == Section::Analytics {
            println!("{}", render::boundary("analytics", render::analytics_section));
        }
    }
    Ok(())
}

fn cmd_check_catalog(path: &Path) -> Result<()> {
    let catalog = Catalog::load(path)
        .with_context(|| format!("Catalog {} is invalid", path.display()))?;
    let digest = catalog.digest()?;
    println!("ok: {} scenarios, {} pairs", catalog.len(), catalog.pairs().len());
    println!("digest: {digest}");
    Ok(())
}
