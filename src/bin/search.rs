//! Combo search binary.
//!
//! Type "Q" + Enter while a search runs to stop it and report the best
//! lines found so far.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};

use combo_search::report::{self, Report};
use combo_search::search::{merge_results, search_all, CancelToken};
use combo_search::{Evaluator, Scenario};

#[derive(Debug, Parser)]
#[command(name = "combo-search", about = "Search for the best combo line of a scenario")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write a debug log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the beam search over a scenario file and write a report
    Search {
        /// Scenario JSON path
        scenario: PathBuf,

        /// Bucket definitions JSON (overrides the scenario's buckets)
        #[arg(long)]
        buckets: Option<PathBuf>,

        /// Report path (defaults to reports/<scenario stem>.md)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    combo_search::log(level, args.log_file.as_deref()).context("initialise logging")?;

    match args.command {
        Command::Search {
            scenario,
            buckets,
            out,
        } => search(scenario, buckets, out),
    }
}

fn search(path: PathBuf, buckets: Option<PathBuf>, out: Option<PathBuf>) -> anyhow::Result<()> {
    let scenario = Scenario::load(&path)?;
    let db = scenario.database()?;
    let registry = scenario.registry();
    let evaluator = match buckets {
        Some(file) => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("read buckets {}", file.display()))?;
            Evaluator::from_json(&json)?
        }
        None => scenario.evaluator()?,
    };
    let roots = scenario.roots(&db)?;
    info!(
        "searching {} hand(s), depth {}, beam {}",
        roots.len(),
        scenario.search.max_depth,
        scenario.search.beam_width
    );

    let cancel = CancelToken::new();
    listen(cancel.clone());
    let results = search_all(&registry, &evaluator, &scenario.search, &roots, &cancel)?;
    let (lines, stats) = merge_results(&results, scenario.search.max_results);

    let report = Report::new(scenario.display_name(), roots.len(), &lines, stats);
    let out = out.unwrap_or_else(|| report::default_path(&path));
    report.write(&out)?;

    match report.best() {
        Some(best) => info!("best: {} in {} actions", best.data.summary, best.actions.len()),
        None => info!("no combo found"),
    }
    info!("report written to {}", out.display());
    Ok(())
}

/// Cancel `token` when "Q" is entered on stdin.
fn listen(token: CancelToken) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("q") {
                warn!("graceful interrupt requested, finishing current expansion...");
                token.cancel();
                break;
            }
        }
    });
}
