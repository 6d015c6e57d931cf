//! throw-sim: headless runner for thrown-item scenarios.
//!
//! Usage:
//!   throw-sim run scenario.json [--policy policy.json] [--summary-only]
//!   throw-sim random --seed 42 [--policy policy.json] [--summary-only]
//!   throw-sim policy
//!
//! Step snapshots go to stdout as JSON lines, followed by a summary line.
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use throwing_core::config::ThrowPolicy;
use throwing_sim::scenario::Scenario;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("throwing_sim=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        bail!("no command given");
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "random" => cmd_random(&args[2..]),
        "policy" => cmd_policy(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }
}

fn print_usage() {
    eprintln!(
        "throw-sim: thrown-item projectile scenario runner\n\
         \n\
         Commands:\n\
         \n\
         run <scenario.json>   Run a scripted scenario\n\
         random --seed <N>     Run a seeded random scenario\n\
         policy                Print the default policy as JSON\n\
         \n\
         Options for run/random:\n\
         \n\
           --policy <path>     Policy file, overriding the scenario's own\n\
           --summary-only      Print only the final summary line\n\
         \n\
         Examples:\n\
         \n\
           throw-sim run tools/throw-sim/scenarios/boomerang.json\n\
           RUST_LOG=throwing_sim=debug throw-sim random --seed 7 --summary-only\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

// --- Commands ---

fn cmd_run(args: &[String]) -> Result<()> {
    let Some(path) = args.first().filter(|a| !a.starts_with("--")) else {
        bail!("run needs a scenario file");
    };
    let path = PathBuf::from(path);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario = Scenario::from_json_str(&json)
        .with_context(|| format!("parsing scenario {}", path.display()))?;
    execute(scenario, args)
}

fn cmd_random(args: &[String]) -> Result<()> {
    let seed = match flag_value(args, "--seed") {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("--seed must be an integer, got {raw:?}"))?,
        None => 42,
    };
    info!(seed, "generating random scenario");
    execute(Scenario::random(seed), args)
}

fn cmd_policy() -> Result<()> {
    println!("{}", ThrowPolicy::default().to_json_pretty()?);
    Ok(())
}

fn execute(mut scenario: Scenario, args: &[String]) -> Result<()> {
    if let Some(policy_path) = flag_value(args, "--policy") {
        let policy = ThrowPolicy::load(policy_path)
            .with_context(|| format!("loading policy {policy_path}"))?;
        scenario.policy = Some(policy);
    }
    let summary_only = has_flag(args, "--summary-only");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut write_error: Option<io::Error> = None;

    let summary = scenario.run(|snapshot| {
        if summary_only || write_error.is_some() {
            return;
        }
        let line = match serde_json::to_string(snapshot) {
            Ok(line) => line,
            Err(err) => {
                write_error = Some(err.into());
                return;
            }
        };
        if let Err(err) = writeln!(out, "{line}") {
            write_error = Some(err);
        }
    })?;
    if let Some(err) = write_error {
        return Err(err).context("writing snapshots");
    }

    writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    out.flush()?;
    Ok(())
}
