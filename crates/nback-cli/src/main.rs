mod clock;
mod config;
mod display;
mod participant;
mod submit;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nback_core::{Modality, RecordOutcome, RoundReport, Session, TickOutcome};
use nback_store::Store;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::clock::{ClockEvent, SharedSession, run_round};
use crate::config::{Overrides, apply_overrides, data_dir, load_engine_config};
use crate::participant::SimulatedParticipant;

#[derive(Parser)]
#[command(name = "nback", about = "Dual n-back working-memory trainer")]
struct Cli {
    /// TOML file overriding engine parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play rounds interactively (l = position match, a = symbol match, q = quit)
    Play {
        /// Starting lag
        #[arg(long)]
        level: Option<usize>,

        /// Start from the level reached in the last recorded round
        #[arg(long, conflicts_with = "level")]
        resume: bool,

        /// Trials per round
        #[arg(long)]
        trials: Option<usize>,

        /// Milliseconds between trials
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Number of rounds to play
        #[arg(long, default_value_t = 1)]
        rounds: u32,

        /// Seed for the stimulus sequence
        #[arg(long)]
        seed: Option<u64>,

        /// Leaderboard endpoint to POST each round's score to
        #[arg(long)]
        submit: Option<String>,

        /// Do not record rounds
        #[arg(long)]
        no_save: bool,
    },

    /// Run rounds with a simulated participant
    Simulate {
        /// Number of rounds to run
        #[arg(long, default_value_t = 1)]
        rounds: u32,

        /// Starting lag
        #[arg(long)]
        level: Option<usize>,

        /// Trials per round
        #[arg(long)]
        trials: Option<usize>,

        /// Seed for stimuli and responses
        #[arg(long)]
        seed: Option<u64>,

        /// Probability of pressing on a true match
        #[arg(long, default_value_t = 0.9)]
        hit_rate: f64,

        /// Probability of pressing on a non-match
        #[arg(long, default_value_t = 0.05)]
        false_alarm_rate: f64,

        /// Print round reports as JSON lines
        #[arg(long)]
        json: bool,

        /// Do not record rounds
        #[arg(long)]
        no_save: bool,
    },

    /// Show the best level reached
    Best,

    /// Show recent rounds
    History {
        /// Number of rounds to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn open_store() -> Result<Store> {
    let dir = data_dir();
    Store::open_in_dir(&dir).with_context(|| format!("failed to open store in {}", dir.display()))
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Play {
            level,
            resume,
            trials,
            interval_ms,
            rounds,
            seed,
            submit,
            no_save,
        } => {
            let overrides = Overrides {
                level: *level,
                trials: *trials,
                interval_ms: *interval_ms,
            };
            let opts = PlayOptions {
                resume: *resume,
                rounds: *rounds,
                seed: *seed,
                submit: submit.clone(),
                save: !*no_save,
            };
            cmd_play(&cli, overrides, opts).await
        }
        Commands::Simulate {
            rounds,
            level,
            trials,
            seed,
            hit_rate,
            false_alarm_rate,
            json,
            no_save,
        } => {
            let overrides = Overrides {
                level: *level,
                trials: *trials,
                interval_ms: None,
            };
            let participant = SimulatedParticipant::new(*hit_rate, *false_alarm_rate)?;
            cmd_simulate(&cli, overrides, participant, *rounds, *seed, *json, !*no_save)
        }
        Commands::Best => cmd_best(),
        Commands::History { limit, json } => cmd_history(*limit, *json),
    }
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

struct PlayOptions {
    resume: bool,
    rounds: u32,
    seed: Option<u64>,
    submit: Option<String>,
    save: bool,
}

async fn cmd_play(cli: &Cli, overrides: Overrides, opts: PlayOptions) -> Result<()> {
    let config = apply_overrides(load_engine_config(cli.config.as_deref())?, overrides);
    let store = if opts.save || opts.resume {
        Some(open_store()?)
    } else {
        None
    };

    let start_level = match (&store, opts.resume) {
        (Some(store), true) => store
            .last_level()
            .context("failed to read last level")?
            .unwrap_or(config.initial_level),
        _ => config.initial_level,
    };
    // A store opened only to resume is never written to.
    let store = store.filter(|_| opts.save);

    let grid_size = config.grid_size;
    let interval = Duration::from_millis(config.trial_interval_ms);
    let session =
        Session::with_level(config, start_level).context("invalid engine configuration")?;
    println!(
        "dual {}-back: l + Enter for a position match, a + Enter for a letter match, q to quit",
        session.level()
    );
    let session: SharedSession = Arc::new(Mutex::new(session));

    let cancel = CancellationToken::new();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let ClockEvent::Presented {
                index,
                total,
                level,
                trial,
            } = event
            {
                print!(
                    "{}",
                    display::render_trial(index, total, level, &trial, grid_size)
                );
            }
        }
    });
    let input = spawn_input(session.clone(), cancel.clone());
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                r = tokio::signal::ctrl_c() => {
                    if r.is_ok() {
                        tracing::info!("interrupted, stopping");
                        cancel.cancel();
                    }
                }
            }
        })
    };

    let client = reqwest::Client::new();
    let mut rng = make_rng(opts.seed);

    for round in 1..=opts.rounds {
        let Some(report) = run_round(&session, &mut rng, interval, &cancel, &events_tx).await
        else {
            println!("stopped.");
            break;
        };
        println!("{}", display::format_report(round, &report));
        finish_round(store.as_ref(), &client, opts.submit.as_deref(), &report).await;
    }

    cancel.cancel();
    drop(events_tx);
    let _ = renderer.await;
    let _ = input.await;
    let _ = interrupt.await;

    if let Some(store) = &store
        && let Some(best) = store.best_level().context("failed to read best level")?
    {
        println!("best level: {best}");
    }
    Ok(())
}

async fn finish_round(
    store: Option<&Store>,
    client: &reqwest::Client,
    submit_url: Option<&str>,
    report: &RoundReport,
) {
    if let Some(store) = store
        && let Err(e) = store.record_round(report)
    {
        tracing::error!("failed to record round: {e}");
    }

    if let Some(url) = submit_url {
        match submit::submit_score(client, url, report).await {
            Ok(Some(percentile)) => println!("top {:.0}% of players", 100.0 - percentile),
            Ok(None) => {}
            Err(e) => tracing::warn!("score submission failed: {e:#}"),
        }
    }
}

/// Read stdin on a dedicated thread (blocking reads would stall runtime
/// shutdown) and forward presses to the session.
fn spawn_input(session: SharedSession, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => break,
                line = line_rx.recv() => line,
            };
            let Some(line) = line else {
                tracing::info!("stdin closed, stopping");
                cancel.cancel();
                break;
            };
            for token in line.split_whitespace() {
                if matches!(token, "q" | "quit") {
                    cancel.cancel();
                    return;
                }
                let outcome = session.lock().await.record_token(token);
                match outcome {
                    Ok(RecordOutcome::Scored(_) | RecordOutcome::Acknowledged) => {
                        if let Ok(modality) = token.parse::<Modality>() {
                            println!("  {modality} noted");
                        }
                    }
                    Ok(RecordOutcome::AlreadyResponded | RecordOutcome::Inactive) => {}
                    Err(_) => {
                        eprintln!("unknown key '{token}' (l = position, a = letter, q = quit)")
                    }
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// simulate / best / history
// ---------------------------------------------------------------------------

fn cmd_simulate(
    cli: &Cli,
    overrides: Overrides,
    participant: SimulatedParticipant,
    rounds: u32,
    seed: Option<u64>,
    json: bool,
    save: bool,
) -> Result<()> {
    let config = apply_overrides(load_engine_config(cli.config.as_deref())?, overrides);
    let mut session = Session::new(config).context("invalid engine configuration")?;
    let store = if save { Some(open_store()?) } else { None };

    let mut stimuli = make_rng(seed);
    let mut responses = make_rng(seed.map(|s| s.wrapping_add(1)));

    for round in 1..=rounds {
        session.start(&mut stimuli);
        let report = loop {
            participant.respond(&mut session, &mut responses);
            if let TickOutcome::RoundEnded(report) = session.tick(&mut stimuli) {
                break report;
            }
        };

        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", display::format_report(round, &report));
        }
        if let Some(store) = &store {
            store.record_round(&report).context("failed to record round")?;
        }
    }

    if !json {
        println!("final level: {}", session.level());
        if let Some(store) = &store
            && let Some(best) = store.best_level()?
        {
            println!("best level: {best}");
        }
    }
    Ok(())
}

fn cmd_best() -> Result<()> {
    let store = open_store()?;
    match store.best_level().context("failed to read best level")? {
        Some(best) => println!("best level: {best}"),
        None => println!("no rounds recorded"),
    }
    Ok(())
}

fn cmd_history(limit: usize, json: bool) -> Result<()> {
    let store = open_store()?;
    let rounds = store
        .recent_rounds(limit)
        .context("failed to load rounds")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rounds)?);
        return Ok(());
    }
    if rounds.is_empty() {
        println!("no rounds recorded");
        return Ok(());
    }
    for round in &rounds {
        println!("{}", display::format_stored(round));
    }
    Ok(())
}
