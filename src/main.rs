use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iocraft::prelude::*;

use wf_board::app::App;
use wf_board::color::ColorDepth;
use wf_board::columns::workflow_columns;
use wf_board::config::loader;
use wf_board::config::types::AppConfig;
use wf_board::engine::snapshot::{read_snapshot, records_for_group};
use wf_board::engine::{Engine, Request, SnapshotEngine};
use wf_board::list::{ListOptions, render_lines};
use wf_board::theme::{Background, ResolvedTheme};

#[derive(Parser)]
#[command(name = "wf-board", version, about = "Workflow listing TUI")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    /// Group to open instead of the root listing.
    #[arg(short, long)]
    group: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Workflow snapshot (JSON). Defaults to `[defaults] snapshot`.
    #[arg(value_name = "SNAPSHOT")]
    snapshot: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the listing as plain text and exit.
    List {
        /// Workflow snapshot (JSON).
        snapshot: PathBuf,
        /// Group to list (default: root).
        #[arg(short, long, default_value = "")]
        group: String,
        /// Case-insensitive text filter.
        #[arg(short, long)]
        search: Option<String>,
        /// Exact tag filter.
        #[arg(short, long)]
        tag: Option<String>,
        /// Column id to sort by.
        #[arg(long, value_name = "ID")]
        sort: Option<String>,
        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
    },
}

fn run_list(config: &AppConfig, snapshot: &std::path::Path, opts: &ListOptions) -> Result<()> {
    let workflows = read_snapshot(snapshot)?;
    let records = records_for_group(&workflows, &opts.group);
    let registry = workflow_columns();
    let state = opts.view_state(&registry).context("invalid list options")?;
    let hidden: HashSet<String> = config.layout.hidden.iter().cloned().collect();
    for line in render_lines(&records, &registry, &state, &opts.group, &hidden) {
        println!("{line}");
    }
    Ok(())
}

fn main() -> Result<()> {
    // Install a panic hook that writes to a file, since the fullscreen TUI
    // swallows stderr.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        let msg = format!("{info}\n\n{backtrace}");
        let _ = std::fs::write("panic.log", &msg);
        eprintln!("{msg}");
    }));

    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    // Load config.
    let config = loader::load_config(cli.config.as_deref())?;

    if let Some(Commands::List {
        snapshot,
        group,
        search,
        tag,
        sort,
        desc,
    }) = cli.command
    {
        let opts = ListOptions {
            group,
            search,
            tag,
            sort,
            desc,
        };
        return run_list(&config, &snapshot, &opts);
    }

    let snapshot = cli
        .snapshot
        .or_else(|| config.defaults.snapshot.as_deref().map(loader::expand_tilde))
        .context("no snapshot given: pass SNAPSHOT or set [defaults] snapshot")?;
    anyhow::ensure!(
        snapshot.is_file(),
        "snapshot {} does not exist",
        snapshot.display()
    );

    // Detect terminal capabilities.
    let color_depth = ColorDepth::detect();
    let background = Background::detect();
    let theme = ResolvedTheme::resolve(&config.theme, background);

    // Start the snapshot engine in a dedicated OS thread (owns its own Tokio
    // runtime).
    let engine_handle = SnapshotEngine::new(snapshot.clone()).start();

    tracing::info!("wf-board starting on {}", snapshot.display());

    // Enter fullscreen TUI (iocraft uses smol internally).
    smol::block_on(
        element! {
            App(
                config: &config,
                engine: &engine_handle,
                theme: &theme,
                color_depth,
                initial_group: cli.group,
            )
        }
        .fullscreen(),
    )?;

    engine_handle.send(Request::Shutdown);
    Ok(())
}
