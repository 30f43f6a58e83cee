//! Demo driver for the section tracker.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Load a document layout and restore any cached reading position.
//! - Replay a scripted scroll session against the tracker, logging every
//!   published snapshot.

use anyhow::{Context, Result, anyhow};
use scrollmark::config::{TrackerConfig, load_config};
use scrollmark::document::{DocumentLayout, SimulatedViewport};
use scrollmark::script::{ScriptCommand, parse_script};
use scrollmark::{Effect, SectionTracker, TrackerEvent, cache};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let (layout_path, script_path) = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %layout_path.display(),
        level = %config.log_level,
        reference_line = config.reference_line,
        "Starting reading session"
    );

    let layout = DocumentLayout::load(&layout_path)?;
    let viewport = SimulatedViewport::new(layout.clone());
    let mut tracker = SectionTracker::new(&config, layout.registry(), Box::new(viewport.clone()));

    let section_ids: Vec<String> = layout.sections.iter().map(|s| s.id.clone()).collect();
    tracker.subscribe(Box::new(move |state| {
        let summary = section_ids
            .iter()
            .map(|id| {
                let percent = state.progress_by_id.get(id).copied().unwrap_or(0.0);
                format!("{id}={percent:.0}%")
            })
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            active = state.active_id.as_deref().unwrap_or("-"),
            %summary,
            "Progress updated"
        );
    }));

    let mut clock = Instant::now();
    tracker.start(clock);

    if let Some(position) = cache::load_position(&layout_path) {
        info!(position, "Resuming from cached reading position");
        viewport.set_scroll(position);
        tracker.update(TrackerEvent::Scrolled {
            position: viewport.scroll(),
        });
    }

    let commands = match &script_path {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read script at {}", path.display()))?;
            parse_script(&data)?
        }
        None => default_sweep(&viewport),
    };
    info!(commands = commands.len(), "Replaying session");

    for command in commands {
        apply_command(command, &mut tracker, &viewport, &config, &mut clock);
    }

    cache::save_position(&layout_path, viewport.scroll());
    tracker.suspend();
    Ok(())
}

fn apply_command(
    command: ScriptCommand,
    tracker: &mut SectionTracker,
    viewport: &SimulatedViewport,
    config: &TrackerConfig,
    clock: &mut Instant,
) {
    match command {
        ScriptCommand::Scroll { position } => {
            viewport.set_scroll(position);
            tracker.update(TrackerEvent::Scrolled {
                position: viewport.scroll(),
            });
        }
        ScriptCommand::Resize { reference_line } => {
            tracker.update(TrackerEvent::Resized {
                reference_line: Some(reference_line),
            });
        }
        ScriptCommand::Jump { id } => match tracker.scroll_to_section(&id) {
            Ok(Effect::ScrollTo { position }) => {
                emulate_smooth_scroll(tracker, viewport, position, config.scroll_steps);
            }
            Err(err) => warn!(%err, "Navigation failed"),
        },
        ScriptCommand::Settle { delay_ms } => {
            *clock += Duration::from_millis(delay_ms);
            tracker.update(TrackerEvent::Tick(*clock));
        }
    }
}

/// Stand-in for the browser's smooth-scroll animation: step toward the
/// target with an ease-out curve, feeding each frame back to the tracker as
/// an ordinary scroll event.
fn emulate_smooth_scroll(
    tracker: &mut SectionTracker,
    viewport: &SimulatedViewport,
    target: f64,
    steps: u32,
) {
    let start = viewport.scroll();
    let steps = steps.max(1);
    for frame in 1..=steps {
        let t = frame as f64 / steps as f64;
        let eased = 1.0 - (1.0 - t).powi(3);
        viewport.set_scroll(start + (target - start) * eased);
        tracker.update(TrackerEvent::Scrolled {
            position: viewport.scroll(),
        });
    }
}

/// With no script, settle and then sweep once to the end of the document.
fn default_sweep(viewport: &SimulatedViewport) -> Vec<ScriptCommand> {
    let mut commands = vec![ScriptCommand::Settle { delay_ms: 250 }];
    let max = viewport.max_scroll();
    for step in 1..=10 {
        commands.push(ScriptCommand::Scroll {
            position: max * f64::from(step) / 10.0,
        });
    }
    commands
}

fn parse_args() -> Result<(PathBuf, Option<PathBuf>)> {
    let mut args = env::args().skip(1);
    let layout = args
        .next()
        .ok_or_else(|| anyhow!("Usage: scrollmark <layout.toml> [session.script]"))?;
    let layout = PathBuf::from(layout);
    if !layout.exists() {
        return Err(anyhow!("File not found: {}", layout.display()));
    }

    let script = match args.next() {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("File not found: {}", path.display()));
            }
            Some(path)
        }
        None => None,
    };
    Ok((layout, script))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
