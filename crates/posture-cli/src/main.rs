//! posture-rep: run one head-turn repetition session from the command line.
//!
//! Landmarks come from a JSON-lines recording replayed at the target frame
//! rate. Without a recording the session runs on the simulated cycle.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use posture_core::SessionOutcome;
use posture_engine::{
    initialize_engine, landmark_channel, pump_estimator, EngineStatus, PostureConfig,
    PostureValidator, ReplayEstimator, SessionDriver, SessionEvent, SessionHandle,
};

#[derive(Parser, Debug)]
#[command(name = "posture-rep")]
#[command(about = "Count supine head-turn repetitions from pose landmarks")]
struct Args {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<String>,

    /// JSON-lines landmark recording; the simulated cycle runs when omitted
    #[arg(short, long)]
    frames: Option<PathBuf>,

    /// Frame rate for replay and processing
    #[arg(long)]
    fps: Option<u32>,

    /// Interval between simulated direction samples
    #[arg(long)]
    fallback_interval_ms: Option<u64>,

    /// Repetitions needed to complete the session
    #[arg(short, long)]
    required: Option<u32>,

    /// Give up if the session has not completed by then
    #[arg(long, default_value = "300")]
    timeout_secs: u64,
}

fn load_config(args: &Args) -> Result<PostureConfig> {
    let mut config = match &args.config {
        Some(path) => PostureConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => PostureConfig::from_env().context("Failed to load configuration")?,
    };

    if let Some(fps) = args.fps {
        config.session.target_fps = fps;
    }
    if let Some(ms) = args.fallback_interval_ms {
        config.session.fallback_interval_ms = ms;
    }
    if let Some(required) = args.required {
        config.session.required_count = required;
    }
    config.validate()?;

    Ok(config)
}

async fn watch_events(
    events: &mut broadcast::Receiver<SessionEvent>,
    handle: &SessionHandle,
) -> Result<SessionOutcome> {
    loop {
        match events.recv().await {
            Ok(SessionEvent::SessionCompleted { outcome }) => return Ok(outcome),
            Ok(SessionEvent::Stalled { silent_for }) => {
                bail!("No frames from estimator for {:.1}s", silent_for.as_secs_f64())
            }
            Ok(SessionEvent::RepetitionCompleted(count)) => {
                tracing::info!(count, "{}", handle.current_feedback());
            }
            Ok(SessionEvent::ModeChanged { mode, reason }) => {
                tracing::warn!(%mode, "Detection mode changed: {}", reason);
            }
            Ok(SessionEvent::DirectionChanged(direction)) => {
                tracing::debug!(%direction, "Direction changed");
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event receiver lagged");
            }
            Err(RecvError::Closed) => bail!("Session driver stopped unexpectedly"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let handle = SessionHandle::new(config.session.clone());
    let (feed, stream) = landmark_channel();

    let pump = match &args.frames {
        Some(path) => {
            let mut estimator =
                ReplayEstimator::from_jsonl(path, config.session.frame_interval())
                    .with_context(|| format!("Failed to read recording {}", path.display()))?;
            tracing::info!(frames = estimator.len(), "Loaded landmark recording");

            let status = initialize_engine(&mut estimator, &config.estimator).await;
            let ready = status.is_ready();
            handle.set_engine_status(status);
            ready.then(|| tokio::spawn(pump_estimator(estimator, feed.clone())))
        }
        None => {
            handle.set_engine_status(EngineStatus::Failed("no landmark source".into()));
            None
        }
    };

    let validator = PostureValidator::new(config.validator.clone());
    let driver = SessionDriver::new(handle.clone(), validator, config.session.fallback_interval())
        .spawn(stream);
    let mut events = driver.subscribe();

    let mode = handle.start()?;
    tracing::info!(
        %mode,
        required = config.session.required_count,
        "Session running: {}",
        handle.current_feedback()
    );

    let result = tokio::time::timeout(
        Duration::from_secs(args.timeout_secs),
        watch_events(&mut events, &handle),
    )
    .await;

    let state = handle.snapshot();
    let feedback = handle.current_feedback();
    handle.stop();
    driver.shutdown().await;
    if let Some(pump) = pump {
        pump.abort();
    }
    drop(feed);

    match result {
        Ok(Ok(outcome)) => {
            tracing::info!(
                ?outcome,
                count = state.repetition_count,
                elapsed_secs = state.elapsed().as_secs_f64(),
                "{}",
                feedback
            );
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(_) => bail!(
            "Session not completed within {}s ({}/{} repetitions)",
            args.timeout_secs,
            state.repetition_count,
            state.required_count
        ),
    }
}
