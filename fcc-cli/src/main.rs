//! FCC Simulator CLI - launch a proton through an FCC lattice
//!
//! Plays the part of the control panel: fills in the form from flags,
//! presses launch, drives the frame loop until the proton leaves the
//! lattice, and prints what the result region would show.
//!
//! Usage:
//!     fcc-sim
//!     fcc-sim --velocity 3 4 0 --speed 0.25
//!     fcc-sim --position -4 -4 -4 --velocity 1 1 1 --no-normalize --json
//!     fcc-sim --offline 1.5 --trail-out trail.json
//!
//! Environment:
//!     FCC_PREDICT_URL          prediction endpoint
//!     FCC_PREDICT_TIMEOUT_MS   request timeout
//!     RUST_LOG                 log filter

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use fcc_client::{ClientConfig, FixedPredictionService, PredictionClient, PredictionOutcome};
use fcc_core::{SimState, SimulationConfig, SimulationContext, Snapshot, TickOutcome};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fcc-sim")]
#[command(about = "Launch a proton through an FCC lattice and query its stopping power")]
#[command(version)]
struct Args {
    /// Path to a simulation config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unit cells along each axis
    #[arg(long)]
    lattice_size: Option<usize>,

    /// Unit cell edge length
    #[arg(long)]
    unit_cell: Option<f64>,

    /// Start position (defaults to the lattice corner)
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_hyphen_values = true)]
    position: Option<Vec<String>>,

    /// Launch direction
    #[arg(long, num_args = 3, value_names = ["VX", "VY", "VZ"], allow_hyphen_values = true)]
    velocity: Option<Vec<String>>,

    /// Speed slider value
    #[arg(long)]
    speed: Option<f64>,

    /// Use the direction as typed instead of normalising it
    #[arg(long)]
    no_normalize: bool,

    /// Zoom slider value
    #[arg(long)]
    zoom: Option<f64>,

    /// Stop after this many frames even if the proton is still inside
    #[arg(long, default_value_t = 10_000)]
    max_frames: u64,

    /// Frame rate of the simulated display
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Pace frames in wall time instead of running them back to back
    #[arg(long)]
    realtime: bool,

    /// Skip the network and answer every prediction with this value
    #[arg(long, conflicts_with_all = ["endpoint", "no_predict"])]
    offline: Option<f64>,

    /// Do not request a prediction at all
    #[arg(long)]
    no_predict: bool,

    /// Prediction endpoint (overrides FCC_PREDICT_URL)
    #[arg(long)]
    endpoint: Option<String>,

    /// Write the trail as JSON to this path
    #[arg(long)]
    trail_out: Option<PathBuf>,

    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbose output (debug logs)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing (to stderr so it doesn't mix with the report)
    let default_filter = if args.verbose {
        "fcc_sim=debug,fcc_core=debug,fcc_client=debug"
    } else {
        "fcc_sim=info,fcc_core=info,fcc_client=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting FCC simulator v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let mut ctx = SimulationContext::new(config)?;
    apply_inputs(&mut ctx, &args);

    let client = build_client(&args)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<PredictionOutcome>();

    let ticket = match ctx.launch() {
        Ok(ticket) => ticket,
        Err(e) => {
            tracing::warn!("Launch aborted: {}", e);
            report(&ctx, &args, None, 0);
            return Ok(());
        }
    };

    let pending = client.as_ref().map(|c| c.dispatch(ticket.clone(), tx.clone()));
    drop(tx);

    let (frames, mut latency) = run_frames(&mut ctx, &args, &mut rx).await;

    // The frame loop never waits on the prediction; the report does
    if let Some(handle) = pending {
        if let Err(e) = handle.await {
            tracing::warn!("Prediction task failed: {}", e);
        }
    }
    latency = drain(&mut ctx, &mut rx).or(latency);

    if let Some(path) = &args.trail_out {
        let trail = serde_json::to_string_pretty(ctx.simulator().trail().points())?;
        std::fs::write(path, trail)?;
        tracing::info!("Trail written to {}", path.display());
    }

    report(&ctx, &args, latency, frames);
    Ok(())
}

fn load_config(args: &Args) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };

    if let Some(n) = args.lattice_size {
        config.lattice.lattice_size = n;
    }
    if let Some(u) = args.unit_cell {
        config.lattice.unit_cell_size = u;
    }
    config.validate()?;

    Ok(config)
}

fn apply_inputs(ctx: &mut SimulationContext, args: &Args) {
    if let Some(zoom) = args.zoom {
        ctx.set_zoom(zoom);
    }
    if let Some(speed) = args.speed {
        let settled = ctx.set_speed(speed);
        if settled != speed {
            tracing::warn!("Speed {} outside slider range; using {}", speed, settled);
        }
    }
    ctx.set_normalize(!args.no_normalize);

    if let Some(fields) = args.position.as_deref().and_then(three_fields) {
        if !ctx.set_position_fields(fields) {
            tracing::warn!("Position is not numeric; keeping {:?}", ctx.simulator().position());
        }
    }
    if let Some(fields) = args.velocity.as_deref().and_then(three_fields) {
        ctx.set_velocity_fields(fields);
    }
}

fn three_fields(values: &[String]) -> Option<[String; 3]> {
    match values {
        [x, y, z] => Some([x.clone(), y.clone(), z.clone()]),
        _ => None,
    }
}

fn build_client(args: &Args) -> Result<Option<PredictionClient>, Box<dyn std::error::Error>> {
    if args.no_predict {
        return Ok(None);
    }
    if let Some(value) = args.offline {
        return Ok(Some(PredictionClient::with_service(FixedPredictionService::stopping_power(value))));
    }

    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    tracing::info!("Prediction endpoint: {}", config.endpoint);

    Ok(Some(PredictionClient::new(&config)?))
}

/// Drive frames until the proton goes idle or the frame budget runs out
async fn run_frames(
    ctx: &mut SimulationContext,
    args: &Args,
    rx: &mut mpsc::UnboundedReceiver<PredictionOutcome>,
) -> (u64, Option<i64>) {
    let frame_time = Duration::from_secs_f64(1.0 / args.fps.max(1.0));
    let mut interval = tokio::time::interval(frame_time);
    let mut last = Instant::now();
    let mut frames = 0;
    let mut latency = None;

    while frames < args.max_frames && ctx.simulator().state() == SimState::Active {
        let elapsed = if args.realtime {
            interval.tick().await;
            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            elapsed
        } else {
            frame_time
        };

        frames += 1;
        if let TickOutcome::Exited { distance, .. } = ctx.frame_elapsed(elapsed) {
            tracing::info!(frames, distance, "Proton left the lattice");
        }

        latency = drain(ctx, rx).or(latency);
    }

    if ctx.simulator().state() == SimState::Active {
        tracing::warn!("Frame budget of {} exhausted with proton still active", args.max_frames);
    }
    (frames, latency)
}

/// Apply every prediction that has arrived; returns the latency of the last
/// one that reached the display
fn drain(ctx: &mut SimulationContext, rx: &mut mpsc::UnboundedReceiver<PredictionOutcome>) -> Option<i64> {
    let mut latency = None;
    while let Ok(outcome) = rx.try_recv() {
        let ms = outcome.latency_ms();
        if ctx.apply_prediction(outcome.sequence, outcome.result) {
            latency = Some(ms);
        }
    }
    latency
}

#[derive(Serialize)]
struct Report<'a> {
    atoms: usize,
    lattice_min: [f64; 3],
    lattice_max: [f64; 3],
    exit_radius: f64,
    speed_label: String,
    zoom_label: String,
    frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction_latency_ms: Option<i64>,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

fn report(ctx: &SimulationContext, args: &Args, latency: Option<i64>, frames: u64) {
    let snapshot = ctx.snapshot();

    if args.json {
        let bounds = ctx.lattice().bounds();
        let report = Report {
            atoms: ctx.lattice().len(),
            lattice_min: bounds.min.to_array(),
            lattice_max: bounds.max.to_array(),
            exit_radius: ctx.lattice().exit_radius(),
            speed_label: ctx.inputs().speed_label(),
            zoom_label: ctx.inputs().zoom_label(),
            frames,
            prediction_latency_ms: latency,
            snapshot: &snapshot,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing report: {}", e),
        }
        return;
    }

    let lattice = ctx.lattice();
    let scene = ctx.scene();
    println!("Lattice: {} atoms, {}³ cells of edge {}",
        lattice.len(), lattice.config().lattice_size, lattice.config().unit_cell_size);
    println!("  bounds  {:?} .. {:?}", lattice.bounds().min.to_array(), lattice.bounds().max.to_array());
    println!("  outline {:?} centred at {:?}", scene.outline.size.to_array(), scene.outline.center.to_array());
    println!("Speed {}  Zoom {}", ctx.inputs().speed_label(), ctx.inputs().zoom_label());
    println!();
    println!("Frames run:     {}", frames);
    println!("State:          {:?}", snapshot.state);
    println!("Position:       {:?}", snapshot.position.to_array());
    println!("Velocity:       {:?}", snapshot.velocity.to_array());
    println!("Trail points:   {}", snapshot.trail_length);
    println!("Path length:    {:.4}", snapshot.path_length);
    println!("From centre:    {:.4}", snapshot.distance_from_center);

    if !snapshot.prediction_text.is_empty() {
        println!();
        println!("{}", snapshot.prediction_text);
        if let Some(ms) = latency {
            println!("(answered in {} ms)", ms);
        }
    }
}
