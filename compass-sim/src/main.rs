mod services;

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use compass_logic::{Coords, Live, PermissionStatus, prelude::*};
use log::{LevelFilter, info, warn};
use tokio::sync::mpsc;

use services::{Answer, ChannelSender, ReplayLocation, ScriptedPermissions, SimEvent, read_samples};

type SimLive = Live<ScriptedPermissions, ReplayLocation, ChannelSender>;

#[derive(Parser)]
/// Run the live compass screen against a simulated device, printing every view it renders as JSON
struct Cli {
    /// Answer to the permission check made when the screen mounts
    #[arg(long, value_enum, default_value_t = Answer::Granted)]
    permission: Answer,

    /// Answer given when the user presses "Enable", omit to never press it
    #[arg(long, value_enum)]
    request: Option<Answer>,

    /// Heading in degrees for one sample, repeat for more samples
    #[arg(long = "heading", allow_negative_numbers = true)]
    headings: Vec<f64>,

    /// Altitude in meters used for `--heading` samples
    #[arg(long, default_value_t = 0.0)]
    altitude: f64,

    /// Speed in meters per second used for `--heading` samples
    #[arg(long, default_value_t = 0.0)]
    speed: f64,

    /// JSON file with an array of samples, replayed after any `--heading` samples
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Time between samples
    #[arg(long, default_value_t = 250)]
    interval_ms: u64,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_samples(&self) -> Result<Vec<Coords>> {
        let mut samples = self
            .headings
            .iter()
            .map(|&heading| Coords {
                altitude: Some(self.altitude),
                speed: Some(self.speed),
                heading: Some(heading),
            })
            .collect::<Vec<_>>();

        if let Some(path) = &self.samples {
            samples.extend(read_samples(path)?);
        }

        Ok(samples)
    }
}

/// Print the current view, returns whether this was a state update
async fn report(live: &SimLive, event: SimEvent) -> Result<bool> {
    match event {
        SimEvent::Update => {
            let view = live.get_view().await;
            let encoded = serde_json::to_string(&view).context("Failed to encode view")?;
            println!("{encoded}");
            Ok(true)
        }
        SimEvent::Bounce(bounce) => {
            info!(
                "Direction changed, bouncing to {} for {:?}",
                bounce.peak_scale,
                bounce.total_duration()
            );
            Ok(false)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    colog::default_builder().filter_level(level).init();

    let samples = cli.load_samples()?;
    let sample_count = samples.len();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let live = Arc::new(SimLive::new(
        ScriptedPermissions {
            check: cli.permission,
            request: cli.request.unwrap_or(Answer::Fail),
        },
        ReplayLocation::new(samples, Duration::from_millis(cli.interval_ms)),
        ChannelSender(events_tx),
    ));

    let mut handle = tokio::spawn({
        let live = live.clone();
        async move { live.main_loop().await }
    });

    // Mounting always resolves the permission check with one update
    while let Some(event) = events_rx.recv().await {
        if report(&live, event).await? {
            break;
        }
    }

    let status = live.clone_state().await.status();
    if status == PermissionStatus::Undetermined && cli.request.is_some() {
        info!("Pressing \"Enable\"");
        live.request_permission().await;
        while let Ok(event) = events_rx.try_recv() {
            report(&live, event).await?;
        }
    }

    let status = live.clone_state().await.status();
    if status.is_granted() {
        let mut remaining = sample_count;
        while remaining > 0 {
            tokio::select! {
                event = events_rx.recv() => {
                    let Some(event) = event else { break };
                    if report(&live, event).await? {
                        remaining -= 1;
                    }
                }
                res = &mut handle => {
                    return res.context("Live screen panicked")?;
                }
            }
        }
    } else {
        warn!("Location permission is {status:?}, not tracking");
    }

    live.unmount();
    handle.await.context("Live screen panicked")?
}
