use std::io::BufRead;
use std::thread;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::unbounded;
use serde_json::Value;
use substrate_gym_rs::low_level::HeadlessEngine;
use substrate_gym_rs::play::{
    action_map_for, input::ChannelInput, run_episode, InputFrame, LogRenderer, PlayOptions,
    Players,
};
use substrate_gym_rs::substrates::get_config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Plays a substrate from the terminal.
///
/// Type keys and press enter: w/a/s/d move, q/e turn, space interacts (zaps
/// in clean_up), x cleans, a tab switches player and `quit` ends the episode.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Play {
    /// Level name to load
    #[clap(long = "level_name", value_parser, default_value = "collaborative_cooking_impassable")]
    level_name: String,

    /// Observation to render
    #[clap(long, value_parser, default_value = "RGB")]
    observation: String,

    /// Settings as JSON string
    #[clap(long, value_parser, default_value = "{}")]
    settings: String,

    /// Print debug information
    #[clap(long, action)]
    verbose: bool,

    /// Print events
    #[clap(long = "print_events", action)]
    print_events: bool,

    /// Ticks per second, 0 for no limit
    #[clap(long, value_parser, default_value_t = 8)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Play::parse();
    let overrides: Value =
        serde_json::from_str(&args.settings).context("--settings is not valid JSON")?;
    let config = get_config(&args.level_name)?;

    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(InputFrame::parse_line(&line)).is_err() {
                break;
            }
        }
    });

    let report = run_episode(
        config,
        &overrides,
        |scene| Ok(HeadlessEngine::new(scene)?),
        ChannelInput::new(rx),
        LogRenderer::default(),
        action_map_for(&args.level_name),
        Players::default(),
        PlayOptions {
            render_observation: args.observation,
            fps: args.fps,
            print_events: args.print_events,
            verbose: args.verbose,
        },
    )?;
    info!(steps = report.steps, "episode finished");
    Ok(())
}
