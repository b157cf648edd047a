/// Interactive playback on the default output device
///
/// The engine is rendered from the device callback; everything else runs on
/// the tokio runtime: engine event polling, the level meter, progress
/// output, remote mode changes and keyboard commands read line by line.
use crate::library::{format_playlist, Library};
use duaelmix_audio::CpalOutput;
use duaelmix_core::SubIndex;
use duaelmix_playback::{Controller, LevelMeter};
use duaelmix_remote::{HttpModeClient, ModeChannel, RemoteConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};

const HELP: &str = "Commands: p pause/play, n next, b back, r repeat, 0/1 mode, l list, q quit";

/// What a keyboard command asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlaying,
    Next,
    Previous,
    ToggleRepeat,
    Mode(SubIndex),
    List,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "pause" | "play" => Some(Self::TogglePlaying),
            "n" | "next" => Some(Self::Next),
            "b" | "back" => Some(Self::Previous),
            "r" | "repeat" => Some(Self::ToggleRepeat),
            "0" => Some(Self::Mode(SubIndex::Driving)),
            "1" => Some(Self::Mode(SubIndex::Driven)),
            "l" | "list" => Some(Self::List),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub async fn run(library: &Library, repeat: bool, remote_url: Option<String>) -> anyhow::Result<()> {
    let sample_rate = CpalOutput::default_sample_rate()?;
    let controller = Arc::new(library.playback_controller(sample_rate)?);

    let engine = controller.engine();
    let _output = CpalOutput::new(Box::new(move |out: &mut [f32]| {
        // Never block the device thread; a missed lock renders silence
        match engine.try_lock() {
            Ok(mut engine) => engine.process_audio(out),
            Err(_) => out.fill(0.0),
        }
    }))?;

    controller.start().await?;
    if repeat {
        controller.toggle_repeat();
    }
    if let Some(url) = remote_url {
        follow_remote(library, &controller, url).await?;
    }

    controller.set_playing(true).await?;
    if !controller.is_playing() {
        println!("Nothing to play; add files first");
        return Ok(());
    }
    println!("{HELP}");

    let config = library.config().playback.clone();
    let mut meter = LevelMeter::new(config.meter_initial_level);
    let mut meter_tick = interval(config.meter_poll_interval);
    let mut decay_tick = interval(config.meter_decay_interval);
    let mut progress_tick = interval(config.progress_interval);
    for ticker in [&mut meter_tick, &mut decay_tick, &mut progress_tick] {
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => apply(&controller, command).await?,
                    None => println!("{HELP}"),
                }
            }
            _ = meter_tick.tick() => {
                controller.poll().await?;
                if controller.is_playing() {
                    meter.sample(controller.level()?);
                }
            }
            _ = decay_tick.tick() => {
                if !controller.is_playing() {
                    meter.decay();
                }
            }
            _ = progress_tick.tick() => print_status(&controller, &meter)?,
        }
    }

    controller.set_playing(false).await?;
    controller.flush_deletes().await;
    tracing::info!("Playback stopped");
    Ok(())
}

async fn follow_remote(library: &Library, controller: &Arc<Controller>, url: String) -> anyhow::Result<()> {
    let remote = &library.config().remote;
    let client = HttpModeClient::new(
        RemoteConfig::new(url, library.session_id()?).with_poll_interval(remote.poll_interval()),
    )?;
    println!("Remote driving: {}", client.mode_url(SubIndex::Driving));
    println!("Remote driven:  {}", client.mode_url(SubIndex::Driven));

    match client.subscribe().await {
        Ok(modes) => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move { controller.follow_modes(modes).await });
        }
        Err(e) => tracing::warn!("Remote control unavailable: {}", e),
    }
    Ok(())
}

async fn apply(controller: &Controller, command: Command) -> anyhow::Result<()> {
    match command {
        Command::TogglePlaying => controller.toggle_playing().await?,
        Command::Next => controller.next_track().await?,
        Command::Previous => controller.previous_track().await?,
        Command::ToggleRepeat => {
            let repeat = controller.toggle_repeat();
            println!("Repeat {}", if repeat { "on" } else { "off" });
        }
        Command::Mode(sub) => controller.select_sub_index(sub)?,
        Command::List => {
            let snapshot = controller.snapshot()?;
            println!("{}", format_playlist(&snapshot.playlist, snapshot.selected_index));
        }
        Command::Quit => {}
    }
    Ok(())
}

fn print_status(controller: &Controller, meter: &LevelMeter) -> anyhow::Result<()> {
    let snapshot = controller.snapshot()?;
    let Some(index) = snapshot.selected_index else {
        return Ok(());
    };

    let progress = snapshot.progress.unwrap_or(0.0);
    let bars = (meter.level() * 10.0).round() as usize;
    println!(
        "[{}] #{} {:>3.0}% mode {} level {:<10}{}",
        if snapshot.playing { "playing" } else { "paused " },
        index,
        progress * 100.0,
        snapshot.current_sub_index,
        "#".repeat(bars.min(10)),
        if snapshot.repeat { " (repeat)" } else { "" },
    );
    Ok(())
}
