//! `trundle` – interactive console for the behavior stack.
//!
//! This binary wires the full stack together over the simulated drivers:
//!
//! 1. Loads (or creates) `~/.trundle/config.toml`.
//! 2. Builds the HAL, the notice bus, the medium arbiter, the mode
//!    supervisor, and a dispatcher pumping two command sources: this
//!    console (standing in for the web operator) and a voice channel.
//! 3. Reads console commands (`w/a/s/d/x`, `auto`, `find <object>`,
//!    `follow`, …) until `quit` or **Ctrl-C**, then cancels everything and
//!    force-stops the motors before exiting.

mod config;
mod console;

use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::info;

use trundle_hal::{Announcer, MotorDriver, ScriptedRangeArray, ScriptedVision, SimMotor};
use trundle_kernel::{MediumArbiter, ModeSupervisor};
use trundle_middleware::{NoticeBus, command_channel};
use trundle_runtime::{BehaviorContext, BehaviorSettings, Dispatcher, step_queue};
use trundle_types::{DistanceSample, Medium};

use console::ConsoleInput;

/// Speaks by printing, the console stands in for the speech engine.
struct ConsoleAnnouncer;

#[async_trait]
impl Announcer for ConsoleAnnouncer {
    async fn say(&self, text: &str) {
        println!("  {} {}", "robot:".bold().magenta(), text.italic());
    }
}

#[tokio::main]
async fn main() {
    trundle_runtime::init_tracing();
    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  Default config written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Config error".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    // ── Hardware (simulated) ──────────────────────────────────────────────
    // Open space on all sides; swap these for real drivers on the chassis.
    let motor = Arc::new(SimMotor::new());
    let range = Arc::new(ScriptedRangeArray::steady(DistanceSample {
        front: 120.0,
        left: 120.0,
        right: 120.0,
        back: 120.0,
    }));
    let vision = Arc::new(ScriptedVision::new());
    let announcer = Arc::new(ConsoleAnnouncer);

    // ── Core services ─────────────────────────────────────────────────────
    let bus = NoticeBus::default();
    let (steps_tx, steps) = step_queue();
    let ctx = BehaviorContext {
        motor: motor.clone(),
        range,
        vision,
        announcer,
        bus: bus.clone(),
        steps,
        settings: BehaviorSettings {
            safe_distance_cm: cfg.safe_distance_cm,
            follow_distance_cm: cfg.follow_distance_cm,
            max_lost_frames: cfg.max_lost_frames,
        },
    };
    let arbiter = Arc::new(MediumArbiter::new());
    let supervisor = Arc::new(ModeSupervisor::new());
    let dispatcher = Dispatcher::new(arbiter, supervisor.clone(), ctx, steps_tx);

    let shutdown = CancellationToken::new();

    // ── Command sources ───────────────────────────────────────────────────
    // The console feeds the web channel; the voice channel is wired up and
    // pumped so a voice pipeline can be attached without touching the core.
    let (console_tx, console_rx) = command_channel();
    let (_voice_tx, voice_rx) = command_channel();
    {
        let d = dispatcher.clone();
        let cancel = shutdown.clone();
        tokio::spawn(async move { d.pump(Medium::Web, console_rx, cancel).await });
    }
    {
        let d = dispatcher.clone();
        let cancel = shutdown.clone();
        tokio::spawn(async move { d.pump(Medium::Voice, voice_rx, cancel).await });
    }

    // ── Notice printer ────────────────────────────────────────────────────
    {
        let mut notices = bus.subscribe();
        let cancel = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = notices.recv() => match event {
                        Ok(event) => {
                            let payload = serde_json::to_string(&event.payload)
                                .unwrap_or_else(|_| "<unprintable>".to_string());
                            println!("  {} {}", "notice:".dimmed(), payload.dimmed());
                        }
                        // Slow printer; skip what was lost and keep going.
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    println!();
    println!("  Type {} for a list of commands.\n", "help".bold().cyan());

    // ── Console loop ──────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "  Ctrl-C received, shutting down.".yellow().bold());
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                // Stdin closed.
                Ok(None) | Err(_) => break,
            },
        };

        match console::parse_line(&line) {
            ConsoleInput::Command(msg) => {
                if console_tx.send(msg).await.is_err() {
                    break;
                }
            }
            ConsoleInput::Help => println!("{}", console::HELP),
            ConsoleInput::Empty => {}
            ConsoleInput::Unknown(line) => {
                println!("  Unknown command {:?}. Type {} for help.", line, "help".bold());
            }
            ConsoleInput::Quit => break,
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────
    shutdown.cancel();
    supervisor.shutdown().await;
    // Behaviors stop the motors on their own way out; this covers the case
    // where none was running.
    motor.stop();
    info!("shutdown complete");
    println!("{}", "  Motors stopped. Bye.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __                       ____    "#.bold().cyan());
    println!("{}", r#"  / /________  ______  ____/ / /__  "#.bold().cyan());
    println!("{}", r#" / __/ ___/ / / / __ \/ __  / / _ \ "#.bold().cyan());
    println!("{}", r#"/ /_/ /  / /_/ / / / / /_/ / /  __/ "#.bold().cyan());
    println!("{}", r#"\__/_/   \__,_/_/ /_/\__,_/_/\___/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "trundle".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Behavior console for a small autonomous robot");
    println!();
}
