//! Abyssal Tentacles headless driver
//!
//! Runs a scripted session: the target orbits the starting point and the
//! pointer is held for two seconds out of every four. Windowing and drawing
//! belong to the host application; this binary only exercises the simulation.
//!
//! Usage: abyssal-tentacles [--settings FILE] [--seed N] [--ticks N] [--dump]

use std::process::ExitCode;

use glam::{Vec2, Vec3};

use abyssal_tentacles::Settings;
use abyssal_tentacles::renderer::{SegmentLists, collect_segments};
use abyssal_tentacles::sim::{BridgeStatus, SimState, TickInput, clamp_frame_dt, tick};

/// Frame step of the scripted session
const FRAME_DT: f32 = 1.0 / 60.0;
/// Radius of the target's orbit around the start point
const ORBIT_RADIUS: f32 = 220.0;
/// Frames between snapshot dumps
const DUMP_EVERY: u64 = 60;

#[derive(Debug, Default)]
struct Args {
    settings: Option<String>,
    seed: Option<u64>,
    ticks: u64,
    dump: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        ticks: 600,
        ..Default::default()
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--settings" => args.settings = Some(it.next().ok_or("--settings needs a path")?),
            "--seed" => {
                let v = it.next().ok_or("--seed needs a value")?;
                args.seed = Some(v.parse().map_err(|e| format!("bad seed {v}: {e}"))?);
            }
            "--ticks" => {
                let v = it.next().ok_or("--ticks needs a value")?;
                args.ticks = v.parse().map_err(|e| format!("bad tick count {v}: {e}"))?;
            }
            "--dump" => args.dump = true,
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(args)
}

/// Input for frame `n` of the scripted session
fn scripted_input(n: u64, origin: Vec2) -> TickInput {
    let t = n as f32 * FRAME_DT;
    let angle = t * 0.8;
    TickInput {
        target: Some(origin + Vec2::new(angle.cos(), angle.sin()) * ORBIT_RADIUS),
        active: (t / 2.0) as u64 % 2 == 0,
        // Fire the bridge every five seconds; cooldown decides whether it takes
        trigger_bridge: n % 300 == 150,
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    let origin = Vec2::new(640.0, 360.0);
    let mut state = SimState::new(&settings, origin);
    let mut lists = SegmentLists::default();
    let mut tips: Vec<Vec3> = Vec::new();
    let mut bridge_points: Vec<Vec2> = Vec::new();
    let mut peak_bridge_points = 0;
    log::info!("Running {} ticks with seed {}", args.ticks, settings.seed);

    for n in 0..args.ticks {
        let input = scripted_input(n, origin);
        tick(&mut state, &input, clamp_frame_dt(FRAME_DT));

        lists.clear();
        for tentacle in state.field.tentacles() {
            collect_segments(tentacle, &mut lists);
        }
        lists.sort_for_drawing();
        if lists.is_empty() {
            log::warn!("Frame {n} produced no tentacle links");
        }

        tips.clear();
        tips.extend(state.field.tips());
        let source = state.field.core().pos.truncate();
        bridge_points.clear();
        bridge_points.extend(state.bridge.particles().iter().filter_map(|p| {
            let tip = tips.get(p.tip_index)?;
            Some(p.position(source, tip.truncate(), state.bridge.progress))
        }));
        peak_bridge_points = peak_bridge_points.max(bridge_points.len());

        if args.dump && state.ticks % DUMP_EVERY == 0 {
            println!("{}", serde_json::to_string(&state.snapshot())?);
        }
    }

    let core = state.field.core();
    let status = match state.bridge.status(state.time_ms) {
        BridgeStatus::Ready => "ready".to_string(),
        BridgeStatus::Active => "active".to_string(),
        BridgeStatus::Recharging { remaining_secs } => format!("recharging ({remaining_secs:.1}s)"),
    };
    log::info!(
        "Done: core at ({:.1}, {:.1}), ring offset {:.3}, {} links ({} behind core), bridge {} (peak {} particles)",
        core.pos.x,
        core.pos.y,
        state.field.ring_offset(),
        lists.len(),
        lists.back.len(),
        status,
        peak_bridge_points
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Abyssal Tentacles (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            eprintln!("usage: abyssal-tentacles [--settings FILE] [--seed N] [--ticks N] [--dump]");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
