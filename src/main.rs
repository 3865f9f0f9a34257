/*
 *  main.rs
 *
 *  WristFace - keeps on ticking
 *	(c) 2025-26 Stuart Hunter
 *
 *	TODO:
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::sync::Arc;

use chrono::Utc;
use env_logger::Env;
use log::info;
use tokio::time::{sleep, Duration};

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use wristface::config;
use wristface::engine::FaceEngine;
use wristface::render::ConsoleRenderer;
use wristface::simlink::{SimLink, SimLinkConfig};
use wristface::SystemClock;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// The host environment's ambient signal: one tick at the top of each
/// minute, delivered whether or not our own scheduler is running.
async fn minute_ticks(handle: &wristface::FaceHandle) {
    loop {
        let to_minute = 60_000 - (Utc::now().timestamp_millis() % 60_000) as u64;
        sleep(Duration::from_millis(to_minute)).await;
        handle.ambient_tick().await;
    }
}

fn sim_config(cfg: &config::Config) -> SimLinkConfig {
    let mut sim = SimLinkConfig::default();
    if let Some(link) = cfg.link.as_ref() {
        if let Some(v) = link.connect_delay_ms { sim.connect_delay_ms = v; }
        if let Some(v) = link.result_delay_ms  { sim.result_delay_ms = v; }
        if let Some(v) = link.weather_delay_ms { sim.weather_delay_ms = v; }
        if let Some(v) = link.failure_rate     { sim.failure_rate = v; }
    }
    sim
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load()?;

    env_logger::Builder::from_env(
        Env::default().default_filter_or(cfg.log_level.as_deref().unwrap_or("info")),
    )
    .format_timestamp_secs()
    .init();

    info!("This {} keeps on ticking", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let sim = sim_config(&cfg);
    let handle = FaceEngine::spawn(
        Arc::new(SystemClock),
        Box::new(ConsoleRenderer::new()),
        move |events| Box::new(SimLink::new(sim, events)),
    );

    // The face goes straight on screen; this also brings the link up and
    // kicks off the first weather sync.
    handle.set_visible(true).await;

    tokio::select! {
        _ = signal_handler() => {}
        _ = minute_ticks(&handle) => {}
    }

    println!();
    handle.shutdown().await;
    Ok(())
}
