/*
 *  render.rs
 *
 *  WristFace - keeps on ticking
 *  (c) 2025-26 Stuart Hunter
 *
 *  Render target abstraction - the engine hands finished frames to
 *  whatever can draw them and never learns about pixels
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::error::Error;
use std::fmt;
use std::io::Write;

use crate::mode::RenderMode;
use crate::snapshot::FaceSnapshot;

/// Unified error type for render targets
#[derive(Debug)]
pub enum RenderError {
    /// Target gone or not ready (asleep, detached, mid-resize)
    TargetUnavailable(String),

    /// A draw call failed
    DrawFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TargetUnavailable(msg) =>
                write!(f, "Render target unavailable: {}", msg),
            RenderError::DrawFailed(msg) =>
                write!(f, "Draw failed: {}", msg),
        }
    }
}

impl Error for RenderError {}

/// Frame consumer - every render target implements this trait
///
/// A failed frame is the engine's to log and drop; render errors never
/// stop the tick loop.
pub trait Renderer: Send {
    fn render(&mut self, frame: &FaceSnapshot) -> Result<(), RenderError>;
}

/// Draws the face as one live line on stdout. Stands in for real display
/// hardware during development and demos.
pub struct ConsoleRenderer {
    frames: u64,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self { frames: 0 }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    fn face_line(frame: &FaceSnapshot) -> String {
        let t = &frame.time;
        // Colons disappear for the second half of every second.
        let colon = if t.blink_on { ':' } else { ' ' };
        let clock = format!(
            "{:02}{}{:02}{}{:02}",
            t.hour24, colon, t.minute, colon, t.second
        );
        let date = format!("{} {:04}-{:02}-{:02}", t.weekday, t.year, t.month, t.day);
        let weather = if frame.weather.has_data() {
            format!(
                "{} {}/{}",
                frame.icon,
                frame.weather.high.as_deref().unwrap_or("--"),
                frame.weather.low.as_deref().unwrap_or("--"),
            )
        } else {
            "awaiting sync".to_string()
        };
        let mode = match frame.mode {
            RenderMode::Interactive => "",
            RenderMode::Ambient => "  [ambient]",
            RenderMode::Mute => "  [mute]",
        };
        format!("{}  {}  {}{}", clock, date, weather, mode)
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&mut self, frame: &FaceSnapshot) -> Result<(), RenderError> {
        self.frames += 1;
        let mut out = std::io::stdout();
        write!(out, "\r\x1b[2K{}", Self::face_line(frame))
            .and_then(|_| out.flush())
            .map_err(|e| RenderError::DrawFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::build_snapshot;
    use crate::weather::WeatherSnapshot;
    use chrono::{Local, TimeZone};

    fn frame(mode: RenderMode, weather: &WeatherSnapshot) -> FaceSnapshot {
        let now = Local.with_ymd_and_hms(2025, 3, 8, 14, 3, 27).unwrap();
        build_snapshot(now, mode, weather)
    }

    #[test]
    fn test_face_line_unsynced() {
        let line = ConsoleRenderer::face_line(&frame(
            RenderMode::Interactive,
            &WeatherSnapshot::default(),
        ));
        assert!(line.starts_with("14:03:27"), "line was {:?}", line);
        assert!(line.contains("awaiting sync"));
        assert!(line.contains("2025-03-08"));
    }

    #[test]
    fn test_face_line_with_weather_and_mode() {
        let weather = WeatherSnapshot {
            high: Some("70°".to_string()),
            low: Some("48°".to_string()),
            condition_id: Some(800),
            updated_at_ms: 1_000,
        };
        let line = ConsoleRenderer::face_line(&frame(RenderMode::Mute, &weather));
        assert!(line.contains("clear 70°/48°"), "line was {:?}", line);
        assert!(line.ends_with("[mute]"));
    }

    #[test]
    fn test_colon_blink_in_line() {
        let mut snap = frame(RenderMode::Interactive, &WeatherSnapshot::default());
        snap.time.blink_on = false;
        let line = ConsoleRenderer::face_line(&snap);
        assert!(line.starts_with("14 03 27"), "line was {:?}", line);
    }
}
