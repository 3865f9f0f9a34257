/*
 *  mode.rs
 *
 *  WristFace - keeps on ticking
 *  (c) 2025-26 Stuart Hunter
 *
 *  Face mode state - collapses the host's visible/ambient/muted flags
 *  into a render mode and the cadence the tick scheduler should run at
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

use crate::constants::{INTERACTIVE_UPDATE_RATE_MS, MUTE_UPDATE_RATE_MS};

/// Collapsed render mode handed to the renderer with every frame.
///
/// Ambient wins over mute: a muted face that enters ambient renders as
/// ambient until the host wakes it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Face is on screen and fully animated.
    Interactive,
    /// Low-power always-on state; redraws arrive from the host roughly
    /// once a minute, never from our own timer.
    Ambient,
    /// Notifications muted; the face keeps ticking at a relaxed cadence.
    Mute,
}

/// Host-reported display flags.
///
/// Setters are idempotent and report whether the flag actually flipped, so
/// the engine only recomputes the schedule on real transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeState {
    visible: bool,
    ambient: bool,
    muted: bool,
}

impl ModeState {
    /// Fresh state: hidden, non-ambient, unmuted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visibility change. Returns true if the flag flipped.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        log::info!("face {}", if visible { "visible" } else { "hidden" });
        true
    }

    /// Record an ambient transition. Returns true if the flag flipped.
    pub fn set_ambient(&mut self, ambient: bool) -> bool {
        if self.ambient == ambient {
            return false;
        }
        self.ambient = ambient;
        log::info!(
            "ambient {}",
            if ambient { "entered" } else { "exited" }
        );
        true
    }

    /// Record a mute change. Returns true if the flag flipped.
    pub fn set_muted(&mut self, muted: bool) -> bool {
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        log::info!("notifications {}", if muted { "muted" } else { "unmuted" });
        true
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn ambient(&self) -> bool {
        self.ambient
    }

    /// Collapse the flags into the mode the renderer sees.
    pub fn render_mode(&self) -> RenderMode {
        if self.ambient {
            RenderMode::Ambient
        } else if self.muted {
            RenderMode::Mute
        } else {
            RenderMode::Interactive
        }
    }

    /// Tick period for the scheduler, in ms.
    ///
    /// Tracks mute alone. Ambient never slows the timer; it stops it via
    /// `should_schedule_run`, and the rate here is simply what the timer
    /// resumes at when ambient ends.
    pub fn effective_interval_ms(&self) -> u64 {
        if self.muted {
            MUTE_UPDATE_RATE_MS
        } else {
            INTERACTIVE_UPDATE_RATE_MS
        }
    }

    /// Whether the self-driven tick loop should be armed right now.
    pub fn should_schedule_run(&self) -> bool {
        self.visible && !self.ambient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(visible: bool, ambient: bool, muted: bool) -> ModeState {
        let mut s = ModeState::new();
        s.set_visible(visible);
        s.set_ambient(ambient);
        s.set_muted(muted);
        s
    }

    #[test]
    fn test_mode_table() {
        // (visible, ambient, muted) -> (mode, runs)
        let cases = [
            ((false, false, false), (RenderMode::Interactive, false)),
            ((false, false, true), (RenderMode::Mute, false)),
            ((false, true, false), (RenderMode::Ambient, false)),
            ((false, true, true), (RenderMode::Ambient, false)),
            ((true, false, false), (RenderMode::Interactive, true)),
            ((true, false, true), (RenderMode::Mute, true)),
            ((true, true, false), (RenderMode::Ambient, false)),
            ((true, true, true), (RenderMode::Ambient, false)),
        ];
        for ((v, a, m), (mode, runs)) in cases {
            let s = state(v, a, m);
            assert_eq!(s.render_mode(), mode, "mode for ({v},{a},{m})");
            assert_eq!(s.should_schedule_run(), runs, "runs for ({v},{a},{m})");
        }
    }

    #[test]
    fn test_interval_tracks_mute_only() {
        assert_eq!(
            state(true, false, false).effective_interval_ms(),
            INTERACTIVE_UPDATE_RATE_MS
        );
        assert_eq!(
            state(true, false, true).effective_interval_ms(),
            MUTE_UPDATE_RATE_MS
        );
        // Ambient leaves the resume rate untouched.
        assert_eq!(
            state(true, true, false).effective_interval_ms(),
            INTERACTIVE_UPDATE_RATE_MS
        );
        assert_eq!(
            state(true, true, true).effective_interval_ms(),
            MUTE_UPDATE_RATE_MS
        );
    }

    #[test]
    fn test_setters_idempotent() {
        let mut s = ModeState::new();
        assert!(s.set_visible(true));
        assert!(!s.set_visible(true), "repeat visibility is a no-op");
        assert!(s.set_ambient(true));
        assert!(!s.set_ambient(true));
        assert!(s.set_muted(true));
        assert!(!s.set_muted(true));
        assert!(s.set_visible(false));
    }

    #[test]
    fn test_ambient_wins_over_mute() {
        let s = state(true, true, true);
        assert_eq!(s.render_mode(), RenderMode::Ambient);
        assert!(!s.should_schedule_run());
    }
}
