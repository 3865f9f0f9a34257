/*
 *  schedule.rs
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
use log::debug;

/// Delay until the next tick boundary, in ms. Result is in (0, interval].
///
/// Ticks land on wall-clock multiples of the interval instead of drifting
/// by handler time: a 500ms face flips on the exact half second, a muted
/// face on the top of the minute.
#[inline]
pub fn phase_delay(now_ms: i64, interval_ms: u64) -> u64 {
    assert!(interval_ms > 0, "tick interval must be positive");
    interval_ms - (now_ms % interval_ms as i64) as u64
}

/// Tick timer state for the face.
///
/// Owns the deadline arithmetic only; the engine owns the actual waiting.
/// Armed iff the face is visible and not ambient.
#[derive(Debug)]
pub struct TickSchedule {
    interval_ms: u64,
    running: bool,
    last_fire_at_ms: i64,
    next_fire_at_ms: i64,
}

impl TickSchedule {
    pub fn new(interval_ms: u64) -> Self {
        assert!(interval_ms > 0, "tick interval must be positive");
        Self {
            interval_ms,
            running: false,
            last_fire_at_ms: 0,
            next_fire_at_ms: 0,
        }
    }

    /// Arm the timer phase-aligned from `now_ms`. No-op while running, so
    /// repeated start requests cannot double-schedule.
    pub fn start(&mut self, interval_ms: u64, now_ms: i64) {
        if self.running {
            return;
        }
        assert!(interval_ms > 0, "tick interval must be positive");
        self.interval_ms = interval_ms;
        self.next_fire_at_ms = now_ms + phase_delay(now_ms, interval_ms) as i64;
        self.running = true;
        debug!(
            "schedule armed at {}ms, next fire {}",
            interval_ms, self.next_fire_at_ms
        );
    }

    /// Disarm. Safe to call repeatedly or while already stopped.
    pub fn stop(&mut self) {
        if self.running {
            debug!("schedule stopped");
        }
        self.running = false;
    }

    /// Stop-then-start with a new interval. The new cadence applies on the
    /// very next deadline, not after one more tick at the old rate.
    pub fn restart(&mut self, interval_ms: u64, now_ms: i64) {
        self.running = false;
        self.start(interval_ms, now_ms);
    }

    /// Record a fire at `now_ms` and re-arm against the current interval.
    pub fn fired(&mut self, now_ms: i64) {
        self.last_fire_at_ms = now_ms;
        self.next_fire_at_ms = now_ms + phase_delay(now_ms, self.interval_ms) as i64;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Next deadline in epoch ms, or None while disarmed.
    pub fn next_fire_at_ms(&self) -> Option<i64> {
        self.running.then_some(self.next_fire_at_ms)
    }

    pub fn last_fire_at_ms(&self) -> i64 {
        self.last_fire_at_ms
    }
}
