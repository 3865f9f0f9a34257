/*
 *  lib.rs
 *
 *  WristFace - keeps on ticking
 *  (c) 2025-26 Stuart Hunter
 *
 *  Watch-face core: adaptive tick scheduling plus weather sync with a
 *  paired host over an unreliable channel
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

// Shared plumbing
pub mod clock;
pub mod config;
pub mod constants;

// Mode flags and tick scheduling
pub mod mode;
pub mod schedule;

// Sync channel to the paired host
pub mod link;
pub mod weather;

// Frame assembly and render targets
pub mod icons;
pub mod render;
pub mod snapshot;

// The serialized face actor
pub mod engine;

// Simulated paired host for demos and the integration tests
pub mod simlink;

// Re-export the commonly used types
pub use clock::{Clock, SystemClock};
pub use engine::{FaceEngine, FaceEvent, FaceHandle};
pub use icons::{condition_icon, WeatherIcon};
pub use link::{
    ConnectionManager, ConnectionState, DataEvent, DataPayload, LinkEvent, LinkEventSender,
    LinkTransport, RequestId, RequestOutcome,
};
pub use mode::{ModeState, RenderMode};
pub use render::{ConsoleRenderer, RenderError, Renderer};
pub use schedule::TickSchedule;
pub use snapshot::{build_snapshot, FaceSnapshot, TimeFields};
pub use weather::{WeatherSnapshot, WeatherSync};
