//! This module contains global constants shared across the face engine and sync layer.

// Render tick cadence
/// Tick period while the face is fully interactive (ms).
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 500;
/// Tick period while notifications are muted (ms).
pub const MUTE_UPDATE_RATE_MS: u64 = 60_000;

// Sync channel paths
/// Path this device publishes weather requests on.
pub const PATH_WEATHER_REQUEST: &str = "/weather";
/// Path the paired host publishes weather readings on.
pub const PATH_WEATHER_INFO: &str = "/weather-info";

// Payload keys
/// Per-request token, present on every outbound request.
pub const KEY_UUID: &str = "uuid";
/// Daily high temperature, pre-formatted by the host.
pub const KEY_HIGH: &str = "high";
/// Daily low temperature, pre-formatted by the host.
pub const KEY_LOW: &str = "low";
/// OpenWeatherMap-style condition code.
pub const KEY_WEATHER_ID: &str = "weatherId";

/// Depth of the face actor's event queue.
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Colon and separator glyphs stay lit this many ms out of each second.
pub const BLINK_ON_MS: u32 = 500;
