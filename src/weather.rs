/*
 *  weather.rs
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
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{debug, info};
use tokio::sync::watch;

use crate::constants::{
    KEY_HIGH, KEY_LOW, KEY_UUID, KEY_WEATHER_ID, PATH_WEATHER_INFO, PATH_WEATHER_REQUEST,
};
use crate::link::{ConnectionManager, DataEvent, DataPayload, RequestId};

/// Last weather reading received from the paired host.
///
/// Immutable snapshot, replaced wholesale on every accepted update. The
/// host pre-formats the temperatures; we never parse or localize them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Daily high, display-ready (e.g. "72°").
    pub high: Option<String>,
    /// Daily low, display-ready.
    pub low: Option<String>,
    /// OpenWeatherMap-style condition code.
    pub condition_id: Option<i32>,
    /// When the snapshot was last replaced, epoch ms. Zero means the face
    /// has never synced.
    pub updated_at_ms: i64,
}

impl WeatherSnapshot {
    /// True once at least one sync has landed.
    pub fn has_data(&self) -> bool {
        self.updated_at_ms > 0
    }

    /// Build the successor snapshot from a partial payload.
    ///
    /// Recognized keys replace their field; absent keys keep the prior
    /// value, so a host that only learned a new low does not wipe the
    /// high. Wrong-typed values count as absent, unknown keys are ignored.
    pub fn merged(&self, payload: &DataPayload, now_ms: i64) -> WeatherSnapshot {
        WeatherSnapshot {
            high: payload
                .get(KEY_HIGH)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .or_else(|| self.high.clone()),
            low: payload
                .get(KEY_LOW)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .or_else(|| self.low.clone()),
            condition_id: payload
                .get(KEY_WEATHER_ID)
                .and_then(Value::as_i64)
                .map(|id| id as i32)
                .or(self.condition_id),
            updated_at_ms: now_ms,
        }
    }
}

/// The weather side of the sync channel: owns the cache, issues requests,
/// folds inbound change events in, and publishes every replacement on a
/// watch channel for lock-free readers.
pub struct WeatherSync {
    current: WeatherSnapshot,
    tx: watch::Sender<WeatherSnapshot>,
}

impl WeatherSync {
    pub fn new() -> (Self, watch::Receiver<WeatherSnapshot>) {
        let (tx, rx) = watch::channel(WeatherSnapshot::default());
        (
            Self {
                current: WeatherSnapshot::default(),
                tx,
            },
            rx,
        )
    }

    pub fn current(&self) -> &WeatherSnapshot {
        &self.current
    }

    /// Fire one weather request at the paired host.
    ///
    /// The payload is just a fresh token so consecutive requests are never
    /// deduplicated upstream. Nothing waits on the result: the reading
    /// itself arrives later as a change event on the info path, if at all.
    pub fn request_weather(&mut self, link: &mut ConnectionManager, now_ms: i64) -> RequestId {
        let id = RequestId::new();
        let mut payload = DataPayload::new();
        payload.insert(KEY_UUID.to_string(), Value::String(id.as_str().to_string()));
        info!("weather: requesting sync ({})", id);
        link.submit(
            id.clone(),
            DataEvent {
                path: PATH_WEATHER_REQUEST.to_string(),
                payload,
            },
            now_ms,
        );
        id
    }

    /// Fold one inbound change event into the cache.
    ///
    /// Returns true when the cache was replaced, so the caller can repaint
    /// immediately instead of waiting for the next tick. Events on other
    /// paths are not ours and are skipped.
    pub fn on_data_event(&mut self, event: &DataEvent, now_ms: i64) -> bool {
        if event.path != PATH_WEATHER_INFO {
            debug!("weather: ignoring change on {}", event.path);
            return false;
        }
        let next = self.current.merged(&event.payload, now_ms);
        info!(
            "weather: high {} low {} condition {}",
            next.high.as_deref().unwrap_or("?"),
            next.low.as_deref().unwrap_or("?"),
            next.condition_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "?".to_string()),
        );
        self.current = next.clone();
        let _ = self.tx.send(next);
        true
    }
}
