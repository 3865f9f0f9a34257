/*
 *  simlink.rs
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
use rand::Rng;
use serde_json::json;
use tokio::time::{sleep, Duration};

use crate::constants::{KEY_HIGH, KEY_LOW, KEY_WEATHER_ID, PATH_WEATHER_INFO, PATH_WEATHER_REQUEST};
use crate::link::{
    DataEvent, DataPayload, LinkEvent, LinkEventSender, LinkTransport, RequestId, RequestOutcome,
};

/// Behavior knobs for the pretend host. All delays in ms.
#[derive(Debug, Clone)]
pub struct SimLinkConfig {
    /// How long a connect takes to come up.
    pub connect_delay_ms: u64,
    /// How long until a request is acknowledged.
    pub result_delay_ms: u64,
    /// How long after the ack the weather reading lands.
    pub weather_delay_ms: u64,
    /// Fraction of requests that fail outright (0.0 - 1.0).
    pub failure_rate: f64,
}

impl Default for SimLinkConfig {
    fn default() -> Self {
        Self {
            connect_delay_ms: 350,
            result_delay_ms: 60,
            weather_delay_ms: 900,
            failure_rate: 0.0,
        }
    }
}

/// In-process stand-in for the paired phone.
///
/// Comes up after a short delay, acknowledges every request, and answers
/// weather requests with a made-up reading pushed back on the info path,
/// the same shape a real host would publish.
pub struct SimLink {
    cfg: SimLinkConfig,
    events: LinkEventSender,
}

impl SimLink {
    pub fn new(cfg: SimLinkConfig, events: LinkEventSender) -> Self {
        Self { cfg, events }
    }

    fn fake_reading() -> DataPayload {
        let mut rng = rand::rng();
        let low = rng.random_range(20..=60);
        let high = low + rng.random_range(5..=25);
        let conditions = [200, 300, 500, 511, 600, 701, 781, 800, 801, 802];
        let condition = conditions[rng.random_range(0..conditions.len())];

        let mut payload = DataPayload::new();
        payload.insert(KEY_HIGH.to_string(), json!(format!("{}°", high)));
        payload.insert(KEY_LOW.to_string(), json!(format!("{}°", low)));
        payload.insert(KEY_WEATHER_ID.to_string(), json!(condition));
        payload
    }
}

impl LinkTransport for SimLink {
    fn connect(&mut self) {
        let events = self.events.clone();
        let delay = self.cfg.connect_delay_ms;
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay)).await;
            let _ = events.send(LinkEvent::Connected).await;
        });
    }

    fn disconnect(&mut self) {
        // Client-requested teardown reports nothing back.
        debug!("simlink: torn down");
    }

    fn put_data(&mut self, id: RequestId, event: DataEvent) {
        let events = self.events.clone();
        let cfg = self.cfg.clone();
        let failed = rand::rng().random::<f64>() < cfg.failure_rate;
        tokio::spawn(async move {
            sleep(Duration::from_millis(cfg.result_delay_ms)).await;
            if failed {
                let _ = events
                    .send(LinkEvent::RequestResult {
                        id,
                        outcome: RequestOutcome::Failure("simulated radio drop".to_string()),
                    })
                    .await;
                return;
            }
            let _ = events
                .send(LinkEvent::RequestResult {
                    id,
                    outcome: RequestOutcome::Success,
                })
                .await;

            // A weather request earns a reading on the info path.
            if event.path == PATH_WEATHER_REQUEST {
                sleep(Duration::from_millis(cfg.weather_delay_ms)).await;
                let _ = events
                    .send(LinkEvent::DataChanged(DataEvent {
                        path: PATH_WEATHER_INFO.to_string(),
                        payload: SimLink::fake_reading(),
                    }))
                    .await;
            }
        });
    }
}
