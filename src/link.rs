/*
 *  link.rs
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
use std::collections::HashMap;
use std::fmt;
use log::{debug, error, info, warn};
use uuid::Uuid;

/// Key-value payload carried by a change event.
pub type DataPayload = serde_json::Map<String, Value>;

/// Channel the link provider reports back on. Handed to the transport
/// when it is built; everything it has to say arrives here.
pub type LinkEventSender = tokio::sync::mpsc::Sender<LinkEvent>;

/// Opaque per-request token.
///
/// Rides the wire as the `uuid` payload key so every request is distinct,
/// and keys the outstanding-request table. Never used to correlate inbound
/// weather data, which arrives on its own path in its own time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One key-value change event on the sync channel, either direction.
/// The provider API is symmetric, so outbound requests and inbound
/// readings share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEvent {
    pub path: String,
    pub payload: DataPayload,
}

/// Where a fire-and-forget request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Pending,
    Success,
    Failure(String),
}

/// Bookkeeping entry for one outbound request. Requests are never retried;
/// a failure is logged and the next natural trigger tries again.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub id: RequestId,
    pub path: String,
    pub created_at_ms: i64,
    pub outcome: RequestOutcome,
}

/// Lifecycle of the channel to the paired host. The provider's events are
/// authoritative; we only ever ask for connect and disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Suspended,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Suspended => "suspended",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Everything the provider can tell us, as one flat event type.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// Channel established. A resume after suspension is delivered as
    /// another `Connected`.
    Connected,
    /// Provider paused the channel, e.g. the host walked out of range.
    Suspended(String),
    /// Connection attempt or established channel died.
    Failed(String),
    /// Inbound key-value change from the paired host.
    DataChanged(DataEvent),
    /// Terminal acknowledgement for one outbound request.
    RequestResult {
        id: RequestId,
        outcome: RequestOutcome,
    },
}

/// The external link provider seam.
///
/// All three calls are synchronous fire-and-forget; results and lifecycle
/// changes come back asynchronously as [`LinkEvent`]s on the sender the
/// transport was built with.
pub trait LinkTransport: Send {
    fn connect(&mut self);
    fn disconnect(&mut self);
    fn put_data(&mut self, id: RequestId, event: DataEvent);
}

/// Owns the connection state and the outstanding-request table.
pub struct ConnectionManager {
    transport: Box<dyn LinkTransport>,
    state: ConnectionState,
    outstanding: HashMap<RequestId, SyncRequest>,
}

impl ConnectionManager {
    pub fn new(transport: Box<dyn LinkTransport>) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            outstanding: HashMap::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Ask the provider for a channel. Legal from Disconnected and Failed,
    /// a no-op while connecting or connected. While suspended the provider
    /// owns the resume, so the request is only logged.
    pub fn connect(&mut self) {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::Failed => {
                info!("link: connecting");
                self.state = ConnectionState::Connecting;
                self.transport.connect();
            }
            ConnectionState::Connecting | ConnectionState::Connected => {
                debug!("link: connect ignored, already {}", self.state);
            }
            ConnectionState::Suspended => {
                debug!("link: connect while suspended, waiting on provider resume");
            }
        }
    }

    /// Tear the channel down. Safe from any state. In-flight requests are
    /// not cancelled; their results still settle when they arrive.
    pub fn disconnect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            info!("link: disconnected");
        }
        self.state = ConnectionState::Disconnected;
        self.transport.disconnect();
    }

    /// Provider reports the channel up. Authoritative from any state.
    pub fn on_connected(&mut self) {
        if self.state == ConnectionState::Suspended {
            info!("link: resumed");
        } else {
            info!("link: connected");
        }
        self.state = ConnectionState::Connected;
    }

    /// Provider paused an established channel.
    pub fn on_suspended(&mut self, reason: &str) {
        match self.state {
            ConnectionState::Connected => {
                warn!("link: suspended ({})", reason);
                self.state = ConnectionState::Suspended;
            }
            _ => debug!("link: suspend while {} ignored ({})", self.state, reason),
        }
    }

    /// Provider gave up on the channel. No automatic retry here; the next
    /// visibility change or host connect request starts over.
    pub fn on_failed(&mut self, reason: &str) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                error!("link: failed ({})", reason);
                self.state = ConnectionState::Failed;
            }
            _ => debug!("link: failure while {} ignored ({})", self.state, reason),
        }
    }

    /// Register one fire-and-forget request and hand it to the provider.
    pub fn submit(&mut self, id: RequestId, event: DataEvent, now_ms: i64) {
        debug!("link: submit {} ({})", event.path, id);
        self.outstanding.insert(
            id.clone(),
            SyncRequest {
                id: id.clone(),
                path: event.path.clone(),
                created_at_ms: now_ms,
                outcome: RequestOutcome::Pending,
            },
        );
        self.transport.put_data(id, event);
    }

    /// Settle a request's bookkeeping, exactly once per id. Duplicate and
    /// unknown results are dropped; results arriving after a disconnect
    /// still settle normally.
    pub fn on_request_result(&mut self, id: &RequestId, outcome: RequestOutcome) {
        match self.outstanding.remove(id) {
            Some(req) => match &outcome {
                RequestOutcome::Failure(reason) => {
                    warn!("link: request {} on {} failed: {}", id, req.path, reason);
                }
                _ => debug!("link: request {} on {} settled", id, req.path),
            },
            None => debug!("link: result for unknown request {} dropped", id),
        }
    }

    /// Number of requests awaiting a result.
    pub fn outstanding_requests(&self) -> usize {
        self.outstanding.len()
    }
}
