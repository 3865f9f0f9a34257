// src/engine.rs  (face actor / tokio mpsc)

use std::sync::Arc;

use log::{debug, error, info, trace, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

use crate::clock::Clock;
use crate::constants::{EVENT_QUEUE_DEPTH, INTERACTIVE_UPDATE_RATE_MS};
use crate::link::{ConnectionManager, LinkEvent, LinkEventSender, LinkTransport};
use crate::mode::ModeState;
use crate::render::Renderer;
use crate::schedule::TickSchedule;
use crate::snapshot::build_snapshot;
use crate::weather::{WeatherSnapshot, WeatherSync};

/// Host-side hooks, one variant per thing the outside world can tell the
/// face. Everything funnels through one queue, so no handler ever races
/// another and arrival order is processing order.
#[derive(Debug)]
pub enum FaceEvent {
    /// Face brought on screen, or hidden behind something else.
    SetVisible(bool),
    /// Host entered or left the low-power always-on state.
    SetAmbient(bool),
    /// Do-not-disturb toggled.
    SetMuted(bool),
    /// Host-driven ambient redraw, roughly once a minute.
    AmbientTick,
    /// Device timezone or locale moved under us.
    TimezoneChanged,
    /// Explicit link lifecycle, for hosts that manage it themselves.
    Connect,
    Disconnect,
    /// Anything the link provider reported.
    Link(LinkEvent),
    Shutdown,
}

/// The face actor. Owns every piece of mutable state: mode flags, the tick
/// schedule, the connection manager and the weather cache. Nothing outside
/// the actor task ever touches them.
pub struct FaceEngine {
    clock: Arc<dyn Clock>,
    mode: ModeState,
    schedule: TickSchedule,
    link: ConnectionManager,
    weather: WeatherSync,
    renderer: Box<dyn Renderer>,
}

impl FaceEngine {
    /// Build the actor and put it on the runtime.
    ///
    /// The transport is constructed against the channel its provider
    /// events come back on, so everything it reports is serialized through
    /// this actor like any other event.
    pub fn spawn<F>(
        clock: Arc<dyn Clock>,
        renderer: Box<dyn Renderer>,
        make_transport: F,
    ) -> FaceHandle
    where
        F: FnOnce(LinkEventSender) -> Box<dyn LinkTransport>,
    {
        let (event_tx, event_rx) = mpsc::channel::<FaceEvent>(EVENT_QUEUE_DEPTH);
        let (link_tx, link_rx) = mpsc::channel::<LinkEvent>(EVENT_QUEUE_DEPTH);
        let transport = make_transport(link_tx);
        let (weather, weather_rx) = WeatherSync::new();

        let engine = FaceEngine {
            clock,
            mode: ModeState::new(),
            schedule: TickSchedule::new(INTERACTIVE_UPDATE_RATE_MS),
            link: ConnectionManager::new(transport),
            weather,
            renderer,
        };
        let join = tokio::spawn(engine.run(event_rx, link_rx));

        FaceHandle {
            events: event_tx,
            weather_rx,
            join: Some(join),
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::Receiver<FaceEvent>,
        mut link_events: mpsc::Receiver<LinkEvent>,
    ) {
        info!("face engine up");
        let mut link_open = true;
        loop {
            let deadline = self.tick_deadline();
            tokio::select! {
                ev = events.recv() => match ev {
                    Some(ev) => {
                        if !self.on_event(ev) {
                            break;
                        }
                    }
                    None => {
                        debug!("event queue closed");
                        break;
                    }
                },
                ev = link_events.recv(), if link_open => match ev {
                    Some(ev) => {
                        if !self.on_event(FaceEvent::Link(ev)) {
                            break;
                        }
                    }
                    None => {
                        debug!("link event channel closed");
                        link_open = false;
                    }
                },
                _ = sleep_until(deadline), if self.schedule.is_running() => {
                    self.on_tick();
                }
            }
        }
        info!("face engine down");
    }

    /// Single dispatch point. Returns false when the engine should exit.
    fn on_event(&mut self, event: FaceEvent) -> bool {
        trace!("event: {:?}", event);
        match event {
            FaceEvent::SetVisible(visible) => {
                if self.mode.set_visible(visible) {
                    // Visibility drives the link: on screen means connected.
                    if visible {
                        self.link.connect();
                    } else {
                        self.link.disconnect();
                    }
                    self.sync_schedule();
                }
            }
            FaceEvent::SetAmbient(ambient) => {
                if self.mode.set_ambient(ambient) {
                    self.render_frame();
                    self.sync_schedule();
                }
            }
            FaceEvent::SetMuted(muted) => {
                if self.mode.set_muted(muted) {
                    self.sync_schedule();
                }
            }
            FaceEvent::AmbientTick => {
                // The host owns the minute cadence in ambient; just repaint.
                self.render_frame();
            }
            FaceEvent::TimezoneChanged => {
                info!("timezone changed, repainting");
                self.render_frame();
            }
            FaceEvent::Connect => self.link.connect(),
            FaceEvent::Disconnect => self.link.disconnect(),
            FaceEvent::Link(ev) => self.on_link_event(ev),
            FaceEvent::Shutdown => {
                info!("face engine shutting down");
                return false;
            }
        }
        true
    }

    fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                self.link.on_connected();
                // One request per connect, resume included. The reading
                // comes back as a change event whenever the host has one.
                let now = self.clock.now_ms();
                self.weather.request_weather(&mut self.link, now);
            }
            LinkEvent::Suspended(reason) => self.link.on_suspended(&reason),
            LinkEvent::Failed(reason) => self.link.on_failed(&reason),
            LinkEvent::DataChanged(ev) => {
                let now = self.clock.now_ms();
                if self.weather.on_data_event(&ev, now) {
                    // Fresh weather repaints immediately, between ticks or
                    // with the scheduler parked.
                    self.render_frame();
                }
            }
            LinkEvent::RequestResult { id, outcome } => {
                self.link.on_request_result(&id, outcome);
            }
        }
    }

    /// A tick fired: paint, then re-arm against the current interval, but
    /// only while the mode still wants a running timer.
    fn on_tick(&mut self) {
        let now = self.clock.now_ms();
        trace!("tick at {}", now);
        self.render_frame();
        if self.mode.should_schedule_run() {
            self.schedule.fired(now);
        } else {
            self.schedule.stop();
        }
    }

    /// Make the timer agree with the mode flags. Called after every flag
    /// transition; harmless to call again.
    fn sync_schedule(&mut self) {
        let now = self.clock.now_ms();
        if self.mode.should_schedule_run() {
            let interval = self.mode.effective_interval_ms();
            if !self.schedule.is_running() {
                self.schedule.start(interval, now);
            } else if self.schedule.interval_ms() != interval {
                self.schedule.restart(interval, now);
            }
        } else {
            self.schedule.stop();
        }
    }

    fn render_frame(&mut self) {
        let frame = build_snapshot(
            self.clock.local_now(),
            self.mode.render_mode(),
            self.weather.current(),
        );
        if let Err(e) = self.renderer.render(&frame) {
            // Dropped frame; the next tick tries again.
            error!("render failed: {}", e);
        }
    }

    fn tick_deadline(&self) -> Instant {
        match self.schedule.next_fire_at_ms() {
            Some(at) => {
                let wait = (at - self.clock.now_ms()).max(0) as u64;
                Instant::now() + Duration::from_millis(wait)
            }
            // Parked; the select branch is disabled while stopped.
            None => Instant::now() + Duration::from_secs(3600),
        }
    }
}

/// Talks to a running face engine. Dropping the handle shuts it down.
pub struct FaceHandle {
    events: mpsc::Sender<FaceEvent>,
    weather_rx: watch::Receiver<WeatherSnapshot>,
    join: Option<JoinHandle<()>>,
}

impl FaceHandle {
    pub async fn set_visible(&self, visible: bool) {
        self.send(FaceEvent::SetVisible(visible)).await;
    }

    pub async fn set_ambient(&self, ambient: bool) {
        self.send(FaceEvent::SetAmbient(ambient)).await;
    }

    pub async fn set_muted(&self, muted: bool) {
        self.send(FaceEvent::SetMuted(muted)).await;
    }

    pub async fn ambient_tick(&self) {
        self.send(FaceEvent::AmbientTick).await;
    }

    pub async fn timezone_changed(&self) {
        self.send(FaceEvent::TimezoneChanged).await;
    }

    pub async fn connect(&self) {
        self.send(FaceEvent::Connect).await;
    }

    pub async fn disconnect(&self) {
        self.send(FaceEvent::Disconnect).await;
    }

    /// Raw event sender, for host adapters that forward their own hooks.
    pub fn sender(&self) -> mpsc::Sender<FaceEvent> {
        self.events.clone()
    }

    /// Lock-free view of the weather cache.
    pub fn weather(&self) -> watch::Receiver<WeatherSnapshot> {
        self.weather_rx.clone()
    }

    /// Stop the engine and wait for the actor task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.events.send(FaceEvent::Shutdown).await;
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }

    async fn send(&self, event: FaceEvent) {
        if self.events.send(event).await.is_err() {
            warn!("face engine gone, event dropped");
        }
    }
}

impl Drop for FaceHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            let _ = self.events.try_send(FaceEvent::Shutdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEY_HIGH, MUTE_UPDATE_RATE_MS, PATH_WEATHER_INFO};
    use crate::link::{ConnectionState, DataEvent, DataPayload, RequestId, RequestOutcome};
    use crate::render::RenderError;
    use crate::snapshot::FaceSnapshot;
    use chrono::{DateTime, Local, TimeZone};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }

        fn local_now(&self) -> DateTime<Local> {
            Local.timestamp_millis_opt(self.0).unwrap()
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl LinkTransport for RecordingTransport {
        fn connect(&mut self) {
            self.calls.lock().unwrap().push("connect".to_string());
        }

        fn disconnect(&mut self) {
            self.calls.lock().unwrap().push("disconnect".to_string());
        }

        fn put_data(&mut self, _id: RequestId, event: DataEvent) {
            self.calls.lock().unwrap().push(format!("put {}", event.path));
        }
    }

    struct CountingRenderer(Arc<AtomicUsize>);

    impl Renderer for CountingRenderer {
        fn render(&mut self, _frame: &FaceSnapshot) -> Result<(), RenderError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&mut self, _frame: &FaceSnapshot) -> Result<(), RenderError> {
            Err(RenderError::DrawFailed("no backing surface".to_string()))
        }
    }

    struct Fixture {
        engine: FaceEngine,
        frames: Arc<AtomicUsize>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    fn fixture(now_ms: i64) -> Fixture {
        let frames = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let transport = RecordingTransport {
            calls: Arc::clone(&calls),
        };
        let (weather, _weather_rx) = WeatherSync::new();
        let engine = FaceEngine {
            clock: Arc::new(FixedClock(now_ms)),
            mode: ModeState::new(),
            schedule: TickSchedule::new(INTERACTIVE_UPDATE_RATE_MS),
            link: ConnectionManager::new(Box::new(transport)),
            weather,
            renderer: Box::new(CountingRenderer(Arc::clone(&frames))),
        };
        Fixture {
            engine,
            frames,
            calls,
        }
    }

    fn weather_event(high: &str) -> LinkEvent {
        let mut payload = DataPayload::new();
        payload.insert(KEY_HIGH.to_string(), json!(high));
        LinkEvent::DataChanged(DataEvent {
            path: PATH_WEATHER_INFO.to_string(),
            payload,
        })
    }

    #[test]
    fn test_visible_arms_schedule_and_connects() {
        let mut f = fixture(10_123);
        assert!(f.engine.on_event(FaceEvent::SetVisible(true)));
        assert!(f.engine.schedule.is_running());
        assert_eq!(f.engine.schedule.next_fire_at_ms(), Some(10_500));
        assert_eq!(f.engine.link.state(), ConnectionState::Connecting);
        assert_eq!(f.calls.lock().unwrap().as_slice(), ["connect"]);
    }

    #[test]
    fn test_repeat_visibility_is_single_transition() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::SetVisible(true));
        let deadline = f.engine.schedule.next_fire_at_ms();
        f.engine.on_event(FaceEvent::SetVisible(true));
        assert_eq!(f.engine.schedule.next_fire_at_ms(), deadline);
        assert_eq!(f.calls.lock().unwrap().len(), 1, "one connect only");
    }

    #[test]
    fn test_hidden_disconnects_and_stops() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::SetVisible(true));
        f.engine.on_event(FaceEvent::SetVisible(false));
        assert!(!f.engine.schedule.is_running());
        assert_eq!(f.engine.link.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_tick_renders_and_rearms() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::SetVisible(true));
        f.engine.on_tick();
        assert_eq!(f.frames.load(Ordering::SeqCst), 1);
        assert!(f.engine.schedule.is_running());
        assert_eq!(f.engine.schedule.next_fire_at_ms(), Some(10_500));
    }

    #[test]
    fn test_ambient_invalidates_then_parks() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::SetVisible(true));
        f.engine.on_event(FaceEvent::SetAmbient(true));
        assert_eq!(f.frames.load(Ordering::SeqCst), 1, "mode flip repaints");
        assert!(!f.engine.schedule.is_running());

        // System minute ticks still paint while parked.
        f.engine.on_event(FaceEvent::AmbientTick);
        assert_eq!(f.frames.load(Ordering::SeqCst), 2);

        f.engine.on_event(FaceEvent::SetAmbient(false));
        assert!(f.engine.schedule.is_running());
    }

    #[test]
    fn test_mute_restarts_with_minute_interval() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::SetVisible(true));
        assert_eq!(f.engine.schedule.interval_ms(), INTERACTIVE_UPDATE_RATE_MS);
        f.engine.on_event(FaceEvent::SetMuted(true));
        assert!(f.engine.schedule.is_running());
        assert_eq!(f.engine.schedule.interval_ms(), MUTE_UPDATE_RATE_MS);
        assert_eq!(f.engine.schedule.next_fire_at_ms(), Some(60_000));
        // And back.
        f.engine.on_event(FaceEvent::SetMuted(false));
        assert_eq!(f.engine.schedule.interval_ms(), INTERACTIVE_UPDATE_RATE_MS);
    }

    #[test]
    fn test_connected_fires_one_request_each_time() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::SetVisible(true));
        f.engine.on_event(FaceEvent::Link(LinkEvent::Connected));
        assert_eq!(f.engine.link.state(), ConnectionState::Connected);
        assert_eq!(f.engine.link.outstanding_requests(), 1);

        // Resume is another Connected: exactly one more request.
        f.engine
            .on_event(FaceEvent::Link(LinkEvent::Suspended("range".into())));
        f.engine.on_event(FaceEvent::Link(LinkEvent::Connected));
        assert_eq!(f.engine.link.outstanding_requests(), 2);

        let puts = f
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("put /weather"))
            .count();
        assert_eq!(puts, 2);
    }

    #[test]
    fn test_weather_change_repaints_while_parked() {
        let mut f = fixture(10_123);
        // Invisible: scheduler parked, but data still repaints the face.
        f.engine.on_event(FaceEvent::Link(weather_event("70°")));
        assert_eq!(f.frames.load(Ordering::SeqCst), 1);
        assert_eq!(f.engine.weather.current().high.as_deref(), Some("70°"));
    }

    #[test]
    fn test_request_result_settles_bookkeeping() {
        let mut f = fixture(10_123);
        f.engine.on_event(FaceEvent::Link(LinkEvent::Connected));
        assert_eq!(f.engine.link.outstanding_requests(), 1);
        // The transport never saw the id, so settle via a synthetic one:
        // unknown ids are dropped without touching the table.
        f.engine.on_event(FaceEvent::Link(LinkEvent::RequestResult {
            id: RequestId::new(),
            outcome: RequestOutcome::Success,
        }));
        assert_eq!(f.engine.link.outstanding_requests(), 1);
    }

    #[test]
    fn test_render_failure_does_not_stop_ticking() {
        let (weather, _weather_rx) = WeatherSync::new();
        let mut engine = FaceEngine {
            clock: Arc::new(FixedClock(10_123)),
            mode: ModeState::new(),
            schedule: TickSchedule::new(INTERACTIVE_UPDATE_RATE_MS),
            link: ConnectionManager::new(Box::new(RecordingTransport::default())),
            weather,
            renderer: Box::new(FailingRenderer),
        };
        engine.on_event(FaceEvent::SetVisible(true));
        engine.on_tick();
        assert!(engine.schedule.is_running(), "failed frame keeps ticking");
        assert_eq!(engine.schedule.next_fire_at_ms(), Some(10_500));
    }

    #[test]
    fn test_shutdown_stops_dispatch() {
        let mut f = fixture(10_123);
        assert!(!f.engine.on_event(FaceEvent::Shutdown));
    }
}
