use chrono::{DateTime, Local, Utc};

/// Time source for the face engine.
///
/// All phase arithmetic and snapshot time fields flow through this seam so
/// tests can drive the engine from fixed instants.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
    /// Wall-clock time in the device's local zone.
    fn local_now(&self) -> DateTime<Local>;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}
