use chrono::{DateTime, Duration, Utc};

/// Context durations kept around a trigger. A symmetric `window_seconds`
/// config resolves to `before == after == window_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    pub before: Duration,
    pub after: Duration,
}

impl WindowSpan {
    pub fn symmetric(seconds: u32) -> Self {
        let d = Duration::seconds(i64::from(seconds));
        Self { before: d, after: d }
    }

    pub fn asymmetric(before_seconds: u32, after_seconds: u32) -> Self {
        Self {
            before: Duration::seconds(i64::from(before_seconds)),
            after: Duration::seconds(i64::from(after_seconds)),
        }
    }

    /// Total seconds covered by one trigger's window.
    pub fn total_seconds(&self) -> f64 {
        (self.before + self.after).num_milliseconds() as f64 / 1000.0
    }
}

/// The `[from, till]` interval during which arriving frames are wanted
/// without re-evaluation. Unset until the first trigger.
///
/// Invariant: `from <= till` whenever set. A trigger landing while the
/// window is still open extends `till` and never moves `from`, so
/// closely-spaced triggers merge into one continuous capture interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureWindow {
    bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl CaptureWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `from <= now <= till`, inclusive on both ends so a frame
    /// captured exactly on a boundary is still in-window.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.bounds {
            Some((from, till)) => from <= now && now <= till,
            None => false,
        }
    }

    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.bounds
    }

    /// Absorb a trigger at `trigger_time`. Opens `[t - before, t + after]`,
    /// or if the window is still open on the right (`till > t`), keeps
    /// `from` and extends `till` to `max(till, t + after)`.
    pub fn open_or_extend(&mut self, trigger_time: DateTime<Utc>, span: WindowSpan) {
        let candidate_from = trigger_time - span.before;
        let candidate_till = trigger_time + span.after;

        self.bounds = match self.bounds {
            Some((from, till)) if till > trigger_time => Some((from, till.max(candidate_till))),
            _ => Some((candidate_from, candidate_till)),
        };
    }

    /// Direct override, test/debug seam only.
    pub fn set(&mut self, from: DateTime<Utc>, till: DateTime<Utc>) {
        self.bounds = Some((from, till));
    }

    pub fn clear(&mut self) {
        self.bounds = None;
    }
}
