//! Telemetry series and the event indices bound to them.
//!
//! A `TimeSeries` owns one time axis and two index-aligned channels. Gaps are
//! `None`; samples are never dropped, so an index means the same instant on
//! every channel. Event indices can only be created against a concrete series
//! and remember which one, so they cannot be applied to a differently-sampled
//! curve by accident.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::AnalysisError;

static NEXT_SERIES_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a constructed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SeriesId(u64);

impl SeriesId {
    fn next() -> Self {
        Self(NEXT_SERIES_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TimeSeries {
    id: SeriesId,
    time: Vec<f64>,
    et: Vec<Option<f64>>,
    bt: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Build a series from a time axis and both channels.
    ///
    /// Channel lengths must equal the time axis length. Non-finite readings
    /// become gaps.
    pub fn new(
        time: Vec<f64>,
        et: Vec<Option<f64>>,
        bt: Vec<Option<f64>>,
    ) -> Result<Self, AnalysisError> {
        if et.len() != time.len() {
            return Err(AnalysisError::LengthMismatch {
                what: "ET channel",
                expected: time.len(),
                actual: et.len(),
            });
        }
        if bt.len() != time.len() {
            return Err(AnalysisError::LengthMismatch {
                what: "BT channel",
                expected: time.len(),
                actual: bt.len(),
            });
        }
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Ok(Self {
            id: SeriesId::next(),
            time,
            et: et.into_iter().map(finite).collect(),
            bt: bt.into_iter().map(finite).collect(),
        })
    }

    /// Series with only a BT channel; ET is all gaps.
    pub fn from_bt(time: Vec<f64>, bt: Vec<Option<f64>>) -> Result<Self, AnalysisError> {
        let et = vec![None; time.len()];
        Self::new(time, et, bt)
    }

    pub fn id(&self) -> SeriesId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn et(&self) -> &[Option<f64>] {
        &self.et
    }

    pub fn bt(&self) -> &[Option<f64>] {
        &self.bt
    }

    /// First index whose time is non-finite or earlier than its predecessor.
    pub fn first_time_regression(&self) -> Option<usize> {
        if let Some(t0) = self.time.first()
            && !t0.is_finite()
        {
            return Some(0);
        }
        self.time
            .windows(2)
            .position(|w| !(w[1].is_finite() && w[1] >= w[0]))
            .map(|i| i + 1)
    }

    pub fn is_monotonic(&self) -> bool {
        self.first_time_regression().is_none()
    }
}

/// Event slots of a roast, in index-array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RoastEvent {
    Charge,
    DryEnd,
    FirstCrackStart,
    FirstCrackEnd,
    SecondCrackStart,
    SecondCrackEnd,
    Drop,
    Cool,
}

impl RoastEvent {
    pub const ALL: [RoastEvent; 8] = [
        RoastEvent::Charge,
        RoastEvent::DryEnd,
        RoastEvent::FirstCrackStart,
        RoastEvent::FirstCrackEnd,
        RoastEvent::SecondCrackStart,
        RoastEvent::SecondCrackEnd,
        RoastEvent::Drop,
        RoastEvent::Cool,
    ];

    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// Event indices bound to the series they were computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIndex {
    series: SeriesId,
    slots: [Option<usize>; 8],
}

impl EventIndex {
    /// Bind a raw index array (`-1` = unknown) to `series`.
    ///
    /// The array must have 7 or 8 slots. Entries outside the series are
    /// treated as unknown.
    pub fn bind(raw: &[i64], series: &TimeSeries) -> Result<Self, AnalysisError> {
        if !(7..=8).contains(&raw.len()) {
            return Err(AnalysisError::EventIndexShape(raw.len()));
        }
        let n = series.len();
        let mut slots = [None; 8];
        for (slot, &idx) in slots.iter_mut().zip(raw) {
            if idx < 0 {
                continue;
            }
            match usize::try_from(idx) {
                Ok(i) if i < n => *slot = Some(i),
                _ => {
                    tracing::debug!(idx, len = n, "event index outside series; treating as unknown");
                }
            }
        }
        Ok(Self {
            series: series.id(),
            slots,
        })
    }

    pub fn series_id(&self) -> SeriesId {
        self.series
    }

    #[inline]
    pub fn get(&self, event: RoastEvent) -> Option<usize> {
        self.slots[event.slot()]
    }

    /// Raw form, `-1` for unknown slots.
    pub fn to_raw(&self) -> [i64; 8] {
        self.slots
            .map(|s| s.and_then(|i| i64::try_from(i).ok()).unwrap_or(-1))
    }
}

/// A series together with the event index computed against it.
#[derive(Debug, Clone)]
pub struct RoastCurve {
    series: TimeSeries,
    events: Option<EventIndex>,
}

impl RoastCurve {
    pub fn new(series: TimeSeries) -> Self {
        Self {
            series,
            events: None,
        }
    }

    /// Bind `raw` indices to `series` and keep them together.
    pub fn with_raw_events(series: TimeSeries, raw: &[i64]) -> Result<Self, AnalysisError> {
        let events = EventIndex::bind(raw, &series)?;
        Ok(Self {
            series,
            events: Some(events),
        })
    }

    /// Attach an already-bound index; it must belong to `series`.
    pub fn with_events(series: TimeSeries, events: EventIndex) -> Result<Self, AnalysisError> {
        if events.series_id() != series.id() {
            return Err(AnalysisError::ForeignEventIndex {
                bound: events.series_id().get(),
                series: series.id().get(),
            });
        }
        Ok(Self {
            series,
            events: Some(events),
        })
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn events(&self) -> Option<&EventIndex> {
        self.events.as_ref()
    }
}
