//! Locating the largest visual change
//!
//! Once the series has settled and been filtered, the timestamp of the
//! single largest score increase between consecutive samples is the
//! DOM-derived First Meaningful Paint candidate.

use crate::series::SampleSeries;
use serde::{Deserialize, Serialize};

/// The timestamp and magnitude of the largest consecutive score increase.
///
/// Transient: recomputed from scratch on every locate run, never stored
/// across evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
  /// Timestamp of the later sample of the winning pair, ms since
  /// navigation start
  pub t: f64,
  /// Score increase across the winning pair
  pub diff: f64,
}

/// Finds the largest consecutive score increase in the series.
///
/// Exact ties go to the later pair: the record is replaced whenever a
/// diff is greater than *or equal to* the best seen so far. Returns `None`
/// when fewer than two samples remain, in which case the caller falls back
/// to its configured default candidate.
///
/// # Examples
///
/// ```
/// use fastpaint::change::largest_increase;
/// use fastpaint::series::{Sample, SampleSeries};
///
/// let mut series = SampleSeries::new();
/// for (t, score) in [(0.0, 0.0), (1.0, 10.0), (2.0, 10.0), (3.0, 20.0)] {
///   series.push(Sample { t, score });
/// }
///
/// // Two pairs tie at a diff of 10; the later one wins.
/// assert_eq!(largest_increase(&series).unwrap().t, 3.0);
/// ```
pub fn largest_increase(series: &SampleSeries) -> Option<ChangeRecord> {
  let samples = series.samples();
  let mut record: Option<ChangeRecord> = None;
  for i in 1..samples.len() {
    let diff = samples[i].score - samples[i - 1].score;
    if record.map_or(true, |best| diff >= best.diff) {
      record = Some(ChangeRecord {
        t: samples[i].t,
        diff,
      });
    }
  }
  record
}
