//! Time series of render-score samples
//!
//! One [`Sample`] is recorded per mutation notification; the series is
//! append-only apart from the monotonicity filter, which compacts out
//! transient score dips before every stability evaluation. The series is
//! owned by a single monitor for the lifetime of one page-load evaluation
//! and discarded with it.

use serde::{Deserialize, Serialize};

/// One render-score observation.
///
/// `t` is milliseconds since navigation start; `score` is the render
/// weight of the document tree at that instant. Both are non-negative.
/// Samples are immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
  /// Milliseconds since navigation start
  pub t: f64,
  /// Render weight of the document at time `t`
  pub score: f64,
}

/// Ordered, append-only sequence of samples.
///
/// Insertion order is temporal order. After
/// [`filter_monotonic`](SampleSeries::filter_monotonic) runs, no retained
/// sample has a strictly smaller score than its immediate predecessor.
///
/// # Examples
///
/// ```
/// use fastpaint::series::{Sample, SampleSeries};
///
/// let mut series = SampleSeries::new();
/// series.push(Sample { t: 100.0, score: 5.0 });
/// series.push(Sample { t: 200.0, score: 3.0 });
/// series.push(Sample { t: 300.0, score: 8.0 });
/// series.filter_monotonic();
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.last().unwrap().score, 8.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleSeries {
  samples: Vec<Sample>,
}

impl SampleSeries {
  /// Creates an empty series.
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a sample, preserving insertion order. O(1).
  pub fn push(&mut self, sample: Sample) {
    self.samples.push(sample);
  }

  /// Number of retained samples.
  pub fn len(&self) -> usize {
    self.samples.len()
  }

  /// Whether the series holds no samples.
  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  /// The most recent retained sample.
  pub fn last(&self) -> Option<&Sample> {
    self.samples.last()
  }

  /// The sample `n` positions from the end (`from_end(0)` is the most
  /// recent).
  pub fn from_end(&self, n: usize) -> Option<&Sample> {
    self
      .samples
      .len()
      .checked_sub(n + 1)
      .and_then(|index| self.samples.get(index))
  }

  /// All retained samples in temporal order.
  pub fn samples(&self) -> &[Sample] {
    &self.samples
  }

  /// Drops every sample whose score is strictly lower than the score of
  /// the immediately preceding retained sample.
  ///
  /// Single left-to-right in-place compaction: each sample is compared
  /// against the last sample that survived, so the output is fully
  /// non-decreasing and re-filtering is a no-op. Must run before every
  /// stability evaluation.
  pub fn filter_monotonic(&mut self) {
    let mut last_retained: Option<f64> = None;
    self.samples.retain(|sample| {
      let keep = last_retained.map_or(true, |prev| sample.score >= prev);
      if keep {
        last_retained = Some(sample.score);
      }
      keep
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn series_of(scores: &[f64]) -> SampleSeries {
    let mut series = SampleSeries::new();
    for (i, &score) in scores.iter().enumerate() {
      series.push(Sample {
        t: i as f64 * 100.0,
        score,
      });
    }
    series
  }

  fn scores(series: &SampleSeries) -> Vec<f64> {
    series.samples().iter().map(|s| s.score).collect()
  }

  #[test]
  fn push_preserves_order() {
    let series = series_of(&[1.0, 2.0, 3.0]);
    assert_eq!(scores(&series), vec![1.0, 2.0, 3.0]);
  }

  #[test]
  fn from_end_indexes_backwards() {
    let series = series_of(&[1.0, 2.0, 3.0]);
    assert_eq!(series.from_end(0).unwrap().score, 3.0);
    assert_eq!(series.from_end(2).unwrap().score, 1.0);
    assert!(series.from_end(3).is_none());
  }

  #[test]
  fn filter_drops_strictly_lower_samples() {
    let mut series = series_of(&[0.0, 10.0, 5.0, 20.0]);
    series.filter_monotonic();
    assert_eq!(scores(&series), vec![0.0, 10.0, 20.0]);
  }

  #[test]
  fn filter_keeps_equal_scores() {
    let mut series = series_of(&[5.0, 5.0, 5.0]);
    series.filter_monotonic();
    assert_eq!(series.len(), 3);
  }

  #[test]
  fn filter_compacts_consecutive_drops_against_last_retained() {
    let mut series = series_of(&[5.0, 3.0, 1.0]);
    series.filter_monotonic();
    assert_eq!(scores(&series), vec![5.0]);
  }

  #[test]
  fn filter_output_is_adjacent_pair_non_decreasing() {
    let mut series = series_of(&[2.0, 9.0, 4.0, 6.0, 6.0, 1.0, 12.0]);
    series.filter_monotonic();
    let filtered = scores(&series);
    assert!(filtered.windows(2).all(|pair| pair[0] <= pair[1]));
  }

  #[test]
  fn filter_is_idempotent() {
    let mut series = series_of(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
    series.filter_monotonic();
    let once = scores(&series);
    series.filter_monotonic();
    assert_eq!(scores(&series), once);
  }

  #[test]
  fn filter_on_empty_series_is_a_no_op() {
    let mut series = SampleSeries::new();
    series.filter_monotonic();
    assert!(series.is_empty());
  }
}
