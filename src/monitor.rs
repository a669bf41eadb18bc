//! First Meaningful Paint monitor
//!
//! `FmpMonitor` orchestrates the scoring, series, stability, change-locate,
//! and image-timing pieces against the embedder's event stream for one
//! page-load evaluation:
//!
//! - every mutation notification scores the current document root and
//!   appends a sample, then evaluates the stability decider;
//! - a non-settling evaluation asks the embedder to schedule a single
//!   re-check after the poll interval, replacing any pending one;
//! - on settlement the series is filtered, the largest-change timestamp
//!   and the first-screen image time are combined into the final metric,
//!   and the `on_fmp` callback fires exactly once.
//!
//! The monitor owns all evaluation state (series, decider, pending
//! re-check); constructing a monitor per page load and dropping it after
//! settlement is the whole lifecycle. Nothing here blocks or spawns: the
//! embedder drives the monitor from its own notification and timer
//! callbacks, honouring the returned [`Directive`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use fastpaint::monitor::{Directive, FmpMonitor, MonotonicClock};
//!
//! let mut monitor = FmpMonitor::builder(MonotonicClock::new(), timing)
//!   .base_url("https://example.com/")
//!   .on_fmp(|ms| println!("fmp: {ms} ms"))
//!   .build();
//!
//! // From the mutation observer:
//! match monitor.on_mutation(Some(&snapshot)) {
//!   Directive::ScheduleRecheck { delay_ms } => schedule(delay_ms),
//!   Directive::Finished => {}
//! }
//!
//! // From the scheduled timer:
//! monitor.on_poll(Some(&snapshot));
//! ```

use crate::change::largest_increase;
use crate::dom::DomNode;
use crate::image_timing::{ImageTimingResolver, ResourceTiming};
use crate::score::{score_subtree, ROOT_DEPTH};
use crate::series::{Sample, SampleSeries};
use crate::stability::{SettleReason, StabilityDecider, POLL_INTERVAL_MS};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Fallback DOM candidate when the locator finds no change, in ms.
pub const DEFAULT_FMP_MS: f64 = 30_000.0;

/// Time source for the evaluation: milliseconds elapsed since navigation
/// start.
pub trait Clock {
  /// Milliseconds since navigation start.
  fn elapsed_ms(&self) -> f64;
}

/// [`Clock`] backed by a monotonic instant taken at construction.
///
/// Suitable when the monitor is created at navigation start; embedders
/// with a real navigation-timing source should implement [`Clock`] over it
/// instead.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
  start: Instant,
}

impl MonotonicClock {
  /// Starts the clock now.
  pub fn new() -> Self {
    Self {
      start: Instant::now(),
    }
  }

  /// Starts the clock at an instant captured earlier.
  pub fn from_start(start: Instant) -> Self {
    Self { start }
  }
}

impl Default for MonotonicClock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock for MonotonicClock {
  fn elapsed_ms(&self) -> f64 {
    self.start.elapsed().as_secs_f64() * 1_000.0
  }
}

/// Callback receiving the final metric, in whole milliseconds.
pub type FmpCallback = Box<dyn FnMut(u64)>;

/// Configuration for an [`FmpMonitor`].
#[derive(Debug, Clone)]
pub struct FmpConfig {
  /// DOM candidate reported when the change locator yields nothing
  pub default_fmp_ms: f64,

  /// Delay between stability re-checks
  pub poll_interval_ms: f64,

  /// Base URL for resolving relative image candidate references
  pub base_url: Option<String>,

  /// Whether the whole-document load had already finished when the
  /// monitor attached
  pub load_already_complete: bool,
}

impl Default for FmpConfig {
  fn default() -> Self {
    Self {
      default_fmp_ms: DEFAULT_FMP_MS,
      poll_interval_ms: POLL_INTERVAL_MS,
      base_url: None,
      load_already_complete: false,
    }
  }
}

/// What the embedder should do after an event was processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
  /// Schedule a single re-check (`on_poll`) after this many milliseconds,
  /// cancelling any previously requested re-check first.
  ScheduleRecheck {
    /// Delay until the re-check, ms
    delay_ms: f64,
  },

  /// Monitoring is complete; cancel any pending re-check and stop
  /// delivering events.
  Finished,
}

/// The settled evaluation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FmpEstimate {
  /// Final metric: max of the DOM and image candidates, whole ms
  pub fmp_ms: u64,
  /// DOM-derived candidate (largest-change timestamp or the default)
  pub dom_candidate_ms: f64,
  /// First-screen image completion candidate
  pub image_candidate_ms: f64,
  /// Which criterion ended the observation
  pub reason: SettleReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Observing,
  Done,
}

/// Builder for [`FmpMonitor`].
pub struct FmpMonitorBuilder<C, T> {
  config: FmpConfig,
  clock: C,
  timing: T,
  on_fmp: Option<FmpCallback>,
}

impl<C: Clock, T: ResourceTiming> FmpMonitorBuilder<C, T> {
  /// Creates a builder with the default configuration.
  pub fn new(clock: C, timing: T) -> Self {
    Self {
      config: FmpConfig::default(),
      clock,
      timing,
      on_fmp: None,
    }
  }

  /// Sets the DOM candidate used when the change locator yields nothing.
  pub fn default_fmp_ms(mut self, ms: f64) -> Self {
    self.config.default_fmp_ms = ms;
    self
  }

  /// Sets the delay between stability re-checks.
  pub fn poll_interval_ms(mut self, ms: f64) -> Self {
    self.config.poll_interval_ms = ms;
    self
  }

  /// Sets the base URL for resolving relative image references.
  pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
    self.config.base_url = Some(base_url.into());
    self
  }

  /// Marks the whole-document load as already finished at attach time.
  pub fn load_already_complete(mut self) -> Self {
    self.config.load_already_complete = true;
    self
  }

  /// Sets the callback receiving the final metric. Invoked exactly once;
  /// omitting it is allowed and simply skips reporting.
  pub fn on_fmp(mut self, callback: impl FnMut(u64) + 'static) -> Self {
    self.on_fmp = Some(Box::new(callback));
    self
  }

  /// Builds the monitor.
  pub fn build(self) -> FmpMonitor<C, T> {
    FmpMonitor::with_config(self.config, self.clock, self.timing, self.on_fmp)
  }
}

/// Render-stability monitor producing one First Meaningful Paint estimate
/// per instance.
///
/// Drive it with [`on_mutation`](FmpMonitor::on_mutation) for every change
/// notification, [`on_poll`](FmpMonitor::on_poll) when a scheduled
/// re-check fires, and
/// [`notify_load_complete`](FmpMonitor::notify_load_complete) when the
/// whole-document load finishes. An initial `on_poll` right after
/// construction mirrors the immediate first evaluation of monitors
/// attached to already-loading documents.
pub struct FmpMonitor<C: Clock, T: ResourceTiming> {
  config: FmpConfig,
  clock: C,
  resolver: ImageTimingResolver<T>,
  series: SampleSeries,
  decider: StabilityDecider,
  load_complete: bool,
  pending_recheck_at: Option<f64>,
  on_fmp: Option<FmpCallback>,
  estimate: Option<FmpEstimate>,
  phase: Phase,
}

impl<C: Clock, T: ResourceTiming> FmpMonitor<C, T> {
  /// Creates a monitor with the default configuration and no callback.
  pub fn new(clock: C, timing: T) -> Self {
    Self::with_config(FmpConfig::default(), clock, timing, None)
  }

  /// Creates a builder.
  pub fn builder(clock: C, timing: T) -> FmpMonitorBuilder<C, T> {
    FmpMonitorBuilder::new(clock, timing)
  }

  /// Creates a monitor from explicit parts.
  pub fn with_config(
    config: FmpConfig,
    clock: C,
    timing: T,
    on_fmp: Option<FmpCallback>,
  ) -> Self {
    let mut resolver = ImageTimingResolver::new(timing);
    if let Some(base_url) = &config.base_url {
      resolver = resolver.with_base_url(base_url.clone());
    }
    let load_complete = config.load_already_complete;

    Self {
      config,
      clock,
      resolver,
      series: SampleSeries::new(),
      decider: StabilityDecider::new(),
      load_complete,
      pending_recheck_at: None,
      on_fmp,
      estimate: None,
      phase: Phase::Observing,
    }
  }

  /// Handles one mutation notification: scores the current root (zero when
  /// it is unavailable), appends the sample, and evaluates stability.
  ///
  /// Ignored once monitoring has finished.
  pub fn on_mutation<N: DomNode>(&mut self, root: Option<&N>) -> Directive {
    if self.phase == Phase::Done {
      return Directive::Finished;
    }

    let t = self.clock.elapsed_ms();
    let score = root
      .map(|root| score_subtree(root, ROOT_DEPTH, false))
      .unwrap_or(0.0);
    trace!("sample at {t:.0} ms: score {score:.1}");
    self.series.push(Sample { t, score });

    self.evaluate(root, t)
  }

  /// Handles a scheduled re-check: clears the pending re-check and
  /// re-evaluates stability against the current clock, without appending
  /// a sample.
  ///
  /// Ignored once monitoring has finished.
  pub fn on_poll<N: DomNode>(&mut self, root: Option<&N>) -> Directive {
    if self.phase == Phase::Done {
      return Directive::Finished;
    }

    self.pending_recheck_at = None;
    let elapsed = self.clock.elapsed_ms();
    self.evaluate(root, elapsed)
  }

  /// Latches the one-shot whole-document load-complete signal. Idempotent.
  pub fn notify_load_complete(&mut self) {
    self.load_complete = true;
  }

  /// Cancels the pending re-check and stops accepting events, without
  /// reporting. The estimate, if settlement already happened, is kept.
  pub fn shutdown(&mut self) {
    self.pending_recheck_at = None;
    self.phase = Phase::Done;
  }

  /// Whether monitoring has finished (settled or shut down).
  pub fn is_done(&self) -> bool {
    self.phase == Phase::Done
  }

  /// Absolute deadline (ms since navigation start) of the pending
  /// re-check requested by the last directive, if one is outstanding.
  pub fn pending_recheck_at(&self) -> Option<f64> {
    self.pending_recheck_at
  }

  /// The settled evaluation, once settlement has happened.
  pub fn estimate(&self) -> Option<&FmpEstimate> {
    self.estimate.as_ref()
  }

  /// The recorded sample series (filtered as of the last evaluation).
  pub fn series(&self) -> &SampleSeries {
    &self.series
  }

  fn evaluate<N: DomNode>(&mut self, root: Option<&N>, elapsed: f64) -> Directive {
    self.series.filter_monotonic();

    match self
      .decider
      .evaluate(&self.series, elapsed, self.load_complete)
    {
      Some(reason) => {
        self.finalize(root, reason);
        Directive::Finished
      }
      None => {
        // Cancel-then-schedule: at most one pending re-check.
        self.pending_recheck_at = Some(elapsed + self.config.poll_interval_ms);
        Directive::ScheduleRecheck {
          delay_ms: self.config.poll_interval_ms,
        }
      }
    }
  }

  fn finalize<N: DomNode>(&mut self, root: Option<&N>, reason: SettleReason) {
    self.phase = Phase::Done;
    self.pending_recheck_at = None;

    // The series was filtered on the way into the settling evaluation.
    let dom_candidate_ms = largest_increase(&self.series)
      .map(|record| record.t)
      .unwrap_or(self.config.default_fmp_ms);
    let image_candidate_ms = root
      .map(|root| self.resolver.first_screen_image_time(root))
      .unwrap_or(0.0);

    let fmp_ms = dom_candidate_ms.max(image_candidate_ms).max(0.0).round() as u64;
    debug!(
      "fmp {fmp_ms} ms (dom {dom_candidate_ms:.0}, images {image_candidate_ms:.0}, {reason:?})"
    );

    self.estimate = Some(FmpEstimate {
      fmp_ms,
      dom_candidate_ms,
      image_candidate_ms,
      reason,
    });

    // Taking the callback out guarantees at-most-once reporting.
    if let Some(mut on_fmp) = self.on_fmp.take() {
      on_fmp(fmp_ms);
    }
  }
}
