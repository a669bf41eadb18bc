pub mod change;
pub mod dom;
pub mod error;
pub mod image_timing;
pub mod monitor;
pub mod score;
pub mod series;
pub mod stability;

pub use change::{largest_increase, ChangeRecord};
pub use dom::{DomNode, NodeCategory, SyntheticNode};
pub use error::{Error, GeometryError, Result, TimingError};
pub use image_timing::{collect_candidates, css_url_value, ImageTimingResolver, ResourceTiming};
pub use monitor::{
  Clock, Directive, FmpCallback, FmpConfig, FmpEstimate, FmpMonitor, FmpMonitorBuilder,
  MonotonicClock, DEFAULT_FMP_MS,
};
pub use score::{node_weight, score_subtree, ROOT_DEPTH};
pub use series::{Sample, SampleSeries};
pub use stability::{SettleReason, StabilityDecider, HARD_TIMEOUT_MS, POLL_INTERVAL_MS};
