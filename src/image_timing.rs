//! First-screen image timing
//!
//! The DOM-derived candidate alone under-reports pages whose above-the-fold
//! content is dominated by images: the tree stops changing well before the
//! pixels arrive. This module walks the settled tree for image URLs that
//! are visible without scrolling — element `src` attributes and CSS
//! `background-image` values — and resolves each to a network completion
//! time through the [`ResourceTiming`] capability. The maximum completion
//! time is folded into the final metric.
//!
//! Per-URL lookup failures contribute zero and are never fatal; an
//! off-screen or geometry-faulted node hides its whole subtree from
//! collection, except the document body, which is always walked through.

use crate::dom::DomNode;
use crate::error::TimingError;
use log::warn;
use std::sync::Arc;
use url::Url;

/// Resolves a resource URL to the time its network fetch completed,
/// in milliseconds since navigation start.
///
/// The reference browser source is a resource-timing entry's
/// `responseEnd`. Implementations report a [`TimingError`] when no entry
/// exists or the lookup fails; the caller treats either as zero.
pub trait ResourceTiming {
  /// Completion time for `url`, ms since navigation start.
  fn completion_time(&self, url: &str) -> Result<f64, TimingError>;
}

// Allow Arc<dyn ResourceTiming> to be used as ResourceTiming
impl<T: ResourceTiming + ?Sized> ResourceTiming for Arc<T> {
  fn completion_time(&self, url: &str) -> Result<f64, TimingError> {
    (**self).completion_time(url)
  }
}

/// Extracts the URL from a CSS `url(...)` value, stripping the wrapper and
/// surrounding quotes.
///
/// Returns `None` for values that are not a single `url(...)` token (e.g.
/// gradients or the `none` sentinel), and for empty references.
///
/// # Examples
///
/// ```
/// use fastpaint::image_timing::css_url_value;
///
/// assert_eq!(
///   css_url_value("url(\"https://example.com/bg.png\")").as_deref(),
///   Some("https://example.com/bg.png")
/// );
/// assert_eq!(css_url_value("url(bg.png)").as_deref(), Some("bg.png"));
/// assert_eq!(css_url_value("none"), None);
/// assert_eq!(css_url_value("linear-gradient(red, blue)"), None);
/// ```
pub fn css_url_value(value: &str) -> Option<String> {
  let trimmed = value.trim();
  let inner = trimmed.strip_prefix("url(")?.strip_suffix(')')?;
  let unquoted = inner.trim().trim_matches('"').trim_matches('\'');
  if unquoted.is_empty() {
    None
  } else {
    Some(unquoted.to_string())
  }
}

/// Collects candidate image URLs from the above-the-fold portion of the
/// tree, in discovery order.
///
/// Depth-first walk. Nodes outside the exempt categories (body, script,
/// style, head) must pass the above-the-fold test or their whole subtree
/// is skipped; a geometry fault counts as failing. Visible image nodes
/// contribute their `src`; other visible nodes contribute their resolved
/// background image when it is a `url(...)` value rather than the `none`
/// sentinel. Duplicates are permitted — they resolve to the same
/// completion time and cannot change the maximum.
pub fn collect_candidates<N: DomNode>(root: &N) -> Vec<String> {
  let mut candidates = Vec::new();
  collect_into(root, &mut candidates);
  candidates
}

fn collect_into<N: DomNode>(node: &N, out: &mut Vec<String>) {
  let category = node.category();
  if !category.is_image_walk_exempt() {
    match node.top_within_viewport() {
      Ok(true) => {}
      Ok(false) => return,
      Err(err) => {
        warn!("geometry fault during image walk, skipping subtree: {err}");
        return;
      }
    }
    if let Some(src) = node.image_src() {
      out.push(src);
    } else if let Some(value) = node.background_image() {
      if value != "none" {
        if let Some(resource) = css_url_value(&value) {
          out.push(resource);
        }
      }
    }
  }

  for child in node.children() {
    collect_into(child, out);
  }
}

/// Resolves a potentially relative candidate URL to the absolute form used
/// as the resource-timing key.
///
/// Absolute and `data:` URLs pass through (absolute URLs re-serialized in
/// normalized form); relative references are joined against `base_url`
/// when one is configured, and returned unchanged otherwise.
pub fn resolve_candidate_url(url: &str, base_url: Option<&str>) -> String {
  if url.is_empty() {
    return String::new();
  }

  if url.starts_with("data:") {
    return url.to_string();
  }
  if let Ok(parsed) = Url::parse(url) {
    return parsed.to_string();
  }

  if let Some(base) = base_url {
    if let Ok(base) = Url::parse(base) {
      if let Ok(joined) = base.join(url) {
        return joined.to_string();
      }
    }
  }

  // No usable base; return the reference unchanged.
  url.to_string()
}

/// Resolves first-screen image candidates to the latest network completion
/// time.
///
/// Holds the [`ResourceTiming`] capability and an optional document base
/// URL for resolving relative references before lookup.
#[derive(Debug, Clone)]
pub struct ImageTimingResolver<T> {
  timing: T,
  base_url: Option<String>,
}

impl<T: ResourceTiming> ImageTimingResolver<T> {
  /// Creates a resolver over the given timing source.
  pub fn new(timing: T) -> Self {
    Self {
      timing,
      base_url: None,
    }
  }

  /// Sets the base URL used to resolve relative candidate references.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = Some(base_url.into());
    self
  }

  /// The configured base URL, if any.
  pub fn base_url(&self) -> Option<&str> {
    self.base_url.as_deref()
  }

  /// Walks the tree for first-screen image candidates and returns the
  /// maximum completion time across them, or 0 when there are no
  /// candidates (or none resolves).
  ///
  /// Lookup failures are swallowed per URL and contribute zero.
  pub fn first_screen_image_time<N: DomNode>(&self, root: &N) -> f64 {
    let candidates = collect_candidates(root);
    let mut max_time = 0.0_f64;
    for raw in &candidates {
      let url = resolve_candidate_url(raw, self.base_url.as_deref());
      let time = match self.timing.completion_time(&url) {
        Ok(time) => time,
        Err(err) => {
          warn!("image timing unavailable for '{url}': {err}");
          0.0
        }
      };
      if time > max_time {
        max_time = time;
      }
    }
    max_time
  }
}
