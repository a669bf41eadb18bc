//! Tree-walk capability for render scoring
//!
//! The engine never touches a live platform DOM. Instead it walks any tree
//! that implements the small [`DomNode`] capability trait: a node category,
//! ordered children, an above-the-fold visibility answer, and the two image
//! sources (element `src` and resolved CSS `background-image`). This keeps
//! the scorer and the image walk pure and unit-testable with synthetic
//! trees, and leaves snapshotting the real document to the embedder.
//!
//! [`SyntheticNode`] is the reference implementation: an owned tree with
//! explicit geometry answers, used by embedders that snapshot a platform
//! tree per mutation notification and by every test in this crate.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// Viewport height assumed by [`SyntheticNode`] when none is given, in CSS
/// pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;

/// Coarse node category used by the scoring and image walks.
///
/// Categories deliberately carry less information than a tag name: the
/// engine only distinguishes the handful of kinds its heuristics treat
/// specially and folds everything else into [`NodeCategory::Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
  /// The document root itself
  Document,
  /// The document head
  Head,
  /// The document body
  Body,
  /// A script element
  Script,
  /// A style element
  Style,
  /// A meta element
  Meta,
  /// An image element (carries a source URL)
  Image,
  /// Any other element
  Element,
}

impl NodeCategory {
  /// Categories that contribute nothing to the render score and whose
  /// children are not recursed into while scoring.
  pub fn is_scoring_excluded(self) -> bool {
    matches!(
      self,
      NodeCategory::Script | NodeCategory::Style | NodeCategory::Meta | NodeCategory::Head
    )
  }

  /// Categories the first-screen image walk never records or
  /// visibility-tests themselves (their children are still walked).
  ///
  /// The body is exempt so an off-screen body offset can never hide the
  /// whole document from image collection.
  pub fn is_image_walk_exempt(self) -> bool {
    matches!(
      self,
      NodeCategory::Body | NodeCategory::Script | NodeCategory::Style | NodeCategory::Head
    )
  }
}

/// Per-node tree-walk capability consumed by the scorer and the
/// first-screen image walk.
///
/// Implementations are expected to be cheap snapshots: all answers describe
/// the tree at the instant of the mutation notification that produced it.
///
/// # Geometry faults
///
/// [`top_within_viewport`](DomNode::top_within_viewport) is fallible.
/// A node that returns an error is treated as contributing zero to the
/// render score, and as off-screen by the image walk; the surrounding walk
/// always continues.
pub trait DomNode: Sized {
  /// The node's coarse category.
  fn category(&self) -> NodeCategory;

  /// The node's direct children, in document order.
  fn children(&self) -> Vec<&Self>;

  /// Whether the node's layout top offset is above the fold, i.e. strictly
  /// less than the viewport height.
  fn top_within_viewport(&self) -> Result<bool, GeometryError>;

  /// Source URL for image nodes, `None` otherwise.
  fn image_src(&self) -> Option<String>;

  /// The node's resolved CSS `background-image` value, `None` when the
  /// style could not be resolved. The literal string `"none"` is the
  /// sentinel for "no background image"; other values carry the CSS
  /// `url(...)` wrapper and optional quotes.
  fn background_image(&self) -> Option<String>;
}

/// Owned reference tree for tests and snapshotting embedders.
///
/// A `SyntheticNode` answers every [`DomNode`] question from explicit
/// fields, so trees with any mix of visibility, geometry faults, and image
/// sources can be assembled directly.
///
/// # Examples
///
/// ```
/// use fastpaint::dom::{DomNode, NodeCategory, SyntheticNode};
///
/// let body = SyntheticNode::body().with_child(
///   SyntheticNode::image("hero.png").with_top_offset(120.0),
/// );
///
/// assert_eq!(body.category(), NodeCategory::Body);
/// assert_eq!(body.children().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticNode {
  category: NodeCategory,
  children: Vec<SyntheticNode>,
  /// Layout top offset in CSS pixels; `None` models a geometry fault.
  top_offset: Option<f32>,
  viewport_height: f32,
  image_src: Option<String>,
  background_image: Option<String>,
}

impl SyntheticNode {
  /// Creates a node of the given category, above the fold at offset 0.
  pub fn new(category: NodeCategory) -> Self {
    Self {
      category,
      children: Vec::new(),
      top_offset: Some(0.0),
      viewport_height: DEFAULT_VIEWPORT_HEIGHT,
      image_src: None,
      background_image: None,
    }
  }

  /// Creates a generic element node.
  pub fn element() -> Self {
    Self::new(NodeCategory::Element)
  }

  /// Creates a document body node.
  pub fn body() -> Self {
    Self::new(NodeCategory::Body)
  }

  /// Creates an image node with the given source URL.
  pub fn image(src: impl Into<String>) -> Self {
    let mut node = Self::new(NodeCategory::Image);
    node.image_src = Some(src.into());
    node
  }

  /// Sets the layout top offset in CSS pixels.
  pub fn with_top_offset(mut self, top: f32) -> Self {
    self.top_offset = Some(top);
    self
  }

  /// Sets the viewport height the above-the-fold test compares against.
  pub fn with_viewport_height(mut self, height: f32) -> Self {
    self.viewport_height = height;
    self
  }

  /// Marks the node's geometry as unavailable, modelling a layout access
  /// fault.
  pub fn with_geometry_fault(mut self) -> Self {
    self.top_offset = None;
    self
  }

  /// Sets the resolved CSS `background-image` value (use `"none"` for the
  /// no-image sentinel).
  pub fn with_background_image(mut self, value: impl Into<String>) -> Self {
    self.background_image = Some(value.into());
    self
  }

  /// Appends a child node.
  pub fn with_child(mut self, child: SyntheticNode) -> Self {
    self.children.push(child);
    self
  }

  /// Replaces the child list.
  pub fn with_children(mut self, children: Vec<SyntheticNode>) -> Self {
    self.children = children;
    self
  }
}

impl DomNode for SyntheticNode {
  fn category(&self) -> NodeCategory {
    self.category
  }

  fn children(&self) -> Vec<&Self> {
    self.children.iter().collect()
  }

  fn top_within_viewport(&self) -> Result<bool, GeometryError> {
    match self.top_offset {
      Some(top) => Ok(top < self.viewport_height),
      None => Err(GeometryError::NoLayoutBox),
    }
  }

  fn image_src(&self) -> Option<String> {
    self.image_src.clone()
  }

  fn background_image(&self) -> Option<String> {
    self.background_image.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scoring_exclusions_cover_non_rendering_categories() {
    assert!(NodeCategory::Script.is_scoring_excluded());
    assert!(NodeCategory::Style.is_scoring_excluded());
    assert!(NodeCategory::Meta.is_scoring_excluded());
    assert!(NodeCategory::Head.is_scoring_excluded());
    assert!(!NodeCategory::Body.is_scoring_excluded());
    assert!(!NodeCategory::Image.is_scoring_excluded());
    assert!(!NodeCategory::Element.is_scoring_excluded());
  }

  #[test]
  fn image_walk_exempts_body_but_not_meta() {
    assert!(NodeCategory::Body.is_image_walk_exempt());
    assert!(!NodeCategory::Meta.is_image_walk_exempt());
  }

  #[test]
  fn synthetic_node_above_fold_compares_top_to_viewport() {
    let visible = SyntheticNode::element().with_top_offset(599.0);
    let hidden = SyntheticNode::element().with_top_offset(600.0);
    assert_eq!(visible.top_within_viewport().unwrap(), true);
    assert_eq!(hidden.top_within_viewport().unwrap(), false);
  }

  #[test]
  fn synthetic_node_geometry_fault_surfaces_as_error() {
    let faulted = SyntheticNode::element().with_geometry_fault();
    assert!(faulted.top_within_viewport().is_err());
  }

  #[test]
  fn synthetic_node_custom_viewport_height() {
    let node = SyntheticNode::element()
      .with_top_offset(500.0)
      .with_viewport_height(480.0);
    assert_eq!(node.top_within_viewport().unwrap(), false);
  }
}
