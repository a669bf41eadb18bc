//! Render-weight scoring for DOM subtrees
//!
//! Assigns a heuristic numeric weight to a subtree at a point in time:
//! deeper, visible, still-rendering nodes count more, and subtrees that
//! never become visible and never cause any descendant to render are
//! pruned so off-screen DOM growth does not inflate the score.
//!
//! The scorer is a pure function over the [`DomNode`] capability; it keeps
//! no state between calls. One scoring pass runs per mutation notification
//! and produces one sample for the stability series.

use crate::dom::DomNode;
use log::trace;

/// Weight every counted node contributes regardless of depth.
pub const BASE_NODE_WEIGHT: f64 = 1.0;

/// Additional weight per level of depth.
pub const DEPTH_WEIGHT: f64 = 0.5;

/// Depth at which the document root is scored.
pub const ROOT_DEPTH: u32 = 1;

/// A counted node's own weight at the given depth.
///
/// # Examples
///
/// ```
/// use fastpaint::score::node_weight;
///
/// assert_eq!(node_weight(1), 1.5);
/// assert_eq!(node_weight(3), 2.5);
/// ```
pub fn node_weight(depth: u32) -> f64 {
  BASE_NODE_WEIGHT + DEPTH_WEIGHT * f64::from(depth)
}

/// Scores a subtree rooted at `node`.
///
/// Excluded categories (script, style, meta, head) contribute zero and are
/// not recursed into. Every other node sums its children's scores (each
/// child sees `depth + 1` and whether an earlier sibling already yielded a
/// positive score), then adds its own weight of `1 + 0.5 * depth` — unless
/// the subtree produced nothing, no ancestor or prior sibling produced
/// anything (`ancestor_had_score` is false), and the node itself sits below
/// the fold, in which case the whole subtree contributes exactly zero.
///
/// A geometry fault while answering the visibility question counts as
/// failing it: the node contributes zero and the walk continues.
///
/// # Examples
///
/// ```
/// use fastpaint::dom::SyntheticNode;
/// use fastpaint::score::{score_subtree, ROOT_DEPTH};
///
/// let body = SyntheticNode::body().with_child(SyntheticNode::element());
/// let score = score_subtree(&body, ROOT_DEPTH, false);
/// // body at depth 1 (1.5) plus one child at depth 2 (2.0)
/// assert_eq!(score, 3.5);
/// ```
pub fn score_subtree<N: DomNode>(node: &N, depth: u32, ancestor_had_score: bool) -> f64 {
  if node.category().is_scoring_excluded() {
    return 0.0;
  }

  let mut child_score = 0.0;
  for child in node.children() {
    child_score += score_subtree(child, depth + 1, ancestor_had_score || child_score > 0.0);
  }

  if child_score <= 0.0 && !ancestor_had_score {
    let above_fold = match node.top_within_viewport() {
      Ok(above_fold) => above_fold,
      Err(err) => {
        trace!("geometry fault at depth {depth}, pruning subtree: {err}");
        false
      }
    };
    if !above_fold {
      return 0.0;
    }
  }

  child_score + node_weight(depth)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dom::{NodeCategory, SyntheticNode};

  #[test]
  fn visible_leaf_scores_its_depth_weight() {
    let leaf = SyntheticNode::element().with_top_offset(100.0);
    assert_eq!(score_subtree(&leaf, 1, false), 1.5);
    assert_eq!(score_subtree(&leaf, 3, false), 2.5);
  }

  #[test]
  fn offscreen_leaf_scores_zero() {
    let leaf = SyntheticNode::element().with_top_offset(700.0);
    assert_eq!(score_subtree(&leaf, 1, false), 0.0);
  }

  #[test]
  fn offscreen_leaf_counts_when_ancestor_already_scored() {
    let leaf = SyntheticNode::element().with_top_offset(700.0);
    assert_eq!(score_subtree(&leaf, 2, true), 2.0);
  }

  #[test]
  fn excluded_categories_score_zero_and_skip_children() {
    for category in [
      NodeCategory::Script,
      NodeCategory::Style,
      NodeCategory::Meta,
      NodeCategory::Head,
    ] {
      let node = SyntheticNode::new(category).with_child(SyntheticNode::element());
      assert_eq!(score_subtree(&node, 1, false), 0.0);
    }
  }

  #[test]
  fn nested_visible_tree_accumulates_depth_weights() {
    // body(d1) -> div(d2) -> span(d3): 1.5 + 2.0 + 2.5
    let tree = SyntheticNode::body()
      .with_child(SyntheticNode::element().with_child(SyntheticNode::element()));
    assert_eq!(score_subtree(&tree, ROOT_DEPTH, false), 6.0);
  }

  #[test]
  fn offscreen_parent_with_visible_descendant_still_counts() {
    // The child renders, so the parent is kept without a visibility test.
    let tree = SyntheticNode::element()
      .with_top_offset(900.0)
      .with_child(SyntheticNode::element().with_top_offset(100.0));
    assert_eq!(score_subtree(&tree, 1, false), 3.5);
  }

  #[test]
  fn fully_offscreen_subtree_is_pruned() {
    let tree = SyntheticNode::element()
      .with_top_offset(900.0)
      .with_child(SyntheticNode::element().with_top_offset(950.0));
    assert_eq!(score_subtree(&tree, 1, false), 0.0);
  }

  #[test]
  fn geometry_fault_contributes_zero_without_aborting_walk() {
    let tree = SyntheticNode::body()
      .with_child(SyntheticNode::element().with_geometry_fault())
      .with_child(SyntheticNode::element().with_top_offset(50.0));
    // Faulted child: 0. Visible child at depth 2: 2.0. Body itself: 1.5.
    assert_eq!(score_subtree(&tree, ROOT_DEPTH, false), 3.5);
  }

  #[test]
  fn later_sibling_sees_flag_from_earlier_scoring_sibling() {
    // First child scores; the off-screen second child is then counted
    // without a visibility test.
    let tree = SyntheticNode::body()
      .with_child(SyntheticNode::element().with_top_offset(10.0))
      .with_child(SyntheticNode::element().with_top_offset(2000.0));
    assert_eq!(score_subtree(&tree, ROOT_DEPTH, false), 5.5);
  }
}
