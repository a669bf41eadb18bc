use fastpaint::dom::{NodeCategory, SyntheticNode};
use fastpaint::error::TimingError;
use fastpaint::image_timing::{collect_candidates, ImageTimingResolver, ResourceTiming};
use std::collections::HashMap;

struct MapTiming(HashMap<String, f64>);

impl MapTiming {
    fn of(entries: &[(&str, f64)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(url, time)| (url.to_string(), *time))
                .collect(),
        )
    }
}

impl ResourceTiming for MapTiming {
    fn completion_time(&self, url: &str) -> Result<f64, TimingError> {
        self.0
            .get(url)
            .copied()
            .ok_or_else(|| TimingError::EntryMissing {
                url: url.to_string(),
            })
    }
}

/// A page with a hero image and background above the fold, and a slow
/// footer image far below it.
fn page() -> SyntheticNode {
    SyntheticNode::body()
        .with_child(
            SyntheticNode::element()
                .with_top_offset(0.0)
                .with_background_image("url(\"hero-bg.jpg\")")
                .with_child(SyntheticNode::image("hero.png").with_top_offset(40.0)),
        )
        .with_child(
            SyntheticNode::element()
                .with_top_offset(2_400.0)
                .with_child(SyntheticNode::image("footer.png").with_top_offset(2_450.0)),
        )
        .with_child(SyntheticNode::new(NodeCategory::Script))
}

#[test]
fn below_the_fold_images_are_not_candidates() {
    assert_eq!(collect_candidates(&page()), vec!["hero-bg.jpg", "hero.png"]);
}

#[test]
fn slow_offscreen_images_cannot_inflate_the_metric() {
    let resolver = ImageTimingResolver::new(MapTiming::of(&[
        ("hero-bg.jpg", 1_900.0),
        ("hero.png", 2_500.0),
        ("footer.png", 9_999.0),
    ]));
    assert_eq!(resolver.first_screen_image_time(&page()), 2_500.0);
}

#[test]
fn relative_candidates_resolve_against_the_page_base() {
    let tree = SyntheticNode::body()
        .with_child(SyntheticNode::image("img/hero.png").with_top_offset(10.0));
    let resolver = ImageTimingResolver::new(MapTiming::of(&[(
        "https://example.com/assets/img/hero.png",
        1_750.0,
    )]))
    .with_base_url("https://example.com/assets/");

    assert_eq!(resolver.first_screen_image_time(&tree), 1_750.0);
}
