//! Tests for the detection pipeline.

use image::{DynamicImage, GrayImage};

use super::{detect, rank_components, DifferenceDetector, RegionCountWarning};
use crate::config::Config;
use crate::error::Error;
use crate::region::{Aabb, Component, DifferenceRegion};
use crate::test_utils::{edited_pair, solid_image, with_blocks, BACKGROUND, EDIT};

fn config(min_region_area: usize, merge_radius: usize, target_count: usize) -> Config {
    Config {
        min_region_area,
        merge_radius,
        target_count,
    }
}

/// Block of side `s` at `(x, y)` grown by `r` on each side, unclipped.
fn grown(x: u32, y: u32, s: u32, r: u32) -> DifferenceRegion {
    DifferenceRegion::new(x - r, y - r, s + 2 * r, s + 2 * r)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_identical_images_yield_no_regions() {
    let image = solid_image(100, 100, BACKGROUND);
    let result = detect(&image, &image, &Config::default()).unwrap();

    assert!(result.is_empty());
    assert_eq!(result.candidates, 0);
    assert_eq!(
        result.warning,
        Some(RegionCountWarning::Insufficient {
            found: 0,
            target: 5
        })
    );
}

#[test]
fn test_single_block_yields_one_region_covering_it() {
    let (a, b) = edited_pair(100, 100, &[(10, 10, 40, 40)]);
    let cfg = Config::default();
    let result = detect(&a, &b, &cfg).unwrap();

    assert_eq!(result.len(), 1);
    let region = result.regions[0];
    assert!(region.contains(&DifferenceRegion::new(10, 10, 40, 40)));

    // At most merge_radius of growth per side, clipped to the image.
    let r = cfg.merge_radius as u32;
    assert!(region.x >= 10u32.saturating_sub(r));
    assert!(region.y >= 10u32.saturating_sub(r));
    assert!(region.right() <= (50 + r).min(100));
    assert!(region.bottom() <= (50 + r).min(100));
}

#[test]
fn test_single_block_small_radius_exact_bounds() {
    let (a, b) = edited_pair(100, 100, &[(10, 10, 40, 40)]);
    let result = detect(&a, &b, &config(900, 5, 5)).unwrap();

    assert_eq!(result.regions, vec![DifferenceRegion::new(5, 5, 50, 50)]);
}

#[test]
fn test_block_below_min_area_is_filtered() {
    let (a, b) = edited_pair(100, 100, &[(10, 10, 40, 40)]);
    // Keep growth small so the dilated component stays under 2000 pixels.
    let result = detect(&a, &b, &config(2000, 1, 5)).unwrap();

    assert!(result.is_empty());
    assert_eq!(result.candidates, 0);
}

#[test]
fn test_block_below_min_area_is_filtered_at_default_radius() {
    // Dilation grows the box to the whole image, but only the 1600 changed
    // pixels count toward the area.
    let (a, b) = edited_pair(100, 100, &[(10, 10, 40, 40)]);
    let cfg = Config {
        min_region_area: 2000,
        ..Config::default()
    };
    let result = detect(&a, &b, &cfg).unwrap();

    assert_eq!(result.regions, Vec::<DifferenceRegion>::new());
    assert_eq!(result.candidates, 0);
}

#[test]
fn test_area_threshold_uses_changed_pixels_not_box() {
    let (a, b) = edited_pair(100, 100, &[(10, 10, 40, 40)]);
    let kept = detect(&a, &b, &config(1600, 50, 5)).unwrap();
    assert_eq!(kept.regions, vec![DifferenceRegion::new(0, 0, 100, 100)]);

    let dropped = detect(&a, &b, &config(1601, 50, 5)).unwrap();
    assert!(dropped.is_empty());
}

#[test]
fn test_sparse_noise_merged_by_dilation_is_filtered() {
    // Isolated changed pixels on a grid merge into one large box at this
    // radius but carry little changed area.
    let dots: Vec<(u32, u32, u32, u32)> = (0..10)
        .flat_map(|i| (0..10).map(move |j| (5 + i * 10, 5 + j * 10, 1, 1)))
        .collect();
    let (a, b) = edited_pair(100, 100, &dots);

    let result = detect(&a, &b, &config(900, 6, 5)).unwrap();
    assert!(result.is_empty());

    let kept = detect(&a, &b, &config(100, 6, 5)).unwrap();
    assert_eq!(kept.regions, vec![DifferenceRegion::new(0, 0, 100, 100)]);
}

#[test]
fn test_edit_inside_ring_edit_yields_single_region() {
    // A ring-shaped edit with a separate block inside its hole. Only the
    // outer boundary counts, so the inner block is not reported on its own.
    let ring = [
        (20, 20, 160, 10),
        (20, 170, 160, 10),
        (20, 30, 10, 140),
        (170, 30, 10, 140),
    ];
    let mut blocks = ring.to_vec();
    blocks.push((90, 90, 20, 20));
    let (a, b) = edited_pair(200, 200, &blocks);

    let result = detect(&a, &b, &config(100, 2, 5)).unwrap();
    assert_eq!(result.regions, vec![DifferenceRegion::new(18, 18, 164, 164)]);
    assert_eq!(result.candidates, 1);
}

#[test]
fn test_huge_merge_radius_does_not_overflow() {
    let (a, b) = edited_pair(100, 100, &[(10, 10, 40, 40)]);
    let result = detect(&a, &b, &config(900, usize::MAX, 5)).unwrap();
    assert_eq!(result.regions, vec![DifferenceRegion::new(0, 0, 100, 100)]);
}

const EIGHT_SIZES: [u32; 8] = [30, 55, 20, 45, 35, 50, 25, 40];

/// Eight blocks on a 4x2 grid of 250px cells, far enough apart that
/// dilation by 50 never merges or clips them.
fn eight_blocks() -> Vec<(u32, u32, u32, u32)> {
    EIGHT_SIZES
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let col = (i % 4) as u32;
            let row = (i / 4) as u32;
            (80 + 250 * col, 80 + 250 * row, s, s)
        })
        .collect()
}

#[test]
fn test_excess_regions_keep_five_largest() {
    let blocks = eight_blocks();
    let (a, b) = edited_pair(1000, 500, &blocks);
    // Every block (smallest is 20x20) clears the area filter.
    let result = detect(&a, &b, &config(300, 50, 5)).unwrap();

    assert_eq!(result.len(), 5);
    assert_eq!(result.candidates, 8);
    assert_eq!(
        result.warning,
        Some(RegionCountWarning::Excess {
            found: 8,
            target: 5
        })
    );

    let mut by_size = blocks.clone();
    by_size.sort_by(|a, b| b.2.cmp(&a.2));
    let expected: Vec<DifferenceRegion> = by_size[..5]
        .iter()
        .map(|&(x, y, s, _)| grown(x, y, s, 50))
        .collect();
    assert_eq!(result.regions, expected);
}

#[test]
fn test_insufficient_regions_returns_what_was_found() {
    let (a, b) = edited_pair(600, 300, &[(80, 80, 40, 40), (400, 100, 60, 60)]);
    let result = detect(&a, &b, &Config::default()).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.warning,
        Some(RegionCountWarning::Insufficient {
            found: 2,
            target: 5
        })
    );
    // Larger block first
    assert_eq!(result.regions[0], grown(400, 100, 60, 50));
    assert_eq!(result.regions[1], grown(80, 80, 40, 50));
}

#[test]
fn test_exact_target_has_no_warning() {
    let (a, b) = edited_pair(600, 300, &[(80, 80, 40, 40), (400, 100, 60, 60)]);
    let result = detect(&a, &b, &config(900, 50, 2)).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.warning, None);
}

#[test]
fn test_nearby_edits_merge_within_radius() {
    // Two 20x20 blocks with a 30px gap: merged at radius 15, separate at 10.
    let (a, b) = edited_pair(200, 100, &[(40, 40, 20, 20), (90, 40, 20, 20)]);

    let merged = detect(&a, &b, &config(100, 15, 5)).unwrap();
    assert_eq!(merged.len(), 1);

    let separate = detect(&a, &b, &config(100, 10, 5)).unwrap();
    assert_eq!(separate.len(), 2);
}

#[test]
fn test_subthreshold_change_is_noise() {
    let base = solid_image(100, 100, image::Rgb([100, 100, 100]));
    let faint = with_blocks(&base, &[(20, 20, 50, 50)], image::Rgb([125, 125, 125]));
    let result = detect(&base, &faint, &config(1, 5, 5)).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_grayscale_pair_is_supported() {
    let a = DynamicImage::ImageLuma8(GrayImage::from_pixel(80, 80, image::Luma([10])));
    let mut edited = GrayImage::from_pixel(80, 80, image::Luma([10]));
    for y in 30..50 {
        for x in 30..50 {
            edited.put_pixel(x, y, image::Luma([200]));
        }
    }
    let b = DynamicImage::ImageLuma8(edited);

    let result = detect(&a, &b, &config(100, 2, 5)).unwrap();
    assert_eq!(result.regions, vec![DifferenceRegion::new(28, 28, 24, 24)]);
}

#[test]
fn test_detect_is_order_symmetric() {
    let (a, b) = edited_pair(600, 300, &[(80, 80, 40, 40), (400, 100, 60, 60)]);
    let cfg = Config::default();
    assert_eq!(detect(&a, &b, &cfg).unwrap(), detect(&b, &a, &cfg).unwrap());
}

// =============================================================================
// Preconditions
// =============================================================================

#[test]
fn test_dimension_mismatch_fails() {
    let a = solid_image(100, 100, BACKGROUND);
    let b = solid_image(100, 90, BACKGROUND);
    match detect(&a, &b, &Config::default()) {
        Err(Error::DimensionMismatch { first, second }) => {
            assert_eq!((first.width, first.height), (100, 100));
            assert_eq!((second.width, second.height), (100, 90));
        }
        other => panic!("expected dimension mismatch, got {:?}", other),
    }
}

#[test]
fn test_channel_mismatch_fails() {
    let a = solid_image(50, 50, BACKGROUND);
    let b = DynamicImage::ImageLuma8(GrayImage::new(50, 50));
    assert!(matches!(
        detect(&a, &b, &Config::default()),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn test_invalid_config_fails_before_shape_check() {
    let a = solid_image(10, 10, BACKGROUND);
    let b = solid_image(20, 20, BACKGROUND);
    let result = detect(&a, &b, &config(900, 50, 0));
    assert!(matches!(
        result,
        Err(Error::InvalidConfig {
            parameter: "target_count",
            value: 0
        })
    ));
}

#[test]
fn test_detect_files_reports_missing_first_image() {
    let missing = std::env::temp_dir().join("spotdiff_detector_missing_image1.png");
    let result = DifferenceDetector::new().detect_files(&missing, &missing, &Config::default());
    assert!(matches!(
        result,
        Err(Error::Load {
            slot: crate::error::ImageSlot::First,
            ..
        })
    ));
}

// =============================================================================
// Properties
// =============================================================================

/// Blocks of assorted sizes, some close enough to merge at larger radii.
fn assorted_pair() -> (DynamicImage, DynamicImage) {
    edited_pair(
        400,
        300,
        &[
            (10, 10, 12, 12),
            (40, 15, 30, 30),
            (150, 20, 8, 40),
            (200, 150, 50, 25),
            (300, 200, 45, 45),
            (330, 40, 20, 20),
            (60, 220, 35, 10),
        ],
    )
}

#[test]
fn test_raising_min_area_never_adds_regions() {
    let (a, b) = assorted_pair();
    for radius in [1, 5, 20] {
        let mut previous = usize::MAX;
        for min_area in [1, 50, 200, 500, 900, 1500, 3000, 10_000] {
            let result = detect(&a, &b, &config(min_area, radius, 100)).unwrap();
            assert!(
                result.len() <= previous,
                "radius {} min_area {}: {} > {}",
                radius,
                min_area,
                result.len(),
                previous
            );
            previous = result.len();
        }
    }
}

#[test]
fn test_output_is_bounded_by_target_count() {
    let (a, b) = assorted_pair();
    for target in 1..=8 {
        let result = detect(&a, &b, &config(1, 3, target)).unwrap();
        assert!(result.len() <= target);
        assert_eq!(result.len(), target.min(result.candidates));
    }
}

#[test]
fn test_regions_lie_inside_image() {
    let (a, b) = edited_pair(120, 90, &[(0, 0, 30, 30), (100, 70, 20, 20), (50, 0, 10, 90)]);
    for radius in [1, 10, 50, 200] {
        let result = detect(&a, &b, &config(1, radius, 10)).unwrap();
        for region in &result.regions {
            assert!(region.width > 0 && region.height > 0);
            assert!(region.right() <= 120, "{:?}", region);
            assert!(region.bottom() <= 90, "{:?}", region);
        }
    }
}

#[test]
fn test_regions_ranked_by_source_component_area() {
    let (a, b) = assorted_pair();
    let detector = DifferenceDetector::new();
    let cfg = config(1, 4, 10);

    let components = detector.extract_components(&a, &b, cfg.merge_radius);
    let result = detector.detect(&a, &b, &cfg).unwrap();
    assert!(result.len() > 2);

    let areas: Vec<usize> = result
        .regions
        .iter()
        .map(|region| {
            components
                .iter()
                .find(|c| DifferenceRegion::from(crate::region::RankedComponent::from(**c)) == *region)
                .map(|c| c.area)
                .expect("region has a source component")
        })
        .collect();

    assert!(
        areas.windows(2).all(|w| w[0] >= w[1]),
        "areas not descending: {:?}",
        areas
    );
}

// =============================================================================
// Ranking
// =============================================================================

fn component(x: usize, area: usize) -> Component {
    Component {
        bbox: Aabb::new(x, x + 1, 0, 1),
        area,
    }
}

#[test]
fn test_rank_components_filters_and_sorts() {
    let ranked = rank_components(
        vec![component(0, 50), component(10, 900), component(20, 899), component(30, 4000)],
        900,
    );
    let areas: Vec<usize> = ranked.iter().map(|r| r.area).collect();
    assert_eq!(areas, vec![4000, 900]);
}

#[test]
fn test_rank_components_ties_keep_scan_order() {
    let ranked = rank_components(
        vec![component(0, 100), component(10, 200), component(20, 100), component(30, 200)],
        1,
    );
    let xs: Vec<usize> = ranked.iter().map(|r| r.bbox.x_min).collect();
    assert_eq!(xs, vec![10, 30, 0, 20]);
}

#[test]
fn test_equal_blocks_come_out_in_scan_order() {
    let (a, b) = edited_pair(300, 200, &[(200, 20, 30, 30), (20, 120, 30, 30)]);
    let result = detect(&a, &b, &config(100, 5, 5)).unwrap();
    assert_eq!(result.regions[0].x, 195);
    assert_eq!(result.regions[1].x, 15);
}

#[test]
fn test_edit_color_differs_enough() {
    // Guard for the synthetic fixtures: the edit must exceed the threshold.
    let l_bg = crate::ops::luma::rgb_to_luma(BACKGROUND.0[0], BACKGROUND.0[1], BACKGROUND.0[2]);
    let l_edit = crate::ops::luma::rgb_to_luma(EDIT.0[0], EDIT.0[1], EDIT.0[2]);
    assert!(l_bg.abs_diff(l_edit) > crate::config::DIFF_THRESHOLD);
}
