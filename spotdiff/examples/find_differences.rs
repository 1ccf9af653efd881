//! Example: Detect differences in an image pair and emit a catalog entry
//!
//! Loads two images, runs difference detection, classifies the puzzle
//! difficulty and prints the resulting catalog as JSON. An existing catalog
//! can be updated in place and a side-by-side preview can be written.
//!
//! # Environment
//!
//! ```text
//! SPOTDIFF_IMAGE1          first image (required)
//! SPOTDIFF_IMAGE2          second image (required)
//! SPOTDIFF_SET_ID          puzzle set id, default 1
//! SPOTDIFF_MIN_AREA        minimum region area in pixels
//! SPOTDIFF_MERGE_RADIUS    dilation radius in pixels
//! SPOTDIFF_TARGET_COUNT    number of regions to keep
//! SPOTDIFF_TAGS            comma-separated tags, default "default"
//! SPOTDIFF_DIFFICULTY      easy, medium or hard; derived from the count if unset
//! SPOTDIFF_CATALOG         catalog JSON file to update
//! SPOTDIFF_PREVIEW         output path for the preview image
//! ```
//!
//! # Usage
//!
//! ```bash
//! SPOTDIFF_IMAGE1=a.png SPOTDIFF_IMAGE2=b.png cargo run --example find_differences
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use spotdiff::{
    Catalog, Config, Difficulty, DifferenceDetector, ImageSlot, PuzzleSet, Upsert, load_image,
    render_preview,
};

fn main() -> Result<()> {
    common::log_setup::setup_logging("info", Some(std::path::Path::new("logs")));

    let image1_path = required_path("SPOTDIFF_IMAGE1")?;
    let image2_path = required_path("SPOTDIFF_IMAGE2")?;
    let set_id: u32 = env_or("SPOTDIFF_SET_ID", 1)?;

    let defaults = Config::default();
    let config = Config {
        min_region_area: env_or("SPOTDIFF_MIN_AREA", defaults.min_region_area)?,
        merge_radius: env_or("SPOTDIFF_MERGE_RADIUS", defaults.merge_radius)?,
        target_count: env_or("SPOTDIFF_TARGET_COUNT", defaults.target_count)?,
    };

    let image1 = load_image(&image1_path, ImageSlot::First)?;
    let image2 = load_image(&image2_path, ImageSlot::Second)?;

    let start = Instant::now();
    let detection = DifferenceDetector::new().detect(&image1, &image2, &config)?;
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        regions = detection.len(),
        "Detection finished"
    );

    for (i, region) in detection.regions.iter().enumerate() {
        tracing::info!(
            "  {}. x={}, y={}, w={}, h={}",
            i + 1,
            region.x,
            region.y,
            region.width,
            region.height
        );
    }

    let difficulty = match env::var("SPOTDIFF_DIFFICULTY") {
        Ok(value) => value.parse::<Difficulty>()?,
        Err(_) => Difficulty::from_region_count(detection.len()),
    };
    let mut set = PuzzleSet::new(set_id, detection.regions.clone(), difficulty);
    if let Ok(tags) = env::var("SPOTDIFF_TAGS") {
        set = set.with_tags(
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty()),
        );
    }
    tracing::info!(set_id, %difficulty, tags = ?set.tags, "Puzzle set ready");

    let catalog_path = env::var("SPOTDIFF_CATALOG").ok().map(PathBuf::from);
    let mut catalog = match &catalog_path {
        Some(path) if path.exists() => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            Catalog::from_json(&text)
                .with_context(|| format!("Failed to parse catalog {}", path.display()))?
        }
        _ => Catalog::new(),
    };

    if catalog.upsert(set) == Upsert::Replaced {
        tracing::info!(set_id, "Replaced existing set");
    }
    for issue in catalog.validate() {
        tracing::warn!("{}", issue);
    }

    let json = catalog.to_json()?;
    match &catalog_path {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write catalog {}", path.display()))?;
            tracing::info!(path = %path.display(), "Catalog written");
        }
        None => println!("{}", json),
    }

    if let Ok(preview_path) = env::var("SPOTDIFF_PREVIEW") {
        let preview = render_preview(&image1, &image2, &detection.regions);
        preview
            .save(&preview_path)
            .with_context(|| format!("Failed to save preview {}", preview_path))?;
        tracing::info!(path = %preview_path, "Preview saved");
    }

    Ok(())
}

fn required_path(name: &str) -> Result<PathBuf> {
    env::var(name)
        .map(PathBuf::from)
        .with_context(|| format!("{} environment variable must be set", name))
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(default),
    }
}
