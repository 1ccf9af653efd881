//! Decoding input images from disk.

use std::path::Path;

use image::DynamicImage;

use crate::error::{Error, ImageSlot, Result};

/// Decode the image at `path`.
///
/// Missing files and decode failures both surface as [`Error::Load`] tagged
/// with `slot`. Decoding goes straight to pixels with no re-encoding, so the
/// same file always yields the same grid.
pub fn load_image(path: impl AsRef<Path>, slot: ImageSlot) -> Result<DynamicImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| Error::Load {
        slot,
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        %slot,
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Loaded image"
    );

    Ok(image)
}
