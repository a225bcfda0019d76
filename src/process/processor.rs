use image::{DynamicImage, RgbImage, imageops};

use crate::{
    assets::decode::ImageSource,
    config::ReelConfig,
    foundation::{
        core::Stage,
        error::{ReelError, ReelResult},
    },
    geometry::crop::{compute_crop_rect, compute_resize_target},
    pipeline::cancel::CancelToken,
};

/// An RGB8 still at exactly the configured canonical resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalStill {
    image: RgbImage,
}

impl CanonicalStill {
    /// Wrap an already-canonical image.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dims(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Batch position reported after each processed image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemProgress {
    pub completed: usize,
    pub total: usize,
}

impl ItemProgress {
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Crops and scales source images to the canonical portrait frame.
#[derive(Clone, Copy, Debug)]
pub struct ImageProcessor<'a> {
    cfg: &'a ReelConfig,
}

impl<'a> ImageProcessor<'a> {
    pub fn new(cfg: &'a ReelConfig) -> Self {
        Self { cfg }
    }

    /// Decode one source and produce its canonical still.
    #[tracing::instrument(skip_all, fields(source = %source))]
    pub fn process_source(&self, source: &ImageSource) -> ReelResult<CanonicalStill> {
        let img = source.decode()?;
        self.process_image(&img)
    }

    /// Crop to the configured aspect ratio, then resize to the canonical resolution.
    pub fn process_image(&self, img: &DynamicImage) -> ReelResult<CanonicalStill> {
        let (src_w, src_h) = (img.width(), img.height());
        if src_w == 0 || src_h == 0 {
            return Err(ReelError::InvalidDimensions {
                index: None,
                width: src_w,
                height: src_h,
            });
        }

        let canvas = self.cfg.canvas;
        let rect = compute_crop_rect(src_w, src_h, self.cfg.aspect)?;
        let (mut out_w, out_h) = compute_resize_target(rect.width, rect.height, canvas.height)?;
        if out_w != canvas.width {
            tracing::debug!(
                computed = out_w,
                canonical = canvas.width,
                "resize width off canonical; correcting"
            );
            out_w = canvas.width;
        }

        let rgb = img.to_rgb8();
        let cropped = imageops::crop_imm(&rgb, rect.x, rect.y, rect.width, rect.height).to_image();
        let image = if cropped.dimensions() == (out_w, out_h) {
            cropped
        } else {
            imageops::resize(&cropped, out_w, out_h, self.cfg.resample.filter_type())
        };

        Ok(CanonicalStill { image })
    }

    /// Process `sources` in order, reporting after each item.
    ///
    /// The token is checked before each image. The first failure aborts the batch and carries
    /// the index of the failing source.
    #[tracing::instrument(skip_all, fields(total = sources.len()))]
    pub fn process_images(
        &self,
        sources: &[ImageSource],
        cancel: &CancelToken,
        mut on_item: impl FnMut(ItemProgress),
    ) -> ReelResult<Vec<CanonicalStill>> {
        let total = sources.len();
        let mut out = Vec::with_capacity(total);
        for (i, source) in sources.iter().enumerate() {
            if cancel.is_canceled() {
                tracing::info!(completed = i, "cancellation observed while processing");
                return Err(ReelError::Canceled {
                    stage: Stage::Process,
                    completed: i,
                });
            }
            let still = self.process_source(source).map_err(|e| e.at_index(i))?;
            out.push(still);
            on_item(ItemProgress {
                completed: i + 1,
                total,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/processor.rs"]
mod tests;
