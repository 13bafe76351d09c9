//! Binary Mask Container
//!
//! `Mask` wraps a single-channel `GrayImage` and enforces the two-value
//! invariant: after construction (and after every stitching or
//! post-processing step) a mask contains only `BACKGROUND` (0) and
//! `FOREGROUND` (255) pixels. Dimensions always match the source image the
//! mask was produced for.

use image::{imageops, GrayImage, Luma, RgbImage};

use crate::error::{CoreError, CoreResult};

/// Source image type fed to the segmenter and tools.
pub type Image = RgbImage;

/// Pixel value for foreground.
pub const FOREGROUND: u8 = 255;
/// Pixel value for background.
pub const BACKGROUND: u8 = 0;
/// Threshold used when binarizing raw pixel data.
pub const BINARY_THRESHOLD: u8 = 128;

/// A binary segmentation mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    data: GrayImage,
}

impl Mask {
    /// Create an all-background mask of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: GrayImage::from_pixel(width, height, Luma([BACKGROUND])),
        }
    }

    /// Create a mask from a per-pixel foreground predicate.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        Self {
            data: GrayImage::from_fn(width, height, |x, y| {
                Luma([if f(x, y) { FOREGROUND } else { BACKGROUND }])
            }),
        }
    }

    /// Create a mask from raw row-major pixel data, binarizing at
    /// [`BINARY_THRESHOLD`].
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> CoreResult<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(CoreError::validation(format!(
                "Raw mask data has {} bytes, expected {} for {}x{}",
                data.len(),
                (width as usize) * (height as usize),
                width,
                height
            )));
        }
        let buffer = GrayImage::from_raw(width, height, data)
            .ok_or_else(|| CoreError::internal("Mask buffer construction failed"))?;
        Ok(Self { data: buffer }.binarized(BINARY_THRESHOLD))
    }

    /// Wrap an existing gray image, binarizing at [`BINARY_THRESHOLD`].
    pub fn from_gray(data: GrayImage) -> Self {
        Self { data }.binarized(BINARY_THRESHOLD)
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// `(height, width)` in row-major convention.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.data.height(), self.data.width())
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.data.get_pixel(x, y)[0] > 0
    }

    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.data.put_pixel(
            x,
            y,
            Luma([if foreground { FOREGROUND } else { BACKGROUND }]),
        );
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> usize {
        self.data.as_raw().iter().filter(|&&v| v > 0).count()
    }

    /// Raw row-major pixel bytes.
    pub fn raw(&self) -> &[u8] {
        self.data.as_raw()
    }

    /// Underlying gray image.
    pub fn as_gray(&self) -> &GrayImage {
        &self.data
    }

    /// Return a copy with every pixel above `threshold` mapped to
    /// [`FOREGROUND`] and the rest to [`BACKGROUND`].
    pub fn binarized(&self, threshold: u8) -> Self {
        let data = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.data.get_pixel(x, y)[0] > threshold {
                FOREGROUND
            } else {
                BACKGROUND
            }])
        });
        Self { data }
    }

    /// Whether the mask holds only the two designated values.
    pub fn is_binary(&self) -> bool {
        self.data
            .as_raw()
            .iter()
            .all(|&v| v == BACKGROUND || v == FOREGROUND)
    }

    /// Resize with nearest-neighbor interpolation, preserving the two-value
    /// property. Used to correct rounding drift after stitching.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Self {
        if self.width() == width && self.height() == height {
            return self.clone();
        }
        Self {
            data: imageops::resize(&self.data, width, height, imageops::FilterType::Nearest),
        }
    }

    /// Compact shape/type descriptor used in place of pixel content when a
    /// mask appears inside a memory record or log line.
    pub fn descriptor(&self) -> String {
        format!("<mask {}x{} u8>", self.height(), self.width())
    }
}

/// Shape/type descriptor for a source image (same role as
/// [`Mask::descriptor`]).
pub fn image_descriptor(image: &Image) -> String {
    format!("<image {}x{}x3 u8>", image.height(), image.width())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mask_is_all_background() {
        let mask = Mask::new(8, 4);
        assert_eq!(mask.dimensions(), (4, 8));
        assert_eq!(mask.foreground_count(), 0);
        assert!(mask.is_binary());
    }

    #[test]
    fn test_from_fn_sets_foreground() {
        let mask = Mask::from_fn(4, 4, |x, y| x == y);
        assert_eq!(mask.foreground_count(), 4);
        assert!(mask.is_foreground(2, 2));
        assert!(!mask.is_foreground(0, 3));
    }

    #[test]
    fn test_from_raw_binarizes() {
        let mask = Mask::from_raw(2, 2, vec![0, 100, 200, 255]).unwrap();
        assert!(mask.is_binary());
        // 100 <= threshold, 200 > threshold
        assert!(!mask.is_foreground(1, 0));
        assert!(mask.is_foreground(0, 1));
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = Mask::from_raw(3, 3, vec![0; 8]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_set_and_count() {
        let mut mask = Mask::new(4, 4);
        mask.set(1, 1, true);
        mask.set(2, 3, true);
        mask.set(1, 1, false);
        assert_eq!(mask.foreground_count(), 1);
    }

    #[test]
    fn test_resize_nearest_preserves_binary() {
        let mask = Mask::from_fn(10, 10, |x, _| x < 5);
        let resized = mask.resize_nearest(7, 13);
        assert_eq!(resized.dimensions(), (13, 7));
        assert!(resized.is_binary());
    }

    #[test]
    fn test_resize_same_dims_is_identity() {
        let mask = Mask::from_fn(6, 6, |x, y| (x + y) % 2 == 0);
        let resized = mask.resize_nearest(6, 6);
        assert_eq!(mask, resized);
    }

    #[test]
    fn test_descriptor_format() {
        let mask = Mask::new(320, 240);
        assert_eq!(mask.descriptor(), "<mask 240x320 u8>");
    }

    #[test]
    fn test_image_descriptor_format() {
        let image = Image::new(64, 48);
        assert_eq!(image_descriptor(&image), "<image 48x64x3 u8>");
    }
}
