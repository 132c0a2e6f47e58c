//! Image crop core.
//!
//! Geometry for a square crop box manipulated in display (CSS pixel)
//! coordinates over a letterboxed image, the mapping of that box into
//! natural image pixels, and JPEG rasterization of the selected region.

pub mod crop;

pub use crop::{
    fitted_rect, to_natural_pixels, CropBox, DisplayRect, Handle, PixelRect, Viewport,
    MIN_CROP_SIZE,
};
pub use crop::rasterize::crop_to_jpeg;
