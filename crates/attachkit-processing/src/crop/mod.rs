//! Crop geometry and rasterization.

mod geometry;
pub mod rasterize;

pub use geometry::{
    fitted_rect, to_natural_pixels, CropBox, DisplayRect, Handle, PixelRect, Viewport,
    MIN_CROP_SIZE,
};
