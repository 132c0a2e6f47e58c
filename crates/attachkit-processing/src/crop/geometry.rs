//! Crop-box geometry.
//!
//! The crop box lives in display (CSS pixel) coordinates over an image
//! rendered object-contain inside its container, which may letterbox it
//! horizontally or vertically. Dragging and resizing stay in display space;
//! [`to_natural_pixels`] maps the final box into natural image pixels.

/// Smallest crop box edge, in display pixels.
pub const MIN_CROP_SIZE: f64 = 40.0;

/// Square crop region in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Container and natural image dimensions for one displayed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub container_w: f64,
    pub container_h: f64,
    pub natural_w: f64,
    pub natural_h: f64,
}

/// The effective displayed image rectangle inside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Crop region in natural image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One of the eight resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];
}

/// Object-contain fit: the rectangle the image actually occupies inside the
/// container, centered on the letterboxed axis.
pub fn fitted_rect(viewport: &Viewport) -> DisplayRect {
    if viewport.natural_w <= 0.0 || viewport.natural_h <= 0.0 {
        return DisplayRect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        };
    }
    let scale = (viewport.container_w / viewport.natural_w)
        .min(viewport.container_h / viewport.natural_h);
    let width = viewport.natural_w * scale;
    let height = viewport.natural_h * scale;
    DisplayRect {
        x: (viewport.container_w - width) / 2.0,
        y: (viewport.container_h - height) / 2.0,
        width,
        height,
    }
}

impl CropBox {
    /// Translate by a pointer delta, clamped inside the display bounds.
    pub fn drag(&self, dx: f64, dy: f64, bounds_w: f64, bounds_h: f64) -> CropBox {
        CropBox {
            x: (self.x + dx).clamp(0.0, (bounds_w - self.width).max(0.0)),
            y: (self.y + dy).clamp(0.0, (bounds_h - self.height).max(0.0)),
            ..*self
        }
    }

    /// Resize from one of the eight handles. The region stays square no
    /// matter which handle moves: left/right-adjacent handles drive the
    /// width, top/bottom edge handles drive the height, and the other axis
    /// is derived. The side opposite the handle is the anchor. Clamped to
    /// `min_size` and the bounds.
    pub fn resize(
        &self,
        handle: Handle,
        dx: f64,
        dy: f64,
        bounds_w: f64,
        bounds_h: f64,
        min_size: f64,
    ) -> CropBox {
        let right = self.x + self.width;
        let bottom = self.y + self.height;

        let proposed = match handle {
            Handle::Left | Handle::TopLeft | Handle::BottomLeft => self.width - dx,
            Handle::Right | Handle::TopRight | Handle::BottomRight => self.width + dx,
            Handle::Top => self.height - dy,
            Handle::Bottom => self.height + dy,
        };

        let anchor_left = matches!(
            handle,
            Handle::Right | Handle::TopRight | Handle::BottomRight | Handle::Top | Handle::Bottom
        );
        let anchor_top = matches!(
            handle,
            Handle::Bottom | Handle::BottomLeft | Handle::BottomRight | Handle::Left | Handle::Right
        );

        let max_w = if anchor_left { bounds_w - self.x } else { right };
        let max_h = if anchor_top { bounds_h - self.y } else { bottom };
        let size = proposed.clamp(min_size, max_w.min(max_h).max(min_size));

        let x = if anchor_left { self.x } else { right - size };
        let y = if anchor_top { self.y } else { bottom - size };

        CropBox {
            x: x.clamp(0.0, (bounds_w - size).max(0.0)),
            y: y.clamp(0.0, (bounds_h - size).max(0.0)),
            width: size,
            height: size,
        }
    }
}

/// Map a display-space crop box into natural image pixels.
///
/// Subtracts the fitted rectangle's offset, clamps the box into the
/// displayed image (a box hanging into the letterboxed area shifts or
/// shrinks rather than erroring), scales to natural pixels, and clamps the
/// result into `[0, natural_w] x [0, natural_h]`. Never produces an
/// out-of-bounds or negative-size rectangle.
pub fn to_natural_pixels(crop: &CropBox, viewport: &Viewport) -> PixelRect {
    let fitted = fitted_rect(viewport);
    if fitted.width <= 0.0 || fitted.height <= 0.0 {
        return PixelRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }

    let left = (crop.x - fitted.x).clamp(0.0, fitted.width);
    let top = (crop.y - fitted.y).clamp(0.0, fitted.height);
    let right = (crop.x + crop.width - fitted.x).clamp(0.0, fitted.width);
    let bottom = (crop.y + crop.height - fitted.y).clamp(0.0, fitted.height);

    let scale = viewport.natural_w / fitted.width;
    let nat_w = viewport.natural_w.max(0.0).round() as u32;
    let nat_h = viewport.natural_h.max(0.0).round() as u32;

    let x = ((left * scale).round() as u32).min(nat_w);
    let y = ((top * scale).round() as u32).min(nat_h);
    let width = (((right - left) * scale).round() as u32).min(nat_w - x);
    let height = (((bottom - top) * scale).round() as u32).min(nat_h - y);

    PixelRect {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(cw: f64, ch: f64, nw: f64, nh: f64) -> Viewport {
        Viewport {
            container_w: cw,
            container_h: ch,
            natural_w: nw,
            natural_h: nh,
        }
    }

    #[test]
    fn fitted_rect_matches_container_on_equal_aspect() {
        let rect = fitted_rect(&viewport(400.0, 300.0, 800.0, 600.0));
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, 400.0);
        assert_eq!(rect.height, 300.0);
    }

    #[test]
    fn fitted_rect_letterboxes_vertically() {
        // Wide image in a square container: bars above and below.
        let rect = fitted_rect(&viewport(400.0, 400.0, 800.0, 600.0));
        assert_eq!(rect.width, 400.0);
        assert_eq!(rect.height, 300.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 50.0);
    }

    #[test]
    fn fitted_rect_letterboxes_horizontally() {
        // Tall image in a square container: bars left and right.
        let rect = fitted_rect(&viewport(400.0, 400.0, 600.0, 800.0));
        assert_eq!(rect.width, 300.0);
        assert_eq!(rect.height, 400.0);
        assert_eq!(rect.x, 50.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn drag_moves_and_clamps() {
        let boxed = CropBox {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 100.0,
        };
        let moved = boxed.drag(25.0, -5.0, 400.0, 300.0);
        assert_eq!(moved.x, 35.0);
        assert_eq!(moved.y, 5.0);

        let clamped = boxed.drag(1000.0, -1000.0, 400.0, 300.0);
        assert_eq!(clamped.x, 300.0);
        assert_eq!(clamped.y, 0.0);
        assert_eq!(clamped.width, 100.0);
    }

    #[test]
    fn resize_keeps_square_for_every_handle() {
        let boxed = CropBox {
            x: 100.0,
            y: 100.0,
            width: 120.0,
            height: 120.0,
        };
        for handle in Handle::ALL {
            let resized = boxed.resize(handle, 17.0, -9.0, 400.0, 400.0, MIN_CROP_SIZE);
            assert_eq!(resized.width, resized.height, "{handle:?} broke the square");
            assert!(resized.x >= 0.0 && resized.y >= 0.0);
            assert!(resized.x + resized.width <= 400.0);
            assert!(resized.y + resized.height <= 400.0);
        }
    }

    #[test]
    fn resize_anchors_the_opposite_corner() {
        let boxed = CropBox {
            x: 100.0,
            y: 100.0,
            width: 100.0,
            height: 100.0,
        };
        let grown = boxed.resize(Handle::BottomRight, 20.0, 0.0, 400.0, 400.0, MIN_CROP_SIZE);
        assert_eq!((grown.x, grown.y), (100.0, 100.0));
        assert_eq!(grown.width, 120.0);

        let shrunk = boxed.resize(Handle::TopLeft, 20.0, 0.0, 400.0, 400.0, MIN_CROP_SIZE);
        // Bottom-right corner stays at (200, 200).
        assert_eq!(shrunk.width, 80.0);
        assert_eq!(shrunk.x + shrunk.width, 200.0);
        assert_eq!(shrunk.y + shrunk.height, 200.0);
    }

    #[test]
    fn resize_respects_min_size() {
        let boxed = CropBox {
            x: 100.0,
            y: 100.0,
            width: 100.0,
            height: 100.0,
        };
        let tiny = boxed.resize(Handle::Right, -500.0, 0.0, 400.0, 400.0, MIN_CROP_SIZE);
        assert_eq!(tiny.width, MIN_CROP_SIZE);
        assert_eq!(tiny.height, MIN_CROP_SIZE);
    }

    #[test]
    fn resize_stops_at_the_bounds() {
        let boxed = CropBox {
            x: 300.0,
            y: 300.0,
            width: 80.0,
            height: 80.0,
        };
        let grown = boxed.resize(Handle::BottomRight, 500.0, 0.0, 400.0, 400.0, MIN_CROP_SIZE);
        assert!(grown.x + grown.width <= 400.0);
        assert!(grown.y + grown.height <= 400.0);
        assert_eq!(grown.width, 100.0);
    }

    #[test]
    fn natural_pixels_scale_without_letterbox() {
        let vp = viewport(400.0, 300.0, 800.0, 600.0);
        let crop = CropBox {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 100.0,
        };
        let rect = to_natural_pixels(&crop, &vp);
        assert_eq!(
            rect,
            PixelRect {
                x: 20,
                y: 40,
                width: 200,
                height: 200
            }
        );
    }

    #[test]
    fn letterbox_overhang_is_clamped_into_the_image() {
        // Image occupies y in [50, 350]; the crop starts above it.
        let vp = viewport(400.0, 400.0, 800.0, 600.0);
        let crop = CropBox {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let rect = to_natural_pixels(&crop, &vp);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 200);
        // Only 50 display pixels of the crop overlap the image vertically.
        assert_eq!(rect.height, 100);
    }

    #[test]
    fn clamped_boxes_always_map_inside_the_image() {
        let vp = viewport(413.0, 377.0, 1277.0, 719.0);
        let (bw, bh) = (vp.container_w, vp.container_h);
        for i in 0..50 {
            let seed = CropBox {
                x: (i * 37 % 400) as f64,
                y: (i * 53 % 350) as f64,
                width: 40.0 + (i * 11 % 200) as f64,
                height: 40.0 + (i * 11 % 200) as f64,
            };
            // Same clamping a drag applies before commit.
            let boxed = seed.drag(0.0, 0.0, bw, bh);
            let rect = to_natural_pixels(&boxed, &vp);
            assert!(f64::from(rect.x) <= vp.natural_w);
            assert!(f64::from(rect.y) <= vp.natural_h);
            assert!(f64::from(rect.x + rect.width) <= vp.natural_w.round());
            assert!(f64::from(rect.y + rect.height) <= vp.natural_h.round());
        }
    }

    #[test]
    fn degenerate_viewport_yields_empty_rect() {
        let vp = viewport(400.0, 300.0, 0.0, 0.0);
        let crop = CropBox {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let rect = to_natural_pixels(&crop, &vp);
        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
    }
}
