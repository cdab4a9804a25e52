//! Unit tests for pixmap.rs

use crate::error::Error;
use crate::image::color::{AlphaType, ColorInfo, ColorType};
use crate::image::geometry::IRect;
use crate::image::pixmap::Pixmap;
use glam::UVec2;

fn gray() -> ColorInfo {
    ColorInfo::new(ColorType::Gray8, AlphaType::Opaque, None)
}

/// 4x4 gray pixmap where each pixel holds `y * 4 + x`
fn ramp() -> Pixmap {
    Pixmap::new(UVec2::new(4, 4), gray(), (0..16).collect()).unwrap()
}

#[test]
fn test_new_rejects_wrong_length() {
    let result = Pixmap::new(UVec2::new(4, 4), gray(), vec![0; 15]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_new_rejects_empty_dimensions() {
    let result = Pixmap::new(UVec2::new(0, 4), gray(), vec![]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_new_rejects_unknown_color_type() {
    let info = ColorInfo::new(ColorType::Unknown, AlphaType::Premul, None);
    assert!(Pixmap::alloc(UVec2::new(2, 2), info).is_err());
}

#[test]
fn test_row_bytes_and_rows() {
    let pm = ramp();
    assert_eq!(pm.row_bytes(), 4);
    assert_eq!(pm.row(2), &[8, 9, 10, 11]);
}

#[test]
fn test_extract_subset() {
    let pm = ramp();
    let sub = pm.extract_subset(IRect::from_xywh(1, 1, 2, 2)).unwrap();
    assert_eq!(sub.dimensions(), UVec2::new(2, 2));
    assert_eq!(sub.pixels(), &[5, 6, 9, 10]);
}

#[test]
fn test_extract_subset_out_of_bounds() {
    let pm = ramp();
    assert!(pm.extract_subset(IRect::from_xywh(3, 3, 2, 2)).is_none());
    assert!(pm.extract_subset(IRect::from_xywh(1, 1, 0, 2)).is_none());
}

#[test]
fn test_scale_nearest_halves() {
    let pm = ramp();
    let half = pm.scale_nearest(UVec2::new(2, 2)).unwrap();
    assert_eq!(half.pixels(), &[0, 2, 8, 10]);
}
