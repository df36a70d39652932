//! Detection outlines drawn over a page render for human review.

use image::{DynamicImage, GenericImage, GenericImageView, Rgba};

use crate::ocr::{OcrDetection, Point};

/// Outline color.
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Outline width in pixels.
pub const OUTLINE_WIDTH: i64 = 2;

/// Copy `image` and draw every detection polygon on the copy as a closed outline.
///
/// The input is never modified and keeps its color type in the copy.
pub fn annotate(image: &DynamicImage, detections: &[OcrDetection]) -> DynamicImage {
    let mut annotated = image.clone();
    for detection in detections {
        draw_closed_polygon(&mut annotated, &detection.polygon, OUTLINE_COLOR);
    }
    annotated
}

fn draw_closed_polygon<I>(image: &mut I, points: &[Point], color: Rgba<u8>)
where
    I: GenericImage<Pixel = Rgba<u8>>,
{
    let points: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (f64::from(p.x), f64::from(p.y)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let bounds = drawable_bounds(image);

    match points.as_slice() {
        [] => {}
        [only] => {
            if let Some((start, end)) = clip_segment(*only, *only, bounds) {
                draw_line(image, start, end, color);
            }
        }
        _ => {
            for (i, start) in points.iter().enumerate() {
                let end = points[(i + 1) % points.len()];
                if let Some((start, end)) = clip_segment(*start, end, bounds) {
                    draw_line(image, start, end, color);
                }
            }
        }
    }
}

/// The image rectangle grown by the brush width, as (min_x, min_y, max_x, max_y).
fn drawable_bounds<I: GenericImageView>(image: &I) -> (f64, f64, f64, f64) {
    let (width, height) = image.dimensions();
    let margin = OUTLINE_WIDTH as f64;
    (
        -margin,
        -margin,
        f64::from(width) + margin,
        f64::from(height) + margin,
    )
}

/// Liang-Barsky clip of a segment against `bounds`; `None` when nothing is inside.
fn clip_segment(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    (min_x, min_y, max_x, max_y): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }

    if t0 > t1 {
        return None;
    }
    Some((
        (x0 + t0 * dx, y0 + t0 * dy),
        (x0 + t1 * dx, y0 + t1 * dy),
    ))
}

/// Bresenham line with a square brush; pixels outside the image are skipped.
///
/// Endpoints must already be clipped to `drawable_bounds`.
fn draw_line<I>(image: &mut I, start: (f64, f64), end: (f64, f64), color: Rgba<u8>)
where
    I: GenericImage<Pixel = Rgba<u8>>,
{
    let (mut x, mut y) = (start.0 as i64, start.1 as i64);
    let (x1, y1) = (end.0 as i64, end.1 as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(image, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn stamp<I>(image: &mut I, x: i64, y: i64, color: Rgba<u8>)
where
    I: GenericImage<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let offset = OUTLINE_WIDTH / 2;
    for py in (y - offset)..(y - offset + OUTLINE_WIDTH) {
        for px in (x - offset)..(x - offset + OUTLINE_WIDTH) {
            if px >= 0 && py >= 0 && px < i64::from(width) && py < i64::from(height) {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}
