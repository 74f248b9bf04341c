//! Paints chart polylines into an RGB image.

use crate::histogram::{ChartPoint, ChartPolyline, ChartStyle};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

pub const BACKGROUND: Rgb<u8> = Rgb([128, 128, 128]);

pub fn render_chart(lines: &[ChartPolyline], width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width.max(1), height.max(1), BACKGROUND);
    for line in lines {
        match line.style {
            ChartStyle::Filled => fill_polyline(&mut canvas, line),
            ChartStyle::Outline => stroke_polyline(&mut canvas, line),
        }
    }
    canvas
}

fn to_pixel(point: &ChartPoint) -> Point<i32> {
    Point::new(point.x.round() as i32, point.y.round() as i32)
}

fn fill_polyline(canvas: &mut RgbImage, line: &ChartPolyline) {
    let mut polygon: Vec<Point<i32>> = line.points.iter().map(to_pixel).collect();
    polygon.dedup();

    // imageproc rejects polygons whose first point equals the last
    if polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() < 3 {
        log::debug!("Skipping degenerate {} polygon", line.channel);
        return;
    }

    draw_polygon_mut(canvas, &polygon, Rgb(line.color.rgb()));
}

fn stroke_polyline(canvas: &mut RgbImage, line: &ChartPolyline) {
    let color = Rgb(line.color.rgb());
    for pair in line.points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        // two passes give a 2px stroke
        for dx in [0.0, 1.0] {
            draw_line_segment_mut(canvas, (a.x + dx, a.y), (b.x + dx, b.y), color);
        }
    }
}
