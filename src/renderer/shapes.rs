//! Shape generation for 2D primitives
//!
//! Everything is built from axis-aligned quads in screen pixels (y down).

use glam::Vec2;

use super::vertex::Vertex;
use crate::sim::Rect;

/// Two triangles covering `rect`
pub fn quad(rect: Rect, color: [f32; 4]) -> [Vertex; 6] {
    let min = Vec2::new(rect.x, rect.y);
    let max = Vec2::new(rect.right(), rect.bottom());
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Hollow rectangle with edges `thickness` wide, drawn inside `rect`
pub fn outline(rect: Rect, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let t = thickness.min(rect.w / 2.0).min(rect.h / 2.0);
    let edges = [
        Rect::new(rect.x, rect.y, rect.w, t),
        Rect::new(rect.x, rect.bottom() - t, rect.w, t),
        Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t),
        Rect::new(rect.right() - t, rect.y + t, t, rect.h - 2.0 * t),
    ];
    edges.into_iter().flat_map(|e| quad(e, color)).collect()
}

/// Lit segments per digit, bit 0 = top through bit 6 = middle
const SEGMENTS: [u8; 10] = [
    0b0111111, 0b0000110, 0b1011011, 0b1001111, 0b1100110, 0b1101101, 0b1111101, 0b0000111,
    0b1111111, 0b1101111,
];

/// Seven-segment rendering of `value` with its top-left at `origin`
pub fn number(value: u64, origin: Vec2, digit_height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let h = digit_height;
    let w = h * 0.5;
    let t = (h * 0.12).max(1.0);
    let advance = w + t * 2.0;

    let digits = value.to_string();
    let mut vertices = Vec::with_capacity(digits.len() * 7 * 6);
    for (i, ch) in digits.bytes().enumerate() {
        let mask = SEGMENTS[(ch - b'0') as usize];
        let x = origin.x + i as f32 * advance;
        let y = origin.y;
        let segments = [
            Rect::new(x, y, w, t),
            Rect::new(x + w - t, y, t, h / 2.0),
            Rect::new(x + w - t, y + h / 2.0, t, h / 2.0),
            Rect::new(x, y + h - t, w, t),
            Rect::new(x, y + h / 2.0, t, h / 2.0),
            Rect::new(x, y, t, h / 2.0),
            Rect::new(x, y + (h - t) / 2.0, w, t),
        ];
        for (bit, segment) in segments.into_iter().enumerate() {
            if mask & (1 << bit) != 0 {
                vertices.extend(quad(segment, color));
            }
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_covers_rect() {
        let v = quad(Rect::new(1.0, 2.0, 3.0, 4.0), [1.0; 4]);
        let xs: Vec<f32> = v.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = v.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 1.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 4.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 2.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 6.0);
    }

    #[test]
    fn test_outline_is_four_edges() {
        assert_eq!(outline(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, [1.0; 4]).len(), 24);
    }

    #[test]
    fn test_number_segment_counts() {
        // "8" lights all seven segments, "1" two
        assert_eq!(number(8, Vec2::ZERO, 10.0, [1.0; 4]).len(), 7 * 6);
        assert_eq!(number(1, Vec2::ZERO, 10.0, [1.0; 4]).len(), 2 * 6);
        assert_eq!(number(10, Vec2::ZERO, 10.0, [1.0; 4]).len(), (2 + 6) * 6);
    }
}
