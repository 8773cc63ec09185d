/// Software rasterizer - viewport transform, primitive assembly and
/// triangle coverage
///
/// Everything here is a pure function over positions and a per-pixel
/// callback, so coverage and fill-rule behavior are testable on small
/// grids without a device. Coordinates follow the GL window convention:
/// NDC `[-1, 1]` maps onto the viewport with pixel centers at `+0.5` and
/// row 0 at the bottom.

use glam::Vec2;

use lumiere_engine::lumiere::render::PrimitiveTopology;

/// Map an NDC position onto viewport coordinates
///
/// `(-1, -1)` maps to the bottom-left corner `(0, 0)` and `(1, 1)` to the
/// top-right corner `(width, height)`. Pixel `(x, y)` owns the coverage
/// point `(x + 0.5, y + 0.5)`.
pub fn viewport_transform(ndc: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (ndc.y + 1.0) * 0.5 * height as f32,
    )
}

/// Assemble a vertex range into triangles, as index triples relative to
/// the start of the range
///
/// `TriangleList` takes every 3 consecutive vertices and silently ignores
/// 1-2 leftover vertices, as GL does. `TriangleStrip` slides a window of 3
/// with the odd-numbered triangles flipped to keep a consistent winding.
/// `PointList` assembles no triangles.
pub fn assemble_triangles(topology: PrimitiveTopology, vertex_count: u32) -> Vec<[u32; 3]> {
    let n = vertex_count;
    match topology {
        PrimitiveTopology::TriangleList => (0..n / 3)
            .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
            .collect(),
        PrimitiveTopology::TriangleStrip => {
            if n < 3 {
                return Vec::new();
            }
            (0..n - 2)
                .map(|i| {
                    if i % 2 == 0 {
                        [i, i + 1, i + 2]
                    } else {
                        [i + 1, i, i + 2]
                    }
                })
                .collect()
        }
        PrimitiveTopology::PointList => Vec::new(),
    }
}

/// Edge function: twice the signed area of the triangle `(a, b, p)`
///
/// Positive when `p` lies to the left of the directed edge `a -> b`.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Whether an edge with direction `d` owns its zero-coverage pixels
///
/// The top-left fill rule for a counter-clockwise triangle in y-up
/// coordinates: left edges run downward, top edges run horizontally
/// leftward. A pixel center exactly on a shared edge is covered by
/// exactly one of the two triangles.
fn is_top_left(d: Vec2) -> bool {
    d.y < 0.0 || (d.y == 0.0 && d.x < 0.0)
}

/// Rasterize one triangle over a viewport, invoking `pixel` once per
/// covered pixel with normalized barycentric weights for the three
/// vertices
///
/// Positions are in NDC; both windings are filled (no face culling).
/// Degenerate triangles cover nothing.
pub fn rasterize_triangle(
    width: u32,
    height: u32,
    ndc: [Vec2; 3],
    mut pixel: impl FnMut(u32, u32, [f32; 3]),
) {
    let a = viewport_transform(ndc[0], width, height);
    let b = viewport_transform(ndc[1], width, height);
    let c = viewport_transform(ndc[2], width, height);

    let area = edge(a, b, c);
    if area == 0.0 {
        return;
    }
    // Normalize to counter-clockwise so one fill rule covers both windings
    let sign = if area > 0.0 { 1.0 } else { -1.0 };
    let inv_area = 1.0 / (area * sign);

    // Edge opposite each vertex; a zero weight means the pixel center lies
    // exactly on that edge
    let edges = [(b, c), (c, a), (a, b)];
    let owns_zero = [
        is_top_left((c - b) * sign),
        is_top_left((a - c) * sign),
        is_top_left((b - a) * sign),
    ];

    // Bounding box clamped to the viewport
    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
    let max_x = (a.x.max(b.x).max(c.x).ceil() as i64).min(width as i64);
    let max_y = (a.y.max(b.y).max(c.y).ceil() as i64).min(height as i64);
    if max_x <= min_x as i64 || max_y <= min_y as i64 {
        return;
    }

    for y in min_y..max_y as u32 {
        for x in min_x..max_x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let mut weights = [0.0f32; 3];
            let mut inside = true;
            for i in 0..3 {
                let (u, v) = edges[i];
                let w = edge(u, v, p) * sign;
                if w < 0.0 || (w == 0.0 && !owns_zero[i]) {
                    inside = false;
                    break;
                }
                weights[i] = w * inv_area;
            }
            if inside {
                pixel(x, y, weights);
            }
        }
    }
}

/// Rasterize a single point, invoking `pixel` for the covered pixel if
/// the point falls inside the viewport
pub fn rasterize_point(
    width: u32,
    height: u32,
    ndc: Vec2,
    mut pixel: impl FnMut(u32, u32),
) {
    let p = viewport_transform(ndc, width, height);
    if p.x < 0.0 || p.y < 0.0 {
        return;
    }
    let x = p.x.floor() as u32;
    let y = p.y.floor() as u32;
    if x < width && y < height {
        pixel(x, y);
    }
}

#[cfg(test)]
#[path = "raster_tests.rs"]
mod tests;
