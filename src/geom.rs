// src/geom.rs

//! Scanline rasterizers for filled circles and donuts (annuli), in aliased
//! and anti-aliased flavors.
//!
//! The rasterizers are geometry-only: they emit spans and edge pixels
//! through a `RasterTarget` and never touch pixel storage themselves, so the
//! same code can draw into a `Surface`, a test canvas, or nothing at all
//! when measuring pure rasterization cost.
//!
//! All shapes use an even-symmetric pixel grid: a circle of radius `r`
//! centered at `(cx, cy)` covers a `2r`-pixel-wide disc whose quadrant pixel
//! `(x, y)` mirrors to `(cx + x, cy + y)`, `(cx - x - 1, cy + y)`,
//! `(cx + x, cy - y - 1)` and `(cx - x - 1, cy - y - 1)`. Pixel `(x, y)`
//! spans `[x, x + 1)` around the center, so a quadrant column is covered
//! when `(2x + 1)^2 + (2y + 1)^2 <= (2r)^2`.
//!
//! Emitted coordinates always stay inside the disc's circumscribing box:
//! columns and rows fall in `cx - r ..= cx + r - 1` and
//! `cy - r ..= cy + r - 1`. Spans are never negative-width.

/// Denominator for anti-aliased edge coverage.
pub const COVERAGE_MAX: i32 = 255;

/// Receiver for rasterizer output.
///
/// `hline` spans are inclusive on both ends. `coverage` reports a partially
/// covered edge pixel with `f / f_max` coverage; the default implementation
/// thresholds at half coverage and forwards to `hline`, so an
/// aliased-only target still renders anti-aliased shapes acceptably.
pub trait RasterTarget {
    /// Draws the solid span `x1..=x2` on row `y`.
    fn hline(&mut self, x1: i32, x2: i32, y: i32);

    /// Draws edge pixel `(x, y)` with coverage `f / f_max`, `0 < f <= f_max`.
    fn coverage(&mut self, x: i32, y: i32, f: i32, f_max: i32) {
        if 2 * f >= f_max {
            self.hline(x, x, y);
        }
    }
}

/// Any span closure is a target; anti-aliased edges then fall back to the
/// thresholding default.
impl<F: FnMut(i32, i32, i32)> RasterTarget for F {
    fn hline(&mut self, x1: i32, x2: i32, y: i32) {
        self(x1, x2, y)
    }
}

fn isqrt(n: i64) -> i64 {
    debug_assert!(n >= 0);
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as i64;
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    while x * x > n {
        x -= 1;
    }
    x
}

/// Largest quadrant column `x >= 0` with `(2x + 1)^2 <= rem`, or -1 when the
/// row has no covered column.
fn quadrant_extent(rem: i64) -> i32 {
    if rem < 1 {
        return -1;
    }
    let s = isqrt(rem);
    if s < 1 {
        return -1;
    }
    ((s - 1) / 2) as i32
}

fn mirror_rows<T: RasterTarget + ?Sized>(target: &mut T, x1: i32, x2: i32, cy: i32, y: i32) {
    target.hline(x1, x2, cy + y);
    target.hline(x1, x2, cy - y - 1);
}

fn mirror_coverage<T: RasterTarget + ?Sized>(
    target: &mut T,
    cx: i32,
    cy: i32,
    x: i32,
    y: i32,
    f: i32,
) {
    target.coverage(cx + x, cy + y, f, COVERAGE_MAX);
    target.coverage(cx - x - 1, cy + y, f, COVERAGE_MAX);
    target.coverage(cx + x, cy - y - 1, f, COVERAGE_MAX);
    target.coverage(cx - x - 1, cy - y - 1, f, COVERAGE_MAX);
}

/// Aliased filled circle of radius `r` centered at `(cx, cy)`.
pub fn filled_circle<T: RasterTarget + ?Sized>(cx: i32, cy: i32, r: i32, target: &mut T) {
    if r <= 0 {
        return;
    }
    let d2 = 4 * (r as i64) * (r as i64);
    for y in 0..r {
        let dy = (2 * y + 1) as i64;
        let x_max = quadrant_extent(d2 - dy * dy);
        if x_max >= 0 {
            mirror_rows(target, cx - x_max - 1, cx + x_max, cy, y);
        }
    }
}

/// Aliased donut: the annulus between radius `inner` and
/// `inner + thickness`, centered at `(cx, cy)`.
pub fn donut<T: RasterTarget + ?Sized>(
    cx: i32,
    cy: i32,
    inner: i32,
    thickness: i32,
    target: &mut T,
) {
    if thickness <= 0 {
        return;
    }
    if inner <= 0 {
        return filled_circle(cx, cy, inner + thickness, target);
    }
    let outer = inner + thickness;
    let do2 = 4 * (outer as i64) * (outer as i64);
    let di2 = 4 * (inner as i64) * (inner as i64);
    for y in 0..outer {
        let dy2 = {
            let dy = (2 * y + 1) as i64;
            dy * dy
        };
        let xo = quadrant_extent(do2 - dy2);
        if xo < 0 {
            continue;
        }
        let xi = quadrant_extent(di2 - dy2);
        if xi < 0 {
            // Row misses the hole entirely.
            mirror_rows(target, cx - xo - 1, cx + xo, cy, y);
        } else if xi < xo {
            mirror_rows(target, cx + xi + 1, cx + xo, cy, y);
            mirror_rows(target, cx - xo - 1, cx - xi - 2, cy, y);
        }
    }
}

/// Per-row circle edge: half-width `e`, split into the last fully covered
/// column, the partially covered column, and its coverage fraction.
struct RowEdge {
    full: i32,
    partial: i32,
    frac: f64,
}

fn row_edge(radius: f64, yc: f64) -> RowEdge {
    let e = (radius * radius - yc * yc).sqrt();
    RowEdge {
        full: (e - 1.0).floor() as i32,
        partial: e.floor() as i32,
        frac: e - e.floor(),
    }
}

fn coverage_units(frac: f64) -> i32 {
    (frac * COVERAGE_MAX as f64).round() as i32
}

/// Anti-aliased filled circle. Interior spans go through `hline`; the pixel
/// straddling the rim on each row goes through `coverage` with its
/// horizontal coverage fraction.
pub fn filled_circle_aa<T: RasterTarget + ?Sized>(cx: i32, cy: i32, r: i32, target: &mut T) {
    if r <= 0 {
        return;
    }
    let rf = r as f64;
    for y in 0.. {
        let yc = y as f64 + 0.5;
        if yc >= rf {
            break;
        }
        let edge = row_edge(rf, yc);
        if edge.full >= 0 {
            mirror_rows(target, cx - edge.full - 1, cx + edge.full, cy, y);
        }
        let f = coverage_units(edge.frac);
        if edge.partial > edge.full && f > 0 {
            mirror_coverage(target, cx, cy, edge.partial, y, f);
        }
    }
}

/// Anti-aliased donut. Both rims are feathered: the outer rim pixel carries
/// the covered fraction, the inner rim pixel the fraction left outside the
/// hole. A ring thin enough for both rims to land in one pixel emits the
/// difference once.
pub fn donut_aa<T: RasterTarget + ?Sized>(
    cx: i32,
    cy: i32,
    inner: i32,
    thickness: i32,
    target: &mut T,
) {
    if thickness <= 0 {
        return;
    }
    if inner <= 0 {
        return filled_circle_aa(cx, cy, inner + thickness, target);
    }
    let outer = inner + thickness;
    let ro = outer as f64;
    let ri = inner as f64;
    for y in 0.. {
        let yc = y as f64 + 0.5;
        if yc >= ro {
            break;
        }
        let out = row_edge(ro, yc);
        if yc >= ri {
            // Below the hole: plain anti-aliased circle row.
            if out.full >= 0 {
                mirror_rows(target, cx - out.full - 1, cx + out.full, cy, y);
            }
            let f = coverage_units(out.frac);
            if out.partial > out.full && f > 0 {
                mirror_coverage(target, cx, cy, out.partial, y, f);
            }
            continue;
        }

        let inn = row_edge(ri, yc);
        if inn.partial == out.partial {
            // Both rims inside one pixel.
            let ei = ri * ri - yc * yc;
            let eo = ro * ro - yc * yc;
            let f = coverage_units(eo.sqrt() - ei.sqrt());
            if f > 0 {
                mirror_coverage(target, cx, cy, out.partial, y, f);
            }
            continue;
        }

        if inn.partial + 1 <= out.full {
            mirror_rows(target, cx + inn.partial + 1, cx + out.full, cy, y);
            mirror_rows(target, cx - out.full - 1, cx - inn.partial - 2, cy, y);
        }
        let fi = coverage_units(1.0 - inn.frac);
        if fi > 0 {
            mirror_coverage(target, cx, cy, inn.partial, y, fi);
        }
        let fo = coverage_units(out.frac);
        if out.partial > out.full && fo > 0 {
            mirror_coverage(target, cx, cy, out.partial, y, fo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Test canvas recording per-pixel coverage (255 for solid spans).
    #[derive(Default)]
    struct Canvas {
        pixels: HashMap<(i32, i32), i32>,
    }

    impl RasterTarget for Canvas {
        fn hline(&mut self, x1: i32, x2: i32, y: i32) {
            assert!(x1 <= x2, "negative-width span {}..{} on row {}", x1, x2, y);
            for x in x1..=x2 {
                self.pixels.insert((x, y), COVERAGE_MAX);
            }
        }

        fn coverage(&mut self, x: i32, y: i32, f: i32, f_max: i32) {
            assert!(f > 0 && f <= f_max, "coverage {}/{} out of range", f, f_max);
            assert_eq!(f_max, COVERAGE_MAX);
            let entry = self.pixels.entry((x, y)).or_insert(0);
            *entry = (*entry).max(f);
        }
    }

    const CX: i32 = 40;
    const CY: i32 = 40;

    fn assert_in_box(canvas: &Canvas, r: i32) {
        for &(x, y) in canvas.pixels.keys() {
            assert!(
                (CX - r..CX + r).contains(&x) && (CY - r..CY + r).contains(&y),
                "pixel ({}, {}) escapes radius {}",
                x,
                y,
                r
            );
        }
    }

    fn assert_four_way_symmetric(canvas: &Canvas) {
        for (&(x, y), &f) in &canvas.pixels {
            let qx = x - CX;
            let qy = y - CY;
            let mx = CX - qx - 1;
            let my = CY - qy - 1;
            for mirror in [(mx, y), (x, my), (mx, my)] {
                assert_eq!(
                    canvas.pixels.get(&mirror),
                    Some(&f),
                    "pixel ({}, {}) has no mirror at {:?}",
                    x,
                    y,
                    mirror
                );
            }
        }
    }

    #[test]
    fn filled_circle_stays_in_box_and_is_symmetric() {
        let mut canvas = Canvas::default();
        filled_circle(CX, CY, 10, &mut canvas);
        assert_in_box(&canvas, 10);
        assert_four_way_symmetric(&canvas);
        // The four center pixels are always covered.
        assert!(canvas.pixels.contains_key(&(CX, CY)));
        assert!(canvas.pixels.contains_key(&(CX - 1, CY - 1)));
    }

    #[test]
    fn filled_circle_area_approximates_pi_r_squared() {
        let mut canvas = Canvas::default();
        filled_circle(CX, CY, 10, &mut canvas);
        let count = canvas.pixels.len() as f64;
        let ideal = std::f64::consts::PI * 100.0;
        assert!(
            (count - ideal).abs() < ideal * 0.1,
            "{} pixels vs ideal {:.0}",
            count,
            ideal
        );
    }

    #[test]
    fn filled_circle_radius_one_is_a_two_by_two_block() {
        let mut canvas = Canvas::default();
        filled_circle(CX, CY, 1, &mut canvas);
        let mut keys: Vec<_> = canvas.pixels.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![(CX - 1, CY - 1), (CX - 1, CY), (CX, CY - 1), (CX, CY)]
        );
    }

    #[test]
    fn degenerate_radii_draw_nothing() {
        let mut canvas = Canvas::default();
        filled_circle(CX, CY, 0, &mut canvas);
        filled_circle(CX, CY, -3, &mut canvas);
        filled_circle_aa(CX, CY, 0, &mut canvas);
        donut(CX, CY, 5, 0, &mut canvas);
        donut_aa(CX, CY, 5, -1, &mut canvas);
        assert!(canvas.pixels.is_empty());
    }

    #[test]
    fn donut_leaves_the_hole_empty() {
        let mut canvas = Canvas::default();
        donut(CX, CY, 5, 5, &mut canvas);
        assert_in_box(&canvas, 10);
        assert_four_way_symmetric(&canvas);
        // Center of the hole is untouched; the ring midline is solid.
        assert!(!canvas.pixels.contains_key(&(CX, CY)));
        assert!(!canvas.pixels.contains_key(&(CX + 3, CY)));
        assert!(canvas.pixels.contains_key(&(CX + 7, CY)));
    }

    #[test]
    fn donut_area_approximates_the_ring() {
        let mut canvas = Canvas::default();
        donut(CX, CY, 6, 6, &mut canvas);
        let count = canvas.pixels.len() as f64;
        let ideal = std::f64::consts::PI * ((12.0 * 12.0) - (6.0 * 6.0));
        assert!(
            (count - ideal).abs() < ideal * 0.1,
            "{} pixels vs ideal {:.0}",
            count,
            ideal
        );
    }

    #[test]
    fn donut_with_zero_inner_radius_is_a_circle() {
        let mut ring = Canvas::default();
        donut(CX, CY, 0, 8, &mut ring);
        let mut disc = Canvas::default();
        filled_circle(CX, CY, 8, &mut disc);
        assert_eq!(ring.pixels, disc.pixels);
    }

    #[test]
    fn aa_circle_covers_the_aliased_interior() {
        let mut aa = Canvas::default();
        filled_circle_aa(CX, CY, 10, &mut aa);
        assert_in_box(&aa, 10);
        assert_four_way_symmetric(&aa);
        // Every solid aliased pixel strictly inside the rim is present.
        let mut plain = Canvas::default();
        filled_circle(CX, CY, 9, &mut plain);
        for key in plain.pixels.keys() {
            assert!(aa.pixels.contains_key(key), "missing interior {:?}", key);
        }
        // And some edge pixels are genuinely partial.
        assert!(aa
            .pixels
            .values()
            .any(|&f| f > 0 && f < COVERAGE_MAX));
    }

    #[test]
    fn aa_donut_feathers_both_rims() {
        let mut canvas = Canvas::default();
        donut_aa(CX, CY, 5, 5, &mut canvas);
        assert_in_box(&canvas, 10);
        assert_four_way_symmetric(&canvas);
        assert!(!canvas.pixels.contains_key(&(CX, CY)));
        assert!(canvas.pixels.contains_key(&(CX + 7, CY)));
        // Partial pixels exist on the inner rim, not just the outer one.
        let inner_partials = canvas
            .pixels
            .iter()
            .filter(|(&(x, y), &f)| {
                let dx = (2 * (x - CX) + 1).abs();
                let dy = (2 * (y - CY) + 1).abs();
                f < COVERAGE_MAX && dx * dx + dy * dy < 12 * 12
            })
            .count();
        assert!(inner_partials > 0);
    }

    #[test]
    fn closure_targets_render_aa_shapes_via_thresholding() {
        let mut spans: Vec<(i32, i32, i32)> = Vec::new();
        filled_circle_aa(CX, CY, 4, &mut |x1: i32, x2: i32, y: i32| {
            spans.push((x1, x2, y))
        });
        assert!(!spans.is_empty());
        for &(x1, x2, _) in &spans {
            assert!(x1 <= x2);
        }
    }
}
