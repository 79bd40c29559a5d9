//! Swept segment vs circle intersection
//!
//! A harpoon tip can move further in one tick than a small creature is wide,
//! so hits are tested against the whole segment travelled that tick.

use glam::Vec2;

/// Earliest parameter `t` in `[0, 1]` at which segment `a -> b` touches the
/// circle, or `None` when it never does.
///
/// A segment that lies entirely inside the circle reports `t = 0`. A
/// zero-length segment degrades to a point-in-circle test.
pub fn segment_circle_intersection(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = b - a;
    let f = a - center;

    let qa = d.length_squared();
    if qa == 0.0 {
        return point_in_circle(a, center, radius).then_some(0.0);
    }

    let qb = 2.0 * f.dot(d);
    let qc = f.length_squared() - radius * radius;
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = (-qb - root) / (2.0 * qa);
    let t2 = (-qb + root) / (2.0 * qa);

    if (0.0..=1.0).contains(&t1) {
        return Some(t1);
    }
    // t1 < 0 from here on: the start point is inside the circle whenever the
    // exit root is ahead of it (exits mid-segment or fully contained)
    if t1 < 0.0 && t2 >= 0.0 {
        return Some(0.0);
    }
    None
}

/// Closed point-in-circle test
#[inline]
pub fn point_in_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    (p - center).length_squared() <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pass_through() {
        let t = segment_circle_intersection(
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::ZERO,
            2.0,
        )
        .unwrap();
        // Entry at x = -2 -> t = 8/20
        assert!((t - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_miss_alongside() {
        let hit = segment_circle_intersection(
            Vec2::new(-10.0, 5.0),
            Vec2::new(10.0, 5.0),
            Vec2::ZERO,
            2.0,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_stops_short() {
        let hit = segment_circle_intersection(
            Vec2::new(-10.0, 0.0),
            Vec2::new(-5.0, 0.0),
            Vec2::ZERO,
            2.0,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_contained_segment() {
        let hit = segment_circle_intersection(
            Vec2::new(-0.5, 0.0),
            Vec2::new(0.5, 0.0),
            Vec2::ZERO,
            2.0,
        );
        assert_eq!(hit, Some(0.0));
    }

    #[test]
    fn test_starts_inside_exits() {
        let hit = segment_circle_intersection(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::ZERO, 2.0);
        assert_eq!(hit, Some(0.0));
    }

    #[test]
    fn test_zero_length_segment() {
        let p = Vec2::new(1.0, 1.0);
        assert_eq!(segment_circle_intersection(p, p, Vec2::ZERO, 2.0), Some(0.0));
        let q = Vec2::new(5.0, 5.0);
        assert_eq!(segment_circle_intersection(q, q, Vec2::ZERO, 2.0), None);
    }

    #[test]
    fn test_thin_fast_target_not_tunneled() {
        // Tip jumps 20 units in one tick past a radius-3 target; endpoints both miss
        let a = Vec2::new(0.0, 100.0);
        let b = Vec2::new(0.0, 80.0);
        let center = Vec2::new(0.0, 90.0);
        assert!(!point_in_circle(a, center, 3.0));
        assert!(!point_in_circle(b, center, 3.0));
        assert!(segment_circle_intersection(a, b, center, 3.0).is_some());
    }

    proptest! {
        #[test]
        fn prop_hit_parameter_in_unit_range(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            cx in -500.0f32..500.0, cy in -500.0f32..500.0,
            r in 1.0f32..200.0,
        ) {
            let hit = segment_circle_intersection(Vec2::new(ax, ay), Vec2::new(bx, by), Vec2::new(cx, cy), r);
            if let Some(t) = hit {
                prop_assert!((0.0..=1.0).contains(&t));
            }
        }

        #[test]
        fn prop_point_inside_always_hits(
            ox in -0.7f32..0.7, oy in -0.7f32..0.7,
            dx in -300.0f32..300.0, dy in -300.0f32..300.0,
            r in 1.0f32..100.0,
        ) {
            // Segment starting strictly inside the circle must report t = 0
            let center = Vec2::new(50.0, -20.0);
            let a = center + Vec2::new(ox, oy) * r;
            let b = a + Vec2::new(dx, dy);
            prop_assert_eq!(segment_circle_intersection(a, b, center, r), Some(0.0));
        }

        #[test]
        fn prop_degenerate_matches_point_test(
            px in -50.0f32..50.0, py in -50.0f32..50.0, r in 1.0f32..40.0,
        ) {
            let p = Vec2::new(px, py);
            let hit = segment_circle_intersection(p, p, Vec2::ZERO, r).is_some();
            prop_assert_eq!(hit, point_in_circle(p, Vec2::ZERO, r));
        }
    }
}
