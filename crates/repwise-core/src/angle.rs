//! # Angle Module
//!
//! Joint angle computation from landmark triples.
//!
//! The angle at a vertex joint is the absolute difference of the two ray
//! angles toward the proximal and distal joints, folded into [0,180]
//! degrees. The function is total: any three finite points produce an
//! angle, and absent or low-confidence landmarks are the caller's concern
//! (skip the limb for that frame).

use crate::landmark::{Landmark, PoseFrame, Side};

/// Angle in degrees at the vertex `b`, formed by the rays toward `a` and `c`.
///
/// Output is always within [0,180]; a reflex measurement is folded back as
/// `360 - angle`.
#[must_use]
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.abs().to_degrees();
    if angle > 180.0 { 360.0 - angle } else { angle }
}

/// Elbow angle for one arm of a pose.
///
/// Returns `None` when any of shoulder, elbow or wrist fails the visibility
/// threshold; the frame carries no usable measurement for that arm.
#[must_use]
pub fn arm_angle(pose: &PoseFrame, side: Side, min_visibility: f32) -> Option<f32> {
    let [shoulder, elbow, wrist] = pose.arm(side, min_visibility)?;
    Some(joint_angle(&shoulder, &elbow, &wrist))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LandmarkIndex;
    use proptest::prelude::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 1.0)
    }

    #[test]
    fn straight_line_through_vertex_is_180() {
        let angle = joint_angle(&lm(0.0, 0.0), &lm(1.0, 0.0), &lm(2.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn coincident_rays_are_0() {
        let angle = joint_angle(&lm(2.0, 0.0), &lm(1.0, 0.0), &lm(2.0, 0.0));
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn right_angle_measures_90() {
        let angle = joint_angle(&lm(0.0, 1.0), &lm(0.0, 0.0), &lm(1.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn vertex_order_matters_endpoint_order_does_not() {
        let a = lm(0.3, 0.2);
        let b = lm(0.5, 0.5);
        let c = lm(0.8, 0.6);
        let forward = joint_angle(&a, &b, &c);
        let reversed = joint_angle(&c, &b, &a);
        assert!((forward - reversed).abs() < 1e-3);
    }

    #[test]
    fn arm_angle_skips_occluded_joints() {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::RightShoulder as usize] = Landmark::new(0.6, 0.3, 0.9);
        landmarks[LandmarkIndex::RightElbow as usize] = Landmark::new(0.6, 0.5, 0.4);
        landmarks[LandmarkIndex::RightWrist as usize] = Landmark::new(0.6, 0.7, 0.9);
        let pose = PoseFrame::new(landmarks);

        assert_eq!(arm_angle(&pose, Side::Right, 0.5), None);
    }

    #[test]
    fn arm_angle_of_extended_arm_is_near_180() {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.4, 0.2, 0.9);
        landmarks[LandmarkIndex::LeftElbow as usize] = Landmark::new(0.4, 0.5, 0.9);
        landmarks[LandmarkIndex::LeftWrist as usize] = Landmark::new(0.4, 0.8, 0.9);
        let pose = PoseFrame::new(landmarks);

        let angle = arm_angle(&pose, Side::Left, 0.5).expect("arm visible");
        assert!((angle - 180.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn angle_is_always_within_0_180(
            ax in -1.0f32..2.0, ay in -1.0f32..2.0,
            bx in -1.0f32..2.0, by in -1.0f32..2.0,
            cx in -1.0f32..2.0, cy in -1.0f32..2.0,
        ) {
            let angle = joint_angle(&lm(ax, ay), &lm(bx, by), &lm(cx, cy));
            prop_assert!((0.0..=180.0).contains(&angle));
        }

        #[test]
        fn angle_is_translation_invariant(
            ax in 0.0f32..1.0, ay in 0.0f32..1.0,
            bx in 0.0f32..1.0, by in 0.0f32..1.0,
            cx in 0.0f32..1.0, cy in 0.0f32..1.0,
            dx in -10.0f32..10.0, dy in -10.0f32..10.0,
        ) {
            // Nearly coincident joints make the ray directions numerically
            // unstable under a float shift; real limbs are never that short.
            prop_assume!((ax - bx).hypot(ay - by) > 0.05);
            prop_assume!((cx - bx).hypot(cy - by) > 0.05);

            let original = joint_angle(&lm(ax, ay), &lm(bx, by), &lm(cx, cy));
            let shifted = joint_angle(
                &lm(ax + dx, ay + dy),
                &lm(bx + dx, by + dy),
                &lm(cx + dx, cy + dy),
            );
            prop_assert!((original - shifted).abs() < 0.1);
        }
    }
}
