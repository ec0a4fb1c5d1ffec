//! Landmark overlay rendering.
//!
//! Draws the detected skeleton back onto the frame before it is returned to
//! the client: a disc per joint and a line per limb connection. Joints that
//! fail the visibility gate are drawn in the low-confidence color and their
//! connections are omitted.

use image::{DynamicImage, Rgba, RgbaImage};
use repwise_core::{LandmarkIndex, PoseFrame};

/// Limb connections drawn between landmarks (start, end).
pub const SKELETON_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 20] = [
    // Face
    (LandmarkIndex::LeftEar, LandmarkIndex::LeftEye),
    (LandmarkIndex::LeftEye, LandmarkIndex::Nose),
    (LandmarkIndex::Nose, LandmarkIndex::RightEye),
    (LandmarkIndex::RightEye, LandmarkIndex::RightEar),
    // Arms
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    // Torso
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    // Legs
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    // Feet
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftHeel),
    (LandmarkIndex::LeftHeel, LandmarkIndex::LeftFootIndex),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightHeel),
    (LandmarkIndex::RightHeel, LandmarkIndex::RightFootIndex),
];

/// Joint disc color.
pub const KEYPOINT_COLOR: Rgba<u8> = Rgba([40, 110, 255, 255]);

/// Limb line color.
pub const SKELETON_COLOR: Rgba<u8> = Rgba([90, 160, 255, 255]);

/// Color for joints below the visibility gate.
pub const LOW_CONFIDENCE_COLOR: Rgba<u8> = Rgba([220, 60, 60, 255]);

const KEYPOINT_RADIUS: i32 = 4;

/// Draw the pose onto a copy of the frame.
#[must_use]
pub fn annotate(frame: &DynamicImage, pose: &PoseFrame, min_visibility: f32) -> DynamicImage {
    let mut img = frame.to_rgba8();
    let (width, height) = img.dimensions();

    for (from, to) in SKELETON_CONNECTIONS {
        let a = pose.get(from);
        let b = pose.get(to);
        if a.is_visible(min_visibility) && b.is_visible(min_visibility) {
            let (ax, ay) = a.to_pixel(width, height);
            let (bx, by) = b.to_pixel(width, height);
            draw_line(&mut img, (ax, ay), (bx, by), SKELETON_COLOR);
        }
    }

    for landmark in pose.landmarks() {
        let color = if landmark.is_visible(min_visibility) {
            KEYPOINT_COLOR
        } else {
            LOW_CONFIDENCE_COLOR
        };
        let (x, y) = landmark.to_pixel(width, height);
        draw_disc(&mut img, (x, y), KEYPOINT_RADIUS, color);
    }

    DynamicImage::ImageRgba8(img)
}

fn put_pixel_safe(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Filled disc of the given radius.
fn draw_disc(img: &mut RgbaImage, center: (i32, i32), radius: i32, color: Rgba<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(img, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

/// Bresenham line with a 2-pixel brush.
fn draw_line(img: &mut RgbaImage, from: (i32, i32), to: (i32, i32), color: Rgba<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_safe(img, x, y, color);
        put_pixel_safe(img, x + 1, y, color);
        put_pixel_safe(img, x, y + 1, color);
        if x == to.0 && y == to.1 {
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

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use repwise_core::Landmark;

    fn pose_with_visible_upper_body() -> PoseFrame {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.25, 0.25, 0.9);
        landmarks[LandmarkIndex::LeftElbow as usize] = Landmark::new(0.25, 0.5, 0.9);
        landmarks[LandmarkIndex::LeftWrist as usize] = Landmark::new(0.25, 0.75, 0.9);
        PoseFrame::new(landmarks)
    }

    #[test]
    fn annotate_preserves_dimensions() {
        let frame = DynamicImage::new_rgb8(64, 64);
        let out = annotate(&frame, &pose_with_visible_upper_body(), 0.5);
        assert_eq!((out.width(), out.height()), (64, 64));
    }

    #[test]
    fn visible_joints_are_painted() {
        let frame = DynamicImage::new_rgb8(64, 64);
        let out = annotate(&frame, &pose_with_visible_upper_body(), 0.5).to_rgba8();
        // Left elbow lands at (16, 32) on a 64x64 frame.
        assert_eq!(*out.get_pixel(16, 32), KEYPOINT_COLOR);
    }

    #[test]
    fn connections_between_visible_joints_are_drawn() {
        let frame = DynamicImage::new_rgb8(64, 64);
        let out = annotate(&frame, &pose_with_visible_upper_body(), 0.5).to_rgba8();
        // Midpoint of the shoulder-elbow segment, just outside both discs.
        assert_ne!(*out.get_pixel(16, 24), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn occluded_joints_use_the_low_confidence_color() {
        let frame = DynamicImage::new_rgb8(64, 64);
        let pose = PoseFrame::default();
        let out = annotate(&frame, &pose, 0.5).to_rgba8();
        // Every default landmark sits at the origin with zero visibility.
        assert_eq!(*out.get_pixel(0, 0), LOW_CONFIDENCE_COLOR);
    }

    #[test]
    fn out_of_bounds_landmarks_do_not_panic() {
        let frame = DynamicImage::new_rgb8(16, 16);
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::Nose as usize] = Landmark::new(4.0, -3.0, 0.9);
        let pose = PoseFrame::new(landmarks);
        let _ = annotate(&frame, &pose, 0.5);
    }
}
