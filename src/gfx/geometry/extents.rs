//! Axis-aligned extents of parsed geometry and the camera framing derived
//! from them.

use cgmath::{InnerSpace, Vector3, Zero};

use super::GeometryGroup;

/// Axis-aligned bounding box over vertex positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Extents {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Extents of a flat `x, y, z, x, y, z, ...` position stream.
    ///
    /// Returns `None` for an empty stream; there is no meaningful box to return.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut triples = positions.chunks_exact(3);
        let first = triples.next()?;

        let mut min = Vector3::new(first[0], first[1], first[2]);
        let mut max = min;
        for p in triples {
            min.x = min.x.min(p[0]);
            min.y = min.y.min(p[1]);
            min.z = min.z.min(p[2]);
            max.x = max.x.max(p[0]);
            max.y = max.y.max(p[1]);
            max.z = max.z.max(p[2]);
        }

        Some(Self::new(min, max))
    }

    /// Extents over every group of a mesh together.
    ///
    /// Empty groups are ignored; returns `None` when no group has a vertex.
    pub fn of_groups(groups: &[GeometryGroup]) -> Option<Self> {
        groups
            .iter()
            .filter_map(|group| Self::from_positions(group.buffers.positions()))
            .reduce(|a, b| a.union(&b))
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// `max - min`
    pub fn range(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        self.min + self.range() * 0.5
    }

    /// Translation that moves the box center to the origin
    pub fn centering_offset(&self) -> Vector3<f32> {
        -self.center()
    }
}

/// Camera placement computed once when an asset is loaded.
///
/// Later scale edits do not re-frame the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    pub target: Vector3<f32>,
    pub position: Vector3<f32>,
    pub radius: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraFraming {
    /// Frame a box of the given extents scaled by `scale`, looking down -Z at the origin
    pub fn frame(extents: &Extents, scale: f32) -> Self {
        let target = Vector3::zero();
        let radius = extents.range().magnitude() * scale;

        Self {
            target,
            position: target + Vector3::new(0.0, 0.0, radius),
            radius,
            z_near: radius / 100.0,
            z_far: radius * 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::parse_obj;

    #[test]
    fn test_extents_from_positions() {
        let extents =
            Extents::from_positions(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0]).unwrap();

        assert_eq!(extents.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(extents.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty_geometry_has_no_extents() {
        assert!(Extents::from_positions(&[]).is_none());
        assert!(Extents::of_groups(&[]).is_none());
        assert!(Extents::of_groups(&parse_obj("usemtl a\n").groups).is_none());
    }

    #[test]
    fn test_extents_cover_all_groups() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 5 5 5
v 6 5 5
v 5 6 -2
usemtl first
f 1 2 3
usemtl second
f 4 5 6
";
        let mesh = parse_obj(text);
        let extents = Extents::of_groups(&mesh.groups).unwrap();

        assert_eq!(extents.min, Vector3::new(0.0, 0.0, -2.0));
        assert_eq!(extents.max, Vector3::new(6.0, 6.0, 5.0));
    }

    #[test]
    fn test_min_never_exceeds_max() {
        let positions = [3.5, -2.0, 7.0, -4.0, 9.0, 0.5, 1.0, 1.0, -8.0, 0.0, 0.0, 0.0];
        let extents = Extents::from_positions(&positions).unwrap();

        assert!(extents.min.x <= extents.max.x);
        assert!(extents.min.y <= extents.max.y);
        assert!(extents.min.z <= extents.max.z);
    }

    #[test]
    fn test_centering_offset() {
        let extents = Extents::new(Vector3::new(0.0, 2.0, -4.0), Vector3::new(2.0, 4.0, 0.0));

        assert_eq!(extents.center(), Vector3::new(1.0, 3.0, -2.0));
        assert_eq!(extents.centering_offset(), Vector3::new(-1.0, -3.0, 2.0));
    }

    #[test]
    fn test_camera_framing() {
        // range (0, 3, 4) has length 5
        let extents = Extents::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 3.0, 4.0));
        let framing = CameraFraming::frame(&extents, 2.0);

        assert_eq!(framing.radius, 10.0);
        assert_eq!(framing.target, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(framing.position, Vector3::new(0.0, 0.0, 10.0));
        assert_eq!(framing.z_near, 0.1);
        assert_eq!(framing.z_far, 30.0);
    }
}
