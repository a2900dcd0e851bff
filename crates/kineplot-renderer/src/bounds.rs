//! Axis-Aligned Bounds
//!
//! Bounding boxes over scene geometry, used for auto-zoom.

use glam::DVec3;

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds3 {
    /// The empty box; union with it is the identity
    pub const EMPTY: Bounds3 = Bounds3 {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// The tight box around a set of points
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Self {
        let mut bounds = Bounds3::EMPTY;
        for p in points {
            bounds.include(p);
        }
        bounds
    }

    /// True if the box contains no points
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `point`
    pub fn include(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// The smallest box containing both boxes
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        Bounds3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Center of the box
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// The box scaled about its center
    pub fn scaled(&self, factor: f64) -> Bounds3 {
        let center = self.center();
        let half = self.size() * 0.5 * factor;
        Bounds3 {
            min: center - half,
            max: center + half,
        }
    }

    /// The smallest cube containing the box, centered on its center
    pub fn to_cube(&self) -> Bounds3 {
        let center = self.center();
        let size = self.size();
        let half = 0.5 * size.x.max(size.y).max(size.z);
        Bounds3 {
            min: center - DVec3::splat(half),
            max: center + DVec3::splat(half),
        }
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Bounds3::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_union_is_identity() {
        let b = Bounds3::from_points([DVec3::new(1.0, 2.0, 3.0)]);
        let u = Bounds3::EMPTY.union(&b);
        assert_eq!(u, b);
        assert!(Bounds3::EMPTY.is_empty());
        assert!(!b.is_empty());
    }

    #[test]
    fn test_center_and_size() {
        let b = Bounds3::from_points([DVec3::new(-1.0, 0.0, 2.0), DVec3::new(3.0, 4.0, 2.0)]);
        assert_relative_eq!(b.center().x, 1.0);
        assert_relative_eq!(b.center().y, 2.0);
        assert_relative_eq!(b.size().x, 4.0);
        assert_relative_eq!(b.size().z, 0.0);
    }

    #[test]
    fn test_to_cube_is_symmetric_about_center() {
        let b = Bounds3::from_points([DVec3::ZERO, DVec3::new(4.0, 2.0, 1.0)]);
        let cube = b.to_cube();
        let size = cube.size();
        assert_relative_eq!(size.x, 4.0);
        assert_relative_eq!(size.y, 4.0);
        assert_relative_eq!(size.z, 4.0);
        assert_eq!(cube.center(), b.center());
    }
}
