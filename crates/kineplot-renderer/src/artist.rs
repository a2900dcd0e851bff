//! Renderable Primitives
//!
//! The closed set of primitives plot nodes draw with: polylines, arrows
//! and circles. Primitives hold world-space data only; screen positions
//! are recomputed at draw time against the live camera, so camera motion
//! never needs a data update.

use glam::{DMat3, DVec2, DVec3};
use uuid::Uuid;

use crate::bounds::Bounds3;
use crate::camera::Projection;
use crate::style::Style;

/// A 3D polyline. A single point is drawn as a dot marker.
#[derive(Debug, Clone)]
pub struct Line3 {
    /// Unique identifier
    pub id: Uuid,
    /// Ordered points in world space
    pub points: Vec<DVec3>,
    pub style: Style,
    pub visible: bool,
}

impl Line3 {
    /// Create a polyline through the given points
    pub fn new(points: Vec<DVec3>) -> Self {
        Line3 {
            id: Uuid::new_v4(),
            points,
            style: Style::default(),
            visible: true,
        }
    }

    /// Sets the style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace the traced points
    pub fn update_data(&mut self, points: Vec<DVec3>) {
        self.points = points;
    }

    /// Tight bounds around the traced points
    pub fn bounds(&self) -> Bounds3 {
        Bounds3::from_points(self.points.iter().copied())
    }
}

/// A 3D arrow from an origin along a direction vector.
#[derive(Debug, Clone)]
pub struct Arrow3 {
    /// Unique identifier
    pub id: Uuid,
    /// Tail position in world space
    pub origin: DVec3,
    /// Shaft vector; the tip sits at `origin + direction`
    pub direction: DVec3,
    pub style: Style,
    pub visible: bool,
}

impl Arrow3 {
    /// Create an arrow with the given tail and shaft vector
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Arrow3 {
            id: Uuid::new_v4(),
            origin,
            direction,
            style: Style::default(),
            visible: true,
        }
    }

    /// Sets the style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace tail and shaft vector
    pub fn update_data(&mut self, origin: DVec3, direction: DVec3) {
        self.origin = origin;
        self.direction = direction;
    }

    /// World position of the tip
    pub fn tip(&self) -> DVec3 {
        self.origin + self.direction
    }

    /// Bounds covering both endpoints
    pub fn bounds(&self) -> Bounds3 {
        Bounds3::from_points([self.origin, self.tip()])
    }
}

/// A circle in 3D space given by center, radius and plane normal.
#[derive(Debug, Clone)]
pub struct Circle3 {
    /// Unique identifier
    pub id: Uuid,
    pub center: DVec3,
    pub radius: f64,
    /// Normal of the circle plane; normalized when the path is built
    pub normal: DVec3,
    pub style: Style,
    pub visible: bool,
}

/// Points per circle path.
const CIRCLE_SEGMENTS: usize = 40;

impl Circle3 {
    /// Create a circle with the given center, radius and plane normal
    pub fn new(center: DVec3, radius: f64, normal: DVec3) -> Self {
        Circle3 {
            id: Uuid::new_v4(),
            center,
            radius,
            normal,
            style: Style::default(),
            visible: true,
        }
    }

    /// Sets the style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace center and plane normal
    pub fn update_data(&mut self, center: DVec3, normal: DVec3) {
        self.center = center;
        self.normal = normal;
    }

    /// Rotation taking the z axis onto `normal`.
    ///
    /// Built from the cross product with `sin = |z x n|` and
    /// `cos = sqrt(1 - sin^2)`, so only rotations up to 90 degrees are
    /// represented; a normal tilted further flips back across the plane.
    pub fn rotation_for_normal(normal: DVec3) -> DMat3 {
        let n = normal.normalize_or_zero();
        if n == DVec3::ZERO {
            return DMat3::IDENTITY;
        }
        let v = DVec3::Z.cross(n);
        let s = v.length();
        if s < 1e-12 {
            return DMat3::IDENTITY;
        }
        let c = (1.0 - s * s).max(0.0).sqrt();
        let k = v / s;
        let skew = [
            [0.0, -k.z, k.y],
            [k.z, 0.0, -k.x],
            [-k.y, k.x, 0.0],
        ];
        let mut r = [[0.0; 3]; 3];
        let ka = [k.x, k.y, k.z];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = (1.0 - c) * ka[i] * ka[j] + s * skew[i][j];
                if i == j {
                    *entry += c;
                }
            }
        }
        DMat3::from_cols(
            DVec3::new(r[0][0], r[1][0], r[2][0]),
            DVec3::new(r[0][1], r[1][1], r[2][1]),
            DVec3::new(r[0][2], r[1][2], r[2][2]),
        )
    }

    /// The closed world-space path of the circle
    pub fn path(&self) -> Vec<DVec3> {
        let rot = Self::rotation_for_normal(self.normal);
        (0..=CIRCLE_SEGMENTS)
            .map(|i| {
                let t = i as f64 / CIRCLE_SEGMENTS as f64 * std::f64::consts::TAU;
                self.center + rot * DVec3::new(t.cos() * self.radius, t.sin() * self.radius, 0.0)
            })
            .collect()
    }

    /// Bounds around the circle path
    pub fn bounds(&self) -> Bounds3 {
        Bounds3::from_points(self.path())
    }
}

/// An artist projected to the screen for one paint.
#[derive(Debug, Clone)]
pub struct ProjectedArtist {
    /// Identifier of the source artist
    pub id: Uuid,
    pub style: Style,
    /// Screen-space path in draw order
    pub path: Vec<DVec2>,
    /// Depth key; smaller sorts nearer
    pub depth: f64,
    /// True when the path is an arrow shaft needing a head
    pub arrow: bool,
}

/// A renderable primitive.
#[derive(Debug, Clone)]
pub enum Artist {
    Line(Line3),
    Arrow(Arrow3),
    Circle(Circle3),
}

impl Artist {
    /// Unique identifier of the primitive
    pub fn id(&self) -> Uuid {
        match self {
            Artist::Line(a) => a.id,
            Artist::Arrow(a) => a.id,
            Artist::Circle(a) => a.id,
        }
    }

    /// The draw style
    pub fn style(&self) -> &Style {
        match self {
            Artist::Line(a) => &a.style,
            Artist::Arrow(a) => &a.style,
            Artist::Circle(a) => &a.style,
        }
    }

    /// Whether the primitive is drawn
    pub fn visible(&self) -> bool {
        match self {
            Artist::Line(a) => a.visible,
            Artist::Arrow(a) => a.visible,
            Artist::Circle(a) => a.visible,
        }
    }

    /// Show or hide the primitive
    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Artist::Line(a) => a.visible = visible,
            Artist::Arrow(a) => a.visible = visible,
            Artist::Circle(a) => a.visible = visible,
        }
    }

    /// World bounds of the primitive
    pub fn bounds(&self) -> Bounds3 {
        match self {
            Artist::Line(a) => a.bounds(),
            Artist::Arrow(a) => a.bounds(),
            Artist::Circle(a) => a.bounds(),
        }
    }

    fn world_path(&self) -> Vec<DVec3> {
        match self {
            Artist::Line(a) => a.points.clone(),
            Artist::Arrow(a) => vec![a.origin, a.tip()],
            Artist::Circle(a) => a.path(),
        }
    }

    /// Project to the screen; `None` for hidden or empty primitives.
    pub fn project(&self, projection: &Projection) -> Option<ProjectedArtist> {
        if !self.visible() {
            return None;
        }
        let world = self.world_path();
        if world.is_empty() {
            return None;
        }
        let mut path = Vec::with_capacity(world.len());
        let mut depth = f64::INFINITY;
        for p in world {
            let projected = projection.project(p);
            depth = depth.min(projected.depth);
            path.push(projected.screen);
        }
        Some(ProjectedArtist {
            id: self.id(),
            style: *self.style(),
            path,
            depth,
            arrow: matches!(self, Artist::Arrow(_)),
        })
    }

    /// True when `cursor` is within the pick distance of the projected
    /// primitive. Hidden primitives never hit.
    pub fn contains(&self, cursor: DVec2, projection: &Projection) -> bool {
        let Some(projected) = self.project(projection) else {
            return false;
        };
        let radius = self.style().picker_radius;
        if projected.path.len() == 1 {
            return cursor.distance(projected.path[0]) <= radius;
        }
        projected
            .path
            .windows(2)
            .any(|seg| segment_distance(cursor, seg[0], seg[1]) <= radius)
    }
}

/// Distance from a point to a screen-space segment.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use approx::assert_relative_eq;

    fn test_projection() -> Projection {
        Projection::new(&Camera::default(), DVec2::ZERO, DVec2::new(800.0, 600.0))
    }

    #[test]
    fn test_circle_path_in_xy_plane() {
        let circle = Circle3::new(DVec3::new(1.0, 2.0, 3.0), 0.5, DVec3::Z);
        for p in circle.path() {
            assert_relative_eq!(p.z, 3.0, epsilon = 1e-12);
            assert_relative_eq!((p - circle.center).length(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_circle_path_follows_normal() {
        let circle = Circle3::new(DVec3::ZERO, 1.0, DVec3::X);
        for p in circle.path() {
            // Every path point lies in the plane orthogonal to the normal.
            assert_relative_eq!(p.dot(DVec3::X), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rotation_for_normal_maps_z() {
        let n = DVec3::new(1.0, 1.0, 1.0).normalize();
        let rot = Circle3::rotation_for_normal(n);
        let mapped = rot * DVec3::Z;
        assert_relative_eq!(mapped.x, n.x, epsilon = 1e-12);
        assert_relative_eq!(mapped.y, n.y, epsilon = 1e-12);
        assert_relative_eq!(mapped.z, n.z, epsilon = 1e-12);
    }

    #[test]
    fn test_arrow_depth_is_nearer_endpoint() {
        let camera = Camera {
            elevation: 0.0,
            azimuth: 0.0,
            ..Camera::default()
        };
        let projection = Projection::new(&camera, DVec2::ZERO, DVec2::new(800.0, 600.0));
        // Shaft pointing away from the eye on +x.
        let arrow = Artist::Arrow(Arrow3::new(DVec3::new(2.0, 0.0, 0.0), DVec3::new(-4.0, 0.0, 0.0)));
        let near = projection.project(DVec3::new(2.0, 0.0, 0.0)).depth;
        let projected = arrow.project(&projection).unwrap();
        assert_relative_eq!(projected.depth, near, epsilon = 1e-12);
    }

    #[test]
    fn test_line_hit_testing() {
        let projection = test_projection();
        let line = Artist::Line(Line3::new(vec![
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
        ]));
        let on = line.project(&projection).unwrap().path[0];
        assert!(line.contains(on, &projection));
        assert!(!line.contains(on + DVec2::new(500.0, 500.0), &projection));
    }

    #[test]
    fn test_hidden_artist_never_hits_but_reports_bounds() {
        let projection = test_projection();
        let mut line = Artist::Line(Line3::new(vec![DVec3::ZERO, DVec3::X]));
        let on = line.project(&projection).unwrap().path[0];
        line.set_visible(false);
        assert!(!line.contains(on, &projection));
        assert!(!line.bounds().is_empty());
    }

    #[test]
    fn test_update_data_moves_bounds() {
        let mut arrow = Arrow3::new(DVec3::ZERO, DVec3::X);
        arrow.update_data(DVec3::new(5.0, 0.0, 0.0), DVec3::Y);
        let b = arrow.bounds();
        assert_relative_eq!(b.min.x, 5.0);
        assert_relative_eq!(b.max.y, 1.0);
    }
}
