//! Camera and Projection
//!
//! An orbit camera described by elevation, azimuth and roll in degrees,
//! with orthographic or perspective projection. A `Projection` snapshots
//! the world-to-screen mapping for one paint so every primitive projects
//! against the same matrices.

use glam::{DMat4, DVec2, DVec3};

/// Projection kind of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    /// Parallel projection
    Orthographic,
    /// Perspective projection with the given vertical field of view (degrees)
    Perspective { fov_y: f64 },
}

/// Orbit camera looking at a focus point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Elevation above the xy plane, degrees
    pub elevation: f64,
    /// Azimuth about the z axis, degrees
    pub azimuth: f64,
    /// Roll about the view axis, degrees
    pub roll: f64,
    /// Distance from the focus point
    pub distance: f64,
    /// Point the camera looks at
    pub focus: DVec3,
    pub kind: ProjectionKind,
}

impl Camera {
    /// Sets elevation and azimuth in degrees
    pub fn with_angles(mut self, elevation: f64, azimuth: f64) -> Self {
        self.elevation = elevation;
        self.azimuth = azimuth;
        self
    }

    /// Sets the projection kind
    pub fn with_kind(mut self, kind: ProjectionKind) -> Self {
        self.kind = kind;
        self
    }

    /// World position of the eye
    pub fn eye(&self) -> DVec3 {
        let el = self.elevation.to_radians();
        let az = self.azimuth.to_radians();
        let dir = DVec3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin());
        self.focus + dir * self.distance
    }

    /// View matrix (world to camera space)
    pub fn view_matrix(&self) -> DMat4 {
        let look = DMat4::look_at_rh(self.eye(), self.focus, DVec3::Z);
        DMat4::from_rotation_z(self.roll.to_radians()) * look
    }

    /// Projection matrix for the given viewport aspect ratio
    pub fn projection_matrix(&self, aspect: f64) -> DMat4 {
        let near = (self.distance * 0.01).max(1e-4);
        let far = self.distance * 100.0;
        match self.kind {
            ProjectionKind::Perspective { fov_y } => {
                DMat4::perspective_rh(fov_y.to_radians(), aspect, near, far)
            }
            ProjectionKind::Orthographic => {
                // Half-height chosen so orthographic and perspective views of
                // the focus plane have comparable size at fov 45.
                let half_h = self.distance * (22.5f64).to_radians().tan();
                let half_w = half_h * aspect;
                DMat4::orthographic_rh(-half_w, half_w, -half_h, half_h, near, far)
            }
        }
    }

    /// Orbit by deltas in degrees, clamping elevation short of the poles.
    pub fn orbit(&mut self, delta_azimuth: f64, delta_elevation: f64) {
        self.azimuth = (self.azimuth + delta_azimuth) % 360.0;
        self.elevation = (self.elevation + delta_elevation).clamp(-89.0, 89.0);
    }

    /// Scale the focus distance by `factor`.
    pub fn zoom(&mut self, factor: f64) {
        self.distance = (self.distance * factor).clamp(1e-3, 1e6);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            elevation: 30.0,
            azimuth: -60.0,
            roll: 0.0,
            distance: 6.0,
            focus: DVec3::ZERO,
            kind: ProjectionKind::Perspective { fov_y: 45.0 },
        }
    }
}

/// A point projected to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Screen position in pixels, y down
    pub screen: DVec2,
    /// Normalized depth, smaller is nearer
    pub depth: f64,
}

/// World-to-screen mapping captured for one paint.
#[derive(Debug, Clone)]
pub struct Projection {
    view_proj: DMat4,
    viewport_min: DVec2,
    viewport_size: DVec2,
}

impl Projection {
    /// Build the mapping for `camera` over the given viewport rectangle.
    pub fn new(camera: &Camera, viewport_min: DVec2, viewport_size: DVec2) -> Self {
        let aspect = if viewport_size.y > 0.0 {
            viewport_size.x / viewport_size.y
        } else {
            1.0
        };
        Projection {
            view_proj: camera.projection_matrix(aspect) * camera.view_matrix(),
            viewport_min,
            viewport_size,
        }
    }

    /// The viewport rectangle origin in pixels
    pub fn viewport_min(&self) -> DVec2 {
        self.viewport_min
    }

    /// The viewport rectangle size in pixels
    pub fn viewport_size(&self) -> DVec2 {
        self.viewport_size
    }

    /// Project a world point to screen pixels plus depth.
    pub fn project(&self, world: DVec3) -> ProjectedPoint {
        let clip = self.view_proj * world.extend(1.0);
        let w = if clip.w.abs() < 1e-12 { 1e-12 } else { clip.w };
        let ndc = clip.truncate() / w;
        let screen = DVec2::new(
            self.viewport_min.x + (ndc.x * 0.5 + 0.5) * self.viewport_size.x,
            self.viewport_min.y + (0.5 - ndc.y * 0.5) * self.viewport_size.y,
        );
        ProjectedPoint {
            screen,
            depth: ndc.z,
        }
    }
}

/// Elevation, azimuth and roll in degrees from a rotation matrix relating a
/// viewing frame to the world frame.
pub fn euler_angles(r: &[[f64; 3]; 3]) -> (f64, f64, f64) {
    let elevation = (-r[2][0]).asin();
    let azimuth = r[1][0].atan2(r[0][0]);
    let roll = r[2][1].atan2(r[2][2]);
    (
        elevation.to_degrees(),
        azimuth.to_degrees(),
        roll.to_degrees(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_projection(camera: &Camera) -> Projection {
        Projection::new(camera, DVec2::ZERO, DVec2::new(800.0, 600.0))
    }

    #[test]
    fn test_focus_projects_to_viewport_center() {
        let camera = Camera::default();
        let p = test_projection(&camera).project(camera.focus);
        assert_relative_eq!(p.screen.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(p.screen.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nearer_points_have_smaller_depth() {
        let camera = Camera {
            elevation: 0.0,
            azimuth: 0.0,
            ..Camera::default()
        };
        // The camera sits on +x looking at the origin.
        let projection = test_projection(&camera);
        let near = projection.project(DVec3::new(2.0, 0.0, 0.0));
        let far = projection.project(DVec3::new(-2.0, 0.0, 0.0));
        assert!(near.depth < far.depth);
    }

    #[test]
    fn test_orthographic_parallel_lines_stay_parallel() {
        let camera = Camera {
            elevation: 0.0,
            azimuth: 0.0,
            kind: ProjectionKind::Orthographic,
            ..Camera::default()
        };
        let projection = test_projection(&camera);
        // Two points at equal y offsets, different distances from the eye.
        let a = projection.project(DVec3::new(2.0, 1.0, 0.0));
        let b = projection.project(DVec3::new(-2.0, 1.0, 0.0));
        assert_relative_eq!(a.screen.x, b.screen.x, epsilon = 1e-9);
    }

    #[test]
    fn test_euler_angles_of_z_rotation() {
        let q = 0.7f64;
        let (s, c) = q.sin_cos();
        let r = [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]];
        let (elevation, azimuth, roll) = euler_angles(&r);
        assert_relative_eq!(elevation, 0.0, epsilon = 1e-9);
        assert_relative_eq!(azimuth, q.to_degrees(), epsilon = 1e-9);
        assert_relative_eq!(roll, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_orbit_clamps_elevation() {
        let mut camera = Camera::default();
        camera.orbit(0.0, 500.0);
        assert_relative_eq!(camera.elevation, 89.0);
    }
}
