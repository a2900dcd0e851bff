//! Body Nodes

use glam::DVec3;

use kineplot_core::{Expr, Point, ReferenceFrame};

use crate::artist::{Artist, Circle3};
use crate::error::SceneError;
use crate::style::Style;

use super::{ContextRef, NodeData, OriginSpec, PlotFrame, PlotNode, PlotObject, PlotPoint};

/// A rigid body or particle to plot: a mass center, an optional body
/// frame, and an optional circular outline in the body plane.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub name: String,
    pub mass_center: Point,
    pub frame: Option<ReferenceFrame>,
    /// Radius of the outline circle, when the body has one
    pub shape_radius: Option<f64>,
}

impl BodySpec {
    /// A particle: mass center only
    pub fn particle(name: &str, mass_center: Point) -> Self {
        BodySpec {
            name: name.to_string(),
            mass_center,
            frame: None,
            shape_radius: None,
        }
    }

    /// A rigid body with its own frame
    pub fn rigid(name: &str, mass_center: Point, frame: ReferenceFrame) -> Self {
        BodySpec {
            name: name.to_string(),
            mass_center,
            frame: Some(frame),
            shape_radius: None,
        }
    }

    /// Sets the outline circle radius
    pub fn with_shape_radius(mut self, radius: f64) -> Self {
        self.shape_radius = Some(radius);
        self
    }
}

/// Plots a body as its mass center, its frame when it has one, and an
/// optional outline circle.
#[derive(Debug)]
pub struct PlotBody {
    data: NodeData,
    spec: BodySpec,
    /// Circle center then plane normal, when an outline is configured
    outline_exprs: Vec<Expr>,
}

impl PlotBody {
    /// Wrap a body for plotting.
    pub fn new(context: ContextRef, spec: BodySpec) -> Result<Self, SceneError> {
        let mut data = NodeData::new(context.clone(), spec.mass_center.clone(), &spec.name);

        if let Some(frame) = &spec.frame {
            let child = PlotFrame::new(
                context.clone(),
                frame.clone(),
                OriginSpec::At(spec.mass_center.clone()),
                0.3,
                &format!("{}.frame", spec.name),
            )?;
            data.children.push(PlotObject::Frame(child));
        }
        let mass_center = PlotPoint::new(
            context.clone(),
            spec.mass_center.clone(),
            &format!("{}.masscenter", spec.name),
        )?;
        data.children.push(PlotObject::Point(mass_center));

        let mut outline_exprs = Vec::new();
        if let Some(radius) = spec.shape_radius {
            let center = spec
                .mass_center
                .pos_from(&context.zero_point)?
                .to_matrix(&context.inertial_frame)?;
            let normal_frame = spec.frame.as_ref().unwrap_or(&context.inertial_frame);
            let normal = normal_frame.z().to_matrix(&context.inertial_frame)?;
            outline_exprs.extend(center);
            outline_exprs.extend(normal);
            data.artists.push(Artist::Circle(
                Circle3::new(DVec3::ZERO, radius, DVec3::Z)
                    .with_style(Style::default().with_width(1.0)),
            ));
        }

        Ok(PlotBody {
            data,
            spec,
            outline_exprs,
        })
    }

    /// The plotted body description
    pub fn spec(&self) -> &BodySpec {
        &self.spec
    }
}

impl PlotNode for PlotBody {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    fn collect_self(&self) -> Vec<Expr> {
        self.outline_exprs.clone()
    }

    fn update_self(&mut self) {
        if self.data.values.len() != 6 {
            return;
        }
        let center = DVec3::new(self.data.values[0], self.data.values[1], self.data.values[2]);
        let normal = DVec3::new(self.data.values[3], self.data.values[4], self.data.values[5]);
        if let Some(Artist::Circle(circle)) = self.data.artists.first_mut() {
            circle.update_data(center, normal);
        }
    }

    /// Anchors at the mass center.
    fn annot_coords(&self) -> DVec3 {
        self.data
            .children
            .iter()
            .find_map(|child| match child {
                PlotObject::Point(point) => Some(point.annot_coords()),
                _ => None,
            })
            .unwrap_or(DVec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::test_context;
    use kineplot_core::{lambdify, Symbol};
    use approx::assert_relative_eq;

    #[test]
    fn test_particle_is_pure_container() {
        let context = test_context();
        let p = context
            .zero_point
            .locatenew("P", context.inertial_frame.x() * 1.0);
        let node = PlotBody::new(context, BodySpec::particle("ball", p)).unwrap();
        assert!(node.collect_self().is_empty());
        assert_eq!(node.data().children.len(), 1);
    }

    #[test]
    fn test_rigid_body_gets_frame_child() {
        let context = test_context();
        let b = context
            .inertial_frame
            .orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));
        let p = context
            .zero_point
            .locatenew("P", context.inertial_frame.x() * 1.0);
        let node = PlotBody::new(context, BodySpec::rigid("link", p, b)).unwrap();
        assert_eq!(node.data().children.len(), 2);
    }

    #[test]
    fn test_outline_circle_follows_body() {
        let context = test_context();
        let b = context
            .inertial_frame
            .orient_axis("B", [1.0, 0.0, 0.0], Expr::symbol("q"));
        let p = context
            .zero_point
            .locatenew("P", context.inertial_frame.y() * Expr::symbol("q"));
        let spec = BodySpec::rigid("disc", p, b).with_shape_radius(0.5);
        let mut node = PlotObject::Body(PlotBody::new(context, spec).unwrap());

        let eval = lambdify(&[Symbol::new("q")], &node.collect()).unwrap();
        let q = std::f64::consts::FRAC_PI_2;
        node.distribute(&eval.call(&[q]).unwrap()).unwrap();
        node.update();

        if let PlotObject::Body(body) = &node {
            if let Some(Artist::Circle(circle)) = body.data().artists.first() {
                assert_relative_eq!(circle.center.y, q);
                // Body z tilts onto world -y after a 90 degree x rotation.
                assert_relative_eq!(circle.normal.y, -1.0, epsilon = 1e-12);
            }
            assert_relative_eq!(node.annot_coords().y, q);
        }
    }
}
