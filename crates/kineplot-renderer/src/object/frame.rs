//! Frame Nodes

use glam::DVec3;

use kineplot_core::{Expr, ReferenceFrame};

use crate::error::SceneError;
use crate::style::{Color, Style};

use super::{ContextRef, NodeData, OriginSpec, PlotNode, PlotObject, PlotVector};

/// Plots a reference frame as three axis arrows (x red, y green, z blue).
#[derive(Debug)]
pub struct PlotFrame {
    data: NodeData,
    frame: ReferenceFrame,
    scale: f64,
}

impl PlotFrame {
    /// Wrap `frame` for plotting, anchored at `origin`, axis arrows of
    /// length `scale`.
    pub fn new(
        context: ContextRef,
        frame: ReferenceFrame,
        origin: impl Into<OriginSpec>,
        scale: f64,
        name: &str,
    ) -> Result<Self, SceneError> {
        let origin = origin.into().resolve(&format!("{name}_origin"), &context);
        let axes = [
            (frame.x(), "x", Color::RED),
            (frame.y(), "y", Color::GREEN),
            (frame.z(), "z", Color::BLUE),
        ];
        let mut data = NodeData::new(context.clone(), origin.clone(), name);
        for (axis, suffix, color) in axes {
            let child = PlotVector::new(
                context.clone(),
                axis * scale,
                origin.clone(),
                &format!("{name}.{suffix}"),
            )?
            .with_style(Style::default().with_color(color));
            data.children.push(PlotObject::Vector(child));
        }
        Ok(PlotFrame { data, frame, scale })
    }

    /// The wrapped frame
    pub fn frame(&self) -> &ReferenceFrame {
        &self.frame
    }

    /// Length of the axis arrows
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl PlotNode for PlotFrame {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    fn collect_self(&self) -> Vec<Expr> {
        Vec::new()
    }

    fn update_self(&mut self) {}

    /// Anchors a little way along the axis diagonal so the label clears
    /// the origin marker.
    fn annot_coords(&self) -> DVec3 {
        let mut origin = DVec3::ZERO;
        let mut diagonal = DVec3::ZERO;
        for child in &self.data.children {
            if let PlotObject::Vector(axis) = child {
                origin = axis.tail();
                diagonal += axis.shaft();
            }
        }
        origin + diagonal * 0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::test_context;
    use kineplot_core::{lambdify, Symbol};
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_has_three_axis_children() {
        let context = test_context();
        let b = context
            .inertial_frame
            .orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));
        let node = PlotFrame::new(
            context.clone(),
            b,
            OriginSpec::At(context.zero_point.clone()),
            1.0,
            "B",
        )
        .unwrap();
        assert_eq!(node.data().children.len(), 3);
        assert!(node.collect_self().is_empty());
    }

    #[test]
    fn test_axis_arrows_follow_orientation() {
        let context = test_context();
        let b = context
            .inertial_frame
            .orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));
        let mut node = PlotObject::Frame(
            PlotFrame::new(
                context.clone(),
                b,
                OriginSpec::At(context.zero_point.clone()),
                2.0,
                "B",
            )
            .unwrap(),
        );
        let eval = lambdify(&[Symbol::new("q")], &node.collect()).unwrap();
        let q = std::f64::consts::FRAC_PI_2;
        node.distribute(&eval.call(&[q]).unwrap()).unwrap();
        node.update();

        // At 90 degrees the x axis arrow points along world y.
        if let PlotObject::Frame(frame) = &node {
            if let PlotObject::Vector(x_axis) = &frame.data().children[0] {
                assert_relative_eq!(x_axis.shaft().x, 0.0, epsilon = 1e-12);
                assert_relative_eq!(x_axis.shaft().y, 2.0, epsilon = 1e-12);
            }
        }
    }
}
