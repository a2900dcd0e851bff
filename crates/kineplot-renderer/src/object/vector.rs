//! Vector Nodes

use glam::DVec3;

use kineplot_core::{Expr, Vector};

use crate::artist::{Arrow3, Artist};
use crate::error::SceneError;
use crate::style::Style;

use super::{ContextRef, NodeData, OriginSpec, PlotNode};

/// Plots a symbolic vector as an arrow anchored at an origin point.
#[derive(Debug)]
pub struct PlotVector {
    data: NodeData,
    vector: Vector,
    /// Origin position then vector components, all in the inertial frame
    exprs: [Expr; 6],
}

impl PlotVector {
    /// Wrap `vector` for plotting, anchored at `origin`.
    pub fn new(
        context: ContextRef,
        vector: Vector,
        origin: impl Into<OriginSpec>,
        name: &str,
    ) -> Result<Self, SceneError> {
        let origin = origin
            .into()
            .resolve(&format!("{name}_origin"), &context);
        let [ox, oy, oz] = origin
            .pos_from(&context.zero_point)?
            .to_matrix(&context.inertial_frame)?;
        let [vx, vy, vz] = vector.to_matrix(&context.inertial_frame)?;
        let mut data = NodeData::new(context, origin, name);
        data.artists
            .push(Artist::Arrow(Arrow3::new(DVec3::ZERO, DVec3::ZERO)));
        Ok(PlotVector {
            data,
            vector,
            exprs: [ox, oy, oz, vx, vy, vz],
        })
    }

    /// Sets the arrow style
    pub fn with_style(mut self, style: Style) -> Self {
        if let Some(Artist::Arrow(arrow)) = self.data.artists.first_mut() {
            arrow.style = style;
        }
        self
    }

    /// The wrapped symbolic vector
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Current tail position, zero before the first evaluation
    pub fn tail(&self) -> DVec3 {
        match self.data.values.as_slice() {
            [ox, oy, oz, ..] => DVec3::new(*ox, *oy, *oz),
            _ => DVec3::ZERO,
        }
    }

    /// Current shaft vector, zero before the first evaluation
    pub fn shaft(&self) -> DVec3 {
        match self.data.values.as_slice() {
            [_, _, _, vx, vy, vz] => DVec3::new(*vx, *vy, *vz),
            _ => DVec3::ZERO,
        }
    }
}

impl PlotNode for PlotVector {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    fn collect_self(&self) -> Vec<Expr> {
        self.exprs.to_vec()
    }

    fn update_self(&mut self) {
        if self.data.values.len() != 6 {
            return;
        }
        let tail = self.tail();
        let shaft = self.shaft();
        if let Some(Artist::Arrow(arrow)) = self.data.artists.first_mut() {
            arrow.update_data(tail, shaft);
        }
    }

    /// Anchors halfway along the shaft.
    fn annot_coords(&self) -> DVec3 {
        self.tail() + self.shaft() * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{test_context, PlotObject};
    use kineplot_core::{lambdify, Symbol};
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_collects_origin_then_components() {
        let context = test_context();
        let n = context.inertial_frame.clone();
        let node = PlotVector::new(
            context.clone(),
            n.x() * Expr::symbol("f"),
            context.zero_point.clone(),
            "F",
        )
        .unwrap();
        assert_eq!(node.collect_self().len(), 6);
    }

    #[test]
    fn test_vector_origin_from_offset() {
        let context = test_context();
        let n = context.inertial_frame.clone();
        let mut node = PlotObject::Vector(
            PlotVector::new(
                context.clone(),
                n.x() * 2.0,
                n.y() * 3.0,
                "F",
            )
            .unwrap(),
        );
        let eval = lambdify(&[], &node.collect()).unwrap();
        node.distribute(&eval.call(&[]).unwrap()).unwrap();
        node.update();

        if let PlotObject::Vector(v) = &node {
            assert_relative_eq!(v.tail().y, 3.0);
            assert_relative_eq!(v.shaft().x, 2.0);
        }
    }

    #[test]
    fn test_annotation_anchors_at_shaft_midpoint() {
        let context = test_context();
        let n = context.inertial_frame.clone();
        let mut node = PlotObject::Vector(
            PlotVector::new(
                context.clone(),
                n.x() * Expr::symbol("l"),
                context.zero_point.clone(),
                "F",
            )
            .unwrap(),
        );
        let eval = lambdify(&[Symbol::new("l")], &node.collect()).unwrap();
        node.distribute(&eval.call(&[4.0]).unwrap()).unwrap();
        node.update();
        assert_relative_eq!(node.annot_coords().x, 2.0);
    }
}
