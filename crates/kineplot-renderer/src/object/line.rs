//! Line Nodes

use glam::DVec3;

use kineplot_core::{Expr, Point};

use crate::artist::{Artist, Line3};
use crate::error::SceneError;
use crate::style::Style;

use super::{ContextRef, NodeData, PlotNode};

/// Plots a polyline through an ordered list of points.
#[derive(Debug)]
pub struct PlotLine {
    data: NodeData,
    points: Vec<Point>,
    /// Three position scalars per traced point, flattened
    position_exprs: Vec<Expr>,
}

impl PlotLine {
    /// Wrap an ordered point list for plotting. At least two points are
    /// required; every point must be connected to the zero point.
    pub fn new(context: ContextRef, points: Vec<Point>, name: &str) -> Result<Self, SceneError> {
        if points.len() < 2 {
            return Err(SceneError::TooFewLinePoints { got: points.len() });
        }
        let mut position_exprs = Vec::with_capacity(points.len() * 3);
        for point in &points {
            let components = point
                .pos_from(&context.zero_point)?
                .to_matrix(&context.inertial_frame)?;
            position_exprs.extend(components);
        }
        let origin = points[0].clone();
        let mut data = NodeData::new(context, origin, name);
        data.artists.push(Artist::Line(Line3::new(Vec::new())));
        Ok(PlotLine {
            data,
            points,
            position_exprs,
        })
    }

    /// Sets the line style
    pub fn with_style(mut self, style: Style) -> Self {
        if let Some(Artist::Line(line)) = self.data.artists.first_mut() {
            line.style = style;
        }
        self
    }

    /// The traced points
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn traced(&self) -> Vec<DVec3> {
        self.data
            .values
            .chunks_exact(3)
            .map(|c| DVec3::new(c[0], c[1], c[2]))
            .collect()
    }
}

impl PlotNode for PlotLine {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    fn collect_self(&self) -> Vec<Expr> {
        self.position_exprs.clone()
    }

    fn update_self(&mut self) {
        if self.data.values.len() != self.points.len() * 3 {
            return;
        }
        let traced = self.traced();
        if let Some(Artist::Line(line)) = self.data.artists.first_mut() {
            line.update_data(traced);
        }
    }

    fn annot_coords(&self) -> DVec3 {
        let traced = self.traced();
        if traced.is_empty() {
            return DVec3::ZERO;
        }
        traced.iter().sum::<DVec3>() / traced.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{test_context, PlotObject};
    use kineplot_core::{lambdify, Symbol};
    use approx::assert_relative_eq;

    #[test]
    fn test_line_requires_two_points() {
        let context = test_context();
        let err = PlotLine::new(context.clone(), vec![context.zero_point.clone()], "L")
            .unwrap_err();
        assert!(matches!(err, SceneError::TooFewLinePoints { got: 1 }));
    }

    #[test]
    fn test_line_collects_three_per_point() {
        let context = test_context();
        let a = context
            .zero_point
            .locatenew("a", context.inertial_frame.x() * Expr::symbol("q"));
        let b = a.locatenew("b", context.inertial_frame.y() * 1.0);
        let node = PlotLine::new(context.clone(), vec![context.zero_point.clone(), a, b], "L")
            .unwrap();
        assert_eq!(node.collect_self().len(), 9);
    }

    #[test]
    fn test_line_annotation_is_point_average() {
        let context = test_context();
        let a = context
            .zero_point
            .locatenew("a", context.inertial_frame.x() * Expr::symbol("q"));
        let mut node = PlotObject::Line(
            PlotLine::new(context.clone(), vec![context.zero_point.clone(), a], "L").unwrap(),
        );
        let eval = lambdify(&[Symbol::new("q")], &node.collect()).unwrap();
        node.distribute(&eval.call(&[4.0]).unwrap()).unwrap();
        node.update();
        assert_relative_eq!(node.annot_coords().x, 2.0);
    }
}
