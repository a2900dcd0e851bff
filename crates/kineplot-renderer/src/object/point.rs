//! Point Nodes

use glam::DVec3;

use kineplot_core::{Expr, Point};

use crate::artist::{Artist, Line3};
use crate::error::SceneError;
use crate::style::Style;

use super::{ContextRef, NodeData, PlotNode};

/// Plots a point as a dot marker at its position from the zero point.
#[derive(Debug)]
pub struct PlotPoint {
    data: NodeData,
    point: Point,
    /// Position of the point in the inertial frame, from the zero point
    position_exprs: [Expr; 3],
}

impl PlotPoint {
    /// Wrap `point` for plotting. Fails when the point is not connected to
    /// the context's zero point.
    pub fn new(context: ContextRef, point: Point, name: &str) -> Result<Self, SceneError> {
        let position_exprs = point
            .pos_from(&context.zero_point)?
            .to_matrix(&context.inertial_frame)?;
        let mut data = NodeData::new(context, point.clone(), name);
        data.artists.push(Artist::Line(
            Line3::new(Vec::new()).with_style(Style::default().with_width(6.0)),
        ));
        Ok(PlotPoint {
            data,
            point,
            position_exprs,
        })
    }

    /// Sets the marker style
    pub fn with_style(mut self, style: Style) -> Self {
        if let Some(artist) = self.data.artists.first_mut() {
            if let Artist::Line(line) = artist {
                line.style = style;
            }
        }
        self
    }

    /// The wrapped point
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// Current world position, zero before the first evaluation
    pub fn position(&self) -> DVec3 {
        match self.data.values.as_slice() {
            [x, y, z] => DVec3::new(*x, *y, *z),
            _ => DVec3::ZERO,
        }
    }
}

impl PlotNode for PlotPoint {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    fn collect_self(&self) -> Vec<Expr> {
        self.position_exprs.to_vec()
    }

    fn update_self(&mut self) {
        let position = self.position();
        if self.data.values.len() != 3 {
            return;
        }
        if let Some(Artist::Line(line)) = self.data.artists.first_mut() {
            line.update_data(vec![position]);
        }
    }

    fn annot_coords(&self) -> DVec3 {
        self.position()
    }
}
