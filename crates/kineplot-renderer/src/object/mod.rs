//! Plot-Node Hierarchy
//!
//! Nodes wrap symbolic entities and own the primitives that draw them.
//! Every node carries the same shared scene context, a list of child
//! nodes, and the numeric values of its own expressions. Collection and
//! distribution walk the tree in the same order, so the value tree always
//! mirrors the expression tree.

mod body;
mod frame;
mod line;
mod point;
mod vector;

pub use body::*;
pub use frame::*;
pub use line::*;
pub use point::*;
pub use vector::*;

use std::sync::Arc;

use glam::{DVec2, DVec3};
use uuid::Uuid;

use kineplot_core::{Expr, ExprTree, Point, ReferenceFrame, ValueTree, Vector};

use crate::artist::Artist;
use crate::bounds::Bounds3;
use crate::camera::Projection;
use crate::error::SceneError;

/// Shared by every node of one scene: the inertial frame everything is
/// expressed in and the zero point positions are measured from. Fixed when
/// the scene is created.
#[derive(Debug)]
pub struct SceneContext {
    pub inertial_frame: ReferenceFrame,
    pub zero_point: Point,
}

impl SceneContext {
    /// Wrap a frame and zero point into a shared context
    pub fn new(inertial_frame: ReferenceFrame, zero_point: Point) -> ContextRef {
        Arc::new(SceneContext {
            inertial_frame,
            zero_point,
        })
    }
}

/// Shared handle to a scene context.
pub type ContextRef = Arc<SceneContext>;

/// Where a node anchors: an existing point, or the tip of a vector
/// measured from the scene zero point.
#[derive(Debug, Clone)]
pub enum OriginSpec {
    At(Point),
    Offset(Vector),
}

impl OriginSpec {
    /// Resolve to a concrete point within `context`.
    pub fn resolve(self, name: &str, context: &SceneContext) -> Point {
        match self {
            OriginSpec::At(point) => point,
            OriginSpec::Offset(offset) => context.zero_point.locatenew(name, offset),
        }
    }
}

impl From<Point> for OriginSpec {
    fn from(point: Point) -> Self {
        OriginSpec::At(point)
    }
}

impl From<Vector> for OriginSpec {
    fn from(offset: Vector) -> Self {
        OriginSpec::Offset(offset)
    }
}

/// State common to every plot node.
#[derive(Debug)]
pub struct NodeData {
    /// Unique identifier
    pub id: Uuid,
    /// Display name used by the hover annotation
    pub name: String,
    /// The shared scene context
    pub context: ContextRef,
    /// Point the node is anchored at
    pub origin: Point,
    pub visible: bool,
    /// Current values of the node's own expressions, in collect order
    pub values: Vec<f64>,
    /// Primitives owned by this node
    pub artists: Vec<Artist>,
    /// Child nodes, in collect order
    pub children: Vec<PlotObject>,
}

impl NodeData {
    /// Fresh node state with no values, artists or children yet
    pub fn new(context: ContextRef, origin: Point, name: &str) -> Self {
        NodeData {
            id: Uuid::new_v4(),
            name: name.to_string(),
            context,
            origin,
            visible: true,
            values: Vec::new(),
            artists: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Behavior each node type layers over its [`NodeData`].
pub trait PlotNode {
    fn data(&self) -> &NodeData;
    fn data_mut(&mut self) -> &mut NodeData;
    /// The expressions this node itself needs evaluated
    fn collect_self(&self) -> Vec<Expr>;
    /// Push current values into this node's own artists
    fn update_self(&mut self);
    /// World position the hover annotation anchors at
    fn annot_coords(&self) -> DVec3;
}

/// A node of the plot tree.
#[derive(Debug)]
pub enum PlotObject {
    Point(PlotPoint),
    Line(PlotLine),
    Vector(PlotVector),
    Frame(PlotFrame),
    Body(PlotBody),
}

impl PlotObject {
    /// The node behavior behind this object
    pub fn as_node(&self) -> &dyn PlotNode {
        match self {
            PlotObject::Point(n) => n,
            PlotObject::Line(n) => n,
            PlotObject::Vector(n) => n,
            PlotObject::Frame(n) => n,
            PlotObject::Body(n) => n,
        }
    }

    /// Mutable node behavior behind this object
    pub fn as_node_mut(&mut self) -> &mut dyn PlotNode {
        match self {
            PlotObject::Point(n) => n,
            PlotObject::Line(n) => n,
            PlotObject::Vector(n) => n,
            PlotObject::Frame(n) => n,
            PlotObject::Body(n) => n,
        }
    }

    /// Shared node state
    pub fn data(&self) -> &NodeData {
        self.as_node().data()
    }

    /// Mutable shared node state
    pub fn data_mut(&mut self) -> &mut NodeData {
        self.as_node_mut().data_mut()
    }

    /// Unique identifier
    pub fn id(&self) -> Uuid {
        self.data().id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// World position the hover annotation anchors at
    pub fn annot_coords(&self) -> DVec3 {
        self.as_node().annot_coords()
    }

    /// Gather this node's expressions and those of all descendants.
    ///
    /// Own expressions come first, then one subtree per child in order.
    /// Pure and stable: repeated calls give the same tree.
    pub fn collect(&self) -> ExprTree {
        ExprTree::new(
            self.as_node().collect_self(),
            self.data().children.iter().map(PlotObject::collect).collect(),
        )
    }

    /// Store evaluated values back into the tree.
    ///
    /// The value tree must match the collected expression tree exactly,
    /// node for node; any difference fails loudly without partial writes
    /// below the mismatching node.
    pub fn distribute(&mut self, values: &ValueTree) -> Result<(), SceneError> {
        let expected_own = self.as_node().collect_self().len();
        if values.values.len() != expected_own
            || values.children.len() != self.data().children.len()
        {
            return Err(SceneError::ShapeMismatch {
                expected: self.collect().shape(),
                got: values.shape(),
            });
        }
        self.data_mut().values = values.values.clone();
        for (child, subtree) in self
            .data_mut()
            .children
            .iter_mut()
            .zip(&values.children)
        {
            child.distribute(subtree)?;
        }
        Ok(())
    }

    /// Push current values into artists, recursively.
    pub fn update(&mut self) {
        self.as_node_mut().update_self();
        for child in &mut self.data_mut().children {
            child.update();
        }
    }

    /// All artists of this node and its descendants, in tree order.
    pub fn artists(&self) -> Vec<&Artist> {
        let mut out: Vec<&Artist> = self.data().artists.iter().collect();
        for child in &self.data().children {
            out.extend(child.artists());
        }
        out
    }

    /// Union of the bounds of all artists in this subtree.
    pub fn bounds(&self) -> Bounds3 {
        self.artists()
            .iter()
            .fold(Bounds3::EMPTY, |acc, artist| acc.union(&artist.bounds()))
    }

    /// Show or hide this node and all descendants.
    pub fn set_visible(&mut self, visible: bool) {
        self.data_mut().visible = visible;
        for artist in &mut self.data_mut().artists {
            artist.set_visible(visible);
        }
        for child in &mut self.data_mut().children {
            child.set_visible(visible);
        }
    }

    /// True when the cursor hits one of this node's own artists.
    pub fn contains(&self, cursor: DVec2, projection: &Projection) -> bool {
        self.data()
            .artists
            .iter()
            .any(|artist| artist.contains(cursor, projection))
    }

    /// First node in traversal order (self before children) whose own
    /// artists are hit by the cursor.
    pub fn find_hovered(&self, cursor: DVec2, projection: &Projection) -> Option<&PlotObject> {
        if self.contains(cursor, projection) {
            return Some(self);
        }
        for child in &self.data().children {
            if let Some(hit) = child.find_hovered(cursor, projection) {
                return Some(hit);
            }
        }
        None
    }

    /// Find a node by name in this subtree, traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<&PlotObject> {
        if self.data().name == name {
            return Some(self);
        }
        self.data()
            .children
            .iter()
            .find_map(|child| child.find_by_name(name))
    }

    /// Mutable lookup by name in this subtree, traversal order.
    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut PlotObject> {
        if self.data().name == name {
            return Some(self);
        }
        self.data_mut()
            .children
            .iter_mut()
            .find_map(|child| child.find_by_name_mut(name))
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> ContextRef {
    SceneContext::new(ReferenceFrame::new("N"), Point::new("O"))
}
