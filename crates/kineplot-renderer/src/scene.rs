//! Scene Driver
//!
//! The scene owns the plot-node tree, the camera, and the compiled
//! evaluator. The first child is always a frame node for the inertial
//! frame, so an empty scene still shows where the world axes point.
//! Within one tick the order is evaluate, update, redraw.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kineplot_core::{
    lambdify, Bindings, CompiledEvaluator, ExprTree, Point, ReferenceFrame, Symbol, Vector,
};

use crate::artist::ProjectedArtist;
use crate::bounds::Bounds3;
use crate::camera::{euler_angles, Camera, Projection, ProjectionKind};
use crate::error::SceneError;
use crate::object::{
    BodySpec, ContextRef, OriginSpec, PlotBody, PlotFrame, PlotLine, PlotObject, PlotPoint,
    PlotVector, SceneContext,
};

/// The 3D canvas: an orbit camera plus the current axis limits.
#[derive(Debug, Clone)]
pub struct Axes3 {
    pub camera: Camera,
    /// World-space box the view is framed around
    pub limits: Bounds3,
}

impl Default for Axes3 {
    fn default() -> Self {
        Axes3 {
            camera: Camera::default(),
            limits: Bounds3 {
                min: DVec3::splat(-1.0),
                max: DVec3::splat(1.0),
            },
        }
    }
}

/// Where the hover annotation is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotLocation {
    /// At the hovered node's anchor position, projected to the screen
    Object,
    /// At the mouse cursor
    Mouse,
}

impl FromStr for AnnotLocation {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(AnnotLocation::Object),
            "mouse" => Ok(AnnotLocation::Mouse),
            other => Err(SceneError::InvalidAnnotLocation(other.to_string())),
        }
    }
}

/// The hover annotation bubble.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub visible: bool,
    /// Name of the hovered node
    pub text: String,
    /// Screen position in pixels
    pub screen_pos: DVec2,
}

/// A running animation: a frame source and the mapping from a frame
/// value to evaluator arguments. Stepping is driven from outside, one
/// frame per tick, so the iterator may be unbounded.
pub struct Animation {
    get_args: Box<dyn Fn(f64) -> Vec<f64>>,
    frames: Box<dyn Iterator<Item = f64>>,
    interval_ms: u64,
}

impl Animation {
    /// Requested delay between steps, milliseconds
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Consume the next frame, evaluate and update the scene.
    ///
    /// Returns `false` when the frame iterator is exhausted. Frames are
    /// consumed strictly in order, one per call, never skipped.
    pub fn step(&mut self, scene: &mut Scene) -> Result<bool, SceneError> {
        let Some(frame) = self.frames.next() else {
            return Ok(false);
        };
        let args = (self.get_args)(frame);
        scene.evaluate_system(&args)?;
        scene.update();
        Ok(true)
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("interval_ms", &self.interval_ms)
            .finish_non_exhaustive()
    }
}

/// Drives a tree of plot nodes through the collect, lambdify, evaluate,
/// update cycle and holds the camera and annotation state.
#[derive(Debug)]
pub struct Scene {
    context: ContextRef,
    pub axes: Axes3,
    children: Vec<PlotObject>,
    args: Vec<Symbol>,
    evaluator: Option<CompiledEvaluator>,
    /// Arguments of the most recent evaluation
    last_args: Vec<f64>,
    annot_location: AnnotLocation,
    annotation: Annotation,
    plotted: bool,
}

impl Scene {
    /// Create a scene around the given inertial frame and zero point.
    ///
    /// A frame node for the inertial frame is installed as the first
    /// child and survives [`Scene::clear`].
    pub fn new(inertial_frame: ReferenceFrame, zero_point: Point) -> Result<Self, SceneError> {
        let context = SceneContext::new(inertial_frame, zero_point);
        let root = PlotFrame::new(
            context.clone(),
            context.inertial_frame.clone(),
            OriginSpec::At(context.zero_point.clone()),
            1.0,
            context.inertial_frame.name(),
        )?;
        Ok(Scene {
            context,
            axes: Axes3::default(),
            children: vec![PlotObject::Frame(root)],
            args: Vec::new(),
            evaluator: None,
            last_args: Vec::new(),
            annot_location: AnnotLocation::Object,
            annotation: Annotation::default(),
            plotted: false,
        })
    }

    /// The shared scene context
    pub fn context(&self) -> &ContextRef {
        &self.context
    }

    /// The top-level plot nodes, inertial frame first
    pub fn objects(&self) -> &[PlotObject] {
        &self.children
    }

    /// Whether [`Scene::plot`] has run at least once
    pub fn is_plotted(&self) -> bool {
        self.plotted
    }

    /// The current hover annotation
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// The annotation placement mode
    pub fn annot_location(&self) -> AnnotLocation {
        self.annot_location
    }

    /// Sets the annotation placement mode
    pub fn set_annot_location(&mut self, location: AnnotLocation) {
        self.annot_location = location;
    }

    /// Add a fully built node to the scene.
    ///
    /// The node must share this scene's context. Adding after
    /// [`Scene::lambdify_system`] leaves the evaluator stale; the next
    /// evaluation fails with a shape mismatch until re-lambdified.
    pub fn add_object(&mut self, object: PlotObject) -> Result<Uuid, SceneError> {
        if !Arc::ptr_eq(&object.data().context, &self.context) {
            let context = &object.data().context;
            if context.inertial_frame != self.context.inertial_frame {
                return Err(SceneError::DuplicateInertialFrame);
            }
            if context.zero_point != self.context.zero_point {
                return Err(SceneError::DuplicateZeroPoint);
            }
        }
        let id = object.id();
        tracing::debug!(name = object.name(), "added plot object");
        self.children.push(object);
        Ok(id)
    }

    /// Add a point node
    pub fn add_point(&mut self, point: Point, name: &str) -> Result<Uuid, SceneError> {
        let node = PlotPoint::new(self.context.clone(), point, name)?;
        self.add_object(PlotObject::Point(node))
    }

    /// Add a polyline node through the given points
    pub fn add_line(&mut self, points: Vec<Point>, name: &str) -> Result<Uuid, SceneError> {
        let node = PlotLine::new(self.context.clone(), points, name)?;
        self.add_object(PlotObject::Line(node))
    }

    /// Add a vector node anchored at `origin`
    pub fn add_vector(
        &mut self,
        vector: Vector,
        origin: impl Into<OriginSpec>,
        name: &str,
    ) -> Result<Uuid, SceneError> {
        let node = PlotVector::new(self.context.clone(), vector, origin, name)?;
        self.add_object(PlotObject::Vector(node))
    }

    /// Add a frame node anchored at `origin` with the given axis length
    pub fn add_frame(
        &mut self,
        frame: ReferenceFrame,
        origin: impl Into<OriginSpec>,
        scale: f64,
        name: &str,
    ) -> Result<Uuid, SceneError> {
        let node = PlotFrame::new(self.context.clone(), frame, origin, scale, name)?;
        self.add_object(PlotObject::Frame(node))
    }

    /// Add a body node from its description
    pub fn add_body(&mut self, spec: BodySpec) -> Result<Uuid, SceneError> {
        let node = PlotBody::new(self.context.clone(), spec)?;
        self.add_object(PlotObject::Body(node))
    }

    /// Look up a node by name anywhere in the tree.
    pub fn get_plot_object(&self, name: &str) -> Option<&PlotObject> {
        self.children.iter().find_map(|child| child.find_by_name(name))
    }

    /// Mutable lookup by name anywhere in the tree.
    pub fn get_plot_object_mut(&mut self, name: &str) -> Option<&mut PlotObject> {
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_name_mut(name))
    }

    /// Show or hide the named node and its whole subtree.
    pub fn set_visibility(&mut self, name: &str, visible: bool) -> Result<(), SceneError> {
        match self.get_plot_object_mut(name) {
            Some(object) => {
                object.set_visible(visible);
                Ok(())
            }
            None => Err(SceneError::UnknownObject(name.to_string())),
        }
    }

    /// Expression tree of the whole scene: no own expressions, one
    /// subtree per top-level node.
    pub fn collect(&self) -> ExprTree {
        ExprTree::new(
            Vec::new(),
            self.children.iter().map(PlotObject::collect).collect(),
        )
    }

    /// Compile every expression in the scene against `args`.
    pub fn lambdify_system(&mut self, args: &[Symbol]) -> Result<(), SceneError> {
        let tree = self.collect();
        self.evaluator = Some(lambdify(args, &tree)?);
        self.args = args.to_vec();
        tracing::info!(
            args = args.len(),
            objects = self.children.len(),
            "lambdified scene"
        );
        Ok(())
    }

    /// Evaluate all expressions and distribute the values to the nodes.
    pub fn evaluate_system(&mut self, values: &[f64]) -> Result<(), SceneError> {
        let evaluator = self.evaluator.as_ref().ok_or(SceneError::NotLambdified)?;
        let tree = evaluator.call(values)?;
        if tree.children.len() != self.children.len() {
            return Err(SceneError::ShapeMismatch {
                expected: self.collect().shape(),
                got: tree.shape(),
            });
        }
        for (child, subtree) in self.children.iter_mut().zip(&tree.children) {
            child.distribute(subtree)?;
        }
        self.last_args = values.to_vec();
        Ok(())
    }

    /// Push current values into every node's artists.
    pub fn update(&mut self) {
        for child in &mut self.children {
            child.update();
        }
    }

    /// Draw pass entry point: pushes values to artists and marks the
    /// scene plotted. With `prettify` the view is framed around the
    /// artists with `ax_scale` margin.
    pub fn plot(&mut self, prettify: bool, ax_scale: f64) {
        self.update();
        self.plotted = true;
        if prettify {
            self.auto_zoom(ax_scale);
        }
    }

    /// Remove every node but the inertial frame.
    pub fn clear(&mut self) {
        let removed = self.children.len().saturating_sub(1);
        self.children.truncate(1);
        tracing::debug!(removed, "cleared scene");
    }

    /// Frame the view around the visible artists.
    ///
    /// Limits become a cube centered on the artist bounds, scaled by
    /// `scale`, and the camera is refocused on it. Returns the new
    /// limits, or `None` when nothing visible is plotted, in which case
    /// limits and camera stay untouched.
    pub fn auto_zoom(&mut self, scale: f64) -> Option<Bounds3> {
        let bounds = self
            .children
            .iter()
            .flat_map(PlotObject::artists)
            .filter(|artist| artist.visible())
            .fold(Bounds3::EMPTY, |acc, artist| acc.union(&artist.bounds()));
        if bounds.is_empty() {
            return None;
        }
        let cube = bounds.to_cube().scaled(scale);
        self.axes.limits = cube;
        self.axes.camera.focus = cube.center();
        self.axes.camera.distance = (cube.size().x * 1.5).max(1e-3);
        Some(cube)
    }

    /// Switch to an orthographic head-on view of the given frame's xy
    /// plane, or of the inertial frame when `None`.
    pub fn set_plot_as_2d(&mut self, frame: Option<&ReferenceFrame>) -> Result<(), SceneError> {
        let inertial = self.context.inertial_frame.clone();
        let frame = frame.unwrap_or(&inertial);
        let (elevation, azimuth, roll) = self.get_euler_angles(frame, &inertial)?;
        let camera = &mut self.axes.camera;
        camera.kind = ProjectionKind::Orthographic;
        camera.elevation = elevation;
        camera.azimuth = azimuth;
        camera.roll = roll;
        Ok(())
    }

    /// Elevation, azimuth and roll in degrees relating `normal_frame` to
    /// `projection_frame`, at the most recently evaluated arguments.
    pub fn get_euler_angles(
        &self,
        normal_frame: &ReferenceFrame,
        projection_frame: &ReferenceFrame,
    ) -> Result<(f64, f64, f64), SceneError> {
        let dcm = projection_frame.dcm(normal_frame)?;
        let r = dcm.eval(&self.bindings())?;
        Ok(euler_angles(&r))
    }

    fn bindings(&self) -> Bindings {
        self.args
            .iter()
            .cloned()
            .zip(self.last_args.iter().copied())
            .collect()
    }

    /// Start an animation over `frames`, mapping each frame value to
    /// evaluator arguments through `get_args`. The scene must already be
    /// lambdified. The iterator may be unbounded.
    pub fn animate<F, I>(
        &self,
        get_args: F,
        frames: I,
        interval_ms: u64,
    ) -> Result<Animation, SceneError>
    where
        F: Fn(f64) -> Vec<f64> + 'static,
        I: IntoIterator<Item = f64>,
        I::IntoIter: 'static,
    {
        if self.evaluator.is_none() {
            return Err(SceneError::NotLambdified);
        }
        Ok(Animation {
            get_args: Box::new(get_args),
            frames: Box::new(frames.into_iter()),
            interval_ms,
        })
    }

    /// React to a pointer move: show the annotation for the first node
    /// hit in tree traversal order, hide it when nothing is hit.
    /// Returns whether the annotation changed and a redraw is needed.
    pub fn handle_pointer_move(&mut self, cursor: DVec2, projection: &Projection) -> bool {
        let hit = self
            .children
            .iter()
            .find_map(|child| child.find_hovered(cursor, projection))
            .map(|object| (object.name().to_string(), object.annot_coords()));
        let next = match hit {
            Some((text, coords)) => Annotation {
                visible: true,
                screen_pos: match self.annot_location {
                    AnnotLocation::Object => projection.project(coords).screen,
                    AnnotLocation::Mouse => cursor,
                },
                text,
            },
            None => Annotation {
                visible: false,
                ..self.annotation.clone()
            },
        };
        if next != self.annotation {
            self.annotation = next;
            true
        } else {
            false
        }
    }

    /// All visible artists projected to the screen, sorted back to
    /// front for painter's-algorithm drawing.
    pub fn projected_artists(&self, projection: &Projection) -> Vec<ProjectedArtist> {
        let mut projected: Vec<ProjectedArtist> = self
            .children
            .iter()
            .flat_map(PlotObject::artists)
            .filter_map(|artist| artist.project(projection))
            .collect();
        projected.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(Ordering::Equal));
        projected
    }
}
