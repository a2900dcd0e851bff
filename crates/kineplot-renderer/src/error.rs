//! Scene Error Types

use thiserror::Error;

use kineplot_core::{CompileError, EvalError, FrameError, PointError, TreeShape};

/// Errors raised by the scene driver and the plot-node tree.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Evaluation was requested before the system was compiled
    #[error("the system has not been lambdified")]
    NotLambdified,

    /// A value tree did not mirror the expression tree node for node
    #[error("value tree shape {got} does not match expression tree shape {expected}")]
    ShapeMismatch { expected: TreeShape, got: TreeShape },

    /// A line node needs at least two points
    #[error("a line needs at least two points, got {got}")]
    TooFewLinePoints { got: usize },

    /// An object was built against a different zero point
    #[error("object belongs to a context with a different zero point")]
    DuplicateZeroPoint,

    /// An object was built against a different inertial frame
    #[error("object belongs to a context with a different inertial frame")]
    DuplicateInertialFrame,

    /// Name lookup failed
    #[error("no plot object named `{0}`")]
    UnknownObject(String),

    /// Annotation location strings are `object` or `mouse`
    #[error("unknown annotation location `{0}`, expected `object` or `mouse`")]
    InvalidAnnotLocation(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Point(#[from] PointError),
}
