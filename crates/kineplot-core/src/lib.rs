//! Kineplot Symbolic Algebra Core
//!
//! This crate contains the symbolic layer the scene graph is built on:
//! - Expr: scalar expressions over named symbols
//! - ReferenceFrame: frames related by direction-cosine matrices
//! - Point / Vector: positions and frame-aware vectors
//! - ExprTree / ValueTree: nested expression and value containers
//! - lambdify: compilation into fast numeric evaluators

pub mod compile;
pub mod error;
pub mod expr;
pub mod frame;
pub mod point;
pub mod tree;
pub mod vector;

pub use compile::*;
pub use error::*;
pub use expr::*;
pub use frame::*;
pub use point::*;
pub use tree::*;
pub use vector::*;
