//! Frame-Aware Vectors
//!
//! A vector is a sum of per-frame component triples. Components only mix
//! once a target frame is chosen; expressing in a frame routes every term
//! through the DCM graph.

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::FrameError;
use crate::expr::Expr;
use crate::frame::ReferenceFrame;

/// A vector as a sum of components fixed in reference frames.
#[derive(Debug, Clone, Default)]
pub struct Vector {
    terms: Vec<(ReferenceFrame, [Expr; 3])>,
}

impl Vector {
    /// The zero vector
    pub fn zero() -> Self {
        Vector { terms: Vec::new() }
    }

    /// A vector with the given components fixed in `frame`
    pub fn new(frame: &ReferenceFrame, components: [Expr; 3]) -> Self {
        let mut v = Vector::zero();
        v.push_term(frame.clone(), components);
        v
    }

    /// The per-frame terms of this vector
    pub fn terms(&self) -> &[(ReferenceFrame, [Expr; 3])] {
        &self.terms
    }

    /// True if the vector has no terms at all
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    fn push_term(&mut self, frame: ReferenceFrame, components: [Expr; 3]) {
        for (f, existing) in &mut self.terms {
            if *f == frame {
                for (e, c) in existing.iter_mut().zip(components) {
                    *e = e.clone() + c;
                }
                return;
            }
        }
        self.terms.push((frame, components));
    }

    /// The components of this vector expressed in `frame`.
    pub fn to_matrix(&self, frame: &ReferenceFrame) -> Result<[Expr; 3], FrameError> {
        let mut out = [Expr::constant(0.0), Expr::constant(0.0), Expr::constant(0.0)];
        for (term_frame, components) in &self.terms {
            let dcm = frame.dcm(term_frame)?;
            let mapped = dcm.mul_vec(components);
            for (o, m) in out.iter_mut().zip(mapped) {
                *o = o.clone() + m;
            }
        }
        Ok(out)
    }

    /// This vector rewritten as a single term in `frame`.
    pub fn express_in(&self, frame: &ReferenceFrame) -> Result<Vector, FrameError> {
        Ok(Vector::new(frame, self.to_matrix(frame)?))
    }

    /// Scalar product of two vectors.
    pub fn dot(&self, other: &Vector) -> Result<Expr, FrameError> {
        let Some((frame, _)) = self.terms.first().or_else(|| other.terms.first()) else {
            return Ok(Expr::constant(0.0));
        };
        let frame = frame.clone();
        let a = self.to_matrix(&frame)?;
        let b = other.to_matrix(&frame)?;
        let mut sum = Expr::constant(0.0);
        for (x, y) in a.into_iter().zip(b) {
            sum = sum + x * y;
        }
        Ok(sum)
    }

    /// Cross product of two vectors.
    pub fn cross(&self, other: &Vector) -> Result<Vector, FrameError> {
        let Some((frame, _)) = self.terms.first().or_else(|| other.terms.first()) else {
            return Ok(Vector::zero());
        };
        let frame = frame.clone();
        let a = self.to_matrix(&frame)?;
        let b = other.to_matrix(&frame)?;
        Ok(Vector::new(
            &frame,
            [
                a[1].clone() * b[2].clone() - a[2].clone() * b[1].clone(),
                a[2].clone() * b[0].clone() - a[0].clone() * b[2].clone(),
                a[0].clone() * b[1].clone() - a[1].clone() * b[0].clone(),
            ],
        ))
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        let mut out = self;
        for (frame, components) in rhs.terms {
            out.push_term(frame, components);
        }
        out
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        self + (-rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        let mut out = Vector::zero();
        for (frame, [x, y, z]) in self.terms {
            out.push_term(frame, [-x, -y, -z]);
        }
        out
    }
}

impl Mul<Expr> for Vector {
    type Output = Vector;

    fn mul(self, rhs: Expr) -> Vector {
        let mut out = Vector::zero();
        for (frame, [x, y, z]) in self.terms {
            out.push_term(frame, [x * rhs.clone(), y * rhs.clone(), z * rhs.clone()]);
        }
        out
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self * Expr::constant(rhs)
    }
}

impl ReferenceFrame {
    /// Unit vector along this frame's x axis
    pub fn x(&self) -> Vector {
        self.unit_vector(0)
    }

    /// Unit vector along this frame's y axis
    pub fn y(&self) -> Vector {
        self.unit_vector(1)
    }

    /// Unit vector along this frame's z axis
    pub fn z(&self) -> Vector {
        self.unit_vector(2)
    }

    fn unit_vector(&self, index: usize) -> Vector {
        let mut components = [Expr::constant(0.0), Expr::constant(0.0), Expr::constant(0.0)];
        components[index] = Expr::constant(1.0);
        Vector::new(self, components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Bindings, Symbol};
    use approx::assert_relative_eq;

    fn eval3(v: &[Expr; 3], bindings: &Bindings) -> [f64; 3] {
        [
            v[0].eval(bindings).unwrap(),
            v[1].eval(bindings).unwrap(),
            v[2].eval(bindings).unwrap(),
        ]
    }

    #[test]
    fn test_rotated_unit_vector_components() {
        let n = ReferenceFrame::new("N");
        let b = n.orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));

        let q = 0.9;
        let bindings: Bindings = [(Symbol::new("q"), q)].into_iter().collect();
        let bx = b.x().to_matrix(&n).unwrap();
        let got = eval3(&bx, &bindings);
        assert_relative_eq!(got[0], q.cos(), epsilon = 1e-12);
        assert_relative_eq!(got[1], q.sin(), epsilon = 1e-12);
        assert_relative_eq!(got[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_frame_sum() {
        let n = ReferenceFrame::new("N");
        let b = n.orient_axis("B", [0.0, 0.0, 1.0], Expr::constant(std::f64::consts::FRAC_PI_2));

        // N.x + B.x with B rotated 90 degrees about z: B.x lands on N.y.
        let v = n.x() + b.x();
        let got = eval3(&v.to_matrix(&n).unwrap(), &Bindings::new());
        assert_relative_eq!(got[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(got[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(got[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dot_and_cross() {
        let n = ReferenceFrame::new("N");
        let dot = n.x().dot(&n.x()).unwrap().eval(&Bindings::new()).unwrap();
        assert_relative_eq!(dot, 1.0);

        let cross = n.x().cross(&n.y()).unwrap();
        let got = eval3(&cross.to_matrix(&n).unwrap(), &Bindings::new());
        assert_relative_eq!(got[2], 1.0);
        assert_relative_eq!(got[0], 0.0);
    }

    #[test]
    fn test_scaling_and_negation() {
        let n = ReferenceFrame::new("N");
        let v = (n.x() * 3.0) - n.y();
        let got = eval3(&v.to_matrix(&n).unwrap(), &Bindings::new());
        assert_relative_eq!(got[0], 3.0);
        assert_relative_eq!(got[1], -1.0);
    }

    #[test]
    fn test_zero_vector_dot() {
        let n = ReferenceFrame::new("N");
        let dot = Vector::zero().dot(&n.x()).unwrap().eval(&Bindings::new()).unwrap();
        assert_relative_eq!(dot, 0.0);
    }
}
