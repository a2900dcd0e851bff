//! Reference Frames
//!
//! Right-handed orthonormal frames related by symbolic direction-cosine
//! matrices. `A.dcm(B)` maps components expressed in `B` to components in
//! `A`, so `v_A = A.dcm(B) * v_B`. Frames form a forest; orientation
//! between two frames goes through their nearest common ancestor.

use std::sync::Arc;

use crate::error::{EvalError, FrameError};
use crate::expr::{Bindings, Expr};

/// A 3x3 matrix of symbolic expressions.
#[derive(Debug, Clone)]
pub struct Dcm {
    /// Row-major entries
    pub rows: [[Expr; 3]; 3],
}

impl Dcm {
    /// The identity matrix
    pub fn identity() -> Self {
        let zero = || Expr::constant(0.0);
        let one = || Expr::constant(1.0);
        Dcm {
            rows: [
                [one(), zero(), zero()],
                [zero(), one(), zero()],
                [zero(), zero(), one()],
            ],
        }
    }

    /// Rotation about a fixed unit axis by a symbolic angle (Rodrigues).
    /// The axis is normalized; it must not be the zero vector.
    pub fn rodrigues(axis: [f64; 3], angle: &Expr) -> Self {
        let norm = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        let n = [axis[0] / norm, axis[1] / norm, axis[2] / norm];
        let skew = [
            [0.0, -n[2], n[1]],
            [n[2], 0.0, -n[0]],
            [-n[1], n[0], 0.0],
        ];

        let c = angle.cos();
        let s = angle.sin();
        let v = Expr::constant(1.0) - c.clone();

        let mut rows = Dcm::identity().rows;
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                let mut e = Expr::constant(n[i] * n[j]) * v.clone();
                if i == j {
                    e = e + c.clone();
                }
                *entry = e + Expr::constant(skew[i][j]) * s.clone();
            }
        }
        Dcm { rows }
    }

    /// Matrix transpose
    pub fn transpose(&self) -> Dcm {
        let mut rows = Dcm::identity().rows;
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.rows[j][i].clone();
            }
        }
        Dcm { rows }
    }

    /// Matrix product `self * other`
    pub fn mul(&self, other: &Dcm) -> Dcm {
        let mut rows = Dcm::identity().rows;
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                let mut sum = Expr::constant(0.0);
                for k in 0..3 {
                    sum = sum + self.rows[i][k].clone() * other.rows[k][j].clone();
                }
                *entry = sum;
            }
        }
        Dcm { rows }
    }

    /// Matrix-vector product
    pub fn mul_vec(&self, v: &[Expr; 3]) -> [Expr; 3] {
        let mut out = [Expr::constant(0.0), Expr::constant(0.0), Expr::constant(0.0)];
        for (i, entry) in out.iter_mut().enumerate() {
            let mut sum = Expr::constant(0.0);
            for k in 0..3 {
                sum = sum + self.rows[i][k].clone() * v[k].clone();
            }
            *entry = sum;
        }
        out
    }

    /// Numeric value of every entry under the given bindings.
    pub fn eval(&self, bindings: &Bindings) -> Result<[[f64; 3]; 3], EvalError> {
        let mut out = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i][j] = self.rows[i][j].eval(bindings)?;
            }
        }
        Ok(out)
    }
}

#[derive(Debug)]
struct FrameInner {
    name: String,
    /// Parent frame with the DCM mapping this frame's components into it
    parent: Option<(ReferenceFrame, Dcm)>,
}

/// A reference frame handle. Clones share identity; equality is by handle,
/// not by name.
#[derive(Debug, Clone)]
pub struct ReferenceFrame {
    inner: Arc<FrameInner>,
}

impl ReferenceFrame {
    /// Create a root frame
    pub fn new(name: &str) -> Self {
        ReferenceFrame {
            inner: Arc::new(FrameInner {
                name: name.to_string(),
                parent: None,
            }),
        }
    }

    /// The frame's display name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The parent frame, if any
    pub fn parent(&self) -> Option<&ReferenceFrame> {
        self.inner.parent.as_ref().map(|(p, _)| p)
    }

    /// Create a child frame rotated about `axis` (fixed in `self`) by the
    /// symbolic `angle`.
    pub fn orient_axis(&self, name: &str, axis: [f64; 3], angle: Expr) -> ReferenceFrame {
        let to_parent = Dcm::rodrigues(axis, &angle);
        ReferenceFrame {
            inner: Arc::new(FrameInner {
                name: name.to_string(),
                parent: Some((self.clone(), to_parent)),
            }),
        }
    }

    /// The direction-cosine matrix mapping components in `other` to
    /// components in `self`, through the nearest common ancestor.
    pub fn dcm(&self, other: &ReferenceFrame) -> Result<Dcm, FrameError> {
        let root = self.common_root(other).ok_or_else(|| FrameError::Disconnected {
            a: self.name().to_string(),
            b: other.name().to_string(),
        })?;
        let root_to_self = Self::dcm_from_ancestor(&root, self);
        let root_to_other = Self::dcm_from_ancestor(&root, other);
        Ok(root_to_self.transpose().mul(&root_to_other))
    }

    fn ancestry(&self) -> Vec<ReferenceFrame> {
        let mut chain = vec![self.clone()];
        let mut cur = self.clone();
        while let Some(parent) = cur.parent().cloned() {
            chain.push(parent.clone());
            cur = parent;
        }
        chain
    }

    fn common_root(&self, other: &ReferenceFrame) -> Option<ReferenceFrame> {
        let mine = self.ancestry();
        for candidate in other.ancestry() {
            if mine.iter().any(|f| *f == candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// `ancestor.dcm(frame)` where `ancestor` is on `frame`'s parent chain.
    fn dcm_from_ancestor(ancestor: &ReferenceFrame, frame: &ReferenceFrame) -> Dcm {
        let mut acc = Dcm::identity();
        let mut cur = frame.clone();
        while cur != *ancestor {
            let Some((parent, to_parent)) = cur
                .inner
                .parent
                .as_ref()
                .map(|(p, d)| (p.clone(), d.clone()))
            else {
                break;
            };
            acc = to_parent.mul(&acc);
            cur = parent;
        }
        acc
    }
}

impl PartialEq for ReferenceFrame {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ReferenceFrame {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Symbol;
    use approx::assert_relative_eq;

    fn bind(q: f64) -> Bindings {
        [(Symbol::new("q"), q)].into_iter().collect()
    }

    #[test]
    fn test_z_rotation_dcm_is_analytic() {
        let a = ReferenceFrame::new("A");
        let b = a.orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));

        let q = 0.6;
        let m = a.dcm(&b).unwrap().eval(&bind(q)).unwrap();
        let (s, c) = q.sin_cos();
        let expected = [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(m[i][j], expected[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_dcm_chains_through_common_root() {
        let a = ReferenceFrame::new("A");
        let b = a.orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));
        let c = b.orient_axis("C", [1.0, 0.0, 0.0], Expr::symbol("q"));

        let bindings = bind(0.4);
        let ac = a.dcm(&c).unwrap().eval(&bindings).unwrap();
        let ab = a.dcm(&b).unwrap().eval(&bindings).unwrap();
        let bc = b.dcm(&c).unwrap().eval(&bindings).unwrap();

        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += ab[i][k] * bc[k][j];
                }
                assert_relative_eq!(ac[i][j], sum, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_dcm_between_siblings() {
        let root = ReferenceFrame::new("N");
        let a = root.orient_axis("A", [0.0, 0.0, 1.0], Expr::constant(0.3));
        let b = root.orient_axis("B", [0.0, 0.0, 1.0], Expr::constant(0.8));

        // Both rotations share the z axis, so A.dcm(B) is a z rotation by 0.5.
        let m = a.dcm(&b).unwrap().eval(&Bindings::new()).unwrap();
        let (s, c) = 0.5_f64.sin_cos();
        assert_relative_eq!(m[0][0], c, epsilon = 1e-12);
        assert_relative_eq!(m[0][1], -s, epsilon = 1e-12);
        assert_relative_eq!(m[1][0], s, epsilon = 1e-12);
    }

    #[test]
    fn test_dcm_with_self_is_identity() {
        let a = ReferenceFrame::new("A");
        let m = a.dcm(&a).unwrap().eval(&Bindings::new()).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(m[i][j], if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_disconnected_frames_error() {
        let a = ReferenceFrame::new("A");
        let b = ReferenceFrame::new("B");
        let err = a.dcm(&b).unwrap_err();
        assert_eq!(
            err,
            FrameError::Disconnected {
                a: "A".into(),
                b: "B".into()
            }
        );
    }

    #[test]
    fn test_identity_is_by_handle() {
        let a1 = ReferenceFrame::new("A");
        let a2 = ReferenceFrame::new("A");
        assert_ne!(a1, a2);
        assert_eq!(a1, a1.clone());
    }
}
