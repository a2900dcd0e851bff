//! Points
//!
//! Points located relative to one another by frame-aware vectors. Like
//! frames they form a forest; relative position between two points goes
//! through their nearest common ancestor.

use std::sync::Arc;

use crate::error::PointError;
use crate::vector::Vector;

#[derive(Debug)]
struct PointInner {
    name: String,
    /// Parent point with the offset from it to this point
    parent: Option<(Point, Vector)>,
}

/// A point handle. Clones share identity; equality is by handle.
#[derive(Debug, Clone)]
pub struct Point {
    inner: Arc<PointInner>,
}

impl Point {
    /// Create a root point
    pub fn new(name: &str) -> Self {
        Point {
            inner: Arc::new(PointInner {
                name: name.to_string(),
                parent: None,
            }),
        }
    }

    /// The point's display name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The parent point, if any
    pub fn parent(&self) -> Option<&Point> {
        self.inner.parent.as_ref().map(|(p, _)| p)
    }

    /// Create a new point offset from `self` by `offset`.
    pub fn locatenew(&self, name: &str, offset: Vector) -> Point {
        Point {
            inner: Arc::new(PointInner {
                name: name.to_string(),
                parent: Some((self.clone(), offset)),
            }),
        }
    }

    /// The position vector from `other` to `self`, through the nearest
    /// common ancestor.
    pub fn pos_from(&self, other: &Point) -> Result<Vector, PointError> {
        let root = self.common_root(other).ok_or_else(|| PointError::Disconnected {
            a: self.name().to_string(),
            b: other.name().to_string(),
        })?;
        Ok(self.offset_from_ancestor(&root) - other.offset_from_ancestor(&root))
    }

    fn ancestry(&self) -> Vec<Point> {
        let mut chain = vec![self.clone()];
        let mut cur = self.clone();
        while let Some(parent) = cur.parent().cloned() {
            chain.push(parent.clone());
            cur = parent;
        }
        chain
    }

    fn common_root(&self, other: &Point) -> Option<Point> {
        let mine = self.ancestry();
        for candidate in other.ancestry() {
            if mine.iter().any(|p| *p == candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn offset_from_ancestor(&self, ancestor: &Point) -> Vector {
        let mut acc = Vector::zero();
        let mut cur = self.clone();
        while cur != *ancestor {
            let Some((parent, offset)) = cur
                .inner
                .parent
                .as_ref()
                .map(|(p, v)| (p.clone(), v.clone()))
            else {
                break;
            };
            acc = acc + offset;
            cur = parent;
        }
        acc
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Point {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Bindings, Expr, Symbol};
    use crate::frame::ReferenceFrame;
    use approx::assert_relative_eq;

    #[test]
    fn test_pos_from_sums_the_chain() {
        let n = ReferenceFrame::new("N");
        let o = Point::new("O");
        let p1 = o.locatenew("P1", n.x() * 2.0);
        let p2 = p1.locatenew("P2", n.y() * 3.0);

        let r = p2.pos_from(&o).unwrap().to_matrix(&n).unwrap();
        let got: Vec<f64> = r.iter().map(|e| e.eval(&Bindings::new()).unwrap()).collect();
        assert_relative_eq!(got[0], 2.0);
        assert_relative_eq!(got[1], 3.0);
        assert_relative_eq!(got[2], 0.0);
    }

    #[test]
    fn test_pos_from_between_branches() {
        let n = ReferenceFrame::new("N");
        let o = Point::new("O");
        let a = o.locatenew("A", n.x() * 1.0);
        let b = o.locatenew("B", n.y() * 1.0);

        let r = a.pos_from(&b).unwrap().to_matrix(&n).unwrap();
        let got: Vec<f64> = r.iter().map(|e| e.eval(&Bindings::new()).unwrap()).collect();
        assert_relative_eq!(got[0], 1.0);
        assert_relative_eq!(got[1], -1.0);
    }

    #[test]
    fn test_symbolic_offset_survives() {
        let n = ReferenceFrame::new("N");
        let b = n.orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q"));
        let o = Point::new("O");
        let tip = o.locatenew("tip", b.x() * Expr::symbol("l"));

        let bindings: Bindings = [(Symbol::new("q"), 0.5), (Symbol::new("l"), 2.0)]
            .into_iter()
            .collect();
        let r = tip.pos_from(&o).unwrap().to_matrix(&n).unwrap();
        assert_relative_eq!(r[0].eval(&bindings).unwrap(), 2.0 * 0.5_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(r[1].eval(&bindings).unwrap(), 2.0 * 0.5_f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_disconnected_points_error() {
        let a = Point::new("A");
        let b = Point::new("B");
        let err = a.pos_from(&b).unwrap_err();
        assert_eq!(
            err,
            PointError::Disconnected {
                a: "A".into(),
                b: "B".into()
            }
        );
    }
}
