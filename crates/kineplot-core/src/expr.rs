//! Symbolic Scalar Expressions
//!
//! A small closed expression language: constants, named symbols and the
//! arithmetic needed to express rotations and positions. Expressions are
//! immutable and cheap to clone; shared subtrees are reference counted.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use crate::error::EvalError;

/// A named scalar symbol. Equality and hashing go by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Create a symbol with the given display name
    pub fn new(name: &str) -> Self {
        Symbol(Arc::from(name))
    }

    /// The display name of this symbol
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symbol values used by direct evaluation.
pub type Bindings = HashMap<Symbol, f64>;

/// One node of the expression AST.
#[derive(Debug)]
pub enum ExprNode {
    /// Numeric constant
    Const(f64),
    /// Free symbol
    Sym(Symbol),
    Add(Expr, Expr),
    Sub(Expr, Expr),
    Mul(Expr, Expr),
    Div(Expr, Expr),
    Neg(Expr),
    Sin(Expr),
    Cos(Expr),
    Sqrt(Expr),
    /// Integer power of the base expression
    Pow(Expr, i32),
}

/// A symbolic scalar expression, clonable in O(1).
#[derive(Debug, Clone)]
pub struct Expr {
    node: Arc<ExprNode>,
}

impl Expr {
    fn from_node(node: ExprNode) -> Self {
        Expr {
            node: Arc::new(node),
        }
    }

    /// The AST node behind this expression
    pub fn node(&self) -> &ExprNode {
        &self.node
    }

    /// A constant expression
    pub fn constant(value: f64) -> Self {
        Expr::from_node(ExprNode::Const(value))
    }

    /// A fresh symbol expression with the given name
    pub fn symbol(name: &str) -> Self {
        Expr::from_node(ExprNode::Sym(Symbol::new(name)))
    }

    /// The constant value, if this expression is a plain constant
    pub fn as_const(&self) -> Option<f64> {
        match &*self.node {
            ExprNode::Const(v) => Some(*v),
            _ => None,
        }
    }

    /// Sine of this expression
    pub fn sin(&self) -> Expr {
        if let Some(v) = self.as_const() {
            return Expr::constant(v.sin());
        }
        Expr::from_node(ExprNode::Sin(self.clone()))
    }

    /// Cosine of this expression
    pub fn cos(&self) -> Expr {
        if let Some(v) = self.as_const() {
            return Expr::constant(v.cos());
        }
        Expr::from_node(ExprNode::Cos(self.clone()))
    }

    /// Square root of this expression
    pub fn sqrt(&self) -> Expr {
        if let Some(v) = self.as_const() {
            return Expr::constant(v.sqrt());
        }
        Expr::from_node(ExprNode::Sqrt(self.clone()))
    }

    /// Integer power of this expression
    pub fn powi(&self, exp: i32) -> Expr {
        match exp {
            0 => Expr::constant(1.0),
            1 => self.clone(),
            _ => {
                if let Some(v) = self.as_const() {
                    return Expr::constant(v.powi(exp));
                }
                Expr::from_node(ExprNode::Pow(self.clone(), exp))
            }
        }
    }

    /// Evaluate with the given symbol bindings. A missing symbol is an
    /// error, never a default value.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        match &*self.node {
            ExprNode::Const(v) => Ok(*v),
            ExprNode::Sym(s) => bindings
                .get(s)
                .copied()
                .ok_or_else(|| EvalError::UnboundSymbol(s.name().to_string())),
            ExprNode::Add(a, b) => Ok(a.eval(bindings)? + b.eval(bindings)?),
            ExprNode::Sub(a, b) => Ok(a.eval(bindings)? - b.eval(bindings)?),
            ExprNode::Mul(a, b) => Ok(a.eval(bindings)? * b.eval(bindings)?),
            ExprNode::Div(a, b) => Ok(a.eval(bindings)? / b.eval(bindings)?),
            ExprNode::Neg(a) => Ok(-a.eval(bindings)?),
            ExprNode::Sin(a) => Ok(a.eval(bindings)?.sin()),
            ExprNode::Cos(a) => Ok(a.eval(bindings)?.cos()),
            ExprNode::Sqrt(a) => Ok(a.eval(bindings)?.sqrt()),
            ExprNode::Pow(a, n) => Ok(a.eval(bindings)?.powi(*n)),
        }
    }

    /// The free symbols of this expression, in name order.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match &*self.node {
            ExprNode::Const(_) => {}
            ExprNode::Sym(s) => {
                out.insert(s.clone());
            }
            ExprNode::Add(a, b)
            | ExprNode::Sub(a, b)
            | ExprNode::Mul(a, b)
            | ExprNode::Div(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            ExprNode::Neg(a)
            | ExprNode::Sin(a)
            | ExprNode::Cos(a)
            | ExprNode::Sqrt(a)
            | ExprNode::Pow(a, _) => a.collect_symbols(out),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::from_node(ExprNode::Sym(symbol))
    }
}

// Binary constructors fold constants and drop additive/multiplicative
// identities so DCM chain products stay small.

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        match (self.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Expr::constant(a + b),
            (Some(a), None) if a == 0.0 => rhs,
            (None, Some(b)) if b == 0.0 => self,
            _ => Expr::from_node(ExprNode::Add(self, rhs)),
        }
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        match (self.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Expr::constant(a - b),
            (None, Some(b)) if b == 0.0 => self,
            _ => Expr::from_node(ExprNode::Sub(self, rhs)),
        }
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        match (self.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Expr::constant(a * b),
            (Some(a), None) if a == 0.0 => Expr::constant(0.0),
            (None, Some(b)) if b == 0.0 => Expr::constant(0.0),
            (Some(a), None) if a == 1.0 => rhs,
            (None, Some(b)) if b == 1.0 => self,
            _ => Expr::from_node(ExprNode::Mul(self, rhs)),
        }
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        match (self.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Expr::constant(a / b),
            (None, Some(b)) if b == 1.0 => self,
            _ => Expr::from_node(ExprNode::Div(self, rhs)),
        }
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        if let Some(v) = self.as_const() {
            return Expr::constant(-v);
        }
        Expr::from_node(ExprNode::Neg(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            ExprNode::Const(v) => write!(f, "{v}"),
            ExprNode::Sym(s) => write!(f, "{s}"),
            ExprNode::Add(a, b) => write!(f, "({a} + {b})"),
            ExprNode::Sub(a, b) => write!(f, "({a} - {b})"),
            ExprNode::Mul(a, b) => write!(f, "({a}*{b})"),
            ExprNode::Div(a, b) => write!(f, "({a}/{b})"),
            ExprNode::Neg(a) => write!(f, "(-{a})"),
            ExprNode::Sin(a) => write!(f, "sin({a})"),
            ExprNode::Cos(a) => write!(f, "cos({a})"),
            ExprNode::Sqrt(a) => write!(f, "sqrt({a})"),
            ExprNode::Pow(a, n) => write!(f, "({a}^{n})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bind(pairs: &[(&str, f64)]) -> Bindings {
        pairs
            .iter()
            .map(|(n, v)| (Symbol::new(n), *v))
            .collect()
    }

    #[test]
    fn test_eval_arithmetic() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let e = (x + Expr::constant(2.0)) * y.sin();

        let v = e.eval(&bind(&[("x", 1.0), ("y", 0.5)])).unwrap();
        assert_relative_eq!(v, 3.0 * 0.5_f64.sin());
    }

    #[test]
    fn test_eval_unbound_symbol() {
        let e = Expr::symbol("q1") + Expr::constant(1.0);
        let err = e.eval(&Bindings::new()).unwrap_err();
        assert_eq!(err, EvalError::UnboundSymbol("q1".into()));
    }

    #[test]
    fn test_constant_folding() {
        let x = Expr::symbol("x");
        assert_eq!((Expr::constant(2.0) * Expr::constant(3.0)).as_const(), Some(6.0));
        assert!((x.clone() + Expr::constant(0.0)).as_const().is_none());
        assert_eq!((x.clone() * Expr::constant(0.0)).as_const(), Some(0.0));
        assert_eq!(x.powi(0).as_const(), Some(1.0));
    }

    #[test]
    fn test_free_symbols() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let e = (x * y.cos()) - Expr::symbol("x").sqrt();

        let names: Vec<_> = e.symbols().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_display() {
        let e = Expr::symbol("q").sin() * Expr::constant(2.0);
        assert_eq!(e.to_string(), "(sin(q)*2)");
    }
}
