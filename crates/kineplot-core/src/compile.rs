//! Expression Compilation
//!
//! Lowers an expression tree into flat stack-machine programs once, so the
//! per-frame evaluation path is a tight interpreter loop with no tree
//! walking and no name lookups.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CompileError, EvalError};
use crate::expr::{Expr, ExprNode, Symbol};
use crate::tree::{ExprTree, TreeShape, ValueTree};

/// One stack-machine instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr {
    /// Push a constant
    LoadConst(f64),
    /// Push the call argument at the given index
    LoadArg(usize),
    /// Pop two, push their sum
    Add,
    /// Pop two, push their difference
    Sub,
    /// Pop two, push their product
    Mul,
    /// Pop two, push their quotient
    Div,
    /// Negate the top of the stack
    Neg,
    /// Sine of the top of the stack
    Sin,
    /// Cosine of the top of the stack
    Cos,
    /// Square root of the top of the stack
    Sqrt,
    /// Integer power of the top of the stack
    Powi(i32),
}

/// A compiled scalar expression: a postorder instruction list.
#[derive(Debug, Clone)]
struct Program {
    code: Vec<Instr>,
}

impl Program {
    fn run(&self, args: &[f64], stack: &mut Vec<f64>) -> Result<f64, EvalError> {
        stack.clear();
        for instr in &self.code {
            match *instr {
                Instr::LoadConst(v) => stack.push(v),
                Instr::LoadArg(i) => stack.push(args[i]),
                Instr::Add => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a + b);
                }
                Instr::Sub => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a - b);
                }
                Instr::Mul => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a * b);
                }
                Instr::Div => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a / b);
                }
                Instr::Neg => {
                    let a = pop1(stack)?;
                    stack.push(-a);
                }
                Instr::Sin => {
                    let a = pop1(stack)?;
                    stack.push(a.sin());
                }
                Instr::Cos => {
                    let a = pop1(stack)?;
                    stack.push(a.cos());
                }
                Instr::Sqrt => {
                    let a = pop1(stack)?;
                    stack.push(a.sqrt());
                }
                Instr::Powi(n) => {
                    let a = pop1(stack)?;
                    stack.push(a.powi(n));
                }
            }
        }
        pop1(stack)
    }
}

fn pop1(stack: &mut Vec<f64>) -> Result<f64, EvalError> {
    stack.pop().ok_or(EvalError::StackUnderflow)
}

fn pop2(stack: &mut Vec<f64>) -> Result<(f64, f64), EvalError> {
    let b = pop1(stack)?;
    let a = pop1(stack)?;
    Ok((a, b))
}

/// Compiled programs in the same nesting as the source tree.
#[derive(Debug, Clone)]
struct CompiledNode {
    programs: Vec<Program>,
    children: Vec<CompiledNode>,
}

impl CompiledNode {
    fn run(&self, args: &[f64], stack: &mut Vec<f64>) -> Result<ValueTree, EvalError> {
        let mut values = Vec::with_capacity(self.programs.len());
        for program in &self.programs {
            values.push(program.run(args, stack)?);
        }
        let mut children = Vec::with_capacity(self.children.len());
        for child in &self.children {
            children.push(child.run(args, stack)?);
        }
        Ok(ValueTree::new(values, children))
    }
}

/// A compiled evaluator for a whole expression tree.
///
/// Every symbol is resolved to an argument index at build time, so calls
/// cannot fail on a missing name, only on a wrong argument count.
#[derive(Debug, Clone)]
pub struct CompiledEvaluator {
    arity: usize,
    shape: TreeShape,
    root: CompiledNode,
}

impl CompiledEvaluator {
    /// Number of arguments every call must supply
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The shape the produced value trees will have
    pub fn shape(&self) -> &TreeShape {
        &self.shape
    }

    /// Evaluate the whole tree with the given argument values.
    pub fn call(&self, args: &[f64]) -> Result<ValueTree, EvalError> {
        if args.len() != self.arity {
            return Err(EvalError::ArityMismatch {
                expected: self.arity,
                got: args.len(),
            });
        }
        let mut stack = Vec::with_capacity(16);
        self.root.run(args, &mut stack)
    }
}

/// Compile every expression of `tree` against the argument list `args`.
///
/// An expression referencing a symbol not in `args` fails here, at build
/// time. Zero arguments are valid for trees of pure constants.
pub fn lambdify(args: &[Symbol], tree: &ExprTree) -> Result<CompiledEvaluator, CompileError> {
    let mut index = HashMap::with_capacity(args.len());
    for (i, symbol) in args.iter().enumerate() {
        index.insert(symbol.clone(), i);
    }
    let root = compile_node(tree, &index)?;
    debug!(
        args = args.len(),
        exprs = tree.total_len(),
        "compiled expression tree"
    );
    Ok(CompiledEvaluator {
        arity: args.len(),
        shape: tree.shape(),
        root,
    })
}

fn compile_node(
    tree: &ExprTree,
    index: &HashMap<Symbol, usize>,
) -> Result<CompiledNode, CompileError> {
    let mut programs = Vec::with_capacity(tree.exprs.len());
    for expr in &tree.exprs {
        let mut code = Vec::new();
        compile_expr(expr, index, &mut code)?;
        programs.push(Program { code });
    }
    let mut children = Vec::with_capacity(tree.children.len());
    for child in &tree.children {
        children.push(compile_node(child, index)?);
    }
    Ok(CompiledNode { programs, children })
}

fn compile_expr(
    expr: &Expr,
    index: &HashMap<Symbol, usize>,
    code: &mut Vec<Instr>,
) -> Result<(), CompileError> {
    match expr.node() {
        ExprNode::Const(v) => code.push(Instr::LoadConst(*v)),
        ExprNode::Sym(s) => {
            let i = index
                .get(s)
                .ok_or_else(|| CompileError::UnboundSymbol(s.name().to_string()))?;
            code.push(Instr::LoadArg(*i));
        }
        ExprNode::Add(a, b) => {
            compile_expr(a, index, code)?;
            compile_expr(b, index, code)?;
            code.push(Instr::Add);
        }
        ExprNode::Sub(a, b) => {
            compile_expr(a, index, code)?;
            compile_expr(b, index, code)?;
            code.push(Instr::Sub);
        }
        ExprNode::Mul(a, b) => {
            compile_expr(a, index, code)?;
            compile_expr(b, index, code)?;
            code.push(Instr::Mul);
        }
        ExprNode::Div(a, b) => {
            compile_expr(a, index, code)?;
            compile_expr(b, index, code)?;
            code.push(Instr::Div);
        }
        ExprNode::Neg(a) => {
            compile_expr(a, index, code)?;
            code.push(Instr::Neg);
        }
        ExprNode::Sin(a) => {
            compile_expr(a, index, code)?;
            code.push(Instr::Sin);
        }
        ExprNode::Cos(a) => {
            compile_expr(a, index, code)?;
            code.push(Instr::Cos);
        }
        ExprNode::Sqrt(a) => {
            compile_expr(a, index, code)?;
            code.push(Instr::Sqrt);
        }
        ExprNode::Pow(a, n) => {
            compile_expr(a, index, code)?;
            code.push(Instr::Powi(*n));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compiled_matches_direct_eval() {
        let q = Symbol::new("q");
        let l = Symbol::new("l");
        let qe = Expr::from(q.clone());
        let le = Expr::from(l.clone());

        let tree = ExprTree::leaf(vec![
            le.clone() * qe.sin(),
            -(le.clone() * qe.cos()),
            (qe.clone() + le.clone()).powi(2),
        ]);
        let eval = lambdify(&[q.clone(), l.clone()], &tree).unwrap();

        let out = eval.call(&[0.7, 2.0]).unwrap();
        let bindings: crate::expr::Bindings = [(q, 0.7), (l, 2.0)].into_iter().collect();
        for (value, expr) in out.values.iter().zip(&tree.exprs) {
            assert_relative_eq!(*value, expr.eval(&bindings).unwrap());
        }
    }

    #[test]
    fn test_nested_tree_keeps_shape() {
        let x = Symbol::new("x");
        let tree = ExprTree::new(
            vec![],
            vec![
                ExprTree::leaf(vec![Expr::from(x.clone()); 3]),
                ExprTree::new(
                    vec![Expr::constant(1.0)],
                    vec![ExprTree::leaf(vec![Expr::from(x.clone())])],
                ),
            ],
        );
        let eval = lambdify(&[x], &tree).unwrap();
        let out = eval.call(&[4.0]).unwrap();

        assert_eq!(out.shape(), tree.shape());
        assert_eq!(out.children[0].values, vec![4.0, 4.0, 4.0]);
        assert_eq!(out.children[1].values, vec![1.0]);
        assert_eq!(out.children[1].children[0].values, vec![4.0]);
    }

    #[test]
    fn test_unbound_symbol_fails_at_compile_time() {
        let tree = ExprTree::leaf(vec![Expr::symbol("missing")]);
        let err = lambdify(&[Symbol::new("present")], &tree).unwrap_err();
        assert_eq!(err, CompileError::UnboundSymbol("missing".into()));
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let q = Symbol::new("q");
        let tree = ExprTree::leaf(vec![Expr::from(q.clone())]);
        let eval = lambdify(&[q], &tree).unwrap();

        let err = eval.call(&[]).unwrap_err();
        assert_eq!(err, EvalError::ArityMismatch { expected: 1, got: 0 });
    }

    #[test]
    fn test_zero_argument_system() {
        let tree = ExprTree::leaf(vec![Expr::constant(3.0).sqrt()]);
        let eval = lambdify(&[], &tree).unwrap();
        let out = eval.call(&[]).unwrap();
        assert_relative_eq!(out.values[0], 3.0_f64.sqrt());
    }
}
