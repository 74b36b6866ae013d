//! # Sandboxed interpreter
//!
//! Evaluates an [`Expr`] over arrays of complex numbers. Values are
//! `ArrayD<Complex64>`; scalars are 0-d arrays and binary operations follow
//! numpy broadcasting, so the same tree evaluates on a 200x200 grid, on a
//! 1-D slice or at a single point.
//!
//! Only names bound in the [`Environment`] and the fixed function set are
//! reachable. Anything else is an [`EvalError`].
//!
//! ```
//! use RustedComplexPlot::symbolic::complex_eval::{Environment, EvalOptions, evaluate, scalar};
//! use RustedComplexPlot::symbolic::complex_engine::Expr;
//! use num_complex::Complex64;
//! let expr = Expr::parse_expression("z**2 + 1").unwrap();
//! let env = Environment::new().with("z", scalar(Complex64::new(0.0, 1.0)));
//! let value = evaluate(&expr, &env, EvalOptions::default()).unwrap();
//! assert_eq!(value.first().copied(), Some(Complex64::new(0.0, 0.0)));
//! ```
use crate::symbolic::complex_engine::{Expr, MAX_DEPTH};
use crate::symbolic::complex_functions::NamedFunction;
use crate::symbolic::symbolic_errors::EvalError;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip, concatenate};
use itertools::Itertools;
use num_complex::Complex64;
use num_traits::Zero;
use std::collections::HashMap;

pub type ComplexArray = ArrayD<Complex64>;

/// Interpreter switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// When true, division by zero, known singularities and any non-finite
    /// result computed from finite inputs are errors. When false they become
    /// NaN/inf values and are left as gaps in the plots.
    pub strict_domain: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            strict_domain: true,
        }
    }
}

/// 0-d array holding one value
pub fn scalar(value: Complex64) -> ComplexArray {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// Name bindings visible to an expression.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, ComplexArray>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn bind(&mut self, name: &str, value: ComplexArray) -> &mut Self {
        self.bindings.insert(name.to_string(), value);
        self
    }

    pub fn with(mut self, name: &str, value: ComplexArray) -> Self {
        self.bind(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ComplexArray> {
        self.bindings.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).sorted().collect()
    }
}

/// numpy broadcasting rule for two shapes
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut shape = vec![0; ndim];
    for k in 0..ndim {
        let da = if k < ndim - a.len() { 1 } else { a[k - (ndim - a.len())] };
        let db = if k < ndim - b.len() { 1 } else { b[k - (ndim - b.len())] };
        shape[k] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => return None,
        };
    }
    Some(shape)
}

fn shape_mismatch(operation: &str, a: &[usize], b: &[usize]) -> EvalError {
    EvalError::ShapeMismatch {
        operation: operation.to_string(),
        left: a.to_vec(),
        right: b.to_vec(),
    }
}

fn is_finite(z: &Complex64) -> bool {
    z.re.is_finite() && z.im.is_finite()
}

/// Power with exact results for real integer exponents and a zero base.
pub fn complex_pow(base: Complex64, exp: Complex64) -> Complex64 {
    if exp.im == 0.0 {
        let p = exp.re;
        if p.fract() == 0.0 && p.abs() <= i32::MAX as f64 {
            return base.powi(p as i32);
        }
        return base.powf(p);
    }
    if base.is_zero() {
        return if exp.re > 0.0 {
            Complex64::zero()
        } else {
            Complex64::new(f64::NAN, f64::NAN)
        };
    }
    base.powc(exp)
}

#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "addition",
            BinaryOp::Sub => "subtraction",
            BinaryOp::Mul => "multiplication",
            BinaryOp::Div => "division",
            BinaryOp::Pow => "power",
        }
    }

    fn apply(&self, l: Complex64, r: Complex64) -> Complex64 {
        match self {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
            BinaryOp::Pow => complex_pow(l, r),
        }
    }
}

/// Tree-walking evaluator bound to one environment.
pub struct Interpreter<'e> {
    env: &'e Environment,
    options: EvalOptions,
}

impl<'e> Interpreter<'e> {
    pub fn new(env: &'e Environment, options: EvalOptions) -> Self {
        Interpreter { env, options }
    }

    /// Evaluate a whole tree; trees deeper than `MAX_DEPTH` are refused
    /// before any recursion.
    pub fn eval(&self, expr: &Expr) -> Result<ComplexArray, EvalError> {
        if expr.depth_exceeds(MAX_DEPTH) {
            return Err(EvalError::TooDeep { limit: MAX_DEPTH });
        }
        self.eval_node(expr)
    }

    fn eval_node(&self, expr: &Expr) -> Result<ComplexArray, EvalError> {
        match expr {
            Expr::Var(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
            Expr::Const(c) => Ok(scalar(*c)),
            Expr::Add(lhs, rhs) => self.binary(BinaryOp::Add, lhs, rhs),
            Expr::Sub(lhs, rhs) => self.binary(BinaryOp::Sub, lhs, rhs),
            Expr::Mul(lhs, rhs) => self.binary(BinaryOp::Mul, lhs, rhs),
            Expr::Div(lhs, rhs) => self.binary(BinaryOp::Div, lhs, rhs),
            Expr::Pow(lhs, rhs) => self.binary(BinaryOp::Pow, lhs, rhs),
            Expr::Neg(inner) => Ok(self.eval_node(inner)?.mapv(|z| -z)),
            Expr::Call(func, args) => {
                let arity = func.arity();
                if !arity.accepts(args.len()) {
                    return Err(EvalError::WrongArity {
                        function: func.to_string(),
                        expected: arity.to_string(),
                        found: args.len(),
                    });
                }
                let values = args
                    .iter()
                    .map(|a| self.eval_node(a))
                    .collect::<Result<Vec<_>, _>>()?;
                if func.is_elementwise() {
                    self.elementwise(*func, &values[0])
                } else {
                    array_function(*func, values)
                }
            }
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<ComplexArray, EvalError> {
        let a = self.eval_node(lhs)?;
        let b = self.eval_node(rhs)?;
        let shape = broadcast_shape(a.shape(), b.shape())
            .ok_or_else(|| shape_mismatch(op.name(), a.shape(), b.shape()))?;
        let a_b = a
            .broadcast(IxDyn(&shape))
            .ok_or_else(|| shape_mismatch(op.name(), a.shape(), b.shape()))?;
        let b_b = b
            .broadcast(IxDyn(&shape))
            .ok_or_else(|| shape_mismatch(op.name(), a.shape(), b.shape()))?;
        if self.options.strict_domain {
            if let BinaryOp::Div = op {
                if b_b.iter().any(Complex64::is_zero) {
                    return Err(EvalError::domain("division", "division by zero"));
                }
            }
        }
        let out = Zip::from(&a_b)
            .and(&b_b)
            .map_collect(|&l, &r| op.apply(l, r));
        if self.options.strict_domain {
            let bad = a_b
                .iter()
                .zip(b_b.iter())
                .zip(out.iter())
                .find(|((l, r), o)| is_finite(l) && is_finite(r) && !is_finite(o));
            if let Some(((l, r), _)) = bad {
                return Err(EvalError::domain(
                    op.name(),
                    format!("non-finite result for operands {} and {}", l, r),
                ));
            }
        }
        Ok(out)
    }

    fn elementwise(&self, func: NamedFunction, arg: &ComplexArray) -> Result<ComplexArray, EvalError> {
        if self.options.strict_domain {
            if let Some(reason) = arg.iter().find_map(|z| func.domain_violation(*z)) {
                return Err(EvalError::domain(&func.to_string(), reason));
            }
        }
        let out = arg.mapv(|z| func.apply_scalar(z));
        if self.options.strict_domain {
            let bad = arg
                .iter()
                .zip(out.iter())
                .find(|(z, w)| is_finite(z) && !is_finite(w));
            if let Some((z, _)) = bad {
                return Err(EvalError::domain(
                    &func.to_string(),
                    format!("non-finite result at z = {}", z),
                ));
            }
        }
        Ok(out)
    }
}

/// Evaluate `expr` with the given bindings.
pub fn evaluate(expr: &Expr, env: &Environment, options: EvalOptions) -> Result<ComplexArray, EvalError> {
    Interpreter::new(env, options).eval(expr)
}

fn with_leading_axes(mut a: ComplexArray, min_ndim: usize) -> ComplexArray {
    while a.ndim() < min_ndim {
        a.insert_axis_inplace(Axis(0));
    }
    a
}

/// numpy's atleast_2d
fn at_least_2d(a: ComplexArray) -> ComplexArray {
    with_leading_axes(a, 2)
}

/// numpy's atleast_3d: (n) -> (1, n, 1), (m, n) -> (m, n, 1)
fn at_least_3d(a: ComplexArray) -> ComplexArray {
    match a.ndim() {
        0 => with_leading_axes(a, 3),
        1 => a.insert_axis(Axis(0)).insert_axis(Axis(2)),
        2 => a.insert_axis(Axis(2)),
        _ => a,
    }
}

fn stack_along(func: NamedFunction, arrays: Vec<ComplexArray>, axis: usize) -> Result<ComplexArray, EvalError> {
    let views: Vec<ArrayViewD<Complex64>> = arrays.iter().map(|a| a.view()).collect();
    concatenate(Axis(axis), &views).map_err(|_| {
        let first = arrays[0].shape();
        let offending = arrays
            .iter()
            .map(|a| a.shape())
            .find(|s| s != &first)
            .unwrap_or(first);
        shape_mismatch(&func.to_string(), first, offending)
    })
}

fn array_function(func: NamedFunction, args: Vec<ComplexArray>) -> Result<ComplexArray, EvalError> {
    match func {
        NamedFunction::Transpose => {
            let arg = args.into_iter().next().ok_or_else(|| {
                shape_mismatch("transpose", &[], &[])
            })?;
            Ok(arg.reversed_axes())
        }
        NamedFunction::Vstack => {
            let arrays: Vec<_> = args.into_iter().map(at_least_2d).collect();
            stack_along(func, arrays, 0)
        }
        NamedFunction::Hstack => {
            let arrays: Vec<_> = args.into_iter().map(|a| with_leading_axes(a, 1)).collect();
            let axis = if arrays[0].ndim() == 1 { 0 } else { 1 };
            stack_along(func, arrays, axis)
        }
        NamedFunction::ColumnStack => {
            let arrays: Vec<_> = args
                .into_iter()
                .map(|a| match a.ndim() {
                    0 | 1 => with_leading_axes(a, 1).insert_axis(Axis(1)),
                    _ => a,
                })
                .collect();
            stack_along(func, arrays, 1)
        }
        NamedFunction::Dstack => {
            let arrays: Vec<_> = args.into_iter().map(at_least_3d).collect();
            stack_along(func, arrays, 2)
        }
        elementwise => unreachable!("{} is not an array function", elementwise),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn eval_str(text: &str, env: &Environment) -> Result<ComplexArray, EvalError> {
        let expr = Expr::parse_expression(text).unwrap();
        evaluate(&expr, env, EvalOptions::default())
    }

    fn at_point(text: &str, z: Complex64) -> Complex64 {
        let env = Environment::new().with("z", scalar(z));
        let out = eval_str(text, &env).unwrap();
        out.first().copied().unwrap()
    }

    #[test]
    fn test_broadcast_shape_rules() {
        assert_eq!(broadcast_shape(&[], &[3, 4]), Some(vec![3, 4]));
        assert_eq!(broadcast_shape(&[4], &[3, 4]), Some(vec![3, 4]));
        assert_eq!(broadcast_shape(&[3, 1], &[1, 4]), Some(vec![3, 4]));
        assert_eq!(broadcast_shape(&[3], &[4]), None);
    }

    #[test]
    fn test_scalar_arithmetic() {
        assert_eq!(at_point("z * z", c(0.0, 1.0)), c(-1.0, 0.0));
        assert_eq!(at_point("z**2", c(0.0, 1.0)), c(-1.0, 0.0));
        assert_eq!(at_point("-z + 1", c(2.0, 3.0)), c(-1.0, -3.0));
        assert_eq!(at_point("z / 2", c(2.0, 4.0)), c(1.0, 2.0));
    }

    #[test]
    fn test_zero_base_powers() {
        assert_eq!(at_point("z**2", c(0.0, 0.0)), c(0.0, 0.0));
        assert_eq!(at_point("z**0.5", c(0.0, 0.0)), c(0.0, 0.0));
        assert_eq!(complex_pow(c(0.0, 0.0), c(1.0, 1.0)), c(0.0, 0.0));
    }

    #[test]
    fn test_trailing_decimal_literals() {
        assert_eq!(at_point("z + 3.25", c(0.0, 0.0)), c(3.25, 0.0));
        assert_eq!(at_point("z*0.5", c(4.0, 2.0)), c(2.0, 1.0));
        let w = at_point("z**1.5", c(-1.0, 0.0));
        assert_relative_eq!(w.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(w.im, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_functions_at_a_point() {
        let w = at_point("exp(z)", c(0.0, std::f64::consts::PI));
        assert_relative_eq!(w.re, -1.0, epsilon = 1e-12);
        assert_relative_eq!(w.im, 0.0, epsilon = 1e-12);
        let w = at_point("sqrt(z)", c(-4.0, 0.0));
        assert_relative_eq!(w.im, 2.0, epsilon = 1e-12);
        let w = at_point("abs(z)", c(3.0, 4.0));
        assert_eq!(w, c(5.0, 0.0));
        let w = at_point("gamma(z)", c(4.0, 0.0));
        assert_relative_eq!(w.re, 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_unknown_variable_is_an_error_not_nan() {
        let env = Environment::new().with("z", scalar(c(1.0, 0.0)));
        assert_eq!(
            eval_str("w + 1", &env).unwrap_err(),
            EvalError::UnknownVariable("w".to_string())
        );
    }

    #[test]
    fn test_hand_built_call_with_wrong_arity() {
        let env = Environment::new().with("z", scalar(c(1.0, 0.0)));
        let options = EvalOptions::default();
        let err = evaluate(&Expr::Call(NamedFunction::Sin, vec![]), &env, options).unwrap_err();
        assert_eq!(
            err,
            EvalError::WrongArity {
                function: "sin".to_string(),
                expected: "1".to_string(),
                found: 0
            }
        );
        let err = evaluate(&Expr::Call(NamedFunction::Vstack, vec![]), &env, options).unwrap_err();
        assert!(matches!(err, EvalError::WrongArity { found: 0, .. }));
        let two = vec![Expr::var("z"), Expr::var("z")];
        let err = evaluate(&Expr::Call(NamedFunction::Exp, two), &env, options).unwrap_err();
        assert!(matches!(err, EvalError::WrongArity { found: 2, .. }));
    }

    #[test]
    fn test_hand_built_deep_tree_is_refused() {
        let env = Environment::new().with("z", scalar(c(1.0, 0.0)));
        let build = |n: usize| (0..n).fold(Expr::var("z"), |e, _| Expr::Neg(Box::new(e)));
        // 255 negations plus the leaf fit within the limit
        let value = evaluate(&build(MAX_DEPTH - 1), &env, EvalOptions::default()).unwrap();
        assert_eq!(value.first().copied(), Some(c(-1.0, 0.0)));
        assert_eq!(
            evaluate(&build(300), &env, EvalOptions::default()).unwrap_err(),
            EvalError::TooDeep { limit: MAX_DEPTH }
        );
    }

    #[test]
    fn test_broadcasting_over_grid() {
        let grid = Array2::from_shape_fn((2, 3), |(i, j)| c(i as f64, j as f64)).into_dyn();
        let env = Environment::new().with("z", grid);
        let out = eval_str("z + 1", &env).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out[[1, 2]], c(2.0, 2.0));
    }

    #[test]
    fn test_strict_division_by_zero() {
        let env = Environment::new().with("z", scalar(c(0.0, 0.0)));
        let err = eval_str("1 / z", &env).unwrap_err();
        assert_eq!(err, EvalError::domain("division", "division by zero"));
    }

    #[test]
    fn test_lenient_division_by_zero_gives_non_finite() {
        let env = Environment::new().with("z", scalar(c(0.0, 0.0)));
        let expr = Expr::parse_expression("1 / z").unwrap();
        let out = evaluate(&expr, &env, EvalOptions { strict_domain: false }).unwrap();
        let w = out.first().copied().unwrap();
        assert!(!w.re.is_finite() || !w.im.is_finite());
    }

    #[test]
    fn test_strict_log_of_zero() {
        let env = Environment::new().with("z", scalar(c(0.0, 0.0)));
        let err = eval_str("log(z)", &env).unwrap_err();
        assert_eq!(err, EvalError::domain("log", "logarithm of zero"));
    }

    #[test]
    fn test_transpose() {
        let grid = Array2::from_shape_fn((2, 3), |(i, j)| c((3 * i + j) as f64, 0.0)).into_dyn();
        let env = Environment::new().with("z", grid);
        let out = eval_str("transpose(z)", &env).unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out[[2, 1]], c(5.0, 0.0));
    }

    #[test]
    fn test_stacking_helpers() {
        let v = Array1::from_vec(vec![c(1.0, 0.0), c(2.0, 0.0)]).into_dyn();
        let env = Environment::new().with("v", v);
        assert_eq!(eval_str("vstack(v, v)", &env).unwrap().shape(), &[2, 2]);
        assert_eq!(eval_str("hstack(v, v, v)", &env).unwrap().shape(), &[6]);
        assert_eq!(eval_str("column_stack(v, v)", &env).unwrap().shape(), &[2, 2]);
        assert_eq!(eval_str("dstack(v, v)", &env).unwrap().shape(), &[1, 2, 2]);
        let out = eval_str("column_stack(v, 2*v)", &env).unwrap();
        assert_eq!(out[[1, 1]], c(4.0, 0.0));
    }

    #[test]
    fn test_stacking_incompatible_shapes() {
        let env = Environment::new()
            .with("a", Array1::from_elem(2, c(1.0, 0.0)).into_dyn())
            .with("b", Array1::from_elem(3, c(1.0, 0.0)).into_dyn());
        assert!(matches!(
            eval_str("vstack(a, b)", &env).unwrap_err(),
            EvalError::ShapeMismatch { .. }
        ));
        assert!(matches!(
            eval_str("a + b", &env).unwrap_err(),
            EvalError::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_environment_names_sorted() {
        let env = Environment::new()
            .with("z", scalar(c(0.0, 0.0)))
            .with("X", scalar(c(0.0, 0.0)));
        assert_eq!(env.names(), vec!["X", "z"]);
    }
}
