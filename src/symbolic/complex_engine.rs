//! # Complex expression engine
//!
//! Typed abstract syntax tree for expressions over complex numbers.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - bound names such as "z", "X", "Y"
//! - **Constants**: `Const(Complex64)` - real and imaginary literals
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`, `Neg`
//! - **Calls**: `Call(NamedFunction, Vec<Expr>)` - only the fixed function set
//!
//! ### Key Methods
//! - `parse_expression(input)` - raw text to AST (see `parse_expr`)
//! - `extract_variables()` - names the expression needs bound
//! - `substitute_variable()` / `set_variable()` - rewrite a variable
//!
//! Operator overloading (`+ - * /`, unary `-`, compound assignment) builds
//! trees directly:
//! ```
//! use RustedComplexPlot::symbolic::complex_engine::Expr;
//! let z = Expr::var("z");
//! let expr = z.clone() * z + Expr::real(1.0);
//! assert_eq!(expr.to_string(), "((z * z) + 1)");
//! ```
use crate::symbolic::complex_functions::NamedFunction;
use num_complex::Complex64;
use std::collections::BTreeSet;
use std::fmt;

/// Deepest expression tree the parser builds and the interpreter walks.
pub const MAX_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Var(String),
    Const(Complex64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Call(NamedFunction, Vec<Expr>),
}

fn fmt_complex(c: &Complex64, f: &mut fmt::Formatter) -> fmt::Result {
    if c.im == 0.0 {
        write!(f, "{}", c.re)
    } else if c.re == 0.0 {
        write!(f, "{}j", c.im)
    } else {
        write!(f, "({}{:+}j)", c.re, c.im)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => fmt_complex(val, f),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Neg(expr) => write!(f, "(-{})", expr),
            Expr::Call(func, args) => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = Expr::Add(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Expr::Sub(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Expr::Mul(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::DivAssign for Expr {
    fn div_assign(&mut self, rhs: Self) {
        *self = Expr::Div(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Neg(self.boxed())
    }
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn real(value: f64) -> Expr {
        Expr::Const(Complex64::new(value, 0.0))
    }

    pub fn imag(value: f64) -> Expr {
        Expr::Const(Complex64::new(0.0, value))
    }

    pub fn call(func: NamedFunction, arg: Expr) -> Expr {
        Expr::Call(func, vec![arg])
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Parse raw (already preprocessed) text into an expression tree.
    pub fn parse_expression(input: &str) -> Result<Expr, crate::symbolic::symbolic_errors::ParseError> {
        crate::symbolic::parse_expr::parse_expression_func(input)
    }

    /// Sorted set of variable names the expression refers to.
    pub fn extract_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_variables(vars);
                rhs.collect_variables(vars);
            }
            Expr::Neg(expr) => expr.collect_variables(vars),
            Expr::Call(_, args) => args.iter().for_each(|a| a.collect_variables(vars)),
        }
    }

    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
            }
            Expr::Neg(expr) => expr.contains_variable(var_name),
            Expr::Call(_, args) => args.iter().any(|a| a.contains_variable(var_name)),
        }
    }

    /// true if any constant has a non-zero imaginary part
    pub fn contains_imaginary(&self) -> bool {
        match self {
            Expr::Var(_) => false,
            Expr::Const(c) => c.im != 0.0,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.contains_imaginary() || rhs.contains_imaginary(),
            Expr::Neg(expr) => expr.contains_imaginary(),
            Expr::Call(_, args) => args.iter().any(|a| a.contains_imaginary()),
        }
    }

    /// true if some path from the root has more than `limit` nodes;
    /// never descends below `limit`
    pub fn depth_exceeds(&self, limit: usize) -> bool {
        if limit == 0 {
            return true;
        }
        match self {
            Expr::Var(_) | Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.depth_exceeds(limit - 1) || rhs.depth_exceeds(limit - 1),
            Expr::Neg(expr) => expr.depth_exceeds(limit - 1),
            Expr::Call(_, args) => args.iter().any(|a| a.depth_exceeds(limit - 1)),
        }
    }

    /// Replace every occurrence of `var` with `expr`.
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                lhs.substitute_variable(var, expr).boxed(),
                rhs.substitute_variable(var, expr).boxed(),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                lhs.substitute_variable(var, expr).boxed(),
                rhs.substitute_variable(var, expr).boxed(),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                lhs.substitute_variable(var, expr).boxed(),
                rhs.substitute_variable(var, expr).boxed(),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                lhs.substitute_variable(var, expr).boxed(),
                rhs.substitute_variable(var, expr).boxed(),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                base.substitute_variable(var, expr).boxed(),
                exp.substitute_variable(var, expr).boxed(),
            ),
            Expr::Neg(inner) => Expr::Neg(inner.substitute_variable(var, expr).boxed()),
            Expr::Call(func, args) => Expr::Call(
                *func,
                args.iter()
                    .map(|a| a.substitute_variable(var, expr))
                    .collect(),
            ),
        }
    }

    /// turn a variable into a constant
    pub fn set_variable(&self, var: &str, value: Complex64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }
}
