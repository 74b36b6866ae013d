//! # Named function set
//!
//! The fixed library of functions an expression may call. Nothing outside this
//! list is reachable from user text.
//!
//! Elementwise functions act on every array element (`sin`, `log`, `gamma`, ...),
//! the array helpers (`transpose`, `vstack`, `hstack`, `column_stack`, `dstack`)
//! act on whole arrays and follow numpy's stacking rules.
//!
//! Names are parsed through `strum`, aliases included:
//! ```
//! use RustedComplexPlot::symbolic::complex_functions::NamedFunction;
//! assert_eq!(NamedFunction::lookup("np.arctan"), Some(NamedFunction::Arctan));
//! assert_eq!(NamedFunction::lookup("atan"), Some(NamedFunction::Arctan));
//! assert_eq!(NamedFunction::lookup("foo"), None);
//! ```
#![allow(non_camel_case_types)]
use num_complex::Complex64;
use std::f64::consts::{FRAC_PI_2, PI};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// namespace prefix accepted in front of function and constant names
pub const NUMPY_PREFIX: &str = "np.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum NamedFunction {
    #[strum(serialize = "sin")]
    Sin,
    #[strum(serialize = "cos")]
    Cos,
    #[strum(to_string = "tan", serialize = "tg")]
    Tan,
    #[strum(to_string = "cot", serialize = "ctg")]
    Cot,
    #[strum(to_string = "arcsin", serialize = "asin")]
    Arcsin,
    #[strum(to_string = "arccos", serialize = "acos")]
    Arccos,
    #[strum(to_string = "arctan", serialize = "atan", serialize = "arctg")]
    Arctan,
    #[strum(to_string = "arccot", serialize = "acot", serialize = "arcctg")]
    Arccot,
    #[strum(serialize = "exp")]
    Exp,
    #[strum(to_string = "log", serialize = "ln")]
    Log,
    #[strum(serialize = "sqrt")]
    Sqrt,
    #[strum(serialize = "abs")]
    Abs,
    #[strum(serialize = "angle")]
    Angle,
    #[strum(serialize = "gamma")]
    Gamma,
    #[strum(serialize = "transpose")]
    Transpose,
    #[strum(serialize = "vstack")]
    Vstack,
    #[strum(serialize = "hstack")]
    Hstack,
    #[strum(serialize = "column_stack")]
    ColumnStack,
    #[strum(serialize = "dstack")]
    Dstack,
}

/// how many arguments a function takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == *k,
            Arity::AtLeast(k) => n >= *k,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "{}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

impl NamedFunction {
    /// Resolve a user-typed name. The `np.` prefix is stripped first.
    pub fn lookup(name: &str) -> Option<NamedFunction> {
        let bare = name.strip_prefix(NUMPY_PREFIX).unwrap_or(name);
        NamedFunction::from_str(bare).ok()
    }

    pub fn arity(&self) -> Arity {
        match self {
            NamedFunction::Vstack
            | NamedFunction::Hstack
            | NamedFunction::ColumnStack
            | NamedFunction::Dstack => Arity::AtLeast(1),
            _ => Arity::Exactly(1),
        }
    }

    /// true for functions applied independently to every element
    pub fn is_elementwise(&self) -> bool {
        !matches!(
            self,
            NamedFunction::Transpose
                | NamedFunction::Vstack
                | NamedFunction::Hstack
                | NamedFunction::ColumnStack
                | NamedFunction::Dstack
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            NamedFunction::Sin => "sine",
            NamedFunction::Cos => "cosine",
            NamedFunction::Tan => "tangent",
            NamedFunction::Cot => "cotangent, 1/tan(z)",
            NamedFunction::Arcsin => "inverse sine (principal branch)",
            NamedFunction::Arccos => "inverse cosine (principal branch)",
            NamedFunction::Arctan => "inverse tangent (principal branch)",
            NamedFunction::Arccot => "inverse cotangent, pi/2 - arctan(z)",
            NamedFunction::Exp => "exponential",
            NamedFunction::Log => "natural logarithm (principal branch)",
            NamedFunction::Sqrt => "square root (principal branch)",
            NamedFunction::Abs => "modulus |z|",
            NamedFunction::Angle => "argument of z in radians",
            NamedFunction::Gamma => "Gamma function",
            NamedFunction::Transpose => "reverse the array axes",
            NamedFunction::Vstack => "stack arrays along the first axis",
            NamedFunction::Hstack => "stack arrays along the second axis (first for 1-D)",
            NamedFunction::ColumnStack => "stack 1-D arrays as columns",
            NamedFunction::Dstack => "stack arrays along the third axis",
        }
    }

    /// Value of an elementwise function at one point. Array helpers return
    /// their argument unchanged; the interpreter never routes them here.
    pub fn apply_scalar(&self, z: Complex64) -> Complex64 {
        match self {
            NamedFunction::Sin => z.sin(),
            NamedFunction::Cos => z.cos(),
            NamedFunction::Tan => z.tan(),
            NamedFunction::Cot => Complex64::new(1.0, 0.0) / z.tan(),
            NamedFunction::Arcsin => z.asin(),
            NamedFunction::Arccos => z.acos(),
            NamedFunction::Arctan => z.atan(),
            NamedFunction::Arccot => Complex64::new(FRAC_PI_2, 0.0) - z.atan(),
            NamedFunction::Exp => z.exp(),
            NamedFunction::Log => z.ln(),
            NamedFunction::Sqrt => z.sqrt(),
            NamedFunction::Abs => Complex64::new(z.norm(), 0.0),
            NamedFunction::Angle => Complex64::new(z.arg(), 0.0),
            NamedFunction::Gamma => gamma(z),
            _ => z,
        }
    }

    /// Known singular points, reported with a readable reason.
    pub fn domain_violation(&self, z: Complex64) -> Option<String> {
        let i = Complex64::new(0.0, 1.0);
        match self {
            NamedFunction::Log if z == Complex64::new(0.0, 0.0) => {
                Some("logarithm of zero".to_string())
            }
            NamedFunction::Gamma if is_non_positive_integer(z) => {
                Some(format!("pole at z = {}", z.re))
            }
            NamedFunction::Cot if z.tan() == Complex64::new(0.0, 0.0) => {
                Some(format!("pole at z = {}", z))
            }
            NamedFunction::Arctan | NamedFunction::Arccot if z == i || z == -i => {
                Some(format!("branch point at z = {}", z))
            }
            _ => None,
        }
    }
}

fn is_non_positive_integer(z: Complex64) -> bool {
    z.im == 0.0 && z.re <= 0.0 && z.re.fract() == 0.0
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Complex Gamma function: Lanczos approximation (g = 7, n = 9) with the
/// reflection formula for Re z < 1/2. Poles yield non-finite values.
pub fn gamma(z: Complex64) -> Complex64 {
    if is_non_positive_integer(z) {
        return Complex64::new(f64::INFINITY, 0.0);
    }
    if z.re < 0.5 {
        let pi = Complex64::new(PI, 0.0);
        return pi / ((pi * z).sin() * gamma(Complex64::new(1.0, 0.0) - z));
    }
    let z = z - 1.0;
    let mut series = Complex64::new(LANCZOS_COEFFS[0], 0.0);
    for (k, c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        series += *c / (z + k as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powc(z + 0.5) * (-t).exp() * series
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_lookup_canonical_and_aliases() {
        assert_eq!(NamedFunction::lookup("sin"), Some(NamedFunction::Sin));
        assert_eq!(NamedFunction::lookup("tg"), Some(NamedFunction::Tan));
        assert_eq!(NamedFunction::lookup("ln"), Some(NamedFunction::Log));
        assert_eq!(NamedFunction::lookup("np.gamma"), Some(NamedFunction::Gamma));
        assert_eq!(
            NamedFunction::lookup("column_stack"),
            Some(NamedFunction::ColumnStack)
        );
        assert_eq!(NamedFunction::lookup("sinh"), None);
        assert_eq!(NamedFunction::lookup("SIN"), None);
    }

    #[test]
    fn test_display_is_canonical_name() {
        assert_eq!(NamedFunction::Tan.to_string(), "tan");
        assert_eq!(NamedFunction::Arccot.to_string(), "arccot");
        assert_eq!(NamedFunction::ColumnStack.to_string(), "column_stack");
    }

    #[test]
    fn test_every_function_roundtrips_through_its_name() {
        for f in NamedFunction::iter() {
            assert_eq!(NamedFunction::lookup(&f.to_string()), Some(f));
        }
        assert_eq!(NamedFunction::iter().count(), 19);
    }

    #[test]
    fn test_arity() {
        assert!(NamedFunction::Sin.arity().accepts(1));
        assert!(!NamedFunction::Sin.arity().accepts(2));
        assert!(NamedFunction::Vstack.arity().accepts(3));
        assert!(!NamedFunction::Vstack.arity().accepts(0));
    }

    #[test]
    fn test_gamma_real_values() {
        assert_relative_eq!(gamma(Complex64::new(1.0, 0.0)).re, 1.0, epsilon = 1e-10);
        assert_relative_eq!(gamma(Complex64::new(5.0, 0.0)).re, 24.0, epsilon = 1e-9);
        assert_relative_eq!(
            gamma(Complex64::new(0.5, 0.0)).re,
            PI.sqrt(),
            epsilon = 1e-10
        );
        // reflection branch: Gamma(-0.5) = -2 sqrt(pi)
        assert_relative_eq!(
            gamma(Complex64::new(-0.5, 0.0)).re,
            -2.0 * PI.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_gamma_recurrence_off_axis() {
        // Gamma(z + 1) = z Gamma(z)
        let z = Complex64::new(0.3, 1.7);
        let lhs = gamma(z + 1.0);
        let rhs = z * gamma(z);
        assert_relative_eq!(lhs.re, rhs.re, epsilon = 1e-10);
        assert_relative_eq!(lhs.im, rhs.im, epsilon = 1e-10);
    }

    #[test]
    fn test_gamma_pole_is_not_finite() {
        assert!(!gamma(Complex64::new(-2.0, 0.0)).is_finite());
        assert!(NamedFunction::Gamma
            .domain_violation(Complex64::new(-2.0, 0.0))
            .is_some());
        assert!(NamedFunction::Gamma
            .domain_violation(Complex64::new(-2.5, 0.0))
            .is_none());
    }

    #[test]
    fn test_cot_and_arccot() {
        let z = Complex64::new(0.7, 0.2);
        let cot = NamedFunction::Cot.apply_scalar(z);
        let expected = z.cos() / z.sin();
        assert_relative_eq!(cot.re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(cot.im, expected.im, epsilon = 1e-12);
        let arccot = NamedFunction::Arccot.apply_scalar(Complex64::new(1.0, 0.0));
        assert_relative_eq!(arccot.re, PI / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_abs_and_angle_are_real() {
        let z = Complex64::new(-3.0, 4.0);
        assert_eq!(NamedFunction::Abs.apply_scalar(z), Complex64::new(5.0, 0.0));
        let angle = NamedFunction::Angle.apply_scalar(z);
        assert_eq!(angle.im, 0.0);
        assert_relative_eq!(angle.re, 4.0f64.atan2(-3.0), epsilon = 1e-15);
    }

    #[test]
    fn test_log_of_zero_is_a_domain_violation() {
        assert_eq!(
            NamedFunction::Log.domain_violation(Complex64::new(0.0, 0.0)),
            Some("logarithm of zero".to_string())
        );
        assert!(NamedFunction::Log
            .domain_violation(Complex64::new(-1.0, 0.0))
            .is_none());
    }
}
