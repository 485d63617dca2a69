//! Symbolic parameter expressions.
//!
//! Rotation angles are kept symbolic until a placement or synthesis pass
//! needs a concrete value. Angles are measured in half-turns (1 half-turn
//! = π radians) throughout the workspace.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;
use std::fmt;

/// Tolerance for deciding that a closed expression is an integer.
const EQUIV_EPS: f64 = 1e-10;

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A symbolic parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// An expression is closed iff it has no free symbols.
    pub fn is_closed(&self) -> bool {
        !self.is_symbolic()
    }

    /// Try to evaluate as a concrete f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Get all free symbol names in this expression.
    pub fn symbols(&self) -> HashSet<String> {
        let mut set = HashSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut HashSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Replace free symbols by the expressions in `map`, returning a new
    /// expression. Symbols absent from the map are left in place.
    pub fn substitute(&self, map: &FxHashMap<String, ParameterExpression>) -> Self {
        match self {
            ParameterExpression::Symbol(n) => match map.get(n) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => {
                ParameterExpression::Neg(Box::new(e.substitute(map)))
            }
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.substitute(map)),
                Box::new(b.substitute(map)),
            ),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(
                Box::new(a.substitute(map)),
                Box::new(b.substitute(map)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.substitute(map)),
                Box::new(b.substitute(map)),
            ),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(
                Box::new(a.substitute(map)),
                Box::new(b.substitute(map)),
            ),
        }
    }

    /// Bind a single symbol to a concrete value, returning a new expression.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        let mut map = FxHashMap::default();
        map.insert(name.to_string(), ParameterExpression::Constant(value));
        self.substitute(&map)
    }

    /// Multiply by a rational scale factor.
    pub fn scaled(&self, factor: f64) -> Self {
        (self.clone() * ParameterExpression::Constant(factor)).simplify()
    }

    /// Reduce to a linear combination of symbols plus a constant, when the
    /// expression is linear in its symbols. Products and quotients of two
    /// open subexpressions have no linear form.
    fn linear_form(&self) -> Option<(BTreeMap<String, f64>, f64)> {
        match self {
            ParameterExpression::Constant(v) => Some((BTreeMap::new(), *v)),
            ParameterExpression::Pi => Some((BTreeMap::new(), PI)),
            ParameterExpression::Symbol(name) => {
                Some((BTreeMap::from([(name.clone(), 1.0)]), 0.0))
            }
            ParameterExpression::Neg(e) => {
                let (mut coeffs, constant) = e.linear_form()?;
                coeffs.values_mut().for_each(|c| *c = -*c);
                Some((coeffs, -constant))
            }
            ParameterExpression::Add(a, b) | ParameterExpression::Sub(a, b) => {
                let sign = if matches!(self, ParameterExpression::Sub(_, _)) {
                    -1.0
                } else {
                    1.0
                };
                let (mut coeffs, mut constant) = a.linear_form()?;
                let (rhs_coeffs, rhs_constant) = b.linear_form()?;
                for (name, c) in rhs_coeffs {
                    *coeffs.entry(name).or_insert(0.0) += sign * c;
                }
                constant += sign * rhs_constant;
                Some((coeffs, constant))
            }
            ParameterExpression::Mul(a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(scale), _) => scale_linear(b.linear_form()?, scale),
                (_, Some(scale)) => scale_linear(a.linear_form()?, scale),
                _ => None,
            },
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                scale_linear(a.linear_form()?, 1.0 / divisor)
            }
        }
    }

    /// True iff `self − other` is an integer multiple of `modulus`.
    ///
    /// Structurally identical expressions are always equivalent. Otherwise
    /// the difference must reduce to a constant (symbol coefficients cancel
    /// in the linear form); an irreducibly open difference is never
    /// equivalent.
    pub fn equiv_mod(&self, other: &Self, modulus: f64) -> bool {
        debug_assert!(modulus > 0.0);
        if self == other {
            return true;
        }
        let Some((coeffs, constant)) = (self.clone() - other.clone()).linear_form() else {
            return false;
        };
        if coeffs.values().any(|c| c.abs() > EQUIV_EPS) {
            return false;
        }
        let q = constant / modulus;
        (q - q.round()).abs() < EQUIV_EPS
    }

    /// True iff the expression is an integer multiple of `modulus`.
    pub fn equiv_0(&self, modulus: f64) -> bool {
        self.equiv_mod(&ParameterExpression::Constant(0.0), modulus)
    }

    /// Simplify the expression by evaluating constant subexpressions.
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        match self {
            ParameterExpression::Neg(e) => {
                let e = e.simplify();
                if let Some(v) = e.as_f64() {
                    ParameterExpression::Constant(-v)
                } else if let ParameterExpression::Neg(inner) = e {
                    *inner
                } else {
                    ParameterExpression::Neg(Box::new(e))
                }
            }
            ParameterExpression::Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (a.as_f64(), b.as_f64()) {
                    (Some(av), Some(bv)) => ParameterExpression::Constant(av + bv),
                    _ => ParameterExpression::Add(Box::new(a), Box::new(b)),
                }
            }
            ParameterExpression::Sub(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                if a == b {
                    return ParameterExpression::Constant(0.0);
                }
                match (a.as_f64(), b.as_f64()) {
                    (Some(av), Some(bv)) => ParameterExpression::Constant(av - bv),
                    _ => ParameterExpression::Sub(Box::new(a), Box::new(b)),
                }
            }
            ParameterExpression::Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (a.as_f64(), b.as_f64()) {
                    (Some(av), Some(bv)) => ParameterExpression::Constant(av * bv),
                    (Some(av), _) if av == 1.0 => b,
                    (_, Some(bv)) if bv == 1.0 => a,
                    _ => ParameterExpression::Mul(Box::new(a), Box::new(b)),
                }
            }
            ParameterExpression::Div(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (a.as_f64(), b.as_f64()) {
                    (Some(av), Some(bv)) if bv != 0.0 => ParameterExpression::Constant(av / bv),
                    _ => ParameterExpression::Div(Box::new(a), Box::new(b)),
                }
            }
            _ => self.clone(),
        }
    }
}

fn scale_linear(
    (mut coeffs, constant): (BTreeMap<String, f64>, f64),
    scale: f64,
) -> Option<(BTreeMap<String, f64>, f64)> {
    coeffs.values_mut().for_each(|c| *c *= scale);
    Some((coeffs, constant * scale))
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}
