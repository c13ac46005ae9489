//! Probability values
//!
//! All probability arithmetic in the evaluator goes through the [`Probability`]
//! trait. [`Rational`] is exact and is the default value type of a tree;
//! `f64` is available where exactness does not matter. Engine code uses the
//! `try_*` methods, which report an [`Overflow`] instead of panicking.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::{Error, Overflow, Result};

/// Arithmetic backend for probabilities and expectations.
pub trait Probability:
    Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;

    /// Reduce to canonical form so that equal values compare equal.
    fn simplify(self) -> Self;

    /// Whether the value is a closed-form expression rather than a plain number.
    fn is_closed_form(&self) -> bool {
        false
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn checked_add(&self, rhs: &Self) -> Option<Self> {
        Some(self.clone() + rhs.clone())
    }

    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        Some(self.clone() - rhs.clone())
    }

    fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        Some(self.clone() * rhs.clone())
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        Some(self.clone() / rhs.clone())
    }

    fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.checked_add(rhs).ok_or_else(|| overflow("+", self, rhs))
    }

    fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.checked_sub(rhs).ok_or_else(|| overflow("-", self, rhs))
    }

    fn try_mul(&self, rhs: &Self) -> Result<Self> {
        self.checked_mul(rhs).ok_or_else(|| overflow("*", self, rhs))
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        self.checked_div(rhs).ok_or_else(|| overflow("/", self, rhs))
    }
}

fn overflow<P: fmt::Display>(op: &'static str, lhs: &P, rhs: &P) -> Error {
    Overflow {
        op,
        lhs: lhs.to_string(),
        rhs: rhs.to_string(),
    }
    .into()
}

/// Snapping grid for floating point sums.
const F64_GRID: f64 = 1e12;

impl Probability for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn simplify(self) -> Self {
        (self * F64_GRID).round() / F64_GRID
    }
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    i128::try_from(a).unwrap_or(1)
}

/// Exact fraction `num / den`, always in lowest terms with `den > 0`.
///
/// The arithmetic operators panic when a result leaves the `i128` range,
/// like integer arithmetic; the checked methods of [`Probability`] do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    /// Create `num / den`.
    ///
    /// Panics if `den` is zero, like integer division does.
    pub fn new(num: i128, den: i128) -> Self {
        assert!(den != 0, "Rational denominator must be non-zero");
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den).max(1);
        Rational {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    pub fn integer(n: i128) -> Self {
        Rational { num: n, den: 1 }
    }

    pub fn numer(&self) -> i128 {
        self.num
    }

    pub fn denom(&self) -> i128 {
        self.den
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::integer(0)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::integer(n as i128)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRationalError(String);

impl fmt::Display for ParseRationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid rational '{}'", self.0)
    }
}

impl std::error::Error for ParseRationalError {}

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Accepts `n`, `n/d`, and `0.d` forms.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bad = || ParseRationalError(s.to_string());
        let s = s.trim();
        if let Some((n, d)) = s.split_once('/') {
            let n: i128 = n.trim().parse().map_err(|_| bad())?;
            let d: i128 = d.trim().parse().map_err(|_| bad())?;
            if d == 0 {
                return Err(bad());
            }
            return Ok(Rational::new(n, d));
        }
        if let Some((int, frac)) = s.split_once('.') {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) || frac.len() > 30 {
                return Err(bad());
            }
            let negative = int.starts_with('-');
            let int: i128 = if int.is_empty() || int == "-" {
                0
            } else {
                int.parse().map_err(|_| bad())?
            };
            let scale = 10i128.pow(frac.len() as u32);
            let frac: i128 = frac.parse().map_err(|_| bad())?;
            let magnitude = int.abs() * scale + frac;
            return Ok(Rational::new(if negative { -magnitude } else { magnitude }, scale));
        }
        s.parse::<i128>().map(Rational::integer).map_err(|_| bad())
    }
}

/// Exact comparison of `a/b` and `c/d` for positive `b` and `d`.
///
/// Falls back to comparing continued-fraction expansions when the cross
/// products do not fit.
fn cmp_fractions(mut a: i128, mut b: i128, mut c: i128, mut d: i128) -> Ordering {
    loop {
        if let (Some(lhs), Some(rhs)) = (a.checked_mul(d), c.checked_mul(b)) {
            return lhs.cmp(&rhs);
        }
        let (q1, r1) = (a.div_euclid(b), a.rem_euclid(b));
        let (q2, r2) = (c.div_euclid(d), c.rem_euclid(d));
        if q1 != q2 {
            return q1.cmp(&q2);
        }
        match (r1 == 0, r2 == 0) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        // r1/b < r2/d exactly when d/r2 < b/r1
        (a, b, c, d) = (d, r2, b, r1);
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_fractions(self.num, self.den, other.num, other.den)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Rational) -> Rational {
        match Probability::checked_add(&self, &rhs) {
            Some(sum) => sum,
            None => panic!("Rational overflow in {self} + {rhs}"),
        }
    }
}

impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Rational) -> Rational {
        match Probability::checked_sub(&self, &rhs) {
            Some(difference) => difference,
            None => panic!("Rational overflow in {self} - {rhs}"),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Mul for Rational {
    type Output = Rational;
    fn mul(self, rhs: Rational) -> Rational {
        match Probability::checked_mul(&self, &rhs) {
            Some(product) => product,
            None => panic!("Rational overflow in {self} * {rhs}"),
        }
    }
}

impl Div for Rational {
    type Output = Rational;
    fn div(self, rhs: Rational) -> Rational {
        assert!(rhs.num != 0, "division of Rational by zero");
        match Probability::checked_div(&self, &rhs) {
            Some(quotient) => quotient,
            None => panic!("Rational overflow in {self} / {rhs}"),
        }
    }
}

impl Probability for Rational {
    fn zero() -> Self {
        Rational::integer(0)
    }

    fn one() -> Self {
        Rational::integer(1)
    }

    fn simplify(self) -> Self {
        self
    }

    fn checked_add(&self, rhs: &Self) -> Option<Self> {
        let g = gcd(self.den, rhs.den).max(1);
        let lhs_num = self.num.checked_mul(rhs.den / g)?;
        let rhs_num = rhs.num.checked_mul(self.den / g)?;
        let den = (self.den / g).checked_mul(rhs.den)?;
        Some(Rational::new(lhs_num.checked_add(rhs_num)?, den))
    }

    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        let negated = Rational {
            num: rhs.num.checked_neg()?,
            den: rhs.den,
        };
        self.checked_add(&negated)
    }

    fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        // cross-reduce first to keep the intermediates small
        let g1 = gcd(self.num, rhs.den).max(1);
        let g2 = gcd(rhs.num, self.den).max(1);
        let num = (self.num / g1).checked_mul(rhs.num / g2)?;
        let den = (self.den / g2).checked_mul(rhs.den / g1)?;
        Some(Rational::new(num, den))
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.num == 0 {
            return None;
        }
        let reciprocal = if rhs.num < 0 {
            Rational {
                num: rhs.den.checked_neg()?,
                den: rhs.num.checked_neg()?,
            }
        } else {
            Rational {
                num: rhs.den,
                den: rhs.num,
            }
        };
        self.checked_mul(&reciprocal)
    }
}

/// Shorthand for `Rational::new(num, den)`.
pub fn ratio(num: i128, den: i128) -> Rational {
    Rational::new(num, den)
}
