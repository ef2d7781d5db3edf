//! Vector and matrix values.
//!
//! Both types format as text the way the variant store prints them
//! (`vec4(1, 2, 3, 4)`, `mat4x4((..), (..), (..), (..))`) and parse that
//! text back. Parsing is lenient about the prefix and whitespace; only the
//! number of components is checked.

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to parse a vector or matrix from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} numeric components in {text:?}")]
pub struct ParseMathError {
    /// Number of components the target type needs.
    pub expected: usize,
    /// The text that failed to parse.
    pub text: String,
}

/// 4D vector - positions, directions, colors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec4 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl Vec4 {
    /// Creates a new Vec4
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f32; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }
}

impl std::ops::Add for Vec4 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl std::ops::Sub for Vec4 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl std::ops::Mul<f32> for Vec4 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vec4({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

impl FromStr for Vec4 {
    type Err = ParseMathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_components::<4>(s, "vec4")?;
        Ok(Self::from_array(values))
    }
}

/// 4x4 matrix, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Mat4 {
    /// Columns of the matrix.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// Identity matrix
    pub const IDENTITY: Self = Self::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    );

    /// Creates a matrix from its four columns.
    #[must_use]
    pub const fn from_cols(x: Vec4, y: Vec4, z: Vec4, w: Vec4) -> Self {
        Self { cols: [x, y, z, w] }
    }

    /// Creates a matrix from 16 column-major values.
    #[must_use]
    pub fn from_cols_array(values: [f32; 16]) -> Self {
        let col = |i: usize| {
            Vec4::new(values[i * 4], values[i * 4 + 1], values[i * 4 + 2], values[i * 4 + 3])
        };
        Self::from_cols(col(0), col(1), col(2), col(3))
    }

    /// Returns the 16 values in column-major order.
    #[must_use]
    pub fn to_cols_array(self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, col) in self.cols.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&col.to_array());
        }
        out
    }

    /// Transforms a vector.
    #[must_use]
    pub fn transform(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mat4x4(")?;
        for (i, col) in self.cols.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {}, {}, {})", col.x, col.y, col.z, col.w)?;
        }
        write!(f, ")")
    }
}

impl FromStr for Mat4 {
    type Err = ParseMathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_components::<16>(s, "mat4x4")?;
        Ok(Self::from_cols_array(values))
    }
}

fn parse_components<const N: usize>(text: &str, prefix: &str) -> Result<[f32; N], ParseMathError> {
    let error = || ParseMathError {
        expected: N,
        text: text.to_string(),
    };

    let trimmed = text.trim();
    let body = trimmed.strip_prefix(prefix).unwrap_or(trimmed);

    let mut out = [0.0; N];
    let mut count = 0;
    for token in body
        .split(|c: char| c == '(' || c == ')' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if count == N {
            return Err(error());
        }
        out[count] = token.parse::<f32>().map_err(|_| error())?;
        count += 1;
    }

    if count == N {
        Ok(out)
    } else {
        Err(error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec4_text_roundtrip() {
        let v = Vec4::new(1.0, -2.5, 0.125, 4.0);
        let text = v.to_string();
        assert_eq!(text, "vec4(1, -2.5, 0.125, 4)");
        assert_eq!(text.parse::<Vec4>().unwrap(), v);
    }

    #[test]
    fn test_vec4_parse_without_prefix() {
        assert_eq!("1 2 3 4".parse::<Vec4>().unwrap(), Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert!("1 2 3".parse::<Vec4>().is_err());
        assert!("1 2 3 4 5".parse::<Vec4>().is_err());
        assert!("vec4(1, 2, x, 4)".parse::<Vec4>().is_err());
    }

    #[test]
    fn test_mat4_text_roundtrip() {
        let m = Mat4::from_cols_array([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        assert_eq!(m.to_string().parse::<Mat4>().unwrap(), m);
        assert_eq!(m.to_cols_array()[5], 6.0);
    }

    #[test]
    fn test_identity_transform() {
        let v = Vec4::new(3.0, 4.0, 5.0, 1.0);
        assert_eq!(Mat4::IDENTITY.transform(v), v);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(std::mem::size_of::<Vec4>(), 16);
        assert_eq!(std::mem::size_of::<Mat4>(), 64);
    }
}
