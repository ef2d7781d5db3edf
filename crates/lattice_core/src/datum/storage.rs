//! Owned element buffers, one variant per kind.

use lattice_shared::{Mat4, Vec4};

use super::kind::{DatumRef, DatumType, Opaque};
use crate::scope::ScopeId;

/// Typed owned storage.
#[derive(Clone, Debug, Default)]
pub enum Buffer {
    /// No kind fixed yet.
    #[default]
    Unknown,
    /// Integers.
    Integer(Vec<i32>),
    /// Floats.
    Float(Vec<f32>),
    /// Vectors.
    Vector(Vec<Vec4>),
    /// Matrices.
    Matrix(Vec<Mat4>),
    /// Strings.
    String(Vec<String>),
    /// Opaque pointers.
    Pointer(Vec<Opaque>),
    /// Datum references.
    Reference(Vec<DatumRef>),
    /// Nested scope handles.
    Scope(Vec<ScopeId>),
}

/// Runs `$body` with `$v` bound to the typed vector, or `$unknown` for an
/// untyped buffer.
macro_rules! with_vec {
    ($buffer:expr, $v:ident => $body:expr, unknown => $unknown:expr) => {
        match $buffer {
            Buffer::Unknown => $unknown,
            Buffer::Integer($v) => $body,
            Buffer::Float($v) => $body,
            Buffer::Vector($v) => $body,
            Buffer::Matrix($v) => $body,
            Buffer::String($v) => $body,
            Buffer::Pointer($v) => $body,
            Buffer::Reference($v) => $body,
            Buffer::Scope($v) => $body,
        }
    };
}

impl Buffer {
    /// Empty buffer of the given kind.
    pub fn empty(kind: DatumType) -> Self {
        match kind {
            DatumType::Unknown => Self::Unknown,
            DatumType::Integer => Self::Integer(Vec::new()),
            DatumType::Float => Self::Float(Vec::new()),
            DatumType::Vector => Self::Vector(Vec::new()),
            DatumType::Matrix => Self::Matrix(Vec::new()),
            DatumType::String => Self::String(Vec::new()),
            DatumType::Pointer => Self::Pointer(Vec::new()),
            DatumType::Reference => Self::Reference(Vec::new()),
            DatumType::Scope => Self::Scope(Vec::new()),
        }
    }

    /// Kind of the elements held.
    pub fn datum_type(&self) -> DatumType {
        match self {
            Self::Unknown => DatumType::Unknown,
            Self::Integer(_) => DatumType::Integer,
            Self::Float(_) => DatumType::Float,
            Self::Vector(_) => DatumType::Vector,
            Self::Matrix(_) => DatumType::Matrix,
            Self::String(_) => DatumType::String,
            Self::Pointer(_) => DatumType::Pointer,
            Self::Reference(_) => DatumType::Reference,
            Self::Scope(_) => DatumType::Scope,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len(), unknown => 0)
    }

    /// Grows the allocation by exactly `additional`.
    pub fn reserve_exact(&mut self, additional: usize) {
        with_vec!(self, v => v.reserve_exact(additional), unknown => ())
    }

    /// Grows with default values or truncates.
    pub fn resize_default(&mut self, size: usize) {
        with_vec!(self, v => v.resize_with(size, Default::default), unknown => ())
    }

    /// Drops spare allocation.
    pub fn shrink_to_fit(&mut self) {
        with_vec!(self, v => v.shrink_to_fit(), unknown => ())
    }

    /// Keeps the first `size` elements.
    pub fn truncate(&mut self, size: usize) {
        with_vec!(self, v => v.truncate(size), unknown => ())
    }

    /// Removes one element, shifting the tail down.
    pub fn remove(&mut self, index: usize) {
        with_vec!(self, v => { v.remove(index); }, unknown => ())
    }
}
