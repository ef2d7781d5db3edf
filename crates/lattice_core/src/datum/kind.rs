//! Value kinds a [`Datum`](super::Datum) can hold, and the element types
//! that map onto them.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use lattice_shared::{Mat4, Vec4};

use super::field::{ExternalField, Field};
use super::storage::Buffer;
use crate::error::{CoreError, CoreResult};
use crate::scope::ScopeId;

/// The closed set of kinds a datum can hold.
///
/// A datum starts as `Unknown`; the first write or `set_type` call fixes
/// its kind for the rest of its life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DatumType {
    /// Not yet fixed.
    #[default]
    Unknown,
    /// 32-bit signed integer.
    Integer,
    /// 32-bit float.
    Float,
    /// 4-component float vector.
    Vector,
    /// 4x4 float matrix.
    Matrix,
    /// UTF-8 string.
    String,
    /// Opaque shared pointer to any value.
    Pointer,
    /// Reference to another datum by scope and attribute name.
    Reference,
    /// Owned nested scopes.
    Scope,
}

impl DatumType {
    /// Returns `true` for kinds that can be parsed back from their text form.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Vector | Self::Matrix | Self::String
        )
    }

    /// Parses the kind names used in scene documents ("integer", "vector", ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "vector" => Some(Self::Vector),
            "matrix" => Some(Self::Matrix),
            "string" => Some(Self::String),
            "pointer" => Some(Self::Pointer),
            "reference" => Some(Self::Reference),
            "scope" | "table" => Some(Self::Scope),
            _ => None,
        }
    }
}

/// Opaque shared pointer, compared by identity.
#[derive(Clone, Default)]
pub struct Opaque(Option<Rc<dyn Any>>);

impl Opaque {
    /// Wraps a value in a new shared allocation.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self(Some(Rc::new(value)))
    }

    /// Wraps an existing shared allocation.
    #[must_use]
    pub fn from_rc(value: Rc<dyn Any>) -> Self {
        Self(Some(value))
    }

    /// The null pointer.
    #[must_use]
    pub const fn null() -> Self {
        Self(None)
    }

    /// Checks for null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the pointee as `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref()?.downcast_ref::<T>()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "opaque(null)"),
            Some(rc) => write!(f, "opaque({:p})", Rc::as_ptr(rc).cast::<()>()),
        }
    }
}

/// Points at another datum: the scope that owns it and its attribute name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DatumRef {
    /// Scope holding the attribute.
    pub scope: ScopeId,
    /// Attribute name inside that scope.
    pub attribute: String,
}

impl DatumRef {
    /// Creates a reference.
    #[must_use]
    pub fn new(scope: ScopeId, attribute: impl Into<String>) -> Self {
        Self {
            scope,
            attribute: attribute.into(),
        }
    }

    /// Checks whether the reference points anywhere.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.scope.is_null()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Rust types that can be stored in a datum.
///
/// Implemented for `i32`, `f32`, [`Vec4`], [`Mat4`], `String`, [`Opaque`]
/// and [`DatumRef`]. Nested scopes are not elements: only the tree can put
/// a [`ScopeId`] into a datum.
pub trait Element: Clone + PartialEq + Default + fmt::Debug + sealed::Sealed + 'static {
    /// Kind this type maps to.
    const TYPE: DatumType;

    #[doc(hidden)]
    fn owned(buffer: &Buffer) -> Option<&Vec<Self>>;
    #[doc(hidden)]
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>>;
    #[doc(hidden)]
    fn wrap_owned(values: Vec<Self>) -> Buffer;
    #[doc(hidden)]
    fn external(field: &ExternalField) -> Option<&Field<Self>>;
    #[doc(hidden)]
    fn wrap_external(field: Field<Self>) -> ExternalField;

    /// Formats one value.
    fn to_text(&self) -> String;

    /// Parses one value.
    ///
    /// # Errors
    ///
    /// `ParseFailed` for malformed text, `NotRepresentable` for pointer kinds.
    fn from_text(text: &str) -> CoreResult<Self>;
}

fn parse_failed(kind: DatumType, text: &str) -> CoreError {
    CoreError::ParseFailed {
        kind,
        text: text.to_string(),
    }
}

impl sealed::Sealed for i32 {}
impl Element for i32 {
    const TYPE: DatumType = DatumType::Integer;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::Integer(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::Integer(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::Integer(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::Integer(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::Integer(field)
    }
    fn to_text(&self) -> String {
        self.to_string()
    }
    fn from_text(text: &str) -> CoreResult<Self> {
        text.trim()
            .parse()
            .map_err(|_| parse_failed(Self::TYPE, text))
    }
}

impl sealed::Sealed for f32 {}
impl Element for f32 {
    const TYPE: DatumType = DatumType::Float;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::Float(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::Float(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::Float(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::Float(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::Float(field)
    }
    fn to_text(&self) -> String {
        self.to_string()
    }
    fn from_text(text: &str) -> CoreResult<Self> {
        text.trim()
            .parse()
            .map_err(|_| parse_failed(Self::TYPE, text))
    }
}

impl sealed::Sealed for Vec4 {}
impl Element for Vec4 {
    const TYPE: DatumType = DatumType::Vector;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::Vector(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::Vector(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::Vector(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::Vector(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::Vector(field)
    }
    fn to_text(&self) -> String {
        self.to_string()
    }
    fn from_text(text: &str) -> CoreResult<Self> {
        text.parse().map_err(|_| parse_failed(Self::TYPE, text))
    }
}

impl sealed::Sealed for Mat4 {}
impl Element for Mat4 {
    const TYPE: DatumType = DatumType::Matrix;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::Matrix(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::Matrix(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::Matrix(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::Matrix(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::Matrix(field)
    }
    fn to_text(&self) -> String {
        self.to_string()
    }
    fn from_text(text: &str) -> CoreResult<Self> {
        text.parse().map_err(|_| parse_failed(Self::TYPE, text))
    }
}

impl sealed::Sealed for String {}
impl Element for String {
    const TYPE: DatumType = DatumType::String;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::String(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::String(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::String(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::String(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::String(field)
    }
    fn to_text(&self) -> String {
        self.clone()
    }
    fn from_text(text: &str) -> CoreResult<Self> {
        Ok(text.to_string())
    }
}

impl sealed::Sealed for Opaque {}
impl Element for Opaque {
    const TYPE: DatumType = DatumType::Pointer;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::Pointer(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::Pointer(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::Pointer(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::Pointer(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::Pointer(field)
    }
    fn to_text(&self) -> String {
        format!("{self:?}")
    }
    fn from_text(_text: &str) -> CoreResult<Self> {
        Err(CoreError::NotRepresentable(Self::TYPE))
    }
}

impl sealed::Sealed for DatumRef {}
impl Element for DatumRef {
    const TYPE: DatumType = DatumType::Reference;

    fn owned(buffer: &Buffer) -> Option<&Vec<Self>> {
        match buffer {
            Buffer::Reference(v) => Some(v),
            _ => None,
        }
    }
    fn owned_mut(buffer: &mut Buffer) -> Option<&mut Vec<Self>> {
        match buffer {
            Buffer::Reference(v) => Some(v),
            _ => None,
        }
    }
    fn wrap_owned(values: Vec<Self>) -> Buffer {
        Buffer::Reference(values)
    }
    fn external(field: &ExternalField) -> Option<&Field<Self>> {
        match field {
            ExternalField::Reference(f) => Some(f),
            _ => None,
        }
    }
    fn wrap_external(field: Field<Self>) -> ExternalField {
        ExternalField::Reference(field)
    }
    fn to_text(&self) -> String {
        format!("ref({}, {})", self.scope, self.attribute)
    }
    fn from_text(_text: &str) -> CoreResult<Self> {
        Err(CoreError::NotRepresentable(Self::TYPE))
    }
}
