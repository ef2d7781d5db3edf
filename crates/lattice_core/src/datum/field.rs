//! Host-owned value cells that a datum can alias.
//!
//! A native object keeps its reflected members in [`Field`]s. Binding a
//! datum to a field shares the cell, so writes through either side are
//! seen by the other. Cloning a field copies the values into a fresh cell;
//! only [`Field::alias`] shares.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use lattice_shared::{Mat4, Vec4};

use super::kind::{DatumRef, DatumType, Element, Opaque};

/// Fixed-length array of values shared between a host and its datums.
pub struct Field<T> {
    cells: Rc<RefCell<Box<[T]>>>,
}

impl<T> Field<T> {
    /// Creates a single-element field.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::from_vec(vec![value])
    }

    /// Creates a field from a list of values. The length never changes.
    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            cells: Rc::new(RefCell::new(values.into_boxed_slice())),
        }
    }

    /// Returns a second handle onto the same cells.
    #[must_use]
    pub fn alias(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }

    /// Checks whether two handles share cells.
    #[must_use]
    pub fn is_alias_of(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    /// Checks for a zero-length field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the first cell. Does nothing on an empty field.
    pub fn set(&self, value: T) {
        if let Some(slot) = self.cells.borrow_mut().first_mut() {
            *slot = value;
        }
    }

    /// Writes cell `index`, returning `false` when out of range.
    pub fn set_at(&self, index: usize, value: T) -> bool {
        match self.cells.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Box<[T]>> {
        self.cells.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, Box<[T]>> {
        self.cells.borrow_mut()
    }
}

impl<T: Clone + Default> Field<T> {
    /// Reads the first cell, or the default value for an empty field.
    #[must_use]
    pub fn get(&self) -> T {
        self.cells.borrow().first().cloned().unwrap_or_default()
    }

    /// Reads cell `index`.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<T> {
        self.cells.borrow().get(index).cloned()
    }

    /// Copies every cell out.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.cells.borrow().to_vec()
    }
}

impl<T: Element> Field<T> {
    /// Type-erased alias, ready to hand to [`Datum::set_external`](super::Datum::set_external).
    #[must_use]
    pub fn external(&self) -> ExternalField {
        T::wrap_external(self.alias())
    }
}

impl<T: Clone> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::new(RefCell::new(self.cells.borrow().clone())),
        }
    }
}

impl<T: Default> Default for Field<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: PartialEq> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells) || *self.cells.borrow() == *other.cells.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells.borrow().iter()).finish()
    }
}

/// A [`Field`] of any element kind. Cloning aliases the same cells.
pub enum ExternalField {
    /// Integer cells.
    Integer(Field<i32>),
    /// Float cells.
    Float(Field<f32>),
    /// Vector cells.
    Vector(Field<Vec4>),
    /// Matrix cells.
    Matrix(Field<Mat4>),
    /// String cells.
    String(Field<String>),
    /// Pointer cells.
    Pointer(Field<Opaque>),
    /// Reference cells.
    Reference(Field<DatumRef>),
}

impl ExternalField {
    /// Kind of the aliased cells.
    #[must_use]
    pub fn datum_type(&self) -> DatumType {
        match self {
            Self::Integer(_) => DatumType::Integer,
            Self::Float(_) => DatumType::Float,
            Self::Vector(_) => DatumType::Vector,
            Self::Matrix(_) => DatumType::Matrix,
            Self::String(_) => DatumType::String,
            Self::Pointer(_) => DatumType::Pointer,
            Self::Reference(_) => DatumType::Reference,
        }
    }

    /// Number of aliased cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(f) => f.len(),
            Self::Float(f) => f.len(),
            Self::Vector(f) => f.len(),
            Self::Matrix(f) => f.len(),
            Self::String(f) => f.len(),
            Self::Pointer(f) => f.len(),
            Self::Reference(f) => f.len(),
        }
    }

    /// Checks for a zero-length span.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether both handles share cells.
    #[must_use]
    pub fn is_alias_of(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.is_alias_of(b),
            (Self::Float(a), Self::Float(b)) => a.is_alias_of(b),
            (Self::Vector(a), Self::Vector(b)) => a.is_alias_of(b),
            (Self::Matrix(a), Self::Matrix(b)) => a.is_alias_of(b),
            (Self::String(a), Self::String(b)) => a.is_alias_of(b),
            (Self::Pointer(a), Self::Pointer(b)) => a.is_alias_of(b),
            (Self::Reference(a), Self::Reference(b)) => a.is_alias_of(b),
            _ => false,
        }
    }

    /// Resets cells `from..` to their default value.
    pub(crate) fn reset_from(&self, from: usize) {
        fn reset<T: Default>(field: &Field<T>, from: usize) {
            let mut cells = field.borrow_mut();
            for cell in cells.iter_mut().skip(from) {
                *cell = T::default();
            }
        }
        match self {
            Self::Integer(f) => reset(f, from),
            Self::Float(f) => reset(f, from),
            Self::Vector(f) => reset(f, from),
            Self::Matrix(f) => reset(f, from),
            Self::String(f) => reset(f, from),
            Self::Pointer(f) => reset(f, from),
            Self::Reference(f) => reset(f, from),
        }
    }

    /// Removes cell `index` by shifting `index+1..len` down one place.
    pub(crate) fn shift_out(&self, index: usize, len: usize) {
        fn shift<T: Default>(field: &Field<T>, index: usize, len: usize) {
            let mut cells = field.borrow_mut();
            cells[index..len].rotate_left(1);
            cells[len - 1] = T::default();
        }
        match self {
            Self::Integer(f) => shift(f, index, len),
            Self::Float(f) => shift(f, index, len),
            Self::Vector(f) => shift(f, index, len),
            Self::Matrix(f) => shift(f, index, len),
            Self::String(f) => shift(f, index, len),
            Self::Pointer(f) => shift(f, index, len),
            Self::Reference(f) => shift(f, index, len),
        }
    }
}

impl Clone for ExternalField {
    fn clone(&self) -> Self {
        match self {
            Self::Integer(f) => Self::Integer(f.alias()),
            Self::Float(f) => Self::Float(f.alias()),
            Self::Vector(f) => Self::Vector(f.alias()),
            Self::Matrix(f) => Self::Matrix(f.alias()),
            Self::String(f) => Self::String(f.alias()),
            Self::Pointer(f) => Self::Pointer(f.alias()),
            Self::Reference(f) => Self::Reference(f.alias()),
        }
    }
}

impl fmt::Debug for ExternalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Vector(v) => f.debug_tuple("Vector").field(v).finish(),
            Self::Matrix(v) => f.debug_tuple("Matrix").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Pointer(v) => f.debug_tuple("Pointer").field(v).finish(),
            Self::Reference(v) => f.debug_tuple("Reference").field(v).finish(),
        }
    }
}
