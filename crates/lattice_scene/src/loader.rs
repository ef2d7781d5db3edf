//! # Document Loader
//!
//! Populates a scope from a TOML scene document:
//! - scalars become one-element attributes
//! - arrays of scalars become one attribute holding every element
//! - tables and arrays of tables become nested scopes
//! - a table with a `class` key is built through the factory, so its
//!   prescribed attributes exist before the table's keys are applied
//!
//! Attributes that already exist keep their kind: numbers are written into
//! integer or float stores, groups of 4 or 16 numbers into vector or matrix
//! stores, and strings go through the store's text parser. Loading is not
//! transactional; a failure leaves whatever was populated before it.
//!
//! ```toml
//! [[Sectors]]
//! class = "Sector"
//! Name = "Plains"
//!
//! [[Sectors.Entities]]
//! class = "Entity"
//! Name = "Hero"
//! Health = 100
//! Position = [[1.0, 2.0, 0.0, 1.0]]
//! ```

use lattice_core::{Datum, DatumType, ScopeId, TypeRegistry};
use toml::{Table, Value};

use crate::error::{SceneError, SceneResult};
use crate::factory::Factory;
use crate::node::SceneTree;

/// Key naming the class of a table.
pub const CLASS_KEY: &str = "class";

/// Walks parsed documents into a tree.
pub struct DocumentLoader<'a> {
    tree: &'a mut SceneTree,
    registry: &'a TypeRegistry,
    factory: &'a Factory,
}

impl<'a> DocumentLoader<'a> {
    /// Creates a loader writing into `tree`.
    pub fn new(tree: &'a mut SceneTree, registry: &'a TypeRegistry, factory: &'a Factory) -> Self {
        Self {
            tree,
            registry,
            factory,
        }
    }

    /// Parses `text` and populates `target` with it.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` for malformed TOML or values that cannot be
    /// stored, `UnknownClass`, or the tree's error.
    pub fn load_str(&mut self, target: ScopeId, text: &str) -> SceneResult<()> {
        let table = text
            .parse::<Table>()
            .map_err(|e| SceneError::InvalidDocument(format!("Failed to parse document: {e}")))?;
        self.load_table(target, &table)
    }

    /// Populates `target` from a parsed table.
    ///
    /// # Errors
    ///
    /// As [`load_str`](Self::load_str).
    pub fn load_table(&mut self, target: ScopeId, table: &Table) -> SceneResult<()> {
        self.populate(target, table, false)
    }

    fn populate(&mut self, target: ScopeId, table: &Table, classed: bool) -> SceneResult<()> {
        for (key, value) in table {
            if classed && key == CLASS_KEY {
                continue;
            }
            match value {
                Value::Table(child) => self.load_child(target, key, child)?,
                Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_table) => {
                    for item in items {
                        if let Value::Table(child) = item {
                            self.load_child(target, key, child)?;
                        }
                    }
                }
                Value::Array(items) => self.load_values(target, key, items)?,
                scalar => self.load_values(target, key, std::slice::from_ref(scalar))?,
            }
        }
        Ok(())
    }

    fn load_child(&mut self, target: ScopeId, key: &str, table: &Table) -> SceneResult<()> {
        let Some(class) = table.get(CLASS_KEY) else {
            let child = self.tree.append_scope(target, key)?;
            return self.populate(child, table, false);
        };
        let class = class.as_str().ok_or_else(|| {
            SceneError::InvalidDocument(format!("{key}.{CLASS_KEY} must be a string"))
        })?;

        let node = self.factory.create(class)?;
        let child = self.tree.create_attributed(self.registry, node)?;
        if let Err(error) = self.tree.adopt(target, child, key) {
            self.tree.destroy(child)?;
            return Err(error.into());
        }
        tracing::debug!("Loaded {} as {} in {}", class, child, key);
        self.populate(child, table, true)
    }

    fn load_values(&mut self, target: ScopeId, key: &str, items: &[Value]) -> SceneResult<()> {
        let datum = self.tree.append(target, key)?;
        if datum.datum_type() == DatumType::Unknown {
            datum.set_type(infer_kind(key, items)?)?;
        }
        write_values(datum, key, items)
    }
}

fn invalid(key: &str, reason: &str) -> SceneError {
    SceneError::InvalidDocument(format!("{key}: {reason}"))
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Integer(_) | Value::Float(_))
}

fn infer_kind(key: &str, items: &[Value]) -> SceneResult<DatumType> {
    if items.is_empty() {
        return Err(invalid(key, "cannot infer the kind of an empty array"));
    }
    if items.iter().all(|v| matches!(v, Value::Integer(_) | Value::Boolean(_))) {
        return Ok(DatumType::Integer);
    }
    if items.iter().all(is_number) {
        return Ok(DatumType::Float);
    }
    if items.iter().all(Value::is_str) {
        return Ok(DatumType::String);
    }
    let grouped = |n: usize| {
        items.iter().all(|v| {
            v.as_array()
                .is_some_and(|inner| inner.len() == n && inner.iter().all(is_number))
        })
    };
    if grouped(4) {
        return Ok(DatumType::Vector);
    }
    if grouped(16) {
        return Ok(DatumType::Matrix);
    }
    Err(invalid(key, "values must share one kind"))
}

fn scalar_text(key: &str, value: &Value) -> SceneResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        Value::Array(_) | Value::Table(_) => Err(invalid(key, "nested value where a scalar is expected")),
    }
}

fn joined(key: &str, values: &[Value]) -> SceneResult<String> {
    let parts = values
        .iter()
        .map(|v| scalar_text(key, v))
        .collect::<SceneResult<Vec<_>>>()?;
    Ok(parts.join(" "))
}

/// One text per element of the destination store.
fn element_texts(kind: DatumType, key: &str, items: &[Value]) -> SceneResult<Vec<String>> {
    let width = match kind {
        DatumType::Vector => 4,
        DatumType::Matrix => 16,
        _ => return items.iter().map(|v| scalar_text(key, v)).collect(),
    };
    if items.iter().all(is_number) {
        if items.len() % width != 0 {
            return Err(invalid(key, &format!("expected a multiple of {width} numbers")));
        }
        return items.chunks(width).map(|chunk| joined(key, chunk)).collect();
    }
    items
        .iter()
        .map(|item| match item {
            Value::Array(inner) => joined(key, inner),
            other => scalar_text(key, other),
        })
        .collect()
}

fn write_values(datum: &mut Datum, key: &str, items: &[Value]) -> SceneResult<()> {
    let texts = element_texts(datum.datum_type(), key, items)?;
    for (index, text) in texts.iter().enumerate() {
        if index < datum.len() {
            datum.set_from_string(index, text)?;
        } else {
            datum.push_from_string(text)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::Vec4;

    fn values(text: &str) -> Vec<Value> {
        let table = text.parse::<Table>().unwrap();
        match table.get("v").unwrap() {
            Value::Array(items) => items.clone(),
            scalar => vec![scalar.clone()],
        }
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(infer_kind("v", &values("v = [1, 2, true]")), Ok(DatumType::Integer));
        assert_eq!(infer_kind("v", &values("v = [1, 2.5]")), Ok(DatumType::Float));
        assert_eq!(infer_kind("v", &values("v = 'x'")), Ok(DatumType::String));
        assert_eq!(
            infer_kind("v", &values("v = [[1, 2, 3, 4], [5, 6, 7, 8]]")),
            Ok(DatumType::Vector)
        );
        assert!(infer_kind("v", &values("v = [1, 'x']")).is_err());
        assert!(infer_kind("v", &[]).is_err());
    }

    #[test]
    fn test_vector_store_takes_flat_numbers() {
        let mut datum = Datum::with_type(DatumType::Vector);
        write_values(&mut datum, "v", &values("v = [1, 2, 3, 4, 5, 6, 7, 8]")).unwrap();
        assert_eq!(datum.len(), 2);
        assert_eq!(datum.get::<Vec4>(1).unwrap(), Vec4::new(5.0, 6.0, 7.0, 8.0));

        let mut datum = Datum::with_type(DatumType::Vector);
        assert!(write_values(&mut datum, "v", &values("v = [1, 2, 3]")).is_err());
    }

    #[test]
    fn test_existing_elements_are_overwritten() {
        let mut datum = Datum::from_values(vec![7, 8]);
        write_values(&mut datum, "v", &values("v = [1, 2, 3]")).unwrap();
        assert_eq!(datum.values::<i32>().unwrap(), vec![1, 2, 3]);
    }
}
