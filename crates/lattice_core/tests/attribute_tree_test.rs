//! Integration tests for the datum, scope and reflection laws.

use lattice_core::{
    CoreError, Datum, DatumRef, DatumType, ErrorKind, ExternalField, Field, FieldId, Host, Mat4,
    Opaque, Reflect, Registered, ScopeId, ScopeTree, Signature, Tree, TypeKey, TypeRegistry, Vec4,
    ROOT_TYPE,
};

fn sample(kind: DatumType) -> Datum {
    match kind {
        DatumType::Integer => Datum::from(1),
        DatumType::Float => Datum::from(1.0_f32),
        DatumType::Vector => Datum::from(Vec4::ZERO),
        DatumType::Matrix => Datum::from(Mat4::IDENTITY),
        DatumType::String => Datum::from("one"),
        DatumType::Pointer => Datum::from(Opaque::null()),
        DatumType::Reference => Datum::from(DatumRef::default()),
        DatumType::Scope | DatumType::Unknown => Datum::new(),
    }
}

fn push_as(datum: &mut Datum, kind: DatumType) -> Result<(), CoreError> {
    match kind {
        DatumType::Integer => datum.push_back(2),
        DatumType::Float => datum.push_back(2.0_f32),
        DatumType::Vector => datum.push_back(Vec4::new(1.0, 1.0, 1.0, 1.0)),
        DatumType::Matrix => datum.push_back(Mat4::IDENTITY),
        DatumType::String => datum.push_back(String::from("two")),
        DatumType::Pointer => datum.push_back(Opaque::new(2_u32)),
        DatumType::Reference => datum.push_back(DatumRef::new(ScopeId::new(0, 0), "x")),
        DatumType::Scope | DatumType::Unknown => Ok(()),
    }
}

const VALUE_KINDS: [DatumType; 7] = [
    DatumType::Integer,
    DatumType::Float,
    DatumType::Vector,
    DatumType::Matrix,
    DatumType::String,
    DatumType::Pointer,
    DatumType::Reference,
];

#[test]
fn test_kind_lock_law() {
    for first in VALUE_KINDS {
        for second in VALUE_KINDS {
            let mut datum = sample(first);
            let result = push_as(&mut datum, second);
            if first == second {
                assert!(result.is_ok(), "{first:?} accepts its own kind");
                assert_eq!(datum.len(), 2);
            } else {
                let error = result.unwrap_err();
                assert_eq!(error.kind(), ErrorKind::TypeMismatch);
                assert_eq!(datum.len(), 1);
            }
            assert_eq!(datum.datum_type(), first);
        }
    }
}

#[test]
fn test_external_capacity_law() {
    for n in 1..=6 {
        let host = Field::from_vec((0..n).collect::<Vec<i32>>());
        let mut datum = Datum::new();
        datum.set_storage(&host).unwrap();

        let error = datum.push_back(99).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CapacityViolation);
        assert_eq!(datum.capacity(), n as usize);
        assert_eq!(datum.len(), n as usize);
        assert!(datum.resize(n as usize + 1).is_err());
        assert_eq!(datum.capacity(), n as usize);
    }
}

#[test]
fn test_reserve_growth_law() {
    for capacity in 0..64_usize {
        let mut datum = Datum::with_type(DatumType::Float);
        if capacity > 0 {
            datum.reserve(capacity).unwrap();
        }
        for _ in 0..capacity {
            datum.push_back(0.5_f32).unwrap();
        }
        assert_eq!(datum.capacity(), capacity);

        datum.push_back(0.5_f32).unwrap();
        let expected = (capacity * 3 / 2).max(capacity + 1);
        assert_eq!(datum.capacity(), expected, "growth from {capacity}");
    }
}

#[test]
fn test_cycle_law_for_deep_chains() {
    let mut tree = ScopeTree::new();
    let mut chain = vec![tree.create()];
    for _ in 0..4 {
        let last = *chain.last().unwrap();
        chain.push(tree.append_scope(last, "Children").unwrap());
    }

    for (i, &ancestor) in chain.iter().enumerate() {
        for &descendant in &chain[i..] {
            let result = tree.adopt(descendant, ancestor, "Loop");
            assert_eq!(
                result,
                Err(CoreError::CycleDetected {
                    parent: descendant,
                    child: ancestor
                })
            );
        }
    }
    for pair in chain.windows(2) {
        assert_eq!(tree.parent(pair[1]), Some(pair[0]));
    }

    // Moving a deep node up is fine.
    tree.adopt(chain[0], chain[4], "Lifted").unwrap();
    assert_eq!(tree.parent(chain[4]), Some(chain[0]));
}

#[derive(Clone)]
struct Sensor {
    position: Field<Vec4>,
    samples: Field<f32>,
}

impl Sensor {
    const POSITION: FieldId = 0;
    const SAMPLES: FieldId = 1;
}

impl Reflect for Sensor {
    fn type_key(&self) -> TypeKey {
        Self::TYPE
    }

    fn field(&self, id: FieldId) -> Option<ExternalField> {
        match id {
            Self::POSITION => Some(self.position.external()),
            Self::SAMPLES => Some(self.samples.external()),
            _ => None,
        }
    }
}

impl Host for Sensor {
    fn duplicate(&self) -> Box<Self> {
        Box::new(self.clone())
    }
}

impl Registered for Sensor {
    const TYPE: TypeKey = "Sensor";

    fn signatures() -> Vec<Signature> {
        vec![
            Signature::external("Position", DatumType::Vector, 1, Self::POSITION),
            Signature::external("Samples", DatumType::Float, 3, Self::SAMPLES),
        ]
    }
}

#[test]
fn test_single_owner_law_for_copied_stores() {
    let mut tree = ScopeTree::new();
    let a = tree.create();
    let b = tree.create();
    let kid = tree.append_scope(a, "Kids").unwrap();
    let extra = tree.append_scope(a, "More").unwrap();

    // A copied store carries the kind, never the handles.
    let kids = tree.get(a).unwrap().find("Kids").unwrap().clone();
    assert_eq!(kids.datum_type(), DatumType::Scope);
    assert!(kids.scopes().is_empty());
    *tree.scope_mut(b).unwrap().append("Kids").unwrap() = kids;
    assert!(tree.get(b).unwrap().find("Kids").unwrap().scopes().is_empty());

    // Stores that hold scopes are not writable through the public surface.
    let mut scope = tree.scope_mut(a).unwrap();
    assert!(scope.find_mut("More").is_none());
    assert_eq!(scope.append("More").unwrap_err(), CoreError::ScopeStore);
    let more = scope.position("More").unwrap();
    assert_eq!(scope.at_mut(more).unwrap_err(), CoreError::ScopeStore);
    assert_eq!(tree.append(a, "Kids").unwrap_err(), CoreError::ScopeStore);
    assert!(tree.search_mut(a, "Kids").is_none());

    tree.destroy(b).unwrap();
    assert_eq!(tree.parent(kid), Some(a));
    assert_eq!(tree.parent(extra), Some(a));

    tree.destroy(a).unwrap();
    assert!(!tree.contains(kid));
    assert!(!tree.contains(extra));
    assert!(tree.is_empty());
}

#[test]
fn test_copy_realiasing_law() {
    let mut registry = TypeRegistry::new();
    registry.register_type::<Sensor>().unwrap();

    let mut tree: Tree<Sensor> = Tree::new();
    let holder = tree.create();
    let source = tree
        .create_attributed(
            &registry,
            Box::new(Sensor {
                position: Field::new(Vec4::ZERO),
                samples: Field::from_vec(vec![1.0, 2.0, 3.0]),
            }),
        )
        .unwrap();
    tree.adopt(holder, source, "Sensors").unwrap();

    let holder_copy = tree.clone_scope(holder).unwrap();
    let copy = tree.children(holder_copy).unwrap()[0];
    assert!(tree.scopes_equal(holder, holder_copy));

    let moved = Vec4::new(4.0, 5.0, 6.0, 1.0);
    let mut scope = tree.scope_mut(copy).unwrap();
    scope.find_mut("Position").unwrap().set(0, moved).unwrap();
    scope.find_mut("Samples").unwrap().set(2, 9.0_f32).unwrap();

    let copied_host = tree.host(copy).unwrap();
    assert_eq!(copied_host.position.get(), moved);
    assert_eq!(copied_host.samples.to_vec(), vec![1.0, 2.0, 9.0]);

    let source_host = tree.host(source).unwrap();
    assert_eq!(source_host.position.get(), Vec4::ZERO);
    assert_eq!(source_host.samples.to_vec(), vec![1.0, 2.0, 3.0]);
    assert!(!tree.scopes_equal(holder, holder_copy));
}

#[test]
fn test_scenario_append_existing_name() {
    let mut tree = ScopeTree::new();
    let id = tree.create_from([("Name", Datum::from("foo"))]).unwrap();

    let again = tree.append(id, "Name").unwrap();
    assert_eq!(again.get::<String>(0).unwrap(), "foo");
    assert_eq!(tree.scope(id).unwrap().len(), 1);
}

#[test]
fn test_scenario_append_scope_same_name() {
    let mut tree = ScopeTree::new();
    let root = tree.create();
    let first = tree.append_scope(root, "Children").unwrap();
    let second = tree.append_scope(root, "Children").unwrap();

    let scope = tree.scope(root).unwrap();
    assert_eq!(scope.len(), 1);
    let children = scope.find("Children").unwrap();
    assert_eq!(children.scopes(), &[first, second]);
}

#[test]
fn test_scenario_inherited_signatures() {
    let mut registry = TypeRegistry::new();
    registry
        .register("Base", ROOT_TYPE, vec![Signature::internal("id", DatumType::Integer, 1)])
        .unwrap();
    registry
        .register("Derived", "Base", vec![Signature::internal("tag", DatumType::String, 1)])
        .unwrap();

    let host = Box::new(KeyedSensor::derived());
    let mut keyed: Tree<KeyedSensor> = Tree::new();
    let id = keyed.create_attributed(&registry, host).unwrap();

    let names: Vec<_> = keyed.scope(id).unwrap().names().collect();
    assert_eq!(names, vec!["id", "tag"]);
    assert!(keyed.is_prescribed_attribute(&registry, id, "id"));
    assert!(keyed.is_prescribed_attribute(&registry, id, "tag"));
    assert!(!keyed.is_auxiliary_attribute(&registry, id, "other"));

    keyed.append(id, "other").unwrap();
    assert!(keyed.is_auxiliary_attribute(&registry, id, "other"));
}

struct KeyedSensor(TypeKey);

impl KeyedSensor {
    fn derived() -> Self {
        Self("Derived")
    }
}

impl Reflect for KeyedSensor {
    fn type_key(&self) -> TypeKey {
        self.0
    }

    fn field(&self, _id: FieldId) -> Option<ExternalField> {
        None
    }
}

impl Host for KeyedSensor {
    fn duplicate(&self) -> Box<Self> {
        Box::new(Self(self.0))
    }
}
