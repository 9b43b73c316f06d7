use expect_test::expect;

use super::*;
use crate::types::{Allocation, MethodTy};

fn java_tables() -> ManglerTables {
    let mut tables = ManglerTables::new(PrimitiveRegistry::with_builtins());
    for (name, tag) in [
        ("boolean", "b"),
        ("byte", "c"),
        ("char", "w"),
        ("short", "s"),
        ("int", "i"),
        ("long", "x"),
        ("float", "f"),
        ("double", "d"),
    ] {
        let id = tables.primitives().lookup_by_name(name).unwrap();
        tables.set_primitive_type_name(id, tag).unwrap();
    }
    tables.add_name_substitution("<init>", "C1").unwrap();
    tables
}

fn prim(tables: &ManglerTables, name: &str) -> Ty {
    Ty::Primitive(tables.primitives().lookup_by_name(name).unwrap())
}

fn class(name: &str) -> ClassType {
    ClassType::new(name)
}

fn reference(name: &str) -> Ty {
    Ty::class_ref(class(name))
}

fn method(
    owner: &str,
    name: &str,
    allocation: Allocation,
    params: Vec<Ty>,
    result: Option<Ty>,
) -> Entity {
    let mut all_params = Vec::new();
    if allocation == Allocation::Instance {
        all_params.push(reference(owner));
    }
    all_params.extend(params);
    Entity::new(
        class(owner),
        name,
        Ty::Method(MethodTy::new(all_params, result)),
        allocation,
    )
}

fn put_declared_annotations(tables: &ManglerTables) -> Entity {
    let objects = Ty::array_of(reference("java/lang/Object"));
    method(
        "java/lang/ClassLoader",
        "putDeclaredAnnotations.(Ljava/lang/Class;III[Ljava/lang/Object;)[Ljava/lang/Object;",
        Allocation::Static,
        vec![
            reference("java/lang/Class"),
            prim(tables, "int"),
            prim(tables, "int"),
            prim(tables, "int"),
            objects.clone(),
        ],
        Some(objects),
    )
}

#[test]
fn golden_class_loader_method() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let symbol = mangler
        .mangle_entity_name(&put_declared_annotations(&tables))
        .unwrap();
    assert_eq!(
        symbol,
        "_ZN4java4lang11ClassLoader22putDeclaredAnnotationsEJP6JArrayIPNS0_6ObjectEEPNS0_5ClassEiiiS6_"
    );
    assert_eq!(
        mangler.session.fragments(),
        &[
            "java",
            "java/lang",
            "java/lang/ClassLoader",
            "JArray",
            "java/lang/Object",
            "Pjava/lang/Object",
            "JArray<Pjava/lang/Object>",
            "PJArray<Pjava/lang/Object>",
            "java/lang/Class",
            "Pjava/lang/Class",
        ]
    );
}

#[test]
fn repeated_calls_are_byte_identical() {
    let tables = java_tables();
    let entity = put_declared_annotations(&tables);
    let mut mangler = Mangler::new(&tables);
    let first = mangler.mangle_entity_name(&entity).unwrap();
    let vtable = mangler
        .mangle_vtable_name(&class("java/lang/Object"))
        .unwrap();
    let second = mangler.mangle_entity_name(&entity).unwrap();
    assert_eq!(first, second);
    assert!(first.ptr_eq(&second), "symbols are interned");
    assert_eq!(vtable, "_ZTVN4java4lang6ObjectE");
    assert_eq!(mangler.idents().len(), 2);
}

#[test]
fn fresh_owner_has_no_back_references() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let field = Entity::new(
        class("org/example/deep/Widget"),
        "count",
        prim(&tables, "int"),
        Allocation::Instance,
    );
    let symbol = mangler.mangle_entity_name(&field).unwrap();
    assert_eq!(symbol, "_ZN3org7example4deep6Widget5countE");
    assert!(!symbol.as_str().contains('S'));
}

#[test]
fn second_occurrence_of_a_class_is_shorter() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let entity = method(
        "java/util/Objects",
        "equals.(Ljava/lang/Object;Ljava/lang/Object;)Z",
        Allocation::Static,
        vec![reference("java/lang/Object"), reference("java/lang/Object")],
        Some(prim(&tables, "boolean")),
    );
    let symbol = mangler.mangle_entity_name(&entity).unwrap();
    assert_eq!(
        symbol,
        "_ZN4java4util7Objects6equalsEJbPNS_4lang6ObjectES4_"
    );
}

#[test]
fn pointer_to_owner_reuses_class_entry() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let entity = method(
        "java/lang/Object",
        "same.(Ljava/lang/Object;Ljava/lang/Object;)Z",
        Allocation::Instance,
        vec![reference("java/lang/Object"), reference("java/lang/Object")],
        Some(prim(&tables, "boolean")),
    );
    let symbol = mangler.mangle_entity_name(&entity).unwrap();
    // First pointer: `P` + class entry, second: the new pointer entry alone.
    assert_eq!(symbol, "_ZN4java4lang6Object4sameEJbPS1_S2_");
}

#[test]
fn repeated_array_type_is_one_substitution() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let ints = Ty::array_of(prim(&tables, "int"));
    let entity = method(
        "A",
        "copy.([I[I)V",
        Allocation::Static,
        vec![ints.clone(), ints],
        None,
    );
    let symbol = mangler.mangle_entity_name(&entity).unwrap();
    assert_eq!(symbol, "_ZN1A4copyEJvP6JArrayIiES2_");
}

#[test]
fn constructor_skips_return_type_and_uses_registered_spelling() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let init = method(
        "java/lang/Object",
        "<init>.()V",
        Allocation::Instance,
        vec![],
        None,
    );
    let symbol = mangler.mangle_entity_name(&init).unwrap();
    assert_eq!(symbol, "_ZN4java4lang6ObjectC1Ev");

    let init_with_args = method(
        "java/lang/String",
        "<init>.([C)V",
        Allocation::Instance,
        vec![Ty::array_of(prim(&tables, "char"))],
        None,
    );
    let symbol = mangler.mangle_entity_name(&init_with_args).unwrap();
    assert_eq!(symbol, "_ZN4java4lang6StringC1EP6JArrayIwE");
}

#[test]
fn static_method_keeps_first_parameter() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let abs = method(
        "java/lang/Math",
        "abs.(J)J",
        Allocation::Static,
        vec![prim(&tables, "long")],
        Some(prim(&tables, "long")),
    );
    assert_eq!(
        mangler.mangle_entity_name(&abs).unwrap(),
        "_ZN4java4lang4Math3absEJxx"
    );

    let hash_code = method(
        "java/lang/Object",
        "hashCode.()I",
        Allocation::Instance,
        vec![],
        Some(prim(&tables, "int")),
    );
    assert_eq!(
        mangler.mangle_entity_name(&hash_code).unwrap(),
        "_ZN4java4lang6Object8hashCodeEJiv"
    );
}

#[test]
fn global_owner_has_empty_qualification() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let main = Entity::new(
        ClassType::global(),
        "main",
        Ty::Method(MethodTy::new(
            vec![Ty::array_of(reference("java/lang/String"))],
            None,
        )),
        Allocation::Static,
    );
    assert_eq!(
        mangler.mangle_entity_name(&main).unwrap(),
        "_Z4mainEJvP6JArrayIPN4java4lang6StringEE"
    );
}

#[test]
fn vtable_requires_nested_name() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let err = mangler
        .mangle_vtable_name(&ClassType::global())
        .unwrap_err();
    assert_eq!(
        err.violation(),
        Some(&ContractViolation::VtableWithoutComposite {
            class: "<global>".into()
        })
    );
}

#[test]
fn contract_violation_does_not_poison_next_call() {
    let mut tables = ManglerTables::new(PrimitiveRegistry::with_builtins());
    let int = tables.primitives().lookup_by_name("int").unwrap();
    let mut mangler = Mangler::new(&tables);
    let field = Entity::new(class("a/B"), "x", Ty::Primitive(int), Allocation::Static);
    let getter = method("a/B", "get.()I", Allocation::Static, vec![], Some(Ty::Primitive(int)));
    let err = mangler.mangle_entity_name(&getter).unwrap_err();
    assert_eq!(
        err.violation(),
        Some(&ContractViolation::MissingPrimitiveTag {
            primitive: "int".into()
        })
    );
    // Fields never look at their type.
    assert_eq!(mangler.mangle_entity_name(&field).unwrap(), "_ZN1a1B1xE");
    assert_eq!(
        mangler.mangle_vtable_name(&class("a/B")).unwrap(),
        "_ZTVN1a1BE"
    );

    drop(mangler);
    tables.set_primitive_type_name(int, "i").unwrap();
    let mut mangler = Mangler::new(&tables);
    assert_eq!(
        mangler.mangle_entity_name(&getter).unwrap(),
        "_ZN1a1B3getEJiv"
    );
}

#[test]
fn duplicate_name_substitution_is_fatal() {
    let mut tables = java_tables();
    let err = tables.add_name_substitution("<init>", "C2").unwrap_err();
    assert_eq!(
        err,
        ContractViolation::DuplicateNameSubstitution {
            name: "<init>".into()
        }
    );
    assert_eq!(tables.name_substitution("<init>"), Some("C1"));
}

#[test]
fn substitution_registry_is_readable_from_tables() {
    let tables = java_tables();
    let subs = tables.substitutions();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs.get("<init>"), Some("C1"));
    assert_eq!(subs.get("<clinit>"), None);
}

#[test]
fn manglers_can_share_one_ident_table() {
    let tables = java_tables();
    let object = class("java/lang/Object");

    let mut first = Mangler::new(&tables);
    let vtable = first.mangle_vtable_name(&object).unwrap();
    let idents = first.into_idents();
    assert_eq!(idents.len(), 1);

    let mut second = Mangler::with_idents(&tables, idents);
    let again = second.mangle_vtable_name(&object).unwrap();
    assert!(again.ptr_eq(&vtable), "same symbol is interned once");
    assert_eq!(second.idents().len(), 1);

    second.mangle_vtable_name(&class("java/lang/String")).unwrap();
    assert_eq!(second.idents().len(), 2);
}

#[test]
fn conflicting_primitive_tag_is_rejected() {
    let mut tables = java_tables();
    let int = tables.primitives().lookup_by_name("int").unwrap();
    tables.set_primitive_type_name(int, "i").unwrap();
    let err = tables.set_primitive_type_name(int, "l").unwrap_err();
    assert_eq!(
        err,
        ContractViolation::ConflictingPrimitiveTag {
            primitive: "int".into(),
            existing: "i".into(),
            requested: "l".into(),
        }
    );
}

#[test]
fn overlong_class_name_overflows_compression_table() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let name = (0..40)
        .map(|index| format!("p{index}"))
        .collect::<Vec<_>>()
        .join("/");
    let err = mangler.mangle_vtable_name(&class(&name)).unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(ContractViolation::CompressionTableOverflow { capacity: 36, .. })
    ));
}

#[test]
fn symbol_listing_snapshot() {
    let tables = java_tables();
    let mut mangler = Mangler::new(&tables);
    let string = reference("java/lang/String");
    let entities = [
        Entity::new(
            class("java/lang/System"),
            "out",
            reference("java/io/PrintStream"),
            Allocation::Static,
        ),
        method(
            "java/lang/Object",
            "toString.()Ljava/lang/String;",
            Allocation::Instance,
            vec![],
            Some(string.clone()),
        ),
        method(
            "java/lang/String",
            "concat.(Ljava/lang/String;)Ljava/lang/String;",
            Allocation::Instance,
            vec![string.clone()],
            Some(string.clone()),
        ),
        method(
            "java/lang/String",
            "split.(Ljava/lang/String;)[Ljava/lang/String;",
            Allocation::Instance,
            vec![string.clone()],
            Some(Ty::array_of(string)),
        ),
    ];
    let mut listing = String::new();
    for entity in &entities {
        let symbol = mangler.mangle_entity_name(entity).unwrap();
        let _ = writeln!(listing, "{symbol}");
    }
    let vtable = mangler.mangle_vtable_name(&class("java/lang/String")).unwrap();
    let _ = writeln!(listing, "{vtable}");

    expect![[r#"
        _ZN4java4lang6System3outE
        _ZN4java4lang6Object8toStringEJPNS0_6StringEv
        _ZN4java4lang6String6concatEJPS1_S2_
        _ZN4java4lang6String5splitEJP6JArrayIPS1_ES3_
        _ZTVN4java4lang6StringE
    "#]]
    .assert_eq(&listing);
}
