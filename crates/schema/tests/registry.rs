//! Registry construction, fast path and custom kinds.

use std::sync::Arc;

use nebula_schema::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn trimmed_kind() -> impl Kind {
    FnKind::leaf(
        |options: &Options, _: &Children, data: Option<&Value>, key: &str| match data {
            Some(Value::String(text)) => Ok(Outcome::Accepted(json!(text.trim()))),
            None if options.flag("opt", key)? => Ok(Outcome::Omitted),
            other => Err(ValidationError::type_mismatch(
                key.to_owned(),
                "Trimmed",
                type_name(other),
            )),
        },
    )
}

#[rstest]
#[case("Email", json!({}), "FastEmail")]
#[case("Email", json!({"opt": false}), "Email")]
#[case("String", json!({}), "String")]
fn fast_path_only_without_options(
    #[case] kind: &str,
    #[case] options: Value,
    #[case] expected: &str,
) {
    init_tracing();
    let schema = Registry::standard()
        .construct(kind, [Arg::try_from(options).unwrap()])
        .unwrap();
    assert_eq!(schema.name(), expected);
}

#[test]
fn fast_kind_is_registered_like_any_other() {
    let registry = Registry::standard();
    let fast = registry.constructor("FastEmail").unwrap();
    assert_eq!(fast.name(), "FastEmail");
    assert_eq!(
        fast.call([]).unwrap().validate(&json!("A@B.io")).unwrap(),
        json!("a@b.io")
    );
}

#[test]
fn custom_kind_in_a_tree() {
    init_tracing();
    let registry = Registry::standard().with_kind("Trimmed", trimmed_kind());

    let schema = registry
        .schema("Object")
        .fields([
            ("title", registry.schema("Trimmed")),
            ("subtitle", registry.schema("Trimmed").optional()),
        ])
        .build()
        .unwrap();

    assert_eq!(
        schema.validate(&json!({"title": "  hi  "})).unwrap(),
        json!({"title": "hi"})
    );
    let err = schema.validate(&json!({"title": 1})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error validating field schema.title: Got number, required Trimmed"
    );
}

#[test]
fn custom_fast_kind_takes_over() {
    let registry = Registry::standard()
        .to_builder()
        .register("Trimmed", trimmed_kind())
        .register("FastTrimmed", trimmed_kind())
        .build();

    assert_eq!(registry.construct("Trimmed", []).unwrap().name(), "FastTrimmed");
    assert_eq!(
        registry
            .schema("Trimmed")
            .optional()
            .build()
            .unwrap()
            .name(),
        "Trimmed"
    );
}

#[test]
fn custom_fast_prefix() {
    let registry = Registry::standard()
        .to_builder()
        .register("QuickEmail", nebula_schema::kinds::FastEmail)
        .config(RegistryConfig {
            fast_prefix: "Quick".into(),
            ..RegistryConfig::default()
        })
        .build();
    assert_eq!(registry.construct("Email", []).unwrap().name(), "QuickEmail");
}

#[test]
fn registries_are_independent() {
    let a = Registry::standard().with_kind("Trimmed", trimmed_kind());
    let b = a.with_kind("Other", trimmed_kind());

    assert!(b.contains("Trimmed"));
    assert!(!a.contains("Other"));
    assert!(!Registry::standard().contains("Trimmed"));
    assert_eq!(b.len(), a.len() + 1);
}

#[test]
fn list_kind_with_custom_logic() {
    // Accepts a pair whose elements match the two children in order.
    let pair = FnKind::new(
        ChildArity::List,
        |_: &Options, children: &Children, data: Option<&Value>, key: &str| {
            let (Children::List(parts), Some(Value::Array(items))) = (children, data) else {
                return Err(ValidationError::type_mismatch(
                    key.to_owned(),
                    "Pair",
                    type_name(data),
                ));
            };
            let mut out = Vec::new();
            for (index, (part, item)) in parts.iter().zip(items).enumerate() {
                let path = format!("{key}[{index}]");
                let value = part
                    .parse(Some(item), &path, false)
                    .map_err(|cause| ValidationError::element(path, cause))?;
                out.extend(value.into_value());
            }
            Ok(Outcome::Accepted(Value::Array(out)))
        },
    );
    let registry = Registry::standard().with_kind("Pair", pair);

    let schema = registry
        .schema("Pair")
        .items([string(), number()])
        .build()
        .unwrap();
    assert!(schema.validate(&json!(["a", 1])).is_ok());
    assert_eq!(
        schema.validate(&json!([1, "a"])).unwrap_err().to_string(),
        "Error validating element schema[0]: Got number, required String"
    );

    let err = registry
        .schema("Pair")
        .fields([("a", string())])
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "validator kind `Pair` takes list children, got map"
    );
}

#[test]
fn shared_kind_arc() {
    let kind: Arc<dyn Kind> = Arc::new(nebula_schema::kinds::Boolean);
    let registry = Registry::from_kinds([("Flag", Arc::clone(&kind)), ("Bool", kind)]);
    assert_eq!(registry.kind_names().collect::<Vec<_>>(), ["Flag", "Bool"]);
    assert!(registry.construct("Flag", []).unwrap().validate(&json!(true)).is_ok());
}

#[test]
fn registry_is_shareable_across_threads() {
    let schema = array().items([number()]).build().unwrap();
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let schema = schema.clone();
            std::thread::spawn(move || schema.validate(&json!([n, n + 1])).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
