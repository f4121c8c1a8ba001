// Integration tests for docfilter: parse a call, translate it through the registry,
// and check the resulting filter fragment.

use docfilter::*;
use proptest::prelude::*;

fn make_schema() -> DocumentSchema {
    DocumentSchemaBuilder::new()
        .field("Name", FieldType::Text)
        .field("Age", FieldType::Int)
        .field("Tags", FieldType::array_of(FieldType::Text))
        .field("Scores", FieldType::array_of(FieldType::Int))
        .field("Address.City", FieldType::Text)
        .build()
}

fn make_mapping() -> JsonbMapping {
    JsonbMapping::new(make_schema(), MappingConfig::default())
}

fn translate(src: &str) -> Result<FilterFragment, TranslateError> {
    let node = CallParser::parse(src, &make_schema()).expect("parse");
    default_registry().translate(&make_mapping(), &JsonSerializer, &node)
}

fn text_call(field: &str, method: &str, value: &str) -> CallExpr {
    CallExpr::new(
        MemberAccess::new([field], FieldType::Text),
        method,
        vec![Expr::Literal(LiteralValue::from(value))],
    )
}

#[test]
fn test_name_contains_smith() {
    let fragment = translate(r#"Name.Contains("smith")"#).unwrap();
    assert_eq!(fragment.template(), "d.data ->> 'Name' LIKE ?");
    assert_eq!(fragment.arguments(), &[SqlParam::Text("%smith%".into())]);
}

#[test]
fn test_name_starts_with_sm() {
    let fragment = translate(r#"Name.StartsWith("Sm")"#).unwrap();
    assert_eq!(fragment.template(), "d.data ->> 'Name' LIKE ?");
    assert_eq!(fragment.arguments(), &[SqlParam::Text("Sm%".into())]);
}

#[test]
fn test_tags_contains_blue() {
    let fragment = translate(r#"Tags.Contains("blue")"#).unwrap();
    assert_eq!(fragment.template(), "d.data -> 'Tags' @> ?");
    let expected = JsonSerializer
        .encode(&LiteralValue::Array(vec![LiteralValue::from("blue")]))
        .unwrap();
    assert_eq!(fragment.arguments(), &[SqlParam::Json(expected)]);
}

#[test]
fn test_equals_ignore_case_is_unrecognized() {
    let err = translate(r#"Name.EqualsIgnoreCase("X")"#).unwrap_err();
    match &err {
        TranslateError::UnrecognizedExpression { method, receiver } => {
            assert_eq!(method, "EqualsIgnoreCase");
            assert_eq!(receiver, "text");
        }
        other => panic!("Expected UnrecognizedExpression, got {:?}", other),
    }
    assert!(err.to_string().contains("EqualsIgnoreCase"));
}

#[test]
fn test_nested_field_ends_with() {
    let fragment = translate(r#"Address.City.EndsWith("ville")"#).unwrap();
    assert_eq!(fragment.template(), "d.data -> 'Address' ->> 'City' LIKE ?");
    assert_eq!(fragment.arguments(), &[SqlParam::Text("%ville".into())]);
}

#[test]
fn test_int_array_contains() {
    let fragment = translate("Scores.Contains(90)").unwrap();
    assert_eq!(fragment.template(), "d.data -> 'Scores' @> ?");
    assert_eq!(fragment.arguments(), &[SqlParam::Json("[90]".into())]);
}

#[test]
fn test_camel_case_mapping() {
    let config = MappingConfig::from_json(r#"{"casing": "camel_case"}"#).unwrap();
    let mapping = JsonbMapping::new(make_schema(), config);
    let node = CallParser::parse(r#"Tags.Contains("blue")"#, &make_schema()).unwrap();
    let fragment = default_registry().translate(&mapping, &JsonSerializer, &node).unwrap();
    assert_eq!(fragment.template(), "d.data -> 'tags' @> ?");
}

#[test]
fn test_unknown_field_is_a_resolution_error() {
    let err = translate(r#"Nickname.Contains("x")"#).unwrap_err();
    // Nickname types as unknown, so no built-in even matches.
    assert!(matches!(err, TranslateError::UnrecognizedExpression { ref receiver, .. } if receiver == "unknown"));

    let node = text_call("Nickname", "Contains", "x");
    let err = default_registry()
        .translate(&make_mapping(), &JsonSerializer, &node)
        .unwrap_err();
    assert!(matches!(err, TranslateError::Resolution(ResolutionError::UnknownField(_))));
}

#[test]
fn test_member_argument_is_unsupported() {
    let err = translate("Name.Contains(Address.City)").unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedShape(_)));
}

#[test]
fn test_null_pattern_is_unsupported() {
    let err = translate("Name.EndsWith(null)").unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedShape(_)));
}

#[test]
fn test_fragments_compose_into_one_filter() {
    let parts = vec![
        translate(r#"Name.StartsWith("Sm")"#).unwrap(),
        translate(r#"Tags.Contains("blue")"#).unwrap(),
        translate("Scores.Contains(1)").unwrap(),
    ];
    let combined = FilterFragment::and_all(parts);
    let mut sql = String::new();
    let next = combined.write_sql(&mut sql, 1);
    assert_eq!(
        sql,
        "(d.data ->> 'Name' LIKE $1) AND (d.data -> 'Tags' @> $2) AND (d.data -> 'Scores' @> $3)"
    );
    assert_eq!(next, 4);
    assert_eq!(combined.arguments().len(), 3);
}

#[test]
fn test_concurrent_translation() {
    let mapping = make_mapping();
    let node = text_call("Name", "Contains", "smith");
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    let fragment = default_registry()
                        .translate(&mapping, &JsonSerializer, &node)
                        .unwrap();
                    assert_eq!(fragment.arguments(), &[SqlParam::Text("%smith%".into())]);
                }
            });
        }
    });
}

#[test]
fn test_enumerable_matcher_receiver_types() {
    let matcher = EnumerableContains::new();
    let call_on = |ty: FieldType| {
        CallExpr::new(
            MemberAccess::new(["F"], ty),
            CONTAINS,
            vec![Expr::Literal(LiteralValue::Int(1))],
        )
    };
    assert!(matcher.matches(&call_on(FieldType::array_of(FieldType::Int))));
    assert!(matcher.matches(&call_on(FieldType::array_of(FieldType::Text))));
    assert!(!matcher.matches(&call_on(FieldType::Text)));
}

fn arb_field() -> impl Strategy<Value = (&'static str, FieldType)> {
    prop_oneof![
        Just(("Name", FieldType::Text)),
        Just(("Age", FieldType::Int)),
        Just(("Tags", FieldType::array_of(FieldType::Text))),
        Just(("Scores", FieldType::array_of(FieldType::Int))),
        Just(("Nickname", FieldType::Unknown)),
    ]
}

fn arb_method() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Contains"),
        Just("StartsWith"),
        Just("EndsWith"),
        Just("EqualsIgnoreCase"),
        Just("ToUpper"),
    ]
}

fn arb_arg() -> impl Strategy<Value = Expr> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(|s| Expr::Literal(LiteralValue::Text(s))),
        any::<i64>().prop_map(|i| Expr::Literal(LiteralValue::Int(i))),
        Just(Expr::Literal(LiteralValue::Null)),
        Just(Expr::Member(MemberAccess::new(["Name"], FieldType::Text))),
    ]
}

fn arb_node() -> impl Strategy<Value = CallExpr> {
    (
        proptest::option::weighted(0.9, arb_field()),
        arb_method(),
        proptest::collection::vec(arb_arg(), 0..3),
    )
        .prop_map(|(field, method, args)| match field {
            Some((name, ty)) => CallExpr::new(MemberAccess::new([name], ty), method, args),
            None => CallExpr::without_receiver(method, args),
        })
}

proptest! {
    #[test]
    fn like_patterns_wrap_plain_values(v in "[a-zA-Z0-9 ]{0,32}") {
        let mapping = make_mapping();
        let reg = default_registry();
        let contains = reg.translate(&mapping, &JsonSerializer, &text_call("Name", "Contains", &v)).unwrap();
        let starts = reg.translate(&mapping, &JsonSerializer, &text_call("Name", "StartsWith", &v)).unwrap();
        let ends = reg.translate(&mapping, &JsonSerializer, &text_call("Name", "EndsWith", &v)).unwrap();
        prop_assert_eq!(contains.arguments(), &[SqlParam::Text(format!("%{}%", v))]);
        prop_assert_eq!(starts.arguments(), &[SqlParam::Text(format!("{}%", v))]);
        prop_assert_eq!(ends.arguments(), &[SqlParam::Text(format!("%{}", v))]);
    }
}

proptest! {
    #[test]
    fn placeholders_match_arguments(v in ".{0,32}", method in arb_method(), array in any::<bool>()) {
        let (field, ty) = if array {
            ("Tags", FieldType::array_of(FieldType::Text))
        } else {
            ("Name", FieldType::Text)
        };
        let node = CallExpr::new(
            MemberAccess::new([field], ty),
            method,
            vec![Expr::Literal(LiteralValue::Text(v))],
        );
        if let Ok(fragment) = default_registry().translate(&make_mapping(), &JsonSerializer, &node) {
            prop_assert_eq!(placeholder_count(fragment.template()), fragment.arguments().len());
        }
    }
}

proptest! {
    #[test]
    fn serializer_is_deterministic(i in any::<i64>(), s in ".{0,16}") {
        let value = LiteralValue::Array(vec![LiteralValue::Int(i), LiteralValue::Text(s)]);
        prop_assert_eq!(JsonSerializer.encode(&value).unwrap(), JsonSerializer.encode(&value).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]
    #[test]
    fn registry_uses_first_match_or_reports_unrecognized(node in arb_node()) {
        let reg = TranslatorRegistry::with_builtins();
        let mapping = make_mapping();
        let builtins: Vec<Box<dyn CallTranslator>> = vec![
            Box::new(StringContains::new()),
            Box::new(StringStartsWith::new()),
            Box::new(StringEndsWith::new()),
            Box::new(EnumerableContains::new()),
        ];
        let result = reg.translate(&mapping, &JsonSerializer, &node);
        match builtins.iter().find(|t| t.matches(&node)) {
            Some(first) => {
                let direct = first.translate(&mapping, &JsonSerializer, &node);
                prop_assert!(!matches!(result, Err(TranslateError::UnrecognizedExpression { .. })), "matching translator exists but registry reported unrecognized");
                prop_assert_eq!(format!("{:?}", result), format!("{:?}", direct));
            }
            None => {
                let is_unrecognized = matches!(
                    result,
                    Err(TranslateError::UnrecognizedExpression { ref method, .. }) if *method == node.method
                );
                prop_assert!(is_unrecognized);
            }
        }
    }
}

proptest! {
    #[test]
    fn parser_does_not_panic_on_random_input(s in ".{0,128}") {
        let _ = CallParser::parse(&s, &make_schema());
    }
}
