//! Schema unit tests: syntax (parse success/failure) and semantics
//! (resolution, reference handling, the embedded sum schema).

use sumwire::{parse, sum_descriptors, DescriptorPool, FieldKind};

// ==================== Syntax: valid schemas ====================

#[test]
fn parse_empty_schema() {
    let schema = parse("").expect("empty schema can parse");
    assert!(schema.package.is_none());
    assert!(schema.messages.is_empty());
}

#[test]
fn parse_minimal_message() {
    let src = r#"
message M {
	bool x = 1;
}
"#;
    let schema = parse(src).expect("parse");
    assert_eq!(schema.messages.len(), 1);
    assert_eq!(schema.messages[0].name, "M");
    assert_eq!(schema.messages[0].fields.len(), 1);
    assert_eq!(schema.messages[0].fields[0].name, "x");
    assert_eq!(schema.messages[0].fields[0].number, 1);
}

#[test]
fn parse_all_scalar_types() {
    let src = r#"
message AllScalar {
	double a = 1;
	float b = 2;
	int32 c = 3;
	int64 d = 4;
	uint32 e = 5;
	uint64 f = 6;
	bool g = 7;
	string h = 8;
	bytes i = 9;
}
"#;
    let schema = parse(src).expect("parse");
    assert_eq!(schema.messages[0].fields.len(), 9);
}

#[test]
fn parse_labels_and_references() {
    let src = r#"
message Outer {
	repeated Inner items = 1;
	optional string note = 2;
	.pkg.Other qualified = 3;
}
message Inner {
	uint64 id = 1;
}
"#;
    let schema = parse(src).expect("parse");
    let outer = &schema.messages[0];
    assert!(outer.fields[0].repeated);
    assert!(!outer.fields[1].repeated, "optional is singular");
    assert_eq!(outer.fields[2].type_name, ".pkg.Other");
}

#[test]
fn parse_header_declarations() {
    let src = r#"
syntax = "proto3";

package sum;

import "proto/data.proto";

message M {
	bool x = 1;
}
"#;
    let schema = parse(src).expect("parse");
    assert_eq!(schema.package.as_deref(), Some("sum"));
    assert_eq!(schema.imports, vec!["proto/data.proto".to_string()]);
}

#[test]
fn parse_reserved_statements() {
    let src = r#"
message M {
	reserved 2 to 4, 6;
	bool x = 1;
}
"#;
    let schema = parse(src).expect("parse");
    assert_eq!(schema.messages[0].reserved, vec![(2, 4), (6, 6)]);
}

#[test]
fn parse_with_comments() {
    let src = r#"
// header comment
message M {
	bool x = 1; // trailing
	/* block */ string y = 2;
}
"#;
    let schema = parse(src).expect("parse");
    assert_eq!(schema.messages[0].fields.len(), 2);
}

// ==================== Syntax: rejected ====================

#[test]
fn parse_rejects_missing_semicolon() {
    assert!(parse("message M {\n\tbool x = 1\n}\n").is_err());
}

#[test]
fn parse_rejects_unsupported_constructs() {
    assert!(parse("enum E {\n\tA = 0;\n}\n").is_err());
    assert!(parse("message M {\n\tmap<string, string> m = 1;\n}\n").is_err());
}

#[test]
fn parse_rejects_non_proto3_syntax() {
    let err = parse("syntax = \"proto2\";\n").expect_err("proto2 rejected");
    assert!(err.contains("proto2"));
}

// ==================== Resolution ====================

fn resolve(src: &str) -> Result<DescriptorPool, String> {
    DescriptorPool::resolve(parse(src).expect("parse"))
}

#[test]
fn resolve_rejects_duplicate_field_number() {
    let err = resolve("message M {\n\tbool a = 1;\n\tbool b = 1;\n}\n").expect_err("dup");
    assert!(err.contains("duplicate field number"));
}

#[test]
fn resolve_rejects_duplicate_message_name() {
    let err = resolve("message M {\n}\nmessage M {\n}\n").expect_err("dup");
    assert!(err.contains("Duplicate message name"));
}

#[test]
fn resolve_rejects_bad_field_numbers() {
    assert!(resolve("message M {\n\tbool a = 0;\n}\n").is_err());
    assert!(resolve("message M {\n\tbool a = 536870912;\n}\n").is_err());
    assert!(resolve("message M {\n\tbool a = 19000;\n}\n").is_err());
}

#[test]
fn resolve_rejects_reserved_numbers() {
    let err =
        resolve("message M {\n\treserved 2 to 4;\n\tbool a = 3;\n}\n").expect_err("reserved");
    assert!(err.contains("reserved"));
}

#[test]
fn resolve_qualifies_internal_references() {
    let pool = resolve(
        "package p;\nmessage A {\n\tB b = 1;\n\tMissing m = 2;\n}\nmessage B {\n}\n",
    )
    .expect("resolve");
    let a = pool.get("p.A").expect("descriptor");
    assert_eq!(
        a.field("b").expect("field").kind,
        FieldKind::Message("p.B".to_string())
    );
    // unresolved references stay external
    assert_eq!(
        a.field("m").expect("field").kind,
        FieldKind::Message("Missing".to_string())
    );
}

#[test]
fn pool_lookup_accepts_short_names() {
    let pool = resolve("package p;\nmessage A {\n}\n").expect("resolve");
    assert!(pool.get("p.A").is_some());
    assert!(pool.get("A").is_some());
    assert!(pool.get("B").is_none());
}

// ==================== Embedded sum schema ====================

#[test]
fn sum_schema_resolves() {
    let pool = sum_descriptors();
    assert_eq!(pool.package(), Some("sum"));
    for name in [
        "sum.Record",
        "sum.NamedValue",
        "sum.Oracle",
        "sum.ById",
        "sum.ByName",
        "sum.ListRequest",
        "sum.RecordResponse",
        "sum.OracleResponse",
        "sum.FindResponse",
        "sum.RecordList",
        "sum.OracleList",
        "sum.ServerInfo",
        "sum.Empty",
        "sum.CallResponse",
    ] {
        assert!(pool.contains(name), "missing {}", name);
    }
}

#[test]
fn call_response_descriptor_matches_the_schema() {
    let desc = sum_descriptors().get("sum.CallResponse").expect("descriptor");
    let fields = desc.fields();
    assert_eq!(fields.len(), 3);

    assert_eq!(fields[0].name, "success");
    assert_eq!(fields[0].number, 1);
    assert_eq!(fields[0].kind, FieldKind::Bool);

    assert_eq!(fields[1].name, "msg");
    assert_eq!(fields[1].number, 2);
    assert_eq!(fields[1].kind, FieldKind::String);

    assert_eq!(fields[2].name, "data");
    assert_eq!(fields[2].number, 3);
    // Data is never defined by the schema: the reference stays external
    assert_eq!(fields[2].kind, FieldKind::Message("Data".to_string()));
    assert!(!sum_descriptors().contains("Data"));
}

#[test]
fn record_uses_repeated_fields() {
    let desc = sum_descriptors().get("sum.Record").expect("descriptor");
    let data = desc.field("data").expect("field");
    assert!(data.repeated);
    assert_eq!(data.kind, FieldKind::Float);
    let meta = desc.field("meta").expect("field");
    assert!(meta.repeated);
    assert_eq!(meta.kind, FieldKind::Message("sum.NamedValue".to_string()));
}

#[test]
fn sum_schema_lints_clean() {
    let schema = parse(include_str!("../proto/sum.proto")).expect("parse");
    let findings = sumwire::lint::lint(&schema);
    assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
}
