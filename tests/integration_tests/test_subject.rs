// integration tests for loading subject files

use editcond::conditions::{EditConditionParser, ErrorReporter, EvalContext};
use editcond::subject::{FieldType, Subject, SubjectContext};

use crate::common::{cleanup_test_dir, create_test_dir, write_file, ACTOR_SUBJECT};

#[test]
fn test_load_json_subject() {
    let test_dir = create_test_dir("subject_json");
    let path = write_file(&test_dir, "actor.json", ACTOR_SUBJECT);

    let subject = Subject::load(&path).expect("subject should load");
    assert_eq!(subject.name(), "MyActor");
    assert_eq!(subject.instance_count(), 1);
    assert_eq!(
        subject.field_type("Mode"),
        Some(&FieldType::Enum("EMode".to_string()))
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_load_json5_subject() {
    let test_dir = create_test_dir("subject_json5");
    let path = write_file(
        &test_dir,
        "actor.json5",
        r#"{
            // comments and trailing commas are fine here
            name: 'Selection',
            enums: { EMode: { Off: 0, On: 1 } },
            fields: { bVisible: 'bool', Mode: 'EMode', Count: 'int32' },
            instances: [
                { bVisible: true, Mode: 'On', Count: 2 },
                { bVisible: true, Mode: 'On', Count: 7 },
            ],
        }"#,
    );

    let subject = Subject::load(&path).expect("json5 subject should load");
    let ctx = SubjectContext::new(&subject);

    assert_eq!(ctx.bool_value("bVisible"), Some(true));
    assert_eq!(ctx.enum_value("Mode").as_deref(), Some("On"));
    // instances disagree
    assert_eq!(ctx.numeric_value("Count"), None);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_multi_selection_requires_agreement() {
    let subject = Subject::from_json_str(
        r#"{
            "name": "Selection",
            "fields": { "bA": "bool", "bB": "bool" },
            "instances": [
                { "bA": true, "bB": true },
                { "bA": true, "bB": false }
            ]
        }"#,
    )
    .unwrap();

    let parser = EditConditionParser::new();
    let reporter = ErrorReporter::new();
    let ctx = SubjectContext::new(&subject);

    let agreed = parser.parse("bA", &reporter).unwrap();
    assert!(parser.evaluate(&agreed, &ctx, &reporter).unwrap());

    let split = parser.parse("bB || bA", &reporter).unwrap();
    let err = parser.evaluate(&split, &ctx, &reporter).unwrap_err();
    assert_eq!(err.operand_name(), Some("bB"));
}

#[test]
fn test_string_object_identities_compare() {
    let subject = Subject::from_json_str(
        r#"{
            "name": "Links",
            "fields": { "Owner": "AActor*", "Parent": "AActor*", "Other": "AActor*" },
            "instances": [ { "Owner": "actor-a", "Parent": "actor-a", "Other": "actor-b" } ]
        }"#,
    )
    .unwrap();

    let parser = EditConditionParser::new();
    let reporter = ErrorReporter::new();
    let ctx = SubjectContext::new(&subject);

    for (source, expected) in [
        ("Owner == Parent", true),
        ("Owner != Other", true),
        ("Owner == nullptr", false),
    ] {
        let expr = parser.parse(source, &reporter).unwrap();
        assert_eq!(
            parser.evaluate(&expr, &ctx, &reporter).unwrap(),
            expected,
            "{}",
            source
        );
    }
}

#[test]
fn test_invalid_subject_files_are_rejected() {
    let test_dir = create_test_dir("subject_invalid");

    let unknown_type = write_file(
        &test_dir,
        "unknown_type.json",
        r#"{ "name": "S", "fields": { "Name": "string" } }"#,
    );
    let err = Subject::load(&unknown_type).unwrap_err();
    assert!(format!("{:#}", err).contains("unknown type 'string'"));

    let undeclared = write_file(
        &test_dir,
        "undeclared.json",
        r#"{ "name": "S", "fields": {}, "instances": [ { "bX": true } ] }"#,
    );
    let err = Subject::load(&undeclared).unwrap_err();
    assert!(format!("{:#}", err).contains("undeclared field 'bX'"));

    let wrong_value = write_file(
        &test_dir,
        "wrong_value.json",
        r#"{ "name": "S", "fields": { "bX": "bool" }, "instances": [ { "bX": 1 } ] }"#,
    );
    assert!(Subject::load(&wrong_value).is_err());

    assert!(Subject::load(&test_dir.join("missing.json")).is_err());

    cleanup_test_dir(&test_dir);
}
