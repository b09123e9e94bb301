use indoc::indoc;

use crate::{DataType, DynamicSchema, Path, Schema, SchemaError};

const SCHEMA: &str = indoc! {r#"
    {
      "name": "user",
      "fields": [
        { "name": "userId", "type": "LONG" },
        { "name": "country", "type": "STRING" }
      ],
      "relations": [
        {
          "name": "sessions",
          "fields": [
            { "name": "start", "type": "DATETIME", "ordinal": true },
            { "name": "duration", "type": "LONG" }
          ],
          "relations": [
            {
              "name": "events",
              "fields": [
                { "name": "ts", "type": "DATETIME", "ordinal": true },
                { "name": "eventId", "type": "LONG" },
                { "name": "tags", "type": "STRING", "vector": true }
              ]
            }
          ]
        },
        {
          "name": "purchases",
          "fields": [
            { "name": "amount", "type": "DOUBLE" }
          ],
          "relations": [
            { "name": "events", "fields": [{ "name": "eventId", "type": "LONG" }] }
          ]
        }
      ]
    }
"#};

fn schema() -> DynamicSchema {
    DynamicSchema::from_json(SCHEMA).unwrap()
}

#[test]
fn resolves_absolute_names() {
    let path = schema().resolve("user.sessions.events.ts").unwrap();
    assert_eq!(path.dotted(), "user.sessions.events.ts");
    assert_eq!(path.dtype(), Some(DataType::Datetime));
}

#[test]
fn resolves_relation_prefixed_names() {
    let path = schema().resolve("sessions.duration").unwrap();
    assert_eq!(path.dotted(), "user.sessions.duration");
    let relation = schema().resolve("sessions").unwrap();
    assert!(relation.is_relation());
    assert_eq!(relation.dotted(), "user.sessions");
}

#[test]
fn resolves_root_relative_names() {
    let path = schema().resolve("country").unwrap();
    assert_eq!(path.dotted(), "user.country");
}

#[test]
fn ambiguous_relation_prefix() {
    let err = schema().resolve("events.eventId").unwrap_err();
    let SchemaError::AmbiguousPath { candidates, .. } = &err else {
        panic!("expected ambiguity, got {err:?}");
    };
    assert_eq!(
        candidates,
        &[
            "user.sessions.events.eventId".to_string(),
            "user.purchases.events.eventId".to_string()
        ]
    );
}

#[test]
fn prefix_match_narrows_ambiguity() {
    let path = schema().resolve("events.tags").unwrap();
    assert_eq!(path.dotted(), "user.sessions.events.tags");
    assert!(path.is_vector());
}

#[test]
fn unknown_name() {
    let err = schema().resolve("sessions.nope").unwrap_err();
    assert_eq!(err.to_string(), "unknown path `sessions.nope`");
}

#[test]
fn root_and_ordinals() {
    let schema = schema();
    assert_eq!(schema.root(), Path::relation(["user"]));
    let events = schema.resolve("user.sessions.events").unwrap();
    assert_eq!(
        schema.ordinal_field(&events).map(|p| p.dotted()),
        Some("user.sessions.events.ts".to_string())
    );
    let purchases = schema.resolve("purchases").unwrap();
    assert_eq!(schema.ordinal_field(&purchases), None);
    assert_eq!(schema.ordinal_field(&schema.root()), None);
}

#[test]
fn ordinal_lookup_accepts_field_paths() {
    let schema = schema();
    let duration = schema.resolve("sessions.duration").unwrap();
    assert_eq!(
        schema.ordinal_field(&duration).map(|p| p.dotted()),
        Some("user.sessions.start".to_string())
    );
}

#[test]
fn known_paths_in_declaration_order() {
    let known = schema().known_paths();
    assert_eq!(&known[..3], &["user", "user.userId", "user.country"]);
    assert!(known.contains(&"user.purchases.events.eventId".to_string()));
}

#[test]
fn rejects_duplicate_members() {
    let err = DynamicSchema::from_json(
        r#"{"name":"u","fields":[{"name":"a","type":"LONG"}],"relations":[{"name":"a"}]}"#,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "invalid schema: `u` declares `a` more than once");
}

#[test]
fn rejects_bad_ordinal() {
    let err = DynamicSchema::from_json(
        r#"{"name":"u","fields":[{"name":"t","type":"STRING","ordinal":true}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidSchema(_)));
}

#[test]
fn rejects_malformed_json() {
    let err = DynamicSchema::from_json("{").unwrap_err();
    assert!(matches!(err, SchemaError::Json(_)));
}
