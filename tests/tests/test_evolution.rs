// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use datum::{DatumReader, DatumWriter, Error, Field, Reader, Schema, SchemaRef, Value, Writer};
use serde_json::json;

fn encode(schema: &SchemaRef, value: &Value) -> Vec<u8> {
    let mut out = Writer::default();
    DatumWriter::new(schema.clone()).write(value, &mut out).unwrap();
    out.into_inner()
}

fn evolve(writer: &SchemaRef, reader: &SchemaRef, value: &Value) -> Result<Value, Error> {
    let bytes = encode(writer, value);
    let mut input = Reader::new(&bytes);
    let decoded = DatumReader::new(writer.clone(), reader.clone()).read(&mut input)?;
    assert_eq!(input.remaining(), 0);
    Ok(decoded)
}

#[test]
fn test_primitive_promotions() {
    let cases: Vec<(SchemaRef, Value, SchemaRef, Value)> = vec![
        (
            Schema::int().shared(),
            Value::Int(7),
            Schema::long().shared(),
            Value::Long(7),
        ),
        (
            Schema::int().shared(),
            Value::Int(-3),
            Schema::float().shared(),
            Value::Float(-3.0),
        ),
        (
            Schema::int().shared(),
            Value::Int(12),
            Schema::double().shared(),
            Value::Double(12.0),
        ),
        (
            Schema::long().shared(),
            Value::Long(1 << 40),
            Schema::float().shared(),
            Value::Float((1u64 << 40) as f32),
        ),
        (
            Schema::long().shared(),
            Value::Long(-9),
            Schema::double().shared(),
            Value::Double(-9.0),
        ),
        (
            Schema::float().shared(),
            Value::Float(2.5),
            Schema::double().shared(),
            Value::Double(2.5),
        ),
        (
            Schema::string().shared(),
            Value::String("abc".to_string()),
            Schema::bytes().shared(),
            Value::Bytes(b"abc".to_vec()),
        ),
        (
            Schema::bytes().shared(),
            Value::Bytes(b"abc".to_vec()),
            Schema::string().shared(),
            Value::String("abc".to_string()),
        ),
    ];
    for (writer, written, reader, expected) in &cases {
        assert_eq!(&evolve(writer, reader, written).unwrap(), expected);
    }
}

#[test]
fn test_promotions_do_not_run_backwards() {
    let err = evolve(
        &Schema::long().shared(),
        &Schema::int().shared(),
        &Value::Long(1),
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));

    let err = evolve(
        &Schema::double().shared(),
        &Schema::float().shared(),
        &Value::Double(1.0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));
}

#[test]
fn test_record_field_reordering() {
    let writer = Schema::record(
        "R",
        vec![
            Field::new("a", Schema::int().shared()),
            Field::new("b", Schema::string().shared()),
        ],
    )
    .unwrap()
    .shared();
    let reader = Schema::record(
        "R",
        vec![
            Field::new("b", Schema::string().shared()),
            Field::new("a", Schema::int().shared()),
        ],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::String("x".to_string())),
    ]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    // The result takes the reader's field order.
    assert_eq!(
        decoded,
        Value::Record(vec![
            ("b".to_string(), Value::String("x".to_string())),
            ("a".to_string(), Value::Int(1)),
        ])
    );
}

#[test]
fn test_reader_only_field_filled_from_default() {
    let writer = Schema::record("R", vec![Field::new("a", Schema::int().shared())])
        .unwrap()
        .shared();
    let reader = Schema::record(
        "R",
        vec![
            Field::new("a", Schema::int().shared()),
            Field::new("b", Schema::int().shared())
                .with_default(json!(42))
                .unwrap(),
        ],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![("a".to_string(), Value::Int(1))]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(42)),
        ])
    );
}

#[test]
fn test_reader_only_field_without_default_is_incompatible() {
    let writer = Schema::record("R", vec![Field::new("a", Schema::int().shared())])
        .unwrap()
        .shared();
    let reader = Schema::record(
        "R",
        vec![
            Field::new("a", Schema::int().shared()),
            Field::new("b", Schema::int().shared()),
        ],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![("a".to_string(), Value::Int(1))]);
    let err = evolve(&writer, &reader, &written).unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));
}

#[test]
fn test_writer_only_field_is_skipped() {
    let writer = Schema::record(
        "R",
        vec![
            Field::new("a", Schema::int().shared()),
            Field::new("junk", Schema::string().shared()),
            Field::new("b", Schema::long().shared()),
        ],
    )
    .unwrap()
    .shared();
    let reader = Schema::record(
        "R",
        vec![
            Field::new("a", Schema::int().shared()),
            Field::new("b", Schema::long().shared()),
        ],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![
        ("a".to_string(), Value::Int(1)),
        (
            "junk".to_string(),
            Value::String("long discarded payload".to_string()),
        ),
        ("b".to_string(), Value::Long(2)),
    ]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Long(2)),
        ])
    );
}

#[test]
fn test_reader_alias_matches_writer_name() {
    let writer = Schema::record("R", vec![Field::new("name", Schema::string().shared())])
        .unwrap()
        .shared();
    let reader = Schema::record(
        "R",
        vec![Field::new("full_name", Schema::string().shared()).with_alias("name")],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![(
        "name".to_string(),
        Value::String("ada".to_string()),
    )]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![(
            "full_name".to_string(),
            Value::String("ada".to_string()),
        )])
    );
}

#[test]
fn test_writer_alias_matches_reader_name() {
    let writer = Schema::record(
        "R",
        vec![Field::new("name", Schema::string().shared()).with_alias("full_name")],
    )
    .unwrap()
    .shared();
    let reader = Schema::record(
        "R",
        vec![Field::new("full_name", Schema::string().shared())],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![(
        "name".to_string(),
        Value::String("ada".to_string()),
    )]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![(
            "full_name".to_string(),
            Value::String("ada".to_string()),
        )])
    );
}

#[test]
fn test_exact_name_wins_over_alias() {
    // The reader has both a field named "a" and a field aliased to "a"; the
    // exact name takes the writer value, the alias falls back to its default.
    let writer = Schema::record("R", vec![Field::new("a", Schema::int().shared())])
        .unwrap()
        .shared();
    let reader = Schema::record(
        "R",
        vec![
            Field::new("renamed", Schema::int().shared())
                .with_alias("a")
                .with_default(json!(0))
                .unwrap(),
            Field::new("a", Schema::int().shared()),
        ],
    )
    .unwrap()
    .shared();
    let written = Value::Record(vec![("a".to_string(), Value::Int(9))]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![
            ("renamed".to_string(), Value::Int(0)),
            ("a".to_string(), Value::Int(9)),
        ])
    );
}

#[test]
fn test_enum_unknown_symbol_takes_reader_default() {
    let writer = Schema::enumeration(
        "Suit",
        vec!["HEARTS".into(), "SPADES".into(), "CLUBS".into()],
        None,
    )
    .unwrap()
    .shared();
    let reader = Schema::enumeration(
        "Suit",
        vec!["HEARTS".into(), "SPADES".into()],
        Some("HEARTS".into()),
    )
    .unwrap()
    .shared();
    let decoded = evolve(&writer, &reader, &Value::Enum("CLUBS".to_string())).unwrap();
    assert_eq!(decoded, Value::Enum("HEARTS".to_string()));
    // Known symbols still map through unchanged.
    let decoded = evolve(&writer, &reader, &Value::Enum("SPADES".to_string())).unwrap();
    assert_eq!(decoded, Value::Enum("SPADES".to_string()));
}

#[test]
fn test_enum_unknown_symbol_without_default_is_incompatible() {
    let writer = Schema::enumeration("E", vec!["A".into(), "B".into()], None)
        .unwrap()
        .shared();
    let reader = Schema::enumeration("E", vec!["A".into()], None)
        .unwrap()
        .shared();
    let err = evolve(&writer, &reader, &Value::Enum("A".to_string())).unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));
}

#[test]
fn test_fixed_size_mismatch() {
    let writer = Schema::fixed("F", 4).shared();
    let reader = Schema::fixed("F", 8).shared();
    let err = evolve(&writer, &reader, &Value::Fixed(vec![0; 4])).unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));

    // Names are not compared, only sizes.
    let reader = Schema::fixed("Renamed", 4).shared();
    let decoded = evolve(&writer, &reader, &Value::Fixed(vec![1, 2, 3, 4])).unwrap();
    assert_eq!(decoded, Value::Fixed(vec![1, 2, 3, 4]));
}

#[test]
fn test_non_union_writer_into_reader_union() {
    let writer = Schema::int().shared();
    let reader = Schema::union(vec![Schema::null().shared(), Schema::long().shared()])
        .unwrap()
        .shared();
    let decoded = evolve(&writer, &reader, &Value::Int(5)).unwrap();
    assert_eq!(decoded, Value::Long(5));
}

#[test]
fn test_writer_union_into_narrower_reader() {
    let writer = Schema::union(vec![Schema::null().shared(), Schema::int().shared()])
        .unwrap()
        .shared();
    let reader = Schema::long().shared();

    // The int branch promotes fine.
    let decoded = evolve(&writer, &reader, &Value::Int(5)).unwrap();
    assert_eq!(decoded, Value::Long(5));

    // The null branch is incompatible, but only surfaces when the data
    // actually carries it.
    let err = evolve(&writer, &reader, &Value::Null).unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));
}

#[test]
fn test_union_to_union_evolution() {
    let writer = Schema::union(vec![Schema::null().shared(), Schema::int().shared()])
        .unwrap()
        .shared();
    let reader = Schema::union(vec![
        Schema::string().shared(),
        Schema::long().shared(),
        Schema::null().shared(),
    ])
    .unwrap()
    .shared();
    assert_eq!(evolve(&writer, &reader, &Value::Int(5)).unwrap(), Value::Long(5));
    assert_eq!(evolve(&writer, &reader, &Value::Null).unwrap(), Value::Null);
}

#[test]
fn test_reader_union_first_match_wins() {
    // Both long and double can accept a written int; the first declared
    // branch takes it.
    let writer = Schema::int().shared();
    let reader = Schema::union(vec![Schema::double().shared(), Schema::long().shared()])
        .unwrap()
        .shared();
    let decoded = evolve(&writer, &reader, &Value::Int(3)).unwrap();
    assert_eq!(decoded, Value::Double(3.0));
}

#[test]
fn test_nested_record_evolution() {
    let inner_w = Schema::record("Inner", vec![Field::new("x", Schema::int().shared())])
        .unwrap()
        .shared();
    let inner_r = Schema::record(
        "Inner",
        vec![
            Field::new("x", Schema::long().shared()),
            Field::new("y", Schema::string().shared())
                .with_default(json!("none"))
                .unwrap(),
        ],
    )
    .unwrap()
    .shared();
    let writer = Schema::record("Outer", vec![Field::new("inner", inner_w)])
        .unwrap()
        .shared();
    let reader = Schema::record("Outer", vec![Field::new("inner", inner_r)])
        .unwrap()
        .shared();
    let written = Value::Record(vec![(
        "inner".to_string(),
        Value::Record(vec![("x".to_string(), Value::Int(7))]),
    )]);
    let decoded = evolve(&writer, &reader, &written).unwrap();
    assert_eq!(
        decoded,
        Value::Record(vec![(
            "inner".to_string(),
            Value::Record(vec![
                ("x".to_string(), Value::Long(7)),
                ("y".to_string(), Value::String("none".to_string())),
            ]),
        )])
    );
}

#[test]
fn test_array_and_map_items_promote() {
    let writer = Schema::array(Schema::int().shared()).shared();
    let reader = Schema::array(Schema::double().shared()).shared();
    let written = Value::Array(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(
        evolve(&writer, &reader, &written).unwrap(),
        Value::Array(vec![Value::Double(1.0), Value::Double(2.0)])
    );

    let writer = Schema::map(Schema::string().shared()).shared();
    let reader = Schema::map(Schema::bytes().shared()).shared();
    let written = Value::Map(vec![("k".to_string(), Value::String("v".to_string()))]);
    assert_eq!(
        evolve(&writer, &reader, &written).unwrap(),
        Value::Map(vec![("k".to_string(), Value::Bytes(b"v".to_vec()))])
    );
}

#[test]
fn test_structural_mismatch_is_incompatible() {
    let err = evolve(
        &Schema::array(Schema::int().shared()).shared(),
        &Schema::map(Schema::int().shared()).shared(),
        &Value::Array(vec![]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));

    let err = evolve(
        &Schema::boolean().shared(),
        &Schema::int().shared(),
        &Value::Boolean(true),
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaIncompatible(_)));
}

#[test]
fn test_incompatibility_error_names_both_schemas() {
    let writer = Schema::int().shared();
    let reader = Schema::record("Foo", vec![Field::new("x", Schema::int().shared())])
        .unwrap()
        .shared();
    let err = evolve(&writer, &reader, &Value::Int(1)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("int"), "{message}");
    assert!(message.contains("record Foo"), "{message}");
    // The schema names are interpolated, not left as placeholders.
    assert!(!message.contains('{'), "{message}");

    // Same for the no-matching-branch message.
    let reader = Schema::union(vec![Schema::null().shared(), Schema::string().shared()])
        .unwrap()
        .shared();
    let err = evolve(&Schema::int().shared(), &reader, &Value::Int(1)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("union[null, string]"), "{message}");
    assert!(!message.contains('{'), "{message}");
}

#[test]
fn test_field_error_names_record_and_field() {
    let writer = Schema::record("Point", vec![Field::new("x", Schema::string().shared())])
        .unwrap()
        .shared();
    let reader = Schema::record("Point", vec![Field::new("x", Schema::int().shared())])
        .unwrap()
        .shared();
    let written = Value::Record(vec![("x".to_string(), Value::String("s".to_string()))]);
    let err = evolve(&writer, &reader, &written).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Point"), "{message}");
    assert!(message.contains("\"x\""), "{message}");
}
