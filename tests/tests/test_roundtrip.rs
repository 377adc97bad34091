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

fn encode(schema: &SchemaRef, value: &Value) -> Vec<u8> {
    let mut out = Writer::default();
    DatumWriter::new(schema.clone()).write(value, &mut out).unwrap();
    out.into_inner()
}

fn round_trip(schema: &SchemaRef, value: &Value) -> Value {
    let bytes = encode(schema, value);
    let mut input = Reader::new(&bytes);
    let decoded = DatumReader::new(schema.clone(), schema.clone())
        .read(&mut input)
        .unwrap();
    assert_eq!(input.remaining(), 0, "decode must consume all bytes");
    decoded
}

#[test]
fn test_scalar_round_trips() {
    let cases: Vec<(SchemaRef, Value)> = vec![
        (Schema::null().shared(), Value::Null),
        (Schema::boolean().shared(), Value::Boolean(true)),
        (Schema::int().shared(), Value::Int(-12345)),
        (Schema::long().shared(), Value::Long(i64::MIN)),
        (Schema::float().shared(), Value::Float(3.5)),
        (Schema::double().shared(), Value::Double(-0.25)),
        (Schema::bytes().shared(), Value::Bytes(vec![0, 255, 7])),
        (
            Schema::string().shared(),
            Value::String("héllo".to_string()),
        ),
    ];
    for (schema, value) in &cases {
        assert_eq!(&round_trip(schema, value), value);
    }
}

#[test]
fn test_record_round_trip() {
    let schema = Schema::record(
        "User",
        vec![
            Field::new("name", Schema::string().shared()),
            Field::new("age", Schema::int().shared()),
            Field::new("tags", Schema::array(Schema::string().shared()).shared()),
        ],
    )
    .unwrap()
    .shared();
    let value = Value::Record(vec![
        ("name".to_string(), Value::String("ada".to_string())),
        ("age".to_string(), Value::Int(36)),
        (
            "tags".to_string(),
            Value::Array(vec![Value::String("a".to_string())]),
        ),
    ]);
    assert_eq!(round_trip(&schema, &value), value);
}

#[test]
fn test_enum_and_fixed_round_trip() {
    let enum_schema =
        Schema::enumeration("Suit", vec!["HEARTS".into(), "SPADES".into()], None)
            .unwrap()
            .shared();
    let value = Value::Enum("SPADES".to_string());
    assert_eq!(round_trip(&enum_schema, &value), value);
    // Symbol index on the wire: SPADES is index 1, zigzag 2.
    assert_eq!(encode(&enum_schema, &value), vec![0x02]);

    let fixed_schema = Schema::fixed("Quad", 4).shared();
    let value = Value::Fixed(vec![1, 2, 3, 4]);
    assert_eq!(round_trip(&fixed_schema, &value), value);
    assert_eq!(encode(&fixed_schema, &value), vec![1, 2, 3, 4]);
}

#[test]
fn test_map_round_trip() {
    let schema = Schema::map(Schema::long().shared()).shared();
    let value = Value::Map(vec![
        ("b".to_string(), Value::Long(2)),
        ("a".to_string(), Value::Long(1)),
    ]);
    // Insertion order survives the trip.
    assert_eq!(round_trip(&schema, &value), value);

    let empty = Value::Map(vec![]);
    assert_eq!(round_trip(&schema, &empty), empty);
    assert_eq!(encode(&schema, &empty), vec![0x00]);
}

#[test]
fn test_union_index_stability() {
    let schema = Schema::union(vec![Schema::null().shared(), Schema::string().shared()])
        .unwrap()
        .shared();

    // "hi" takes branch 1: index 1 (zigzag 2), length 2 (zigzag 4), bytes.
    let bytes = encode(&schema, &Value::String("hi".to_string()));
    assert_eq!(bytes, vec![0x02, 0x04, b'h', b'i']);

    let bytes = encode(&schema, &Value::Null);
    assert_eq!(bytes, vec![0x00]);

    // Branch index 2 is out of range for a 2-branch union.
    let bad = [0x04u8];
    let mut input = Reader::new(&bad);
    let err = DatumReader::new(schema.clone(), schema.clone())
        .read(&mut input)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedData(_)));
}

#[test]
fn test_enum_index_out_of_range() {
    let schema = Schema::enumeration("E", vec!["A".into(), "B".into()], None)
        .unwrap()
        .shared();
    let bad = [0x04u8]; // index 2
    let mut input = Reader::new(&bad);
    let err = DatumReader::new(schema.clone(), schema.clone())
        .read(&mut input)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedData(_)));
}

#[test]
fn test_block_splits_are_equivalent() {
    let schema = Schema::array(Schema::int().shared()).shared();
    let expected = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    // Single block of 3, the shape the writer emits.
    let single = encode(&schema, &expected);
    assert_eq!(single, vec![0x06, 0x02, 0x04, 0x06, 0x00]);

    // Two blocks: count 2 then count 1.
    let two_blocks = vec![0x04, 0x02, 0x04, 0x02, 0x06, 0x00];
    // A sized block: count -2 (zigzag 3), byte length 2 (zigzag 4), then
    // a plain block of 1.
    let sized_block = vec![0x03, 0x04, 0x02, 0x04, 0x02, 0x06, 0x00];

    for bytes in [single, two_blocks, sized_block] {
        let mut input = Reader::new(&bytes);
        let decoded = DatumReader::new(schema.clone(), schema.clone())
            .read(&mut input)
            .unwrap();
        assert_eq!(decoded, expected);
        assert_eq!(input.remaining(), 0);
    }
}

#[test]
fn test_unsatisfiable_block_count_is_rejected() {
    // Declares 2^40 ints with no bytes behind them.
    let mut head = Writer::default();
    head.write_long(1 << 40);
    let bytes = head.into_inner();

    let schema = Schema::array(Schema::int().shared()).shared();
    let mut input = Reader::new(&bytes);
    let err = DatumReader::new(schema.clone(), schema)
        .read(&mut input)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedData(_)));

    let mut head = Writer::default();
    head.write_long(1 << 40);
    let bytes = head.into_inner();
    let schema = Schema::map(Schema::long().shared()).shared();
    let mut input = Reader::new(&bytes);
    let err = DatumReader::new(schema.clone(), schema)
        .read(&mut input)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedData(_)));
}

#[test]
fn test_zero_width_item_count_is_capped() {
    // Items of null occupy no bytes, so the count cannot be checked against
    // the input; absurd counts are refused before any allocation.
    let mut head = Writer::default();
    head.write_long(1 << 40);
    let bytes = head.into_inner();

    let schema = Schema::array(Schema::null().shared()).shared();
    let mut input = Reader::new(&bytes);
    let err = DatumReader::new(schema.clone(), schema.clone())
        .read(&mut input)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedData(_)));

    // Reasonable null arrays still round-trip.
    let value = Value::Array(vec![Value::Null, Value::Null, Value::Null]);
    assert_eq!(round_trip(&schema, &value), value);
}

#[test]
fn test_nested_union_in_map() {
    let schema = Schema::map(
        Schema::union(vec![Schema::null().shared(), Schema::int().shared()])
            .unwrap()
            .shared(),
    )
    .shared();
    let value = Value::Map(vec![
        ("x".to_string(), Value::Int(3)),
        ("y".to_string(), Value::Null),
    ]);
    assert_eq!(round_trip(&schema, &value), value);
}

#[test]
fn test_write_rejects_mismatched_value() {
    let schema = Schema::int().shared();
    let mut out = Writer::default();
    let err = DatumWriter::new(schema)
        .write(&Value::String("no".to_string()), &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
}

#[test]
fn test_write_rejects_wrong_fixed_size() {
    let schema = Schema::fixed("Quad", 4).shared();
    let mut out = Writer::default();
    let err = DatumWriter::new(schema)
        .write(&Value::Fixed(vec![1, 2]), &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)));
}

#[test]
fn test_reuse_value_decode() {
    let schema = Schema::record(
        "P",
        vec![
            Field::new("x", Schema::int().shared()),
            Field::new("y", Schema::array(Schema::int().shared()).shared()),
        ],
    )
    .unwrap()
    .shared();
    let value = Value::Record(vec![
        ("x".to_string(), Value::Int(1)),
        ("y".to_string(), Value::Array(vec![Value::Int(9)])),
    ]);
    let bytes = encode(&schema, &value);

    // Recycle a matching container.
    let reuse = Value::Record(vec![
        ("x".to_string(), Value::Int(999)),
        ("y".to_string(), Value::Array(vec![Value::Int(0), Value::Int(0)])),
    ]);
    let mut input = Reader::new(&bytes);
    let decoded = DatumReader::new(schema.clone(), schema.clone())
        .read_into(reuse, &mut input)
        .unwrap();
    assert_eq!(decoded, value);

    // A mismatched reuse value is simply ignored.
    let mut input = Reader::new(&bytes);
    let decoded = DatumReader::new(schema.clone(), schema.clone())
        .read_into(Value::Long(0), &mut input)
        .unwrap();
    assert_eq!(decoded, value);
}
