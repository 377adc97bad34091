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

//! Logical type conversions.
//!
//! A logical type is a named annotation (the `"logicalType"` schema
//! property) layering a domain meaning over a primitive wire representation.
//! Conversions are registered per `(wire kind, logical type name)` before
//! decoding begins and looked up once at resolution-plan build time; the
//! hot decode path calls a baked-in function pair, never the registry.
//!
//! A declared logical type with no registered conversion is not an error:
//! the raw wire value passes through unconverted.

use std::collections::HashMap;

use chrono::{DateTime, Timelike};

use crate::error::Error;
use crate::util::EPOCH;
use crate::value::Value;

/// The primitive wire representation backing a logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed,
}

/// A pure conversion function: wire-typed [`Value`] in, domain (or wire)
/// [`Value`] out.
pub type ConvertFn = fn(Value) -> Result<Value, Error>;

/// A conversion pair for one logical type on one wire kind.
///
/// Plain function pointers so a conversion can be baked into an immutable
/// resolution plan and shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    /// Wire representation to domain value, applied after raw decode.
    pub to_domain: ConvertFn,
    /// Domain value to wire representation, applied before encode.
    pub from_domain: ConvertFn,
}

/// Registry of conversions keyed by `(wire kind, logical type name)`.
///
/// Populated at setup and read-only during decode/encode; concurrent
/// mutation during active use is not supported.
#[derive(Debug, Default)]
pub struct ConversionRegistry {
    map: HashMap<(WireKind, String), Conversion>,
}

impl ConversionRegistry {
    /// An empty registry: every logical type passes through raw.
    pub fn new() -> ConversionRegistry {
        ConversionRegistry::default()
    }

    /// A registry pre-populated with the chrono-backed date/time
    /// conversions: `date`, `time-millis`, `time-micros`,
    /// `timestamp-millis` and `timestamp-micros`.
    pub fn builtin() -> ConversionRegistry {
        let mut registry = ConversionRegistry::new();
        registry.register(
            WireKind::Int,
            "date",
            Conversion {
                to_domain: date_to_domain,
                from_domain: date_from_domain,
            },
        );
        registry.register(
            WireKind::Int,
            "time-millis",
            Conversion {
                to_domain: time_millis_to_domain,
                from_domain: time_millis_from_domain,
            },
        );
        registry.register(
            WireKind::Long,
            "time-micros",
            Conversion {
                to_domain: time_micros_to_domain,
                from_domain: time_micros_from_domain,
            },
        );
        registry.register(
            WireKind::Long,
            "timestamp-millis",
            Conversion {
                to_domain: timestamp_millis_to_domain,
                from_domain: timestamp_millis_from_domain,
            },
        );
        registry.register(
            WireKind::Long,
            "timestamp-micros",
            Conversion {
                to_domain: timestamp_micros_to_domain,
                from_domain: timestamp_micros_from_domain,
            },
        );
        registry
    }

    /// Registers a conversion, replacing any previous one for the same key.
    pub fn register(&mut self, wire: WireKind, name: impl Into<String>, conversion: Conversion) {
        self.map.insert((wire, name.into()), conversion);
    }

    pub fn lookup(&self, wire: WireKind, name: &str) -> Option<Conversion> {
        self.map.get(&(wire, name.to_string())).copied()
    }
}

fn wrong_kind(expected: &'static str, got: &Value) -> Error {
    Error::unsupported_conversion(format!("expected {expected}, got {}", got.kind_name()))
}

fn date_to_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::Int(days) => EPOCH
            .checked_add_signed(chrono::TimeDelta::days(days.into()))
            .map(Value::Date)
            .ok_or_else(|| Error::unsupported_conversion(format!("date {days} out of range"))),
        other => Err(wrong_kind("int", &other)),
    }
}

fn date_from_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::Date(d) => Ok(Value::Int(d.signed_duration_since(EPOCH).num_days() as i32)),
        other => Err(wrong_kind("date", &other)),
    }
}

fn time_millis_to_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::Int(millis) if millis >= 0 => {
            let millis = millis as u32;
            chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                millis / 1_000,
                (millis % 1_000) * 1_000_000,
            )
            .map(Value::TimeMillis)
            .ok_or_else(|| {
                Error::unsupported_conversion(format!("time-millis {millis} out of range"))
            })
        }
        Value::Int(millis) => Err(Error::unsupported_conversion(format!(
            "negative time-millis {millis}"
        ))),
        other => Err(wrong_kind("int", &other)),
    }
}

fn time_millis_from_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::TimeMillis(t) => Ok(Value::Int(
            (t.num_seconds_from_midnight() * 1_000 + t.nanosecond() / 1_000_000) as i32,
        )),
        other => Err(wrong_kind("time-millis", &other)),
    }
}

fn time_micros_to_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::Long(micros) if micros >= 0 => chrono::NaiveTime::from_num_seconds_from_midnight_opt(
            (micros / 1_000_000) as u32,
            ((micros % 1_000_000) * 1_000) as u32,
        )
        .map(Value::TimeMicros)
        .ok_or_else(|| {
            Error::unsupported_conversion(format!("time-micros {micros} out of range"))
        }),
        Value::Long(micros) => Err(Error::unsupported_conversion(format!(
            "negative time-micros {micros}"
        ))),
        other => Err(wrong_kind("long", &other)),
    }
}

fn time_micros_from_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::TimeMicros(t) => Ok(Value::Long(
            i64::from(t.num_seconds_from_midnight()) * 1_000_000
                + i64::from(t.nanosecond() / 1_000),
        )),
        other => Err(wrong_kind("time-micros", &other)),
    }
}

fn timestamp_millis_to_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::Long(millis) => DateTime::from_timestamp_millis(millis)
            .map(|dt| Value::TimestampMillis(dt.naive_utc()))
            .ok_or_else(|| {
                Error::unsupported_conversion(format!("timestamp-millis {millis} out of range"))
            }),
        other => Err(wrong_kind("long", &other)),
    }
}

fn timestamp_millis_from_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::TimestampMillis(dt) => Ok(Value::Long(dt.and_utc().timestamp_millis())),
        other => Err(wrong_kind("timestamp-millis", &other)),
    }
}

fn timestamp_micros_to_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::Long(micros) => DateTime::from_timestamp_micros(micros)
            .map(|dt| Value::TimestampMicros(dt.naive_utc()))
            .ok_or_else(|| {
                Error::unsupported_conversion(format!("timestamp-micros {micros} out of range"))
            }),
        other => Err(wrong_kind("long", &other)),
    }
}

fn timestamp_micros_from_domain(value: Value) -> Result<Value, Error> {
    match value {
        Value::TimestampMicros(dt) => Ok(Value::Long(dt.and_utc().timestamp_micros())),
        other => Err(wrong_kind("timestamp-micros", &other)),
    }
}
