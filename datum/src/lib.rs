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

//! # Datum
//!
//! Datum is a schema-driven binary serialization engine with schema
//! evolution: values encoded under one schema can be decoded under a
//! different, compatible schema, with field matching by name and alias,
//! default substitution, primitive promotion and union remapping.
//!
//! ## Example
//!
//! ```rust
//! use datum::{DatumReader, DatumWriter, Field, Reader, Schema, Value, Writer};
//!
//! # fn main() -> Result<(), datum::Error> {
//! // The schema the bytes were written with.
//! let writer_schema = Schema::record(
//!     "User",
//!     vec![
//!         Field::new("name", Schema::string().shared()),
//!         Field::new("age", Schema::int().shared()),
//!     ],
//! )?
//! .shared();
//!
//! // The reader wants the fields in a different order, plus a new
//! // defaulted field the writer never knew about.
//! let reader_schema = Schema::record(
//!     "User",
//!     vec![
//!         Field::new("age", Schema::long().shared()),
//!         Field::new("name", Schema::string().shared()),
//!         Field::new("active", Schema::boolean().shared())
//!             .with_default(serde_json::Value::Bool(true))?,
//!     ],
//! )?
//! .shared();
//!
//! let value = Value::Record(vec![
//!     ("name".to_string(), Value::String("ada".to_string())),
//!     ("age".to_string(), Value::Int(36)),
//! ]);
//!
//! let mut out = Writer::default();
//! DatumWriter::new(writer_schema.clone()).write(&value, &mut out)?;
//!
//! let bytes = out.into_inner();
//! let mut input = Reader::new(&bytes);
//! let decoded = DatumReader::new(writer_schema, reader_schema).read(&mut input)?;
//!
//! assert_eq!(decoded.get("age"), Some(&Value::Long(36)));
//! assert_eq!(decoded.get("active"), Some(&Value::Boolean(true)));
//! # Ok(())
//! # }
//! ```

pub use datum_core::buffer::{Reader, Writer};
pub use datum_core::conversion::{Conversion, ConversionRegistry, ConvertFn, WireKind};
pub use datum_core::error::Error;
pub use datum_core::reader::{skip, DatumReader};
pub use datum_core::resolver::{resolve, PlanCache, ReadPlan};
pub use datum_core::schema::{Field, Schema, SchemaKind, SchemaRef, SortOrder};
pub use datum_core::value::Value;
pub use datum_core::writer::DatumWriter;
