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

//! # Datum Core
//!
//! Core implementation of the datum serialization engine: schema-driven
//! binary encoding and decoding of generic values, with full schema
//! evolution between the schema that wrote the bytes and the schema the
//! caller wants to read them as.
//!
//! ## Architecture
//!
//! - **`schema`**: the immutable, shared schema object model
//! - **`buffer`**: wire-level Reader/Writer primitives (varints, blocks)
//! - **`value`**: the generic tagged-union value representation
//! - **`resolver`**: writer/reader schema resolution, plans and the plan cache
//! - **`conversion`**: logical type conversion registry
//! - **`reader`** / **`writer`**: the DatumReader/DatumWriter orchestration
//! - **`error`**: the error taxonomy
//!
//! ## Key concepts
//!
//! The *writer schema* describes the bytes as produced; the *reader schema*
//! describes the shape the caller wants back. [`resolver::resolve`]
//! reconciles the two into an immutable plan: field matching by name and
//! alias, default substitution, primitive promotion and union branch
//! remapping. Plans are cached by schema object identity with weak
//! retention, so short-lived schemas never pin cache memory.
//!
//! Schema construction (from IDL or JSON text) is an external collaborator
//! concern; this crate consumes fully-built [`schema::Schema`] trees.

pub mod buffer;
pub mod conversion;
pub mod error;
pub mod reader;
pub mod resolver;
pub mod schema;
pub mod util;
pub mod value;
pub mod writer;
