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

use std::sync::Arc;

use crate::conversion::Conversion;
use crate::schema::SchemaRef;
use crate::value::Value;

/// One node of a resolution plan.
///
/// A plan mirrors the reader schema's shape; each node says how to consume
/// the writer's bytes at that position. Plans hold no mutable state and are
/// shared freely across concurrent decodes once built.
#[derive(Debug)]
pub enum ReadPlan {
    // Direct reads: writer and reader agree on the wire shape.
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,

    // Promotions: writer bytes of one kind, reader value of a wider one.
    IntAsLong,
    IntAsFloat,
    IntAsDouble,
    LongAsFloat,
    LongAsDouble,
    FloatAsDouble,
    BytesAsString,
    StringAsBytes,

    /// Exactly this many raw bytes.
    Fixed(usize),

    /// Writer symbol index to resolved reader symbol. Unknown writer symbols
    /// were replaced by the reader's enum default during resolution.
    Enum { symbols: Vec<String> },

    Array(Arc<ReadPlan>),
    Map(Arc<ReadPlan>),

    Record {
        /// Reader field names, in reader field order.
        fields: Vec<String>,
        /// Per writer field, in writer field order: which reader position to
        /// populate, or a skip of the writer's bytes.
        steps: Vec<RecordStep>,
        /// Reader-only fields, filled after all writer fields are consumed.
        defaults: Vec<(usize, Value)>,
    },

    /// Per writer branch: how to read it, or the incompatibility that
    /// surfaces only if that branch actually appears in the data.
    Union { branches: Vec<UnionBranch> },

    /// Raw decode via `inner`, then the baked-in logical type conversion.
    Convert {
        conversion: Conversion,
        inner: Arc<ReadPlan>,
    },
}

/// A step of a record plan, in writer field order.
#[derive(Debug)]
pub enum RecordStep {
    /// Read the writer field and place it at `position` in the reader record.
    Read {
        position: usize,
        plan: Arc<ReadPlan>,
    },
    /// Consume a writer field the reader does not want. The bytes must still
    /// be read, the stream being positional.
    Skip(SchemaRef),
}

/// Resolution outcome of one writer union branch.
#[derive(Debug)]
pub enum UnionBranch {
    Resolved(Arc<ReadPlan>),
    /// The branch does not resolve against the reader schema. Deferred to
    /// decode time: data that never uses the branch still decodes.
    Incompatible(String),
}
