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

use crate::conversion::ConversionRegistry;
use crate::error::Error;
use crate::incompatible;
use crate::resolver::plan::{ReadPlan, RecordStep, UnionBranch};
use crate::schema::{EnumSchema, RecordSchema, SchemaKind, SchemaRef};

/// Builds a resolution plan for reading bytes written under `writer` as
/// values shaped like `reader`.
///
/// The allowed primitive promotions are int→long→float→double and
/// string↔bytes; everything else not structurally matching is a
/// [`Error::SchemaIncompatible`]. Conversions for logical types declared by
/// the reader are looked up in `conversions` here, once, and baked into the
/// plan.
pub fn resolve(
    writer: &SchemaRef,
    reader: &SchemaRef,
    conversions: &ConversionRegistry,
) -> Result<ReadPlan, Error> {
    match (writer.kind(), reader.kind()) {
        // A writer union resolves branch by branch against the whole reader
        // schema. Branch failures are recorded, not raised: they only matter
        // if the data actually carries that branch.
        (SchemaKind::Union(wb), _) => {
            let branches = wb
                .iter()
                .map(|b| match resolve(b, reader, conversions) {
                    Ok(plan) => UnionBranch::Resolved(Arc::new(plan)),
                    Err(e) => UnionBranch::Incompatible(e.to_string()),
                })
                .collect();
            Ok(ReadPlan::Union { branches })
        }
        // A non-union writer against a reader union takes the first reader
        // branch that matches, in declaration order. First-match is the
        // documented tie-break when several branches would fit.
        (_, SchemaKind::Union(rb)) => {
            for branch in rb {
                if let Ok(plan) = resolve(writer, branch, conversions) {
                    return Ok(plan);
                }
            }
            incompatible!("writer {writer} matches no branch of reader {reader}")
        }
        _ => resolve_non_union(writer, reader, conversions),
    }
}

fn resolve_non_union(
    writer: &SchemaRef,
    reader: &SchemaRef,
    conversions: &ConversionRegistry,
) -> Result<ReadPlan, Error> {
    use SchemaKind::*;
    let plan = match (writer.kind(), reader.kind()) {
        (Null, Null) => ReadPlan::Null,
        (Boolean, Boolean) => ReadPlan::Boolean,
        (Int, Int) => ReadPlan::Int,
        (Long, Long) => ReadPlan::Long,
        (Float, Float) => ReadPlan::Float,
        (Double, Double) => ReadPlan::Double,
        (Bytes, Bytes) => ReadPlan::Bytes,
        (String, String) => ReadPlan::String,

        (Int, Long) => ReadPlan::IntAsLong,
        (Int, Float) => ReadPlan::IntAsFloat,
        (Int, Double) => ReadPlan::IntAsDouble,
        (Long, Float) => ReadPlan::LongAsFloat,
        (Long, Double) => ReadPlan::LongAsDouble,
        (Float, Double) => ReadPlan::FloatAsDouble,
        (Bytes, String) => ReadPlan::BytesAsString,
        (String, Bytes) => ReadPlan::StringAsBytes,

        (Fixed(w), Fixed(r)) => {
            // Sizes must agree; names are not compared for fixed.
            if w.size != r.size {
                incompatible!(
                    "fixed size mismatch: writer {} has {}, reader {} has {}",
                    w.name,
                    w.size,
                    r.name,
                    r.size
                );
            }
            ReadPlan::Fixed(r.size)
        }
        (Enum(w), Enum(r)) => resolve_enums(w, r)?,
        (Array(w), Array(r)) => ReadPlan::Array(Arc::new(resolve(w, r, conversions)?)),
        (Map(w), Map(r)) => ReadPlan::Map(Arc::new(resolve(w, r, conversions)?)),
        (Record(w), Record(r)) => resolve_records(w, r, conversions)?,

        _ => incompatible!("writer {writer} cannot be read as reader {reader}"),
    };
    // Bake the reader's logical type conversion into the plan, if one is
    // registered. Unregistered logical types fall through to the raw value.
    if let (Some(name), Some(wire)) = (reader.logical_type(), reader.wire_kind()) {
        if let Some(conversion) = conversions.lookup(wire, name) {
            return Ok(ReadPlan::Convert {
                conversion,
                inner: Arc::new(plan),
            });
        }
    }
    Ok(plan)
}

/// Remaps writer symbol indices to reader symbols. The writer's symbol list
/// is authoritative for the indices on the wire.
fn resolve_enums(writer: &EnumSchema, reader: &EnumSchema) -> Result<ReadPlan, Error> {
    let mut symbols = Vec::with_capacity(writer.symbols.len());
    for symbol in &writer.symbols {
        if reader.index_of(symbol).is_some() {
            symbols.push(symbol.clone());
        } else if let Some(default) = &reader.default {
            symbols.push(default.clone());
        } else {
            incompatible!(
                "writer enum {} symbol {symbol:?} unknown to reader enum {} and no default declared",
                writer.name,
                reader.name
            );
        }
    }
    Ok(ReadPlan::Enum { symbols })
}

/// Matches reader fields to writer fields and lays out the decode steps in
/// writer field order, the order the bytes arrive in. Reader-only fields
/// become defaults applied after the last writer field.
fn resolve_records(
    writer: &RecordSchema,
    reader: &RecordSchema,
    conversions: &ConversionRegistry,
) -> Result<ReadPlan, Error> {
    let mut steps = Vec::with_capacity(writer.fields.len());
    let mut matched = vec![false; reader.fields.len()];

    for wf in &writer.fields {
        // Exact name first, then the writer field's aliases, then reader
        // field aliases naming the writer field. A reader field is consumed
        // by at most one writer field; first match wins.
        let found = reader
            .fields
            .iter()
            .find(|rf| !matched[rf.position] && rf.name == wf.name)
            .or_else(|| {
                wf.aliases.iter().find_map(|alias| {
                    reader
                        .fields
                        .iter()
                        .find(|rf| !matched[rf.position] && rf.name == *alias)
                })
            })
            .or_else(|| {
                reader
                    .fields
                    .iter()
                    .find(|rf| !matched[rf.position] && rf.aliases.iter().any(|a| *a == wf.name))
            });
        match found {
            Some(rf) => {
                matched[rf.position] = true;
                let plan = resolve(&wf.schema, &rf.schema, conversions).map_err(|e| {
                    Error::schema_incompatible(format!(
                        "record {} field {:?}: {e}",
                        reader.name, rf.name
                    ))
                })?;
                steps.push(RecordStep::Read {
                    position: rf.position,
                    plan: Arc::new(plan),
                });
            }
            None => steps.push(RecordStep::Skip(wf.schema.clone())),
        }
    }

    let mut defaults = Vec::new();
    for rf in &reader.fields {
        if !matched[rf.position] {
            match &rf.default {
                Some(default) => defaults.push((rf.position, default.clone())),
                None => incompatible!(
                    "reader record {} field {:?} has no writer counterpart and no default",
                    reader.name,
                    rf.name
                ),
            }
        }
    }

    Ok(ReadPlan::Record {
        fields: reader.fields.iter().map(|f| f.name.clone()).collect(),
        steps,
        defaults,
    })
}
