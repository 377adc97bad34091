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

//! Schema-resolving decode of generic values.

use std::sync::Arc;

use crate::buffer::Reader;
use crate::conversion::ConversionRegistry;
use crate::ensure;
use crate::error::Error;
use crate::resolver::{resolve, PlanCache, ReadPlan, RecordStep, UnionBranch};
use crate::schema::{Schema, SchemaKind, SchemaRef};
use crate::value::Value;

/// Decodes binary values written under one schema into values shaped like
/// another.
///
/// A `DatumReader` is configured with a writer schema (the layout of the
/// bytes) and a reader schema (the shape the caller wants); the two may be
/// the same object, in which case resolution is an identity pass. The
/// resolution plan for the pair is cached: a single-slot fast path owned by
/// this reader, backed by the process-wide [`PlanCache`].
///
/// Decoding is synchronous and single-threaded per call; share schemas and
/// plans across threads freely, but each `DatumReader` belongs to the
/// context that created it (`read` takes `&mut self` for the fast-path
/// slot).
pub struct DatumReader {
    writer_schema: SchemaRef,
    reader_schema: SchemaRef,
    conversions: Arc<ConversionRegistry>,
    // Fast path: the plan for the currently configured pair. Only this
    // reader writes the slot; set_schemas invalidates it.
    fast: Option<Arc<ReadPlan>>,
}

impl DatumReader {
    /// A reader with no logical type conversions registered; declared
    /// logical types pass through as raw wire values.
    pub fn new(writer_schema: SchemaRef, reader_schema: SchemaRef) -> DatumReader {
        DatumReader::with_conversions(
            writer_schema,
            reader_schema,
            Arc::new(ConversionRegistry::new()),
        )
    }

    pub fn with_conversions(
        writer_schema: SchemaRef,
        reader_schema: SchemaRef,
        conversions: Arc<ConversionRegistry>,
    ) -> DatumReader {
        DatumReader {
            writer_schema,
            reader_schema,
            conversions,
            fast: None,
        }
    }

    pub fn writer_schema(&self) -> &SchemaRef {
        &self.writer_schema
    }

    pub fn reader_schema(&self) -> &SchemaRef {
        &self.reader_schema
    }

    /// Reconfigures the schema pair and invalidates the fast-path slot.
    pub fn set_schemas(&mut self, writer_schema: SchemaRef, reader_schema: SchemaRef) {
        self.writer_schema = writer_schema;
        self.reader_schema = reader_schema;
        self.fast = None;
    }

    fn plan(&mut self) -> Result<Arc<ReadPlan>, Error> {
        if let Some(plan) = &self.fast {
            return Ok(plan.clone());
        }
        let cache = PlanCache::global();
        let plan = match cache.get(&self.writer_schema, &self.reader_schema, &self.conversions) {
            Some(plan) => plan,
            None => {
                let plan = Arc::new(resolve(
                    &self.writer_schema,
                    &self.reader_schema,
                    &self.conversions,
                )?);
                cache.insert(
                    &self.writer_schema,
                    &self.reader_schema,
                    &self.conversions,
                    plan.clone(),
                );
                plan
            }
        };
        self.fast = Some(plan.clone());
        Ok(plan)
    }

    /// Decodes one value from the stream.
    pub fn read(&mut self, reader: &mut Reader) -> Result<Value, Error> {
        self.read_into(Value::Null, reader)
    }

    /// Decodes one value, recycling `reuse` where its container kinds match
    /// the target shape. Reuse is an allocation optimization only; the
    /// result is identical to [`DatumReader::read`].
    pub fn read_into(&mut self, reuse: Value, reader: &mut Reader) -> Result<Value, Error> {
        let plan = self.plan()?;
        read_value(&plan, reuse, reader)
    }
}

fn read_value(plan: &ReadPlan, reuse: Value, reader: &mut Reader) -> Result<Value, Error> {
    match plan {
        ReadPlan::Null => Ok(Value::Null),
        ReadPlan::Boolean => Ok(Value::Boolean(reader.read_boolean()?)),
        ReadPlan::Int => Ok(Value::Int(reader.read_int()?)),
        ReadPlan::Long => Ok(Value::Long(reader.read_long()?)),
        ReadPlan::Float => Ok(Value::Float(reader.read_f32()?)),
        ReadPlan::Double => Ok(Value::Double(reader.read_f64()?)),
        ReadPlan::Bytes => Ok(Value::Bytes(reader.read_len_prefixed()?.to_vec())),
        ReadPlan::String => Ok(Value::String(reader.read_str()?.to_owned())),

        ReadPlan::IntAsLong => Ok(Value::Long(i64::from(reader.read_int()?))),
        ReadPlan::IntAsFloat => Ok(Value::Float(reader.read_int()? as f32)),
        ReadPlan::IntAsDouble => Ok(Value::Double(f64::from(reader.read_int()?))),
        ReadPlan::LongAsFloat => Ok(Value::Float(reader.read_long()? as f32)),
        ReadPlan::LongAsDouble => Ok(Value::Double(reader.read_long()? as f64)),
        ReadPlan::FloatAsDouble => Ok(Value::Double(f64::from(reader.read_f32()?))),
        ReadPlan::BytesAsString => {
            let raw = reader.read_len_prefixed()?;
            let s = std::str::from_utf8(raw)
                .map_err(|e| Error::malformed_data(format!("invalid UTF-8: {e}")))?;
            Ok(Value::String(s.to_owned()))
        }
        ReadPlan::StringAsBytes => Ok(Value::Bytes(reader.read_len_prefixed()?.to_vec())),

        ReadPlan::Fixed(size) => Ok(Value::Fixed(reader.read_bytes(*size)?.to_vec())),

        ReadPlan::Enum { symbols } => {
            let index = reader.read_int()?;
            let symbol = usize::try_from(index)
                .ok()
                .and_then(|i| symbols.get(i))
                .ok_or_else(|| {
                    Error::malformed_data(format!(
                        "enum index {index} out of range for {} symbols",
                        symbols.len()
                    ))
                })?;
            Ok(Value::Enum(symbol.clone()))
        }

        ReadPlan::Array(item_plan) => {
            let mut items = match reuse {
                Value::Array(mut items) => {
                    items.clear();
                    items
                }
                _ => Vec::new(),
            };
            let width = plan_min_width(item_plan);
            loop {
                let mut count = reader.read_long()?;
                if count == 0 {
                    break;
                }
                if count < 0 {
                    // Negative count: absolute value is the item count,
                    // followed by the block's byte length (used by skip).
                    count = count.checked_neg().ok_or_else(|| {
                        Error::malformed_data(format!("invalid block count {count}"))
                    })?;
                    reader.read_long()?;
                }
                let count = block_items(count, width, items.len(), reader.remaining())?;
                for _ in 0..count {
                    items.push(read_value(item_plan, Value::Null, reader)?);
                }
            }
            Ok(Value::Array(items))
        }

        ReadPlan::Map(value_plan) => {
            let mut entries = match reuse {
                Value::Map(mut entries) => {
                    entries.clear();
                    entries
                }
                _ => Vec::new(),
            };
            // Every entry carries at least a one-byte key length prefix.
            let width = plan_min_width(value_plan).saturating_add(1);
            loop {
                let mut count = reader.read_long()?;
                if count == 0 {
                    break;
                }
                if count < 0 {
                    count = count.checked_neg().ok_or_else(|| {
                        Error::malformed_data(format!("invalid block count {count}"))
                    })?;
                    reader.read_long()?;
                }
                let count = block_items(count, width, entries.len(), reader.remaining())?;
                for _ in 0..count {
                    let key = reader.read_str()?.to_owned();
                    let value = read_value(value_plan, Value::Null, reader)?;
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                }
            }
            Ok(Value::Map(entries))
        }

        ReadPlan::Record {
            fields,
            steps,
            defaults,
        } => {
            // Recycle the container only when the shape matches; nested
            // values are offered for reuse position by position.
            let mut slots = match reuse {
                Value::Record(mut slots) if slots.len() == fields.len() => {
                    for (slot, name) in slots.iter_mut().zip(fields) {
                        if slot.0 != *name {
                            slot.0 = name.clone();
                        }
                    }
                    slots
                }
                _ => fields.iter().map(|n| (n.clone(), Value::Null)).collect(),
            };
            for step in steps {
                match step {
                    RecordStep::Read { position, plan } => {
                        let old = std::mem::replace(&mut slots[*position].1, Value::Null);
                        slots[*position].1 = read_value(plan, old, reader)?;
                    }
                    RecordStep::Skip(schema) => skip(schema, reader)?,
                }
            }
            for (position, default) in defaults {
                slots[*position].1 = default.clone();
            }
            Ok(Value::Record(slots))
        }

        ReadPlan::Union { branches } => {
            let index = reader.read_long()?;
            let branch = usize::try_from(index)
                .ok()
                .and_then(|i| branches.get(i))
                .ok_or_else(|| {
                    Error::malformed_data(format!(
                        "union index {index} out of range for {} branches",
                        branches.len()
                    ))
                })?;
            match branch {
                UnionBranch::Resolved(plan) => read_value(plan, reuse, reader),
                UnionBranch::Incompatible(message) => {
                    Err(Error::schema_incompatible(message.clone()))
                }
            }
        }

        ReadPlan::Convert { conversion, inner } => {
            let raw = read_value(inner, reuse, reader)?;
            (conversion.to_domain)(raw)
        }
    }
}

/// Cap on items in containers of zero-width values (nulls), whose block
/// counts cannot be validated against the remaining input.
const MAX_ZERO_WIDTH_ITEMS: usize = 16 * 1024 * 1024;

/// Validates a declared block count before decoding or skipping its items:
/// `count` items of minimum encoded width `width` cannot outnumber the
/// bytes left in the stream. `decoded` is the item count already
/// accumulated for this container.
fn block_items(count: i64, width: usize, decoded: usize, remaining: usize) -> Result<usize, Error> {
    let count = usize::try_from(count)
        .map_err(|_| Error::malformed_data(format!("invalid block count {count}")))?;
    if width == 0 {
        ensure!(
            count <= MAX_ZERO_WIDTH_ITEMS.saturating_sub(decoded),
            Error::malformed_data(format!(
                "block of {count} zero-width items exceeds the decode limit"
            ))
        );
    } else {
        ensure!(
            count <= remaining / width,
            Error::malformed_data(format!(
                "block of {count} items cannot fit in {remaining} remaining bytes"
            ))
        );
    }
    Ok(count)
}

/// Minimum bytes one value decoded by this plan consumes from the stream.
fn plan_min_width(plan: &ReadPlan) -> usize {
    match plan {
        ReadPlan::Null => 0,
        ReadPlan::Boolean
        | ReadPlan::Int
        | ReadPlan::Long
        | ReadPlan::IntAsLong
        | ReadPlan::IntAsFloat
        | ReadPlan::IntAsDouble
        | ReadPlan::LongAsFloat
        | ReadPlan::LongAsDouble
        | ReadPlan::Bytes
        | ReadPlan::String
        | ReadPlan::BytesAsString
        | ReadPlan::StringAsBytes
        | ReadPlan::Enum { .. }
        | ReadPlan::Union { .. }
        | ReadPlan::Array(_)
        | ReadPlan::Map(_) => 1,
        // A promotion consumes the writer's width, not the reader's.
        ReadPlan::Float | ReadPlan::FloatAsDouble => 4,
        ReadPlan::Double => 8,
        ReadPlan::Fixed(size) => *size,
        ReadPlan::Record { steps, .. } => steps
            .iter()
            .map(|step| match step {
                RecordStep::Read { plan, .. } => plan_min_width(plan),
                RecordStep::Skip(schema) => schema_min_width(schema),
            })
            .fold(0usize, usize::saturating_add),
        ReadPlan::Convert { inner, .. } => plan_min_width(inner),
    }
}

/// Minimum bytes one value of this schema occupies on the wire.
fn schema_min_width(schema: &Schema) -> usize {
    match schema.kind() {
        SchemaKind::Null => 0,
        SchemaKind::Boolean
        | SchemaKind::Int
        | SchemaKind::Long
        | SchemaKind::Bytes
        | SchemaKind::String
        | SchemaKind::Enum(_)
        | SchemaKind::Union(_)
        | SchemaKind::Array(_)
        | SchemaKind::Map(_) => 1,
        SchemaKind::Float => 4,
        SchemaKind::Double => 8,
        SchemaKind::Fixed(f) => f.size,
        SchemaKind::Record(r) => r
            .fields
            .iter()
            .map(|f| schema_min_width(&f.schema))
            .fold(0usize, usize::saturating_add),
    }
}

/// Consumes and discards one value of `schema` from the stream without
/// materializing it.
///
/// Used for writer fields the reader does not want and for tooling that
/// fast-forwards over values of known schema. Arrays and maps encoded with
/// negative block counts are skipped by their block byte length without
/// decoding the items.
pub fn skip(schema: &Schema, reader: &mut Reader) -> Result<(), Error> {
    match schema.kind() {
        SchemaKind::Null => Ok(()),
        SchemaKind::Boolean => reader.read_u8().map(|_| ()),
        SchemaKind::Int => reader.read_int().map(|_| ()),
        SchemaKind::Long => reader.read_long().map(|_| ()),
        SchemaKind::Float => reader.skip_bytes(4),
        SchemaKind::Double => reader.skip_bytes(8),
        SchemaKind::Bytes | SchemaKind::String => {
            let len = reader.read_long()?;
            if len < 0 {
                return Err(Error::malformed_data(format!("negative length {len}")));
            }
            reader.skip_bytes(len as usize)
        }
        SchemaKind::Fixed(f) => reader.skip_bytes(f.size),
        SchemaKind::Enum(_) => reader.read_int().map(|_| ()),
        SchemaKind::Record(r) => {
            for field in &r.fields {
                skip(&field.schema, reader)?;
            }
            Ok(())
        }
        SchemaKind::Array(items) => {
            skip_blocks(reader, schema_min_width(items), |reader| skip(items, reader))
        }
        SchemaKind::Map(values) => skip_blocks(
            reader,
            schema_min_width(values).saturating_add(1),
            |reader| {
                let len = reader.read_long()?;
                if len < 0 {
                    return Err(Error::malformed_data(format!("negative key length {len}")));
                }
                reader.skip_bytes(len as usize)?;
                skip(values, reader)
            },
        ),
        SchemaKind::Union(branches) => {
            let index = reader.read_long()?;
            let branch = usize::try_from(index)
                .ok()
                .and_then(|i| branches.get(i))
                .ok_or_else(|| {
                    Error::malformed_data(format!(
                        "union index {index} out of range for {} branches",
                        branches.len()
                    ))
                })?;
            skip(branch, reader)
        }
    }
}

/// Walks array/map blocks, skipping sized blocks wholesale and per-item
/// skipping the rest.
fn skip_blocks(
    reader: &mut Reader,
    width: usize,
    mut skip_item: impl FnMut(&mut Reader) -> Result<(), Error>,
) -> Result<(), Error> {
    loop {
        let count = reader.read_long()?;
        if count == 0 {
            return Ok(());
        }
        if count < 0 {
            let size = reader.read_long()?;
            if size < 0 {
                return Err(Error::malformed_data(format!("negative block size {size}")));
            }
            reader.skip_bytes(size as usize)?;
        } else {
            let count = block_items(count, width, 0, reader.remaining())?;
            for _ in 0..count {
                skip_item(reader)?;
            }
        }
    }
}
