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

//! The immutable schema object model.
//!
//! Schemas are built programmatically (or by an external IDL/JSON parser
//! acting as a schema provider), validated at construction, then shared as
//! [`SchemaRef`]s. After construction a schema never changes; the plan cache
//! keys on pointer identity, so two structurally equal schema instances are
//! deliberately distinct cache keys.

use std::fmt;
use std::sync::Arc;

use crate::conversion::WireKind;
use crate::error::Error;
use crate::value::{from_json, Value};

/// A shared, immutable schema node.
pub type SchemaRef = Arc<Schema>;

/// Property name carrying the logical type annotation.
pub const LOGICAL_TYPE_PROP: &str = "logicalType";

/// Sort order annotation on a record field.
///
/// Carried for external sort collaborators; the engine itself never
/// consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

/// A record field: name, dense position, declared schema, optional default,
/// order annotation and alias names.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub position: usize,
    pub schema: SchemaRef,
    pub default: Option<Value>,
    pub order: SortOrder,
    pub aliases: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: SchemaRef) -> Field {
        Field {
            name: name.into(),
            position: 0,
            schema,
            default: None,
            order: SortOrder::default(),
            aliases: Vec::new(),
        }
    }

    /// Attaches a JSON default, validated against the field schema.
    ///
    /// For a union field the default must be assignable to the union's
    /// first branch.
    pub fn with_default(mut self, default: serde_json::Value) -> Result<Field, Error> {
        self.default = Some(from_json(&default, &self.schema)?);
        Ok(self)
    }

    /// Adds an alias name. Alias matching is exact and case-sensitive.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Field {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Field {
        self.order = order;
        self
    }
}

#[derive(Debug)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordSchema {
    /// Finds a field by its own name or one of its aliases.
    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name || f.aliases.iter().any(|a| a == name))
    }
}

#[derive(Debug)]
pub struct EnumSchema {
    pub name: String,
    pub symbols: Vec<String>,
    /// Substitute symbol for writer symbols unknown to this reader schema.
    pub default: Option<String>,
}

impl EnumSchema {
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

#[derive(Debug)]
pub struct FixedSchema {
    pub name: String,
    pub size: usize,
}

/// The type variants of a schema node.
#[derive(Debug)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Array(SchemaRef),
    Map(SchemaRef),
    Union(Vec<SchemaRef>),
    Fixed(FixedSchema),
}

/// A schema node: a type variant plus uninterpreted, insertion-ordered,
/// write-once string properties.
#[derive(Debug)]
pub struct Schema {
    kind: SchemaKind,
    props: Vec<(String, serde_json::Value)>,
}

impl Schema {
    fn new(kind: SchemaKind) -> Schema {
        Schema {
            kind,
            props: Vec::new(),
        }
    }

    pub fn null() -> Schema {
        Schema::new(SchemaKind::Null)
    }

    pub fn boolean() -> Schema {
        Schema::new(SchemaKind::Boolean)
    }

    pub fn int() -> Schema {
        Schema::new(SchemaKind::Int)
    }

    pub fn long() -> Schema {
        Schema::new(SchemaKind::Long)
    }

    pub fn float() -> Schema {
        Schema::new(SchemaKind::Float)
    }

    pub fn double() -> Schema {
        Schema::new(SchemaKind::Double)
    }

    pub fn bytes() -> Schema {
        Schema::new(SchemaKind::Bytes)
    }

    pub fn string() -> Schema {
        Schema::new(SchemaKind::String)
    }

    /// Builds a record schema, assigning dense field positions in order.
    /// Duplicate field names are rejected.
    pub fn record(name: impl Into<String>, mut fields: Vec<Field>) -> Result<Schema, Error> {
        for i in 0..fields.len() {
            for j in (i + 1)..fields.len() {
                if fields[i].name == fields[j].name {
                    return Err(Error::type_error(format!(
                        "duplicate field name {:?}",
                        fields[i].name
                    )));
                }
            }
        }
        for (position, field) in fields.iter_mut().enumerate() {
            field.position = position;
        }
        Ok(Schema::new(SchemaKind::Record(RecordSchema {
            name: name.into(),
            fields,
        })))
    }

    /// Builds an enum schema. Symbols must be unique; the optional default
    /// must be one of them.
    pub fn enumeration(
        name: impl Into<String>,
        symbols: Vec<String>,
        default: Option<String>,
    ) -> Result<Schema, Error> {
        for i in 0..symbols.len() {
            for j in (i + 1)..symbols.len() {
                if symbols[i] == symbols[j] {
                    return Err(Error::type_error(format!(
                        "duplicate enum symbol {:?}",
                        symbols[i]
                    )));
                }
            }
        }
        if let Some(d) = &default {
            if !symbols.iter().any(|s| s == d) {
                return Err(Error::type_error(format!(
                    "enum default {d:?} is not a declared symbol"
                )));
            }
        }
        Ok(Schema::new(SchemaKind::Enum(EnumSchema {
            name: name.into(),
            symbols,
            default,
        })))
    }

    pub fn array(items: SchemaRef) -> Schema {
        Schema::new(SchemaKind::Array(items))
    }

    pub fn map(values: SchemaRef) -> Schema {
        Schema::new(SchemaKind::Map(values))
    }

    /// Builds a union schema.
    ///
    /// Unions may not nest, may not contain two named branches with the same
    /// name, and may not contain two unnamed branches of the same kind.
    pub fn union(branches: Vec<SchemaRef>) -> Result<Schema, Error> {
        for (i, branch) in branches.iter().enumerate() {
            if matches!(branch.kind(), SchemaKind::Union(_)) {
                return Err(Error::type_error("unions may not contain unions"));
            }
            for earlier in &branches[..i] {
                if branches_conflict(earlier, branch) {
                    return Err(Error::type_error(format!(
                        "duplicate union branch {branch}"
                    )));
                }
            }
        }
        Ok(Schema::new(SchemaKind::Union(branches)))
    }

    pub fn fixed(name: impl Into<String>, size: usize) -> Schema {
        Schema::new(SchemaKind::Fixed(FixedSchema {
            name: name.into(),
            size,
        }))
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Adds a property. Re-adding an equal value is a no-op; a different
    /// value is a [`Error::PropertyConflict`].
    pub fn add_prop(
        &mut self,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), Error> {
        let name = name.into();
        match self.props.iter().find(|(n, _)| *n == name) {
            Some((_, existing)) if *existing == value => Ok(()),
            Some((_, existing)) => Err(Error::property_conflict(format!(
                "property {name:?} already set to {existing}, cannot set to {value}"
            ))),
            None => {
                self.props.push((name, value));
                Ok(())
            }
        }
    }

    /// Builder form of [`Schema::add_prop`].
    pub fn with_prop(
        mut self,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<Schema, Error> {
        self.add_prop(name, value)?;
        Ok(self)
    }

    pub fn prop(&self, name: &str) -> Option<&serde_json::Value> {
        self.props.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// All properties, in insertion order.
    pub fn props(&self) -> &[(String, serde_json::Value)] {
        &self.props
    }

    /// The `"logicalType"` property, if declared as a string.
    pub fn logical_type(&self) -> Option<&str> {
        self.prop(LOGICAL_TYPE_PROP).and_then(|v| v.as_str())
    }

    /// The wire representation this schema decodes from, for conversion
    /// dispatch. `None` for containers, records, enums, unions and null.
    pub fn wire_kind(&self) -> Option<WireKind> {
        match &self.kind {
            SchemaKind::Boolean => Some(WireKind::Boolean),
            SchemaKind::Int => Some(WireKind::Int),
            SchemaKind::Long => Some(WireKind::Long),
            SchemaKind::Float => Some(WireKind::Float),
            SchemaKind::Double => Some(WireKind::Double),
            SchemaKind::Bytes => Some(WireKind::Bytes),
            SchemaKind::String => Some(WireKind::String),
            SchemaKind::Fixed(_) => Some(WireKind::Fixed),
            _ => None,
        }
    }

    /// Wraps the schema for sharing. Construction is complete at this point;
    /// the node is immutable from here on.
    pub fn shared(self) -> SchemaRef {
        Arc::new(self)
    }
}

/// Two union branches conflict when both are named types with the same name
/// or both are unnamed types of the same kind.
fn branches_conflict(a: &Schema, b: &Schema) -> bool {
    use SchemaKind::*;
    match (a.kind(), b.kind()) {
        (Record(x), Record(y)) => x.name == y.name,
        (Enum(x), Enum(y)) => x.name == y.name,
        (Fixed(x), Fixed(y)) => x.name == y.name,
        (Null, Null)
        | (Boolean, Boolean)
        | (Int, Int)
        | (Long, Long)
        | (Float, Float)
        | (Double, Double)
        | (Bytes, Bytes)
        | (String, String)
        | (Array(_), Array(_))
        | (Map(_), Map(_)) => true,
        _ => false,
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SchemaKind::Null => write!(f, "null"),
            SchemaKind::Boolean => write!(f, "boolean"),
            SchemaKind::Int => write!(f, "int"),
            SchemaKind::Long => write!(f, "long"),
            SchemaKind::Float => write!(f, "float"),
            SchemaKind::Double => write!(f, "double"),
            SchemaKind::Bytes => write!(f, "bytes"),
            SchemaKind::String => write!(f, "string"),
            SchemaKind::Record(r) => write!(f, "record {}", r.name),
            SchemaKind::Enum(e) => write!(f, "enum {}", e.name),
            SchemaKind::Array(items) => write!(f, "array<{items}>"),
            SchemaKind::Map(values) => write!(f, "map<{values}>"),
            SchemaKind::Union(branches) => {
                write!(f, "union[")?;
                for (i, b) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{b}")?;
                }
                write!(f, "]")
            }
            SchemaKind::Fixed(x) => write!(f, "fixed {}({})", x.name, x.size),
        }
    }
}
