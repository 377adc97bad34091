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

use std::borrow::Cow;

use thiserror::Error;

/// Error type for datum schema resolution, encoding and decoding.
///
/// Prefer the static constructor functions ([`Error::schema_incompatible`],
/// [`Error::malformed_data`], ...) over constructing variants directly: they
/// accept anything convertible into a `Cow<'static, str>` and keep the cold
/// error paths out of the way of the hot decode loop.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The resolver cannot reconcile the writer and reader schemas: a type
    /// mismatch beyond the allowed promotions, a reader field with no writer
    /// counterpart and no default, an unresolvable union branch, or an enum
    /// symbol unknown to the reader with no declared default.
    #[error("incompatible schemas: {0}")]
    SchemaIncompatible(Cow<'static, str>),

    /// The wire bytes violate the binary format: truncated input, a negative
    /// length where none is allowed, or a union/enum index out of range.
    /// The stream position is unspecified after this error.
    #[error("malformed data: {0}")]
    MalformedData(Cow<'static, str>),

    /// A registered conversion was handed a value it cannot convert.
    ///
    /// A logical type with no registered conversion is *not* an error; the
    /// raw wire value passes through unconverted.
    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(Cow<'static, str>),

    /// An attempt to redefine an existing schema property to a different
    /// value. Raised at schema construction time, never during decode.
    #[error("property conflict: {0}")]
    PropertyConflict(Cow<'static, str>),

    /// A value whose kind does not match the schema it is being encoded
    /// under, or an invalid schema construction (duplicate union branches,
    /// a default value not assignable to its field schema).
    #[error("type error: {0}")]
    TypeError(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::SchemaIncompatible`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn schema_incompatible<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::SchemaIncompatible(s.into())
    }

    /// Creates a new [`Error::MalformedData`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn malformed_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::MalformedData(s.into())
    }

    /// Creates a new [`Error::UnsupportedConversion`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported_conversion<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::UnsupportedConversion(s.into())
    }

    /// Creates a new [`Error::PropertyConflict`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn property_conflict<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::PropertyConflict(s.into())
    }

    /// Creates a new [`Error::TypeError`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::TypeError(s.into())
    }
}

/// Ensures a condition holds; otherwise returns the given [`enum@Error`].
///
/// # Examples
/// ```
/// use datum_core::ensure;
/// use datum_core::error::Error;
///
/// fn check_index(idx: usize, len: usize) -> Result<(), Error> {
///     ensure!(idx < len, Error::malformed_data(format!("index {idx} out of range")));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Returns early with a [`Error::SchemaIncompatible`], formatting the
/// message like [`format!`].
#[macro_export]
macro_rules! incompatible {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::schema_incompatible(format!($($arg)*)))
    };
}
