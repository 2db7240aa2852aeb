//! Scalar kinds, values, and host-type → SQL Server type mapping.
//!
//! Every mapped column carries one of a closed set of [`ScalarKind`]s; the
//! SQL type keyword is derived from the kind, and length / precision / scale
//! suffixes are rendered from per-column configuration where present.
//!
//! Host types opt in through the [`Scalar`] trait. Nullable members are
//! `Option<T>`, which unwraps to the underlying kind; record-local enums
//! participate by implementing `Scalar` with their underlying integral kind,
//! since the wire formats have no enum concept.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The closed set of scalar kinds a column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Uuid,
    Bool,
    UInt8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    DateTime,
    Char,
    String,
    Bytes,
}

impl ScalarKind {
    /// The SQL Server type keyword for this kind, without any length,
    /// precision, or scale suffix.
    pub fn sql_type(self) -> &'static str {
        match self {
            ScalarKind::Uuid => "uniqueidentifier",
            ScalarKind::Bool => "bit",
            ScalarKind::UInt8 => "tinyint",
            ScalarKind::Int16 => "smallint",
            ScalarKind::Int32 => "int",
            ScalarKind::Int64 => "bigint",
            ScalarKind::Float32 | ScalarKind::Float64 => "float",
            ScalarKind::Decimal => "decimal",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Char | ScalarKind::String | ScalarKind::Bytes => "nvarchar",
        }
    }

    /// Whether this kind renders a `(<length>|max)` suffix.
    pub(crate) fn is_sized(self) -> bool {
        matches!(self, ScalarKind::String)
    }

    /// Whether this kind renders a `(<precision>,<scale>)` suffix when one
    /// is configured.
    pub(crate) fn is_fixed_point(self) -> bool {
        matches!(
            self,
            ScalarKind::Decimal | ScalarKind::Float32 | ScalarKind::Float64
        )
    }
}

/// An owned scalar value.
///
/// Used wherever a filter or assignment carries a literal rather than a
/// parameter placeholder, and when serializing record batches.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Uuid(Uuid),
    Bool(bool),
    UInt8(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    /// Check if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

/// Conversion from a host scalar type into its kind/value pair.
pub trait Scalar {
    /// The kind this type maps to.
    const KIND: ScalarKind;

    /// Convert into an owned scalar value.
    fn into_scalar(self) -> ScalarValue;
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn into_scalar(self) -> ScalarValue {
                    ScalarValue::$kind(self)
                }
            }
        )*
    };
}

impl_scalar! {
    Uuid => Uuid,
    bool => Bool,
    u8 => UInt8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Decimal,
    NaiveDateTime => DateTime,
    char => Char,
    String => String,
}

impl Scalar for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::DateTime;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::DateTime(self.naive_utc())
    }
}

impl Scalar for &str {
    const KIND: ScalarKind = ScalarKind::String;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::String(self.to_string())
    }
}

impl Scalar for Vec<u8> {
    const KIND: ScalarKind = ScalarKind::Bytes;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Bytes(self)
    }
}

impl Scalar for &[u8] {
    const KIND: ScalarKind = ScalarKind::Bytes;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Bytes(self.to_vec())
    }
}

impl<T: Scalar> Scalar for Option<T> {
    const KIND: ScalarKind = T::KIND;

    fn into_scalar(self) -> ScalarValue {
        match self {
            Some(value) => value.into_scalar(),
            None => ScalarValue::Null,
        }
    }
}
