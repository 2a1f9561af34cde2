use std::{borrow::Cow, fmt::Write};

use arrow::{
    array::{Array, AsArray},
    datatypes::{
        i256, DataType, Date32Type, Date64Type, Decimal128Type, Decimal256Type, Float32Type,
        Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, TimeUnit,
        TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
        TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
};

use crate::partition::ConversionFailure;

/// A partition column value lowered from either an Arrow cell or a query literal.
#[derive(Clone, Debug, PartialEq)]
pub enum PartitionValue<'a> {
    /// SQL null.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Any signed integer, date, or timestamp (raw stored value).
    Int(i64),
    /// Any unsigned integer.
    UInt(u64),
    /// 32-bit float, rendered at its native width.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Fixed-point decimal: `unscaled * 10^-scale`, rendered as plain decimal text.
    Decimal {
        /// Unscaled integer value.
        unscaled: i256,
        /// Digits after the decimal point; negative scales multiply by powers of ten.
        scale: i8,
    },
    /// UTF-8 text.
    Utf8(Cow<'a, str>),
    /// Raw bytes, rendered as lowercase hex.
    Binary(Cow<'a, [u8]>),
}

macro_rules! primitive_value {
    ($column:expr, $row:expr, $arrow_ty:ty, $variant:ident) => {
        $column
            .as_primitive_opt::<$arrow_ty>()
            .map(|array| PartitionValue::$variant(array.value($row).into()))
    };
}

macro_rules! dictionary_entry {
    ($column:expr, $row:expr, $key_ty:ty) => {
        $column
            .as_dictionary_opt::<$key_ty>()
            .map(|dict| (dict.values(), dict.key($row)))
    };
}

impl<'a> PartitionValue<'a> {
    /// Read the value at `row` of `column`, borrowing variable-width data.
    pub fn from_array(column: &'a dyn Array, row: usize) -> Result<Self, ConversionFailure> {
        if row >= column.len() {
            return Err(ConversionFailure::RowOutOfBounds {
                row,
                num_rows: column.len(),
            });
        }
        if column.is_null(row) {
            return Ok(PartitionValue::Null);
        }
        let data_type = column.data_type();
        let value = match data_type {
            DataType::Boolean => column
                .as_boolean_opt()
                .map(|array| PartitionValue::Boolean(array.value(row))),
            DataType::Int8 => primitive_value!(column, row, Int8Type, Int),
            DataType::Int16 => primitive_value!(column, row, Int16Type, Int),
            DataType::Int32 => primitive_value!(column, row, Int32Type, Int),
            DataType::Int64 => primitive_value!(column, row, Int64Type, Int),
            DataType::UInt8 => primitive_value!(column, row, UInt8Type, UInt),
            DataType::UInt16 => primitive_value!(column, row, UInt16Type, UInt),
            DataType::UInt32 => primitive_value!(column, row, UInt32Type, UInt),
            DataType::UInt64 => primitive_value!(column, row, UInt64Type, UInt),
            DataType::Float32 => primitive_value!(column, row, Float32Type, Float32),
            DataType::Float64 => primitive_value!(column, row, Float64Type, Float64),
            DataType::Date32 => primitive_value!(column, row, Date32Type, Int),
            DataType::Date64 => primitive_value!(column, row, Date64Type, Int),
            DataType::Timestamp(TimeUnit::Second, _) => {
                primitive_value!(column, row, TimestampSecondType, Int)
            }
            DataType::Timestamp(TimeUnit::Millisecond, _) => {
                primitive_value!(column, row, TimestampMillisecondType, Int)
            }
            DataType::Timestamp(TimeUnit::Microsecond, _) => {
                primitive_value!(column, row, TimestampMicrosecondType, Int)
            }
            DataType::Timestamp(TimeUnit::Nanosecond, _) => {
                primitive_value!(column, row, TimestampNanosecondType, Int)
            }
            DataType::Utf8 => column
                .as_string_opt::<i32>()
                .map(|array| PartitionValue::Utf8(Cow::Borrowed(array.value(row)))),
            DataType::LargeUtf8 => column
                .as_string_opt::<i64>()
                .map(|array| PartitionValue::Utf8(Cow::Borrowed(array.value(row)))),
            DataType::Binary => column
                .as_binary_opt::<i32>()
                .map(|array| PartitionValue::Binary(Cow::Borrowed(array.value(row)))),
            DataType::LargeBinary => column
                .as_binary_opt::<i64>()
                .map(|array| PartitionValue::Binary(Cow::Borrowed(array.value(row)))),
            DataType::FixedSizeBinary(_) => column
                .as_fixed_size_binary_opt()
                .map(|array| PartitionValue::Binary(Cow::Borrowed(array.value(row)))),
            DataType::Utf8View => column
                .as_string_view_opt()
                .map(|array| PartitionValue::Utf8(Cow::Borrowed(array.value(row)))),
            DataType::BinaryView => column
                .as_binary_view_opt()
                .map(|array| PartitionValue::Binary(Cow::Borrowed(array.value(row)))),
            DataType::Decimal128(_, scale) => column
                .as_primitive_opt::<Decimal128Type>()
                .map(|array| PartitionValue::decimal128(array.value(row), *scale)),
            DataType::Decimal256(_, scale) => column
                .as_primitive_opt::<Decimal256Type>()
                .map(|array| PartitionValue::decimal256(array.value(row), *scale)),
            DataType::Dictionary(key_type, _) => {
                return Self::from_dictionary(column, key_type, row);
            }
            other => return Err(ConversionFailure::UnsupportedType(other.clone())),
        };
        value.ok_or_else(|| ConversionFailure::ArrayMismatch(data_type.clone()))
    }

    /// Decimal from a 128-bit unscaled value.
    pub fn decimal128(unscaled: i128, scale: i8) -> Self {
        PartitionValue::Decimal {
            unscaled: i256::from_i128(unscaled),
            scale,
        }
    }

    /// Decimal from a 256-bit unscaled value.
    pub fn decimal256(unscaled: i256, scale: i8) -> Self {
        PartitionValue::Decimal { unscaled, scale }
    }

    // Decodes the key at `row` and reads the referenced entry of the values array.
    fn from_dictionary(
        column: &'a dyn Array,
        key_type: &DataType,
        row: usize,
    ) -> Result<Self, ConversionFailure> {
        let entry = match key_type {
            DataType::Int8 => dictionary_entry!(column, row, Int8Type),
            DataType::Int16 => dictionary_entry!(column, row, Int16Type),
            DataType::Int32 => dictionary_entry!(column, row, Int32Type),
            DataType::Int64 => dictionary_entry!(column, row, Int64Type),
            DataType::UInt8 => dictionary_entry!(column, row, UInt8Type),
            DataType::UInt16 => dictionary_entry!(column, row, UInt16Type),
            DataType::UInt32 => dictionary_entry!(column, row, UInt32Type),
            DataType::UInt64 => dictionary_entry!(column, row, UInt64Type),
            _ => None,
        };
        match entry {
            Some((values, Some(key))) => Self::from_array(values.as_ref(), key),
            Some((_, None)) => Ok(PartitionValue::Null),
            None => Err(ConversionFailure::ArrayMismatch(column.data_type().clone())),
        }
    }

    /// Detach any borrowed data.
    pub fn into_owned(self) -> PartitionValue<'static> {
        match self {
            PartitionValue::Null => PartitionValue::Null,
            PartitionValue::Boolean(v) => PartitionValue::Boolean(v),
            PartitionValue::Int(v) => PartitionValue::Int(v),
            PartitionValue::UInt(v) => PartitionValue::UInt(v),
            PartitionValue::Float32(v) => PartitionValue::Float32(v),
            PartitionValue::Float64(v) => PartitionValue::Float64(v),
            PartitionValue::Decimal { unscaled, scale } => {
                PartitionValue::Decimal { unscaled, scale }
            }
            PartitionValue::Utf8(v) => PartitionValue::Utf8(Cow::Owned(v.into_owned())),
            PartitionValue::Binary(v) => PartitionValue::Binary(Cow::Owned(v.into_owned())),
        }
    }

    /// Whether this is SQL null.
    pub fn is_null(&self) -> bool {
        matches!(self, PartitionValue::Null)
    }

    /// Natural text form of a non-null value. Null renders empty; callers
    /// substitute the default-null value before reaching here.
    pub(crate) fn render(&self) -> String {
        match self {
            PartitionValue::Null => String::new(),
            PartitionValue::Boolean(v) => v.to_string(),
            PartitionValue::Int(v) => v.to_string(),
            PartitionValue::UInt(v) => v.to_string(),
            PartitionValue::Float32(v) => v.to_string(),
            PartitionValue::Float64(v) => v.to_string(),
            PartitionValue::Decimal { unscaled, scale } => render_decimal(*unscaled, *scale),
            PartitionValue::Utf8(v) => v.to_string(),
            PartitionValue::Binary(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2);
                for byte in bytes.iter() {
                    let _ = write!(out, "{byte:02x}");
                }
                out
            }
        }
    }
}

/// Plain decimal text: no exponent, trailing zeros up to `scale` kept.
fn render_decimal(unscaled: i256, scale: i8) -> String {
    let digits = unscaled.to_string();
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    if scale <= 0 {
        let zeros = if magnitude == "0" { 0 } else { usize::from(scale.unsigned_abs()) };
        return format!("{sign}{magnitude}{}", "0".repeat(zeros));
    }
    let scale = usize::from(scale.unsigned_abs());
    if magnitude.len() > scale {
        let (whole, fraction) = magnitude.split_at(magnitude.len() - scale);
        format!("{sign}{whole}.{fraction}")
    } else {
        format!("{sign}0.{}{magnitude}", "0".repeat(scale - magnitude.len()))
    }
}

impl From<bool> for PartitionValue<'_> {
    fn from(value: bool) -> Self {
        PartitionValue::Boolean(value)
    }
}

impl From<i32> for PartitionValue<'_> {
    fn from(value: i32) -> Self {
        PartitionValue::Int(value.into())
    }
}

impl From<i64> for PartitionValue<'_> {
    fn from(value: i64) -> Self {
        PartitionValue::Int(value)
    }
}

impl From<u32> for PartitionValue<'_> {
    fn from(value: u32) -> Self {
        PartitionValue::UInt(value.into())
    }
}

impl From<u64> for PartitionValue<'_> {
    fn from(value: u64) -> Self {
        PartitionValue::UInt(value)
    }
}

impl From<f32> for PartitionValue<'_> {
    fn from(value: f32) -> Self {
        PartitionValue::Float32(value)
    }
}

impl From<f64> for PartitionValue<'_> {
    fn from(value: f64) -> Self {
        PartitionValue::Float64(value)
    }
}

impl<'a> From<&'a str> for PartitionValue<'a> {
    fn from(value: &'a str) -> Self {
        PartitionValue::Utf8(Cow::Borrowed(value))
    }
}

impl From<String> for PartitionValue<'_> {
    fn from(value: String) -> Self {
        PartitionValue::Utf8(Cow::Owned(value))
    }
}

impl<'a> From<&'a [u8]> for PartitionValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        PartitionValue::Binary(Cow::Borrowed(value))
    }
}

impl From<Vec<u8>> for PartitionValue<'_> {
    fn from(value: Vec<u8>) -> Self {
        PartitionValue::Binary(Cow::Owned(value))
    }
}

impl<'a, T> From<Option<T>> for PartitionValue<'a>
where
    T: Into<PartitionValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(PartitionValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_rendering_is_shortest_round_trip() {
        assert_eq!(PartitionValue::from(0.1f64).render(), "0.1");
        assert_eq!(PartitionValue::from(-0.0f64).render(), "-0");
        assert_eq!(PartitionValue::from(f64::NAN).render(), "NaN");
        assert_eq!(PartitionValue::from(f64::INFINITY).render(), "inf");
        assert_eq!(PartitionValue::from(1e21f64).render(), "1000000000000000000000");
    }

    #[test]
    fn decimal_rendering_honours_scale() {
        assert_eq!(PartitionValue::decimal128(12_345, 2).render(), "123.45");
        assert_eq!(PartitionValue::decimal128(-5, 3).render(), "-0.005");
        assert_eq!(PartitionValue::decimal128(150, 2).render(), "1.50");
        assert_eq!(PartitionValue::decimal128(12, -2).render(), "1200");
        assert_eq!(PartitionValue::decimal128(0, -2).render(), "0");
        assert_eq!(PartitionValue::decimal128(42, 0).render(), "42");
        assert_eq!(
            PartitionValue::decimal256(i256::from_i128(-12_345), 4).render(),
            "-1.2345"
        );
    }

    #[test]
    fn out_of_bounds_row_is_reported() {
        let column = arrow::array::Int32Array::from(vec![1]);
        assert_eq!(
            PartitionValue::from_array(&column, 3),
            Err(ConversionFailure::RowOutOfBounds {
                row: 3,
                num_rows: 1
            })
        );
    }

    #[test]
    fn options_lower_to_null() {
        assert!(PartitionValue::from(None::<i64>).is_null());
        assert_eq!(PartitionValue::from(Some("x")), PartitionValue::from("x"));
    }

    #[test]
    fn into_owned_preserves_value() {
        let text = String::from("abc");
        let borrowed = PartitionValue::from(text.as_str());
        let owned = borrowed.clone().into_owned();
        drop(text);
        assert_eq!(owned, PartitionValue::Utf8(Cow::Owned("abc".to_string())));
    }
}
