//! Row-to-JSON decoding for the bundled sqlx drivers.
//!
//! Column types are first classified into a logical category, then a
//! database-specific decoder extracts the value. Binary columns encode as
//! base64 strings.

use crate::models::{FieldMeta, Row};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value as JsonValue;

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Binary,
    Json,
    Text,
}

pub(crate) fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric before the float checks, which also match "numeric"
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }
    // Binary and text before the integer check: TINYBLOB/TINYTEXT would
    // otherwise match on "tiny"
    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }
    if lower.contains("char") || lower.contains("text") {
        return TypeCategory::Text;
    }
    if lower.contains("int") || lower.contains("serial") || lower.contains("tiny") {
        return TypeCategory::Integer;
    }
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }
    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }
    // date, time, datetime, uuid, ...
    TypeCategory::Text
}

fn encode_binary(bytes: &[u8]) -> JsonValue {
    JsonValue::String(STANDARD.encode(bytes))
}

/// Conversion from a database row to the wrapper's row and field shapes.
pub(crate) trait RowDecode {
    fn to_row(&self) -> Row;
    fn field_meta(&self) -> Vec<FieldMeta>;
}

#[cfg(feature = "mysql")]
mod mysql {
    use super::*;
    use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
    use sqlx::{Column, Decode, Row as _, Type, TypeInfo};

    /// Raw DECIMAL values as strings, preserving the exact database
    /// representation.
    struct RawDecimal(String);

    impl Type<sqlx::MySql> for RawDecimal {
        fn type_info() -> MySqlTypeInfo {
            <String as Type<sqlx::MySql>>::type_info()
        }

        fn compatible(ty: &MySqlTypeInfo) -> bool {
            let name = ty.name().to_lowercase();
            name.contains("decimal") || name.contains("numeric")
        }
    }

    impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
        fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
            let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
            Ok(RawDecimal(s.to_string()))
        }
    }

    impl RowDecode for MySqlRow {
        fn to_row(&self) -> Row {
            self.columns()
                .iter()
                .enumerate()
                .map(|(idx, col)| {
                    let type_name = col.type_info().name();
                    let category = categorize_type(type_name);
                    (col.name().to_string(), decode_column(self, idx, category))
                })
                .collect()
        }

        fn field_meta(&self) -> Vec<FieldMeta> {
            self.columns()
                .iter()
                .map(|col| {
                    FieldMeta::new(col.name(), col.type_info().name(), col.type_info().is_null())
                })
                .collect()
        }
    }

    fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Decimal => match row.try_get::<Option<RawDecimal>, _>(idx) {
                Ok(Some(v)) => JsonValue::String(v.0),
                _ => JsonValue::Null,
            },
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map(JsonValue::Bool)
                .unwrap_or(JsonValue::Null),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)
                .ok()
                .flatten()
                .map(|v| encode_binary(&v))
                .unwrap_or(JsonValue::Null),
            TypeCategory::Json => row
                .try_get::<Option<serde_json::Value>, _>(idx)
                .ok()
                .flatten()
                .unwrap_or(JsonValue::Null),
            TypeCategory::Text => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(JsonValue::String)
                .unwrap_or(JsonValue::Null),
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Null;
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return serde_json::Number::from_f64(v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string()));
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return serde_json::Number::from_f64(v as f64)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string()));
        }
        JsonValue::Null
    }
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use sqlx::sqlite::SqliteRow;
    use sqlx::{Column, Row as _, TypeInfo};

    impl RowDecode for SqliteRow {
        fn to_row(&self) -> Row {
            self.columns()
                .iter()
                .enumerate()
                .map(|(idx, col)| {
                    let type_name = col.type_info().name();
                    let category = categorize_type(type_name);
                    (col.name().to_string(), decode_column(self, idx, category))
                })
                .collect()
        }

        fn field_meta(&self) -> Vec<FieldMeta> {
            self.columns()
                .iter()
                .map(|col| {
                    FieldMeta::new(col.name(), col.type_info().name(), col.type_info().is_null())
                })
                .collect()
        }
    }

    fn decode_column(row: &SqliteRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            // SQLite stores NUMERIC affinities as REAL or TEXT; try both.
            TypeCategory::Decimal | TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Integer => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into()))
                .unwrap_or(JsonValue::Null),
            TypeCategory::Boolean => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map(JsonValue::Bool)
                .unwrap_or(JsonValue::Null),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)
                .ok()
                .flatten()
                .map(|v| encode_binary(&v))
                .unwrap_or(JsonValue::Null),
            TypeCategory::Json | TypeCategory::Text => decode_text(row, idx, category),
        }
    }

    fn decode_float(row: &SqliteRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return serde_json::Number::from_f64(v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string()));
        }
        row.try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null)
    }

    fn decode_text(row: &SqliteRow, idx: usize, category: TypeCategory) -> JsonValue {
        match row.try_get::<Option<String>, _>(idx) {
            Ok(Some(v)) => {
                if category == TypeCategory::Json {
                    if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                        return json;
                    }
                }
                JsonValue::String(v)
            }
            _ => JsonValue::Null,
        }
    }
}
