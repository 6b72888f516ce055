use serde::Serialize;

use super::Ident;

/// Column and cast target types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    String,
    Varchar(Option<u32>),
    Char(Option<u32>),
    Date,
    /// `TIMESTAMP` in Spark/Hive, `DATETIME` in Doris/MySQL.
    Timestamp,
    Binary,
    Array(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Struct(Vec<StructField>),
    /// Anything else, kept verbatim (e.g. `LARGEINT`, `JSON`).
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructField {
    pub name: Ident,
    pub data_type: DataType,
}

impl DataType {
    /// Types nested inside another type.
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::Array(_) | DataType::Map(..) | DataType::Struct(_))
    }

    /// Approximate numerics, which Doris refuses as key columns.
    pub fn is_floating(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }
}
