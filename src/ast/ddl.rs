use serde::Serialize;

use super::{DataType, Expr, Ident, ObjectName, Query};

/// `INSERT INTO|OVERWRITE [TABLE] t [(cols)] [PARTITION (...)] <query>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insert {
    pub overwrite: bool,
    pub table: ObjectName,
    pub columns: Vec<Ident>,
    pub partition: Vec<PartitionSpec>,
    pub source: Box<Query>,
}

/// One entry of an insert's `PARTITION (...)` clause. `value` is `None` for
/// a dynamic partition column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionSpec {
    pub column: Ident,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTable {
    pub name: ObjectName,
    pub if_not_exists: bool,
    pub external: bool,
    pub columns: Vec<ColumnDef>,
    pub partitioned_by: Vec<PartitionColumn>,
    pub comment: Option<String>,
    /// `USING parquet` / `STORED AS ORC`
    pub file_format: Option<String>,
    pub location: Option<String>,
    pub key: Option<TableKey>,
    pub distribution: Option<Distribution>,
    /// `TBLPROPERTIES` / `PROPERTIES`
    pub properties: Vec<(String, String)>,
    pub as_query: Option<Box<Query>>,
}

impl CreateTable {
    pub fn new(name: ObjectName) -> Self {
        Self {
            name,
            if_not_exists: false,
            external: false,
            columns: Vec::new(),
            partitioned_by: Vec::new(),
            comment: None,
            file_format: None,
            location: None,
            key: None,
            distribution: None,
            properties: Vec::new(),
            as_query: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: Ident,
    pub data_type: DataType,
    pub not_null: bool,
    pub comment: Option<String>,
}

/// `PARTITIONED BY (dt)` or Hive style `PARTITIONED BY (dt STRING)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionColumn {
    pub name: Ident,
    pub data_type: Option<DataType>,
}

/// Doris data model key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableKey {
    pub kind: KeyKind,
    pub columns: Vec<Ident>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyKind {
    Duplicate,
    Unique,
    Aggregate,
}

impl KeyKind {
    pub fn keyword(self) -> &'static str {
        match self {
            KeyKind::Duplicate => "DUPLICATE",
            KeyKind::Unique => "UNIQUE",
            KeyKind::Aggregate => "AGGREGATE",
        }
    }
}

/// Doris `DISTRIBUTED BY HASH(cols) BUCKETS n|AUTO`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub columns: Vec<Ident>,
    /// `None` is `BUCKETS AUTO`.
    pub buckets: Option<u32>,
}
