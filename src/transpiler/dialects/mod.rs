//! Per-dialect spelling.

mod doris;
mod hive;
mod mysql;
mod spark;

pub use doris::DorisGenerator;
pub use hive::HiveGenerator;
pub use mysql::MySqlGenerator;
pub use spark::SparkGenerator;
