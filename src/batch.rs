//! Converting many SQL files at once.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dialect::Dialect;
use crate::error::{TranspileError, TranspileResult};
use crate::pipeline::Transpiler;
use crate::tokenizer::split_statements;

/// One unit of batch work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub id: String,
    pub sql: String,
}

/// Read batch items from a directory of `*.sql` files, or split a single
/// file into its statements.
pub fn collect_inputs(path: &Path, dialect: Dialect) -> TranspileResult<Vec<BatchItem>> {
    if path.is_dir() {
        let mut files = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        files.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("sql")));
        files.sort();

        return files
            .into_iter()
            .map(|file| -> TranspileResult<BatchItem> {
                Ok(BatchItem {
                    id: file_stem(&file),
                    sql: fs::read_to_string(&file)?,
                })
            })
            .collect();
    }

    if !path.is_file() {
        return Err(TranspileError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("'{}' is neither a file nor a directory", path.display()),
        )));
    }

    let stem = file_stem(path);
    let content = fs::read_to_string(path)?;
    Ok(split_statements(&content, dialect)?
        .into_iter()
        .enumerate()
        .map(|(i, sql)| BatchItem {
            id: format!("{}#{}", stem, i + 1),
            sql,
        })
        .collect())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Converted { sql: Vec<String>, notes: Vec<String> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub id: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub read: Dialect,
    pub write: Dialect,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn converted(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Converted { sql, .. } => Some((item.id.as_str(), sql.as_slice())),
            ItemOutcome::Failed { .. } => None,
        })
    }
}

/// Transpile every item independently; failures don't stop the batch.
pub fn run(transpiler: &Transpiler, items: Vec<BatchItem>) -> BatchReport {
    let mut reports = Vec::with_capacity(items.len());
    let mut failed = 0;

    for item in items {
        let outcome = match transpiler.transpile_detailed(&item.sql) {
            Ok(statements) => {
                let (sql, notes) = statements
                    .into_iter()
                    .fold((Vec::new(), Vec::new()), |(mut sql, mut notes), t| {
                        sql.push(t.sql);
                        notes.extend(t.notes);
                        (sql, notes)
                    });
                ItemOutcome::Converted { sql, notes }
            }
            Err(e) => {
                tracing::warn!(id = %item.id, error = %e, "batch item failed");
                failed += 1;
                ItemOutcome::Failed { error: e.to_string() }
            }
        };
        reports.push(ItemReport { id: item.id, outcome });
    }

    let total = reports.len();
    tracing::info!(total, succeeded = total - failed, failed, "batch finished");

    BatchReport {
        read: transpiler.read(),
        write: transpiler.write(),
        generated_at: Utc::now(),
        total,
        succeeded: total - failed,
        failed,
        items: reports,
    }
}

/// Write `<id>.sql` per converted item plus `report.json`. Returns the
/// paths written.
pub fn write_outputs(report: &BatchReport, out_dir: &Path) -> TranspileResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    for (id, statements) in report.converted() {
        let path = out_dir.join(format!("{}.sql", id.replace('#', "_")));
        let mut content = statements.join(";\n");
        content.push_str(";\n");
        fs::write(&path, content)?;
        written.push(path);
    }

    let path = out_dir.join("report.json");
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    written.push(path);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_collect_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.sql"), "SELECT 2").unwrap();
        fs::write(dir.path().join("a.sql"), "SELECT 1").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let items = collect_inputs(dir.path(), Dialect::Spark).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(items[0].sql, "SELECT 1");
    }

    #[test]
    fn test_collect_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.sql");
        fs::write(&path, "SELECT 1;\n-- second\nSELECT 2;\n").unwrap();

        let items = collect_inputs(&path, Dialect::Spark).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["jobs#1", "jobs#2"]);
        assert_eq!(items[0].sql, "SELECT 1");
    }

    #[test]
    fn test_collect_missing_path() {
        let dir = tempdir().unwrap();
        assert!(collect_inputs(&dir.path().join("nope"), Dialect::Spark).is_err());
    }

    #[test]
    fn test_run_continues_after_failure() {
        let transpiler = Transpiler::new(Dialect::Spark, Dialect::Doris);
        let items = vec![
            BatchItem {
                id: "ok".to_string(),
                sql: "select nvl(a, 0) from t".to_string(),
            },
            BatchItem {
                id: "bad".to_string(),
                sql: "SELECT a FROM".to_string(),
            },
            BatchItem {
                id: "ok2".to_string(),
                sql: "select 1; select 2".to_string(),
            },
        ];

        let report = run(&transpiler, items);
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(matches!(report.items[1].outcome, ItemOutcome::Failed { .. }));
        assert_eq!(
            report.items[0].outcome,
            ItemOutcome::Converted {
                sql: vec!["SELECT IFNULL(a, 0) FROM t".to_string()],
                notes: Vec::new(),
            }
        );
    }

    #[test]
    fn test_deep_nesting_fails_one_item() {
        let transpiler = Transpiler::new(Dialect::Spark, Dialect::Doris);
        let items = vec![
            BatchItem {
                id: "deep".to_string(),
                sql: format!("SELECT {}1{}", "(".repeat(500), ")".repeat(500)),
            },
            BatchItem {
                id: "ok".to_string(),
                sql: "SELECT 1".to_string(),
            },
        ];

        let report = run(&transpiler, items);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert!(matches!(report.items[0].outcome, ItemOutcome::Failed { .. }));
    }

    #[test]
    fn test_write_outputs() {
        let transpiler = Transpiler::new(Dialect::Spark, Dialect::Doris);
        let items = vec![
            BatchItem {
                id: "jobs#1".to_string(),
                sql: "select 1; select 2".to_string(),
            },
            BatchItem {
                id: "broken".to_string(),
                sql: "select split(s, '[,;]') from t".to_string(),
            },
        ];
        let report = run(&transpiler, items);

        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let written = write_outputs(&report, &out).unwrap();
        assert_eq!(written.len(), 2);

        let sql = fs::read_to_string(out.join("jobs_1.sql")).unwrap();
        assert_eq!(sql, "SELECT 1;\nSELECT 2;\n");
        assert!(!out.join("broken.sql").exists());

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
        assert_eq!(json["read"], "spark");
        assert_eq!(json["write"], "doris");
        assert_eq!(json["failed"], 1);
        assert_eq!(json["items"][0]["status"], "converted");
        assert_eq!(json["items"][1]["status"], "failed");
        assert_eq!(json["items"][1]["id"], "broken");
    }
}
