//! Checks Spark/Doris example pairs in a migration guide.
//!
//! Every Spark code block is transpiled and compared with the Doris block
//! that follows it, so the guide and the transpiler can't drift apart.

use serde::Serialize;

use crate::pipeline::Transpiler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Spark,
    Doris,
}

#[derive(Debug)]
struct CodeBlock {
    /// 1-based line of the opening fence.
    line: usize,
    side: Side,
    sql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PairOutcome {
    Match,
    Mismatch { expected: String, actual: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairResult {
    pub spark_line: usize,
    pub doris_line: usize,
    #[serde(flatten)]
    pub outcome: PairOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GuideReport {
    pub pairs: Vec<PairResult>,
    /// Lines of Spark blocks with no Doris counterpart.
    pub unpaired: Vec<usize>,
}

impl GuideReport {
    pub fn is_clean(&self) -> bool {
        self.unpaired.is_empty() && self.pairs.iter().all(|p| p.outcome == PairOutcome::Match)
    }

    pub fn matched(&self) -> usize {
        self.pairs.iter().filter(|p| p.outcome == PairOutcome::Match).count()
    }
}

/// Scan `markdown` and check every Spark/Doris pair.
pub fn check_guide(markdown: &str, transpiler: &Transpiler) -> GuideReport {
    let mut report = GuideReport::default();
    let mut pending: Option<CodeBlock> = None;

    for block in scan_blocks(markdown) {
        match block.side {
            Side::Spark => {
                if let Some(previous) = pending.replace(block) {
                    report.unpaired.push(previous.line);
                }
            }
            Side::Doris => {
                if let Some(spark) = pending.take() {
                    report.pairs.push(check_pair(&spark, &block, transpiler));
                }
            }
        }
    }
    if let Some(spark) = pending {
        report.unpaired.push(spark.line);
    }

    tracing::info!(
        pairs = report.pairs.len(),
        matched = report.matched(),
        unpaired = report.unpaired.len(),
        "guide checked"
    );
    report
}

fn check_pair(spark: &CodeBlock, doris: &CodeBlock, transpiler: &Transpiler) -> PairResult {
    let outcome = match transpiler.transpile(&spark.sql) {
        Ok(statements) => {
            let actual = statements.join(";\n");
            if normalize(&actual) == normalize(&doris.sql) {
                PairOutcome::Match
            } else {
                PairOutcome::Mismatch {
                    expected: doris.sql.trim().to_string(),
                    actual,
                }
            }
        }
        Err(e) => PairOutcome::Error { message: e.to_string() },
    };
    PairResult {
        spark_line: spark.line,
        doris_line: doris.line,
        outcome,
    }
}

fn scan_blocks(markdown: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut last_text: Option<&str> = None;
    let mut lines = markdown.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let Some((fence, info)) = opening_fence(line) else {
            if !line.trim().is_empty() {
                last_text = Some(line);
            }
            continue;
        };

        let mut body = Vec::new();
        for (_, line) in lines.by_ref() {
            if closes(line, &fence) {
                break;
            }
            body.push(line);
        }

        let side = side_from_info(&info).or_else(|| last_text.and_then(side_from_text));
        if let Some(side) = side {
            blocks.push(CodeBlock {
                line: index + 1,
                side,
                sql: body.join("\n"),
            });
        }
    }
    blocks
}

/// The fence string and lower-cased info word of an opening fence line.
fn opening_fence(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].split_whitespace().next().unwrap_or_default().to_ascii_lowercase();
    Some((marker.to_string().repeat(len), info))
}

fn closes(line: &str, fence: &str) -> bool {
    let trimmed = line.trim();
    let Some(marker) = fence.chars().next() else {
        return false;
    };
    trimmed.len() >= fence.len() && trimmed.chars().all(|c| c == marker)
}

fn side_from_info(info: &str) -> Option<Side> {
    match info {
        "spark" | "sparksql" | "spark-sql" => Some(Side::Spark),
        "doris" => Some(Side::Doris),
        _ => None,
    }
}

/// Whichever of "spark" / "doris" is mentioned last in the line.
fn side_from_text(line: &str) -> Option<Side> {
    let lower = line.to_ascii_lowercase();
    match (lower.rfind("spark"), lower.rfind("doris")) {
        (Some(s), Some(d)) if s > d => Some(Side::Spark),
        (Some(_), Some(_)) => Some(Side::Doris),
        (Some(_), None) => Some(Side::Spark),
        (None, Some(_)) => Some(Side::Doris),
        (None, None) => None,
    }
}

/// Collapse whitespace, fold case outside string literals and drop the
/// trailing semicolon.
fn normalize(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    let mut chars = sql.trim().chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        if c == '\'' || c == '"' {
            quote = Some(c);
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
    }

    let trimmed = out.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    fn transpiler() -> Transpiler {
        Transpiler::new(Dialect::Spark, Dialect::Doris)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("SELECT  a\n FROM t;"), "select a from t");
        assert_eq!(normalize("select 'ABC  d' FROM t"), "select 'ABC  d' from t");
        assert_eq!(normalize("select 'it\\'S' ;"), "select 'it\\'S'");
    }

    #[test]
    fn test_pairs_by_info_string() {
        let guide = r#"
# NVL

```spark
SELECT nvl(a, 0) FROM t
```

```doris
select ifnull(a, 0)
from t;
```
"#;
        let report = check_guide(guide, &transpiler());
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].outcome, PairOutcome::Match);
        assert_eq!(report.pairs[0].spark_line, 4);
        assert_eq!(report.pairs[0].doris_line, 8);
        assert!(report.is_clean());
    }

    #[test]
    fn test_pairs_by_preceding_text() {
        let guide = r#"
In Spark you write:

~~~sql
SELECT a || b FROM t
~~~

Doris needs:

~~~sql
SELECT concat(a, b) FROM t
~~~
"#;
        let report = check_guide(guide, &transpiler());
        assert_eq!(report.pairs.len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_mismatch_and_unpaired() {
        let guide = r#"
```spark
SELECT 1
```

```spark
SELECT nvl(a, 0) FROM t
```

```doris
SELECT nvl(a, 0) FROM t
```

```sql
-- unrelated
```
"#;
        let report = check_guide(guide, &transpiler());
        assert_eq!(report.unpaired, vec![2]);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(
            report.pairs[0].outcome,
            PairOutcome::Mismatch {
                expected: "SELECT nvl(a, 0) FROM t".to_string(),
                actual: "SELECT IFNULL(a, 0) FROM t".to_string(),
            }
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_transpile_error() {
        let guide = "```spark\nSELECT split(s, '[,;]') FROM t\n```\n\n```doris\nSELECT 1\n```\n";
        let report = check_guide(guide, &transpiler());
        assert!(matches!(report.pairs[0].outcome, PairOutcome::Error { .. }));
        assert!(!report.is_clean());
    }
}
