use pretty_assertions::assert_eq;

use super::parse;
use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::TranspileError;

fn query(sql: &str) -> Query {
    match parse(sql, Dialect::Spark).unwrap().remove(0) {
        Statement::Query(q) => *q,
        other => panic!("expected query, got {:?}", other),
    }
}

fn select(sql: &str) -> Select {
    match query(sql).body {
        SetExpr::Select(s) => *s,
        other => panic!("expected select, got {:?}", other),
    }
}

fn first_expr(sql: &str) -> Expr {
    match select(sql).projection.remove(0) {
        SelectItem::Expr { expr, .. } => expr,
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_simple_select() {
    let s = select("SELECT a, b AS c, t.* FROM db.t WHERE a = 1");
    assert_eq!(s.projection.len(), 3);
    assert_eq!(
        s.projection[1],
        SelectItem::Expr {
            expr: Expr::column("b"),
            alias: Some(Ident::new("c")),
        }
    );
    assert_eq!(s.projection[2], SelectItem::QualifiedWildcard(ObjectName::new("t")));
    assert!(s.selection.is_some());
    match &s.from[0].relation {
        TableFactor::Table { name, alias } => {
            assert_eq!(name.0.len(), 2);
            assert_eq!(name.last(), "t");
            assert!(alias.is_none());
        }
        other => panic!("unexpected relation {:?}", other),
    }
}

#[test]
fn test_implicit_alias_stops_at_keyword() {
    let s = select("SELECT a x FROM t u WHERE x > 0");
    assert_eq!(
        s.projection[0],
        SelectItem::Expr {
            expr: Expr::column("a"),
            alias: Some(Ident::new("x")),
        }
    );
    match &s.from[0].relation {
        TableFactor::Table { alias, .. } => {
            assert_eq!(alias.as_ref().map(|a| a.name.value.as_str()), Some("u"))
        }
        other => panic!("unexpected relation {:?}", other),
    }
}

#[test]
fn test_operator_precedence() {
    let expr = first_expr("SELECT 1 + 2 * 3");
    assert_eq!(
        expr,
        Expr::binary(
            Expr::number(1),
            BinaryOp::Plus,
            Expr::binary(Expr::number(2), BinaryOp::Multiply, Expr::number(3)),
        )
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = first_expr("SELECT a OR b AND c");
    match expr {
        Expr::Binary { op: BinaryOp::Or, right, .. } => {
            assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_pipes_depend_on_dialect() {
    let spark = first_expr("SELECT a || b");
    assert!(matches!(spark, Expr::Binary { op: BinaryOp::Concat, .. }));

    let doris = match parse("SELECT a || b", Dialect::Doris).unwrap().remove(0) {
        Statement::Query(q) => q,
        other => panic!("unexpected {:?}", other),
    };
    let SetExpr::Select(s) = doris.body else {
        panic!("expected select");
    };
    let SelectItem::Expr { expr, .. } = &s.projection[0] else {
        panic!("expected expression");
    };
    assert!(matches!(expr, Expr::Binary { op: BinaryOp::Or, .. }));
}

#[test]
fn test_predicates() {
    let s = select(
        "SELECT 1 FROM t WHERE a NOT IN (1, 2) AND b BETWEEN 1 AND 5 \
         AND c IS NOT NULL AND d RLIKE '^x' AND e NOT LIKE 'a%'",
    );
    let mut found = Vec::new();
    fn collect(e: &Expr, out: &mut Vec<&'static str>) {
        match e {
            Expr::Binary { left, right, .. } => {
                collect(left, out);
                collect(right, out);
            }
            Expr::InList { negated: true, .. } => out.push("not in"),
            Expr::Between { negated: false, .. } => out.push("between"),
            Expr::IsNull { negated: true, .. } => out.push("is not null"),
            Expr::Like { kind: LikeKind::RLike, .. } => out.push("rlike"),
            Expr::Like { kind: LikeKind::Like, negated: true, .. } => out.push("not like"),
            _ => {}
        }
    }
    collect(s.selection.as_ref().unwrap(), &mut found);
    assert_eq!(found, vec!["not in", "between", "is not null", "rlike", "not like"]);
}

#[test]
fn test_numeric_suffix_becomes_cast() {
    assert_eq!(first_expr("SELECT 10L"), Expr::cast(Expr::number(10), DataType::BigInt));
}

#[test]
fn test_interval_forms() {
    let expected = Expr::Interval {
        value: Box::new(Expr::number(3)),
        unit: IntervalUnit::Day,
    };
    assert_eq!(first_expr("SELECT INTERVAL 3 DAY"), expected);
    assert_eq!(first_expr("SELECT INTERVAL '3' DAYS"), expected);
    assert_eq!(first_expr("SELECT INTERVAL '3 day'"), expected);
}

#[test]
fn test_lambda_arguments() {
    let expr = first_expr("SELECT transform(xs, x -> x + 1)");
    let Expr::Function(f) = expr else {
        panic!("expected function");
    };
    assert_eq!(f.key(), "transform");
    assert!(matches!(&f.args[1], Expr::Lambda { params, .. } if params.len() == 1));

    let expr = first_expr("SELECT aggregate(xs, 0, (acc, x) -> acc + x)");
    let Expr::Function(f) = expr else {
        panic!("expected function");
    };
    assert!(matches!(&f.args[2], Expr::Lambda { params, .. } if params.len() == 2));
}

#[test]
fn test_window_function() {
    let expr = first_expr(
        "SELECT row_number() OVER (PARTITION BY a ORDER BY b DESC \
         ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)",
    );
    let Expr::Function(f) = expr else {
        panic!("expected function");
    };
    let over = f.over.unwrap();
    assert_eq!(over.partition_by, vec![Expr::column("a")]);
    assert_eq!(over.order_by[0].asc, Some(false));
    let frame = over.frame.unwrap();
    assert_eq!(frame.start, FrameBound::UnboundedPreceding);
    assert_eq!(frame.end, Some(FrameBound::CurrentRow));
}

#[test]
fn test_case_and_cast() {
    let expr = first_expr("SELECT CASE WHEN a > 1 THEN 'x' ELSE 'y' END");
    assert!(matches!(expr, Expr::Case { operand: None, ref branches, else_result: Some(_) } if branches.len() == 1));

    let expr = first_expr("SELECT CAST(a AS DECIMAL(10, 2))");
    assert_eq!(
        expr,
        Expr::cast(
            Expr::column("a"),
            DataType::Decimal {
                precision: Some(10),
                scale: Some(2),
            }
        )
    );
}

#[test]
fn test_complex_types() {
    let expr = first_expr("SELECT CAST(m AS MAP<STRING, ARRAY<INT>>)");
    assert_eq!(
        expr,
        Expr::cast(
            Expr::column("m"),
            DataType::Map(
                Box::new(DataType::String),
                Box::new(DataType::Array(Box::new(DataType::Int)))
            )
        )
    );
}

#[test]
fn test_subscript_and_field() {
    let expr = first_expr("SELECT arr[0].name");
    assert!(matches!(expr, Expr::Field { ref field, .. } if field.value == "name"));
}

#[test]
fn test_joins() {
    let s = select(
        "SELECT * FROM a JOIN b ON a.id = b.id LEFT OUTER JOIN c USING (id) \
         LEFT SEMI JOIN d ON a.k = d.k CROSS JOIN e",
    );
    let kinds: Vec<JoinKind> = s.from[0].joins.iter().map(|j| j.kind).collect();
    assert_eq!(
        kinds,
        vec![JoinKind::Inner, JoinKind::LeftOuter, JoinKind::LeftSemi, JoinKind::Cross]
    );
    assert!(matches!(s.from[0].joins[1].constraint, JoinConstraint::Using(_)));
    assert!(matches!(s.from[0].joins[3].constraint, JoinConstraint::None));
}

#[test]
fn test_derived_table() {
    let s = select("SELECT x FROM (SELECT 1 AS x) sub");
    assert!(matches!(
        &s.from[0].relation,
        TableFactor::Derived { alias: Some(a), .. } if a.name.value == "sub"
    ));
}

#[test]
fn test_lateral_view() {
    let s = select("SELECT id, tag FROM t LATERAL VIEW OUTER explode(tags) tt AS tag WHERE id > 0");
    assert_eq!(s.lateral_views.len(), 1);
    let lv = &s.lateral_views[0];
    assert!(lv.outer);
    assert_eq!(lv.function.key(), "explode");
    assert_eq!(lv.table_alias, Some(Ident::new("tt")));
    assert_eq!(lv.column_aliases, vec![Ident::new("tag")]);
    assert!(s.selection.is_some());
}

#[test]
fn test_lateral_view_multiple_columns() {
    let s = select("SELECT k, v FROM t LATERAL VIEW explode(m) AS k, v");
    let lv = &s.lateral_views[0];
    assert!(lv.table_alias.is_none());
    assert_eq!(lv.column_aliases.len(), 2);
}

#[test]
fn test_hive_clauses() {
    let q = query("SELECT a FROM t DISTRIBUTE BY a SORT BY b DESC LIMIT 10");
    assert_eq!(q.distribute_by, vec![Expr::column("a")]);
    assert_eq!(q.sort_by.len(), 1);
    assert_eq!(q.limit, Some(Expr::number(10)));
}

#[test]
fn test_mysql_limit_offset() {
    let q = match parse("SELECT a FROM t LIMIT 5, 10", Dialect::Doris).unwrap().remove(0) {
        Statement::Query(q) => q,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(q.offset, Some(Expr::number(5)));
    assert_eq!(q.limit, Some(Expr::number(10)));
}

#[test]
fn test_set_operations() {
    let q = query("SELECT 1 UNION ALL SELECT 2 INTERSECT SELECT 3");
    match q.body {
        SetExpr::SetOperation {
            op: SetOperator::Union,
            quantifier: SetQuantifier::All,
            right,
            ..
        } => assert!(matches!(*right, SetExpr::SetOperation { op: SetOperator::Intersect, .. })),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_with_clause() {
    let q = query("WITH a AS (SELECT 1 AS x), b (y) AS (SELECT x FROM a) SELECT y FROM b");
    assert_eq!(q.with.len(), 2);
    assert_eq!(q.with[1].columns, vec![Ident::new("y")]);
}

#[test]
fn test_exists_subquery() {
    let s = select("SELECT 1 FROM t WHERE NOT EXISTS (SELECT 1 FROM u WHERE u.id = t.id)");
    assert!(matches!(s.selection, Some(Expr::Exists { negated: true, .. })));
}

#[test]
fn test_insert_overwrite_partition() {
    let stmts = parse(
        "INSERT OVERWRITE TABLE db.t PARTITION (dt = '2024-01-01', hr) SELECT a, hr FROM s",
        Dialect::Spark,
    )
    .unwrap();
    let Statement::Insert(insert) = &stmts[0] else {
        panic!("expected insert");
    };
    assert!(insert.overwrite);
    assert_eq!(insert.partition.len(), 2);
    assert_eq!(insert.partition[0].value, Some(Expr::string("2024-01-01")));
    assert_eq!(insert.partition[1].value, None);
    assert!(insert.columns.is_empty());
}

#[test]
fn test_insert_columns_and_values() {
    let stmts = parse("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y')", Dialect::Doris).unwrap();
    let Statement::Insert(insert) = &stmts[0] else {
        panic!("expected insert");
    };
    assert_eq!(insert.columns, vec![Ident::new("a"), Ident::new("b")]);
    assert!(matches!(&insert.source.body, SetExpr::Values(rows) if rows.len() == 2));
}

#[test]
fn test_create_table_hive() {
    let stmts = parse(
        "CREATE TABLE IF NOT EXISTS db.events (id BIGINT NOT NULL COMMENT 'pk', name STRING) \
         USING parquet PARTITIONED BY (dt STRING) COMMENT 'events' \
         TBLPROPERTIES ('owner' = 'etl')",
        Dialect::Spark,
    )
    .unwrap();
    let Statement::CreateTable(ct) = &stmts[0] else {
        panic!("expected create table");
    };
    assert!(ct.if_not_exists);
    assert_eq!(ct.columns.len(), 2);
    assert!(ct.columns[0].not_null);
    assert_eq!(ct.columns[0].comment.as_deref(), Some("pk"));
    assert_eq!(ct.file_format.as_deref(), Some("parquet"));
    assert_eq!(ct.partitioned_by[0].data_type, Some(DataType::String));
    assert_eq!(ct.comment.as_deref(), Some("events"));
    assert_eq!(ct.properties, vec![("owner".to_string(), "etl".to_string())]);
}

#[test]
fn test_create_table_doris() {
    let stmts = parse(
        "CREATE TABLE t (id INT, v VARCHAR(10)) ENGINE=OLAP DUPLICATE KEY(id) \
         DISTRIBUTED BY HASH(id) BUCKETS 8 PROPERTIES (\"replication_num\" = \"1\")",
        Dialect::Doris,
    )
    .unwrap();
    let Statement::CreateTable(ct) = &stmts[0] else {
        panic!("expected create table");
    };
    let key = ct.key.as_ref().unwrap();
    assert_eq!(key.kind, KeyKind::Duplicate);
    assert_eq!(key.columns, vec![Ident::new("id")]);
    assert_eq!(ct.distribution.as_ref().unwrap().buckets, Some(8));
    assert_eq!(ct.properties[0].0, "replication_num");
}

#[test]
fn test_create_table_as_select() {
    let stmts = parse("CREATE TABLE t AS SELECT * FROM s", Dialect::Spark).unwrap();
    let Statement::CreateTable(ct) = &stmts[0] else {
        panic!("expected create table");
    };
    assert!(ct.columns.is_empty());
    assert!(ct.as_query.is_some());
}

#[test]
fn test_drop_table() {
    let stmts = parse("DROP TABLE IF EXISTS db.t", Dialect::Hive).unwrap();
    assert!(matches!(&stmts[0], Statement::DropTable { if_exists: true, name } if name.last() == "t"));
}

#[test]
fn test_multiple_statements() {
    let stmts = parse("SELECT 1; SELECT 2;;", Dialect::Spark).unwrap();
    assert_eq!(stmts.len(), 2);
}

#[test]
fn test_parse_error_position() {
    let err = parse("SELECT a FROM", Dialect::Spark).unwrap_err();
    match err {
        TranspileError::Parse { position, message } => {
            assert_eq!(position, 13);
            assert!(message.contains("expected identifier"), "{}", message);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_trailing_garbage_rejected() {
    let err = parse("SELECT 1 2", Dialect::Spark).unwrap_err();
    assert!(err.to_string().contains("expected ';' or end of input"));
}

#[test]
fn test_unknown_statement() {
    let err = parse("UPDATE t SET a = 1", Dialect::Spark).unwrap_err();
    assert!(err.to_string().contains("expected SELECT, WITH, INSERT, CREATE or DROP"));
}

#[test]
fn test_decimal_suffix_keeps_scale() {
    let decimal = |precision, scale| DataType::Decimal {
        precision: Some(precision),
        scale: Some(scale),
    };
    assert_eq!(first_expr("SELECT 1.5BD"), Expr::cast(Expr::number("1.5"), decimal(2, 1)));
    assert_eq!(first_expr("SELECT 0.05BD"), Expr::cast(Expr::number("0.05"), decimal(2, 2)));
    assert_eq!(first_expr("SELECT 123BD"), Expr::cast(Expr::number("123"), decimal(3, 0)));
    assert_eq!(first_expr("SELECT 10L"), Expr::cast(Expr::number("10"), DataType::BigInt));
}

#[test]
fn test_nesting_limit() {
    let nested = |levels: usize| format!("SELECT {}1{}", "(".repeat(levels), ")".repeat(levels));
    assert!(parse(&nested(40), Dialect::Spark).is_ok());

    let err = parse(&nested(200), Dialect::Spark).unwrap_err();
    assert!(matches!(err, TranspileError::Parse { ref message, .. } if message.contains("nesting")));

    let subqueries = format!("SELECT * FROM {}t{}", "(SELECT * FROM ".repeat(100), ")".repeat(100));
    assert!(matches!(parse(&subqueries, Dialect::Spark), Err(TranspileError::Parse { .. })));

    let types = format!("SELECT CAST(a AS {}INT{})", "ARRAY<".repeat(100), ">".repeat(100));
    assert!(matches!(parse(&types, Dialect::Spark), Err(TranspileError::Parse { .. })));
}
