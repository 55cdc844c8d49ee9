//! In-memory collaborator used by the scenario tests.
//!
//! `MemoryConnection` implements the crate's `Connection` / `Statement` /
//! `RowCursor` traits over a table store, interpreting the fixed statement
//! shapes the builders emit (quoted identifiers, `$n` placeholders, literal
//! LIMIT/OFFSET). It supports auto-increment keys and `RETURNING`, so the
//! end-to-end behaviors — generated keys, partial updates, refetch after
//! delete — are observable without a database server.

use rowboat::{ColumnType, Connection, DriverError, Row, RowCursor, Statement, Value};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;

type MemRow = BTreeMap<String, Value>;

struct MemTable {
    columns: Vec<(String, ColumnType)>,
    auto_key: Option<String>,
    next_id: i64,
    rows: Vec<MemRow>,
}

#[derive(Default)]
pub struct MemoryConnection {
    tables: RefCell<BTreeMap<String, MemTable>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table. `auto_key` names a BIGINT column that is assigned
    /// `1, 2, …` when an insert does not supply it.
    pub fn create_table(
        &self,
        name: &str,
        columns: &[(&str, ColumnType)],
        auto_key: Option<&str>,
    ) {
        self.tables.borrow_mut().insert(
            name.to_string(),
            MemTable {
                columns: columns
                    .iter()
                    .map(|(n, t)| ((*n).to_string(), *t))
                    .collect(),
                auto_key: auto_key.map(String::from),
                next_id: 1,
                rows: Vec::new(),
            },
        );
    }
}

impl Connection for MemoryConnection {
    type Stmt<'conn> = MemoryStatement<'conn>;

    fn prepare(&self, sql: &str) -> Result<Self::Stmt<'_>, DriverError> {
        let plan = parse(sql).map_err(|e| format!("cannot prepare {sql:?}: {e}"))?;
        Ok(MemoryStatement { conn: self, plan })
    }
}

pub struct MemoryStatement<'conn> {
    conn: &'conn MemoryConnection,
    plan: Plan,
}

impl Statement for MemoryStatement<'_> {
    type Rows = MemoryCursor;

    fn query(self, params: &[Value]) -> Result<Self::Rows, DriverError> {
        let rows = run(self.conn, &self.plan, params)?.rows;
        Ok(MemoryCursor {
            rows: rows.into_iter(),
        })
    }

    fn execute(self, params: &[Value]) -> Result<u64, DriverError> {
        Ok(run(self.conn, &self.plan, params)?.affected)
    }
}

pub struct MemoryCursor {
    rows: std::vec::IntoIter<Row>,
}

impl RowCursor for MemoryCursor {
    fn next_row(&mut self) -> Result<Option<Row>, DriverError> {
        Ok(self.rows.next())
    }
}

// ---- statement plans ----

struct Pred {
    column: String,
    op: String,
    param: usize,
}

enum Projection {
    Columns(Vec<String>),
    Count,
}

enum Plan {
    Insert {
        table: String,
        columns: Vec<String>,
        returning: Option<Vec<String>>,
    },
    Select {
        table: String,
        projection: Projection,
        predicates: Vec<Pred>,
        order: Vec<(String, bool)>,
        limit: Option<usize>,
        offset: Option<usize>,
    },
    Update {
        table: String,
        sets: Vec<(String, usize)>,
        predicates: Vec<Pred>,
    },
    Delete {
        table: String,
        predicates: Vec<Pred>,
    },
}

fn unquote(ident: &str) -> Result<String, String> {
    let inner = ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("expected quoted identifier, got {ident:?}"))?;
    Ok(inner.replace("\"\"", "\""))
}

fn ident_list(list: &str) -> Result<Vec<String>, String> {
    list.split(", ").map(unquote).collect()
}

fn param_index(placeholder: &str) -> Result<usize, String> {
    let n: usize = placeholder
        .strip_prefix('$')
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("expected placeholder, got {placeholder:?}"))?;
    Ok(n - 1)
}

fn parse_predicates(clause: &str) -> Result<Vec<Pred>, String> {
    clause
        .split(" AND ")
        .map(|pred| {
            let mut parts = pred.splitn(3, ' ');
            let column = unquote(parts.next().unwrap_or_default())?;
            let op = parts
                .next()
                .ok_or_else(|| format!("malformed predicate {pred:?}"))?
                .to_string();
            let param = param_index(parts.next().unwrap_or_default())?;
            Ok(Pred { column, op, param })
        })
        .collect()
}

fn take_suffix<'a>(s: &'a str, keyword: &str) -> (&'a str, Option<&'a str>) {
    match s.rsplit_once(keyword) {
        Some((head, tail)) => (head, Some(tail)),
        None => (s, None),
    }
}

fn parse(sql: &str) -> Result<Plan, String> {
    if let Some(rest) = sql.strip_prefix("SELECT ") {
        let (list, rest) = rest
            .split_once(" FROM ")
            .ok_or_else(|| "SELECT without FROM".to_string())?;
        let projection = if list == "COUNT(*)" {
            Projection::Count
        } else {
            Projection::Columns(ident_list(list)?)
        };
        let (table, clauses) = match rest.split_once(' ') {
            Some((t, c)) => (t, c),
            None => (rest, ""),
        };
        let clauses = format!(" {clauses}");
        let (clauses, offset) = take_suffix(&clauses, " OFFSET ");
        let (clauses, limit) = take_suffix(clauses, " LIMIT ");
        let (clauses, order) = take_suffix(clauses, " ORDER BY ");
        let (_, where_) = take_suffix(clauses, " WHERE ");
        Ok(Plan::Select {
            table: unquote(table)?,
            projection,
            predicates: where_.map(parse_predicates).transpose()?.unwrap_or_default(),
            order: order
                .map(|terms| {
                    terms
                        .split(", ")
                        .map(|term| {
                            let (col, dir) = term
                                .rsplit_once(' ')
                                .ok_or_else(|| format!("malformed order term {term:?}"))?;
                            Ok((unquote(col)?, dir == "ASC"))
                        })
                        .collect::<Result<Vec<_>, String>>()
                })
                .transpose()?
                .unwrap_or_default(),
            limit: limit
                .map(|n| n.parse().map_err(|_| format!("bad LIMIT {n:?}")))
                .transpose()?,
            offset: offset
                .map(|n| n.parse().map_err(|_| format!("bad OFFSET {n:?}")))
                .transpose()?,
        })
    } else if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
        let (rest, returning) = take_suffix(rest, " RETURNING ");
        let returning = returning.map(ident_list).transpose()?;
        let (table, rest) = rest
            .split_once(' ')
            .ok_or_else(|| "malformed INSERT".to_string())?;
        let columns = if rest == "DEFAULT VALUES" {
            Vec::new()
        } else {
            let (cols, _) = rest
                .strip_prefix('(')
                .and_then(|r| r.split_once(") VALUES ("))
                .ok_or_else(|| "malformed INSERT values".to_string())?;
            ident_list(cols)?
        };
        Ok(Plan::Insert {
            table: unquote(table)?,
            columns,
            returning,
        })
    } else if let Some(rest) = sql.strip_prefix("UPDATE ") {
        let (table, rest) = rest
            .split_once(" SET ")
            .ok_or_else(|| "UPDATE without SET".to_string())?;
        let (sets, where_) = match rest.split_once(" WHERE ") {
            Some((s, w)) => (s, Some(w)),
            None => (rest, None),
        };
        let sets = sets
            .split(", ")
            .map(|assign| {
                let (col, placeholder) = assign
                    .split_once(" = ")
                    .ok_or_else(|| format!("malformed assignment {assign:?}"))?;
                Ok((unquote(col)?, param_index(placeholder)?))
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Plan::Update {
            table: unquote(table)?,
            sets,
            predicates: where_.map(parse_predicates).transpose()?.unwrap_or_default(),
        })
    } else if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
        let (table, where_) = match rest.split_once(" WHERE ") {
            Some((t, w)) => (t, Some(w)),
            None => (rest, None),
        };
        Ok(Plan::Delete {
            table: unquote(table)?,
            predicates: where_.map(parse_predicates).transpose()?.unwrap_or_default(),
        })
    } else {
        Err("unsupported statement".to_string())
    }
}

// ---- evaluation ----

fn null_of(ty: ColumnType) -> Value {
    match ty {
        ColumnType::SmallInt => Value::SmallInt(None),
        ColumnType::Int => Value::Int(None),
        ColumnType::BigInt => Value::BigInt(None),
        ColumnType::Double => Value::Double(None),
        ColumnType::Bool => Value::Bool(None),
        ColumnType::Text => Value::Text(None),
        ColumnType::Bytes => Value::Bytes(None),
        ColumnType::Decimal => Value::Decimal(None),
        ColumnType::Date => Value::Date(None),
        ColumnType::Time => Value::Time(None),
        ColumnType::Timestamp => Value::Timestamp(None),
        ColumnType::Uuid => Value::Uuid(None),
        ColumnType::Json => Value::Json(None),
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::SmallInt(Some(v)) => Some(i64::from(*v)),
        Value::Int(Some(v)) => Some(i64::from(*v)),
        Value::BigInt(Some(v)) => Some(*v),
        _ => None,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_int(a), as_int(b)) {
        return Some(x.cmp(&y));
    }
    match (a, b) {
        (Value::Text(Some(x)), Value::Text(Some(y))) => Some(x.cmp(y)),
        (Value::Double(Some(x)), Value::Double(Some(y))) => x.partial_cmp(y),
        (Value::Bool(Some(x)), Value::Bool(Some(y))) => Some(x.cmp(y)),
        (Value::Decimal(Some(x)), Value::Decimal(Some(y))) => Some(x.cmp(y)),
        (Value::Date(Some(x)), Value::Date(Some(y))) => Some(x.cmp(y)),
        (Value::Timestamp(Some(x)), Value::Timestamp(Some(y))) => Some(x.cmp(y)),
        (Value::Uuid(Some(x)), Value::Uuid(Some(y))) => Some(x.cmp(y)),
        _ => None,
    }
}

fn like_match(text: &str, pattern: &str) -> bool {
    let pieces: Vec<&str> = pattern.split('%').collect();
    if pieces.len() == 1 {
        return text == pattern;
    }
    let mut rest = text;
    for (i, piece) in pieces.iter().enumerate() {
        if piece.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(piece) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == pieces.len() - 1 {
            return rest.ends_with(piece);
        } else {
            match rest.find(piece) {
                Some(at) => rest = &rest[at + piece.len()..],
                None => return false,
            }
        }
    }
    true
}

fn matches_pred(row: &MemRow, pred: &Pred, params: &[Value]) -> Result<bool, DriverError> {
    let bound = params
        .get(pred.param)
        .ok_or_else(|| format!("parameter ${} not bound", pred.param + 1))?;
    let actual = match row.get(&pred.column) {
        Some(v) => v,
        None => return Ok(false),
    };
    // SQL three-valued logic: NULL never matches.
    if actual.is_null() || bound.is_null() {
        return Ok(false);
    }
    let result = match pred.op.as_str() {
        "=" => actual == bound,
        "<>" => actual != bound,
        "LIKE" => match (actual, bound) {
            (Value::Text(Some(t)), Value::Text(Some(p))) => like_match(t, p),
            _ => false,
        },
        op => {
            let ord = compare(actual, bound)
                .ok_or_else(|| format!("cannot compare {actual:?} with {bound:?}"))?;
            match op {
                "<" => ord == Ordering::Less,
                "<=" => ord != Ordering::Greater,
                ">" => ord == Ordering::Greater,
                ">=" => ord != Ordering::Less,
                other => return Err(format!("unsupported operator {other:?}").into()),
            }
        }
    };
    Ok(result)
}

struct Outcome {
    rows: Vec<Row>,
    affected: u64,
}

fn project(row: &MemRow, columns: &[String]) -> Row {
    Row::from_pairs(
        columns
            .iter()
            .map(|c| {
                (
                    c.clone(),
                    row.get(c).cloned().unwrap_or(Value::Text(None)),
                )
            })
            .collect(),
    )
}

fn run(conn: &MemoryConnection, plan: &Plan, params: &[Value]) -> Result<Outcome, DriverError> {
    let mut tables = conn.tables.borrow_mut();
    match plan {
        Plan::Insert {
            table,
            columns,
            returning,
        } => {
            let t = tables
                .get_mut(table)
                .ok_or_else(|| format!("no such table {table:?}"))?;
            let mut row = MemRow::new();
            for (i, column) in columns.iter().enumerate() {
                if !t.columns.iter().any(|(n, _)| n == column) {
                    return Err(format!("no column {column:?} in {table:?}").into());
                }
                let value = params
                    .get(i)
                    .ok_or_else(|| format!("parameter ${} not bound", i + 1))?;
                row.insert(column.clone(), value.clone());
            }
            for (name, ty) in &t.columns {
                if row.contains_key(name) {
                    continue;
                }
                if t.auto_key.as_deref() == Some(name) {
                    row.insert(name.clone(), Value::BigInt(Some(t.next_id)));
                    t.next_id += 1;
                } else {
                    row.insert(name.clone(), null_of(*ty));
                }
            }
            t.rows.push(row);
            let rows = match returning {
                Some(cols) => vec![project(t.rows.last().expect("just pushed"), cols)],
                None => Vec::new(),
            };
            Ok(Outcome { rows, affected: 1 })
        }
        Plan::Select {
            table,
            projection,
            predicates,
            order,
            limit,
            offset,
        } => {
            let t = tables
                .get(table)
                .ok_or_else(|| format!("no such table {table:?}"))?;
            let mut matched: Vec<&MemRow> = Vec::new();
            for row in &t.rows {
                let mut ok = true;
                for pred in predicates {
                    if !matches_pred(row, pred, params)? {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    matched.push(row);
                }
            }
            if let Projection::Count = projection {
                let n = i64::try_from(matched.len()).unwrap_or(i64::MAX);
                return Ok(Outcome {
                    rows: vec![Row::from_pairs(vec![(
                        "count".to_string(),
                        Value::BigInt(Some(n)),
                    )])],
                    affected: 0,
                });
            }
            for (column, asc) in order.iter().rev() {
                matched.sort_by(|a, b| {
                    let ord = match (a.get(column), b.get(column)) {
                        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                        _ => Ordering::Equal,
                    };
                    if *asc {
                        ord
                    } else {
                        ord.reverse()
                    }
                });
            }
            let skipped = matched.into_iter().skip(offset.unwrap_or(0));
            let limited: Vec<&MemRow> = match limit {
                Some(n) => skipped.take(*n).collect(),
                None => skipped.collect(),
            };
            let columns = match projection {
                Projection::Columns(cols) => cols,
                Projection::Count => unreachable!("count handled above"),
            };
            Ok(Outcome {
                rows: limited.into_iter().map(|r| project(r, columns)).collect(),
                affected: 0,
            })
        }
        Plan::Update {
            table,
            sets,
            predicates,
        } => {
            let t = tables
                .get_mut(table)
                .ok_or_else(|| format!("no such table {table:?}"))?;
            let mut affected = 0;
            for row in &mut t.rows {
                let mut ok = true;
                for pred in predicates {
                    if !matches_pred(row, pred, params)? {
                        ok = false;
                        break;
                    }
                }
                if !ok {
                    continue;
                }
                for (column, param) in sets {
                    let value = params
                        .get(*param)
                        .ok_or_else(|| format!("parameter ${} not bound", param + 1))?;
                    row.insert(column.clone(), value.clone());
                }
                affected += 1;
            }
            Ok(Outcome {
                rows: Vec::new(),
                affected,
            })
        }
        Plan::Delete { table, predicates } => {
            let t = tables
                .get_mut(table)
                .ok_or_else(|| format!("no such table {table:?}"))?;
            let before = t.rows.len();
            let mut kept = Vec::with_capacity(before);
            for row in t.rows.drain(..) {
                let mut ok = true;
                for pred in predicates {
                    if !matches_pred(&row, pred, params)? {
                        ok = false;
                        break;
                    }
                }
                if !ok {
                    kept.push(row);
                }
            }
            let affected = (before - kept.len()) as u64;
            t.rows = kept;
            Ok(Outcome {
                rows: Vec::new(),
                affected,
            })
        }
    }
}
