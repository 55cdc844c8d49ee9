//! Shared fixtures for unit tests: a small accounts entity pair and a
//! recording connection that captures emitted SQL and plays back canned
//! result sets.

use crate::error::{DriverError, OrmError};
use crate::executor::{Connection, RowCursor, Statement};
use crate::query::Assignments;
use crate::record::{ColumnPatch, Tracked};
use crate::row::{FromRow, Row};
use crate::schema::{metadata_for, ColumnType, Entity, TableDef};
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

pub struct Accounts;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub status: Option<String>,
}

impl FromRow for Account {
    fn from_row(row: &Row) -> Result<Self, OrmError> {
        Ok(Account {
            id: row.get("id")?,
            name: row.get("name")?,
            status: row.get("status")?,
        })
    }
}

impl Entity for Accounts {
    type Model = Account;

    fn table_def() -> TableDef {
        TableDef::new("accounts")
            .column("id", ColumnType::BigInt)
            .column("name", ColumnType::Text)
            .column("status", ColumnType::Text)
            .primary_key(&["id"])
    }
}

/// Child entity: same columns and key as `Accounts`, own table name.
pub struct ArchivedAccounts;

impl Entity for ArchivedAccounts {
    type Model = Account;

    fn table_def() -> TableDef {
        TableDef::extending(Accounts::table_def).table("accounts_archive")
    }
}

#[derive(Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub status: Option<String>,
}

impl ColumnPatch for AccountPatch {
    fn apply_to(&self, assignments: &mut Assignments) {
        if let Some(name) = &self.name {
            assignments.set("name", name.clone());
        }
        if let Some(status) = &self.status {
            assignments.set("status", status.clone());
        }
    }
}

pub fn account_row(id: i64, name: &str, status: Option<&str>) -> Row {
    Row::from_pairs(vec![
        ("id".to_string(), Value::BigInt(Some(id))),
        ("name".to_string(), Value::Text(Some(name.to_string()))),
        ("status".to_string(), Value::Text(status.map(String::from))),
    ])
}

pub fn tracked_account(id: i64, name: &str, status: Option<&str>) -> Tracked<Accounts> {
    let meta = metadata_for::<Accounts>().unwrap();
    crate::row::map_tracked::<Accounts>(&meta, &account_row(id, name, status)).unwrap()
}

/// Connection double that records every prepared statement and bound
/// parameter list, and plays back queued result sets in order.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    sql: RefCell<Vec<String>>,
    params: RefCell<Vec<Vec<Value>>>,
    results: RefCell<VecDeque<Vec<Row>>>,
    affected: Cell<u64>,
}

impl RecordingConnection {
    /// Queue the result set the next query will return.
    pub fn push_result(&self, rows: Vec<Row>) {
        self.results.borrow_mut().push_back(rows);
    }

    pub fn set_affected(&self, affected: u64) {
        self.affected.set(affected);
    }

    pub fn recorded_sql(&self) -> Vec<String> {
        self.sql.borrow().clone()
    }

    pub fn recorded_params(&self) -> Vec<Vec<Value>> {
        self.params.borrow().clone()
    }
}

impl Connection for RecordingConnection {
    type Stmt<'conn> = RecordingStatement<'conn>;

    fn prepare(&self, sql: &str) -> Result<Self::Stmt<'_>, DriverError> {
        self.sql.borrow_mut().push(sql.to_string());
        Ok(RecordingStatement { conn: self })
    }
}

pub struct RecordingStatement<'conn> {
    conn: &'conn RecordingConnection,
}

impl Statement for RecordingStatement<'_> {
    type Rows = CannedCursor;

    fn query(self, params: &[Value]) -> Result<Self::Rows, DriverError> {
        self.conn.params.borrow_mut().push(params.to_vec());
        let rows = self
            .conn
            .results
            .borrow_mut()
            .pop_front()
            .unwrap_or_default();
        Ok(CannedCursor {
            rows: rows.into_iter(),
        })
    }

    fn execute(self, params: &[Value]) -> Result<u64, DriverError> {
        self.conn.params.borrow_mut().push(params.to_vec());
        Ok(self.conn.affected.get())
    }
}

pub struct CannedCursor {
    rows: std::vec::IntoIter<Row>,
}

impl RowCursor for CannedCursor {
    fn next_row(&mut self) -> Result<Option<Row>, DriverError> {
        Ok(self.rows.next())
    }
}
