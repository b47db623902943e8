//! Multi-Table Insert Generator
//!
//! Accumulates columns into one or more named tables per record and turns
//! every non-empty table into an `INSERT` statement when the record closes.
//! A column stored more than once keeps every value in order; the single
//! VALUES row renders them joined by [`InsertOptions`]' separator.
//!
//! Rendered statement shape:
//!
//! ```text
//! INSERT INTO muppets(type,id,entity)
//! VALUES
//! ('Title','tt0083','The Muppet Show');
//! ```

use std::collections::HashMap;

use log::{debug, warn};

use super::dispatch::RuleOwner;
use super::table::Params;
use crate::error::{Error, Result};

/// Rendering options for generated statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptions {
    separator: String,
}

impl InsertOptions {
    /// Separator placed between the values of a repeated column
    pub fn multi_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for InsertOptions {
    fn default() -> Self {
        InsertOptions {
            separator: ",".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    /// One element until the column is stored again
    values: Vec<String>,
}

#[derive(Debug, Clone)]
struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    fn new(name: &str) -> Self {
        Table {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    fn push(&mut self, column: &str, value: &str) {
        match self.columns.iter_mut().find(|c| c.name == column) {
            Some(existing) => existing.values.push(value.to_string()),
            None => self.columns.push(Column {
                name: column.to_string(),
                values: vec![value.to_string()],
            }),
        }
    }
}

/// Row-set accumulator producing insert statements
#[derive(Debug, Default)]
pub struct InsertGenerator {
    options: InsertOptions,
    /// Tables of the open record in first-use order; `None` while idle
    tables: Option<Vec<Table>>,
    pending: HashMap<String, String>,
    inserts: Vec<String>,
}

impl InsertGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InsertOptions) -> Self {
        InsertGenerator {
            options,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.tables.is_some()
    }

    /// Open a new record, discarding any record still open
    pub fn start(&mut self) {
        if self.tables.is_some() {
            warn!("insert record opened while another was open; previous rows discarded");
        }
        self.tables = Some(Vec::new());
    }

    /// Store the pending value named `column` into `table`
    pub fn seed(&mut self, table: &str, column: &str) -> Result<()> {
        let value = self.pending.get(column).cloned();
        let tables = self.open_tables("seed")?;
        if let Some(value) = value {
            table_mut(tables, table).push(column, &value);
        }
        Ok(())
    }

    /// Store a column value; repeated stores append
    pub fn store(&mut self, table: &str, column: &str, value: &str) -> Result<()> {
        let tables = self.open_tables("store")?;
        table_mut(tables, table).push(column, value);
        Ok(())
    }

    /// Render and clear the named tables (all tables when `names` is empty),
    /// keeping the record open. Returns how many statements were produced.
    pub fn flush(&mut self, names: &[&str]) -> Result<usize> {
        let separator = self.options.separator.clone();
        let tables = self.open_tables("flush")?;
        let mut statements = Vec::new();
        for table in tables.iter_mut() {
            let selected = names.is_empty() || names.iter().any(|name| *name == table.name);
            if !selected || table.columns.is_empty() {
                continue;
            }
            statements.push(render(table, &separator));
            table.columns.clear();
        }
        let flushed = statements.len();
        self.inserts.extend(statements);
        Ok(flushed)
    }

    /// Flush every non-empty table and close the record
    pub fn end(&mut self) -> Result<usize> {
        let flushed = self.flush(&[])?;
        self.tables = None;
        debug!("insert record closed, {flushed} statement(s)");
        Ok(flushed)
    }

    /// Capture a value to seed later records with
    pub fn set_pending(&mut self, key: &str, value: &str) {
        self.pending.insert(key.to_string(), value.to_string());
    }

    /// Statements generated so far, in emission order
    pub fn inserts(&self) -> &[String] {
        &self.inserts
    }

    pub fn take_inserts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.inserts)
    }

    /// All statements joined into one text
    pub fn sql(&self) -> String {
        self.inserts.join("\n")
    }

    fn open_tables(&mut self, operation: &str) -> Result<&mut Vec<Table>> {
        self.tables
            .as_mut()
            .ok_or_else(|| Error::usage(format!("insert {operation} with no open record")))
    }
}

fn table_mut<'a>(tables: &'a mut Vec<Table>, name: &str) -> &'a mut Table {
    let index = match tables.iter().position(|t| t.name == name) {
        Some(index) => index,
        None => {
            tables.push(Table::new(name));
            tables.len() - 1
        }
    };
    &mut tables[index]
}

fn render(table: &Table, separator: &str) -> String {
    let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let values: Vec<String> = table
        .columns
        .iter()
        .map(|c| quote(&c.values.join(separator)))
        .collect();
    format!(
        "INSERT INTO {}({})\nVALUES\n({});",
        table.name,
        columns.join(","),
        values.join(",")
    )
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

impl RuleOwner for InsertGenerator {
    fn document_started(&mut self) -> Result<()> {
        self.tables = None;
        self.pending.clear();
        Ok(())
    }

    fn document_finished(&mut self) -> Result<()> {
        if self.tables.take().is_some() {
            warn!("insert record still open at document end; discarded");
        }
        Ok(())
    }
}

/// Rule owner state that carries an insert generator
pub trait InsertOwner {
    fn generator(&mut self) -> &mut InsertGenerator;
}

impl InsertOwner for InsertGenerator {
    fn generator(&mut self) -> &mut InsertGenerator {
        self
    }
}

/// Open a record; parameters `[table, column]`, if given, seed that column
/// from the pending value of the same name
pub fn start_rec<S: InsertOwner>(state: &mut S, params: &Params, _value: &str) -> Result<()> {
    let generator = state.generator();
    generator.start();
    if let Some(table) = params.get(0) {
        let column = params.require(1, "column name")?;
        generator.seed(table, column)?;
    }
    Ok(())
}

/// Store the value; parameters `[table, column]`
pub fn store<S: InsertOwner>(state: &mut S, params: &Params, value: &str) -> Result<()> {
    let table = params.require(0, "table name")?;
    let column = params.require(1, "column name")?;
    state.generator().store(table, column, value)
}

/// Flush the tables named by the parameters (all when none) without closing
pub fn flush<S: InsertOwner>(state: &mut S, params: &Params, _value: &str) -> Result<()> {
    let names: Vec<&str> = params.iter().collect();
    state.generator().flush(&names)?;
    Ok(())
}

/// Flush every non-empty table and close the record
pub fn end_rec<S: InsertOwner>(state: &mut S, _params: &Params, _value: &str) -> Result<()> {
    state.generator().end()?;
    Ok(())
}

/// Remember the value under the key named by parameter 0
pub fn set_pending<S: InsertOwner>(state: &mut S, params: &Params, value: &str) -> Result<()> {
    let key = params.require(0, "pending key")?;
    state.generator().set_pending(key, value);
    Ok(())
}
