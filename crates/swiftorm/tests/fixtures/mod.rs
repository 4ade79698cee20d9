//! Shared test fixtures: an in-memory `Driver` that understands the SQL the
//! PostgreSQL engine emits, plus runtime helpers.
#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};

use asupersync::runtime::RuntimeBuilder;
use asupersync::{Cx, Outcome};
use regex::Regex;
use swiftorm::prelude::*;
use swiftorm_core::{ColumnInfo, ConnectionError, ConnectionErrorKind, QueryError, QueryErrorKind};

pub fn unwrap_outcome<T>(outcome: Outcome<T, Error>) -> T {
    match outcome {
        Outcome::Ok(v) => v,
        Outcome::Err(e) => panic!("unexpected error: {e}"),
        Outcome::Cancelled(r) => panic!("cancelled: {r:?}"),
        Outcome::Panicked(p) => panic!("panicked: {p:?}"),
    }
}

pub fn expect_err<T: std::fmt::Debug>(outcome: Outcome<T, Error>) -> Error {
    match outcome {
        Outcome::Ok(v) => panic!("expected an error, got {v:?}"),
        Outcome::Err(e) => e,
        Outcome::Cancelled(r) => panic!("cancelled: {r:?}"),
        Outcome::Panicked(p) => panic!("panicked: {p:?}"),
    }
}

/// Run a future on a fresh current-thread runtime.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    rt.block_on(fut)
}

/// Blog schemas: `Author` and `Post` (CASCADE on author delete).
pub struct Blog {
    pub registry: Arc<SchemaRegistry>,
    pub author: Arc<Schema>,
    pub post: Arc<Schema>,
}

pub fn blog_schemas() -> Blog {
    let registry = Arc::new(SchemaRegistry::new());
    let author = registry
        .register(
            SchemaBuilder::new("Author")
                .table_name("authors")
                .field(FieldInfo::integer("id").primary_key(true))
                .field(FieldInfo::text("name").required(true).max_length(100)),
        )
        .expect("register Author");
    let post = registry
        .register(
            SchemaBuilder::new("Post")
                .table_name("posts")
                .field(FieldInfo::integer("id").primary_key(true))
                .field(FieldInfo::text("title").required(true).max_length(200))
                .field(FieldInfo::text("content"))
                .foreign_key(
                    ForeignKeyInfo::new("author", &author).on_delete(ReferentialAction::Cascade),
                ),
        )
        .expect("register Post");
    Blog {
        registry,
        author,
        post,
    }
}

/// A connected database with every registered table created.
pub async fn ready_db(
    cx: &Cx,
    registry: &Arc<SchemaRegistry>,
) -> (Database<MemoryDriver>, MemoryDriver) {
    let driver = MemoryDriver::new();
    let db = Database::with_registry(driver.clone(), Arc::clone(registry));
    unwrap_outcome(db.connect(cx).await);
    unwrap_outcome(db.create_all_tables(cx).await);
    driver.clear_statements();
    (db, driver)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColType {
    Serial,
    Integer,
    Text(Option<usize>),
    Boolean,
}

#[derive(Debug, Clone)]
struct ColumnDef {
    name: String,
    ty: ColType,
    primary_key: bool,
    not_null: bool,
    unique: bool,
}

#[derive(Debug, Clone)]
struct ForeignKey {
    name: String,
    column: String,
    ref_table: String,
    ref_column: String,
    on_delete: String,
}

type Record = HashMap<String, Value>;

#[derive(Debug, Clone, Default)]
struct Table {
    columns: Vec<ColumnDef>,
    foreign_keys: Vec<ForeignKey>,
    rows: Vec<Record>,
    serial: i64,
}

impl Table {
    fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Default)]
struct State {
    connected: bool,
    connects: usize,
    closes: usize,
    tables: HashMap<String, Table>,
    statements: Vec<String>,
    fail_next: Option<QueryError>,
    fail_close: bool,
}

/// In-memory stand-in for a PostgreSQL connection.
///
/// Clones share state, so a test can keep a handle while the database owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    state: Arc<Mutex<State>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("driver state lock")
    }

    /// Every statement executed so far.
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    /// Statements starting with `prefix`.
    pub fn statements_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .statements
            .iter()
            .filter(|s| s.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_statements(&self) {
        self.lock().statements.clear();
    }

    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    pub fn table_exists(&self, table: &str) -> bool {
        self.lock().tables.contains_key(table)
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// The stored value of `column` in the row whose `key_column` is `key`.
    pub fn stored_value(&self, table: &str, key_column: &str, key: &Value, column: &str) -> Option<Value> {
        let state = self.lock();
        let t = state.tables.get(table)?;
        t.rows
            .iter()
            .find(|r| r.get(key_column) == Some(key))
            .and_then(|r| r.get(column).cloned())
    }

    /// Make the next statement fail with `err`.
    pub fn fail_next(&self, err: QueryError) {
        self.lock().fail_next = Some(err);
    }

    /// Make the next `close` fail and leave the connection open.
    pub fn fail_next_close(&self) {
        self.lock().fail_close = true;
    }

    fn run(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut state = self.lock();
        if !state.connected {
            return Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Disconnected,
                message: "connection is closed".to_string(),
                source: None,
            }));
        }
        state.statements.push(sql.to_string());
        if let Some(err) = state.fail_next.take() {
            return Err(Error::Query(err.with_sql(sql)));
        }

        let mut tables = state.tables.clone();
        let rows = if sql.starts_with("CREATE TABLE") {
            create_table(&mut tables, sql)?
        } else if sql.starts_with("INSERT") {
            insert(&mut tables, sql, params)?
        } else if sql.starts_with("UPDATE") {
            update(&mut tables, sql, params)?
        } else if sql.starts_with("DELETE") {
            delete(&mut tables, sql, params)?
        } else if sql.starts_with("SELECT") {
            select(&tables, sql, params)?
        } else {
            return Err(syntax_error(sql));
        };
        state.tables = tables;
        Ok(rows)
    }
}

impl Driver for MemoryDriver {
    fn connect(&self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        let mut state = self.lock();
        state.connected = true;
        state.connects += 1;
        async move { Outcome::Ok(()) }
    }

    fn close(&self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        let mut state = self.lock();
        let result = if std::mem::take(&mut state.fail_close) {
            Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Disconnected,
                message: "terminate message could not be sent".to_string(),
                source: None,
            }))
        } else {
            state.connected = false;
            state.closes += 1;
            Ok(())
        };
        async move {
            match result {
                Ok(()) => Outcome::Ok(()),
                Err(e) => Outcome::Err(e),
            }
        }
    }

    fn execute(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, Error>> + Send {
        let result = self.run(sql, params);
        async move {
            match result {
                Ok(rows) => Outcome::Ok(rows),
                Err(e) => Outcome::Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SQL interpretation
// ---------------------------------------------------------------------------

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("fixture regex"))
}

fn pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#""(\w+)" = \$(\d+)"#)
}

fn query_error(code: &str, kind: QueryErrorKind, message: String) -> Error {
    Error::Query(QueryError::new(kind, message).with_sqlstate(code))
}

fn syntax_error(sql: &str) -> Error {
    query_error("42601", QueryErrorKind::Syntax, format!("syntax error in: {sql}"))
}

fn missing_table(table: &str) -> Error {
    query_error(
        "42P01",
        QueryErrorKind::Database,
        format!("relation \"{table}\" does not exist"),
    )
}

fn missing_column(table: &str, column: &str) -> Error {
    query_error(
        "42703",
        QueryErrorKind::Database,
        format!("column \"{column}\" of relation \"{table}\" does not exist"),
    )
}

fn param(params: &[Value], index: &str) -> Result<Value> {
    let i: usize = index.parse().map_err(|_| Error::Custom(format!("bad placeholder ${index}")))?;
    params
        .get(i - 1)
        .cloned()
        .ok_or_else(|| Error::Custom(format!("missing parameter ${i}")))
}

/// `"col" = $n` pairs resolved against `params`.
fn pairs(text: &str, params: &[Value]) -> Result<Vec<(String, Value)>> {
    pair_re()
        .captures_iter(text)
        .map(|c| -> Result<(String, Value)> { Ok((c[1].to_string(), param(params, &c[2])?)) })
        .collect()
}

fn split_top_level(defs: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut current = String::new();
    for ch in defs.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn create_table(tables: &mut HashMap<String, Table>, sql: &str) -> Result<Vec<Row>> {
    static CREATE: OnceLock<Regex> = OnceLock::new();
    static COLUMN: OnceLock<Regex> = OnceLock::new();
    static FK: OnceLock<Regex> = OnceLock::new();
    let create = re(&CREATE, r#"^CREATE TABLE IF NOT EXISTS "(\w+)" \((.*)\);$"#);
    let column = re(
        &COLUMN,
        r#"^"(\w+)" (SERIAL|INTEGER|TEXT|BOOLEAN|VARCHAR\((\d+)\))(.*)$"#,
    );
    let fk = re(
        &FK,
        r#"^CONSTRAINT (\w+) FOREIGN KEY \("(\w+)"\) REFERENCES "(\w+)" \("(\w+)"\) ON DELETE (NO ACTION|RESTRICT|CASCADE|SET NULL|SET DEFAULT)$"#,
    );

    let caps = create.captures(sql).ok_or_else(|| syntax_error(sql))?;
    let name = caps[1].to_string();
    if tables.contains_key(&name) {
        return Ok(Vec::new());
    }

    let mut table = Table::default();
    for def in split_top_level(&caps[2]) {
        if let Some(c) = fk.captures(&def) {
            if !tables.contains_key(&c[3]) {
                return Err(missing_table(&c[3]));
            }
            table.foreign_keys.push(ForeignKey {
                name: c[1].to_string(),
                column: c[2].to_string(),
                ref_table: c[3].to_string(),
                ref_column: c[4].to_string(),
                on_delete: c[5].to_string(),
            });
        } else if let Some(c) = column.captures(&def) {
            let ty = match &c[2] {
                "SERIAL" => ColType::Serial,
                "INTEGER" => ColType::Integer,
                "TEXT" => ColType::Text(None),
                "BOOLEAN" => ColType::Boolean,
                _ => ColType::Text(c.get(3).and_then(|m| m.as_str().parse().ok())),
            };
            let rest = &c[4];
            table.columns.push(ColumnDef {
                name: c[1].to_string(),
                ty,
                primary_key: rest.contains("PRIMARY KEY"),
                not_null: rest.contains("NOT NULL"),
                unique: rest.contains("UNIQUE"),
            });
        } else {
            return Err(syntax_error(&def));
        }
    }
    tables.insert(name, table);
    Ok(Vec::new())
}

fn check_type(col: &ColumnDef, value: &Value) -> Result<()> {
    let ok = match (col.ty, value) {
        (_, Value::Null) => true,
        (ColType::Serial | ColType::Integer, Value::BigInt(_)) => true,
        (ColType::Boolean, Value::Bool(_)) => true,
        (ColType::Text(max), Value::Text(s)) => {
            if let Some(max) = max {
                if s.chars().count() > max {
                    return Err(query_error(
                        "22001",
                        QueryErrorKind::InvalidInput,
                        format!("value too long for type character varying({max})"),
                    ));
                }
            }
            true
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        let type_name = match col.ty {
            ColType::Serial | ColType::Integer => "integer",
            ColType::Text(_) => "text",
            ColType::Boolean => "boolean",
        };
        Err(query_error(
            "22P02",
            QueryErrorKind::InvalidInput,
            format!("invalid input syntax for type {type_name}: \"{value}\""),
        ))
    }
}

/// NOT NULL, UNIQUE and FOREIGN KEY checks for a candidate row.
fn check_row(
    tables: &HashMap<String, Table>,
    name: &str,
    record: &Record,
    skip_index: Option<usize>,
) -> Result<()> {
    let table = tables.get(name).ok_or_else(|| missing_table(name))?;
    for col in &table.columns {
        let value = record.get(&col.name).unwrap_or(&Value::Null);
        check_type(col, value)?;
        if value.is_null() {
            if col.primary_key || col.not_null {
                return Err(Error::Query(
                    QueryError::new(
                        QueryErrorKind::Constraint,
                        format!(
                            "null value in column \"{}\" of relation \"{name}\" violates not-null constraint",
                            col.name
                        ),
                    )
                    .with_sqlstate("23502"),
                ));
            }
            continue;
        }
        if col.primary_key || col.unique {
            let duplicate = table
                .rows
                .iter()
                .enumerate()
                .any(|(i, r)| Some(i) != skip_index && r.get(&col.name) == Some(value));
            if duplicate {
                let constraint = if col.primary_key {
                    format!("{name}_pkey")
                } else {
                    format!("{name}_{}_key", col.name)
                };
                return Err(Error::Query(
                    QueryError::new(
                        QueryErrorKind::Constraint,
                        format!("duplicate key value violates unique constraint \"{constraint}\""),
                    )
                    .with_sqlstate("23505")
                    .with_constraint(constraint),
                ));
            }
        }
    }
    for fk in &table.foreign_keys {
        let value = record.get(&fk.column).unwrap_or(&Value::Null);
        if value.is_null() {
            continue;
        }
        let exists = tables
            .get(&fk.ref_table)
            .is_some_and(|t| t.rows.iter().any(|r| r.get(&fk.ref_column) == Some(value)));
        if !exists {
            return Err(Error::Query(
                QueryError::new(
                    QueryErrorKind::Constraint,
                    format!(
                        "insert or update on table \"{name}\" violates foreign key constraint \"{}\"",
                        fk.name
                    ),
                )
                .with_sqlstate("23503")
                .with_constraint(fk.name.clone()),
            ));
        }
    }
    Ok(())
}

fn insert(tables: &mut HashMap<String, Table>, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    static INSERT: OnceLock<Regex> = OnceLock::new();
    let insert = re(
        &INSERT,
        r#"^INSERT INTO "(\w+)" (?:\((.+?)\) VALUES \((.+?)\)|DEFAULT VALUES)(?: RETURNING "(\w+)")?$"#,
    );
    let caps = insert.captures(sql).ok_or_else(|| syntax_error(sql))?;
    let name = caps[1].to_string();
    let table = tables.get(&name).ok_or_else(|| missing_table(&name))?;

    let mut record = Record::new();
    if let (Some(cols), Some(vals)) = (caps.get(2), caps.get(3)) {
        let cols: Vec<&str> = cols.as_str().split(", ").map(|c| c.trim_matches('"')).collect();
        let vals: Vec<&str> = vals.as_str().split(", ").map(|v| v.trim_start_matches('$')).collect();
        for (col, idx) in cols.into_iter().zip(vals) {
            if table.column(col).is_none() {
                return Err(missing_column(&name, col));
            }
            record.insert(col.to_string(), param(params, idx)?);
        }
    }

    let mut serial = table.serial;
    for col in &table.columns {
        let value = record.entry(col.name.clone()).or_insert(Value::Null);
        if col.ty == ColType::Serial {
            if value.is_null() {
                serial += 1;
                *value = Value::BigInt(serial);
            } else if let Some(v) = value.as_i64() {
                serial = serial.max(v);
            }
        }
    }

    check_row(tables, &name, &record, None)?;

    let returning = caps.get(4).map(|m| m.as_str().to_string());
    let table = tables.get_mut(&name).ok_or_else(|| missing_table(&name))?;
    table.serial = serial;
    let out = returning.map(|col| {
        let value = record.get(&col).cloned().unwrap_or_default();
        Row::from_pairs([(col, value)])
    });
    table.rows.push(record);
    Ok(out.into_iter().collect())
}

fn matching(table: &Table, conditions: &[(String, Value)]) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            conditions
                .iter()
                .all(|(c, v)| r.get(c).unwrap_or(&Value::Null) == v && !v.is_null())
        })
        .map(|(i, _)| i)
        .collect()
}

fn check_conditions(table: &Table, name: &str, conditions: &[(String, Value)]) -> Result<()> {
    for (column, value) in conditions {
        let col = table.column(column).ok_or_else(|| missing_column(name, column))?;
        check_type(col, value)?;
    }
    Ok(())
}

fn update(tables: &mut HashMap<String, Table>, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    static UPDATE: OnceLock<Regex> = OnceLock::new();
    let update = re(&UPDATE, r#"^UPDATE "(\w+)" SET (.+?)(?: WHERE (.+))?$"#);
    let caps = update.captures(sql).ok_or_else(|| syntax_error(sql))?;
    let name = caps[1].to_string();
    let sets = pairs(&caps[2], params)?;
    let conditions = match caps.get(3) {
        Some(m) => pairs(m.as_str(), params)?,
        None => Vec::new(),
    };

    let table = tables.get(&name).ok_or_else(|| missing_table(&name))?;
    check_conditions(table, &name, &conditions)?;
    for (column, _) in &sets {
        if table.column(column).is_none() {
            return Err(missing_column(&name, column));
        }
    }

    for idx in matching(table, &conditions) {
        let mut record = tables[&name].rows[idx].clone();
        for (column, value) in &sets {
            record.insert(column.clone(), value.clone());
        }
        check_row(tables, &name, &record, Some(idx))?;
        if let Some(t) = tables.get_mut(&name) {
            t.rows[idx] = record;
        }
    }
    Ok(Vec::new())
}

fn delete(tables: &mut HashMap<String, Table>, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    static DELETE: OnceLock<Regex> = OnceLock::new();
    let delete = re(&DELETE, r#"^DELETE FROM "(\w+)"(?: WHERE (.+))?$"#);
    let caps = delete.captures(sql).ok_or_else(|| syntax_error(sql))?;
    let name = caps[1].to_string();
    let conditions = match caps.get(2) {
        Some(m) => pairs(m.as_str(), params)?,
        None => Vec::new(),
    };
    let table = tables.get(&name).ok_or_else(|| missing_table(&name))?;
    check_conditions(table, &name, &conditions)?;
    delete_matching(tables, &name, &conditions)?;
    Ok(Vec::new())
}

/// Remove matching rows and apply ON DELETE actions of referencing tables.
fn delete_matching(
    tables: &mut HashMap<String, Table>,
    name: &str,
    conditions: &[(String, Value)],
) -> Result<()> {
    let table = tables.get_mut(name).ok_or_else(|| missing_table(name))?;
    let indices = matching(table, conditions);
    let mut removed = Vec::with_capacity(indices.len());
    for idx in indices.into_iter().rev() {
        removed.push(table.rows.remove(idx));
    }

    let referencing: Vec<(String, ForeignKey)> = tables
        .iter()
        .flat_map(|(t, def)| {
            def.foreign_keys
                .iter()
                .filter(|fk| fk.ref_table == name)
                .map(|fk| (t.clone(), fk.clone()))
                .collect::<Vec<_>>()
        })
        .collect();

    for row in &removed {
        for (child, fk) in &referencing {
            let key = row.get(&fk.ref_column).cloned().unwrap_or_default();
            let cond = vec![(fk.column.clone(), key)];
            let child_table = tables.get(child).ok_or_else(|| missing_table(child))?;
            let hits = matching(child_table, &cond);
            if hits.is_empty() {
                continue;
            }
            match fk.on_delete.as_str() {
                "CASCADE" => delete_matching(tables, child, &cond)?,
                "SET NULL" | "SET DEFAULT" => {
                    if let Some(t) = tables.get_mut(child) {
                        for idx in hits {
                            t.rows[idx].insert(fk.column.clone(), Value::Null);
                        }
                    }
                }
                _ => {
                    return Err(Error::Query(
                        QueryError::new(
                            QueryErrorKind::Constraint,
                            format!(
                                "update or delete on table \"{name}\" violates foreign key constraint \"{}\" on table \"{child}\"",
                                fk.name
                            ),
                        )
                        .with_sqlstate("23503")
                        .with_constraint(fk.name.clone()),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn select(tables: &HashMap<String, Table>, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    static SELECT: OnceLock<Regex> = OnceLock::new();
    static ORDER: OnceLock<Regex> = OnceLock::new();
    let select = re(
        &SELECT,
        r#"^SELECT (.+?) FROM "(\w+)"(?: WHERE (.+?))?(?: ORDER BY (.+?))?(?: LIMIT (\d+))?$"#,
    );
    let order = re(&ORDER, r#""(\w+)" (ASC|DESC)"#);

    let caps = select.captures(sql).ok_or_else(|| syntax_error(sql))?;
    let name = caps[2].to_string();
    let table = tables.get(&name).ok_or_else(|| missing_table(&name))?;

    let columns: Vec<String> = if &caps[1] == "*" {
        table.columns.iter().map(|c| c.name.clone()).collect()
    } else {
        caps[1]
            .split(", ")
            .map(|c| c.trim_matches('"').to_string())
            .collect()
    };
    for c in &columns {
        if table.column(c).is_none() {
            return Err(missing_column(&name, c));
        }
    }

    let conditions = match caps.get(3) {
        Some(m) => pairs(m.as_str(), params)?,
        None => Vec::new(),
    };
    check_conditions(table, &name, &conditions)?;

    let mut records: Vec<&Record> = matching(table, &conditions)
        .into_iter()
        .map(|i| &table.rows[i])
        .collect();

    if let Some(m) = caps.get(4) {
        let keys: Vec<(String, bool)> = order
            .captures_iter(m.as_str())
            .map(|c| (c[1].to_string(), &c[2] == "DESC"))
            .collect();
        records.sort_by(|a, b| {
            for (col, desc) in &keys {
                let ord = compare(
                    a.get(col).unwrap_or(&Value::Null),
                    b.get(col).unwrap_or(&Value::Null),
                );
                let ord = if *desc { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    if let Some(m) = caps.get(5) {
        let limit: usize = m.as_str().parse().map_err(|_| syntax_error(sql))?;
        records.truncate(limit);
    }

    let info = Arc::new(ColumnInfo::new(columns.clone()));
    Ok(records
        .into_iter()
        .map(|r| {
            let values = columns
                .iter()
                .map(|c| r.get(c).cloned().unwrap_or_default())
                .collect();
            Row::with_columns(Arc::clone(&info), values)
        })
        .collect())
}
