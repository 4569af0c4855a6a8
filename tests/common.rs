//! In memory driver answering statements with scripted responses. It records every call made into
//! it, so tests can assert on how the cursor talks to the driver.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use bulk_cursor::{
    ColumnInfo, DataType, Field, NullableField, Nullability,
    buffers::ColumnarBuffer,
    driver::{Connection, Diagnostics, Record, RowCount, State, Statement},
};

/// A call into the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare(String),
    /// Parameter sets bound with a single call.
    Bind(Vec<Vec<NullableField>>),
    Execute,
    Describe,
    /// Fetch into a buffer with the given capacity.
    Fetch(usize),
}

/// How a prepared statement behaves.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub num_params: usize,
    /// Empty, if the statement does not produce a result set.
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<NullableField>>,
    /// Row count reported by each execution. Defaults to the number of parameter sets bound for
    /// statements without result set and `-1` for statements with one.
    pub row_count: Option<RowCount>,
    /// Zero based index of a fetch call which fails.
    pub failing_fetch: Option<usize>,
    pub failing_execute: bool,
    /// Warnings reported after each successful execution.
    pub warnings: Vec<Record>,
}

impl Script {
    /// A statement selecting `values` as a single integer column named `x`.
    pub fn select_integers(values: impl IntoIterator<Item = i64>) -> Self {
        Script {
            columns: vec![ColumnInfo::new("x", DataType::BigInt, Nullability::NoNulls)],
            rows: values
                .into_iter()
                .map(|value| vec![Some(Field::Integer(value))])
                .collect(),
            ..Script::default()
        }
    }

    /// A statement without result set and `num_params` parameters.
    pub fn insert(num_params: usize) -> Self {
        Script {
            num_params,
            ..Script::default()
        }
    }
}

#[derive(Default)]
pub struct InMemoryDriver {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl InMemoryDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Statements prepared with `sql` behave according to `script`.
    pub fn script(&self, sql: &str, script: Script) {
        self.scripts.lock().unwrap().insert(sql.to_owned(), script);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn num_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Fetch(_)))
            .count()
    }

    pub fn num_executes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Execute))
            .count()
    }

    /// Parameter sets of each bind call, in order.
    pub fn bound_batches(&self) -> Vec<Vec<Vec<NullableField>>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Bind(rows) => Some(rows),
                _ => None,
            })
            .collect()
    }
}

impl Connection for InMemoryDriver {
    type Statement = InMemoryStatement;

    fn prepare(&self, sql: &str) -> Result<InMemoryStatement, Record> {
        self.calls.lock().unwrap().push(Call::Prepare(sql.to_owned()));
        let script = self.scripts.lock().unwrap().get(sql).cloned().ok_or_else(|| {
            Record::new(
                State::SYNTAX_ERROR_OR_ACCESS_VIOLATION,
                102,
                format!("Incorrect syntax: {sql}"),
            )
        })?;
        Ok(InMemoryStatement {
            script,
            calls: self.calls.clone(),
            num_bound: 0,
            position: 0,
            num_fetches: 0,
            warnings: Vec::new(),
        })
    }
}

pub struct InMemoryStatement {
    script: Script,
    calls: Arc<Mutex<Vec<Call>>>,
    num_bound: usize,
    /// Index of the next row to fetch.
    position: usize,
    num_fetches: usize,
    /// Diagnostics of the last call.
    warnings: Vec<Record>,
}

impl InMemoryStatement {
    fn record(&mut self, call: Call) {
        self.warnings.clear();
        self.calls.lock().unwrap().push(call);
    }
}

impl Diagnostics for InMemoryStatement {
    fn diagnostic_record(&self, rec_number: i16) -> Option<Record> {
        let index = usize::try_from(rec_number).ok()?.checked_sub(1)?;
        self.warnings.get(index).cloned()
    }
}

impl Statement for InMemoryStatement {
    fn num_params(&mut self) -> Result<usize, Record> {
        Ok(self.script.num_params)
    }

    fn bind_parameter_batch(&mut self, parameters: &ColumnarBuffer) -> Result<(), Record> {
        let rows = (0..parameters.num_rows())
            .map(|row_index| parameters.row(row_index))
            .collect();
        self.record(Call::Bind(rows));
        self.num_bound = parameters.num_rows();
        Ok(())
    }

    fn execute(&mut self) -> Result<RowCount, Record> {
        self.record(Call::Execute);
        if self.script.failing_execute {
            return Err(Record::new(
                State(*b"23000"),
                2627,
                "Violation of PRIMARY KEY constraint.",
            ));
        }
        self.position = 0;
        self.num_fetches = 0;
        self.warnings = self.script.warnings.clone();
        let default_row_count = if self.script.columns.is_empty() {
            self.num_bound as RowCount
        } else {
            -1
        };
        Ok(self.script.row_count.unwrap_or(default_row_count))
    }

    fn describe_result_columns(&mut self) -> Result<Vec<ColumnInfo>, Record> {
        self.record(Call::Describe);
        Ok(self.script.columns.clone())
    }

    fn fetch(&mut self, buffer: &mut ColumnarBuffer) -> Result<usize, Record> {
        self.record(Call::Fetch(buffer.capacity()));
        let fetch_index = self.num_fetches;
        self.num_fetches += 1;
        if self.script.failing_fetch == Some(fetch_index) {
            return Err(communication_link_failure());
        }
        let remaining = &self.script.rows[self.position..];
        let num_rows = remaining.len().min(buffer.capacity());
        for (row_index, row) in remaining[..num_rows].iter().enumerate() {
            buffer.set_row(row_index, row);
        }
        self.position += num_rows;
        Ok(num_rows)
    }
}

/// Error reported by failing fetches.
pub fn communication_link_failure() -> Record {
    Record::new(
        State::COMMUNICATION_LINK_FAILURE,
        10054,
        "TCP Provider: An existing connection was forcibly closed by the remote host.",
    )
}

/// Single column integer rows.
pub fn int_rows(values: impl IntoIterator<Item = i64>) -> Vec<Vec<NullableField>> {
    values
        .into_iter()
        .map(|value| vec![Some(Field::Integer(value))])
        .collect()
}
