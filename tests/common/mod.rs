#![allow(dead_code)] // not every test binary uses every helper

//! Scripted mock driver for exercising the executor state machine.
//!
//! The mock counts every primitive invocation, supports per-step failure
//! injection and canned statement results, and enforces a bounded pool so
//! tests can observe acquisition ordering.

use sqltx::adapter::Completion;
use sqltx::config::PoolConfig;
use sqltx::driver::{Driver, DriverConnection, DriverPool};
use sqltx::error::DriverError;
use sqltx::models::{ExecuteResult, FieldMeta, QueryOutput, Row, SqlParam, StatementResult};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Behavior {
    capacity: usize,
    fail_acquire: bool,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
    fail_sql: Option<String>,
    results: HashMap<String, StatementResult>,
}

#[derive(Default)]
pub struct Counters {
    pub acquires: AtomicUsize,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub releases: AtomicUsize,
    pub statements: AtomicUsize,
    pub ends: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

pub struct MockState {
    behavior: Behavior,
    pub counters: Counters,
    insert_seq: AtomicU64,
    slots: Mutex<usize>,
    waiters: Mutex<VecDeque<Completion<MockConnection>>>,
}

fn grant(state: &Arc<MockState>, done: Completion<MockConnection>) {
    state.counters.acquires.fetch_add(1, Ordering::SeqCst);
    let active = state.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
    state.counters.max_active.fetch_max(active, Ordering::SeqCst);
    done.resolve(MockConnection {
        state: Arc::clone(state),
    });
}

pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MockDriverBuilder {
        MockDriverBuilder {
            behavior: Behavior {
                capacity: 4,
                ..Behavior::default()
            },
        }
    }

    /// Shared state handle for asserting on counters after the fact.
    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }
}

pub struct MockDriverBuilder {
    behavior: Behavior,
}

impl MockDriverBuilder {
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.behavior.capacity = capacity;
        self
    }

    pub fn fail_acquire(mut self) -> Self {
        self.behavior.fail_acquire = true;
        self
    }

    pub fn fail_begin(mut self) -> Self {
        self.behavior.fail_begin = true;
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.behavior.fail_commit = true;
        self
    }

    pub fn fail_rollback(mut self) -> Self {
        self.behavior.fail_rollback = true;
        self
    }

    /// Statements containing `fragment` reject with a driver error.
    pub fn fail_sql(mut self, fragment: impl Into<String>) -> Self {
        self.behavior.fail_sql = Some(fragment.into());
        self
    }

    /// Canned result for an exact statement text.
    pub fn result(mut self, sql: impl Into<String>, result: StatementResult) -> Self {
        self.behavior.results.insert(sql.into(), result);
        self
    }

    pub fn rows(self, sql: impl Into<String>, rows: Vec<Row>) -> Self {
        self.result(sql, StatementResult::Rows(rows))
    }

    pub fn build(self) -> MockDriver {
        let capacity = self.behavior.capacity;
        MockDriver {
            state: Arc::new(MockState {
                behavior: self.behavior,
                counters: Counters::default(),
                insert_seq: AtomicU64::new(0),
                slots: Mutex::new(capacity),
                waiters: Mutex::new(VecDeque::new()),
            }),
        }
    }
}

impl Driver for MockDriver {
    type Pool = MockPool;

    fn create_pool(&self, _config: &PoolConfig) -> Result<MockPool, DriverError> {
        Ok(MockPool {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockPool {
    state: Arc<MockState>,
}

impl DriverPool for MockPool {
    type Connection = MockConnection;

    fn get_connection(&self, done: Completion<MockConnection>) {
        if self.state.behavior.fail_acquire {
            done.reject(DriverError::new("pool exhausted"));
            return;
        }
        let granted = {
            let mut slots = self.state.slots.lock().unwrap();
            if *slots > 0 {
                *slots -= 1;
                true
            } else {
                false
            }
        };
        if granted {
            grant(&self.state, done);
        } else {
            self.state.waiters.lock().unwrap().push_back(done);
        }
    }

    fn end(&self) {
        self.state.counters.ends.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockConnection {
    state: Arc<MockState>,
}

impl DriverConnection for MockConnection {
    fn query(&self, sql: &str, _params: Vec<SqlParam>, done: Completion<QueryOutput>) {
        let state = &self.state;
        state.counters.statements.fetch_add(1, Ordering::SeqCst);

        if let Some(fragment) = &state.behavior.fail_sql {
            if sql.contains(fragment.as_str()) {
                done.reject(DriverError::with_code("statement rejected", "42000"));
                return;
            }
        }

        if let Some(canned) = state.behavior.results.get(sql) {
            let results = canned.clone();
            let fields = match &results {
                StatementResult::Rows(rows) => fields_of(rows),
                StatementResult::Done(_) => Vec::new(),
            };
            done.resolve(QueryOutput { results, fields });
            return;
        }

        let head = sql
            .trim_start()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        let results = if head == "SELECT" {
            StatementResult::Rows(Vec::new())
        } else {
            let insert_id = state.insert_seq.fetch_add(1, Ordering::SeqCst) + 1;
            StatementResult::Done(ExecuteResult {
                affected_rows: 1,
                insert_id: Some(insert_id),
            })
        };
        done.resolve(QueryOutput {
            results,
            fields: Vec::new(),
        });
    }

    fn begin_transaction(&self, done: Completion<()>) {
        self.state.counters.begins.fetch_add(1, Ordering::SeqCst);
        if self.state.behavior.fail_begin {
            done.reject(DriverError::new("begin failed"));
        } else {
            done.resolve(());
        }
    }

    fn commit(&self, done: Completion<()>) {
        self.state.counters.commits.fetch_add(1, Ordering::SeqCst);
        if self.state.behavior.fail_commit {
            done.reject(DriverError::new("commit failed"));
        } else {
            done.resolve(());
        }
    }

    fn rollback(&self, done: Completion<()>) {
        self.state.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.state.behavior.fail_rollback {
            done.reject(DriverError::new("rollback failed"));
        } else {
            done.resolve(());
        }
    }

    fn release(self) {
        let state = Arc::clone(&self.state);
        state.counters.releases.fetch_add(1, Ordering::SeqCst);
        state.counters.active.fetch_sub(1, Ordering::SeqCst);
        let waiter = state.waiters.lock().unwrap().pop_front();
        match waiter {
            Some(done) => grant(&state, done),
            None => *state.slots.lock().unwrap() += 1,
        }
    }
}

fn fields_of(rows: &[Row]) -> Vec<FieldMeta> {
    rows.first()
        .map(|row| {
            row.keys()
                .map(|name| FieldMeta::new(name.clone(), "TEXT", false))
                .collect()
        })
        .unwrap_or_default()
}

/// Build a row from column/value pairs.
pub fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
