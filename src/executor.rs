//! Query execution: runs a compiled query over a collection of records.
//!
//! The pipeline order is fixed: WHERE filter, GROUP BY deduplication,
//! projection, DISTINCT, output shaping. Each record is visited exactly
//! once per stage it survives, and the first evaluation error aborts the
//! whole call: silently dropping records would make DISTINCT and GROUP BY
//! results ambiguous.

use crate::ast::{CompiledQuery, Expr, ReturnMode};
use crate::evaluator::{EvalError, EvalErrorKind, Evaluator};
use crate::functions::FunctionRegistry;
use crate::record::Record;
use crate::value::Value;

impl CompiledQuery {
    /// Executes the query against a collection with the built-in functions.
    ///
    /// The collection must not be mutated for the duration of the call;
    /// results come back in first-seen input order.
    ///
    /// ```
    /// use siftql::{query, Value};
    ///
    /// let q = query("SELECT o.x WHERE o.x > 1").unwrap();
    /// let records: Vec<Value> = [1, 2, 3]
    ///     .iter()
    ///     .map(|&x| {
    ///         let mut m = std::collections::HashMap::new();
    ///         m.insert("x".to_string(), Value::Integer(x));
    ///         Value::Map(m)
    ///     })
    ///     .collect();
    ///
    /// let results = q.execute(&records).unwrap();
    /// assert_eq!(results, vec![Value::Integer(2), Value::Integer(3)]);
    /// ```
    pub fn execute<R: Record>(&self, records: &[R]) -> Result<Vec<Value>, EvalError> {
        self.execute_with(&FunctionRegistry::default(), records)
    }

    /// Executes with a caller-supplied function registry.
    pub fn execute_with<R: Record>(
        &self,
        functions: &FunctionRegistry,
        records: &[R],
    ) -> Result<Vec<Value>, EvalError> {
        let evaluator = Evaluator::new(functions);

        // Stage 1: WHERE keeps records whose predicate is a true boolean.
        let mut survivors: Vec<(usize, &R)> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            match &self.predicate {
                None => survivors.push((index, record)),
                Some(predicate) => {
                    let verdict = evaluator
                        .eval(predicate, record)
                        .map_err(|e| e.with_record(index))?;
                    match verdict {
                        Value::Boolean(true) => survivors.push((index, record)),
                        Value::Boolean(false) => {}
                        other => {
                            return Err(EvalError::new(EvalErrorKind::NonBooleanPredicate(
                                other.type_name(),
                            ))
                            .with_expr(predicate)
                            .with_record(index));
                        }
                    }
                }
            }
        }

        // Stage 2: GROUP BY keeps the first record of each distinct key
        // tuple, in first-seen group order. With no aggregate functions in
        // the grammar, grouping is deduplication by key.
        if !self.group_by.is_empty() {
            let mut seen_keys: Vec<Vec<Value>> = Vec::new();
            let mut representatives: Vec<(usize, &R)> = Vec::new();
            for (index, record) in survivors {
                let mut key = Vec::with_capacity(self.group_by.len());
                for key_expr in &self.group_by {
                    key.push(
                        evaluator
                            .eval(key_expr, record)
                            .map_err(|e| e.with_record(index))?,
                    );
                }
                if !seen_keys.iter().any(|seen| tuple_eq(seen, &key)) {
                    seen_keys.push(key);
                    representatives.push((index, record));
                }
            }
            survivors = representatives;
        }

        // Stage 3: projection.
        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(survivors.len());
        for &(index, record) in &survivors {
            let mut row = Vec::with_capacity(self.projection.len());
            for column in &self.projection {
                row.push(
                    evaluator
                        .eval(column, record)
                        .map_err(|e| e.with_record(index))?,
                );
            }
            rows.push(row);
        }

        // Stage 4: DISTINCT keeps the first of each duplicate row.
        if self.distinct {
            let mut unique: Vec<Vec<Value>> = Vec::new();
            for row in rows {
                if !unique.iter().any(|seen| tuple_eq(seen, &row)) {
                    unique.push(row);
                }
            }
            rows = unique;
        }

        // Stage 5: shape per return mode.
        let results = match self.mode {
            ReturnMode::Single => rows
                .into_iter()
                .map(|row| row.into_iter().next().unwrap_or(Value::Null))
                .collect(),
            ReturnMode::Tuple => rows.into_iter().map(Value::List).collect(),
            ReturnMode::Record => {
                let names: Vec<String> = self.projection.iter().map(Expr::output_name).collect();
                rows.into_iter()
                    .map(|row| Value::Map(names.iter().cloned().zip(row).collect()))
                    .collect()
            }
        };
        Ok(results)
    }
}

fn tuple_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
}
