//! Output size estimation
//!
//! Predicts how many symbols and vertices `n` iterations will produce
//! without deriving the string. The derivation is linear in symbol counts:
//! one row per predecessor holding how many of each symbol its successor
//! contains, so the counts after `n` steps are `axiom × Tⁿ`.
//!
//! The vertex count charges every `]` a full three-vertex bridge, so it is
//! an upper bound for grammars whose brackets are not balanced.

pub mod matrix;

pub use matrix::Matrix;

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{LsysError, Result};
use crate::interpretation::InterpretationMap;
use crate::lsystem::LSystem;

/// Upper bounds for one iteration count. When `overflow` is set both
/// counts are `u64::MAX` and only mean "too large to represent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub symbol_count: u64,
    pub vertex_count: u64,
    pub overflow: bool,
}

/// Every symbol the derivation or the turtle can see, sorted and unique.
pub fn predecessor_set(lsystem: &LSystem, map: &InterpretationMap) -> Vec<char> {
    let mut symbols: BTreeSet<char> = lsystem.axiom().chars().collect();
    for (predecessor, successor) in lsystem.rules().iter() {
        symbols.insert(predecessor);
        symbols.extend(successor.chars());
    }
    symbols.extend(map.predecessors());
    symbols.into_iter().collect()
}

fn check_sorted(predecessors: &[char]) -> Result<()> {
    if predecessors.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(LsysError::UnsortedPredecessors)
    }
}

/// Matrix rows/cols are the positions of the symbols in `predecessors`.
fn symbol_index(predecessors: &[char], symbol: char) -> Option<usize> {
    predecessors.binary_search(&symbol).ok()
}

/// `1×k` count of each predecessor in the axiom.
pub fn axiom_vector(lsystem: &LSystem, predecessors: &[char]) -> Result<Matrix> {
    check_sorted(predecessors)?;
    let mut m = Matrix::zeros(1, predecessors.len());
    for symbol in lsystem.axiom().chars() {
        if let Some(j) = symbol_index(predecessors, symbol) {
            m.increment(0, j);
        }
    }
    Ok(m)
}

/// `k×k` transition matrix; unruled symbols rewrite to themselves.
pub fn transition_matrix(lsystem: &LSystem, predecessors: &[char]) -> Result<Matrix> {
    check_sorted(predecessors)?;
    let k = predecessors.len();
    let mut m = Matrix::zeros(k, k);
    for (i, &predecessor) in predecessors.iter().enumerate() {
        match lsystem.rules().get(predecessor) {
            Some(successor) => {
                for symbol in successor.chars() {
                    if let Some(j) = symbol_index(predecessors, symbol) {
                        m.increment(i, j);
                    }
                }
            }
            None => m.set(i, i, 1),
        }
    }
    Ok(m)
}

/// `k×1` vertices emitted per occurrence of each predecessor.
pub fn vertex_yield_vector(map: &InterpretationMap, predecessors: &[char]) -> Result<Matrix> {
    check_sorted(predecessors)?;
    let mut m = Matrix::zeros(predecessors.len(), 1);
    for (i, &symbol) in predecessors.iter().enumerate() {
        if let Some(order) = map.get(symbol) {
            m.set(i, 0, order.vertex_yield());
        }
    }
    Ok(m)
}

/// Upper bound on symbol and vertex counts after `n` iterations.
pub fn compute_max_size(lsystem: &LSystem, map: &InterpretationMap, n: usize) -> Result<SizeEstimate> {
    let predecessors = predecessor_set(lsystem, map);
    estimate_over(lsystem, map, &predecessors, n)
}

/// [`compute_max_size`] over an explicit symbol set.
///
/// Symbols missing from `predecessors` are not counted, so the result is
/// only an upper bound when the set covers [`predecessor_set`].
pub fn estimate_over(
    lsystem: &LSystem,
    map: &InterpretationMap,
    predecessors: &[char],
    n: usize,
) -> Result<SizeEstimate> {
    let axiom = axiom_vector(lsystem, predecessors)?;
    let transitions = transition_matrix(lsystem, predecessors)?;
    let yields = vertex_yield_vector(map, predecessors)?;

    let counts = axiom.mul(&transitions.pow(n)?)?;
    let (symbol_count, symbols_overflow) = counts.grand_sum();

    let (forward_vertices, vertices_overflow) = counts.mul(&yields)?.grand_sum();
    let (vertex_count, initial_overflow) = match forward_vertices.checked_add(1) {
        Some(v) => (v, false),
        None => (u64::MAX, true),
    };

    if symbols_overflow || vertices_overflow || initial_overflow {
        tracing::debug!(n, "size estimate overflowed");
        return Ok(SizeEstimate {
            symbol_count: u64::MAX,
            vertex_count: u64::MAX,
            overflow: true,
        });
    }

    tracing::debug!(n, symbol_count, vertex_count, "size estimate");
    Ok(SizeEstimate {
        symbol_count,
        vertex_count,
        overflow: false,
    })
}
