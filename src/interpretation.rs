//! Symbol → turtle order mapping

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::rule_map::RuleMap;

/// The five turtle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    GoForward,
    TurnRight,
    TurnLeft,
    SavePosition,
    LoadPosition,
}

impl Order {
    /// Vertices emitted by one occurrence of this order, counting a
    /// successful position restore as its full three-vertex bridge.
    pub fn vertex_yield(self) -> u64 {
        match self {
            Order::GoForward => 1,
            Order::LoadPosition => 3,
            Order::TurnRight | Order::TurnLeft | Order::SavePosition => 0,
        }
    }
}

/// Default symbol table.
pub const DEFAULT_ORDERS: [(char, Order); 5] = [
    ('F', Order::GoForward),
    ('-', Order::TurnLeft),
    ('+', Order::TurnRight),
    ('[', Order::SavePosition),
    (']', Order::LoadPosition),
];

/// `RuleMap<Order>`: which symbols the turtle reacts to.
#[derive(Debug, Clone, Default)]
pub struct InterpretationMap(RuleMap<Order>);

impl InterpretationMap {
    /// Empty map: every symbol is ignored by the turtle.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default F / - / + / [ / ] table.
    pub fn with_defaults() -> Self {
        DEFAULT_ORDERS.into_iter().collect()
    }
}

impl FromIterator<(char, Order)> for InterpretationMap {
    fn from_iter<I: IntoIterator<Item = (char, Order)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Deref for InterpretationMap {
    type Target = RuleMap<Order>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for InterpretationMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
