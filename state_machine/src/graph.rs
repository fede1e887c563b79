use std::any::TypeId;
use std::collections::HashMap;

use thiserror::Error;

use crate::graph_builder::StateGraphBuilder;
use crate::state::*;

pub(crate) type StateFactory<C, E> = fn() -> Box<dyn State<Context = C, Event = E>>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
  #[error("no initial state, call .initial() after adding it")]
  NoInitialState,

  #[error("{0} was added more than once")]
  DuplicateState(&'static str),

  #[error("{from} transitions to {to}, which was never added")]
  UnknownTarget { from: &'static str, to: &'static str },

  #[error("{0} is terminal but declares transitions")]
  TerminalWithTransitions(&'static str),

  #[error("{0} must be called after adding a state")]
  NoStateToConfigure(&'static str),
}

pub struct StateGraph<C, E> {
  pub(crate) nodes: HashMap<TypeId, StateNode<C, E>>,
  pub(crate) insertion_order: Vec<TypeId>,
  pub(crate) initial_state: TypeId,
}

impl<C, E> StateGraph<C, E> {
  pub fn builder() -> StateGraphBuilder<C, E> {
    StateGraphBuilder::new()
  }

  pub(crate) fn lookup(&self, type_id: TypeId) -> Option<&StateNode<C, E>> {
    self.nodes.get(&type_id)
  }

  pub(crate) fn ordered_nodes(&self) -> impl Iterator<Item = &StateNode<C, E>> {
    self.insertion_order.iter().filter_map(|t| self.nodes.get(t))
  }

  pub fn initial_state_name(&self) -> &'static str {
    self.lookup(self.initial_state).map(|n| n.debug_name).unwrap_or("?")
  }

  pub fn state_names(&self) -> Vec<&'static str> {
    self.ordered_nodes().map(|n| n.debug_name).collect()
  }

  /// Names of the states `name` may move to, in declaration order.
  pub fn transitions_from(&self, name: &str) -> Vec<&'static str> {
    self.ordered_nodes()
        .find(|n| n.debug_name == name)
        .map(|n| n.transitions_to.iter().filter_map(|&t| self.lookup(t)).map(|t| t.debug_name).collect())
        .unwrap_or_default()
  }

  pub fn is_terminal(&self, name: &str) -> bool {
    self.ordered_nodes().any(|n| n.debug_name == name && n.is_terminal)
  }

  pub(crate) fn can_transition(&self, from: TypeId, to: TypeId) -> bool {
    self.lookup(from).map_or(false, |n| n.transitions_to.contains(&to))
  }
}

pub(crate) struct StateNode<C, E> {
  pub(crate) type_id: TypeId,
  pub(crate) debug_name: &'static str,
  pub(crate) transitions_to: Vec<TypeId>,
  pub(crate) is_terminal: bool,
  pub(crate) factory: StateFactory<C, E>,
}
