use std::any::TypeId;
use std::collections::HashMap;

use crate::graph::{GraphError, StateGraph, StateNode};
use crate::state::State;

pub struct StateGraphBuilder<C, E> {
  nodes: HashMap<TypeId, StateNode<C, E>>,
  insertion_order: Vec<TypeId>,
  initial_state: Option<TypeId>,
  last_type_id: Option<TypeId>,
  target_names: HashMap<TypeId, &'static str>,

  /// First mistake made while chaining; reported by [Self::build].
  error: Option<GraphError>,
}

impl<C, E> StateGraphBuilder<C, E> {
  pub fn new() -> Self {
    Self {
      nodes: HashMap::new(),
      insertion_order: vec![],
      initial_state: None,
      last_type_id: None,
      target_names: HashMap::new(),
      error: None,
    }
  }

  pub fn add<S>(mut self) -> Self
      where S: State<Context = C, Event = E> + Default + 'static {
    let state_id = TypeId::of::<S>();
    let debug_name = short_name::<S>();
    if self.nodes.contains_key(&state_id) {
      self.record_error(GraphError::DuplicateState(debug_name));
    } else {
      self.nodes.insert(state_id, StateNode {
        type_id: state_id,
        debug_name,
        transitions_to: vec![],
        is_terminal: false,
        factory: || Box::new(S::default()),
      });
      self.insertion_order.push(state_id);
    }
    self.last_type_id = Some(state_id);
    self
  }

  pub fn transitions_to<S>(mut self) -> Self
      where S: State<Context = C, Event = E> + 'static {
    let target_id = TypeId::of::<S>();
    self.target_names.insert(target_id, short_name::<S>());
    match self.last_node_mut() {
      Some(node) => {
        if !node.transitions_to.contains(&target_id) {
          node.transitions_to.push(target_id);
        }
      },
      None => self.record_error(GraphError::NoStateToConfigure("transitions_to")),
    }
    self
  }

  pub fn initial(mut self) -> Self {
    match self.last_type_id {
      Some(id) => self.initial_state = Some(id),
      None => self.record_error(GraphError::NoStateToConfigure("initial")),
    }
    self
  }

  /// Marks the last added state as final: once entered the machine stops handling events.
  pub fn terminal(mut self) -> Self {
    match self.last_node_mut() {
      Some(node) => node.is_terminal = true,
      None => self.record_error(GraphError::NoStateToConfigure("terminal")),
    }
    self
  }

  pub fn build(self) -> Result<StateGraph<C, E>, GraphError> {
    if let Some(err) = self.error {
      return Err(err);
    }
    let initial_state = self.initial_state.ok_or(GraphError::NoInitialState)?;

    for type_id in &self.insertion_order {
      let node = &self.nodes[type_id];
      if node.is_terminal && !node.transitions_to.is_empty() {
        return Err(GraphError::TerminalWithTransitions(node.debug_name));
      }
      if let Some(missing) = node.transitions_to.iter().find(|&t| !self.nodes.contains_key(t)) {
        return Err(GraphError::UnknownTarget {
          from: node.debug_name,
          to: self.target_names.get(missing).copied().unwrap_or("?"),
        });
      }
    }

    Ok(StateGraph {
      nodes: self.nodes,
      insertion_order: self.insertion_order,
      initial_state,
    })
  }

  fn last_node_mut(&mut self) -> Option<&mut StateNode<C, E>> {
    let last = self.last_type_id?;
    self.nodes.get_mut(&last)
  }

  fn record_error(&mut self, err: GraphError) {
    if self.error.is_none() {
      self.error = Some(err);
    }
  }
}

impl<C, E> Default for StateGraphBuilder<C, E> {
  fn default() -> Self {
    Self::new()
  }
}

fn short_name<S>() -> &'static str {
  let full_name = std::any::type_name::<S>();
  full_name.rsplit("::").next().unwrap_or(full_name)
}
