use std::fmt::Debug;

use crate::graph::{GraphError, StateGraph};

/// Everything [crate::machine::StateMachine::start] needs to run a machine: its name for
/// logging, the graph of states, and the context the states will share.
pub trait StateMachineDescriptor {
  type Context;
  type Event: Debug;

  fn debug_name(&self) -> &'static str;
  fn states(&self) -> Result<StateGraph<Self::Context, Self::Event>, GraphError>;
  fn into_context(self) -> Self::Context;
}
