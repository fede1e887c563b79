use std::any::TypeId;
use std::fmt::Debug;

use thiserror::Error;

use crate::machine::*;

pub trait State: Send {
  type Context;
  type Event: Debug;

  fn on_enter(&mut self, _context: &mut Context<Self::Context, Self::Event>) {}
  fn on_exit(&mut self, _context: &mut Context<Self::Context, Self::Event>) {}

  #[must_use]
  fn handle(&mut self, context: &mut Context<Self::Context, Self::Event>, event: Self::Event) -> HandleResult<Self::Event>;
}

pub type HandleResult<E> = Result<Transition, NotHandled<E>>;

#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
  MoveTo(TypeId),
  None,
}

impl Transition {
  pub fn to<S: 'static>() -> Self {
    Transition::MoveTo(TypeId::of::<S>())
  }
}

#[derive(Error, Debug)]
pub enum NotHandled<E> {
  #[error("unknown event")]
  UnknownEvent(E),

  #[error("internal error: {0}")]
  InternalError(anyhow::Error),
}
