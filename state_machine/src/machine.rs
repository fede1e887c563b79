use std::any::TypeId;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::future::Future;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, Receiver, Sender, WeakSender};
use tokio::task::{JoinError, JoinHandle};

use crate::descriptor::*;
use crate::graph::*;
use crate::state::*;

const EVENT_QUEUE_DEPTH: usize = 32;

pub struct Context<C, E> {
  pub user: C,
  tx: WeakSender<InternalEvent<E>>,
}

impl<C, E> Context<C, E> {
  pub fn dispatcher(&self) -> Dispatcher<E> {
    Dispatcher { tx: self.tx.clone() }
  }
}

/// Only the [StateMachine] handle keeps the event loop alive.  Dispatchers hold a weak sender, so
/// dropping the handle without calling `shutdown` still ends the machine's task.
pub struct Dispatcher<E> {
  tx: WeakSender<InternalEvent<E>>,
}

impl<E> Clone for Dispatcher<E> {
  fn clone(&self) -> Self {
    Dispatcher { tx: self.tx.clone() }
  }
}

impl<E: Send + 'static> Dispatcher<E> {
  pub async fn dispatch(&self, event: E) {
    let tx = match self.tx.upgrade() {
      Some(tx) => tx,
      None => {
        debug!("Machine already dropped, dropping event");
        return;
      },
    };
    if tx.send(InternalEvent::UserEvent(event)).await.is_err() {
      debug!("Machine already stopped, dropping event");
    }
  }

  /// Run `work` on its own task and dispatch the event it resolves to.  This is how states kick
  /// off long running operations from `on_enter` without blocking the event loop.
  pub fn dispatch_when_done<F>(&self, work: F)
      where F: Future<Output = E> + Send + 'static {
    let dispatcher = self.clone();
    tokio::spawn(async move {
      let event = work.await;
      dispatcher.dispatch(event).await;
    });
  }
}

pub struct StateMachine<C, E> {
  tx: Sender<InternalEvent<E>>,
  join_handle: JoinHandle<C>,
}

impl<C: Send + 'static, E: Debug + Send + 'static> StateMachine<C, E> {
  pub fn start<D>(descriptor: D) -> Result<Self, GraphError>
      where D: StateMachineDescriptor<Context = C, Event = E> {
    let debug_name = descriptor.debug_name();
    let states = descriptor.states()?;
    let user = descriptor.into_context();

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let context = Context { user, tx: tx.downgrade() };
    let join_handle = tokio::spawn(async move {
      let mut internal = StateMachineInternal {
        debug_name,
        context,
        states,
        current_state: None,
        is_done: false,
        rx,
        front_of_queue_events: VecDeque::new(),
      };
      internal.enter_initial_state();
      internal.handle_events().await;

      // Give the context back to the caller on shutdown so they can inspect the results.
      internal.context.user
    });
    Ok(Self {
      tx,
      join_handle,
    })
  }

  /// Stop after every event queued so far has been handled and hand back the context.
  pub async fn shutdown(self) -> Result<C, JoinError> {
    let _ = self.tx.send(InternalEvent::Shutdown).await;
    self.join_handle.await
  }

  pub fn dispatcher(&self) -> Dispatcher<E> {
    Dispatcher { tx: self.tx.downgrade() }
  }
}

struct StateMachineInternal<C, E> {
  debug_name: &'static str,
  context: Context<C, E>,
  states: StateGraph<C, E>,
  current_state: Option<StateInstance<C, E>>,

  /// Set once a terminal state is entered.
  is_done: bool,

  rx: Receiver<InternalEvent<E>>,

  /// Events that will always be processed before dispatched user events.  Transitions go here
  /// so a state change is fully applied before the next user event is looked at.
  front_of_queue_events: VecDeque<InternalEvent<E>>,
}

impl<C, E: Debug> StateMachineInternal<C, E> {
  async fn handle_events(&mut self) {
    while let Some(event) = self.take_next_event().await {
      match event {
        InternalEvent::UserEvent(event) => self.handle_user_event(event),
        InternalEvent::MoveTo(state_type_id) => self.handle_move_to(state_type_id),
        InternalEvent::Shutdown => self.handle_shutdown(),
      }
    }
    debug!("{}: No longer handling events", self.debug_name);
  }

  async fn take_next_event(&mut self) -> Option<InternalEvent<E>> {
    if let Some(front) = self.front_of_queue_events.pop_front() {
      return Some(front);
    }
    self.rx.recv().await
  }

  fn handle_user_event(&mut self, event: E) {
    let debug_name = self.debug_name;
    let current = match self.current_state.as_mut() {
      Some(current) => current,
      None => {
        warn!("{}: No current state, dropping [{:?}]", debug_name, event);
        return;
      },
    };
    if self.is_done {
      warn!("{}: [{}] is terminal, dropping [{:?}]", debug_name, current.debug_name, event);
      return;
    }

    let event_str = format!("{:?}", event);
    debug!("{}: [{}] Received [{}]", debug_name, current.debug_name, event_str);
    match current.instance.handle(&mut self.context, event) {
      Ok(Transition::None) => (),
      Ok(Transition::MoveTo(next_type_id)) => {
        self.front_of_queue_events.push_front(InternalEvent::MoveTo(next_type_id));
      },
      Err(NotHandled::UnknownEvent(_)) => {
        warn!("{}: [{}] Unhandled [{}]", debug_name, current.debug_name, event_str);
      },
      Err(NotHandled::InternalError(err)) => {
        error!("{}: [{}] Internal error handling [{}]: {:#}", debug_name, current.debug_name, event_str, err);
      },
    }
  }

  fn handle_shutdown(&mut self) {
    info!("{}: Received shutdown signal...", self.debug_name);
    self.rx.close();
  }

  fn handle_move_to(&mut self, next_type_id: TypeId) {
    let (current_type_id, current_name) = match &self.current_state {
      Some(current) => (current.type_id, current.debug_name),
      None => return self.enter_state(next_type_id),
    };
    let next_name = self.states.lookup(next_type_id).map_or("<unregistered>", |n| n.debug_name);
    if !self.states.can_transition(current_type_id, next_type_id) {
      error!(
        "{}: [{}] => [{}] is not a declared transition, staying put",
        self.debug_name,
        current_name,
        next_name);
      return;
    }

    info!("{}: [{}] => [{}]", self.debug_name, current_name, next_name);
    if let Some(mut current) = self.current_state.take() {
      debug!("{}: Exiting [{}]...", self.debug_name, current.debug_name);
      current.instance.on_exit(&mut self.context);
    }
    self.enter_state(next_type_id);
  }

  fn enter_initial_state(&mut self) {
    let initial = self.states.initial_state;
    self.enter_state(initial);
  }

  fn enter_state(&mut self, type_id: TypeId) {
    let node = match self.states.lookup(type_id) {
      Some(node) => node,
      None => {
        error!("{}: Asked to enter a state that was never added", self.debug_name);
        return;
      },
    };
    let mut state = StateInstance {
      type_id: node.type_id,
      debug_name: node.debug_name,
      instance: (node.factory)(),
    };
    let is_terminal = node.is_terminal;

    debug!("{}: Entering [{}]...", self.debug_name, state.debug_name);
    state.instance.on_enter(&mut self.context);
    if is_terminal {
      info!("{}: Reached terminal state [{}]", self.debug_name, state.debug_name);
      self.is_done = true;
    }
    self.current_state = Some(state);
  }
}

enum InternalEvent<E> {
  /// Move to the state denoted by the provided TypeId.
  MoveTo(TypeId),

  /// Handle a user-provided event in the current state.
  UserEvent(E),

  /// Shutdown the state machine; no longer handle messages after this one is received (which is
  /// still governed by FIFO ordering).
  Shutdown,
}

struct StateInstance<C, E> {
  type_id: TypeId,
  debug_name: &'static str,
  instance: Box<dyn State<Context = C, Event = E>>,
}
