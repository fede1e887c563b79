use std::fmt::Write;

use crate::graph::StateGraph;

pub struct StateGraphPrinter;

impl StateGraphPrinter {
  /// # Example output:
  ///
  /// ```text
  /// StateGraph {
  ///   * Idle => Working
  ///   Working => [Idle, Broken]
  ///   Broken (terminal)
  /// }
  /// ```
  ///
  /// The initial state is marked with `*`.
  pub fn render<C, E>(states: &StateGraph<C, E>) -> String {
    let mut out = String::from("StateGraph {\n");
    let initial = states.initial_state_name();
    for node in states.ordered_nodes() {
      out.push_str("  ");
      if node.debug_name == initial {
        out.push_str("* ");
      }
      out.push_str(node.debug_name);

      let names = states.transitions_from(node.debug_name);
      match names.len() {
        0 => (),
        1 => {
          let _ = write!(out, " => {}", names[0]);
        },
        _ => {
          let _ = write!(out, " => [{}]", names.join(", "));
        },
      }
      if node.is_terminal {
        out.push_str(" (terminal)");
      }
      out.push('\n');
    }
    out.push('}');
    out
  }

  pub fn pretty_print<C, E>(states: &StateGraph<C, E>) {
    println!("{}", Self::render(states));
  }
}
