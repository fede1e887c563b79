pub mod descriptor;
pub mod graph_builder;
pub mod graph_printer;
pub mod graph;
pub mod machine;
pub mod state;

pub use descriptor::StateMachineDescriptor;
pub use graph::{GraphError, StateGraph};
pub use graph_printer::StateGraphPrinter;
pub use machine::{Context, Dispatcher, StateMachine};
pub use state::{HandleResult, NotHandled, State, Transition};

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use tokio::sync::oneshot;
    use tokio::time::Duration;

    use crate::state::*;
    use crate::machine::*;
    use crate::descriptor::*;
    use crate::graph::*;
    use crate::graph_printer::*;

    const WORK_DELAY_MS: u64 = 100;

    #[derive(Default)]
    struct Idle;
    impl State for Idle {
        type Context = TestContext;
        type Event = TestEvent;

        fn on_enter(&mut self, context: &mut Context<Self::Context, Self::Event>) {
            context.user.event("Idle: enter");
        }

        fn handle(&mut self, context: &mut Context<Self::Context, Self::Event>, event: Self::Event) -> HandleResult<Self::Event> {
            match event {
                TestEvent::DoPing => {
                    context.user.event("Idle: ping");
                    Ok(Transition::None)
                },
                TestEvent::DoWork(token, will_be_success) => {
                    context.user.event(format!("Idle: DoWork {}", token).as_str());
                    context.dispatcher().dispatch_when_done(async move {
                        tokio::time::sleep(Duration::from_millis(WORK_DELAY_MS)).await;
                        if will_be_success {
                            TestEvent::OnWorkDone(token)
                        } else {
                            TestEvent::OnWorkFailed(anyhow!("Bummer"))
                        }
                    });
                    Ok(Transition::to::<Working>())
                },
                TestEvent::GoRogue => {
                    context.user.event("Idle: GoRogue");
                    Ok(Transition::to::<Rogue>())
                },
                TestEvent::Explode => Err(NotHandled::InternalError(anyhow!("kaboom"))),
                _ => Err(NotHandled::UnknownEvent(event)),
            }
        }
    }

    #[derive(Default)]
    struct Working;
    impl State for Working {
        type Context = TestContext;
        type Event = TestEvent;

        fn on_enter(&mut self, context: &mut Context<Self::Context, Self::Event>) {
            context.user.event("Working: enter");
        }

        fn on_exit(&mut self, context: &mut Context<Self::Context, Self::Event>) {
            context.user.event("Working: exit");
        }

        fn handle(&mut self, context: &mut Context<Self::Context, Self::Event>, event: Self::Event) -> HandleResult<Self::Event> {
            match event {
                TestEvent::DoWork(token, _) => {
                    context.user.event(format!("Working: busy {}", token).as_str());
                    Ok(Transition::None)
                },
                TestEvent::OnWorkDone(token) => {
                    context.user.event(format!("Working: done {}", token).as_str());
                    Ok(Transition::to::<Idle>())
                },
                TestEvent::OnWorkFailed(err) => {
                    context.user.event(format!("Working: failed {}", err).as_str());
                    Ok(Transition::to::<Broken>())
                },
                _ => Err(NotHandled::UnknownEvent(event)),
            }
        }
    }

    #[derive(Default)]
    struct Broken;
    impl State for Broken {
        type Context = TestContext;
        type Event = TestEvent;

        fn on_enter(&mut self, context: &mut Context<Self::Context, Self::Event>) {
            context.user.event("Broken: enter");
        }

        fn handle(&mut self, context: &mut Context<Self::Context, Self::Event>, event: Self::Event) -> HandleResult<Self::Event> {
            context.user.event("Broken: handled something?!");
            Err(NotHandled::UnknownEvent(event))
        }
    }

    #[derive(Default)]
    struct Rogue;
    impl State for Rogue {
        type Context = TestContext;
        type Event = TestEvent;

        fn on_enter(&mut self, context: &mut Context<Self::Context, Self::Event>) {
            context.user.event("Rogue: enter");
        }

        fn handle(&mut self, _context: &mut Context<Self::Context, Self::Event>, event: Self::Event) -> HandleResult<Self::Event> {
            Err(NotHandled::UnknownEvent(event))
        }
    }

    #[derive(Default)]
    struct TestContext {
        events: Vec<String>,
        alarm: DropAlarm,
    }
    impl TestContext {
        fn event(&mut self, label: &str) {
            self.events.push(String::from(label));
        }
    }

    #[derive(Debug)]
    enum TestEvent {
        DoPing,
        DoWork(i32, bool),
        OnWorkDone(i32),
        OnWorkFailed(anyhow::Error),
        GoRogue,
        Explode,
    }

    /// Fires once the context it lives in is dropped.
    #[derive(Default)]
    struct DropAlarm(Option<oneshot::Sender<()>>);
    impl Drop for DropAlarm {
        fn drop(&mut self) {
            if let Some(tx) = self.0.take() {
                let _ = tx.send(());
            }
        }
    }

    #[derive(Default)]
    struct TestStateMachine {
        alarm: DropAlarm,
    }
    impl StateMachineDescriptor for TestStateMachine {
        type Context = TestContext;
        type Event = TestEvent;

        fn debug_name(&self) -> &'static str {
            "TestStateMachine"
        }

        fn states(&self) -> Result<StateGraph<Self::Context, Self::Event>, GraphError> {
            StateGraph::builder()
                .add::<Idle>().initial().transitions_to::<Working>()
                .add::<Working>()
                    .transitions_to::<Idle>()
                    .transitions_to::<Broken>()
                .add::<Broken>().terminal()
                .add::<Rogue>()
                .build()
        }

        fn into_context(self) -> Self::Context {
            TestContext { events: vec![], alarm: self.alarm }
        }
    }

    fn start() -> StateMachine<TestContext, TestEvent> {
        StateMachine::start(TestStateMachine::default()).unwrap()
    }

    #[test]
    fn test_graph_printer() {
        let graph = TestStateMachine::default().states().unwrap();
        StateGraphPrinter::pretty_print(&graph);
        assert_eq!(StateGraphPrinter::render(&graph), [
            "StateGraph {",
            "  * Idle => Working",
            "  Working => [Idle, Broken]",
            "  Broken (terminal)",
            "  Rogue",
            "}",
        ].join("\n"));
    }

    #[test]
    fn test_graph_introspection() {
        let graph = TestStateMachine::default().states().unwrap();
        assert_eq!(graph.initial_state_name(), "Idle");
        assert_eq!(graph.state_names(), vec!["Idle", "Working", "Broken", "Rogue"]);
        assert_eq!(graph.transitions_from("Working"), vec!["Idle", "Broken"]);
        assert!(graph.transitions_from("Nope").is_empty());
        assert!(graph.is_terminal("Broken"));
        assert!(!graph.is_terminal("Idle"));
    }

    #[test]
    fn test_build_requires_initial_state() {
        let result = StateGraph::<TestContext, TestEvent>::builder()
            .add::<Idle>()
            .build();
        assert_eq!(result.err(), Some(GraphError::NoInitialState));
    }

    #[test]
    fn test_build_rejects_unknown_target() {
        let result = StateGraph::<TestContext, TestEvent>::builder()
            .add::<Idle>().initial().transitions_to::<Working>()
            .build();
        assert_eq!(result.err(), Some(GraphError::UnknownTarget { from: "Idle", to: "Working" }));
    }

    #[test]
    fn test_build_rejects_terminal_with_transitions() {
        let result = StateGraph::<TestContext, TestEvent>::builder()
            .add::<Idle>().initial().transitions_to::<Broken>()
            .add::<Broken>().terminal().transitions_to::<Idle>()
            .build();
        assert_eq!(result.err(), Some(GraphError::TerminalWithTransitions("Broken")));
    }

    #[test]
    fn test_build_rejects_duplicates_and_dangling_calls() {
        let duplicate = StateGraph::<TestContext, TestEvent>::builder()
            .add::<Idle>().initial()
            .add::<Idle>()
            .build();
        assert_eq!(duplicate.err(), Some(GraphError::DuplicateState("Idle")));

        let dangling = StateGraph::<TestContext, TestEvent>::builder()
            .initial()
            .add::<Idle>()
            .build();
        assert_eq!(dangling.err(), Some(GraphError::NoStateToConfigure("initial")));
    }

    #[tokio::test]
    async fn test_shutdown_returns_context() {
        let machine = start();
        let context = machine.shutdown().await.unwrap();
        assert_eq!(context.events, vec!["Idle: enter"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_work_round_trip_then_failure() {
        let machine = start();
        let dispatcher = machine.dispatcher();
        dispatcher.dispatch(TestEvent::DoWork(1, true)).await;
        dispatcher.dispatch(TestEvent::DoWork(2, true)).await;
        tokio::time::sleep(Duration::from_millis(WORK_DELAY_MS * 2)).await;

        dispatcher.dispatch(TestEvent::DoWork(3, false)).await;
        tokio::time::sleep(Duration::from_millis(WORK_DELAY_MS * 2)).await;
        dispatcher.dispatch(TestEvent::DoPing).await;

        let context = machine.shutdown().await.unwrap();
        assert_eq!(context.events, vec![
            "Idle: enter",
            "Idle: DoWork 1",
            "Working: enter",
            "Working: busy 2",
            "Working: done 1",
            "Working: exit",
            "Idle: enter",
            "Idle: DoWork 3",
            "Working: enter",
            "Working: failed Bummer",
            "Working: exit",
            "Broken: enter",
        ]);
    }

    #[tokio::test]
    async fn test_undeclared_transition_is_refused() {
        let machine = start();
        let dispatcher = machine.dispatcher();
        dispatcher.dispatch(TestEvent::GoRogue).await;
        dispatcher.dispatch(TestEvent::DoPing).await;

        let context = machine.shutdown().await.unwrap();
        assert_eq!(context.events, vec![
            "Idle: enter",
            "Idle: GoRogue",
            "Idle: ping",
        ]);
    }

    #[tokio::test]
    async fn test_unknown_events_and_internal_errors_are_dropped() {
        let machine = start();
        let dispatcher = machine.dispatcher();
        dispatcher.dispatch(TestEvent::OnWorkDone(7)).await;
        dispatcher.dispatch(TestEvent::Explode).await;
        dispatcher.dispatch(TestEvent::DoPing).await;

        let context = machine.shutdown().await.unwrap();
        assert_eq!(context.events, vec![
            "Idle: enter",
            "Idle: ping",
        ]);
    }

    #[tokio::test]
    async fn test_dropping_the_handle_stops_the_machine() {
        let (alarm_tx, alarm_rx) = oneshot::channel();
        let machine = StateMachine::start(TestStateMachine { alarm: DropAlarm(Some(alarm_tx)) }).unwrap();
        let dispatcher = machine.dispatcher();
        dispatcher.dispatch(TestEvent::DoPing).await;

        drop(machine);
        let stopped = tokio::time::timeout(Duration::from_secs(5), alarm_rx).await;
        assert!(stopped.is_ok(), "machine task outlived its handle");

        // Goes nowhere, and doesn't block.
        dispatcher.dispatch(TestEvent::DoPing).await;
    }
}
