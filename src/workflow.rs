use async_trait::async_trait;
use futures_signals::signal::Mutable;

use crate::screen::{wait_for_screen, Screen};

/// The player's side of the game, whichever way the state behind it is kept.
#[async_trait]
pub trait Workflow: Send + Sync {
    fn screen_feed(&self) -> Mutable<Screen>;

    fn screen(&self) -> Screen {
        self.screen_feed().get_cloned()
    }

    /// Fire at `planet`.  Ignored unless the planet list is showing.
    async fn destroy(&self, planet: &str);

    /// Leave the destroyed confirmation.
    async fn back(&self);

    /// Wait until nothing is loading or being destroyed.  Resolves straight away when nothing is
    /// in flight, so call it before firing, not right after.
    async fn settled(&self) -> Screen {
        wait_for_screen(&self.screen_feed(), |s| !matches!(s, Screen::Loading | Screen::Destroying { .. })).await
    }
}
