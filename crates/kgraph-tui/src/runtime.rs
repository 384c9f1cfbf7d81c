use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::router::Router;
use crate::scheduler::Scheduler;
use crate::theme::Theme;
use crate::tui_event::Event;

/// Single cooperative loop: take one event, route it, schedule the
/// resulting commands, redraw.
pub struct EventLoop {
    router: Router,
    scheduler: Scheduler,
    events: UnboundedReceiver<Event>,
    theme: Theme,
}

impl EventLoop {
    pub fn new(
        router: Router,
        scheduler: Scheduler,
        events: UnboundedReceiver<Event>,
        theme: Theme,
    ) -> Self {
        Self {
            router,
            scheduler,
            events,
            theme,
        }
    }

    /// Run until a quit transition. Also returns if every event sender is gone.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.draw(terminal)?;
        while let Some(event) = self.events.recv().await {
            if !self.step(event) {
                tracing::info!("quit requested");
                return Ok(());
            }
            self.draw(terminal)?;
        }
        tracing::warn!("event channel closed");
        Ok(())
    }

    /// Dispatch one event. Returns `false` once the application should quit.
    pub fn step(&mut self, event: Event) -> bool {
        match &event {
            Event::Tick => {}
            Event::Resize(width, height) => tracing::debug!(width, height, "terminal resized"),
            other => {
                tracing::trace!(event = ?other, screen = self.router.kind().title(), "dispatch")
            }
        }
        let routed = self.router.dispatch(event);
        for command in routed.commands {
            self.scheduler.schedule(command);
        }
        !routed.quit
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let router = &self.router;
        let theme = &self.theme;
        terminal.draw(|f| router.view(f, theme))?;
        Ok(())
    }
}
