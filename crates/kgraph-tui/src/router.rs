#[cfg(test)]
mod tests;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::screens::{self, Destination, Hint, Next, Screen, ScreenKind, hint};
use crate::theme::Theme;
use crate::tui_event::{Command, Event, Key, ScreenId};
use crate::view::chrome;

/// Key the router handles before any screen sees it.
pub const RESERVED_KEY: Key = Key::Ctrl('c');

/// What the event loop has to do after one dispatch.
#[derive(Debug, Default)]
pub struct Routed {
    pub commands: Vec<Command>,
    pub quit: bool,
}

/// Owns the single active screen and applies its transitions.
pub struct Router {
    active: Box<dyn Screen>,
    active_id: ScreenId,
    last_id: u64,
}

impl Router {
    /// Start on the main menu.
    pub fn new() -> Self {
        let id = ScreenId(1);
        Self {
            active: screens::build(Destination::MainMenu, id),
            active_id: id,
            last_id: id.0,
        }
    }

    pub fn kind(&self) -> ScreenKind {
        self.active.kind()
    }

    /// Replace the active screen. Returns the new screen's entry commands.
    pub fn open(&mut self, destination: Destination) -> Vec<Command> {
        self.last_id += 1;
        let id = ScreenId(self.last_id);
        let mut screen = screens::build(destination, id);
        let commands = screen.enter();
        tracing::info!(from = self.active.kind().title(), to = screen.kind().title(), "navigate");
        self.active = screen;
        self.active_id = id;
        commands
    }

    pub fn dispatch(&mut self, event: Event) -> Routed {
        if event == Event::Key(RESERVED_KEY) {
            return if self.kind() == ScreenKind::MainMenu {
                Routed {
                    commands: Vec::new(),
                    quit: true,
                }
            } else {
                Routed {
                    commands: self.open(Destination::MainMenu),
                    quit: false,
                }
            };
        }

        if let Event::CommandCompleted(completion) = &event
            && completion.tag.screen != self.active_id
        {
            tracing::debug!(
                screen = completion.tag.screen.0,
                active = self.active_id.0,
                seq = completion.tag.seq,
                "discarding completion for a closed screen"
            );
            return Routed::default();
        }

        let transition = self.active.handle(event);
        let mut commands = transition.commands;
        let quit = match transition.next {
            Next::Stay => false,
            Next::Navigate(destination) => {
                commands.extend(self.open(destination));
                false
            }
            Next::Quit => true,
        };
        Routed { commands, quit }
    }

    /// Footer hints: the screen's own plus the reserved key.
    pub fn hints(&self) -> Vec<Hint> {
        let mut hints = self.active.hints();
        hints.push(if self.kind() == ScreenKind::MainMenu {
            hint("C-c", "quit")
        } else {
            hint("C-c", "main menu")
        });
        hints
    }

    pub fn view(&self, f: &mut Frame, theme: &Theme) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());
        chrome::render_header(f, rows[0], &self.active.breadcrumb(), theme);
        self.active.view(f, rows[1], theme);
        chrome::render_footer(f, rows[2], &self.hints(), theme);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
