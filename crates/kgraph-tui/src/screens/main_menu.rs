use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{Destination, Hint, Screen, ScreenKind, Transition, hint};
use crate::theme::Theme;
use crate::tui_event::{Event, Key};
use crate::view::key_line;
use crate::widgets::{Item, SelectableList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    CreateRecord,
    Search,
    Generate,
    Publish,
    Quit,
}

impl MenuOption {
    const ALL: [MenuOption; 5] = [
        MenuOption::CreateRecord,
        MenuOption::Search,
        MenuOption::Generate,
        MenuOption::Publish,
        MenuOption::Quit,
    ];

    fn key(self) -> char {
        match self {
            MenuOption::CreateRecord => 'c',
            MenuOption::Search => 's',
            MenuOption::Generate => 'g',
            MenuOption::Publish => 'p',
            MenuOption::Quit => 'q',
        }
    }

    fn label(self) -> &'static str {
        match self {
            MenuOption::CreateRecord => "Create Record",
            MenuOption::Search => "Search Records",
            MenuOption::Generate => "Generate Flashcards",
            MenuOption::Publish => "Publish Site",
            MenuOption::Quit => "Quit",
        }
    }

    fn description(self) -> &'static str {
        match self {
            MenuOption::CreateRecord => "Add a note, link, tag or flashcard",
            MenuOption::Search => "Find records by title or content",
            MenuOption::Generate => "Derive study cards from a record",
            MenuOption::Publish => "Render public records as a static site",
            MenuOption::Quit => "Leave kgraph",
        }
    }

    fn from_key(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.key() == c)
    }

    fn activate(self) -> Transition {
        match self {
            MenuOption::CreateRecord => Transition::navigate(Destination::CreateRecord),
            MenuOption::Search => Transition::navigate(Destination::Search),
            MenuOption::Generate => Transition::navigate(Destination::GenerateFlashcards),
            MenuOption::Publish => Transition::navigate(Destination::PublishSite),
            MenuOption::Quit => Transition::quit(),
        }
    }
}

pub struct MainMenuScreen {
    options: SelectableList<MenuOption>,
    show_keys: bool,
}

impl MainMenuScreen {
    pub fn new() -> Self {
        let items = MenuOption::ALL
            .into_iter()
            .map(|o| Item::new(o, format!("[{}] {}", o.key(), o.label())).detail(o.description()))
            .collect();
        Self {
            options: SelectableList::new(items),
            show_keys: true,
        }
    }
}

impl Screen for MainMenuScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::MainMenu
    }

    fn handle(&mut self, event: Event) -> Transition {
        let Event::Key(key) = event else {
            return Transition::stay();
        };
        match key {
            Key::Up | Key::Char('k') => self.options.prev(),
            Key::Down | Key::Char('j') => self.options.next(),
            Key::Enter => {
                if let Some(option) = self.options.selected() {
                    return option.activate();
                }
            }
            Key::Char('h') => self.show_keys = !self.show_keys,
            Key::Char(c) => {
                if let Some(option) = MenuOption::from_key(c) {
                    return option.activate();
                }
            }
            _ => {}
        }
        Transition::stay()
    }

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let columns = if self.show_keys {
            Layout::horizontal([Constraint::Min(40), Constraint::Length(34)]).split(area)
        } else {
            Layout::horizontal([Constraint::Min(40)]).split(area)
        };

        let rows = Layout::vertical([Constraint::Length(3), Constraint::Min(7)]).split(columns[0]);
        let welcome = Paragraph::new(vec![
            Line::from(Span::styled(
                "  Welcome to kgraph",
                Style::default()
                    .fg(theme.active)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  Capture, search and study your knowledge records.",
                theme.dim_style(),
            )),
        ]);
        f.render_widget(welcome, rows[0]);
        self.options.render(f, rows[1], "Menu", theme);

        if self.show_keys {
            let mut lines = vec![Line::from("")];
            lines.extend(
                MenuOption::ALL
                    .into_iter()
                    .map(|o| key_line(&o.key().to_string(), o.label(), theme)),
            );
            lines.push(Line::from(""));
            lines.push(key_line("\u{2191}/\u{2193}", "Move", theme));
            lines.push(key_line("Enter", "Select", theme));
            lines.push(key_line("h", "Hide this panel", theme));
            let keys = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(" Keys "),
            );
            f.render_widget(keys, columns[1]);
        }
    }

    fn hints(&self) -> Vec<Hint> {
        vec![
            hint("\u{2191}\u{2193}", "move"),
            hint("Enter", "select"),
            hint("c/s/g/p", "jump"),
            hint("h", "toggle keys"),
            hint("q", "quit"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::Next;
    use crate::screens::testing::{press, render};

    #[test]
    fn direct_keys_activate_immediately() {
        let mut menu = MainMenuScreen::new();
        assert_eq!(
            press(&mut menu, Key::Char('g')).next,
            Next::Navigate(Destination::GenerateFlashcards)
        );
        assert_eq!(
            press(&mut menu, Key::Char('p')).next,
            Next::Navigate(Destination::PublishSite)
        );
        assert_eq!(press(&mut menu, Key::Char('q')).next, Next::Quit);
    }

    #[test]
    fn enter_activates_highlighted_option() {
        let mut menu = MainMenuScreen::new();
        press(&mut menu, Key::Down);
        assert_eq!(
            press(&mut menu, Key::Enter).next,
            Next::Navigate(Destination::Search)
        );
        press(&mut menu, Key::Up);
        press(&mut menu, Key::Up);
        assert_eq!(press(&mut menu, Key::Enter).next, Next::Quit);
    }

    #[test]
    fn esc_stays_on_menu() {
        let mut menu = MainMenuScreen::new();
        assert_eq!(press(&mut menu, Key::Esc).next, Next::Stay);
    }

    #[test]
    fn h_toggles_key_panel() {
        let mut menu = MainMenuScreen::new();
        assert!(render(&menu).contains(" Keys "));
        press(&mut menu, Key::Char('h'));
        assert!(!render(&menu).contains(" Keys "));
        assert!(render(&menu).contains("Create Record"));
    }
}
