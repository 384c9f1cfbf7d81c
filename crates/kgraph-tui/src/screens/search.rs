use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use kgraph_core::SearchHit;

use super::{Hint, Screen, ScreenKind, TagSource, Transition, hint, unexpected};
use crate::theme::Theme;
use crate::tui_event::{CommandPayload, CommandRequest, CommandTag, Completion, Event, Key};
use crate::view::{error_line, spinner_line};
use crate::widgets::{Item, RecordView, SelectableList, TextInput};

enum Step {
    Input,
    Results { hits: SelectableList<SearchHit> },
    Viewing { hits: SelectableList<SearchHit>, view: RecordView },
    Empty { query: String },
}

pub struct SearchScreen {
    tags: TagSource,
    query: TextInput,
    /// Only the most recently issued search is accepted.
    pending: Option<CommandTag>,
    error: Option<String>,
    step: Step,
    tick: usize,
}

impl SearchScreen {
    pub fn new(tags: TagSource) -> Self {
        Self {
            tags,
            query: TextInput::new(),
            pending: None,
            error: None,
            step: Step::Input,
            tick: 0,
        }
    }

    fn on_key(&mut self, step: Step, key: Key) -> (Step, Transition) {
        match step {
            Step::Input => match key {
                Key::Esc => (Step::Input, Transition::main_menu()),
                Key::Enter if !self.query.is_blank() => {
                    let query = self.query.value().trim().to_string();
                    let command = self.tags.command(CommandRequest::Search(query));
                    self.pending = Some(command.tag);
                    self.error = None;
                    (Step::Input, Transition::issue(command))
                }
                other => {
                    if self.query.handle_key(other) {
                        self.error = None;
                    }
                    (Step::Input, Transition::stay())
                }
            },

            Step::Results { mut hits } => match key {
                Key::Up | Key::Char('k') => {
                    hits.prev();
                    (Step::Results { hits }, Transition::stay())
                }
                Key::Down | Key::Char('j') => {
                    hits.next();
                    (Step::Results { hits }, Transition::stay())
                }
                Key::Enter => {
                    let view = hits.selected().map(|hit| RecordView::new(hit.record.clone()));
                    match view {
                        Some(view) => (Step::Viewing { hits, view }, Transition::stay()),
                        None => (Step::Results { hits }, Transition::stay()),
                    }
                }
                Key::Char('/') | Key::Esc => (Step::Input, Transition::stay()),
                _ => (Step::Results { hits }, Transition::stay()),
            },

            Step::Viewing { hits, mut view } => match key {
                Key::Esc | Key::Char('q') => (Step::Results { hits }, Transition::stay()),
                other => {
                    view.handle_key(other);
                    (Step::Viewing { hits, view }, Transition::stay())
                }
            },

            Step::Empty { query } => match key {
                Key::Enter | Key::Char('/') | Key::Esc => (Step::Input, Transition::stay()),
                _ => (Step::Empty { query }, Transition::stay()),
            },
        }
    }

    fn on_completion(&mut self, step: Step, completion: Completion) -> (Step, Transition) {
        if self.pending != Some(completion.tag) {
            tracing::debug!(seq = completion.tag.seq, "stale search completion");
            return (step, Transition::stay());
        }
        self.pending = None;
        match completion.outcome {
            Ok(CommandPayload::Hits(hits)) if hits.is_empty() => (
                Step::Empty {
                    query: self.query.value().trim().to_string(),
                },
                Transition::stay(),
            ),
            Ok(CommandPayload::Hits(hits)) => {
                tracing::debug!(hits = hits.len(), "search results");
                (Step::Results { hits: hit_list(hits) }, Transition::stay())
            }
            Ok(_) => (step, unexpected(self.kind(), "non-search payload")),
            Err(e) => {
                self.error = Some(e.to_string());
                (Step::Input, Transition::stay())
            }
        }
    }

    fn render_input(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);
        let input = Paragraph::new(self.query.value().to_string()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.focused_border_style())
                .title(" Search "),
        );
        f.render_widget(input, rows[0]);
        let x = rows[0].x + 1 + self.query.cursor_column() as u16;
        f.set_cursor_position(Position::new(
            x.min(rows[0].right().saturating_sub(2)),
            rows[0].y + 1,
        ));

        let status = if self.pending.is_some() {
            spinner_line(self.tick, "Searching...", theme)
        } else if let Some(error) = &self.error {
            error_line(error, theme)
        } else {
            Line::from(Span::styled("  Type a query and press Enter", theme.dim_style()))
        };
        f.render_widget(Paragraph::new(status), rows[1]);
    }

    fn render_results(
        &self,
        f: &mut Frame,
        area: Rect,
        hits: &SelectableList<SearchHit>,
        theme: &Theme,
    ) {
        let rows = Layout::vertical([Constraint::Min(3), Constraint::Length(4)]).split(area);
        let title = format!("{} result(s) for '{}'", hits.len(), self.query.value().trim());
        hits.render(f, rows[0], &title, theme);
        if let Some(hit) = hits.selected() {
            let snippet = Paragraph::new(vec![
                Line::from(Span::styled(format!("  {}", hit.snippet), theme.dim_style())),
                Line::from(Span::styled(
                    format!("  score {:.2}", hit.score),
                    theme.dim_style(),
                )),
            ])
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(theme.border_style()),
            );
            f.render_widget(snippet, rows[1]);
        }
    }
}

fn hit_list(hits: Vec<SearchHit>) -> SelectableList<SearchHit> {
    let items = hits
        .into_iter()
        .map(|hit| {
            let label = hit.record.display_name();
            let detail = hit.record.preview();
            Item::new(hit, label).detail(detail)
        })
        .collect();
    SelectableList::new(items)
}

impl Screen for SearchScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Search
    }

    fn handle(&mut self, event: Event) -> Transition {
        let step = std::mem::replace(&mut self.step, Step::Input);
        let (step, transition) = match event {
            Event::Key(key) => self.on_key(step, key),
            Event::CommandCompleted(completion) => self.on_completion(step, completion),
            Event::Tick => {
                self.tick = self.tick.wrapping_add(1);
                (step, Transition::stay())
            }
            Event::Resize(..) => (step, Transition::stay()),
        };
        self.step = step;
        transition
    }

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        match &self.step {
            Step::Input => self.render_input(f, area, theme),
            Step::Results { hits } => self.render_results(f, area, hits, theme),
            Step::Viewing { view, .. } => view.render(f, area, theme),
            Step::Empty { query } => {
                let lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  No results for '{query}'"),
                        theme.dim_style(),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "  Press Enter or / to search again",
                        theme.dim_style(),
                    )),
                ];
                f.render_widget(
                    Paragraph::new(lines).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(theme.border_style())
                            .title(" Search "),
                    ),
                    area,
                );
            }
        }
    }

    fn hints(&self) -> Vec<Hint> {
        match &self.step {
            Step::Input => vec![hint("Enter", "search"), hint("Esc", "menu")],
            Step::Results { .. } => vec![
                hint("\u{2191}\u{2193}", "move"),
                hint("Enter", "open"),
                hint("/", "new search"),
                hint("Esc", "back"),
            ],
            Step::Viewing { .. } => vec![
                hint("\u{2191}\u{2193}/PgUp/PgDn", "scroll"),
                hint("Esc/q", "results"),
            ],
            Step::Empty { .. } => vec![hint("Enter", "search again"), hint("Esc", "back")],
        }
    }

    fn breadcrumb(&self) -> Vec<String> {
        let mut path = vec![self.kind().title().to_string()];
        match &self.step {
            Step::Input | Step::Empty { .. } => {}
            Step::Results { .. } => path.push("Results".to_string()),
            Step::Viewing { view, .. } => {
                path.push("Results".to_string());
                path.push(view.record().title.clone());
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{complete, note, only_command, press, render, tags, type_text};
    use crate::screens::{Destination, Next};
    use kgraph_core::ServiceError;

    fn hits(titles: &[&str]) -> Vec<SearchHit> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| SearchHit {
                record: note(&format!("rec-{:03}", i + 1), t),
                snippet: t.to_string(),
                score: 0.8,
            })
            .collect()
    }

    fn selected_title(screen: &SearchScreen) -> Option<String> {
        match &screen.step {
            Step::Results { hits } => hits.selected().map(|h| h.record.title.clone()),
            _ => None,
        }
    }

    #[test]
    fn blank_query_issues_nothing() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "   ");
        assert!(press(&mut screen, Key::Enter).commands.is_empty());
    }

    #[test]
    fn latest_search_wins_when_completed_in_order() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "alpha");
        let first = only_command(&press(&mut screen, Key::Enter));
        type_text(&mut screen, "2");
        let second = only_command(&press(&mut screen, Key::Enter));
        assert_ne!(first.tag, second.tag);

        complete(&mut screen, &first, Ok(CommandPayload::Hits(hits(&["old"]))));
        assert!(matches!(screen.step, Step::Input));
        complete(&mut screen, &second, Ok(CommandPayload::Hits(hits(&["new"]))));
        assert_eq!(selected_title(&screen).as_deref(), Some("new"));
    }

    #[test]
    fn latest_search_wins_when_completed_out_of_order() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "alpha");
        let first = only_command(&press(&mut screen, Key::Enter));
        let second = only_command(&press(&mut screen, Key::Enter));

        complete(&mut screen, &second, Ok(CommandPayload::Hits(hits(&["new"]))));
        complete(&mut screen, &first, Ok(CommandPayload::Hits(hits(&["old"]))));
        assert_eq!(selected_title(&screen).as_deref(), Some("new"));
    }

    #[test]
    fn results_view_and_back() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "x");
        let cmd = only_command(&press(&mut screen, Key::Enter));
        complete(&mut screen, &cmd, Ok(CommandPayload::Hits(hits(&["one", "two"]))));
        press(&mut screen, Key::Down);
        press(&mut screen, Key::Enter);
        assert!(matches!(screen.step, Step::Viewing { .. }));
        assert!(render(&screen).contains("two"));

        press(&mut screen, Key::Char('q'));
        assert_eq!(selected_title(&screen).as_deref(), Some("two"));

        press(&mut screen, Key::Char('/'));
        assert!(matches!(screen.step, Step::Input));
        assert_eq!(screen.query.value(), "x");
        assert_eq!(
            press(&mut screen, Key::Esc).next,
            Next::Navigate(Destination::MainMenu)
        );
    }

    #[test]
    fn empty_results_then_retry() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "nothing");
        let cmd = only_command(&press(&mut screen, Key::Enter));
        complete(&mut screen, &cmd, Ok(CommandPayload::Hits(Vec::new())));
        assert!(render(&screen).contains("No results for 'nothing'"));
        press(&mut screen, Key::Enter);
        assert!(matches!(screen.step, Step::Input));
    }

    #[test]
    fn failure_returns_to_input_with_message() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "x");
        let cmd = only_command(&press(&mut screen, Key::Enter));
        complete(&mut screen, &cmd, Err(ServiceError::Failed("index offline".into())));
        assert!(matches!(screen.step, Step::Input));
        assert!(render(&screen).contains("index offline"));
    }

    #[test]
    fn spinner_shows_while_pending() {
        let mut screen = SearchScreen::new(tags());
        type_text(&mut screen, "x");
        press(&mut screen, Key::Enter);
        assert!(render(&screen).contains("Searching..."));
    }
}
