use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use kgraph_core::{Flashcard, Record};

use super::{Destination, Hint, Screen, ScreenKind, TagSource, Transition, hint, unexpected};
use crate::theme::Theme;
use crate::tui_event::{CommandPayload, CommandRequest, CommandTag, Completion, Event, Key};
use crate::view::{error_line, section_header, spinner_line, truncate};
use crate::widgets::{Item, SelectableList, TextInput};

enum Step {
    /// Query box, optionally waiting on a search.
    Query,
    /// Filterable list of matching records.
    Choose { records: SelectableList<Record> },
    Generating {
        records: SelectableList<Record>,
        record: Record,
        tag: CommandTag,
    },
    Complete { record: Record, cards: Vec<Flashcard> },
}

pub struct GenerateScreen {
    tags: TagSource,
    query: TextInput,
    pending_search: Option<CommandTag>,
    error: Option<String>,
    step: Step,
    tick: usize,
}

impl GenerateScreen {
    pub fn new(tags: TagSource) -> Self {
        Self {
            tags,
            query: TextInput::new(),
            pending_search: None,
            error: None,
            step: Step::Query,
            tick: 0,
        }
    }

    fn restart(&mut self) -> Step {
        self.query.clear();
        self.pending_search = None;
        self.error = None;
        Step::Query
    }

    fn on_key(&mut self, step: Step, key: Key) -> (Step, Transition) {
        match step {
            Step::Query => match key {
                Key::Esc => (Step::Query, Transition::main_menu()),
                Key::Enter if !self.query.is_blank() => {
                    let query = self.query.value().trim().to_string();
                    let command = self.tags.command(CommandRequest::Search(query));
                    self.pending_search = Some(command.tag);
                    self.error = None;
                    (Step::Query, Transition::issue(command))
                }
                other => {
                    if self.query.handle_key(other) {
                        self.error = None;
                    }
                    (Step::Query, Transition::stay())
                }
            },

            Step::Choose { mut records } => match key {
                Key::Esc if !records.filter().is_empty() => {
                    records.set_filter("");
                    (Step::Choose { records }, Transition::stay())
                }
                Key::Esc => {
                    self.error = None;
                    (Step::Query, Transition::stay())
                }
                Key::Up => {
                    records.prev();
                    (Step::Choose { records }, Transition::stay())
                }
                Key::Down => {
                    records.next();
                    (Step::Choose { records }, Transition::stay())
                }
                Key::Backspace => {
                    records.pop_filter();
                    (Step::Choose { records }, Transition::stay())
                }
                Key::Char(c) => {
                    records.push_filter(c);
                    (Step::Choose { records }, Transition::stay())
                }
                Key::Enter => match records.selected().cloned() {
                    Some(record) => {
                        let command = self
                            .tags
                            .command(CommandRequest::GenerateFlashcards(record.id.clone()));
                        let tag = command.tag;
                        self.error = None;
                        (
                            Step::Generating {
                                records,
                                record,
                                tag,
                            },
                            Transition::issue(command),
                        )
                    }
                    None => (Step::Choose { records }, Transition::stay()),
                },
                _ => (Step::Choose { records }, Transition::stay()),
            },

            Step::Generating {
                records,
                record,
                tag,
            } => match key {
                Key::Esc => (Step::Choose { records }, Transition::stay()),
                _ => (
                    Step::Generating {
                        records,
                        record,
                        tag,
                    },
                    Transition::stay(),
                ),
            },

            Step::Complete { record, cards } => match key {
                Key::Char('r') if !cards.is_empty() => {
                    let destination = Destination::FlashcardReview {
                        cards: cards.clone(),
                    };
                    (Step::Complete { record, cards }, Transition::navigate(destination))
                }
                Key::Char('n') | Key::Esc => (self.restart(), Transition::stay()),
                Key::Char('m') | Key::Enter => {
                    (Step::Complete { record, cards }, Transition::main_menu())
                }
                _ => (Step::Complete { record, cards }, Transition::stay()),
            },
        }
    }

    fn on_completion(&mut self, step: Step, completion: Completion) -> (Step, Transition) {
        match step {
            Step::Query if self.pending_search == Some(completion.tag) => {
                self.pending_search = None;
                match completion.outcome {
                    Ok(CommandPayload::Hits(hits)) if hits.is_empty() => {
                        self.error = Some(format!(
                            "No records match '{}'",
                            self.query.value().trim()
                        ));
                        (Step::Query, Transition::stay())
                    }
                    Ok(CommandPayload::Hits(hits)) => {
                        let items = hits
                            .into_iter()
                            .map(|hit| {
                                let record = hit.record;
                                let label = record.display_name();
                                let search_text = format!("{} {}", record.title, record.preview());
                                Item::new(record, label).search_text(search_text)
                            })
                            .collect();
                        (
                            Step::Choose {
                                records: SelectableList::new(items),
                            },
                            Transition::stay(),
                        )
                    }
                    Ok(_) => (Step::Query, unexpected(self.kind(), "non-search payload")),
                    Err(e) => {
                        self.error = Some(e.to_string());
                        (Step::Query, Transition::stay())
                    }
                }
            }

            Step::Generating {
                records,
                record,
                tag,
            } if tag == completion.tag => match completion.outcome {
                Ok(CommandPayload::Flashcards(cards)) => {
                    tracing::info!(id = %record.id, cards = cards.len(), "flashcards generated");
                    (Step::Complete { record, cards }, Transition::stay())
                }
                Ok(_) => (
                    Step::Choose { records },
                    unexpected(self.kind(), "non-flashcard payload"),
                ),
                Err(e) => {
                    self.error = Some(e.to_string());
                    (Step::Choose { records }, Transition::stay())
                }
            },

            other => {
                tracing::debug!(seq = completion.tag.seq, "stale generate completion");
                (other, Transition::stay())
            }
        }
    }

    fn render_query(&self, f: &mut Frame, area: Rect, theme: &Theme) {
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
                .title(" Find a record to study "),
        );
        f.render_widget(input, rows[0]);
        let x = rows[0].x + 1 + self.query.cursor_column() as u16;
        f.set_cursor_position(Position::new(
            x.min(rows[0].right().saturating_sub(2)),
            rows[0].y + 1,
        ));
        f.render_widget(Paragraph::new(self.status_line(theme)), rows[1]);
    }

    fn status_line(&self, theme: &Theme) -> Line<'static> {
        if self.pending_search.is_some() {
            spinner_line(self.tick, "Searching...", theme)
        } else if let Some(error) = &self.error {
            error_line(error, theme)
        } else {
            Line::from(Span::styled(
                "  Type a query and press Enter",
                theme.dim_style(),
            ))
        }
    }

    fn render_complete(
        &self,
        f: &mut Frame,
        area: Rect,
        record: &Record,
        cards: &[Flashcard],
        theme: &Theme,
    ) {
        let mut lines = vec![Line::from("")];
        if cards.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  No flashcards could be generated from '{}'", record.title),
                theme.dim_style(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!(
                    "  \u{2713} Generated {} flashcard(s) from '{}'",
                    cards.len(),
                    record.title
                ),
                theme.success_style(),
            )));
            lines.push(Line::from(""));
            for (i, card) in cards.iter().enumerate() {
                lines.push(section_header(&format!("Card {}", i + 1), theme));
                lines.push(Line::from(format!("    Q: {}", truncate(&card.front, 70))));
                lines.push(Line::from(Span::styled(
                    format!("    A: {}", truncate(&card.back, 70)),
                    theme.dim_style(),
                )));
            }
        }
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(" Flashcards "),
            ),
            area,
        );
    }
}

impl Screen for GenerateScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::GenerateFlashcards
    }

    fn handle(&mut self, event: Event) -> Transition {
        let step = std::mem::replace(&mut self.step, Step::Query);
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
            Step::Query => self.render_query(f, area, theme),
            Step::Choose { records } => {
                let rows =
                    Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);
                records.render(f, rows[0], "Select a record (type to filter)", theme);
                if let Some(error) = &self.error {
                    f.render_widget(Paragraph::new(error_line(error, theme)), rows[1]);
                }
            }
            Step::Generating { record, .. } => {
                let lines = vec![
                    Line::from(""),
                    spinner_line(
                        self.tick,
                        &format!("Generating flashcards from '{}'...", record.title),
                        theme,
                    ),
                ];
                f.render_widget(Paragraph::new(lines), area);
            }
            Step::Complete { record, cards } => self.render_complete(f, area, record, cards, theme),
        }
    }

    fn hints(&self) -> Vec<Hint> {
        match &self.step {
            Step::Query => vec![hint("Enter", "search"), hint("Esc", "menu")],
            Step::Choose { .. } => vec![
                hint("type", "filter"),
                hint("\u{2191}\u{2193}", "move"),
                hint("Enter", "generate"),
                hint("Esc", "back"),
            ],
            Step::Generating { .. } => vec![hint("Esc", "back")],
            Step::Complete { cards, .. } => {
                let mut hints = Vec::new();
                if !cards.is_empty() {
                    hints.push(hint("r", "review"));
                }
                hints.push(hint("n", "another record"));
                hints.push(hint("m/Enter", "menu"));
                hints
            }
        }
    }

    fn breadcrumb(&self) -> Vec<String> {
        let mut path = vec![self.kind().title().to_string()];
        match &self.step {
            Step::Query => {}
            Step::Choose { .. } => path.push("Select".to_string()),
            Step::Generating { record, .. } | Step::Complete { record, .. } => {
                path.push(record.title.clone())
            }
        }
        path
    }
}
