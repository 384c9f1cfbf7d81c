//! Record creation wizard: pick a kind, fill the form, choose visibility.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use kgraph_core::{NewRecord, Payload, Record, RecordKind, Visibility};

use super::{Destination, Hint, Screen, ScreenKind, TagSource, Transition, hint, unexpected};
use crate::theme::Theme;
use crate::tui_event::{CommandPayload, CommandRequest, CommandTag, Completion, Event, Key};
use crate::view::{error_line, labeled_line, spinner_line};
use crate::widgets::{Confirmation, Field, Form, FormOutcome, Item, SelectableList, Validator};

const TITLE_MAX: usize = 200;
const CONTENT_MAX: usize = 10_000;

enum Step {
    SelectType,
    InputData {
        kind: RecordKind,
        form: Form,
    },
    ConfirmVisibility {
        kind: RecordKind,
        form: Form,
        confirm: Confirmation,
    },
    Saving {
        kind: RecordKind,
        form: Form,
        confirm: Confirmation,
        tag: CommandTag,
    },
    Complete {
        result: Result<Record, String>,
    },
}

pub struct CreateRecordScreen {
    tags: TagSource,
    types: SelectableList<RecordKind>,
    step: Step,
    tick: usize,
}

impl CreateRecordScreen {
    pub fn new(tags: TagSource) -> Self {
        let items = RecordKind::ALL
            .into_iter()
            .map(|kind| Item::new(kind, kind.label()).detail(kind.description()))
            .collect();
        Self {
            tags,
            types: SelectableList::new(items),
            step: Step::SelectType,
            tick: 0,
        }
    }

    fn restart(&mut self) -> Step {
        self.types.reset_cursor();
        Step::SelectType
    }

    fn on_key(&mut self, step: Step, key: Key) -> (Step, Transition) {
        match step {
            Step::SelectType => match key {
                Key::Esc => (Step::SelectType, Transition::main_menu()),
                Key::Up | Key::Char('k') => {
                    self.types.prev();
                    (Step::SelectType, Transition::stay())
                }
                Key::Down | Key::Char('j') => {
                    self.types.next();
                    (Step::SelectType, Transition::stay())
                }
                Key::Enter => match self.types.selected().copied() {
                    Some(kind) => (
                        Step::InputData {
                            kind,
                            form: form_for(kind),
                        },
                        Transition::stay(),
                    ),
                    None => (Step::SelectType, Transition::stay()),
                },
                _ => (Step::SelectType, Transition::stay()),
            },

            Step::InputData { kind, mut form } => {
                if key == Key::Esc {
                    return (Step::SelectType, Transition::stay());
                }
                match form.handle_key(key) {
                    FormOutcome::Submitted => (
                        Step::ConfirmVisibility {
                            kind,
                            form,
                            confirm: Confirmation::new("Make this record public?"),
                        },
                        Transition::stay(),
                    ),
                    FormOutcome::Editing => (Step::InputData { kind, form }, Transition::stay()),
                }
            }

            Step::ConfirmVisibility {
                kind,
                form,
                mut confirm,
            } => {
                if key == Key::Esc {
                    return (Step::InputData { kind, form }, Transition::stay());
                }
                match confirm.handle_key(key) {
                    Some(choice) => {
                        let visibility = Visibility::from_public(choice.is_yes());
                        let request = new_record(kind, &form, visibility);
                        let command = self.tags.command(CommandRequest::CreateRecord(request));
                        let tag = command.tag;
                        (
                            Step::Saving {
                                kind,
                                form,
                                confirm,
                                tag,
                            },
                            Transition::issue(command),
                        )
                    }
                    None => (
                        Step::ConfirmVisibility {
                            kind,
                            form,
                            confirm,
                        },
                        Transition::stay(),
                    ),
                }
            }

            Step::Saving {
                kind,
                form,
                mut confirm,
                tag,
            } => {
                if key != Key::Esc {
                    let step = Step::Saving {
                        kind,
                        form,
                        confirm,
                        tag,
                    };
                    return (step, Transition::stay());
                }
                confirm.reset();
                (
                    Step::ConfirmVisibility {
                        kind,
                        form,
                        confirm,
                    },
                    Transition::stay(),
                )
            }

            Step::Complete { result } => match key {
                Key::Enter | Key::Char(' ') => {
                    (Step::Complete { result }, Transition::main_menu())
                }
                Key::Char('n') | Key::Esc => (self.restart(), Transition::stay()),
                Key::Char('v') => match &result {
                    Ok(record) => {
                        let destination = Destination::Loading {
                            message: format!("Loading {}...", record.display_name()),
                            record_id: record.id.clone(),
                        };
                        (Step::Complete { result }, Transition::navigate(destination))
                    }
                    Err(_) => (Step::Complete { result }, Transition::stay()),
                },
                _ => (Step::Complete { result }, Transition::stay()),
            },
        }
    }

    fn on_completion(&mut self, step: Step, completion: Completion) -> (Step, Transition) {
        match step {
            Step::Saving { tag, .. } if tag == completion.tag => match completion.outcome {
                Ok(CommandPayload::Created(record)) => {
                    tracing::info!(id = %record.id, kind = %record.kind(), "record saved");
                    (Step::Complete { result: Ok(record) }, Transition::stay())
                }
                Ok(_) => (
                    unexpected_response(tag),
                    unexpected(self.kind(), "non-create payload"),
                ),
                Err(e) => (
                    Step::Complete {
                        result: Err(e.to_string()),
                    },
                    Transition::stay(),
                ),
            },
            other => {
                tracing::debug!(seq = completion.tag.seq, "stale create completion");
                (other, Transition::stay())
            }
        }
    }

    fn render_types(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        self.types.render(f, area, "Select record type", theme);
    }

    fn render_complete(
        &self,
        f: &mut Frame,
        area: Rect,
        result: &Result<Record, String>,
        theme: &Theme,
    ) {
        let mut lines = vec![Line::from("")];
        match result {
            Ok(record) => {
                lines.push(Line::from(Span::styled(
                    format!("  \u{2713} {} created", record.kind().label()),
                    theme.success_style(),
                )));
                lines.push(Line::from(""));
                lines.push(labeled_line("ID", record.id.to_string(), theme));
                lines.push(labeled_line("Title", record.title.clone(), theme));
                lines.push(labeled_line("Type", record.kind().label(), theme));
                lines.push(labeled_line("Visibility", record.visibility.label(), theme));
                lines.push(labeled_line("Preview", record.preview(), theme));
            }
            Err(message) => {
                lines.push(Line::from(Span::styled(
                    "  Could not create the record",
                    theme.error_style(),
                )));
                lines.push(Line::from(""));
                lines.push(error_line(message, theme));
            }
        }
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(" Done "),
            );
        f.render_widget(paragraph, area);
    }
}

/// A Saving completion that carries something other than `Created`.
fn unexpected_response(tag: CommandTag) -> Step {
    Step::Complete {
        result: Err(format!("unexpected response to request {}", tag.seq)),
    }
}

fn form_for(kind: RecordKind) -> Form {
    let title = || Field::new("Title").validate(Validator::MaxLength(TITLE_MAX));
    let fields = match kind {
        RecordKind::Note => vec![
            title().required(),
            Field::new("Content")
                .required()
                .multiline()
                .validate(Validator::MaxLength(CONTENT_MAX)),
        ],
        RecordKind::Link => vec![Field::new("URL").required().validate(Validator::Url), title()],
        RecordKind::Tag => vec![Field::new("Name").required()],
        RecordKind::Flashcard => vec![
            Field::new("Front").required(),
            Field::new("Back").required(),
        ],
    };
    Form::new(fields)
}

fn new_record(kind: RecordKind, form: &Form, visibility: Visibility) -> NewRecord {
    let value = |i: usize| form.value(i).trim().to_string();
    let (title, payload) = match kind {
        RecordKind::Note => (
            Some(value(0)),
            Payload::Note {
                content: form.value(1).trim_end().to_string(),
            },
        ),
        RecordKind::Link => (Some(value(1)), Payload::Link { url: value(0) }),
        RecordKind::Tag => (None, Payload::Tag { name: value(0) }),
        RecordKind::Flashcard => (
            None,
            Payload::Flashcard {
                front: value(0),
                back: value(1),
            },
        ),
    };
    NewRecord {
        title,
        payload,
        visibility,
    }
}

impl Screen for CreateRecordScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::CreateRecord
    }

    fn handle(&mut self, event: Event) -> Transition {
        let step = std::mem::replace(&mut self.step, Step::SelectType);
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
            Step::SelectType => self.render_types(f, area, theme),
            Step::InputData { kind, form } => {
                let border = if form.has_errors() {
                    theme.error_style()
                } else {
                    theme.border_style()
                };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(Span::styled(
                        format!(" New {} ", kind.label()),
                        Style::default()
                            .fg(theme.kind_color(*kind))
                            .add_modifier(Modifier::BOLD),
                    ));
                let inner = block.inner(area);
                f.render_widget(block, area);
                form.render(f, inner, theme);
            }
            Step::ConfirmVisibility { kind, form, confirm } => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(format!(" New {} ", kind.label()));
                let inner = block.inner(area);
                f.render_widget(block, area);
                form.render(f, inner, theme);
                confirm.render(f, area, theme);
            }
            Step::Saving { kind, .. } => {
                let rows =
                    Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(area);
                let message = format!("Saving {}...", kind.label().to_lowercase());
                let line = spinner_line(self.tick, &message, theme);
                f.render_widget(Paragraph::new(vec![Line::from(""), line]), rows[0]);
            }
            Step::Complete { result } => self.render_complete(f, area, result, theme),
        }
    }

    fn hints(&self) -> Vec<Hint> {
        match &self.step {
            Step::SelectType => vec![
                hint("\u{2191}\u{2193}", "move"),
                hint("Enter", "select"),
                hint("Esc", "menu"),
            ],
            Step::InputData { .. } => vec![
                hint("Tab/\u{2193}", "next field"),
                hint("S-Tab/\u{2191}", "prev field"),
                hint("Enter", "next/submit"),
                hint("C-s", "submit"),
                hint("Esc", "back"),
            ],
            Step::ConfirmVisibility { .. } => vec![
                hint("\u{2190}\u{2192}", "choose"),
                hint("y/n", "answer"),
                hint("Enter", "confirm"),
                hint("Esc", "back"),
            ],
            Step::Saving { .. } => vec![hint("Esc", "back")],
            Step::Complete { result } => {
                let mut hints = vec![hint("Enter", "menu"), hint("n", "new record")];
                if result.is_ok() {
                    hints.push(hint("v", "view"));
                }
                hints
            }
        }
    }

    fn breadcrumb(&self) -> Vec<String> {
        let mut path = vec![self.kind().title().to_string()];
        let (kind, step) = match &self.step {
            Step::SelectType => (None, "Type"),
            Step::InputData { kind, .. } => (Some(*kind), "Details"),
            Step::ConfirmVisibility { kind, .. } => (Some(*kind), "Visibility"),
            Step::Saving { kind, .. } => (Some(*kind), "Saving"),
            Step::Complete { result } => (result.as_ref().ok().map(Record::kind), "Done"),
        };
        if let Some(kind) = kind {
            path.push(kind.label().to_string());
        }
        path.push(step.to_string());
        path
    }
}
