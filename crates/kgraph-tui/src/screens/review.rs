use std::collections::BTreeSet;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use kgraph_core::{Flashcard, Visibility};

use super::{Hint, Screen, ScreenKind, TagSource, Transition, hint, unexpected};
use crate::theme::Theme;
use crate::tui_event::{CommandPayload, CommandRequest, CommandTag, Completion, Event, Key};
use crate::view::{error_line, spinner_line};
use crate::widgets::Confirmation;

enum Step {
    ShowCard {
        index: usize,
    },
    ConfirmSave {
        /// Card to return to on back.
        index: usize,
        confirm: Confirmation,
    },
    Saving {
        index: usize,
        confirm: Confirmation,
        tag: CommandTag,
    },
    Complete {
        result: Result<usize, String>,
    },
}

pub struct ReviewScreen {
    tags: TagSource,
    cards: Vec<Flashcard>,
    selected: BTreeSet<usize>,
    step: Step,
    tick: usize,
}

impl ReviewScreen {
    pub fn new(tags: TagSource, cards: Vec<Flashcard>) -> Self {
        Self {
            tags,
            cards,
            selected: BTreeSet::new(),
            step: Step::ShowCard { index: 0 },
            tick: 0,
        }
    }

    fn confirm_prompt(&self) -> Confirmation {
        Confirmation::new(format!(
            "Make all {} selected flashcards public?",
            self.selected.len()
        ))
    }

    /// Leave card review: straight to Complete when nothing was kept.
    fn finish(&self, index: usize) -> Step {
        if self.selected.is_empty() {
            Step::Complete { result: Ok(0) }
        } else {
            Step::ConfirmSave {
                index,
                confirm: self.confirm_prompt(),
            }
        }
    }

    fn advance(&self, index: usize) -> Step {
        if index + 1 >= self.cards.len() {
            self.finish(index)
        } else {
            Step::ShowCard { index: index + 1 }
        }
    }

    fn on_key(&mut self, step: Step, key: Key) -> (Step, Transition) {
        match step {
            Step::ShowCard { index } => match key {
                Key::Esc => (Step::ShowCard { index }, Transition::main_menu()),
                Key::Char('k') | Key::Char('y') => {
                    if index < self.cards.len() {
                        self.selected.insert(index);
                    }
                    (self.advance(index), Transition::stay())
                }
                Key::Char('d') | Key::Char('n') => {
                    self.selected.remove(&index);
                    (self.advance(index), Transition::stay())
                }
                Key::Left | Key::Char('h') | Key::Char('p') => (
                    Step::ShowCard {
                        index: index.saturating_sub(1),
                    },
                    Transition::stay(),
                ),
                Key::Right | Key::Char('l') => (self.advance(index), Transition::stay()),
                Key::Char('f') => (self.finish(index), Transition::stay()),
                _ => (Step::ShowCard { index }, Transition::stay()),
            },

            Step::ConfirmSave { index, mut confirm } => {
                if key == Key::Esc {
                    return (Step::ShowCard { index }, Transition::stay());
                }
                match confirm.handle_key(key) {
                    Some(choice) => {
                        let visibility = Visibility::from_public(choice.is_yes());
                        let batch = self
                            .selected
                            .iter()
                            .filter_map(|&i| self.cards.get(i))
                            .map(|card| card.to_new_record(visibility))
                            .collect();
                        let command = self.tags.command(CommandRequest::CreateRecords(batch));
                        let tag = command.tag;
                        (
                            Step::Saving {
                                index,
                                confirm,
                                tag,
                            },
                            Transition::issue(command),
                        )
                    }
                    None => (Step::ConfirmSave { index, confirm }, Transition::stay()),
                }
            }

            Step::Saving {
                index,
                mut confirm,
                tag,
            } => match key {
                Key::Esc => {
                    confirm.reset();
                    (Step::ConfirmSave { index, confirm }, Transition::stay())
                }
                _ => (
                    Step::Saving {
                        index,
                        confirm,
                        tag,
                    },
                    Transition::stay(),
                ),
            },

            Step::Complete { result } => match key {
                Key::Enter | Key::Char(' ') => {
                    (Step::Complete { result }, Transition::main_menu())
                }
                Key::Esc => {
                    self.selected.clear();
                    (Step::ShowCard { index: 0 }, Transition::stay())
                }
                _ => (Step::Complete { result }, Transition::stay()),
            },
        }
    }

    fn on_completion(&mut self, step: Step, completion: Completion) -> (Step, Transition) {
        match step {
            Step::Saving { tag, .. } if tag == completion.tag => match completion.outcome {
                Ok(CommandPayload::CreatedMany(records)) => {
                    tracing::info!(saved = records.len(), "flashcards saved");
                    (
                        Step::Complete {
                            result: Ok(records.len()),
                        },
                        Transition::stay(),
                    )
                }
                Ok(_) => (
                    Step::Complete {
                        result: Err(format!("unexpected response to request {}", tag.seq)),
                    },
                    unexpected(self.kind(), "non-batch payload"),
                ),
                Err(e) => (
                    Step::Complete {
                        result: Err(e.to_string()),
                    },
                    Transition::stay(),
                ),
            },
            other => {
                tracing::debug!(seq = completion.tag.seq, "stale review completion");
                (other, Transition::stay())
            }
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, index: usize, theme: &Theme) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

        let total = self.cards.len().max(1);
        let progress = Gauge::default()
            .gauge_style(Style::default().fg(theme.active).bg(theme.highlight_bg))
            .ratio(((index + 1) as f64 / total as f64).min(1.0))
            .label(format!(
                "Card {} of {}",
                (index + 1).min(self.cards.len()),
                self.cards.len()
            ));
        f.render_widget(progress, rows[0]);

        let Some(card) = self.cards.get(index) else {
            f.render_widget(
                Paragraph::new(Span::styled("  No cards to review", theme.dim_style())),
                rows[1],
            );
            return;
        };

        let kept = self.selected.contains(&index);
        let border = if kept {
            Style::default().fg(theme.success)
        } else {
            theme.border_style()
        };
        let side = |title: &'static str, text: &str| {
            Paragraph::new(text.to_string())
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(theme.text))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(title),
                )
        };
        f.render_widget(side(" Front ", &card.front), rows[1]);
        f.render_widget(side(" Back ", &card.back), rows[2]);

        let status = if kept {
            Span::styled("  \u{2713} Kept", theme.success_style())
        } else {
            Span::styled("  Not kept", theme.dim_style())
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                status,
                Span::styled(
                    format!("   {} selected", self.selected.len()),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ),
            ])),
            rows[3],
        );
    }
}

impl Screen for ReviewScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::FlashcardReview
    }

    fn handle(&mut self, event: Event) -> Transition {
        let step = std::mem::replace(&mut self.step, Step::ShowCard { index: 0 });
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
            Step::ShowCard { index } => self.render_card(f, area, *index, theme),
            Step::ConfirmSave { index, confirm } => {
                self.render_card(f, area, *index, theme);
                confirm.render(f, area, theme);
            }
            Step::Saving { .. } => {
                let line = spinner_line(
                    self.tick,
                    &format!("Saving {} flashcard(s)...", self.selected.len()),
                    theme,
                );
                f.render_widget(Paragraph::new(vec![Line::from(""), line]), area);
            }
            Step::Complete { result } => {
                let lines = match result {
                    Ok(0) => vec![
                        Line::from(""),
                        Line::from(Span::styled("  No flashcards were kept", theme.dim_style())),
                    ],
                    Ok(saved) => vec![
                        Line::from(""),
                        Line::from(Span::styled(
                            format!("  \u{2713} Saved {saved} flashcard(s)"),
                            theme.success_style(),
                        )),
                    ],
                    Err(message) => vec![
                        Line::from(""),
                        Line::from(Span::styled(
                            "  Could not save flashcards",
                            theme.error_style(),
                        )),
                        error_line(message, theme),
                    ],
                };
                f.render_widget(
                    Paragraph::new(lines).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(theme.border_style())
                            .title(" Review complete "),
                    ),
                    area,
                );
            }
        }
    }

    fn hints(&self) -> Vec<Hint> {
        match &self.step {
            Step::ShowCard { .. } => vec![
                hint("k/y", "keep"),
                hint("d/n", "discard"),
                hint("\u{2190}\u{2192}", "prev/next"),
                hint("f", "finish"),
                hint("Esc", "menu"),
            ],
            Step::ConfirmSave { .. } => vec![
                hint("y/n", "answer"),
                hint("Enter", "confirm"),
                hint("Esc", "back"),
            ],
            Step::Saving { .. } => vec![hint("Esc", "back")],
            Step::Complete { .. } => vec![hint("Enter", "menu"), hint("Esc", "review again")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{complete, only_command, press, render, tags};
    use crate::screens::{Destination, Next};
    use kgraph_core::{Latency, MockService, RecordKind};

    fn cards(n: usize) -> Vec<Flashcard> {
        (1..=n)
            .map(|i| Flashcard::new(format!("Q{i}"), format!("A{i}")))
            .collect()
    }

    fn index(screen: &ReviewScreen) -> Option<usize> {
        match screen.step {
            Step::ShowCard { index } => Some(index),
            _ => None,
        }
    }

    #[test]
    fn keep_then_discard_same_card_removes_it() {
        let mut screen = ReviewScreen::new(tags(), cards(3));
        press(&mut screen, Key::Char('k'));
        assert!(screen.selected.contains(&0));
        press(&mut screen, Key::Left);
        assert_eq!(index(&screen), Some(0));
        press(&mut screen, Key::Char('d'));
        assert!(screen.selected.is_empty());
        assert_eq!(index(&screen), Some(1));
    }

    #[test]
    fn finish_with_nothing_kept_goes_straight_to_complete() {
        let mut screen = ReviewScreen::new(tags(), cards(2));
        let t = press(&mut screen, Key::Char('f'));
        assert!(t.commands.is_empty());
        assert!(matches!(screen.step, Step::Complete { result: Ok(0) }));
        assert!(render(&screen).contains("No flashcards were kept"));
    }

    #[test]
    fn discarding_past_the_last_card_finishes() {
        let mut screen = ReviewScreen::new(tags(), cards(2));
        press(&mut screen, Key::Char('n'));
        press(&mut screen, Key::Char('n'));
        assert!(matches!(screen.step, Step::Complete { result: Ok(0) }));
    }

    #[test]
    fn left_and_right_move_between_cards() {
        let mut screen = ReviewScreen::new(tags(), cards(3));
        press(&mut screen, Key::Right);
        press(&mut screen, Key::Char('l'));
        assert_eq!(index(&screen), Some(2));
        press(&mut screen, Key::Char('p'));
        press(&mut screen, Key::Char('h'));
        assert_eq!(index(&screen), Some(0));
        press(&mut screen, Key::Left);
        assert_eq!(index(&screen), Some(0));
    }

    #[test]
    fn right_on_last_card_finishes_to_confirm() {
        let mut screen = ReviewScreen::new(tags(), cards(2));
        press(&mut screen, Key::Char('k'));
        assert_eq!(index(&screen), Some(1));
        press(&mut screen, Key::Right);
        assert!(matches!(screen.step, Step::ConfirmSave { index: 1, .. }));
    }

    #[test]
    fn right_on_last_card_with_nothing_kept_completes() {
        let mut screen = ReviewScreen::new(tags(), cards(2));
        press(&mut screen, Key::Right);
        press(&mut screen, Key::Char('l'));
        assert!(matches!(screen.step, Step::Complete { result: Ok(0) }));
    }

    #[test]
    fn wrong_payload_while_saving_reports_error() {
        let mut screen = ReviewScreen::new(tags(), cards(1));
        press(&mut screen, Key::Char('k'));
        let command = only_command(&press(&mut screen, Key::Char('y')));
        let t = complete(
            &mut screen,
            &command,
            Ok(CommandPayload::Flashcards(Vec::new())),
        );
        assert_eq!(t.next, Next::Stay);
        assert!(matches!(screen.step, Step::Complete { result: Err(_) }));
        assert!(render(&screen).contains("Could not save flashcards"));
    }

    #[test]
    fn saves_kept_cards_in_one_command() {
        let service = MockService::new(Latency::none());
        let mut screen = ReviewScreen::new(tags(), cards(3));
        press(&mut screen, Key::Char('y'));
        press(&mut screen, Key::Char('n'));
        press(&mut screen, Key::Char('y'));
        assert!(matches!(screen.step, Step::ConfirmSave { .. }));
        assert!(render(&screen).contains("Make all 2 selected flashcards public?"));

        let command = only_command(&press(&mut screen, Key::Char('n')));
        let CommandRequest::CreateRecords(batch) = &command.request else {
            panic!("expected batch create");
        };
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|r| r.visibility == Visibility::Private));

        let outcome = crate::scheduler::execute(&service, command.request.clone());
        complete(&mut screen, &command, outcome);
        assert!(matches!(screen.step, Step::Complete { result: Ok(2) }));
        let saved = service.records();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|r| r.kind() == RecordKind::Flashcard));
        assert_eq!(saved[1].title, "Q3");

        assert_eq!(
            press(&mut screen, Key::Enter).next,
            Next::Navigate(Destination::MainMenu)
        );
    }

    #[test]
    fn back_from_confirm_keeps_selection() {
        let mut screen = ReviewScreen::new(tags(), cards(1));
        press(&mut screen, Key::Char('k'));
        assert!(matches!(screen.step, Step::ConfirmSave { .. }));
        press(&mut screen, Key::Esc);
        assert_eq!(index(&screen), Some(0));
        assert_eq!(screen.selected.len(), 1);
    }

    #[test]
    fn esc_on_complete_restarts_review() {
        let mut screen = ReviewScreen::new(tags(), cards(2));
        press(&mut screen, Key::Char('f'));
        press(&mut screen, Key::Esc);
        assert_eq!(index(&screen), Some(0));
        assert_eq!(
            press(&mut screen, Key::Esc).next,
            Next::Navigate(Destination::MainMenu)
        );
    }

    #[test]
    fn empty_deck_renders_and_finishes() {
        let mut screen = ReviewScreen::new(tags(), Vec::new());
        assert!(render(&screen).contains("No cards to review"));
        press(&mut screen, Key::Char('k'));
        assert!(matches!(screen.step, Step::Complete { result: Ok(0) }));
    }
}
