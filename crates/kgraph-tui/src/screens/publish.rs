use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use kgraph_core::PublishSummary;

use super::{Hint, Screen, ScreenKind, TagSource, Transition, hint, unexpected};
use crate::theme::Theme;
use crate::tui_event::{CommandPayload, CommandRequest, CommandTag, Completion, Event, Key};
use crate::view::{error_line, labeled_line, spinner_line};
use crate::widgets::Confirmation;

/// Progress messages, rotated while the publish runs.
const STAGES: [&str; 4] = [
    "Collecting public records...",
    "Rendering pages...",
    "Writing index...",
    "Copying assets...",
];
const TICKS_PER_STAGE: usize = 5;

enum Step {
    Confirm { confirm: Confirmation },
    Progress { tag: CommandTag, ticks: usize },
    Complete { summary: PublishSummary },
}

pub struct PublishScreen {
    tags: TagSource,
    error: Option<String>,
    step: Step,
}

impl PublishScreen {
    pub fn new(tags: TagSource) -> Self {
        Self {
            tags,
            error: None,
            step: confirm_step(),
        }
    }

    fn on_key(&mut self, step: Step, key: Key) -> (Step, Transition) {
        match step {
            Step::Confirm { mut confirm } => {
                if key == Key::Esc {
                    return (Step::Confirm { confirm }, Transition::main_menu());
                }
                match confirm.handle_key(key) {
                    Some(choice) if choice.is_yes() => {
                        let command = self.tags.command(CommandRequest::Publish);
                        let tag = command.tag;
                        self.error = None;
                        tracing::info!("publishing site");
                        (Step::Progress { tag, ticks: 0 }, Transition::issue(command))
                    }
                    Some(_) => (Step::Confirm { confirm }, Transition::main_menu()),
                    None => (Step::Confirm { confirm }, Transition::stay()),
                }
            }

            // A running publish cannot be abandoned from this screen.
            progress @ Step::Progress { .. } => (progress, Transition::stay()),

            Step::Complete { summary } => match key {
                Key::Enter => (Step::Complete { summary }, Transition::main_menu()),
                Key::Char('p') | Key::Esc => (confirm_step(), Transition::stay()),
                _ => (Step::Complete { summary }, Transition::stay()),
            },
        }
    }

    fn on_completion(&mut self, step: Step, completion: Completion) -> (Step, Transition) {
        match step {
            Step::Progress { tag, .. } if tag == completion.tag => match completion.outcome {
                Ok(CommandPayload::Published(summary)) => {
                    tracing::info!(
                        files = summary.files_generated,
                        dir = %summary.output_dir,
                        "site published"
                    );
                    (Step::Complete { summary }, Transition::stay())
                }
                Ok(_) => (confirm_step(), unexpected(self.kind(), "non-publish payload")),
                Err(e) => {
                    self.error = Some(e.to_string());
                    (confirm_step(), Transition::stay())
                }
            },
            other => {
                tracing::debug!(seq = completion.tag.seq, "stale publish completion");
                (other, Transition::stay())
            }
        }
    }
}

fn confirm_step() -> Step {
    Step::Confirm {
        confirm: Confirmation::new("Publish all public records to a static site?"),
    }
}

impl Screen for PublishScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::PublishSite
    }

    fn handle(&mut self, event: Event) -> Transition {
        let step = std::mem::replace(&mut self.step, confirm_step());
        let (step, transition) = match event {
            Event::Key(key) => self.on_key(step, key),
            Event::CommandCompleted(completion) => self.on_completion(step, completion),
            Event::Tick => match step {
                Step::Progress { tag, ticks } => (
                    Step::Progress {
                        tag,
                        ticks: ticks.wrapping_add(1),
                    },
                    Transition::stay(),
                ),
                other => (other, Transition::stay()),
            },
            Event::Resize(..) => (step, Transition::stay()),
        };
        self.step = step;
        transition
    }

    fn view(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        match &self.step {
            Step::Confirm { confirm } => {
                let rows =
                    Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).split(area);
                let mut lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "  Public records are rendered into static HTML pages.",
                        theme.dim_style(),
                    )),
                ];
                if let Some(error) = &self.error {
                    lines.push(error_line(&format!("Publish failed: {error}"), theme));
                }
                f.render_widget(Paragraph::new(lines), rows[0]);
                confirm.render(f, rows[1], theme);
            }
            Step::Progress { ticks, .. } => {
                let stage = STAGES[(ticks / TICKS_PER_STAGE) % STAGES.len()];
                let lines = vec![
                    Line::from(""),
                    spinner_line(*ticks, stage, theme),
                    Line::from(""),
                    Line::from(Span::styled(
                        "  Publishing cannot be interrupted",
                        theme.dim_style(),
                    )),
                ];
                f.render_widget(Paragraph::new(lines), area);
            }
            Step::Complete { summary } => {
                let lines = vec![
                    Line::from(""),
                    Line::from(Span::styled("  \u{2713} Site published", theme.success_style())),
                    Line::from(""),
                    labeled_line("Files", summary.files_generated.to_string(), theme),
                    labeled_line("Output", summary.output_dir.clone(), theme),
                ];
                f.render_widget(
                    Paragraph::new(lines).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(theme.border_style())
                            .title(" Publish "),
                    ),
                    area,
                );
            }
        }
    }

    fn hints(&self) -> Vec<Hint> {
        match &self.step {
            Step::Confirm { .. } => vec![
                hint("\u{2190}\u{2192}", "choose"),
                hint("y/n", "answer"),
                hint("Enter", "confirm"),
                hint("Esc", "menu"),
            ],
            Step::Progress { .. } => Vec::new(),
            Step::Complete { .. } => vec![hint("Enter", "menu"), hint("p", "publish again")],
        }
    }
}
