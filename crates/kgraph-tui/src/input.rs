use std::thread;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::{self as term, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::tui_event::{Event, Key};

/// Map a crossterm terminal event to an application event.
/// Mouse, focus, paste and key-release events are dropped.
pub fn map_event(event: &term::Event) -> Option<Event> {
    match event {
        term::Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key).map(Event::Key),
        term::Event::Resize(w, h) => Some(Event::Resize(*w, *h)),
        _ => None,
    }
}

pub fn map_key(key: &KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char(c) => Some(Key::Ctrl(c.to_ascii_lowercase())),
            _ => None,
        };
    }

    let mapped = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Key::BackTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    };
    Some(mapped)
}

/// Read terminal input on a dedicated thread, forwarding mapped events and
/// emitting [`Event::Tick`] every `tick_rate`.
///
/// The thread exits when `cancel` fires, the receiver is dropped, or the
/// terminal stops answering polls.
pub fn spawn_reader(
    events: UnboundedSender<Event>,
    tick_rate: Duration,
    cancel: CancellationToken,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut last_tick = Instant::now();
        while !cancel.is_cancelled() {
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            match term::poll(timeout) {
                Ok(true) => match term::read() {
                    Ok(raw) => {
                        if let Some(event) = map_event(&raw)
                            && events.send(event).is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal read failed, stopping input reader");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "terminal poll failed, stopping input reader");
                    break;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if events.send(Event::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
        tracing::debug!("input reader stopped");
    })
}
