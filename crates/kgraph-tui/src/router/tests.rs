use kgraph_core::{
    Flashcard, Latency, MockService, Operation, RecordId, RecordKind, Visibility,
};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use super::*;
use crate::scheduler::execute;
use crate::tui_event::{CommandPayload, Completion};
use crate::view::testing::buffer_text;

fn key(router: &mut Router, k: Key) -> Routed {
    router.dispatch(Event::Key(k))
}

fn type_text(router: &mut Router, text: &str) {
    for c in text.chars() {
        let routed = key(router, Key::Char(c));
        assert!(routed.commands.is_empty());
    }
}

/// Run commands synchronously and feed completions back until quiet.
fn settle(router: &mut Router, service: &MockService, mut commands: Vec<Command>) {
    while let Some(command) = commands.pop() {
        let outcome = execute(service, command.request);
        let routed = router.dispatch(Event::CommandCompleted(Completion {
            tag: command.tag,
            outcome,
        }));
        commands.extend(routed.commands);
    }
}

fn press_and_settle(router: &mut Router, service: &MockService, k: Key) {
    let routed = key(router, k);
    settle(router, service, routed.commands);
}

fn render(router: &Router) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    let theme = Theme::hacker();
    terminal.draw(|f| router.view(f, &theme)).unwrap();
    buffer_text(&terminal)
}

fn all_destinations() -> Vec<Destination> {
    let record = crate::screens::testing::note("rec-001", "Ownership");
    vec![
        Destination::MainMenu,
        Destination::CreateRecord,
        Destination::Search,
        Destination::GenerateFlashcards,
        Destination::PublishSite,
        Destination::FlashcardReview {
            cards: vec![Flashcard::new("Q", "A")],
        },
        Destination::RecordViewer { record },
        Destination::Loading {
            message: "Loading...".into(),
            record_id: RecordId::new("rec-001"),
        },
        Destination::Error {
            message: "boom".into(),
        },
    ]
}

// ── reserved key ──────────────────────────────────────────────────

#[test]
fn starts_on_main_menu() {
    let router = Router::new();
    assert_eq!(router.kind(), ScreenKind::MainMenu);
}

#[test]
fn reserved_key_quits_from_main_menu() {
    let mut router = Router::new();
    assert!(key(&mut router, RESERVED_KEY).quit);
}

#[test]
fn reserved_key_returns_to_menu_from_anywhere() {
    for destination in all_destinations().into_iter().skip(1) {
        let mut router = Router::new();
        router.open(destination.clone());
        let routed = key(&mut router, RESERVED_KEY);
        assert!(!routed.quit, "{destination:?}");
        assert_eq!(router.kind(), ScreenKind::MainMenu, "{destination:?}");
    }
}

#[test]
fn reserved_key_overrides_running_publish() {
    let mut router = Router::new();
    router.open(Destination::PublishSite);
    let routed = key(&mut router, Key::Char('y'));
    assert_eq!(routed.commands.len(), 1);
    // Esc is ignored while publishing.
    key(&mut router, Key::Esc);
    assert_eq!(router.kind(), ScreenKind::PublishSite);
    key(&mut router, RESERVED_KEY);
    assert_eq!(router.kind(), ScreenKind::MainMenu);
}

// ── back key ──────────────────────────────────────────────────────

#[test]
fn repeated_esc_reaches_main_menu_from_every_screen() {
    for destination in all_destinations() {
        let mut router = Router::new();
        router.open(destination.clone());
        for _ in 0..10 {
            if router.kind() == ScreenKind::MainMenu {
                break;
            }
            key(&mut router, Key::Esc);
        }
        assert_eq!(router.kind(), ScreenKind::MainMenu, "{destination:?}");
    }
}

#[test]
fn esc_walks_back_through_deep_create_steps() {
    let mut router = Router::new();
    key(&mut router, Key::Char('c'));
    key(&mut router, Key::Enter); // Note
    type_text(&mut router, "Title");
    key(&mut router, Key::Tab);
    type_text(&mut router, "Body");
    key(&mut router, Key::Ctrl('s'));
    assert_eq!(router.active.breadcrumb().last().map(String::as_str), Some("Visibility"));

    let mut steps = 0;
    while router.kind() != ScreenKind::MainMenu {
        key(&mut router, Key::Esc);
        steps += 1;
        assert!(steps <= 5);
    }
    assert_eq!(steps, 3);
}

// ── stale completions ─────────────────────────────────────────────

#[test]
fn completion_for_closed_screen_is_discarded() {
    let mut router = Router::new();
    key(&mut router, Key::Char('s'));
    type_text(&mut router, "rust");
    let routed = key(&mut router, Key::Enter);
    let command = routed.commands[0].clone();

    // Leave and come back: a fresh Search instance with a new id.
    key(&mut router, RESERVED_KEY);
    key(&mut router, Key::Char('s'));
    assert_ne!(router.active_id, command.tag.screen);

    let routed = router.dispatch(Event::CommandCompleted(Completion {
        tag: command.tag,
        outcome: Ok(CommandPayload::Hits(Vec::new())),
    }));
    assert!(routed.commands.is_empty());
    assert_eq!(router.active.breadcrumb(), vec!["Search Records"]);
}

#[test]
fn screen_ids_are_never_reused() {
    let mut router = Router::new();
    let mut seen = vec![router.active_id];
    for _ in 0..5 {
        key(&mut router, Key::Char('p'));
        seen.push(router.active_id);
        key(&mut router, RESERVED_KEY);
        seen.push(router.active_id);
    }
    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), seen.len());
}

// ── end to end ────────────────────────────────────────────────────

#[test]
fn create_private_flashcard_end_to_end() {
    let service = MockService::new(Latency::none());
    let mut router = Router::new();

    key(&mut router, Key::Enter); // Create Record
    assert_eq!(router.kind(), ScreenKind::CreateRecord);
    key(&mut router, Key::Down);
    key(&mut router, Key::Down);
    key(&mut router, Key::Down);
    key(&mut router, Key::Enter); // Flashcard
    type_text(&mut router, "Q");
    key(&mut router, Key::Tab);
    type_text(&mut router, "A");
    key(&mut router, Key::Enter); // submit
    press_and_settle(&mut router, &service, Key::Char('n'));

    let records = service.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), RecordKind::Flashcard);
    assert_eq!(records[0].visibility, Visibility::Private);

    let screen = render(&router);
    assert!(screen.contains("Flashcard created"));
    assert!(screen.contains("Private"));

    // View it through the loading screen.
    press_and_settle(&mut router, &service, Key::Char('v'));
    assert_eq!(router.kind(), ScreenKind::RecordViewer);
    assert!(render(&router).contains("rec-001"));
}

#[test]
fn failing_create_shows_error_text() {
    let service = MockService::new(Latency::none());
    service.fail(Operation::Create, "database is locked");
    let mut router = Router::new();
    key(&mut router, Key::Char('c'));
    key(&mut router, Key::Up); // wraps to Flashcard
    key(&mut router, Key::Enter);
    type_text(&mut router, "Q");
    key(&mut router, Key::Tab);
    type_text(&mut router, "A");
    key(&mut router, Key::Enter);
    press_and_settle(&mut router, &service, Key::Enter);
    assert!(render(&router).contains("database is locked"));
}

#[test]
fn generate_review_and_save_flow() {
    let service = MockService::with_samples(Latency::none());
    let before = service.len();
    let mut router = Router::new();

    key(&mut router, Key::Char('g'));
    type_text(&mut router, "reference");
    press_and_settle(&mut router, &service, Key::Enter);
    // The Rust Reference link: two generic cards plus its URL card.
    press_and_settle(&mut router, &service, Key::Enter);
    key(&mut router, Key::Char('r'));
    assert_eq!(router.kind(), ScreenKind::FlashcardReview);

    key(&mut router, Key::Char('k'));
    key(&mut router, Key::Char('d'));
    key(&mut router, Key::Char('k'));
    press_and_settle(&mut router, &service, Key::Char('y'));

    assert!(render(&router).contains("Saved 2 flashcard(s)"));
    assert_eq!(service.len(), before + 2);
    assert!(
        service
            .records()
            .iter()
            .rev()
            .take(2)
            .all(|r| r.kind() == RecordKind::Flashcard && r.visibility.is_public())
    );
}

#[test]
fn loading_missing_record_shows_error_screen() {
    let service = MockService::new(Latency::none());
    let mut router = Router::new();
    let commands = router.open(Destination::Loading {
        message: "Loading...".into(),
        record_id: RecordId::new("rec-404"),
    });
    settle(&mut router, &service, commands);
    assert_eq!(router.kind(), ScreenKind::Error);
    assert!(render(&router).contains("record not found: rec-404"));
    key(&mut router, Key::Char('x'));
    assert_eq!(router.kind(), ScreenKind::MainMenu);
}

// ── chrome ────────────────────────────────────────────────────────

#[test]
fn renders_header_and_reserved_key_hint() {
    let mut router = Router::new();
    let text = render(&router);
    assert!(text.contains("KGRAPH"));
    assert!(text.contains("C-c:quit"));

    key(&mut router, Key::Char('s'));
    let text = render(&router);
    assert!(text.contains("Search Records"));
    assert!(text.contains("C-c:main menu"));
}
