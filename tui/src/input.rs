//! Input handling for Adder TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use adder_engine::{App, Focus};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 256; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(&stop2, &tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Unblock the input thread if it is waiting on channel capacity.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: &AtomicBool, tx: &mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending input for this frame. Returns `true` when the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev) {
            return Ok(true);
        }
        processed += 1;
    }
    if processed == MAX_EVENTS_PER_FRAME {
        debug!(backlog = input.rx.len(), "Input budget exhausted for frame");
    }
    Ok(app.should_quit())
}

/// Apply one terminal event to the page. Returns `true` when the app should quit.
pub fn apply_event(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) => {
            // Handle press + repeat events (ignore releases)
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            if (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
                || key.code == KeyCode::Esc
            {
                app.request_quit();
                return true;
            }

            match key.code {
                KeyCode::Tab | KeyCode::Down => app.focus_next(),
                KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
                _ if app.focus() == Focus::SumButton => handle_button(app, key),
                _ => handle_field(app, key),
            }
        }
        Event::Paste(text) => {
            if let Some(field) = app.focused_field_mut() {
                field.enter_text(&text);
            }
        }
        _ => {}
    }
    app.should_quit()
}

fn handle_button(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.trigger_sum();
        }
        KeyCode::Char('q') => app.request_quit(),
        _ => {}
    }
}

fn handle_field(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.focus_next();
        return;
    }
    let Some(field) = app.focused_field_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => field.clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            field.enter_char(c);
        }
        KeyCode::Backspace => field.delete_char(),
        KeyCode::Delete => field.delete_char_forward(),
        KeyCode::Left => field.move_cursor_left(),
        KeyCode::Right => field.move_cursor_right(),
        KeyCode::Home => field.move_cursor_home(),
        KeyCode::End => field.move_cursor_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    use adder_engine::{App, AppSettings, ComputeBridge, FieldId, Focus};

    use super::apply_event;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn page() -> App {
        App::with_bridge(AppSettings::default(), ComputeBridge::new())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            apply_event(app, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_rejects_invalid_characters() {
        let mut app = page();
        type_text(&mut app, "12a");
        assert_eq!(app.field(FieldId::First).text(), "12");
    }

    #[test]
    fn q_in_a_field_is_rejected_not_quit() {
        let mut app = page();
        assert!(!apply_event(&mut app, key(KeyCode::Char('q'))));
        assert!(app.field(FieldId::First).text().is_empty());
    }

    #[test]
    fn q_on_button_quits() {
        let mut app = page();
        app.set_focus(Focus::SumButton);
        assert!(apply_event(&mut app, key(KeyCode::Char('q'))));
    }

    #[test]
    fn esc_and_ctrl_c_quit() {
        let mut app = page();
        assert!(apply_event(&mut app, key(KeyCode::Esc)));

        let mut app = page();
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(apply_event(&mut app, ctrl_c));
        assert!(app.should_quit());
    }

    #[test]
    fn enter_advances_and_blurs() {
        let mut app = page();
        type_text(&mut app, "007.");
        apply_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.focus(), Focus::Second);
        assert_eq!(app.field(FieldId::First).text(), "7");
    }

    #[test]
    fn backtab_wraps_to_button() {
        let mut app = page();
        apply_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.focus(), Focus::SumButton);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = page();
        let mut release = KeyEvent::new(KeyCode::Char('5'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        apply_event(&mut app, Event::Key(release));
        assert!(app.field(FieldId::First).text().is_empty());
    }

    #[test]
    fn ctrl_u_clears_field() {
        let mut app = page();
        type_text(&mut app, "42");
        let ctrl_u = Event::Key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        apply_event(&mut app, ctrl_u);
        assert!(app.field(FieldId::First).text().is_empty());
    }

    #[test]
    fn paste_goes_through_validation() {
        let mut app = page();
        apply_event(&mut app, Event::Paste("3.25".to_string()));
        assert_eq!(app.field(FieldId::First).text(), "3.25");
        apply_event(&mut app, Event::Paste("x".to_string()));
        assert_eq!(app.field(FieldId::First).text(), "3.25");
    }

    #[test]
    fn space_on_button_sums() {
        let mut app = page();
        app.set_focus(Focus::SumButton);
        apply_event(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.sum(), Some(0.0));
    }
}
