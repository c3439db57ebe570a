use crate::agent::{ ChatEngine, Key, KeyAction, KeyPress };
use crate::models::api::ChatSnapshot;
use crate::models::chat::Sender;
use crate::speech::SpeechCapture;
use crossterm::{
    cursor::MoveTo,
    event::{
        self,
        Event,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
        KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{ self, Clear, ClearType },
};
use std::error::Error;
use std::io::{ self, Write };
use std::time::Duration;
use log::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    NewChat,
    ListSessions,
    Open(usize),
    Delete(usize),
    Voice,
    Quit,
    Unknown(String),
}

fn parse_command(input: &str) -> Option<ReplCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let index = parts.next().and_then(|n| n.parse::<usize>().ok());
    let command = match (name, index) {
        ("new", _) => ReplCommand::NewChat,
        ("sessions", _) => ReplCommand::ListSessions,
        ("open", Some(i)) => ReplCommand::Open(i),
        ("delete", Some(i)) => ReplCommand::Delete(i),
        ("voice", _) => ReplCommand::Voice,
        ("quit" | "exit", _) => ReplCommand::Quit,
        _ => ReplCommand::Unknown(input.to_string()),
    };
    Some(command)
}

/// Restores the terminal when the chat loop exits, including on error.
struct RawModeGuard {
    enhanced: bool,
}

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }
        Ok(Self { enhanced })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = terminal::disable_raw_mode();
    }
}

fn render(snapshot: &ChatSnapshot, status: &str, listening: bool) -> io::Result<()> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    let mut screen = format!(
        "ChatChef · session {} of {}\r\n\r\n",
        snapshot.current_index + 1,
        snapshot.sessions.len().max(1)
    );
    for message in &snapshot.active {
        let who = match message.sender {
            Sender::User => "you ",
            Sender::Bot => "chef",
        };
        screen.push_str(&format!("{}> {}\r\n", who, message.text.replace('\n', "\r\n      ")));
    }
    if snapshot.is_typing {
        screen.push_str("chef is typing…\r\n");
    }
    screen.push_str("\r\n");
    if let Some(index) = snapshot.pending_deletion {
        screen.push_str(&format!("Delete session {}? (y/n)\r\n", index + 1));
    }
    if !status.is_empty() {
        screen.push_str(status);
        screen.push_str("\r\n");
    }
    if listening {
        screen.push_str("🎙 listening…\r\n");
    }
    screen.push_str(&format!("> {}", snapshot.input.replace('\n', "\r\n  ")));
    out.write_all(screen.as_bytes())?;
    out.flush()
}

fn to_key_press(event: &KeyEvent) -> Option<KeyPress> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let key = match event.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(ch) => Key::Char(ch),
        _ => {
            return None;
        }
    };
    Some(KeyPress { key, shift })
}

fn session_listing(snapshot: &ChatSnapshot) -> String {
    if snapshot.sessions.is_empty() {
        return "No saved sessions yet.".to_string();
    }
    snapshot.sessions
        .iter()
        .enumerate()
        .map(|(i, session)| {
            let title = session
                .iter()
                .find(|m| m.sender == Sender::User)
                .map(|m| m.text.lines().next().unwrap_or_default().to_string())
                .unwrap_or_else(|| "New Chat".to_string());
            let marker = if i == snapshot.current_index { "*" } else { " " };
            format!("{}{}: {}", marker, i + 1, title)
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Runs the terminal chat until the user quits.
pub async fn run(engine: ChatEngine, speech: SpeechCapture) -> Result<(), Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;
    let mut status = String::from("Enter sends, Shift+Enter adds a line. /new /sessions /open N /delete N /voice /quit");
    let mut last_transcript = speech.transcript();
    let mut last_frame: Option<(ChatSnapshot, String, bool)> = None;

    loop {
        let transcript = speech.transcript();
        if transcript != last_transcript {
            if !transcript.is_empty() {
                engine.set_input(&transcript);
            }
            last_transcript = transcript;
        }

        let frame = (engine.snapshot(), status.clone(), speech.is_listening());
        if last_frame.as_ref() != Some(&frame) {
            render(&frame.0, &frame.1, frame.2)?;
            last_frame = Some(frame);
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }
        let ctrl_c = key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c');
        if ctrl_c || (key_event.code == KeyCode::Esc && engine.pending_deletion().is_none()) {
            break;
        }

        if engine.pending_deletion().is_some() {
            match key_event.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    match engine.confirm_deletion() {
                        Ok(_) => status = "Session deleted.".to_string(),
                        Err(e) => status = e.to_string(),
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    engine.cancel_deletion();
                    status.clear();
                }
                _ => {}
            }
            continue;
        }

        let Some(press) = to_key_press(&key_event) else {
            continue;
        };
        if engine.apply_key(press) != KeyAction::Send {
            continue;
        }

        let input = engine.snapshot().input;
        match parse_command(&input) {
            Some(command) => {
                engine.set_input("");
                status.clear();
                match command {
                    ReplCommand::NewChat => {
                        engine.new_chat();
                    }
                    ReplCommand::ListSessions => status = session_listing(&engine.snapshot()),
                    ReplCommand::Open(n) => {
                        if let Err(e) = engine.select_session(n.saturating_sub(1)) {
                            status = e.to_string();
                        }
                    }
                    ReplCommand::Delete(n) => {
                        let requested = n
                            .checked_sub(1)
                            .map(|index| engine.request_deletion(index).is_ok())
                            .unwrap_or(false);
                        if !requested {
                            status = format!("No session {}", n);
                        }
                    }
                    ReplCommand::Voice => {
                        if speech.is_supported() {
                            speech.start_listening();
                        } else {
                            status = "Voice input is not available.".to_string();
                        }
                    }
                    ReplCommand::Quit => {
                        break;
                    }
                    ReplCommand::Unknown(text) => status = format!("Unknown command: {}", text),
                }
            }
            None => {
                if let Some(pending) = engine.begin_send_input() {
                    tokio::spawn(async move {
                        pending.complete().await;
                    });
                }
            }
        }
    }

    if let Err(e) = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0)) {
        warn!("Failed to clear terminal: {}", e);
    }
    Ok(())
}
