//! Voice input behind a start/transcript interface.
//!
//! A [`SpeechCapture`] owns at most one [`Recognizer`], configured once for a
//! single-utterance, final-results-only pass. Without a recognizer the adapter
//! stays idle forever and `start_listening` does nothing.

mod command;

pub use command::CommandRecognizer;

use log::{ debug, error, warn };
use std::sync::{ Arc, Mutex, MutexGuard };
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to launch speech recognizer: {0}")]
    Launch(#[from] std::io::Error),
    #[error("speech recognizer failed: {0}")]
    Recognizer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerSettings {
    pub lang: String,
    pub interim_results: bool,
    pub continuous: bool,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            interim_results: false,
            continuous: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Start,
    /// One entry per recognized segment, best alternative first.
    Result(Vec<Vec<Alternative>>),
    Error(String),
    End,
}

pub type EventSink = Arc<dyn Fn(RecognitionEvent) + Send + Sync>;

pub trait Recognizer: Send + Sync {
    /// Begins one recognition pass, reporting progress through `sink`.
    fn start(&self, settings: &RecognizerSettings, sink: EventSink) -> Result<(), SpeechError>;
}

#[derive(Debug, Default)]
struct SpeechState {
    transcript: String,
    listening: bool,
}

fn lock(state: &Mutex<SpeechState>) -> MutexGuard<'_, SpeechState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SpeechCapture {
    recognizer: Option<Arc<dyn Recognizer>>,
    settings: RecognizerSettings,
    state: Arc<Mutex<SpeechState>>,
}

impl SpeechCapture {
    pub fn new(recognizer: Option<Arc<dyn Recognizer>>) -> Self {
        if recognizer.is_none() {
            error!("Speech Recognition API not supported.");
        }
        Self {
            recognizer,
            settings: RecognizerSettings::default(),
            state: Arc::new(Mutex::new(SpeechState::default())),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn transcript(&self) -> String {
        lock(&self.state).transcript.clone()
    }

    pub fn is_listening(&self) -> bool {
        lock(&self.state).listening
    }

    /// Starts one recognition. `is_listening` turns true here, before the
    /// recognizer reports `Start`, so a second call is a no-op until `End`.
    pub fn start_listening(&self) {
        let Some(recognizer) = &self.recognizer else {
            debug!("start_listening ignored: no recognizer available");
            return;
        };
        {
            let mut state = lock(&self.state);
            if state.listening {
                return;
            }
            state.listening = true;
        }
        if let Err(e) = recognizer.start(&self.settings, self.sink()) {
            warn!("{}", e);
            lock(&self.state).listening = false;
        }
    }

    fn sink(&self) -> EventSink {
        let state = self.state.clone();
        Arc::new(move |event| apply_event(&state, event))
    }
}

fn apply_event(state: &Mutex<SpeechState>, event: RecognitionEvent) {
    match event {
        RecognitionEvent::Start => {
            lock(state).listening = true;
        }
        RecognitionEvent::End => {
            lock(state).listening = false;
        }
        RecognitionEvent::Result(results) => {
            let speech: String = results
                .iter()
                .filter_map(|alternatives| alternatives.first())
                .map(|best| best.transcript.as_str())
                .collect();
            lock(state).transcript = speech;
        }
        RecognitionEvent::Error(message) => {
            warn!("Speech recognition error: {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out the sink so the test can play recognizer events.
    #[derive(Default)]
    struct ScriptedRecognizer {
        starts: Mutex<Vec<RecognizerSettings>>,
        sink: Mutex<Option<EventSink>>,
    }

    impl ScriptedRecognizer {
        fn emit(&self, event: RecognitionEvent) {
            let sink = self.sink.lock().unwrap().clone().expect("not started");
            sink(event);
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn start(&self, settings: &RecognizerSettings, sink: EventSink) -> Result<(), SpeechError> {
            self.starts.lock().unwrap().push(settings.clone());
            *self.sink.lock().unwrap() = Some(sink);
            Ok(())
        }
    }

    struct BrokenRecognizer;

    impl Recognizer for BrokenRecognizer {
        fn start(&self, _: &RecognizerSettings, _: EventSink) -> Result<(), SpeechError> {
            Err(SpeechError::Recognizer("no microphone".into()))
        }
    }

    fn alt(text: &str) -> Alternative {
        Alternative { transcript: text.to_string(), confidence: Some(0.9) }
    }

    #[test]
    fn unsupported_platform_never_listens() {
        let capture = SpeechCapture::new(None);
        capture.start_listening();
        assert!(!capture.is_supported());
        assert!(!capture.is_listening());
        assert_eq!(capture.transcript(), "");
    }

    #[test]
    fn start_is_idempotent_and_uses_single_utterance_settings() {
        let recognizer = Arc::new(ScriptedRecognizer::default());
        let capture = SpeechCapture::new(Some(recognizer.clone()));
        capture.start_listening();
        assert!(capture.is_listening());
        capture.start_listening();
        recognizer.emit(RecognitionEvent::Start);
        capture.start_listening();

        let starts = recognizer.starts.lock().unwrap();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0], RecognizerSettings {
            lang: "en-US".into(),
            interim_results: false,
            continuous: false,
        });
        assert!(capture.is_listening());
    }

    #[test]
    fn results_join_top_alternatives_and_overwrite() {
        let recognizer = Arc::new(ScriptedRecognizer::default());
        let capture = SpeechCapture::new(Some(recognizer.clone()));
        capture.start_listening();

        recognizer.emit(
            RecognitionEvent::Result(vec![vec![alt("how long to "), alt("ignored")], vec![alt("boil eggs")]])
        );
        assert_eq!(capture.transcript(), "how long to boil eggs");

        recognizer.emit(RecognitionEvent::Result(vec![vec![alt("poach")], vec![]]));
        assert_eq!(capture.transcript(), "poach");

        recognizer.emit(RecognitionEvent::End);
        assert!(!capture.is_listening());

        capture.start_listening();
        assert_eq!(recognizer.starts.lock().unwrap().len(), 2);
    }

    #[test]
    fn failed_start_leaves_adapter_idle() {
        let capture = SpeechCapture::new(Some(Arc::new(BrokenRecognizer)));
        capture.start_listening();
        assert!(!capture.is_listening());
    }
}
