use log::info;
use std::process::Stdio;
use tokio::process::Command;
use super::{ Alternative, EventSink, RecognitionEvent, Recognizer, RecognizerSettings, SpeechError };

/// Runs an external speech-to-text program once per activation and reports
/// its stdout as a single utterance. The recognizer settings are exported to
/// the program as `SPEECH_LANG`, `SPEECH_INTERIM` and `SPEECH_CONTINUOUS`.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// Splits `command_line` on whitespace. `None` when it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }
}

impl Recognizer for CommandRecognizer {
    fn start(&self, settings: &RecognizerSettings, sink: EventSink) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .env("SPEECH_LANG", &settings.lang)
            .env("SPEECH_INTERIM", settings.interim_results.to_string())
            .env("SPEECH_CONTINUOUS", settings.continuous.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        info!("Listening via {}", self.program);
        sink(RecognitionEvent::Start);

        tokio::spawn(async move {
            match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !transcript.is_empty() {
                        sink(
                            RecognitionEvent::Result(
                                vec![vec![Alternative { transcript, confidence: None }]]
                            )
                        );
                    }
                }
                Ok(output) => {
                    sink(RecognitionEvent::Error(format!("recognizer exited with {}", output.status)));
                }
                Err(e) => sink(RecognitionEvent::Error(e.to_string())),
            }
            sink(RecognitionEvent::End);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SpeechCapture;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn blank_command_is_unsupported() {
        assert!(CommandRecognizer::parse("   ").is_none());
        let recognizer = CommandRecognizer::parse("listen --once").unwrap();
        assert_eq!(recognizer.program, "listen");
        assert_eq!(recognizer.args, vec!["--once".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn program_output_becomes_transcript() {
        let recognizer = CommandRecognizer::parse("echo  chop the onions ").unwrap();
        let capture = SpeechCapture::new(Some(Arc::new(recognizer)));
        capture.start_listening();
        assert!(capture.is_listening());

        for _ in 0..100 {
            if !capture.is_listening() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!capture.is_listening());
        assert_eq!(capture.transcript(), "chop the onions");
    }
}
