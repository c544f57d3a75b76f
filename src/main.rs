use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use voxdesk_audio::{rms, AudioIo, DeviceManager};
use voxdesk_core::{deadline_after, AppConfig, AudioConfig, AudioFrame};
use voxdesk_intent::{ClassificationResult, IntentClassifier};
use voxdesk_speech::{HttpTransport, SpeechClient, SpeechSynthesizer, Transport};

const DEFAULT_CONFIG: &str = "config.toml";
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];
const FAREWELL: &str =
    "Thank you for using Admission Assistant. Good luck with your application!";
const GREETING: &str = "Hello! Ask me about admission requirements, deadlines, fees, \
                        the application process, or required documents.";
const EMPTY_PROMPT: &str = "Please ask me something about admissions.";

#[derive(Parser)]
#[command(name = "voxdesk", about = "Voice-query admissions assistant")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer spoken questions, one per press of Enter (default)
    Listen {
        /// Handle a single question and exit
        #[arg(long)]
        once: bool,
    },
    /// Type questions instead of speaking them
    Chat {
        /// Also speak each reply through the TTS service
        #[arg(long)]
        speak: bool,
    },
    /// Classify one question and print the reply
    Ask {
        #[arg(required = true)]
        text: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List audio devices
    Devices,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    match cli.command.unwrap_or(Command::Listen { once: false }) {
        Command::Listen { once } => listen(&config, once),
        Command::Chat { speak } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            if speak {
                let transport = HttpTransport::new(&config.speech)?;
                let tts = SpeechSynthesizer::new(&transport, &config.speech.endpoint)?;
                let mut audio = AudioIo::open_output(&DeviceManager::new(), &config.audio)
                    .context("failed to open audio output")?;
                chat(stdin.lock(), stdout.lock(), |reply| {
                    if let Err(e) = tts.request_and_play(reply, &mut audio) {
                        tracing::warn!(error = %e, "could not speak reply");
                    }
                    audio.flush_playback();
                })
            } else {
                chat(stdin.lock(), stdout.lock(), |_| {})
            }
        }
        Command::Ask { text, json } => {
            let text = text.join(" ");
            let result = IntentClassifier::new().classify(&text);
            let reply = result.category.response();
            if json {
                let out = serde_json::json!({
                    "text": text,
                    "category": result.category,
                    "confidence": result.confidence,
                    "response": reply,
                });
                println!("{out}");
            } else {
                println!("{} ({:.2}): {}", result.category, result.confidence, reply);
            }
            Ok(())
        }
        Command::Devices => list_devices(),
    }
}

/// A missing default config file means "use defaults"; an explicit path must exist.
fn load_config(path: &Path) -> Result<AppConfig> {
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        return Ok(AppConfig::default());
    }
    AppConfig::load_from_file(path)
        .with_context(|| format!("failed to load config from {:?}", path))
}

fn list_devices() -> Result<()> {
    let devices = DeviceManager::new();
    println!("Input devices:");
    for (name, _) in devices.list_input_devices()? {
        println!("  - {name}");
    }
    println!("Output devices:");
    for (name, _) in devices.list_output_devices()? {
        println!("  - {name}");
    }
    Ok(())
}

fn listen(config: &AppConfig, once: bool) -> Result<()> {
    let transport = HttpTransport::new(&config.speech)?;
    let mut stt = SpeechClient::new(&transport, &config.speech.endpoint)?;
    let tts = SpeechSynthesizer::new(&transport, &config.speech.endpoint)?;
    let classifier = IntentClassifier::new();
    let mut audio = AudioIo::open(&DeviceManager::new(), &config.audio)
        .context("failed to open audio interface")?;

    tracing::info!(endpoint = %config.speech.endpoint, "voxdesk ready");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("Press Enter and ask your question (Ctrl-D to quit)");
        match lines.next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e).context("failed to read stdin"),
            None => break,
        }

        match run_turn(&mut audio, &mut stt, &classifier, &config.audio) {
            Ok(turn) => {
                if turn.failed_chunks > 0 {
                    tracing::warn!(
                        sent = turn.chunks,
                        failed = turn.failed_chunks,
                        "some audio never reached the recognizer"
                    );
                }
                println!("You: {}", turn.transcript);
                println!("Intent: {} ({:.2})", turn.result.category, turn.result.confidence);
                println!("Assistant: {}", turn.reply);
                if let Err(e) = tts.request_and_play(turn.reply, &mut audio) {
                    tracing::warn!(error = %e, "could not speak reply");
                }
                audio.flush_playback();
            }
            Err(e) => tracing::warn!("turn failed: {e:#}"),
        }

        if once {
            break;
        }
    }

    tracing::info!("shutting down");
    Ok(())
}

struct Turn {
    transcript: String,
    result: ClassificationResult,
    reply: &'static str,
    chunks: usize,
    failed_chunks: usize,
}

/// Record one utterance for the configured listen duration, stream it to the
/// recognizer and pick a reply.
fn run_turn<T: Transport>(
    audio: &mut AudioIo,
    stt: &mut SpeechClient<T>,
    classifier: &IntentClassifier,
    config: &AudioConfig,
) -> Result<Turn> {
    audio.discard_pending_capture();
    stt.begin_stream().context("failed to open STT session")?;

    let deadline = deadline_after(config.listen_duration());
    let mut frame = AudioFrame::new();
    let mut peak = 0.0f32;
    let mut failed_chunks = 0usize;
    while Instant::now() < deadline {
        if audio.read_samples(&mut frame, config.frame_timeout()) == 0 {
            continue;
        }
        peak = peak.max(rms(&frame));
        if let Err(e) = stt.push_audio(&frame) {
            failed_chunks += 1;
            tracing::warn!(error = %e, "dropping audio chunk");
        }
    }

    let dropped = audio.status().take_dropped();
    if dropped > 0 {
        tracing::warn!(samples = dropped, "capture overran while uploading");
    }
    let chunks = stt.chunks_sent();
    tracing::debug!(chunks, failed_chunks, peak_rms = peak, "utterance captured");

    let transcript = stt.end_stream().context("speech recognition failed")?;
    let result = classifier.classify(&transcript);
    let reply = result.category.response();
    tracing::info!(
        category = %result.category,
        confidence = result.confidence,
        "answering"
    );

    Ok(Turn {
        transcript,
        result,
        reply,
        chunks,
        failed_chunks,
    })
}

/// Text-only conversation: one question per line until EOF or an exit word.
fn chat<R, W, F>(input: R, mut output: W, mut speak: F) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str),
{
    let classifier = IntentClassifier::new();
    writeln!(output, "{GREETING}")?;
    writeln!(output, "Type 'exit' to quit.")?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let query = line.trim();

        if EXIT_WORDS.contains(&query.to_lowercase().as_str()) {
            writeln!(output, "Assistant: {FAREWELL}")?;
            speak(FAREWELL);
            break;
        }
        if query.is_empty() {
            writeln!(output, "Assistant: {EMPTY_PROMPT}")?;
            continue;
        }

        let result = classifier.classify(query);
        let reply = result.category.response();
        writeln!(output, "Assistant: {reply}")?;
        speak(reply);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::Producer;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::time::Duration;
    use voxdesk_audio::create_ring_buffer;
    use voxdesk_core::{SessionState, SpeechError, FRAME_SAMPLES};
    use voxdesk_intent::Category;
    use voxdesk_speech::{HttpRequest, HttpResponse};

    /// Accepts every chunk and answers the finish request with a fixed transcript.
    struct FakeRecognizer {
        transcript: &'static str,
        chunks: Cell<usize>,
    }

    impl Transport for FakeRecognizer {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, SpeechError> {
            if request.url.ends_with("/stt/chunk") {
                self.chunks.set(self.chunks.get() + 1);
                Ok(HttpResponse::new(200, Cursor::new(Vec::<u8>::new())))
            } else if request.url.ends_with("/stt/finish") {
                Ok(HttpResponse::new(200, Cursor::new(self.transcript.as_bytes().to_vec())))
            } else {
                Ok(HttpResponse::new(404, Cursor::new(Vec::<u8>::new())))
            }
        }
    }

    fn run_chat(input: &str) -> (String, Vec<String>) {
        let mut output = Vec::new();
        let mut spoken = Vec::new();
        chat(Cursor::new(input.to_string()), &mut output, |reply| {
            spoken.push(reply.to_string())
        })
        .unwrap();
        (String::from_utf8(output).unwrap(), spoken)
    }

    #[test]
    fn test_chat_answers_until_exit() {
        let (output, spoken) = run_chat("what is the deadline\n\nBYE\nhello\n");
        assert!(output.contains("Assistant: The admission deadline is March 31st, 2026."));
        assert!(output.contains(EMPTY_PROMPT));
        assert!(output.ends_with(&format!("Assistant: {FAREWELL}\n")));
        assert_eq!(
            spoken,
            vec![Category::Deadline.response().to_string(), FAREWELL.to_string()]
        );
    }

    #[test]
    fn test_chat_unknown_question_gets_fallback() {
        let (output, _) = run_chat("asdkjasd\n");
        assert!(output.contains(voxdesk_intent::FALLBACK_RESPONSE));
    }

    #[test]
    fn test_load_config_missing_default_uses_defaults() {
        // Tests run from the package root, which ships no config.toml
        let config = load_config(Path::new(DEFAULT_CONFIG)).unwrap();
        assert_eq!(config.speech.endpoint, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_load_config_missing_explicit_path_fails() {
        assert!(load_config(Path::new("/nonexistent/voxdesk.toml")).is_err());
    }

    #[test]
    fn test_run_turn_skips_stale_audio_and_classifies() {
        let (mut mic, cap_cons) = create_ring_buffer(FRAME_SAMPLES * 8);
        let mut audio = AudioIo::from_ring_buffers(cap_cons, None);
        let recognizer = FakeRecognizer {
            transcript: "How much is the application fee?",
            chunks: Cell::new(0),
        };
        let mut stt = SpeechClient::new(&recognizer, "http://stt.local").unwrap();
        let config = AudioConfig {
            listen_duration_ms: 60,
            frame_timeout_ms: 5,
            ..AudioConfig::default()
        };

        // Audio captured before the turn started is discarded
        mic.push_slice(&[9; FRAME_SAMPLES * 8]);
        let turn = run_turn(&mut audio, &mut stt, &IntentClassifier::new(), &config).unwrap();

        assert_eq!(turn.transcript, "How much is the application fee?");
        assert_eq!(turn.result.category, Category::Fee);
        assert_eq!(turn.reply, Category::Fee.response());
        assert_eq!(turn.chunks, 0);
        assert_eq!(turn.failed_chunks, 0);
        assert_eq!(recognizer.chunks.get(), 0);
        assert_eq!(stt.state(), SessionState::Idle);
    }

    #[test]
    fn test_run_turn_uploads_live_audio() {
        let (mut mic, cap_cons) = create_ring_buffer(FRAME_SAMPLES * 8);
        let mut audio = AudioIo::from_ring_buffers(cap_cons, None);
        let recognizer = FakeRecognizer {
            transcript: "hello",
            chunks: Cell::new(0),
        };
        let mut stt = SpeechClient::new(&recognizer, "http://stt.local").unwrap();
        let config = AudioConfig {
            listen_duration_ms: 300,
            frame_timeout_ms: 5,
            ..AudioConfig::default()
        };

        let driver = std::thread::spawn(move || {
            for _ in 0..10 {
                std::thread::sleep(Duration::from_millis(10));
                mic.push_slice(&[100; FRAME_SAMPLES]);
            }
        });

        let turn = run_turn(&mut audio, &mut stt, &IntentClassifier::new(), &config).unwrap();
        driver.join().unwrap();

        assert_eq!(turn.result.category, Category::Greeting);
        assert!(turn.chunks >= 1);
        assert_eq!(turn.failed_chunks, 0);
        assert_eq!(turn.chunks, recognizer.chunks.get());
    }

    #[test]
    fn test_run_turn_finish_failure_is_an_error() {
        let (_mic, cap_cons) = create_ring_buffer(FRAME_SAMPLES);
        let mut audio = AudioIo::from_ring_buffers(cap_cons, None);
        let recognizer = FakeRecognizer {
            transcript: "   ",
            chunks: Cell::new(0),
        };
        let mut stt = SpeechClient::new(&recognizer, "http://stt.local").unwrap();
        let config = AudioConfig {
            listen_duration_ms: 10,
            frame_timeout_ms: 5,
            ..AudioConfig::default()
        };

        assert!(run_turn(&mut audio, &mut stt, &IntentClassifier::new(), &config).is_err());
        assert_eq!(stt.state(), SessionState::Idle);
    }
}
