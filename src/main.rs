use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use live_agent_voice::{
    create_router, run_turns, synthesize, AppState, AudioFile, Config, FileSink, PlaybackSink,
    ServerMessage, SessionConfig,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "live-agent-voice")]
#[command(about = "Voice chat client for a streaming dialogue model")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Config file, without extension
        #[arg(short, long, default_value = "config/live-agent-voice")]
        config: String,
    },

    /// Convert base64 PCM chunks (one per line) into a WAV file
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Raw PCM MIME type
        #[arg(short, long, default_value = "audio/L16;rate=24000")]
        mime: String,
    },

    /// Replay recorded dialogue messages (JSON lines) into turn WAV files
    Replay {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "recordings/replay")]
        output_dir: PathBuf,
    },

    /// Print the format of a WAV file
    Inspect { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve {
        config: "config/live-agent-voice".to_string(),
    }) {
        Command::Serve { config } => serve(&config).await,
        Command::Convert {
            input,
            output,
            mime,
        } => convert(&input, &output, &mime).await,
        Command::Replay { input, output_dir } => replay(&input, output_dir).await,
        Command::Inspect { path } => {
            let audio = AudioFile::open(&path)?;
            info!("Duration: {:.2} seconds", audio.duration_seconds);
            info!("Sample rate: {} Hz", audio.sample_rate);
            info!("Channels: {}", audio.channels);
            info!("Bits per sample: {}", audio.bits_per_sample);
            Ok(())
        }
    }
}

async fn serve(config_path: &str) -> Result<()> {
    let cfg = Config::load(config_path)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Dialogue stream via {} (model {})", cfg.dialogue.nats_url, cfg.dialogue.model);
    info!("Turn audio directory: {}", cfg.audio.output_dir);

    let state = AppState::new(SessionConfig::from_app_config(&cfg));
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}

async fn convert(input: &Path, output: &Path, mime: &str) -> Result<()> {
    let contents = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {:?}", input))?;

    let chunks: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let wav = synthesize(&chunks, mime).context("Failed to synthesize WAV")?;

    tokio::fs::write(output, wav.as_bytes())
        .await
        .with_context(|| format!("Failed to write {:?}", output))?;

    info!(
        "Wrote {:?}: {} chunks, {} bytes, {:.2}s",
        output,
        chunks.len(),
        wav.len(),
        wav.duration_secs()
    );

    Ok(())
}

async fn replay(input: &Path, output_dir: PathBuf) -> Result<()> {
    let contents = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {:?}", input))?;

    let prefix = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "replay".to_string());
    let sink = FileSink::new(output_dir, prefix)?;

    let (event_tx, event_rx) = mpsc::channel(256);
    let (turn_tx, mut turn_rx) = mpsc::channel(16);
    let turn_task = tokio::spawn(run_turns(event_rx, turn_tx));

    let feeder = tokio::spawn(async move {
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ServerMessage>(line) {
                Ok(message) => {
                    for event in message.into_events() {
                        if event_tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("Skipping line {}: {}", line_no + 1, e),
            }
        }
    });

    while let Some(turn) = turn_rx.recv().await {
        info!("Model: {}", turn.text);
        sink.play(&turn).await?;
    }

    feeder.await.context("Replay feeder panicked")?;
    let stats = turn_task.await.context("Turn task panicked")??;

    info!(
        "Replay complete: {} turns, {} with audio, {} audio failures",
        stats.turns, stats.turns_with_audio, stats.audio_failures
    );
    if stats.discarded_partial {
        warn!("Recording ended mid-turn; the partial turn was discarded");
    }

    Ok(())
}
