use super::config::SessionConfig;
use super::history::ChatHistory;
use super::stats::{ChatMessage, ConnectionStatus, SessionStats};
use super::tasks::{deliver_turns, pump_dialogue};
use crate::audio::WavBuffer;
use crate::nats::{DialogueClient, SessionSetup, TranscriptMessage};
use crate::playback::{FileSink, MemorySink, PlaybackSink};
use crate::turn::{run_turns, DialogueEvent, Turn, TurnStats};
use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Capacity of the in-order dialogue event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A voice chat session: transcripts go out as user turns, model replies come
/// back as turns with synthesized audio
pub struct ChatSession {
    /// Session configuration
    config: SessionConfig,

    /// NATS client for the dialogue stream and transcripts
    client: Arc<DialogueClient>,

    /// Where completed turns are handed for playback
    sink: Arc<dyn PlaybackSink>,

    /// When the session was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// Whether the session is currently open
    is_running: Arc<AtomicBool>,

    /// Conversation state
    history: Arc<Mutex<ChatHistory>>,

    /// Subscriber loops (dialogue stream, transcripts); aborted on stop
    listener_handles: Mutex<Vec<JoinHandle<()>>>,

    /// Handle for the turn reassembly task
    turn_task_handle: Mutex<Option<JoinHandle<Result<TurnStats>>>>,

    /// Handle for the turn delivery task
    delivery_task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ChatSession {
    /// Create a new chat session writing turn audio to the configured directory
    pub async fn new(config: SessionConfig) -> Result<Self> {
        let sink: Arc<dyn PlaybackSink> = match &config.output_dir {
            Some(dir) => Arc::new(FileSink::new(dir.clone(), config.session_id.clone())?),
            None => Arc::new(MemorySink::new()),
        };

        Self::with_sink(config, sink).await
    }

    /// Create a new chat session with an explicit playback sink
    pub async fn with_sink(config: SessionConfig, sink: Arc<dyn PlaybackSink>) -> Result<Self> {
        info!("Creating chat session: {}", config.session_id);

        let client = Arc::new(
            DialogueClient::connect(&config.nats_url, config.session_id.clone())
                .await
                .context("Failed to connect to NATS")?,
        );

        Ok(Self {
            config,
            client,
            sink,
            started_at: Utc::now(),
            is_running: Arc::new(AtomicBool::new(false)),
            history: Arc::new(Mutex::new(ChatHistory::new())),
            listener_handles: Mutex::new(Vec::new()),
            turn_task_handle: Mutex::new(None),
            delivery_task_handle: Mutex::new(None),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Open the dialogue session and start all tasks
    pub async fn start(&self) -> Result<()> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!("Session already started");
            return Ok(());
        }

        info!("Starting chat session: {}", self.config.session_id);
        self.set_status(ConnectionStatus::Connecting).await;

        match self.open().await {
            Ok(()) => {
                self.set_status(ConnectionStatus::Connected).await;
                info!("Chat session started successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to open chat session: {:#}", e);
                self.set_status(ConnectionStatus::Error).await;
                self.shutdown_tasks().await;
                self.is_running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn open(&self) -> Result<()> {
        let setup = SessionSetup {
            session_id: self.config.session_id.clone(),
            model: self.config.model.clone(),
            response_modalities: vec!["AUDIO".to_string()],
            voice_name: self.config.voice_name.clone(),
            system_instruction: self.config.system_instruction.clone(),
        };
        self.client.publish_setup(&setup).await?;

        let (event_tx, event_rx) = mpsc::channel::<DialogueEvent>(EVENT_CHANNEL_CAPACITY);
        let (turn_tx, turn_rx) = mpsc::channel::<Turn>(16);

        // Turn reassembly owns the accumulator; it is the only consumer of events
        {
            let mut handle = self.turn_task_handle.lock().await;
            *handle = Some(tokio::spawn(run_turns(event_rx, turn_tx)));
        }

        // Turn delivery: history update, then playback
        {
            let mut handle = self.delivery_task_handle.lock().await;
            *handle = Some(tokio::spawn(deliver_turns(
                turn_rx,
                Arc::clone(&self.history),
                Arc::clone(&self.sink),
            )));
        }

        // Dialogue stream listener
        let server_sub = self
            .client
            .subscribe_server()
            .await
            .context("Failed to subscribe to dialogue stream")?;

        let dialogue_task = tokio::spawn(pump_dialogue(
            server_sub.map(|msg| msg.payload),
            event_tx,
            Arc::clone(&self.history),
            Arc::clone(&self.is_running),
        ));
        self.listener_handles.lock().await.push(dialogue_task);

        // Speech transcript listener
        let mut transcript_sub = self
            .client
            .subscribe_transcripts()
            .await
            .context("Failed to subscribe to transcripts")?;

        let client = Arc::clone(&self.client);
        let history = Arc::clone(&self.history);
        let session_id = self.config.session_id.clone();

        let transcript_task = tokio::spawn(async move {
            info!("Transcript listener task started");

            while let Some(msg) = transcript_sub.next().await {
                match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                    Ok(transcript) => {
                        if !transcript.is_final_for(&session_id) {
                            continue;
                        }

                        if let Err(e) =
                            forward_transcript(&client, &history, transcript.text.trim()).await
                        {
                            error!("Failed to forward transcript: {:#}", e);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse transcript message: {}", e);
                    }
                }
            }

            info!("Transcript listener task stopped");
        });
        self.listener_handles.lock().await.push(transcript_task);

        Ok(())
    }

    /// Submit a user transcript as a new turn.
    ///
    /// Returns the recorded message, or `None` if the transcript was empty or
    /// the session is not connected.
    pub async fn submit_transcript(&self, text: &str) -> Result<Option<ChatMessage>> {
        forward_transcript(&self.client, &self.history, text.trim()).await
    }

    /// Close the session. Any turn still in progress is discarded.
    pub async fn stop(&self) -> Result<SessionStats> {
        if !self.is_running.load(Ordering::SeqCst) {
            warn!("Session not active");
            return Ok(self.get_stats().await);
        }

        info!("Stopping chat session: {}", self.config.session_id);

        self.shutdown_tasks().await;

        if let Err(e) = self.client.close().await {
            warn!("Failed to close dialogue client: {:#}", e);
        }

        self.set_status(ConnectionStatus::Disconnected).await;
        {
            let mut history = self.history.lock().await;
            history.is_processing = false;
        }
        self.is_running.store(false, Ordering::SeqCst);

        info!("Chat session stopped successfully");

        Ok(self.get_stats().await)
    }

    /// Abort the listeners, which closes the event channel and lets the turn
    /// and delivery tasks drain.
    async fn shutdown_tasks(&self) {
        {
            let mut handles = self.listener_handles.lock().await;
            for handle in handles.drain(..) {
                handle.abort();
                let _ = handle.await;
            }
        }

        {
            let mut handle = self.turn_task_handle.lock().await;
            if let Some(task) = handle.take() {
                match task.await {
                    Ok(Ok(stats)) => info!(
                        "Turn task finished: {} turns ({} with audio)",
                        stats.turns, stats.turns_with_audio
                    ),
                    Ok(Err(e)) => error!("Turn task failed: {:#}", e),
                    Err(e) => error!("Turn task panicked: {}", e),
                }
            }
        }

        {
            let mut handle = self.delivery_task_handle.lock().await;
            if let Some(task) = handle.take() {
                if let Err(e) = task.await {
                    error!("Delivery task panicked: {}", e);
                }
            }
        }
    }

    async fn set_status(&self, status: ConnectionStatus) {
        let mut history = self.history.lock().await;
        history.status = status;
    }

    /// Get current session statistics
    pub async fn get_stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let history = self.history.lock().await;

        SessionStats {
            session_id: self.config.session_id.clone(),
            status: history.status,
            is_processing: history.is_processing,
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            messages_count: history.messages().len(),
            turns_completed: history.turns_completed(),
            audio_failures: history.audio_failures(),
        }
    }

    /// Get the conversation so far
    pub async fn get_messages(&self) -> Vec<ChatMessage> {
        let history = self.history.lock().await;
        history.messages().to_vec()
    }

    /// Audio of the most recent model turn that had any
    pub async fn latest_audio(&self) -> Option<WavBuffer> {
        let history = self.history.lock().await;
        history.latest_audio().cloned()
    }
}

async fn forward_transcript(
    client: &DialogueClient,
    history: &Mutex<ChatHistory>,
    text: &str,
) -> Result<Option<ChatMessage>> {
    let message = {
        let mut history = history.lock().await;
        match history.record_user(text) {
            Some(message) => message,
            None => return Ok(None),
        }
    };

    info!("User: {}", message.text);

    if let Err(e) = client.send_client_content(text).await {
        let mut history = history.lock().await;
        history.is_processing = false;
        return Err(e);
    }

    Ok(Some(message))
}
