use anyhow::{Context, Result};
use async_nats::Client;
use tracing::info;

use super::messages::{ClientContent, ClientTurn, SessionSetup};

/// Subject carrying finalized speech-recognition transcripts
pub const TRANSCRIPT_SUBJECT: &str = "stt.text.final";

pub struct DialogueClient {
    client: Client,
    session_id: String,
}

impl DialogueClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn setup_subject(&self) -> String {
        format!("dialogue.setup.{}", self.session_id)
    }

    pub fn client_subject(&self) -> String {
        format!("dialogue.client.{}", self.session_id)
    }

    pub fn server_subject(&self) -> String {
        format!("dialogue.server.{}", self.session_id)
    }

    /// Publish the model configuration for this session
    pub async fn publish_setup(&self, setup: &SessionSetup) -> Result<()> {
        let subject = self.setup_subject();
        let payload = serde_json::to_vec(setup)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish session setup")?;

        info!("Published session setup to {} (model={})", subject, setup.model);

        Ok(())
    }

    /// Submit a user transcript as a new turn
    pub async fn send_client_content(&self, text: &str) -> Result<()> {
        let subject = self.client_subject();

        let message = ClientContent {
            session_id: self.session_id.clone(),
            turns: vec![ClientTurn {
                text: text.to_string(),
            }],
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish client content")?;

        info!("Sent user turn to {} ({} chars)", subject, text.len());

        Ok(())
    }

    /// Subscribe to model output for this session
    pub async fn subscribe_server(&self) -> Result<async_nats::Subscriber> {
        let subject = self.server_subject();

        info!("Subscribing to dialogue stream on {}", subject);

        self.client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to dialogue stream")
    }

    /// Subscribe to finalized transcripts.
    /// Filtering by session_id happens on the message payload.
    pub async fn subscribe_transcripts(&self) -> Result<async_nats::Subscriber> {
        info!("Subscribing to transcripts on {}", TRANSCRIPT_SUBJECT);

        self.client
            .subscribe(TRANSCRIPT_SUBJECT)
            .await
            .context("Failed to subscribe to transcripts")
    }

    /// Flush pending publishes and close the connection
    pub async fn close(&self) -> Result<()> {
        info!("Closing NATS connection");
        self.client
            .flush()
            .await
            .context("Failed to flush NATS connection")?;
        Ok(())
    }
}
