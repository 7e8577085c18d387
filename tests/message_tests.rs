use live_agent_voice::nats::messages::{
    ClientContent, ClientTurn, ServerMessage, SessionSetup, TranscriptMessage,
};
use live_agent_voice::session::{ChatHistory, ConnectionStatus, Role};
use live_agent_voice::turn::{DialogueEvent, Fragment, TurnAccumulator};

#[test]
fn test_server_text_part() {
    let json = r#"{
        "serverContent": {
            "modelTurn": { "parts": [{ "text": "Welcome to Triveni Express" }] }
        }
    }"#;

    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    let events = msg.into_events();

    assert_eq!(
        events,
        vec![DialogueEvent::Fragment(Fragment::text("Welcome to Triveni Express"))]
    );
}

#[test]
fn test_server_audio_part() {
    let json = r#"{
        "serverContent": {
            "modelTurn": {
                "parts": [{ "inlineData": { "data": "AAAA", "mimeType": "audio/pcm;rate=24000" } }]
            }
        }
    }"#;

    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    let events = msg.into_events();

    assert_eq!(
        events,
        vec![DialogueEvent::Fragment(Fragment::audio(
            "AAAA",
            Some("audio/pcm;rate=24000".to_string())
        ))]
    );
}

#[test]
fn test_server_turn_complete_after_content() {
    let json = r#"{
        "serverContent": {
            "modelTurn": { "parts": [{ "text": "Bye" }] },
            "turnComplete": true
        }
    }"#;

    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    let events = msg.into_events();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], DialogueEvent::Fragment(Fragment::text("Bye")));
    assert_eq!(events[1], DialogueEvent::TurnComplete);
}

#[test]
fn test_server_only_first_part_is_read() {
    let json = r#"{
        "serverContent": {
            "modelTurn": { "parts": [{ "text": "first" }, { "text": "second" }] }
        }
    }"#;

    let msg: ServerMessage = serde_json::from_str(json).unwrap();
    assert_eq!(
        msg.into_events(),
        vec![DialogueEvent::Fragment(Fragment::text("first"))]
    );
}

#[test]
fn test_server_message_without_content() {
    let msg: ServerMessage = serde_json::from_str(r#"{ "setupComplete": {} }"#).unwrap();
    assert!(msg.into_events().is_empty());

    let msg: ServerMessage =
        serde_json::from_str(r#"{ "serverContent": { "turnComplete": true } }"#).unwrap();
    assert_eq!(msg.into_events(), vec![DialogueEvent::TurnComplete]);
}

#[test]
fn test_server_stream_into_accumulator() {
    let lines = [
        r#"{"serverContent":{"modelTurn":{"parts":[{"text":"Hello"}]}}}"#,
        r#"{"serverContent":{"modelTurn":{"parts":[{"inlineData":{"data":"AAAA"}}]}}}"#,
        r#"{"serverContent":{"modelTurn":{"parts":[{"text":" world"}]}}}"#,
        r#"{"serverContent":{"turnComplete":true}}"#,
    ];

    let mut acc = TurnAccumulator::new();
    let mut turns = Vec::new();
    for line in lines {
        let msg: ServerMessage = serde_json::from_str(line).unwrap();
        for event in msg.into_events() {
            turns.extend(acc.apply(event));
        }
    }

    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].text, "Hello world");
    assert_eq!(turns[0].audio.as_ref().map(|a| a.len()), Some(47));
}

#[test]
fn test_client_content_serialization() {
    let msg = ClientContent {
        session_id: "chat-1".to_string(),
        turns: vec![ClientTurn {
            text: "Do you have vegetarian biryani?".to_string(),
        }],
        timestamp: "2025-10-27T14:30:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"turns\":[{\"text\":\"Do you have vegetarian biryani?\"}]"));

    let deserialized: ClientContent = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.session_id, "chat-1");
    assert_eq!(deserialized.turns.len(), 1);
}

#[test]
fn test_session_setup_serialization() {
    let setup = SessionSetup {
        session_id: "chat-1".to_string(),
        model: "models/gemini-2.5-flash-preview-native-audio-dialog".to_string(),
        response_modalities: vec!["AUDIO".to_string()],
        voice_name: "Zephyr".to_string(),
        system_instruction: "Be brief.".to_string(),
    };

    let json = serde_json::to_string(&setup).unwrap();
    assert!(json.contains("\"voice_name\":\"Zephyr\""));
    assert!(json.contains("\"response_modalities\":[\"AUDIO\"]"));
}

#[test]
fn test_transcript_deserialization() {
    let json = r#"{
        "session_id": "chat-1",
        "text": "Table for two at seven",
        "partial": false,
        "timestamp": "2025-10-27T14:30:05Z",
        "confidence": 0.95
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.session_id, "chat-1");
    assert_eq!(msg.text, "Table for two at seven");
    assert!(!msg.partial);
    assert_eq!(msg.confidence, Some(0.95));
}

#[test]
fn test_transcript_no_confidence() {
    let json = r#"{
        "session_id": "chat-1",
        "text": "No confidence score",
        "partial": true,
        "timestamp": "2025-10-27T14:30:05Z"
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert!(msg.partial);
    assert_eq!(msg.confidence, None);
}

fn transcript(session_id: &str, partial: bool) -> TranscriptMessage {
    TranscriptMessage {
        session_id: session_id.to_string(),
        text: "Table for two at seven".to_string(),
        partial,
        timestamp: "2025-10-27T14:30:05Z".to_string(),
        confidence: None,
    }
}

#[test]
fn test_transcript_final_for_own_session() {
    assert!(transcript("chat-1", false).is_final_for("chat-1"));
}

#[test]
fn test_transcript_partial_is_not_final() {
    assert!(!transcript("chat-1", true).is_final_for("chat-1"));
}

#[test]
fn test_transcript_for_other_session_is_ignored() {
    assert!(!transcript("chat-2", false).is_final_for("chat-1"));
    assert!(!transcript("chat-2", true).is_final_for("chat-1"));
}

#[test]
fn test_live_statuses() {
    assert!(ConnectionStatus::Connecting.is_live());
    assert!(ConnectionStatus::Connected.is_live());
    assert!(!ConnectionStatus::Disconnected.is_live());
    assert!(!ConnectionStatus::Error.is_live());
}

#[test]
fn test_history_mark_closed_clears_processing() {
    let mut history = ChatHistory::new();
    history.status = ConnectionStatus::Connected;
    history.record_user("hello").unwrap();
    assert!(history.is_processing);

    history.mark_closed(ConnectionStatus::Disconnected);

    assert_eq!(history.status, ConnectionStatus::Disconnected);
    assert!(!history.is_processing);
    assert!(history.record_user("still there?").is_none());
    assert_eq!(history.messages().len(), 1);
}

#[test]
fn test_history_ignores_input_while_disconnected() {
    let mut history = ChatHistory::new();
    assert_eq!(history.status, ConnectionStatus::Disconnected);

    assert!(history.record_user("hello").is_none());
    assert!(history.messages().is_empty());
    assert!(!history.is_processing);
}

#[test]
fn test_history_ignores_empty_transcript() {
    let mut history = ChatHistory::new();
    history.status = ConnectionStatus::Connected;

    assert!(history.record_user("").is_none());
    assert!(!history.is_processing);
}

#[test]
fn test_history_user_then_model_turn() {
    let mut history = ChatHistory::new();
    history.status = ConnectionStatus::Connected;

    let user = history.record_user("What are your hours?").unwrap();
    assert_eq!(user.role, Role::User);
    assert!(history.is_processing);

    let mut acc = TurnAccumulator::new();
    acc.on_fragment(Fragment::text("We open at eleven."));
    acc.on_fragment(Fragment::audio("AAAA", None));
    let turn = acc.on_turn_complete();

    let model = history.complete_turn(&turn);
    assert_eq!(model.role, Role::Model);
    assert_eq!(model.text, "We open at eleven.");
    assert!(model.id > user.id);
    assert!(!history.is_processing);

    assert_eq!(history.messages().len(), 2);
    assert_eq!(history.turns_completed(), 1);
    assert_eq!(history.latest_audio().map(|a| a.len()), Some(47));
}

#[test]
fn test_history_keeps_last_audio_over_text_only_turn() {
    let mut history = ChatHistory::new();
    history.status = ConnectionStatus::Connected;

    let mut acc = TurnAccumulator::new();
    acc.on_fragment(Fragment::audio("AAAA", None));
    history.complete_turn(&acc.on_turn_complete());

    acc.on_fragment(Fragment::text("text only"));
    acc.on_fragment(Fragment::audio("????", None));
    history.complete_turn(&acc.on_turn_complete());

    assert!(history.latest_audio().is_some());
    assert_eq!(history.turns_completed(), 2);
    assert_eq!(history.audio_failures(), 1);
}
