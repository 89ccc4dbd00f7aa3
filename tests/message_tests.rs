// Tests for the wire message vocabulary: inbound channel frames, the
// one-shot analysis response, and their mapping to presentation events.

use meeting_capture::{ActionItem, AnalysisResult, InboundMessage, UpdateEvent};
use serde_json::json;

#[test]
fn test_transcript_message_decoding() {
    let msg: InboundMessage =
        serde_json::from_str(r#"{"type":"transcript","data":"Hello world"}"#).unwrap();
    assert_eq!(msg, InboundMessage::Transcript(json!("Hello world")));
}

#[test]
fn test_action_items_payload_is_forwarded_verbatim() {
    let json = r#"{"type":"action_items","data":[{"task":"Send notes","owner":"Dana","deadline":"2025-11-03"}]}"#;
    let msg: InboundMessage = serde_json::from_str(json).unwrap();

    match msg {
        InboundMessage::ActionItems(payload) => {
            assert_eq!(payload[0]["task"], "Send notes");
            assert_eq!(payload[0]["owner"], "Dana");
        }
        other => panic!("Expected action_items, got {:?}", other),
    }
}

#[test]
fn test_error_message_carries_plain_string() {
    let msg: InboundMessage =
        serde_json::from_str(r#"{"type":"error","data":"Analysis failed: timeout"}"#).unwrap();
    assert_eq!(msg, InboundMessage::Error("Analysis failed: timeout".to_string()));
}

#[test]
fn test_unrecognized_type_decodes_to_unknown() {
    let msg: InboundMessage =
        serde_json::from_str(r#"{"type":"speaker_diarization","data":{"speakers":2}}"#).unwrap();
    assert_eq!(msg, InboundMessage::Unknown);
}

#[test]
fn test_unknown_message_produces_no_event() {
    assert_eq!(UpdateEvent::from_inbound(InboundMessage::Unknown), None);
}

#[test]
fn test_event_names_match_presentation_vocabulary() {
    assert_eq!(UpdateEvent::Transcript(json!("x")).name(), "transcript-update");
    assert_eq!(UpdateEvent::Summary(json!("x")).name(), "summary-update");
    assert_eq!(UpdateEvent::ActionItems(json!([])).name(), "action-items-update");
    assert_eq!(UpdateEvent::Error("boom".to_string()).name(), "error");
}

#[test]
fn test_event_payload_is_unchanged() {
    let payload = json!({"text": "final transcript", "confidence": 0.9});
    let event = UpdateEvent::from_inbound(InboundMessage::Transcript(payload.clone())).unwrap();
    assert_eq!(event.payload(), payload);
}

#[test]
fn test_analysis_result_deserialization() {
    let json = r#"{
        "summary": "Discussed Q4 roadmap.",
        "action_items": [
            {"task": "Draft the plan", "owner": "Sam", "deadline": "2025-11-07"},
            {"task": "Book the review", "owner": "Unassigned", "deadline": "Not specified"}
        ]
    }"#;

    let result: AnalysisResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.summary, "Discussed Q4 roadmap.");
    assert_eq!(result.transcript, None);
    assert_eq!(result.action_items.len(), 2);
    assert_eq!(
        result.action_items[0],
        ActionItem {
            task: "Draft the plan".to_string(),
            owner: "Sam".to_string(),
            deadline: "2025-11-07".to_string(),
        }
    );
}

#[test]
fn test_analysis_result_with_transcript_field() {
    let json = r#"{"transcript": "full text", "summary": "short", "action_items": []}"#;
    let result: AnalysisResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.transcript.as_deref(), Some("full text"));
}
