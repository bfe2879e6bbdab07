//! Dispatch loop tests, driven through in-memory channels.

use std::sync::Arc;
use std::time::Duration;

use console_types::{
    channel, DecodedValue, EventSender, Level, MemorySink, Message, Notification, SourceError,
    TopicPartition,
};
use decoders::{AvroDecoder, DecodeError, Decoder, JsonDecoder};
use dispatch::{Dispatcher, ShutdownHandle, Summary};

fn start(sink: &Arc<MemorySink>) -> (EventSender, ShutdownHandle) {
    let (sender, source) = channel(16);
    let decoder = JsonDecoder::new(sink.clone());
    let dispatcher = Dispatcher::new(decoder, "", sink.clone()).unwrap();
    (sender, dispatcher.serve(source))
}

/// Poll the sink until `predicate` holds, failing after a second.
async fn wait_for(sink: &MemorySink, predicate: impl Fn(&[String]) -> bool) {
    for _ in 0..100 {
        if predicate(&sink.messages()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met, log was: {:#?}", sink.messages());
}

/// Wait for the loop to stop on its own (all channels closed) and collect
/// its summary. Sending the stop signal first would pre-empt queued events.
async fn finish(mut handle: ShutdownHandle) -> Summary {
    tokio::time::timeout(Duration::from_secs(1), handle.stopped())
        .await
        .unwrap();
    handle.shutdown().await.unwrap()
}

fn info_lines(sink: &MemorySink) -> Vec<String> {
    sink.at_level(Level::INFO)
}

#[tokio::test]
async fn test_message_lines_in_order() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);

    sender
        .messages
        .send(Message::new(7, br#"{"a":1}"#.to_vec()))
        .await
        .unwrap();
    drop(sender);

    let summary = finish(handle).await;
    assert_eq!(summary.processed, 1);

    let info = info_lines(&sink);
    assert_eq!(info[0], "Offset: 7");
    assert_eq!(info[1], "Headers:");
    assert_eq!(info[2], "Message: {\n     \"a\": 1\n}");
}

#[tokio::test]
async fn test_headers_logged_before_decode() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);

    let message = Message::new(3, b"{}".to_vec())
        .with_topic("events", 0)
        .with_header("trace-id", "abc")
        .with_header(b"source".to_vec(), b"unit".to_vec());
    sender.messages.send(message).await.unwrap();
    wait_for(&sink, |log| log.iter().any(|l| l.starts_with("Message: "))).await;

    handle.shutdown().await.unwrap();

    let log = sink.messages();
    let position = |needle: &str| log.iter().position(|l| l == needle).unwrap();
    assert!(position("Offset: 3") < position("Headers:"));
    assert!(position("Headers:") < position("\ttrace-id: abc"));
    assert!(position("\ttrace-id: abc") < position("\tsource: unit"));
    assert!(position("\tsource: unit") < position("Message: {}"));
}

#[tokio::test]
async fn test_decode_failure_does_not_block_next_message() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);

    sender.messages.send(Message::new(1, Vec::new())).await.unwrap();
    sender
        .messages
        .send(Message::new(2, br#"{"ok":true}"#.to_vec()))
        .await
        .unwrap();
    drop(sender);

    let summary = finish(handle).await;
    assert_eq!(
        summary,
        Summary {
            processed: 2,
            failed: 1,
            errors: 0,
            notifications: 0
        }
    );

    let errors = sink.at_level(Level::ERROR);
    assert_eq!(errors, vec!["Error decoding message: invalid JSON, payload is empty"]);

    let info = info_lines(&sink);
    let second_offset = info.iter().position(|l| l == "Offset: 2").unwrap();
    assert_eq!(info[second_offset + 2], "Message: {\n     \"ok\": true\n}");
}

#[tokio::test]
async fn test_formatting_failure_is_logged_and_skipped() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);

    sender.messages.send(Message::new(1, b"{oops".to_vec())).await.unwrap();
    sender.messages.send(Message::new(2, b"[]".to_vec())).await.unwrap();
    drop(sender);

    let summary = finish(handle).await;
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(sink.at_level(Level::ERROR).len(), 1);
    assert!(info_lines(&sink).contains(&"Message: []".to_string()));
}

#[tokio::test]
async fn test_errors_and_notifications_logged() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);

    sender
        .errors
        .send(SourceError::new("broker down"))
        .await
        .unwrap();
    sender
        .notifications
        .send(Notification::Assigned(vec![TopicPartition {
            topic: "events".to_string(),
            partition: 2,
        }]))
        .unwrap();
    drop(sender);

    let summary = finish(handle).await;
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.notifications, 1);
    assert_eq!(summary.processed, 0);

    assert_eq!(sink.at_level(Level::ERROR), vec!["Error: broker down"]);
    let warnings = sink.at_level(Level::WARN);
    assert!(warnings
        .iter()
        .any(|l| l.starts_with("Rebalanced: Assigned(") && l.contains("\"events\"")));
}

#[tokio::test]
async fn test_shutdown_emits_single_summary() {
    let sink = Arc::new(MemorySink::new());
    let (_sender, handle) = start(&sink);

    let summary = handle.shutdown().await.unwrap();
    assert_eq!(summary, Summary::default());

    let summaries: Vec<_> = sink
        .messages()
        .into_iter()
        .filter(|l| l.starts_with("Processed a total of"))
        .collect();
    assert_eq!(summaries, vec!["Processed a total of 0 messages."]);
}

#[tokio::test]
async fn test_pending_shutdown_wins_over_queued_messages() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);

    // The spawned loop hasn't been polled yet on this single-threaded
    // runtime, so both the messages and the stop signal are already queued
    // when it first looks.
    for offset in 0..3 {
        sender
            .messages
            .try_send(Message::new(offset, b"{}".to_vec()))
            .unwrap();
    }

    let summary = handle.shutdown().await.unwrap();
    assert_eq!(summary.processed, 0);
    assert!(!sink.messages().iter().any(|l| l.starts_with("Offset:")));

    // The loop dropped its receivers on the way out.
    assert!(sender.messages.try_send(Message::new(9, b"{}".to_vec())).is_err());
}

#[tokio::test]
async fn test_closed_message_channel_keeps_other_sources() {
    let sink = Arc::new(MemorySink::new());
    let (sender, handle) = start(&sink);
    let console_types::EventSender {
        messages,
        errors,
        notifications,
    } = sender;

    drop(messages);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!handle.is_finished());

    errors.send(SourceError::new("still here")).await.unwrap();
    wait_for(&sink, |log| log.iter().any(|l| l == "Error: still here")).await;

    notifications.send(Notification::Failed("reason".into())).unwrap();
    wait_for(&sink, |log| log.iter().any(|l| l.starts_with("Rebalanced: Failed"))).await;

    let summary = handle.shutdown().await.unwrap();
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.notifications, 1);
}

#[tokio::test]
async fn test_all_channels_closed_stops_loop() {
    let sink = Arc::new(MemorySink::new());
    let (sender, mut handle) = start(&sink);
    drop(sender);

    tokio::time::timeout(Duration::from_secs(1), handle.stopped())
        .await
        .unwrap();
    assert!(sink
        .at_level(Level::WARN)
        .contains(&"All consumer channels closed".to_string()));

    let summary = handle.shutdown().await.unwrap();
    assert_eq!(summary.processed, 0);
}

struct PanickingDecoder;

impl Decoder for PanickingDecoder {
    fn validate_schemas(&mut self, _schemas: &str) -> decoders::Result<()> {
        Ok(())
    }

    fn decode(&self, payload: &[u8]) -> decoders::Result<DecodedValue> {
        if payload == b"boom" {
            panic!("decoder blew up");
        }
        Ok(DecodedValue::RawJson(payload.to_vec()))
    }
}

#[tokio::test]
async fn test_decoder_panic_is_contained() {
    let sink = Arc::new(MemorySink::new());
    let (sender, source) = channel(4);
    let handle = Dispatcher::new(PanickingDecoder, "", sink.clone())
        .unwrap()
        .serve(source);

    sender.messages.send(Message::new(1, b"boom".to_vec())).await.unwrap();
    sender.messages.send(Message::new(2, b"1".to_vec())).await.unwrap();
    drop(sender);

    let summary = finish(handle).await;
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert!(sink.messages().contains(&"Message: 1".to_string()));
}

#[tokio::test]
async fn test_boxed_decoder() {
    let sink = Arc::new(MemorySink::new());
    let (sender, source) = channel(4);
    let decoder: Box<dyn Decoder> = Box::new(JsonDecoder::new(sink.clone()));
    let handle = Dispatcher::new(decoder, "", sink.clone())
        .unwrap()
        .serve(source);

    sender.messages.send(Message::new(5, b"true".to_vec())).await.unwrap();
    drop(sender);

    finish(handle).await;
    assert!(sink.messages().contains(&"Message: true".to_string()));
}

#[tokio::test]
async fn test_schema_validation_failure_is_startup_error() {
    let sink = Arc::new(MemorySink::new());
    let result = Dispatcher::new(AvroDecoder::new(), "schema.json", sink.clone());
    assert!(matches!(result, Err(DecodeError::InvalidSchemaKind { .. })));
    assert!(sink.messages().is_empty());
}
