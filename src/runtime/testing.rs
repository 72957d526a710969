//! Mock implementations for testing
//!
//! A queue-based assistant client plus a small harness that wires a real
//! [`WidgetRuntime`] to in-memory channels, so the whole widget contract
//! can be exercised without network or wall-clock time.

use super::{SessionSnapshot, UiEvent, WidgetConfig, WidgetEvent, WidgetRuntime};
use crate::assistant::{AssistantClient, AssistantReply, GatewayError, TurnRequest};
use crate::handoff::HandoffRequest;
use crate::session::ChatMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, Notify};

// ============================================================================
// Mock Assistant Client
// ============================================================================

/// Mock assistant client that returns queued replies
pub struct MockAssistantClient {
    replies: Mutex<VecDeque<Result<AssistantReply, GatewayError>>>,
    /// Record of all turns sent
    pub requests: Mutex<Vec<TurnRequest>>,
}

impl MockAssistantClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: AssistantReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue an error
    pub fn queue_error(&self, error: GatewayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded turns
    pub fn recorded_requests(&self) -> Vec<TurnRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockAssistantClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantClient for MockAssistantClient {
    async fn send(&self, turn: TurnRequest) -> Result<AssistantReply, GatewayError> {
        self.requests.lock().unwrap().push(turn);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::network("no mock reply queued")))
    }
}

// ============================================================================
// Delayed Mock (for serialization testing)
// ============================================================================

/// Mock client with a configurable delay, for testing the in-flight guard
pub struct DelayedMockAssistantClient {
    inner: MockAssistantClient,
    delay: Duration,
    /// Notified when a turn starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockAssistantClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockAssistantClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, reply: AssistantReply) {
        self.inner.queue_reply(reply);
    }

    pub fn recorded_requests(&self) -> Vec<TurnRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl AssistantClient for DelayedMockAssistantClient {
    async fn send(&self, turn: TurnRequest) -> Result<AssistantReply, GatewayError> {
        self.inner.requests.lock().unwrap().push(turn);
        self.request_started.notify_waiters();
        tokio::time::sleep(self.delay).await;
        self.inner
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::network("no mock reply queued")))
    }
}

// ============================================================================
// Test Widget Harness
// ============================================================================

/// A running widget runtime with its channels exposed
pub struct TestWidget {
    pub event_tx: mpsc::Sender<WidgetEvent>,
    pub ui_rx: broadcast::Receiver<UiEvent>,
    pub handoff_rx: mpsc::Receiver<HandoffRequest>,
}

impl TestWidget {
    pub fn spawn<C: AssistantClient + 'static>(client: Arc<C>, config: WidgetConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, ui_rx) = broadcast::channel(128);
        let (handoff_tx, handoff_rx) = mpsc::channel(8);

        let runtime = WidgetRuntime::new(
            config,
            client,
            event_rx,
            event_tx.clone(),
            broadcast_tx,
            handoff_tx,
        );
        tokio::spawn(async move {
            runtime.run().await;
        });

        Self {
            event_tx,
            ui_rx,
            handoff_rx,
        }
    }

    pub async fn open(&self) {
        self.event_tx.send(WidgetEvent::Opened).await.unwrap();
    }

    pub async fn close(&self) {
        self.event_tx.send(WidgetEvent::Closed).await.unwrap();
    }

    pub async fn send(&self, text: &str) {
        self.event_tx
            .send(WidgetEvent::UserMessage {
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    pub async fn click(&self, label: &str) {
        self.event_tx
            .send(WidgetEvent::SuggestionClicked {
                label: label.to_string(),
            })
            .await
            .unwrap();
    }

    /// Round-trips through the runtime, which also guarantees every event
    /// sent before this call has been processed.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.event_tx
            .send(WidgetEvent::Snapshot { reply_tx })
            .await
            .unwrap();
        reply_rx.await.unwrap()
    }

    pub async fn next_ui(&mut self) -> UiEvent {
        self.ui_rx.recv().await.expect("ui stream closed")
    }

    /// Next appended message, skipping unrelated UI events.
    pub async fn next_message(&mut self) -> ChatMessage {
        loop {
            if let UiEvent::Message { message } = self.next_ui().await {
                return message;
            }
        }
    }

    /// Next typing-indicator change, skipping unrelated UI events.
    pub async fn next_typing(&mut self) -> bool {
        loop {
            if let UiEvent::Typing { active } = self.next_ui().await {
                return active;
            }
        }
    }

    /// Next attention visibility change, skipping unrelated UI events.
    pub async fn next_attention(&mut self) -> bool {
        loop {
            if let UiEvent::AttentionPrompt { visible } = self.next_ui().await {
                return visible;
            }
        }
    }

    pub async fn next_handoff(&mut self) -> HandoffRequest {
        self.handoff_rx.recv().await.expect("handoff channel closed")
    }

    /// Give any scheduled emission time to fire, then require silence.
    pub async fn assert_no_handoff(&mut self) {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let _ = self.snapshot().await;
        match self.handoff_rx.try_recv() {
            Err(mpsc::error::TryRecvError::Empty) => {}
            other => panic!("unexpected hand-off: {other:?}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{HandoffSignal, TripForm};
    use crate::handoff::OPEN_ITINERARY_FORM_LABEL;
    use crate::session::{Sender, ERROR_REPLY_TEXT, PENDING_ITINERARY_KEY};
    use serde_json::{Map, Value};

    fn trip_form(destination: &str, days: u32, budget: u64) -> TripForm {
        TripForm {
            destination: destination.to_string(),
            days,
            budget,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn mock_client_replays_queue() {
        let mock = MockAssistantClient::new();
        mock.queue_reply(AssistantReply::text("xin chào"));

        let turn = TurnRequest {
            message: "hi".to_string(),
            history: vec![],
            session_id: "s".to_string(),
            context: Map::new(),
        };
        assert_eq!(mock.send(turn.clone()).await.unwrap().text, "xin chào");
        // Queue exhausted: behaves like a network failure.
        assert!(mock.send(turn).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// A plain turn grows the log by two and never leaves the chat loop.
    #[tokio::test(start_paused = true)]
    async fn plain_turn_stays_in_chat() {
        let client = Arc::new(MockAssistantClient::new());
        let mut context = Map::new();
        context.insert(PENDING_ITINERARY_KEY.to_string(), Value::Null);
        client.queue_reply(
            AssistantReply::text("Đà Lạt 3 ngày là hợp lý đó!")
                .with_suggestions(["Xem lịch trình"])
                .with_context(context),
        );

        let mut w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        let greeting = w.next_message().await;
        assert_eq!(greeting.sender, Sender::Assistant);

        w.send("Tôi muốn đi Đà Lạt 3 ngày").await;
        let user = w.next_message().await;
        assert_eq!(user.sender, Sender::User);
        let reply = w.next_message().await;
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.suggestions, vec!["Xem lịch trình"]);
        assert!(!reply.is_error);

        let snap = w.snapshot().await;
        assert_eq!(snap.messages.len(), 3);
        assert!(!snap.typing);
        w.assert_no_handoff().await;

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "Tôi muốn đi Đà Lạt 3 ngày");
        // History carries only the greeting; the new message travels apart.
        assert_eq!(requests[0].history.len(), 1);
        assert_eq!(requests[0].history[0].kind, "bot");
        assert_eq!(
            Some(requests[0].session_id.as_str()),
            snap.session_id.as_deref()
        );
    }

    /// A modal reply fires the itinerary emission exactly once, after the
    /// render delay, with the server's form data.
    #[tokio::test(start_paused = true)]
    async fn modal_reply_emits_form_once() {
        let client = Arc::new(MockAssistantClient::new());
        client.queue_reply(
            AssistantReply::text("Mình mở form tạo lịch trình cho bạn nhé!").with_handoff(
                HandoffSignal::OpenItineraryForm {
                    form: trip_form("Đà Lạt", 3, 5_000_000),
                },
            ),
        );

        let mut w = TestWidget::spawn(client, WidgetConfig::default());
        w.open().await;
        w.send("Lên lịch trình giúp mình").await;

        match w.next_handoff().await {
            HandoffRequest::Form { form } => {
                assert_eq!(form.destination, "Đà Lạt");
                assert_eq!(form.days, 3);
                assert_eq!(form.budget, 5_000_000);
            }
            other => panic!("expected form hand-off, got {other:?}"),
        }
        // Exactly once.
        w.assert_no_handoff().await;
    }

    /// A gateway failure becomes one apology message; the typing
    /// indicator is cleared and nothing escapes.
    #[tokio::test(start_paused = true)]
    async fn gateway_failure_becomes_one_apology() {
        let client = Arc::new(MockAssistantClient::new());
        client.queue_error(GatewayError::network("connection refused"));

        let mut w = TestWidget::spawn(client, WidgetConfig::default());
        w.open().await;
        w.send("alo?").await;

        assert!(w.next_typing().await, "typing should start");
        assert!(!w.next_typing().await, "typing must clear on failure");

        let apology = w.next_message().await;
        assert!(apology.is_error);
        assert_eq!(apology.sender, Sender::Assistant);
        assert_eq!(apology.text, ERROR_REPLY_TEXT);

        let snap = w.snapshot().await;
        assert_eq!(snap.messages.len(), 3);
        assert!(!snap.typing);
        w.assert_no_handoff().await;
    }

    /// The sentinel suggestion bypasses the gateway entirely: remembered
    /// facts plus synthesized default dates, emitted immediately.
    #[tokio::test(start_paused = true)]
    async fn sentinel_click_bypasses_gateway() {
        let client = Arc::new(MockAssistantClient::new());
        client.queue_reply(AssistantReply::text("Bạn muốn mở lại form chứ?").with_handoff(
            HandoffSignal::OpenItineraryForm {
                form: trip_form("Huế", 2, 3_000_000),
            },
        ));

        let mut w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        w.send("Đi Huế 2 ngày").await;
        // Consume the reply-driven emission so the channel is clean.
        let _ = w.next_handoff().await;

        w.click(OPEN_ITINERARY_FORM_LABEL).await;
        match w.next_handoff().await {
            HandoffRequest::Form { form } => {
                let today = chrono::Utc::now().date_naive();
                let end = today + chrono::Duration::days(3);
                assert_eq!(form.destination, "Huế");
                assert_eq!(form.days, 2);
                assert_eq!(form.budget, 3_000_000);
                assert_eq!(form.start_date, Some(today.format("%Y-%m-%d").to_string()));
                assert_eq!(form.end_date, Some(end.format("%Y-%m-%d").to_string()));
            }
            other => panic!("expected form hand-off, got {other:?}"),
        }
        // No second gateway call happened for the shortcut.
        assert_eq!(client.recorded_requests().len(), 1);
    }

    /// The remembered facts are consumed by one shortcut; a second click
    /// falls through to ordinary text handling.
    #[tokio::test(start_paused = true)]
    async fn pending_facts_are_single_use() {
        let client = Arc::new(MockAssistantClient::new());
        client.queue_reply(AssistantReply::text("form nhé").with_handoff(
            HandoffSignal::OpenItineraryForm {
                form: trip_form("Huế", 2, 3_000_000),
            },
        ));
        client.queue_reply(AssistantReply::text("bạn hỏi gì vậy?"));

        let mut w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        w.send("Đi Huế").await;
        let _ = w.next_handoff().await; // reply-driven
        w.click(OPEN_ITINERARY_FORM_LABEL).await;
        let _ = w.next_handoff().await; // shortcut, consumes the facts

        w.click(OPEN_ITINERARY_FORM_LABEL).await;
        w.assert_no_handoff().await;
        // The second click became a normal turn instead.
        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].message, OPEN_ITINERARY_FORM_LABEL);
    }

    /// An ordinary suggestion is exactly a typed message.
    #[tokio::test(start_paused = true)]
    async fn suggestion_forwards_as_text() {
        let client = Arc::new(MockAssistantClient::new());
        client.queue_reply(AssistantReply::text("Lịch trình đây ạ"));

        let mut w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        let _ = w.next_message().await; // greeting
        w.click("Xem lịch trình").await;

        let user = w.next_message().await;
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.text, "Xem lịch trình");
        let reply = w.next_message().await;
        assert_eq!(reply.sender, Sender::Assistant);

        let snap = w.snapshot().await;
        assert_eq!(snap.messages.len(), 3);
        assert_eq!(client.recorded_requests()[0].message, "Xem lịch trình");
        w.assert_no_handoff().await;
    }

    /// A second send while a turn is in flight is rejected, not queued.
    #[tokio::test(start_paused = true)]
    async fn concurrent_send_is_rejected() {
        let client = Arc::new(DelayedMockAssistantClient::new(Duration::from_secs(5)));
        client.queue_reply(AssistantReply::text("đến nơi rồi"));

        let mut w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        let _ = w.next_message().await; // greeting
        w.send("câu thứ nhất").await;
        w.send("câu thứ hai").await;

        let mut saw_busy = false;
        loop {
            match w.next_ui().await {
                UiEvent::Busy => {
                    saw_busy = true;
                    break;
                }
                UiEvent::Message { message } if message.sender == Sender::Assistant => break,
                _ => {}
            }
        }
        assert!(saw_busy, "second send must be rejected while in flight");

        // The delayed reply still lands; only the first message reached
        // the gateway, so the log holds greeting + first user + reply.
        let reply = w.next_message().await;
        assert_eq!(reply.text, "đến nơi rồi");
        let snap = w.snapshot().await;
        assert_eq!(client.recorded_requests().len(), 1);
        assert_eq!(snap.messages.len(), 3);
    }

    /// Blank input is dropped without any trace.
    #[tokio::test(start_paused = true)]
    async fn blank_input_is_skipped() {
        let client = Arc::new(MockAssistantClient::new());
        let w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        w.send("   ").await;
        w.send("\t").await;

        let snap = w.snapshot().await;
        assert_eq!(snap.messages.len(), 1, "only the greeting");
        assert!(client.recorded_requests().is_empty());
        assert!(!snap.typing);
    }

    /// A server-assigned conversation id replaces ours and is used on the
    /// next turn.
    #[tokio::test(start_paused = true)]
    async fn server_session_id_is_adopted() {
        let client = Arc::new(MockAssistantClient::new());
        client.queue_reply(AssistantReply::text("chào bạn").with_session_id("srv-9"));
        client.queue_reply(AssistantReply::text("ok"));

        let mut w = TestWidget::spawn(client.clone(), WidgetConfig::default());
        w.open().await;
        w.send("một").await;
        let _ = w.next_message().await; // greeting
        let _ = w.next_message().await; // user
        let _ = w.next_message().await; // reply

        let snap = w.snapshot().await;
        assert_eq!(snap.session_id.as_deref(), Some("srv-9"));
        assert_eq!(snap.messages.len(), 3, "adoption must not disturb the log");

        w.send("hai").await;
        let _ = w.next_message().await;
        let _ = w.next_message().await;
        assert_eq!(client.recorded_requests()[1].session_id, "srv-9");
    }

    /// Opening twice neither duplicates the greeting nor rotates the id.
    #[tokio::test(start_paused = true)]
    async fn open_is_idempotent_through_the_runtime() {
        let client = Arc::new(MockAssistantClient::new());
        let w = TestWidget::spawn(client, WidgetConfig::default());
        w.open().await;
        let first = w.snapshot().await;
        w.open().await;
        let second = w.snapshot().await;

        assert_eq!(first.messages.len(), 1);
        assert_eq!(second.messages.len(), 1);
        assert_eq!(first.session_id, second.session_id);
    }

    /// Messages arriving while collapsed bump the unread counter; opening
    /// clears it.
    #[tokio::test(start_paused = true)]
    async fn unread_counts_while_collapsed() {
        let client = Arc::new(MockAssistantClient::new());
        let mut w = TestWidget::spawn(client, WidgetConfig::default());
        w.open().await;
        w.close().await;

        w.event_tx
            .send(WidgetEvent::AssistantReplied {
                reply: AssistantReply::text("có ưu đãi mới cho bạn"),
            })
            .await
            .unwrap();

        let snap = w.snapshot().await;
        assert_eq!(snap.unread, 1);

        let mut saw_unread = false;
        while let Ok(event) = w.ui_rx.try_recv() {
            if let UiEvent::Unread { count: 1 } = event {
                saw_unread = true;
            }
        }
        assert!(saw_unread, "unread change must be broadcast");

        w.open().await;
        let snap = w.snapshot().await;
        assert_eq!(snap.unread, 0);
    }

    /// Full attention cycle with the widget left collapsed: show after the
    /// arm delay, hide after the show duration, show again one cooldown
    /// plus one arm delay later. Virtual clock, so the timings are exact.
    #[tokio::test(start_paused = true)]
    async fn attention_cycle_timing() {
        let client = Arc::new(MockAssistantClient::new());
        let config = WidgetConfig::default(); // 20s / 3s / 30s
        let mut w = TestWidget::spawn(client, config);

        w.open().await;
        let _ = w.snapshot().await; // drain the open before starting the clock
        let start = tokio::time::Instant::now();
        w.close().await;

        assert!(w.next_attention().await, "prompt should show");
        assert_eq!(start.elapsed(), Duration::from_secs(20));

        assert!(!w.next_attention().await, "prompt should hide");
        assert_eq!(start.elapsed(), Duration::from_secs(23));

        assert!(w.next_attention().await, "prompt should show again");
        assert_eq!(start.elapsed(), Duration::from_secs(73));
    }

    /// Opening mid-cycle hides the prompt and stops the timers for good.
    #[tokio::test(start_paused = true)]
    async fn opening_stops_the_attention_cycle() {
        let client = Arc::new(MockAssistantClient::new());
        let mut w = TestWidget::spawn(client, WidgetConfig::default());

        w.open().await;
        w.close().await;
        assert!(w.next_attention().await, "prompt shows while collapsed");

        w.open().await;
        assert!(!w.next_attention().await, "open hides the prompt");

        // Long after every configured delay, nothing further arrives.
        tokio::time::sleep(Duration::from_secs(300)).await;
        let _ = w.snapshot().await;
        let mut prompts = Vec::new();
        while let Ok(event) = w.ui_rx.try_recv() {
            if let UiEvent::AttentionPrompt { visible } = event {
                prompts.push(visible);
            }
        }
        assert!(prompts.is_empty(), "no prompt events while open: {prompts:?}");
    }
}
