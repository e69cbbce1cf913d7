//! Controller for the chat panel embedded in the site.
//!
//! [`WidgetState`] holds everything the panel knows; the free functions
//! in [`state`] are the transitions. [`ChatWidget`] owns one state and
//! one transport and runs a full submit.

pub mod format;
pub mod state;
pub mod transport;

use log::warn;

use crate::config::prompt::{ PromptConfig, DEFAULT_CONTACT_PHONE };
use self::state::{ begin_submit, complete_submit, toggle, SubmitSource, WidgetState };
use self::transport::RelayTransport;

pub use self::state::{ ViewEntry, QUICK_ACTIONS };

pub const DEFAULT_HISTORY_WINDOW: usize = 6;

pub struct ChatWidget<T: RelayTransport> {
    state: WidgetState,
    transport: T,
    history_window: usize,
    fallback_message: String,
}

impl<T: RelayTransport> ChatWidget<T> {
    pub fn new(transport: T) -> Self {
        Self::with_prompts(transport, &PromptConfig::default().with_phone(DEFAULT_CONTACT_PHONE))
    }

    /// `prompts` should already carry the contact phone; see
    /// [`PromptConfig::with_phone`].
    pub fn with_prompts(transport: T, prompts: &PromptConfig) -> Self {
        Self {
            state: WidgetState::new(&prompts.welcome_message),
            transport,
            history_window: DEFAULT_HISTORY_WINDOW,
            fallback_message: prompts.client_fallback.clone(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn toggle(&mut self) {
        toggle(&mut self.state);
    }

    /// Sends one turn and waits for the reply. Returns `false` when the
    /// submit was ignored and nothing was sent.
    pub async fn submit(&mut self, source: SubmitSource, text: &str) -> bool {
        let request = match
            begin_submit(&mut self.state, source, text, self.history_window)
        {
            Some(request) => request,
            None => {
                return false;
            }
        };

        let result = self.transport.send(&request).await;
        if let Err(e) = &result {
            warn!("Chat error: {}", e);
        }
        complete_submit(&mut self.state, result, &self.fallback_message);
        true
    }

    pub async fn quick_action(&mut self, label: &str) -> bool {
        self.submit(SubmitSource::QuickAction, label).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatTurn;
    use crate::models::relay::RelayRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use super::transport::TransportError;

    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
        requests: Mutex<Vec<RelayRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl RelayTransport for CountingTransport {
        async fn send(&self, request: &RelayRequest) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                Err(TransportError::Rejected { status: 500, message: "down".into() })
            } else {
                Ok(format!("echo: {}", request.message))
            }
        }
    }

    #[tokio::test]
    async fn submit_round_trip_appends_both_turns() {
        let mut widget = ChatWidget::new(CountingTransport::default());
        widget.toggle();

        assert!(widget.submit(SubmitSource::Panel, "hello").await);
        assert_eq!(widget.state().history, vec![
            ChatTurn::user("hello"),
            ChatTurn::assistant("echo: hello"),
        ]);
        assert!(!widget.state().is_loading);
    }

    #[tokio::test]
    async fn pending_request_blocks_a_second_call() {
        let mut widget = ChatWidget::new(CountingTransport::default());
        begin_submit(&mut widget.state, SubmitSource::Panel, "first", 6).unwrap();

        assert!(!widget.submit(SubmitSource::Panel, "second").await);
        assert_eq!(widget.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_renders_fallback_and_unlocks() {
        let transport = CountingTransport { fail: true, ..Default::default() };
        let mut widget = ChatWidget::new(transport);

        assert!(widget.submit(SubmitSource::Collapsed, "hello").await);
        assert!(!widget.state().is_loading);
        assert_eq!(widget.state().history, vec![ChatTurn::user("hello")]);
        match widget.state().view.last() {
            Some(ViewEntry::Message { role, html }) => {
                assert_eq!(role, "assistant");
                assert!(html.contains("trouble connecting"));
            }
            other => panic!("expected fallback message, got {:?}", other),
        }

        assert!(widget.submit(SubmitSource::Panel, "again").await);
        assert_eq!(widget.transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fallback_carries_the_configured_phone() {
        let transport = CountingTransport { fail: true, ..Default::default() };
        let prompts = PromptConfig::default().with_phone("(250) 555-9999");
        let mut widget = ChatWidget::with_prompts(transport, &prompts);

        assert!(widget.submit(SubmitSource::Panel, "hello").await);
        match widget.state().view.last() {
            Some(ViewEntry::Message { html, .. }) => {
                assert!(html.contains("(250) 555-9999"));
                assert!(!html.contains(DEFAULT_CONTACT_PHONE));
            }
            other => panic!("expected fallback message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn quick_action_sends_its_label() {
        let mut widget = ChatWidget::new(CountingTransport::default());
        assert!(widget.quick_action(QUICK_ACTIONS[0]).await);
        let requests = widget.transport.requests.lock().unwrap();
        assert_eq!(requests[0].message, "Current Rates");
        assert!(requests[0].history.is_empty());
    }
}
