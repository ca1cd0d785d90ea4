//! Relay service lifecycle
//!
//! Owns the broadcast bus and both relays, and keeps the relays registered
//! on the bus while the service runs. Created at service start, torn down
//! with `shutdown`.

use crate::core::bus::{BroadcastBus, Registration};
use crate::core::config::Config;
use crate::core::executor::SerialExecutor;
use crate::core::provider::{GeminiChat, OpenAIChat};
use crate::relay::client::RelayClient;
use crate::relay::{GeminiRelay, OpenAIRelay};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

pub struct RelayService {
    bus: BroadcastBus,
    gemini: Arc<GeminiRelay>,
    openai: Arc<OpenAIRelay>,
    reply_timeout: Duration,
    registrations: Mutex<Vec<Registration>>,
}

impl RelayService {
    /// Build both relays and register them on a fresh bus
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &Config,
        gemini_chat: Arc<dyn GeminiChat>,
        openai_chat: Arc<dyn OpenAIChat>,
    ) -> Self {
        let bus = BroadcastBus::new(config.relay.bus_capacity);

        let gemini = Arc::new(GeminiRelay::new(
            gemini_chat,
            bus.clone(),
            SerialExecutor::start("gemini-relay"),
        ));
        let openai = Arc::new(OpenAIRelay::new(
            openai_chat,
            bus.clone(),
            SerialExecutor::start("openai-relay"),
            &config.relay.default_model,
        ));

        let registrations = vec![bus.register(gemini.clone()), bus.register(openai.clone())];

        info!(
            default_model = %config.relay.default_model,
            bus_capacity = config.relay.bus_capacity,
            "Relay service started"
        );

        Self {
            bus,
            gemini,
            openai,
            reply_timeout: config.reply_timeout(),
            registrations: Mutex::new(registrations),
        }
    }

    pub fn bus(&self) -> &BroadcastBus {
        &self.bus
    }

    /// Request/reply client using the configured reply timeout
    pub fn client(&self) -> RelayClient {
        RelayClient::new(self.bus.clone(), self.reply_timeout)
    }

    /// Unregister both relays, then let them finish their queued work
    ///
    /// Requests sent after this call are not delivered.
    pub async fn shutdown(&self) {
        self.registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();

        self.gemini.shutdown().await;
        self.openai.shutdown().await;
        info!("Relay service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{action, extra};
    use crate::models::gemini::{ChatResponse, GeminiRequest};
    use crate::models::intent::Intent;
    use crate::models::openai::ChatResult;
    use crate::relay::Receiver;
    use crate::relay::testing::{GeminiBehavior, OpenAIBehavior, StubGemini, StubOpenAI};

    /// Registered listener that keeps every response intent
    #[derive(Default)]
    struct Responses(Mutex<Vec<Intent>>);

    impl Receiver for Responses {
        fn on_receive(&self, intent: &Intent) {
            if intent.is(action::GEMINI_RESPONSE) || intent.is(action::OPENAI_RESPONSE) {
                self.0.lock().unwrap().push(intent.clone());
            }
        }
    }

    fn start_service(gemini: Arc<StubGemini>, openai: Arc<StubOpenAI>) -> RelayService {
        RelayService::start(&Config::default(), gemini, openai)
    }

    fn openai_answering(text: &str) -> Arc<StubOpenAI> {
        Arc::new(StubOpenAI::new(OpenAIBehavior::Reply(Some(ChatResult {
            text: Some(text.to_string()),
            citations: Vec::new(),
        }))))
    }

    async fn next_with_action(
        sub: &mut crate::core::bus::Subscription,
        wanted: &str,
    ) -> Arc<Intent> {
        loop {
            let intent = sub.recv().await.expect("bus closed");
            if intent.is(wanted) {
                return intent;
            }
        }
    }

    #[tokio::test]
    async fn test_broadcast_request_reaches_matching_relay_only() {
        let gemini = Arc::new(StubGemini::new(GeminiBehavior::Reply(ChatResponse::text(
            "from gemini",
        ))));
        let openai = openai_answering("from openai");
        let service = start_service(gemini.clone(), openai.clone());
        let mut sub = service.bus().subscribe();

        service
            .bus()
            .send(GeminiRequest::new("hola").into_intent())
            .unwrap();

        let response = next_with_action(&mut sub, action::GEMINI_RESPONSE).await;
        assert_eq!(response.string_extra(extra::TEXT), Some("from gemini"));
        assert_eq!(gemini.calls(), vec!["hola"]);
        assert!(openai.calls().is_empty());

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_relays_answer_independently() {
        let gemini = Arc::new(StubGemini::new(GeminiBehavior::SlowEcho(
            Duration::from_millis(200),
        )));
        let openai = openai_answering("quick");
        let service = start_service(gemini, openai);
        let mut sub = service.bus().subscribe();

        service
            .bus()
            .send(GeminiRequest::new("slow").into_intent())
            .unwrap();
        service
            .bus()
            .send(Intent::new(action::OPENAI_REQUEST))
            .unwrap();

        // The OpenAI relay is not stuck behind the slow Gemini call
        let first = loop {
            let intent = sub.recv().await.unwrap();
            if intent.is(action::GEMINI_RESPONSE) || intent.is(action::OPENAI_RESPONSE) {
                break intent;
            }
        };
        assert!(first.is(action::OPENAI_RESPONSE));

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_requests() {
        let gemini = Arc::new(StubGemini::new(GeminiBehavior::SlowEcho(
            Duration::from_millis(10),
        )));
        let service = start_service(gemini.clone(), openai_answering("unused"));

        for prompt in ["a", "b", "c"] {
            service
                .bus()
                .send(GeminiRequest::new(prompt).into_intent())
                .unwrap();
        }
        service.shutdown().await;

        assert_eq!(gemini.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_burst_beyond_bus_capacity_is_fully_answered() {
        let mut config = Config::default();
        config.relay.bus_capacity = 8;
        let gemini = Arc::new(StubGemini::new(GeminiBehavior::SlowEcho(
            Duration::from_millis(1),
        )));
        let service = RelayService::start(&config, gemini.clone(), openai_answering("o"));
        let responses = Arc::new(Responses::default());
        let _registration = service.bus().register(responses.clone());

        for i in 0..20 {
            let request = GeminiRequest {
                prompt: Some(format!("p{}", i)),
                request_id: Some(i.to_string()),
            };
            service.bus().send(request.into_intent()).unwrap();
            service
                .bus()
                .send(Intent::new(action::OPENAI_REQUEST))
                .unwrap();
        }
        service.shutdown().await;

        assert_eq!(gemini.calls().len(), 20);
        let responses = responses.0.lock().unwrap();
        let gemini_ids: Vec<&str> = responses
            .iter()
            .filter(|r| r.is(action::GEMINI_RESPONSE))
            .filter_map(|r| r.string_extra(extra::REQUEST_ID))
            .collect();
        let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        assert_eq!(gemini_ids, expected);
        assert_eq!(
            responses
                .iter()
                .filter(|r| r.is(action::OPENAI_RESPONSE))
                .count(),
            20
        );
    }

    #[tokio::test]
    async fn test_requests_after_shutdown_reach_no_relay() {
        let gemini = Arc::new(StubGemini::new(GeminiBehavior::Reply(ChatResponse::text(
            "late",
        ))));
        let service = start_service(gemini.clone(), openai_answering("unused"));
        service.shutdown().await;

        assert_eq!(service.bus().receiver_count(), 0);
        assert!(
            service
                .bus()
                .send(GeminiRequest::new("anyone?").into_intent())
                .is_err()
        );
        assert!(gemini.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_shutdowns_both_see_drained_queue() {
        let gemini = Arc::new(StubGemini::new(GeminiBehavior::SlowEcho(
            Duration::from_millis(30),
        )));
        let service = start_service(gemini.clone(), openai_answering("unused"));
        for prompt in ["a", "b"] {
            service
                .bus()
                .send(GeminiRequest::new(prompt).into_intent())
                .unwrap();
        }

        let (first, second) = tokio::join!(
            async {
                service.shutdown().await;
                gemini.calls().len()
            },
            async {
                service.shutdown().await;
                gemini.calls().len()
            },
        );
        assert_eq!((first, second), (2, 2));
    }
}
