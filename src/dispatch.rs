//! Dispatch core — classification, tool exposure, and the tool loop.
//!
//! A turn walks START → CLASSIFYING → {REJECTED | DISPATCHING} →
//! DISPATCHING ⇄ EXECUTING_TOOL (bounded) → DONE. Classification is
//! fail-closed: a Block verdict and an unavailable classifier both reject
//! the message before any tool schema is ever assembled.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::AssistantConfig;
use crate::context::UserContext;
use crate::error::{DispatchError, Error, ScopeError};
use crate::llm::{ChatMessage, CompletionProvider, ToolCall, ToolCompletionRequest};
use crate::scope::{ScopeClassifier, ScopeVerdict};
use crate::tools::tool::Tool;
use crate::tools::ToolRegistry;

/// Final product of a successful turn. Created at the end of dispatch,
/// returned to the caller, then discarded.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub final_text: String,
    /// Completion/tool round trips consumed (0 = answered without tools).
    pub tool_rounds: usize,
}

/// Orchestrates one turn: scope gate, visible-tool exposure, bounded
/// completion/tool loop.
pub struct Dispatcher {
    config: AssistantConfig,
    llm: Arc<dyn CompletionProvider>,
    classifier: ScopeClassifier,
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(
        config: AssistantConfig,
        llm: Arc<dyn CompletionProvider>,
        classifier: ScopeClassifier,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            config,
            llm,
            classifier,
            registry,
        }
    }

    /// The fixed refusal shown for rejected messages.
    pub fn refusal_message(&self) -> &str {
        &self.config.refusal_message
    }

    /// Handle one turn for the given caller.
    pub async fn handle_turn(
        &self,
        message: &str,
        ctx: &UserContext,
    ) -> Result<TurnResult, Error> {
        let turn_id = Uuid::new_v4();

        // Scope gate first; nothing else happens for rejected messages.
        match self.classifier.classify(message).await {
            Ok(ScopeVerdict::Allow) => {}
            Ok(ScopeVerdict::Block) => {
                tracing::info!(%turn_id, "Message blocked by scope classifier");
                return Err(DispatchError::ScopeRejected.into());
            }
            Err(ScopeError::Unavailable(e)) => {
                // Fail closed: an unavailable classifier is a rejection,
                // never permission.
                tracing::warn!(%turn_id, error = %e, "Classifier unavailable, rejecting message");
                return Err(DispatchError::ScopeRejected.into());
            }
        }

        // Visible subset, computed once for the turn. Hidden tools are
        // structurally absent from every request that follows.
        let visible = self.registry.visible_for(ctx);
        let definitions = self.registry.definitions_for(ctx);
        tracing::debug!(
            %turn_id,
            user = %ctx.display_name,
            visible_tools = visible.len(),
            "Dispatching"
        );

        let mut messages = vec![
            ChatMessage::system(&self.config.system_prompt),
            ChatMessage::user(self.personalize(message, ctx)),
        ];

        let mut tool_rounds = 0usize;
        loop {
            let request = ToolCompletionRequest::new(messages.clone(), definitions.clone());
            let response = self
                .llm
                .complete_with_tools(request)
                .await
                .map_err(DispatchError::CompletionUnavailable)?;

            let Some(call) = response.tool_calls.into_iter().next() else {
                let final_text = response.content.unwrap_or_default();
                tracing::info!(%turn_id, tool_rounds, "Turn complete");
                return Ok(TurnResult {
                    final_text,
                    tool_rounds,
                });
            };

            if tool_rounds >= self.config.max_tool_rounds {
                tracing::warn!(%turn_id, rounds = tool_rounds, "Tool loop bound exceeded");
                return Err(DispatchError::ToolLoopExceeded { rounds: tool_rounds }.into());
            }
            tool_rounds += 1;

            let result_payload = self.execute_call(&call, &visible, ctx, turn_id).await;
            messages.push(ChatMessage::assistant_tool_calls(
                response.content,
                vec![call.clone()],
            ));
            messages.push(ChatMessage::tool_result(
                call.id.clone(),
                result_payload.to_string(),
            ));
        }
    }

    /// Execute one requested call, or refuse it when the named tool is not
    /// in the turn's visible set. Either way the outcome goes back into
    /// the conversation so the service can recover or explain; only
    /// infrastructure failures abort the turn.
    async fn execute_call(
        &self,
        call: &ToolCall,
        visible: &[Arc<dyn Tool>],
        ctx: &UserContext,
        turn_id: Uuid,
    ) -> serde_json::Value {
        // Defense in depth: the service never saw hidden tool schemas, but
        // a hallucinated name must still be refused here.
        let Some(tool) = visible.iter().find(|t| t.name() == call.name) else {
            tracing::warn!(%turn_id, tool = %call.name, "Requested tool is not visible to this caller");
            return serde_json::json!({
                "error": "ToolNotVisible",
                "message": format!("Tool '{}' is not available in this conversation.", call.name),
            });
        };

        match tool.execute(call.arguments.clone(), ctx).await {
            Ok(output) => {
                tracing::debug!(
                    %turn_id,
                    tool = %call.name,
                    elapsed_ms = output.elapsed.as_millis() as u64,
                    "Tool executed"
                );
                output.result
            }
            Err(e) => {
                tracing::warn!(%turn_id, tool = %call.name, error = %e, "Tool handler failed");
                serde_json::json!({
                    "error": "ToolFailed",
                    "message": e.to_string(),
                })
            }
        }
    }

    /// Enrich the raw message with caller identity for tone.
    fn personalize(&self, message: &str, ctx: &UserContext) -> String {
        match ctx.member_id.as_deref() {
            Some(id) => format!(
                "Hello {}! (Member ID: {}). Please answer politely and help with library services. \
                 User asked: {}",
                ctx.display_name, id, message
            ),
            None => format!(
                "Hello {}! Please answer politely and help with library services. User asked: {}",
                ctx.display_name, message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, MembershipDirectory, OpeningHours};
    use crate::error::LlmError;
    use crate::llm::{
        CompletionRequest, CompletionResponse, ToolCompletionResponse,
    };
    use crate::tools::builtin::{CheckAvailabilityTool, LibraryTimingsTool, SearchBookTool};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider with separate scripts for the classifier (plain) and the
    /// dispatcher (tool-enabled) paths; records every tool-enabled request.
    struct ScriptedProvider {
        plain: Mutex<VecDeque<Result<String, LlmError>>>,
        tooled: Mutex<VecDeque<ToolCompletionResponse>>,
        /// When the tooled script runs out, keep requesting this call
        /// (used to exercise the loop bound).
        always_call: Option<ToolCall>,
        tool_requests: Mutex<Vec<ToolCompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(
            plain: Vec<Result<String, LlmError>>,
            tooled: Vec<ToolCompletionResponse>,
        ) -> Arc<Self> {
            Arc::new(Self {
                plain: Mutex::new(plain.into()),
                tooled: Mutex::new(tooled.into()),
                always_call: None,
                tool_requests: Mutex::new(Vec::new()),
            })
        }

        fn looping(plain: Vec<Result<String, LlmError>>, call: ToolCall) -> Arc<Self> {
            Arc::new(Self {
                plain: Mutex::new(plain.into()),
                tooled: Mutex::new(VecDeque::new()),
                always_call: Some(call),
                tool_requests: Mutex::new(Vec::new()),
            })
        }

        fn tool_requests(&self) -> Vec<ToolCompletionRequest> {
            self.tool_requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let reply = self
                .plain
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted classifier reply left");
            reply.map(|content| CompletionResponse { content })
        }

        async fn complete_with_tools(
            &self,
            request: ToolCompletionRequest,
        ) -> Result<ToolCompletionResponse, LlmError> {
            self.tool_requests.lock().unwrap().push(request);
            if let Some(response) = self.tooled.lock().unwrap().pop_front() {
                return Ok(response);
            }
            if let Some(call) = &self.always_call {
                return Ok(ToolCompletionResponse {
                    content: None,
                    tool_calls: vec![call.clone()],
                });
            }
            Ok(ToolCompletionResponse {
                content: Some("(end of script)".to_string()),
                tool_calls: Vec::new(),
            })
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn text(content: &str) -> ToolCompletionResponse {
        ToolCompletionResponse {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }
    }

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let catalog = Arc::new(Catalog::seeded());
        let members = Arc::new(MembershipDirectory::seeded());
        let hours = Arc::new(OpeningHours::seeded());
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(SearchBookTool::new(Arc::clone(&catalog))),
            Arc::new(CheckAvailabilityTool::new(catalog, members)),
            Arc::new(LibraryTimingsTool::new(hours)),
        ];
        Arc::new(ToolRegistry::build(tools).unwrap())
    }

    fn dispatcher(provider: Arc<ScriptedProvider>) -> Dispatcher {
        let config = AssistantConfig::default();
        let classifier = ScopeClassifier::new(
            provider.clone() as Arc<dyn CompletionProvider>,
            &config.classifier_instructions,
        );
        Dispatcher::new(config, provider, classifier, registry())
    }

    fn guest() -> UserContext {
        UserContext::guest("Ada")
    }

    fn member() -> UserContext {
        UserContext::new("Grace", Some("M-1001".to_string()))
    }

    #[tokio::test]
    async fn blocked_message_never_reaches_dispatch() {
        let provider = ScriptedProvider::new(vec![Ok("BLOCK".into())], vec![]);
        let result = dispatcher(provider.clone())
            .handle_turn("Who will win the next election?", &guest())
            .await;
        assert!(matches!(
            result,
            Err(Error::Dispatch(DispatchError::ScopeRejected))
        ));
        assert!(provider.tool_requests().is_empty());
    }

    #[tokio::test]
    async fn classifier_failure_fails_closed() {
        let provider = ScriptedProvider::new(
            vec![Err(LlmError::RequestFailed {
                reason: "down".into(),
            })],
            vec![],
        );
        let result = dispatcher(provider.clone())
            .handle_turn("Do you have Clean Code?", &guest())
            .await;
        assert!(matches!(
            result,
            Err(Error::Dispatch(DispatchError::ScopeRejected))
        ));
        assert!(provider.tool_requests().is_empty());
    }

    #[tokio::test]
    async fn guest_requests_omit_gated_tool_schema() {
        let provider =
            ScriptedProvider::new(vec![Ok("ALLOW".into())], vec![text("We have it!")]);
        dispatcher(provider.clone())
            .handle_turn("Do you have Clean Code?", &guest())
            .await
            .unwrap();

        let requests = provider.tool_requests();
        assert_eq!(requests.len(), 1);
        let names: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["get_library_timings", "search_book"]);
    }

    #[tokio::test]
    async fn member_requests_include_gated_tool_schema() {
        let provider = ScriptedProvider::new(vec![Ok("ALLOW".into())], vec![text("Sure.")]);
        dispatcher(provider.clone())
            .handle_turn("How many copies of Clean Code?", &member())
            .await
            .unwrap();

        let requests = provider.tool_requests();
        let names: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["check_availability", "get_library_timings", "search_book"]
        );
    }

    #[tokio::test]
    async fn hallucinated_hidden_tool_is_refused_not_executed() {
        let provider = ScriptedProvider::new(
            vec![Ok("ALLOW".into())],
            vec![
                ToolCompletionResponse {
                    content: None,
                    tool_calls: vec![call(
                        "c1",
                        "check_availability",
                        json!({"book_name": "Clean Code"}),
                    )],
                },
                text("I can't check availability for guests."),
            ],
        );
        let result = dispatcher(provider.clone())
            .handle_turn("How many copies of Clean Code?", &guest())
            .await
            .unwrap();
        assert_eq!(result.final_text, "I can't check availability for guests.");
        assert_eq!(result.tool_rounds, 1);

        // The refusal went back into the conversation, not to the caller.
        let requests = provider.tool_requests();
        assert_eq!(requests.len(), 2);
        let fed_back = &requests[1].messages.last().unwrap().content;
        assert!(fed_back.contains("ToolNotVisible"), "got: {}", fed_back);
    }

    #[tokio::test]
    async fn member_tool_call_is_executed_and_fed_back() {
        let provider = ScriptedProvider::new(
            vec![Ok("ALLOW".into())],
            vec![
                ToolCompletionResponse {
                    content: None,
                    tool_calls: vec![call(
                        "c1",
                        "check_availability",
                        json!({"book_name": "Clean Code"}),
                    )],
                },
                text("There are 2 copies of Clean Code available."),
            ],
        );
        let result = dispatcher(provider.clone())
            .handle_turn("How many copies of Clean Code?", &member())
            .await
            .unwrap();
        assert_eq!(
            result.final_text,
            "There are 2 copies of Clean Code available."
        );

        let requests = provider.tool_requests();
        let fed_back = &requests[1].messages.last().unwrap().content;
        assert!(fed_back.contains("\"available_copies\":2"), "got: {}", fed_back);
    }

    #[tokio::test]
    async fn invalid_tool_params_are_fed_back_not_fatal() {
        let provider = ScriptedProvider::new(
            vec![Ok("ALLOW".into())],
            vec![
                ToolCompletionResponse {
                    content: None,
                    tool_calls: vec![call("c1", "search_book", json!({"title": "oops"}))],
                },
                text("Could you give me the exact title?"),
            ],
        );
        let result = dispatcher(provider.clone())
            .handle_turn("Find me that book", &guest())
            .await
            .unwrap();
        assert_eq!(result.final_text, "Could you give me the exact title?");

        let requests = provider.tool_requests();
        let fed_back = &requests[1].messages.last().unwrap().content;
        assert!(fed_back.contains("ToolFailed"), "got: {}", fed_back);
    }

    #[tokio::test]
    async fn runaway_tool_loop_is_bounded() {
        let provider = ScriptedProvider::looping(
            vec![Ok("ALLOW".into())],
            call("c", "search_book", json!({"book_name": "Clean Code"})),
        );
        let result = dispatcher(provider.clone())
            .handle_turn("Search forever", &guest())
            .await;
        assert!(matches!(
            result,
            Err(Error::Dispatch(DispatchError::ToolLoopExceeded { rounds: 8 }))
        ));
        // 8 executed rounds plus the final over-limit request.
        assert_eq!(provider.tool_requests().len(), 9);
    }

    #[tokio::test]
    async fn completion_failure_is_fatal_to_the_turn() {
        struct FailingDispatch;

        #[async_trait]
        impl CompletionProvider for FailingDispatch {
            async fn complete(
                &self,
                _request: CompletionRequest,
            ) -> Result<CompletionResponse, LlmError> {
                Ok(CompletionResponse {
                    content: "ALLOW".to_string(),
                })
            }
            async fn complete_with_tools(
                &self,
                _request: ToolCompletionRequest,
            ) -> Result<ToolCompletionResponse, LlmError> {
                Err(LlmError::RequestFailed {
                    reason: "unreachable".to_string(),
                })
            }
            fn model_name(&self) -> &str {
                "failing"
            }
        }

        let provider: Arc<dyn CompletionProvider> = Arc::new(FailingDispatch);
        let config = AssistantConfig::default();
        let classifier =
            ScopeClassifier::new(provider.clone(), &config.classifier_instructions);
        let dispatcher = Dispatcher::new(config, provider, classifier, registry());

        let result = dispatcher.handle_turn("Do you have Clean Code?", &guest()).await;
        assert!(matches!(
            result,
            Err(Error::Dispatch(DispatchError::CompletionUnavailable(_)))
        ));
    }

    #[test]
    fn personalization_mentions_caller_identity() {
        let provider = ScriptedProvider::new(vec![], vec![]);
        let d = dispatcher(provider);
        let enriched = d.personalize("Do you have Clean Code?", &member());
        assert!(enriched.contains("Grace"));
        assert!(enriched.contains("M-1001"));
        assert!(enriched.ends_with("Do you have Clean Code?"));

        let guest_line = d.personalize("hi", &guest());
        assert!(guest_line.contains("Ada"));
        assert!(!guest_line.contains("Member ID"));
    }
}
