use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::application::ports::{
    CompletionRequest, CompletionResponse, Diagnostics, HistoryStore, LlmClient, LlmClientError,
};
use crate::domain::{ConversationId, Message};
use crate::infrastructure::observability::sanitize_prompt;

use super::AssistantConfig;

/// Number of stored turns pulled into the context window.
pub const HISTORY_WINDOW: usize = 30;

pub const FORMAT_DIRECTIVE: &str =
    "Please use markdown for formatting and emphasis, feel free to use emoji.";

const ANSWER_SPAN: &str = "completion.answer";
const QUICK_ANSWER_SPAN: &str = "completion.quick_answer";

/// Runs one assistant turn: history, context assembly, completion, persistence.
///
/// Provider and storage faults never escape: a failed completion yields the
/// configured fallback message and nothing is persisted.
pub struct ConversationService<L, H>
where
    L: LlmClient,
    H: HistoryStore,
{
    llm_client: Arc<L>,
    history_store: Arc<H>,
    diagnostics: Arc<dyn Diagnostics>,
    config: AssistantConfig,
    format_directive: Message,
    system_message: Message,
    answer_permits: Arc<Semaphore>,
}

impl<L, H> ConversationService<L, H>
where
    L: LlmClient,
    H: HistoryStore,
{
    pub fn new(
        llm_client: Arc<L>,
        history_store: Arc<H>,
        diagnostics: Arc<dyn Diagnostics>,
        config: AssistantConfig,
    ) -> Self {
        let format_directive = Message::system(FORMAT_DIRECTIVE);
        let system_message = Message::system(config.system_prompt());
        let answer_permits = Arc::new(Semaphore::new(config.max_concurrent_answers()));

        tracing::info!(
            personality = %sanitize_prompt(config.system_prompt()),
            model = %config.model(),
            "Conversation service configured"
        );

        Self {
            llm_client,
            history_store,
            diagnostics,
            config,
            format_directive,
            system_message,
            answer_permits,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub async fn answer(&self, prompts: &[String], conversation_id: ConversationId) -> String {
        let history = self.load_history(conversation_id).await;
        let user_messages: Vec<Message> = prompts.iter().map(Message::user).collect();

        if let Some(last) = prompts.last() {
            tracing::debug!(
                conversation_id = %conversation_id,
                prompt_count = prompts.len(),
                prompt = %sanitize_prompt(last),
                "Answering prompts"
            );
        }

        let context = self.assemble_context(history, &user_messages);
        log_context(&context);

        match self.complete(ANSWER_SPAN, context, None).await {
            Ok(reply) => {
                let mut turn = user_messages;
                turn.push(Message::assistant(reply.clone()));
                self.persist_turn(conversation_id, turn).await;
                reply
            }
            Err(_) => self.config.fallback_message().to_string(),
        }
    }

    /// Single stateless prompt. The only path that applies the configured
    /// token limit; `answer` never caps the reply.
    pub async fn quick_answer(&self, prompt: &str) -> String {
        tracing::debug!(prompt = %sanitize_prompt(prompt), "Quick answer");

        let max_tokens = self.config.max_tokens();
        match self
            .complete(QUICK_ANSWER_SPAN, vec![Message::user(prompt)], max_tokens)
            .await
        {
            Ok(reply) => reply,
            Err(_) => self.config.fallback_message().to_string(),
        }
    }

    /// History first, then the formatting directive, the system prompt and the
    /// new user messages.
    pub fn assemble_context(&self, history: Vec<Message>, user_messages: &[Message]) -> Vec<Message> {
        let mut context = Vec::with_capacity(history.len() + user_messages.len() + 2);
        context.extend(history);
        context.push(self.format_directive.clone());
        context.push(self.system_message.clone());
        context.extend_from_slice(user_messages);
        context
    }

    /// Chronological history; empty if the store cannot be read.
    async fn load_history(&self, conversation_id: ConversationId) -> Vec<Message> {
        match self
            .history_store
            .fetch_recent(conversation_id, HISTORY_WINDOW)
            .await
        {
            Ok(mut messages) => {
                messages.truncate(HISTORY_WINDOW);
                messages.reverse();
                tracing::info!(
                    conversation_id = %conversation_id,
                    count = messages.len(),
                    "Found items for context"
                );
                messages
            }
            Err(e) => {
                tracing::error!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to load conversation history, continuing without it"
                );
                Vec::new()
            }
        }
    }

    async fn persist_turn(&self, conversation_id: ConversationId, turn: Vec<Message>) {
        let (persistable, blank): (Vec<Message>, Vec<Message>) =
            turn.into_iter().partition(Message::is_persistable);

        if !blank.is_empty() {
            tracing::warn!(
                conversation_id = %conversation_id,
                skipped = blank.len(),
                "Skipping blank messages when recording turn"
            );
        }

        if let Err(e) = self
            .history_store
            .append_batch(conversation_id, &persistable)
            .await
        {
            tracing::error!(
                conversation_id = %conversation_id,
                error = %e,
                "Failed to record conversation turn"
            );
        }
    }

    async fn complete(
        &self,
        span_name: &'static str,
        messages: Vec<Message>,
        max_tokens: Option<usize>,
    ) -> Result<String, LlmClientError> {
        let mut request = CompletionRequest::new(self.config.model(), messages);
        request.max_tokens = max_tokens;
        let mut span = self.diagnostics.begin_span(span_name);

        let result = self
            .llm_client
            .complete(&request)
            .await
            .and_then(CompletionResponse::into_first_content);

        if let Err(e) = &result {
            tracing::error!(span = span_name, error = %e, "Completion provider call failed");
            span.record_error(e);
        }

        result
    }
}

impl<L, H> ConversationService<L, H>
where
    L: LlmClient + 'static,
    H: HistoryStore + 'static,
{
    /// Runs [`Self::answer`] on the runtime. Background answers are gated by
    /// `max_concurrent_answers` permits.
    pub fn answer_async(
        self: &Arc<Self>,
        prompts: Vec<String>,
        conversation_id: ConversationId,
    ) -> JoinHandle<String> {
        let service = Arc::clone(self);
        let permits = Arc::clone(&self.answer_permits);

        tokio::spawn(async move {
            // `answer_permits` is never closed.
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    tracing::error!(error = %e, "Answer permits closed, answering without a bound");
                    None
                }
            };
            service.answer(&prompts, conversation_id).await
        })
    }
}

fn log_context(context: &[Message]) {
    if !tracing::enabled!(tracing::Level::TRACE) {
        return;
    }
    match serde_json::to_string_pretty(context) {
        Ok(json) => tracing::trace!(context = %json, "Prompts sent to completion provider"),
        Err(e) => tracing::error!(error = %e, "Can't display prompts"),
    }
}
