use super::budgets::BudgetService;
use super::reports::ReportService;
use crate::config::OpenAiConfig;
use crate::db::repositories::{
    ChatRepository, ProfileRepository, TransactionFilter, TransactionRepository,
};
use crate::dates::day_range;
use crate::db::DbPool;
use crate::errors::{ChatError, DatabaseError, ServiceError};
use crate::models::{ChatMessage, ChatSession, MessageRole};
use crate::money::with_thousands;
use crate::telemetry;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_SESSION_TITLE: &str = "New Chat";
pub const HISTORY_LIMIT: i64 = 10;
pub const MAX_TOOL_TRANSACTIONS: i64 = 10;
const FOLLOW_UP_PROMPT: &str = "Based on this data, provide helpful financial advice:";

/// One message of a completion prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    /// Function tool definitions; empty disables tool calls
    pub tools: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_call: Option<ToolCall>,
}

/// Chat completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ChatError>;
}

/// Runs a tool the model asked for on behalf of a user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, user_id: Uuid, name: &str, arguments: &Value)
        -> Result<Value, ChatError>;
}

/// Tools offered to the model
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "get_recent_transactions",
                "description": "Get user's recent transactions",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "limit": {
                            "type": "integer",
                            "description": "Number of transactions to retrieve (max 10)",
                            "default": 5
                        }
                    }
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "get_budget_status",
                "description": "Get current budget status and usage",
                "parameters": {"type": "object", "properties": {}}
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "get_spending_insights",
                "description": "Get AI-generated insights about spending patterns",
                "parameters": {"type": "object", "properties": {}}
            }
        }),
    ]
}

// ============================================================================
// OpenAI client
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChoiceBody>,
}

#[derive(Debug, Deserialize)]
struct ChoiceBody {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallBody>,
}

#[derive(Debug, Deserialize)]
struct ToolCallBody {
    function: FunctionBody,
}

#[derive(Debug, Deserialize)]
struct FunctionBody {
    name: String,
    /// JSON-encoded argument object
    arguments: String,
}

/// OpenAI-compatible `/chat/completions` client
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ChatError::Completion(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Completion, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ChatError::NotConfigured)?;

        let has_tools = !request.tools.is_empty();
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            tools: has_tools.then_some(request.tools.as_slice()),
            tool_choice: has_tools.then_some("auto"),
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Completion(format!("{}: {}", status, text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::InvalidResponse("no choices returned".to_string()))?
            .message;

        let tool_call = match message.tool_calls.into_iter().next() {
            Some(call) => {
                let arguments = if call.function.arguments.trim().is_empty() {
                    json!({})
                } else {
                    serde_json::from_str(&call.function.arguments)
                        .map_err(|e| ChatError::InvalidResponse(e.to_string()))?
                };
                Some(ToolCall {
                    name: call.function.name,
                    arguments,
                })
            }
            None => None,
        };

        Ok(Completion {
            content: message.content,
            tool_call,
        })
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.config.model, messages = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ChatError> {
        let result = self.send(&request).await;
        match &result {
            Ok(_) => telemetry::record_chat_completion("success"),
            Err(e) => {
                warn!(error = %e, "Chat completion failed");
                telemetry::record_chat_completion("error");
            }
        }
        result
    }
}

// ============================================================================
// Conversation
// ============================================================================

/// Financial facts the system prompt is built from
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub balance: f64,
    pub budget_percentage: f64,
    pub top_category: String,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            balance: 0.0,
            budget_percentage: 0.0,
            top_category: "Unknown".to_string(),
        }
    }
}

pub fn system_prompt(context: &UserContext) -> String {
    format!(
        "You are a helpful financial assistant for a personal finance app.\n\n\
         User's financial context:\n\
         - Current balance: ${}\n\
         - Monthly budget usage: {:.1}%\n\
         - Top spending category: {}\n\n\
         Available tools:\n\
         - get_recent_transactions: View recent transactions\n\
         - get_budget_status: Check budget information\n\
         - get_spending_insights: Analyze spending patterns\n\n\
         Guidelines:\n\
         - Be helpful and friendly\n\
         - Provide actionable financial advice\n\
         - Use data from user's account when relevant\n\
         - Suggest specific actions when appropriate\n\
         - Keep responses concise but informative",
        with_thousands(context.balance, 2),
        context.budget_percentage,
        context.top_category
    )
}

/// Prompt suggestions shown under an empty conversation
pub fn suggestions(context: &UserContext) -> Vec<String> {
    vec![
        "Show me my recent transactions".to_string(),
        "How is my budget looking this month?".to_string(),
        "Give me spending insights".to_string(),
        format!(
            "I have ${}, what should I do with it?",
            with_thousands(context.balance, 0)
        ),
    ]
}

/// Assistant answer plus the tool invocation behind it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub function_call: Option<Value>,
}

/// Ask the model; when it requests a tool, run it and ask again with the result
pub async fn respond(
    client: &dyn ChatCompletionClient,
    tools: &dyn ToolExecutor,
    user_id: Uuid,
    context: &UserContext,
    history: Vec<PromptMessage>,
    content: &str,
) -> Result<AssistantReply, ChatError> {
    let system = PromptMessage::new(MessageRole::System, system_prompt(context));
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(system.clone());
    messages.extend(history);
    messages.push(PromptMessage::new(MessageRole::User, content));

    let first = client
        .complete(CompletionRequest {
            messages,
            tools: tool_definitions(),
        })
        .await?;

    let Some(call) = first.tool_call else {
        return Ok(AssistantReply {
            content: first.content.unwrap_or_default(),
            function_call: None,
        });
    };

    debug!(tool = %call.name, "Model requested a tool");
    let result = tools.execute(user_id, &call.name, &call.arguments).await?;

    let follow_up = client
        .complete(CompletionRequest {
            messages: vec![
                system,
                PromptMessage::new(MessageRole::User, FOLLOW_UP_PROMPT),
                PromptMessage::new(MessageRole::Assistant, result.to_string()),
            ],
            tools: Vec::new(),
        })
        .await?;

    Ok(AssistantReply {
        content: follow_up.content.unwrap_or_default(),
        function_call: Some(json!({
            "name": call.name,
            "arguments": call.arguments,
            "result": result,
        })),
    })
}

// ============================================================================
// Tools backed by the user's data
// ============================================================================

#[derive(Clone)]
pub struct FinanceTools {
    transactions: TransactionRepository,
    budgets: BudgetService,
    reports: ReportService,
}

impl FinanceTools {
    pub fn new(pool: DbPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool.clone()),
            budgets: BudgetService::new(pool.clone()),
            reports: ReportService::new(pool),
        }
    }

    async fn recent_transactions(&self, user_id: Uuid, limit: i64) -> Result<Value, ServiceError> {
        let filter = TransactionFilter {
            limit: limit.clamp(1, MAX_TOOL_TRANSACTIONS),
            ..TransactionFilter::default()
        };
        let data: Vec<Value> = self
            .transactions
            .list(user_id, &filter)
            .await?
            .into_iter()
            .map(|t| {
                json!({
                    "date": t.transaction.transaction_date.format("%Y-%m-%d").to_string(),
                    "amount": t.transaction.amount,
                    "type": t.transaction.transaction_type,
                    "description": t.transaction.description,
                    "category": t.category_name,
                })
            })
            .collect();
        Ok(json!({"function": "get_recent_transactions", "data": data}))
    }

    async fn budget_status(&self, user_id: Uuid) -> Result<Value, ServiceError> {
        let overview = self.budgets.current_month(user_id).await?;
        Ok(json!({
            "function": "get_budget_status",
            "data": {
                "total_budget": overview.total_budget,
                "spent": overview.spent,
                "remaining": overview.remaining,
                "usage_percentage": overview.usage_percentage,
                "categories_count": overview.budgets_by_category.len(),
            }
        }))
    }

    async fn spending_insights(&self, user_id: Uuid) -> Result<Value, ServiceError> {
        let data: Vec<Value> = self
            .reports
            .insights(user_id)
            .await?
            .into_iter()
            .take(3)
            .map(|i| json!({"title": i.title, "message": i.message, "type": i.kind}))
            .collect();
        Ok(json!({"function": "get_spending_insights", "data": data}))
    }
}

#[async_trait]
impl ToolExecutor for FinanceTools {
    #[instrument(skip(self, arguments))]
    async fn execute(
        &self,
        user_id: Uuid,
        name: &str,
        arguments: &Value,
    ) -> Result<Value, ChatError> {
        let result = match name {
            "get_recent_transactions" => {
                let limit = arguments.get("limit").and_then(Value::as_i64).unwrap_or(5);
                self.recent_transactions(user_id, limit).await
            }
            "get_budget_status" => self.budget_status(user_id).await,
            "get_spending_insights" => self.spending_insights(user_id).await,
            other => return Ok(json!({"error": format!("Unknown function: {}", other)})),
        };
        result.map_err(|e| ChatError::Tool(e.to_string()))
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SessionWithMessages {
    #[serde(flatten)]
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone)]
pub struct ChatService {
    chats: ChatRepository,
    profiles: ProfileRepository,
    transactions: TransactionRepository,
    budgets: BudgetService,
    client: Arc<dyn ChatCompletionClient>,
    tools: Arc<dyn ToolExecutor>,
}

impl ChatService {
    pub fn new(pool: DbPool, client: Arc<dyn ChatCompletionClient>) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            budgets: BudgetService::new(pool.clone()),
            tools: Arc::new(FinanceTools::new(pool)),
            client,
        }
    }

    #[instrument(skip(self, title))]
    pub async fn create_session(
        &self,
        user_id: Uuid,
        title: Option<String>,
    ) -> Result<ChatSession, ServiceError> {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id,
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.chats.create_session(&session).await?;
        Ok(session)
    }

    pub async fn sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, ServiceError> {
        Ok(self.chats.list_sessions(user_id).await?)
    }

    async fn find_session(&self, user_id: Uuid, id: Uuid) -> Result<ChatSession, ServiceError> {
        self.chats
            .find_session(user_id, id)
            .await?
            .ok_or_else(|| ChatError::SessionNotFound.into())
    }

    pub async fn session(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<SessionWithMessages, ServiceError> {
        let session = self.find_session(user_id, id).await?;
        let messages = self.chats.messages(session.id).await?;
        Ok(SessionWithMessages { session, messages })
    }

    #[instrument(skip(self))]
    pub async fn delete_session(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        match self.chats.deactivate_session(user_id, id).await {
            Err(DatabaseError::NotFound(_)) => Err(ChatError::SessionNotFound.into()),
            other => Ok(other?),
        }
    }

    /// Store the user's message, answer it and store the answer
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        content: String,
    ) -> Result<ChatMessage, ServiceError> {
        let session = self.find_session(user_id, session_id).await?;

        let history: Vec<PromptMessage> = self
            .chats
            .recent_messages(session.id, HISTORY_LIMIT)
            .await?
            .into_iter()
            .map(|m| PromptMessage::new(m.role, m.content))
            .collect();

        self.chats
            .add_message(&ChatMessage {
                id: Uuid::new_v4(),
                session_id: session.id,
                role: MessageRole::User,
                content: content.clone(),
                function_call: None,
                created_at: Utc::now(),
            })
            .await?;

        let context = self.context(user_id).await;
        let reply = respond(
            self.client.as_ref(),
            self.tools.as_ref(),
            user_id,
            &context,
            history,
            &content,
        )
        .await?;

        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id: session.id,
            role: MessageRole::Assistant,
            content: reply.content,
            function_call: reply.function_call,
            created_at: Utc::now(),
        };
        self.chats.add_message(&message).await?;
        self.chats.touch_session(session.id).await?;

        info!(session_id = %session.id, tool_used = message.function_call.is_some(), "Chat message answered");
        Ok(message)
    }

    pub async fn suggestions(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<String>, ServiceError> {
        self.find_session(user_id, session_id).await?;
        Ok(suggestions(&self.context(user_id).await))
    }

    /// Best-effort context; lookups that fail fall back to defaults
    async fn context(&self, user_id: Uuid) -> UserContext {
        let mut context = UserContext::default();

        match self.profiles.find_financial_by_user(user_id).await {
            Ok(Some(data)) => context.balance = data.balance,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load financial data for chat context"),
        }

        match self.budgets.current_month(user_id).await {
            Ok(overview) => context.budget_percentage = overview.usage_percentage,
            Err(e) => warn!(error = %e, "Failed to load budget overview for chat context"),
        }

        let today = Utc::now().date_naive();
        let spending = match day_range(today - Duration::days(30), today) {
            Ok((from, to)) => self
                .transactions
                .spending_by_category(user_id, from, to)
                .await
                .map_err(ServiceError::from),
            Err(e) => Err(e.into()),
        };
        match spending {
            Ok(rows) => {
                if let Some(top) = rows.into_iter().next() {
                    context.top_category = top.category_name;
                }
            }
            Err(e) => warn!(error = %e, "Failed to load spending for chat context"),
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context() -> UserContext {
        UserContext {
            balance: 12500.0,
            budget_percentage: 42.0,
            top_category: "Food".to_string(),
        }
    }

    #[test]
    fn test_system_prompt_carries_context() {
        let prompt = system_prompt(&context());
        assert!(prompt.contains("Current balance: $12,500.00"));
        assert!(prompt.contains("Monthly budget usage: 42.0%"));
        assert!(prompt.contains("Top spending category: Food"));
    }

    #[test]
    fn test_suggestions_mention_balance() {
        let suggestions = suggestions(&context());
        assert_eq!(suggestions.len(), 4);
        assert_eq!(suggestions[3], "I have $12,500, what should I do with it?");
    }

    #[test]
    fn test_tool_definitions_names() {
        let names: Vec<String> = tool_definitions()
            .iter()
            .map(|t| t["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            ["get_recent_transactions", "get_budget_status", "get_spending_insights"]
        );
    }

    #[tokio::test]
    async fn test_plain_answer_skips_tools() {
        let mut client = MockChatCompletionClient::new();
        client
            .expect_complete()
            .withf(|r| r.messages.len() == 3 && r.tools.len() == 3)
            .times(1)
            .returning(|_| {
                Ok(Completion {
                    content: Some("Spend less on coffee.".to_string()),
                    tool_call: None,
                })
            });
        let mut tools = MockToolExecutor::new();
        tools.expect_execute().never();

        let history = vec![PromptMessage::new(MessageRole::Assistant, "Hi!")];
        let reply = respond(&client, &tools, Uuid::new_v4(), &context(), history, "Advice?")
            .await
            .unwrap();

        assert_eq!(reply.content, "Spend less on coffee.");
        assert!(reply.function_call.is_none());
    }

    #[tokio::test]
    async fn test_tool_call_runs_tool_then_asks_again() {
        let user_id = Uuid::new_v4();
        let mut client = MockChatCompletionClient::new();
        let mut seq = mockall::Sequence::new();
        client
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(Completion {
                    content: None,
                    tool_call: Some(ToolCall {
                        name: "get_budget_status".to_string(),
                        arguments: json!({}),
                    }),
                })
            });
        client
            .expect_complete()
            .withf(|r| {
                r.tools.is_empty()
                    && r.messages[1].content == FOLLOW_UP_PROMPT
                    && r.messages[2].role == MessageRole::Assistant
                    && r.messages[2].content.contains("usage_percentage")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(Completion {
                    content: Some("You have used half your budget.".to_string()),
                    tool_call: None,
                })
            });

        let mut tools = MockToolExecutor::new();
        tools
            .expect_execute()
            .with(eq(user_id), eq("get_budget_status"), eq(json!({})))
            .times(1)
            .returning(|_, _, _| Ok(json!({"data": {"usage_percentage": 50.0}})));

        let reply = respond(&client, &tools, user_id, &context(), Vec::new(), "Budget?")
            .await
            .unwrap();

        assert_eq!(reply.content, "You have used half your budget.");
        let call = reply.function_call.unwrap();
        assert_eq!(call["name"], "get_budget_status");
        assert_eq!(call["result"]["data"]["usage_percentage"], 50.0);
    }

    #[tokio::test]
    async fn test_tool_failure_propagates() {
        let mut client = MockChatCompletionClient::new();
        client.expect_complete().times(1).returning(|_| {
            Ok(Completion {
                content: None,
                tool_call: Some(ToolCall {
                    name: "get_recent_transactions".to_string(),
                    arguments: json!({"limit": 3}),
                }),
            })
        });
        let mut tools = MockToolExecutor::new();
        tools
            .expect_execute()
            .returning(|_, _, _| Err(ChatError::Tool("database unavailable".to_string())));

        let err = respond(&client, &tools, Uuid::new_v4(), &context(), Vec::new(), "Recent?")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Tool(_)));
    }

    fn openai_config(server: &MockServer, api_key: Option<&str>) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.map(str::to_string),
            base_url: server.uri(),
            ..OpenAiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_openai_client_parses_tool_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({"tool_choice": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "get_recent_transactions",
                                "arguments": "{\"limit\": 3}"
                            }
                        }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(openai_config(&server, Some("sk-test"))).unwrap();
        let completion = client
            .complete(CompletionRequest {
                messages: vec![PromptMessage::new(MessageRole::User, "Recent?")],
                tools: tool_definitions(),
            })
            .await
            .unwrap();

        let call = completion.tool_call.unwrap();
        assert_eq!(call.name, "get_recent_transactions");
        assert_eq!(call.arguments["limit"], 3);
    }

    #[tokio::test]
    async fn test_openai_client_reports_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(openai_config(&server, Some("sk-test"))).unwrap();
        let err = client
            .complete(CompletionRequest {
                messages: vec![PromptMessage::new(MessageRole::User, "Hi")],
                tools: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Completion(ref m) if m.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_openai_client_requires_api_key() {
        let server = MockServer::start().await;
        let client = OpenAiClient::new(openai_config(&server, None)).unwrap();
        let err = client
            .complete(CompletionRequest {
                messages: Vec::new(),
                tools: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotConfigured));
    }
}
