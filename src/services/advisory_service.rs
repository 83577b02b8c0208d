use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::{
    config::Config,
    constants::prompts,
    errors::{AppError, AppResult},
    models::domain::question::QuestionType,
    models::domain::Question,
    models::dto::response::{CategorySuggestion, GeneratedQuestion, GeneratedQuestionSet},
};

/// Injected AI capability. Scoring never depends on this; every
/// implementation is free to fail without affecting exam correctness.
#[async_trait]
pub trait Advisory: Send + Sync {
    async fn explain(&self, question: &Question) -> AppResult<String>;
    async fn categorize(&self, question_text: &str) -> AppResult<CategorySuggestion>;
    async fn ask(&self, prompt: &str, context: Option<&str>) -> AppResult<String>;
    async fn generate(
        &self,
        subject: &str,
        topic: &str,
        question_type: QuestionType,
        count: usize,
    ) -> AppResult<Vec<GeneratedQuestion>>;
}

pub struct OpenAiAdvisory {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiAdvisory {
    /// None when no API key is configured; callers fall back to the noop
    /// implementation.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.openai_api_key.as_ref()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(&config.openai_api_base);

        Some(Self {
            client: Client::with_config(openai_config),
            model_name: config.openai_model.clone(),
        })
    }

    async fn chat(&self, system_message: &str, user_message: &str) -> AppResult<String> {
        log::debug!(
            "Calling chat completion, model: {}, user message length: {}",
            self.model_name,
            user_message.len()
        );

        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build AI request: {}", e)))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build AI request: {}", e)))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system),
                ChatCompletionRequestMessage::User(user),
            ])
            .temperature(0.3)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build AI request: {}", e)))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            log::warn!("AI advisory call failed: {}", e);
            AppError::InternalError(format!("AI advisory call failed: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::InternalError("AI advisory returned no content".to_string()))?;

        Ok(content.trim().to_string())
    }
}

/// Render a question with its answer key for the explain prompt.
fn render_question(question: &Question) -> String {
    let mut rendered = format!(
        "Subject: {} / {}\nType: {:?}\nQuestion: {}\n",
        question.subject, question.topic, question.question_type, question.question_text
    );

    for (i, option) in question.options.iter().enumerate() {
        rendered.push_str(&format!(
            "Option {}: {}{}\n",
            i + 1,
            option.text,
            if option.is_correct { " (correct)" } else { "" }
        ));
    }

    if let Some(correct) = &question.correct_answer {
        if let Some(value) = correct.as_f64() {
            rendered.push_str(&format!("Correct answer: {}\n", value));
        }
    }

    rendered
}

/// Model output often wraps JSON in markdown fences; take the outermost
/// object literal.
fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

#[async_trait]
impl Advisory for OpenAiAdvisory {
    async fn explain(&self, question: &Question) -> AppResult<String> {
        self.chat(prompts::EXPLAIN_SYSTEM_PROMPT, &render_question(question))
            .await
    }

    async fn categorize(&self, question_text: &str) -> AppResult<CategorySuggestion> {
        let response = self
            .chat(prompts::CATEGORIZE_SYSTEM_PROMPT, question_text)
            .await?;

        let json = extract_json(&response).ok_or_else(|| {
            AppError::InternalError("AI categorizer returned no JSON object".to_string())
        })?;
        serde_json::from_str(json).map_err(|e| {
            AppError::InternalError(format!("Failed to parse categorizer response: {}", e))
        })
    }

    async fn ask(&self, prompt: &str, context: Option<&str>) -> AppResult<String> {
        let user_message = match context {
            Some(context) => format!("Study material:\n{}\n\nQuestion: {}", context, prompt),
            None => prompt.to_string(),
        };
        self.chat(prompts::TUTOR_SYSTEM_PROMPT, &user_message).await
    }

    async fn generate(
        &self,
        subject: &str,
        topic: &str,
        question_type: QuestionType,
        count: usize,
    ) -> AppResult<Vec<GeneratedQuestion>> {
        let schema = schemars::schema_for!(GeneratedQuestionSet);
        let schema_json = serde_json::to_string_pretty(&schema)
            .map_err(|e| AppError::InternalError(format!("Failed to render schema: {}", e)))?;

        let user_message = format!(
            "Generate {} {:?} question(s) for subject '{}', topic '{}'.\n\nJSON schema:\n{}",
            count, question_type, subject, topic, schema_json
        );

        let response = self
            .chat(prompts::GENERATE_SYSTEM_PROMPT, &user_message)
            .await?;

        let json = extract_json(&response).ok_or_else(|| {
            AppError::InternalError("AI generator returned no JSON object".to_string())
        })?;
        let set: GeneratedQuestionSet = serde_json::from_str(json).map_err(|e| {
            AppError::InternalError(format!("Failed to parse generator response: {}", e))
        })?;

        Ok(set.questions)
    }
}

/// Stub implementation used when no API key is configured.
pub struct NoopAdvisory;

#[async_trait]
impl Advisory for NoopAdvisory {
    async fn explain(&self, _question: &Question) -> AppResult<String> {
        Err(AppError::InternalError(
            "AI advisory is not configured".to_string(),
        ))
    }

    async fn categorize(&self, _question_text: &str) -> AppResult<CategorySuggestion> {
        Err(AppError::InternalError(
            "AI advisory is not configured".to_string(),
        ))
    }

    async fn ask(&self, _prompt: &str, _context: Option<&str>) -> AppResult<String> {
        Err(AppError::InternalError(
            "AI advisory is not configured".to_string(),
        ))
    }

    async fn generate(
        &self,
        _subject: &str,
        _topic: &str,
        _question_type: QuestionType,
        _count: usize,
    ) -> AppResult<Vec<GeneratedQuestion>> {
        Err(AppError::InternalError(
            "AI advisory is not configured".to_string(),
        ))
    }
}
