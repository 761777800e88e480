use super::{
    anthropic::AnthropicContextBuilder, base::ContextBuilder, google::GoogleContextBuilder,
    openai::OpenAiContextBuilder, text::TextFormatContextBuilder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFormat {
    OpenAi,
    Anthropic,
    Google,
    Text,
}

pub fn get_builder(format: ProviderFormat) -> Box<dyn ContextBuilder> {
    match format {
        ProviderFormat::OpenAi => Box::new(OpenAiContextBuilder),
        ProviderFormat::Anthropic => Box::new(AnthropicContextBuilder),
        ProviderFormat::Google => Box::new(GoogleContextBuilder),
        ProviderFormat::Text => Box::new(TextFormatContextBuilder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::ConversationData;
    use crate::models::message::ConversationMessage;
    use serde_json::json;

    #[test]
    fn test_every_format_builds_a_single_user_turn() {
        let conversation =
            ConversationData::with_messages(vec![ConversationMessage::user("Hello")]);

        let openai = get_builder(ProviderFormat::OpenAi).build_context(&conversation, None);
        assert_eq!(openai, vec![json!({"role": "user", "content": "Hello"})]);

        let google = get_builder(ProviderFormat::Google).build_context(&conversation, None);
        assert_eq!(
            google,
            vec![json!({"role": "user", "parts": [{"text": "Hello"}]})]
        );

        let anthropic = get_builder(ProviderFormat::Anthropic).build_context(&conversation, None);
        assert_eq!(anthropic, vec![json!({"role": "user", "content": "Hello"})]);

        let text = get_builder(ProviderFormat::Text).build_context(&conversation, None);
        assert_eq!(text, vec![json!({"role": "user", "content": "Hello"})]);
    }
}
