use serde::Deserialize;
use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub api_key: String,
    pub vision_model: String,
    pub text_model: String,
    pub api_base: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.has_credential() { "<set>" } else { "<empty>" };
        f.debug_struct("AssistantConfig")
            .field("api_key", &key)
            .field("vision_model", &self.vision_model)
            .field("text_model", &self.text_model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AssistantConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.vision_model, DEFAULT_VISION_MODEL);
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn debug_output_hides_key() {
        let config = AssistantConfig {
            api_key: "secret-key".into(),
            ..Default::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("<set>"));
        assert!(!AssistantConfig::default().has_credential());
    }
}
