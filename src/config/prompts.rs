//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory (`rag.prompts_dir` in the configuration).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
}

/// Prompts for RAG answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
    /// Substituted for the context block when retrieval returned nothing,
    /// so the model declines to speculate instead of seeing an empty string.
    pub no_context: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about a video based on excerpts from its transcript.

Guidelines:
- Answer using only the provided transcript context
- If the context doesn't contain the answer, reply "I don't know"
- Be concise but thorough in your responses"#
                .to_string(),

            user: r#"Answer the question based on the context below. If you can't answer the question, reply "I don't know".

Context:
{{context}}

Question: {{question}}"#
                .to_string(),

            no_context: "No relevant transcript context was found for this question. \
                         Do not speculate; tell the user the video does not appear to \
                         cover this topic."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, overriding defaults from `<dir>/rag.toml` if present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.rag.user.contains("{{context}}"));
        assert!(prompts.rag.user.contains("{{question}}"));
        assert!(!prompts.rag.no_context.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Context:\n{{context}}\n\nQuestion: {{question}}";
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "some text".to_string());
        vars.insert("question".to_string(), "why?".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Context:\nsome text\n\nQuestion: why?");
    }
}
