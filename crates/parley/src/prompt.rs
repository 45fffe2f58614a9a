//! Rewrites the user-visible request into the exact user turn handed to the
//! model. The machine directive is plain text embedded in the prompt; the
//! model is expected to act on the `[SYSTEM: …]` marker. Keeping the
//! rendering here means the directive format can change in exactly one place.

use std::path::PathBuf;

/// Rules the model follows for the whole session, independent of the request.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant with access to real-time tools.\n\nRULES:\n1. Use tools when instructed by [SYSTEM: ...] messages\n2. After using tools, explain results in natural language\n3. For general questions, respond directly\n\nBe concise and helpful.";

/// The directive injected when the intent router identified a capability.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptAnnotation {
    Weather,
    Currency,
    DocumentRead { path: PathBuf },
}

impl PromptAnnotation {
    fn directive(&self) -> String {
        match self {
            PromptAnnotation::Weather => {
                "[SYSTEM: Weather query. Use the get_weather tool.]".to_string()
            }
            PromptAnnotation::Currency => {
                "[SYSTEM: Currency query. Use the convert_currency tool.]".to_string()
            }
            PromptAnnotation::DocumentRead { path } => format!(
                "[SYSTEM: Document at {}. Use the read_document tool.]",
                path.display()
            ),
        }
    }
}

/// Pure: the original text, with the directive block appended when a
/// capability is implied, unchanged otherwise.
pub fn render_user_turn(text: &str, annotation: Option<&PromptAnnotation>) -> String {
    match annotation {
        Some(annotation) => format!("{}\n\n{}", text, annotation.directive()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unannotated_text_passes_through_unchanged() {
        assert_eq!(render_user_turn("tell me a joke", None), "tell me a joke");
    }

    #[test]
    fn weather_annotation_appends_the_directive() {
        let turn = render_user_turn("weather in Paris?", Some(&PromptAnnotation::Weather));
        assert_eq!(
            turn,
            "weather in Paris?\n\n[SYSTEM: Weather query. Use the get_weather tool.]"
        );
    }

    #[test]
    fn currency_annotation_names_the_conversion_tool() {
        let turn = render_user_turn("convert 5 USD", Some(&PromptAnnotation::Currency));
        assert!(turn.ends_with("[SYSTEM: Currency query. Use the convert_currency tool.]"));
    }

    #[test]
    fn document_annotation_carries_the_server_side_path() {
        let annotation = PromptAnnotation::DocumentRead {
            path: PathBuf::from("/srv/uploads/report.pdf"),
        };
        let turn = render_user_turn("summarize this", Some(&annotation));
        assert!(turn.contains("/srv/uploads/report.pdf"));
        assert!(turn.contains("read_document"));
    }
}
