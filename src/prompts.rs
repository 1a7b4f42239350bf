//! Built-in prompt templates.

use crate::mcp::types::{GetPromptResult, PromptMessage};
use crate::registry::{Arguments, PromptArgument, PromptDescriptor, PromptEntry};
use crate::tools::{str_arg, ToolFault};

/// All built-in prompts, in advertisement order.
#[must_use]
pub fn entries() -> Vec<PromptEntry> {
    vec![PromptEntry {
        descriptor: PromptDescriptor {
            name: "greeting".to_string(),
            description: "Generates a polite greeting".to_string(),
            arguments: vec![
                PromptArgument {
                    name: "name".to_string(),
                    description: "Name of the person to greet".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "time_of_day".to_string(),
                    description: "Time of day (morning, afternoon, evening)".to_string(),
                    required: false,
                },
            ],
        },
        renderer: render_greeting,
    }]
}

fn salutation(time_of_day: Option<&str>) -> &'static str {
    match time_of_day.map(|t| t.trim().to_lowercase()).as_deref() {
        Some("morning" | "朝") => "Good morning",
        Some("evening" | "night" | "夜") => "Good evening",
        _ => "Hello",
    }
}

fn render_greeting(args: &Arguments) -> Result<GetPromptResult, ToolFault> {
    let name = str_arg(args, "name")?;
    let time_of_day = args.get("time_of_day").and_then(serde_json::Value::as_str);

    Ok(GetPromptResult {
        description: Some("A polite greeting".to_string()),
        messages: vec![PromptMessage::user(format!(
            "{}, {name}. Thank you for taking the time today. Is there anything I can help you with?",
            salutation(time_of_day)
        ))],
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mcp::types::ToolContent;

    fn text_of(result: &GetPromptResult) -> &str {
        match &result.messages[0].content {
            ToolContent::Text { text } => text,
        }
    }

    #[test]
    fn salutation_by_time() {
        assert_eq!(salutation(Some("morning")), "Good morning");
        assert_eq!(salutation(Some(" Morning ")), "Good morning");
        assert_eq!(salutation(Some("朝")), "Good morning");
        assert_eq!(salutation(Some("night")), "Good evening");
        assert_eq!(salutation(Some("夜")), "Good evening");
        assert_eq!(salutation(Some("afternoon")), "Hello");
        assert_eq!(salutation(None), "Hello");
    }

    #[test]
    fn renders_single_user_message() {
        let args = json!({"name": "Sato", "time_of_day": "evening"});
        let result = render_greeting(args.as_object().unwrap()).unwrap();
        assert_eq!(result.messages.len(), 1);
        assert!(text_of(&result).starts_with("Good evening, Sato."));
    }

    #[test]
    fn optional_argument_may_be_absent() {
        let args = json!({"name": "Sato"});
        let result = render_greeting(args.as_object().unwrap()).unwrap();
        assert!(text_of(&result).starts_with("Hello, Sato."));
    }
}
