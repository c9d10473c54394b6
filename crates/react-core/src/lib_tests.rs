#[cfg(test)]
mod tests {
    use crate::agent::{Conversation, Message, Role};
    use crate::tools::ToolCall;

    #[test]
    fn test_conversation_creation() {
        let conversation = Conversation::new("episode-123");
        assert_eq!(conversation.id, "episode-123");
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_conversation_with_prompt() {
        let conversation = Conversation::with_prompt("episode", "Summarize paper.md");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages[0].role, Role::User);
        assert_eq!(conversation.non_system_count(), 1);
    }

    #[test]
    fn test_insert_system_message_keeps_system_preamble_first() {
        let mut conversation = Conversation::new("episode");
        conversation.add_message(Message::system("first"));
        conversation.add_message(Message::user("task"));

        conversation.insert_system_message("second");

        let roles: Vec<&str> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(roles, vec!["first", "second", "task"]);
    }

    #[test]
    fn test_assistant_message_drops_empty_tool_calls() {
        let msg = Message::assistant("plain", Some(Vec::new()));
        assert!(msg.tool_calls.is_none());
        assert!(msg.requested_tool_calls().is_empty());
    }

    #[test]
    fn test_assistant_message_with_tool_calls() {
        let msg = Message::assistant(
            "",
            Some(vec![ToolCall::new("call-1", "search_file", r#"{"file":"a"}"#)]),
        );
        assert_eq!(msg.requested_tool_calls().len(), 1);
        assert_eq!(msg.requested_tool_calls()[0].function.name, "search_file");
    }

    #[test]
    fn test_tool_message_serialization() {
        let msg = Message::tool_result("call_yyaeEH9yC4MEL0kc5fWJwOZv", "File has 3 total lines.");
        let json = serde_json::to_string(&msg).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["role"], "tool");
        assert_eq!(parsed["content"], "File has 3 total lines.");
        assert_eq!(parsed["tool_call_id"], "call_yyaeEH9yC4MEL0kc5fWJwOZv");
    }

    #[test]
    fn test_assistant_with_tool_calls_serialization() {
        let msg = Message::assistant(
            "",
            Some(vec![ToolCall::new("call_1", "submit", r#"{"answer": "42"}"#)]),
        );
        let json = serde_json::to_string(&msg).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["role"], "assistant");
        assert_eq!(parsed["tool_calls"][0]["type"], "function");
        assert_eq!(parsed["tool_calls"][0]["function"]["name"], "submit");
    }
}
