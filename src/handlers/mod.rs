pub mod admin;
pub mod comment;
pub mod maintenance;
pub mod poll;
pub mod vote;

use serde::Deserialize;

/// Answers arrive as a JSON boolean or as the strings "true"/"false";
/// older clients sent the string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_bool(&self) -> bool {
        match self {
            AnswerValue::Bool(b) => *b,
            AnswerValue::Text(s) => s == "true",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_coercion() {
        assert!(AnswerValue::Bool(true).as_bool());
        assert!(!AnswerValue::Bool(false).as_bool());
        assert!(AnswerValue::Text("true".into()).as_bool());
        assert!(!AnswerValue::Text("false".into()).as_bool());
        assert!(!AnswerValue::Text("yes".into()).as_bool());
    }

    #[test]
    fn answer_deserializes_from_both_forms() {
        let from_bool: AnswerValue = serde_json::from_str("true").unwrap();
        assert!(from_bool.as_bool());
        let from_text: AnswerValue = serde_json::from_str("\"true\"").unwrap();
        assert!(from_text.as_bool());
    }
}
