use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured emotion analysis as returned by the language model.
///
/// Models are loose about types (`"7"` vs `7`, a string instead of a list),
/// so this is built from a [`Value`] rather than derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub primary_emotion: String,
    pub secondary_emotions: Vec<String>,
    /// 1-10 scale
    pub intensity: Option<f64>,
    pub keywords: Vec<String>,
    pub sentiment: Option<String>,
    pub explanation: Option<String>,
}

impl EmotionAnalysis {
    /// Read an analysis object, `None` if it has no usable primary emotion
    pub fn from_value(value: &Value) -> Option<Self> {
        let primary_emotion = value.get("primary_emotion")?.as_str()?.trim().to_string();
        if primary_emotion.is_empty() {
            return None;
        }

        Some(Self {
            primary_emotion,
            secondary_emotions: string_list(value.get("secondary_emotions")),
            intensity: value.get("intensity").and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }),
            keywords: string_list(value.get("keywords")),
            sentiment: value.get("sentiment").and_then(Value::as_str).map(str::to_string),
            explanation: value.get("explanation").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// `"Primary"` or `"Primary + Secondary"`, title cased
    pub fn label(&self) -> String {
        let primary = title_case(&self.primary_emotion);
        match self.secondary_emotions.first() {
            Some(secondary) => format!("{primary} + {}", title_case(secondary)),
            None => primary,
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
