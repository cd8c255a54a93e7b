//! Question documents and their fixed-width row form.

use crate::media::MediaDescriptor;
use crate::sanitize::{sanitize_value, truthy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

pub const ANSWER_SLOTS: usize = 3;

/// One `question.json` document. Every field tolerates being absent or of
/// the wrong type; such fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionRecord {
    pub id: Value,
    pub question_text: Value,
    pub explanation_note: Value,
    #[serde(deserialize_with = "lenient")]
    pub media_content: Option<MediaDescriptor>,
    #[serde(deserialize_with = "lenient_seq")]
    pub question_answers: Vec<AnswerOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerOption {
    pub answer_text: Value,
    #[serde(deserialize_with = "lenient")]
    pub media_content: Option<MediaDescriptor>,
    pub is_correct: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub id: String,
    pub question_text: String,
    pub explanation_note: String,
    pub media_content: String,
    pub answers: [String; ANSWER_SLOTS],
    pub correct: [bool; ANSWER_SLOTS],
    pub tags: String,
}

impl QuestionRecord {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    pub fn id_text(&self) -> String {
        sanitize_value(&self.id)
    }
}

impl AnswerOption {
    pub fn new(text: &str, correct: bool) -> Self {
        Self {
            answer_text: Value::from(text),
            media_content: None,
            is_correct: Value::Bool(correct),
        }
    }

    pub fn correct(&self) -> bool {
        truthy(&self.is_correct)
    }

    /// Sanitized text, led by the answer's own media reference if it has one.
    pub fn render(&self) -> String {
        let text = sanitize_value(&self.answer_text);
        let reference = self
            .media_content
            .as_ref()
            .map(MediaDescriptor::reference)
            .unwrap_or_default();
        if reference.is_empty() {
            text
        } else {
            format!("{reference} {text}")
        }
    }
}

/// Builds the 11-field row for a record. Answers past the third are
/// dropped; missing slots are filled with empty text marked `false`.
pub fn normalize(record: &QuestionRecord) -> NormalizedRow {
    let mut answers: [String; ANSWER_SLOTS] = Default::default();
    let mut correct = [false; ANSWER_SLOTS];
    for (slot, answer) in record.question_answers.iter().take(ANSWER_SLOTS).enumerate() {
        answers[slot] = answer.render();
        correct[slot] = answer.correct();
    }

    NormalizedRow {
        id: record.id_text(),
        question_text: sanitize_value(&record.question_text),
        explanation_note: sanitize_value(&record.explanation_note),
        media_content: record
            .media_content
            .as_ref()
            .map(MediaDescriptor::reference)
            .unwrap_or_default(),
        answers,
        correct,
        tags: String::new(),
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl NormalizedRow {
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.question_text.as_str(),
            self.explanation_note.as_str(),
            self.media_content.as_str(),
        ];
        fields.extend(self.answers.iter().map(String::as_str));
        fields.extend(self.correct.iter().map(|&c| flag(c)));
        fields.push(self.tags.as_str());
        fields
    }
}

impl fmt::Display for NormalizedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields().join("\t"))
    }
}

/// Decodes a field, falling back to its default when the JSON has the
/// wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> QuestionRecord {
        QuestionRecord::from_value(value)
    }

    #[test]
    fn sign_question_row() {
        let row = normalize(&record(json!({
            "id": "7",
            "questionText": "Sign?",
            "mediaContent": {"printMediaName": "sign7.png"},
            "questionAnswers": [
                {"answerText": "Stop", "isCorrect": true},
                {"answerText": "Go", "isCorrect": false}
            ]
        })));
        assert_eq!(
            row.to_string(),
            "7\tSign?\t\t<img src=\"sign7.png\" alt=\"sign7.png\">\tStop\tGo\t\ttrue\tfalse\tfalse\t"
        );
    }

    #[test]
    fn always_three_answer_slots() {
        for count in 0..6 {
            let answers: Vec<Value> = (0..count)
                .map(|i| json!({"answerText": format!("a{i}"), "isCorrect": i == 4}))
                .collect();
            let row = normalize(&record(json!({"id": 1, "questionAnswers": answers})));
            assert_eq!(row.fields().len(), 11);
            for slot in 0..ANSWER_SLOTS {
                if slot < count {
                    assert_eq!(row.answers[slot], format!("a{slot}"));
                } else {
                    assert_eq!(row.answers[slot], "");
                    assert!(!row.correct[slot]);
                }
            }
        }
    }

    #[test]
    fn extra_answers_are_dropped() {
        let row = normalize(&record(json!({
            "questionAnswers": [
                {"answerText": "a"}, {"answerText": "b"},
                {"answerText": "c"}, {"answerText": "d", "isCorrect": true}
            ]
        })));
        assert_eq!(row.answers, ["a", "b", "c"].map(String::from));
        assert_eq!(row.correct, [false; 3]);
    }

    #[test]
    fn answer_media_leads_the_text() {
        let row = normalize(&record(json!({
            "questionAnswers": [
                {"answerText": "Left", "mediaContent": {"mediaUrl": "https://x.md/img/l.JPG"}, "isCorrect": 1},
                {"answerText": "", "mediaContent": {"printMediaName": "clip.mp4"}}
            ]
        })));
        assert_eq!(row.answers[0], r#"<img src="l.JPG" alt="l.JPG"> Left"#);
        assert_eq!(row.answers[1], "[sound:clip.mp4] ");
        assert_eq!(row.correct, [true, false, false]);
    }

    #[test]
    fn malformed_fields_degrade_to_empty() {
        let row = normalize(&record(json!({
            "id": null,
            "questionText": "Line one\nline\ttwo",
            "explanationNote": 0,
            "mediaContent": "not-a-mapping",
            "questionAnswers": ["oops", {"answerText": ["x"], "mediaContent": {"mediaUrl": 5}}]
        })));
        assert_eq!(row.id, "");
        assert_eq!(row.question_text, "Line one line two");
        assert_eq!(row.explanation_note, "");
        assert_eq!(row.media_content, "");
        assert_eq!(row.answers, ["", "[\"x\"]", ""].map(String::from));
    }

    #[test]
    fn control_characters_in_media_names_stay_in_their_field() {
        let row = normalize(&record(json!({
            "id": 1,
            "mediaContent": {"printMediaName": "a\tb.png"},
            "questionAnswers": [
                {"answerText": "x", "mediaContent": {"printMediaName": "c\nd.mp4"}},
                {"answerText": "y", "mediaContent": {"mediaUrl": "https://x.md/e\rf.gif"}}
            ]
        })));
        let line = row.to_string();
        assert_eq!(line.split('\t').count(), 11);
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));
        assert_eq!(row.media_content, r#"<img src="a b.png" alt="a b.png">"#);
        assert_eq!(row.answers[0], "[sound:c d.mp4] x");
    }

    #[test]
    fn non_object_document_gives_empty_row() {
        let row = normalize(&record(json!([1, 2, 3])));
        assert_eq!(row.to_string(), "\t\t\t\t\t\t\tfalse\tfalse\tfalse\t");
    }

    #[test]
    fn normalizing_a_row_again_keeps_answers() {
        let first = normalize(&record(json!({
            "id": 3,
            "questionText": "Q",
            "questionAnswers": [
                {"answerText": "x", "mediaContent": {"printMediaName": "x.png"}},
                {"answerText": "y", "isCorrect": true}
            ]
        })));
        let again = QuestionRecord {
            id: Value::from(first.id.clone()),
            question_text: Value::from(first.question_text.clone()),
            explanation_note: Value::from(first.explanation_note.clone()),
            media_content: None,
            question_answers: first
                .answers
                .iter()
                .zip(first.correct)
                .map(|(text, correct)| AnswerOption::new(text, correct))
                .collect(),
        };
        let second = normalize(&again);
        assert_eq!(second.answers, first.answers);
        assert_eq!(second.correct, first.correct);
        assert_eq!(second.question_text, first.question_text);
    }
}
