use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Assistant,
}

/// Source document referenced by an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub origin: Origin,
    pub text: String,
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: Origin::User,
            text: text.into(),
            citations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: Origin::Assistant,
            text: text.into(),
            citations,
            created_at: Utc::now(),
        }
    }
}

/// Keeps the first citation per distinct file name, in input order.
pub fn dedup_citations(citations: Vec<Citation>) -> Vec<Citation> {
    let mut out: Vec<Citation> = Vec::with_capacity(citations.len());
    for c in citations {
        if !out.iter().any(|kept| kept.file_name == c.file_name) {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cit(file_name: &str, url: &str) -> Citation {
        Citation { file_name: file_name.into(), url: url.into() }
    }

    #[test]
    fn dedup_keeps_first_occurrence_per_file_name() {
        let input = vec![
            cit("a.pdf", "https://x/a-first.pdf"),
            cit("a.pdf", "https://x/a-second.pdf"),
            cit("b.pdf", "https://x/b.pdf"),
        ];
        let out = dedup_citations(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].file_name, "a.pdf");
        assert_eq!(out[0].url, "https://x/a-first.pdf");
        assert_eq!(out[1].file_name, "b.pdf");
    }

    #[test]
    fn dedup_passes_distinct_names_through() {
        let input = vec![cit("a.pdf", "u1"), cit("b.pdf", "u2")];
        assert_eq!(dedup_citations(input.clone()), input);
    }

    #[test]
    fn message_constructors_set_origin() {
        let user = Message::user("hola");
        assert_eq!(user.origin, Origin::User);
        assert!(user.citations.is_empty());

        let assistant = Message::assistant("respuesta", vec![cit("ley.pdf", "u")]);
        assert_eq!(assistant.origin, Origin::Assistant);
        assert_eq!(assistant.citations.len(), 1);
    }
}
