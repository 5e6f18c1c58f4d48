//! Prompt construction and SQL extraction.

use crate::training::TrainingContext;
use serde::Serialize;

/// A chat turn sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            content: content.into(),
        }
    }
}

/// System instructions plus the conversation that ends in the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

/// Build the prompt for `question`.
///
/// DDL and documentation go into the system text. Question/SQL pairs become
/// few-shot turns ahead of the real question.
pub fn build_prompt(context: &TrainingContext, question: &str) -> Prompt {
    let mut system = String::from(
        "You are a MySQL expert. Write one SQL query that answers the user's question. \
         Base the query only on the context below.\n",
    );

    if !context.ddl.is_empty() {
        system.push_str("\n===Tables\n");
        for ddl in &context.ddl {
            system.push_str(ddl.trim());
            system.push_str("\n\n");
        }
    }

    if !context.documentation.is_empty() {
        system.push_str("\n===Additional Context\n");
        for doc in &context.documentation {
            system.push_str(doc.trim());
            system.push_str("\n\n");
        }
    }

    system.push_str(
        "\n===Response Guidelines\n\
         1. Respond with the SQL only, inside a ```sql code block.\n\
         2. Use MySQL syntax.\n\
         3. If the context is not enough to answer, say so instead of guessing table names.\n",
    );

    let mut messages = Vec::with_capacity(context.question_sql.len() * 2 + 1);
    for (example_question, example_sql) in &context.question_sql {
        messages.push(ChatMessage::user(example_question.trim()));
        messages.push(ChatMessage::assistant(format!(
            "```sql\n{}\n```",
            example_sql.trim()
        )));
    }
    messages.push(ChatMessage::user(question.trim()));

    Prompt { system, messages }
}

/// Pull the SQL out of a model reply.
///
/// Takes the first ```` ```sql ```` block, else the first fenced block of any
/// language, else the whole reply. Returns `None` when nothing but
/// whitespace remains.
pub fn extract_sql(reply: &str) -> Option<String> {
    let sql = fenced_block(reply, Some("sql"))
        .or_else(|| fenced_block(reply, None))
        .unwrap_or(reply)
        .trim();

    if sql.is_empty() {
        None
    } else {
        Some(sql.to_string())
    }
}

fn fenced_block<'a>(text: &'a str, lang: Option<&str>) -> Option<&'a str> {
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let (info, body) = split_info(&rest[open + 3..]);

        let end = body.find("```")?;
        let wanted = match lang {
            Some(lang) => info.eq_ignore_ascii_case(lang),
            None => true,
        };
        if wanted {
            return Some(&body[..end]);
        }
        rest = &body[end + 3..];
    }
    None
}

/// Split the text after an opening fence into its language tag and code.
///
/// A tag normally fills the opening line. Models also write `sql` followed
/// by the statement on the same line, with or without the closing fence.
fn split_info(after: &str) -> (&str, &str) {
    let newline = after.find('\n');
    let line_end = [newline, after.find("```")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(after.len());
    let line = &after[..line_end];

    let tag = line.trim();
    if newline == Some(line_end) && !tag.contains(char::is_whitespace) {
        return (tag, &after[line_end + 1..]);
    }

    let start = line.len() - line.trim_start().len();
    if let Some(len) = line[start..].find(char::is_whitespace) {
        let tag = &line[start..start + len];
        if tag.eq_ignore_ascii_case("sql") {
            return (tag, &after[start + len..]);
        }
    }
    ("", after)
}
