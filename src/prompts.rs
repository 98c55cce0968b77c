// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt templates for model calls

/// Characters of a previous answer quoted in the related-questions prompt
const ANSWER_EXCERPT_CHARS: usize = 500;

/// Ask whether `new_query` follows on from `previous_query`; expects YES or NO
pub fn context_detection(previous_query: &str, new_query: &str) -> String {
    format!(
        r#"Decide whether a new search query continues the conversation started by the previous one.

Previous query: "{previous_query}"
New query: "{new_query}"

Reply YES when the new query refers back to the previous one (pronouns such as "it" or "they", "what about ...", follow-up details). Reply NO when it starts an unrelated subject.

Examples:
Previous: "How do vaccines work?" / New: "Are they safe for children?" -> YES
Previous: "Population of Canada" / New: "How to bake sourdough" -> NO
Previous: "Rust async runtimes" / New: "Which one is fastest?" -> YES

Answer (YES or NO):"#
    )
}

/// Rewrite a follow-up into a standalone search query
pub fn query_rewriting(previous_query: &str, new_query: &str, history: &[String]) -> String {
    let history_block = if history.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = history
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {}", i + 1, q))
            .collect();
        format!("\n\nRecent queries:\n{}", lines.join("\n"))
    };

    format!(
        r#"Turn a follow-up question into a standalone web search query.{history_block}

Previous query: "{previous_query}"
Follow-up query: "{new_query}"

Fold in whatever the follow-up leaves implicit so a search engine can understand it on its own. Keep it under 100 characters and reply with the query only.

Examples:
Previous: "What is diabetes?" / Follow-up: "What are the symptoms?" -> What are the symptoms of diabetes?
Previous: "Raspberry Pi 5 review" / Follow-up: "How much does it cost?" -> Raspberry Pi 5 price
Previous: "Learning Rust" / Follow-up: "What about lifetimes?" -> Rust lifetimes explained

Rewritten query:"#
    )
}

/// Short topic label for a query
pub fn topic_extraction(query: &str) -> String {
    format!(
        r#"Name the main subject of this query in two to four words.

Query: "{query}"

Examples:
"What are the health benefits of green tea?" -> green tea benefits
"How does garbage collection work in Go?" -> Go garbage collection
"Tips for growing tomatoes indoors" -> indoor tomato growing

Topic:"#
    )
}

/// Answer prompt built from the question and rendered source blocks
pub fn answer_generation(question: &str, sources: &str) -> String {
    format!(
        r#"You are a research assistant. Answer the question using only the numbered sources below.

Rules:
1. Use only facts found in the sources; add no outside knowledge.
2. Cite sources inline with their numbers, e.g. [1] or [2][3].
3. Write Markdown: ## for headings, **bold** for key terms, lists where they help.
4. Separate paragraphs with a blank line.
5. When sources disagree, present each view with its citation.
6. When the sources are insufficient, say what is missing.
7. Do not add a references section and do not output HTML.

Question: {question}

Sources:
{sources}

Answer with inline citations:"#
    )
}

/// Ask for five follow-up questions as a JSON array
pub fn related_questions(question: &str, answer: Option<&str>) -> String {
    let (subject, answer_block) = match answer {
        Some(answer) => {
            let excerpt: String = answer.chars().take(ANSWER_EXCERPT_CHARS).collect();
            (" and answer", format!("\n\nAnswer excerpt:\n{}...", excerpt))
        }
        None => ("", String::new()),
    };

    format!(
        r#"Suggest 5 short follow-up questions for this question{subject}.{answer_block}

Question: "{question}"

Each follow-up should explore a different angle, stay under 80 characters and end with a question mark.

Reply with a JSON array of strings and nothing else, for example:
["How is it measured?", "What are the main risks?", "Who regulates it?", "How has it changed recently?", "What are the alternatives?"]

JSON array:"#
    )
}
