// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use futures::StreamExt;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::ask::{AskError, AskPipeline};
use crate::llm::StreamEvent;
use crate::query::ConversationStore;
use crate::rag::{citation_lines, SourceRef};
use crate::version;

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Print the answer token by token
    #[arg(long)]
    pub stream: bool,
}

/// Arguments for the chat command
///
/// Follow-up questions and cache statistics are kept for the lifetime of
/// the chat process only.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Print answers token by token (defaults to ENABLE_STREAMING)
    #[arg(long)]
    pub stream: bool,
}

/// Arguments for the related command
#[derive(Args, Debug)]
pub struct RelatedArgs {
    /// The original question
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Answer text to draw follow-ups from
    #[arg(long)]
    pub answer: Option<String>,
}

pub async fn ask(pipeline: &AskPipeline, args: AskArgs) -> Result<()> {
    let session = ConversationStore::new_session_id();
    answer_question(pipeline, &session, &args.question.join(" "), args.stream).await
}

pub async fn chat(pipeline: &AskPipeline, args: ChatArgs) -> Result<()> {
    let session = ConversationStore::new_session_id();
    let stream = args.stream || pipeline.streaming_enabled();
    println!("Session {} (/clear resets context, /stats shows cache stats, /quit exits)", session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                pipeline.clear_context(&session).await;
                println!("Context cleared");
            }
            "/stats" => print_stats(pipeline)?,
            question => {
                if let Err(e) = answer_question(pipeline, &session, question, stream).await {
                    eprintln!("❌ {}", e);
                }
            }
        }
    }
    Ok(())
}

pub async fn related(pipeline: &AskPipeline, args: RelatedArgs) -> Result<()> {
    let question = args.question.join(" ");
    let questions = match pipeline.related_questions(&question, args.answer.as_deref()).await {
        Ok(questions) => questions,
        Err(e) => return report(e),
    };
    if questions.is_empty() {
        println!("No related questions available.");
    }
    for (i, q) in questions.iter().enumerate() {
        println!("{}. {}", i + 1, q);
    }
    Ok(())
}

fn print_stats(pipeline: &AskPipeline) -> Result<()> {
    let view = serde_json::json!({
        "version": version::get_version_info(),
        "cache": pipeline.cache_stats(),
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn answer_question(pipeline: &AskPipeline, session: &str, question: &str, stream: bool) -> Result<()> {
    if !stream {
        let response = match pipeline.ask(session, question).await {
            Ok(response) => response,
            Err(e) => return report(e),
        };
        println!("{}", response.answer);
        print_citations(&response.sources);
        println!("({} ms)", response.processing_time_ms);
        return Ok(());
    }

    let mut response = match pipeline.ask_stream(session, question).await {
        Ok(response) => response,
        Err(e) => return report(e),
    };
    let mut stdout = std::io::stdout();
    while let Some(event) = response.tokens.next().await {
        match event {
            StreamEvent::Token(token) => {
                print!("{}", token);
                stdout.flush()?;
            }
            StreamEvent::Done {
                skipped_fragments, ..
            } => {
                println!();
                if skipped_fragments > 0 {
                    warn!("{} malformed stream fragments were skipped", skipped_fragments);
                }
            }
            StreamEvent::Error(message) => {
                println!();
                return Err(anyhow!("answer stream failed: {}", message));
            }
        }
    }
    print_citations(&response.sources);
    println!("({} ms)", response.elapsed_ms());
    Ok(())
}

fn print_citations(sources: &[SourceRef]) {
    if sources.is_empty() {
        return;
    }
    println!("\nSources:");
    for line in citation_lines(sources) {
        println!("  {}", line);
    }
}

/// Show "no answer" outcomes to the user; propagate infrastructure failures
fn report(error: AskError) -> Result<()> {
    if error.is_upstream() {
        return Err(anyhow!("{} [{}]: {}", error.user_message(), error.error_code(), error));
    }
    println!("{}", error.user_message());
    Ok(())
}
