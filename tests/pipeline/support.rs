// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Shared fakes for the search engine, the web and the language model
#![allow(dead_code)]

use async_trait::async_trait;
use atlas_rag::content::{PageResponse, PageTransport, ScrapeError};
use atlas_rag::llm::{GenerateOptions, LanguageModel, LlmError, StreamEvent, TokenStream};
use atlas_rag::search::{SearchError, SearchHit, SearchProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn hit(title: &str, url: &str, snippet: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
        published_date: None,
    }
}

/// An article page whose body is `text`
pub fn article(text: &str) -> String {
    format!(
        "<html><body><nav>Home | About</nav><article><p>{}</p></article><footer>(c) 2025</footer></body></html>",
        text
    )
}

/// Search engine returning the same hits for every query
pub struct StaticSearch {
    pub hits: Vec<SearchHit>,
    pub queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Serves pages by URL, tracking peak concurrency; unknown URLs get 404
pub struct FakeWeb {
    pages: HashMap<String, (u16, String)>,
    delay: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub requests: AtomicUsize,
}

impl FakeWeb {
    pub fn new(delay: Duration) -> Self {
        Self {
            pages: HashMap::new(),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn page(mut self, url: &str, status: u16, body: String) -> Self {
        self.pages.insert(url.to_string(), (status, body));
        self
    }
}

#[async_trait]
impl PageTransport for FakeWeb {
    async fn get(&self, url: &str) -> Result<PageResponse, ScrapeError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let (status, body) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(PageResponse { status, body })
    }
}

/// Language model answering each prompt kind with a canned reply
pub struct CannedModel {
    pub follow_up: bool,
    pub rewrite: String,
    pub topic: String,
    pub answer: String,
    pub related: String,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    pub fn new(answer: &str) -> Self {
        Self {
            follow_up: false,
            rewrite: String::new(),
            topic: "general".to_string(),
            answer: answer.to_string(),
            related: "[]".to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.ends_with("Answer with inline citations:"))
            .cloned()
            .collect()
    }

    fn reply(&self, prompt: &str) -> String {
        if prompt.ends_with("Answer (YES or NO):") {
            if self.follow_up { "YES" } else { "NO" }.to_string()
        } else if prompt.ends_with("Rewritten query:") {
            self.rewrite.clone()
        } else if prompt.ends_with("Topic:") {
            self.topic.clone()
        } else if prompt.ends_with("JSON array:") {
            self.related.clone()
        } else {
            self.answer.clone()
        }
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, prompt: &str, _options: GenerateOptions) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply(prompt))
    }

    async fn generate_stream(&self, prompt: &str, _options: GenerateOptions) -> Result<TokenStream, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.reply(prompt);
        let mut events: Vec<StreamEvent> = reply
            .split_inclusive(' ')
            .map(|token| StreamEvent::Token(token.to_string()))
            .collect();
        events.push(StreamEvent::Done {
            text: reply,
            skipped_fragments: 0,
        });
        Ok(TokenStream::from_events(events))
    }

    fn name(&self) -> &str {
        "canned"
    }
}
