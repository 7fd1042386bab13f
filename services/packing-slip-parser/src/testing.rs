//! In-memory stand-ins for the AI API used across the service's tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::gemini_client::{CompletionClient, GenerationSettings};

type Responder = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// Completion client that answers from a closure and records every prompt.
pub struct MockCompletionClient {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
    settings: Mutex<Vec<GenerationSettings>>,
}

impl MockCompletionClient {
    pub fn new(responder: impl Fn(&str) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
            settings: Mutex::new(Vec::new()),
        }
    }

    /// Answers in order; `Err` entries become API failures.
    pub fn scripted(responses: Vec<Result<&str, &str>>) -> Self {
        let queue: Mutex<VecDeque<Result<String, String>>> = Mutex::new(
            responses
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect(),
        );
        Self::new(move |_| match queue.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted response left")),
        })
    }

    /// Answers every prompt with plausible records derived from the page numbers in it.
    pub fn echo() -> Self {
        Self::new(|prompt| Ok(echo_response(prompt)))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| Err(anyhow!(message)))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn settings(&self) -> Vec<GenerationSettings> {
        self.settings.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, prompt: &str, settings: GenerationSettings) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.settings.lock().unwrap().push(settings);
        (self.responder)(prompt)
    }
}

pub fn slip(customer_id: &str, attention: &str, quantity: i64) -> Value {
    json!({
        "customerId": customer_id,
        "companyName": "Not found",
        "attention": attention,
        "address1": "123 Main St",
        "cityOrTown": "Red Deer",
        "stateProvinceCounty": "AB",
        "postalCode": "T4N1A1",
        "telephone": "4035551234",
        "upsService": "UPS Express Saver",
        "quantity": quantity
    })
}

/// Page numbers named in a batch prompt's slip headers, in prompt order.
pub fn prompt_page_numbers(prompt: &str) -> Vec<u32> {
    prompt
        .lines()
        .filter_map(|line| line.strip_prefix("--- PACKING SLIP "))
        .filter_map(|rest| {
            let start = rest.find("(Page ")? + "(Page ".len();
            let end = rest[start..].find(')')? + start;
            rest[start..end].parse().ok()
        })
        .collect()
}

fn echo_response(prompt: &str) -> String {
    if prompt.contains("PACKING SLIPS TO PROCESS") {
        let records: Vec<Value> = prompt_page_numbers(prompt)
            .into_iter()
            .map(|page| slip(&format!("{:010}", page), &format!("Person {}", page), 1))
            .collect();
        Value::Array(records).to_string()
    } else {
        format!("```json\n{}\n```", slip("1214327946", "Jane Doe", 2))
    }
}
