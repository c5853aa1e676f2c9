use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::models::trip::{PaceMode, TripParameters};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 60;
// The existing document is passed as context for partial regeneration,
// truncated so the prompt stays within budget.
const CONTEXT_CHAR_LIMIT: usize = 3000;

#[derive(Debug)]
pub enum GenerationError {
    MissingApiKey,
    Http(reqwest::Error),
    Api(String),
    EmptyOutput,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::MissingApiKey => write!(f, "OpenAI API key is not configured"),
            GenerationError::Http(err) => write!(f, "HTTP error: {}", err),
            GenerationError::Api(msg) => write!(f, "OpenAI API error: {}", msg),
            GenerationError::EmptyOutput => write!(f, "The model returned no content"),
        }
    }
}

impl Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the generation backend. The backend is treated as a black box
/// that produces text matching known patterns, sometimes malformed; repair
/// lives downstream in the markdown engine.
pub struct GenerationService {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl GenerationService {
    pub fn from_env() -> GenerationService {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        GenerationService {
            http,
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or(GenerationError::MissingApiKey)?;

        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.7,
            "max_tokens": max_tokens,
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or_else(|| format!("status {}", status));
            return Err(GenerationError::Api(message));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(GenerationError::EmptyOutput);
        }
        Ok(content)
    }

    /// Full itinerary as markdown.
    pub async fn generate(&self, params: &TripParameters) -> Result<String, GenerationError> {
        self.chat(
            "You write travel itineraries as markdown only. No preamble or closing remarks.",
            &build_generate_prompt(params),
            3000,
            false,
        )
        .await
    }

    /// A single regenerated `## Day {n}` block.
    pub async fn regenerate_day(
        &self,
        params: &TripParameters,
        day_number: u32,
        existing_markdown: &str,
    ) -> Result<String, GenerationError> {
        self.chat(
            "You rewrite exactly one day of a travel itinerary as markdown. No preamble or closing remarks.",
            &build_regenerate_day_prompt(params, day_number, existing_markdown),
            1400,
            false,
        )
        .await
    }

    /// A single regenerated `### {section}` block for one day.
    pub async fn regenerate_section(
        &self,
        params: &TripParameters,
        day_number: u32,
        section_title: &str,
        day_markdown: &str,
    ) -> Result<String, GenerationError> {
        self.chat(
            "You rewrite exactly one section of one itinerary day as markdown. No preamble or closing remarks.",
            &build_regenerate_section_prompt(params, day_number, section_title, day_markdown),
            700,
            false,
        )
        .await
    }

    /// The structured path: a JSON object matching the itinerary schema.
    pub async fn generate_structured(
        &self,
        params: &TripParameters,
    ) -> Result<String, GenerationError> {
        self.chat(
            "You produce travel itineraries as a single JSON object. No markdown, no commentary.",
            &build_structured_prompt(params),
            3000,
            true,
        )
        .await
    }
}

fn style_list(params: &TripParameters) -> String {
    let styles = params.styles();
    if styles.is_empty() {
        "general sightseeing".to_string()
    } else {
        styles.join(", ")
    }
}

fn depth_instruction(nights: u32) -> &'static str {
    if nights <= 2 {
        "Focus on the essential sights and keep transfers short."
    } else if nights <= 4 {
        "Beyond the major sights, include one or two hidden gems."
    } else {
        "Include at least one nearby excursion or day-trip suggestion."
    }
}

fn pace_instruction(pace: PaceMode) -> &'static str {
    match pace {
        PaceMode::Relaxed => "Leave generous time for breaks and slow transfers.",
        PaceMode::Standard => "Balance sightseeing and downtime.",
        PaceMode::Packed => {
            "Pack in the key sights, but keep the stated transfer times realistic."
        }
    }
}

fn shared_rules(params: &TripParameters) -> String {
    format!(
        "- Every place gets a short description and the **estimated move time** to the next stop, written as \"move N min\".\n\
         - Include **2-3 concrete places** per section (1-2 for Lunch/Dinner).\n\
         - Give each place either a **suggested stay time** or a **visiting tip**.\n\
         - {}\n\
         - {}\n\
         - Group places geographically to minimize backtracking.\n\
         - Keep each day within the {}:00-{}:00 activity window.\n\
         - Links must be real URLs starting with https://; when unsure, use a Google Maps search link (https://www.google.com/maps/search/?api=1&query=place+city).",
        depth_instruction(params.nights),
        pace_instruction(params.pace),
        params.day_start_hour,
        params.day_end_hour,
    )
}

fn build_generate_prompt(params: &TripParameters) -> String {
    format!(
        "You are a professional travel planner. Write a day-by-day itinerary in markdown.\n\n\
         **Destination:** {city}, {country}\n\
         **Days:** {days} ({nights} nights)\n\
         **Travel styles:** {styles}\n\
         **Budget mode:** {budget}\n\
         **Companions:** {companions}\n\
         **Pace:** {pace}\n\n\
         **Format:**\n\
         - Output valid markdown only; start with the itinerary itself.\n\
         - Each day: `## Day N - [theme]`, then `### Morning`, `### Lunch`, `### Afternoon`, `### Dinner`, `### Night` (optional).\n\
         {rules}\n\n\
         Example:\n\
         ## Day 1 - Seaside walks and food\n\
         ### Morning\n\
         - **Beach promenade** morning walk with the best views. [Google Maps](https://www.google.com/maps/search/?api=1&query=beach+promenade) move 15 min\n\
         ### Lunch\n\
         - **Harbor kitchen** the local specialty. [Official site](https://example.com)\n",
        city = params.city,
        country = params.country,
        days = params.days(),
        nights = params.nights,
        styles = style_list(params),
        budget = params.budget_mode.as_str(),
        companions = params.companion_type.as_str(),
        pace = params.pace.as_str(),
        rules = shared_rules(params),
    )
}

fn truncate_context(markdown: &str) -> &str {
    let mut end = markdown.len().min(CONTEXT_CHAR_LIMIT);
    while end < markdown.len() && !markdown.is_char_boundary(end) {
        end += 1;
    }
    &markdown[..end]
}

fn build_regenerate_day_prompt(
    params: &TripParameters,
    day_number: u32,
    existing_markdown: &str,
) -> String {
    format!(
        "You are a professional travel planner. Rewrite only **Day {day}** of the itinerary below.\n\n\
         **Destination:** {city}, {country}\n\
         **Travel styles:** {styles}\n\
         **Budget mode:** {budget}\n\
         **Companions:** {companions}\n\
         **Pace:** {pace}\n\n\
         **Existing itinerary (context only; rewrite Day {day} alone):**\n\
         ```\n{context}\n```\n\n\
         Output just the Day {day} block in markdown. It must start with `## Day {day} - ...` and use the `### Morning`, `### Lunch`, `### Afternoon`, `### Dinner`, `### Night` (optional) sections.\n\
         {rules}",
        day = day_number,
        city = params.city,
        country = params.country,
        styles = style_list(params),
        budget = params.budget_mode.as_str(),
        companions = params.companion_type.as_str(),
        pace = params.pace.as_str(),
        context = truncate_context(existing_markdown),
        rules = shared_rules(params),
    )
}

fn build_regenerate_section_prompt(
    params: &TripParameters,
    day_number: u32,
    section_title: &str,
    day_markdown: &str,
) -> String {
    format!(
        "You are a professional travel planner. Rewrite only the **{section}** section of Day {day}.\n\n\
         **Destination:** {city}, {country}\n\
         **Travel styles:** {styles}\n\
         **Budget mode:** {budget}\n\
         **Pace:** {pace}\n\n\
         **The current day (context only; rewrite the {section} section alone):**\n\
         ```\n{context}\n```\n\n\
         Output just that section in markdown, starting with `### {section}`. Include 1-3 concrete places with short descriptions and \"move N min\" transfer hints, and only https:// links.",
        section = section_title,
        day = day_number,
        city = params.city,
        country = params.country,
        styles = style_list(params),
        budget = params.budget_mode.as_str(),
        pace = params.pace.as_str(),
        context = truncate_context(day_markdown),
    )
}

fn build_structured_prompt(params: &TripParameters) -> String {
    format!(
        "Plan a {days}-day trip to {city}, {country} for {companions} travelers ({styles}; {budget} budget; {pace} pace; active {start}:00-{end}:00).\n\n\
         Respond with a single JSON object of this exact shape:\n\
         {{\"days\": [{{\"day\": 1, \"theme\": \"...\", \"activities\": [{{\"name\": \"...\", \"type\": \"sight|museum|restaurant|...\", \"stayMinutes\": 90, \"moveMinutesToNext\": 15, \"lat\": 0.0, \"lng\": 0.0}}]}}]}}\n\n\
         Rules: every day from 1 to {days} appears exactly once; stayMinutes between 30 and 240; moveMinutesToNext between 0 and 180 and 0 for the last activity of a day; lat/lng only when you are confident, otherwise omit them; meal stops get a food-related type.",
        days = params.days(),
        city = params.city,
        country = params.country,
        companions = params.companion_type.as_str(),
        styles = style_list(params),
        budget = params.budget_mode.as_str(),
        pace = params.pace.as_str(),
        start = params.day_start_hour,
        end = params.day_end_hour,
    )
}
