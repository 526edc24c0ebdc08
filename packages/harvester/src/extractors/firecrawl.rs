//! Firecrawl-based extractor implementation.
//!
//! Uses the Firecrawl scrape API's `extract` format to pull structured
//! event fields plus the page markdown in a single call.
//!
//! Requires the `firecrawl` feature to be enabled.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{ExtractError, ExtractResult};
use crate::traits::extractor::{ExtractedDocument, Extractor};
use crate::types::record::RawExtraction;

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// Extractor backed by the Firecrawl scrape API.
///
/// Firecrawl renders JavaScript-heavy pages and runs the structured
/// extraction server-side against the schema below.
///
/// # Example
///
/// ```rust,ignore
/// use harvester::extractors::FirecrawlExtractor;
///
/// let extractor = FirecrawlExtractor::from_env()?;
/// let document = extractor.extract("https://example.com/conf").await?;
/// ```
pub struct FirecrawlExtractor {
    client: Client,
    api_key: String,
}

#[derive(Serialize)]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
    extract: ExtractSpec,
}

#[derive(Serialize)]
struct ExtractSpec {
    schema: Value,
    prompt: String,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    extract: Option<RawExtraction>,
    markdown: Option<String>,
}

impl FirecrawlExtractor {
    /// Create a new Firecrawl extractor with the given API key.
    pub fn new(api_key: impl Into<String>) -> ExtractResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExtractError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Create from the `FIRECRAWL_API_KEY` environment variable.
    pub fn from_env() -> ExtractResult<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY").map_err(|_| {
            ExtractError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "FIRECRAWL_API_KEY environment variable not set",
            )))
        })?;
        Self::new(api_key)
    }

    /// JSON schema sent with every scrape. Shapes are deliberately loose
    /// (`["string", "object"]` unions) because the upstream model does not
    /// return a fixed shape per field.
    fn event_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "description": { "type": "string" },
                "start_date": { "type": "string" },
                "end_date": { "type": "string" },
                "city": { "type": "string" },
                "state": { "type": "string" },
                "country": { "type": "string" },
                "attendee_count": { "type": ["number", "string"] },
                "topics": { "type": "array", "items": { "type": "string" } },
                "event_type": { "type": "string" },
                "attendee_title": { "type": "string" },
                "logo_url": { "type": "string" },
                "sponsorship_options": { "type": ["string", "object"] },
                "agenda": { "type": ["string", "object"] },
                "audience_insights": { "type": ["string", "object"] },
                "sponsors": {
                    "type": ["array", "object"],
                    "items": { "type": "string" }
                },
                "hosting_company": { "type": ["string", "object"] },
                "ticket_cost": { "type": "string" },
                "contact_email": { "type": "string" }
            },
            "required": ["name", "start_date"]
        })
    }

    fn extract_prompt() -> String {
        [
            "Extract detailed event information including:",
            "- name",
            "- description",
            "- start date",
            "- end date",
            "- city",
            "- state (full state name)",
            "- country",
            "- attendee count",
            "- topics or themes discussed at the event",
            "- event type: choose between: conference, workshop, roundtable",
            "- titles of attendees attending the event",
            "- logo URL",
            "- sponsorship options (not ticket prices)",
            "- event agenda or schedule",
            "- demographics of attendees",
            "- list of sponsoring companies, also called partners or exhibitors (company names only)",
            "- hosting company or organization",
            "- contact email",
            "- cost of a ticket to attend",
            "Provide as much detail as possible for each field. Don't make anything up.",
            "Use only information extracted from the page. If you don't know what something is, leave it blank.",
        ]
        .join("\n")
    }
}

#[async_trait]
impl Extractor for FirecrawlExtractor {
    async fn extract(&self, url: &str) -> ExtractResult<ExtractedDocument> {
        tracing::debug!(url, "requesting Firecrawl extraction");

        let request = ScrapeRequest {
            url: url.to_string(),
            formats: vec!["markdown".to_string(), "extract".to_string()],
            extract: ExtractSpec {
                schema: Self::event_schema(),
                prompt: Self::extract_prompt(),
            },
        };

        let response = self
            .client
            .post(format!("{FIRECRAWL_API_URL}/scrape"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    ExtractError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Http(Box::new(e)))?;

        if !body.success {
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message: "Firecrawl scrape reported failure".to_string(),
            });
        }

        let data = body.data.ok_or_else(|| ExtractError::Api {
            status: status.as_u16(),
            message: "no data returned from Firecrawl".to_string(),
        })?;

        let fields = data.extract.ok_or_else(|| ExtractError::Api {
            status: status.as_u16(),
            message: "no extract payload returned from Firecrawl".to_string(),
        })?;

        Ok(ExtractedDocument::new(
            fields,
            data.markdown.unwrap_or_default(),
        ))
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::FieldValue;

    #[test]
    fn test_create_extractor() {
        let extractor = FirecrawlExtractor::new("test-key").unwrap();
        assert_eq!(extractor.name(), "firecrawl");
    }

    #[test]
    fn test_schema_requires_name_and_start_date() {
        let schema = FirecrawlExtractor::event_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("name")));
        assert!(required.contains(&json!("start_date")));
    }

    #[test]
    fn test_scrape_response_decodes_loose_shapes() {
        let body = r#"{
            "success": true,
            "data": {
                "markdown": "# RustConf",
                "extract": {
                    "name": "RustConf",
                    "topics": "systems programming",
                    "agenda": {"day_one": "talks"}
                }
            }
        }"#;

        let response: ScrapeResponse = serde_json::from_str(body).unwrap();
        let data = response.data.unwrap();
        let fields = data.extract.unwrap();

        assert_eq!(fields.name, Some(FieldValue::text("RustConf")));
        assert_eq!(fields.topics, Some(FieldValue::text("systems programming")));
        assert!(matches!(fields.agenda, Some(FieldValue::Structured(_))));
        assert_eq!(data.markdown.as_deref(), Some("# RustConf"));
    }
}
