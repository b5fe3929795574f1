//! Vocalis API Client

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

/// API Client for Vocalis
pub struct VocalisClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct CallResponse {
    pub uuid: String,
    pub caller_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration: Option<i32>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CallDetailResponse {
    pub uuid: String,
    pub caller_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub status: String,
    pub metadata: serde_json::Value,
    pub transcripts: Vec<TranscriptResponse>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptResponse {
    pub text: String,
    pub speaker: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    pub total_calls: i64,
    pub active_calls: i64,
    pub completed_calls: i64,
    pub average_duration: i64,
}

impl VocalisClient {
    /// Create a new API client
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    /// List recent calls
    pub async fn list_calls(&self) -> Result<Vec<CallResponse>> {
        let url = format!("{}/api/calls", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Failed to connect to Vocalis API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        let calls: Vec<CallResponse> = resp.json().await.context("Failed to parse response")?;

        Ok(calls)
    }

    /// Get one call with its transcripts
    pub async fn get_call(&self, uuid: &str) -> Result<CallDetailResponse> {
        let url = format!("{}/api/calls/{}", self.base_url, uuid);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Failed to connect to Vocalis API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        let call: CallDetailResponse = resp.json().await.context("Failed to parse response")?;

        Ok(call)
    }

    /// Get the ordered transcripts for a call
    pub async fn get_transcripts(&self, uuid: &str) -> Result<Vec<TranscriptResponse>> {
        let url = format!("{}/api/calls/{}/transcripts", self.base_url, uuid);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Failed to connect to Vocalis API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        let transcripts: Vec<TranscriptResponse> =
            resp.json().await.context("Failed to parse response")?;

        Ok(transcripts)
    }

    /// Get aggregate statistics
    pub async fn stats(&self) -> Result<StatsResponse> {
        let url = format!("{}/api/calls/stats", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Failed to connect to Vocalis API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        let stats: StatsResponse = resp.json().await.context("Failed to parse response")?;

        Ok(stats)
    }
}
