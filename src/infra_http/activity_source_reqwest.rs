use crate::domain_model::{AccessToken, WeekRange};
use crate::domain_port::*;
use reqwest::StatusCode;
use std::time::Duration;

pub struct ReqwestActivitySource {
    http_client: reqwest::Client,
    activities_url: String,
}

impl ReqwestActivitySource {
    pub fn try_new(activities_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            activities_url: activities_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl ActivitySource for ReqwestActivitySource {
    async fn list_activities(
        &self,
        token: &AccessToken,
        range: &WeekRange,
    ) -> Result<serde_json::Value, ActivitySourceError> {
        let response = self
            .http_client
            .get(&self.activities_url)
            .bearer_auth(token.as_str())
            .query(&[("after", range.after), ("before", range.before)])
            .send()
            .await
            .map_err(|e| ActivitySourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ActivitySourceError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ActivitySourceError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ActivitySourceError::Malformed(e.to_string()))
    }
}
