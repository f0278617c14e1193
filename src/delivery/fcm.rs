use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

use crate::appsettings::PushSettings;

use super::{
    MulticastReport, PushNotification, PushTransport, TokenDelivery, oauth::AccessTokenProvider,
};

#[derive(Serialize)]
struct SendRequest<'a> {
    message: Message<'a>,
}

#[derive(Serialize)]
struct Message<'a> {
    token: &'a str,
    notification: &'a PushNotification,
}

/// Firebase Cloud Messaging over the HTTP v1 API. Each token gets its own
/// `messages:send` request so one bad token cannot fail the rest.
pub struct FcmPushTransport {
    client: reqwest::Client,
    send_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl FcmPushTransport {
    pub fn new(settings: &PushSettings, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            settings.endpoint.trim_end_matches('/'),
            settings.project_id
        );

        Self {
            client: reqwest::Client::new(),
            send_url,
            tokens,
        }
    }

    async fn send_one(
        &self,
        access_token: &str,
        token: &str,
        notification: &PushNotification,
    ) -> TokenDelivery {
        let request = SendRequest {
            message: Message {
                token,
                notification,
            },
        };

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => TokenDelivery::Delivered,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                TokenDelivery::Failed(format!("{status}: {body}"))
            }
            Err(error) => TokenDelivery::Failed(error.to_string()),
        }
    }
}

#[async_trait]
impl PushTransport for FcmPushTransport {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
    ) -> anyhow::Result<MulticastReport> {
        let access_token = self
            .tokens
            .access_token()
            .await
            .context("Could not obtain an FCM access token")?;

        let sends = tokens
            .iter()
            .map(|token| self.send_one(&access_token, token, notification));
        let outcomes = join_all(sends).await;

        Ok(MulticastReport {
            results: tokens.iter().cloned().zip(outcomes).collect(),
        })
    }
}
