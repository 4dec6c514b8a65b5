use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::{Arc, Mutex};

use crate::errors::FcmError;
use crate::models::*;

/// FCM caps multicast batches at 500 registration tokens per request.
pub const FCM_MULTICAST_LIMIT: usize = 500;

/// Attempts per chunk before the remaining tokens are written off.
const CHUNK_MAX_ATTEMPTS: usize = 3;

/// Firebase Cloud Messaging client
///
/// Manages OAuth2 token generation, caching, and message delivery for the
/// notification service. Multicasts are chunked to the platform limit and
/// retried per chunk on transport-level failure.
pub struct FcmClient {
    pub project_id: String,
    credentials: Arc<ServiceAccountKey>,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
    http_client: reqwest::Client,
}

impl FcmClient {
    pub fn new(credentials: ServiceAccountKey) -> Self {
        Self {
            project_id: credentials.project_id.clone(),
            credentials: Arc::new(credentials),
            token_cache: Arc::new(Mutex::new(None)),
            http_client: reqwest::Client::new(),
        }
    }

    /// Send one notification to one device.
    pub async fn send(&self, device_token: &str, payload: &PushPayload) -> Result<FcmSendResult, FcmError> {
        let access_token = self.get_access_token().await?;

        let message = FcmMessage {
            message: FcmMessageContent {
                token: device_token.to_string(),
                notification: FcmNotification {
                    title: payload.title.clone(),
                    body: payload.body.clone(),
                },
                data: Some(payload.data.clone()),
            },
        };

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Content-Type", "application/json")
            .json(&message)
            .send()
            .await
            .map_err(|e| FcmError::SendRequest(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            let fcm_response: FcmApiResponse = response
                .json()
                .await
                .map_err(|e| FcmError::ResponseParse(e.to_string()))?;

            Ok(FcmSendResult {
                token: device_token.to_string(),
                message_id: fcm_response.name,
                success: true,
                error: None,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FcmError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Multicast one payload to many devices.
    ///
    /// Tokens are split into chunks of [`FCM_MULTICAST_LIMIT`]; each chunk is
    /// attempted up to [`CHUNK_MAX_ATTEMPTS`] times, re-sending only the
    /// tokens whose failure was retryable. A chunk exhausting its attempts
    /// never prevents later chunks from going out.
    pub async fn send_multicast(
        &self,
        device_tokens: &[String],
        payload: &PushPayload,
    ) -> MulticastSendResult {
        let mut results: Vec<FcmSendResult> = Vec::with_capacity(device_tokens.len());
        let mut chunks_sent = 0usize;

        for chunk in device_tokens.chunks(FCM_MULTICAST_LIMIT) {
            chunks_sent += 1;
            let mut pending: Vec<&String> = chunk.iter().collect();

            for attempt in 1..=CHUNK_MAX_ATTEMPTS {
                let mut still_pending = Vec::new();

                for token in pending {
                    match self.send(token, payload).await {
                        Ok(result) => results.push(result),
                        Err(e) if e.is_retryable() && attempt < CHUNK_MAX_ATTEMPTS => {
                            still_pending.push(token);
                        }
                        Err(e) => results.push(FcmSendResult {
                            token: token.clone(),
                            message_id: None,
                            success: false,
                            error: Some(e.to_string()),
                        }),
                    }
                }

                if still_pending.is_empty() {
                    break;
                }
                tracing::warn!(
                    chunk = chunks_sent,
                    attempt,
                    remaining = still_pending.len(),
                    "retrying multicast chunk"
                );
                pending = still_pending;
            }
        }

        let success_count = results.iter().filter(|r| r.success).count();
        MulticastSendResult {
            success_count,
            failure_count: results.len() - success_count,
            chunks_sent,
            results,
        }
    }

    /// Cheap structural check before persisting a registration token.
    pub fn validate_token_format(device_token: &str) -> bool {
        // FCM tokens are typically 100-200 characters
        !device_token.is_empty() && device_token.len() >= 10 && device_token.len() <= 1000
    }

    /// Get an OAuth2 access token for the service account (cached).
    async fn get_access_token(&self) -> Result<String, FcmError> {
        {
            let cache = self.token_cache.lock().expect("token cache lock poisoned");
            if let Some(cached) = cache.as_ref() {
                let now = Utc::now().timestamp();
                if cached.expires_at > now + 60 {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: self.credentials.client_email.clone(),
            sub: self.credentials.client_email.clone(),
            scope: "https://www.googleapis.com/auth/cloud-platform".to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| FcmError::KeyParse(e.to_string()))?;

        let assertion = encode(&Header::new(jsonwebtoken::Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| FcmError::JwtEncode(e.to_string()))?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FcmError::TokenRequest(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FcmError::TokenRequest(format!(
                "status {}",
                response.status()
            )));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| FcmError::TokenParse(e.to_string()))?;

        let expires_at = Utc::now().timestamp() + token_response.expires_in;
        {
            let mut cache = self.token_cache.lock().expect("token cache lock poisoned");
            *cache = Some(TokenCache {
                access_token: token_response.access_token.clone(),
                expires_at,
            });
        }

        Ok(token_response.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> ServiceAccountKey {
        ServiceAccountKey {
            project_id: "union-hub-test".to_string(),
            private_key_id: "key-id".to_string(),
            private_key: "private-key".to_string(),
            client_email: "push@union-hub-test.iam.gserviceaccount.com".to_string(),
            client_id: "123456".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn client_carries_project_id() {
        let client = FcmClient::new(test_credentials());
        assert_eq!(client.project_id, "union-hub-test");
    }

    #[test]
    fn token_format_bounds() {
        assert!(FcmClient::validate_token_format(
            "registration_token_with_reasonable_length_12345678"
        ));
        assert!(!FcmClient::validate_token_format(""));
        assert!(!FcmClient::validate_token_format("short"));
        assert!(!FcmClient::validate_token_format(&"x".repeat(1001)));
    }

    #[test]
    fn chunk_count_matches_limit() {
        let tokens: Vec<String> = (0..1200).map(|i| format!("tok-{i:04}")).collect();
        let chunks: Vec<_> = tokens.chunks(FCM_MULTICAST_LIMIT).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[2].len(), 200);
    }
}
