//! Waitroom Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    AdmittedResponse, AllowRequest, AllowResponse, AllowedResponse, EnterResponse, RankResponse,
    RegisterResponse, StatsRequest, StatsResponse, TokenRequest, TouchResponse, UserRequest,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

// The server reads named params, so requests go out as JSON objects
fn object_params<T: Serialize>(request: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    match serde_json::to_value(request)? {
        serde_json::Value::Object(fields) => {
            for (name, value) in fields {
                params.insert(&name, value)?;
            }
            Ok(params)
        }
        other => Err(SdkError::Other(format!(
            "Request must serialize to an object, got {}",
            other
        ))),
    }
}

/// Waitroom Client
///
/// Provides a high-level interface to the Waitroom daemon.
///
/// # Example
///
/// ```no_run
/// use waitroom_sdk::WaitroomClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WaitroomClient::connect("http://127.0.0.1:9010").await?;
/// # Ok(())
/// # }
/// ```
pub struct WaitroomClient {
    client: HttpClient,
}

impl WaitroomClient {
    /// Connect to the Waitroom daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9010`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    async fn call<T, R>(&self, method: &str, request: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let params = object_params(request)?;
        Ok(self.client.request(method, params).await?)
    }

    /// Join a queue's wait structure
    ///
    /// Fails with an error for which [`SdkError::is_already_registered`]
    /// holds when the user is already waiting.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use waitroom_sdk::WaitroomClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = WaitroomClient::connect("http://127.0.0.1:9010").await?;
    /// let response = client.register("default", "42").await?;
    /// println!("Rank: {}", response.rank);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn register(&self, queue: &str, user_id: &str) -> Result<RegisterResponse> {
        self.call("queue.register.v1", &UserRequest { queue, user_id })
            .await
    }

    /// Move up to `count` earliest waiters to the admitted set
    pub async fn allow(&self, queue: &str, count: u64) -> Result<AllowResponse> {
        self.call("queue.allow.v1", &AllowRequest { queue, count })
            .await
    }

    /// Whether the user is in the admitted set
    pub async fn is_admitted(&self, queue: &str, user_id: &str) -> Result<bool> {
        let response: AdmittedResponse = self
            .call("queue.admitted.v1", &UserRequest { queue, user_id })
            .await?;
        Ok(response.admitted)
    }

    /// Check a presented admission token
    pub async fn verify_token(&self, queue: &str, user_id: &str, token: &str) -> Result<bool> {
        let request = TokenRequest {
            queue,
            user_id,
            token: Some(token),
        };
        let response: AllowedResponse = self.call("queue.allowed.v1", &request).await?;
        Ok(response.allowed)
    }

    /// Current 1-based rank
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use waitroom_sdk::WaitroomClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = WaitroomClient::connect("http://127.0.0.1:9010").await?;
    /// match client.rank("default", "42").await?.position() {
    ///     Some(rank) => println!("Waiting at {}", rank),
    ///     None => println!("Not waiting"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn rank(&self, queue: &str, user_id: &str) -> Result<RankResponse> {
        self.call("queue.rank.v1", &UserRequest { queue, user_id })
            .await
    }

    /// Issue the admission token and its cookie binding
    pub async fn touch(&self, queue: &str, user_id: &str) -> Result<TouchResponse> {
        self.call("queue.touch.v1", &UserRequest { queue, user_id })
            .await
    }

    /// Waiting-room visit: admitted with a valid token, otherwise registered
    /// (or re-ranked) and told to wait
    pub async fn enter(
        &self,
        queue: &str,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<EnterResponse> {
        let request = TokenRequest {
            queue,
            user_id,
            token,
        };
        self.call("queue.enter.v1", &request).await
    }

    /// Queue sizes
    pub async fn stats(&self, queue: &str) -> Result<StatsResponse> {
        self.call("admin.stats.v1", &StatsRequest { queue }).await
    }
}
