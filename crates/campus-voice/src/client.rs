use crate::agent::{Agent, AgentApi, CreateAgent, UpdateAgent};
use crate::error::Error;
use async_trait::async_trait;
use reqwest::{Method, Request, Response};
use reqwest_middleware::ClientWithMiddleware;
use reqwest_tracing::{DefaultSpanBackend, TracingMiddleware};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// REST client for the RetellAI agent API. Requests are never retried.
#[derive(Clone)]
pub struct RetellClient {
    client: ClientWithMiddleware,
    base_url: Url,
    api_key: String,
}

impl RetellClient {
    pub fn new(base_url: &Url, api_key: String) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;
        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(TracingMiddleware::<DefaultSpanBackend>::new())
            .build();

        // `Url::join` replaces the last path segment unless the base ends with a slash.
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Request, Error> {
        let url = self.base_url.join(path)?;
        let mut builder = self.client.request(method, url).bearer_auth(&self.api_key);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.build().map_err(Into::into)
    }

    async fn execute(&self, request: Request) -> Result<Response, Error> {
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(%method, %path, %status, %body, "voice vendor request failed");
        Err(Error::StatusCode { status, body })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, query: &[(&str, String)], body: Option<&B>) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, query, body)?;
        let response = self.execute(request).await?;
        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl AgentApi for RetellClient {
    async fn create_agent(&self, agent: &CreateAgent) -> Result<Agent, Error> {
        self.send_json(Method::POST, "agents", &[], Some(agent)).await
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, Error> {
        self.send_json::<(), _>(Method::GET, &format!("agents/{agent_id}"), &[], None)
            .await
    }

    async fn update_agent(&self, agent_id: &str, update: &UpdateAgent) -> Result<Agent, Error> {
        self.send_json(Method::PUT, &format!("agents/{agent_id}"), &[], Some(update))
            .await
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), Error> {
        let request = self.build_request::<()>(Method::DELETE, &format!("agents/{agent_id}"), &[], None)?;
        self.execute(request).await?;
        Ok(())
    }

    async fn get_call(&self, call_id: &str) -> Result<Value, Error> {
        self.send_json::<(), _>(Method::GET, &format!("calls/{call_id}"), &[], None)
            .await
    }

    async fn list_calls(&self, agent_id: Option<&str>, limit: u32) -> Result<Vec<Value>, Error> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(agent_id) = agent_id {
            query.push(("agent_id", agent_id.to_owned()));
        }
        self.send_json::<(), _>(Method::GET, "calls", &query, None).await
    }

    async fn end_call(&self, call_id: &str) -> Result<Value, Error> {
        let request = self.build_request::<()>(Method::POST, &format!("calls/{call_id}/end"), &[], None)?;
        let response = self.execute(request).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).or(Ok(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_API_URL;
    use crate::agent::UpdateAgent;

    fn client() -> RetellClient {
        RetellClient::new(&Url::parse(DEFAULT_API_URL).unwrap(), "secret".to_owned()).unwrap()
    }

    #[test]
    fn test_request_keeps_version_prefix() {
        let request = client()
            .build_request::<()>(Method::GET, "agents/ag_1", &[], None)
            .unwrap();
        assert_eq!(request.url().as_str(), "https://api.retellai.com/v1/agents/ag_1");
        assert_eq!(
            request.headers().get(http::header::AUTHORIZATION).unwrap(),
            "Bearer secret"
        );
    }

    #[test]
    fn test_list_calls_query() {
        let request = client()
            .build_request::<()>(
                Method::GET,
                "calls",
                &[("limit", "10".to_owned()), ("agent_id", "ag_1".to_owned())],
                None,
            )
            .unwrap();
        assert_eq!(request.url().query(), Some("limit=10&agent_id=ag_1"));
    }

    #[test]
    fn test_update_body() {
        let update = UpdateAgent {
            name: Some("Renamed".to_owned()),
            voice: None,
        };
        let request = client()
            .build_request(Method::PUT, "agents/ag_1", &[], Some(&update))
            .unwrap();
        assert_eq!(request.method(), &Method::PUT);
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, br#"{"name":"Renamed"}"#);
    }
}
