//! HTTP client for the platform API.

use super::models::{
    Component, ComponentEndpoint, ComponentResource, CreateEnvironmentRequest, Environment,
    ErrorBody, Event, Organization, Page, Project,
};
use super::{PlatformApi, RemoteResult};
use crate::context::ResourcePath;
use crate::error::RemoteError;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const AUTH_HEADER: &str = "X-Auth-Token";
const USER_AGENT: &str = concat!("bns/", env!("CARGO_PKG_VERSION"));
/// Guard against a server that never reports a short page.
const MAX_PAGES: usize = 100;

/// Connection settings for [`HttpPlatformClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

pub struct HttpPlatformClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpPlatformClient {
    pub fn new(settings: ClientSettings) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            RemoteError::Transport(format!("Invalid API URL {}: {}", settings.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!(
                "Invalid API URL {}: not a base URL",
                settings.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            token: settings.token,
        })
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded on
    /// its own, so an id containing `/` or `?` stays a single segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(%method, %url, "platform request");
        self.client
            .request(method, url)
            .header(AUTH_HEADER, &self.token)
            .header("Accept", "application/json")
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> RemoteResult<T> {
        let response = self.request(Method::GET, segments).send().await?;
        handle_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> RemoteResult<T> {
        let response = self
            .request(Method::POST, segments)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> RemoteResult<T> {
        let response = self.request(Method::DELETE, segments).send().await?;
        handle_response(response).await
    }

    /// Fetch every page of a collection endpoint.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        filter: &[(&str, &str)],
    ) -> RemoteResult<Vec<T>> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let page_param = page.to_string();
            let mut query: Vec<(&str, &str)> = filter.to_vec();
            query.push(("page", &page_param));

            let response = self
                .request(Method::GET, segments)
                .query(&query)
                .send()
                .await?;
            let page: Page<T> = handle_response(response).await?;
            let fetched = page.embedded.item.len();
            items.extend(page.embedded.item);

            let done = match page.total_items {
                Some(total) => items.len() >= total,
                None => true,
            };
            if done || fetched == 0 {
                break;
            }
        }
        Ok(items)
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .detail
        .clone()
        .or_else(|| body.title.clone())
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text.clone()
            }
        });

    Err(match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized(message),
        _ => RemoteError::Rejected {
            status: status.as_u16(),
            message,
            violations: body.violations,
        },
    })
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn list_organizations(&self) -> RemoteResult<Vec<Organization>> {
        self.get_collection(&["v1", "organizations"], &[]).await
    }

    async fn lookup_organization(&self, id: &str) -> RemoteResult<Organization> {
        self.get(&["v1", "organizations", id]).await
    }

    async fn list_projects(&self, organization_id: &str) -> RemoteResult<Vec<Project>> {
        self.get_collection(&["v1", "projects"], &[("organization", organization_id)])
            .await
    }

    async fn lookup_project(&self, id: &str) -> RemoteResult<Project> {
        self.get(&["v1", "projects", id]).await
    }

    async fn list_environments(&self, project_id: &str) -> RemoteResult<Vec<Environment>> {
        self.get_collection(&["v1", "environments"], &[("project", project_id)])
            .await
    }

    async fn lookup_environment(&self, id: &str) -> RemoteResult<Environment> {
        self.get(&["v1", "environments", id]).await
    }

    async fn list_components(&self, environment_id: &str) -> RemoteResult<Vec<Component>> {
        self.get_collection(&["v1", "components"], &[("environment", environment_id)])
            .await
    }

    async fn lookup_component(&self, id: &str) -> RemoteResult<Component> {
        self.get(&["v1", "components", id]).await
    }

    async fn list_component_resources(
        &self,
        component_id: &str,
    ) -> RemoteResult<Vec<ComponentResource>> {
        self.get(&["v1", "components", component_id, "resources"])
            .await
    }

    async fn create_environment(
        &self,
        request: &CreateEnvironmentRequest,
    ) -> RemoteResult<Environment> {
        self.post(&["v1", "environments"], request).await
    }

    async fn deploy_environment(&self, id: &str) -> RemoteResult<Event> {
        self.post(&["v1", "environments", id, "deploy"], &json!({}))
            .await
    }

    async fn start_environment(&self, id: &str) -> RemoteResult<Event> {
        self.post(&["v1", "environments", id, "start"], &json!({}))
            .await
    }

    async fn stop_environment(&self, id: &str) -> RemoteResult<Event> {
        self.post(&["v1", "environments", id, "stop"], &json!({}))
            .await
    }

    async fn delete_environment(&self, id: &str) -> RemoteResult<Event> {
        self.delete(&["v1", "environments", id]).await
    }

    async fn environment_endpoints(&self, id: &str) -> RemoteResult<Vec<ComponentEndpoint>> {
        self.get(&["v1", "environments", id, "endpoints"]).await
    }

    async fn get_event(&self, id: &str) -> RemoteResult<Event> {
        self.get(&["v1", "events", id]).await
    }

    async fn list_events(&self, environment_id: Option<&str>) -> RemoteResult<Vec<Event>> {
        match environment_id {
            Some(environment) => {
                self.get_collection(&["v1", "events"], &[("environment", environment)])
                    .await
            }
            None => self.get_collection(&["v1", "events"], &[]).await,
        }
    }

    async fn start_remote_development(
        &self,
        component_id: &str,
        resource: &ResourcePath,
    ) -> RemoteResult<Component> {
        self.post(
            &["v1", "components", component_id, "remote-development", "up"],
            &json!({ "resource": resource.to_string() }),
        )
        .await
    }

    async fn stop_remote_development(
        &self,
        component_id: &str,
        resource: &ResourcePath,
    ) -> RemoteResult<Component> {
        self.post(
            &["v1", "components", component_id, "remote-development", "down"],
            &json!({ "resource": resource.to_string() }),
        )
        .await
    }
}
