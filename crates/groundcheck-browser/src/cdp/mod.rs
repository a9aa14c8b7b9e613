//! [`Session`] over the Chrome DevTools Protocol.
//!
//! Attaches to an operator's already-running Chrome through its
//! remote-debugging endpoint. Releasing the session detaches only; the
//! browser and its tabs stay open.

pub mod scripts;

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use groundcheck_core::AppConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::dom::{DomSnapshot, NodeRef};
use crate::error::SessionError;
use crate::session::{Session, SessionProvider};

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
const TARGET_ATTACH_SETTLE: Duration = Duration::from_millis(500);

/// Attaches to the browser at `endpoint` (e.g. `http://127.0.0.1:9222`).
pub struct CdpSessionProvider {
    endpoint: String,
    headers: Vec<(String, String)>,
    http: reqwest::Client,
}

impl CdpSessionProvider {
    /// # Errors
    ///
    /// Returns [`SessionError::Discovery`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, headers: Vec<(String, String)>) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(DISCOVERY_TIMEOUT)
            .connect_timeout(DISCOVERY_TIMEOUT)
            .build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            headers,
            http,
        })
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Discovery`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SessionError> {
        Self::new(&config.cdp_url, config.extra_headers.clone())
    }

    /// Reads the browser-level WebSocket URL from `/json/version`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Discovery`] on HTTP failure and
    /// [`SessionError::Connect`] when the response has no debugger URL.
    pub async fn discover_ws_url(&self) -> Result<String, SessionError> {
        let url = format!("{}/json/version", self.endpoint);
        let version: serde_json::Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        version["webSocketDebuggerUrl"]
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| SessionError::Connect {
                endpoint: self.endpoint.clone(),
                reason: "no webSocketDebuggerUrl in /json/version".to_string(),
            })
    }

    async fn working_page(&self, browser: &mut Browser) -> Result<Page, SessionError> {
        if let Err(e) = browser.fetch_targets().await {
            tracing::debug!(error = %e, "target discovery failed; opening a new tab");
        } else {
            tokio::time::sleep(TARGET_ATTACH_SETTLE).await;
        }

        let existing = browser.pages().await.map_err(script_error)?;
        if let Some(page) = existing.into_iter().next() {
            return Ok(page);
        }
        browser.new_page("about:blank").await.map_err(script_error)
    }
}

#[async_trait]
impl SessionProvider for CdpSessionProvider {
    type Session = CdpSession;

    async fn acquire(&self) -> Result<CdpSession, SessionError> {
        let ws_url = self.discover_ws_url().await?;
        tracing::info!(endpoint = %self.endpoint, ws_url = %ws_url, "attaching to browser");

        let (mut browser, mut handler) =
            Browser::connect(ws_url)
                .await
                .map_err(|e| SessionError::Connect {
                    endpoint: self.endpoint.clone(),
                    reason: e.to_string(),
                })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!(error = %e, "browser event handler error");
                }
            }
        });

        let page = match self.working_page(&mut browser).await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e);
            }
        };

        if !self.headers.is_empty() {
            let headers: serde_json::Map<String, serde_json::Value> = self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(
                serde_json::Value::Object(headers),
            )))
            .await
            .map_err(script_error)?;
            tracing::debug!(count = self.headers.len(), "extra request headers applied");
        }

        Ok(CdpSession {
            browser: Mutex::new(Some(browser)),
            page,
            handler: handler_task,
        })
    }
}

/// One attached tab.
pub struct CdpSession {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
}

impl CdpSession {
    async fn evaluate<T: serde::de::DeserializeOwned>(&self, expression: String) -> Result<T, SessionError> {
        self.page
            .evaluate(expression)
            .await
            .map_err(script_error)?
            .into_value()
            .map_err(script_error)
    }

    async fn on_element(&self, node: NodeRef, script: String) -> Result<(), SessionError> {
        if self.evaluate::<bool>(script).await? {
            Ok(())
        } else {
            Err(SessionError::Detached(node))
        }
    }

    async fn mouse(&self, kind: DispatchMouseEventType, x: f64, y: f64) -> Result<(), SessionError> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(SessionError::Input)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| SessionError::Input(e.to_string()))?;
        Ok(())
    }
}

fn script_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::Script(e.to_string())
}

fn json_literal(value: &str) -> Result<String, SessionError> {
    serde_json::to_string(value).map_err(script_error)
}

#[async_trait]
impl Session for CdpSession {
    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(script_error)?
            .unwrap_or_default())
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(SessionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(SessionError::NavigationTimeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }),
        }
    }

    async fn snapshot(&self) -> Result<DomSnapshot, SessionError> {
        self.evaluate(scripts::SNAPSHOT.to_string()).await
    }

    async fn click(&self, node: NodeRef) -> Result<(), SessionError> {
        self.on_element(node, scripts::click(node)).await
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), SessionError> {
        self.mouse(DispatchMouseEventType::MousePressed, x, y).await?;
        self.mouse(DispatchMouseEventType::MouseReleased, x, y).await
    }

    async fn fill(&self, node: NodeRef, value: &str) -> Result<(), SessionError> {
        self.on_element(node, scripts::fill(node, &json_literal(value)?))
            .await
    }

    async fn select(&self, node: NodeRef, option_value: &str) -> Result<(), SessionError> {
        self.on_element(node, scripts::select(node, &json_literal(option_value)?))
            .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>, SessionError> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| SessionError::Screenshot(e.to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| SessionError::Screenshot(e.to_string()))
    }

    async fn close(&self) -> Result<(), SessionError> {
        // Dropping a connected (not launched) browser leaves Chrome running.
        self.browser.lock().await.take();
        self.handler.abort();
        tracing::info!("browser session released");
        Ok(())
    }
}
