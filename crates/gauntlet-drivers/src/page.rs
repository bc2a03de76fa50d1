// crates/gauntlet-drivers/src/page.rs
// ============================================================================
// Module: Page Driver
// Description: W3C WebDriver client for browser-backed suites.
// Purpose: Drive a remote browser session against the front end under test.
// Dependencies: base64, reqwest, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! The page driver speaks the W3C WebDriver wire protocol directly over
//! HTTP. A [`PageDriver`] targets one WebDriver endpoint; [`connect`]
//! opens a session and returns a [`PageSession`] that navigates, queries
//! elements, types, clicks, and captures screenshots. Waits poll
//! `document.readyState` instead of sleeping for fixed intervals.
//! Invariants:
//! - `close` is idempotent; dropping an unclosed session issues a
//!   best-effort delete so aborted attempts do not strand browsers.
//! - An unreachable WebDriver endpoint surfaces as
//!   `DriverError::Unreachable` so browser suites can skip.
//!
//! [`connect`]: PageDriver::connect

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use reqwest::Client;
use reqwest::Method;
use serde_json::Value;
use serde_json::json;
use tokio::time::sleep;

use crate::error::DriverError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// W3C element identifier key in element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Poll interval for readiness and element waits.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// SECTION: Page Driver
// ============================================================================

/// Factory for WebDriver sessions against one endpoint.
#[derive(Debug, Clone)]
pub struct PageDriver {
    /// WebDriver endpoint without a trailing slash.
    webdriver_url: String,
    /// Shared HTTP client.
    client: Client,
    /// Deadline applied to polling waits.
    expect_timeout: Duration,
}

impl PageDriver {
    /// Creates a driver for a WebDriver endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Protocol`] when the client fails to build.
    pub fn new(
        webdriver_url: impl Into<String>,
        request_timeout: Duration,
        expect_timeout: Duration,
    ) -> Result<Self, DriverError> {
        let webdriver_url = webdriver_url.into();
        let client = Client::builder().timeout(request_timeout).build().map_err(|err| {
            DriverError::Protocol {
                target: webdriver_url.clone(),
                reason: format!("failed to build http client: {err}"),
            }
        })?;
        Ok(Self {
            webdriver_url: webdriver_url.trim_end_matches('/').to_string(),
            client,
            expect_timeout,
        })
    }

    /// Opens a new browser session.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Unreachable`] when the endpoint refuses the
    /// connection and [`DriverError::Session`] when session creation is
    /// rejected.
    pub async fn connect(&self) -> Result<PageSession, DriverError> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": {
                        "args": ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"],
                    },
                },
            },
        });
        let url = format!("{}/session", self.webdriver_url);
        let value = self.command(Method::POST, &url, Some(&capabilities)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol {
                target: url,
                reason: "session response carried no sessionId".to_string(),
            })?
            .to_string();
        Ok(PageSession {
            driver: self.clone(),
            session_id,
            closed: false,
        })
    }

    /// Issues one WebDriver command and unwraps the `value` envelope.
    async fn command(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, DriverError> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response =
            builder.send().await.map_err(|err| DriverError::from_send(url, &err))?;
        let status = response.status();
        let payload: Value = response.json().await.map_err(|err| DriverError::Protocol {
            target: url.to_string(),
            reason: format!("invalid webdriver payload: {err}"),
        })?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);
        if !status.is_success() {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unspecified webdriver error");
            let error = value.get("error").and_then(Value::as_str).unwrap_or("unknown");
            return Err(DriverError::Session(format!("{error}: {message}")));
        }
        Ok(value)
    }
}

// ============================================================================
// SECTION: Page Session
// ============================================================================

/// One live browser session.
#[derive(Debug)]
pub struct PageSession {
    /// Driver the session was opened from.
    driver: PageDriver,
    /// WebDriver session identifier.
    session_id: String,
    /// Whether the session has been closed.
    closed: bool,
}

impl PageSession {
    /// Returns the session URL for a command suffix.
    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/session/{}{suffix}", self.driver.webdriver_url, self.session_id)
    }

    /// Navigates to a URL and waits for the document to settle.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when navigation fails or the document
    /// never reaches the `complete` ready state.
    pub async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let body = json!({ "url": url });
        self.driver.command(Method::POST, &self.endpoint("/url"), Some(&body)).await?;
        self.wait_for_ready().await
    }

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the command fails.
    pub async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.driver.command(Method::GET, &self.endpoint("/url"), None).await?;
        value.as_str().map(str::to_string).ok_or_else(|| DriverError::Protocol {
            target: self.endpoint("/url"),
            reason: "current url was not a string".to_string(),
        })
    }

    /// Returns the page title.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the command fails.
    pub async fn title(&self) -> Result<String, DriverError> {
        let value = self.driver.command(Method::GET, &self.endpoint("/title"), None).await?;
        value.as_str().map(str::to_string).ok_or_else(|| DriverError::Protocol {
            target: self.endpoint("/title"),
            reason: "title was not a string".to_string(),
        })
    }

    /// Polls `document.readyState` until the page reports `complete`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] when the deadline expires first.
    pub async fn wait_for_ready(&self) -> Result<(), DriverError> {
        let deadline = Instant::now() + self.driver.expect_timeout;
        loop {
            let state = self.execute("return document.readyState", &[]).await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    target: self.endpoint("/execute/sync"),
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Pauses for a fixed duration, for flows with no observable signal.
    pub async fn pause(&self, duration: Duration) {
        sleep(duration).await;
    }

    /// Executes synchronous JavaScript in the page.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the script is rejected.
    pub async fn execute(&self, script: &str, args: &[Value]) -> Result<Value, DriverError> {
        let body = json!({ "script": script, "args": args });
        self.driver.command(Method::POST, &self.endpoint("/execute/sync"), Some(&body)).await
    }

    /// Finds one element by CSS selector, polling until the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] when no element appears in time.
    pub async fn find_css(&self, selector: &str) -> Result<ElementRef, DriverError> {
        self.find_polling("css selector", selector).await
    }

    /// Finds one element containing the given visible text.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] when no element appears in time.
    pub async fn find_text(&self, text: &str) -> Result<ElementRef, DriverError> {
        let escaped = text.replace('\'', "\\'");
        let xpath = format!("//*[contains(normalize-space(.), '{escaped}')]");
        self.find_polling("xpath", &xpath).await
    }

    /// Locates an element, retrying until the expectation deadline.
    async fn find_polling(&self, using: &str, value: &str) -> Result<ElementRef, DriverError> {
        let deadline = Instant::now() + self.driver.expect_timeout;
        loop {
            match self.find_once(using, value).await {
                Ok(element) => return Ok(element),
                Err(err @ (DriverError::Unreachable { .. } | DriverError::Protocol { .. })) => {
                    return Err(err);
                }
                Err(err) => {
                    if Instant::now() >= deadline {
                        return Err(err);
                    }
                    sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    /// Issues one element lookup without polling.
    async fn find_once(&self, using: &str, value: &str) -> Result<ElementRef, DriverError> {
        let body = json!({ "using": using, "value": value });
        let result =
            self.driver.command(Method::POST, &self.endpoint("/element"), Some(&body)).await?;
        let id = result.get(ELEMENT_KEY).and_then(Value::as_str).ok_or_else(|| {
            DriverError::Protocol {
                target: self.endpoint("/element"),
                reason: "element response carried no element id".to_string(),
            }
        })?;
        Ok(ElementRef {
            id: id.to_string(),
        })
    }

    /// Clears an input element and types a value into it.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when either command fails.
    pub async fn fill(&self, element: &ElementRef, value: &str) -> Result<(), DriverError> {
        let clear = self.endpoint(&format!("/element/{}/clear", element.id));
        self.driver.command(Method::POST, &clear, Some(&json!({}))).await?;
        let keys = self.endpoint(&format!("/element/{}/value", element.id));
        let body = json!({ "text": value });
        self.driver.command(Method::POST, &keys, Some(&body)).await?;
        Ok(())
    }

    /// Clicks an element.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the command fails.
    pub async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        let url = self.endpoint(&format!("/element/{}/click", element.id));
        self.driver.command(Method::POST, &url, Some(&json!({}))).await?;
        Ok(())
    }

    /// Returns an element's visible text.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the command fails.
    pub async fn text_of(&self, element: &ElementRef) -> Result<String, DriverError> {
        let url = self.endpoint(&format!("/element/{}/text", element.id));
        let value = self.driver.command(Method::GET, &url, None).await?;
        value.as_str().map(str::to_string).ok_or_else(|| DriverError::Protocol {
            target: url,
            reason: "element text was not a string".to_string(),
        })
    }

    /// Captures a screenshot of the current viewport as PNG bytes.
    ///
    /// The W3C protocol has no full-page capture command, so content
    /// below the fold is not included.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the command fails or the payload is
    /// not valid base64.
    pub async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let url = self.endpoint("/screenshot");
        let value = self.driver.command(Method::GET, &url, None).await?;
        let encoded = value.as_str().ok_or_else(|| DriverError::Protocol {
            target: url.clone(),
            reason: "screenshot payload was not a string".to_string(),
        })?;
        Base64.decode(encoded).map_err(|err| DriverError::Protocol {
            target: url,
            reason: format!("screenshot payload was not base64: {err}"),
        })
    }

    /// Closes the browser session. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the delete command fails.
    pub async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        let url = format!("{}/session/{}", self.driver.webdriver_url, self.session_id);
        self.driver.command(Method::DELETE, &url, None).await?;
        self.closed = true;
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Best-effort teardown for sessions abandoned by early returns.
        // Errors are discarded here; `close` is the path that reports them.
        let client = self.driver.client.clone();
        let url = format!("{}/session/{}", self.driver.webdriver_url, self.session_id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            drop(handle.spawn(async move {
                let _ = client.delete(url).send().await;
            }));
        }
    }
}

// ============================================================================
// SECTION: Element References
// ============================================================================

/// Opaque handle to a located element.
#[derive(Debug, Clone)]
pub struct ElementRef {
    /// WebDriver element identifier.
    id: String,
}
