//! W3C WebDriver wire client
//!
//! A deliberately thin wrapper over the WebDriver JSON protocol: one
//! session, CSS-selector element lookup, clicks, and page source reads.
//! Element interaction failures are mapped onto [`AutomationError`] variants
//! so the pagination controller can tell a banner-intercepted click from a
//! missing control.

use crate::browser::{AutomationError, Browser, COOKIE_BANNER_BUTTON};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Key under which the WebDriver protocol nests element references
const ELEMENT_ID_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// A live WebDriver browser session
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    /// Opens a new headless session against a WebDriver endpoint
    ///
    /// # Arguments
    ///
    /// * `webdriver_url` - Base URL of the WebDriver server (e.g. geckodriver)
    pub async fn connect(webdriver_url: &str) -> Result<Self, AutomationError> {
        let client = Client::new();
        let base_url = webdriver_url.trim_end_matches('/').to_string();

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "moz:firefoxOptions": { "args": ["-headless"] }
                }
            }
        });

        let response: Value = client
            .post(format!("{}/session", base_url))
            .json(&capabilities)
            .send()
            .await?
            .json()
            .await?;

        let session_id = response["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| AutomationError::Session {
                message: format!("no session id in response: {}", response),
            })?
            .to_string();

        tracing::debug!("WebDriver session {} opened", session_id);
        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    /// Ends the session
    pub async fn quit(self) -> Result<(), AutomationError> {
        self.client
            .delete(format!("{}/session/{}", self.base_url, self.session_id))
            .send()
            .await?;
        Ok(())
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, AutomationError> {
        let response: Value = self
            .client
            .post(format!(
                "{}/session/{}{}",
                self.base_url, self.session_id, path
            ))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        check_wire_error(&response)?;
        Ok(response)
    }

    async fn get(&self, path: &str) -> Result<Value, AutomationError> {
        let response: Value = self
            .client
            .get(format!(
                "{}/session/{}{}",
                self.base_url, self.session_id, path
            ))
            .send()
            .await?
            .json()
            .await?;
        check_wire_error(&response)?;
        Ok(response)
    }

    /// Finds one element by CSS selector and returns its element reference
    async fn find_element(&self, selector: &str) -> Result<String, AutomationError> {
        let body = json!({ "using": "css selector", "value": selector });
        let response = self
            .post("/element", body)
            .await
            .map_err(|e| contextualize(e, selector))?;

        response["value"][ELEMENT_ID_KEY]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AutomationError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn click_element(&self, element_id: &str, selector: &str) -> Result<(), AutomationError> {
        self.post(&format!("/element/{}/click", element_id), json!({}))
            .await
            .map_err(|e| contextualize(e, selector))?;
        Ok(())
    }
}

/// Maps a WebDriver error payload to an [`AutomationError`]
fn check_wire_error(response: &Value) -> Result<(), AutomationError> {
    let Some(error) = response["value"]["error"].as_str() else {
        return Ok(());
    };
    let message = response["value"]["message"]
        .as_str()
        .unwrap_or(error)
        .to_string();

    Err(match error {
        "element click intercepted" => AutomationError::ClickIntercepted {
            selector: message,
        },
        "no such element" => AutomationError::ElementNotFound { selector: message },
        "invalid session id" => AutomationError::Session { message },
        _ => AutomationError::Protocol { message },
    })
}

/// Replaces the wire message with the caller's selector for the errors where
/// the selector is the useful context
fn contextualize(error: AutomationError, selector: &str) -> AutomationError {
    match error {
        AutomationError::ClickIntercepted { .. } => AutomationError::ClickIntercepted {
            selector: selector.to_string(),
        },
        AutomationError::ElementNotFound { .. } => AutomationError::ElementNotFound {
            selector: selector.to_string(),
        },
        other => other,
    }
}

#[async_trait]
impl Browser for WebDriverSession {
    async fn open(&mut self, url: &str) -> Result<(), AutomationError> {
        tracing::debug!("Navigating to {}", url);
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, AutomationError> {
        let response = self.get("/source").await?;
        response["value"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AutomationError::Protocol {
                message: "page source response had no body".to_string(),
            })
    }

    async fn dismiss_cookie_banner(&mut self) -> Result<(), AutomationError> {
        match self.find_element(COOKIE_BANNER_BUTTON).await {
            Ok(element_id) => {
                tracing::debug!("Dismissing cookie banner");
                self.click_element(&element_id, COOKIE_BANNER_BUTTON).await
            }
            // No banner on screen; nothing to dismiss
            Err(AutomationError::ElementNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn click(&mut self, selector: &str) -> Result<(), AutomationError> {
        let element_id = self.find_element(selector).await?;
        self.click_element(&element_id, selector).await
    }

    async fn select(&mut self, selector: &str, value: &str) -> Result<(), AutomationError> {
        // Committing a select value is a click on the matching option
        let option_selector = format!("{} option[value='{}']", selector, value);
        let element_id = self.find_element(&option_selector).await?;
        self.click_element(&element_id, selector).await
    }
}
