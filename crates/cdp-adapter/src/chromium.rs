//! Chromium DevTools backend built on `chromiumoxide`.

use crate::commands::{Key, Locator};
use crate::config::CdpConfig;
use crate::driver::{BrowserDriver, ElementRef, ElementState, FrameScope};
use crate::error::{AdapterError, AdapterErrorKind};
use crate::scripts;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, InsertTextParams, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::fs;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Single-page Chromium session.
pub struct ChromiumDriver {
    browser: tokio::sync::Mutex<Browser>,
    page: Page,
    scope: Mutex<FrameScope>,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    pub async fn launch(cfg: &CdpConfig) -> Result<Self, AdapterError> {
        let config = Self::browser_config(cfg)?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint(format!("failed to launch chromium: {err}"))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-adapter", ?err, "browser handler event error");
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(io_error)?;
        info!(
            target: "cdp-adapter",
            headless = cfg.headless,
            executable = %cfg.executable.display(),
            "chromium session ready"
        );

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            scope: Mutex::new(FrameScope::TopLevel),
            handler,
        })
    }

    fn browser_config(cfg: &CdpConfig) -> Result<BrowserConfig, AdapterError> {
        if !cfg.executable.as_os_str().is_empty() && !cfg.executable.exists() {
            return Err(AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint(format!(
                    "chrome executable not found at {}",
                    cfg.executable.display()
                ))
                .with_data(serde_json::json!({
                    "expected": cfg.executable,
                    "hint": "Set VERDICTPROBE_CHROME to the full path of chrome/chromium."
                })));
        }

        fs::create_dir_all(&cfg.user_data_dir).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("failed to ensure user-data-dir: {err}"))
        })?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(cfg.default_deadline_ms))
            .launch_timeout(Duration::from_secs(20))
            .window_size(cfg.window.0, cfg.window.1)
            .user_data_dir(cfg.user_data_dir.clone());

        if !cfg.headless {
            builder = builder.with_head();
        }
        if cfg.disable_sandbox {
            builder = builder.no_sandbox();
        }

        let mut args: Vec<String> = [
            "--disable-blink-features=AutomationControlled",
            "--disable-notifications",
            "--disable-popup-blocking",
            "--disable-dev-shm-usage",
            "--no-first-run",
            "--no-default-browser-check",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
        args.extend(cfg.extra_args.iter().cloned());
        builder = builder.args(args);

        if !cfg.executable.as_os_str().is_empty() {
            builder = builder.chrome_executable(cfg.executable.clone());
        }

        builder.build().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("browser config error: {err}"))
        })
    }

    pub async fn close(self) -> Result<(), AdapterError> {
        let mut browser = self.browser.lock().await;
        let result = browser.close().await.map(|_| ()).map_err(io_error);
        self.handler.abort();
        result
    }

    async fn evaluate(&self, expression: String) -> Result<Value, AdapterError> {
        let result = self.page.evaluate(expression).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Script).with_hint(err.to_string())
        })?;
        result.into_value::<Value>().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Script)
                .with_hint(format!("unexpected evaluation result: {err}"))
        })
    }

    /// Evaluates a status-tagged script and maps non-`ok` statuses onto adapter errors.
    async fn evaluate_checked(&self, expression: String) -> Result<Value, AdapterError> {
        let value = self.evaluate(expression).await?;
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("error");
        let kind = match status {
            "ok" => return Ok(value),
            "stale" => AdapterErrorKind::StaleElement,
            "no_frame" => AdapterErrorKind::NoSuchFrame,
            "not_interactable" => AdapterErrorKind::NotInteractable,
            "not_select" => AdapterErrorKind::NotSelectable,
            "no_option" => AdapterErrorKind::OptionNotFound,
            _ => AdapterErrorKind::Script,
        };
        let hint = value
            .get("reason")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .unwrap_or(status)
            .to_string();
        Err(AdapterError::new(kind).with_hint(hint))
    }

    async fn on_element(&self, element: &ElementRef, body: &str) -> Result<Value, AdapterError> {
        self.evaluate_checked(scripts::with_element(element.scope, &element.handle, body))
            .await
    }

    async fn dispatch_mouse(
        &self,
        kind: DispatchMouseEventType,
        x: f64,
        y: f64,
    ) -> Result<(), AdapterError> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))?;
        self.page.execute(params).await.map_err(io_error)?;
        Ok(())
    }

    async fn dispatch_key(&self, kind: DispatchKeyEventType, key: Key) -> Result<(), AdapterError> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key.dom_key())
            .code(key.dom_key())
            .windows_virtual_key_code(key.virtual_key_code())
            .native_virtual_key_code(key.virtual_key_code());
        if let (DispatchKeyEventType::KeyDown, Some(text)) = (kind, key.text()) {
            builder = builder.text(text);
        }
        let params = builder
            .build()
            .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))?;
        self.page.execute(params).await.map_err(io_error)?;
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

fn io_error(err: impl std::fmt::Display) -> AdapterError {
    AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
}

fn optional_string(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&self, url: &str, deadline: Duration) -> Result<(), AdapterError> {
        info!(target: "cdp-adapter", %url, "navigating");
        *self.scope.lock() = FrameScope::TopLevel;
        match tokio::time::timeout(deadline, self.page.goto(url.to_string())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(io_error(err)),
            Err(_) => Err(AdapterError::new(AdapterErrorKind::NavTimeout)
                .with_hint(format!("navigation to {url} exceeded {deadline:?}"))
                .retriable(true)),
        }
    }

    async fn current_url(&self) -> Result<String, AdapterError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(io_error)?
            .unwrap_or_default())
    }

    async fn ready_state(&self) -> Result<String, AdapterError> {
        let value = self
            .evaluate_checked(scripts::READY_STATE.to_string())
            .await?;
        Ok(optional_string(&value, "value").unwrap_or_default())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ElementRef>, AdapterError> {
        let scope = self.current_scope();
        let prefix = Uuid::new_v4().to_string();
        let value = self
            .evaluate_checked(scripts::query(scope, locator, &prefix))
            .await
            .map_err(|err| err.with_data(serde_json::json!({ "locator": locator.to_string() })))?;
        let handles = value
            .get("handles")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|handle| ElementRef::new(handle, scope))
                    .collect()
            })
            .unwrap_or_default();
        Ok(handles)
    }

    async fn element_state(&self, element: &ElementRef) -> Result<ElementState, AdapterError> {
        let value = self.on_element(element, scripts::ELEMENT_STATE).await?;
        Ok(ElementState {
            displayed: value.get("displayed").and_then(Value::as_bool).unwrap_or(false),
            enabled: value.get("enabled").and_then(Value::as_bool).unwrap_or(false),
        })
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AdapterError> {
        let point = self.on_element(element, scripts::CLICK_POINT).await?;
        let x = point.get("x").and_then(Value::as_f64).unwrap_or_default();
        let y = point.get("y").and_then(Value::as_f64).unwrap_or_default();
        debug!(target: "cdp-adapter", element = %element, x, y, "dispatching pointer click");
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, x, y)
            .await?;
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, x, y)
            .await
    }

    async fn script_click(&self, element: &ElementRef) -> Result<(), AdapterError> {
        self.on_element(element, scripts::SCRIPT_CLICK).await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), AdapterError> {
        self.on_element(element, scripts::CLEAR).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AdapterError> {
        self.on_element(element, scripts::FOCUS).await?;
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(io_error)?;
        Ok(())
    }

    async fn press_key(&self, element: &ElementRef, key: Key) -> Result<(), AdapterError> {
        self.on_element(element, scripts::FOCUS).await?;
        self.dispatch_key(DispatchKeyEventType::KeyDown, key).await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp, key).await
    }

    async fn select_by_visible_text(
        &self,
        element: &ElementRef,
        text: &str,
    ) -> Result<(), AdapterError> {
        self.on_element(element, &scripts::select_by_visible_text(text))
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, AdapterError> {
        let value = self.on_element(element, scripts::TEXT).await?;
        Ok(optional_string(&value, "value").unwrap_or_default())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AdapterError> {
        let value = self.on_element(element, &scripts::attribute(name)).await?;
        Ok(optional_string(&value, "value"))
    }

    async fn css_value(
        &self,
        element: &ElementRef,
        property: &str,
    ) -> Result<Option<String>, AdapterError> {
        let value = self
            .on_element(element, &scripts::css_value(property))
            .await?;
        Ok(optional_string(&value, "value"))
    }

    async fn parent(&self, element: &ElementRef) -> Result<Option<ElementRef>, AdapterError> {
        let fresh = Uuid::new_v4().to_string();
        let value = self.on_element(element, &scripts::parent(&fresh)).await?;
        Ok(optional_string(&value, "handle").map(|handle| ElementRef::new(handle, element.scope)))
    }

    async fn scroll_into_view(&self, element: &ElementRef) -> Result<(), AdapterError> {
        self.on_element(element, scripts::SCROLL_INTO_VIEW).await?;
        Ok(())
    }

    async fn in_viewport(&self, element: &ElementRef) -> Result<bool, AdapterError> {
        let value = self.on_element(element, scripts::IN_VIEWPORT).await?;
        Ok(value.get("value").and_then(Value::as_bool).unwrap_or(false))
    }

    /// Runs in the top-level realm regardless of the selected frame.
    async fn execute_script(&self, script: &str) -> Result<Value, AdapterError> {
        self.evaluate(script.to_string()).await
    }

    async fn frame_count(&self) -> Result<usize, AdapterError> {
        let value = self
            .evaluate_checked(scripts::FRAME_COUNT.to_string())
            .await?;
        Ok(value.get("value").and_then(Value::as_u64).unwrap_or(0) as usize)
    }

    async fn switch_to_frame(&self, index: usize) -> Result<(), AdapterError> {
        let count = self.frame_count().await?;
        if index >= count {
            return Err(AdapterError::new(AdapterErrorKind::NoSuchFrame)
                .with_hint(format!("frame index {index} out of range ({count} frames)")));
        }
        *self.scope.lock() = FrameScope::Frame(index);
        Ok(())
    }

    async fn switch_to_default(&self) -> Result<(), AdapterError> {
        *self.scope.lock() = FrameScope::TopLevel;
        Ok(())
    }

    fn current_scope(&self) -> FrameScope {
        *self.scope.lock()
    }

    async fn screenshot(&self) -> Result<Vec<u8>, AdapterError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page.screenshot(params).await.map_err(|err| {
            warn!(target: "cdp-adapter", %err, "screenshot capture failed");
            io_error(err)
        })
    }
}
