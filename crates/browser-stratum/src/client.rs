use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use core_types::{RefLookup, RefTable};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::BrowserError;
use crate::model::{ElementLocator, NavigateResult, PageInfo, SnapshotResult, TabInfo};
use crate::snapshot::{collect_raw_snapshot, to_element_records};

struct BrowserHandle {
    browser: Browser,
    pages: Vec<Page>,
    active_page: usize,
    _event_loop: tokio::task::JoinHandle<()>,
}

/// Owns a single persistent browser context stored under a fixed profile
/// directory (spec.md §4.C3, §5 "Shared resources"). `launch`/`close` are
/// idempotent; the ref table is wholly rewritten on every `snapshot()`.
pub struct BrowserClient {
    profile_dir: PathBuf,
    nav_timeout: Duration,
    action_timeout: Duration,
    handle: Mutex<Option<BrowserHandle>>,
    refs: Mutex<RefTable<ElementLocator>>,
}

impl BrowserClient {
    pub fn new(profile_dir: PathBuf, nav_timeout: Duration, action_timeout: Duration) -> Self {
        Self {
            profile_dir,
            nav_timeout,
            action_timeout,
            handle: Mutex::new(None),
            refs: Mutex::new(RefTable::new()),
        }
    }

    pub async fn launch(&self) -> Result<(), BrowserError> {
        let mut guard = self.handle.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let config = BrowserConfig::builder()
            .user_data_dir(&self.profile_dir)
            .with_head()
            .args(vec![
                "--disable-blink-features=AutomationControlled",
                "--no-first-run",
            ])
            .build()
            .map_err(BrowserError::CdpIo)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| BrowserError::CdpIo(err.to_string()))?;

        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "browser event loop error");
                }
            }
        });

        *guard = Some(BrowserHandle {
            browser,
            pages: Vec::new(),
            active_page: 0,
            _event_loop: event_loop,
        });
        info!("browser launched");
        Ok(())
    }

    pub async fn close(&self) -> Result<(), BrowserError> {
        let mut guard = self.handle.lock().await;
        if let Some(mut handle) = guard.take() {
            let _ = handle.browser.close().await;
        }
        Ok(())
    }

    async fn ensure_page(&self) -> Result<(), BrowserError> {
        let mut guard = self.handle.lock().await;
        let handle = guard.as_mut().ok_or(BrowserError::NotLaunched)?;
        if handle.pages.is_empty() {
            let page = handle
                .browser
                .new_page("about:blank")
                .await
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            handle.pages.push(page);
            handle.active_page = 0;
        }
        Ok(())
    }

    async fn with_active_page<F, Fut, T>(&self, f: F) -> Result<T, BrowserError>
    where
        F: FnOnce(Page) -> Fut,
        Fut: std::future::Future<Output = Result<T, BrowserError>>,
    {
        self.ensure_page().await?;
        let page = {
            let guard = self.handle.lock().await;
            let handle = guard.as_ref().ok_or(BrowserError::NotLaunched)?;
            handle.pages[handle.active_page].clone()
        };
        f(page).await
    }

    pub async fn navigate(&self, url: &str) -> Result<NavigateResult, BrowserError> {
        self.with_active_page(|page| async move {
            tokio::time::timeout(self.nav_timeout, page.goto(url))
                .await
                .map_err(|_| BrowserError::NavTimeout(url.to_string()))?
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            tokio::time::timeout(self.nav_timeout, page.wait_for_navigation())
                .await
                .map_err(|_| BrowserError::NavTimeout(url.to_string()))?
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;

            let final_url = page.url().await.unwrap_or_default().unwrap_or_default();
            let title = page.get_title().await.unwrap_or_default().unwrap_or_default();
            Ok(NavigateResult {
                url: final_url,
                title,
            })
        })
        .await
    }

    pub async fn snapshot(&self, interactive_only: bool) -> Result<SnapshotResult, BrowserError> {
        let (url, title, entries) = self
            .with_active_page(|page| async move { collect_raw_snapshot(&page, interactive_only).await })
            .await?;

        let mut refs_guard = self.refs.lock().await;
        let locators: Vec<ElementLocator> =
            entries.iter().map(|(locator, ..)| locator.clone()).collect();
        let ref_ids = refs_guard.rewrite("e", locators);

        let elements = to_element_records(ref_ids, entries);
        Ok(SnapshotResult {
            page_url: url,
            page_title: title,
            elements,
        })
    }

    async fn resolve_ref(&self, reference: &str) -> Result<ElementLocator, BrowserError> {
        let refs_guard = self.refs.lock().await;
        match refs_guard.lookup(reference) {
            RefLookup::Found(locator) => Ok(locator.clone()),
            RefLookup::Unknown => Err(BrowserError::UnknownRef(reference.to_string())),
        }
    }

    async fn find_element_for_ref(
        &self,
        page: &Page,
        reference: &str,
    ) -> Result<chromiumoxide::element::Element, BrowserError> {
        let locator = self.resolve_ref(reference).await?;
        let current_url = page.url().await.unwrap_or_default().unwrap_or_default();
        if current_url != locator.owning_page_url {
            return Err(BrowserError::StaleRoute(format!(
                "page navigated from {} to {current_url} since the last snapshot",
                locator.owning_page_url
            )));
        }
        tokio::time::timeout(self.action_timeout, page.find_element(&locator.selector))
            .await
            .map_err(|_| BrowserError::NavTimeout(locator.selector.clone()))?
            .map_err(|_| BrowserError::UnknownRef(reference.to_string()))
    }

    pub async fn click(&self, reference: &str) -> Result<(), BrowserError> {
        self.with_active_page(|page| async move {
            let element = self.find_element_for_ref(&page, reference).await?;
            element
                .click()
                .await
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            Ok(())
        })
        .await
    }

    pub async fn type_text(&self, reference: &str, text: &str) -> Result<(), BrowserError> {
        self.with_active_page(|page| async move {
            let element = self.find_element_for_ref(&page, reference).await?;
            element
                .click()
                .await
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            element
                .type_str(text)
                .await
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            Ok(())
        })
        .await
    }

    pub async fn select(&self, reference: &str, value: &str) -> Result<(), BrowserError> {
        self.with_active_page(|page| async move {
            let locator = self.resolve_ref(reference).await?;
            let script = format!(
                r#"(() => {{
                    const el = document.querySelector({selector});
                    if (!el) return false;
                    let matched = false;
                    for (const opt of el.options) {{
                        if (opt.textContent.trim() === {value} || opt.value === {value}) {{
                            el.value = opt.value;
                            matched = true;
                            break;
                        }}
                    }}
                    if (matched) el.dispatchEvent(new Event('change', {{bubbles: true}}));
                    return matched;
                }})()"#,
                selector = serde_json::to_string(&locator.selector).unwrap_or_default(),
                value = serde_json::to_string(value).unwrap_or_default(),
            );
            let result = page
                .evaluate(script)
                .await
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            let matched: bool = result.into_value().unwrap_or(false);
            if !matched {
                return Err(BrowserError::OptionNotFound(value.to_string()));
            }
            Ok(())
        })
        .await
    }

    pub async fn screenshot(&self) -> Result<String, BrowserError> {
        self.with_active_page(|page| async move {
            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(false)
                .build();
            let bytes = page
                .screenshot(params)
                .await
                .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
            Ok(BASE64.encode(bytes))
        })
        .await
    }

    pub async fn page_info(&self) -> Result<PageInfo, BrowserError> {
        self.with_active_page(|page| async move {
            let url = page.url().await.unwrap_or_default().unwrap_or_default();
            let title = page.get_title().await.unwrap_or_default().unwrap_or_default();
            Ok(PageInfo { url, title })
        })
        .await
    }

    pub async fn new_tab(&self, url: Option<&str>) -> Result<TabInfo, BrowserError> {
        let mut guard = self.handle.lock().await;
        let handle = guard.as_mut().ok_or(BrowserError::NotLaunched)?;
        let page = handle
            .browser
            .new_page(url.unwrap_or("about:blank"))
            .await
            .map_err(|err| BrowserError::CdpIo(err.to_string()))?;
        let target_id = page.target_id().to_string();
        let page_url = page.url().await.unwrap_or_default().unwrap_or_default();
        let title = page.get_title().await.unwrap_or_default().unwrap_or_default();
        handle.pages.push(page);
        handle.active_page = handle.pages.len() - 1;
        Ok(TabInfo {
            id: target_id,
            url: page_url,
            title,
        })
    }

    pub async fn close_tab(&self) -> Result<(), BrowserError> {
        let mut guard = self.handle.lock().await;
        let handle = guard.as_mut().ok_or(BrowserError::NotLaunched)?;
        if handle.pages.is_empty() {
            return Ok(());
        }
        let page = handle.pages.remove(handle.active_page);
        let _ = page.close().await;
        handle.active_page = handle.active_page.saturating_sub(1);
        Ok(())
    }

    pub async fn list_tabs(&self) -> Result<Vec<TabInfo>, BrowserError> {
        let guard = self.handle.lock().await;
        let handle = guard.as_ref().ok_or(BrowserError::NotLaunched)?;
        let mut tabs = Vec::with_capacity(handle.pages.len());
        for page in &handle.pages {
            let url = page.url().await.unwrap_or_default().unwrap_or_default();
            let title = page.get_title().await.unwrap_or_default().unwrap_or_default();
            tabs.push(TabInfo {
                id: page.target_id().to_string(),
                url,
                title,
            });
        }
        Ok(tabs)
    }

    pub async fn is_launched(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_ref_before_any_snapshot() {
        let client = BrowserClient::new(
            PathBuf::from("/tmp/uia-browser-profile-test"),
            Duration::from_secs(5),
            Duration::from_secs(5),
        );
        let err = client.resolve_ref("e1").await.unwrap_err();
        assert!(matches!(err, BrowserError::UnknownRef(_)));
    }

    #[tokio::test]
    async fn ref_from_previous_snapshot_becomes_unknown_after_rewrite() {
        let client = BrowserClient::new(
            PathBuf::from("/tmp/uia-browser-profile-test"),
            Duration::from_secs(5),
            Duration::from_secs(5),
        );
        let (first_ref, second_ref) = {
            let mut refs = client.refs.lock().await;
            let first = refs.rewrite(
                "e",
                vec![ElementLocator {
                    selector: "#a".into(),
                    owning_page_url: "https://example.com".into(),
                }],
            );
            let second = refs.rewrite(
                "e",
                vec![ElementLocator {
                    selector: "#b".into(),
                    owning_page_url: "https://example.com".into(),
                }],
            );
            (first[0].clone(), second[0].clone())
        };
        let err = client.resolve_ref(&first_ref).await.unwrap_err();
        assert!(matches!(err, BrowserError::UnknownRef(_)));
        let locator = client.resolve_ref(&second_ref).await.unwrap();
        assert_eq!(locator.selector, "#b");
    }
}
