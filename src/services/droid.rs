use async_trait::async_trait;
use thirtyfour::{error::WebDriverResult, prelude::*, ChromiumLikeCapabilities};

use crate::{
    configuration::BrowserSettings,
    error::{PageError, ScrapeError},
};

use super::{PageElement, PageSession};

const SCROLL_SCRIPT: &str = "window.scrollBy(0, arguments[0]);";

/// A chrome session behind a WebDriver server, owned by one run.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, ScrapeError> {
        let server_url = settings.webdriver_url().map_err(|e| {
            ScrapeError::Launch(format!(
                "Invalid webdriver url {}: {}",
                settings.webdriver_url, e
            ))
        })?;

        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless().map_err(launch_error)?;
        }
        caps.add_arg(&format!("--user-agent={}", settings.user_agent))
            .map_err(launch_error)?;

        let driver = WebDriver::new(server_url.to_string(), caps)
            .await
            .map_err(launch_error)?;

        if let Err(e) = configure(&driver, settings).await {
            if let Err(quit_err) = driver.quit().await {
                log::error!("Failed to quit half-started browser: {:?}", quit_err);
            }
            return Err(launch_error(e));
        }

        log::info!("Browser session started on {}", server_url);
        Ok(Droid { driver })
    }
}

async fn configure(driver: &WebDriver, settings: &BrowserSettings) -> WebDriverResult<()> {
    driver
        .set_page_load_timeout(settings.page_load_timeout())
        .await?;
    driver.set_script_timeout(settings.script_timeout()).await?;
    driver.maximize_window().await?;
    Ok(())
}

fn launch_error(e: WebDriverError) -> ScrapeError {
    ScrapeError::Launch(e.to_string())
}

#[async_trait]
impl PageElement for WebElement {
    async fn text(&self) -> Result<String, PageError> {
        Ok(WebElement::text(self).await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError> {
        Ok(WebElement::find_all(self, By::Css(selector.to_string())).await?)
    }

    async fn attr(&self, name: &'static str) -> Result<Option<String>, PageError> {
        Ok(WebElement::attr(self, name).await?)
    }
}

#[async_trait]
impl PageSession for Droid {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<(), PageError> {
        self.driver.goto(url.to_string()).await?;
        Ok(())
    }

    async fn scroll_by(&self, delta_y: i64) -> Result<(), PageError> {
        self.driver
            .execute(SCROLL_SCRIPT, vec![serde_json::json!(delta_y)])
            .await?;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageError> {
        Ok(self.driver.find_all(By::Css(selector.to_string())).await?)
    }

    async fn close(self) -> Result<(), PageError> {
        self.driver.quit().await?;
        Ok(())
    }
}
