use thirtyfour::error::WebDriverError;

/// Failure of a single interaction with the rendered page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Page interaction timed out: {0}")]
    Timeout(String),

    #[error("Element is no longer attached to the page: {0}")]
    Detached(String),

    #[error("WebDriver error: {0}")]
    Driver(#[source] WebDriverError),

    #[error("{0}")]
    Other(String),
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout(_))
    }
}

impl From<WebDriverError> for PageError {
    fn from(e: WebDriverError) -> Self {
        match e {
            WebDriverError::Timeout(..) | WebDriverError::ScriptTimeout(..) => {
                PageError::Timeout(e.to_string())
            }
            WebDriverError::StaleElementReference(..) | WebDriverError::NoSuchElement(..) => {
                PageError::Detached(e.to_string())
            }
            other => PageError::Driver(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Failed to acquire the browser session: {0}")]
    Launch(String),

    #[error("Io error on output file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv error on output file: {0}")]
    Csv(#[from] csv::Error),
}
