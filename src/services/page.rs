use async_trait::async_trait;

use crate::error::PageError;

/// One matched DOM element.
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    async fn text(&self) -> Result<String, PageError>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError>;

    async fn attr(&self, name: &'static str) -> Result<Option<String>, PageError>;
}

/// A live, rendered page the scroll loop owns for the length of one run.
#[async_trait]
pub trait PageSession: Send + Sync + Sized {
    type Element: PageElement;

    async fn goto(&self, url: &str) -> Result<(), PageError>;

    /// Mouse-wheel style vertical scroll by `delta_y` pixels.
    async fn scroll_by(&self, delta_y: i64) -> Result<(), PageError>;

    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageError>;

    /// Releases the underlying browser. Called exactly once per run.
    async fn close(self) -> Result<(), PageError>;
}
