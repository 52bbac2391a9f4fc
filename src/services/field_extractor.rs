use crate::{
    domain::{deal_field::split_deal_fields, investor::ExtractionBatch},
    error::PageError,
};

use super::{PageElement, PageSession};

/// Layout-derived selectors for the investors table. The page has no stable
/// attributes, only fixed column widths, so every selector lives here.
#[derive(Debug, Clone)]
pub struct FieldSelectors {
    pub investors: String,
    pub deals_and_round_types: String,
    pub amounts: String,
    pub categories: String,
    pub names: String,
    pub chains: String,
    pub chain_image: String,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        FieldSelectors {
            investors: min_width(200),
            deals_and_round_types: min_width(120),
            amounts: min_width(140),
            categories: min_width(160),
            names: min_width(240),
            chains: "div.flex.items-center.justify-end".to_string(),
            chain_image: "img".to_string(),
        }
    }
}

fn min_width(px: u16) -> String {
    format!("div[style*='min-width: {}px']", px)
}

pub async fn get_text_safely<E: PageElement>(element: &E) -> String {
    match element.text().await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            log::debug!("Could not read element text: {}", e);
            String::new()
        }
    }
}

/// Image sources nested in `element`. Images without a `src` are skipped.
pub async fn get_chain_images<E: PageElement>(element: &E, image_selector: &str) -> Vec<String> {
    let images = match element.find_all(image_selector).await {
        Ok(images) => images,
        Err(e) => {
            log::debug!("Could not read chain images: {}", e);
            return vec![];
        }
    };

    let mut sources = Vec::with_capacity(images.len());
    for image in images.iter() {
        if let Ok(Some(src)) = image.attr("src").await {
            sources.push(src);
        }
    }
    sources
}

pub async fn extract_group<P: PageSession>(
    page: &P,
    selector: &str,
) -> Result<Vec<String>, PageError> {
    let mut texts = vec![];
    for element in page.query_all(selector).await?.iter() {
        texts.push(get_text_safely(element).await);
    }
    Ok(texts)
}

pub async fn extract_chain_images<P: PageSession>(
    page: &P,
    selectors: &FieldSelectors,
) -> Result<Vec<Vec<String>>, PageError> {
    let mut chains = vec![];
    for element in page.query_all(&selectors.chains).await?.iter() {
        chains.push(get_chain_images(element, &selectors.chain_image).await);
    }
    Ok(chains)
}

/// Samples every field group from the current DOM. Query failures (including
/// timeouts) abort the whole batch so a retried tick starts clean.
pub async fn extract_batch<P: PageSession>(
    page: &P,
    selectors: &FieldSelectors,
) -> Result<ExtractionBatch, PageError> {
    let investors = extract_group(page, &selectors.investors).await?;
    let mixed = extract_group(page, &selectors.deals_and_round_types).await?;
    let amounts = extract_group(page, &selectors.amounts).await?;
    let categories = extract_group(page, &selectors.categories).await?;
    let names = extract_group(page, &selectors.names).await?;
    let chains = extract_chain_images(page, selectors).await?;

    let (deals, round_types) = split_deal_fields(mixed);

    Ok(ExtractionBatch {
        investors,
        deals,
        round_types,
        categories,
        names,
        chains,
        amounts,
    })
}
