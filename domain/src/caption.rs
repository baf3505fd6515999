//! Community caption feed.
//!
//! Caption rows and image rows live in separate tables whose names and columns
//! are configurable. Cards are assembled from public captions, resolving each
//! caption's image either from a direct URL column or through the images table.

use crate::error::Error;
use crate::gateway::data_store::{DataStore, Query, Row};
use crate::value_to_string;
use log::*;
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::Value;
use service::config::Config;
use std::collections::{BTreeSet, HashMap};

/// A caption ready to be shown for voting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionCard {
    pub id: String,
    pub text: String,
    pub image_url: Option<String>,
}

/// Table and column names used to assemble the feed.
#[derive(Debug, Clone)]
pub struct CaptionFeedConfig {
    pub captions_table: String,
    pub id_column: String,
    pub text_column: String,
    pub public_column: String,
    pub image_id_column: String,
    /// When set, a non-null value in this column wins over the images table.
    pub image_url_column: Option<String>,
    pub limit: u32,
    pub images_table: String,
    pub images_id_column: String,
    pub images_url_column: String,
}

impl Default for CaptionFeedConfig {
    fn default() -> Self {
        Self {
            captions_table: "captions".to_string(),
            id_column: "id".to_string(),
            text_column: "content".to_string(),
            public_column: "is_public".to_string(),
            image_id_column: "image_id".to_string(),
            image_url_column: None,
            limit: 25,
            images_table: "images".to_string(),
            images_id_column: "id".to_string(),
            images_url_column: "url".to_string(),
        }
    }
}

impl From<&Config> for CaptionFeedConfig {
    fn from(config: &Config) -> Self {
        Self {
            captions_table: config.captions_table.clone(),
            id_column: config.captions_id_column.clone(),
            text_column: config.captions_text_column.clone(),
            public_column: config.captions_public_column.clone(),
            image_id_column: config.captions_image_id_column.clone(),
            image_url_column: config
                .captions_image_url_column
                .clone()
                .filter(|c| !c.is_empty()),
            limit: config.captions_limit,
            images_table: config.images_table.clone(),
            images_id_column: config.images_id_column.clone(),
            images_url_column: config.images_url_column.clone(),
        }
    }
}

/// Load public captions and resolve their images.
pub async fn fetch_caption_cards(
    store: &dyn DataStore,
    config: &CaptionFeedConfig,
) -> Result<Vec<CaptionCard>, Error> {
    let mut columns = vec![
        config.id_column.as_str(),
        config.text_column.as_str(),
        config.image_id_column.as_str(),
    ];
    if let Some(url_column) = &config.image_url_column {
        columns.push(url_column);
    }

    let query: Query = vec![
        ("select".to_string(), columns.join(",")),
        ("limit".to_string(), config.limit.to_string()),
        (config.public_column.clone(), "eq.true".to_string()),
    ];
    let captions = store.select(&config.captions_table, &query).await?;

    let image_ids: BTreeSet<String> = captions
        .iter()
        .filter_map(|row| present(row.get(&config.image_id_column)))
        .map(value_to_string)
        .collect();

    let images = if image_ids.is_empty() {
        HashMap::new()
    } else {
        fetch_image_urls(store, config, &image_ids).await
    };

    let cards: Vec<CaptionCard> = captions
        .iter()
        .filter_map(|row| build_card(row, config, &images))
        .collect();

    debug!("Assembled {} caption card(s)", cards.len());
    Ok(cards)
}

/// Pick one card uniformly at random.
pub fn random_caption(cards: &[CaptionCard]) -> Option<&CaptionCard> {
    cards.choose(&mut rand::thread_rng())
}

// Image lookup is best effort: a failure leaves every card without an image.
async fn fetch_image_urls(
    store: &dyn DataStore,
    config: &CaptionFeedConfig,
    image_ids: &BTreeSet<String>,
) -> HashMap<String, String> {
    let ids: Vec<&str> = image_ids.iter().map(String::as_str).collect();
    let query: Query = vec![
        (
            "select".to_string(),
            format!("{},{}", config.images_id_column, config.images_url_column),
        ),
        (
            config.images_id_column.clone(),
            format!("in.({})", ids.join(",")),
        ),
    ];

    let rows = match store.select(&config.images_table, &query).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Image lookup failed, continuing without images: {e}");
            Vec::new()
        }
    };

    rows.iter()
        .filter_map(|row| {
            let id = first_present(row, &[config.images_id_column.as_str(), "id", "uuid"])?;
            let url = first_present(row, &[config.images_url_column.as_str(), "url", "image_url"])?;
            Some((value_to_string(id), value_to_string(url)))
        })
        .collect()
}

fn build_card(
    row: &Row,
    config: &CaptionFeedConfig,
    images: &HashMap<String, String>,
) -> Option<CaptionCard> {
    let id = row.get(&config.id_column)?;
    let text = present(row.get(&config.text_column))?;

    let direct_url = config
        .image_url_column
        .as_ref()
        .and_then(|column| present(row.get(column)));

    let image_url = match direct_url {
        Some(url) => Some(value_to_string(url)),
        None => present(row.get(&config.image_id_column))
            .and_then(|image_id| images.get(&value_to_string(image_id)).cloned()),
    };

    Some(CaptionCard {
        id: value_to_string(id),
        text: value_to_string(text),
        image_url,
    })
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn first_present<'a>(row: &'a Row, columns: &[&str]) -> Option<&'a Value> {
    columns
        .iter()
        .find_map(|column| present(row.get(*column)))
}
