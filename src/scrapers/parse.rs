use std::collections::HashSet;

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::RawPost;
use crate::scrapers::types::GroupPage;

/// Lightweight mobile site; serves group feeds as plain HTML
pub const MBASIC_BASE_URL: &str = "https://mbasic.facebook.com";

/// Tracking metadata stored in a story's `data-ft` attribute
#[derive(Debug, Default, Deserialize)]
struct StoryMeta {
    top_level_post_id: Option<Value>,
    mf_story_key: Option<Value>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {css}: {e:?}"))
}

/// Extract the posts and the next-page link from a group feed page
pub fn parse_group_page(html: &str, base_url: &str) -> Result<GroupPage> {
    let document = Html::parse_document(html);
    let story_selector = selector(r#"article[data-ft], div[role="article"][data-ft]"#)?;
    let paragraph_selector = selector("p")?;
    let image_selector = selector(r#"a[href*="/photo"] img[src]"#)?;
    let link_selector = selector("a[href]")?;

    let mut seen = HashSet::new();
    let mut posts = Vec::new();

    for story in document.select(&story_selector) {
        let Some(post_id) = story_id(story) else {
            debug!("Skipping story without a post id");
            continue;
        };
        if !seen.insert(post_id.clone()) {
            continue;
        }

        let paragraphs: Vec<String> = story
            .select(&paragraph_selector)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let text = (!paragraphs.is_empty()).then(|| paragraphs.join("\n"));

        let image = story
            .select(&image_selector)
            .find_map(|img| img.value().attr("src"))
            .map(str::to_string);

        posts.push(RawPost {
            post_id,
            text,
            image,
        });
    }

    let next_page = document
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains("bac=") || href.contains("bacr="))
        .map(|href| absolute_url(base_url, href));

    debug!(
        "Parsed {} posts, next page: {}",
        posts.len(),
        next_page.is_some()
    );

    Ok(GroupPage { posts, next_page })
}

fn story_id(story: ElementRef<'_>) -> Option<String> {
    let raw = story.value().attr("data-ft")?;
    let meta: StoryMeta = serde_json::from_str(raw).ok()?;
    meta.top_level_post_id
        .as_ref()
        .and_then(id_string)
        .or_else(|| meta.mf_story_key.as_ref().and_then(id_string))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}
