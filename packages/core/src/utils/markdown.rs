//! Markdown asset link rewriting
//!
//! Notes reference images by object-store key, either as standard markdown
//! images (`![alt](path)`) or as wiki-link embeds (`![[key|alt]]`). Before
//! rendering, those keys are exchanged for short-lived signed URLs.

use crate::backend::AssetUrlResolver;
use crate::config::SyncConfig;
use futures::future::join_all;
use indexmap::IndexSet;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// `![alt](path)`: group 1 is the alt text, group 2 the raw path
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// `![[key|alt]]`: group 1 is the key, group 2 the optional alt text
static WIKILINK_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^|\]]+)(?:\|([^\]]+))?\]\]").unwrap());

static REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Turn a relative image path into an object key
///
/// Trims whitespace, drops any query or fragment, strips one leading `./`
/// or `/`, strips `figure_prefix`, then percent-decodes. Text that does not
/// decode to valid UTF-8 is returned undecoded.
///
/// # Examples
///
/// ```
/// use notetree_core::utils::normalize_image_key;
///
/// assert_eq!(normalize_image_key(" ./-1_figures/a%20b.png?x=1 ", "-1_figures/"), "a b.png");
/// assert_eq!(normalize_image_key("/img/c.png#top", "-1_figures/"), "img/c.png");
/// ```
pub fn normalize_image_key(raw: &str, figure_prefix: &str) -> String {
    let clean = raw.trim();
    let clean = clean.split(['?', '#']).next().unwrap_or(clean);
    let clean = clean
        .strip_prefix("./")
        .or_else(|| clean.strip_prefix('/'))
        .unwrap_or(clean);
    let clean = if figure_prefix.is_empty() {
        clean
    } else {
        clean.strip_prefix(figure_prefix).unwrap_or(clean)
    };

    match urlencoding::decode(clean) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => clean.to_string(),
    }
}

fn is_remote(path: &str) -> bool {
    REMOTE_RE.is_match(path)
}

/// Sign every key once, concurrently. Failed keys are absent from the map.
async fn resolve_keys(keys: IndexSet<String>, resolver: &dyn AssetUrlResolver) -> HashMap<String, String> {
    let lookups = keys.into_iter().map(|key| async move {
        let result = resolver.presigned_url(&key).await;
        (key, result)
    });

    let mut urls = HashMap::new();
    for (key, result) in join_all(lookups).await {
        match result {
            Ok(signed) => {
                urls.insert(key, signed.url);
            }
            Err(e) => tracing::warn!("Failed to sign asset {}: {}", key, e),
        }
    }
    urls
}

/// Replace relative markdown image paths with signed URLs
///
/// Remote (`http://`, `https://`) images are left alone. Each distinct key
/// is resolved once; an image whose key fails to resolve keeps its original
/// link.
///
/// # Arguments
///
/// * `markdown` - Note body
/// * `resolver` - Source of signed URLs
/// * `config` - Supplies the figure prefix stripped from keys
///
/// # Returns
///
/// The rewritten markdown. Empty input yields an empty string; input without
/// relative images is returned unchanged and the resolver is never called.
pub async fn rewrite_image_links(
    markdown: &str,
    resolver: &dyn AssetUrlResolver,
    config: &SyncConfig,
) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let keys: IndexSet<String> = IMAGE_RE
        .captures_iter(markdown)
        .map(|caps| caps[2].trim().to_string())
        .filter(|path| !is_remote(path))
        .map(|path| normalize_image_key(&path, &config.figure_prefix))
        .collect();

    if keys.is_empty() {
        return markdown.to_string();
    }

    tracing::debug!("Signing {} image keys", keys.len());
    let urls = resolve_keys(keys, resolver).await;

    IMAGE_RE
        .replace_all(markdown, |caps: &Captures| {
            let path = caps[2].trim();
            if is_remote(path) {
                return caps[0].to_string();
            }
            match urls.get(&normalize_image_key(path, &config.figure_prefix)) {
                Some(url) => format!("![{}]({})", &caps[1], url),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Convert `![[key|alt]]` embeds into standard markdown images
///
/// Keys are trimmed but otherwise used as-is. A key that fails to resolve
/// points at `config.asset_placeholder` so the rest of the note still
/// renders.
pub async fn rewrite_wikilink_images(
    markdown: &str,
    resolver: &dyn AssetUrlResolver,
    config: &SyncConfig,
) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let keys: IndexSet<String> = WIKILINK_IMAGE_RE
        .captures_iter(markdown)
        .map(|caps| caps[1].trim().to_string())
        .collect();

    if keys.is_empty() {
        return markdown.to_string();
    }

    let urls = resolve_keys(keys, resolver).await;

    WIKILINK_IMAGE_RE
        .replace_all(markdown, |caps: &Captures| {
            let key = caps[1].trim();
            let alt = caps.get(2).map_or("", |m| m.as_str().trim());
            let url = urls
                .get(key)
                .map_or(config.asset_placeholder.as_str(), String::as_str);
            format!("![{}]({})", alt, url)
        })
        .into_owned()
}
