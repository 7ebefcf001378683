// Big-picture image resolution
// Remote images are downloaded, embedded base64 images are decoded; both end up
// as local temp files a renderer can reference by path.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use base64::Engine;
use dashmap::DashMap;
use tokio::sync::OnceCell;
use url::Url;

use crate::components::{NotificationConfig, NotificationError, NotificationResult};

/// Where a big picture comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureSource<'a> {
    Url(&'a str),
    Base64(&'a str),
}

/// Picture resolved to a local file a renderer can reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Local file path (original file, download, or decoded data)
    pub path: PathBuf,
    /// Whether the file is a temp file created here
    pub is_temp: bool,
    /// Where the picture came from, for logging
    pub origin: String,
}

/// A downloaded picture kept on disk for reuse
#[derive(Debug, Clone)]
struct CachedPicture {
    path: PathBuf,
    fetched_at: Instant,
}

/// How long a downloaded picture is reused before it is fetched again
const PICTURE_TTL: Duration = Duration::from_secs(60 * 60);

const PICTURE_CACHE_CAPACITY: usize = 64;

/// Shared HTTP client for picture downloads, built from the first config seen
static HTTP_CLIENT: OnceCell<reqwest::Client> = OnceCell::const_new();

/// Downloaded pictures keyed by URL
static PICTURE_CACHE: LazyLock<DashMap<String, CachedPicture>> = LazyLock::new(DashMap::new);

async fn http_client(config: &NotificationConfig) -> NotificationResult<&'static reqwest::Client> {
    HTTP_CLIENT
        .get_or_try_init(|| async {
            reqwest::Client::builder()
                .timeout(config.image_fetch_timeout)
                .connect_timeout(config.image_connect_timeout)
                .user_agent(config.user_agent.as_str())
                .build()
                .map_err(|e| NotificationError::render(format!("Failed to build HTTP client: {}", e)))
        })
        .await
}

/// Drop expired pictures, then the oldest ones until the cache fits its capacity
fn prune_picture_cache(cache: &DashMap<String, CachedPicture>) {
    let mut entries: Vec<(String, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.fetched_at))
        .collect();
    entries.sort_by_key(|(_, fetched_at)| *fetched_at);

    let overflow = entries.len().saturating_sub(PICTURE_CACHE_CAPACITY);
    for (index, (url, fetched_at)) in entries.into_iter().enumerate() {
        if (index < overflow || fetched_at.elapsed() >= PICTURE_TTL)
            && let Some((_, stale)) = cache.remove(&url)
        {
            let _ = std::fs::remove_file(&stale.path);
        }
    }
}

/// Fresh cached copy of `url`, if its file is still on disk
fn cached_picture(url: &str) -> Option<PathBuf> {
    let entry = PICTURE_CACHE.get(url)?;
    if entry.fetched_at.elapsed() < PICTURE_TTL && entry.path.exists() {
        return Some(entry.path.clone());
    }
    drop(entry);
    PICTURE_CACHE.remove(url);
    None
}

/// Resolve a big picture to a local file
pub async fn resolve_picture(
    source: &PictureSource<'_>,
    config: &NotificationConfig,
) -> NotificationResult<ResolvedImage> {
    match source {
        PictureSource::Url(raw) => {
            let url = Url::parse(raw)
                .map_err(|e| NotificationError::render(format!("Invalid image URL {:?}: {}", raw, e)))?;
            match url.scheme() {
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| NotificationError::render(format!("Invalid file URL {}", url)))?;
                    if !path.exists() {
                        return Err(NotificationError::render(format!(
                            "Image file {} does not exist",
                            path.display()
                        )));
                    }
                    Ok(ResolvedImage {
                        path,
                        is_temp: false,
                        origin: url.to_string(),
                    })
                },
                "http" | "https" => download_image(&url, config).await,
                scheme => Err(NotificationError::render(format!(
                    "Unsupported image URL scheme {}",
                    scheme
                ))),
            }
        },
        PictureSource::Base64(data) => decode_base64_image(data).await,
    }
}

/// Download a remote picture to a kept temp file, reusing a fresh cached copy
pub async fn download_image(url: &Url, config: &NotificationConfig) -> NotificationResult<ResolvedImage> {
    let origin = url.to_string();

    prune_picture_cache(&PICTURE_CACHE);
    if let Some(path) = cached_picture(&origin) {
        tracing::debug!(url = %origin, path = ?path, "Reusing cached big picture");
        return Ok(ResolvedImage {
            path,
            is_temp: true,
            origin,
        });
    }

    tracing::info!(url = %origin, "Fetching big picture");

    let response = http_client(config)
        .await?
        .get(url.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| NotificationError::render(format!("Failed to download {}: {}", origin, e)))?;

    let too_large = |size: u64| {
        NotificationError::render(format!(
            "Picture {} is {} bytes, over the {} byte limit",
            origin, size, config.max_image_bytes
        ))
    };

    if let Some(size) = response.content_length()
        && size > config.max_image_bytes
    {
        return Err(too_large(size));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| NotificationError::render(format!("Failed to read {}: {}", origin, e)))?;
    if bytes.len() as u64 > config.max_image_bytes {
        return Err(too_large(bytes.len() as u64));
    }

    let extension = sniff_extension(&bytes)
        .or_else(|| url_extension(url))
        .unwrap_or("png");
    let path = write_temp_image(&bytes, extension).await?;

    PICTURE_CACHE.insert(origin.clone(), CachedPicture {
        path: path.clone(),
        fetched_at: Instant::now(),
    });
    tracing::info!(url = %origin, path = ?path, bytes = bytes.len(), "Big picture fetched");

    Ok(ResolvedImage {
        path,
        is_temp: true,
        origin,
    })
}

/// Decode an embedded base64 image (optionally a `data:` URI) into a temp file
pub async fn decode_base64_image(data: &str) -> NotificationResult<ResolvedImage> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    // Line-wrapped base64 is common in payloads
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| NotificationError::render(format!("Failed to decode base64 image: {}", e)))?;

    let extension = sniff_extension(&bytes)
        .ok_or_else(|| NotificationError::render("Embedded data is not a recognized image format"))?;

    let path = write_temp_image(&bytes, extension).await?;
    tracing::debug!(path = ?path, "Decoded embedded big picture");

    Ok(ResolvedImage {
        path,
        is_temp: true,
        origin: "embedded://base64".to_string(),
    })
}

async fn write_temp_image(bytes: &[u8], extension: &str) -> NotificationResult<PathBuf> {
    let path = tempfile::Builder::new()
        .prefix("local-notify-")
        .suffix(&format!(".{}", extension))
        .tempfile()
        .and_then(|file| file.into_temp_path().keep().map_err(|e| e.error))
        .map_err(|e| NotificationError::render(format!("Failed to create picture file: {}", e)))?;

    if let Err(e) = tokio::fs::write(&path, bytes).await {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(NotificationError::render(format!("Failed to write picture file: {}", e)));
    }
    Ok(path)
}

/// Identify common image formats from their magic bytes
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        [b'B', b'M', ..] => Some("bmp"),
        _ => None,
    }
}

/// Image extension named by the URL's last path segment, if it is one we know
fn url_extension(url: &Url) -> Option<&'static str> {
    let segment = url.path_segments()?.next_back()?;
    let (_, extension) = segment.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "bmp" => Some("bmp"),
        _ => None,
    }
}
