use crate::http_client::{encode_component, get_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  YouTube,
  TikTok,
  Instagram,
}

pub fn detect_platform(url: &str) -> Option<Platform> {
  let lower = url.to_ascii_lowercase();
  if lower.contains("youtube.com") || lower.contains("youtu.be") {
    Some(Platform::YouTube)
  } else if lower.contains("tiktok.com") {
    Some(Platform::TikTok)
  } else if lower.contains("instagram.com") {
    Some(Platform::Instagram)
  } else {
    None
  }
}

fn take_id(rest: &str) -> Option<String> {
  let id: String = rest
    .chars()
    .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
    .collect();
  if id.is_empty() {
    None
  } else {
    Some(id)
  }
}

/// Extracts the video id from `watch?v=`, `youtu.be/`, `/shorts/` and
/// `/embed/` links.
pub fn youtube_video_id(url: &str) -> Option<String> {
  let url = url.trim();
  let without_fragment = url.split('#').next().unwrap_or(url);
  if let Some((_, query)) = without_fragment.split_once('?') {
    let v = query
      .split('&')
      .filter_map(|pair| pair.split_once('='))
      .find(|(k, _)| *k == "v")
      .and_then(|(_, value)| take_id(value));
    if v.is_some() {
      return v;
    }
  }
  for marker in ["youtu.be/", "/shorts/", "/embed/"] {
    if let Some(idx) = url.find(marker) {
      return take_id(&url[idx + marker.len()..]);
    }
  }
  None
}

pub fn youtube_thumbnail_url(video_id: &str) -> String {
  format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

fn oembed_endpoint(base_url: &str, platform: Platform, content_url: &str) -> Option<String> {
  let path = match platform {
    Platform::TikTok => "oembed",
    Platform::Instagram => "api/v1/oembed",
    Platform::YouTube => return None,
  };
  Some(format!("{}{}?url={}", base_url, path, encode_component(content_url)))
}

fn default_base_url(platform: Platform) -> &'static str {
  match platform {
    Platform::TikTok => "https://www.tiktok.com/",
    Platform::Instagram => "https://www.instagram.com/",
    Platform::YouTube => "https://www.youtube.com/",
  }
}

/// Best-effort thumbnail lookup. YouTube thumbnails are derived from the id;
/// TikTok and Instagram go through oEmbed. Failures are logged and yield
/// `None`.
pub async fn fetch_thumbnail_url_with_base_url(base_url: Option<&str>, content_url: &str) -> Option<String> {
  let platform = detect_platform(content_url)?;

  if platform == Platform::YouTube {
    return youtube_video_id(content_url).map(|id| youtube_thumbnail_url(&id));
  }

  let base = base_url.unwrap_or_else(|| default_base_url(platform));
  let endpoint = oembed_endpoint(base, platform, content_url)?;

  match get_json(&endpoint).await {
    Ok(json) => json
      .get("thumbnail_url")
      .and_then(|v| v.as_str())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(str::to_string),
    Err(err) => {
      tracing::warn!(error = %err, url = content_url, "oembed thumbnail lookup failed");
      None
    }
  }
}

pub async fn fetch_thumbnail_url(content_url: &str) -> Option<String> {
  fetch_thumbnail_url_with_base_url(None, content_url).await
}
