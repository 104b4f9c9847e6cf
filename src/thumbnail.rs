use eframe::egui::ColorImage;
use url::Url;

/// Module for finding a YouTube video id in a URL and downloading its thumbnail.
///
/// Understands `watch?v=`, `youtu.be/`, `shorts/`, `embed/` and `live/` links,
/// with or without a scheme. Returns `None` for anything else.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{input}")))
        .ok()?;

    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(host);

    let mut segments = url.path_segments()?;
    let id = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            "shorts" | "embed" | "live" | "v" => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }?;

    is_video_id(&id).then_some(id)
}

/// Video ids are 11 characters of URL-safe base64.
fn is_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Downloads and decodes the `hqdefault` thumbnail. Blocking; run it off the UI thread.
pub fn fetch_thumbnail(video_id: &str) -> Option<ColorImage> {
    let url = format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id);
    // Any network or decode failure just means no preview
    let resp = reqwest::blocking::get(&url)
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes());
    let bytes = match resp {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("no thumbnail for {video_id}: {e}");
            return None;
        }
    };
    let img = image::load_from_memory(&bytes).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn finds_id_in_common_link_shapes() {
        for link in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://m.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "  https://music.youtube.com/watch?v=dQw4w9WgXcQ\n",
        ] {
            assert_eq!(extract_video_id(link).as_deref(), Some(ID), "{link}");
        }
    }

    #[test]
    fn rejects_other_sites_and_bad_ids() {
        assert_eq!(extract_video_id("https://vimeo.com/123456"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/channel/UCabc"), None);
        assert_eq!(extract_video_id(""), None);
    }
}
