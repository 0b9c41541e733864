use crate::UrlError;
use percent_encoding::percent_decode_str;
use url::Url;

/// Resolves an href against the page it was found on
///
/// The result is the canonical form used for the visited set and the
/// catalog: absolute, http(s) only, with any fragment removed. Host case and
/// dot segments are normalized by the `url` crate during the join.
///
/// # Examples
///
/// ```
/// use dirlist_catalog::url::resolve_href;
/// use url::Url;
///
/// let page = Url::parse("https://files.example.com/movies/A/").unwrap();
/// let url = resolve_href(&page, "../B/#top").unwrap();
/// assert_eq!(url.as_str(), "https://files.example.com/movies/B/");
/// ```
pub fn resolve_href(page: &Url, href: &str) -> Result<Url, UrlError> {
    let mut url = page
        .join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    url.set_fragment(None);
    Ok(url)
}

/// Returns the last non-empty path segment of a URL, percent-decoded
///
/// `https://host/movies/The%20Matrix%20(1999).mkv` yields
/// `The Matrix (1999).mkv`. Invalid UTF-8 sequences are replaced rather
/// than rejected.
pub fn file_name(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())?;

    Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}
