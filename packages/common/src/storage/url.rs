use super::traits::LogicalFolder;

/// Rewrite the `/{from}/` path segment of a public URL to `/{to}/`.
///
/// Returns `None` when the source folder does not appear in the URL,
/// signalling "not applicable" rather than an error.
pub fn rename_url_segment(url: &str, from: LogicalFolder, to: LogicalFolder) -> Option<String> {
    let needle = format!("/{}/", from.as_str());
    if !url.contains(&needle) {
        return None;
    }
    Some(url.replacen(&needle, &format!("/{}/", to.as_str()), 1))
}

/// Extract the object name (final path segment) from a public URL.
pub fn object_name(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_rewrites_first_matching_segment() {
        let url = "https://bucket.s3.us-east-1.amazonaws.com/Raw-images/photo.png";
        let renamed =
            rename_url_segment(url, LogicalFolder::RawImages, LogicalFolder::OptimizedImages)
                .unwrap();
        assert_eq!(
            renamed,
            "https://bucket.s3.us-east-1.amazonaws.com/Optimize-images/photo.png"
        );
    }

    #[test]
    fn rename_returns_none_when_folder_absent() {
        let url = "https://bucket.s3.us-east-1.amazonaws.com/Resume/cv.pdf";
        assert!(
            rename_url_segment(url, LogicalFolder::RawImages, LogicalFolder::OptimizedImages)
                .is_none()
        );
    }

    #[test]
    fn rename_requires_full_segment_match() {
        // "Raw-images" embedded in a longer segment must not match.
        let url = "https://host/Raw-imagesx/photo.png";
        assert!(
            rename_url_segment(url, LogicalFolder::RawImages, LogicalFolder::OptimizedImages)
                .is_none()
        );
    }

    #[test]
    fn object_name_takes_last_segment() {
        assert_eq!(
            object_name("https://host/Optimize-images/2025-01-01-120000-avatar.png"),
            Some("2025-01-01-120000-avatar.png")
        );
        assert_eq!(object_name("plain-name.pdf"), Some("plain-name.pdf"));
    }

    #[test]
    fn object_name_rejects_trailing_slash() {
        assert_eq!(object_name("https://host/folder/"), None);
        assert_eq!(object_name(""), None);
    }
}
