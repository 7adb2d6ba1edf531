use chrono::NaiveDateTime;

use crate::error::AppError;

/// Document extensions that are uploaded verbatim, without an optimization
/// tag.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Logical kind of profile asset being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Avatar,
    Logo,
    Resume,
}

impl AssetKind {
    /// Field-name stem baked into generated object names.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Logo => "logo",
            Self::Resume => "resume",
        }
    }

    /// Optimization parameters (target extension, dimensions, size budget)
    /// encoded into the upload tag for image-class kinds.
    fn optimization_params(&self) -> Option<(&'static str, &'static str, &'static str)> {
        match self {
            Self::Avatar => Some(("png", "400x400", "300KB")),
            Self::Logo => Some(("png", "400x100", "150KB")),
            Self::Resume => None,
        }
    }
}

/// A validated upload, ready for the object store.
///
/// Built once per request and immutable afterwards; validation never mutates
/// the inbound multipart state.
pub struct PreparedUpload {
    /// Object name, including the optimization tag for image-class uploads.
    pub object_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Validate an uploaded file and derive its storage name.
///
/// The name is a local-timestamp stem plus the original extension
/// (`YYYY-MM-DD-HHMMSS-<field>.<ext>`). Image-class uploads get an
/// `?ext=..&size=..&filesize=..` tag appended so the post-upload URL
/// transform can pick the optimized extension; document extensions
/// (pdf/doc/docx) skip the tag.
pub fn prepare_upload(
    kind: AssetKind,
    original_filename: &str,
    bytes: Vec<u8>,
    max_size: u64,
    now: NaiveDateTime,
) -> Result<PreparedUpload, AppError> {
    if bytes.len() as u64 > max_size {
        return Err(AppError::Validation("File size exceeds 10MB".into()));
    }

    let extension = original_filename
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.to_lowercase()))
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext)
        .ok_or_else(|| AppError::Validation("File name must include an extension".into()))?;

    let content_type = mime_guess::from_path(original_filename)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let stamp = now.format("%Y-%m-%d-%H%M%S");
    let mut object_name = format!("{stamp}-{}.{extension}", kind.field_name());

    if !DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
        let (ext, size, filesize) = kind.optimization_params().unwrap_or(("", "", ""));
        object_name = format!("{object_name}?ext={ext}&size={size}&filesize={filesize}");
    }

    Ok(PreparedUpload {
        object_name,
        content_type,
        bytes,
    })
}

/// Rewrite an uploaded asset URL to its final form: strip the optimization
/// tag and swap the file extension for the tag's target extension.
///
/// Returns `None` when the URL carries no usable tag or has no extension to
/// replace.
pub fn transform_asset_url(url: &str) -> Option<String> {
    let (base, query) = url.split_once('?')?;
    let target_ext = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("ext="))
        .filter(|ext| !ext.is_empty())?;

    let dot = base.rfind('.')?;
    // The dot must belong to the final path segment.
    if base[dot..].contains('/') {
        return None;
    }

    Some(format!("{}.{}", &base[..dot], target_ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> NaiveDateTime {
        "2025-06-01T09:30:05"
            .parse::<NaiveDateTime>()
            .expect("valid timestamp")
    }

    #[test]
    fn avatar_name_carries_optimization_tag() {
        let prepared =
            prepare_upload(AssetKind::Avatar, "me.JPG", vec![1, 2, 3], 1024, at()).unwrap();
        assert_eq!(
            prepared.object_name,
            "2025-06-01-093005-avatar.jpg?ext=png&size=400x400&filesize=300KB"
        );
        assert_eq!(prepared.content_type, "image/jpeg");
    }

    #[test]
    fn logo_uses_its_own_budget() {
        let prepared =
            prepare_upload(AssetKind::Logo, "brand.png", vec![0], 1024, at()).unwrap();
        assert!(prepared.object_name.ends_with("?ext=png&size=400x100&filesize=150KB"));
    }

    #[test]
    fn pdf_resume_skips_the_tag() {
        let prepared =
            prepare_upload(AssetKind::Resume, "cv.pdf", vec![0], 1024, at()).unwrap();
        assert_eq!(prepared.object_name, "2025-06-01-093005-resume.pdf");
        assert_eq!(prepared.content_type, "application/pdf");
    }

    #[test]
    fn docx_resume_skips_the_tag() {
        let prepared =
            prepare_upload(AssetKind::Resume, "cv.docx", vec![0], 1024, at()).unwrap();
        assert!(!prepared.object_name.contains('?'));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let result = prepare_upload(AssetKind::Avatar, "me.png", vec![0; 11], 10, at());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn extensionless_upload_is_rejected() {
        for name in ["noext", ".hidden", "trailing."] {
            let result = prepare_upload(AssetKind::Avatar, name, vec![0], 1024, at());
            assert!(matches!(result, Err(AppError::Validation(_))), "{name}");
        }
    }

    #[test]
    fn transform_swaps_extension_from_tag() {
        let url =
            "https://b.s3.r.amazonaws.com/Optimize-images/x-avatar.jpg?ext=png&size=400x400&filesize=300KB";
        assert_eq!(
            transform_asset_url(url).as_deref(),
            Some("https://b.s3.r.amazonaws.com/Optimize-images/x-avatar.png")
        );
    }

    #[test]
    fn transform_requires_a_tag() {
        assert_eq!(transform_asset_url("https://host/Resume/cv.pdf"), None);
        assert_eq!(
            transform_asset_url("https://host/Optimize-images/x.jpg?size=400x400"),
            None
        );
        assert_eq!(
            transform_asset_url("https://host/Optimize-images/x.jpg?ext="),
            None
        );
    }

    #[test]
    fn transform_requires_an_extension_in_the_path() {
        assert_eq!(transform_asset_url("https://host/folder/noext?ext=png"), None);
    }
}
