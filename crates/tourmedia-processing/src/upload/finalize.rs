use tourmedia_core::{CompressionResult, UploadedAsset};

use super::types::{FinalizedFile, UploadShape};

/// Flatten any upload shape into `(field_name, asset)` pairs.
pub fn normalize(shape: UploadShape) -> Vec<(String, UploadedAsset)> {
    match shape {
        UploadShape::Single(asset) => vec![(asset.field_name.clone(), asset)],
        UploadShape::Multiple(assets) => assets
            .into_iter()
            .map(|asset| (asset.field_name.clone(), asset))
            .collect(),
        UploadShape::FieldMap(map) => map
            .into_iter()
            .flat_map(|(field, assets)| assets.into_iter().map(move |a| (field.clone(), a)))
            .collect(),
    }
}

/// Stamp each pair with the bare filename of its (possibly rewritten) stored path.
pub fn finalize(
    pairs: Vec<(String, UploadedAsset, Option<CompressionResult>)>,
) -> Vec<FinalizedFile> {
    pairs
        .into_iter()
        .map(|(field_name, asset, compression)| FinalizedFile {
            filename: asset.stored_filename(),
            field_name,
            asset,
            compression,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tourmedia_core::{ContentDomain, MediaKind};

    fn asset(field: &str, path: &str, kind: MediaKind) -> UploadedAsset {
        UploadedAsset {
            mime_type: match kind {
                MediaKind::Image => "image/png".to_string(),
                MediaKind::Video => "video/mp4".to_string(),
            },
            original_name: "x".to_string(),
            stored_path: PathBuf::from(path),
            size_bytes: 1,
            field_name: field.to_string(),
            kind,
            content_domain: ContentDomain::parse("posts").unwrap(),
        }
    }

    #[test]
    fn test_normalize_single() {
        let pairs = normalize(UploadShape::Single(asset(
            "image",
            "uploads/images/posts/a-1.png",
            MediaKind::Image,
        )));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "image");
    }

    #[test]
    fn test_normalize_multiple_keeps_order() {
        let pairs = normalize(UploadShape::Multiple(vec![
            asset("images", "uploads/images/posts/a-1.png", MediaKind::Image),
            asset("images", "uploads/images/posts/b-2.png", MediaKind::Image),
        ]));
        let names: Vec<String> = pairs.iter().map(|(_, a)| a.stored_filename()).collect();
        assert_eq!(names, vec!["a-1.png", "b-2.png"]);
    }

    #[test]
    fn test_normalize_field_map() {
        let mut map = BTreeMap::new();
        map.insert(
            "images".to_string(),
            vec![
                asset("images", "u/images/posts/a-1.png", MediaKind::Image),
                asset("images", "u/images/posts/b-2.png", MediaKind::Image),
            ],
        );
        map.insert(
            "video".to_string(),
            vec![asset("video", "u/videos/posts/c-3.mp4", MediaKind::Video)],
        );

        let pairs = normalize(UploadShape::FieldMap(map));
        assert_eq!(pairs.len(), 3);
        assert_eq!(
            pairs.iter().filter(|(field, _)| field == "images").count(),
            2
        );
        assert_eq!(pairs[2].0, "video");
    }

    #[test]
    fn test_finalize_strips_directories() {
        let files = finalize(vec![(
            "image".to_string(),
            asset(
                "image",
                "/srv/app/uploads/images/posts/compressed-a-1.png",
                MediaKind::Image,
            ),
            None,
        )]);
        assert_eq!(files[0].filename, "compressed-a-1.png");
        assert_eq!(files[0].field_name, "image");
    }
}
