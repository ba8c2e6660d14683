//! Allowlists, layout names and processing bounds shared by every pipeline stage.

/// Accepted image MIME types and the extension each one is stored under.
pub const IMAGE_MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
];

/// Accepted video MIME types and the extension each one is stored under.
pub const VIDEO_MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("video/mp4", "mp4"),
    ("video/avi", "avi"),
    ("video/x-msvideo", "avi"),
    ("video/quicktime", "mov"),
    ("video/mov", "mov"),
    ("video/x-ms-wmv", "wmv"),
    ("video/wmv", "wmv"),
    ("video/x-flv", "flv"),
    ("video/flv", "flv"),
    ("video/webm", "webm"),
    ("video/x-matroska", "mkv"),
    ("video/mkv", "mkv"),
];

/// Extensions recognised as images when resolving stored files.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Extensions recognised as videos when resolving stored files.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv"];

pub const IMAGES_DIR: &str = "images";
pub const VIDEOS_DIR: &str = "videos";

/// Prefix put on every compressor output filename.
pub const COMPRESSED_PREFIX: &str = "compressed-";

/// URL prefix under which the uploads root is served.
pub const PUBLIC_UPLOADS_PREFIX: &str = "/public/uploads";

/// Image bounding box (fit inside, never enlarge).
pub const MAX_IMAGE_WIDTH: u32 = 3840;
pub const MAX_IMAGE_HEIGHT: u32 = 2160;

/// Video bounding box applied by the transcoder scale filter.
pub const MAX_VIDEO_WIDTH: u32 = 1920;
pub const MAX_VIDEO_HEIGHT: u32 = 1080;

pub const MAX_IMAGES_PER_REQUEST: usize = 10;
pub const MAX_VIDEOS_PER_REQUEST: usize = 5;
pub const MIXED_MAX_IMAGES: usize = 5;
pub const MIXED_MAX_VIDEOS: usize = 2;

/// Windows builds look for the encoder at this fixed location.
pub const WINDOWS_FFMPEG_PATH: &str = r"C:\ffmpeg\bin\ffmpeg.exe";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mapped_extension_is_resolvable() {
        for (_, ext) in IMAGE_MIME_EXTENSIONS {
            assert!(IMAGE_EXTENSIONS.contains(ext));
        }
        for (_, ext) in VIDEO_MIME_EXTENSIONS {
            assert!(VIDEO_EXTENSIONS.contains(ext));
        }
    }
}
