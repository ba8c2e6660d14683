//! Video branch of the compressor.
//!
//! Transcodes with an external ffmpeg when one is reachable; otherwise the
//! upload is copied through unchanged with a warning so hosts without an
//! encoder stay usable.

pub mod compressor;
pub mod probe;
pub mod transcoder;

pub use compressor::VideoCompressor;
pub use probe::EncoderProbe;
pub use transcoder::{TranscodeError, Transcoder};

#[cfg(all(test, unix))]
pub(crate) mod testing {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    /// Executable shell script standing in for ffmpeg. `body` sees the output
    /// path (the last argument) as `$out`.
    pub fn fake_encoder(dir: &Path, body: &str) -> String {
        let path: PathBuf = dir.join("fake-ffmpeg");
        let script = format!("#!/bin/sh\nfor out; do :; done\n{}\n", body);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    pub async fn wait_for_file(path: &Path) {
        for _ in 0..500 {
            if path.exists() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{} was never written", path.display());
    }
}
