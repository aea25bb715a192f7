use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl CoverArt {
    pub fn is_png(&self) -> bool {
        self.mime_type.contains("png")
    }
}

/// Downloads a cover image. Non-image or undersized payloads yield `None`.
pub async fn download_cover(client: &reqwest::Client, url: &str) -> Result<Option<CoverArt>> {
    info!("🖼️  Downloading cover: {}", url);

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        debug!("Cover request returned {}", response.status());
        return Ok(None);
    }

    let bytes = response.bytes().await?;
    Ok(sniff_image(bytes.to_vec()))
}

/// Accepts JPEG and PNG data by magic bytes.
pub fn sniff_image(bytes: Vec<u8>) -> Option<CoverArt> {
    if bytes.len() < 100 {
        return None;
    }

    let is_jpeg = bytes[0] == 0xFF && bytes[1] == 0xD8;
    let is_png = bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]);

    let mime_type = if is_png {
        "image/png"
    } else if is_jpeg {
        "image/jpeg"
    } else {
        return None;
    };

    Some(CoverArt {
        data: bytes,
        mime_type: mime_type.to_string(),
    })
}

/// Save cover art as folder.jpg / folder.png in the audiobook folder
pub fn save_cover_to_folder(folder: &Path, cover: &CoverArt) -> std::io::Result<PathBuf> {
    let extension = if cover.is_png() { "png" } else { "jpg" };
    let cover_path = folder.join(format!("folder.{}", extension));

    std::fs::write(&cover_path, &cover.data)?;
    debug!("Cover saved to {}", cover_path.display());

    Ok(cover_path)
}

#[cfg(test)]
pub(crate) fn fake_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(256, 0);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_jpeg_and_png() {
        let jpeg = sniff_image(fake_jpeg()).unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");
        assert!(!jpeg.is_png());

        let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        png.resize(256, 0);
        let png = sniff_image(png).unwrap();
        assert_eq!(png.mime_type, "image/png");
    }

    #[test]
    fn test_sniff_rejects_small_and_unknown() {
        assert!(sniff_image(vec![0xFF, 0xD8]).is_none());
        assert!(sniff_image(b"<html>not found</html>".repeat(10)).is_none());
    }

    #[test]
    fn test_save_cover_to_folder() {
        let dir = tempfile::tempdir().unwrap();
        let cover = sniff_image(fake_jpeg()).unwrap();

        let path = save_cover_to_folder(dir.path(), &cover).unwrap();
        assert_eq!(path, dir.path().join("folder.jpg"));
        assert_eq!(std::fs::read(path).unwrap(), cover.data);
    }
}
