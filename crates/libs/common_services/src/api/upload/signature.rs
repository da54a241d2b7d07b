use crate::api::upload::interfaces::SIGNATURE_PROBE_LEN;
use image::ImageFormat;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// What a stored file turned out to be, judged by its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    NotImage,
    Gif,
    Webp,
    /// Any other image format.
    Image { mime: &'static str },
}

impl FileKind {
    #[must_use]
    pub fn classify(head: &[u8]) -> Self {
        match infer::get(head) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
                match kind.mime_type() {
                    "image/gif" => Self::Gif,
                    "image/webp" => Self::Webp,
                    mime => Self::Image { mime },
                }
            }
            _ => Self::NotImage,
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::NotImage => None,
            Self::Gif => Some("image/gif"),
            Self::Webp => Some("image/webp"),
            Self::Image { mime } => Some(mime),
        }
    }

    /// Decoder to use when transcoding, `None` when the file is kept as is.
    #[must_use]
    pub fn decoder_format(self) -> Option<ImageFormat> {
        match self {
            Self::NotImage | Self::Webp => None,
            Self::Gif => Some(ImageFormat::Gif),
            Self::Image { mime } => {
                ImageFormat::from_mime_type(mime).filter(ImageFormat::reading_enabled)
            }
        }
    }
}

/// Reads at most [`SIGNATURE_PROBE_LEN`] bytes from the start of `path`.
pub async fn read_signature(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path).await?;
    let mut head = Vec::with_capacity(SIGNATURE_PROBE_LEN);
    file.take(SIGNATURE_PROBE_LEN as u64)
        .read_to_end(&mut head)
        .await?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEAD: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const GIF_HEAD: &[u8] = b"GIF89a\x01\0\x01\0";
    const WEBP_HEAD: &[u8] = b"RIFF\x1a\0\0\0WEBPVP8L";

    #[test]
    fn test_classify() {
        assert_eq!(
            FileKind::classify(PNG_HEAD),
            FileKind::Image { mime: "image/png" }
        );
        assert_eq!(FileKind::classify(GIF_HEAD), FileKind::Gif);
        assert_eq!(FileKind::classify(WEBP_HEAD), FileKind::Webp);
        assert_eq!(FileKind::classify(b"%PDF-1.7"), FileKind::NotImage);
        assert_eq!(FileKind::classify(b""), FileKind::NotImage);
    }

    #[test]
    fn test_decoder_format() {
        assert_eq!(
            FileKind::Image { mime: "image/png" }.decoder_format(),
            Some(ImageFormat::Png)
        );
        assert_eq!(FileKind::Gif.decoder_format(), Some(ImageFormat::Gif));
        assert_eq!(FileKind::Webp.decoder_format(), None);
        assert_eq!(FileKind::NotImage.decoder_format(), None);
        assert_eq!(
            FileKind::Image {
                mime: "image/vnd.adobe.photoshop"
            }
            .decoder_format(),
            None
        );
    }

    #[tokio::test]
    async fn test_read_signature_is_bounded() -> color_eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("big.bin");
        tokio::fs::write(&path, vec![7u8; 4096]).await?;

        let head = read_signature(&path).await?;

        assert_eq!(head.len(), SIGNATURE_PROBE_LEN);
        Ok(())
    }
}
