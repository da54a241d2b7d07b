use color_eyre::eyre::{Result, WrapErr, eyre};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frame, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Output path of a transcoded file: same directory and stem, `.webp` extension.
#[must_use]
pub fn webp_sibling(path: &Path) -> PathBuf {
    path.with_extension("webp")
}

/// Re-encodes an image as lossless WebP.
///
/// GIFs with more than one frame become animated WebP, keeping each frame's delay.
/// Blocks, call it from a blocking task.
pub fn to_lossless_webp(bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
    if format == ImageFormat::Gif {
        let frames = GifDecoder::new(Cursor::new(bytes))
            .wrap_err("cannot read gif")?
            .into_frames()
            .collect_frames()
            .wrap_err("cannot decode gif frames")?;
        if frames.len() > 1 {
            return encode_animation(&frames);
        }
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .wrap_err_with(|| format!("cannot decode {format:?} image"))?;
    let rgba = image.to_rgba8();
    let memory = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(true, 100.0)
        .map_err(|e| eyre!("webp encoding failed: {e:?}"))?;
    Ok(memory.to_vec())
}

fn encode_animation(frames: &[Frame]) -> Result<Vec<u8>> {
    let (width, height) = frames
        .first()
        .map(|f| f.buffer().dimensions())
        .ok_or_else(|| eyre!("gif has no frames"))?;

    let mut config = webp::WebPConfig::new().map_err(|()| eyre!("cannot create webp config"))?;
    config.lossless = 1;
    config.quality = 100.0;

    let mut encoder = webp::AnimEncoder::new(width, height, &config);
    // 0 = loop forever
    encoder.set_loop_count(0);

    let mut timestamp_ms: i32 = 0;
    for frame in frames {
        let buffer = frame.buffer();
        if buffer.dimensions() != (width, height) {
            return Err(eyre!("gif frames have inconsistent dimensions"));
        }
        encoder.add_frame(webp::AnimFrame::from_rgba(
            buffer.as_raw(),
            width,
            height,
            timestamp_ms,
        ));
        let (numer, denom) = frame.delay().numer_denom_ms();
        let delay_ms = i32::try_from(numer / denom.max(1)).unwrap_or(i32::MAX);
        timestamp_ms = timestamp_ms.saturating_add(delay_ms);
    }

    let memory = encoder
        .try_encode()
        .map_err(|e| eyre!("animated webp encoding failed: {e:?}"))?;
    Ok(memory.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, ImageBuffer, Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        ImageBuffer::from_pixel(width, height, Rgba(color))
    }

    fn png_bytes() -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        solid(8, 6, [200, 10, 10, 255]).write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    fn gif_bytes(frame_count: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut out);
            encoder.set_repeat(Repeat::Infinite)?;
            for i in 0..frame_count {
                let shade = u8::try_from(i * 60 % 255)?;
                encoder.encode_frame(Frame::from_parts(
                    solid(4, 4, [shade, 0, 255 - shade, 255]),
                    0,
                    0,
                    Delay::from_numer_denom_ms(100, 1),
                ))?;
            }
        }
        Ok(out)
    }

    #[test]
    fn test_webp_sibling() {
        assert_eq!(
            webp_sibling(Path::new("/up/cat-abc.png")),
            PathBuf::from("/up/cat-abc.webp")
        );
        assert_eq!(
            webp_sibling(Path::new("/up/cat-abc.webp")),
            PathBuf::from("/up/cat-abc.webp")
        );
    }

    #[test]
    fn test_png_becomes_lossless_webp() -> Result<()> {
        let webp = to_lossless_webp(&png_bytes()?, ImageFormat::Png)?;

        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
        assert_eq!(&webp[12..16], b"VP8L");
        let decoded = image::load_from_memory_with_format(&webp, ImageFormat::WebP)?;
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
        Ok(())
    }

    #[test]
    fn test_animated_gif_becomes_animated_webp() -> Result<()> {
        let webp = to_lossless_webp(&gif_bytes(3)?, ImageFormat::Gif)?;

        assert_eq!(&webp[8..12], b"WEBP");
        let frame_chunks = webp.windows(4).filter(|w| *w == b"ANMF").count();
        assert_eq!(frame_chunks, 3);
        Ok(())
    }

    #[test]
    fn test_single_frame_gif_becomes_still_webp() -> Result<()> {
        let webp = to_lossless_webp(&gif_bytes(1)?, ImageFormat::Gif)?;

        assert_eq!(&webp[12..16], b"VP8L");
        assert!(!webp.windows(4).any(|w| w == b"ANMF"));
        Ok(())
    }

    #[test]
    fn test_corrupt_image_is_an_error() {
        let result = to_lossless_webp(b"\x89PNG\r\n\x1a\nnot really", ImageFormat::Png);
        assert!(result.is_err());
    }
}
