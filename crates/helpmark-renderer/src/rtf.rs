use std::borrow::Cow;
use std::io::Cursor;

use helpmark_core::{DocPart, Document, HeadingLevel, ImageData, ImageSource, RenderError};
use image::{ImageFormat, ImageReader};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const MAX_IMAGE_WIDTH: u32 = 780;
const TWIPS_PER_PIXEL: u64 = 15;

/// Renders a resolved document as an RTF file using Calibri throughout.
///
/// RTF has no anchors, so internal links render as their text only.
pub fn emit_rtf(document: &Document, images: &mut dyn ImageSource) -> Result<String, RenderError> {
    let mut writer = RtfWriter::new();
    writer.raw(r"{\rtf1\ansi\deff0{\fonttbl{\f0\fnil\fcharset0 Calibri;}}");
    for part in &document.parts {
        writer.part(part, images)?;
    }
    writer.raw("}");
    Ok(writer.finish())
}

struct RtfWriter {
    out: String,
}

/// Image bytes ready for a `\pict` group.
#[derive(Debug)]
struct Picture<'a> {
    blip: &'static str,
    width: u32,
    height: u32,
    bytes: Cow<'a, [u8]>,
}

impl RtfWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn raw(&mut self, rtf: &str) {
        self.out.push_str(rtf);
    }

    /// Writes escaped text. Characters outside ASCII become `\uN?` with one
    /// escape per UTF-16 unit.
    fn text(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\\' => self.out.push_str(r"\\"),
                '{' => self.out.push_str(r"\{"),
                '}' => self.out.push_str(r"\}"),
                '\n' => self.out.push_str(r"\line "),
                '®' => self.out.push_str(r"{\super \u174?}"),
                _ if ch.is_ascii() => self.out.push(ch),
                _ => {
                    let mut units = [0u16; 2];
                    for unit in ch.encode_utf16(&mut units) {
                        // RTF control words take signed 16-bit values.
                        self.out.push_str(&format!(r"\u{}?", *unit as i16));
                    }
                }
            }
        }
    }

    fn part(&mut self, part: &DocPart, images: &mut dyn ImageSource) -> Result<(), RenderError> {
        match part {
            DocPart::PlainText(text) => self.text(text),
            DocPart::StyledText { text, bold, italic } => {
                if *bold {
                    self.raw(r"\b ");
                }
                if *italic {
                    self.raw(r"\i ");
                }
                self.text(text);
                if *italic {
                    self.raw(r"\i0 ");
                }
                if *bold {
                    self.raw(r"\b0 ");
                }
            }
            DocPart::Heading { level, text } => self.heading(*level, text),
            DocPart::Image { name } => {
                let data = images.load(name).map_err(|source| RenderError::Image {
                    name: name.clone(),
                    source,
                })?;
                self.image(name, &data)?;
            }
            DocPart::LinkTarget(_) => {}
            DocPart::Link { text, .. } => self.text(text),
            DocPart::ExternalLink { url, text } => {
                self.raw(r#"{\field{\*\fldinst HYPERLINK ""#);
                self.text(url);
                self.raw(r#""}{\fldrslt "#);
                self.text(text);
                self.raw("}}");
            }
            DocPart::PendingReference(_) => {
                return Err(RenderError::UnresolvedPart {
                    kind: part.kind_name(),
                });
            }
        }
        Ok(())
    }

    fn heading(&mut self, level: HeadingLevel, text: &str) {
        let size = match level {
            HeadingLevel::Title => r"\fs45",
            HeadingLevel::Caption => r"\fs40",
            HeadingLevel::SubCaption => r"\fs34",
            HeadingLevel::SubSubCaption => "",
        };
        self.raw(r"\b");
        self.raw(size);
        self.raw(" ");
        self.text(text);
        self.raw(r"\b0\fs22\line ");
    }

    fn image(&mut self, name: &str, data: &ImageData) -> Result<(), RenderError> {
        let picture = picture(name, data)?;
        self.picture_header(picture.blip, picture.width, picture.height);
        self.out.reserve(picture.bytes.len() * 2);
        for byte in picture.bytes.iter() {
            self.out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            self.out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        self.raw("\n}}");
        Ok(())
    }

    fn picture_header(&mut self, blip: &str, width: u32, height: u32) {
        let (goal_width, goal_height) = fit_width(width, height);
        self.raw(&format!(
            r"{{\*\shppict{{\pict{}\picw{}\pich{}\picwgoal{}\pichgoal{} ",
            blip,
            twips(width),
            twips(height),
            twips(goal_width),
            twips(goal_height),
        ));
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Scales down to the maximum width, keeping the aspect ratio.
fn fit_width(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_IMAGE_WIDTH {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(MAX_IMAGE_WIDTH) + u64::from(width) / 2)
        / u64::from(width);
    (MAX_IMAGE_WIDTH, scaled as u32)
}

fn twips(pixels: u32) -> u64 {
    u64::from(pixels) * TWIPS_PER_PIXEL
}

/// PNG and JPEG bytes are embedded as they are. RTF has no blip for GIF or
/// BMP, so those are decoded and re-encoded as PNG.
fn picture<'a>(name: &str, data: &'a ImageData) -> Result<Picture<'a>, RenderError> {
    let invalid = |err: &dyn std::fmt::Display| RenderError::InvalidImage {
        name: name.to_string(),
        reason: err.to_string(),
    };
    let reader = ImageReader::new(Cursor::new(data.bytes.as_slice()))
        .with_guessed_format()
        .map_err(|err| invalid(&err))?;
    let Some(format) = reader.format() else {
        return Err(RenderError::UnsupportedImage {
            name: name.to_string(),
            format: data.mime.to_string(),
        });
    };
    match format {
        ImageFormat::Png | ImageFormat::Jpeg => {
            let (width, height) = reader.into_dimensions().map_err(|err| invalid(&err))?;
            let blip = if format == ImageFormat::Png {
                r"\pngblip"
            } else {
                r"\jpegblip"
            };
            Ok(Picture {
                blip,
                width,
                height,
                bytes: Cow::Borrowed(&data.bytes),
            })
        }
        ImageFormat::Gif | ImageFormat::Bmp => {
            let decoded = reader.decode().map_err(|err| invalid(&err))?;
            let mut png = Vec::new();
            decoded
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|err| invalid(&err))?;
            log::debug!(
                "re-encoded {:?} image '{}' as PNG ({} bytes)",
                format,
                name,
                png.len()
            );
            Ok(Picture {
                blip: r"\pngblip",
                width: decoded.width(),
                height: decoded.height(),
                bytes: Cow::Owned(png),
            })
        }
        other => Err(RenderError::UnsupportedImage {
            name: name.to_string(),
            format: other.to_mime_type().to_string(),
        }),
    }
}
