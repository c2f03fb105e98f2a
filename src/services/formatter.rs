//! 文档格式化服务 - 业务能力层
//!
//! 只负责"把一个文件转换成考试要求的规格"，不关心流程。
//!
//! ## 处理规则
//! - PDF 输入且目标为 PDF：大小在上限内原样返回，否则拒绝
//! - 其余输入按图片解码，缩放到目标尺寸后编码为 JPEG / PNG
//! - JPEG 超过大小上限时逐步降低质量（每次 ×0.9，最低 10）
//! - 目标为 PDF 的图片输入：JPEG 嵌入单页 PDF，页面尺寸按 DPI 换算

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::FormatError;
use crate::models::{DocumentFormat, DocumentType, OutputFormat};

/// 最低 JPEG 质量
const MIN_QUALITY: u8 = 10;

/// 格式化请求
#[derive(Debug, Clone)]
pub struct FormatRequest {
    pub data: Vec<u8>,
    pub document_type: DocumentType,
    pub original_name: String,
    pub format: DocumentFormat,
}

/// 格式化能力
///
/// 实现必须是无状态或内部同步的：流程层会在阻塞线程池中调用它。
pub trait Formatter: Send + Sync {
    fn format(&self, request: &FormatRequest) -> Result<Vec<u8>, FormatError>;
}

/// 基于 `image` 的默认格式化实现
#[derive(Debug, Default, Clone)]
pub struct ImageFormatter;

impl ImageFormatter {
    pub fn new() -> Self {
        Self
    }

    fn pass_through_pdf(data: &[u8], spec: &DocumentFormat) -> Result<Vec<u8>, FormatError> {
        if data.len() <= spec.max_size_bytes() {
            debug!("PDF 大小在限制内: {}KB", data.len() / 1024);
            Ok(data.to_vec())
        } else {
            Err(FormatError::PdfTooLarge {
                size_kb: (data.len() / 1024) as u64,
                max_kb: spec.max_size_kb,
            })
        }
    }

    fn format_image(data: &[u8], spec: &DocumentFormat) -> Result<Vec<u8>, FormatError> {
        let img =
            image::load_from_memory(data).map_err(|e| FormatError::Decode(e.to_string()))?;
        debug!("原始尺寸: {}x{}", img.width(), img.height());

        let resized = img.resize_exact(spec.width, spec.height, FilterType::Lanczos3);
        debug!("缩放到: {}x{}", spec.width, spec.height);

        match spec.format {
            OutputFormat::Png => {
                let output = encode_png(&resized)?;
                if output.len() > spec.max_size_bytes() {
                    debug!(
                        "PNG 为无损格式，无法继续压缩 ({}KB > {}KB)",
                        output.len() / 1024,
                        spec.max_size_kb
                    );
                }
                Ok(output)
            }
            OutputFormat::Jpeg => compress_jpeg(&resized, spec),
            OutputFormat::Pdf => {
                let jpeg = compress_jpeg(&resized, spec)?;
                wrap_jpeg_in_pdf(jpeg, spec)
            }
        }
    }
}

impl Formatter for ImageFormatter {
    fn format(&self, request: &FormatRequest) -> Result<Vec<u8>, FormatError> {
        let spec = &request.format;
        debug!(
            "开始格式化 {} ({}): {}x{} @ {}dpi",
            request.original_name, request.document_type, spec.width, spec.height, spec.dpi
        );

        let is_pdf_input = request.original_name.to_lowercase().ends_with(".pdf");
        let output = if is_pdf_input && spec.format == OutputFormat::Pdf {
            Self::pass_through_pdf(&request.data, spec)?
        } else {
            Self::format_image(&request.data, spec)?
        };

        debug!("格式化完成，最终大小: {}KB", output.len() / 1024);
        Ok(output)
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, FormatError> {
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| FormatError::Encode(e.to_string()))?;
    Ok(buffer)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, FormatError> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| FormatError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// 按配置质量编码，超出上限时逐步降低质量
fn compress_jpeg(img: &DynamicImage, spec: &DocumentFormat) -> Result<Vec<u8>, FormatError> {
    let target = spec.max_size_bytes();
    let mut quality = spec.quality.clamp(MIN_QUALITY, 100);
    let mut output = encode_jpeg(img, quality)?;

    while output.len() > target && quality > MIN_QUALITY {
        quality = ((quality as f32 * 0.9) as u8).max(MIN_QUALITY);
        output = encode_jpeg(img, quality)?;
        debug!("质量 {} 压缩后: {}KB", quality, output.len() / 1024);
    }

    Ok(output)
}

/// 像素换算为 PDF 点（1 英寸 = 72 点）
fn pixels_to_points(pixels: u32, dpi: u32) -> i64 {
    let dpi = if dpi == 0 { 72 } else { dpi };
    ((pixels as f64 * 72.0 / dpi as f64).round() as i64).max(1)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// 把 JPEG 嵌入单页 PDF
fn wrap_jpeg_in_pdf(jpeg: Vec<u8>, spec: &DocumentFormat) -> Result<Vec<u8>, FormatError> {
    let page_width = pixels_to_points(spec.width, spec.dpi);
    let page_height = pixels_to_points(spec.height, spec.dpi);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", name("XObject"));
    image_dict.set("Subtype", name("Image"));
    image_dict.set("Width", Object::Integer(spec.width as i64));
    image_dict.set("Height", Object::Integer(spec.height as i64));
    image_dict.set("ColorSpace", name("DeviceRGB"));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("Filter", name("DCTDecode"));
    let image_id = doc.add_object(Object::Stream(Stream::new(image_dict, jpeg)));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(page_width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page_height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![name("Im0")]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| FormatError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), content_bytes)));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page = Dictionary::new();
    page.set("Type", name("Page"));
    page.set("Parent", Object::Reference(pages_id));
    page.set("Contents", Object::Reference(content_id));
    page.set("Resources", Object::Dictionary(resources));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(page_width),
            Object::Integer(page_height),
        ]),
    );
    let page_id = doc.add_object(Object::Dictionary(page));

    let mut pages = Dictionary::new();
    pages.set("Type", name("Pages"));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", name("Catalog"));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| FormatError::Pdf(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn spec(format: OutputFormat, max_size_kb: u64) -> DocumentFormat {
        DocumentFormat {
            width: 60,
            height: 80,
            dpi: 200,
            format,
            quality: 85,
            max_size_kb,
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn request(data: Vec<u8>, name: &str, format: DocumentFormat) -> FormatRequest {
        FormatRequest {
            data,
            document_type: DocumentType::Photo,
            original_name: name.to_string(),
            format,
        }
    }

    #[test]
    fn test_resize_to_jpeg() {
        let formatter = ImageFormatter::new();
        let output = formatter
            .format(&request(png_bytes(120, 90), "photo.png", spec(OutputFormat::Jpeg, 200)))
            .unwrap();

        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (60, 80));
    }

    #[test]
    fn test_resize_to_png() {
        let formatter = ImageFormatter::new();
        let output = formatter
            .format(&request(png_bytes(30, 30), "sign.png", spec(OutputFormat::Png, 200)))
            .unwrap();

        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (60, 80));
    }

    #[test]
    fn test_invalid_image_is_rejected() {
        let formatter = ImageFormatter::new();
        let err = formatter
            .format(&request(b"not an image".to_vec(), "photo.jpg", spec(OutputFormat::Jpeg, 200)))
            .unwrap_err();
        assert!(matches!(err, FormatError::Decode(_)));
    }

    #[test]
    fn test_pdf_pass_through_and_limit() {
        let formatter = ImageFormatter::new();
        let pdf = b"%PDF-1.4 tiny".to_vec();

        let output = formatter
            .format(&request(pdf.clone(), "Marksheet.PDF", spec(OutputFormat::Pdf, 1)))
            .unwrap();
        assert_eq!(output, pdf);

        let big = vec![b'x'; 2048];
        let err = formatter
            .format(&request(big, "marksheet.pdf", spec(OutputFormat::Pdf, 1)))
            .unwrap_err();
        assert!(matches!(err, FormatError::PdfTooLarge { size_kb: 2, max_kb: 1 }));
    }

    #[test]
    fn test_image_to_pdf() {
        let formatter = ImageFormatter::new();
        let output = formatter
            .format(&request(png_bytes(100, 100), "degree.png", spec(OutputFormat::Pdf, 500)))
            .unwrap();

        assert!(output.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_jpeg_quality_reduction() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(200, 200, |x, y| {
            Rgb([((x * y) % 256) as u8, (x % 256) as u8, (y % 256) as u8])
        }));
        let high = encode_jpeg(&img, 95).unwrap();
        let spec = DocumentFormat {
            width: 200,
            height: 200,
            dpi: 200,
            format: OutputFormat::Jpeg,
            quality: 95,
            max_size_kb: 1,
        };
        let compressed = compress_jpeg(&img, &spec).unwrap();
        assert!(compressed.len() < high.len());
    }

    #[test]
    fn test_pixels_to_points() {
        assert_eq!(pixels_to_points(200, 200), 72);
        assert_eq!(pixels_to_points(800, 200), 288);
        assert_eq!(pixels_to_points(10, 0), 10);
    }
}
