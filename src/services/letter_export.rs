//! 异议函 PDF 导出
//!
//! 标题 + 自动换行正文 + 每页页脚，使用 PDF 标准字体（WinAnsi 编码），
//! 无法编码的字符替换为 `?`。

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;
use tracing::info;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 50.0;
const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const LEADING: f32 = 14.0;
const FOOTER_SIZE: f32 = 8.0;
const FOOTER_Y: f32 = 30.0;
const BODY_BOTTOM: f32 = 70.0;
/// Helvetica 11pt 下每行大约能放的字符数
const WRAP_COLUMNS: usize = 92;

pub const LETTER_TITLE: &str = "FORMAL OBJECTION NOTICE";
pub const LETTER_FOOTER: &str = "CONFIDENTIAL LEGAL COMMUNICATION - FOR SETTLEMENT PURPOSES ONLY";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("生成 PDF 失败: {0}")]
    Pdf(String),

    #[error("写入 PDF 失败 '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 异议函导出器
pub struct LetterExporter {
    title: String,
    footer: String,
}

impl LetterExporter {
    pub fn new() -> Self {
        Self {
            title: LETTER_TITLE.to_string(),
            footer: LETTER_FOOTER.to_string(),
        }
    }

    /// 渲染为 PDF 字节
    pub fn render(&self, letter: &str) -> Result<Vec<u8>, ExportError> {
        let lines = wrap_text(letter, WRAP_COLUMNS);
        let pages = paginate(&lines);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let body_font = doc.add_object(standard_font("Helvetica"));
        let title_font = doc.add_object(standard_font("Helvetica-Bold"));
        let footer_font = doc.add_object(standard_font("Helvetica-Oblique"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => body_font,
                "F2" => title_font,
                "F3" => footer_font,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for (index, page_lines) in pages.iter().enumerate() {
            let page_no = index + 1;
            let content = self.page_content(page_lines, page_no);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH as i64),
                    Object::Integer(PAGE_HEIGHT as i64),
                ],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;

        Ok(buffer)
    }

    /// 渲染并写入文件
    pub async fn export(&self, letter: &str, path: &Path) -> Result<PathBuf, ExportError> {
        let bytes = self.render(letter)?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        info!("📥 异议函已导出: {} ({} 字节)", path.display(), bytes.len());
        Ok(path.to_path_buf())
    }

    fn page_content(&self, lines: &[String], page_no: usize) -> Vec<u8> {
        let mut content = String::new();
        let mut top = PAGE_HEIGHT - MARGIN;

        if page_no == 1 {
            let x = centered_x(&self.title, TITLE_SIZE, 0.6);
            content.push_str(&format!(
                "BT\n/F2 {} Tf\n{:.1} {:.1} Td\n({}) Tj\nET\n",
                TITLE_SIZE,
                x,
                top,
                encode_pdf_string(&self.title)
            ));
            top -= LEADING * 2.5;
        }

        content.push_str("BT\n");
        content.push_str(&format!("/F1 {} Tf\n{} TL\n", BODY_SIZE, LEADING));
        content.push_str(&format!("{:.1} {:.1} Td\n", MARGIN, top));
        for line in lines {
            content.push_str(&format!("({}) Tj T*\n", encode_pdf_string(line)));
        }
        content.push_str("ET\n");

        let footer = format!("{} | Page {}", self.footer, page_no);
        content.push_str(&format!(
            "BT\n/F3 {} Tf\n{:.1} {:.1} Td\n({}) Tj\nET\n",
            FOOTER_SIZE,
            centered_x(&footer, FOOTER_SIZE, 0.5),
            FOOTER_Y,
            encode_pdf_string(&footer)
        ));

        content.into_bytes()
    }
}

impl Default for LetterExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn standard_font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// 按平均字宽估算居中位置
fn centered_x(text: &str, size: f32, avg_width: f32) -> f32 {
    let width = text.chars().count() as f32 * size * avg_width;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
}

/// 每页能放的行数（首页要留出标题位置）
fn lines_per_page(first: bool) -> usize {
    let mut top = PAGE_HEIGHT - MARGIN;
    if first {
        top -= LEADING * 2.5;
    }
    ((top - BODY_BOTTOM) / LEADING).floor().max(1.0) as usize
}

fn paginate(lines: &[String]) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut rest = lines;
    let mut first = true;

    loop {
        let take = lines_per_page(first).min(rest.len());
        pages.push(rest[..take].to_vec());
        rest = &rest[take..];
        first = false;
        if rest.is_empty() {
            break;
        }
    }

    pages
}

/// 按单词自动换行，保留空行；超长单词强制截断
pub(crate) fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut out = Vec::new();

    for raw in text.replace('\t', "    ").lines() {
        if raw.trim().is_empty() {
            out.push(String::new());
            continue;
        }

        let mut line = String::new();
        for word in raw.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > columns {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(columns).collect();
                word = word.chars().skip(columns).collect();
                out.push(head);
            }

            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > columns && !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            out.push(line);
        }
    }

    out
}

/// 转义为 PDF 字符串字面量（WinAnsi），Latin-1 以外的字符替换为 `?`
fn encode_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii() && !c.is_control() => out.push(c),
            c if (0xA0..=0xFF).contains(&(c as u32)) => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_wrap_text_respects_columns() {
        let text = "alpha beta gamma delta\n\nepsilon";
        let lines = wrap_text(text, 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta", "", "epsilon"]);

        let long = wrap_text("abcdefghij", 4);
        assert_eq!(long, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_encode_pdf_string() {
        assert_eq!(encode_pdf_string("a(b)\\c"), "a\\(b\\)\\\\c");
        assert_eq!(encode_pdf_string("café"), "caf\\351");
        assert_eq!(encode_pdf_string("🔴 lien"), "? lien");
    }

    #[test]
    fn test_render_single_page() {
        let bytes = LetterExporter::new().render("Dear Seller,\nWe object.").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_paginates_long_letter() {
        let letter = (0..150)
            .map(|i| format!("Paragraph {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = LetterExporter::new().render(&letter).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);
    }

    #[test]
    fn test_render_empty_letter_still_has_a_page() {
        let bytes = LetterExporter::new().render("").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Objection_Notice.pdf");

        let written = LetterExporter::new().export("Body", &path).await.unwrap();
        assert_eq!(written, path);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_export_to_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("letter.pdf");

        let err = LetterExporter::new().export("Body", &path).await.unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
