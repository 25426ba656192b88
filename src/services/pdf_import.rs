//! PDF 文本导入
//!
//! 流水线只处理纯文本。PDF 先在这里抽取文字，再以 `<文件名>.txt`
//! 的形式放进交易目录。

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("读取 PDF 失败 '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("解析 PDF 失败 '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("PDF 中没有可抽取的文字: {}", .0.display())]
    NoText(PathBuf),

    #[error("交易目录中已有同名文档，未覆盖: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("写入文本失败 '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 从 PDF 字节中抽取全部页面文字
pub fn extract_pdf_text(bytes: &[u8], path: &Path) -> Result<String, ImportError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ImportError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => warn!("⚠️ 第 {} 页文字抽取失败 ({}): {}", page_num, path.display(), e),
        }
    }

    Ok(text)
}

/// 把 PDF 转成文本放入交易目录
///
/// # 返回
/// 新文档的标识（文件名）
pub async fn stage_pdf(pdf_path: &Path, deal_folder: &Path) -> Result<String, ImportError> {
    let bytes = tokio::fs::read(pdf_path)
        .await
        .map_err(|source| ImportError::Read {
            path: pdf_path.to_path_buf(),
            source,
        })?;

    let text = extract_pdf_text(&bytes, pdf_path)?;
    if text.trim().is_empty() {
        return Err(ImportError::NoText(pdf_path.to_path_buf()));
    }

    let stem = pdf_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let id = format!("{}.txt", stem);
    let target = deal_folder.join(&id);

    tokio::fs::create_dir_all(deal_folder)
        .await
        .map_err(|source| ImportError::Write {
            path: deal_folder.to_path_buf(),
            source,
        })?;

    // 不覆盖已有文档
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .await
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                warn!("⚠️ 交易目录中已有同名文档: {}", target.display());
                ImportError::AlreadyExists(target.clone())
            } else {
                ImportError::Write {
                    path: target.clone(),
                    source,
                }
            }
        })?;
    file.write_all(text.as_bytes())
        .await
        .map_err(|source| ImportError::Write {
            path: target.clone(),
            source,
        })?;
    file.flush().await.map_err(|source| ImportError::Write {
        path: target.clone(),
        source,
    })?;

    info!(
        "✓ PDF 已转换: {} -> {} ({} 字符)",
        pdf_path.display(),
        id,
        text.len()
    );
    Ok(id)
}
