use anyhow::{bail, Result};
use docflow::clients::{HttpTransport, StaticSessionProvider};
use docflow::config::Config;
use docflow::models::{Document, ExtractionsContainer};
use docflow::orchestrator::{DocumentOrchestrator, OrchestratorConfig, PollScheduler};
use docflow::utils::logging::{log_startup, print_final_stats, truncate_text};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

type Orchestrator = DocumentOrchestrator<HttpTransport, StaticSessionProvider>;

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: Orchestrator,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(
            &config.api_base_url,
            &config.documents_folder,
            config.max_concurrent_uploads,
        );

        let transport = Arc::new(HttpTransport::new(&config)?);
        let sessions = Arc::new(StaticSessionProvider::new(
            config.access_token.clone(),
            config.token_lifetime_secs,
        )?);
        let scheduler = PollScheduler::start_on_current()?;
        let orchestrator = DocumentOrchestrator::new(
            OrchestratorConfig::from(&config),
            transport,
            sessions,
            scheduler,
        );

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let files = scan_documents(Path::new(&self.config.documents_folder)).await?;
        if files.is_empty() {
            warn!("⚠️ 没有找到待上传的文档，程序结束");
            return Ok(());
        }
        info!("✓ 找到 {} 个待上传的页面", files.len());

        let (partials, failed) = self.upload_all(files).await;
        if partials.is_empty() {
            print_final_stats(0, failed, 0);
            bail!("没有上传成功的页面");
        }

        let composite = self
            .orchestrator
            .create_composite_document(&partials, self.config.document_type)
            .await?;
        info!("📎 组合文档: {}", composite);

        let container = self.orchestrator.poll_and_get_extractions(&composite).await?;
        let extraction_count = log_extractions(&container);

        print_final_stats(partials.len(), failed, extraction_count);
        self.orchestrator.shutdown();
        Ok(())
    }

    /// 并发上传所有页面，返回按文件名排序的部分文档和失败数量
    async fn upload_all(&self, files: Vec<PathBuf>) -> (Vec<Document>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_uploads.max(1)));
        let mut handles = Vec::new();

        for (index, path) in files.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let orchestrator = self.orchestrator.clone();
            let document_type = self.config.document_type;

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let data = tokio::fs::read(&path).await?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                let content_type = content_type_of(&path).unwrap_or("application/octet-stream");

                let document = orchestrator
                    .create_partial_document(
                        &data,
                        content_type,
                        filename.as_deref(),
                        document_type,
                        None,
                    )
                    .await?;
                anyhow::Ok(document)
            });
            handles.push((index, handle));
        }

        let mut uploaded = Vec::new();
        let mut failed = 0;
        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(document)) => uploaded.push((index, document)),
                Ok(Err(e)) => {
                    error!("[页面 {}] ❌ 上传失败: {}", index + 1, e);
                    failed += 1;
                }
                Err(e) => {
                    error!("[页面 {}] 任务执行失败: {}", index + 1, e);
                    failed += 1;
                }
            }
        }

        uploaded.sort_by_key(|(index, _)| *index);
        (uploaded.into_iter().map(|(_, document)| document).collect(), failed)
    }
}

/// 扫描文档目录，按文件名排序
async fn scan_documents(folder: &Path) -> Result<Vec<PathBuf>> {
    info!("\n📁 正在扫描文档目录 {}...", folder.display());
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && content_type_of(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn content_type_of(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

fn log_extractions(container: &ExtractionsContainer) -> usize {
    let mut names: Vec<_> = container.specific_extractions.keys().collect();
    names.sort();
    for name in &names {
        let extraction = &container.specific_extractions[*name];
        info!(
            "  {} = {} ({})",
            name,
            truncate_text(extraction.value(), 60),
            extraction.entity()
        );
    }

    let mut cells = 0;
    for (name, compound) in &container.compound_extractions {
        info!("  📋 {}: {} 行", name, compound.rows.len());
        for (row_index, row) in compound.rows.iter().enumerate() {
            let mut columns: Vec<_> = row.iter().collect();
            columns.sort_by(|a, b| a.0.cmp(b.0));
            let line = columns
                .iter()
                .map(|(column, extraction)| format!("{}={}", column, truncate_text(extraction.value(), 30)))
                .collect::<Vec<_>>()
                .join(", ");
            info!("    [{}] {}", row_index + 1, line);
            cells += row.len();
        }
    }

    names.len() + cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type_of(Path::new("page-1.PDF")), Some("application/pdf"));
        assert_eq!(content_type_of(Path::new("scan.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_of(Path::new("notes.txt")), None);
        assert_eq!(content_type_of(Path::new("README")), None);
    }
}
