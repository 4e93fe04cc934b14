// ==========================================
// 表格数据导入引擎 - CSV 数据源
// ==========================================
// 职责: RemoteSource 的 CSV 文件实现,单向前进流式读取
// 约束: 每次 open 重新拉取;表头在流内以 Arc 共享
// ==========================================

use crate::domain::Row;
use crate::importer::contracts::{RemoteSource, RowStream};
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// CsvSource - CSV 数据源
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    has_headers: bool,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
            has_headers: true,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 无表头文件: 行只能按列号寻址
    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

impl RemoteSource for CsvSource {
    fn open(&self) -> ImportResult<RowStream> {
        if !self.path.exists() {
            return Err(ImportError::SourceNotFound(
                self.path.display().to_string(),
            ));
        }
        debug!("打开 CSV 数据源: {}", self.path.display());

        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(file);

        let headers = if self.has_headers {
            let headers: Vec<String> = reader
                .headers()?
                .iter()
                .map(|h| h.trim().to_string())
                .collect();
            Some(Arc::new(headers))
        } else {
            None
        };

        let stream = reader.into_records().map(move |record| {
            let record = record?;
            let values: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            Ok(match &headers {
                Some(headers) => Row::keyed(Arc::clone(headers), values),
                None => Row::positional(values),
            })
        });
        Ok(Box::new(stream))
    }
}
