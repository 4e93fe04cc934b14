// ==========================================
// 表格数据导入引擎 - 字典处理器缓存
// ==========================================
// 职责: 可刷新的查表替换(值 → 映射值)
// 并发: 单把互斥锁;refresh 原子替换整表,lookup 只读当前表
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

// ==========================================
// DictionaryConfig - 字典来源配置
// ==========================================
// 选项层只接受"配置",不接受已构建的查表实例,
// 保证 refresh 能随时从来源重建整表。
#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryConfig {
    /// 内联映射表
    Inline(HashMap<String, String>),
    /// CSV 文件(key_field 列 → value_field 列)
    CsvFile {
        path: PathBuf,
        key_field: String,
        value_field: String,
    },
}

impl DictionaryConfig {
    /// 从来源加载完整映射表
    pub fn load(&self) -> ImportResult<HashMap<String, String>> {
        match self {
            DictionaryConfig::Inline(entries) => Ok(entries.clone()),
            DictionaryConfig::CsvFile {
                path,
                key_field,
                value_field,
            } => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(true)
                    .flexible(true)
                    .from_path(path)
                    .map_err(|e| {
                        ImportError::DictionaryLoad(format!("{}: {}", path.display(), e))
                    })?;

                let headers: Vec<String> = reader
                    .headers()
                    .map_err(|e| ImportError::DictionaryLoad(e.to_string()))?
                    .iter()
                    .map(|h| h.trim().to_string())
                    .collect();

                let key_idx = headers.iter().position(|h| h == key_field).ok_or_else(|| {
                    ImportError::DictionaryLoad(format!("缺少 key 列: {}", key_field))
                })?;
                let value_idx = headers
                    .iter()
                    .position(|h| h == value_field)
                    .ok_or_else(|| {
                        ImportError::DictionaryLoad(format!("缺少 value 列: {}", value_field))
                    })?;

                let mut table = HashMap::new();
                for result in reader.records() {
                    let record =
                        result.map_err(|e| ImportError::DictionaryLoad(e.to_string()))?;
                    if let (Some(k), Some(v)) = (record.get(key_idx), record.get(value_idx)) {
                        table.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
                Ok(table)
            }
        }
    }
}

// ==========================================
// DictionaryCache - 可刷新查表
// ==========================================
// 表由 Mutex 独占保护:
// - refresh 持锁重建并整体替换
// - lookup 持锁只读当前表引用
// 并发读取只会观察到旧表或新表,不会观察到半更新状态。
#[derive(Debug)]
pub struct DictionaryCache {
    config: DictionaryConfig,
    table: Mutex<HashMap<String, String>>,
}

impl DictionaryCache {
    /// 按配置构建缓存并做首次加载
    pub fn new(config: DictionaryConfig) -> ImportResult<Self> {
        let table = config.load()?;
        Ok(Self {
            config,
            table: Mutex::new(table),
        })
    }

    /// 原子刷新: 持锁期间从来源重建整表并替换
    pub fn refresh(&self) -> ImportResult<()> {
        let mut guard = self
            .table
            .lock()
            .map_err(|e| ImportError::LockError(e.to_string()))?;
        *guard = self.config.load()?;
        Ok(())
    }

    /// 查表
    ///
    /// # 返回
    /// - Some(String): 命中映射
    /// - None: 未命中
    pub fn lookup(&self, key: &str) -> ImportResult<Option<String>> {
        let guard = self
            .table
            .lock()
            .map_err(|e| ImportError::LockError(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}
