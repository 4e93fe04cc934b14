// ==========================================
// 表格数据导入引擎 - 外部行表示
// ==========================================
// 职责: 一条外部记录的只读视图(列名寻址 + 位置寻址)
// 约束: 核心不修改行内容
// ==========================================

use sha2::{Digest, Sha256};
use std::sync::Arc;

// ==========================================
// Row - 外部行
// ==========================================
// 同一数据源的所有行共享一份表头(Arc)
#[derive(Debug, Clone)]
pub struct Row {
    headers: Option<Arc<Vec<String>>>,
    values: Vec<String>,
}

impl Row {
    /// 创建带表头的行
    pub fn keyed(headers: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self {
            headers: Some(headers),
            values,
        }
    }

    /// 创建纯位置寻址的行(无表头)
    pub fn positional(values: Vec<String>) -> Self {
        Self {
            headers: None,
            values,
        }
    }

    /// 从 (列名, 值) 对构造(测试与内存数据源)
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let headers: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
        let values: Vec<String> = pairs.iter().map(|(_, v)| v.to_string()).collect();
        Self {
            headers: Some(Arc::new(headers)),
            values,
        }
    }

    /// 按列名读取
    pub fn get(&self, name: &str) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        let idx = headers.iter().position(|h| h == name)?;
        self.values.get(idx).map(|s| s.as_str())
    }

    /// 按列号读取(从 0 开始)
    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|s| s.as_str())
    }

    /// 列数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 是否整行空白
    pub fn is_all_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }

    /// 行内容摘要(SHA-256 十六进制)
    ///
    /// 摘要覆盖有序的 列名=值 对;无表头时以列号代替列名。
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (idx, value) in self.values.iter().enumerate() {
            match self.headers.as_ref().and_then(|h| h.get(idx)) {
                Some(header) => hasher.update(header.as_bytes()),
                None => hasher.update(idx.to_string().as_bytes()),
            }
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
