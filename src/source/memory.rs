// ==========================================
// 表格数据导入引擎 - 内存数据源
// ==========================================
// 职责: RemoteSource 的内存实现(测试与程序化导入)
// ==========================================

use crate::domain::Row;
use crate::importer::contracts::{RemoteSource, RowStream};
use crate::importer::error::ImportResult;

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// 从 (列名, 值) 对的行集合构造
    pub fn from_pairs(rows: &[&[(&str, &str)]]) -> Self {
        Self {
            rows: rows.iter().map(|pairs| Row::from_pairs(pairs)).collect(),
        }
    }
}

impl RemoteSource for MemorySource {
    fn open(&self) -> ImportResult<RowStream> {
        let rows = self.rows.clone();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_replays_all_rows() {
        let source = MemorySource::from_pairs(&[
            &[("code", "P1")],
            &[("code", "P2")],
        ]);
        let rows: Vec<Row> = source.open().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("code"), Some("P2"));
        // 再次 open 重新回放
        assert_eq!(source.open().unwrap().count(), 2);
    }
}
