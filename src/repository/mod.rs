// ==========================================
// 表格数据导入引擎 - 存储层模块
// ==========================================
// RecordStore 的 SQLite 实现与存储层错误
// ==========================================

pub mod error;
pub mod sqlite_store;

pub use error::{RepositoryError, RepositoryResult};
pub use sqlite_store::{SqliteRecord, SqliteRecordStore};
