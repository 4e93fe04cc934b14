// ==========================================
// 表格数据导入引擎 - 存储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库操作失败: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("表 {0} 不存在或没有任何列")]
    MissingTable(String),

    #[error("锁获取失败: {0}")]
    Lock(String),
}

// 存储层错误对导入核心统一表现为持久化失败
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Lock(msg) => ImportError::LockError(msg),
            other => ImportError::Persistence(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
