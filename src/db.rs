// ==========================================
// 表格数据导入引擎 - 数据库连接管理
// ==========================================
// 职责: 打开 SQLite 连接并设置运行参数,连接以 Arc<Mutex> 共享
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 打开数据库连接
///
/// # 参数
/// - path: 数据库文件路径(":memory:" 表示内存库)
///
/// # 返回
/// - Ok(Arc<Mutex<Connection>>): 可跨协作者共享的连接
pub fn open_sqlite_connection(path: &str) -> RepositoryResult<Arc<Mutex<Connection>>> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    info!("数据库连接已打开: {}", path);
    Ok(Arc::new(Mutex::new(conn)))
}
