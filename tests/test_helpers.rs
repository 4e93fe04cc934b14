// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、查询断言等功能
// ==========================================
#![allow(dead_code)]

use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tabular_import::db::open_sqlite_connection;
use tabular_import::repository::SqliteRecordStore;

/// 创建内存测试数据库并初始化 plants 表
///
/// # 返回
/// - Arc<Mutex<Connection>>: 共享连接(用于断言查询)
/// - SqliteRecordStore: 以 code 为 upsert key 的记录存储
pub fn create_plants_store() -> (Arc<Mutex<Connection>>, SqliteRecordStore) {
    let conn = open_sqlite_connection(":memory:").expect("Failed to open test db");
    conn.lock()
        .unwrap()
        .execute_batch(
            r#"
            CREATE TABLE plants (
                code TEXT NOT NULL UNIQUE,
                name TEXT,
                region TEXT,
                serial TEXT,
                mass REAL,
                mass_units TEXT,
                energy REAL,
                energy_units TEXT,
                row_digest TEXT
            );
            "#,
        )
        .expect("Failed to init schema");
    let store = SqliteRecordStore::new(Arc::clone(&conn), "plants", "code")
        .expect("Failed to create record store");
    (conn, store)
}

/// plants 表当前行数
pub fn count_plants(conn: &Arc<Mutex<Connection>>) -> i64 {
    conn.lock()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM plants", [], |r| r.get(0))
        .unwrap()
}

/// 按 code 读取文本列(行不存在或列为空都返回 None)
pub fn text_field(conn: &Arc<Mutex<Connection>>, code: &str, field: &str) -> Option<String> {
    conn.lock()
        .unwrap()
        .query_row(
            &format!("SELECT \"{}\" FROM plants WHERE code = ?1", field),
            [code],
            |r| r.get::<_, Option<String>>(0),
        )
        .optional()
        .unwrap()
        .flatten()
}

/// 按 code 读取数值列(行不存在或列为空都返回 None)
pub fn float_field(conn: &Arc<Mutex<Connection>>, code: &str, field: &str) -> Option<f64> {
    conn.lock()
        .unwrap()
        .query_row(
            &format!("SELECT \"{}\" FROM plants WHERE code = ?1", field),
            [code],
            |r| r.get::<_, Option<f64>>(0),
        )
        .optional()
        .unwrap()
        .flatten()
}

/// fixtures 目录下的文件路径
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
