// ==========================================
// 表格数据导入引擎 - SQLite 记录存储
// ==========================================
// 职责: RecordStore 的 SQLite 实现(模式自省 + find-or-initialize + upsert)
// 约束: key 列须带 UNIQUE 约束,upsert 依赖 ON CONFLICT(key)
// ==========================================

use crate::domain::{FieldType, Value};
use crate::importer::contracts::{Record, RecordStore};
use crate::importer::error::ImportResult;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row as SqlRow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// SqliteRecord - 一条可变记录
// ==========================================
#[derive(Debug, Clone)]
pub struct SqliteRecord {
    fields: HashMap<String, Value>,
    is_new: bool,
}

impl SqliteRecord {
    fn new(key_field: &str, key_value: Value) -> Self {
        let mut fields = HashMap::new();
        fields.insert(key_field.to_string(), key_value);
        Self {
            fields,
            is_new: true,
        }
    }
}

impl Record for SqliteRecord {
    fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.fields.insert(field.to_string(), value);
            }
            None => {
                self.fields.remove(field);
            }
        }
    }

    fn is_new(&self) -> bool {
        self.is_new
    }
}

// ==========================================
// SqliteRecordStore - SQLite 记录存储
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
    key_column: String,
    // 建表模式: 列名 → 列类型(构建时 PRAGMA table_info 自省一次)
    columns: Vec<(String, FieldType)>,
}

impl SqliteRecordStore {
    /// 构建存储并自省表模式
    ///
    /// # 参数
    /// - conn: 共享数据库连接
    /// - table: 目标表名
    /// - key_column: upsert 冲突目标列(须带 UNIQUE 约束)
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        table: &str,
        key_column: &str,
    ) -> RepositoryResult<Self> {
        let columns = Self::introspect(&conn, table)?;
        if columns.is_empty() {
            return Err(RepositoryError::MissingTable(table.to_string()));
        }
        debug!("表 {} 模式自省完成: {} 列", table, columns.len());
        Ok(Self {
            conn,
            table: table.to_string(),
            key_column: key_column.to_string(),
            columns,
        })
    }

    fn introspect(
        conn: &Arc<Mutex<Connection>>,
        table: &str,
    ) -> RepositoryResult<Vec<(String, FieldType)>> {
        let conn = conn
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get("name")?;
            let decl: String = row.get("type")?;
            Ok((name, decl))
        })?;

        let mut columns = Vec::new();
        for row in rows {
            let (name, decl) = row?;
            let decl = decl.to_uppercase();
            // SQLite 类型亲和: 声明含 TEXT/CHAR/CLOB 视为字符串列
            let field_type = if decl.contains("TEXT") || decl.contains("CHAR") || decl.contains("CLOB")
            {
                FieldType::Text
            } else {
                FieldType::Other
            };
            columns.push((name, field_type));
        }
        Ok(columns)
    }

    fn read_record(sql_row: &SqlRow<'_>, columns: &[(String, FieldType)]) -> rusqlite::Result<SqliteRecord> {
        let mut fields = HashMap::new();
        for (index, (name, _)) in columns.iter().enumerate() {
            let value: SqlValue = sql_row.get(index)?;
            let value = match value {
                SqlValue::Null => continue,
                SqlValue::Integer(i) => Value::Integer(i),
                SqlValue::Real(f) => Value::Float(f),
                SqlValue::Text(s) => Value::Text(s),
                SqlValue::Blob(_) => continue,
            };
            fields.insert(name.clone(), value);
        }
        Ok(SqliteRecord {
            fields,
            is_new: false,
        })
    }

    fn to_sql(value: Option<Value>) -> SqlValue {
        match value {
            None => SqlValue::Null,
            Some(Value::Text(s)) => SqlValue::Text(s),
            Some(Value::EntityRef(s)) => SqlValue::Text(s),
            Some(Value::Integer(i)) => SqlValue::Integer(i),
            Some(Value::Float(f)) => SqlValue::Real(f),
        }
    }

    fn find(&self, key_field: &str, key_value: &Value) -> RepositoryResult<Option<SqliteRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        let column_list: Vec<String> = self
            .columns
            .iter()
            .map(|(name, _)| format!("\"{}\"", name))
            .collect();
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE \"{}\" = ?1",
            column_list.join(", "),
            self.table,
            key_field
        );
        let columns = &self.columns;
        let record = conn
            .query_row(
                &sql,
                [Self::to_sql(Some(key_value.clone()))],
                |row| Self::read_record(row, columns),
            )
            .optional()?;
        Ok(record)
    }

    fn upsert(&self, record: &dyn Record) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        let mut column_list = Vec::new();
        let mut placeholders = Vec::new();
        let mut assignments = Vec::new();
        let mut params: Vec<SqlValue> = Vec::new();
        for (index, (name, _)) in self.columns.iter().enumerate() {
            column_list.push(format!("\"{}\"", name));
            placeholders.push(format!("?{}", index + 1));
            if name != &self.key_column {
                assignments.push(format!("\"{name}\" = excluded.\"{name}\""));
            }
            params.push(Self::to_sql(record.get(name)));
        }

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) ON CONFLICT(\"{}\") DO UPDATE SET {}",
            self.table,
            column_list.join(", "),
            placeholders.join(", "),
            self.key_column,
            assignments.join(", ")
        );
        conn.execute(&sql, params_from_iter(params))?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    fn field_type(&self, field: &str) -> FieldType {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, field_type)| *field_type)
            .unwrap_or(FieldType::Text)
    }

    fn find_or_initialize_by(
        &mut self,
        key_field: &str,
        key_value: &Value,
    ) -> ImportResult<Box<dyn Record>> {
        let record = match self.find(key_field, key_value)? {
            Some(existing) => existing,
            None => SqliteRecord::new(key_field, key_value.clone()),
        };
        Ok(Box::new(record))
    }

    fn save(&mut self, record: &dyn Record) -> ImportResult<()> {
        self.upsert(record)?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore")
            .field("table", &self.table)
            .field("key_column", &self.key_column)
            .field("columns", &self.columns.len())
            .finish()
    }
}
