// ==========================================
// 表格数据导入引擎 - 领域模型层
// ==========================================
// 职责: 定义行/值等基础类型
// 红线: 不含数据访问逻辑,不含管道逻辑
// ==========================================

pub mod row;
pub mod value;

// 重导出核心类型
pub use row::Row;
pub use value::{FieldType, Value};
