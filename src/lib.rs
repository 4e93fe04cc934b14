// ==========================================
// 表格数据导入引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 声明式表格数据导入(逐列声明 + 幂等 upsert)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 行与标量值
pub mod domain;

// 属性层 - 提取方式与处理管道
pub mod attribute;

// 导入层 - 计划与执行器
pub mod importer;

// 单位换算 - 内置换算表
pub mod units;

// 数据仓储层 - 记录存储
pub mod repository;

// 数据源层 - 远程表格数据
pub mod source;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{FieldType, Row, Value};

// 属性层
pub use attribute::{
    AttributeDefaults, AttributeOptions, AttributeSpec, CharSlice, DictionaryCache,
    DictionaryConfig, FieldIndex, SplitConfig, ROW_DIGEST_FIELD,
};

// 导入核心
pub use importer::{
    ImportError, ImportPlan, ImportPlanBuilder, ImportResult, ImportRunner, Record, RecordStore,
    RemoteSource, RowMatcher, RowStream, RowSynthesizer, RunSummary, UnitConverter,
};

// 协作者实现
pub use repository::SqliteRecordStore;
pub use source::{CsvSource, MemorySource};
pub use units::SiUnitConverter;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
