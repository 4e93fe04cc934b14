// ==========================================
// 表格数据导入引擎 - 数据源模块
// ==========================================
// RemoteSource 的 CSV 与内存实现
// ==========================================

pub mod csv_source;
pub mod memory;

pub use csv_source::CsvSource;
pub use memory::MemorySource;
