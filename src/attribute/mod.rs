// ==========================================
// 表格数据导入引擎 - 属性模块
// ==========================================
// 提取方式 + 处理管道 + 字典缓存 + 单位工具
// ==========================================

pub mod dictionary;
pub mod kind;
pub mod options;
pub mod processor;
pub mod spec;
pub mod units;

pub use dictionary::{DictionaryCache, DictionaryConfig};
pub use kind::{AttributeKind, ROW_DIGEST_FIELD};
pub use options::{AttributeDefaults, AttributeOptions, CharSlice, FieldIndex, SplitConfig};
pub use processor::{Processor, SprintfFormat};
pub use spec::AttributeSpec;
pub use units::{compress_whitespace, effective_unit, normalize_unit_symbol};
