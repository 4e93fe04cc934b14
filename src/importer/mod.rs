// ==========================================
// 表格数据导入引擎 - 导入核心模块
// ==========================================
// 错误类型 + 协作者接口 + 导入计划 + 执行器
// ==========================================

pub mod contracts;
pub mod error;
pub mod plan;
pub mod runner;

pub use contracts::{
    default_ref_predicate, Record, RecordStore, RefPredicate, RemoteSource, RowMatcher,
    RowStream, RowSynthesizer, UnitConverter,
};
pub use error::{ImportError, ImportResult};
pub use plan::{ImportPlan, ImportPlanBuilder};
pub use runner::{ImportRunner, RunSummary};
