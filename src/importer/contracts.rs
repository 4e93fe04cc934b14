// ==========================================
// 表格数据导入引擎 - 协作者接口定义
// ==========================================
// 职责: 定义导入核心与外部协作者之间的边界(不包含实现)
// 约束: 核心只通过这些接口访问记录存储/远程数据源/匹配器/单位换算
// ==========================================

use crate::domain::{FieldType, Row, Value};
use crate::importer::error::ImportResult;
use std::sync::Arc;

// ==========================================
// Record Trait
// ==========================================
// 用途: 一条本地可变记录
// 实现者: SqliteRecord 等
pub trait Record {
    /// 读取字段当前值
    ///
    /// # 返回
    /// - Some(Value): 字段已有值
    /// - None: 字段为空
    fn get(&self, field: &str) -> Option<Value>;

    /// 写入字段值(None 表示置空)
    fn set(&mut self, field: &str, value: Option<Value>);

    /// 是否为本轮新建(尚未持久化)的记录
    fn is_new(&self) -> bool;
}

// ==========================================
// RecordStore Trait
// ==========================================
// 用途: 记录存储(find-or-initialize + save + 模式自省)
// 实现者: SqliteRecordStore
pub trait RecordStore {
    /// 查询字段的列类型(字符串列/其他列)
    ///
    /// 空白值归一化依赖该信息:非字符串列的空白值一律写为空。
    fn field_type(&self, field: &str) -> FieldType;

    /// 按 key 查找记录;不存在则返回未保存的新实例
    ///
    /// # 参数
    /// - key_field: key 列名
    /// - key_value: 本行解析出的 key 值
    fn find_or_initialize_by(
        &mut self,
        key_field: &str,
        key_value: &Value,
    ) -> ImportResult<Box<dyn Record>>;

    /// 持久化记录;失败对整轮导入是致命的
    fn save(&mut self, record: &dyn Record) -> ImportResult<()>;
}

// ==========================================
// RemoteSource Trait
// ==========================================
// 用途: 远程表格数据源,单向前进流,一次物化一份
// 实现者: CsvSource, MemorySource
pub type RowStream = Box<dyn Iterator<Item = ImportResult<Row>> + Send>;

pub trait RemoteSource: Send + Sync {
    /// 物化行流(每次调用重新拉取)
    fn open(&self) -> ImportResult<RowStream>;
}

// ==========================================
// RowMatcher Trait
// ==========================================
// 用途: Matcher 提取方式的外部匹配器
pub trait RowMatcher: Send + Sync {
    /// 对整行做匹配,返回最终值
    fn match_row(&self, row: &Row) -> Option<Value>;
}

// ==========================================
// RowSynthesizer Trait
// ==========================================
// 用途: Computed 提取方式的纯函数钩子
pub trait RowSynthesizer: Send + Sync {
    /// 由整行计算出一个值
    fn synthesize(&self, row: &Row) -> Option<Value>;
}

// 闭包可直接作为合成器使用
impl<F> RowSynthesizer for F
where
    F: Fn(&Row) -> Option<Value> + Send + Sync,
{
    fn synthesize(&self, row: &Row) -> Option<Value> {
        self(row)
    }
}

// ==========================================
// UnitConverter Trait
// ==========================================
// 用途: 数值单位换算表
// 实现者: units::SiUnitConverter
pub trait UnitConverter: Send + Sync {
    /// 把 value 从 from 单位换算到 to 单位
    ///
    /// # 返回
    /// - Ok(f64): 换算结果
    /// - Err: 未知单位或量纲不兼容
    fn convert(&self, value: f64, from: &str, to: &str) -> ImportResult<f64>;
}

// ==========================================
// 实体引用直通判定
// ==========================================
// 已是持久化实体引用的值跳过整条处理管道。
// 判定标准依赖具体记录存储,因此做成可注入谓词。
pub type RefPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// 默认判定: Value::EntityRef 视为实体引用
pub fn default_ref_predicate() -> RefPredicate {
    Arc::new(|value| matches!(value, Value::EntityRef(_)))
}
