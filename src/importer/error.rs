// ==========================================
// 表格数据导入引擎 - 导入错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 配置错误在建计划时全部暴露;行级错误不跳过,直接中止整轮导入
// ==========================================

use thiserror::Error;

/// 导入错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 配置错误 =====
    #[error("属性配置无效 ({attribute}): {}", .errors.join("; "))]
    InvalidConfiguration {
        attribute: String,
        errors: Vec<String>,
    },

    #[error("列重复注册 (store/key 对同一列只能调用一次): {0}")]
    DuplicateColumn(String),

    #[error("导入计划缺少 key 列")]
    MissingKeyColumn,

    #[error("导入计划只能指定一个 key 列 (已有 {existing}, 又指定 {requested})")]
    KeyAlreadyDefined { existing: String, requested: String },

    // ===== 行处理错误 =====
    #[error("单位缺失 (from={from:?}, to={to:?})")]
    MissingUnits {
        from: Option<String>,
        to: Option<String>,
    },

    #[error("未知单位: {0}")]
    UnknownUnit(String),

    #[error("单位量纲不兼容: {from} 与 {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("类型转换失败 (属性 {attribute}): 无法将 {value:?} 解析为{expected}")]
    TypeConversion {
        attribute: String,
        value: String,
        expected: String,
    },

    #[error("key 属性 {0} 在当前行解析为空,无法定位目标记录")]
    MissingKeyValue(String),

    // ===== 数据源错误 =====
    #[error("数据源不存在: {0}")]
    SourceNotFound(String),

    #[error("数据源读取失败: {0}")]
    SourceRead(String),

    // ===== 字典错误 =====
    #[error("字典加载失败: {0}")]
    DictionaryLoad(String),

    // ===== 持久化错误 =====
    #[error("持久化失败: {0}")]
    Persistence(String),

    // ===== 并发控制错误 =====
    #[error("锁获取失败: {0}")]
    LockError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::SourceRead(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::SourceRead(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
