// ==========================================
// 表格数据导入引擎 - 提取方式
// ==========================================
// 职责: 每列的原始值提取策略(封闭枚举,构建时一次选定)
// 优先级: matcher > synthesize > static > field_number > 行摘要哨兵 > 按列名
// ==========================================

use crate::attribute::options::{AttributeOptions, FieldIndex};
use crate::domain::{Row, Value};
use crate::importer::contracts::{RowMatcher, RowSynthesizer};
use std::sync::Arc;

/// 行摘要哨兵列名: 目标列名(或 field_name)等于它时取整行内容摘要
pub const ROW_DIGEST_FIELD: &str = "row_digest";

// ==========================================
// AttributeKind - 提取方式
// ==========================================
#[derive(Clone)]
pub enum AttributeKind {
    /// 固定值
    Static(Option<Value>),
    /// 按列号(或闭区间多列拼接)
    FieldByIndex { index: FieldIndex, delimiter: String },
    /// 按列名
    FieldByName(String),
    /// 行 → 值 纯函数
    Computed(Arc<dyn RowSynthesizer>),
    /// 外部匹配器
    Matcher(Arc<dyn RowMatcher>),
    /// 整行内容摘要
    RowDigest,
}

impl std::fmt::Debug for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeKind::Static(value) => write!(f, "Static({:?})", value),
            AttributeKind::FieldByIndex { index, delimiter } => {
                write!(f, "FieldByIndex({:?}, {:?})", index, delimiter)
            }
            AttributeKind::FieldByName(name) => write!(f, "FieldByName({:?})", name),
            AttributeKind::Computed(_) => write!(f, "Computed"),
            AttributeKind::Matcher(_) => write!(f, "Matcher"),
            AttributeKind::RowDigest => write!(f, "RowDigest"),
        }
    }
}

impl AttributeKind {
    /// 按优先级规则选定提取方式(构建时一次,之后不再按行判定)
    ///
    /// # 参数
    /// - name: 本地列名
    /// - options: 已合并默认值的选项
    pub fn select(name: &str, options: &AttributeOptions) -> Self {
        if let Some(matcher) = &options.matcher {
            return AttributeKind::Matcher(Arc::clone(matcher));
        }
        if let Some(synthesizer) = &options.synthesize {
            return AttributeKind::Computed(Arc::clone(synthesizer));
        }
        // static 键存在即生效,值可为空
        if let Some(static_value) = &options.static_value {
            return AttributeKind::Static(static_value.clone());
        }
        if let Some(index) = options.field_number {
            let delimiter = options.delimiter.clone().unwrap_or_else(|| ", ".to_string());
            return AttributeKind::FieldByIndex { index, delimiter };
        }
        // field_name 缺省为列名本身
        let field_name = options.field_name.clone().unwrap_or_else(|| name.to_string());
        if field_name == ROW_DIGEST_FIELD {
            return AttributeKind::RowDigest;
        }
        AttributeKind::FieldByName(field_name)
    }

    /// 提取原始值(未经处理管道)
    pub fn extract(&self, row: &Row) -> Option<Value> {
        match self {
            AttributeKind::Static(value) => value.clone(),
            AttributeKind::FieldByIndex { index, delimiter } => match index {
                FieldIndex::Single(n) => row.get_index(*n).map(Value::from),
                FieldIndex::Range(start, end) => {
                    // 闭区间,保持列序,缺列跳过
                    let parts: Vec<&str> = (*start..=*end)
                        .filter_map(|n| row.get_index(n))
                        .collect();
                    if parts.is_empty() {
                        None
                    } else {
                        Some(Value::Text(parts.join(delimiter.as_str())))
                    }
                }
            },
            AttributeKind::FieldByName(name) => row.get(name).map(Value::from),
            AttributeKind::Computed(synthesizer) => synthesizer.synthesize(row),
            AttributeKind::Matcher(matcher) => matcher.match_row(row),
            AttributeKind::RowDigest => Some(Value::Text(row.digest())),
        }
    }
}
