// ==========================================
// 表格数据导入引擎 - 值类型定义
// ==========================================
// 职责: 管道中流转的标量值 + 目标列类型
// 约束: 封闭枚举,不做运行时反射
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标量值 (Value)
// ==========================================
// 管道输入/输出的统一值表示
// EntityRef: 已持久化实体的引用,整条管道对其直通
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    EntityRef(String),
}

impl Value {
    /// 是否为空白值(仅 Text 可能空白)
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 以文本形式读取(数值按十进制展开)
    pub fn as_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::EntityRef(id) => id.clone(),
        }
    }

    /// 强制转换为浮点数
    ///
    /// # 返回
    /// - Some(f64): 转换成功
    /// - None: 文本无法解析
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::EntityRef(_) => None,
        }
    }

    /// 强制转换为整数(浮点截断)
    pub fn coerce_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            Value::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
            }
            Value::EntityRef(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

// ==========================================
// 目标列类型 (FieldType)
// ==========================================
// 空白值归一化只区分"字符串列/其他列"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Other,
}

impl FieldType {
    pub fn is_text(&self) -> bool {
        matches!(self, FieldType::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(Value::Text("".to_string()).is_blank());
        assert!(Value::Text("   ".to_string()).is_blank());
        assert!(!Value::Text("x".to_string()).is_blank());
        assert!(!Value::Integer(0).is_blank());
        assert!(!Value::Float(0.0).is_blank());
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(Value::Text(" 3.14 ".to_string()).coerce_f64(), Some(3.14));
        assert_eq!(Value::Integer(7).coerce_f64(), Some(7.0));
        assert_eq!(Value::Text("abc".to_string()).coerce_f64(), None);
    }

    #[test]
    fn test_coerce_i64() {
        assert_eq!(Value::Text("42".to_string()).coerce_i64(), Some(42));
        // 浮点文本截断
        assert_eq!(Value::Text("3.9".to_string()).coerce_i64(), Some(3));
        assert_eq!(Value::Float(5.7).coerce_i64(), Some(5));
        assert_eq!(Value::Text("abc".to_string()).coerce_i64(), None);
    }
}
