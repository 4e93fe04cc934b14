// ==========================================
// 表格数据导入引擎 - 单位解析
// ==========================================
// 职责: 从静态配置或行字段解析出生效单位符号
// 优先级: 静态单位 > 行字段(列名) > 行字段(列号) > 无
// ==========================================

use crate::domain::Row;

/// 压缩文本中连续空格为一个,并去除首尾空白
pub fn compress_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// 归一化单位符号: 压缩空白 → 小写 → 空格转下划线
///
/// 例如 " Kilowatt  Hours " → "kilowatt_hours", "MWh" → "mwh"
pub fn normalize_unit_symbol(raw: &str) -> String {
    compress_whitespace(raw).to_lowercase().replace(' ', "_")
}

/// 解析生效单位
///
/// # 参数
/// - row: 当前行
/// - static_unit: 静态配置的单位(原样使用,不做归一化)
/// - field_name: 按列名读取行内单位
/// - field_number: 按列号读取行内单位
///
/// # 返回
/// - Some(String): 生效单位符号
/// - None: 无法解析(未配置,或行内字段为空白)
pub fn effective_unit(
    row: &Row,
    static_unit: Option<&str>,
    field_name: Option<&str>,
    field_number: Option<usize>,
) -> Option<String> {
    if let Some(unit) = static_unit {
        return Some(unit.to_string());
    }

    let raw = match (field_name, field_number) {
        (Some(name), _) => row.get(name),
        (None, Some(number)) => row.get_index(number),
        (None, None) => None,
    }?;

    let normalized = normalize_unit_symbol(raw);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
