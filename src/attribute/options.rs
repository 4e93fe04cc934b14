// ==========================================
// 表格数据导入引擎 - 属性选项
// ==========================================
// 职责: 每列声明式配置的完整选项面 + 默认值合并 + 选项校验
// 约束: 校验先于构建,错误全部累积后一次返回(不短路)
// ==========================================

use crate::attribute::dictionary::DictionaryConfig;
use crate::domain::Value;
use crate::importer::contracts::{RefPredicate, RowMatcher, RowSynthesizer, UnitConverter};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// ==========================================
// FieldIndex - 按列号提取
// ==========================================
// Range 为闭区间,多列按 delimiter 连接
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIndex {
    Single(usize),
    Range(usize, usize),
}

// ==========================================
// CharSlice - 字符切片(闭区间,按字符计)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSlice {
    pub start: usize,
    pub end: usize,
}

// ==========================================
// SplitConfig - 切分配置
// ==========================================
// pattern 缺省为连续空白,keep 缺省保留第 0 段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitConfig {
    pub pattern: Option<String>,
    pub keep: Option<usize>,
}

pub const DEFAULT_SPLIT_PATTERN: &str = r"\s+";
pub const DEFAULT_SPLIT_KEEP: usize = 0;

// ==========================================
// AttributeDefaults - 全局默认值
// ==========================================
// 默认值只在构建时与调用方选项确定性合并一次
#[derive(Debug, Clone)]
pub struct AttributeDefaults {
    pub delimiter: String,
    pub overwrite: bool,
    pub nullify_blank_strings: bool,
    pub upcase: bool,
    pub compress_whitespace: bool,
    pub convert: bool,
}

impl Default for AttributeDefaults {
    fn default() -> Self {
        Self {
            delimiter: ", ".to_string(),
            overwrite: true,
            nullify_blank_strings: false,
            upcase: false,
            compress_whitespace: true,
            convert: true,
        }
    }
}

// ==========================================
// AttributeOptions - 属性选项面
// ==========================================
// §选项全集(与对外配置面一一对应):
//   static / field_name / field_number / matcher / synthesize / delimiter /
//   from_units / to_units / units / units_field_name / units_field_number /
//   sprintf / chars / split / dictionary / nullify_blank_strings /
//   overwrite / upcase (+ 显式开关 compress_whitespace / convert)
#[derive(Clone, Default)]
pub struct AttributeOptions {
    /// static 选项; 外层 Some 表示"键存在",内层为值(可为空)
    pub static_value: Option<Option<Value>>,
    pub field_name: Option<String>,
    pub field_number: Option<FieldIndex>,
    pub matcher: Option<Arc<dyn RowMatcher>>,
    pub synthesize: Option<Arc<dyn RowSynthesizer>>,
    pub delimiter: Option<String>,
    pub units: Option<String>,
    pub from_units: Option<String>,
    pub to_units: Option<String>,
    pub units_field_name: Option<String>,
    pub units_field_number: Option<usize>,
    pub sprintf: Option<String>,
    pub chars: Option<CharSlice>,
    pub split: Option<SplitConfig>,
    pub dictionary: Option<DictionaryConfig>,
    pub nullify_blank_strings: Option<bool>,
    pub overwrite: Option<bool>,
    pub upcase: Option<bool>,
    pub compress_whitespace: Option<bool>,
    pub convert: Option<bool>,
    /// 单位换算协作者(缺省为内置换算表)
    pub converter: Option<Arc<dyn UnitConverter>>,
    /// 实体引用直通谓词(缺省匹配 Value::EntityRef)
    pub ref_bypass: Option<RefPredicate>,
}

impl std::fmt::Debug for AttributeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeOptions")
            .field("static_value", &self.static_value)
            .field("field_name", &self.field_name)
            .field("field_number", &self.field_number)
            .field("matcher", &self.matcher.as_ref().map(|_| "<matcher>"))
            .field("synthesize", &self.synthesize.as_ref().map(|_| "<synthesize>"))
            .field("delimiter", &self.delimiter)
            .field("units", &self.units)
            .field("from_units", &self.from_units)
            .field("to_units", &self.to_units)
            .field("units_field_name", &self.units_field_name)
            .field("units_field_number", &self.units_field_number)
            .field("sprintf", &self.sprintf)
            .field("chars", &self.chars)
            .field("split", &self.split)
            .field("dictionary", &self.dictionary)
            .field("nullify_blank_strings", &self.nullify_blank_strings)
            .field("overwrite", &self.overwrite)
            .field("upcase", &self.upcase)
            .field("compress_whitespace", &self.compress_whitespace)
            .field("convert", &self.convert)
            .finish()
    }
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== 流式构建接口 =====

    pub fn static_value(mut self, value: Option<Value>) -> Self {
        self.static_value = Some(value);
        self
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    pub fn field_number(mut self, index: FieldIndex) -> Self {
        self.field_number = Some(index);
        self
    }

    pub fn matcher(mut self, matcher: Arc<dyn RowMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn synthesize(mut self, synthesizer: Arc<dyn RowSynthesizer>) -> Self {
        self.synthesize = Some(synthesizer);
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn from_units(mut self, units: impl Into<String>) -> Self {
        self.from_units = Some(units.into());
        self
    }

    pub fn to_units(mut self, units: impl Into<String>) -> Self {
        self.to_units = Some(units.into());
        self
    }

    pub fn units_field_name(mut self, name: impl Into<String>) -> Self {
        self.units_field_name = Some(name.into());
        self
    }

    pub fn units_field_number(mut self, number: usize) -> Self {
        self.units_field_number = Some(number);
        self
    }

    pub fn sprintf(mut self, format: impl Into<String>) -> Self {
        self.sprintf = Some(format.into());
        self
    }

    pub fn chars(mut self, start: usize, end: usize) -> Self {
        self.chars = Some(CharSlice { start, end });
        self
    }

    pub fn split(mut self, config: SplitConfig) -> Self {
        self.split = Some(config);
        self
    }

    pub fn dictionary(mut self, config: DictionaryConfig) -> Self {
        self.dictionary = Some(config);
        self
    }

    pub fn nullify_blank_strings(mut self, enabled: bool) -> Self {
        self.nullify_blank_strings = Some(enabled);
        self
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = Some(enabled);
        self
    }

    pub fn upcase(mut self, enabled: bool) -> Self {
        self.upcase = Some(enabled);
        self
    }

    pub fn compress_whitespace(mut self, enabled: bool) -> Self {
        self.compress_whitespace = Some(enabled);
        self
    }

    pub fn convert(mut self, enabled: bool) -> Self {
        self.convert = Some(enabled);
        self
    }

    pub fn converter(mut self, converter: Arc<dyn UnitConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn ref_bypass(mut self, predicate: RefPredicate) -> Self {
        self.ref_bypass = Some(predicate);
        self
    }

    // ===== 校验 =====

    /// 选项校验,错误累积返回
    ///
    /// 规则:
    /// 1. 单位相关选项必须恰好构成一个合法组合
    /// 2. chars 区间 start <= end
    /// (未知键在 from_json 解析时批量拒绝;字典选项的类型约束由类型系统保证)
    pub fn check(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let supplied = self.supplied_unit_options();
        if !supplied.is_empty() && !VALID_UNIT_DEFINITION_SETS.contains(&supplied.as_slice()) {
            errors.push(format!(
                "单位选项组合 {{{}}} 不合法,合法组合: {}",
                supplied.join(", "),
                VALID_UNIT_DEFINITION_SETS
                    .iter()
                    .map(|set| format!("{{{}}}", set.join(", ")))
                    .collect::<Vec<_>>()
                    .join(" / ")
            ));
        }

        if let Some(chars) = &self.chars {
            if chars.start > chars.end {
                errors.push(format!(
                    "chars 区间无效: start={} > end={}",
                    chars.start, chars.end
                ));
            }
        }

        errors
    }

    /// 已提供的单位选项名(按固定顺序)
    fn supplied_unit_options(&self) -> Vec<&'static str> {
        let mut supplied = Vec::new();
        if self.units.is_some() {
            supplied.push("units");
        }
        if self.from_units.is_some() {
            supplied.push("from_units");
        }
        if self.to_units.is_some() {
            supplied.push("to_units");
        }
        if self.units_field_name.is_some() {
            supplied.push("units_field_name");
        }
        if self.units_field_number.is_some() {
            supplied.push("units_field_number");
        }
        supplied
    }

    /// 与默认值确定性合并(只调用一次,先于校验之外的任何构建)
    pub fn merged(mut self, defaults: &AttributeDefaults) -> Self {
        if self.delimiter.is_none() {
            self.delimiter = Some(defaults.delimiter.clone());
        }
        if self.overwrite.is_none() {
            self.overwrite = Some(defaults.overwrite);
        }
        if self.nullify_blank_strings.is_none() {
            self.nullify_blank_strings = Some(defaults.nullify_blank_strings);
        }
        if self.upcase.is_none() {
            self.upcase = Some(defaults.upcase);
        }
        if self.compress_whitespace.is_none() {
            self.compress_whitespace = Some(defaults.compress_whitespace);
        }
        if self.convert.is_none() {
            self.convert = Some(defaults.convert);
        }
        self
    }

    // ===== 声明式配置入口 =====

    /// 从 JSON 对象解析选项
    ///
    /// 未知键批量拒绝并点名;matcher / synthesize 只能以编程方式注入。
    ///
    /// # 参数
    /// - map: JSON 对象,例如
    ///   {"field_name": "mass", "to_units": "kg", "sprintf": "%.2f"}
    ///
    /// # 返回
    /// - Ok(AttributeOptions): 解析成功
    /// - Err(Vec<String>): 全部解析错误
    pub fn from_json(map: &serde_json::Value) -> Result<Self, Vec<String>> {
        let object = match map.as_object() {
            Some(object) => object,
            None => return Err(vec!["选项必须是 JSON 对象".to_string()]),
        };

        let mut options = AttributeOptions::new();
        let mut errors = Vec::new();
        let mut unknown_keys = Vec::new();

        for (key, value) in object {
            match key.as_str() {
                "static" => options.static_value = Some(json_scalar(value)),
                "field_name" => match value.as_str() {
                    Some(s) => options.field_name = Some(s.to_string()),
                    None => errors.push("field_name 必须是字符串".to_string()),
                },
                "field_number" => match parse_field_index(value) {
                    Some(index) => options.field_number = Some(index),
                    None => errors
                        .push("field_number 必须是非负整数或 [start, end] 闭区间".to_string()),
                },
                "delimiter" => match value.as_str() {
                    Some(s) => options.delimiter = Some(s.to_string()),
                    None => errors.push("delimiter 必须是字符串".to_string()),
                },
                "units" => match value.as_str() {
                    Some(s) => options.units = Some(s.to_string()),
                    None => errors.push("units 必须是字符串".to_string()),
                },
                "from_units" => match value.as_str() {
                    Some(s) => options.from_units = Some(s.to_string()),
                    None => errors.push("from_units 必须是字符串".to_string()),
                },
                "to_units" => match value.as_str() {
                    Some(s) => options.to_units = Some(s.to_string()),
                    None => errors.push("to_units 必须是字符串".to_string()),
                },
                "units_field_name" => match value.as_str() {
                    Some(s) => options.units_field_name = Some(s.to_string()),
                    None => errors.push("units_field_name 必须是字符串".to_string()),
                },
                "units_field_number" => match value.as_u64() {
                    Some(n) => options.units_field_number = Some(n as usize),
                    None => errors.push("units_field_number 必须是非负整数".to_string()),
                },
                "sprintf" => match value.as_str() {
                    Some(s) => options.sprintf = Some(s.to_string()),
                    None => errors.push("sprintf 必须是字符串".to_string()),
                },
                "chars" => match parse_char_slice(value) {
                    Some(slice) => options.chars = Some(slice),
                    None => errors.push(
                        "chars 必须是 {\"start\": n, \"end\": m} 或 [start, end]".to_string(),
                    ),
                },
                "split" => match parse_split(value) {
                    Some(split) => options.split = Some(split),
                    None => errors
                        .push("split 必须是 {\"pattern\": .., \"keep\": ..} 对象".to_string()),
                },
                "dictionary" => match parse_dictionary(value) {
                    Ok(config) => options.dictionary = Some(config),
                    Err(message) => errors.push(message),
                },
                // 历史拼写,等价于 nullify_blank_strings
                "nullify" | "nullify_blank_strings" => match value.as_bool() {
                    Some(b) => options.nullify_blank_strings = Some(b),
                    None => errors.push(format!("{} 必须是布尔值", key)),
                },
                "overwrite" => match value.as_bool() {
                    Some(b) => options.overwrite = Some(b),
                    None => errors.push("overwrite 必须是布尔值".to_string()),
                },
                "upcase" => match value.as_bool() {
                    Some(b) => options.upcase = Some(b),
                    None => errors.push("upcase 必须是布尔值".to_string()),
                },
                "compress_whitespace" => match value.as_bool() {
                    Some(b) => options.compress_whitespace = Some(b),
                    None => errors.push("compress_whitespace 必须是布尔值".to_string()),
                },
                "convert" => match value.as_bool() {
                    Some(b) => options.convert = Some(b),
                    None => errors.push("convert 必须是布尔值".to_string()),
                },
                "matcher" | "synthesize" => {
                    errors.push(format!("{} 选项只能以编程方式注入,不支持 JSON 配置", key));
                }
                _ => unknown_keys.push(key.clone()),
            }
        }

        if !unknown_keys.is_empty() {
            errors.push(format!("无法识别的选项: {}", unknown_keys.join(", ")));
        }

        if errors.is_empty() {
            Ok(options)
        } else {
            Err(errors)
        }
    }
}

/// 合法的单位定义组合(按 supplied_unit_options 的固定顺序列出)
pub const VALID_UNIT_DEFINITION_SETS: &[&[&str]] = &[
    &["units"],
    &["from_units", "to_units"],
    &["units_field_name"],
    &["to_units", "units_field_name"],
    &["units_field_number"],
    &["to_units", "units_field_number"],
];

fn json_scalar(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Text(b.to_string())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::Integer(i))
            } else {
                n.as_f64().map(Value::Float)
            }
        }
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        _ => Some(Value::Text(value.to_string())),
    }
}

fn parse_field_index(value: &serde_json::Value) -> Option<FieldIndex> {
    if let Some(n) = value.as_u64() {
        return Some(FieldIndex::Single(n as usize));
    }
    let array = value.as_array()?;
    if array.len() != 2 {
        return None;
    }
    let start = array[0].as_u64()? as usize;
    let end = array[1].as_u64()? as usize;
    Some(FieldIndex::Range(start, end))
}

fn parse_char_slice(value: &serde_json::Value) -> Option<CharSlice> {
    if let Some(object) = value.as_object() {
        let start = object.get("start")?.as_u64()? as usize;
        let end = object.get("end")?.as_u64()? as usize;
        return Some(CharSlice { start, end });
    }
    let array = value.as_array()?;
    if array.len() != 2 {
        return None;
    }
    Some(CharSlice {
        start: array[0].as_u64()? as usize,
        end: array[1].as_u64()? as usize,
    })
}

fn parse_split(value: &serde_json::Value) -> Option<SplitConfig> {
    let object = value.as_object()?;
    let mut config = SplitConfig::default();
    for (key, value) in object {
        match key.as_str() {
            "pattern" => config.pattern = Some(value.as_str()?.to_string()),
            "keep" => config.keep = Some(value.as_u64()? as usize),
            _ => return None,
        }
    }
    Some(config)
}

fn parse_dictionary(value: &serde_json::Value) -> Result<DictionaryConfig, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "dictionary 必须是配置对象,不能是查表实例".to_string())?;

    if let Some(entries) = object.get("entries") {
        let entries = entries
            .as_object()
            .ok_or_else(|| "dictionary.entries 必须是对象".to_string())?;
        let mut table = HashMap::new();
        for (key, value) in entries {
            let value = value
                .as_str()
                .ok_or_else(|| "dictionary.entries 的值必须是字符串".to_string())?;
            table.insert(key.clone(), value.to_string());
        }
        return Ok(DictionaryConfig::Inline(table));
    }

    let path = object
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "dictionary 需要 entries 或 path".to_string())?;
    let key_field = object
        .get("key_field")
        .and_then(|v| v.as_str())
        .unwrap_or("key")
        .to_string();
    let value_field = object
        .get("value_field")
        .and_then(|v| v.as_str())
        .unwrap_or("value")
        .to_string();
    Ok(DictionaryConfig::CsvFile {
        path: PathBuf::from(path),
        key_field,
        value_field,
    })
}
