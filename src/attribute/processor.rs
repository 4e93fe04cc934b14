// ==========================================
// 表格数据导入引擎 - 值处理管道
// ==========================================
// 职责: 单值变换阶段(封闭枚举)与固定顺序的链式执行
// 顺序: chars → split → 空白检查 → 压缩空白 → 大写 → 单位换算 → sprintf → 字典
// 约束: 任一阶段产出空值则其余阶段全部跳过
// ==========================================

use crate::attribute::dictionary::DictionaryCache;
use crate::attribute::options::{
    AttributeOptions, CharSlice, SplitConfig, DEFAULT_SPLIT_KEEP, DEFAULT_SPLIT_PATTERN,
};
use crate::attribute::units::{compress_whitespace, effective_unit};
use crate::domain::{FieldType, Row, Value};
use crate::importer::contracts::UnitConverter;
use crate::importer::error::{ImportError, ImportResult};
use regex::Regex;
use std::sync::Arc;

// ==========================================
// ProcessContext - 阶段执行上下文
// ==========================================
pub struct ProcessContext<'a> {
    pub attribute: &'a str,
    pub row: &'a Row,
    pub field_type: FieldType,
}

// ==========================================
// Processor - 处理阶段
// ==========================================
#[derive(Debug)]
pub enum Processor {
    /// 字符切片(闭区间)
    Chars(CharSlice),
    /// 按模式切分并保留第 keep 段
    Split { pattern: Regex, keep: usize },
    /// 空白检查: 非字符串列或显式开启 nullify 时,空白值归为空
    Blank { nullify_blank_strings: bool },
    /// 压缩连续空格并去首尾空白
    CompressWhitespace,
    /// Unicode 大写
    Upcase,
    /// 单位换算
    Convert(ConvertStage),
    /// printf 风格格式化
    Sprintf(SprintfFormat),
    /// 查表替换
    Dictionary(DictionaryCache),
}

impl Processor {
    /// 对单个值执行本阶段
    ///
    /// # 返回
    /// - Ok(Some): 继续流向下一阶段
    /// - Ok(None): 短路,后续阶段跳过
    /// - Err: 单位缺失/类型转换失败等,中止整行
    pub fn apply(&self, value: Value, ctx: &ProcessContext) -> ImportResult<Option<Value>> {
        match self {
            Processor::Chars(slice) => Ok(Some(apply_chars(value, slice))),
            Processor::Split { pattern, keep } => Ok(Some(apply_split(value, pattern, *keep))),
            Processor::Blank {
                nullify_blank_strings,
            } => {
                if value.is_blank() && (!ctx.field_type.is_text() || *nullify_blank_strings) {
                    Ok(None)
                } else {
                    Ok(Some(value))
                }
            }
            Processor::CompressWhitespace => Ok(Some(match value {
                Value::Text(s) => Value::Text(compress_whitespace(&s)),
                other => other,
            })),
            Processor::Upcase => Ok(Some(match value {
                Value::Text(s) => Value::Text(s.to_uppercase()),
                other => other,
            })),
            Processor::Convert(stage) => stage.apply(value, ctx).map(Some),
            Processor::Sprintf(format) => format.apply(value, ctx).map(Some),
            Processor::Dictionary(cache) => {
                let mapped = cache.lookup(&value.as_text())?;
                Ok(mapped.map(Value::Text))
            }
        }
    }
}

fn apply_chars(value: Value, slice: &CharSlice) -> Value {
    match value {
        Value::Text(s) => Value::Text(
            s.chars()
                .skip(slice.start)
                .take(slice.end - slice.start + 1)
                .collect(),
        ),
        other => other,
    }
}

fn apply_split(value: Value, pattern: &Regex, keep: usize) -> Value {
    match value {
        Value::Text(s) => {
            let token = pattern
                .split(&s)
                .nth(keep)
                .unwrap_or_default()
                .to_string();
            Value::Text(token)
        }
        other => other,
    }
}

// ==========================================
// ConvertStage - 单位换算阶段
// ==========================================
// 是否换算: 配置了 from 侧来源(静态 from_units 或行内单位字段)才换算
// 两侧单位任一解析为空 → MissingUnits(同时点名两侧)
#[derive(Clone)]
pub struct ConvertStage {
    pub from_units: Option<String>,
    pub to_units: Option<String>,
    pub units_field_name: Option<String>,
    pub units_field_number: Option<usize>,
    pub converter: Arc<dyn UnitConverter>,
}

impl std::fmt::Debug for ConvertStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertStage")
            .field("from_units", &self.from_units)
            .field("to_units", &self.to_units)
            .field("units_field_name", &self.units_field_name)
            .field("units_field_number", &self.units_field_number)
            .finish()
    }
}

impl ConvertStage {
    /// 是否需要真正换算
    pub fn active(&self) -> bool {
        self.from_units.is_some()
            || self.units_field_name.is_some()
            || self.units_field_number.is_some()
    }

    fn apply(&self, value: Value, ctx: &ProcessContext) -> ImportResult<Value> {
        if !self.active() {
            return Ok(value);
        }

        let final_from = effective_unit(
            ctx.row,
            self.from_units.as_deref(),
            self.units_field_name.as_deref(),
            self.units_field_number,
        );
        let final_to = effective_unit(
            ctx.row,
            self.to_units.as_deref(),
            self.units_field_name.as_deref(),
            self.units_field_number,
        );

        let (from, to) = match (&final_from, &final_to) {
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            _ => {
                return Err(ImportError::MissingUnits {
                    from: final_from,
                    to: final_to,
                })
            }
        };

        let number = value.coerce_f64().ok_or_else(|| ImportError::TypeConversion {
            attribute: ctx.attribute.to_string(),
            value: value.as_text(),
            expected: "浮点数".to_string(),
        })?;

        let converted = self.converter.convert(number, &from, &to)?;
        Ok(Value::Float(converted))
    }
}

// ==========================================
// SprintfFormat - printf 风格格式化
// ==========================================
// 支持单个转换指令: %s / %d / %f (可带 -/0 标志、宽度、精度),%% 转义
// 指令以 f 结尾先强转浮点,以 d 结尾先强转整数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintfFormat {
    prefix: String,
    suffix: String,
    conversion: Conversion,
    left_align: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Float,
    Integer,
    Str,
}

impl SprintfFormat {
    /// 解析格式串,非法格式返回描述性错误文本(供配置错误累积)
    pub fn parse(format: &str) -> Result<Self, String> {
        let mut chars = format.chars().peekable();
        let mut prefix = String::new();

        // 前缀(处理 %% 转义)直到第一个转换指令
        loop {
            match chars.next() {
                Some('%') => {
                    if chars.peek() == Some(&'%') {
                        chars.next();
                        prefix.push('%');
                        continue;
                    }
                    break;
                }
                Some(ch) => prefix.push(ch),
                None => return Err(format!("sprintf 格式缺少转换指令: {:?}", format)),
            }
        }

        let mut left_align = false;
        let mut zero_pad = false;
        while let Some(&ch) = chars.peek() {
            match ch {
                '-' => {
                    left_align = true;
                    chars.next();
                }
                '0' => {
                    zero_pad = true;
                    chars.next();
                }
                _ => break,
            }
        }

        let mut width_digits = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_ascii_digit() {
                width_digits.push(ch);
                chars.next();
            } else {
                break;
            }
        }
        let width = if width_digits.is_empty() {
            None
        } else {
            width_digits.parse::<usize>().ok()
        };

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut precision_digits = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_ascii_digit() {
                    precision_digits.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            precision = Some(precision_digits.parse::<usize>().unwrap_or(0));
        }

        let conversion = match chars.next() {
            Some('f') => Conversion::Float,
            Some('d') | Some('i') => Conversion::Integer,
            Some('s') => Conversion::Str,
            Some(ch) => return Err(format!("sprintf 不支持的转换指令: %{}", ch)),
            None => return Err(format!("sprintf 格式缺少转换指令: {:?}", format)),
        };

        // 后缀(同样处理 %% 转义;不允许第二个转换指令)
        let mut suffix = String::new();
        while let Some(ch) = chars.next() {
            if ch == '%' {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    suffix.push('%');
                    continue;
                }
                return Err(format!("sprintf 仅支持一个转换指令: {:?}", format));
            }
            suffix.push(ch);
        }

        Ok(Self {
            prefix,
            suffix,
            conversion,
            left_align,
            zero_pad,
            width,
            precision,
        })
    }

    fn apply(&self, value: Value, ctx: &ProcessContext) -> ImportResult<Value> {
        let body = match self.conversion {
            Conversion::Float => {
                let number = value.coerce_f64().ok_or_else(|| ImportError::TypeConversion {
                    attribute: ctx.attribute.to_string(),
                    value: value.as_text(),
                    expected: "浮点数".to_string(),
                })?;
                let precision = self.precision.unwrap_or(6);
                self.pad_numeric(format!("{:.*}", precision, number))
            }
            Conversion::Integer => {
                let number = value.coerce_i64().ok_or_else(|| ImportError::TypeConversion {
                    attribute: ctx.attribute.to_string(),
                    value: value.as_text(),
                    expected: "整数".to_string(),
                })?;
                self.pad_numeric(number.to_string())
            }
            Conversion::Str => {
                let mut text = value.as_text();
                if let Some(precision) = self.precision {
                    text = text.chars().take(precision).collect();
                }
                self.pad_text(text)
            }
        };
        Ok(Value::Text(format!("{}{}{}", self.prefix, body, self.suffix)))
    }

    fn pad_numeric(&self, body: String) -> String {
        let width = match self.width {
            Some(width) if body.len() < width => width,
            _ => return body,
        };
        if self.left_align {
            format!("{:<width$}", body)
        } else if self.zero_pad {
            // 负号保持在补零之前
            if let Some(digits) = body.strip_prefix('-') {
                format!("-{:0>width$}", digits, width = width - 1)
            } else {
                format!("{:0>width$}", body)
            }
        } else {
            format!("{:>width$}", body)
        }
    }

    fn pad_text(&self, body: String) -> String {
        let width = match self.width {
            Some(width) if body.chars().count() < width => width,
            _ => return body,
        };
        if self.left_align {
            format!("{:<width$}", body)
        } else {
            format!("{:>width$}", body)
        }
    }
}

// ==========================================
// 管道装配
// ==========================================
// 由选项出现与否决定各阶段是否进入管道,顺序固定。
// 装配错误(正则/格式串/字典加载)追加到 errors,供构建方一次性汇总。
pub fn build_chain(options: &AttributeOptions, errors: &mut Vec<String>) -> Vec<Processor> {
    let mut processors = Vec::new();

    if let Some(slice) = options.chars {
        processors.push(Processor::Chars(slice));
    }

    if let Some(split) = &options.split {
        match compile_split(split) {
            Ok((pattern, keep)) => processors.push(Processor::Split { pattern, keep }),
            Err(message) => errors.push(message),
        }
    }

    // 空白检查阶段始终在场(是否短路取决于目标列类型与 nullify 开关)
    processors.push(Processor::Blank {
        nullify_blank_strings: options.nullify_blank_strings.unwrap_or(false),
    });

    if options.compress_whitespace.unwrap_or(true) {
        processors.push(Processor::CompressWhitespace);
    }

    if options.upcase.unwrap_or(false) {
        processors.push(Processor::Upcase);
    }

    let has_unit_options = options.units.is_some()
        || options.from_units.is_some()
        || options.to_units.is_some()
        || options.units_field_name.is_some()
        || options.units_field_number.is_some();
    if options.convert.unwrap_or(true) && has_unit_options {
        if let Some(converter) = &options.converter {
            processors.push(Processor::Convert(ConvertStage {
                from_units: options.from_units.clone(),
                // to 侧缺省回落到 units 选项
                to_units: options.to_units.clone().or_else(|| options.units.clone()),
                units_field_name: options.units_field_name.clone(),
                units_field_number: options.units_field_number,
                converter: Arc::clone(converter),
            }));
        } else {
            errors.push("convert 阶段缺少单位换算协作者".to_string());
        }
    }

    if let Some(format) = &options.sprintf {
        match SprintfFormat::parse(format) {
            Ok(parsed) => processors.push(Processor::Sprintf(parsed)),
            Err(message) => errors.push(message),
        }
    }

    if let Some(config) = &options.dictionary {
        match DictionaryCache::new(config.clone()) {
            Ok(cache) => processors.push(Processor::Dictionary(cache)),
            Err(e) => errors.push(e.to_string()),
        }
    }

    processors
}

fn compile_split(config: &SplitConfig) -> Result<(Regex, usize), String> {
    let pattern = config.pattern.as_deref().unwrap_or(DEFAULT_SPLIT_PATTERN);
    let keep = config.keep.unwrap_or(DEFAULT_SPLIT_KEEP);
    Regex::new(pattern)
        .map(|regex| (regex, keep))
        .map_err(|e| format!("split 模式无效: {}", e))
}

/// 按固定顺序执行整条管道;空值短路
pub fn apply_chain(
    processors: &[Processor],
    value: Option<Value>,
    ctx: &ProcessContext,
) -> ImportResult<Option<Value>> {
    let mut current = value;
    for processor in processors {
        current = match current {
            Some(value) => processor.apply(value, ctx)?,
            None => return Ok(None),
        };
    }
    Ok(current)
}
