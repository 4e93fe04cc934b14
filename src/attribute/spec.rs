// ==========================================
// 表格数据导入引擎 - 属性规格
// ==========================================
// 职责: 一列的完整声明(提取方式 + 处理管道 + 落库语义)
// 约束: 构建即校验,校验失败原子性失败并携带全部错误;建成后不可变
// ==========================================

use crate::attribute::kind::AttributeKind;
use crate::attribute::options::{AttributeDefaults, AttributeOptions};
use crate::attribute::processor::{
    apply_chain, build_chain, ProcessContext, Processor,
};
use crate::attribute::units::effective_unit;
use crate::domain::{FieldType, Row, Value};
use crate::importer::contracts::{default_ref_predicate, Record, RefPredicate};
use crate::importer::error::{ImportError, ImportResult};
use crate::units::SiUnitConverter;
use std::sync::Arc;

// ==========================================
// AttributeSpec - 属性规格
// ==========================================
pub struct AttributeSpec {
    name: String,
    kind: AttributeKind,
    processors: Vec<Processor>,
    overwrite: bool,
    nullify_blank_strings: bool,
    to_units: Option<String>,
    units_field_name: Option<String>,
    units_field_number: Option<usize>,
    has_units: bool,
    ref_bypass: RefPredicate,
}

impl std::fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("processors", &self.processors.len())
            .field("overwrite", &self.overwrite)
            .field("has_units", &self.has_units)
            .finish()
    }
}

impl AttributeSpec {
    /// 构建并校验属性规格
    ///
    /// # 参数
    /// - name: 本地列名
    /// - options: 调用方选项(与全局默认值合并一次后再校验)
    ///
    /// # 返回
    /// - Ok(AttributeSpec): 校验全部通过
    /// - Err(InvalidConfiguration): 携带累积的全部违规信息
    pub fn new(name: &str, options: AttributeOptions) -> ImportResult<Self> {
        Self::with_defaults(name, options, &AttributeDefaults::default())
    }

    /// 使用显式默认值构建(默认值结构只合并一次)
    pub fn with_defaults(
        name: &str,
        options: AttributeOptions,
        defaults: &AttributeDefaults,
    ) -> ImportResult<Self> {
        let mut options = options.merged(defaults);
        if options.converter.is_none() {
            options.converter = Some(Arc::new(SiUnitConverter));
        }

        let mut errors = options.check();
        let processors = build_chain(&options, &mut errors);

        if !errors.is_empty() {
            return Err(ImportError::InvalidConfiguration {
                attribute: name.to_string(),
                errors,
            });
        }

        let kind = AttributeKind::select(name, &options);
        let has_units = options.units.is_some()
            || options.to_units.is_some()
            || options.units_field_name.is_some()
            || options.units_field_number.is_some();

        Ok(Self {
            name: name.to_string(),
            kind,
            processors,
            overwrite: options.overwrite.unwrap_or(true),
            nullify_blank_strings: options.nullify_blank_strings.unwrap_or(false),
            // 单位伴随列的 to 侧: to_units 缺省回落到 units
            to_units: options.to_units.clone().or_else(|| options.units.clone()),
            units_field_name: options.units_field_name.clone(),
            units_field_number: options.units_field_number,
            has_units,
            ref_bypass: options
                .ref_bypass
                .clone()
                .unwrap_or_else(default_ref_predicate),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// 是否声明了任何单位配置(决定伴随列写入)
    pub fn has_units(&self) -> bool {
        self.has_units
    }

    /// 伴随单位列名: <name>_units
    pub fn units_field(&self) -> String {
        format!("{}_units", self.name)
    }

    /// 从行解析最终值: 按提取方式取原始值,再流经处理管道
    ///
    /// 已是实体引用的值绕过整条管道原样返回。
    pub fn resolve(&self, row: &Row, field_type: FieldType) -> ImportResult<Option<Value>> {
        let raw = self.kind.extract(row);

        if let Some(value) = &raw {
            if (self.ref_bypass)(value) {
                return Ok(raw);
            }
        }

        let ctx = ProcessContext {
            attribute: &self.name,
            row,
            field_type,
        };
        apply_chain(&self.processors, raw, &ctx)
    }

    /// 把本行的值写入记录字段
    ///
    /// # 语义
    /// - 现值为空或 overwrite 开启时才解析并写入
    /// - 解析结果写入前再做一次空白归一化(晚期阶段可能重新产出空白文本)
    /// - 写入值非空且声明了单位配置时,写伴随列 <name>_units
    ///   (静态 to_units 优先,否则取行内单位)
    pub fn set_from_row(
        &self,
        record: &mut dyn Record,
        row: &Row,
        field_type: FieldType,
    ) -> ImportResult<()> {
        let previously_absent = record.get(&self.name).is_none();
        let mut currently_absent = false;

        if previously_absent || self.overwrite {
            let mut new_value = self.resolve(row, field_type)?;
            if let Some(value) = &new_value {
                if value.is_blank() && (!field_type.is_text() || self.nullify_blank_strings) {
                    new_value = None;
                }
            }
            currently_absent = new_value.is_none();
            record.set(&self.name, new_value);
        }

        if !currently_absent && self.has_units {
            let final_to = effective_unit(
                row,
                self.to_units.as_deref(),
                self.units_field_name.as_deref(),
                self.units_field_number,
            );
            if let Some(unit) = final_to {
                record.set(&self.units_field(), Some(Value::Text(unit)));
            }
        }

        Ok(())
    }

    /// 是否持有字典处理器
    pub fn has_dictionary(&self) -> bool {
        self.processors
            .iter()
            .any(|p| matches!(p, Processor::Dictionary(_)))
    }

    /// 刷新字典缓存(原子整表替换)
    pub fn refresh(&self) -> ImportResult<()> {
        for processor in &self.processors {
            if let Processor::Dictionary(cache) = processor {
                cache.refresh()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::dictionary::DictionaryConfig;
    use crate::attribute::options::SplitConfig;
    use std::collections::HashMap;

    fn text_resolve(spec: &AttributeSpec, row: &Row) -> Option<Value> {
        spec.resolve(row, FieldType::Text).unwrap()
    }

    #[derive(Default)]
    struct MapRecord {
        fields: HashMap<String, Value>,
    }

    impl Record for MapRecord {
        fn get(&self, field: &str) -> Option<Value> {
            self.fields.get(field).cloned()
        }

        fn set(&mut self, field: &str, value: Option<Value>) {
            match value {
                Some(value) => {
                    self.fields.insert(field.to_string(), value);
                }
                None => {
                    self.fields.remove(field);
                }
            }
        }

        fn is_new(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_standard_resolve_compresses_whitespace() {
        let spec = AttributeSpec::new("name", AttributeOptions::new()).unwrap();
        let row = Row::from_pairs(&[("name", "  hello   world ")]);
        assert_eq!(text_resolve(&spec, &row), Some(Value::from("hello world")));
    }

    #[test]
    fn test_invalid_configuration_lists_all_errors() {
        let options = AttributeOptions::new()
            .to_units("kg")
            .sprintf("%q")
            .chars(5, 1);
        let err = AttributeSpec::new("mass", options).unwrap_err();
        match err {
            ImportError::InvalidConfiguration { attribute, errors } => {
                assert_eq!(attribute, "mass");
                assert_eq!(errors.len(), 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_order_upcase_before_dictionary() {
        // 字典键为大写 → upcase 在 dictionary 之前执行才能命中
        let mut entries = HashMap::new();
        entries.insert("NITROGEN".to_string(), "N2".to_string());
        let options = AttributeOptions::new()
            .upcase(true)
            .dictionary(DictionaryConfig::Inline(entries));
        let spec = AttributeSpec::new("gas", options).unwrap();
        let row = Row::from_pairs(&[("gas", "nitrogen")]);
        assert_eq!(text_resolve(&spec, &row), Some(Value::from("N2")));
    }

    #[test]
    fn test_pipeline_order_split_before_compress() {
        // split 的缺省模式是连续空白;chars 先于 split
        let options = AttributeOptions::new()
            .chars(0, 8)
            .split(SplitConfig {
                pattern: Some(",".to_string()),
                keep: Some(1),
            });
        let spec = AttributeSpec::new("x", options).unwrap();
        let row = Row::from_pairs(&[("x", "ab,cd,ef,zzzz")]);
        // chars 截取 "ab,cd,ef" → split 保留 "cd"
        assert_eq!(text_resolve(&spec, &row), Some(Value::from("cd")));
    }

    #[test]
    fn test_dictionary_miss_is_absent() {
        let options = AttributeOptions::new()
            .dictionary(DictionaryConfig::Inline(HashMap::new()));
        let spec = AttributeSpec::new("gas", options).unwrap();
        let row = Row::from_pairs(&[("gas", "argon")]);
        assert_eq!(text_resolve(&spec, &row), None);
    }

    #[test]
    fn test_entity_ref_bypasses_pipeline() {
        let options = AttributeOptions::new()
            .synthesize(Arc::new(|_row: &Row| Some(Value::EntityRef("42".to_string()))))
            .upcase(true);
        let spec = AttributeSpec::new("owner", options).unwrap();
        let row = Row::from_pairs(&[]);
        assert_eq!(
            text_resolve(&spec, &row),
            Some(Value::EntityRef("42".to_string()))
        );
    }

    #[test]
    fn test_late_blank_nullified_on_numeric_column() {
        // 字典把值映射成空白串: 管道早期的空白检查拦不住,写入前再归一化
        let mut entries = HashMap::new();
        entries.insert("unknown".to_string(), "   ".to_string());
        let options = AttributeOptions::new()
            .dictionary(DictionaryConfig::Inline(entries));
        let spec = AttributeSpec::new("mass", options).unwrap();
        let row = Row::from_pairs(&[("mass", "unknown")]);

        let mut record = MapRecord::default();
        spec.set_from_row(&mut record, &row, FieldType::Other).unwrap();
        assert_eq!(record.get("mass"), None);
    }

    #[test]
    fn test_late_blank_kept_on_string_column_without_nullify() {
        let mut entries = HashMap::new();
        entries.insert("unknown".to_string(), "   ".to_string());
        let options = AttributeOptions::new()
            .dictionary(DictionaryConfig::Inline(entries));
        let spec = AttributeSpec::new("name", options).unwrap();
        let row = Row::from_pairs(&[("name", "unknown")]);

        let mut record = MapRecord::default();
        spec.set_from_row(&mut record, &row, FieldType::Text).unwrap();
        assert_eq!(record.get("name"), Some(Value::from("   ")));
    }

    #[test]
    fn test_blank_on_numeric_column_short_circuits() {
        let spec = AttributeSpec::new("mass", AttributeOptions::new()).unwrap();
        let row = Row::from_pairs(&[("mass", "   ")]);
        assert_eq!(spec.resolve(&row, FieldType::Other).unwrap(), None);
    }

    #[test]
    fn test_scenario_convert_with_row_units() {
        // 静态 to_units + 行内 from 单位: 10 MWh → 10000 kwh
        let options = AttributeOptions::new()
            .field_name("value")
            .units_field_name("unit")
            .to_units("kwh");
        let spec = AttributeSpec::new("energy", options).unwrap();
        let row = Row::from_pairs(&[("value", "10"), ("unit", "MWh")]);
        let resolved = spec.resolve(&row, FieldType::Other).unwrap();
        match resolved {
            Some(Value::Float(f)) => assert!((f - 10_000.0).abs() < 1e-9),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_missing_row_units_is_error_naming_both_sides() {
        let options = AttributeOptions::new()
            .field_name("value")
            .units_field_name("unit")
            .to_units("kwh");
        let spec = AttributeSpec::new("energy", options).unwrap();
        let row = Row::from_pairs(&[("value", "10"), ("unit", "  ")]);
        match spec.resolve(&row, FieldType::Other) {
            Err(ImportError::MissingUnits { from, to }) => {
                assert_eq!(from, None);
                assert_eq!(to, Some("kwh".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_units_only_option_skips_conversion() {
        // {units} 单独出现: 不换算,但伴随列仍会写
        let options = AttributeOptions::new().field_name("value").units("kg");
        let spec = AttributeSpec::new("mass", options).unwrap();
        let row = Row::from_pairs(&[("value", "7.5")]);
        assert_eq!(
            spec.resolve(&row, FieldType::Other).unwrap(),
            Some(Value::from("7.5"))
        );
        assert!(spec.has_units());
    }
}
