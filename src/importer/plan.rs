// ==========================================
// 表格数据导入引擎 - 导入计划
// ==========================================
// 职责: 一次导入的全部列声明(保持注册顺序) + 唯一主键列
// 约束: 列名不可重复,主键不可二次指定,无主键不可执行
// ==========================================

use crate::attribute::options::AttributeOptions;
use crate::attribute::spec::AttributeSpec;
use crate::importer::error::{ImportError, ImportResult};

// ==========================================
// ImportPlan - 导入计划
// ==========================================
#[derive(Debug)]
pub struct ImportPlan {
    specs: Vec<AttributeSpec>,
    key_index: usize,
}

impl ImportPlan {
    pub fn builder() -> ImportPlanBuilder {
        ImportPlanBuilder::new()
    }

    /// 按注册顺序返回全部列规格(主键列在其注册位置上)
    pub fn specs(&self) -> &[AttributeSpec] {
        &self.specs
    }

    /// 主键列规格
    pub fn key_spec(&self) -> &AttributeSpec {
        &self.specs[self.key_index]
    }

    /// 主键列名
    pub fn key_name(&self) -> &str {
        self.key_spec().name()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// 刷新计划内所有字典缓存(整表原子替换)
    pub fn refresh(&self) -> ImportResult<()> {
        for spec in &self.specs {
            spec.refresh()?;
        }
        Ok(())
    }
}

// ==========================================
// ImportPlanBuilder - 计划构建器
// ==========================================
#[derive(Debug, Default)]
pub struct ImportPlanBuilder {
    specs: Vec<AttributeSpec>,
    key_index: Option<usize>,
}

impl ImportPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个普通列
    ///
    /// # 参数
    /// - name: 本地列名(计划内唯一)
    /// - options: 列选项
    pub fn store(mut self, name: &str, options: AttributeOptions) -> ImportResult<Self> {
        let spec = AttributeSpec::new(name, options)?;
        self.push(spec)?;
        Ok(self)
    }

    /// 注册主键列(整个计划恰好一个)
    pub fn key(mut self, name: &str, options: AttributeOptions) -> ImportResult<Self> {
        if let Some(existing) = self.key_index {
            return Err(ImportError::KeyAlreadyDefined {
                existing: self.specs[existing].name().to_string(),
                requested: name.to_string(),
            });
        }
        let spec = AttributeSpec::new(name, options)?;
        self.key_index = Some(self.specs.len());
        self.push(spec)?;
        Ok(self)
    }

    /// 注册已构建好的普通列规格(程序化 matcher/synthesize 场景)
    pub fn store_spec(mut self, spec: AttributeSpec) -> ImportResult<Self> {
        self.push(spec)?;
        Ok(self)
    }

    fn push(&mut self, spec: AttributeSpec) -> ImportResult<()> {
        if self.specs.iter().any(|s| s.name() == spec.name()) {
            return Err(ImportError::DuplicateColumn(spec.name().to_string()));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// 收尾: 必须已指定主键列
    pub fn build(self) -> ImportResult<ImportPlan> {
        let key_index = self.key_index.ok_or(ImportError::MissingKeyColumn)?;
        Ok(ImportPlan {
            specs: self.specs,
            key_index,
        })
    }
}
