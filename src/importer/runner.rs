// ==========================================
// 表格数据导入引擎 - 导入执行器
// ==========================================
// 职责: 串行逐行执行导入计划(解析 key → 定位记录 → 逐列写入 → 保存)
// 策略: 任一行级错误直接中止整轮,不跳过不重试;行间顺序严格按数据源顺序
// ==========================================

use crate::importer::contracts::{RecordStore, RemoteSource};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::plan::ImportPlan;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// RunSummary - 单轮导入统计
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub total_rows: usize,
    pub created: usize,
    pub updated: usize,
    pub elapsed_ms: u64,
}

// ==========================================
// ImportRunner - 导入执行器
// ==========================================
pub struct ImportRunner<S: RecordStore> {
    plan: ImportPlan,
    source: Box<dyn RemoteSource>,
    store: S,
}

impl<S: RecordStore> ImportRunner<S> {
    pub fn new(plan: ImportPlan, source: Box<dyn RemoteSource>, store: S) -> Self {
        Self { plan, source, store }
    }

    pub fn plan(&self) -> &ImportPlan {
        &self.plan
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// 执行一轮导入
    ///
    /// # 流程
    /// 1. 物化行流(一轮一份,随本轮消费完丢弃,下一轮重新拉取)
    /// 2. 逐行: 解析 key → find-or-initialize → 按注册顺序写入全部列 → 保存
    /// 3. 收尾: 刷新全部字典缓存
    ///
    /// # 返回
    /// - Ok(RunSummary): 整轮成功的统计
    /// - Err: 首个行级/持久化错误(导入就地中止)
    pub fn run(&mut self) -> ImportResult<RunSummary> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            "开始导入: run_id={}, 列数={}, key={}",
            run_id,
            self.plan.len(),
            self.plan.key_name()
        );

        // 步骤1: 物化行流
        let stream = self.source.open()?;

        // 步骤2: 串行逐行处理
        let key_name = self.plan.key_name().to_string();
        let mut total_rows = 0usize;
        let mut created = 0usize;
        let mut updated = 0usize;

        for row_result in stream {
            let row = row_result?;
            total_rows += 1;

            let key_type = self.store.field_type(&key_name);
            let key_value = self
                .plan
                .key_spec()
                .resolve(&row, key_type)?
                .ok_or_else(|| ImportError::MissingKeyValue(key_name.clone()))?;

            let mut record = self.store.find_or_initialize_by(&key_name, &key_value)?;
            if record.is_new() {
                created += 1;
            } else {
                updated += 1;
            }

            // key 列也在计划序列里,按注册顺序再次写入
            for spec in self.plan.specs() {
                let field_type = self.store.field_type(spec.name());
                spec.set_from_row(record.as_mut(), &row, field_type)?;
            }

            self.store.save(record.as_ref())?;
            debug!("行 {} 已保存: key={}", total_rows, key_value);
        }

        // 步骤3: 收尾(字典缓存刷新;行流随本轮消费完毕丢弃)
        self.plan.refresh()?;

        let summary = RunSummary {
            run_id,
            started_at,
            total_rows,
            created,
            updated,
            elapsed_ms: timer.elapsed().as_millis() as u64,
        };
        info!(
            "导入完成: run_id={}, 总行数={}, 新建={}, 更新={}, 耗时={}ms",
            summary.run_id, summary.total_rows, summary.created, summary.updated, summary.elapsed_ms
        );
        Ok(summary)
    }
}

impl<S: RecordStore> std::fmt::Debug for ImportRunner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportRunner")
            .field("plan", &self.plan)
            .finish()
    }
}
