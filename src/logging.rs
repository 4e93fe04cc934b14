// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 导入引擎作为库被嵌入,缺省过滤器只放行本 crate 的日志
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器(缺省: tabular_import=info)
///   例如: RUST_LOG=debug 或 RUST_LOG=tabular_import=trace
///
/// # 示例
/// ```no_run
/// use tabular_import::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tabular_import=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 放行本 crate 的 debug 级日志,输出走测试捕获器;
/// 重复调用安全(多个测试共享同一进程)。
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("tabular_import=debug"))
        .with_test_writer()
        .try_init();
}
