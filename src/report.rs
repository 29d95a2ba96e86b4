use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// 诊断消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// 面向操作员的诊断输出
///
/// 所有进度与错误提示都经过这里，测试可以替换为 [`MemoryReporter`] 断言消息内容。
pub trait Reporter: Send + Sync {
    fn report(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.report(Severity::Info, message);
    }

    fn error(&self, message: &str) {
        self.report(Severity::Error, message);
    }
}

/// 转发到 `log` 门面的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!("{}", message),
            Severity::Error => error!("{}", message),
        }
    }
}

/// 在内存中记录消息
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录消息的快照
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// 是否存在包含 `needle` 的指定级别消息
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(s, msg)| *s == severity && msg.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, severity: Severity, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((severity, message.to_string()));
        }
    }
}
