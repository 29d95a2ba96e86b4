use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::cmd::{CommandRunner, ProcessRunner};
use crate::config::ADBConfig;
use crate::error::ADBResult;
use crate::report::{LogReporter, Reporter};

/// `adb devices` 输出的标题行前缀
const DEVICE_LIST_BANNER: &str = "List of devices";

/// ADB 设备状态枚举
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    /// 已授权并在线
    Device,
    Unauthorized,
    Offline,
    Unknown(String),
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Device => write!(f, "device"),
            DeviceState::Unauthorized => write!(f, "unauthorized"),
            DeviceState::Offline => write!(f, "offline"),
            DeviceState::Unknown(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for DeviceState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "device" => DeviceState::Device,
            "unauthorized" => DeviceState::Unauthorized,
            "offline" => DeviceState::Offline,
            _ => DeviceState::Unknown(s.to_string()),
        }
    }
}

/// `adb devices` 中的一条设备记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    pub state: DeviceState,
}

impl DeviceRecord {
    pub fn new(id: &str, state: impl Into<DeviceState>) -> Self {
        Self {
            id: id.to_string(),
            state: state.into(),
        }
    }

    /// 设备是否可以导出日志
    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Device
    }
}

/// 解析 `adb devices` 的输出行
///
/// 第一行是固定标题，总是跳过。之后的空行、`*` 开头的守护进程提示以及重复的标题行
/// 都会被忽略；少于两个字段的行不产生记录。
pub fn parse_device_list<S: AsRef<str>>(lines: &[S]) -> Vec<DeviceRecord> {
    lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('*') || line.starts_with(DEVICE_LIST_BANNER) {
                return None;
            }

            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(id), Some(state)) => Some(DeviceRecord::new(id, state)),
                _ => None,
            }
        })
        .collect()
}

/// 查找第一条满足条件的就绪记录
///
/// 指定 `target` 时要求 ID 完全匹配（区分大小写）且状态为 `device`；
/// 同一 ID 的非就绪记录不算匹配，继续向后查找。
pub fn find_ready<'a>(
    records: &'a [DeviceRecord],
    target: Option<&str>,
) -> Option<&'a DeviceRecord> {
    let target = target.filter(|t| !t.is_empty());
    records
        .iter()
        .find(|record| record.is_ready() && target.map_or(true, |t| record.id == t))
}

/// ADB 主结构体
#[derive(Clone)]
pub struct ADB {
    pub config: ADBConfig,
    pub(crate) runner: Arc<dyn CommandRunner>,
    pub(crate) reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for ADB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ADB").field("config", &self.config).finish_non_exhaustive()
    }
}

impl ADB {
    /// 创建新的 ADB 实例
    pub fn new(config: Option<ADBConfig>) -> Self {
        let config = config.unwrap_or_default();
        let runner = ProcessRunner::new(config.timeout_duration());
        Self {
            config,
            runner: Arc::new(runner),
            reporter: Arc::new(LogReporter),
        }
    }

    /// 替换命令执行器
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    /// 替换诊断输出
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// 列出所有设备
    pub fn list_devices(&self) -> ADBResult<Vec<DeviceRecord>> {
        // 始终查询完整列表，不带设备选择器
        let result = self.execute(None, &["devices"])?;
        Ok(parse_device_list(&result.lines))
    }

    /// 检查设备是否就绪
    ///
    /// 未指定 `target` 时任意一台 `device` 状态的设备即可。执行失败按未就绪处理，不返回错误。
    pub fn is_ready(&self, target: Option<&str>) -> bool {
        let target = target.filter(|t| !t.is_empty());
        match target {
            Some(t) => self.reporter.info(&format!("检查 ADB 设备 (指定设备 {})...", t)),
            None => self.reporter.info("检查 ADB 设备..."),
        }

        let result = match self.execute(None, &["devices"]) {
            Ok(result) => result,
            Err(e) => {
                self.reporter.error(&format!("检查 ADB 设备时出错: {}", e));
                return false;
            }
        };

        if result.lines.len() <= 1 {
            self.reporter.info("未发现设备，'adb devices' 只返回了标题或空输出");
            return false;
        }

        let records = parse_device_list(&result.lines);
        let mut found = None;
        for record in &records {
            if !record.is_ready() {
                self.reporter
                    .info(&format!("设备 {} 存在但状态为: {}", record.id, record.state));
            } else if target.map_or(true, |t| record.id == t) {
                found = Some(record);
                break;
            }
        }

        match (found, target) {
            (Some(_), Some(t)) => {
                self.reporter.info(&format!("指定设备 {} 已连接", t));
                true
            }
            (Some(record), None) => {
                self.reporter.info(&format!("发现已连接设备: {}", record.id));
                true
            }
            (None, Some(t)) => {
                self.reporter.info(&format!("未找到处于 device 状态的指定设备 ({})", t));
                false
            }
            (None, None) => {
                self.reporter.info("未找到处于 device 状态的 ADB 设备");
                false
            }
        }
    }
}
