mod error;
mod config;
mod device;
mod cmd;

// 功能模块
pub mod logcat;
pub mod report;
pub mod utils;

// 导出主要类型
pub use config::{ADBConfig, ADBConfigBuilder, ENV_ADB_PATH, ENV_ADB_TIMEOUT_MS};
pub use device::{find_ready, parse_device_list, DeviceRecord, DeviceState, ADB};
pub use cmd::{CommandInvocation, CommandRunner, ExecutionResult, ExitState, ProcessRunner};
pub use error::{ADBError, ADBResult};
pub use logcat::LogFile;
pub use report::{LogReporter, MemoryReporter, Reporter, Severity};

// 便利的预导出模块
pub mod prelude {
    pub use super::{ADB, ADBConfig, ADBConfigBuilder, ADBError, ADBResult};
    pub use super::{CommandInvocation, CommandRunner, ExecutionResult, ExitState};
    pub use super::{DeviceRecord, DeviceState, LogFile};
}
