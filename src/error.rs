use thiserror::Error;
use std::time::Duration;

use crate::utils::truncate_output;

/// 日志导出相关的错误类型
#[derive(Debug, Error)]
pub enum ADBError {
    /// ADB 进程无法启动（找不到可执行文件、权限不足等）
    #[error("无法启动 ADB 命令 `{command}`: {message}")]
    LaunchError {
        command: String,
        message: String,
    },

    /// 超时错误，进程已被强制终止
    #[error("ADB 命令超时 ({duration:?}): {command}")]
    TimeoutError {
        command: String,
        duration: Duration,
    },

    /// 进程以非零状态退出，`output` 保留完整输出
    #[error("ADB 命令失败，退出码 {code}: {command}\n输出:\n{}", truncate_output(.output))]
    NonZeroExit {
        code: i32,
        command: String,
        output: Vec<String>,
    },

    /// 等待进程时出错
    #[error("ADB 命令错误: {0}")]
    CommandError(String),

    /// 没有处于 device 状态的设备
    #[error("设备不存在或未就绪: {0}")]
    DeviceNotFound(String),

    /// 文件操作错误
    #[error("文件操作错误: {0}")]
    FileError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for ADBError {
    fn from(error: std::io::Error) -> Self {
        ADBError::FileError(error.to_string())
    }
}

// 添加结果类型别名简化使用
pub type ADBResult<T> = Result<T, ADBError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_display_truncates_long_output() {
        let err = ADBError::NonZeroExit {
            code: 1,
            command: "adb logcat -d".to_string(),
            output: vec!["x".repeat(1500)],
        };

        let rendered = err.to_string();
        assert!(rendered.contains("退出码 1"));
        assert!(rendered.ends_with("... (output truncated)"));
        assert!(!rendered.contains(&"x".repeat(1001)));

        // 完整输出仍然保留在错误中
        if let ADBError::NonZeroExit { output, .. } = err {
            assert_eq!(output[0].len(), 1500);
        }
    }

    #[test]
    fn io_error_becomes_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(ADBError::from(io), ADBError::FileError(_)));
    }
}
