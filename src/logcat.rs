use crate::device::ADB;
use crate::error::{ADBError, ADBResult};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 导出的日志文件，写入后不再持有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl LogFile {
    pub fn new(dir: &Path, file_name: &str, lines: Vec<String>) -> Self {
        Self {
            path: dir.join(file_name),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 一次性写入全部内容，覆盖已存在的文件
    pub fn write(self) -> ADBResult<PathBuf> {
        fs::write(&self.path, self.lines.join("\n")).map_err(|e| {
            ADBError::FileError(format!("无法写入日志文件 {}: {}", self.path.display(), e))
        })?;
        Ok(self.path)
    }
}

/// 确保输出目录存在，必要时递归创建
///
/// 返回目录是否为新创建的。
pub fn ensure_output_dir(dir: &Path) -> ADBResult<bool> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ADBError::FileError(format!(
                "指定的路径不是目录: {}",
                dir.display()
            )));
        }
        return Ok(false);
    }

    fs::create_dir_all(dir).map_err(|e| {
        ADBError::FileError(format!("无法创建输出目录 {}: {}", dir.display(), e))
    })?;
    Ok(true)
}

impl ADB {
    /// 使用 `logcat -d` 导出日志并保存到 `output_dir/file_name`
    ///
    /// 设备未就绪时直接返回 `DeviceNotFound`，不会执行导出命令。
    pub fn extract_logcat(
        &self,
        target: Option<&str>,
        output_dir: &Path,
        file_name: &str,
    ) -> ADBResult<PathBuf> {
        let target = target.filter(|t| !t.is_empty());
        self.reporter.info(&format!(
            "准备导出设备 {} 的 logcat",
            target.unwrap_or("default")
        ));

        if !self.is_ready(target) {
            self.reporter.error("无法导出 logcat：设备未连接或不处于 device 状态");
            return Err(ADBError::DeviceNotFound(
                target.unwrap_or("任意设备").to_string(),
            ));
        }

        let result = self.execute(target, &["logcat", "-d"])?;
        self.reporter
            .info(&format!("已获取 logcat 数据，共 {} 行", result.lines.len()));

        match ensure_output_dir(output_dir) {
            Ok(true) => self
                .reporter
                .info(&format!("已创建输出目录: {}", output_dir.display())),
            Ok(false) => debug!("输出目录已存在: {}", output_dir.display()),
            Err(e) => {
                self.reporter.error(&e.to_string());
                return Err(e);
            }
        }

        let path = LogFile::new(output_dir, file_name, result.lines)
            .write()
            .map_err(|e| {
                self.reporter.error(&e.to_string());
                e
            })?;

        self.reporter.info(&format!("日志已导出到: {}", path.display()));
        Ok(path)
    }
}
