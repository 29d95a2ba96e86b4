use crate::error::{ADBError, ADBResult};
use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// 错误信息中展示的输出上限（字符数）
pub const MAX_DISPLAY_OUTPUT_CHARS: usize = 1000;

/// 日志文件名中的时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("文件名过滤正则无效"));

/// 将输出行拼接后截断到 [`MAX_DISPLAY_OUTPUT_CHARS`] 个字符，仅用于展示
pub fn truncate_output<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    match joined.char_indices().nth(MAX_DISPLAY_OUTPUT_CHARS) {
        Some((cut, _)) => format!("{}... (output truncated)", &joined[..cut]),
        None => joined,
    }
}

/// 把设备 ID 转换为可用于文件名的形式；未指定设备时为 `default`
pub fn sanitize_device_id(device: Option<&str>) -> String {
    match device.filter(|d| !d.is_empty()) {
        Some(id) => UNSAFE_FILENAME_CHARS.replace_all(id, "_").into_owned(),
        None => "default".to_string(),
    }
}

/// 生成日志文件名：`<prefix>_<device>_<yyyyMMdd_HHmmss>.txt`
pub fn log_file_name<Tz>(prefix: &str, device: Option<&str>, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}.txt",
        prefix,
        sanitize_device_id(device),
        at.format(TIMESTAMP_FORMAT)
    )
}

/// 用户主目录下的默认输出目录
pub fn default_output_dir(dir_name: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(dir_name)
}

/// 确定输出目录
///
/// 参数非空时直接使用；否则在 `prompt_out` 上提示，从 `input` 读取一行，
/// 空输入或 EOF 使用 `default`。
pub fn resolve_output_dir<R, W>(
    arg: Option<&Path>,
    default: &Path,
    input: &mut R,
    prompt_out: &mut W,
) -> ADBResult<PathBuf>
where
    R: BufRead,
    W: Write,
{
    if let Some(path) = arg.filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty()) {
        return Ok(path.to_path_buf());
    }

    write!(
        prompt_out,
        "Enter the directory to save logs (default: {}): ",
        default.display()
    )?;
    prompt_out.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| ADBError::ConfigError(format!("读取输出目录失败: {}", e)))?;

    let answer = answer.trim();
    if answer.is_empty() {
        Ok(default.to_path_buf())
    } else {
        Ok(PathBuf::from(answer))
    }
}
