use adb_log_extractor::prelude::*;
use adb_log_extractor::utils::{default_output_dir, log_file_name, resolve_output_dir};
use clap::Parser;
use log::{error, info};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Android IVI 日志导出工具：通过 `adb logcat -d` 导出设备日志到本地文件。
///
/// 需要 adb 位于 PATH 中（或通过 ADB_PATH 指定），且目标设备已开启 USB 调试并完成授权。
#[derive(Debug, Parser)]
#[command(name = "adb-log-extractor", about, long_about)]
struct Cli {
    /// 目标设备序列号（例如 emulator-5554）；不指定时使用第一台可用设备
    device_id: Option<String>,

    /// 日志保存目录；不指定时提示输入，默认 ~/ivi_logs
    output_directory: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(path) => {
            info!("日志导出成功: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("日志导出失败: {}", e);
            if let ADBError::DeviceNotFound(_) | ADBError::LaunchError { .. } = e {
                error!("请确认设备已连接、已授权 USB 调试并处于 'device' 状态");
                error!("'unauthorized' 或 'offline' 状态的设备无法导出日志");
                error!("可以在终端运行 'adb devices' 查看已连接设备");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ADBResult<PathBuf> {
    info!("Android IVI Log Extractor");

    let config = ADBConfig::from_env()?;
    let adb = ADB::new(Some(config.clone()));
    let target = cli.device_id.as_deref();

    if let Some(device) = target {
        info!("指定目标设备: {}", device);
    }

    // 先检查设备，再提示输入目录
    if !adb.is_ready(target) {
        return Err(ADBError::DeviceNotFound(
            target.unwrap_or("任意设备").to_string(),
        ));
    }
    info!("设备 {} 已连接并就绪", target.unwrap_or("default"));

    let default_dir = default_output_dir(&config.output_dir_name);
    let output_dir = resolve_output_dir(
        cli.output_directory.as_deref(),
        &default_dir,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )?;
    info!("使用输出目录: {}", output_dir.display());

    let file_name = log_file_name(&config.file_prefix, target, &chrono::Local::now());
    adb.extract_logcat(target, &output_dir, &file_name)
}
