use crate::device::ADB;
use crate::error::{ADBError, ADBResult};
use log::{debug, trace, warn};
use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

// 等待进程退出时的轮询间隔
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 一次外部命令调用，构建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: PathBuf,
    device: Option<String>,
    args: Vec<String>,
}

impl CommandInvocation {
    /// 创建调用；`args` 不能为空，空字符串的设备选择器视为未指定
    pub fn new<S: AsRef<str>>(
        program: impl Into<PathBuf>,
        device: Option<&str>,
        args: &[S],
    ) -> ADBResult<Self> {
        if args.is_empty() {
            return Err(ADBError::ConfigError("ADB 命令参数不能为空".to_string()));
        }

        Ok(Self {
            program: program.into(),
            device: device.filter(|d| !d.is_empty()).map(str::to_string),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// 程序名之后的完整参数列表，`-s <device>` 位于最前
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if let Some(device) = &self.device {
            argv.push("-s".to_string());
            argv.push(device.clone());
        }
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.argv() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// 进程结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// 进程退出；被信号终止时为 -1
    Exited(i32),
    TimedOut,
}

/// 一次执行捕获的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// stdout/stderr 合并后的输出行，保持输出顺序
    pub lines: Vec<String>,
    pub state: ExitState,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn exited(lines: Vec<String>, code: i32, elapsed: Duration) -> Self {
        Self {
            lines,
            state: ExitState::Exited(code),
            elapsed,
        }
    }

    pub fn timed_out(lines: Vec<String>, elapsed: Duration) -> Self {
        Self {
            lines,
            state: ExitState::TimedOut,
            elapsed,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        self.state == ExitState::TimedOut
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.state {
            ExitState::Exited(code) => Some(code),
            ExitState::TimedOut => None,
        }
    }

    /// 将非成功的结束方式转换为对应错误
    pub fn into_success(
        self,
        invocation: &CommandInvocation,
        timeout: Duration,
    ) -> ADBResult<ExecutionResult> {
        match self.state {
            ExitState::Exited(0) => Ok(self),
            ExitState::Exited(code) => Err(ADBError::NonZeroExit {
                code,
                command: invocation.to_string(),
                output: self.lines,
            }),
            ExitState::TimedOut => Err(ADBError::TimeoutError {
                command: invocation.to_string(),
                duration: timeout,
            }),
        }
    }
}

/// 外部命令执行接口
///
/// 真实实现是 [`ProcessRunner`]；测试可以直接传入闭包。
pub trait CommandRunner: Send + Sync {
    /// 执行一次调用。进程无法启动时返回 `LaunchError`，
    /// 超时与非零退出通过 [`ExitState`] 表达。
    fn run(&self, invocation: &CommandInvocation) -> ADBResult<ExecutionResult>;
}

impl<F> CommandRunner for F
where
    F: Fn(&CommandInvocation) -> ADBResult<ExecutionResult> + Send + Sync,
{
    fn run(&self, invocation: &CommandInvocation) -> ADBResult<ExecutionResult> {
        self(invocation)
    }
}

/// 启动真实进程的执行器
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &CommandInvocation) -> ADBResult<ExecutionResult> {
        let start = Instant::now();
        let deadline = start + self.timeout;

        let launch_error = |e: io::Error| ADBError::LaunchError {
            command: invocation.to_string(),
            message: e.to_string(),
        };

        // stdout 与 stderr 写入同一个管道，保持进程写出的顺序
        let (reader, writer) = io::pipe().map_err(launch_error)?;
        let mut child = {
            let mut command = Command::new(invocation.program());
            command
                .args(invocation.argv())
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(launch_error)?)
                .stderr(writer);
            // command 离开作用域时关闭父进程持有的写端
            command.spawn().map_err(launch_error)?
        };

        let (sender, receiver) = mpsc::channel();
        spawn_line_reader(reader, sender);

        let mut lines = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(remaining) {
                Ok(line) => lines.push(line),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    kill_child(&mut child, invocation);
                    return Ok(ExecutionResult::timed_out(lines, start.elapsed()));
                }
            }
        }

        // 输出流已关闭，在剩余时间内等待退出
        loop {
            let status = child.try_wait().map_err(|e| {
                ADBError::CommandError(format!("等待 {} 退出失败: {}", invocation, e))
            })?;

            if let Some(status) = status {
                trace!("{} 退出: {:?}", invocation, status);
                return Ok(ExecutionResult::exited(lines, exit_code(status), start.elapsed()));
            }

            let now = Instant::now();
            if now >= deadline {
                kill_child(&mut child, invocation);
                return Ok(ExecutionResult::timed_out(lines, start.elapsed()));
            }
            thread::sleep(EXIT_POLL_INTERVAL.min(deadline - now));
        }
    }
}

fn spawn_line_reader<R>(stream: R, sender: Sender<String>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if sender.send(decode_line(&buf)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!("读取命令输出失败: {}", e);
                    break;
                }
            }
        }
    });
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn kill_child(child: &mut std::process::Child, invocation: &CommandInvocation) {
    if let Err(e) = child.kill() {
        warn!("终止超时进程 {} 失败: {}", invocation, e);
    }
    // 回收进程，避免僵尸进程
    let _ = child.wait();
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

impl ADB {
    /// 构建调用对象，程序路径取自配置
    pub fn invocation(
        &self,
        device: Option<&str>,
        args: &[&str],
    ) -> ADBResult<CommandInvocation> {
        CommandInvocation::new(&self.config.path, device, args)
    }

    /// 执行 ADB 命令并返回完整输出
    ///
    /// 只尝试一次，不重试。超时返回 `TimeoutError`，非零退出返回 `NonZeroExit`。
    pub fn execute(&self, device: Option<&str>, args: &[&str]) -> ADBResult<ExecutionResult> {
        let invocation = self.invocation(device, args)?;
        self.reporter.info(&format!("执行 ADB 命令: {}", invocation));

        let result = self.runner.run(&invocation).map_err(|e| {
            self.reporter.error(&e.to_string());
            e
        })?;

        match result.into_success(&invocation, self.config.timeout_duration()) {
            Ok(result) => {
                self.reporter.info("ADB 命令执行成功");
                debug!("{} 返回 {} 行，耗时 {:?}", invocation, result.lines.len(), result.elapsed);
                Ok(result)
            }
            Err(e) => {
                self.reporter.error(&e.to_string());
                Err(e)
            }
        }
    }
}
