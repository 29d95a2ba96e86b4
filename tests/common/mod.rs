#![allow(dead_code)]

use adb_log_extractor::prelude::*;
use adb_log_extractor::MemoryReporter;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 按子命令返回预设输出的假 adb，并记录每次调用
pub struct FakeAdb {
    pub adb: ADB,
    pub reporter: Arc<MemoryReporter>,
    pub calls: Arc<Mutex<Vec<CommandInvocation>>>,
}

impl FakeAdb {
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ran(&self, subcommand: &str) -> bool {
        self.invocations()
            .iter()
            .any(|inv| inv.args().first().map(String::as_str) == Some(subcommand))
    }
}

pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

pub fn ok(text: &str) -> ADBResult<ExecutionResult> {
    Ok(ExecutionResult::exited(lines(text), 0, Duration::from_millis(5)))
}

/// `devices` 返回 `devices`，`logcat` 返回 `logcat`
pub fn fake_adb<D, L>(devices: D, logcat: L) -> FakeAdb
where
    D: Fn() -> ADBResult<ExecutionResult> + Send + Sync + 'static,
    L: Fn() -> ADBResult<ExecutionResult> + Send + Sync + 'static,
{
    let reporter = Arc::new(MemoryReporter::new());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    let runner = move |inv: &CommandInvocation| -> ADBResult<ExecutionResult> {
        recorded.lock().unwrap().push(inv.clone());
        match inv.args().first().map(String::as_str) {
            Some("devices") => devices(),
            Some("logcat") => logcat(),
            other => panic!("unexpected adb subcommand: {:?}", other),
        }
    };

    let adb = ADB::new(None)
        .with_runner(runner)
        .with_reporter(reporter.clone());

    FakeAdb { adb, reporter, calls }
}

pub fn devices_output(text: &'static str) -> impl Fn() -> ADBResult<ExecutionResult> + Send + Sync {
    move || ok(text)
}

pub fn never_called() -> impl Fn() -> ADBResult<ExecutionResult> + Send + Sync {
    || -> ADBResult<ExecutionResult> { panic!("logcat must not run") }
}
