//! 宏命令

use di_abstractions::{Command, CommandRef};
use infrastructure_common::CommandError;

/// 依次执行一组命令，遇到第一个失败即停止
///
/// 普通失败包装为宏命令自身的 [`CommandError::ExecutionFailed`]，
/// 致命错误原样传播。
pub struct MacroCommand {
    name: String,
    commands: Vec<CommandRef>,
}

impl MacroCommand {
    /// 以默认名称创建
    pub fn new(commands: Vec<CommandRef>) -> Self {
        Self::named("MacroCommand", commands)
    }

    /// 指定名称，便于按名称配置异常处理器
    pub fn named(name: impl Into<String>, commands: Vec<CommandRef>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    /// 子命令
    pub fn commands(&self) -> &[CommandRef] {
        &self.commands
    }

    /// 子命令数量
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// 是否没有子命令
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for MacroCommand {
    fn execute(&self) -> Result<(), CommandError> {
        for command in &self.commands {
            if let Err(error) = command.execute() {
                if error.is_fatal() {
                    return Err(error);
                }
                return Err(CommandError::failed(self.name.as_str(), error));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::FnCommand;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>, fail: bool) -> CommandRef {
        let counter = counter.clone();
        Arc::new(FnCommand::new("step", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(CommandError::failed("step", "no fuel"))
            } else {
                Ok(())
            }
        }))
    }

    #[test]
    fn test_runs_all_commands() {
        let counter = Arc::new(AtomicUsize::new(0));
        let command = MacroCommand::new(vec![
            counting(&counter, false),
            counting(&counter, false),
            counting(&counter, false),
        ]);

        assert_eq!(command.len(), 3);
        assert!(command.execute().is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let command = MacroCommand::named(
            "MoveWithFuel",
            vec![
                counting(&counter, false),
                counting(&counter, true),
                counting(&counter, false),
            ],
        );

        let error = command.execute().unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(matches!(
            error,
            CommandError::ExecutionFailed { ref command, .. } if command == "MoveWithFuel"
        ));
    }

    #[test]
    fn test_fatal_error_passes_through() {
        let fatal: CommandRef = Arc::new(FnCommand::new("enqueue", || {
            Err(CommandError::QueueUnavailable)
        }));
        let command = MacroCommand::new(vec![fatal]);
        assert!(matches!(command.execute(), Err(CommandError::QueueUnavailable)));
    }

    #[test]
    fn test_empty_macro_succeeds() {
        let command = MacroCommand::new(Vec::new());
        assert!(command.is_empty());
        assert!(command.execute().is_ok());
    }
}
