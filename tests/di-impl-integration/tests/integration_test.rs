//! 跨 crate 的集成测试：容器、适配器、受保护执行与失败处理链

use command_handling::{
    follow_up_queue, DrainReport, GuardOutcome, GuardedCommand, HandlerTable, PolicyHandler,
    QueueDriver,
};
use core_domain::adapters::properties;
use core_domain::{
    register_default_strategies, Angle, MoveCommand, MovingObjectAdapter, Point, UObject,
};
use di_abstractions::{
    keys, Args, Command, CommandRef, DependencyRegistry, DependencyResolver, FnCommand,
    Registration, ResolverExt, ScopeManager,
};
use di_impl::IocContainer;
use infrastructure_common::{
    CommandError, CommandErrorKind, CommandState, DependencyError, RetryPolicy, ScopeId, Settings,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_scope_scenario_through_management_commands() -> anyhow::Result<()> {
    let container = IocContainer::new();

    container
        .resolve_command(
            keys::REGISTER,
            Args::new()
                .arg("k")
                .arg(Registration::factory(|_: &Args| Ok(String::from("v")))),
        )?
        .execute()?;
    assert_eq!(*container.resolve_as::<String>("k", Args::new())?, "v");

    container
        .resolve_command(keys::NEW_SCOPE, Args::new().arg("s"))?
        .execute()?;
    container
        .resolve_command(keys::SET_CURRENT_SCOPE, Args::new().arg("s"))?
        .execute()?;
    let error = container.resolve("k", Args::new()).unwrap_err();
    assert!(matches!(error, DependencyError::NotFound { ref key } if key == "k"));

    container
        .resolve_command(
            keys::REGISTER_GLOBAL,
            Args::new().arg("k").arg(String::from("g")),
        )?
        .execute()?;
    assert_eq!(*container.resolve_as::<String>("k", Args::new())?, "g");

    container
        .resolve_command(keys::CLEAR_SCOPE, Args::new().arg("s"))?
        .execute()?;
    assert!(container.current_scope().is_root());
    // root 中的工厂重新可见
    assert_eq!(*container.resolve_as::<String>("k", Args::new())?, "v");
    Ok(())
}

#[test]
fn test_commands_resolved_from_container_run_through_retry_chain() -> anyhow::Result<()> {
    let container = IocContainer::new();
    let attempts = Arc::new(AtomicUsize::new(0));

    // 容器中注册一个前两次失败的命令工厂
    let counter = attempts.clone();
    container.register_global(
        "Radar.Sweep",
        Registration::factory(move |_: &Args| {
            let counter = counter.clone();
            let command: CommandRef = Arc::new(FnCommand::new("Radar.Sweep", move || {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(CommandError::failed("Radar.Sweep", "timeout"))
                } else {
                    Ok(())
                }
            }));
            Ok(command)
        }),
    );

    let (sender, queue) = follow_up_queue();
    let handler = PolicyHandler::retry_twice_then_log(sender).into_handler();
    let command = container.resolve_command("Radar.Sweep", Args::new())?;
    GuardedCommand::new(command, handler.clone()).execute()?;

    let report = QueueDriver::new(queue, handler).run_until_idle(16)?;
    assert_eq!(
        report,
        DrainReport {
            executed: 2,
            failed_and_handled: 1,
            remaining: 0
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_move_without_location_ends_in_log() -> anyhow::Result<()> {
    let container = IocContainer::new();
    register_default_strategies(&container);
    let resolver: Arc<dyn DependencyResolver> = Arc::new(container.clone());

    let ship = Arc::new(UObject::new());
    ship.set_property(properties::ANGLE, Angle::new(0));
    ship.set_property(properties::VELOCITY, 3_i64);
    let moving = Arc::new(MovingObjectAdapter::new(resolver, ship.clone()));
    let command: CommandRef = Arc::new(MoveCommand::new(moving));

    let (sender, mut queue) = follow_up_queue();
    let handler = PolicyHandler::retry_once_then_log(sender).into_handler();

    GuardedCommand::new(command.clone(), handler.clone()).execute()?;
    let retry = queue.try_dequeue().expect("first retry");
    assert_eq!(retry.state(), CommandState::Retried1);

    GuardedCommand::new(retry, handler).execute()?;
    let logged = queue.try_dequeue().expect("log command");
    assert_eq!(logged.state(), CommandState::Logged);
    assert!(Arc::ptr_eq(logged.original().unwrap(), &command));
    logged.execute()?;

    // 补上位置后同一个命令可以成功
    ship.set_property(properties::LOCATION, Point::new(1, 1));
    command.execute()?;
    assert_eq!(ship.get::<Point>(properties::LOCATION), Some(Point::new(4, 1)));
    Ok(())
}

#[test]
fn test_handler_table_routes_dependency_failures() -> anyhow::Result<()> {
    let container = IocContainer::new();
    let (log_sender, mut log_queue) = follow_up_queue();
    let (retry_sender, mut retry_queue) = follow_up_queue();

    let table = Arc::new(HandlerTable::with_fallback(
        PolicyHandler::log_only(log_sender).into_handler(),
    ));
    table.register(
        "Lookup",
        CommandErrorKind::Dependency,
        PolicyHandler::retry_forever(retry_sender).into_handler(),
    );

    let resolver = container.clone();
    let lookup: CommandRef = Arc::new(FnCommand::new("Lookup", move || {
        resolver.resolve("Missing.Key", Args::new())?;
        Ok(())
    }));
    GuardedCommand::new(lookup, table.clone()).execute()?;
    assert_eq!(retry_queue.try_dequeue().unwrap().state(), CommandState::Retried1);
    assert!(log_queue.try_dequeue().is_none());

    let failing: CommandRef = Arc::new(FnCommand::new("Other", || {
        Err(CommandError::failed("Other", "boom"))
    }));
    GuardedCommand::new(failing, table).execute()?;
    assert_eq!(log_queue.try_dequeue().unwrap().state(), CommandState::Logged);
    Ok(())
}

#[test]
fn test_guard_without_handler_aborts() {
    let failing: CommandRef = Arc::new(FnCommand::new("Unguarded", || {
        Err(CommandError::failed("Unguarded", "boom"))
    }));

    let error = GuardedCommand::unguarded(failing).execute().unwrap_err();
    assert_eq!(error.kind(), CommandErrorKind::HandlerNotConfigured);
}

#[test]
fn test_threads_with_own_scopes_share_one_handler() {
    const THREADS: usize = 6;

    let container = IocContainer::new();
    let (sender, queue) = follow_up_queue();
    let handler = PolicyHandler::retry_once_then_log(sender).into_handler();

    thread::scope(|s| {
        for thread_id in 0..THREADS {
            let container = &container;
            let handler = handler.clone();
            s.spawn(move || {
                let scope = ScopeId::new(format!("squadron_{}", thread_id));
                container.new_scope(&scope);
                container.set_current_scope(&scope);
                container.register_scoped("Squadron.Id", Registration::value(thread_id));

                // 只能看到自己作用域中的注册
                let seen = container
                    .resolve_as::<usize>("Squadron.Id", Args::new())
                    .unwrap();
                assert_eq!(*seen, thread_id);

                let failing: CommandRef = Arc::new(FnCommand::new("Squadron.Report", || {
                    Err(CommandError::failed("Squadron.Report", "jammed"))
                }));
                GuardedCommand::new(failing, handler).execute().unwrap();
            });
        }
    });

    assert_eq!(container.scope_count(), THREADS + 1);
    assert!(container
        .resolve("Squadron.Id", Args::new())
        .unwrap_err()
        .is_not_found());

    // 每个失败产生一个重试，重试再失败产生一个日志
    let report = QueueDriver::new(queue, handler).run_until_idle(100).unwrap();
    assert_eq!(report.executed, THREADS * 2);
    assert_eq!(report.failed_and_handled, THREADS);
    assert_eq!(report.remaining, 0);
}

#[test]
fn test_settings_drive_container_and_policy() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
[container]
trace_resolution = true

[container.globals]
"game_name" = "Space Battle"

[handling]
policy = "log_only"
max_drain_steps = 8
"#
    )?;

    let settings = Settings::load(Some(file.path()))?;
    assert_eq!(settings.handling.policy, RetryPolicy::LogOnly);

    let container = IocContainer::with_settings(settings.container.clone());
    assert_eq!(
        *container.resolve_as::<String>("game_name", Args::new())?,
        "Space Battle"
    );

    let (sender, queue) = follow_up_queue();
    let handler = PolicyHandler::new(settings.handling.policy, sender.clone()).into_handler();
    let failing: CommandRef = Arc::new(FnCommand::new("Once", || {
        Err(CommandError::failed("Once", "boom"))
    }));
    sender.enqueue(failing)?;

    let report = QueueDriver::new(queue, handler).run_until_idle(settings.handling.max_drain_steps)?;
    // 失败一次，随后执行日志命令
    assert_eq!(report.executed, 2);
    assert_eq!(report.failed_and_handled, 1);
    Ok(())
}

#[tokio::test]
async fn test_async_consumer_drains_follow_ups_from_worker() -> anyhow::Result<()> {
    let container = IocContainer::new();
    container.register_global(
        "Beacon.Ping",
        Registration::factory(|_: &Args| {
            let command: CommandRef = Arc::new(FnCommand::new("Beacon.Ping", || {
                Err(CommandError::failed("Beacon.Ping", "no echo"))
            }));
            Ok(command)
        }),
    );

    let (sender, mut queue) = follow_up_queue();
    let handler = PolicyHandler::retry_once_then_log(sender).into_handler();

    // 工作线程在自己的作用域里解析并执行命令
    let worker = {
        let container = container.clone();
        let handler = handler.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<GuardOutcome> {
            container.set_current_scope(&ScopeId::new("beacon"));
            let command = container.resolve_command("Beacon.Ping", Args::new())?;
            let outcome = GuardedCommand::new(command, handler).run()?;
            // 阻塞线程池的线程会被复用，归还前释放槽位
            container.release_current_thread();
            Ok(outcome)
        })
    };
    assert_eq!(worker.await??, GuardOutcome::Handled);
    assert_eq!(container.thread_pointer_count(), 0);

    let mut states = Vec::new();
    while let Some(command) = queue.dequeue().await {
        states.push(command.state());
        GuardedCommand::new(command, handler.clone()).run()?;
        if queue.is_empty() {
            break;
        }
    }

    assert_eq!(states, vec![CommandState::Retried1, CommandState::Logged]);
    Ok(())
}
