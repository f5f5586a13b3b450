//! # 示例应用程序
//!
//! 演示作用域 IoC 容器、接口适配器以及失败命令的重试与日志处理

use anyhow::Context;
use clap::Parser;
use command_handling::{follow_up_queue, GuardedCommand, PolicyHandler, QueueDriver};
use core_domain::adapters::properties;
use core_domain::{
    move_with_fuel, register_default_strategies, Angle, MoveCommand, MovingObjectAdapter, Point,
    RotatableObjectAdapter, RotateCommand, UObject,
};
use di_abstractions::{
    keys, Args, Command, CommandRef, DependencyResolver, FnCommand, ResolverExt, ScopeManager,
};
use di_impl::IocContainer;
use infrastructure_common::{init_tracing, CommandError, RetryPolicy, ScopeId, Settings};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Space Battle 示例应用")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖配置中的失败处理策略
    #[arg(long)]
    policy: Option<RetryPolicy>,

    /// 覆盖配置中的日志级别
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(policy) = cli.policy {
        settings.handling.policy = policy;
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    settings.validate().context("配置无效")?;

    init_tracing(&settings.logging)?;
    info!("启动 Space Battle 示例应用, 策略: {}", settings.handling.policy);

    let container = IocContainer::with_settings(settings.container.clone());
    register_default_strategies(&container);

    demonstrate_ship(&container)?;
    demonstrate_failure_handling(&settings)?;

    // 工作线程有各自的当前作用域
    let worker = container.clone();
    tokio::task::spawn_blocking(move || demonstrate_worker_scope(&worker))
        .await
        .context("工作线程异常退出")??;
    info!("主线程当前作用域: {}", container.current_scope());

    info!("应用已结束");
    Ok(())
}

fn print_ship(label: &str, ship: &UObject) {
    info!(
        "{}: location={:?}, angle={:?}, velocity={:?}, fuel={:?}",
        label,
        ship.get::<Point>(properties::LOCATION),
        ship.get::<Angle>(properties::ANGLE),
        ship.get::<i64>(properties::VELOCITY),
        ship.get::<i64>(properties::FUEL),
    );
}

/// 通过适配器移动与旋转飞船
fn demonstrate_ship(container: &IocContainer) -> anyhow::Result<()> {
    let ship = Arc::new(UObject::new());
    ship.set_property(properties::LOCATION, Point::new(12, 5));
    ship.set_property(properties::ANGLE, Angle::new(45));
    ship.set_property(properties::VELOCITY, 10_i64);
    ship.set_property(properties::FUEL, 5_i64);
    ship.set_property(properties::FUEL_BURN_RATE, 2_i64);
    print_ship("初始状态", &ship);

    let resolver: Arc<dyn DependencyResolver> = Arc::new(container.clone());
    let moving = Arc::new(MovingObjectAdapter::new(resolver.clone(), ship.clone()));
    let rotating = Arc::new(RotatableObjectAdapter::new(resolver, ship.clone()));

    MoveCommand::new(moving.clone()).execute()?;
    print_ship("移动后", &ship);

    RotateCommand::new(rotating, Angle::new(15)).execute()?;
    print_ship("旋转 15° 后", &ship);

    for round in 1..=3 {
        match move_with_fuel(ship.clone(), moving.clone()).execute() {
            Ok(()) => print_ship(&format!("第 {} 次耗油移动后", round), &ship),
            Err(error) => {
                warn!("第 {} 次耗油移动失败: {}", round, error);
                break;
            }
        }
    }

    if let Ok(name) = container.resolve_as::<String>("game_name", Args::new()) {
        info!("游戏名称: {}", name);
    }
    Ok(())
}

/// 前两次执行失败的命令交给策略处理，再由队列驱动排空
fn demonstrate_failure_handling(settings: &Settings) -> anyhow::Result<()> {
    let (sender, queue) = follow_up_queue();
    let handler = PolicyHandler::new(settings.handling.policy, sender).into_handler();

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let flaky: CommandRef = Arc::new(FnCommand::new("RadarSweep", move || {
        let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= 2 {
            return Err(CommandError::failed(
                "RadarSweep",
                format!("雷达第 {} 次扫描超时", attempt),
            ));
        }
        info!("雷达第 {} 次扫描成功", attempt);
        Ok(())
    }));

    GuardedCommand::new(flaky, handler.clone()).execute()?;

    let mut driver = QueueDriver::new(queue, handler);
    let report = driver.run_until_idle(settings.handling.max_drain_steps)?;
    info!(
        "队列排空: executed={}, failed_and_handled={}, remaining={}, attempts={}",
        report.executed,
        report.failed_and_handled,
        report.remaining,
        attempts.load(Ordering::SeqCst)
    );
    Ok(())
}

/// 通过管理命令在工作线程上切换作用域
fn demonstrate_worker_scope(container: &IocContainer) -> anyhow::Result<()> {
    let scope = ScopeId::new("fleet-alpha");

    container
        .resolve_command(keys::NEW_SCOPE, Args::new().arg(scope.clone()))?
        .execute()?;
    container
        .resolve_command(keys::SET_CURRENT_SCOPE, Args::new().arg(scope.clone()))?
        .execute()?;
    container
        .resolve_command(
            keys::REGISTER,
            Args::new().arg("Fleet.Flagship").arg(String::from("Aurora")),
        )?
        .execute()?;

    let flagship = container.resolve_as::<String>("Fleet.Flagship", Args::new())?;
    info!("作用域 {} 的旗舰: {}", container.current_scope(), flagship);

    container
        .resolve_command(keys::CLEAR_SCOPE, Args::new().arg(scope))?
        .execute()?;
    info!("清除后当前作用域: {}", container.current_scope());

    container.release_current_thread();
    Ok(())
}
