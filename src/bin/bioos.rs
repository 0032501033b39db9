//! BioOS 内核仿真
//!
//! 加载场景（或内置示例），按固定步长运行，输出汇总与可选的 JSON 轨迹。

use bioos_rs::sim::{
    AdvanceReport, EventKind, Observer, Progress, Scenario, SimTime, SimulationDriver, TickReport,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "bioos", about = "离散时间生物进程仿真内核")]
struct Args {
    /// 场景 JSON；不填则使用内置的两个有机体
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// 仿真时长（秒）
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// 覆盖每 tick 步长（秒）
    #[arg(long)]
    time_step: Option<f64>,

    /// 覆盖资源池容量
    #[arg(long)]
    capacity: Option<f64>,

    /// 覆盖进度报告间隔（tick）
    #[arg(long)]
    progress_every: Option<u64>,

    /// 输出 JSON 轨迹文件；不填则不生成
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// 每个 tick 之后的真实时间休眠（毫秒）
    #[arg(long, default_value_t = 0)]
    throttle_ms: u64,

    /// 不为事件投递打日志
    #[arg(long)]
    quiet_events: bool,
}

/// 命令行观察者：实时节流 + 进度输出
struct CliObserver {
    throttle: Option<Duration>,
}

impl Observer for CliObserver {
    // 处理器失败已由分发器记录，这里只负责节流
    fn on_tick(&mut self, _report: &TickReport) {
        if let Some(d) = self.throttle {
            std::thread::sleep(d);
        }
    }

    fn on_progress(&mut self, p: &Progress) {
        println!(
            "tick {} | time: {:.3}s | usage: {:.2}% | live: {}",
            p.tick,
            p.now.as_secs_f64(),
            p.usage_fraction * 100.0,
            p.live
        );
    }
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "运行失败");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo(),
    };

    let mut config = scenario.config.clone().unwrap_or_default();
    if let Some(ts) = args.time_step {
        config.time_step = ts;
    }
    if let Some(cap) = args.capacity {
        config.total_capacity = cap;
    }
    if let Some(every) = args.progress_every {
        config.progress_every = every;
    }

    let mut driver = SimulationDriver::new(config)?;
    info!("=== BioOS Booting ===");
    info!(
        version = env!("CARGO_PKG_VERSION"),
        capacity = driver.config().total_capacity,
        time_step_s = driver.step().as_secs_f64(),
        "System Ready"
    );

    if args.trace_json.is_some() {
        driver.enable_trace();
    }
    if !args.quiet_events {
        for kind in EventKind::ALL {
            driver.on(kind, move |ev| {
                info!(kind = ?ev.kind, source = %ev.source, at_s = ev.at.as_secs_f64(), "事件");
                Ok(())
            });
        }
    }

    let ids = scenario.apply(&mut driver)?;
    let created: Vec<String> = ids.iter().flatten().map(|id| id.to_string()).collect();
    println!("created organisms: {}", created.join(", "));

    let mut observer = CliObserver {
        throttle: (args.throttle_ms > 0).then(|| Duration::from_millis(args.throttle_ms)),
    };
    let started = Instant::now();
    let report = driver.run(SimTime::from_secs_f64(args.duration), &mut observer);
    let real_ms = started.elapsed().as_millis();

    print_summary(&report, real_ms);

    if let Some(path) = args.trace_json {
        if let Some(trace) = driver.take_trace() {
            trace.write_json(&path)?;
            eprintln!("wrote trace events to {}", path.display());
        }
    }
    if report.halted {
        return Err("simulation halted: clock overflow".into());
    }
    Ok(())
}

fn print_summary(report: &AdvanceReport, real_ms: u128) {
    println!(
        "done @ {:.3}s ticks={} usage={:.2}% created={} live={} handler_failures={} real_ms={}",
        report.now.as_secs_f64(),
        report.ticks,
        report.usage_fraction * 100.0,
        report.created,
        report.live,
        report.handler_failures,
        real_ms
    );
}
