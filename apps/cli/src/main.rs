//! # Kestrel CLI
//!
//! 示例轨迹驱动程序：打开双臂 UDP 链路，以固定频率发送正弦关节
//! 位置参考，同时周期性打印最新反馈，结束后执行有界时间的关闭。
//!
//! ```bash
//! # 直接指定目标
//! kestrel-cli --host 10.42.0.7 --tx-port 23000 --rx-port 24000
//!
//! # 或从 TOML 配置文件加载链路参数
//! kestrel-cli --config kestrel.toml --duration-sec 30
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use kestrel_driver::{Kestrel, LinkConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "kestrel-cli")]
#[command(about = "Sinusoidal trajectory driver for Kestrel dual arms", long_about = None)]
#[command(version)]
struct Args {
    /// 目标主机（双臂控制端 IP 或主机名）
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// 控制参考发送端口
    #[arg(long, default_value = "23000")]
    tx_port: u16,

    /// 反馈接收端口
    #[arg(long, default_value = "24000")]
    rx_port: u16,

    /// TOML 配置文件（设置后覆盖 host/端口/日志路径参数）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 反馈数据日志路径
    #[arg(long, default_value = "kestrel_datalog.txt")]
    log_path: PathBuf,

    /// 轨迹时长（秒）
    #[arg(long, default_value = "10.0")]
    duration_sec: f64,

    /// 发送频率（Hz）
    #[arg(long, default_value = "50.0")]
    rate_hz: f64,

    /// 每个参考的插值时间（秒）
    #[arg(long, default_value = "0.25")]
    play_time: f32,
}

/// 正弦轨迹的关节振幅（度）
const AMPLITUDE_LEFT_DEG: [f64; 4] = [-30.0, 10.0, -45.0, -60.0];
const AMPLITUDE_RIGHT_DEG: [f64; 4] = [-30.0, -10.0, 45.0, -60.0];
/// 正弦轨迹频率（Hz）
const TRAJECTORY_FREQ_HZ: f64 = 0.25;

fn load_config(args: &Args) -> Result<LinkConfig> {
    match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("could not parse config file {}", path.display()))
        },
        None => {
            let mut config = LinkConfig::new("kestrel-a1", &args.host, args.tx_port, args.rx_port);
            config.log_path = args.log_path.clone();
            Ok(config)
        },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    // Ctrl-C 提前结束轨迹，仍走正常关闭序列
    let running = Arc::new(AtomicBool::new(true));
    let running_handler = running.clone();
    ctrlc::set_handler(move || {
        running_handler.store(false, Ordering::Relaxed);
    })
    .context("could not install Ctrl-C handler")?;

    let mut link = Kestrel::open(&config)?;
    info!(
        name = link.name(),
        host = %config.host,
        rate_hz = args.rate_hz,
        duration_sec = args.duration_sec,
        "starting sinusoidal joint-position trajectory"
    );

    let period = Duration::from_secs_f64(1.0 / args.rate_hz);
    let mut left = [0.0f32; 4];
    let mut right = [0.0f32; 4];
    let mut next_report = 1.0f32;

    while running.load(Ordering::Relaxed) && (link.elapsed_time() as f64) < args.duration_sec {
        let t = link.elapsed_time() as f64;
        let s = (2.0 * std::f64::consts::PI * TRAJECTORY_FREQ_HZ * t).sin();
        for k in 0..4 {
            left[k] = (AMPLITUDE_LEFT_DEG[k].to_radians() * s) as f32;
            right[k] = (AMPLITUDE_RIGHT_DEG[k].to_radians() * s) as f32;
        }

        if let Err(e) = link.send_joint_positions(&left, &right, args.play_time) {
            warn!(error = %e, "reference send failed");
        }

        if link.has_feedback() && link.elapsed_time() >= next_report {
            let fb = link.feedback();
            info!(
                t = fb.t_last_update as f64,
                dt = fb.dt_update as f64,
                p_l = ?fb.feedback.p_l,
                q_l = ?fb.feedback.q_l,
                "feedback"
            );
            next_report += 1.0;
        }

        spin_sleep::sleep(period);
    }

    let metrics = link.metrics();
    info!(
        rx_packets = metrics.rx_packets,
        rx_dropped = metrics.rx_dropped_bad_size,
        "trajectory finished"
    );

    match link.close() {
        Ok(()) => info!("link closed cleanly"),
        Err(e) => warn!(error = %e, "link shutdown reported an anomaly"),
    }

    Ok(())
}
