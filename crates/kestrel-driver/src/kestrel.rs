//! 链路 API 模块
//!
//! 提供对外的 [`Kestrel`] 结构体，封装后台接收线程和状态同步细节。

use crate::clock::ElapsedClock;
use crate::config::LinkConfig;
use crate::error::DriverError;
use crate::rx::rx_loop;
use crate::state::{FeedbackState, LinkContext, MetricsSnapshot};
use kestrel_link::{UdpRxSocket, UdpTxLink};
use kestrel_protocol::{CONTROL_REF_PACKET_SIZE, ControlMode, ControlRefPacket, NUM_ARM_JOINTS};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 关闭序列中置位终止标志后的宽限时间
const SHUTDOWN_GRACE: Duration = Duration::from_millis(10);
/// 关闭序列中轮询 `rx_terminated` 的间隔
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Kestrel 双臂 UDP 控制链路（对外 API）
///
/// 一个实例对应一条到双臂控制端（真机或模拟器）的链路：
/// - 六种控制模式的发送操作，每次调用发出恰好一个数据报
/// - 后台线程持续接收反馈，最新快照通过 [`feedback`](Self::feedback)
///   无锁读取
/// - [`close`](Self::close) 提供有界时间的确定性关闭序列
///
/// # Example
///
/// ```no_run
/// use kestrel_driver::{Kestrel, LinkConfig};
///
/// # fn main() -> Result<(), kestrel_driver::DriverError> {
/// let config = LinkConfig::new("kestrel-a1", "10.42.0.7", 23000, 24000);
/// let mut link = Kestrel::open(&config)?;
///
/// link.send_joint_positions(&[0.0; 4], &[0.0; 4], 0.25)?;
/// let fb = link.feedback();
/// println!("left TCP: {:?}", fb.feedback.p_l);
///
/// link.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Kestrel {
    /// 接口名（仅标签）
    name: String,
    /// 共享状态上下文
    ctx: Arc<LinkContext>,
    /// 经过时间时钟（接口创建时启动）
    clock: ElapsedClock,
    /// 发送链路（关闭时最先释放；接收 socket 归接收线程所有）
    tx: Option<UdpTxLink>,
    /// 接收线程句柄
    rx_thread: Option<JoinHandle<()>>,
    /// 关闭等待超时
    shutdown_timeout: Duration,
    /// 已执行过关闭序列
    closed: bool,
}

impl std::fmt::Debug for Kestrel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kestrel")
            .field("name", &self.name)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Kestrel {
    /// 打开链路
    ///
    /// 解析目标主机、创建发送 socket、绑定接收端口并启动后台
    /// 接收线程。只有三者全部成功才返回句柄。
    ///
    /// # 错误
    /// - `DriverError::InvalidConfig`: 必填配置项缺失
    /// - `LinkError::Resolve`: 目标地址解析失败
    /// - `LinkError::Socket`: 发送 socket 创建失败
    /// - `LinkError::Bind`: 接收端口绑定失败
    pub fn open(config: &LinkConfig) -> Result<Self, DriverError> {
        if config.name.is_empty() {
            return Err(DriverError::InvalidConfig("name is empty".to_string()));
        }
        if config.host.is_empty() {
            return Err(DriverError::InvalidConfig("host is empty".to_string()));
        }

        let clock = ElapsedClock::start();
        let tx = UdpTxLink::connect(&config.host, config.tx_port)?;

        // 绑定在这里完成，错误同步返回；socket 随后移交接收线程，
        // 此后只由接收线程释放。
        let rx_socket = UdpRxSocket::bind(config.rx_port)?;

        let ctx = Arc::new(LinkContext::new());
        let ctx_rx = ctx.clone();
        let log_path = config.log_path.clone();
        let poll_interval = config.poll_interval();

        let rx_thread = std::thread::Builder::new()
            .name("udp-rx".into())
            .spawn(move || {
                rx_loop(rx_socket, ctx_rx, clock, log_path, poll_interval);
            })
            .map_err(|e| DriverError::RxThread(e.to_string()))?;

        info!(
            name = %config.name,
            host = %config.host,
            tx_port = config.tx_port,
            rx_port = config.rx_port,
            "link opened"
        );

        Ok(Self {
            name: config.name.clone(),
            ctx,
            clock,
            tx: Some(tx),
            rx_thread: Some(rx_thread),
            shutdown_timeout: config.shutdown_timeout(),
            closed: false,
        })
    }

    /// 发送关节位置参考 (rad)
    ///
    /// # 参数
    /// - `left` / `right`: 左右臂 4 个关节的参考位置
    /// - `play_time`: 从当前位姿插值到参考位姿的时间（秒）
    pub fn send_joint_positions(
        &self,
        left: &[f32; NUM_ARM_JOINTS],
        right: &[f32; NUM_ARM_JOINTS],
        play_time: f32,
    ) -> Result<(), DriverError> {
        self.send_reference(ControlRefPacket::joint_space(
            ControlMode::JointPosition,
            left,
            right,
            play_time,
        ))
    }

    /// 发送关节速度参考 (rad/s)
    pub fn send_joint_speeds(
        &self,
        left: &[f32; NUM_ARM_JOINTS],
        right: &[f32; NUM_ARM_JOINTS],
        play_time: f32,
    ) -> Result<(), DriverError> {
        self.send_reference(ControlRefPacket::joint_space(
            ControlMode::JointSpeed,
            left,
            right,
            play_time,
        ))
    }

    /// 发送关节力矩参考 (Nm)
    pub fn send_joint_torques(
        &self,
        left: &[f32; NUM_ARM_JOINTS],
        right: &[f32; NUM_ARM_JOINTS],
        play_time: f32,
    ) -> Result<(), DriverError> {
        self.send_reference(ControlRefPacket::joint_space(
            ControlMode::JointTorque,
            left,
            right,
            play_time,
        ))
    }

    /// 发送 TCP 位置参考 (m)
    pub fn send_tcp_positions(
        &self,
        left: &[f32; 3],
        right: &[f32; 3],
        play_time: f32,
    ) -> Result<(), DriverError> {
        self.send_reference(ControlRefPacket::tcp_space(
            ControlMode::TcpPosition,
            left,
            right,
            play_time,
        ))
    }

    /// 发送 TCP 速度参考 (m/s)
    pub fn send_tcp_velocities(
        &self,
        left: &[f32; 3],
        right: &[f32; 3],
        play_time: f32,
    ) -> Result<(), DriverError> {
        self.send_reference(ControlRefPacket::tcp_space(
            ControlMode::TcpVelocity,
            left,
            right,
            play_time,
        ))
    }

    /// 发送 TCP 力参考 (N)
    pub fn send_tcp_forces(
        &self,
        left: &[f32; 3],
        right: &[f32; 3],
        play_time: f32,
    ) -> Result<(), DriverError> {
        self.send_reference(ControlRefPacket::tcp_space(
            ControlMode::TcpForce,
            left,
            right,
            play_time,
        ))
    }

    /// 内部方法：打时间戳、编码并发出一个数据报
    ///
    /// 不排队、不合批：每次调用恰好一次发送系统调用，
    /// 节奏控制是调用方的责任。
    fn send_reference(&self, mut packet: ControlRefPacket) -> Result<(), DriverError> {
        let tx = self.tx.as_ref().ok_or(DriverError::NotOpen)?;
        packet.time_stamp = self.clock.elapsed();

        let mut buf = [0u8; CONTROL_REF_PACKET_SIZE];
        tx.send(packet.encode(&mut buf))?;
        Ok(())
    }

    /// 获取最新反馈快照（无锁，纳秒级返回）
    ///
    /// # 性能
    /// - 无锁读取（ArcSwap::load）
    /// - 返回快照副本，读取方永远看到一致的完整记录
    pub fn feedback(&self) -> FeedbackState {
        self.ctx.feedback.load().as_ref().clone()
    }

    /// 是否至少收到过一个有效反馈数据报
    pub fn has_feedback(&self) -> bool {
        self.ctx.feedback_received.load(Ordering::Acquire)
    }

    /// 自接口创建以来的经过时间（秒）
    pub fn elapsed_time(&self) -> f32 {
        self.clock.elapsed()
    }

    /// 距最近一次接受反馈的时间（秒）
    ///
    /// 协议没有心跳包，静默与停摆无法区分；
    /// 调用方用该值推断反馈是否过期。
    pub fn time_since_last_update(&self) -> f32 {
        self.clock.elapsed() - self.ctx.feedback.load().t_last_update
    }

    /// 获取链路计数器快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 接口名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 等待收到第一个有效反馈（用于初始化）
    ///
    /// 在控制循环开始前调用，避免把全零初始状态当作真实反馈。
    ///
    /// # 错误
    /// - `DriverError::Timeout`: 超时未收到反馈
    pub fn wait_for_feedback(&self, timeout: Duration) -> Result<(), DriverError> {
        let start = Instant::now();
        while !self.has_feedback() {
            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }

    /// 关闭链路（有界时间）
    ///
    /// 序列：置位终止标志 → 等一个宽限间隔 → 释放发送 socket
    /// （接收 socket 只由接收线程释放）→ 轮询等待接收线程确认退出。
    ///
    /// 幂等：重复调用是确定性的空操作，返回 `Ok(())`。
    ///
    /// # 错误
    /// - `DriverError::ShutdownTimeout`: 接收线程未在超时内确认退出。
    ///   非致命，调用方仍可继续，但接收线程可能被泄漏。
    pub fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.ctx.terminate.store(true, Ordering::Release);
        std::thread::sleep(SHUTDOWN_GRACE);

        // 释放发送 socket
        self.tx = None;

        if wait_flag(&self.ctx.rx_terminated, self.shutdown_timeout, SHUTDOWN_POLL) {
            if let Some(handle) = self.rx_thread.take() {
                // rx_terminated 已置位，线程即将/已经退出，join 不会久等
                let _ = handle.join();
            }
            info!(name = %self.name, "link closed");
            Ok(())
        } else {
            warn!(
                name = %self.name,
                timeout = ?self.shutdown_timeout,
                "RX thread did not confirm termination"
            );
            Err(DriverError::ShutdownTimeout)
        }
    }
}

impl Drop for Kestrel {
    fn drop(&mut self) {
        if !self.closed
            && let Err(e) = self.close()
        {
            error!(name = %self.name, error = %e, "link shutdown failed during drop");
        }
    }
}

/// 轮询等待一个标志置位
///
/// 每隔 `poll` 检查一次，直到标志置位或 `timeout` 耗尽。
/// 返回标志最终是否置位。
fn wait_flag(flag: &AtomicBool, timeout: Duration, poll: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if flag.load(Ordering::Acquire) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(poll);
    }
}
