//! 链路配置

use std::path::PathBuf;
use std::time::Duration;

/// 默认反馈数据日志路径
pub(crate) const DEFAULT_LOG_PATH: &str = "kestrel_datalog.txt";
/// 默认接收轮询间隔（毫秒）
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
/// 默认关闭等待超时（毫秒）
pub(crate) const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 1000;

/// 链路配置
///
/// 接口名、目标地址与两个 UDP 端口为必填项，在打开时校验；
/// 其余字段有默认值。
///
/// # Example
///
/// ```
/// use kestrel_driver::LinkConfig;
///
/// let config = LinkConfig::new("kestrel-a1", "127.0.0.1", 23000, 24000);
/// assert_eq!(config.poll_interval_ms, 10);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// 接口名（仅作标签，不影响协议）
    pub name: String,
    /// 目标主机（IP 或主机名）
    pub host: String,
    /// 控制参考发送端口
    pub tx_port: u16,
    /// 反馈接收端口（本地绑定）
    pub rx_port: u16,
    /// 反馈数据日志路径
    #[cfg_attr(feature = "serde", serde(default = "default_log_path"))]
    pub log_path: PathBuf,
    /// 接收轮询间隔（毫秒）
    #[cfg_attr(feature = "serde", serde(default = "default_poll_interval_ms"))]
    pub poll_interval_ms: u64,
    /// 关闭等待超时（毫秒）
    #[cfg_attr(feature = "serde", serde(default = "default_shutdown_timeout_ms"))]
    pub shutdown_timeout_ms: u64,
}

#[cfg(feature = "serde")]
fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

#[cfg(feature = "serde")]
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

#[cfg(feature = "serde")]
fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

impl LinkConfig {
    /// 使用默认日志路径与时序参数创建配置
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        tx_port: u16,
        rx_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            tx_port,
            rx_port,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }

    /// 接收轮询间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 关闭等待超时
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = LinkConfig::new("kestrel-a1", "10.42.0.7", 23000, 24000);
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG_PATH));
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(1));
    }
}
