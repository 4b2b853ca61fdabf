//! Builder 模式实现
//!
//! 提供链式构造 [`Kestrel`] 实例的便捷方式。

use crate::config::LinkConfig;
use crate::error::DriverError;
use crate::kestrel::Kestrel;
use std::path::PathBuf;

/// Kestrel Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use kestrel_driver::KestrelBuilder;
///
/// let link = KestrelBuilder::new("kestrel-a1")
///     .host("10.42.0.7")
///     .tx_port(23000)
///     .rx_port(24000)
///     .log_path("/tmp/kestrel_datalog.txt")
///     .open()
///     .unwrap();
/// ```
pub struct KestrelBuilder {
    name: String,
    host: Option<String>,
    tx_port: Option<u16>,
    rx_port: Option<u16>,
    log_path: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
    shutdown_timeout_ms: Option<u64>,
}

impl KestrelBuilder {
    /// 创建新的 Builder
    ///
    /// # 参数
    /// - `name`: 接口名（仅作标签，例如 "kestrel-a1"）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: None,
            tx_port: None,
            rx_port: None,
            log_path: None,
            poll_interval_ms: None,
            shutdown_timeout_ms: None,
        }
    }

    /// 设置目标主机（必填）
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// 设置控制参考发送端口（必填）
    pub fn tx_port(mut self, port: u16) -> Self {
        self.tx_port = Some(port);
        self
    }

    /// 设置反馈接收端口（必填）
    pub fn rx_port(mut self, port: u16) -> Self {
        self.rx_port = Some(port);
        self
    }

    /// 设置反馈数据日志路径（可选）
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// 设置接收轮询间隔（可选，默认 10 ms）
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    /// 设置关闭等待超时（可选，默认 1000 ms）
    pub fn shutdown_timeout_ms(mut self, ms: u64) -> Self {
        self.shutdown_timeout_ms = Some(ms);
        self
    }

    /// 构建配置并打开链路
    ///
    /// # 错误
    /// - `DriverError::InvalidConfig`: 必填项缺失
    /// - 其余同 [`Kestrel::open`]
    pub fn open(self) -> Result<Kestrel, DriverError> {
        let host = self
            .host
            .ok_or_else(|| DriverError::InvalidConfig("host is required".to_string()))?;
        let tx_port = self
            .tx_port
            .ok_or_else(|| DriverError::InvalidConfig("tx_port is required".to_string()))?;
        let rx_port = self
            .rx_port
            .ok_or_else(|| DriverError::InvalidConfig("rx_port is required".to_string()))?;

        let mut config = LinkConfig::new(self.name, host, tx_port, rx_port);
        if let Some(path) = self.log_path {
            config.log_path = path;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = self.shutdown_timeout_ms {
            config.shutdown_timeout_ms = ms;
        }

        Kestrel::open(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_host() {
        let err = KestrelBuilder::new("kestrel-a1")
            .tx_port(23000)
            .rx_port(24000)
            .open()
            .unwrap_err();
        match err {
            DriverError::InvalidConfig(msg) => assert!(msg.contains("host")),
            _ => panic!("Expected InvalidConfig"),
        }
    }

    #[test]
    fn test_builder_requires_ports() {
        let err = KestrelBuilder::new("kestrel-a1")
            .host("127.0.0.1")
            .rx_port(24000)
            .open()
            .unwrap_err();
        match err {
            DriverError::InvalidConfig(msg) => assert!(msg.contains("tx_port")),
            _ => panic!("Expected InvalidConfig"),
        }

        let err = KestrelBuilder::new("kestrel-a1")
            .host("127.0.0.1")
            .tx_port(23000)
            .open()
            .unwrap_err();
        match err {
            DriverError::InvalidConfig(msg) => assert!(msg.contains("rx_port")),
            _ => panic!("Expected InvalidConfig"),
        }
    }
}
