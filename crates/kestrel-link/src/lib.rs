//! # Kestrel UDP Link Layer
//!
//! UDP 传输适配层，提供统一的数据报发送/接收抽象。
//!
//! 发送端与接收端各自持有独立的 socket：
//! - [`UdpTxLink`]: 发送 socket，目标地址在创建时解析并固定
//! - [`UdpRxSocket`]: 接收 socket，绑定本地端口，非阻塞轮询
//!
//! 一个 UDP 数据报即一条固定长度记录，本层不做重传、确认或分片。

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use thiserror::Error;
use tracing::debug;

/// 链路层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    /// 目标地址解析失败
    #[error("Could not resolve host '{host}'")]
    Resolve { host: String },

    /// 发送 socket 创建失败
    #[error("Could not create UDP socket: {0}")]
    Socket(#[source] std::io::Error),

    /// 接收端口绑定失败
    #[error("Could not bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// 数据报发送失败（传输错误）
    #[error("Could not send datagram: {0}")]
    Send(#[source] std::io::Error),

    /// 数据报被截断（实际发送字节数少于期望）
    #[error("Short write: expected {expected} bytes, sent {sent}")]
    ShortWrite { expected: usize, sent: usize },

    /// 接收失败（非 WouldBlock 的 socket 错误）
    #[error("Could not receive datagram: {0}")]
    Recv(#[source] std::io::Error),
}

/// 解析主机名 + 端口为 socket 地址
///
/// 取解析结果中的第一个地址（与目标端单播通信，一个即够）。
pub fn resolve_host(host: &str, port: u16) -> Result<SocketAddr, LinkError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|_| LinkError::Resolve {
            host: host.to_string(),
        })?
        .next()
        .ok_or_else(|| LinkError::Resolve {
            host: host.to_string(),
        })
}

/// 发送链路：固定目标地址的 UDP 发送 socket
///
/// 每次 [`send`](UdpTxLink::send) 调用发出恰好一个数据报，
/// 不排队、不合批、不限速；节奏控制是调用方的责任。
pub struct UdpTxLink {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl UdpTxLink {
    /// 创建发送链路
    ///
    /// 解析 `host`，创建绑定到任意本地端口的数据报 socket，
    /// 并把 `host:port` 固定为之后所有发送的目标。
    ///
    /// # 错误
    /// - `LinkError::Resolve`: 主机名解析失败
    /// - `LinkError::Socket`: socket 创建失败
    pub fn connect(host: &str, port: u16) -> Result<Self, LinkError> {
        let dest = resolve_host(host, port)?;
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(LinkError::Socket)?;
        debug!(%dest, "UDP tx link ready");
        Ok(Self { socket, dest })
    }

    /// 发送一个完整数据报
    ///
    /// # 错误
    /// - `LinkError::Send`: 传输失败
    /// - `LinkError::ShortWrite`: 发送字节数少于 `data.len()`
    pub fn send(&self, data: &[u8]) -> Result<(), LinkError> {
        let sent = self.socket.send_to(data, self.dest).map_err(LinkError::Send)?;
        if sent != data.len() {
            return Err(LinkError::ShortWrite {
                expected: data.len(),
                sent,
            });
        }
        Ok(())
    }

    /// 固定的发送目标地址
    pub fn dest(&self) -> SocketAddr {
        self.dest
    }
}

/// 接收 socket：绑定本地端口的非阻塞 UDP socket
#[derive(Debug)]
pub struct UdpRxSocket {
    socket: UdpSocket,
    port: u16,
}

impl UdpRxSocket {
    /// 绑定本地接收端口并切换到非阻塞模式
    ///
    /// # 错误
    /// - `LinkError::Bind`: 端口绑定或非阻塞设置失败
    pub fn bind(port: u16) -> Result<Self, LinkError> {
        let socket = UdpSocket::bind(("0.0.0.0", port))
            .map_err(|e| LinkError::Bind { port, source: e })?;
        socket
            .set_nonblocking(true)
            .map_err(|e| LinkError::Bind { port, source: e })?;
        // 端口 0 表示由系统分配，记录实际绑定到的端口
        let port = socket.local_addr().map(|a| a.port()).unwrap_or(port);
        debug!(port, "UDP rx socket bound");
        Ok(Self { socket, port })
    }

    /// 尝试接收一个数据报（非阻塞）
    ///
    /// # 返回
    /// - `Ok(Some(len))`: 收到一个 `len` 字节的数据报，内容在 `buf[..len]`
    /// - `Ok(None)`: 当前没有数据可读（WouldBlock）
    /// - `Err`: socket 错误
    pub fn try_recv(&self, buf: &mut [u8]) -> Result<Option<usize>, LinkError> {
        match self.socket.recv_from(buf) {
            Ok((len, _sender)) => Ok(Some(len)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(LinkError::Recv(e)),
        }
    }

    /// 绑定的本地端口
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// 一个数据报的接收缓冲区大小
///
/// 比最大的协议数据包大，多余长度用于识别并丢弃异常数据报。
pub const RX_BUFFER_SIZE: usize = 1024;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolve_localhost() {
        let addr = resolve_host("127.0.0.1", 23000).unwrap();
        assert_eq!(addr.port(), 23000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_resolve_invalid_host() {
        let err = resolve_host("no.such.host.invalid", 23000).unwrap_err();
        assert!(matches!(err, LinkError::Resolve { .. }));
    }

    #[test]
    fn test_tx_link_sends_full_datagram() {
        // 对端绑定临时端口，验证数据报完整到达
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        let port = peer.local_addr().unwrap().port();

        let link = UdpTxLink::connect("127.0.0.1", port).unwrap();
        link.send(&[0xAB; 65]).unwrap();

        let mut buf = [0u8; 256];
        let (len, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(len, 65);
        assert_eq!(&buf[..len], &[0xAB; 65]);
    }

    #[test]
    fn test_rx_socket_nonblocking_empty() {
        let rx = UdpRxSocket::bind(0).unwrap();
        let mut buf = [0u8; RX_BUFFER_SIZE];
        // 无数据时立即返回 None，不阻塞
        assert!(rx.try_recv(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_rx_socket_receives_datagram() {
        let rx = UdpRxSocket::bind(0).unwrap();
        let port = rx.port();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(&[1, 2, 3], ("127.0.0.1", port)).unwrap();

        let mut buf = [0u8; RX_BUFFER_SIZE];
        let mut received = None;
        for _ in 0..100 {
            if let Some(len) = rx.try_recv(&mut buf).unwrap() {
                received = Some(len);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(received, Some(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_bind_port_conflict() {
        let first = UdpRxSocket::bind(0).unwrap();
        let err = UdpRxSocket::bind(first.port()).unwrap_err();
        assert!(matches!(err, LinkError::Bind { .. }));
    }
}
