//! 控制参考数据包构建与编解码
//!
//! 上位机按所选控制模式填写一组参考值（关节空间或笛卡尔空间），
//! 打包为固定 65 字节的数据报发往双臂控制端。
//! 无论哪种模式，数据包始终以完整长度发送；
//! 与模式无关的数组字段确定性地填零，接收端必须忽略它们。

use crate::{NUM_ARM_JOINTS, ProtocolError, read_f32_le, write_f32_le};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 控制参考数据包的固定编码长度（字节）
///
/// 1 (mode) + 4 (play_time) + 12 + 12 (左右 TCP) + 16 + 16 (左右关节) + 4 (time_stamp)
pub const CONTROL_REF_PACKET_SIZE: usize = 65;

/// 控制模式标签
///
/// 关节空间模式使用 1-3，笛卡尔（TCP）空间模式使用 101-103。
/// TCP 此处指 Tool Center Point（工具中心点），与传输协议无关。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    /// 关节位置控制（rad）
    JointPosition = 1,
    /// 关节速度控制（rad/s）
    JointSpeed = 2,
    /// 关节力矩控制（Nm）
    JointTorque = 3,
    /// TCP 位置控制（m）
    TcpPosition = 101,
    /// TCP 速度控制（m/s）
    TcpVelocity = 102,
    /// TCP 力控制（N）
    TcpForce = 103,
}

impl ControlMode {
    /// 该模式的参考值是否位于关节空间
    pub fn is_joint_space(&self) -> bool {
        matches!(
            self,
            ControlMode::JointPosition | ControlMode::JointSpeed | ControlMode::JointTorque
        )
    }
}

/// 控制参考数据包
///
/// 每个数据包只有一组语义有效的载荷：关节模式下是 `ref_left_joints` /
/// `ref_right_joints`，TCP 模式下是 `ref_left_tcp` / `ref_right_tcp`。
/// 构造函数保证未使用的一组始终为零。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlRefPacket {
    /// 控制模式标签
    pub mode: ControlMode,
    /// 从当前位姿插值到参考位姿的时间（秒）
    pub play_time: f32,
    /// 左臂 TCP 参考值（仅 TCP 模式有效）
    pub ref_left_tcp: [f32; 3],
    /// 右臂 TCP 参考值（仅 TCP 模式有效）
    pub ref_right_tcp: [f32; 3],
    /// 左臂关节参考值（仅关节模式有效）
    pub ref_left_joints: [f32; NUM_ARM_JOINTS],
    /// 右臂关节参考值（仅关节模式有效）
    pub ref_right_joints: [f32; NUM_ARM_JOINTS],
    /// 发送时刻相对接口创建的经过时间（秒），由发送路径填写
    pub time_stamp: f32,
}

impl ControlRefPacket {
    /// 构建关节空间参考数据包（位置/速度/力矩由 `mode` 区分）
    ///
    /// TCP 数组填零。
    pub fn joint_space(
        mode: ControlMode,
        left: &[f32; NUM_ARM_JOINTS],
        right: &[f32; NUM_ARM_JOINTS],
        play_time: f32,
    ) -> Self {
        Self {
            mode,
            play_time,
            ref_left_tcp: [0.0; 3],
            ref_right_tcp: [0.0; 3],
            ref_left_joints: *left,
            ref_right_joints: *right,
            time_stamp: 0.0,
        }
    }

    /// 构建笛卡尔空间参考数据包（位置/速度/力由 `mode` 区分）
    ///
    /// 关节数组填零。
    pub fn tcp_space(
        mode: ControlMode,
        left: &[f32; 3],
        right: &[f32; 3],
        play_time: f32,
    ) -> Self {
        Self {
            mode,
            play_time,
            ref_left_tcp: *left,
            ref_right_tcp: *right,
            ref_left_joints: [0.0; NUM_ARM_JOINTS],
            ref_right_joints: [0.0; NUM_ARM_JOINTS],
            time_stamp: 0.0,
        }
    }

    /// 编码到固定缓冲区（零拷贝，小端）
    pub fn encode<'a>(&self, buf: &'a mut [u8; CONTROL_REF_PACKET_SIZE]) -> &'a [u8] {
        buf[0] = self.mode.into();
        write_f32_le(buf, 1, self.play_time);
        for (k, v) in self.ref_left_tcp.iter().enumerate() {
            write_f32_le(buf, 5 + k * 4, *v);
        }
        for (k, v) in self.ref_right_tcp.iter().enumerate() {
            write_f32_le(buf, 17 + k * 4, *v);
        }
        for (k, v) in self.ref_left_joints.iter().enumerate() {
            write_f32_le(buf, 29 + k * 4, *v);
        }
        for (k, v) in self.ref_right_joints.iter().enumerate() {
            write_f32_le(buf, 45 + k * 4, *v);
        }
        write_f32_le(buf, 61, self.time_stamp);
        &buf[..CONTROL_REF_PACKET_SIZE]
    }

    /// 从字节缓冲区解码
    ///
    /// # 错误
    /// - `ProtocolError::InvalidLength`: 长度不是 65 字节
    /// - `ProtocolError::UnknownMode`: 模式标签不在定义范围内
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() != CONTROL_REF_PACKET_SIZE {
            return Err(ProtocolError::InvalidLength {
                expected: CONTROL_REF_PACKET_SIZE,
                actual: data.len(),
            });
        }

        let mode = ControlMode::try_from(data[0]).map_err(|_| ProtocolError::UnknownMode(data[0]))?;

        let mut packet = Self {
            mode,
            play_time: read_f32_le(data, 1),
            ref_left_tcp: [0.0; 3],
            ref_right_tcp: [0.0; 3],
            ref_left_joints: [0.0; NUM_ARM_JOINTS],
            ref_right_joints: [0.0; NUM_ARM_JOINTS],
            time_stamp: read_f32_le(data, 61),
        };
        for k in 0..3 {
            packet.ref_left_tcp[k] = read_f32_le(data, 5 + k * 4);
            packet.ref_right_tcp[k] = read_f32_le(data, 17 + k * 4);
        }
        for k in 0..NUM_ARM_JOINTS {
            packet.ref_left_joints[k] = read_f32_le(data, 29 + k * 4);
            packet.ref_right_joints[k] = read_f32_le(data, 45 + k * 4);
        }

        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_mode_values() {
        assert_eq!(u8::from(ControlMode::JointPosition), 1);
        assert_eq!(u8::from(ControlMode::JointSpeed), 2);
        assert_eq!(u8::from(ControlMode::JointTorque), 3);
        assert_eq!(u8::from(ControlMode::TcpPosition), 101);
        assert_eq!(u8::from(ControlMode::TcpVelocity), 102);
        assert_eq!(u8::from(ControlMode::TcpForce), 103);
    }

    #[test]
    fn test_control_mode_from_u8() {
        assert_eq!(ControlMode::try_from(1), Ok(ControlMode::JointPosition));
        assert_eq!(ControlMode::try_from(103), Ok(ControlMode::TcpForce));
        assert!(ControlMode::try_from(0).is_err());
        assert!(ControlMode::try_from(4).is_err());
        assert!(ControlMode::try_from(104).is_err());
    }

    #[test]
    fn test_all_modes_encode_full_size_with_tag() {
        // 六种模式全部编码为 65 字节，首字节为对应标签
        let joint_modes = [
            ControlMode::JointPosition,
            ControlMode::JointSpeed,
            ControlMode::JointTorque,
        ];
        let tcp_modes = [
            ControlMode::TcpPosition,
            ControlMode::TcpVelocity,
            ControlMode::TcpForce,
        ];

        for mode in joint_modes {
            let packet = ControlRefPacket::joint_space(mode, &[0.1; 4], &[0.2; 4], 0.5);
            let mut buf = [0u8; CONTROL_REF_PACKET_SIZE];
            let encoded = packet.encode(&mut buf);
            assert_eq!(encoded.len(), CONTROL_REF_PACKET_SIZE);
            assert_eq!(encoded[0], u8::from(mode));
        }
        for mode in tcp_modes {
            let packet = ControlRefPacket::tcp_space(mode, &[0.1; 3], &[0.2; 3], 0.5);
            let mut buf = [0u8; CONTROL_REF_PACKET_SIZE];
            let encoded = packet.encode(&mut buf);
            assert_eq!(encoded.len(), CONTROL_REF_PACKET_SIZE);
            assert_eq!(encoded[0], u8::from(mode));
        }
    }

    #[test]
    fn test_joint_space_zero_fills_tcp_arrays() {
        let packet =
            ControlRefPacket::joint_space(ControlMode::JointPosition, &[1.0; 4], &[2.0; 4], 0.25);
        assert_eq!(packet.ref_left_tcp, [0.0; 3]);
        assert_eq!(packet.ref_right_tcp, [0.0; 3]);
        assert_eq!(packet.ref_left_joints, [1.0; 4]);
    }

    #[test]
    fn test_tcp_space_zero_fills_joint_arrays() {
        let packet =
            ControlRefPacket::tcp_space(ControlMode::TcpPosition, &[0.3; 3], &[0.4; 3], 1.0);
        assert_eq!(packet.ref_left_joints, [0.0; 4]);
        assert_eq!(packet.ref_right_joints, [0.0; 4]);
        assert_eq!(packet.ref_left_tcp, [0.3; 3]);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut packet = ControlRefPacket::joint_space(
            ControlMode::JointSpeed,
            &[-0.5, 0.1, 0.7, -1.2],
            &[0.9, -0.3, 0.0, 2.5],
            0.25,
        );
        packet.time_stamp = 12.5;

        let mut buf = [0u8; CONTROL_REF_PACKET_SIZE];
        let encoded = packet.encode(&mut buf);
        let decoded = ControlRefPacket::decode(encoded).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let buf = [0u8; CONTROL_REF_PACKET_SIZE - 1];
        let err = ControlRefPacket::decode(&buf).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidLength {
                expected: CONTROL_REF_PACKET_SIZE,
                actual: 64,
            }
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_mode() {
        let mut buf = [0u8; CONTROL_REF_PACKET_SIZE];
        buf[0] = 99;
        let err = ControlRefPacket::decode(&buf).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMode(99)));
    }

    #[test]
    fn test_play_time_field_offset() {
        // play_time 位于偏移 1..5
        let packet = ControlRefPacket::joint_space(
            ControlMode::JointPosition,
            &[0.0; 4],
            &[0.0; 4],
            0.25,
        );
        let mut buf = [0u8; CONTROL_REF_PACKET_SIZE];
        let encoded = packet.encode(&mut buf);
        assert_eq!(
            f32::from_le_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]),
            0.25
        );
    }
}
