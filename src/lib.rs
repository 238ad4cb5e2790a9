// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 网络摄像头哨兵 (Camera Sentinel)
//!
//! 定时抓取摄像头快照 → 健康心跳 → 归档 → 人员检测 → 限频通知

pub mod annotate; // 检测结果标注
pub mod capture; // 抓帧系统
pub mod config; // 启动参数
pub mod detection; // 检测数据结构与接口
pub mod error; // 错误类型
pub mod health; // 健康心跳
pub mod logging; // 日志初始化
pub mod models; // 模型实现
pub mod monitor; // 监控主循环
pub mod notify; // 通知节流与发送
pub mod storage; // 图片归档

pub mod ort_backend;

#[cfg(test)]
mod test_support;

pub use crate::annotate::Annotator;
pub use crate::capture::{Frame, FrameSource, HttpCamera, Rotation};
pub use crate::config::Args;
pub use crate::detection::{BBox, Detection, DetectionEngine};
pub use crate::health::{HealthReporter, HealthState, HeartbeatTransport, KumaPush};
pub use crate::models::{YOLOv8, YOLOv8Config};
pub use crate::monitor::{CycleReport, MonitorLoop};
pub use crate::notify::{DiscordWebhook, NotificationGate, Notifier};
pub use crate::ort_backend::{OrtBackend, OrtConfig, OrtEP};
pub use crate::storage::FrameStore;
