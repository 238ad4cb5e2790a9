// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 错误类型 (Error taxonomy)
//!
//! 每一类错误都在监控循环内部消化, 不会导致进程退出:
//! - CaptureError:   驱动 HealthReporter::on_failure
//! - HeartbeatError: 仅记录日志
//! - NotifyError:    仅记录日志, 且不推进节流窗口
//! - DetectionError: 视为本周期无检测结果

/// 摄像头抓帧失败 (网络/状态码/解码)
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera request failed: {0}")]
    Http(Box<ureq::Error>),

    #[error("camera returned HTTP {0}")]
    Status(u16),

    #[error("failed to read camera response: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl From<ureq::Error> for CaptureError {
    fn from(e: ureq::Error) -> Self {
        Self::Http(Box::new(e))
    }
}

/// 心跳推送失败
#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("heartbeat request failed: {0}")]
    Http(Box<ureq::Error>),
}

impl From<ureq::Error> for HeartbeatError {
    fn from(e: ureq::Error) -> Self {
        Self::Http(Box::new(e))
    }
}

/// 通知发送失败
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {0}")]
    Status(u16),

    #[error("failed to encode notification image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to serialize notification payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// 模型推理失败
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),
}
