// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 人员检测通知
//!
//! - NotificationGate: 最小通知间隔 (以上一次成功发送为锚点)
//! - Notifier:         通知通道
//! - DiscordWebhook:   multipart 上传标注图片 (reqwest)

use std::io::Cursor;

use chrono::{DateTime, Local};
use image::ImageFormat;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::capture::Frame;
use crate::error::NotifyError;

/// 通知附带的固定文字
pub const CAPTION: &str = "🚨 Person detected";

/// 通知节流
#[derive(Debug, Clone)]
pub struct NotificationGate {
    interval: chrono::Duration,
    last_sent_at: Option<DateTime<Local>>,
}

impl NotificationGate {
    pub fn new(interval: chrono::Duration) -> Self {
        Self {
            interval,
            last_sent_at: None,
        }
    }

    pub fn allow(&self, now: DateTime<Local>) -> bool {
        match self.last_sent_at {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }

    /// 只在发送成功后调用
    pub fn record(&mut self, now: DateTime<Local>) {
        self.last_sent_at = Some(now);
    }

    pub fn last_sent_at(&self) -> Option<DateTime<Local>> {
        self.last_sent_at
    }

    pub fn interval(&self) -> chrono::Duration {
        self.interval
    }
}

/// 通知通道
pub trait Notifier {
    fn send(&self, frame: &Frame, caption: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Discord webhook
pub struct DiscordWebhook {
    client: Client,
    url: String,
}

impl DiscordWebhook {
    /// `client` 上已经配置好请求超时
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl Notifier for DiscordWebhook {
    fn send(&self, frame: &Frame, caption: &str) -> Result<(), NotifyError> {
        let jpeg = encode_jpeg(frame)?;
        let size = jpeg.len();
        let payload = serde_json::to_string(&WebhookPayload { content: caption })?;

        // payload_json + files[0]
        let form = Form::new().text("payload_json", payload).part(
            "files[0]",
            Part::bytes(jpeg)
                .file_name("detection.jpg")
                .mime_str("image/jpeg")?,
        );

        let response = self.client.post(&self.url).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        debug!("🔔 通知已发送 ({} 字节)", size);
        Ok(())
    }
}

pub fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    frame.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}
