// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 启动参数 (命令行 + 环境变量)
//!
//! 所有参数在进程启动时解析一次, 之后只读.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::capture::Rotation;
use crate::detection::INF_SIZE;
use crate::ort_backend::OrtEP;

/// 网络摄像头哨兵参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "网络摄像头哨兵 - 抓帧/心跳/人员检测通知", long_about = None)]
pub struct Args {
    /// 摄像头抓图地址
    #[arg(
        long,
        env = "CAMERA_CAPTURE_URL",
        default_value = "https://images.bergfex.at/webcams/?id=17250&format=4"
    )]
    pub camera_url: String,

    /// 顺时针旋转角度 (0/90/180/270)
    #[arg(long, env = "CAMERA_ROTATION", default_value_t = 0, allow_negative_numbers = true)]
    pub rotation: i32,

    /// Uptime Kuma push 地址
    #[arg(long, env = "KUMA_URL")]
    pub kuma_url: Option<String>,

    /// Discord webhook 地址
    #[arg(long, env = "DISCORD_WEBHOOK_URL")]
    pub discord_webhook_url: Option<String>,

    /// 图片归档根目录
    #[arg(long, env = "IMAGE_SAVE_FOLDER", default_value = "/opt/webcam/images")]
    pub image_save_folder: PathBuf,

    /// ONNX 检测模型路径, 空字符串表示禁用检测
    #[arg(long, env = "YOLO_MODEL_PATH", default_value = "yolo11x.onnx")]
    pub model: String,

    /// 日志文件 (或目录), 空字符串表示输出到 stderr
    #[arg(long, env = "LOG_FILE", default_value = "/opt/webcam/monitor.log")]
    pub log_file: String,

    /// 抓帧间隔 (秒)
    #[arg(long, env = "CAPTURE_INTERVAL_SECONDS", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub capture_interval_seconds: u64,

    /// 连续失败多少次后推送 down
    #[arg(long, env = "FAILURE_THRESHOLD", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub failure_threshold: u32,

    /// HTTP 请求超时 (秒)
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 5,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout: u64,

    /// 两次人员通知之间的最小间隔 (分钟)
    #[arg(long, env = "DISCORD_INTERVAL_MINUTES", default_value_t = 20)]
    pub discord_interval_minutes: u32,

    /// 模型置信度阈值
    #[arg(long, env = "YOLO_CONF", default_value_t = 0.25)]
    pub conf: f32,

    /// NMS IOU 阈值
    #[arg(long, env = "YOLO_IOU", default_value_t = 0.45)]
    pub iou: f32,

    /// 动态输入模型的推理尺寸
    #[arg(long, env = "YOLO_IMGSZ", default_value_t = INF_SIZE)]
    pub imgsz: u32,

    /// 打印预处理/推理耗时
    #[arg(long)]
    pub profile: bool,

    /// 使用 CUDA 推理
    #[arg(long)]
    pub cuda: bool,

    /// 使用 TensorRT 推理
    #[arg(long)]
    pub trt: bool,

    /// GPU 设备号
    #[arg(long, default_value_t = 0)]
    pub device_id: i32,

    /// 标注字体 (TTF)
    #[arg(long, env = "ANNOTATION_FONT")]
    pub font: Option<PathBuf>,
}

impl Args {
    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.rotation)
    }

    pub fn kuma_url(&self) -> Option<&str> {
        non_empty(self.kuma_url.as_deref())
    }

    pub fn discord_webhook_url(&self) -> Option<&str> {
        non_empty(self.discord_webhook_url.as_deref())
    }

    pub fn model_path(&self) -> Option<&Path> {
        non_empty(Some(self.model.as_str())).map(Path::new)
    }

    pub fn log_file(&self) -> Option<&Path> {
        non_empty(Some(self.log_file.as_str())).map(Path::new)
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_secs(self.capture_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn notification_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.discord_interval_minutes))
    }

    pub fn execution_provider(&self) -> OrtEP {
        if self.trt {
            OrtEP::Trt(self.device_id)
        } else if self.cuda {
            OrtEP::CUDA(self.device_id)
        } else {
            OrtEP::CPU
        }
    }

    /// 打印当前配置
    pub fn summary(&self) {
        info!("📹 摄像头: {} (旋转 {:?})", self.camera_url, self.rotation());
        info!("💾 归档目录: {}", self.image_save_folder.display());
        match self.model_path() {
            Some(model) => info!("📦 检测模型: {}", model.display()),
            None => info!("📦 检测模型: 未配置, 仅抓帧与心跳"),
        }
        info!(
            "⏱️  抓帧间隔 {}s | 失败阈值 {} | 请求超时 {}s | 通知间隔 {}min",
            self.capture_interval_seconds,
            self.failure_threshold,
            self.request_timeout,
            self.discord_interval_minutes
        );
        info!(
            "💓 心跳: {} | 🔔 通知: {}",
            if self.kuma_url().is_some() { "已配置" } else { "未配置" },
            if self.discord_webhook_url().is_some() { "已配置" } else { "未配置" }
        );
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
