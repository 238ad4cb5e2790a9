// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! HTTP 快照摄像头
//!
//! 每次抓帧发起一次带超时的 GET, 不在周期内重试.

use std::io::Read;

use tracing::debug;

use super::{Frame, FrameSource, Rotation};
use crate::error::CaptureError;

/// 单张快照的最大字节数
const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// HTTP 快照摄像头
pub struct HttpCamera {
    agent: ureq::Agent,
    url: String,
    rotation: Rotation,
}

impl HttpCamera {
    /// `agent` 上已经配置好请求超时
    pub fn new(agent: ureq::Agent, url: impl Into<String>, rotation: Rotation) -> Self {
        Self {
            agent,
            url: url.into(),
            rotation,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }
}

impl FrameSource for HttpCamera {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let response = self.agent.get(&self.url).call()?;
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(CaptureError::Status(status));
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_IMAGE_BYTES)
            .read_to_end(&mut bytes)?;
        debug!("📥 快照 {} 字节", bytes.len());

        decode_frame(&bytes, self.rotation)
    }
}

/// 原始字节 → RGB 帧, 并应用旋转
pub fn decode_frame(bytes: &[u8], rotation: Rotation) -> Result<Frame, CaptureError> {
    let image = image::load_from_memory(bytes)?.into_rgb8();
    Ok(rotation.apply(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::time::Duration;

    fn agent() -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(5))
            .build()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_applies_rotation() {
        let bytes = jpeg_bytes(80, 60);
        let frame = decode_frame(&bytes, Rotation::None).unwrap();
        assert_eq!(frame.dimensions(), (80, 60));

        let frame = decode_frame(&bytes, Rotation::Cw90).unwrap();
        assert_eq!(frame.dimensions(), (60, 80));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_frame(b"<html>camera offline</html>", Rotation::None).unwrap_err();
        assert!(matches!(err, CaptureError::Decode(_)));
    }

    #[test]
    fn test_unreachable_camera_is_capture_error() {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_millis(200))
            .build();
        let mut camera = HttpCamera::new(agent, "http://127.0.0.1:9/snapshot.jpg", Rotation::None);
        assert!(camera.capture().is_err());
    }

    #[test]
    fn test_capture_decodes_and_rotates_snapshot() {
        let (base, rx) = serve_once(200, "image/jpeg", jpeg_bytes(80, 60));
        let mut camera = HttpCamera::new(agent(), format!("{}/snapshot.jpg", base), Rotation::Cw270);

        let frame = camera.capture().unwrap();
        assert_eq!(frame.dimensions(), (60, 80));

        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(request.request_line().starts_with("GET /snapshot.jpg "));
    }

    #[test]
    fn test_not_found_is_capture_error() {
        let (base, _rx) = serve_once(404, "text/html", b"not found".to_vec());
        let mut camera = HttpCamera::new(agent(), base, Rotation::None);
        assert!(matches!(camera.capture(), Err(CaptureError::Http(_))));
    }

    #[test]
    fn test_server_error_is_capture_error() {
        let (base, _rx) = serve_once(503, "text/plain", Vec::new());
        let mut camera = HttpCamera::new(agent(), base, Rotation::None);
        assert!(camera.capture().is_err());
    }

    #[test]
    fn test_empty_no_content_is_capture_error() {
        let (base, _rx) = serve_once(204, "image/jpeg", Vec::new());
        let mut camera = HttpCamera::new(agent(), base, Rotation::None);
        assert!(camera.capture().is_err());
    }
}
