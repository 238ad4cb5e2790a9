// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 抓帧系统 (Capture Source)
///
/// 每个周期从网络摄像头拉取一张静态图片
/// - FrameSource: 抓帧接口 (监控循环只依赖此 trait)
/// - HttpCamera:  HTTP 快照摄像头
/// - Rotation:    固定旋转
pub mod camera;

pub use camera::{decode_frame, HttpCamera};

use image::RgbImage;

use crate::error::CaptureError;

/// 已解码的一帧 (RGB, 3 通道)
pub type Frame = RgbImage;

/// 抓帧接口
pub trait FrameSource {
    /// 抓取一帧, 失败只返回错误, 不会 panic
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

/// 顺时针固定旋转
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// 0/90/180/270 以外的角度一律不旋转
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            90 => Rotation::Cw90,
            180 => Rotation::Cw180,
            270 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub fn apply(self, frame: Frame) -> Frame {
        match self {
            Rotation::None => frame,
            Rotation::Cw90 => image::imageops::rotate90(&frame),
            Rotation::Cw180 => image::imageops::rotate180(&frame),
            Rotation::Cw270 => image::imageops::rotate270(&frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Rotation::None);
        assert_eq!(Rotation::from_degrees(90), Rotation::Cw90);
        assert_eq!(Rotation::from_degrees(180), Rotation::Cw180);
        assert_eq!(Rotation::from_degrees(270), Rotation::Cw270);
        assert_eq!(Rotation::from_degrees(45), Rotation::None);
        assert_eq!(Rotation::from_degrees(-90), Rotation::None);
    }

    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let frame = Frame::new(64, 48);
        let rotated = Rotation::Cw90.apply(frame);
        assert_eq!(rotated.dimensions(), (48, 64));

        let rotated = Rotation::Cw270.apply(Frame::new(64, 48));
        assert_eq!(rotated.dimensions(), (48, 64));

        let rotated = Rotation::Cw180.apply(Frame::new(64, 48));
        assert_eq!(rotated.dimensions(), (64, 48));
    }

    #[test]
    fn test_rotate_90_is_clockwise() {
        // 左上角像素顺时针旋转后落到右上角
        let mut frame = Frame::new(4, 2);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        let rotated = Rotation::Cw90.apply(frame);
        assert_eq!(rotated.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }
}
