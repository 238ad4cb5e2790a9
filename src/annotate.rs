// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测结果标注 (Annotator)
//!
//! 只在副本上绘制, 原始帧保持不变用于归档.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{anyhow, Context, Result};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{info, warn};

use crate::capture::Frame;
use crate::detection::Detection;

const FONT_NAME: &str = "Arial.ttf";
const FONT_URL: &str = "https://ultralytics.com/assets/Arial.ttf";
const MAX_FONT_BYTES: u64 = 8 * 1024 * 1024;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

pub struct Annotator {
    font: Option<FontVec>,
    thickness: u32,
    scale: PxScale,
}

impl Annotator {
    pub fn new(font: Option<FontVec>) -> Self {
        Self {
            font,
            thickness: 2,
            scale: PxScale::from(20.0),
        }
    }

    /// 加载字体: 指定路径 → 缓存 → 下载; 全部失败时只画框不写字
    pub fn load(font_path: Option<&Path>, agent: &ureq::Agent) -> Self {
        let bytes = match font_path {
            Some(path) => fs::read(path).with_context(|| format!("Failed to read font: {:?}", path)),
            None => cached_font(agent),
        };
        let font = bytes.and_then(|b| FontVec::try_from_vec(b).map_err(|e| anyhow!("{}", e)));
        match font {
            Ok(font) => Self::new(Some(font)),
            Err(e) => {
                warn!("⚠️ 标注字体不可用, 仅绘制检测框: {:#}", e);
                Self::new(None)
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// 在副本上为每个人员检测画框与 "Person: 0.90" 标签
    pub fn annotate(&self, frame: &Frame, detections: &[Detection]) -> Frame {
        let mut canvas = frame.clone();
        let (w, h) = canvas.dimensions();
        if w == 0 || h == 0 {
            return canvas;
        }

        for det in detections.iter().filter(|d| d.is_person()) {
            let x1 = det.bbox.x1.round() as i32;
            let y1 = det.bbox.y1.round() as i32;
            let bw = det.bbox.width().round().max(1.0) as u32;
            let bh = det.bbox.height().round().max(1.0) as u32;

            for t in 0..self.thickness {
                let grow = 2 * t;
                draw_hollow_rect_mut(
                    &mut canvas,
                    Rect::at(x1 - t as i32, y1 - t as i32).of_size(bw + grow, bh + grow),
                    BOX_COLOR,
                );
            }

            if let Some(font) = &self.font {
                let label = format!("Person: {:.2}", det.confidence);
                let (tw, th) = text_size(self.scale, font, &label);
                let (tw, th) = (tw.max(1) + 4, th.max(1) + 4);
                // 框上方放不下时放到框内
                let ty = if y1 >= th as i32 { y1 - th as i32 } else { y1 };
                draw_filled_rect_mut(&mut canvas, Rect::at(x1, ty).of_size(tw, th), BOX_COLOR);
                draw_text_mut(&mut canvas, TEXT_COLOR, x1 + 2, ty + 2, self.scale, font, &label);
            }
        }

        canvas
    }
}

fn font_cache_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cam-sentinel").join(FONT_NAME))
}

fn cached_font(agent: &ureq::Agent) -> Result<Vec<u8>> {
    let path = font_cache_path().context("No user config directory for font cache")?;
    if path.exists() {
        return fs::read(&path).with_context(|| format!("Failed to read font: {:?}", path));
    }

    info!("⬇️  下载标注字体: {}", FONT_URL);
    let response = agent
        .get(FONT_URL)
        .call()
        .map_err(|e| anyhow!("Failed to download font: {}", e))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_FONT_BYTES)
        .read_to_end(&mut bytes)?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, &bytes).with_context(|| format!("Failed to cache font: {:?}", path))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BBox;

    fn det(label: &str, bbox: BBox) -> Detection {
        Detection {
            class_id: 0,
            label: label.to_string(),
            confidence: 0.9,
            bbox,
        }
    }

    #[test]
    fn test_annotate_draws_on_copy_only() {
        let frame = Frame::new(100, 100);
        let annotator = Annotator::new(None);

        let annotated = annotator.annotate(&frame, &[det("person", BBox::new(10.0, 10.0, 50.0, 60.0))]);

        assert_eq!(annotated.get_pixel(10, 10), &BOX_COLOR);
        assert_eq!(annotated.get_pixel(49, 30), &BOX_COLOR);
        assert_eq!(annotated.get_pixel(30, 30), &Rgb([0, 0, 0]));
        // 原始帧未被修改
        assert!(frame.pixels().all(|p| p == &Rgb([0, 0, 0])));
    }

    #[test]
    fn test_non_person_not_drawn() {
        let frame = Frame::new(64, 64);
        let annotated = Annotator::new(None).annotate(&frame, &[det("car", BBox::new(5.0, 5.0, 40.0, 40.0))]);
        assert_eq!(annotated, frame);
    }

    #[test]
    fn test_box_at_edge_is_clipped() {
        let frame = Frame::new(32, 32);
        let annotated = Annotator::new(None).annotate(&frame, &[det("person", BBox::new(0.0, 0.0, 32.0, 32.0))]);
        assert_eq!(annotated.get_pixel(0, 0), &BOX_COLOR);
    }

    #[test]
    fn test_missing_font_path_falls_back() {
        let agent = ureq::AgentBuilder::new().build();
        let annotator = Annotator::load(Some(Path::new("/nonexistent/font.ttf")), &agent);
        assert!(!annotator.has_font());
    }
}
