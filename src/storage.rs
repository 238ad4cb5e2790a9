// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 本地图片归档 (Frame Store)
//!
//! 目录结构: `root/YYYY-MM-DD/YYYY-MM-DD_HH-MM-SS.jpg`
//! 同一秒内的两次抓帧写同一个文件, 后写覆盖.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tracing::info;

use crate::capture::Frame;

pub struct FrameStore {
    root: PathBuf,
}

impl FrameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 抓帧时间对应的文件路径
    pub fn path_for<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.root
            .join(at.format("%Y-%m-%d").to_string())
            .join(format!("{}.jpg", at.format("%Y-%m-%d_%H-%M-%S")))
    }

    /// 保存原始 (未标注) 帧, 返回写入的路径
    pub fn save<Tz: TimeZone>(&self, frame: &Frame, at: &DateTime<Tz>) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        let path = self.path_for(at);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create image directory: {:?}", dir))?;
        }
        frame
            .save(&path)
            .with_context(|| format!("Failed to write image: {:?}", path))?;
        info!("💾 已保存图片: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::Rgb;
    use tempfile::tempdir;

    #[test]
    fn test_path_is_bucketed_by_day() {
        let store = FrameStore::new("/opt/webcam/images");
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 7, 5, 9).unwrap();
        assert_eq!(
            store.path_for(&at),
            PathBuf::from("/opt/webcam/images/2026-10-16/2026-10-16_07-05-09.jpg")
        );
    }

    #[test]
    fn test_save_writes_decodable_jpeg() {
        let dir = tempdir().unwrap();
        let store = FrameStore::new(dir.path());
        let frame = Frame::from_pixel(32, 24, Rgb([120, 40, 200]));
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let path = store.save(&frame, &at).unwrap();

        assert!(path.starts_with(dir.path().join("2026-01-02")));
        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (32, 24));
    }

    #[test]
    fn test_same_second_overwrites() {
        let dir = tempdir().unwrap();
        let store = FrameStore::new(dir.path());
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let first = store.save(&Frame::new(16, 16), &at).unwrap();
        let second = store.save(&Frame::new(8, 8), &at).unwrap();

        assert_eq!(first, second);
        assert_eq!(image::open(&second).unwrap().width(), 8);
        assert_eq!(fs::read_dir(dir.path().join("2026-01-02")).unwrap().count(), 1);
    }
}
