//! Export and share gateway.
//!
//! Packages composited cards as named PNG files, either for download or for
//! handoff to a platform share target. Sharing problems are reported as
//! [`ShareOutcome`] values with a user-facing notice; only a missing or
//! undecodable base image is an error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use card_core::Editor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::base_image::{BaseImage, ImageSource};
use crate::compositor::Compositor;
use crate::error::{RenderError, RenderResult};

/// MIME type of every exported file.
pub const PNG_MIME: &str = "image/png";

/// File names and user-facing strings for export and sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// File name for downloads.
    pub download_name: String,
    /// File name handed to share targets.
    pub share_name: String,
    /// Share sheet title.
    pub title: String,
    /// Share sheet message.
    pub text: String,
    /// Notice shown when the platform cannot share files.
    pub unsupported_notice: String,
    /// Notice shown when a share was cancelled or failed.
    pub failed_notice: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            download_name: "CNY_2026_Pixar_Card.png".to_string(),
            share_name: "Pixar_CNY_Card.png".to_string(),
            title: "我的 2026 皮克斯賀卡".to_string(),
            text: "祝大家新年快樂！".to_string(),
            unsupported_notice: "瀏覽器不支援直接分享，請下載圖片。".to_string(),
            failed_notice: "分享失敗，請先下載圖片後手動分享。".to_string(),
        }
    }
}

impl ShareConfig {
    /// Parse settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for malformed JSON.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::InvalidConfig(e.to_string()))
    }
}

/// A named, encoded card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: &'static str,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// The file as a base64 `data:` URI, suitable for a download link.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Write the file into `dir` under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Export`] if the file cannot be written.
    pub fn write_to_dir(&self, dir: &Path) -> RenderResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|e| {
            RenderError::Export(format!("Failed to write {}: {e}", path.display()))
        })?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Why a share target did not complete.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The user dismissed the share sheet.
    #[error("Share cancelled")]
    Cancelled,

    /// The platform refused or failed the share.
    #[error("Share failed: {0}")]
    Failed(String),
}

/// A platform share facility.
#[async_trait(?Send)]
pub trait ShareTarget {
    /// Whether this target can share the given file at all.
    fn can_share(&self, file: &ExportFile) -> bool;

    /// Hand the file over.
    async fn share(&self, file: &ExportFile, title: &str, text: &str) -> Result<(), ShareError>;
}

/// Result of a share attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The target accepted the file.
    Shared,
    /// The platform cannot share files; carries the notice to show.
    Unsupported(String),
    /// The share was cancelled or failed; carries the notice to show.
    Cancelled(String),
}

/// Turns editor state into downloadable or shareable files.
#[derive(Debug)]
pub struct ExportGateway {
    compositor: Compositor,
    config: ShareConfig,
}

impl ExportGateway {
    /// Create a gateway.
    #[must_use]
    pub fn new(compositor: Compositor, config: ShareConfig) -> Self {
        Self { compositor, config }
    }

    /// Create a gateway with default compositing and share settings.
    ///
    /// # Errors
    ///
    /// See [`Compositor::with_defaults`].
    pub fn with_defaults() -> RenderResult<Self> {
        Ok(Self::new(Compositor::with_defaults()?, ShareConfig::default()))
    }

    /// The compositor used for exports.
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The share settings.
    #[must_use]
    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// Load a base image for export.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NothingToExport`] if the image cannot be read
    /// or decoded.
    pub fn load_base(source: &ImageSource) -> RenderResult<BaseImage> {
        BaseImage::load(source).map_err(|e| {
            tracing::warn!("Base image unavailable: {e}");
            RenderError::NothingToExport(e.to_string())
        })
    }

    /// Composite and encode the card as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NothingToExport`] when `base` is `None`, or any
    /// compositing error.
    pub fn render_png(&self, base: Option<&BaseImage>, editor: &Editor) -> RenderResult<Vec<u8>> {
        let base = base.ok_or_else(|| {
            tracing::warn!("Export requested without a base image");
            RenderError::NothingToExport("no base image loaded".to_string())
        })?;
        self.compositor.composite_editor(base, editor)?.encode_png()
    }

    /// Produce the download file.
    ///
    /// # Errors
    ///
    /// See [`ExportGateway::render_png`]. No file is produced on error.
    pub fn download(&self, base: Option<&BaseImage>, editor: &Editor) -> RenderResult<ExportFile> {
        let bytes = self.render_png(base, editor)?;
        tracing::info!(
            "Exported {} ({} bytes)",
            self.config.download_name,
            bytes.len()
        );
        Ok(ExportFile {
            file_name: self.config.download_name.clone(),
            mime_type: PNG_MIME,
            bytes,
        })
    }

    /// Composite the card and hand it to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the card cannot be produced; every share
    /// problem is reported through [`ShareOutcome`].
    pub async fn share(
        &self,
        base: Option<&BaseImage>,
        editor: &Editor,
        target: &dyn ShareTarget,
    ) -> RenderResult<ShareOutcome> {
        let file = ExportFile {
            file_name: self.config.share_name.clone(),
            mime_type: PNG_MIME,
            bytes: self.render_png(base, editor)?,
        };

        if !target.can_share(&file) {
            tracing::warn!("Share target cannot share {}", file.file_name);
            return Ok(ShareOutcome::Unsupported(
                self.config.unsupported_notice.clone(),
            ));
        }

        match target
            .share(&file, &self.config.title, &self.config.text)
            .await
        {
            Ok(()) => {
                tracing::info!("Shared {} ({} bytes)", file.file_name, file.bytes.len());
                Ok(ShareOutcome::Shared)
            }
            Err(e) => {
                tracing::warn!("Share did not complete: {e}");
                Ok(ShareOutcome::Cancelled(self.config.failed_notice.clone()))
            }
        }
    }
}
