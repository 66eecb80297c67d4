use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Local file store for lead profile images, served back under `/uploads`.
#[derive(Clone, Debug)]
pub struct StorageService {
    root: PathBuf,
    public_base_url: String,
}

/// Extension of an accepted image, checked against its leading bytes.
pub fn image_extension(filename: &str, data: &[u8]) -> Result<&'static str> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (ext, magic_ok) = match ext.as_str() {
        "jpg" | "jpeg" => ("jpg", data.starts_with(&[0xFF, 0xD8, 0xFF])),
        "png" => ("png", data.starts_with(&[0x89, 0x50, 0x4E, 0x47])),
        "webp" => (
            "webp",
            data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        ),
        "" => return Err(Error::BadRequest("Image file must have an extension".into())),
        other => {
            return Err(Error::BadRequest(format!(
                "File type .{} is not allowed",
                other
            )))
        }
    };
    if !magic_ok {
        return Err(Error::BadRequest(format!("Invalid {} file content", ext)));
    }
    Ok(ext)
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Stores a profile image and returns its public URL.
    pub async fn save_profile_image(&self, filename: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::BadRequest("Image file is empty".into()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(Error::BadRequest("Image must be at most 5 MB".into()));
        }
        let ext = image_extension(filename, data)?;

        let dir = self.root.join("profile-images");
        fs::create_dir_all(&dir).await?;

        let stored = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        fs::write(dir.join(&stored), data).await.map_err(|e| {
            tracing::error!("Failed to write profile image: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(format!("{}{}", self.profile_image_prefix(), stored))
    }

    /// Deletes a stored profile image by its public URL. URLs that do not
    /// point into this store are ignored; failures are logged, not returned.
    pub async fn remove_profile_image(&self, url: &str) {
        let Some(name) = url.strip_prefix(&self.profile_image_prefix()) else {
            return;
        };
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return;
        }
        match fs::remove_file(self.root.join("profile-images").join(name)).await {
            Ok(()) => tracing::debug!(file = name, "profile image removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(file = name, "Failed to remove profile image: {}", e),
        }
    }

    fn profile_image_prefix(&self) -> String {
        format!("{}/uploads/profile-images/", self.public_base_url)
    }
}
