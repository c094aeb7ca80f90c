use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Upload is empty")]
    Empty,
}

/// Where an uploaded file belongs. Every variant maps to a directory derived from its owners, each
/// segment sanitized like a file name.
#[derive(Debug, Clone, Copy)]
pub enum MediaKind<'a> {
    Avatar {
        user_id: Uuid,
    },
    Content {
        course_slug: &'a str,
        module_id: Uuid,
    },
    Submission {
        course_slug: &'a str,
        assignment_id: Uuid,
        username: &'a str,
    },
}

impl fmt::Display for MediaKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Avatar { user_id } => write!(f, "avatars/{user_id}"),
            MediaKind::Content { course_slug, module_id } => {
                write!(f, "contents/{}/{module_id}", sanitize_file_name(course_slug))
            }
            MediaKind::Submission {
                course_slug,
                assignment_id,
                username,
            } => write!(
                f,
                "submissions/{}/{assignment_id}/{}",
                sanitize_file_name(course_slug),
                sanitize_file_name(username)
            ),
        }
    }
}

impl MediaKind<'_> {
    /// Relative storage key for `file_name`, which is sanitized first.
    #[must_use]
    pub fn key(&self, file_name: &str) -> String {
        format!("{self}/{}", sanitize_file_name(file_name))
    }
}

/// Strips directories and anything outside `[A-Za-z0-9._-]` from a client supplied file name.
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `data` below the media root and returns the relative key to persist.
    pub async fn store(&self, kind: MediaKind<'_>, file_name: &str, data: &[u8]) -> Result<String, MediaError> {
        if data.is_empty() {
            return Err(MediaError::Empty);
        }
        let key = kind.key(file_name);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        tracing::debug!(%key, size = data.len(), "stored upload");
        Ok(key)
    }

    /// Removes a previously stored file. Missing files are ignored.
    pub async fn remove(&self, key: &str) -> Result<(), MediaError> {
        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\my essay.docx"), "my_essay.docx");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("dir/"), "upload");
    }

    #[test]
    fn test_keys() {
        let id = Uuid::nil();
        assert_eq!(
            MediaKind::Avatar { user_id: id }.key("me.png"),
            format!("avatars/{id}/me.png")
        );
        assert_eq!(
            MediaKind::Content {
                course_slug: "rust-101",
                module_id: id
            }
            .key("slides.pdf"),
            format!("contents/rust-101/{id}/slides.pdf")
        );
        assert_eq!(
            MediaKind::Submission {
                course_slug: "rust-101",
                assignment_id: id,
                username: "alice"
            }
            .key("hw 1.zip"),
            format!("submissions/rust-101/{id}/alice/hw_1.zip")
        );
        assert_eq!(
            MediaKind::Submission {
                course_slug: "rust-101",
                assignment_id: id,
                username: ".."
            }
            .key("hw.zip"),
            format!("submissions/rust-101/{id}/upload/hw.zip")
        );
    }

    #[test(tokio::test)]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path().to_path_buf());
        let user_id = Uuid::new_v4();

        let key = storage
            .store(MediaKind::Avatar { user_id }, "avatar.png", b"png")
            .await
            .unwrap();
        let stored = tokio::fs::read(storage.root().join(&key)).await.unwrap();
        assert_eq!(stored, b"png");

        storage.remove(&key).await.unwrap();
        assert!(!storage.root().join(&key).exists());
        storage.remove(&key).await.unwrap();

        let empty = storage.store(MediaKind::Avatar { user_id }, "avatar.png", b"").await;
        assert!(matches!(empty, Err(MediaError::Empty)));
    }
}
