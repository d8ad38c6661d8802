//! `AvatarStore` backed by a capability-scoped directory.
//!
//! Each user has at most one file, named `{user_id}.{extension}`. Writing a
//! new avatar removes files left behind in other formats.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{AvatarStore, AvatarStoreError, StoredAvatar};
use crate::domain::{AvatarFormat, AvatarImage, UserId};

const FORMATS: [AvatarFormat; 4] = [
    AvatarFormat::Png,
    AvatarFormat::Jpeg,
    AvatarFormat::Gif,
    AvatarFormat::Webp,
];

/// Stores avatar images as files under one directory.
#[derive(Clone)]
pub struct CapStdAvatarStore {
    dir: Arc<Dir>,
}

impl CapStdAvatarStore {
    /// Open `root`, creating it if missing.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, AvatarStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| AvatarStoreError::io(format!("avatar task aborted: {err}")))?
            .map_err(|err| AvatarStoreError::io(err.to_string()))
    }
}

fn file_name(user_id: &UserId, format: AvatarFormat) -> String {
    format!("{user_id}.{}", format.extension())
}

fn remove_if_present(dir: &Dir, name: &str) -> io::Result<()> {
    match dir.remove_file(name) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[async_trait]
impl AvatarStore for CapStdAvatarStore {
    async fn save(&self, user_id: &UserId, image: &AvatarImage) -> Result<String, AvatarStoreError> {
        let user_id = *user_id;
        let format = image.format();
        let bytes = image.bytes().to_vec();
        self.blocking(move |dir| {
            let name = file_name(&user_id, format);
            for stale in FORMATS.into_iter().filter(|other| *other != format) {
                remove_if_present(dir, &file_name(&user_id, stale))?;
            }
            dir.write(&name, &bytes)?;
            debug!(%user_id, file = %name, size = bytes.len(), "avatar stored");
            Ok(name)
        })
        .await
    }

    async fn load(&self, user_id: &UserId) -> Result<Option<StoredAvatar>, AvatarStoreError> {
        let user_id = *user_id;
        self.blocking(move |dir| {
            for format in FORMATS {
                match dir.read(file_name(&user_id, format)) {
                    Ok(bytes) => return Ok(Some(StoredAvatar { format, bytes })),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(err) => return Err(err),
                }
            }
            Ok(None)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn image(content_type: &str) -> AvatarImage {
        AvatarImage::new(content_type, vec![1, 2, 3, 4]).expect("valid image")
    }

    #[tokio::test]
    async fn saved_avatars_load_back_with_their_format() {
        let root = tempfile::tempdir().expect("tempdir");
        let store = CapStdAvatarStore::open(root.path()).expect("open store");
        let user_id = UserId::random();

        let key = store.save(&user_id, &image("image/png")).await.expect("save");
        let loaded = store.load(&user_id).await.expect("load").expect("present");

        assert_eq!(key, format!("{user_id}.png"));
        assert_eq!(loaded.format, AvatarFormat::Png);
        assert_eq!(loaded.bytes, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn replacing_an_avatar_removes_the_old_format() {
        let root = tempfile::tempdir().expect("tempdir");
        let store = CapStdAvatarStore::open(root.path()).expect("open store");
        let user_id = UserId::random();

        store.save(&user_id, &image("image/png")).await.expect("save png");
        store.save(&user_id, &image("image/webp")).await.expect("save webp");

        let loaded = store.load(&user_id).await.expect("load").expect("present");
        assert_eq!(loaded.format, AvatarFormat::Webp);
        assert!(!root.path().join(format!("{user_id}.png")).exists());
    }

    #[tokio::test]
    async fn missing_avatars_load_as_none() {
        let root = tempfile::tempdir().expect("tempdir");
        let store = CapStdAvatarStore::open(root.path()).expect("open store");

        assert_eq!(store.load(&UserId::random()).await.expect("load"), None);
    }

    #[rstest]
    fn open_creates_nested_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        let nested = root.path().join("media").join("avatars");

        CapStdAvatarStore::open(&nested).expect("open store");
        assert!(nested.is_dir());
    }
}
