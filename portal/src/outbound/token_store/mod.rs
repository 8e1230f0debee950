//! File-backed admin token storage.
//!
//! The token lives in a single file named after [`TOKEN_STORAGE_KEY`] inside
//! the configured state directory. All file access goes through a `cap-std`
//! directory handle so the store cannot touch anything outside it.

mod atomic_write;

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::AuthToken;
use crate::domain::ports::{TOKEN_STORAGE_KEY, TokenStore, TokenStoreError};

use self::atomic_write::write_atomic;

/// Token store persisting to `<state_dir>/token`.
#[derive(Debug)]
pub struct FileTokenStore {
    dir: Dir,
    root: Utf8PathBuf,
}

impl FileTokenStore {
    /// Open (creating when missing) the state directory at `state_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(state_dir: &Utf8Path) -> Result<Self, TokenStoreError> {
        let io_error = |error: io::Error| TokenStoreError::io(format!("{state_dir}: {error}"));
        Dir::create_ambient_dir_all(state_dir, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(state_dir, ambient_authority()).map_err(io_error)?;
        Ok(Self {
            dir,
            root: state_dir.to_path_buf(),
        })
    }

    /// Path of the token file, for diagnostics.
    pub fn token_path(&self) -> Utf8PathBuf {
        self.root.join(TOKEN_STORAGE_KEY)
    }

    fn io_error(&self, error: &io::Error) -> TokenStoreError {
        TokenStoreError::io(format!("{}: {error}", self.token_path()))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, TokenStoreError> {
        let raw = match self.dir.read_to_string(TOKEN_STORAGE_KEY) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) if error.kind() == io::ErrorKind::InvalidData => {
                return Err(TokenStoreError::corrupt("token file is not UTF-8"));
            }
            Err(error) => return Err(self.io_error(&error)),
        };
        AuthToken::new(raw)
            .map(Some)
            .map_err(|error| TokenStoreError::corrupt(error.to_string()))
    }

    fn save(&self, token: &AuthToken) -> Result<(), TokenStoreError> {
        write_atomic(
            &self.dir,
            Utf8Path::new(TOKEN_STORAGE_KEY),
            token.expose().as_bytes(),
        )
        .map_err(|error| self.io_error(&error))?;
        debug!(path = %self.token_path(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.dir.remove_file(TOKEN_STORAGE_KEY) {
            Ok(()) => {
                debug!(path = %self.token_path(), "session token cleared");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the file token store.
    use super::*;
    use rstest::{fixture, rstest};

    struct StateDir {
        _temp: tempfile::TempDir,
        state_dir: Utf8PathBuf,
    }

    #[fixture]
    fn state() -> StateDir {
        let temp = tempfile::tempdir().expect("temp dir");
        let state_dir = Utf8PathBuf::from_path_buf(temp.path().join("state"))
            .expect("temp path is UTF-8");
        StateDir {
            _temp: temp,
            state_dir,
        }
    }

    fn token(raw: &str) -> AuthToken {
        AuthToken::new(raw).expect("valid token")
    }

    #[rstest]
    fn missing_directory_is_created_and_empty(state: StateDir) {
        let store = FileTokenStore::open(&state.state_dir).expect("open store");
        assert!(state.state_dir.is_dir());
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn tokens_survive_reopening(state: StateDir) {
        FileTokenStore::open(&state.state_dir)
            .expect("open store")
            .save(&token("abc.def"))
            .expect("save");

        let reopened = FileTokenStore::open(&state.state_dir).expect("reopen store");
        assert_eq!(reopened.load().expect("load"), Some(token("abc.def")));
        let on_disk = std::fs::read_to_string(state.state_dir.join("token")).expect("read file");
        assert_eq!(on_disk, "abc.def");
    }

    #[rstest]
    fn clear_is_idempotent(state: StateDir) {
        let store = FileTokenStore::open(&state.state_dir).expect("open store");
        store.save(&token("abc")).expect("save");
        store.clear().expect("clear");
        store.clear().expect("clear again");
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn blank_files_are_corrupt(state: StateDir) {
        let store = FileTokenStore::open(&state.state_dir).expect("open store");
        std::fs::write(state.state_dir.join("token"), "  \n").expect("write blank");
        assert!(matches!(
            store.load(),
            Err(TokenStoreError::Corrupt { .. })
        ));
    }

    #[rstest]
    fn non_utf8_files_are_corrupt(state: StateDir) {
        let store = FileTokenStore::open(&state.state_dir).expect("open store");
        std::fs::write(state.state_dir.join("token"), [0xff_u8, 0xfe]).expect("write bytes");
        assert!(matches!(
            store.load(),
            Err(TokenStoreError::Corrupt { .. })
        ));
    }
}
