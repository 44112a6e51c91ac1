//! Display name capability.
//!
//! The name is generated once, persisted to a file, and reused by every later
//! session. A persisted name is never rewritten.

use std::{
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::error::ClientError;

const ANIMALS: [&str; 16] = [
    "Axolotl",
    "Red Panda",
    "Capybara",
    "Quokka",
    "Fennec Fox",
    "Sea Otter",
    "Chinchilla",
    "Hedgehog",
    "Seal Pup",
    "Alpaca",
    "Sugar Glider",
    "Bunny",
    "Pomeranian",
    "Koala",
    "Duckling",
    "Fawn",
];

const SUFFIX_LEN: usize = 5;

/// `~/.embers/username`, if a home directory is known
pub fn default_username_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".embers").join("username"))
}

/// Fresh name of the form `anon-<Animal>-<5 chars>`
pub fn generate_username() -> String {
    let id = Uuid::new_v4();
    let animal = ANIMALS[usize::from(id.as_bytes()[0]) % ANIMALS.len()];
    let suffix: String = id.simple().to_string().chars().skip(1).take(SUFFIX_LEN).collect();
    format!("anon-{}-{}", animal, suffix)
}

pub struct UsernameStore {
    path: PathBuf,
}

impl UsernameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted name, or generate and persist one on first use
    pub fn load_or_create(&self) -> Result<String, ClientError> {
        if let Some(existing) = self.load()? {
            return Ok(existing);
        }

        let username = generate_username();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &username)?;
        tracing::info!(
            "Generated username '{}' (saved to {})",
            username,
            self.path.display()
        );
        Ok(username)
    }

    fn load(&self) -> Result<Option<String>, ClientError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let name = contents.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
