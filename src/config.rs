use crate::error::ConfigurationError;
use crate::util;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("academy".to_string())
}

fn default_ledger_url() -> String {
    env::var("LEDGER_GATEWAY_URL").unwrap_or("http://localhost:4000".to_string())
}

fn default_ledger_channel() -> String {
    env::var("LEDGER_CHANNEL").unwrap_or("certificatechannel".to_string())
}

fn default_ledger_chaincode() -> String {
    env::var("LEDGER_CHAINCODE").unwrap_or("academy".to_string())
}

fn default_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or("change-me".to_string())
}

fn default_public_reader() -> String {
    env::var("PUBLIC_READER_USERNAME").unwrap_or("adminstudent".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,
    #[serde(default = "default_ledger_channel")]
    pub ledger_channel: String,
    #[serde(default = "default_ledger_chaincode")]
    pub ledger_chaincode: String,

    /// HS256 secret caller tokens are signed with.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// AdminStudent wallet identity used for public certificate lookups.
    #[serde(default = "default_public_reader")]
    pub public_reader: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            ledger_url: default_ledger_url(),
            ledger_channel: default_ledger_channel(),
            ledger_chaincode: default_ledger_chaincode(),
            jwt_secret: default_jwt_secret(),
            public_reader: default_public_reader(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}
