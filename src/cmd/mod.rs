use std::path::{Path, PathBuf};

use clap::Args;
use crypto_hash::HasherType;
use rsa_pss::rsa::SaltLen;

use crate::error::AppError;

mod config;
pub use config::SignConfig;

mod key;
pub use key::KeyArgs;

mod sign;
pub use sign::SignArgs;

mod verify;
pub use verify::VerifyArgs;

mod demo;
pub use demo::DemoArgs;

#[derive(Args, Clone, Default)]
pub struct MsgArgs {
    #[arg(short, long, value_name = "PATH")]
    #[arg(help = "the message file path, read the pipe data when not given")]
    pub file: Option<PathBuf>,
}

impl MsgArgs {
    pub fn read(&self, pipe: Option<&[u8]>) -> anyhow::Result<Vec<u8>> {
        match (self.file.as_deref(), pipe) {
            (Some(f), _) => Ok(std::fs::read(f)?),
            (None, Some(pipe)) => Ok(pipe.to_vec()),
            (None, None) => Err(AppError::NoMessage.into()),
        }
    }
}

#[derive(Args, Clone, Default)]
pub struct HashArgs {
    #[arg(long, value_name = "HASHER")]
    #[arg(help = "sha1 | sha2-224 | sha2-256 | sha2-384 | sha2-512 | sha3-224 | sha3-256 | sha3-384 | sha3-512
default using the `hasher` configuration")]
    pub hasher: Option<HasherType>,

    #[arg(long, value_name = "SALT")]
    #[arg(help = "salt length: digest | max | <bytes>, default using the `salt_len` configuration")]
    pub salt: Option<SaltLen>,
}

impl HashArgs {
    /// 命令行参数优先于配置
    pub fn resolve(&self, cfg: &SignConfig) -> Result<(HasherType, SaltLen), AppError> {
        let hasher = match self.hasher {
            Some(h) => h,
            None => cfg.hasher_type()?,
        };
        let salt = match self.salt {
            Some(s) => s,
            None => cfg.salt_len()?,
        };
        Ok((hasher, salt))
    }
}

fn check_new_file(p: &Path, force: bool) -> Result<(), AppError> {
    if p.exists() && !force {
        Err(AppError::PathExist(p.display().to_string()))
    } else {
        Ok(())
    }
}
