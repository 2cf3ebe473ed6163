use std::path::PathBuf;

use clap::Args;
use crypto_hash::HasherType;
use rsa_pss::rsa::{PSSVerify, PublicKey, SaltLen};
use rsa_pss::Verify;

use super::{HashArgs, MsgArgs, SignConfig};
use crate::codec::{decode_signature, load_public_key};

#[derive(Args)]
#[command(about = "verify the RSA-PSS signature of the message")]
pub struct VerifyArgs {
    #[arg(long = "pub", value_name = "PATH", help = "the public key file path")]
    pub pub_file: PathBuf,

    #[command(flatten)]
    pub msg: MsgArgs,

    #[arg(long, value_name = "PATH", help = "the base64 signature file path")]
    pub sig: PathBuf,

    #[command(flatten)]
    pub hash: HashArgs,
}

impl VerifyArgs {
    /// 签名不匹配时返回`Ok(false)`
    pub fn exe(self, cfg: &SignConfig, pipe: Option<&[u8]>) -> anyhow::Result<bool> {
        let (hasher, salt) = self.hash.resolve(cfg)?;
        let key = load_public_key(&self.pub_file)?;
        let msg = self.msg.read(pipe)?;
        let sig = decode_signature(std::fs::read(&self.sig)?.as_slice())?;

        let is_valid = verify_message(key, hasher, salt, msg.as_slice(), sig.as_slice())?;
        report(is_valid);
        Ok(is_valid)
    }
}

pub(super) fn verify_message(
    key: PublicKey,
    hasher: HasherType,
    salt: SaltLen,
    msg: &[u8],
    sig: &[u8],
) -> anyhow::Result<bool> {
    let verifier = PSSVerify::new(key, hasher.hasher(), salt)?;
    Ok(verifier.verify(msg, sig))
}

pub(super) fn report(is_valid: bool) {
    if is_valid {
        println!("Validation success.");
    } else {
        println!("Validation failed.");
    }
}

#[cfg(test)]
mod tests {
    use super::VerifyArgs;
    use crate::cmd::{HashArgs, KeyArgs, MsgArgs, SignArgs, SignConfig};
    use crate::codec::KeyFormat;
    use crypto_hash::HasherType;
    use rsa_pss::rsa::SaltLen;

    #[test]
    fn key_sign_verify() {
        let dir = std::env::temp_dir().join(format!("pss-cmd-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let cfg = SignConfig {
            key_bits: 768,
            ..Default::default()
        };
        let (pub_file, priv_file) = (dir.join("pub.json"), dir.join("priv.json"));
        let sig = dir.join("msg.sig");

        let key = || KeyArgs {
            bits: None,
            pub_file: pub_file.clone(),
            priv_file: priv_file.clone(),
            rounds: Some(20),
            format: KeyFormat::Json,
            force: false,
        };
        key().exe(&cfg).unwrap();
        // 密钥文件已存在
        assert!(key().exe(&cfg).is_err());

        let hash = HashArgs {
            hasher: Some(HasherType::SHA2_256),
            salt: Some(SaltLen::Max),
        };
        SignArgs {
            priv_file: priv_file.clone(),
            msg: MsgArgs::default(),
            sig: Some(sig.clone()),
            hash: hash.clone(),
            prefix: false,
            force: false,
        }
        .exe(&cfg, Some(b"message from the pipe"))
        .unwrap();

        let verify = |msg: &[u8], hash: HashArgs| {
            VerifyArgs {
                pub_file: pub_file.clone(),
                msg: MsgArgs::default(),
                sig: sig.clone(),
                hash,
            }
            .exe(&cfg, Some(msg))
            .unwrap()
        };
        assert!(verify(b"message from the pipe", hash.clone()));
        assert!(!verify(b"message from the pipe!", hash.clone()));
        assert!(!verify(b"message from the pipe", HashArgs::default()));

        // 没有消息
        let res = VerifyArgs {
            pub_file: pub_file.clone(),
            msg: MsgArgs::default(),
            sig: sig.clone(),
            hash,
        }
        .exe(&cfg, None);
        assert!(res.is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
