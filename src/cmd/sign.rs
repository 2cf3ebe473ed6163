use std::path::PathBuf;

use clap::Args;
use crypto_hash::HasherType;
use rsa_pss::rsa::{PSSSign, PrivateKey, SaltLen};
use rsa_pss::{DefaultRand, Sign};

use super::{check_new_file, HashArgs, MsgArgs, SignConfig};
use crate::codec::{encode_signature, load_private_key, write_file};

#[derive(Args)]
#[command(about = "sign the message with the RSA-PSS private key")]
pub struct SignArgs {
    #[arg(long = "priv", value_name = "PATH", help = "the private key file path")]
    pub priv_file: PathBuf,

    #[command(flatten)]
    pub msg: MsgArgs,

    #[arg(long, value_name = "PATH", help = "the file path to save the base64 signature")]
    pub sig: Option<PathBuf>,

    #[command(flatten)]
    pub hash: HashArgs,

    #[arg(long = "0x", help = "display prefix with `0x`")]
    pub prefix: bool,

    #[arg(long, help = "overwrite the existing signature file")]
    pub force: bool,
}

impl SignArgs {
    pub fn exe(self, cfg: &SignConfig, pipe: Option<&[u8]>) -> anyhow::Result<()> {
        if let Some(p) = self.sig.as_deref() {
            check_new_file(p, self.force)?;
        }

        let (hasher, salt) = self.hash.resolve(cfg)?;
        let key = load_private_key(&self.priv_file)?;
        let msg = self.msg.read(pipe)?;

        let sig = sign_message(key, hasher, salt, msg.as_slice())?;

        if let Some(p) = self.sig.as_deref() {
            let mut s = encode_signature(sig.as_slice());
            s.push('\n');
            write_file(p, s.as_bytes(), self.force)?;
            log::info!("signature saved in `{}`", p.display());
        }

        if self.prefix {
            println!("0x{}", hex::encode(sig.as_slice()));
        } else {
            println!("{}", hex::encode(sig.as_slice()));
        }

        Ok(())
    }
}

pub(super) fn sign_message(
    key: PrivateKey,
    hasher: HasherType,
    salt: SaltLen,
    msg: &[u8],
) -> anyhow::Result<Vec<u8>> {
    let signer = PSSSign::new(key, hasher.hasher(), DefaultRand::default(), salt)?;
    log::debug!(
        "rsa-pss sign: modulus {} bits, hasher {}, salt {} bytes",
        signer.key_bits(),
        hasher,
        signer.salt_len()
    );

    let mut sig = Vec::with_capacity(signer.key_len());
    signer.sign(msg, &mut sig)?;
    Ok(sig)
}
