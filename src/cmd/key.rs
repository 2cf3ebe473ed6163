use std::path::{Path, PathBuf};

use clap::{builder::EnumValueParser, Args};
use rsa_pss::rsa::{PrivateKey, PublicKey};
use rsa_pss::DefaultRand;

#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

use super::{check_new_file, SignConfig};
use crate::codec::{write_file, KeyFormat};

#[derive(Args)]
#[command(about = "generate a RSA key pair")]
pub struct KeyArgs {
    #[arg(value_name = "BITS")]
    #[arg(help = "the modulus bits, an even number not less than 512\ndefault using the `key_bits` configuration")]
    pub bits: Option<usize>,

    #[arg(long = "pub", value_name = "PATH", help = "the public key file path")]
    pub pub_file: PathBuf,

    #[arg(long = "priv", value_name = "PATH", help = "the private key file path")]
    pub priv_file: PathBuf,

    #[arg(short, long, help = "the Miller-Rabin test rounds, 0 means scaled by the key size")]
    pub rounds: Option<usize>,

    #[arg(long, default_value = "pem", value_parser = EnumValueParser::<KeyFormat>::new())]
    pub format: KeyFormat,

    #[arg(long, help = "overwrite the existing key files")]
    pub force: bool,
}

impl KeyArgs {
    pub fn exe(self, cfg: &SignConfig) -> anyhow::Result<()> {
        check_new_file(&self.pub_file, self.force)?;
        check_new_file(&self.priv_file, self.force)?;

        let (pk, sk) = generate_key_pair(cfg, self.bits, self.rounds)?;
        save_key_pair(
            &pk,
            &sk,
            &self.pub_file,
            &self.priv_file,
            self.format,
            self.force,
        )?;

        println!(
            "Keys saved in `{}` and `{}`.",
            self.pub_file.display(),
            self.priv_file.display()
        );
        Ok(())
    }
}

pub(super) fn generate_key_pair(
    cfg: &SignConfig,
    bits: Option<usize>,
    rounds: Option<usize>,
) -> anyhow::Result<(PublicKey, PrivateKey)> {
    let mut kg = cfg.key_generator(bits);
    if let Some(r) = rounds {
        kg = kg.test_rounds(r);
    }

    log::info!(
        "generating a {}-bit RSA key pair with {} thread(s)",
        kg.bits(),
        cfg.threads
    );
    let (pk, sk) = cfg.install(|| kg.generate(&mut DefaultRand::default()))??;
    Ok((pk, sk))
}

pub(super) fn save_key_pair(
    pk: &PublicKey,
    sk: &PrivateKey,
    pub_file: &Path,
    priv_file: &Path,
    format: KeyFormat,
    force: bool,
) -> anyhow::Result<()> {
    let s = format.encode_public(pk)?;
    write_file(pub_file, s.as_bytes(), force)?;

    #[allow(unused_mut)]
    let mut s = format.encode_private(sk)?;
    let res = write_file(priv_file, s.as_bytes(), force);

    #[cfg(feature = "sec-zeroize")]
    s.zeroize();

    res
}
