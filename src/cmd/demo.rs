use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::key::{generate_key_pair, save_key_pair};
use super::sign::sign_message;
use super::verify::{report, verify_message};
use super::SignConfig;
use crate::codec::{
    decode_signature, encode_signature, load_private_key, load_public_key, write_file, KeyFormat,
};

const SAMPLE_DOCUMENT: &str = "This is the original content of the sample document.
The digital signature guarantees the authenticity and integrity of this text.
";

const TAMPERED_LINE: &str =
    "\n>>> EXTRA LINE: this line invalidates the previous signature. <<<";

#[derive(Args)]
#[command(about = "generate keys, sign a sample document, verify it before and after tampering")]
pub struct DemoArgs {
    #[arg(value_name = "BITS")]
    #[arg(help = "the modulus bits, default using the `key_bits` configuration")]
    pub bits: Option<usize>,

    #[arg(short, long, default_value = "pss-demo", help = "the working directory")]
    pub dir: PathBuf,
}

impl DemoArgs {
    pub fn exe(self, cfg: &SignConfig) -> anyhow::Result<()> {
        let pub_file = self.dir.join("keys").join("public.pem");
        let priv_file = self.dir.join("keys").join("private.pem");
        let doc_file = self.dir.join("docs").join("sample.txt");
        let sig_file = self.dir.join("sigs").join("sample.txt.sig");
        let (hasher, salt) = (cfg.hasher_type()?, cfg.salt_len()?);

        println!("--- STEP 1: KEY GENERATION ---");
        if pub_file.exists() && priv_file.exists() {
            println!("Key files already exist, skip the key generation.");
        } else {
            let (pk, sk) = generate_key_pair(cfg, self.bits, None)?;
            save_key_pair(&pk, &sk, &pub_file, &priv_file, KeyFormat::Pem, true)?;
            println!(
                "Keys saved in `{}` and `{}`.",
                pub_file.display(),
                priv_file.display()
            );
        }
        let (pk, sk) = (load_public_key(&pub_file)?, load_private_key(&priv_file)?);

        println!("\n--- STEP 2: DOCUMENT SIGNING ---");
        write_file(&doc_file, SAMPLE_DOCUMENT.as_bytes(), true)?;
        println!("File `{}` created for the test.", doc_file.display());
        let sig = sign_message(sk, hasher, salt, std::fs::read(&doc_file)?.as_slice())?;
        write_file(&sig_file, encode_signature(sig.as_slice()).as_bytes(), true)?;
        println!("Signature saved in `{}`.", sig_file.display());

        println!("\n--- STEP 3: VERIFICATION (original document) ---");
        let sig = decode_signature(std::fs::read(&sig_file)?.as_slice())?;
        let before = verify_message(
            pk.clone(),
            hasher,
            salt,
            std::fs::read(&doc_file)?.as_slice(),
            sig.as_slice(),
        )?;
        report(before);

        println!("\n--- STEP 4: VERIFICATION (tampered document) ---");
        let mut f = std::fs::OpenOptions::new().append(true).open(&doc_file)?;
        f.write_all(TAMPERED_LINE.as_bytes())?;
        drop(f);
        println!("File `{}` modified.", doc_file.display());
        let after = verify_message(
            pk,
            hasher,
            salt,
            std::fs::read(&doc_file)?.as_slice(),
            sig.as_slice(),
        )?;
        report(after);

        if before && !after {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "unexpected verification results: original `{before}`, tampered `{after}`"
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DemoArgs;
    use crate::cmd::SignConfig;

    #[test]
    fn demo_flow() {
        let dir = std::env::temp_dir().join(format!("pss-demo-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let cfg = SignConfig::default();

        let demo = || DemoArgs {
            bits: Some(768),
            dir: dir.clone(),
        };
        demo().exe(&cfg).unwrap();
        assert!(dir.join("keys/public.pem").exists());
        assert!(dir.join("sigs/sample.txt.sig").exists());

        // 再次运行时复用已有的密钥
        let key = std::fs::read(dir.join("keys/private.pem")).unwrap();
        demo().exe(&cfg).unwrap();
        assert_eq!(std::fs::read(dir.join("keys/private.pem")).unwrap(), key);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
