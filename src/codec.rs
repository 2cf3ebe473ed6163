//! 密钥和签名的文本格式
//!
//! - PEM: 标签为`RSA PUBLIC KEY`/`RSA PRIVATE KEY`, 内容为依次排列的`u32-be长度 || 大端整数`字段.
//!   公钥字段为`n, e`; 私钥字段为`n, d, e`.
//! - JSON: `PublicKey`/`PrivateKey`的serde序列化.
//! - 签名: 单行base64(标准字母表).

use crate::error::AppError;
use base64::{prelude::BASE64_STANDARD, Engine};
use clap::ValueEnum;
use num_bigint::BigUint;
use num_traits::Zero;
use pem::{EncodeConfig, LineEnding, Pem};
use rsa_pss::rsa::{PrivateKey, PublicKey};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

pub const PUBLIC_KEY_TAG: &str = "RSA PUBLIC KEY";
pub const PRIVATE_KEY_TAG: &str = "RSA PRIVATE KEY";

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum KeyFormat {
    #[default]
    #[value(name = "pem")]
    Pem,
    #[value(name = "json")]
    Json,
}

impl KeyFormat {
    pub fn encode_public(self, key: &PublicKey) -> anyhow::Result<String> {
        match self {
            KeyFormat::Pem => Ok(public_key_to_pem(key)),
            KeyFormat::Json => Ok(serde_json::to_string_pretty(key)?),
        }
    }

    pub fn encode_private(self, key: &PrivateKey) -> anyhow::Result<String> {
        match self {
            KeyFormat::Pem => Ok(private_key_to_pem(key)),
            KeyFormat::Json => Ok(serde_json::to_string_pretty(key)?),
        }
    }
}

fn push_field(buf: &mut Vec<u8>, x: &BigUint) {
    let mut bytes = x.to_bytes_be();
    buf.extend((bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes.as_slice());

    #[cfg(feature = "sec-zeroize")]
    bytes.zeroize();
}

struct FieldReader<'a> {
    data: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn next_field(&mut self, name: &'static str) -> Result<BigUint, AppError> {
        let Some((len, rest)) = self.data.split_first_chunk::<4>() else {
            return Err(AppError::TruncatedField(name));
        };

        let len = u32::from_be_bytes(*len) as usize;
        if rest.len() < len {
            return Err(AppError::TruncatedField(name));
        }

        let (x, rest) = rest.split_at(len);
        self.data = rest;

        let x = BigUint::from_bytes_be(x);
        if x.is_zero() {
            Err(AppError::ZeroField(name))
        } else {
            Ok(x)
        }
    }

    fn finish(self) -> Result<(), AppError> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(AppError::TrailingBytes(self.data.len()))
        }
    }
}

fn encode_pem(tag: &str, contents: Vec<u8>) -> String {
    let pem = Pem::new(tag, contents);
    let s = pem::encode_config(&pem, EncodeConfig::new().set_line_ending(LineEnding::LF));

    #[cfg(feature = "sec-zeroize")]
    pem.into_contents().zeroize();

    s
}

fn parse_pem(data: &str, tag: &str) -> anyhow::Result<Pem> {
    let pem = pem::parse(data)?;
    if pem.tag() != tag {
        return Err(AppError::InvalidPemTag {
            expect: tag.to_string(),
            real: pem.tag().to_string(),
        }
        .into());
    }

    Ok(pem)
}

pub fn public_key_to_pem(key: &PublicKey) -> String {
    let mut buf = Vec::with_capacity(key.key_len() + 16);
    push_field(&mut buf, key.modulus());
    push_field(&mut buf, key.exponent());
    encode_pem(PUBLIC_KEY_TAG, buf)
}

pub fn private_key_to_pem(key: &PrivateKey) -> String {
    let mut buf = Vec::with_capacity((key.modulus_bits() >> 2) + 16);
    push_field(&mut buf, key.modulus());
    push_field(&mut buf, key.private_exponent());
    push_field(&mut buf, key.public_exponent());
    encode_pem(PRIVATE_KEY_TAG, buf)
}

pub fn public_key_from_pem(data: &str) -> anyhow::Result<PublicKey> {
    let pem = parse_pem(data, PUBLIC_KEY_TAG)?;
    let mut rd = FieldReader::new(pem.contents());
    let (n, e) = (rd.next_field("n")?, rd.next_field("e")?);
    rd.finish()?;

    Ok(PublicKey::new(n, e)?)
}

pub fn private_key_from_pem(data: &str) -> anyhow::Result<PrivateKey> {
    let pem = parse_pem(data, PRIVATE_KEY_TAG)?;
    let mut rd = FieldReader::new(pem.contents());
    let (n, d, e) = (
        rd.next_field("n")?,
        rd.next_field("d")?,
        rd.next_field("e")?,
    );
    let res = rd.finish();

    #[cfg(feature = "sec-zeroize")]
    pem.into_contents().zeroize();

    res?;
    Ok(PrivateKey::new(n, e, d)?)
}

fn is_json(data: &str) -> bool {
    data.trim_start().starts_with('{')
}

/// 按内容识别PEM或JSON格式
pub fn public_key_from_str(data: &str) -> anyhow::Result<PublicKey> {
    if is_json(data) {
        let key: PublicKey = serde_json::from_str(data)?;
        key.is_valid()?;
        Ok(key)
    } else {
        public_key_from_pem(data)
    }
}

/// 按内容识别PEM或JSON格式
pub fn private_key_from_str(data: &str) -> anyhow::Result<PrivateKey> {
    if is_json(data) {
        let key: PrivateKey = serde_json::from_str(data)?;
        key.is_valid()?;
        Ok(key)
    } else {
        private_key_from_pem(data)
    }
}

pub fn load_public_key(p: &Path) -> anyhow::Result<PublicKey> {
    let data = std::fs::read_to_string(p)?;
    let key = public_key_from_str(data.as_str());
    log::debug!("load public key from `{}`", p.display());
    key
}

pub fn load_private_key(p: &Path) -> anyhow::Result<PrivateKey> {
    #[allow(unused_mut)]
    let mut data = std::fs::read_to_string(p)?;
    let key = private_key_from_str(data.as_str());

    #[cfg(feature = "sec-zeroize")]
    data.zeroize();

    log::debug!("load private key from `{}`", p.display());
    key
}

pub fn encode_signature(sig: &[u8]) -> String {
    BASE64_STANDARD.encode(sig)
}

pub fn decode_signature(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let data = data
        .iter()
        .copied()
        .filter(|x| !x.is_ascii_whitespace())
        .collect::<Vec<_>>();
    if data.is_empty() {
        return Err(AppError::InvalidSignatureFile("empty signature".to_string()));
    }

    BASE64_STANDARD
        .decode(data)
        .map_err(|e| AppError::InvalidSignatureFile(e.to_string()))
}

/// 写入新文件, 文件已存在且`force`为`false`时返回错误
pub fn write_file(p: &Path, data: &[u8], force: bool) -> anyhow::Result<()> {
    if p.exists() && !force {
        return Err(AppError::PathExist(p.display().to_string()).into());
    }

    if let Some(dir) = p.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(p)?;
    f.write_all(data)?;
    Ok(())
}
