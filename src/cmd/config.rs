use config::Config;
use crypto_hash::HasherType;
use rsa_pss::rsa::{KeyGenerator, SaltLen};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct SignConfig {
    // modulus bits of the generated key
    pub key_bits: usize,

    // Miller-Rabin rounds, 0 means max(40, bits / 64)
    pub prime_test_rounds: usize,

    // prime pair retry budget
    pub keygen_attempts: usize,

    // candidates per prime, 0 means max(1024, 64 * bits / 2)
    pub prime_search_attempts: usize,

    pub hasher: String,

    // `digest`, `max` or a byte count
    pub salt_len: String,

    // maximum creatable threads
    pub threads: usize,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            key_bits: 2048,
            prime_test_rounds: 0,
            keygen_attempts: KeyGenerator::DEFAULT_KEYGEN_ATTEMPTS,
            prime_search_attempts: 0,
            hasher: HasherType::default().to_string(),
            salt_len: SaltLen::default().to_string(),
            threads: (num_cpus::get() >> 1).max(1),
        }
    }
}

impl SignConfig {
    pub const ENV_PREFIX: &'static str = "PSS";

    /// 默认值 < 配置文件`f` < 环境变量`PSS__*`
    pub fn load(f: Option<&str>) -> anyhow::Result<Self> {
        let default_config = Config::try_from(&SignConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::with_name(f).required(false));
        }
        config = config.add_source(
            config::Environment::with_prefix(Self::ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );

        let mut cfg: SignConfig = config.build()?.try_deserialize()?;
        cfg.threads = cfg.threads.max(1);
        cfg.keygen_attempts = cfg.keygen_attempts.max(1);
        cfg.check()?;

        log::trace!("{:?}", cfg);

        Ok(cfg)
    }

    fn check(&self) -> Result<(), AppError> {
        self.hasher_type()?;
        self.salt_len()?;
        Ok(())
    }

    pub fn hasher_type(&self) -> Result<HasherType, AppError> {
        self.hasher
            .parse::<HasherType>()
            .map_err(|e| AppError::ConfigFailed(format!("hasher: {e}")))
    }

    pub fn salt_len(&self) -> Result<SaltLen, AppError> {
        self.salt_len
            .parse::<SaltLen>()
            .map_err(|e| AppError::ConfigFailed(format!("salt_len: {e}")))
    }

    /// 按配置设置密钥生成参数, `bits`为`None`时使用`key_bits`
    pub fn key_generator(&self, bits: Option<usize>) -> KeyGenerator {
        KeyGenerator::new(bits.unwrap_or(self.key_bits))
            .test_rounds(self.prime_test_rounds)
            .keygen_attempts(self.keygen_attempts)
            .prime_search_attempts(self.prime_search_attempts)
            .parallel(self.threads > 1)
    }

    /// 在`threads`个线程的rayon线程池中执行`f`
    pub fn install<T: Send>(&self, f: impl FnOnce() -> T + Send) -> anyhow::Result<T> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;
        Ok(pool.install(f))
    }
}

#[cfg(test)]
mod tests {
    use super::SignConfig;
    use crypto_hash::HasherType;
    use rsa_pss::rsa::SaltLen;

    #[test]
    fn default_config() {
        let cfg = SignConfig::default();
        assert_eq!(cfg.key_bits, 2048);
        assert_eq!(cfg.hasher_type().unwrap(), HasherType::SHA3_256);
        assert_eq!(cfg.salt_len().unwrap(), SaltLen::Digest);
        assert!(cfg.threads >= 1);
        assert_eq!(cfg.key_generator(None).bits(), 2048);
        assert_eq!(cfg.key_generator(Some(1024)).bits(), 1024);
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join(format!("pss-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let f = dir.join("pss.json");
        std::fs::write(
            &f,
            r#"{"key_bits": 1024, "hasher": "SHA2-256", "salt_len": "max", "threads": 0}"#,
        )
        .unwrap();
        let cfg = SignConfig::load(f.to_str()).unwrap();
        assert_eq!(cfg.key_bits, 1024);
        assert_eq!(cfg.hasher_type().unwrap(), HasherType::SHA2_256);
        assert_eq!(cfg.salt_len().unwrap(), SaltLen::Max);
        assert_eq!(cfg.threads, 1);
        assert_eq!(cfg.keygen_attempts, 64);

        std::fs::write(&f, r#"{"hasher": "md5"}"#).unwrap();
        assert!(SignConfig::load(f.to_str()).is_err());

        // 文件不存在时使用默认值
        let cfg = SignConfig::load(dir.join("none.json").to_str()).unwrap();
        assert_eq!(cfg.key_bits, SignConfig::default().key_bits);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
