use clap::{Parser, Subcommand};
use log::LevelFilter;
use rsa_pss_sign::cmd::{DemoArgs, KeyArgs, SignArgs, SignConfig, VerifyArgs};
use rsa_pss_sign::log_error;
use std::io::Read;

#[derive(Parser)]
#[command(name = "pss", version = env!("PSS_VERSION_INFO"))]
#[command(about = "RSA-PSS signature generator and verifier")]
struct PssArgs {
    #[arg(short, long, global = true)]
    #[arg(help = "read the message from the stdin when no message file given")]
    pipe: bool,

    #[arg(long, global = true, value_name = "PATH")]
    #[arg(help = "the configuration file path(json or json5)")]
    config: Option<String>,

    #[command(subcommand)]
    cmd: PssSubArgs,
}

#[derive(Subcommand)]
enum PssSubArgs {
    Key(KeyArgs),
    Sign(SignArgs),
    Verify(VerifyArgs),
    Demo(DemoArgs),
}

impl PssSubArgs {
    // Ok(false)表示签名验证失败
    fn exe(self, cfg: &SignConfig, pipe: Option<&[u8]>) -> anyhow::Result<bool> {
        match self {
            PssSubArgs::Key(a) => a.exe(cfg).map(|_| true),
            PssSubArgs::Sign(a) => a.exe(cfg, pipe).map(|_| true),
            PssSubArgs::Verify(a) => a.exe(cfg, pipe),
            PssSubArgs::Demo(a) => a.exe(cfg).map(|_| true),
        }
    }
}

fn run(args: PssArgs) -> anyhow::Result<bool> {
    let cfg = SignConfig::load(args.config.as_deref())?;

    let mut pdata = Vec::with_capacity(1024);
    let pipe = if args.pipe {
        let _len = std::io::stdin().lock().read_to_end(&mut pdata)?;
        Some(pdata.as_slice())
    } else {
        None
    };

    args.cmd.exe(&cfg, pipe)
}

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    match log_error(run(PssArgs::parse())) {
        Some(true) => {}
        Some(false) => std::process::exit(2),
        None => std::process::exit(1),
    }
}
