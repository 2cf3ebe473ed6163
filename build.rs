use chrono::{DateTime, Local};
use std::{process::Command, time::SystemTime};

fn exe_cmd(cmd: &mut Command) -> anyhow::Result<String> {
    let output = cmd.output()?;

    if output.status.success() {
        Ok(String::from_utf8(output.stdout)?)
    } else {
        Err(anyhow::anyhow!(String::from_utf8(output.stderr)?))
    }
}

fn main() {
    // 不在git仓库中构建时, 版本信息里只缺少提交号
    let git_commit_hash = match exe_cmd(Command::new("git").args([
        "log",
        "-n",
        "1",
        "--pretty=format:%h",
    ])) {
        Ok(s) => s.trim().to_string(),
        Err(e) => {
            println!("cargo:warning=git log run failed: {}", e.to_string().trim());
            String::default()
        }
    };

    let timestamp = DateTime::<Local>::from(SystemTime::now()).format("%Y/%m/%d-%H:%M:%S:%Z");
    if git_commit_hash.is_empty() {
        println!(
            "cargo:rustc-env=PSS_VERSION_INFO={}-{}",
            env!("CARGO_PKG_VERSION"),
            timestamp
        );
    } else {
        println!(
            "cargo:rustc-env=PSS_VERSION_INFO={}-{}-{}",
            env!("CARGO_PKG_VERSION"),
            git_commit_hash,
            timestamp
        );
    }
}
