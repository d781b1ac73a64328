use std::env;
use std::process::Command;

/// Short commit hash of the checkout, if git is available.
fn git_short_sha() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed=BINCI_GIT_SHA");
    println!("cargo:rerun-if-changed=.git/HEAD");

    // packaged builds have no .git: let the environment provide the hash
    let sha = env::var("BINCI_GIT_SHA")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(git_short_sha);

    if let Some(sha) = sha {
        println!("cargo:rustc-env=BINCI_GIT_SHA={}", sha);
    }
}
