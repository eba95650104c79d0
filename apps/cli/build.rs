use std::process::Command;

/// Short commit hash for the build, or `None` outside a git checkout.
/// `SALES_SEED_COMMIT` takes precedence so release tarballs can stamp one.
fn commit_hash() -> Option<String> {
    if let Ok(stamp) = std::env::var("SALES_SEED_COMMIT") {
        return Some(stamp).filter(|s| !s.is_empty());
    }
    let out = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let hash = String::from_utf8(out.stdout).ok()?;
    Some(hash.trim().to_owned()).filter(|s| !s.is_empty())
}

fn main() {
    // `sales-seed --version` prints "<pkg version> (<commit>)".
    let commit = commit_hash().unwrap_or_else(|| "unknown".to_owned());
    println!("cargo:rustc-env=SALES_SEED_COMMIT={commit}");
    println!("cargo:rerun-if-env-changed=SALES_SEED_COMMIT");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
