use std::path::Path;
use std::process::Command;

/// Short commit hash of the workspace, if git is available.
fn git_short_sha(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_owned();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let manifest = std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into());
    let workspace = Path::new(&manifest).join("..");

    let sha = git_short_sha(&workspace).unwrap_or_else(|| "unknown".to_owned());
    println!("cargo:rustc-env=SHEETBUDGET_BUILD_SHA={sha}");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
