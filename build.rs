use std::process::Command;

fn main() {
  println!("cargo:rerun-if-changed=.git/HEAD");

  let branch = git(&["rev-parse", "--abbrev-ref", "HEAD"]);
  let commit = git(&["rev-parse", "HEAD"]);
  let short = if commit.len() >= 7 && commit != "unknown" {
    commit[..7].to_string()
  } else {
    commit.clone()
  };

  println!("cargo:rustc-env=GIT_BRANCH={}", branch);
  println!("cargo:rustc-env=GIT_COMMIT={}", commit);
  println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", short);
}

fn git(args: &[&str]) -> String {
  Command::new("git")
    .args(args)
    .output()
    .ok()
    .filter(|output| output.status.success())
    .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
    .unwrap_or_else(|| "unknown".to_string())
}
