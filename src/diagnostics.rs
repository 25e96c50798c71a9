use std::path::Path;

use crate::config::Config;

pub fn check(cfg: &Config, data_dir: &Path) -> anyhow::Result<()> {
    let mut errors: Vec<String> = Vec::new();

    // Check 1: data dir writable
    let probe = data_dir.join(".write-probe");
    match std::fs::create_dir_all(data_dir).and_then(|()| std::fs::write(&probe, b"")) {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
        }
        Err(e) => errors.push(format!(
            "cannot write to data dir {}: {e}\n  \
             → pass a writable directory with --data-dir",
            data_dir.display()
        )),
    }

    // Check 2: pinentry binary found (not needed with --assume-yes)
    if !cfg.assume_yes {
        if let Err(e) = std::process::Command::new(&cfg.pinentry).arg("--version").output() {
            errors.push(format!(
                "pinentry binary not found: '{}': {e}\n  \
                 → install pinentry, or pass --assume-yes for headless use",
                cfg.pinentry
            ));
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len());
}
