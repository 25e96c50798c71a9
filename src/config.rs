use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "passkey-wallet", version, about = "Passkey-protected wallet storage")]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Directory holding resident keys and credential records [default: XDG data dir].
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Relying-party id the passkey is scoped to.
    #[arg(long, default_value = "localhost", global = true)]
    pub rp_id: String,
    #[arg(long, default_value = "pinentry", global = true)]
    pub pinentry: String,
    /// Approve user verification without prompting.
    #[arg(long, global = true)]
    pub assume_yes: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a passkey and a new wallet for USER, replacing any existing one.
    Setup { user: String },
    /// Assert USER's passkey and decrypt the stored wallet.
    Unlock { user: String },
    /// Show whether USER has a stored credential record.
    Status { user: String },
    /// Delete all resident keys and credential records, then exit.
    Wipe,
}

impl Config {
    pub fn resolve_data_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Ok(directories::ProjectDirs::from("", "", "passkey-wallet")
            .ok_or_else(|| anyhow::anyhow!("cannot determine XDG data dir"))?
            .data_dir()
            .to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_setup_with_globals() {
        let cfg = Config::parse_from([
            "passkey-wallet", "-vv", "setup", "alice", "--rp-id", "example.com", "--assume-yes",
        ]);
        assert_eq!(cfg.verbose, 2);
        assert_eq!(cfg.rp_id, "example.com");
        assert!(cfg.assume_yes);
        assert!(matches!(cfg.command, Command::Setup { ref user } if user == "alice"));
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::parse_from(["passkey-wallet", "wipe"]);
        assert_eq!(cfg.rp_id, "localhost");
        assert_eq!(cfg.pinentry, "pinentry");
        assert!(!cfg.assume_yes);
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let cfg = Config::parse_from(["passkey-wallet", "--data-dir", "/tmp/pw", "status", "bob"]);
        assert_eq!(cfg.resolve_data_dir().unwrap(), PathBuf::from("/tmp/pw"));
    }
}
