use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = passkey_wallet::config::Config::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(passkey_wallet::run(cfg))
}
