//! keybed - play the computer keyboard like a piano
//!
//! Run with: cargo run --release
//! Set RUST_LOG=debug to log engine events to keybed.log.

mod app;
mod ui;

use std::fs::File;

use color_eyre::eyre::WrapErr;

fn init_logging() -> color_eyre::Result<()> {
    // The TUI owns the terminal, so logs only go to a file and only on request.
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }
    let file = File::create("keybed.log").wrap_err("failed to create keybed.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging()?;

    app::Keybed::new().octaves(2).run()
}
