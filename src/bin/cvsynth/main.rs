//! cvsynth - play the two-operator FM voice from the terminal
//!
//! Run with: cargo run --release

mod app;
mod keys;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run()
}
