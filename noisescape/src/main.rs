//! Entry point for the noisescape viewer binary.
//!
//! Parses the command line and hands off to [`noisescape::app`],
//! which either opens the viewer window or, with `--headless-check`,
//! exercises shader compilation and geometry generation and exits.

use anyhow::Result;
use clap::Parser;

use noisescape::app::{self, Options};

fn main() -> Result<()> {
    app::run(Options::parse())
}
