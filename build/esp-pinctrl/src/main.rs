// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Result;
use build_esp_pinctrl::ConfigError;
use chrono::Datelike;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(max_term_width = 80, about = "ESP32 pinctrl header generator")]
struct Args {
    /// Path to the SOC pin table (YAML), e.g. esp32s3.yml
    #[clap(short, long)]
    path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(base) = std::env::var_os("ZEPHYR_BASE") else {
        println!("Missing ZEPHYR_BASE environment variable");
        return Ok(());
    };
    let base = PathBuf::from(base);
    log::info!("Zephyr base: {}", base.display());

    let year = chrono::Local::now().year();
    match build_esp_pinctrl::generate(&base, &args.path, year) {
        Ok(out) => {
            println!("Output file: {}", out.display());
            Ok(())
        }
        Err(e) => match e.downcast_ref::<ConfigError>() {
            Some(cfg) => {
                eprintln!("{cfg}");
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}
