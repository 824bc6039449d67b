// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generates `include/zephyr/dt-bindings/pinctrl/<soc>-pinctrl.h` from a
//! per-chip `<soc>.yml` pin table.
//!
//! The header is written to `<soc>-pinctrl-temp.h` first and renamed over
//! the final path only once it is complete, so the committed header is
//! either the old one or the new one and never a partial write. If the
//! pin table is rejected, the temporary file is removed and the existing
//! header is left alone.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub mod config;
pub mod header;

pub use config::{ConfigError, Direction, PinDescriptor, PinctrlConfig};

/// Where generated headers live, relative to the Zephyr base directory.
pub const OUTPUT_DIR: &str = "include/zephyr/dt-bindings/pinctrl";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub tmp: PathBuf,
    pub out: PathBuf,
}

impl OutputPaths {
    pub fn new(base: &Path, soc: &str) -> Self {
        let dir = base.join(OUTPUT_DIR);
        Self {
            tmp: dir.join(format!("{soc}-pinctrl-temp.h")),
            out: dir.join(format!("{soc}-pinctrl.h")),
        }
    }
}

/// The SOC a pin table describes is named by its file, e.g. `esp32s3.yml`.
pub fn soc_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("can't derive SOC name from {}", path.display()))
}

/// Generates the header for `input` under `base`, returning the path of
/// the committed file.
pub fn generate(base: &Path, input: &Path, year: i32) -> Result<PathBuf> {
    let soc = soc_from_path(input)?;
    let paths = OutputPaths::new(base, &soc);
    log::info!("generating pinctrl header for {soc} from {}", input.display());

    let config = config::load(input)?;

    if let Err(e) = write_header(&paths.tmp, &soc, year, &config) {
        remove_tmp(&paths.tmp);
        return Err(e);
    }

    // rename(2) replaces an existing header atomically.
    if let Err(e) = fs::rename(&paths.tmp, &paths.out) {
        remove_tmp(&paths.tmp);
        return Err(e).with_context(|| {
            format!("failed to move header into {}", paths.out.display())
        });
    }
    log::info!("committed {}", paths.out.display());

    Ok(paths.out)
}

fn write_header(
    path: &Path,
    soc: &str,
    year: i32,
    config: &PinctrlConfig,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    header::emit(&mut out, soc, year, config)?;
    out.flush()?;
    out.get_ref().sync_all()?;
    Ok(())
}

fn remove_tmp(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::info!("removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
        Err(e) => log::warn!("failed to remove {}: {e}", path.display()),
    }
}
