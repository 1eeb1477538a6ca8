// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output writers: the aligned model document and the pipeline report.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use structalign_core::{Model, Result};
use structalign_transform::PipelineReport;

/// Writes the aligned model document.
pub fn write_model(path: &Path, model: &Model) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), model)?;
    Ok(())
}

/// Writes the pipeline report.
pub fn write_report(path: &Path, report: &PipelineReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}
