//! Design artifact I/O.
//!
//! The design is written once (offline or on first start) as pretty-printed
//! JSON and loaded read-only at process start.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::info;

use crate::{Design, DesignGenerator, DesignResult};

/// Write `design` to `path`, creating parent directories.
pub fn save_design(path: &Path, design: &Design) -> DesignResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, design)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), scenarios = design.len(), "design saved");
    Ok(())
}

/// Load a design artifact from `path`.
pub fn load_design(path: &Path) -> DesignResult<Design> {
    let file = File::open(path)?;
    load_design_reader(BufReader::new(file))
}

/// Like [`load_design`] but accepts any `Read` source.
pub fn load_design_reader<R: Read>(reader: R) -> DesignResult<Design> {
    Ok(serde_json::from_reader(reader)?)
}

/// Startup helper: load the artifact at `path` if it exists, otherwise
/// generate it with `generator` and save it there.
///
/// A loaded design is validated against the generator's catalog and must
/// have exactly `n_scenarios` scenarios of `n_alternatives` alternatives.
pub fn load_or_generate(
    path:           &Path,
    generator:      &DesignGenerator<'_>,
    n_scenarios:    usize,
    n_alternatives: usize,
    seed:           u64,
) -> DesignResult<Design> {
    if path.exists() {
        let design = load_design(path)?;
        design.validate(generator.catalog(), n_alternatives)?;
        if design.len() != n_scenarios {
            return Err(crate::DesignError::Invalid(format!(
                "{} holds {} scenarios, expected {n_scenarios}",
                path.display(),
                design.len()
            )));
        }
        info!(path = %path.display(), scenarios = design.len(), "design loaded");
        return Ok(design);
    }

    let design = generator.generate(n_scenarios, n_alternatives, seed)?;
    save_design(path, &design)?;
    Ok(design)
}
