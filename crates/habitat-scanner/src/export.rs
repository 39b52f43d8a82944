//! CSV and JSON output of accumulated collections.
//!
//! Output names are fixed, so every export overwrites the previous one:
//!
//! - `properties_<section slug>.csv` per section
//! - `properties_all.csv` with every section's rows, in section order
//! - `properties_all.json` with every record as an object keyed by column name
//!
//! Each file is written next to its destination and renamed into place, so an
//! interrupted export leaves the previous file intact.

use crate::error::Result;
use habitat_core::{CanonicalField, ExportConfig, PropertyRecord, SectionCollection};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const FILE_PREFIX: &str = "properties_";
const COMBINED_STEM: &str = "all";

/// Files written by one [`BatchExporter::export_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Every file written, per-section CSVs first
    pub files: Vec<PathBuf>,
    /// Data rows per section CSV, in section order
    pub section_rows: Vec<(String, usize)>,
    /// Data rows in the combined CSV
    pub total_rows: usize,
}

/// Writes section collections to `output_dir`.
#[derive(Debug, Clone)]
pub struct BatchExporter {
    output_dir: PathBuf,
    utf8_bom: bool,
}

impl BatchExporter {
    /// Exporter writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, utf8_bom: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            utf8_bom,
        }
    }

    /// Exporter built from the export configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.output_dir.clone(), config.utf8_bom)
    }

    /// Directory receiving the files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every collection, the combined CSV and the combined JSON.
    ///
    /// Sections without records still get a header-only CSV.
    pub fn export_all(&self, sections: &[SectionCollection]) -> Result<ExportReport> {
        fs::create_dir_all(&self.output_dir)?;
        let mut report = ExportReport::default();

        for section in sections {
            let path = self.csv_path(&section_stem(section));
            self.write_csv(&path, section.records.iter())?;
            report.section_rows.push((section.name.clone(), section.len()));
            report.files.push(path);
        }

        let all_records = || sections.iter().flat_map(|s| s.records.iter());

        let combined = self.csv_path(COMBINED_STEM);
        self.write_csv(&combined, all_records())?;
        report.total_rows = all_records().count();
        report.files.push(combined);

        let json = self.output_dir.join(format!("{FILE_PREFIX}{COMBINED_STEM}.json"));
        let records: Vec<&PropertyRecord> = all_records().collect();
        write_atomically(&json, |out| {
            serde_json::to_writer_pretty(&mut *out, &records)?;
            out.write_all(b"\n")?;
            Ok(())
        })?;
        report.files.push(json);

        tracing::info!(
            dir = %self.output_dir.display(),
            sections = sections.len(),
            rows = report.total_rows,
            "exported collections"
        );

        Ok(report)
    }

    fn csv_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{FILE_PREFIX}{stem}.csv"))
    }

    fn write_csv<'a>(
        &self,
        path: &Path,
        records: impl Iterator<Item = &'a PropertyRecord>,
    ) -> Result<()> {
        write_atomically(path, |out| {
            if self.utf8_bom {
                out.write_all(UTF8_BOM)?;
            }
            let mut writer = csv::Writer::from_writer(&mut *out);
            writer.write_record(CanonicalField::ALL.iter().map(CanonicalField::display_name))?;
            for record in records {
                writer.write_record(record.to_row())?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

/// File stem for a section, kept apart from the combined file's stem.
fn section_stem(section: &SectionCollection) -> String {
    let slug = section.slug();
    if slug == COMBINED_STEM {
        format!("section-{slug}")
    } else {
        slug
    }
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut out = BufWriter::new(File::create(&tmp)?);
    write(&mut out)?;
    out.flush()?;
    out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
