pub mod bundle;
pub mod xlsx;

use std::path::Path;

use tracing::info;

use crate::error::InvmapError;
use crate::model::Extraction;

/// File names derived from the source PDF's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    /// The PDF's file name, as stored in the bundle.
    pub pdf: String,
    /// Standalone workbook download.
    pub workbook: String,
    /// Workbook name inside the bundle.
    pub bundled_workbook: String,
    pub bundle: String,
}

impl OutputNames {
    /// `invoice.2024.pdf` gives `invoice_template_mapping.xlsx`,
    /// `invoice_mapped.xlsx` and `invoice_template_bundle.zip`.
    pub fn for_pdf(pdf_path: &Path) -> Self {
        let pdf = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = pdf.split('.').next().unwrap_or_default().to_string();
        OutputNames {
            workbook: format!("{base}_template_mapping.xlsx"),
            bundled_workbook: format!("{base}_mapped.xlsx"),
            bundle: format!("{base}_template_bundle.zip"),
            pdf,
        }
    }
}

/// The downloadable artifacts for one extraction.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub names: OutputNames,
    pub workbook: Vec<u8>,
    pub bundle: Vec<u8>,
}

impl Artifacts {
    pub fn build(
        pdf_path: &Path,
        pdf_bytes: &[u8],
        extraction: &Extraction,
    ) -> Result<Self, InvmapError> {
        let names = OutputNames::for_pdf(pdf_path);
        let workbook = xlsx::write_workbook(&extraction.sheets)?;
        let bundle = bundle::write_bundle(&[
            (names.pdf.as_str(), pdf_bytes),
            (names.bundled_workbook.as_str(), workbook.as_slice()),
        ])?;
        Ok(Artifacts {
            names,
            workbook,
            bundle,
        })
    }

    /// Write the workbook and the bundle into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<Vec<std::path::PathBuf>, InvmapError> {
        std::fs::create_dir_all(dir)?;
        let workbook_path = dir.join(&self.names.workbook);
        let bundle_path = dir.join(&self.names.bundle);
        std::fs::write(&workbook_path, &self.workbook)?;
        std::fs::write(&bundle_path, &self.bundle)?;
        info!(
            workbook = %workbook_path.display(),
            bundle = %bundle_path.display(),
            "Outputs written"
        );
        Ok(vec![workbook_path, bundle_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_use_text_before_first_dot() {
        let names = OutputNames::for_pdf(Path::new("/tmp/in/INV-1001.march.pdf"));
        assert_eq!(names.pdf, "INV-1001.march.pdf");
        assert_eq!(names.workbook, "INV-1001_template_mapping.xlsx");
        assert_eq!(names.bundled_workbook, "INV-1001_mapped.xlsx");
        assert_eq!(names.bundle, "INV-1001_template_bundle.zip");
    }
}
