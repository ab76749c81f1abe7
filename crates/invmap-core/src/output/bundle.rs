use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::InvmapError;

/// Zip `(name, bytes)` entries, deflated, in the given order.
pub fn write_bundle(entries: &[(&str, &[u8])]) -> Result<Vec<u8>, InvmapError> {
    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in entries {
            zip.start_file(*name, options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_bundle_contains_entries() {
        let bytes = write_bundle(&[
            ("invoice.pdf", b"%PDF-1.7".as_slice()),
            ("invoice_mapped.xlsx", b"xlsx".as_slice()),
        ])
        .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut pdf = Vec::new();
        archive
            .by_name("invoice.pdf")
            .unwrap()
            .read_to_end(&mut pdf)
            .unwrap();
        assert_eq!(pdf, b"%PDF-1.7");
        assert!(archive.by_name("invoice_mapped.xlsx").is_ok());
    }
}
