use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, info};

use crate::libs::error::error::AnchorError;

/// The on-disk table of tag waveforms: one CSV row of numeric samples per tag
/// identity, no header. Loaded once at startup, immutable afterwards.
pub struct TagCatalog {
    sequences: Vec<Vec<f64>>,
}

impl TagCatalog {
    pub fn load(path: &Path) -> Result<TagCatalog, AnchorError> {
        debug!("Loading tag catalog from {:?}", path);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| AnchorError::InvalidInput(format!(
                "Cannot open tag catalog {:?}: {}", path, e)))?;
        let mut sequences: Vec<Vec<f64>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AnchorError::InvalidInput(format!(
                "Cannot read tag catalog {:?}: {}", path, e)))?;
            let mut sequence = Vec::with_capacity(record.len());
            for field in record.iter() {
                let sample = field.trim().parse::<f64>().map_err(|_| {
                    AnchorError::InvalidInput(format!(
                        "Bad sample '{}' in tag {} of catalog {:?}",
                        field, sequences.len(), path))
                })?;
                sequence.push(sample);
            }
            sequences.push(sequence);
        }
        if sequences.is_empty() {
            return Err(AnchorError::InvalidInput(format!("Tag catalog {:?} is empty", path)));
        }
        info!("Tag catalog holds {} sequences of {} samples",
            sequences.len(), sequences[0].len());
        Ok(TagCatalog { sequences })
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The bit sequence assigned to one tag identity.
    pub fn sequence(&self, tag_num: usize) -> Result<&[f64], AnchorError> {
        self.sequences.get(tag_num).map(|s| s.as_slice()).ok_or_else(|| {
            AnchorError::InvalidInput(format!(
                "Tag number {} is out of range; the catalog holds {} sequences",
                tag_num, self.sequences.len()))
        })
    }
}

#[cfg(test)]
#[path = "./tag_catalog_spec.rs"]
mod tag_catalog_spec;
