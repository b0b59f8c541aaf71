//! Collocation graph artifacts: nodes and edges CSVs.
//!
//! Both are space-delimited with a header row, the format the graph
//! visualisation tooling imports directly.
use std::path::Path;

use crate::error::Error;

/// Write the node table: `Label Appearances`.
pub fn write_nodes(path: &Path, nodes: &[(String, u64)]) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new().delimiter(b' ').from_path(path)?;
    writer.write_record(["Label", "Appearances"])?;
    for (label, appearances) in nodes {
        writer.write_record([label.as_str(), &appearances.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the edge table: `Source Target Weight` for pair collocations. For
/// combination sizes above 2 every member of the combination gets its own
/// column before the weight.
pub fn write_edges(path: &Path, k: usize, edges: &[(Vec<String>, u64)]) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .flexible(true)
        .from_path(path)?;

    if k == 2 {
        writer.write_record(["Source", "Target", "Weight"])?;
    } else {
        let mut header: Vec<String> = (1..=k).map(|i| format!("Tag{}", i)).collect();
        header.push("Weight".to_string());
        writer.write_record(&header)?;
    }

    for (combination, weight) in edges {
        let mut record: Vec<&str> = combination.iter().map(String::as_str).collect();
        let weight = weight.to_string();
        record.push(&weight);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
