// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model ingestion from the JSON interchange document.
//!
//! The external extractor merges the 3D model file and the structural
//! database into one document per model; this module only parses and
//! validates it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use structalign_core::{Model, Result};

/// Reads and validates a model document.
pub fn read_model(path: &Path) -> Result<Model> {
    let file = File::open(path)?;
    let model: Model = serde_json::from_reader(BufReader::new(file))?;
    model.validate_input()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "structalign-ingest-{}-{}.json",
            std::process::id(),
            content.len()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_a_minimal_document() {
        let path = write_temp(
            r#"{ "elements": [ { "id": 7, "name": "Wall_12", "kind": "WALL",
                "geometry_kind": "BREP", "face_count": 3,
                "vertices": [ { "index": 0, "x": -39.775, "y": 22.5, "z": -4.44 } ] } ] }"#,
        );
        let model = read_model(&path).unwrap();
        assert_eq!(model.elements.len(), 1);
        assert_eq!(model.elements[0].name, "Wall_12");
        assert_eq!(model.elements[0].face_count, Some(3));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unknown_kind_is_invalid_input() {
        let path = write_temp(
            r#"{ "elements": [ { "id": 1, "name": "X", "kind": "GIRDER",
                "geometry_kind": "BREP", "vertices": [] } ] }"#,
        );
        let err = read_model(&path).unwrap_err();
        assert_eq!(err.exit_code(), 10);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn empty_element_is_allowed() {
        let path = write_temp(
            r#"{ "elements": [ { "id": 1, "name": "Empty", "kind": "COLUMN",
                "geometry_kind": "POINT" } ] }"#,
        );
        let model = read_model(&path).unwrap();
        assert!(model.elements[0].vertices.is_empty());
        std::fs::remove_file(path).ok();
    }
}
