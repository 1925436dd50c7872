use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    document::Document,
    error::{PolylotError, PolylotResult},
};

pub fn ensure_parent_dir(path: &Path) -> PolylotResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Serialize the document and write it atomically.
///
/// The bytes land in a temporary sibling first and are renamed into place, so
/// a failed export never leaves a partial file at the destination.
pub fn write_document(doc: &Document, out_path: &Path) -> PolylotResult<()> {
    ensure_parent_dir(out_path)?;

    let bytes = serde_json::to_vec(doc)
        .map_err(|e| PolylotError::serialization(format!("animation document: {e}")))?;

    let tmp_path = temp_sibling(out_path);
    fs::write(&tmp_path, &bytes)
        .with_context(|| format!("failed to write '{}'", tmp_path.display()))?;

    if let Err(e) = fs::rename(&tmp_path, out_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PolylotError::Other(anyhow::Error::new(e).context(format!(
            "failed to move '{}' into place",
            out_path.display()
        ))));
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::ColorSample,
        core::{Canvas, FrameIndex, FrameRange, Fps},
        document::{DocumentBuilder, DocumentMeta},
        sample::PathSample,
    };

    fn tiny_document() -> Document {
        let mut b = DocumentBuilder::new(
            Canvas {
                width: 10,
                height: 10,
            },
            FrameRange::new(FrameIndex(0), FrameIndex(1)).unwrap(),
            Fps::new(24, 1).unwrap(),
            "t",
        );
        let g = b.add_group("poly 0");
        b.add_path(
            g,
            PathSample::from_screen_points([(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 2),
        )
        .unwrap();
        b.add_fill(g, ColorSample([1.0, 1.0, 1.0])).unwrap();
        b.finalize(DocumentMeta::default()).unwrap()
    }

    #[test]
    fn writes_parseable_json_and_cleans_up_temp() {
        let dir = PathBuf::from("target").join("export_test");
        let out = dir.join("nested").join("anim.json");
        let _ = fs::remove_file(&out);

        write_document(&tiny_document(), &out).unwrap();

        assert!(out.exists());
        assert!(!temp_sibling(&out).exists());
        let parsed: serde_json::Value =
            serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(parsed["v"], "5.5.2");
    }

    #[test]
    fn overwrites_existing_output() {
        let dir = PathBuf::from("target").join("export_test");
        fs::create_dir_all(&dir).unwrap();
        let out = dir.join("overwrite.json");
        fs::write(&out, b"stale").unwrap();

        write_document(&tiny_document(), &out).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(parsed["layers"].as_array().unwrap().len(), 1);
    }
}
