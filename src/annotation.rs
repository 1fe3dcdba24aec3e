//! VOC-style annotation loading.
//!
//! One XML file per image, named `<basename>.xml`, carrying the recorded
//! image size and zero or more `<object>` entries with a class name and a
//! bounding box. On load, box coordinates are converted from the top-left
//! origin used by annotation tools to a bottom-left origin.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use crate::error::LabelsweepError;

/// File extension used for annotation files, without the leading dot.
pub const ANNOTATION_EXTENSION: &str = "xml";

/// A parsed annotation record for one image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// Image width as recorded in the annotation.
    pub width: i64,

    /// Image height as recorded in the annotation.
    pub height: i64,

    /// All labelled objects, in document order. May be empty.
    pub objects: Vec<ObjectBox>,
}

impl Annotation {
    /// Returns the set of distinct class names present in this annotation.
    pub fn class_set(&self) -> BTreeSet<&str> {
        self.objects.iter().map(|obj| obj.name.as_str()).collect()
    }

    /// Returns per-class occurrence counts.
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for obj in &self.objects {
            *counts.entry(obj.name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Counts objects with exactly the given class name.
    pub fn count_class(&self, name: &str) -> usize {
        self.objects.iter().filter(|obj| obj.name == name).count()
    }
}

/// One labelled object inside an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectBox {
    /// Class label for this object.
    pub name: String,

    /// Bounding box in bottom-left-origin coordinates.
    pub bbox: BndBox,
}

/// An axis-aligned bounding box with integer corner coordinates.
///
/// This type does not enforce ordering or bounds; malformed boxes are
/// represented as-is so the geometry rule can report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BndBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl BndBox {
    /// Mirrors the box across the horizontal axis of an image of the given
    /// height, swapping between top-left and bottom-left origin conventions.
    ///
    /// The transform is its own inverse for a fixed height.
    pub fn flip_vertical(self, height: i64) -> Self {
        Self {
            xmin: self.xmin,
            ymin: height - self.ymax,
            xmax: self.xmax,
            ymax: height - self.ymin,
        }
    }
}

/// Returns the path an annotation for `basename` would have in `dir`.
pub fn annotation_path(dir: &Path, basename: &str) -> PathBuf {
    dir.join(format!("{basename}.{ANNOTATION_EXTENSION}"))
}

/// Load the annotation for `basename` from `dir`.
///
/// Returns `Ok(None)` when no annotation file exists; the missing-pair rule
/// is responsible for reporting those. Malformed XML or missing required
/// fields surface as [`LabelsweepError::AnnotationParse`], which rules catch
/// and treat as "skip this file".
pub fn load_annotation(dir: &Path, basename: &str) -> Result<Option<Annotation>, LabelsweepError> {
    let path = annotation_path(dir, basename);
    if !path.is_file() {
        return Ok(None);
    }

    let xml = fs::read_to_string(&path).map_err(LabelsweepError::Io)?;
    parse_annotation_str(&xml, &path).map(Some)
}

/// Parse an annotation from a UTF-8 XML string.
///
/// `path` is used for error reporting only.
pub fn parse_annotation_str(xml: &str, path: &Path) -> Result<Annotation, LabelsweepError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|source| LabelsweepError::AnnotationParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(LabelsweepError::AnnotationParse {
            path: path.to_path_buf(),
            message: "missing <annotation> root element".to_string(),
        });
    }

    let size = required_child_element(annotation, "size", path, "<annotation>")?;
    let width = parse_required_dimension(size, "width", path)?;
    let height = parse_required_dimension(size, "height", path)?;

    let mut objects = Vec::new();
    for object in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let name = required_child_text(object, "name", path, "<object>")?;
        let bndbox = required_child_element(object, "bndbox", path, "<object>")?;

        let raw = BndBox {
            xmin: parse_required_i64(bndbox, "xmin", path, "<bndbox>")?,
            ymin: parse_required_i64(bndbox, "ymin", path, "<bndbox>")?,
            xmax: parse_required_i64(bndbox, "xmax", path, "<bndbox>")?,
            ymax: parse_required_i64(bndbox, "ymax", path, "<bndbox>")?,
        };

        objects.push(ObjectBox {
            name,
            bbox: raw.flip_vertical(height),
        });
    }

    Ok(Annotation {
        width,
        height,
        objects,
    })
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, LabelsweepError> {
    child_element(node, tag).ok_or_else(|| LabelsweepError::AnnotationParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, LabelsweepError> {
    optional_child_text(node, tag).ok_or_else(|| LabelsweepError::AnnotationParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn parse_required_i64(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<i64, LabelsweepError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<i64>()
        .map_err(|_| LabelsweepError::AnnotationParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in {context}; expected integer"),
        })
}

fn parse_required_dimension(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
) -> Result<i64, LabelsweepError> {
    let value = parse_required_i64(node, tag, path, "<size>")?;
    if value <= 0 {
        return Err(LabelsweepError::AnnotationParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{value}' in <size>; expected positive integer"),
        });
    }
    Ok(value)
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<annotation>
  <filename>img1.jpg</filename>
  <size>
    <width>640</width>
    <height>480</height>
    <depth>3</depth>
  </size>
  <object>
    <name>Shipper</name>
    <bndbox>
      <xmin>10</xmin>
      <ymin>20</ymin>
      <xmax>30</xmax>
      <ymax>40</ymax>
    </bndbox>
  </object>
</annotation>"#;

    #[test]
    fn parse_extracts_size_and_objects() {
        let ann = parse_annotation_str(SAMPLE, Path::new("sample.xml")).expect("parse xml");
        assert_eq!(ann.width, 640);
        assert_eq!(ann.height, 480);
        assert_eq!(ann.objects.len(), 1);
        assert_eq!(ann.objects[0].name, "Shipper");
    }

    #[test]
    fn boxes_are_flipped_to_bottom_left_origin() {
        let ann = parse_annotation_str(SAMPLE, Path::new("sample.xml")).expect("parse xml");
        let bbox = ann.objects[0].bbox;
        assert_eq!(bbox.xmin, 10);
        assert_eq!(bbox.xmax, 30);
        assert_eq!(bbox.ymin, 480 - 40);
        assert_eq!(bbox.ymax, 480 - 20);
    }

    #[test]
    fn flip_vertical_is_involutive() {
        let bbox = BndBox {
            xmin: 5,
            ymin: 12,
            xmax: 50,
            ymax: 90,
        };
        assert_eq!(bbox.flip_vertical(480).flip_vertical(480), bbox);
    }

    #[test]
    fn annotation_without_objects_parses_as_empty() {
        let xml = r#"<annotation><size><width>10</width><height>10</height></size></annotation>"#;
        let ann = parse_annotation_str(xml, Path::new("empty.xml")).expect("parse xml");
        assert!(ann.objects.is_empty());
    }

    #[test]
    fn missing_size_is_a_parse_error() {
        let xml = r#"<annotation><object><name>Shipper</name></object></annotation>"#;
        let result = parse_annotation_str(xml, Path::new("bad.xml"));
        assert!(matches!(
            result,
            Err(LabelsweepError::AnnotationParse { .. })
        ));
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let xml = r#"<annotation><size><width>0</width><height>10</height></size></annotation>"#;
        let result = parse_annotation_str(xml, Path::new("bad.xml"));
        assert!(matches!(
            result,
            Err(LabelsweepError::AnnotationParse { .. })
        ));
    }

    #[test]
    fn load_returns_none_for_absent_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let loaded = load_annotation(temp.path(), "nope").expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn load_reads_file_by_basename() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("a.xml"), SAMPLE).expect("write xml");

        let loaded = load_annotation(temp.path(), "a").expect("load");
        assert!(loaded.is_some());
    }

    #[test]
    fn class_counts_and_set() {
        let mut ann = parse_annotation_str(SAMPLE, Path::new("sample.xml")).expect("parse xml");
        let duplicate = ann.objects[0].clone();
        ann.objects.push(duplicate);
        assert_eq!(ann.count_class("Shipper"), 2);
        assert_eq!(ann.class_set().len(), 1);
        assert_eq!(ann.class_counts().get("Shipper"), Some(&2));
    }
}
