//! Class-presence rules: valid names, required classes, count ceilings,
//! and key-class pairing.
//!
//! All rules here treat a file with zero objects as "not applicable" - empty
//! files belong to the empty-annotation bucket alone.

use std::collections::BTreeSet;

use super::{Bucket, BucketFiles, Rule, RuleContext};
use crate::annotation::ANNOTATION_EXTENSION;
use crate::error::LabelsweepError;
use crate::pairs::list_basenames;

/// Suffix joining a class to its paired key class.
const KEY_SUFFIX: &str = "Key";

/// Separator for alternation entries in required-class lists.
const ALTERNATION: char = '|';

/// Flags files containing a class name outside the configured catalog.
///
/// `<class>Key` companions of every valid class are accepted implicitly.
#[derive(Clone, Debug)]
pub struct ClassNameCheck {
    valid_classes: Vec<String>,
}

impl ClassNameCheck {
    pub fn new(valid_classes: Vec<String>) -> Self {
        Self { valid_classes }
    }
}

impl Rule for ClassNameCheck {
    fn name(&self) -> &'static str {
        "class-names"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let allowed: BTreeSet<String> = self
            .valid_classes
            .iter()
            .flat_map(|class| [class.clone(), format!("{class}{KEY_SUFFIX}")])
            .collect();

        let mut offenders = Vec::new();
        for basename in list_basenames(ctx.annotation_dir, ANNOTATION_EXTENSION)? {
            let Some(annotation) = ctx.load_or_skip(&basename) else {
                continue;
            };

            for obj in &annotation.objects {
                if !allowed.contains(&obj.name) {
                    eprintln!("Warning: invalid class name '{}' in '{basename}'", obj.name);
                    offenders.push(basename.clone());
                    break;
                }
            }
        }

        Ok(vec![Bucket::new(
            "invalid_class_names",
            BucketFiles::Annotation,
            offenders,
        )])
    }
}

/// Flags files missing a required class entirely.
///
/// An `A|B` entry is satisfied when any of its alternatives is present; the
/// file is flagged only when none of them appears.
#[derive(Clone, Debug)]
pub struct MissingBoxCheck {
    required_classes: Vec<String>,
}

impl MissingBoxCheck {
    pub fn new(required_classes: Vec<String>) -> Self {
        Self { required_classes }
    }
}

impl Rule for MissingBoxCheck {
    fn name(&self) -> &'static str {
        "missing-boxes"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let mut offenders: Vec<Vec<String>> = vec![Vec::new(); self.required_classes.len()];

        for basename in list_basenames(ctx.annotation_dir, ANNOTATION_EXTENSION)? {
            let Some(annotation) = ctx.load_or_skip(&basename) else {
                continue;
            };
            let classes = annotation.class_set();
            if classes.is_empty() {
                continue;
            }

            for (check, bucket) in self.required_classes.iter().zip(offenders.iter_mut()) {
                let satisfied = check
                    .split(ALTERNATION)
                    .any(|alternative| classes.contains(alternative));
                if !satisfied {
                    bucket.push(basename.clone());
                }
            }
        }

        Ok(self
            .required_classes
            .iter()
            .zip(offenders)
            .map(|(check, offenders)| {
                Bucket::new(format!("missing_{check}"), BucketFiles::Both, offenders)
            })
            .collect())
    }
}

/// Flags files with more than the configured number of boxes for a class.
#[derive(Clone, Debug)]
pub struct MaxCountCheck {
    max_boxes: usize,
    classes: Vec<String>,
}

impl MaxCountCheck {
    pub fn new(max_boxes: usize, classes: Vec<String>) -> Self {
        Self { max_boxes, classes }
    }
}

impl Rule for MaxCountCheck {
    fn name(&self) -> &'static str {
        "max-count"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let mut offenders: Vec<Vec<String>> = vec![Vec::new(); self.classes.len()];

        for basename in list_basenames(ctx.annotation_dir, ANNOTATION_EXTENSION)? {
            let Some(annotation) = ctx.load_or_skip(&basename) else {
                continue;
            };
            if annotation.objects.is_empty() {
                continue;
            }

            for (check, bucket) in self.classes.iter().zip(offenders.iter_mut()) {
                if annotation.count_class(check) > self.max_boxes {
                    bucket.push(basename.clone());
                }
            }
        }

        let max_boxes = self.max_boxes;
        Ok(self
            .classes
            .iter()
            .zip(offenders)
            .map(|(check, offenders)| {
                Bucket::new(
                    format!("more_than_{max_boxes}_{check}"),
                    BucketFiles::Both,
                    offenders,
                )
            })
            .collect())
    }
}

/// Flags files where a class and its `<class>Key` companion occur in
/// unequal numbers.
#[derive(Clone, Debug)]
pub struct KeyConsistencyCheck {
    classes: Vec<String>,
}

impl KeyConsistencyCheck {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }
}

impl Rule for KeyConsistencyCheck {
    fn name(&self) -> &'static str {
        "key-consistency"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let mut offenders: Vec<Vec<String>> = vec![Vec::new(); self.classes.len()];

        for basename in list_basenames(ctx.annotation_dir, ANNOTATION_EXTENSION)? {
            let Some(annotation) = ctx.load_or_skip(&basename) else {
                continue;
            };
            if annotation.objects.is_empty() {
                continue;
            }

            for (check, bucket) in self.classes.iter().zip(offenders.iter_mut()) {
                let key_class = format!("{check}{KEY_SUFFIX}");
                if annotation.count_class(check) != annotation.count_class(&key_class) {
                    bucket.push(basename.clone());
                }
            }
        }

        Ok(self
            .classes
            .iter()
            .zip(offenders)
            .map(|(check, offenders)| {
                Bucket::new(
                    format!("inconsistent_number_of_{check}{KEY_SUFFIX}"),
                    BucketFiles::Both,
                    offenders,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_xml(dir: &Path, basename: &str, objects: &[&str]) {
        let mut body = String::from(
            "<annotation><size><width>100</width><height>100</height></size>",
        );
        for name in objects {
            body.push_str(&format!(
                "<object><name>{name}</name><bndbox><xmin>1</xmin><ymin>1</ymin><xmax>10</xmax><ymax>10</ymax></bndbox></object>"
            ));
        }
        body.push_str("</annotation>");
        fs::write(dir.join(format!("{basename}.xml")), body).expect("write xml");
    }

    struct Fixture {
        _temp: tempfile::TempDir,
        images: std::path::PathBuf,
        annotations: std::path::PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = tempfile::tempdir().expect("create temp dir");
            let images = temp.path().join("images");
            let annotations = temp.path().join("annotations");
            fs::create_dir_all(&images).expect("create images dir");
            fs::create_dir_all(&annotations).expect("create annotations dir");
            Self {
                _temp: temp,
                images,
                annotations,
            }
        }

        fn ctx(&self) -> RuleContext<'_> {
            RuleContext {
                image_dir: &self.images,
                annotation_dir: &self.annotations,
                image_ext: "jpg",
            }
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn class_name_check_accepts_catalog_and_key_companions() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "ok", &["Shipper", "ShipperKey"]);
        write_xml(&fixture.annotations, "bad", &["Shipper", "Shiper"]);

        let rule = ClassNameCheck::new(names(&["Shipper"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert_eq!(buckets[0].name, "invalid_class_names");
        assert_eq!(buckets[0].offenders, vec!["bad".to_string()]);
    }

    #[test]
    fn class_name_check_flags_a_file_once() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "bad", &["Nope", "AlsoNope"]);

        let rule = ClassNameCheck::new(names(&["Shipper"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert_eq!(buckets[0].offenders, vec!["bad".to_string()]);
    }

    #[test]
    fn missing_box_check_flags_absent_class() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "has", &["Shipper"]);
        write_xml(&fixture.annotations, "lacks", &["Consignee"]);

        let rule = MissingBoxCheck::new(names(&["Shipper"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert_eq!(buckets[0].name, "missing_Shipper");
        assert_eq!(buckets[0].offenders, vec!["lacks".to_string()]);
    }

    #[test]
    fn missing_box_check_alternation_accepts_either_class() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "first", &["Shipper"]);
        write_xml(&fixture.annotations, "second", &["Carrier"]);
        write_xml(&fixture.annotations, "neither", &["Consignee"]);

        let rule = MissingBoxCheck::new(names(&["Shipper|Carrier"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert_eq!(buckets[0].name, "missing_Shipper|Carrier");
        assert_eq!(buckets[0].offenders, vec!["neither".to_string()]);
    }

    #[test]
    fn missing_box_check_skips_empty_files() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "empty", &[]);

        let rule = MissingBoxCheck::new(names(&["Shipper"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert!(buckets[0].offenders.is_empty());
    }

    #[test]
    fn max_count_check_flags_only_above_ceiling() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "one", &["Shipper"]);
        write_xml(&fixture.annotations, "two", &["Shipper", "Shipper"]);

        let rule = MaxCountCheck::new(1, names(&["Shipper"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert_eq!(buckets[0].name, "more_than_1_Shipper");
        assert_eq!(buckets[0].offenders, vec!["two".to_string()]);
    }

    #[test]
    fn key_consistency_check_compares_counts() {
        let fixture = Fixture::new();
        write_xml(
            &fixture.annotations,
            "balanced",
            &["ExportRef", "ExportRef", "ExportRefKey", "ExportRefKey"],
        );
        write_xml(
            &fixture.annotations,
            "lopsided",
            &["ExportRef", "ExportRef", "ExportRefKey"],
        );

        let rule = KeyConsistencyCheck::new(names(&["ExportRef"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert_eq!(buckets[0].name, "inconsistent_number_of_ExportRefKey");
        assert_eq!(buckets[0].offenders, vec!["lopsided".to_string()]);
    }

    #[test]
    fn key_consistency_check_skips_empty_files() {
        let fixture = Fixture::new();
        write_xml(&fixture.annotations, "empty", &[]);

        let rule = KeyConsistencyCheck::new(names(&["ExportRef"]));
        let buckets = rule.evaluate(&fixture.ctx()).expect("evaluate");
        assert!(buckets[0].offenders.is_empty());
    }
}
