//! Editor metadata removal for SVG assets
//!
//! Inkscape leaves namespaces, `sodipodi:namedview` blocks, RDF metadata and
//! empty `<defs>` in every exported file. None of it affects rendering, but
//! some of it trips up the app's SVG loader. The cleaner strips exactly those
//! constructs and collapses whitespace; shapes, styles and ids are untouched.

use crate::error::Result;
use crate::pipeline::{write_atomic, AssetJob, Outcome};
use crate::types::AssetRecord;
use regex::Regex;
use std::fs;

/// Patterns removed on every pass, in order
const STRIP_PATTERNS: &[&str] = &[
    r"<\?xml[^>]*\?>",
    r"<sodipodi:namedview[^>]*/>",
    r"(?s)<sodipodi:namedview[^>]*>.*?</sodipodi:namedview>",
    r"<metadata[^>]*/>",
    r"(?s)<metadata[^>]*>.*?</metadata>",
    r#"<defs(\s+id="[^"]*")?\s*/>"#,
    r#"<defs(\s+id="[^"]*")?\s*>\s*</defs>"#,
    r#"xmlns:inkscape="[^"]*""#,
    r#"xmlns:sodipodi="[^"]*""#,
    r#"sodipodi:docname="[^"]*""#,
    r#"inkscape:version="[^"]*""#,
    r#"inkscape:groupmode="[^"]*""#,
    r#"inkscape:label="[^"]*""#,
    r#"inkscape:connector-curvature="[^"]*""#,
    r#"sodipodi:role="[^"]*""#,
];

/// Compiled editor-metadata stripper
pub struct SvgCleaner {
    strip: Vec<Regex>,
    whitespace: Regex,
}

impl SvgCleaner {
    /// Compile the pattern set
    ///
    /// # Returns
    /// * `Ok(SvgCleaner)` - Ready to clean documents
    /// * `Err(AssetError::Pattern)` - If a pattern fails to compile
    pub fn new() -> Result<Self> {
        let strip = STRIP_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            strip,
            whitespace: Regex::new(r"\s{2,}")?,
        })
    }

    /// Strip editor metadata and collapse whitespace
    ///
    /// The pass is repeated until the text stops changing, so removing one
    /// construct can expose another (an empty `<defs>` left behind by its
    /// metadata child) and the result is still stable:
    /// `clean(clean(x)) == clean(x)`.
    ///
    /// # Examples
    /// ```
    /// use assetprep::vector::SvgCleaner;
    ///
    /// let cleaner = SvgCleaner::new().unwrap();
    /// let svg = r#"<?xml version="1.0"?><svg   inkscape:version="1.2"><path d="M0 0"/></svg>"#;
    /// assert_eq!(cleaner.clean(svg), r#"<svg ><path d="M0 0"/></svg>"#);
    /// ```
    pub fn clean(&self, input: &str) -> String {
        let mut current = self.pass(input);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn pass(&self, input: &str) -> String {
        let mut text = input.to_string();
        for pattern in &self.strip {
            text = pattern.replace_all(&text, "").into_owned();
        }
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }
}

/// Clean every SVG under a root, rewriting only files that changed
pub struct SvgJob {
    cleaner: SvgCleaner,
}

impl SvgJob {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cleaner: SvgCleaner::new()?,
        })
    }
}

impl AssetJob for SvgJob {
    type Decoded = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "svg"
    }

    fn decode(&mut self, record: &AssetRecord) -> Result<String> {
        Ok(fs::read_to_string(&record.path)?)
    }

    fn transform(&mut self, _record: &AssetRecord, decoded: String) -> Result<Outcome<String>> {
        let cleaned = self.cleaner.clean(&decoded);
        if cleaned == decoded {
            Ok(Outcome::Unchanged)
        } else {
            Ok(Outcome::Write(cleaned))
        }
    }

    fn encode(&mut self, record: &AssetRecord, output: String) -> Result<()> {
        write_atomic(&record.path, output.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_job;
    use crate::walker::{walk_files, FileFilter};

    const INKSCAPE_EXPORT: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<svg
   width="24"
   height="24"
   viewBox="0 0 24 24"
   version="1.1"
   id="svg5"
   inkscape:version="1.2.2 (732a01da63, 2022-12-09)"
   sodipodi:docname="heart.svg"
   xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
   xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
   xmlns="http://www.w3.org/2000/svg">
  <sodipodi:namedview
     id="namedview7"
     pagecolor="#ffffff"
     inkscape:zoom="22.6">
    <inkscape:page x="0" y="0" width="24" height="24" />
  </sodipodi:namedview>
  <defs
     id="defs2" />
  <metadata>
    <rdf:RDF><cc:Work rdf:about="" /></rdf:RDF>
  </metadata>
  <g
     inkscape:label="Layer 1"
     inkscape:groupmode="layer"
     id="layer1">
    <path
       style="fill:#e53935"
       d="M12 21 L3 12 A5 5 0 0 1 12 5 A5 5 0 0 1 21 12 Z"
       id="path1"
       inkscape:connector-curvature="0"
       sodipodi:role="line" />
  </g>
</svg>
"##;

    #[test]
    fn test_strips_editor_metadata() {
        let cleaner = SvgCleaner::new().unwrap();
        let cleaned = cleaner.clean(INKSCAPE_EXPORT);

        for gone in [
            "<?xml",
            "sodipodi",
            "inkscape",
            "<metadata",
            "<defs",
            "rdf:RDF",
        ] {
            assert!(!cleaned.contains(gone), "{gone} still present in {cleaned}");
        }
        for kept in [
            r#"viewBox="0 0 24 24""#,
            r#"xmlns="http://www.w3.org/2000/svg""#,
            r#"id="layer1""#,
            r#"style="fill:#e53935""#,
            r#"d="M12 21 L3 12 A5 5 0 0 1 12 5 A5 5 0 0 1 21 12 Z""#,
        ] {
            assert!(cleaned.contains(kept), "{kept} missing from {cleaned}");
        }
        assert!(!cleaned.contains("  "));
        assert!(cleaned.starts_with("<svg"));
        assert!(cleaned.ends_with("</svg>"));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = SvgCleaner::new().unwrap();
        for input in [
            INKSCAPE_EXPORT,
            "<svg><defs id=\"d\">\n  <metadata>x</metadata>\n</defs><rect/></svg>",
            "   ",
            "<svg/>",
        ] {
            let once = cleaner.clean(input);
            assert_eq!(cleaner.clean(&once), once);
        }
    }

    #[test]
    fn test_defs_emptied_by_metadata_removal() {
        let cleaner = SvgCleaner::new().unwrap();
        let cleaned =
            cleaner.clean("<svg><defs id=\"d\">\n  <metadata>x</metadata>\n</defs><rect/></svg>");
        assert_eq!(cleaned, "<svg><rect/></svg>");
    }

    #[test]
    fn test_non_empty_defs_are_kept() {
        let cleaner = SvgCleaner::new().unwrap();
        let svg = r#"<svg><defs><linearGradient id="g"/></defs></svg>"#;
        assert_eq!(cleaner.clean(svg), svg);
    }

    #[test]
    fn test_svg_job_rewrites_only_dirty_files() {
        let dir = tempfile::tempdir().unwrap();
        let dirty = dir.path().join("icons/heart.svg");
        let clean = dir.path().join("star.svg");
        fs::create_dir_all(dirty.parent().unwrap()).unwrap();
        fs::write(&dirty, INKSCAPE_EXPORT).unwrap();
        fs::write(&clean, "<svg><rect/></svg>").unwrap();

        let mut job = SvgJob::new().unwrap();
        let summary = run_job(walk_files(dir.path(), FileFilter::extensions(&["svg"])), &mut job).unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.unchanged, 1);
        assert!(!fs::read_to_string(&dirty).unwrap().contains("inkscape"));
    }
}
