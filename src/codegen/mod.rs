//! Generated lookup tables consumed by the mobile app
//!
//! The app reads sprite metadata from a static map compiled into its source
//! tree, so the image jobs emit a source file instead of a data file:
//!
//! - `Sizes`: file name → `(width, height)`
//! - `Hitboxes`: file name → list of `(x, y, width, height)` cells
//!
//! Keys are kept in a `BTreeMap`, so repeated runs over the same assets give
//! byte-identical output regardless of directory traversal order.

use crate::error::Result;
use crate::pipeline::write_atomic;
use crate::types::Rect;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Output language of a generated table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Dart source with a `static const` map
    #[default]
    Dart,
    /// Plain JSON object
    Json,
}

/// Which metadata a table carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Sizes,
    Hitboxes,
}

impl TableKind {
    fn default_class_name(self) -> &'static str {
        match self {
            TableKind::Sizes => "ImageMeta",
            TableKind::Hitboxes => "VoxelData",
        }
    }

    fn default_field_name(self) -> &'static str {
        match self {
            TableKind::Sizes => "sizes",
            TableKind::Hitboxes => "data",
        }
    }

    fn banner(self) -> &'static str {
        match self {
            TableKind::Sizes => "// AUTO-GENERATED IMAGE SIZE DATA",
            TableKind::Hitboxes => "// AUTO-GENERATED VOXEL DATA",
        }
    }

    fn dart_value_type(self) -> &'static str {
        match self {
            TableKind::Sizes => "Size",
            TableKind::Hitboxes => "List<List<double>>",
        }
    }
}

/// Value stored under one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableValue {
    Size { width: u32, height: u32 },
    Rects(Vec<Rect>),
}

/// File name → metadata map rendered as source code
#[derive(Debug, Clone)]
pub struct GeneratedTable {
    pub kind: TableKind,
    pub class_name: String,
    pub field_name: String,
    entries: BTreeMap<String, TableValue>,
}

impl GeneratedTable {
    /// Create an empty table with the class and field names the app expects
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            class_name: kind.default_class_name().to_string(),
            field_name: kind.default_field_name().to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// Override the generated class name
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Add or replace the entry for `name`
    ///
    /// A later asset with the same file name (in another subdirectory)
    /// replaces the earlier one; the collision is logged.
    pub fn insert(&mut self, name: impl Into<String>, value: TableValue) {
        let name = name.into();
        if self.entries.insert(name.clone(), value).is_some() {
            tracing::warn!("duplicate asset name in table, keeping the last: {name}");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TableValue> {
        self.entries.get(name)
    }

    /// Render the table in the requested format
    pub fn render(&self, format: TableFormat) -> Result<String> {
        match format {
            TableFormat::Dart => Ok(self.render_dart()),
            TableFormat::Json => self.render_json(),
        }
    }

    /// Render and write the table atomically
    pub fn write(&self, path: &Path, format: TableFormat) -> Result<()> {
        let source = self.render(format)?;
        write_atomic(path, source.as_bytes())?;
        tracing::info!("wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }

    fn render_dart(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.kind.banner());
        if self.kind == TableKind::Sizes {
            out.push_str("import 'dart:ui';\n\n");
        }
        let _ = writeln!(out, "class {} {{", self.class_name);
        let _ = writeln!(
            out,
            "  static const Map<String, {}> {} = {{",
            self.kind.dart_value_type(),
            self.field_name
        );

        for (name, value) in &self.entries {
            let key = dart_string(name);
            match value {
                TableValue::Size { width, height } => {
                    let _ = writeln!(out, "    {key}: Size({width}.0, {height}.0),");
                }
                TableValue::Rects(rects) => {
                    let cells: Vec<String> = rects
                        .iter()
                        .map(|r| format!("[{}.0, {}.0, {}.0, {}.0]", r.x, r.y, r.width, r.height))
                        .collect();
                    let _ = writeln!(out, "    {key}: [");
                    let _ = writeln!(out, "      {},", cells.join(", "));
                    out.push_str("    ],\n");
                }
            }
        }

        out.push_str("  };\n");
        out.push_str("}\n");
        out
    }

    fn render_json(&self) -> Result<String> {
        let map: serde_json::Map<String, JsonValue> = self
            .entries
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    TableValue::Size { width, height } => serde_json::json!([width, height]),
                    TableValue::Rects(rects) => JsonValue::Array(
                        rects
                            .iter()
                            .map(|r| serde_json::json!([r.x, r.y, r.width, r.height]))
                            .collect(),
                    ),
                };
                (name.clone(), json)
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&JsonValue::Object(map))?;
        out.push('\n');
        Ok(out)
    }
}

/// Quote a file name as a Dart string literal
fn dart_string(name: &str) -> String {
    // JSON escaping covers quotes, backslashes and control characters;
    // Dart additionally treats `$` as interpolation
    serde_json::to_string(name)
        .unwrap_or_else(|_| format!("\"{name}\""))
        .replace('$', "\\$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_dart_output() {
        let mut table = GeneratedTable::new(TableKind::Sizes);
        table.insert("sofa.webp", TableValue::Size { width: 300, height: 150 });
        table.insert("bed.webp", TableValue::Size { width: 120, height: 80 });

        let dart = table.render(TableFormat::Dart).unwrap();
        assert_eq!(
            dart,
            "// AUTO-GENERATED IMAGE SIZE DATA\n\
             import 'dart:ui';\n\
             \n\
             class ImageMeta {\n  \
             static const Map<String, Size> sizes = {\n    \
             \"bed.webp\": Size(120.0, 80.0),\n    \
             \"sofa.webp\": Size(300.0, 150.0),\n  \
             };\n\
             }\n"
        );
    }

    #[test]
    fn test_hitboxes_dart_output() {
        let mut table = GeneratedTable::new(TableKind::Hitboxes);
        table.insert(
            "ac.webp",
            TableValue::Rects(vec![Rect::new(0, 0, 25, 25), Rect::new(25, 0, 10, 25)]),
        );

        let dart = table.render(TableFormat::Dart).unwrap();
        assert!(dart.starts_with("// AUTO-GENERATED VOXEL DATA\nclass VoxelData {\n"));
        assert!(dart.contains("static const Map<String, List<List<double>>> data = {"));
        assert!(dart.contains("    \"ac.webp\": [\n      [0.0, 0.0, 25.0, 25.0], [25.0, 0.0, 10.0, 25.0],\n    ],\n"));
        assert!(!dart.contains("dart:ui"));
    }

    #[test]
    fn test_json_output() {
        let mut table = GeneratedTable::new(TableKind::Hitboxes);
        table.insert("b.webp", TableValue::Rects(vec![Rect::new(1, 2, 3, 4)]));

        let json: JsonValue =
            serde_json::from_str(&table.render(TableFormat::Json).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "b.webp": [[1, 2, 3, 4]] }));
    }

    #[test]
    fn test_dart_string_escaping() {
        assert_eq!(dart_string("a.webp"), "\"a.webp\"");
        assert_eq!(dart_string("we\"ird$.webp"), "\"we\\\"ird\\$.webp\"");
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let mut table = GeneratedTable::new(TableKind::Sizes).with_class_name("Meta");
        table.insert("a.webp", TableValue::Size { width: 1, height: 1 });
        table.insert("a.webp", TableValue::Size { width: 2, height: 2 });
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("a.webp"),
            Some(&TableValue::Size { width: 2, height: 2 })
        );
        assert!(table.render(TableFormat::Dart).unwrap().contains("class Meta {"));
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib/widgets/image_meta.dart");
        let table = GeneratedTable::new(TableKind::Sizes);
        table.write(&path, TableFormat::Dart).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("static const Map<String, Size> sizes = {\n  };"));
    }
}
