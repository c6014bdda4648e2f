use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::SourcesConfig;
use crate::core::error::AppError;
use crate::features::regions::models::{RawRecord, Region, SourceFormat};

/// Field every Catalan row must carry to be kept
const CAT_REQUIRED_FIELD: &str = "estaci";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::SourceUnavailable(err.to_string())
    }
}

/// Reads each region's listing from its configured file
pub struct SourceReader {
    sources: SourcesConfig,
}

impl SourceReader {
    pub fn new(sources: SourcesConfig) -> Self {
        Self { sources }
    }

    pub fn path_for(&self, region: Region) -> &Path {
        self.sources.path_for(region)
    }

    /// Read the region's configured source file
    pub async fn read(&self, region: Region) -> Result<Option<Vec<RawRecord>>, SourceError> {
        self.read_file(region, self.path_for(region)).await
    }

    /// `Ok(None)` when the file does not exist
    pub async fn read_file(
        &self,
        region: Region,
        path: &Path,
    ) -> Result<Option<Vec<RawRecord>>, SourceError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Source file for {} not found: {}", region, path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(SourceError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let records = self.parse(region, &bytes)?;
        tracing::debug!(
            "Read {} raw records for {} from {}",
            records.len(),
            region,
            path.display()
        );
        Ok(Some(records))
    }

    /// Parse an in-memory document in the region's format
    pub fn parse(&self, region: Region, bytes: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
        match region.format() {
            SourceFormat::Xml => read_xml(bytes),
            SourceFormat::Csv => read_csv(bytes, self.sources.csv_delimiter),
            SourceFormat::Json => read_json(bytes),
        }
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

// ==================== CSV ====================

/// Header row gives the keys; keys and values are trimmed and rows shorter
/// than the header get `""` for the missing columns.
pub fn read_csv(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(strip_bom(bytes));

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (i, key) in headers.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            let value = row
                .get(i)
                .map(|v| String::from_utf8_lossy(v).trim().to_string())
                .unwrap_or_default();
            record.insert(key.clone(), Value::String(value));
        }
        records.push(record);
    }

    Ok(records)
}

// ==================== XML ====================

#[derive(Debug, Default)]
struct XmlNode {
    tag: String,
    url: Option<String>,
    text: String,
    children: Vec<XmlNode>,
}

fn xml_err(e: impl std::fmt::Display) -> SourceError {
    SourceError::Xml(e.to_string())
}

fn open_node(start: &BytesStart<'_>) -> Result<XmlNode, SourceError> {
    let mut node = XmlNode {
        tag: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Default::default()
    };
    for attr in start.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == b"url" {
            node.url = Some(attr.unescape_value().map_err(xml_err)?.into_owned());
        }
    }
    Ok(node)
}

fn parse_xml_tree(bytes: &[u8]) -> Result<XmlNode, SourceError> {
    let mut reader = Reader::from_reader(strip_bom(bytes));
    reader.config_mut().trim_text(true);

    // Synthetic document root so top-level rows are found like nested ones
    let mut stack = vec![XmlNode::default()];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(start) => stack.push(open_node(&start)?),
            Event::Empty(start) => {
                let node = open_node(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(SourceError::Xml("unbalanced closing tag".to_string()));
                }
                if let Some(node) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(SourceError::Xml("unexpected end of document".to_string()));
    }
    Ok(stack.remove(0))
}

fn collect_rows<'a>(node: &'a XmlNode, rows: &mut Vec<&'a XmlNode>) {
    if node.tag == "row" {
        rows.push(node);
    }
    for child in &node.children {
        collect_rows(child, rows);
    }
}

/// Every `<row>` element becomes a record of its child elements. Children
/// whose tag starts with `_` are metadata and skipped; a child's value is
/// its text, else its `url` attribute, else `""`. Rows without an `estaci`
/// field are dropped.
pub fn read_xml(bytes: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
    let root = parse_xml_tree(bytes)?;
    let mut rows = Vec::new();
    collect_rows(&root, &mut rows);

    let records = rows
        .into_iter()
        .filter_map(|row| {
            let mut record = RawRecord::new();
            for child in row.children.iter().filter(|c| !c.tag.starts_with('_')) {
                let text = child.text.trim();
                let value = if !text.is_empty() {
                    text.to_string()
                } else {
                    child.url.clone().unwrap_or_default()
                };
                record.insert(child.tag.clone(), Value::String(value));
            }
            record.contains_key(CAT_REQUIRED_FIELD).then_some(record)
        })
        .collect();

    Ok(records)
}

// ==================== JSON ====================

/// The document must be an array; non-object entries are ignored and any
/// other top-level shape yields no records.
pub fn read_json(bytes: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
    let document: Value = serde_json::from_slice(strip_bom(bytes))?;
    match document {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        _ => {
            tracing::warn!("JSON source is not an array; no records read");
            Ok(Vec::new())
        }
    }
}
