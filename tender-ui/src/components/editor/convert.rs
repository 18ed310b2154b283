//! Structured section content <-> flat editor buffer.
//!
//! The only shape this module writes is the canonical tree:
//!
//! ```json
//! {"type": "doc", "content": [
//!   {"type": "paragraph", "content": [{"type": "text", "text": "..."}]}
//! ]}
//! ```
//!
//! Reading is more forgiving. Any tree of blocks containing text runs is
//! flattened, a lone `text` field is shown verbatim, and anything else is
//! pretty-printed JSON. That last path is for display only; text produced
//! by it is not meant to be parsed back into the stored value.

use serde_json::{json, Value};

/// What [`to_text`] recognized in a section's stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    Empty,
    /// Exactly what [`to_content`] produces.
    Canonical,
    /// A block/run tree this client did not write (untyped nodes, several
    /// runs per block, headings, ...). Readable, rewritten canonically on save.
    ForeignTree,
    FlatText,
    Unrecognized,
}

impl ContentShape {
    pub fn is_authoritative(self) -> bool {
        matches!(self, Self::Empty | Self::Canonical)
    }
}

pub fn classify(content: &Value) -> ContentShape {
    if is_empty(content) {
        return ContentShape::Empty;
    }
    if let Some(blocks) = tree_blocks(content) {
        return if is_canonical(content, blocks) {
            ContentShape::Canonical
        } else {
            ContentShape::ForeignTree
        };
    }
    if flat_text(content).is_some() {
        return ContentShape::FlatText;
    }
    ContentShape::Unrecognized
}

/// Flatten stored content into the editable buffer. Never fails.
pub fn to_text(content: &Value) -> String {
    if is_empty(content) {
        return String::new();
    }
    if let Some(blocks) = tree_blocks(content) {
        return blocks
            .iter()
            .map(|block| {
                let mut out = String::new();
                collect_runs(block, &mut out);
                out
            })
            .collect::<Vec<_>>()
            .join("\n\n");
    }
    if let Some(text) = flat_text(content) {
        return text.to_string();
    }
    serde_json::to_string_pretty(content).unwrap_or_else(|_| content.to_string())
}

/// Build canonical content from the buffer: one paragraph per blank-line
/// separated block, blocks that are empty after trimming dropped.
pub fn to_content(text: &str) -> Value {
    let blocks: Vec<Value> = split_blocks(text)
        .into_iter()
        .map(|block| {
            json!({
                "type": "paragraph",
                "content": [{"type": "text", "text": block}]
            })
        })
        .collect();
    json!({"type": "doc", "content": blocks})
}

/// Blank (whitespace-only) lines separate blocks. Trailing whitespace is
/// stripped from each kept line.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut current, &mut blocks);
        } else {
            current.push(line.trim_end());
        }
    }
    flush_block(&mut current, &mut blocks);
    blocks
}

fn flush_block(current: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let block = current.join("\n");
    current.clear();
    if !block.trim().is_empty() {
        blocks.push(block);
    }
}

fn is_empty(content: &Value) -> bool {
    match content {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Root node whose `content` is a list of block objects.
fn tree_blocks(content: &Value) -> Option<&Vec<Value>> {
    let blocks = content.get("content")?.as_array()?;
    blocks.iter().all(Value::is_object).then_some(blocks)
}

fn flat_text(content: &Value) -> Option<&str> {
    match content {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("text").and_then(Value::as_str),
        _ => None,
    }
}

fn collect_runs(node: &Value, out: &mut String) {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        out.push_str(text);
    }
    if node.get("type").and_then(Value::as_str) == Some("hardBreak") {
        out.push('\n');
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_runs(child, out);
        }
    }
}

fn is_canonical(root: &Value, blocks: &[Value]) -> bool {
    let node_type = |v: &Value| v.get("type").and_then(Value::as_str).map(str::to_owned);
    if node_type(root).as_deref() != Some("doc") {
        return false;
    }
    blocks.iter().all(|block| {
        if node_type(block).as_deref() != Some("paragraph") {
            return false;
        }
        match block.get("content").and_then(Value::as_array) {
            Some(runs) if runs.len() == 1 => {
                node_type(&runs[0]).as_deref() == Some("text")
                    && runs[0].get("text").and_then(Value::as_str).is_some()
            }
            _ => false,
        }
    })
}
