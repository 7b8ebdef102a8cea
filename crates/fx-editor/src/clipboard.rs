//! Clipboard copy and paste.
//!
//! Copy serializes the active objects as `fx/json`. Paste resolves a
//! converter for each clipboard item by its full mime type, then by its
//! main type (`fx`, `text`), turns the item into object snapshots, adds them
//! to the canvas and selects them.

use crate::config::EditorConfig;
use fx_core::{Canvas, FxError, FxResult, ObjectId, ObjectKind, ObjectSnapshot, Point};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Mime type of copied canvas objects.
pub const FX_JSON: &str = "fx/json";

/// One entry of a clipboard or drop payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime: String,
    pub data: String,
}

impl ClipboardItem {
    pub fn new(mime: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// The part before the `/` (`text` for `text/plain`).
    pub fn main_type(&self) -> &str {
        self.mime.split('/').next().unwrap_or_default()
    }
}

/// Turns a clipboard item into objects to insert.
pub type TransferConverter = Rc<dyn Fn(&ClipboardItem) -> FxResult<Vec<ObjectSnapshot>>>;

/// Converters keyed by full mime type (`text/plain`) or main type (`fx`).
#[derive(Clone)]
pub struct TransferRegistry {
    converters: HashMap<String, TransferConverter>,
}

impl TransferRegistry {
    /// A registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter. Re-registering a type replaces it.
    pub fn register<F>(&mut self, mime: impl Into<String>, converter: F) -> &mut Self
    where
        F: Fn(&ClipboardItem) -> FxResult<Vec<ObjectSnapshot>> + 'static,
    {
        self.converters.insert(mime.into(), Rc::new(converter));
        self
    }

    /// Converter for `item`: exact mime first, then main type.
    pub fn resolve(&self, item: &ClipboardItem) -> Option<TransferConverter> {
        self.converters
            .get(&item.mime)
            .or_else(|| self.converters.get(item.main_type()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for TransferRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("fx", parse_fx_json)
            .register("text/plain", |item| Ok(vec![text_snapshot(&item.data)]))
            .register("text/html", |item| Ok(vec![text_snapshot(&html_text(&item.data))]));
        registry
    }
}

impl fmt::Debug for TransferRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.converters.keys().collect();
        types.sort();
        f.debug_struct("TransferRegistry").field("types", &types).finish()
    }
}

/// One snapshot or an array of snapshots.
fn parse_fx_json(item: &ClipboardItem) -> FxResult<Vec<ObjectSnapshot>> {
    let value: Value = serde_json::from_str(&item.data)
        .map_err(|e| FxError::Clipboard(format!("could not parse the JSON payload: {e}")))?;
    let values = match value {
        Value::Array(values) => values,
        single => vec![single],
    };
    values
        .into_iter()
        .map(|v| {
            serde_json::from_value(v)
                .map_err(|e| FxError::Clipboard(format!("not a canvas object: {e}")))
        })
        .collect()
}

fn text_snapshot(text: &str) -> ObjectSnapshot {
    ObjectSnapshot::of(ObjectKind::Text {
        text: text.to_string(),
    })
}

/// Elements whose content is never rendered as text.
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Elements that start and end a line of their own.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

/// Visible text of an HTML fragment, one line per block element.
fn html_text(html: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut raw = String::new();
    collect_text(&dom.document, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => {
            // Source line breaks are plain whitespace.
            out.extend(
                contents
                    .borrow()
                    .chars()
                    .map(|c| if c.is_whitespace() { ' ' } else { c }),
            );
        }
        NodeData::Element { name, .. } => {
            let tag: &str = &name.local;
            if HIDDEN_ELEMENTS.contains(&tag) {
                return;
            }
            if tag == "br" {
                out.push('\n');
                return;
            }
            let block = BLOCK_ELEMENTS.contains(&tag);
            if block {
                out.push('\n');
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

/// Serialize the active objects as an `fx/json` item. Objects inside a
/// group are copied with canvas coordinates. `None` if nothing is selected.
pub fn copy_selection(canvas: &Canvas, config: &EditorConfig) -> FxResult<Option<ClipboardItem>> {
    let active = canvas.active_objects();
    if active.is_empty() {
        return Ok(None);
    }
    let mut copies = Vec::with_capacity(active.len());
    for id in active {
        let snapshot = canvas.object_snapshot(*id)?;
        let mut value = serde_json::to_value(&snapshot)?;
        if canvas.parent_of(*id).is_some() {
            let absolute = canvas.parent_transform(*id) * Point::new(snapshot.left, snapshot.top);
            value["left"] = absolute.x.into();
            value["top"] = absolute.y.into();
        }
        if let Value::Object(map) = &mut value {
            for key in &config.exclude_from_copy {
                map.remove(key);
            }
        }
        copies.push(value);
    }
    let data = serde_json::to_string(&copies)?;
    log::debug!("copied {} object(s)", copies.len());
    Ok(Some(ClipboardItem::new(FX_JSON, data)))
}

/// Insert every convertible item and select what was inserted. Items with
/// no converter are skipped. If any snapshot fails to insert, nothing stays
/// on the canvas.
pub fn paste(
    canvas: &mut Canvas,
    transfers: &TransferRegistry,
    items: &[ClipboardItem],
) -> FxResult<Vec<ObjectId>> {
    let mut snapshots = Vec::new();
    for item in items {
        match transfers.resolve(item) {
            Some(convert) => snapshots.extend(convert(item)?),
            None => log::debug!("paste: no converter for {}", item.mime),
        }
    }

    let mut inserted = Vec::with_capacity(snapshots.len());
    for snapshot in &snapshots {
        match canvas.add_snapshot(snapshot) {
            Ok(id) => inserted.push(id),
            Err(err) => {
                for id in inserted {
                    if let Err(undo) = canvas.remove(id) {
                        log::warn!("paste rollback {id}: {undo}");
                    }
                }
                return Err(err);
            }
        }
    }
    if !inserted.is_empty() {
        canvas.set_active_objects(inserted.clone())?;
    }
    Ok(inserted)
}
