//! # Domain Types
//!
//! The read-only view over a host content page that the render paths use.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ContentRecord   │   │   FieldValue    │   │   FieldState    │       │
//! │  │  (host trait)   │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  template()     │──►│  Text           │   │  Undefined      │       │
//! │  │  has_field()    │   │  Number         │   │  Off            │       │
//! │  │  get()          │   │  Bool           │   │  On             │       │
//! │  │  thumbnail()    │   │  List           │   └─────────────────┘       │
//! │  │  meta()         │   └─────────────────┘                             │
//! │  └────────┬────────┘                                                    │
//! │           │            ┌─────────────────┐                              │
//! │           └───────────►│    PageMeta     │  → data-item-metadata        │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`PageRecord`] is a plain in-memory implementation, deserializable from a
//! JSON page snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::{bool_from_value, decimal_from_value, ThumbnailSpec};

// =============================================================================
// Field Value
// =============================================================================

/// The value of one page field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Bool(bool),
    /// Multi-value fields (page references, options), as labels.
    List(Vec<String>),
}

impl FieldValue {
    /// Converts a loosely typed JSON value; `null` and objects have no value.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(_) => decimal_from_value(value).map(FieldValue::Number),
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Array(items) => Some(FieldValue::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Whether the host would treat this value as "not filled in".
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(n) => n.is_zero(),
            FieldValue::Bool(b) => !b,
            FieldValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// Non-empty text form; lists are joined with `,`.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Number(n) => n.normalize().to_string(),
            FieldValue::Bool(b) => (if *b { "1" } else { "" }).to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => decimal_from_value(&Value::String(s.clone())),
            FieldValue::Bool(_) | FieldValue::List(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Number(n) => Some(!n.is_zero()),
            FieldValue::Text(s) => bool_from_value(&Value::String(s.clone())),
            FieldValue::List(items) => Some(!items.is_empty()),
        }
    }

    /// Entries of a multi-value field; a single text is a one-entry list.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            other => other.as_text().into_iter().collect(),
        }
    }
}

// =============================================================================
// Field State
// =============================================================================

/// Tri-state answer for boolean product options.
///
/// `Undefined` means the page's template does not carry the field at all,
/// which is different from a checkbox left unticked (`Off`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Undefined,
    Off,
    On,
}

impl FieldState {
    /// Resolves the state, treating `Undefined` as `default`.
    pub fn unwrap_or(self, default: bool) -> bool {
        match self {
            FieldState::Undefined => default,
            FieldState::Off => false,
            FieldState::On => true,
        }
    }
}

// =============================================================================
// Page Meta
// =============================================================================

/// Identity and bookkeeping data of a page; emitted verbatim as the
/// `data-item-metadata` JSON blob (timestamps as Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: u64,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub modified: DateTime<Utc>,

    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub published: Option<DateTime<Utc>>,

    pub created_users_id: u64,

    pub modified_users_id: u64,
}

// =============================================================================
// Content Record
// =============================================================================

/// Read access to one host page.
///
/// Implemented by the host CMS adapter. All methods are reads; nothing in
/// this crate mutates a page.
pub trait ContentRecord {
    fn meta(&self) -> PageMeta;

    /// Name of the page's template.
    fn template(&self) -> &str;

    /// Absolute URL of the page.
    fn url(&self) -> String;

    /// Whether the page's template defines the field (filled in or not).
    fn has_field(&self, name: &str) -> bool;

    /// Value of a field; `None` when unset or not defined.
    fn get(&self, name: &str) -> Option<FieldValue>;

    /// URL of a resized variant of the first image in an image field.
    fn thumbnail(&self, field: &str, spec: &ThumbnailSpec) -> Option<String>;

    /// Tri-state lookup for checkbox-style fields.
    fn flag(&self, name: &str) -> FieldState {
        if !self.has_field(name) {
            return FieldState::Undefined;
        }
        match self.get(name).and_then(|v| v.as_bool()) {
            Some(true) => FieldState::On,
            _ => FieldState::Off,
        }
    }

    /// Non-empty text value of a field.
    fn text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|v| v.as_text())
    }

    /// Numeric value of a field.
    fn decimal(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(|v| v.as_decimal())
    }
}

// =============================================================================
// Page Record
// =============================================================================

/// A page snapshot held in memory.
///
/// ## JSON Shape
/// ```json
/// {
///   "meta": { "id": 1042, "created": 1700000000, "modified": 1700000500,
///             "published": 1700000100, "created_users_id": 41,
///             "modified_users_id": 41 },
///   "template": "snipcart-product",
///   "url": "https://shop.example/products/mug/",
///   "fields": ["snipcart_item_taxable"],
///   "values": { "title": "Mug", "snipcart_item_price_eur": 12.5 },
///   "images": { "snipcart_item_image": "https://shop.example/files/1042/mug.jpg" }
/// }
/// ```
///
/// `fields` lists template fields that carry no value; any key in `values`
/// or `images` counts as defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub meta: PageMeta,
    pub template: String,
    pub url: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

impl PageRecord {
    pub fn new(meta: PageMeta, template: impl Into<String>, url: impl Into<String>) -> Self {
        PageRecord {
            meta,
            template: template.into(),
            url: url.into(),
            fields: Vec::new(),
            values: BTreeMap::new(),
            images: BTreeMap::new(),
        }
    }

    /// Sets a field value (defines the field as a side effect).
    pub fn with_value(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Defines an empty field on the template.
    pub fn with_field(mut self, name: &str) -> Self {
        if !self.fields.iter().any(|f| f == name) {
            self.fields.push(name.to_string());
        }
        self
    }

    pub fn with_image(mut self, field: &str, url: impl Into<String>) -> Self {
        self.images.insert(field.to_string(), url.into());
        self
    }
}

impl ContentRecord for PageRecord {
    fn meta(&self) -> PageMeta {
        self.meta.clone()
    }

    fn template(&self) -> &str {
        &self.template
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn has_field(&self, name: &str) -> bool {
        self.values.contains_key(name)
            || self.images.contains_key(name)
            || self.fields.iter().any(|f| f == name)
    }

    fn get(&self, name: &str) -> Option<FieldValue> {
        self.values.get(name).and_then(FieldValue::from_json)
    }

    /// Variant naming follows the host's image sizer:
    /// `mug.jpg` → `mug.65x65.jpg`, `mug.65x65-hidpi.jpg` for hidpi.
    fn thumbnail(&self, field: &str, spec: &ThumbnailSpec) -> Option<String> {
        let original = self.images.get(field)?;
        let suffix = if spec.hidpi { "-hidpi" } else { "" };
        let variant = format!("{}x{}{}", spec.width, spec.height, suffix);

        let file_start = original.rfind('/').map_or(0, |i| i + 1);
        Some(match original[file_start..].rfind('.') {
            Some(dot) => {
                let dot = file_start + dot;
                format!("{}.{}{}", &original[..dot], variant, &original[dot..])
            }
            None => format!("{original}.{variant}"),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
