// src/models/forms.rs

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- ENUMS ---

// Maps CREATE TYPE form_field_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "form_field_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
    Boolean,
}

// --- FLAT ROWS (as stored) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FormField {
    pub id: i64,
    pub form_name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(rename = "order")]
    pub field_order: i32,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FormOption {
    pub id: i64,
    pub field_id: i64,
    pub label: String,
    pub value: String,
    pub details_label: Option<String>,
    #[serde(rename = "order")]
    pub option_order: i32,
}

// --- ASSEMBLED TREE (as served) ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OptionNode {
    pub id: i64,
    pub label: String,
    pub value: String,
    pub details_label: Option<String>,
}

impl From<FormOption> for OptionNode {
    fn from(opt: FormOption) -> Self {
        Self {
            id: opt.id,
            label: opt.label,
            value: opt.value,
            details_label: opt.details_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldNode {
    pub id: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub order: i32,
    pub is_active: bool,
    pub options: Vec<OptionNode>,
    #[schema(no_recursion)]
    pub sub_fields: Vec<FieldNode>,
}

impl FieldNode {
    pub fn new(field: FormField, options: Vec<OptionNode>) -> Self {
        Self {
            id: field.id,
            label: field.label,
            field_type: field.field_type,
            order: field.field_order,
            is_active: field.is_active,
            options,
            sub_fields: Vec::new(),
        }
    }

    /// Number of fields in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.sub_fields.iter().map(FieldNode::count).sum::<usize>()
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFieldPayload {
    #[validate(length(min = 1, max = 500, message = "required"))]
    #[schema(example = "What is your investment horizon?")]
    pub label: String,

    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub order: i32,

    pub parent_id: Option<i64>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial update; only the listed columns can ever be written.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFieldPayload {
    #[validate(length(min = 1, max = 500, message = "required"))]
    pub label: Option<String>,

    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,

    pub order: Option<i32>,

    pub is_active: Option<bool>,

    // Absent: unchanged. null: move to top level. number: new parent.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<i64>>,
}

impl UpdateFieldPayload {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.field_type.is_none()
            && self.order.is_none()
            && self.is_active.is_none()
            && self.parent_id.is_none()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionPayload {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "More than 10 years")]
    pub label: String,

    // Derived from the label when omitted
    #[validate(length(min = 1, max = 255, message = "required"))]
    pub value: Option<String>,

    pub details_label: Option<String>,

    #[serde(default)]
    pub order: i32,
}

impl CreateOptionPayload {
    pub fn resolved_value(&self) -> String {
        self.value
            .clone()
            .unwrap_or_else(|| self.label.trim().to_lowercase().replace(' ', "_"))
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOptionPayload {
    #[validate(length(min = 1, max = 255, message = "required"))]
    pub label: Option<String>,

    #[validate(length(min = 1, max = 255, message = "required"))]
    pub value: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub details_label: Option<Option<String>>,

    pub order: Option<i32>,
}

impl UpdateOptionPayload {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.value.is_none()
            && self.details_label.is_none()
            && self.order.is_none()
    }
}

fn default_field_type() -> FieldType {
    FieldType::Text
}

fn default_true() -> bool {
    true
}

// Distinguishes "key absent" from "key: null"
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
