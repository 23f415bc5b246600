// src/services/form_service.rs

use std::collections::HashMap;

use crate::{
    common::error::AppError,
    db::FormRepository,
    models::forms::{
        CreateFieldPayload, CreateOptionPayload, FieldNode, FormField, FormOption, OptionNode,
        UpdateFieldPayload, UpdateOptionPayload,
    },
};

#[derive(Clone)]
pub struct FormService {
    repo: FormRepository,
}

impl FormService {
    pub fn new(repo: FormRepository) -> Self {
        Self { repo }
    }

    /// Loads a form and returns its top-level fields with nested `sub_fields`.
    ///
    /// Both reads run on one connection so the option set matches the field set.
    pub async fn assemble(&self, form_name: &str, include_inactive: bool) -> Result<Vec<FieldNode>, AppError> {
        let mut conn = self.repo.pool().acquire().await?;

        let fields = self.repo.list_fields(&mut *conn, form_name, include_inactive).await?;
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let field_ids: Vec<i64> = fields.iter().map(|f| f.id).collect();
        let options = self.repo.list_options(&mut *conn, &field_ids).await?;

        let tree = assemble_tree(fields, options);
        tracing::debug!(form_name, roots = tree.len(), "Form tree assembled");

        Ok(tree)
    }

    // =========================================================================
    //  ADMIN FORM BUILDER
    // =========================================================================

    pub async fn create_field(&self, form_name: &str, payload: CreateFieldPayload) -> Result<FormField, AppError> {
        let pool = self.repo.pool();

        if let Some(parent_id) = payload.parent_id {
            let parent = self
                .repo
                .find_field(pool, parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent field not found.".to_string()))?;

            ensure_same_form(&parent, form_name)?;
        }

        self.repo
            .create_field(
                pool,
                form_name,
                &payload.label,
                payload.field_type,
                payload.order,
                payload.parent_id,
                payload.is_active,
            )
            .await
    }

    /// Re-parenting holds the form's lock while the new parent is checked
    /// against the current subtree, so concurrent moves cannot close a cycle
    /// between them.
    pub async fn update_field(&self, id: i64, changes: UpdateFieldPayload) -> Result<FormField, AppError> {
        if changes.is_empty() {
            return Err(AppError::InvalidPayload("No fields to update.".to_string()));
        }

        let mut tx = self.repo.pool().begin().await?;

        if let Some(Some(new_parent)) = changes.parent_id {
            let field = self
                .repo
                .find_field(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Form field not found.".to_string()))?;

            self.repo.lock_form(&mut *tx, &field.form_name).await?;

            let parent = self
                .repo
                .find_field(&mut *tx, new_parent)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent field not found.".to_string()))?;
            ensure_same_form(&parent, &field.form_name)?;

            if self.repo.is_descendant_or_self(&mut *tx, id, new_parent).await? {
                return Err(AppError::UniqueConstraintViolation(
                    "A field cannot be nested under itself or one of its sub-fields.".to_string(),
                ));
            }
        }

        let field = self
            .repo
            .update_field(&mut *tx, id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Form field not found.".to_string()))?;

        tx.commit().await?;

        Ok(field)
    }

    // Sub-fields and options go with it
    pub async fn delete_field(&self, id: i64) -> Result<(), AppError> {
        match self.repo.delete_field(self.repo.pool(), id).await? {
            0 => Err(AppError::NotFound("Form field not found.".to_string())),
            _ => Ok(()),
        }
    }

    pub async fn create_option(&self, field_id: i64, payload: CreateOptionPayload) -> Result<FormOption, AppError> {
        let value = payload.resolved_value();

        self.repo
            .create_option(
                self.repo.pool(),
                field_id,
                &payload.label,
                &value,
                payload.details_label.as_deref(),
                payload.order,
            )
            .await
    }

    pub async fn update_option(&self, id: i64, changes: UpdateOptionPayload) -> Result<FormOption, AppError> {
        if changes.is_empty() {
            return Err(AppError::InvalidPayload("No fields to update.".to_string()));
        }

        self.repo
            .update_option(self.repo.pool(), id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Form option not found.".to_string()))
    }

    pub async fn delete_option(&self, id: i64) -> Result<(), AppError> {
        match self.repo.delete_option(self.repo.pool(), id).await? {
            0 => Err(AppError::NotFound("Form option not found.".to_string())),
            _ => Ok(()),
        }
    }
}

fn ensure_same_form(parent: &FormField, form_name: &str) -> Result<(), AppError> {
    if parent.form_name != form_name {
        return Err(AppError::InvalidPayload(
            "The parent field belongs to another form.".to_string(),
        ));
    }
    Ok(())
}

/// Builds the field forest from flat rows.
///
/// `fields` must already be in display order; that order is kept at every
/// level. Options are attached in the order given. A field whose parent is not
/// in `fields` is dropped together with its descendants, and so is every field
/// on a parent cycle, since neither can be reached from a top-level field.
pub fn assemble_tree(fields: Vec<FormField>, options: Vec<FormOption>) -> Vec<FieldNode> {
    let mut options_by_field: HashMap<i64, Vec<OptionNode>> = HashMap::new();
    for option in options {
        options_by_field
            .entry(option.field_id)
            .or_default()
            .push(OptionNode::from(option));
    }

    let index: HashMap<i64, usize> = fields.iter().enumerate().map(|(i, f)| (f.id, i)).collect();

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); fields.len()];
    for (i, field) in fields.iter().enumerate() {
        match field.parent_id {
            None => roots.push(i),
            Some(parent_id) => match index.get(&parent_id) {
                Some(&parent) => children[parent].push(i),
                None => tracing::debug!(field_id = field.id, parent_id, "Dropping field with unknown parent"),
            },
        }
    }

    let mut slots: Vec<Option<FieldNode>> = fields
        .into_iter()
        .map(|field| {
            let options = options_by_field.remove(&field.id).unwrap_or_default();
            Some(FieldNode::new(field, options))
        })
        .collect();

    roots
        .into_iter()
        .filter_map(|i| link(i, &children, &mut slots))
        .collect()
}

// Each slot is taken exactly once, so a node can never be its own ancestor
fn link(i: usize, children: &[Vec<usize>], slots: &mut [Option<FieldNode>]) -> Option<FieldNode> {
    let mut node = slots[i].take()?;
    node.sub_fields = children[i]
        .iter()
        .filter_map(|&child| link(child, children, slots))
        .collect();
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forms::FieldType;

    fn field(id: i64, label: &str, parent_id: Option<i64>, order: i32) -> FormField {
        FormField {
            id,
            form_name: "investor_profile".into(),
            label: label.into(),
            field_type: FieldType::Text,
            field_order: order,
            parent_id,
            is_active: true,
        }
    }

    fn option(id: i64, field_id: i64, label: &str, order: i32) -> FormOption {
        FormOption {
            id,
            field_id,
            label: label.into(),
            value: label.to_lowercase(),
            details_label: None,
            option_order: order,
        }
    }

    fn ids(nodes: &[FieldNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn dangling_parent_is_dropped() {
        let fields = vec![
            field(1, "Q1", None, 1),
            field(2, "Q1a", Some(1), 1),
            field(3, "Q2", Some(99), 2),
        ];

        let tree = assemble_tree(fields, Vec::new());

        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(ids(&tree[0].sub_fields), vec![2]);
        assert!(tree[0].sub_fields[0].sub_fields.is_empty());
    }

    #[test]
    fn every_field_is_placed_when_parents_resolve() {
        let fields = vec![
            field(10, "A", None, 1),
            field(11, "A.1", Some(10), 1),
            field(12, "A.2", Some(10), 2),
            field(13, "A.1.a", Some(11), 1),
            field(20, "B", None, 2),
            field(21, "B.1", Some(20), 1),
        ];
        let total = fields.len();

        let tree = assemble_tree(fields, Vec::new());

        assert_eq!(tree.iter().map(FieldNode::count).sum::<usize>(), total);
    }

    #[test]
    fn input_order_is_kept_at_every_level() {
        // Rows arrive sorted by (order, id); children may precede their parent
        let fields = vec![
            field(5, "child-first", Some(7), 0),
            field(7, "root", None, 1),
            field(6, "child-second", Some(7), 2),
            field(8, "root-2", None, 3),
        ];

        let tree = assemble_tree(fields, Vec::new());

        assert_eq!(ids(&tree), vec![7, 8]);
        assert_eq!(ids(&tree[0].sub_fields), vec![5, 6]);
    }

    #[test]
    fn options_are_grouped_in_given_order() {
        let fields = vec![field(1, "Horizon", None, 1), field(2, "Notes", None, 2)];
        let options = vec![
            option(30, 1, "Short", 1),
            option(10, 1, "Medium", 2),
            option(20, 1, "Long", 3),
        ];

        let tree = assemble_tree(fields, options);

        let labels: Vec<&str> = tree[0].options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Short", "Medium", "Long"]);
        assert!(tree[1].options.is_empty());
    }

    #[test]
    fn options_of_unknown_fields_are_ignored() {
        let tree = assemble_tree(vec![field(1, "Q", None, 1)], vec![option(1, 42, "Orphan", 1)]);

        assert!(tree[0].options.is_empty());
    }

    #[test]
    fn depth_is_unbounded() {
        let mut fields = vec![field(1, "level-1", None, 1)];
        for id in 2..=50 {
            fields.push(field(id, "nested", Some(id - 1), 1));
        }

        let tree = assemble_tree(fields, Vec::new());

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].count(), 50);

        let mut depth = 1;
        let mut node = &tree[0];
        while let Some(next) = node.sub_fields.first() {
            node = next;
            depth += 1;
        }
        assert_eq!(depth, 50);
    }

    #[test]
    fn cycles_are_unreachable_and_dropped() {
        let fields = vec![
            field(1, "root", None, 1),
            field(2, "loop-a", Some(3), 1),
            field(3, "loop-b", Some(2), 1),
            field(4, "below-loop", Some(2), 2),
            field(5, "self", Some(5), 3),
        ];

        let tree = assemble_tree(fields, Vec::new());

        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(tree[0].count(), 1);
    }

    #[test]
    fn descendants_of_a_dropped_field_are_dropped_too() {
        let fields = vec![
            field(1, "orphan", Some(99), 1),
            field(2, "orphan-child", Some(1), 1),
        ];

        assert!(assemble_tree(fields, Vec::new()).is_empty());
    }

    #[test]
    fn no_rows_yield_an_empty_tree() {
        assert!(assemble_tree(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn serialized_shape_uses_wire_names() {
        let tree = assemble_tree(
            vec![field(1, "Q1", None, 1), field(2, "Q1a", Some(1), 1)],
            vec![option(9, 1, "Yes", 1)],
        );

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "label": "Q1",
                "type": "text",
                "order": 1,
                "is_active": true,
                "options": [{ "id": 9, "label": "Yes", "value": "yes", "details_label": null }],
                "sub_fields": [{
                    "id": 2,
                    "label": "Q1a",
                    "type": "text",
                    "order": 1,
                    "is_active": true,
                    "options": [],
                    "sub_fields": []
                }]
            }])
        );
    }
}
