// Database-backed checks of form assembly and the form builder.
// Run with DATABASE_URL set: cargo test -- --ignored

use advisory_crm::{
    common::error::AppError,
    db::FormRepository,
    models::forms::{
        CreateFieldPayload, CreateOptionPayload, FieldNode, FieldType, UpdateFieldPayload,
    },
    services::form_service::FormService,
};
use sqlx::PgPool;

const FORM: &str = "investor_profile";

fn field(label: &str, field_type: FieldType, order: i32, parent_id: Option<i64>) -> CreateFieldPayload {
    CreateFieldPayload {
        label: label.to_string(),
        field_type,
        order,
        parent_id,
        is_active: true,
    }
}

fn option(label: &str, order: i32) -> CreateOptionPayload {
    CreateOptionPayload {
        label: label.to_string(),
        value: None,
        details_label: None,
        order,
    }
}

fn labels(nodes: &[FieldNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.label.as_str()).collect()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn assembles_nested_fields_in_order(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    let employed = service
        .create_field(FORM, field("Are you employed?", FieldType::Radio, 1, None))
        .await
        .unwrap();
    service
        .create_field(FORM, field("Horizon", FieldType::Text, 0, None))
        .await
        .unwrap();
    let employer = service
        .create_field(FORM, field("Employer", FieldType::Text, 2, Some(employed.id)))
        .await
        .unwrap();
    service
        .create_field(FORM, field("Since", FieldType::Date, 1, Some(employed.id)))
        .await
        .unwrap();
    service
        .create_field(FORM, field("Sector", FieldType::Select, 0, Some(employer.id)))
        .await
        .unwrap();
    service
        .create_field("other_form", field("Unrelated", FieldType::Text, 0, None))
        .await
        .unwrap();

    service.create_option(employed.id, option("No", 2)).await.unwrap();
    service.create_option(employed.id, option("Yes", 1)).await.unwrap();

    let tree = service.assemble(FORM, false).await.unwrap();

    assert_eq!(labels(&tree), vec!["Horizon", "Are you employed?"]);
    let employed_node = &tree[1];
    assert_eq!(labels(&employed_node.sub_fields), vec!["Since", "Employer"]);
    assert_eq!(labels(&employed_node.sub_fields[1].sub_fields), vec!["Sector"]);

    let option_labels: Vec<&str> = employed_node.options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(option_labels, vec!["Yes", "No"]);
    assert_eq!(tree.iter().map(FieldNode::count).sum::<usize>(), 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn inactive_parent_hides_its_subtree(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    let mut parent = field("Legacy section", FieldType::Text, 0, None);
    parent.is_active = false;
    let parent = service.create_field(FORM, parent).await.unwrap();
    service
        .create_field(FORM, field("Still active", FieldType::Text, 0, Some(parent.id)))
        .await
        .unwrap();
    service
        .create_field(FORM, field("Visible", FieldType::Text, 1, None))
        .await
        .unwrap();

    let active = service.assemble(FORM, false).await.unwrap();
    assert_eq!(labels(&active), vec!["Visible"]);

    let editing = service.assemble(FORM, true).await.unwrap();
    assert_eq!(labels(&editing), vec!["Legacy section", "Visible"]);
    assert!(!editing[0].is_active);
    assert_eq!(labels(&editing[0].sub_fields), vec!["Still active"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_form_is_empty(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    assert!(service.assemble("nothing_here", true).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn reparenting_under_a_descendant_is_refused(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    let top = service
        .create_field(FORM, field("Top", FieldType::Text, 0, None))
        .await
        .unwrap();
    let child = service
        .create_field(FORM, field("Child", FieldType::Text, 0, Some(top.id)))
        .await
        .unwrap();

    for target in [child.id, top.id] {
        let result = service
            .update_field(
                top.id,
                UpdateFieldPayload {
                    parent_id: Some(Some(target)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::UniqueConstraintViolation(_))));
    }

    // Moving the child to the top level is fine
    let moved = service
        .update_field(
            child.id,
            UpdateFieldPayload {
                parent_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, None);

    let tree = service.assemble(FORM, false).await.unwrap();
    assert_eq!(labels(&tree), vec!["Top", "Child"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn parent_from_another_form_is_rejected(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    let foreign = service
        .create_field("other_form", field("Elsewhere", FieldType::Text, 0, None))
        .await
        .unwrap();

    let result = service
        .create_field(FORM, field("Child", FieldType::Text, 0, Some(foreign.id)))
        .await;

    assert!(matches!(result, Err(AppError::InvalidPayload(_))));
}

fn move_under(parent: i64) -> UpdateFieldPayload {
    UpdateFieldPayload {
        parent_id: Some(Some(parent)),
        ..Default::default()
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn moving_under_a_field_of_another_form_is_rejected(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    let mine = service
        .create_field(FORM, field("Mine", FieldType::Text, 0, None))
        .await
        .unwrap();
    let foreign = service
        .create_field("other_form", field("Elsewhere", FieldType::Text, 0, None))
        .await
        .unwrap();

    let result = service.update_field(mine.id, move_under(foreign.id)).await;
    assert!(matches!(result, Err(AppError::InvalidPayload(_))));

    let result = service.update_field(mine.id, move_under(987_654)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    assert_eq!(labels(&service.assemble(FORM, true).await.unwrap()), vec!["Mine"]);
    assert_eq!(labels(&service.assemble("other_form", true).await.unwrap()), vec!["Elsewhere"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn opposite_concurrent_moves_never_close_a_cycle(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    for round in 0..20 {
        let a = service
            .create_field(FORM, field(&format!("a-{round}"), FieldType::Text, round, None))
            .await
            .unwrap();
        let b = service
            .create_field(FORM, field(&format!("b-{round}"), FieldType::Text, round, None))
            .await
            .unwrap();

        let (a_under_b, b_under_a) = tokio::join!(
            service.update_field(a.id, move_under(b.id)),
            service.update_field(b.id, move_under(a.id))
        );

        // Exactly one move wins; the other sees it and is refused
        let refused = [&a_under_b, &b_under_a]
            .iter()
            .filter(|r| matches!(r, Err(AppError::UniqueConstraintViolation(_))))
            .count();
        assert_eq!(refused, 1, "round {round}");
        assert_eq!(a_under_b.is_ok() as usize + b_under_a.is_ok() as usize, 1, "round {round}");
    }

    // Every field is still reachable from a top-level field
    let tree = service.assemble(FORM, true).await.unwrap();
    assert_eq!(tree.len(), 20);
    assert_eq!(tree.iter().map(FieldNode::count).sum::<usize>(), 40);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleting_a_field_removes_its_subtree(pool: PgPool) {
    let service = FormService::new(FormRepository::new(pool));

    let top = service
        .create_field(FORM, field("Top", FieldType::Radio, 0, None))
        .await
        .unwrap();
    service
        .create_field(FORM, field("Child", FieldType::Text, 0, Some(top.id)))
        .await
        .unwrap();
    service.create_option(top.id, option("Yes", 0)).await.unwrap();

    service.delete_field(top.id).await.unwrap();

    assert!(service.assemble(FORM, true).await.unwrap().is_empty());
    assert!(matches!(service.delete_field(top.id).await, Err(AppError::NotFound(_))));
}
