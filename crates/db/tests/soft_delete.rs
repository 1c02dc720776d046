//! Integration tests for soft-delete behaviour.
//!
//! Verifies that:
//! - Soft-deleted projects are hidden from `find_by_id` and list queries
//! - Soft-delete is NOT idempotent at the contract level: the second call
//!   reports no row deleted, which the API maps to 404
//! - Project creation and deletion each leave a ledger entry

use sqlx::PgPool;
use worksite_db::models::change_log::ChangeLogQuery;
use worksite_db::models::project::{CreateProject, ProjectFilter};
use worksite_db::models::user::CreateUser;
use worksite_db::repositories::{ChangeLogRepo, ProjectRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "owner@example.test".to_string(),
            full_name: "Owner".to_string(),
            role: Some("sales".to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: Some("soft delete test".to_string()),
        client_name: "Acme".to_string(),
        client_email: "office@acme.test".to_string(),
        client_phone: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn soft_deleted_project_is_hidden(pool: PgPool) {
    let user = seed_user(&pool).await;
    let project = ProjectRepo::create(&pool, &new_project("Hidden"), user)
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id, user).await.unwrap());

    assert!(ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_none());

    let listed = ProjectRepo::list(&pool, &ProjectFilter::default()).await.unwrap();
    assert!(listed.iter().all(|p| p.id != project.id));
}

#[sqlx::test(migrations = "../../migrations")]
async fn second_delete_reports_nothing_deleted(pool: PgPool) {
    let user = seed_user(&pool).await;
    let project = ProjectRepo::create(&pool, &new_project("Twice"), user)
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id, user).await.unwrap());
    assert!(!ProjectRepo::soft_delete(&pool, project.id, user).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_of_missing_project_reports_nothing_deleted(pool: PgPool) {
    let user = seed_user(&pool).await;
    assert!(!ProjectRepo::soft_delete(&pool, 9999, user).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn creation_and_deletion_both_leave_ledger_entries(pool: PgPool) {
    let user = seed_user(&pool).await;
    let project = ProjectRepo::create(&pool, &new_project("Audited"), user)
        .await
        .unwrap();

    let after_create =
        ChangeLogRepo::list_by_project(&pool, project.id, &ChangeLogQuery::default())
            .await
            .unwrap();
    assert_eq!(after_create.len(), 1);
    assert_eq!(after_create[0].notes.as_deref(), Some("project created"));

    ProjectRepo::soft_delete(&pool, project.id, user).await.unwrap();

    let after_delete =
        ChangeLogRepo::list_by_project(&pool, project.id, &ChangeLogQuery::default())
            .await
            .unwrap();
    assert_eq!(after_delete.len(), 2);
    assert_eq!(after_delete[0].notes.as_deref(), Some("project deleted"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_filters_by_status_and_creator(pool: PgPool) {
    let user = seed_user(&pool).await;
    let other = UserRepo::create(
        &pool,
        &CreateUser {
            email: "other@example.test".to_string(),
            full_name: "Other".to_string(),
            role: None,
        },
    )
    .await
    .unwrap()
    .id;

    ProjectRepo::create(&pool, &new_project("Mine"), user).await.unwrap();
    ProjectRepo::create(&pool, &new_project("Theirs"), other).await.unwrap();

    let mine = ProjectRepo::list(
        &pool,
        &ProjectFilter {
            status: None,
            created_by: Some(user),
        },
    )
    .await
    .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Mine");

    let drafts = ProjectRepo::list(
        &pool,
        &ProjectFilter {
            status: Some("draft".to_string()),
            created_by: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(drafts.len(), 2);
}
