//! Integration tests for the advisory edit lock.
//!
//! Exercises the repository layer against a real database to verify that:
//! - The two lock fields move in lockstep (both null or both set)
//! - Acquire is idempotent for the current holder
//! - Acquire by a second user conflicts and never mutates the lock
//! - Only the holder can release
//! - Lock operations write nothing to the change ledger

use assert_matches::assert_matches;
use sqlx::PgPool;
use worksite_db::models::change_log::ChangeLogQuery;
use worksite_db::models::project::CreateProject;
use worksite_db::models::user::CreateUser;
use worksite_db::repositories::{
    ChangeLogRepo, LockAttempt, ProjectRepo, ReleaseAttempt, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: "Lock Test User".to_string(),
            role: None,
        },
    )
    .await
    .expect("user insert should succeed")
    .id
}

async fn seed_project(pool: &PgPool, created_by: i64, name: &str) -> i64 {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: name.to_string(),
            description: None,
            client_name: "Acme".to_string(),
            client_email: "office@acme.test".to_string(),
            client_phone: None,
        },
        created_by,
    )
    .await
    .expect("project insert should succeed")
    .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn new_project_is_unlocked(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Unlocked").await;

    let project = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.locked_by_user_id, None);
    assert_eq!(project.locked_at, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn acquire_sets_both_lock_fields(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Lockable").await;

    let attempt = ProjectRepo::acquire_lock(&pool, project_id, user).await.unwrap();
    let project = assert_matches!(attempt, LockAttempt::Acquired(p) => p);

    assert_eq!(project.locked_by_user_id, Some(user));
    assert!(project.locked_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn reacquire_by_holder_is_idempotent(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Reacquire").await;

    let first = ProjectRepo::acquire_lock(&pool, project_id, user).await.unwrap();
    let first = assert_matches!(first, LockAttempt::Acquired(p) => p);

    let second = ProjectRepo::acquire_lock(&pool, project_id, user).await.unwrap();
    let second = assert_matches!(second, LockAttempt::Acquired(p) => p);

    // Identical lock state both times: same holder, same acquisition time.
    assert_eq!(second.locked_by_user_id, Some(user));
    assert_eq!(first.locked_at, second.locked_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn acquire_by_second_user_conflicts_and_keeps_lock(pool: PgPool) {
    let user_a = seed_user(&pool, "a@example.test").await;
    let user_b = seed_user(&pool, "b@example.test").await;
    let project_id = seed_project(&pool, user_a, "Contended").await;

    let held = ProjectRepo::acquire_lock(&pool, project_id, user_a).await.unwrap();
    let held = assert_matches!(held, LockAttempt::Acquired(p) => p);

    let attempt = ProjectRepo::acquire_lock(&pool, project_id, user_b).await.unwrap();
    assert_matches!(
        attempt,
        LockAttempt::Held { holder_user_id, .. } if holder_user_id == user_a
    );

    // The lock itself is untouched.
    let project = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.locked_by_user_id, Some(user_a));
    assert_eq!(project.locked_at, held.locked_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn release_then_acquire_by_other_user(pool: PgPool) {
    let user_a = seed_user(&pool, "a@example.test").await;
    let user_b = seed_user(&pool, "b@example.test").await;
    let project_id = seed_project(&pool, user_a, "Handoff").await;

    // A acquires, B is rejected.
    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user_a).await.unwrap(),
        LockAttempt::Acquired(_)
    );
    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user_b).await.unwrap(),
        LockAttempt::Held { holder_user_id, .. } if holder_user_id == user_a
    );

    // A releases, B succeeds.
    assert_eq!(
        ProjectRepo::release_lock(&pool, project_id, user_a).await.unwrap(),
        ReleaseAttempt::Released
    );
    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user_b).await.unwrap(),
        LockAttempt::Acquired(p) if p.locked_by_user_id == Some(user_b)
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn release_by_non_holder_leaves_lock_untouched(pool: PgPool) {
    let user_a = seed_user(&pool, "a@example.test").await;
    let user_b = seed_user(&pool, "b@example.test").await;
    let project_id = seed_project(&pool, user_a, "Guarded").await;

    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user_a).await.unwrap(),
        LockAttempt::Acquired(_)
    );

    assert_eq!(
        ProjectRepo::release_lock(&pool, project_id, user_b).await.unwrap(),
        ReleaseAttempt::NotHolder
    );

    let project = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.locked_by_user_id, Some(user_a));
    assert!(project.locked_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn release_clears_both_lock_fields(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Released").await;

    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user).await.unwrap(),
        LockAttempt::Acquired(_)
    );
    assert_eq!(
        ProjectRepo::release_lock(&pool, project_id, user).await.unwrap(),
        ReleaseAttempt::Released
    );

    let project = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.locked_by_user_id, None);
    assert_eq!(project.locked_at, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn release_when_unlocked_is_not_holder(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Never Locked").await;

    assert_eq!(
        ProjectRepo::release_lock(&pool, project_id, user).await.unwrap(),
        ReleaseAttempt::NotHolder
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn lock_operations_on_missing_project_are_not_found(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;

    assert_matches!(
        ProjectRepo::acquire_lock(&pool, 9999, user).await.unwrap(),
        LockAttempt::NotFound
    );
    assert_eq!(
        ProjectRepo::release_lock(&pool, 9999, user).await.unwrap(),
        ReleaseAttempt::NotFound
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn acquire_on_soft_deleted_project_is_not_found(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Gone").await;

    assert!(ProjectRepo::soft_delete(&pool, project_id, user).await.unwrap());

    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user).await.unwrap(),
        LockAttempt::NotFound
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn lock_operations_write_no_ledger_entries(pool: PgPool) {
    let user = seed_user(&pool, "a@example.test").await;
    let project_id = seed_project(&pool, user, "Quiet").await;

    let before = ChangeLogRepo::count_by_project(&pool, project_id).await.unwrap();

    assert_matches!(
        ProjectRepo::acquire_lock(&pool, project_id, user).await.unwrap(),
        LockAttempt::Acquired(_)
    );
    assert_eq!(
        ProjectRepo::release_lock(&pool, project_id, user).await.unwrap(),
        ReleaseAttempt::Released
    );

    let after = ChangeLogRepo::list_by_project(&pool, project_id, &ChangeLogQuery::default())
        .await
        .unwrap();
    assert_eq!(after.len() as i64, before);
}
