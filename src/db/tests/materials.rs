//! Shared tests for MaterialRepo implementations

use uuid::Uuid;

use super::harness::create_test_user;
use crate::{
    authz::Predicate,
    db::{
        error::DbError,
        repos::{MaterialRepo, UserRepo},
    },
    models::{FileRef, MaterialVideo, NewMaterial, Role, UpdateMaterial, VideoKind},
};

pub struct MaterialTestContext<'a> {
    pub material_repo: &'a dyn MaterialRepo,
    pub user_repo: &'a dyn UserRepo,
}

fn document_material(title: &str, teacher_id: Uuid) -> NewMaterial {
    NewMaterial {
        title: title.to_string(),
        description: Some("Week one reading".to_string()),
        document: Some(FileRef::new(
            "/uploads/materi/reading_1-1.pdf",
            "application/pdf",
        )),
        video: None,
        teacher_id,
    }
}

pub async fn test_create_joins_teacher_name(ctx: &MaterialTestContext<'_>) {
    let teacher = create_test_user(ctx.user_repo, "guru", Role::Teacher).await;

    let material = ctx
        .material_repo
        .create(document_material("Algebra", teacher.id))
        .await
        .expect("Failed to create material");

    assert_eq!(material.title, "Algebra");
    assert_eq!(material.teacher_id, teacher.id);
    assert_eq!(material.teacher_name, teacher.full_name);
    assert_eq!(
        material.file_path.as_deref(),
        Some("/uploads/materi/reading_1-1.pdf")
    );
    assert_eq!(material.file_type.as_deref(), Some("application/pdf"));
    assert!(material.video_url.is_none());
    assert!(material.video_type.is_none());
}

pub async fn test_create_with_unknown_teacher_fails(ctx: &MaterialTestContext<'_>) {
    let result = ctx
        .material_repo
        .create(document_material("Orphan", Uuid::new_v4()))
        .await;
    assert!(matches!(result, Err(DbError::Validation(_))));
}

pub async fn test_create_external_video(ctx: &MaterialTestContext<'_>) {
    let teacher = create_test_user(ctx.user_repo, "guru", Role::Teacher).await;

    let material = ctx
        .material_repo
        .create(NewMaterial {
            title: "Lecture".to_string(),
            description: None,
            document: None,
            video: Some(MaterialVideo::external("https://youtu.be/abc123")),
            teacher_id: teacher.id,
        })
        .await
        .expect("Failed to create material");

    assert_eq!(material.video_type, Some(VideoKind::ExternalLink));
    assert_eq!(material.video_url.as_deref(), Some("https://youtu.be/abc123"));
    assert!(material.uploaded_video_path().is_none());
}

pub async fn test_list_scoped_to_owner(ctx: &MaterialTestContext<'_>) {
    let t1 = create_test_user(ctx.user_repo, "guru1", Role::Teacher).await;
    let t2 = create_test_user(ctx.user_repo, "guru2", Role::Teacher).await;

    ctx.material_repo
        .create(document_material("One", t1.id))
        .await
        .expect("Failed to create material");
    ctx.material_repo
        .create(document_material("Two", t1.id))
        .await
        .expect("Failed to create material");
    ctx.material_repo
        .create(document_material("Three", t2.id))
        .await
        .expect("Failed to create material");

    let all = ctx
        .material_repo
        .list(&Predicate::unrestricted())
        .await
        .expect("Failed to list materials");
    assert_eq!(all.len(), 3);

    let mine = ctx
        .material_repo
        .list(&Predicate::owned_by(t1.id))
        .await
        .expect("Failed to list materials");
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|m| m.teacher_id == t1.id));

    assert_eq!(ctx.material_repo.count().await.expect("count"), 3);
}

pub async fn test_update_by_non_owner_is_not_found(ctx: &MaterialTestContext<'_>) {
    let owner = create_test_user(ctx.user_repo, "owner", Role::Teacher).await;
    let other = create_test_user(ctx.user_repo, "other", Role::Teacher).await;
    let material = ctx
        .material_repo
        .create(document_material("Original", owner.id))
        .await
        .expect("Failed to create material");

    let input = UpdateMaterial {
        title: "Hijacked".to_string(),
        description: None,
    };
    let result = ctx
        .material_repo
        .update(material.id, &Predicate::owned_by(other.id), input.clone())
        .await;
    assert!(matches!(result, Err(DbError::NotFound)));

    let unchanged = ctx
        .material_repo
        .get(material.id, &Predicate::unrestricted())
        .await
        .expect("Material should still exist");
    assert_eq!(unchanged.title, "Original");

    let updated = ctx
        .material_repo
        .update(material.id, &Predicate::owned_by(owner.id), input)
        .await
        .expect("Owner should be able to update");
    assert_eq!(updated.title, "Hijacked");
    assert!(updated.description.is_none());
    assert_eq!(
        updated.file_path.as_deref(),
        Some("/uploads/materi/reading_1-1.pdf")
    );
}

pub async fn test_set_video_replaces_previous(ctx: &MaterialTestContext<'_>) {
    let teacher = create_test_user(ctx.user_repo, "guru", Role::Teacher).await;
    let material = ctx
        .material_repo
        .create(document_material("Video lesson", teacher.id))
        .await
        .expect("Failed to create material");

    let upload = FileRef::new("/uploads/materi/lesson_1-1.mp4", "video/mp4");
    let with_upload = ctx
        .material_repo
        .set_video(
            material.id,
            &Predicate::owned_by(teacher.id),
            MaterialVideo::uploaded(&upload),
        )
        .await
        .expect("Failed to attach video");
    assert_eq!(
        with_upload.uploaded_video_path(),
        Some("/uploads/materi/lesson_1-1.mp4")
    );

    let with_link = ctx
        .material_repo
        .set_video(
            material.id,
            &Predicate::owned_by(teacher.id),
            MaterialVideo::external("https://www.youtube.com/watch?v=xyz"),
        )
        .await
        .expect("Failed to attach link");
    assert_eq!(with_link.video_type, Some(VideoKind::ExternalLink));
    assert!(with_link.uploaded_video_path().is_none());
}

pub async fn test_delete_scoped(ctx: &MaterialTestContext<'_>) {
    let owner = create_test_user(ctx.user_repo, "owner", Role::Teacher).await;
    let other = create_test_user(ctx.user_repo, "other", Role::Teacher).await;
    let material = ctx
        .material_repo
        .create(document_material("Doomed", owner.id))
        .await
        .expect("Failed to create material");

    let denied = ctx
        .material_repo
        .delete(material.id, &Predicate::owned_by(other.id))
        .await;
    assert!(matches!(denied, Err(DbError::NotFound)));

    ctx.material_repo
        .delete(material.id, &Predicate::unrestricted())
        .await
        .expect("Admin scope should delete");

    let gone = ctx
        .material_repo
        .get(material.id, &Predicate::unrestricted())
        .await;
    assert!(matches!(gone, Err(DbError::NotFound)));
}

pub async fn test_deleting_teacher_cascades_materials(ctx: &MaterialTestContext<'_>) {
    let teacher = create_test_user(ctx.user_repo, "leaving", Role::Teacher).await;
    ctx.material_repo
        .create(document_material("Left behind", teacher.id))
        .await
        .expect("Failed to create material");

    ctx.user_repo
        .delete(teacher.id, &Predicate::unrestricted())
        .await
        .expect("Failed to delete teacher");

    assert_eq!(ctx.material_repo.count().await.expect("count"), 0);
}

mod sqlite_tests {
    use super::*;
    use crate::db::{
        sqlite::{SqliteMaterialRepo, SqliteUserRepo},
        tests::harness::{create_sqlite_pool, run_sqlite_migrations},
    };

    async fn create_repos() -> (SqliteMaterialRepo, SqliteUserRepo) {
        let pool = create_sqlite_pool().await;
        run_sqlite_migrations(&pool).await;
        (
            SqliteMaterialRepo::new(pool.clone()),
            SqliteUserRepo::new(pool),
        )
    }

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let (material_repo, user_repo) = create_repos().await;
                let ctx = MaterialTestContext {
                    material_repo: &material_repo,
                    user_repo: &user_repo,
                };
                super::$name(&ctx).await;
            }
        };
    }

    sqlite_test!(test_create_joins_teacher_name);
    sqlite_test!(test_create_with_unknown_teacher_fails);
    sqlite_test!(test_create_external_video);
    sqlite_test!(test_list_scoped_to_owner);
    sqlite_test!(test_update_by_non_owner_is_not_found);
    sqlite_test!(test_set_video_replaces_previous);
    sqlite_test!(test_delete_scoped);
    sqlite_test!(test_deleting_teacher_cascades_materials);
}
