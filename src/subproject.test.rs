use super::*;
use tempfile::TempDir;

fn subproject(id: &str, path: &str, created_at: i64) -> Subproject {
    Subproject {
        id: id.to_string(),
        path: path.to_string(),
        name: id.to_string(),
        marker_file: None,
        language_hint: None,
        auto_detected: false,
        created_at,
        updated_at: created_at,
    }
}

#[tokio::test]
async fn longest_prefix_wins() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 8).unwrap();
    storage
        .insert_subproject(subproject("frontend", "packages/frontend", 1))
        .await
        .unwrap();
    storage
        .insert_subproject(subproject("frontend-admin", "packages/frontend/admin", 2))
        .await
        .unwrap();

    let index = SubprojectIndex::load(&storage).await.unwrap();

    let admin = index
        .subproject_for("packages/frontend/admin/Dashboard.tsx")
        .unwrap();
    assert_eq!(admin.id, "frontend-admin");

    let app = index.subproject_for("packages/frontend/App.tsx").unwrap();
    assert_eq!(app.id, "frontend");
}

#[tokio::test]
async fn no_match_returns_none() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 8).unwrap();
    storage
        .insert_subproject(subproject("frontend", "packages/frontend", 1))
        .await
        .unwrap();
    let index = SubprojectIndex::load(&storage).await.unwrap();
    assert!(index.subproject_for("packages/backend/main.rs").is_none());
}

#[tokio::test]
async fn dot_prefix_matches_everything() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 8).unwrap();
    storage.insert_subproject(subproject("root", ".", 1)).await.unwrap();
    let index = SubprojectIndex::load(&storage).await.unwrap();
    assert!(index.subproject_for("anything/at/all.rs").is_some());
}
