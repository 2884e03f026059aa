#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use beanscan_server::detection::{
    CanonicalDefect, DetectionPipeline, DetectionRecordPersister, InferenceInvoker, LabelCatalog,
};
use beanscan_server::entities::{coffee_bean_grade_info, detection_record};
use beanscan_server::migrator::Migrator;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

/// Fresh SQLite database with all migrations applied. Keep the `TempDir`
/// alive for as long as the connection is used.
pub async fn setup_db() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("beanscan.db").display()
    );
    let db = Database::connect(&url).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    (dir, db)
}

/// A shell script standing in for the classifier: prints `stdout` then exits
/// with `exit_code`.
pub fn classifier_script(dir: &Path, stdout: &str, exit_code: i32) -> PathBuf {
    let path = dir.join(format!("classifier-{}.sh", uuid::Uuid::new_v4()));
    let body = format!(
        "echo 'loading model weights'\ncat <<'JSON'\n{}\nJSON\nexit {}\n",
        stdout, exit_code
    );
    std::fs::write(&path, body).expect("write classifier script");
    path
}

pub fn pipeline(db: &DatabaseConnection, script: &Path, labels: &[&str]) -> DetectionPipeline {
    DetectionPipeline::new(
        db.clone(),
        InferenceInvoker::new("sh", script.to_string_lossy(), None, 2),
        Arc::new(LabelCatalog::from_labels(labels.iter().copied())),
        0.5,
    )
}

pub async fn seed_grade(
    db: &DatabaseConnection,
    english_name: &str,
) -> coffee_bean_grade_info::Model {
    let now = chrono::Utc::now().naive_utc();
    coffee_bean_grade_info::ActiveModel {
        bean_name: Set(Some(format!("{} bean", english_name))),
        english_name: Set(english_name.to_string()),
        category: Set(Some("Primary defect".to_string())),
        flavor_impact: Set(Some("Harsh, woody".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed grade")
}

pub async fn seed_detection(
    db: &DatabaseConnection,
    user_id: i32,
    defect_types: &[&str],
) -> detection_record::Model {
    let defects: Vec<CanonicalDefect> = defect_types
        .iter()
        .map(|t| CanonicalDefect {
            defect_type: t.to_string(),
            confidence: 0.9,
        })
        .collect();
    let payload = serde_json::json!({ "defects": defects }).to_string();

    DetectionRecordPersister::new(db.clone())
        .persist(user_id, &format!("uploads/{}.jpg", uuid::Uuid::new_v4()), &payload, &defects)
        .await
        .expect("seed detection")
}
