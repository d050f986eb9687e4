#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support utilities for `profiles` integration tests.
//!
//! Provides an in-memory database, seeding helpers, a recording object
//! storage, a multipart body builder and access tokens.

#![allow(dead_code)] // Support module provides utilities that may not all be used

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use bytes::Bytes;
use profiles::ProfilesModule;
use profiles::config::{JwtConfig, ProfilesConfig, SecretString};
use profiles::domain::ports::{ObjectStorage, StorageError};
use profiles::infra::jwt::JwtAuthManager;
use profiles::infra::storage::entity::{account, account_group};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use url::Url;

pub const SECRET: &str = "integration-test-secret";
pub const STORAGE_BASE: &str = "http://storage.test/theater-storage";

/// Create a fresh in-memory `SQLite` database with migrations applied.
///
/// # Panics
/// Panics if the database connection or migrations fail.
pub async fn inmem_db() -> DatabaseConnection {
    // A single pooled connection keeps the in-memory database alive.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory database");

    ProfilesModule::migrate(&db)
        .await
        .expect("Failed to run migrations");

    db
}

/// Seed an account group and return its id.
pub async fn seed_group(db: &DatabaseConnection, name: &str) -> i64 {
    let am = account_group::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    };
    am.insert(db).await.expect("Failed to seed group").id
}

/// Seed an account with an explicit id.
pub async fn seed_account(db: &DatabaseConnection, id: i64, group_id: i64, is_active: bool) {
    let am = account::ActiveModel {
        id: Set(id),
        email: Set(format!("user{id}@example.com")),
        is_active: Set(is_active),
        group_id: Set(group_id),
    };
    am.insert(db).await.expect("Failed to seed account");
}

/// Ids of the seeded groups.
pub struct Groups {
    pub user: i64,
    pub moderator: i64,
    pub admin: i64,
}

pub async fn seed_groups(db: &DatabaseConnection) -> Groups {
    Groups {
        user: seed_group(db, "user").await,
        moderator: seed_group(db, "moderator").await,
        admin: seed_group(db, "admin").await,
    }
}

/// In-memory object storage that records uploads and can be told to fail.
#[derive(Default)]
pub struct RecordingStorage {
    pub objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail_uploads: bool,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_uploads {
            return Err(StorageError::Backend(
                "connection refused (minio:9000)".to_owned(),
            ));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_owned(), (data, content_type.to_owned()));
        Ok(())
    }

    async fn get_file_url(&self, key: &str) -> Result<Url, StorageError> {
        Ok(Url::parse(&format!("{STORAGE_BASE}/{key}"))?)
    }
}

pub fn jwt() -> JwtAuthManager {
    JwtAuthManager::from_config(&jwt_config()).unwrap()
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret_key_access: Some(SecretString::new(SECRET)),
        ..JwtConfig::default()
    }
}

pub fn token_for(user_id: i64) -> String {
    jwt().create_access_token(user_id).unwrap()
}

/// Router, database and storage of one test.
pub struct TestApp {
    pub db: DatabaseConnection,
    pub storage: Arc<RecordingStorage>,
    pub groups: Groups,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_storage(RecordingStorage::default()).await
    }

    pub async fn with_storage(storage: RecordingStorage) -> Self {
        let db = inmem_db().await;
        let groups = seed_groups(&db).await;
        let storage = Arc::new(storage);

        let cfg = ProfilesConfig {
            jwt: jwt_config(),
            ..ProfilesConfig::default()
        };
        let module =
            ProfilesModule::with_adapters(&cfg, db.clone(), storage.clone(), Arc::new(jwt()));

        Self {
            db,
            storage,
            groups,
            router: module.router(),
        }
    }
}

/// A small valid PNG image.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

const BOUNDARY: &str = "----profiles-test-boundary";

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with every field valid and `cat.png` as avatar.
    pub fn valid_profile() -> Self {
        Self::new()
            .text("first_name", "John")
            .text("last_name", "Doe")
            .text("gender", "male")
            .text("date_of_birth", "1990-01-01")
            .text("info", "Movie lover")
            .file("avatar", "cat.png", "image/png", &png_bytes())
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_body(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }

    /// `POST /users/{user_id}/profile/` with this form and an optional token.
    pub fn request(self, user_id: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("/users/{user_id}/profile/"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(self.into_body())).unwrap()
    }
}

/// Replace a text field of the valid form.
pub fn valid_profile_with(name: &str, value: &str) -> MultipartBuilder {
    let fields = [
        ("first_name", "John"),
        ("last_name", "Doe"),
        ("gender", "male"),
        ("date_of_birth", "1990-01-01"),
        ("info", "Movie lover"),
    ];
    let mut form = MultipartBuilder::new();
    for (field, default) in fields {
        form = form.text(field, if field == name { value } else { default });
    }
    form.file("avatar", "cat.png", "image/png", &png_bytes())
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn profile_count(db: &DatabaseConnection) -> u64 {
    use profiles::infra::storage::entity::profile;
    use sea_orm::{EntityTrait, PaginatorTrait};
    profile::Entity::find().count(db).await.unwrap()
}
