//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 用指定 URL 创建存储并跑迁移（测试用，不依赖全局配置）
    pub async fn new_with_url(url: &str) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, 5, 5).await?
        } else {
            Self::connect_generic(&db_url, 5, 5).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    submissions::entities::Submission,
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_student_id(&self, student_id: &str) -> Result<Option<User>> {
        self.get_user_by_student_id_impl(student_id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_students(&self) -> Result<Vec<User>> {
        self.list_students_impl().await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 提交模块
    async fn create_submission(
        &self,
        user_id: i64,
        assignment_number: i32,
        file_path: &str,
        file_name: &str,
    ) -> Result<Submission> {
        self.create_submission_impl(user_id, assignment_number, file_path, file_name)
            .await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_submission_for_assignment(
        &self,
        user_id: i64,
        assignment_number: i32,
    ) -> Result<Option<Submission>> {
        self.get_submission_for_assignment_impl(user_id, assignment_number)
            .await
    }

    async fn update_submission_file(
        &self,
        id: i64,
        file_path: &str,
        file_name: &str,
    ) -> Result<Option<Submission>> {
        self.update_submission_file_impl(id, file_path, file_name)
            .await
    }

    async fn delete_submission(&self, id: i64) -> Result<bool> {
        self.delete_submission_impl(id).await
    }

    async fn list_submissions_by_user(&self, user_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_by_user_impl(user_id).await
    }

    async fn count_submissions(&self) -> Result<u64> {
        self.count_submissions_impl().await
    }
}
