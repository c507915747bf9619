use crate::db::schema;
use crate::models::{ColumnDescriptor, SchemaSnapshot, TableDescriptor};
use crate::utils::error::{AppError, Result};
use sqlx::PgPool;

/// 默认内省的 schema
pub const DEFAULT_SCHEMA: &str = "public";

/// 元数据服务
///
/// 每次调用都重新读取 information_schema，不缓存结果。
pub struct MetadataService;

impl MetadataService {
    /// 内省 public schema 下的所有基础表
    pub async fn extract_schema(pool: &PgPool) -> Result<SchemaSnapshot> {
        Self::extract_schema_in(pool, DEFAULT_SCHEMA).await
    }

    /// 内省指定 schema，任一查询失败则整体失败
    pub async fn extract_schema_in(pool: &PgPool, schema_name: &str) -> Result<SchemaSnapshot> {
        tracing::info!("Extracting schema {}", schema_name);

        let tables = Self::list_tables(pool, schema_name).await?;

        let mut descriptors = Vec::with_capacity(tables.len());
        for table in &tables {
            let descriptor = Self::describe_table(pool, schema_name, table).await?;
            descriptors.push(descriptor);
        }

        let snapshot = SchemaSnapshot::new(descriptors);
        tracing::info!(
            "Extracted schema {}: {} tables, {} relationships",
            schema_name,
            snapshot.table_count,
            snapshot.relationships().len()
        );

        Ok(snapshot)
    }

    /// 获取基础表列表
    pub async fn list_tables(pool: &PgPool, schema_name: &str) -> Result<Vec<String>> {
        let tables: Vec<String> = sqlx::query_scalar(schema::LIST_BASE_TABLES)
            .bind(schema_name)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list tables in schema {}: {}", schema_name, e);
                AppError::SchemaIntrospection(e)
            })?;

        tracing::debug!("Found {} tables in schema {}", tables.len(), schema_name);
        Ok(tables)
    }

    /// 获取单张表的列、主键和外键
    pub async fn describe_table(
        pool: &PgPool,
        schema_name: &str,
        table: &str,
    ) -> Result<TableDescriptor> {
        tracing::debug!("Fetching columns for {}.{}", schema_name, table);

        let rows = sqlx::query_as::<_, ColumnRow>(schema::DESCRIBE_TABLE_COLUMNS)
            .bind(schema_name)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to query columns for {}.{}: {}",
                    schema_name,
                    table,
                    e
                );
                AppError::SchemaIntrospection(e)
            })?;

        let columns: Vec<ColumnDescriptor> = rows.into_iter().map(Into::into).collect();
        let descriptor = TableDescriptor::from_columns(table, columns);

        tracing::debug!(
            "Fetched {}.{}: {} columns, {} primary keys",
            schema_name,
            table,
            descriptor.columns.len(),
            descriptor.primary_keys.len()
        );
        Ok(descriptor)
    }
}

// 辅助结构用于从 information_schema 读取列
#[derive(sqlx::FromRow)]
struct ColumnRow {
    column_name: String,
    data_type: String,
    is_nullable: String,
    column_default: Option<String>,
    character_maximum_length: Option<i64>,
    numeric_precision: Option<i64>,
    numeric_scale: Option<i64>,
    is_primary_key: bool,
    is_foreign_key: bool,
    foreign_table_name: Option<String>,
    foreign_column_name: Option<String>,
}

impl From<ColumnRow> for ColumnDescriptor {
    fn from(row: ColumnRow) -> Self {
        ColumnDescriptor {
            name: row.column_name,
            data_type: row.data_type,
            is_nullable: row.is_nullable == "YES",
            default_value: row.column_default,
            max_length: row.character_maximum_length,
            precision: row.numeric_precision,
            scale: row.numeric_scale,
            is_primary_key: row.is_primary_key,
            is_foreign_key: row.is_foreign_key,
            foreign_table: row.foreign_table_name,
            foreign_column: row.foreign_column_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create(pool: &PgPool, ddl: &str) {
        sqlx::query(ddl).execute(pool).await.unwrap();
    }

    #[test]
    fn test_row_conversion() {
        let row = ColumnRow {
            column_name: "parent_id".to_string(),
            data_type: "integer".to_string(),
            is_nullable: "YES".to_string(),
            column_default: None,
            character_maximum_length: None,
            numeric_precision: Some(32),
            numeric_scale: Some(0),
            is_primary_key: false,
            is_foreign_key: true,
            foreign_table_name: Some("nodes".to_string()),
            foreign_column_name: Some("id".to_string()),
        };

        let column = ColumnDescriptor::from(row);
        assert!(column.is_nullable);
        assert!(column.is_foreign_key);
        assert_eq!(column.foreign_table.as_deref(), Some("nodes"));
        assert_eq!(column.precision, Some(32));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_empty_database(pool: PgPool) {
        let snapshot = MetadataService::extract_schema(&pool).await.unwrap();
        assert_eq!(snapshot.table_count, 0);
        assert!(snapshot.tables.is_empty());
        assert!(snapshot.schema.is_empty());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_self_referencing_table(pool: PgPool) {
        create(
            &pool,
            "CREATE TABLE nodes (id int PRIMARY KEY, name text, parent_id int REFERENCES nodes(id))",
        )
        .await;

        let snapshot = MetadataService::extract_schema(&pool).await.unwrap();
        let nodes = snapshot.table("nodes").unwrap();

        let names: Vec<&str> = nodes.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "parent_id"]);
        assert_eq!(nodes.primary_keys, vec!["id"]);

        let foreign: Vec<&ColumnDescriptor> = nodes.foreign_keys().collect();
        assert_eq!(foreign.len(), 1);
        assert_eq!(foreign[0].name, "parent_id");
        assert_eq!(foreign[0].foreign_table.as_deref(), Some("nodes"));
        assert_eq!(foreign[0].foreign_column.as_deref(), Some("id"));

        let id = nodes.column("id").unwrap();
        assert!(id.is_primary_key);
        assert!(!id.is_nullable);
        assert!(!id.is_foreign_key);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_composite_primary_key(pool: PgPool) {
        create(&pool, "CREATE TABLE pairs (a int, b int, note varchar(40), PRIMARY KEY (a, b))").await;

        let table = MetadataService::describe_table(&pool, DEFAULT_SCHEMA, "pairs")
            .await
            .unwrap();

        let mut keys = table.primary_keys.clone();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(table.column("note").unwrap().max_length, Some(40));
        assert_eq!(table.column("note").unwrap().data_type, "character varying");
    }

    fn reference(table: &TableDescriptor, column: &str) -> (Option<String>, Option<String>) {
        let col = table.column(column).unwrap();
        assert!(col.is_foreign_key, "{} should be a foreign key", column);
        (col.foreign_table.clone(), col.foreign_column.clone())
    }

    fn pair(table: &str, column: &str) -> (Option<String>, Option<String>) {
        (Some(table.to_string()), Some(column.to_string()))
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_composite_foreign_key_pairs_columns(pool: PgPool) {
        create(&pool, "CREATE TABLE parent (x int, y int, PRIMARY KEY (x, y))").await;
        create(
            &pool,
            "CREATE TABLE child (id int PRIMARY KEY, a int, b int, FOREIGN KEY (a, b) REFERENCES parent (x, y))",
        )
        .await;
        // 引用列顺序与主键顺序相反
        create(
            &pool,
            "CREATE TABLE swapped (id int PRIMARY KEY, a int, b int, FOREIGN KEY (a, b) REFERENCES parent (y, x))",
        )
        .await;

        let child = MetadataService::describe_table(&pool, DEFAULT_SCHEMA, "child")
            .await
            .unwrap();
        assert_eq!(reference(&child, "a"), pair("parent", "x"));
        assert_eq!(reference(&child, "b"), pair("parent", "y"));

        let swapped = MetadataService::describe_table(&pool, DEFAULT_SCHEMA, "swapped")
            .await
            .unwrap();
        assert_eq!(reference(&swapped, "a"), pair("parent", "y"));
        assert_eq!(reference(&swapped, "b"), pair("parent", "x"));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_column_in_two_foreign_keys_reported_once(pool: PgPool) {
        create(&pool, "CREATE TABLE accounts (id int PRIMARY KEY)").await;
        create(&pool, "CREATE TABLE archived (id int PRIMARY KEY)").await;
        create(
            &pool,
            "CREATE TABLE transfers (
                id int PRIMARY KEY,
                account_id int,
                CONSTRAINT b_live FOREIGN KEY (account_id) REFERENCES accounts (id),
                CONSTRAINT a_archived FOREIGN KEY (account_id) REFERENCES archived (id)
            )",
        )
        .await;

        let transfers = MetadataService::describe_table(&pool, DEFAULT_SCHEMA, "transfers")
            .await
            .unwrap();

        let names: Vec<&str> = transfers.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "account_id"]);
        assert_eq!(reference(&transfers, "account_id"), pair("archived", "id"));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_foreign_key_to_unique_index(pool: PgPool) {
        create(&pool, "CREATE TABLE codes (code text NOT NULL)").await;
        create(&pool, "CREATE UNIQUE INDEX codes_code_idx ON codes (code)").await;
        create(&pool, "CREATE TABLE uses (id int PRIMARY KEY, code text REFERENCES codes (code))").await;

        let uses = MetadataService::describe_table(&pool, DEFAULT_SCHEMA, "uses")
            .await
            .unwrap();
        let (table, _) = reference(&uses, "code");
        assert_eq!(table.as_deref(), Some("codes"));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_same_table_name_in_other_schema(pool: PgPool) {
        create(&pool, "CREATE TABLE users (id int, name text)").await;
        create(&pool, "CREATE SCHEMA other").await;
        create(&pool, "CREATE TABLE other.teams (id int PRIMARY KEY)").await;
        create(
            &pool,
            "CREATE TABLE other.users (id int PRIMARY KEY, name text, team_id int REFERENCES other.teams (id))",
        )
        .await;

        let public = MetadataService::extract_schema(&pool).await.unwrap();
        assert_eq!(public.tables, vec!["users"]);
        let users = public.table("users").unwrap();
        let names: Vec<&str> = users.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert!(users.primary_keys.is_empty());
        assert_eq!(users.foreign_keys().count(), 0);

        let other = MetadataService::extract_schema_in(&pool, "other").await.unwrap();
        assert_eq!(other.tables, vec!["teams", "users"]);
        let users = other.table("users").unwrap();
        assert_eq!(users.primary_keys, vec!["id"]);
        assert_eq!(reference(users, "team_id"), pair("teams", "id"));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_tables_sorted_and_views_skipped(pool: PgPool) {
        create(&pool, "CREATE TABLE zebra (id serial PRIMARY KEY)").await;
        create(&pool, "CREATE TABLE apple (id serial PRIMARY KEY, zebra_id int REFERENCES zebra(id))").await;
        create(&pool, "CREATE TABLE loose (line text)").await;
        create(&pool, "CREATE VIEW apple_view AS SELECT * FROM apple").await;

        let snapshot = MetadataService::extract_schema(&pool).await.unwrap();

        assert_eq!(snapshot.tables, vec!["apple", "loose", "zebra"]);
        assert_eq!(snapshot.table_count, 3);
        assert!(snapshot.table("loose").unwrap().primary_keys.is_empty());

        let relationships = snapshot.relationships();
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].from_table, "apple");
        assert_eq!(relationships[0].to_table, "zebra");
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_repeated_calls_are_equal(pool: PgPool) {
        create(&pool, "CREATE TABLE items (id bigint PRIMARY KEY, price numeric(10, 2) DEFAULT 0)").await;

        let first = MetadataService::extract_schema(&pool).await.unwrap();
        let second = MetadataService::extract_schema(&pool).await.unwrap();
        assert_eq!(first, second);

        let price = first.table("items").unwrap().column("price").unwrap();
        assert_eq!(price.precision, Some(10));
        assert_eq!(price.scale, Some(2));
        assert!(price.default_value.is_some());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_schema_change_is_picked_up(pool: PgPool) {
        let before = MetadataService::extract_schema(&pool).await.unwrap();
        create(&pool, "CREATE TABLE late (id int PRIMARY KEY)").await;
        let after = MetadataService::extract_schema(&pool).await.unwrap();

        assert_eq!(before.table_count, 0);
        assert_eq!(after.tables, vec!["late"]);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_query_failure_is_introspection_error(pool: PgPool) {
        pool.close().await;

        let err = MetadataService::extract_schema(&pool).await.unwrap_err();
        assert_eq!(err.kind(), "schema_introspection");
    }
}
