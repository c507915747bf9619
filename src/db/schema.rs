/// 列出指定 schema 下的基础表（不含视图），按表名排序
///
/// information_schema 的列是 sql_identifier 等 domain 类型，统一转换为 text/int8 以便解码
pub const LIST_BASE_TABLES: &str = r#"
SELECT t.table_name::text AS table_name
FROM information_schema.tables t
WHERE t.table_schema = $1
  AND t.table_type = 'BASE TABLE'
ORDER BY t.table_name
"#;

/// 按 ordinal_position 返回一张表的列，并标记主键和外键
///
/// 被引用列按 position_in_unique_constraint 与本地列一一对应（复合外键）。
/// 被引用方只有唯一索引没有约束时 unique_constraint_name 为空，此时只能给出被引用表。
/// 被多个外键覆盖的列只取约束名最小的那一个
pub const DESCRIBE_TABLE_COLUMNS: &str = r#"
SELECT
    c.column_name::text AS column_name,
    c.data_type::text AS data_type,
    c.is_nullable::text AS is_nullable,
    c.column_default::text AS column_default,
    c.character_maximum_length::int8 AS character_maximum_length,
    c.numeric_precision::int8 AS numeric_precision,
    c.numeric_scale::int8 AS numeric_scale,
    (pk.column_name IS NOT NULL) AS is_primary_key,
    (fk.column_name IS NOT NULL) AS is_foreign_key,
    fk.foreign_table_name,
    fk.foreign_column_name
FROM information_schema.columns c
LEFT JOIN (
    SELECT DISTINCT kcu.column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.constraint_schema = kcu.constraint_schema
     AND tc.table_name = kcu.table_name
    WHERE tc.constraint_type = 'PRIMARY KEY'
      AND tc.table_schema = $1
      AND tc.table_name = $2
) pk ON pk.column_name = c.column_name
LEFT JOIN (
    SELECT DISTINCT ON (kcu.column_name)
        kcu.column_name,
        COALESCE(ref.table_name, ctu.table_name)::text AS foreign_table_name,
        ref.column_name::text AS foreign_column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.constraint_schema = kcu.constraint_schema
     AND tc.table_name = kcu.table_name
    JOIN information_schema.constraint_table_usage ctu
      ON ctu.constraint_name = tc.constraint_name
     AND ctu.constraint_schema = tc.constraint_schema
    LEFT JOIN information_schema.referential_constraints rc
      ON rc.constraint_name = tc.constraint_name
     AND rc.constraint_schema = tc.constraint_schema
    LEFT JOIN information_schema.key_column_usage ref
      ON ref.constraint_name = rc.unique_constraint_name
     AND ref.constraint_schema = rc.unique_constraint_schema
     AND ref.ordinal_position = kcu.position_in_unique_constraint
    WHERE tc.constraint_type = 'FOREIGN KEY'
      AND tc.table_schema = $1
      AND tc.table_name = $2
    ORDER BY kcu.column_name, tc.constraint_name
) fk ON fk.column_name = c.column_name
WHERE c.table_schema = $1
  AND c.table_name = $2
ORDER BY c.ordinal_position
"#;

/// 连接测试
pub const PING: &str = "SELECT 1";
