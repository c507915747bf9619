use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 列信息（来自 information_schema.columns，键标记由约束视图推导）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub max_length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
}

/// 表结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_keys: Vec<String>,
}

impl TableDescriptor {
    /// 按列顺序构建，主键集合从列标记推导
    pub fn from_columns(table_name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        let primary_keys = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();

        Self {
            table_name: table_name.into(),
            columns,
            primary_keys,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_foreign_key)
    }
}

/// 外键关系
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// 一次内省的完整结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    pub tables: Vec<String>,
    pub schema: BTreeMap<String, TableDescriptor>,
    pub table_count: usize,
}

impl SchemaSnapshot {
    /// `tables` 保持传入顺序
    pub fn new(descriptors: Vec<TableDescriptor>) -> Self {
        let tables: Vec<String> = descriptors.iter().map(|t| t.table_name.clone()).collect();
        let table_count = tables.len();
        let schema = descriptors
            .into_iter()
            .map(|t| (t.table_name.clone(), t))
            .collect();

        Self {
            tables,
            schema,
            table_count,
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.schema.get(name)
    }

    /// 按表顺序迭代
    pub fn iter_tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.iter().filter_map(|name| self.schema.get(name))
    }

    pub fn relationships(&self) -> Vec<Relationship> {
        self.iter_tables()
            .flat_map(|table| {
                table.foreign_keys().filter_map(move |col| {
                    match (&col.foreign_table, &col.foreign_column) {
                        (Some(to_table), Some(to_column)) => Some(Relationship {
                            from_table: table.table_name.clone(),
                            from_column: col.name.clone(),
                            to_table: to_table.clone(),
                            to_column: to_column.clone(),
                        }),
                        _ => None,
                    }
                })
            })
            .collect()
    }
}

/// 可视化结果：快照、外键关系和 Mermaid ER 图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaVisualization {
    pub snapshot: SchemaSnapshot,
    pub relationships: Vec<Relationship>,
    pub mermaid: String,
}
