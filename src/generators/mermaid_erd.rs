use crate::models::{ColumnDescriptor, SchemaSnapshot};
use crate::utils::type_mapper::TypeMapper;

/// Mermaid ER 图生成器
pub struct MermaidErdGenerator;

impl MermaidErdGenerator {
    pub fn generate(snapshot: &SchemaSnapshot) -> String {
        let mut diagram = String::from("erDiagram\n");

        for table in snapshot.iter_tables() {
            diagram.push_str(&format!("    {} {{\n", Self::entity_name(&table.table_name)));
            for col in &table.columns {
                diagram.push_str(&format!(
                    "        {} {}{}\n",
                    TypeMapper::diagram_type(col),
                    Self::entity_name(&col.name),
                    Self::key_suffix(col)
                ));
            }
            diagram.push_str("    }\n");
        }

        // 被引用表 ||--o{ 引用表
        for rel in snapshot.relationships() {
            diagram.push_str(&format!(
                "    {} ||--o{{ {} : \"{}\"\n",
                Self::entity_name(&rel.to_table),
                Self::entity_name(&rel.from_table),
                rel.from_column.replace('"', "'")
            ));
        }

        diagram
    }

    fn key_suffix(col: &ColumnDescriptor) -> &'static str {
        match (col.is_primary_key, col.is_foreign_key) {
            (true, true) => " PK, FK",
            (true, false) => " PK",
            (false, true) => " FK",
            (false, false) => "",
        }
    }

    /// Mermaid 实体名只允许字母数字、下划线和连字符
    fn entity_name(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}
