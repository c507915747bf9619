use crate::models::{ColumnDescriptor, SchemaSnapshot, TableDescriptor};
use crate::utils::type_mapper::TypeMapper;

/// Markdown 文档生成器
pub struct MarkdownDocsGenerator;

impl MarkdownDocsGenerator {
    /// 生成整个数据库的文档
    pub fn generate(snapshot: &SchemaSnapshot, title: &str) -> String {
        let mut doc = format!("# {}\n\n", title);

        let noun = if snapshot.table_count == 1 { "table" } else { "tables" };
        doc.push_str(&format!("{} {}\n\n", snapshot.table_count, noun));

        if snapshot.table_count == 0 {
            return doc;
        }

        doc.push_str("## Tables\n\n");
        for table in snapshot.iter_tables() {
            doc.push_str(&format!(
                "- [{}](#{})\n",
                table.table_name,
                Self::anchor(&table.table_name)
            ));
        }
        doc.push('\n');

        for table in snapshot.iter_tables() {
            doc.push_str(&Self::generate_table(snapshot, table));
        }

        doc
    }

    /// 生成单表章节，快照用于解析外键引用的链接
    pub fn generate_table(snapshot: &SchemaSnapshot, table: &TableDescriptor) -> String {
        let mut section = format!("## {}\n\n", table.table_name);

        if table.primary_keys.is_empty() {
            section.push_str("Primary key: none\n\n");
        } else {
            section.push_str(&format!(
                "Primary key: `{}`\n\n",
                table.primary_keys.join("`, `")
            ));
        }

        section.push_str("| Column | Type | Nullable | Default | Key | References |\n");
        section.push_str("|---|---|---|---|---|---|\n");
        for col in &table.columns {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                Self::escape(&col.name),
                Self::escape(&TypeMapper::display_type(col)),
                if col.is_nullable { "yes" } else { "no" },
                col.default_value
                    .as_deref()
                    .map(|d| Self::code_span(&Self::escape(d)))
                    .unwrap_or_default(),
                Self::key_marker(col),
                Self::reference(snapshot, col),
            ));
        }
        section.push('\n');

        section
    }

    fn key_marker(col: &ColumnDescriptor) -> &'static str {
        match (col.is_primary_key, col.is_foreign_key) {
            (true, true) => "PK, FK",
            (true, false) => "PK",
            (false, true) => "FK",
            (false, false) => "",
        }
    }

    /// 被引用的表在快照内时生成链接，否则（例如跨 schema 的外键）只输出文本
    fn reference(snapshot: &SchemaSnapshot, col: &ColumnDescriptor) -> String {
        let (Some(table), Some(column)) = (&col.foreign_table, &col.foreign_column) else {
            return String::new();
        };

        let target = format!("{}.{}", Self::escape(table), Self::escape(column));
        let documented = snapshot
            .table(table)
            .and_then(|t| t.column(column))
            .is_some();

        if documented {
            format!("[{}](#{})", target, Self::anchor(table))
        } else {
            target
        }
    }

    /// GitHub 风格的标题锚点
    fn anchor(name: &str) -> String {
        name.to_lowercase()
            .chars()
            .filter_map(|c| match c {
                ' ' => Some('-'),
                c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
                _ => None,
            })
            .collect()
    }

    /// 行内代码，围栏比内容里最长的反引号串多一个
    fn code_span(text: &str) -> String {
        let longest = text
            .split(|c| c != '`')
            .map(str::len)
            .max()
            .unwrap_or(0);
        let fence = "`".repeat(longest + 1);

        if text.starts_with('`') || text.ends_with('`') {
            format!("{} {} {}", fence, text, fence)
        } else {
            format!("{}{}{}", fence, text, fence)
        }
    }

    fn escape(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}
