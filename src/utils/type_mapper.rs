use crate::models::ColumnDescriptor;

/// information_schema 类型名到简短展示类型的映射
pub struct TypeMapper;

impl TypeMapper {
    /// 紧凑的类型写法，带长度或精度，例如 `varchar(255)`、`numeric(10,2)`
    pub fn display_type(column: &ColumnDescriptor) -> String {
        let data_type = column.data_type.to_lowercase();
        let base = Self::short_name(&data_type);

        match base {
            "varchar" | "char" | "bit" | "varbit" => match column.max_length {
                Some(len) => format!("{}({})", base, len),
                None => base.to_string(),
            },
            "numeric" => match (column.precision, column.scale) {
                (Some(p), Some(s)) if s > 0 => format!("numeric({},{})", p, s),
                (Some(p), _) => format!("numeric({})", p),
                _ => base.to_string(),
            },
            _ => base.to_string(),
        }
    }

    /// 适用于 ER 图的单个标识符
    pub fn diagram_type(column: &ColumnDescriptor) -> String {
        let data_type = column.data_type.to_lowercase();
        Self::short_name(&data_type)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn short_name(data_type: &str) -> &str {
        match data_type {
            // 字符串类型
            "character varying" => "varchar",
            "character" => "char",
            "bit varying" => "varbit",

            // 日期时间类型
            "timestamp without time zone" => "timestamp",
            "timestamp with time zone" => "timestamptz",
            "time without time zone" => "time",
            "time with time zone" => "timetz",

            // 数值类型
            "double precision" => "float8",
            "real" => "float4",
            "decimal" => "numeric",

            // 其他类型
            "user-defined" => "enum",
            "array" => "array",

            other => other,
        }
    }
}
