//! Mapping of SQL type names onto column types.

use super::Dialect;
use crate::schema::ColumnType;

// Trailing words that qualify a type without changing its kind.
const QUALIFIERS: &[&str] = &[" unsigned", " signed", " zerofill", " character set", " charset"];

/// Map a raw SQL type such as `VARCHAR(255)` to a column type and limit.
pub fn map_type(sql_type: &str, dialect: Dialect) -> (ColumnType, Option<u32>) {
    let lower = sql_type.to_lowercase();
    let (base, args) = match lower.split_once('(') {
        Some((base, rest)) => (base, rest.split(')').next()),
        None => (lower.as_str(), None),
    };
    let base = QUALIFIERS
        .iter()
        .filter_map(|q| base.find(q))
        .min()
        .map_or(base, |cut| &base[..cut])
        .trim();

    let ty = match dialect {
        Dialect::Postgres => map_postgres(base),
        Dialect::Mysql => map_mysql(base, args),
        _ => None,
    }
    .or_else(|| map_common(base))
    .unwrap_or_else(|| ColumnType::Other(base.to_string()));

    let limit = match ty {
        ColumnType::String | ColumnType::Binary => args.and_then(|a| a.trim().parse().ok()),
        _ => None,
    };

    (ty, limit)
}

fn map_postgres(base: &str) -> Option<ColumnType> {
    let ty = match base {
        "serial" | "serial4" | "smallserial" | "serial2" | "int4" | "int2" => ColumnType::Integer,
        "bigserial" | "serial8" | "int8" => ColumnType::BigInt,
        "float4" | "float8" => ColumnType::Float,
        "money" => ColumnType::Decimal,
        "bytea" => ColumnType::Binary,
        "jsonb" => ColumnType::Json,
        "citext" => ColumnType::Text,
        "timestamptz" => ColumnType::DateTime,
        "timetz" => ColumnType::Time,
        _ => return None,
    };
    Some(ty)
}

fn map_mysql(base: &str, args: Option<&str>) -> Option<ColumnType> {
    let ty = match base {
        // TINYINT(1) is MySQL's boolean.
        "tinyint" if args == Some("1") => ColumnType::Boolean,
        "tinyint" | "mediumint" | "year" => ColumnType::Integer,
        "longtext" | "mediumtext" | "tinytext" => ColumnType::Text,
        "blob" | "longblob" | "mediumblob" | "tinyblob" | "varbinary" => ColumnType::Binary,
        "datetime" => ColumnType::DateTime,
        _ => return None,
    };
    Some(ty)
}

fn map_common(base: &str) -> Option<ColumnType> {
    let ty = match base {
        "int" | "integer" | "smallint" => ColumnType::Integer,
        "bigint" => ColumnType::BigInt,
        "real" | "float" | "double" | "double precision" => ColumnType::Float,
        "decimal" | "numeric" => ColumnType::Decimal,
        "varchar" | "character varying" | "char" | "character" | "nvarchar" | "nchar" => {
            ColumnType::String
        }
        "text" | "clob" => ColumnType::Text,
        "boolean" | "bool" => ColumnType::Boolean,
        "date" => ColumnType::Date,
        "time" | "time without time zone" | "time with time zone" => ColumnType::Time,
        "timestamp"
        | "datetime"
        | "timestamp without time zone"
        | "timestamp with time zone" => ColumnType::DateTime,
        "binary" | "blob" => ColumnType::Binary,
        "json" => ColumnType::Json,
        "uuid" => ColumnType::Uuid,
        _ => return None,
    };
    Some(ty)
}
