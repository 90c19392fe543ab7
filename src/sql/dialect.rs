//! SQL dialect selection and detection.

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Dialect {
    /// Detect from the dump content
    #[default]
    Auto,
    /// Standard SQL
    Generic,
    /// PostgreSQL
    #[value(alias = "postgresql")]
    Postgres,
    /// MySQL / MariaDB
    #[value(alias = "mariadb")]
    Mysql,
}

// Markers are matched against the lowercased dump.
const POSTGRES_MARKERS: &[&str] = &[
    "postgresql database dump",
    "pg_dump",
    "set search_path",
    "::regclass",
    "timestamptz",
    "bigserial",
    "serial",
    "jsonb",
];

const MYSQL_MARKERS: &[&str] = &[
    "mysql dump",
    "mysqldump",
    "mariadb dump",
    "engine=",
    "auto_increment",
    "unsigned",
    "tinyint",
];

impl Dialect {
    /// Guess the dialect from dump content.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();

        // Dump headers outrank type keywords, hence two passes.
        let headers = [
            (Self::Postgres, &POSTGRES_MARKERS[..3]),
            (Self::Mysql, &MYSQL_MARKERS[..3]),
            (Self::Postgres, &POSTGRES_MARKERS[3..]),
            (Self::Mysql, &MYSQL_MARKERS[3..]),
        ];
        headers
            .into_iter()
            .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
            .map(|(dialect, _)| dialect)
            .unwrap_or(Self::Generic)
    }

    /// Resolve `Auto` to a concrete dialect.
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_postgres() {
        let sql = "-- PostgreSQL database dump\nCREATE TABLE users (id integer);";
        assert_eq!(Dialect::detect(sql), Dialect::Postgres);
    }

    #[test]
    fn test_detect_mysql() {
        let sql = "CREATE TABLE users (id INT AUTO_INCREMENT) ENGINE=InnoDB;";
        assert_eq!(Dialect::detect(sql), Dialect::Mysql);
    }

    #[test]
    fn test_header_wins_over_types() {
        let sql = "-- MySQL dump 10.13\nCREATE TABLE t (id SERIAL);";
        assert_eq!(Dialect::detect(sql), Dialect::Mysql);
    }

    #[test]
    fn test_detect_generic() {
        let sql = "CREATE TABLE users (id INTEGER PRIMARY KEY);";
        assert_eq!(Dialect::detect(sql), Dialect::Generic);
    }

    #[test]
    fn test_resolve_keeps_explicit() {
        assert_eq!(Dialect::Mysql.resolve("pg_dump"), Dialect::Mysql);
        assert_eq!(Dialect::Auto.resolve("pg_dump"), Dialect::Postgres);
    }
}
