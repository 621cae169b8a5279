use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Describes one input of the node configuration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    /// Rendered masked on every interactive surface.
    pub sensitive: bool,
    pub multiline: bool,
}

impl FieldSpec {
    const fn text(key: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            key,
            label,
            placeholder,
            sensitive: false,
            multiline: false,
        }
    }

    const fn secret(key: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            key,
            label,
            placeholder,
            sensitive: true,
            multiline: false,
        }
    }
}

pub const MASK: &str = "••••••••";

const BIGQUERY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("projectId", "Project ID", "e.g. my-gcp-project"),
    FieldSpec::text("datasetId", "Dataset ID", "e.g. analytics_prod"),
    FieldSpec {
        key: "serviceAccountJson",
        label: "Service Account JSON",
        placeholder: "{ ... }",
        sensitive: true,
        multiline: true,
    },
];

const SQLSERVER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("host", "Host", "db.example.com"),
    FieldSpec::text("port", "Port", "1433"),
    FieldSpec::text("database", "Database Name", "OrdersDB"),
    FieldSpec::text("username", "Username", "sa"),
    FieldSpec::secret("password", "Password", MASK),
];

const POSTGRES_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("host", "Host", "db.example.com"),
    FieldSpec::text("port", "Port", "5432"),
    FieldSpec::text("database", "Database Name", "my_database"),
    FieldSpec::text("username", "Username", "postgres"),
    FieldSpec::secret("password", "Password", MASK),
];

/// Concrete system a SOURCE node represents, parsed from its free-form subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    BigQuery,
    SqlServer,
    Postgres,
    Kafka,
    Api,
    Other(String),
}

impl SourceKind {
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype.trim().to_ascii_lowercase().as_str() {
            "bigquery" => SourceKind::BigQuery,
            "sqlserver" => SourceKind::SqlServer,
            "postgres" => SourceKind::Postgres,
            "kafka" => SourceKind::Kafka,
            "api" => SourceKind::Api,
            _ => SourceKind::Other(subtype.to_string()),
        }
    }

    /// Form fields for this kind. Every listed field is required.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            SourceKind::BigQuery => BIGQUERY_FIELDS,
            SourceKind::SqlServer => SQLSERVER_FIELDS,
            SourceKind::Postgres => POSTGRES_FIELDS,
            SourceKind::Kafka | SourceKind::Api | SourceKind::Other(_) => &[],
        }
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.fields().iter().any(|f| f.key == key && f.sensitive)
    }

    /// Human label used when prefixing upstream messages.
    pub fn label(&self) -> &str {
        match self {
            SourceKind::BigQuery => "BigQuery",
            SourceKind::SqlServer => "SQL Server",
            SourceKind::Postgres => "PostgreSQL",
            SourceKind::Kafka => "Kafka",
            SourceKind::Api => "REST API",
            SourceKind::Other(name) => name.as_str(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::BigQuery => "bigquery",
            SourceKind::SqlServer => "sqlserver",
            SourceKind::Postgres => "postgres",
            SourceKind::Kafka => "kafka",
            SourceKind::Api => "api",
            SourceKind::Other(name) => name.as_str(),
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_tables_match_subtypes() {
        let keys = |kind: SourceKind| kind.fields().iter().map(|f| f.key).collect::<Vec<_>>();
        assert_eq!(
            keys(SourceKind::BigQuery),
            vec!["projectId", "datasetId", "serviceAccountJson"]
        );
        assert_eq!(
            keys(SourceKind::Postgres),
            vec!["host", "port", "database", "username", "password"]
        );
        assert!(SourceKind::Kafka.fields().is_empty());
        assert!(SourceKind::from_subtype("delta").fields().is_empty());
    }

    #[test]
    fn sensitive_fields() {
        assert!(SourceKind::BigQuery.is_sensitive("serviceAccountJson"));
        assert!(SourceKind::SqlServer.is_sensitive("password"));
        assert!(!SourceKind::SqlServer.is_sensitive("host"));
        assert!(!SourceKind::Api.is_sensitive("password"));
    }

    #[test]
    fn unknown_subtypes_keep_their_name() {
        let kind = SourceKind::from_subtype("snowflake");
        assert_eq!(kind, SourceKind::Other("snowflake".into()));
        assert_eq!(kind.label(), "snowflake");
        assert_eq!(SourceKind::from_subtype("Postgres"), SourceKind::Postgres);
    }
}
