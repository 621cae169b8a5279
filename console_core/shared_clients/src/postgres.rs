use crate::{ConnectionProbe, DatabaseAdapterError, DbConnectionDetails};
use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Config, Error, NoTls};

impl From<Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: Error) -> Self {
        if let Some(e) = err.as_db_error() {
            match e.code() {
                &SqlState::INVALID_PASSWORD | &SqlState::INVALID_AUTHORIZATION_SPECIFICATION => {
                    DatabaseAdapterError::authentication(e.to_string())
                }
                &SqlState::CONNECTION_DOES_NOT_EXIST
                | &SqlState::CONNECTION_FAILURE
                | &SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION => {
                    DatabaseAdapterError::invalid_connection(e.to_string())
                }
                &SqlState::INVALID_CATALOG_NAME => DatabaseAdapterError::config(e.to_string()),
                _ => DatabaseAdapterError::unexpected(e.to_string()),
            }
        } else {
            // refused sockets, DNS failures and TLS problems end up here
            DatabaseAdapterError::invalid_connection(err.to_string())
        }
    }
}

/// Open PostgreSQL session. The connection driver task is aborted when the
/// value is dropped, so every exit path releases the socket.
pub struct PostgresConnection {
    client: Client,
    driver: tokio::task::JoinHandle<()>,
}

impl PostgresConnection {
    /// Connect and spawn the connection driver in the background.
    pub async fn connect(details: &DbConnectionDetails) -> Result<Self, DatabaseAdapterError> {
        let mut config = Config::new();
        config
            .host(&details.host)
            .port(details.port)
            .dbname(&details.database)
            .user(&details.username)
            .password(&details.password);

        let (client, connection) = config.connect(NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("postgres driver task exited: {e}");
            }
        });

        Ok(Self { client, driver })
    }

    pub async fn ping(&self) -> Result<(), DatabaseAdapterError> {
        self.client.simple_query("SELECT 1").await?;
        Ok(())
    }
}

impl Drop for PostgresConnection {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[derive(Debug, Default, Clone)]
pub struct PostgresProbe;

#[async_trait]
impl ConnectionProbe<DbConnectionDetails> for PostgresProbe {
    async fn probe(&self, target: &DbConnectionDetails) -> Result<(), DatabaseAdapterError> {
        log::debug!(
            "probing postgres at {}:{}/{}",
            target.host,
            target.port,
            target.database
        );
        let conn = PostgresConnection::connect(target).await?;
        conn.ping().await
    }
}
