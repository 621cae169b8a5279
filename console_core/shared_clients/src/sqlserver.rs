use crate::{ConnectionProbe, DatabaseAdapterError, DbConnectionDetails};
use async_trait::async_trait;
use common::error::DiagnosticMessage;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

impl From<tiberius::error::Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: tiberius::error::Error) -> Self {
        use tiberius::error::Error as TdsError;
        match err {
            TdsError::Io { kind, message } => DatabaseAdapterError::IoError {
                context: DiagnosticMessage::new(message.clone()),
                source: std::io::Error::new(kind, message),
            },
            TdsError::Server(token) if token.code() == 18456 => {
                // 18456: login failed for user
                DatabaseAdapterError::authentication(token.message().to_string())
            }
            TdsError::Server(token) => {
                DatabaseAdapterError::invalid_connection(token.message().to_string())
            }
            TdsError::Routing { host, port } => DatabaseAdapterError::invalid_connection(format!(
                "server requested a redirect to {host}:{port}"
            )),
            other => DatabaseAdapterError::unexpected(other.to_string()),
        }
    }
}

/// Open TDS session against SQL Server.
pub struct SqlServerConnection {
    client: Client<Compat<TcpStream>>,
}

impl SqlServerConnection {
    pub async fn connect(details: &DbConnectionDetails) -> Result<Self, DatabaseAdapterError> {
        let mut config = Config::new();
        config.host(&details.host);
        config.port(details.port);
        config.database(&details.database);
        config.authentication(AuthMethod::sql_server(&details.username, &details.password));
        config.trust_cert();

        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        Ok(Self { client })
    }

    pub async fn ping(&mut self) -> Result<(), DatabaseAdapterError> {
        self.client.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    /// Sends the logout and shuts the socket down.
    pub async fn close(self) -> Result<(), DatabaseAdapterError> {
        self.client.close().await?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct SqlServerProbe;

#[async_trait]
impl ConnectionProbe<DbConnectionDetails> for SqlServerProbe {
    async fn probe(&self, target: &DbConnectionDetails) -> Result<(), DatabaseAdapterError> {
        log::debug!(
            "probing sql server at {}:{}/{}",
            target.host,
            target.port,
            target.database
        );
        let mut conn = SqlServerConnection::connect(target).await?;
        let checked = conn.ping().await;
        let closed = conn.close().await;
        checked?;
        closed
    }
}
