// src/store/mod.rs
//! Signal persistence: one connection per run, one transaction per signal.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::{debug, warn};

use crate::config::DbConfig;
use crate::error::PersistenceError;
use crate::signal::{Signal, SRID};

pub use memory::MemoryStore;

#[async_trait]
pub trait SignalStore: Send {
    /// Insert one signal atomically. Nothing is left behind on failure.
    async fn insert(&mut self, signal: &Signal) -> Result<(), PersistenceError>;
}

pub struct PgSignalStore {
    conn: PgConnection,
    insert_sql: String,
}

impl PgSignalStore {
    /// Open the single connection used for the whole run.
    ///
    /// `table` must already be validated as a plain identifier.
    pub async fn connect(
        cfg: &DbConfig,
        table: &str,
        statement_timeout: Duration,
    ) -> Result<Self, PersistenceError> {
        let opts = PgConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .database(&cfg.name)
            .username(&cfg.user)
            .password(&cfg.password)
            .application_name("vigimanaus-ingest")
            .options([(
                "statement_timeout",
                format!("{}ms", statement_timeout.as_millis()),
            )]);

        let conn = tokio::time::timeout(Duration::from_secs(15), PgConnection::connect_with(&opts))
            .await
            .map_err(|_| PersistenceError::Rejected("timed out connecting to database".into()))??;
        debug!(host = %cfg.host, port = cfg.port, db = %cfg.name, "database connected");

        Ok(Self {
            conn,
            insert_sql: insert_sql(table),
        })
    }

    /// Release the connection. Consumes the store so it cannot be used afterwards.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "error while closing database connection");
        }
    }
}

fn insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} \
            (titulo, descricao, status, nivel_risco, localizacao_bairro, geom, fonte_id) \
         VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($6, $7), {SRID}), $8)"
    )
}

#[async_trait]
impl SignalStore for PgSignalStore {
    async fn insert(&mut self, signal: &Signal) -> Result<(), PersistenceError> {
        let mut tx = self.conn.begin().await?;

        let res = sqlx::query(&self.insert_sql)
            .bind(&signal.title)
            .bind(&signal.description)
            .bind(signal.status.as_str())
            .bind(signal.risk.as_str())
            .bind(&signal.location)
            .bind(signal.point.lon)
            .bind(signal.point.lat)
            .bind(signal.source.as_i32())
            .execute(&mut *tx)
            .await;

        match res {
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(error = %rb, "rollback failed");
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sql_targets_configured_table_with_fixed_srid() {
        let sql = insert_sql("public.sinais_dois");
        assert!(sql.starts_with("INSERT INTO public.sinais_dois "));
        assert!(sql.contains("ST_SetSRID(ST_MakePoint($6, $7), 4326)"));
        assert!(sql.contains("fonte_id"));
        assert!(sql.ends_with("$8)"));
    }
}
