use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use crate::application::ports::{HistoryStore, RepositoryError};
use crate::domain::{ConversationId, Message, MessageRole, StoredTurn};

const MAX_IDENTIFIER_LEN: usize = 63;

/// PostgreSQL-backed conversation history.
pub struct PgHistoryStore {
    pool: PgPool,
    table_name: String,
}

impl PgHistoryStore {
    pub const DEFAULT_TABLE: &'static str = "conversation_turns";

    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_name: Self::DEFAULT_TABLE.to_string(),
        }
    }

    /// Uses `table_name` instead of the default table. The name is spliced
    /// into SQL, so only plain identifiers are accepted.
    pub fn with_table(pool: PgPool, table_name: impl Into<String>) -> Result<Self, RepositoryError> {
        let table_name = table_name.into();
        validate_identifier(&table_name)?;
        Ok(Self { pool, table_name })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                conversation_id BIGINT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            table = self.table_name
        );
        let create_index = format!(
            r#"
            CREATE INDEX IF NOT EXISTS {table}_recent_idx
            ON {table} (conversation_id, created_at DESC, seq DESC)
            "#,
            table = self.table_name
        );

        for statement in [create_table, create_index] {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        }

        tracing::info!("History schema ready");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    #[instrument(skip(self), fields(conversation_id = %conversation_id, limit = %limit))]
    async fn fetch_recent(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT role, content
            FROM {}
            WHERE conversation_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            "#,
            self.table_name
        );
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(&sql)
            .bind(conversation_id.as_i64())
            .bind(limit_i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let role: String = row
                    .try_get("role")
                    .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
                let content: String = row
                    .try_get("content")
                    .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
                let role = role
                    .parse::<MessageRole>()
                    .map_err(RepositoryError::InvalidData)?;

                Ok(Message::new(role, content))
            })
            .collect()
    }

    #[instrument(skip(self, messages), fields(conversation_id = %conversation_id, count = messages.len()))]
    async fn append_batch(
        &self,
        conversation_id: ConversationId,
        messages: &[Message],
    ) -> Result<(), RepositoryError> {
        if messages.is_empty() {
            return Ok(());
        }
        if let Some(index) = messages.iter().position(|m| !m.is_persistable()) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "message {} in batch has empty content",
                index
            )));
        }

        let turns: Vec<StoredTurn> = messages
            .iter()
            .cloned()
            .map(|message| StoredTurn::new(conversation_id, message))
            .collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} (id, conversation_id, role, content, created_at) ",
            self.table_name
        ));
        builder.push_values(&turns, |mut row, turn| {
            row.push_bind(turn.id.as_uuid())
                .push_bind(turn.conversation_id.as_i64())
                .push_bind(turn.message.role().as_str())
                .push_bind(turn.message.content().to_string())
                .push_bind(turn.created_at);
        });

        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}

fn validate_identifier(name: &str) -> Result<(), RepositoryError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(RepositoryError::ConstraintViolation(format!(
            "invalid table name: {}",
            name
        )))
    }
}

