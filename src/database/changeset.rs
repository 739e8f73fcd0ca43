use sqlx::{Encode, QueryBuilder, Sqlite, SqlitePool, Type};

use super::manager::DatabaseError;

/// Builds `UPDATE <table> SET ... WHERE <key> = ?` from only the fields a
/// patch actually carries. Values are always bound, never interpolated.
pub struct Changeset<'a> {
    builder: QueryBuilder<'a, Sqlite>,
    fields: Vec<&'static str>,
}

impl<'a> Changeset<'a> {
    pub fn new(table: &'static str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {} SET ", table)),
            fields: Vec::new(),
        }
    }

    pub fn set<T>(&mut self, column: &'static str, value: T) -> &mut Self
    where
        T: 'a + Encode<'a, Sqlite> + Type<Sqlite> + Send,
    {
        if !self.fields.is_empty() {
            self.builder.push(", ");
        }
        self.builder.push(column).push(" = ").push_bind(value);
        self.fields.push(column);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Stamps `updated_at` and runs the statement, returning the affected row count.
    pub async fn execute(
        mut self,
        pool: &SqlitePool,
        key_column: &'static str,
        key: String,
        updated_at: String,
    ) -> Result<u64, sqlx::Error> {
        if !self.fields.is_empty() {
            self.builder.push(", ");
        }
        self.builder
            .push("updated_at = ")
            .push_bind(updated_at)
            .push(" WHERE ")
            .push(key_column)
            .push(" = ")
            .push_bind(key);

        let result = self.builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    #[cfg(test)]
    fn sql(&self) -> &str {
        self.builder.sql()
    }
}

/// Maps a zero-row update to `NotFound`.
pub fn ensure_updated(rows: u64, what: &str) -> Result<(), DatabaseError> {
    if rows == 0 {
        Err(DatabaseError::NotFound(format!("{} not found", what)))
    } else {
        Ok(())
    }
}
