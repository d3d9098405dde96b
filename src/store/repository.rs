//! Generic repository
//!
//! Per-entity-type access over the relational store. Every method accepts
//! an optional transactional session; when present all statements execute
//! inside that scope, otherwise the pool runs a single auto-managed
//! statement. Raw store errors are wrapped with the entity and operation
//! name, never swallowed.

use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::query::{Filter, Page, Value};
use super::{StoreError, StoreSession};

/// A persisted entity type the gateway knows how to read and write.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table name
    const TABLE: &'static str;

    /// Columns populated by `create`, in bind order
    const INSERT_COLUMNS: &'static [&'static str];

    /// Insert payload
    type New: Send + Sync;

    /// Bind one insert payload in `INSERT_COLUMNS` order
    fn bind_new(new: &Self::New, b: &mut Separated<'_, '_, Postgres, &'static str>);
}

/// Generic repository over one entity table.
#[derive(Debug, Clone)]
pub struct Repository<E> {
    pool: PgPool,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: std::marker::PhantomData,
        }
    }

    /// Insert one row and return it.
    pub async fn create(
        &self,
        new: &E::New,
        session: Option<&mut StoreSession>,
    ) -> Result<E, StoreError> {
        let mut qb = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            E::TABLE,
            E::INSERT_COLUMNS.join(", ")
        ));
        qb.push_values([new], |mut b, row| E::bind_new(row, &mut b));
        qb.push(" RETURNING *");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_one(s.conn()).await,
            None => query.fetch_one(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "create", e))
    }

    /// Insert many rows and return them.
    pub async fn create_many(
        &self,
        rows: &[E::New],
        session: Option<&mut StoreSession>,
    ) -> Result<Vec<E>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            E::TABLE,
            E::INSERT_COLUMNS.join(", ")
        ));
        qb.push_values(rows, |mut b, row| E::bind_new(row, &mut b));
        qb.push(" RETURNING *");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_all(s.conn()).await,
            None => query.fetch_all(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "create_many", e))
    }

    /// Fetch one row by primary key.
    pub async fn get_by_id(
        &self,
        id: Uuid,
        session: Option<&mut StoreSession>,
    ) -> Result<Option<E>, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {} WHERE id = ", E::TABLE));
        qb.push_bind(id);

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "get_by_id", e))
    }

    /// Fetch one row by primary key together with a related row joined in
    /// by foreign key (e.g. a user's wallet).
    pub async fn get_by_id_with<R: Entity>(
        &self,
        id: Uuid,
        foreign_key: &'static str,
        mut session: Option<&mut StoreSession>,
    ) -> Result<Option<(E, Option<R>)>, StoreError> {
        let Some(base) = self.get_by_id(id, session.as_deref_mut()).await? else {
            return Ok(None);
        };

        let mut qb = QueryBuilder::new(format!("SELECT * FROM {} WHERE ", R::TABLE));
        qb.push(foreign_key);
        qb.push(" = ");
        qb.push_bind(id);
        qb.push(" LIMIT 1");

        let query = qb.build_query_as::<R>();
        let related = match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(R::TABLE, "get_by_id_with", e))?;

        Ok(Some((base, related)))
    }

    /// Fetch the first row matching an equality filter.
    pub async fn get_one(
        &self,
        filter: &Filter,
        session: Option<&mut StoreSession>,
    ) -> Result<Option<E>, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", E::TABLE));
        push_filter(&mut qb, filter);
        qb.push(" LIMIT 1");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "get_one", e))
    }

    /// List rows matching a filter within a pagination window.
    pub async fn list(
        &self,
        filter: &Filter,
        page: &Page,
        session: Option<&mut StoreSession>,
    ) -> Result<Vec<E>, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", E::TABLE));
        let wrote = push_filter(&mut qb, filter);
        push_date_range(&mut qb, page, wrote);
        qb.push(format!(
            " ORDER BY {} {}",
            page.sort_column,
            page.sort_order.as_sql()
        ));
        qb.push(" LIMIT ");
        qb.push_bind(page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset);

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_all(s.conn()).await,
            None => query.fetch_all(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "list", e))
    }

    /// Update one row by primary key and return the new row.
    pub async fn update_by_id(
        &self,
        id: Uuid,
        changes: &[(&'static str, Value)],
        session: Option<&mut StoreSession>,
    ) -> Result<Option<E>, StoreError> {
        let mut qb = begin_update::<E>(changes);
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "update_by_id", e))
    }

    /// Update the first row matching a filter and return the new row.
    pub async fn update_one(
        &self,
        filter: &Filter,
        changes: &[(&'static str, Value)],
        session: Option<&mut StoreSession>,
    ) -> Result<Option<E>, StoreError> {
        let mut qb = begin_update::<E>(changes);
        push_single_row_scope::<E>(&mut qb, filter);
        qb.push(" RETURNING *");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "update_one", e))
    }

    /// Update every row matching a filter; returns the affected row count.
    pub async fn update_many(
        &self,
        filter: &Filter,
        changes: &[(&'static str, Value)],
        session: Option<&mut StoreSession>,
    ) -> Result<u64, StoreError> {
        let mut qb = begin_update::<E>(changes);
        push_filter(&mut qb, filter);

        let query = qb.build();
        let result = match session {
            Some(s) => query.execute(s.conn()).await,
            None => query.execute(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "update_many", e))?;

        Ok(result.rows_affected())
    }

    /// Delete one row by primary key and return it.
    pub async fn delete_by_id(
        &self,
        id: Uuid,
        session: Option<&mut StoreSession>,
    ) -> Result<Option<E>, StoreError> {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", E::TABLE));
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "delete_by_id", e))
    }

    /// Delete the first row matching a filter and return it.
    pub async fn delete_one(
        &self,
        filter: &Filter,
        session: Option<&mut StoreSession>,
    ) -> Result<Option<E>, StoreError> {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {}", E::TABLE));
        push_single_row_scope::<E>(&mut qb, filter);
        qb.push(" RETURNING *");

        let query = qb.build_query_as::<E>();
        match session {
            Some(s) => query.fetch_optional(s.conn()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "delete_one", e))
    }

    /// Delete every row matching a filter; returns the affected row count.
    pub async fn delete_many(
        &self,
        filter: &Filter,
        session: Option<&mut StoreSession>,
    ) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {}", E::TABLE));
        push_filter(&mut qb, filter);

        let query = qb.build();
        let result = match session {
            Some(s) => query.execute(s.conn()).await,
            None => query.execute(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "delete_many", e))?;

        Ok(result.rows_affected())
    }

    /// Count rows matching a filter.
    pub async fn count(
        &self,
        filter: &Filter,
        session: Option<&mut StoreSession>,
    ) -> Result<i64, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
        push_filter(&mut qb, filter);

        let query = qb.build_query_scalar::<i64>();
        match session {
            Some(s) => query.fetch_one(s.conn()).await,
            None => query.fetch_one(&self.pool).await,
        }
        .map_err(|e| StoreError::query(E::TABLE, "count", e))
    }

    /// Whether any row matches the filter.
    pub async fn exists(
        &self,
        filter: &Filter,
        session: Option<&mut StoreSession>,
    ) -> Result<bool, StoreError> {
        Ok(self.count(filter, session).await? > 0)
    }
}

/// Write the WHERE clause for an equality filter. Returns whether any
/// condition was written.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> bool {
    let mut wrote = false;
    for (column, value) in filter.terms() {
        qb.push(if wrote { " AND " } else { " WHERE " });
        qb.push(*column);
        qb.push(" = ");
        value.push_bind(qb);
        wrote = true;
    }
    wrote
}

/// Append the pagination window's creation-date range conditions.
fn push_date_range(qb: &mut QueryBuilder<'_, Postgres>, page: &Page, mut wrote: bool) {
    if let Some(from) = page.from {
        qb.push(if wrote { " AND " } else { " WHERE " });
        qb.push("created_at >= ");
        qb.push_bind(from);
        wrote = true;
    }
    if let Some(to) = page.to {
        qb.push(if wrote { " AND " } else { " WHERE " });
        qb.push("created_at <= ");
        qb.push_bind(to);
    }
}

/// Start an UPDATE statement with the change set; `updated_at` always moves.
fn begin_update<E: Entity>(changes: &[(&'static str, Value)]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET updated_at = now()", E::TABLE));
    for (column, value) in changes {
        qb.push(", ");
        qb.push(*column);
        qb.push(" = ");
        value.push_bind(&mut qb);
    }
    qb
}

/// Scope a mutation to the single first row matching the filter.
fn push_single_row_scope<E: Entity>(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    qb.push(format!(" WHERE id = (SELECT id FROM {}", E::TABLE));
    push_filter(qb, filter);
    qb.push(" LIMIT 1)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_push_filter_sql() {
        let mut qb = QueryBuilder::new("SELECT * FROM wallets");
        let filter = Filter::new().eq("user_id", Uuid::new_v4()).eq("currency", "NGN");
        let wrote = push_filter(&mut qb, &filter);

        assert!(wrote);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM wallets WHERE user_id = $1 AND currency = $2"
        );
    }

    #[test]
    fn test_push_filter_empty() {
        let mut qb = QueryBuilder::new("SELECT * FROM wallets");
        let wrote = push_filter(&mut qb, &Filter::new());

        assert!(!wrote);
        assert_eq!(qb.sql(), "SELECT * FROM wallets");
    }

    #[test]
    fn test_push_date_range_without_filter() {
        let mut qb = QueryBuilder::new("SELECT * FROM transactions");
        let page = Page {
            from: Some(Utc::now()),
            to: Some(Utc::now()),
            ..Page::default()
        };
        push_date_range(&mut qb, &page, false);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM transactions WHERE created_at >= $1 AND created_at <= $2"
        );
    }

    #[test]
    fn test_push_date_range_after_filter() {
        let mut qb = QueryBuilder::new("SELECT * FROM transactions");
        let filter = Filter::new().eq("user_id", Uuid::new_v4());
        let wrote = push_filter(&mut qb, &filter);
        let page = Page {
            from: Some(Utc::now()),
            ..Page::default()
        };
        push_date_range(&mut qb, &page, wrote);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM transactions WHERE user_id = $1 AND created_at >= $2"
        );
    }
}
