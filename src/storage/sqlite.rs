//! SQLite-backed products table.

use super::ProductStore;
use crate::error::Result;
use crate::product::Product;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Default ceiling on bound parameters per statement in SQLite >= 3.32.
const MAX_BOUND_PARAMS: usize = 32_766;

/// Bound parameters per inserted row.
const COLUMNS_PER_ROW: usize = 6;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS products (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        item_ref    TEXT    NOT NULL UNIQUE,
        title       TEXT    NOT NULL,
        description TEXT    NOT NULL,
        price       INTEGER NOT NULL,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL
    );
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a products table in the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.as_ref().display(), journal_mode = %mode, "Opened SQLite products table");
        Self::with_connection(conn)
    }

    /// Products table in a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Largest number of rows one INSERT statement can bind.
    pub fn max_rows_per_statement() -> usize {
        MAX_BOUND_PARAMS / COLUMNS_PER_ROW
    }

    fn upsert_sql(rows: usize) -> String {
        let mut sql = String::from(
            "INSERT INTO products (item_ref, title, description, price, created_at, updated_at) VALUES ",
        );
        for i in 0..rows {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str("(?,?,?,?,?,?)");
        }
        sql.push_str(
            " ON CONFLICT(item_ref) DO UPDATE SET \
             title = excluded.title, \
             description = excluded.description, \
             price = excluded.price, \
             updated_at = excluded.updated_at",
        );
        sql
    }

    fn upsert_statement(conn: &Connection, products: &[Product], now: i64) -> Result<()> {
        let sql = Self::upsert_sql(products.len());
        let mut stmt = conn.prepare_cached(&sql)?;

        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(products.len() * COLUMNS_PER_ROW);
        for product in products {
            values.push(&product.item_ref);
            values.push(&product.title);
            values.push(&product.description);
            values.push(&product.price);
            values.push(&now);
            values.push(&now);
        }
        stmt.execute(params_from_iter(values))?;
        Ok(())
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

impl ProductStore for SqliteStore {
    fn truncate(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM products;
             DELETE FROM sqlite_sequence WHERE name = 'products';",
        )?;
        Ok(())
    }

    fn find_or_create_and_update(&mut self, product: &Product) -> Result<()> {
        let existing = self
            .conn
            .prepare_cached(
                "SELECT item_ref, title, description, price FROM products WHERE item_ref = ?1 LIMIT 1",
            )?
            .query_row(params![product.item_ref], |row| {
                Ok(Product {
                    item_ref: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    price: row.get(3)?,
                })
            })
            .optional()?;

        let now = unix_now();
        match existing {
            None => {
                self.conn
                    .prepare_cached(
                        "INSERT INTO products (item_ref, title, description, price, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    )?
                    .execute(params![
                        product.item_ref,
                        product.title,
                        product.description,
                        product.price,
                        now
                    ])?;
            }
            Some(row) if row.differs_from(product) => {
                self.conn
                    .prepare_cached(
                        "UPDATE products SET title = ?1, description = ?2, price = ?3, updated_at = ?4
                         WHERE item_ref = ?5",
                    )?
                    .execute(params![
                        product.title,
                        product.description,
                        product.price,
                        now,
                        product.item_ref
                    ])?;
            }
            // Clean row, nothing to save.
            Some(_) => {}
        }
        Ok(())
    }

    fn bulk_upsert(&mut self, products: &[Product]) -> Result<()> {
        if products.is_empty() {
            return Ok(());
        }

        let now = unix_now();
        let max_rows = Self::max_rows_per_statement();
        if products.len() <= max_rows {
            return Self::upsert_statement(&self.conn, products, now);
        }

        let tx = self.conn.transaction()?;
        for part in products.chunks(max_rows) {
            Self::upsert_statement(&tx, part, now)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get(&self, item_ref: &str) -> Result<Option<Product>> {
        let product = self
            .conn
            .prepare_cached(
                "SELECT item_ref, title, description, price FROM products WHERE item_ref = ?1",
            )?
            .query_row(params![item_ref], |row| {
                Ok(Product {
                    item_ref: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    price: row.get(3)?,
                })
            })
            .optional()?;
        Ok(product)
    }
}
