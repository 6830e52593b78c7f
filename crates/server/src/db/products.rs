//! Database operations for the product catalogue.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storechat_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    price: Option<Price>,
    in_stock: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            brand: row.brand,
            price: row.price,
            in_stock: row.in_stock,
            created_at: row.created_at,
        }
    }
}

/// Build an `ILIKE` pattern matching `query` anywhere, with wildcards escaped.
#[must_use]
pub fn ilike_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, category, brand, price, in_stock, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List a page of products in insertion order, in stock or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, category, brand, price, in_stock, created_at
            FROM products
            ORDER BY created_at ASC, name ASC, id ASC
            OFFSET $1
            LIMIT $2
            ",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Search in-stock products by case-insensitive substring.
    ///
    /// Matches against name, description, category and brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, category, brand, price, in_stock, created_at
            FROM products
            WHERE in_stock = TRUE
              AND (name ILIKE $1
                   OR description ILIKE $1
                   OR category ILIKE $1
                   OR brand ILIKE $1)
            ORDER BY name ASC
            ",
        )
        .bind(ilike_pattern(query))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, description, category, brand, price, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, category, brand, price, in_stock, created_at
            ",
        )
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.category.as_deref())
        .bind(product.brand.as_deref())
        .bind(product.price)
        .bind(product.in_stock)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ilike_pattern_wraps_query() {
        assert_eq!(ilike_pattern("shoe"), "%shoe%");
    }

    #[test]
    fn test_ilike_pattern_escapes_wildcards() {
        assert_eq!(ilike_pattern("100%"), "%100\\%%");
        assert_eq!(ilike_pattern("a_b"), "%a\\_b%");
        assert_eq!(ilike_pattern("c:\\"), "%c:\\\\%");
    }
}
