use sqlx::PgPool;
use uuid::Uuid;

use super::models::{ImageRef, Product};

const PRODUCT_COLUMNS: &str = "id, product_name, price, description, image_url, public_id, \
     owner_id, created_at, updated_at";

pub struct NewProduct {
    pub product_name: String,
    pub price: f64,
    pub description: String,
    pub product_image: ImageRef,
    pub owner_id: Option<Uuid>,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_name(pool: &PgPool, product_name: &str) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_name = $1"
    ))
    .bind(product_name)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_description(
    pool: &PgPool,
    description: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE description = $1"
    ))
    .bind(description)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, new_product: NewProduct) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (product_name, price, description, image_url, public_id, owner_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(new_product.product_name)
    .bind(new_product.price)
    .bind(new_product.description)
    .bind(new_product.product_image.image_url)
    .bind(new_product.product_image.public_id)
    .bind(new_product.owner_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    product_name: &str,
    price: f64,
    description: &str,
    product_image: &ImageRef,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products \
         SET product_name = $1, price = $2, description = $3, image_url = $4, public_id = $5, \
             updated_at = now() \
         WHERE id = $6 \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(product_name)
    .bind(price)
    .bind(description)
    .bind(&product_image.image_url)
    .bind(&product_image.public_id)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Returns true when a row was actually deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
