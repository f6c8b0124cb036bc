use axum::extract::{Extension, Multipart, Path, State};
use uuid::Uuid;

use crate::database::models::{ImageRef, Product};
use crate::database::{products, users};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;
use crate::upload;

/// POST /products/create (protected, multipart)
///
/// Ordering matters: the owner and the name conflict are resolved before
/// anything is sent to the media host, so a rejected request uploads and
/// persists nothing. The staged file is cleaned up on every path by its guard.
pub async fn create(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Product> {
    let mut form = upload::read_form(multipart, "productImage", &state.config.upload).await?;

    let product_name = required(form.field("productName"), "productName is required")?;
    let price = parse_price(form.field("price"))?;
    let description = required(form.field("description"), "description is required")?;

    // Owner defaults to the authenticated caller unless an explicit id is given
    let owner_id = match form.field("userId") {
        Some(raw) => Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::bad_request("Invalid user id"))?,
        None => current_user.user_id,
    };
    let owner = users::find_by_id(&state.pool, owner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cannot create product for an unknown user"))?;

    if products::find_by_name(&state.pool, &product_name).await?.is_some() {
        return Err(ApiError::conflict("Product already exists"));
    }
    if state.config.catalog.enforce_unique_description
        && products::find_by_description(&state.pool, &description)
            .await?
            .is_some()
    {
        return Err(ApiError::conflict("Product description already in use"));
    }

    let staged = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("Product image is required"))?;

    let asset = state.media.upload(staged.path()).await?;
    staged.remove();

    let new_product = products::NewProduct {
        product_name,
        price,
        description,
        product_image: ImageRef {
            image_url: asset.url.clone(),
            public_id: asset.asset_id.clone(),
        },
        owner_id: Some(owner.id),
    };

    match products::insert(&state.pool, new_product).await {
        Ok(product) => Ok(ApiResponse::created("Product created successfully", product)),
        Err(e) => {
            // The row never landed; drop the asset we just uploaded
            if let Err(destroy_err) = state.media.destroy(&asset.asset_id).await {
                tracing::warn!(
                    "failed to destroy orphaned asset {}: {}",
                    asset.asset_id,
                    destroy_err
                );
            }
            Err(e.into())
        }
    }
}

/// GET /get-all
pub async fn get_all(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let all = products::list(&state.pool).await?;
    Ok(ApiResponse::success("All products", all))
}

/// GET /get-one/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Product> {
    let product = products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(ApiResponse::success("Product", product))
}

/// PUT /update/:id (multipart, every field optional)
///
/// Scalars are "value if provided, else keep existing"; the image reference is
/// preserved when no new file arrives. A new file is uploaded first, the row
/// is updated, and only then is the replaced asset destroyed - if the row
/// update fails, the freshly uploaded asset is destroyed instead and the
/// record keeps pointing at the old one.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Product> {
    let mut form = upload::read_form(multipart, "productImage", &state.config.upload).await?;

    let product = products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let product_name = form
        .field("productName")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| product.product_name.clone());
    let price = match form.field("price") {
        Some(raw) => parse_price(Some(raw))?,
        None => product.price,
    };
    let description = form
        .field("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| product.description.clone());

    match form.file.take() {
        Some(staged) => {
            let new_asset = state.media.upload(staged.path()).await?;
            staged.remove();

            let new_image = ImageRef {
                image_url: new_asset.url.clone(),
                public_id: new_asset.asset_id.clone(),
            };

            match products::update(&state.pool, product.id, &product_name, price, &description, &new_image)
                .await
            {
                Ok(updated) => {
                    // Row now points at the new asset; the old one is unreferenced
                    if let Err(e) = state.media.destroy(&product.product_image.public_id).await {
                        tracing::warn!(
                            "failed to destroy replaced asset {}: {}",
                            product.product_image.public_id,
                            e
                        );
                    }
                    Ok(ApiResponse::success("Product updated successfully", updated))
                }
                Err(e) => {
                    if let Err(destroy_err) = state.media.destroy(&new_asset.asset_id).await {
                        tracing::warn!(
                            "failed to destroy orphaned asset {}: {}",
                            new_asset.asset_id,
                            destroy_err
                        );
                    }
                    Err(e.into())
                }
            }
        }
        None => {
            let updated = products::update(
                &state.pool,
                product.id,
                &product_name,
                price,
                &description,
                &product.product_image,
            )
            .await?;
            Ok(ApiResponse::success("Product updated successfully", updated))
        }
    }
}

/// DELETE /delete/:id
///
/// The remote asset is destroyed only after the row is gone. A destroy failure
/// is logged, not surfaced: the record no longer exists, which is what the
/// caller asked for.
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    let product = products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let deleted = products::delete(&state.pool, product.id).await?;
    if deleted {
        if let Err(e) = state.media.destroy(&product.product_image.public_id).await {
            tracing::warn!(
                "failed to destroy asset {} for deleted product: {}",
                product.product_image.public_id,
                e
            );
        }
    }

    Ok(ApiResponse::message("Product deleted successfully"))
}

fn required(value: Option<&str>, message: &str) -> Result<String, ApiError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(message))
}

fn parse_price(raw: Option<&str>) -> Result<f64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("price is required"))?;
    let price: f64 = raw
        .parse()
        .map_err(|_| ApiError::bad_request("price must be a number"))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("price must be a non-negative number"));
    }
    Ok(price)
}
