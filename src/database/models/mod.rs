pub mod product;
pub mod user;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub use product::Product;
pub use user::User;

/// Remote asset reference: populated only after a successful upload to the
/// media host.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageRef {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "publicId")]
    pub public_id: String,
}
