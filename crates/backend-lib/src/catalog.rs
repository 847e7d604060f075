// ============================
// crates/backend-lib/src/catalog.rs
// ============================
//! Product catalog.
use ::metrics::counter;
use marketplace_common::{DocId, Product, ProductInput};
use tracing::{info, warn};

use crate::error::AppError;
use crate::metrics;
use crate::storage::{to_record, DocumentStore, Filter};
use crate::validation::validate_product;

pub const PRODUCTS: &str = "products";

#[derive(Debug, Clone)]
pub struct ProductCatalog<S> {
    store: S,
}

fn not_found() -> AppError {
    AppError::NotFound("Product".to_string())
}

impl<S: DocumentStore> ProductCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Add a product offered by `supplier_id`; any `supplier_id` in the
    /// input is overwritten
    pub async fn create(
        &self,
        supplier_id: DocId,
        mut input: ProductInput,
    ) -> Result<Product, AppError> {
        input.supplier_id = supplier_id;
        validate_product(&input)?;
        let id = self.store.insert(PRODUCTS, to_record(&input)?).await?;

        counter!(metrics::PRODUCT_CREATED).increment(1);
        info!(id, supplier_id, "product created");
        Ok(Product { id, fields: input })
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        self.store
            .all(PRODUCTS)
            .await?
            .into_iter()
            .map(|doc| doc.into_typed_with_id())
            .collect()
    }

    /// Products offered by one supplier
    pub async fn list_by_supplier(&self, supplier_id: DocId) -> Result<Vec<Product>, AppError> {
        self.store
            .find_all(PRODUCTS, &Filter::eq("supplier_id", supplier_id))
            .await?
            .into_iter()
            .map(|doc| doc.into_typed_with_id())
            .collect()
    }

    pub async fn get(&self, id: DocId) -> Result<Product, AppError> {
        self.store
            .get(PRODUCTS, id)
            .await?
            .ok_or_else(not_found)?
            .into_typed_with_id()
    }

    /// Replace every field of a product owned by `supplier_id`. The owner
    /// itself never changes.
    pub async fn replace(
        &self,
        supplier_id: DocId,
        id: DocId,
        mut input: ProductInput,
    ) -> Result<Product, AppError> {
        input.supplier_id = supplier_id;
        validate_product(&input)?;
        self.owned(supplier_id, id).await?;

        if !self.store.replace(PRODUCTS, id, to_record(&input)?).await? {
            return Err(not_found());
        }
        info!(id, supplier_id, "product replaced");
        Ok(Product { id, fields: input })
    }

    pub async fn delete(&self, supplier_id: DocId, id: DocId) -> Result<(), AppError> {
        self.owned(supplier_id, id).await?;
        if self.store.remove(PRODUCTS, &Filter::id(id)).await? == 0 {
            return Err(not_found());
        }
        info!(id, supplier_id, "product deleted");
        Ok(())
    }

    async fn owned(&self, supplier_id: DocId, id: DocId) -> Result<Product, AppError> {
        let product = self.get(id).await?;
        if product.fields.supplier_id != supplier_id {
            warn!(
                id,
                supplier_id,
                owner = product.fields.supplier_id,
                "product belongs to another supplier"
            );
            return Err(AppError::Forbidden);
        }
        Ok(product)
    }
}
