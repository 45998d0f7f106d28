use store::{NewProduct, ProductChanges, ProductRecord, ProductStore};

use crate::error::{CatalogError, Result};

/// Service for managing catalog products.
pub struct ProductService<S: ProductStore> {
    store: S,
}

impl<S: ProductStore> ProductService<S> {
    /// Creates a new product service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a product after validating the required fields.
    #[tracing::instrument(skip(self, input))]
    pub async fn add_product(&self, input: NewProduct) -> Result<ProductRecord> {
        if input.name.trim().is_empty() || input.seller_id.trim().is_empty() {
            return Err(CatalogError::Validation(
                "Missing required fields (name, price, seller_id)".to_string(),
            ));
        }
        if input.price <= 0.0 {
            return Err(CatalogError::Validation(
                "Price must be a positive number".to_string(),
            ));
        }

        Ok(self.store.insert_product(input).await?)
    }

    /// All products, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<ProductRecord>> {
        Ok(self.store.all_products().await?)
    }

    /// Products owned by a seller, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn seller_products(&self, seller_id: &str) -> Result<Vec<ProductRecord>> {
        Ok(self.store.products_by_seller(seller_id).await?)
    }

    /// Products whose name or category matches the query, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>> {
        Ok(self.store.search_products(query).await?)
    }

    /// Applies a partial update, scoped to the owning seller.
    ///
    /// A non-owner write affects zero rows and surfaces as not-found, never
    /// as success.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        id: &str,
        seller_id: &str,
        changes: ProductChanges,
    ) -> Result<ProductRecord> {
        self.store
            .update_product(id, seller_id, changes)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    /// Deletes a product, scoped to the owning seller.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: &str, seller_id: &str) -> Result<()> {
        if self.store.delete_product(id, seller_id).await? {
            Ok(())
        } else {
            Err(CatalogError::ProductNotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    fn new_product(name: &str, price: f64, seller_id: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price,
            category: "grains".to_string(),
            stock_quantity: 10,
            image_url: None,
            seller_id: seller_id.to_string(),
        }
    }

    #[tokio::test]
    async fn add_product_rejects_missing_fields() {
        let service = ProductService::new(InMemoryStore::new());

        let missing_name = service.add_product(new_product("", 10.0, "seller-1")).await;
        assert!(matches!(missing_name, Err(CatalogError::Validation(_))));

        let missing_seller = service.add_product(new_product("Rice", 10.0, " ")).await;
        assert!(matches!(missing_seller, Err(CatalogError::Validation(_))));

        let free_product = service.add_product(new_product("Rice", 0.0, "seller-1")).await;
        assert!(matches!(free_product, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn add_and_list_products() {
        let service = ProductService::new(InMemoryStore::new());

        let added = service
            .add_product(new_product("Rice", 80.0, "seller-1"))
            .await
            .unwrap();
        assert_eq!(added.name, "Rice");

        let all = service.all_products().await.unwrap();
        assert_eq!(all.len(), 1);

        let for_seller = service.seller_products("seller-1").await.unwrap();
        assert_eq!(for_seller.len(), 1);

        let for_other = service.seller_products("seller-2").await.unwrap();
        assert!(for_other.is_empty());
    }

    #[tokio::test]
    async fn non_owner_update_surfaces_as_not_found() {
        let service = ProductService::new(InMemoryStore::new());
        let added = service
            .add_product(new_product("Rice", 80.0, "seller-1"))
            .await
            .unwrap();

        let changes = ProductChanges {
            price: Some(90.0),
            ..Default::default()
        };
        let denied = service
            .update_product(&added.id, "seller-2", changes)
            .await;
        assert!(matches!(denied, Err(CatalogError::ProductNotFound(_))));

        // The row is untouched.
        let products = service.seller_products("seller-1").await.unwrap();
        assert_eq!(products[0].price, 80.0);
    }

    #[tokio::test]
    async fn non_owner_delete_surfaces_as_not_found() {
        let service = ProductService::new(InMemoryStore::new());
        let added = service
            .add_product(new_product("Rice", 80.0, "seller-1"))
            .await
            .unwrap();

        let denied = service.delete_product(&added.id, "seller-2").await;
        assert!(matches!(denied, Err(CatalogError::ProductNotFound(_))));

        service.delete_product(&added.id, "seller-1").await.unwrap();
        assert!(service.all_products().await.unwrap().is_empty());
    }
}
