use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, UpdateProduct};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and assign its id
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// All products, most expensive first
    async fn list(&self) -> ProductResult<Vec<Product>>;

    /// Overwrite every field of an existing product
    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i32) -> ProductResult<bool>;

    /// Whether another product already uses `title`
    async fn exists_by_title(&self, title: &str, exclude_id: Option<i32>) -> ProductResult<bool>;
}

/// Rows behind [`InMemoryProductRepository`].
///
/// The orders domain works on the same table through
/// [`InMemoryProductRepository::table`], so it also records which products
/// are referenced by order lines.
#[derive(Debug, Clone)]
pub struct ProductTable {
    rows: BTreeMap<i32, Product>,
    next_id: i32,
    references: HashMap<i32, usize>,
}

impl Default for ProductTable {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            references: HashMap::new(),
        }
    }
}

impl ProductTable {
    pub fn get(&self, id: i32) -> Option<&Product> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut Product> {
        self.rows.get_mut(&id)
    }

    /// Record one more order line pointing at `id`
    pub fn add_reference(&mut self, id: i32) {
        *self.references.entry(id).or_default() += 1;
    }

    pub fn is_referenced(&self, id: i32) -> bool {
        self.references.get(&id).is_some_and(|count| *count > 0)
    }

    fn title_taken(&self, title: &str, exclude_id: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|p| p.title == title && Some(p.id) != exclude_id)
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    table: Arc<Mutex<ProductTable>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the underlying rows
    pub fn table(&self) -> Arc<Mutex<ProductTable>> {
        self.table.clone()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut table = self.table.lock().await;

        if table.title_taken(&input.title, None) {
            return Err(ProductError::DuplicateTitle(input.title));
        }

        let id = table.next_id;
        table.next_id += 1;

        let product = Product::new(id, input);
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let table = self.table.lock().await;
        Ok(table.get(id).cloned())
    }

    async fn list(&self) -> ProductResult<Vec<Product>> {
        let table = self.table.lock().await;
        let mut products: Vec<Product> = table.rows.values().cloned().collect();
        // stable sort keeps ascending ids among equal prices
        products.sort_by(|a, b| b.price.cmp(&a.price));
        Ok(products)
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let mut table = self.table.lock().await;

        if table.title_taken(&input.title, Some(id)) {
            return Err(ProductError::DuplicateTitle(input.title));
        }

        let product = table.get_mut(id).ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut table = self.table.lock().await;

        if !table.rows.contains_key(&id) {
            return Ok(false);
        }
        if table.is_referenced(id) {
            return Err(ProductError::InUse(id));
        }

        table.rows.remove(&id);
        Ok(true)
    }

    async fn exists_by_title(&self, title: &str, exclude_id: Option<i32>) -> ProductResult<bool> {
        let table = self.table.lock().await;
        Ok(table.title_taken(title, exclude_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, price: i32) -> CreateProduct {
        CreateProduct {
            title: title.to_string(),
            description: format!("{title} description"),
            price,
            quantity: 10,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryProductRepository::new();

        let first = repo.create(input("Clock", 100)).await.unwrap();
        let second = repo.create(input("Lamp", 50)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get_by_id(2).await.unwrap().unwrap().title, "Lamp");
    }

    #[tokio::test]
    async fn test_duplicate_title_is_rejected_by_the_table() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Clock", 100)).await.unwrap();

        let result = repo.create(input("Clock", 200)).await;
        assert!(matches!(result, Err(ProductError::DuplicateTitle(t)) if t == "Clock"));
    }

    #[tokio::test]
    async fn test_list_orders_by_price_descending() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Cheap", 10)).await.unwrap();
        repo.create(input("Pricey", 900)).await.unwrap();
        repo.create(input("Middle", 300)).await.unwrap();

        let titles: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["Pricey", "Middle", "Cheap"]);
    }

    #[tokio::test]
    async fn test_update_keeps_own_title_and_rejects_others() {
        let repo = InMemoryProductRepository::new();
        let clock = repo.create(input("Clock", 100)).await.unwrap();
        repo.create(input("Lamp", 50)).await.unwrap();

        let same_title = UpdateProduct {
            title: "Clock".into(),
            description: "Updated".into(),
            price: 120,
            quantity: 3,
        };
        let updated = repo.update(clock.id, same_title).await.unwrap();
        assert_eq!(updated.price, 120);

        let taken = UpdateProduct {
            title: "Lamp".into(),
            description: String::new(),
            price: 1,
            quantity: 1,
        };
        assert!(matches!(
            repo.update(clock.id, taken).await,
            Err(ProductError::DuplicateTitle(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_restricted_while_referenced() {
        let repo = InMemoryProductRepository::new();
        let clock = repo.create(input("Clock", 100)).await.unwrap();

        repo.table().lock().await.add_reference(clock.id);

        assert!(matches!(
            repo.delete(clock.id).await,
            Err(ProductError::InUse(id)) if id == clock.id
        ));
        assert!(!repo.delete(999).await.unwrap());
    }
}
