//! In-memory store backend.
//!
//! Backs tests and local development. Each store holds its records behind
//! a single async `RwLock`, which gives the same guarantee the production
//! backend provides: a completed write is visible to every subsequent read,
//! and uniqueness checks happen inside the write critical section (no
//! check-then-act window).

use async_trait::async_trait;
use tokio::sync::RwLock;

use mercata_core::{CartId, Email, ProductId, UserId};

use super::{CartStore, ProductStore, StoreError, UserStore};
use crate::models::{Cart, Product, User};

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn set_cart_ref(&self, id: UserId, cart: CartId) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.cart_ref = Some(cart);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory product store.
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<Product>>,
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.code == product.code) {
            return Err(StoreError::Conflict("code already exists".to_owned()));
        }
        products.push(product.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let mut products = self.products.write().await;
        if products
            .iter()
            .any(|p| p.code == product.code && p.id != product.id)
        {
            return Err(StoreError::Conflict("code already exists".to_owned()));
        }
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

/// In-memory cart store.
#[derive(Default)]
pub struct MemoryCartStore {
    carts: RwLock<Vec<Cart>>,
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn insert(&self, cart: &Cart) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        carts.push(cart.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Cart>, StoreError> {
        Ok(self.carts.read().await.clone())
    }

    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let carts = self.carts.read().await;
        Ok(carts.iter().find(|c| c.id == id).cloned())
    }

    async fn update(&self, cart: &Cart) -> Result<bool, StoreError> {
        let mut carts = self.carts.write().await;
        match carts.iter_mut().find(|c| c.id == cart.id) {
            Some(slot) => {
                *slot = cart.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use mercata_core::Role;
    use rust_decimal::Decimal;

    use super::*;

    fn user(email: &str) -> User {
        User {
            id: UserId::generate(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: Email::parse(email).unwrap(),
            age: 30,
            password_hash: "hash".to_owned(),
            role: Role::User,
            cart_ref: None,
            created_at: Utc::now(),
        }
    }

    fn product(code: &str) -> Product {
        Product {
            id: ProductId::generate(),
            title: "Widget".to_owned(),
            description: String::new(),
            code: code.to_owned(),
            price: Decimal::new(100, 2),
            stock: 3,
            category: String::new(),
            thumbnail: None,
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::default();
        store.insert(&user("a@x.com")).await.unwrap();
        let err = store.insert(&user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = MemoryUserStore::default();
        let u = user("b@x.com");
        store.insert(&u).await.unwrap();

        let found = store
            .find_by_email(&Email::parse("b@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, u.id);
    }

    #[tokio::test]
    async fn test_set_cart_ref() {
        let store = MemoryUserStore::default();
        let u = user("c@x.com");
        store.insert(&u).await.unwrap();

        let cart = CartId::generate();
        assert!(store.set_cart_ref(u.id, cart).await.unwrap());
        assert_eq!(
            store.find_by_id(u.id).await.unwrap().unwrap().cart_ref,
            Some(cart)
        );
        assert!(!store.set_cart_ref(UserId::generate(), cart).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let store = MemoryProductStore::default();
        store.insert(&product("C1")).await.unwrap();
        let err = store.insert(&product("C1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_insert_is_visible_to_get() {
        let store = MemoryProductStore::default();
        let p = product("C2");
        store.insert(&p).await.unwrap();
        assert_eq!(store.find_by_id(p.id).await.unwrap().unwrap(), p);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_product_update_and_delete() {
        let store = MemoryProductStore::default();
        let mut p = product("C3");
        store.insert(&p).await.unwrap();

        p.stock = 99;
        assert!(store.update(&p).await.unwrap());
        assert_eq!(store.find_by_id(p.id).await.unwrap().unwrap().stock, 99);

        assert!(store.delete(p.id).await.unwrap());
        assert!(!store.delete(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_cart_update_unknown_id() {
        let store = MemoryCartStore::default();
        let cart = Cart::new(None);
        assert!(!store.update(&cart).await.unwrap());

        store.insert(&cart).await.unwrap();
        assert!(store.update(&cart).await.unwrap());
    }
}
