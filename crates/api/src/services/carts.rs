//! Cart service: cart creation and line-item mutation.
//!
//! Cart creation is an open operation: an authenticated caller gets a cart
//! attached to their user record (first cart only), a guest gets an
//! anonymous cart. Mutation requires the identity the guard resolved to
//! match the cart's owner, or an admin; anonymous carts accept any
//! authenticated caller.

use thiserror::Error;

use mercata_core::{CartId, ProductId};

use crate::db::{CartStore, ProductStore, StoreError, UserStore};
use crate::models::{Cart, CurrentUser};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A cart field failed validation.
    #[error("invalid cart input: {0}")]
    Validation(String),

    /// No cart with the requested id.
    #[error("cart not found")]
    CartNotFound,

    /// No product with the requested id.
    #[error("product not found")]
    ProductNotFound,

    /// The cart has no line for the requested product.
    #[error("item not found in cart")]
    ItemNotFound,

    /// Caller is not the cart's owner and not an admin.
    #[error("not the cart owner")]
    Forbidden,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Cart service.
pub struct CartService<'a> {
    carts: &'a dyn CartStore,
    products: &'a dyn ProductStore,
    users: &'a dyn UserStore,
}

impl<'a> CartService<'a> {
    /// Create a cart service over the cart, product, and user stores.
    #[must_use]
    pub fn new(
        carts: &'a dyn CartStore,
        products: &'a dyn ProductStore,
        users: &'a dyn UserStore,
    ) -> Self {
        Self {
            carts,
            products,
            users,
        }
    }

    /// Create an empty cart, owned by `owner` when present.
    ///
    /// The cart is attached to the owner's user record when they have no
    /// cart yet; a second explicit create leaves the first attachment
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the store fails.
    pub async fn create(&self, owner: Option<CurrentUser>) -> Result<Cart, CartError> {
        let cart = Cart::new(owner.map(|o| o.id));
        self.carts.insert(&cart).await?;

        if let Some(owner) = owner
            && let Some(user) = self.users.find_by_id(owner.id).await?
            && user.cart_ref.is_none()
        {
            self.users.set_cart_ref(owner.id, cart.id).await?;
        }

        Ok(cart)
    }

    /// All carts.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the store fails.
    pub async fn list(&self) -> Result<Vec<Cart>, CartError> {
        Ok(self.carts.list().await?)
    }

    /// One cart by id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CartNotFound`] when the id is unknown.
    pub async fn get(&self, id: CartId) -> Result<Cart, CartError> {
        self.carts
            .find_by_id(id)
            .await?
            .ok_or(CartError::CartNotFound)
    }

    /// Merge `quantity` of a product into a cart as `identity`.
    ///
    /// Accumulates into the existing line when the product is already in
    /// the cart, never duplicating the line.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive quantity, `CartNotFound` /
    /// `ProductNotFound` for unknown ids, and `Forbidden` when `identity`
    /// may not mutate this cart.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
        identity: CurrentUser,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::Validation("quantity must be positive".to_owned()));
        }

        let mut cart = self.get(cart_id).await?;
        authorize(&cart, identity)?;

        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(CartError::ProductNotFound);
        }

        cart.add_item(product_id, quantity);
        if !self.carts.update(&cart).await? {
            return Err(CartError::CartNotFound);
        }

        Ok(cart)
    }

    /// Remove a product's line from a cart as `identity`.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound` for an unknown cart, `ItemNotFound` when the
    /// cart holds no line for the product, and `Forbidden` when `identity`
    /// may not mutate this cart.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        identity: CurrentUser,
    ) -> Result<Cart, CartError> {
        let mut cart = self.get(cart_id).await?;
        authorize(&cart, identity)?;

        if !cart.remove_item(product_id) {
            return Err(CartError::ItemNotFound);
        }

        if !self.carts.update(&cart).await? {
            return Err(CartError::CartNotFound);
        }

        Ok(cart)
    }
}

/// Owner-or-admin check. Anonymous carts accept any authenticated caller.
fn authorize(cart: &Cart, identity: CurrentUser) -> Result<(), CartError> {
    if identity.role.is_admin() {
        return Ok(());
    }
    match cart.owner_id {
        None => Ok(()),
        Some(owner) if owner == identity.id => Ok(()),
        Some(_) => Err(CartError::Forbidden),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use mercata_core::{Email, Role, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory::{MemoryCartStore, MemoryProductStore, MemoryUserStore};
    use crate::models::{Product, User};

    struct Fixture {
        carts: MemoryCartStore,
        products: MemoryProductStore,
        users: MemoryUserStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                carts: MemoryCartStore::default(),
                products: MemoryProductStore::default(),
                users: MemoryUserStore::default(),
            }
        }

        fn service(&self) -> CartService<'_> {
            CartService::new(&self.carts, &self.products, &self.users)
        }

        async fn seed_user(&self, role: Role) -> CurrentUser {
            let user = User {
                id: UserId::generate(),
                first_name: "Test".to_owned(),
                last_name: "User".to_owned(),
                email: Email::parse(&format!("{}@x.com", UserId::generate())).unwrap(),
                age: 30,
                password_hash: "hash".to_owned(),
                role,
                cart_ref: None,
                created_at: Utc::now(),
            };
            self.users.insert(&user).await.unwrap();
            CurrentUser {
                id: user.id,
                role,
            }
        }

        async fn seed_product(&self) -> ProductId {
            let product = Product {
                id: ProductId::generate(),
                title: "Widget".to_owned(),
                description: String::new(),
                code: format!("C-{}", ProductId::generate()),
                price: Decimal::new(500, 2),
                stock: 10,
                category: String::new(),
                thumbnail: None,
                owner_id: None,
            };
            self.products.insert(&product).await.unwrap();
            product.id
        }
    }

    #[tokio::test]
    async fn test_create_attaches_first_cart_to_owner() {
        let fx = Fixture::new();
        let owner = fx.seed_user(Role::User).await;

        let first = fx.service().create(Some(owner)).await.unwrap();
        assert_eq!(first.owner_id, Some(owner.id));
        assert_eq!(
            fx.users.find_by_id(owner.id).await.unwrap().unwrap().cart_ref,
            Some(first.id)
        );

        // A second explicit create does not steal the attachment
        let second = fx.service().create(Some(owner)).await.unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(
            fx.users.find_by_id(owner.id).await.unwrap().unwrap().cart_ref,
            Some(first.id)
        );
    }

    #[tokio::test]
    async fn test_create_anonymous_cart() {
        let fx = Fixture::new();
        let cart = fx.service().create(None).await.unwrap();
        assert_eq!(cart.owner_id, None);
        assert_eq!(fx.service().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_item_accumulates_quantity() {
        let fx = Fixture::new();
        let owner = fx.seed_user(Role::User).await;
        let product = fx.seed_product().await;
        let cart = fx.service().create(Some(owner)).await.unwrap();

        fx.service().add_item(cart.id, product, 2, owner).await.unwrap();
        let cart = fx
            .service()
            .add_item(cart.id, product, 3, owner)
            .await
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_item_rejects_zero_quantity() {
        let fx = Fixture::new();
        let owner = fx.seed_user(Role::User).await;
        let product = fx.seed_product().await;
        let cart = fx.service().create(Some(owner)).await.unwrap();

        assert!(matches!(
            fx.service().add_item(cart.id, product, 0, owner).await,
            Err(CartError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_add_item_unknown_ids() {
        let fx = Fixture::new();
        let owner = fx.seed_user(Role::User).await;
        let product = fx.seed_product().await;
        let cart = fx.service().create(Some(owner)).await.unwrap();

        assert!(matches!(
            fx.service()
                .add_item(CartId::generate(), product, 1, owner)
                .await,
            Err(CartError::CartNotFound)
        ));
        assert!(matches!(
            fx.service()
                .add_item(cart.id, ProductId::generate(), 1, owner)
                .await,
            Err(CartError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn test_add_item_enforces_ownership() {
        let fx = Fixture::new();
        let owner = fx.seed_user(Role::User).await;
        let stranger = fx.seed_user(Role::User).await;
        let admin = fx.seed_user(Role::Admin).await;
        let product = fx.seed_product().await;
        let cart = fx.service().create(Some(owner)).await.unwrap();

        assert!(matches!(
            fx.service().add_item(cart.id, product, 1, stranger).await,
            Err(CartError::Forbidden)
        ));

        // Admin may mutate anyone's cart
        fx.service().add_item(cart.id, product, 1, admin).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_item() {
        let fx = Fixture::new();
        let owner = fx.seed_user(Role::User).await;
        let product = fx.seed_product().await;
        let cart = fx.service().create(Some(owner)).await.unwrap();

        fx.service().add_item(cart.id, product, 2, owner).await.unwrap();
        let cart = fx
            .service()
            .remove_item(cart.id, product, owner)
            .await
            .unwrap();
        assert!(cart.items.is_empty());

        assert!(matches!(
            fx.service().remove_item(cart.id, product, owner).await,
            Err(CartError::ItemNotFound)
        ));
    }
}
