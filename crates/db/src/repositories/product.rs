//! Product repository for the internal marketplace.
//!
//! Cash sales decrement stock and post their journal entry in the same
//! transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use arta_core::posting::{PostingError, PostingService};

use crate::entities::{products, sales};
use crate::repositories::account::find_account_by_number;
use crate::repositories::journal::insert_posting;

/// Error types for product and sale operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// Product not found.
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// Not enough stock for the requested sale.
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Units in stock.
        available: i32,
        /// Units requested.
        requested: i32,
    },

    /// A designated ledger account does not exist.
    #[error("Account '{account_number}' not found in the chart of accounts")]
    MissingAccount {
        /// The configured account number.
        account_number: String,
    },

    /// Posting plan rejected the entry.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock.
    pub stock: i32,
    /// Free-text description.
    pub description: Option<String>,
}

/// Product repository for marketplace operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists active products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<products::Model>, ProductError> {
        let rows = products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Finds a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist.
    pub async fn find_by_id(&self, id: Uuid) -> Result<products::Model, ProductError> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: ProductInput) -> Result<products::Model, ProductError> {
        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(product.insert(&self.db).await?)
    }

    /// Updates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<products::Model, ProductError> {
        let product = self.find_by_id(id).await?;

        let mut active: products::ActiveModel = product.into();
        active.name = Set(input.name);
        active.price = Set(input.price);
        active.stock = Set(input.stock);
        active.description = Set(input.description);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Retires a product from the marketplace.
    ///
    /// Sales keep their foreign key, so products are deactivated rather
    /// than removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), ProductError> {
        let product = self.find_by_id(id).await?;

        let mut active: products::ActiveModel = product.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }

    /// Records a cash sale: decrements stock, writes the sale, and posts
    /// debit cash / credit sales revenue, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown products, insufficient stock, or
    /// missing designated accounts; everything rolls back together.
    pub async fn create_sale(
        &self,
        product_id: Uuid,
        quantity: u32,
        cash_account_number: &str,
        sales_account_number: &str,
    ) -> Result<sales::Model, ProductError> {
        let txn = self.db.begin().await?;

        let product = products::Entity::find_by_id(product_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ProductError::NotFound(product_id))?;

        let requested = i32::try_from(quantity).unwrap_or(i32::MAX);
        if product.stock < requested {
            return Err(ProductError::InsufficientStock {
                available: product.stock,
                requested,
            });
        }

        let cash = find_account_by_number(&txn, cash_account_number)
            .await?
            .ok_or_else(|| ProductError::MissingAccount {
                account_number: cash_account_number.to_string(),
            })?;
        let sales_account = find_account_by_number(&txn, sales_account_number)
            .await?
            .ok_or_else(|| ProductError::MissingAccount {
                account_number: sales_account_number.to_string(),
            })?;

        let total = product.price * Decimal::from(quantity);
        let plan = PostingService::plan_cash_sale(
            &product.name,
            quantity,
            total,
            sales_account.id,
            cash.id,
        )?;
        let journal_id =
            insert_posting(&txn, Utc::now().into(), &plan.description, &[plan.pair]).await?;

        let mut stocked: products::ActiveModel = product.clone().into();
        stocked.stock = Set(product.stock - requested);
        stocked.updated_at = Set(Utc::now().into());
        stocked.update(&txn).await?;

        let sale = sales::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            quantity: Set(requested),
            unit_price: Set(product.price),
            total: Set(total),
            journal_id: Set(Some(journal_id)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(sale)
    }
}
