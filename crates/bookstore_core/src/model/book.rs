//! Book domain model and field validation.
//!
//! # Responsibility
//! - Define the persisted `Book` shape.
//! - Represent insert/update payloads with explicit field presence.
//! - Validate field values before they reach storage.
//!
//! # Invariants
//! - `title`, `supplier_name` and `supplier_phone` are non-empty after trim.
//! - `price` and `quantity` are never negative.
//! - Validation reports the first failing field in declaration order.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned row identifier.
pub type BookId = i64;

/// One inventory record as stored in the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Row id assigned on insert.
    pub id: BookId,
    pub title: String,
    /// Whole currency units.
    pub price: i64,
    pub quantity: i64,
    pub supplier_name: String,
    /// Free-form phone text; format is not validated.
    pub supplier_phone: String,
}

impl Book {
    /// Returns a value set carrying every field of this record.
    pub fn to_values(&self) -> BookValues {
        BookValues {
            title: Some(self.title.clone()),
            price: Some(self.price),
            quantity: Some(self.quantity),
            supplier_name: Some(self.supplier_name.clone()),
            supplier_phone: Some(self.supplier_phone.clone()),
        }
    }
}

/// Write payload where each field may be present or absent.
///
/// Insert requires every field; update writes only the present ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookValues {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
}

/// Fully validated insert payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub price: i64,
    pub quantity: i64,
    pub supplier_name: String,
    pub supplier_phone: String,
}

impl BookValues {
    /// Builds a complete value set from all five fields.
    pub fn complete(
        title: impl Into<String>,
        price: i64,
        quantity: i64,
        supplier_name: impl Into<String>,
        supplier_phone: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            price: Some(price),
            quantity: Some(quantity),
            supplier_name: Some(supplier_name.into()),
            supplier_phone: Some(supplier_phone.into()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_supplier_name(mut self, supplier_name: impl Into<String>) -> Self {
        self.supplier_name = Some(supplier_name.into());
        self
    }

    pub fn with_supplier_phone(mut self, supplier_phone: impl Into<String>) -> Self {
        self.supplier_phone = Some(supplier_phone.into());
        self
    }

    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.supplier_name.is_none()
            && self.supplier_phone.is_none()
    }

    /// Checks that every field is present and valid.
    ///
    /// # Errors
    /// - Returns the first missing or invalid field, checked in the order
    ///   title, price, quantity, supplier name, supplier phone.
    pub fn validate_for_insert(&self) -> Result<NewBook, BookValidationError> {
        let title = required_text(self.title.as_deref(), BookValidationError::Title)?;
        let price = required_amount(self.price, BookValidationError::Price)?;
        let quantity = required_amount(self.quantity, BookValidationError::Quantity)?;
        let supplier_name =
            required_text(self.supplier_name.as_deref(), BookValidationError::SupplierName)?;
        let supplier_phone =
            required_text(self.supplier_phone.as_deref(), BookValidationError::SupplierPhone)?;

        Ok(NewBook {
            title: title.to_string(),
            price,
            quantity,
            supplier_name: supplier_name.to_string(),
            supplier_phone: supplier_phone.to_string(),
        })
    }

    /// Checks only the fields that are present.
    ///
    /// Absent fields are neither validated nor written.
    pub fn validate_for_update(&self) -> Result<(), BookValidationError> {
        if let Some(title) = self.title.as_deref() {
            required_text(Some(title), BookValidationError::Title)?;
        }
        if let Some(price) = self.price {
            required_amount(Some(price), BookValidationError::Price)?;
        }
        if let Some(quantity) = self.quantity {
            required_amount(Some(quantity), BookValidationError::Quantity)?;
        }
        if let Some(supplier_name) = self.supplier_name.as_deref() {
            required_text(Some(supplier_name), BookValidationError::SupplierName)?;
        }
        if let Some(supplier_phone) = self.supplier_phone.as_deref() {
            required_text(Some(supplier_phone), BookValidationError::SupplierPhone)?;
        }
        Ok(())
    }
}

/// Field-level validation failure; one variant per book field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookValidationError {
    Title,
    Price,
    Quantity,
    SupplierName,
    SupplierPhone,
}

impl BookValidationError {
    /// Column name of the offending field.
    pub fn field(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::SupplierName => "supplier_name",
            Self::SupplierPhone => "supplier_phone",
        }
    }
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::Title => "Book requires a title",
            Self::Price => "Book requires valid price",
            Self::Quantity => "Book requires valid quantity",
            Self::SupplierName => "Requires valid name of supplier",
            Self::SupplierPhone => "Requires valid phone of supplier",
        };
        f.write_str(message)
    }
}

impl Error for BookValidationError {}

fn required_text(
    value: Option<&str>,
    err: BookValidationError,
) -> Result<&str, BookValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(err),
    }
}

fn required_amount(value: Option<i64>, err: BookValidationError) -> Result<i64, BookValidationError> {
    match value {
        Some(amount) if amount >= 0 => Ok(amount),
        _ => Err(err),
    }
}
