//! Raw form field state.

use crate::model::book::Book;

/// Editable field on the book form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Price,
    Quantity,
    SupplierName,
    SupplierPhone,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Price,
        FormField::Quantity,
        FormField::SupplierName,
        FormField::SupplierPhone,
    ];

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Price => "Price",
            Self::Quantity => "Quantity",
            Self::SupplierName => "Supplier name",
            Self::SupplierPhone => "Supplier phone",
        }
    }
}

/// Text currently shown in each form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub price: String,
    pub quantity: String,
    pub supplier_name: String,
    pub supplier_phone: String,
}

impl BookForm {
    /// Initial form for a new record: quantity pre-filled with `1`.
    pub fn blank() -> Self {
        Self {
            quantity: "1".to_string(),
            ..Self::default()
        }
    }

    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            price: book.price.to_string(),
            quantity: book.quantity.to_string(),
            supplier_name: book.supplier_name.clone(),
            supplier_phone: book.supplier_phone.clone(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Price => &self.price,
            FormField::Quantity => &self.quantity,
            FormField::SupplierName => &self.supplier_name,
            FormField::SupplierPhone => &self.supplier_phone,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::Price => &mut self.price,
            FormField::Quantity => &mut self.quantity,
            FormField::SupplierName => &mut self.supplier_name,
            FormField::SupplierPhone => &mut self.supplier_phone,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` when any field is empty after trimming.
    pub fn has_empty_field(&self) -> bool {
        FormField::ALL
            .iter()
            .any(|field| self.get(*field).trim().is_empty())
    }
}
