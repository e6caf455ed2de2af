use bookstore_core::{
    BookFilter, BookPredicate, BookStoreProvider, BookValidationError, BookValues, ContentUri,
    ProviderError, ProviderOperation, DEFAULT_AUTHORITY,
};
use std::collections::HashSet;
use std::sync::Arc;

fn dune() -> BookValues {
    BookValues::complete("Dune", 15, 3, "Ace", "555-1234")
}

fn provider() -> BookStoreProvider {
    BookStoreProvider::open_in_memory().unwrap()
}

fn fetch(provider: &BookStoreProvider, uri: &ContentUri) -> Vec<bookstore_core::Book> {
    provider.query(uri, &BookFilter::all(), None).unwrap()
}

#[test]
fn insert_returns_item_uri_and_fetch_matches_fields() {
    let provider = provider();
    let books_uri = provider.books_uri();

    let item_uri = provider.insert(&books_uri, &dune()).unwrap().unwrap();
    assert_eq!(item_uri, books_uri.with_appended_id(1));

    let rows = fetch(&provider, &item_uri);
    assert_eq!(rows.len(), 1);
    let book = &rows[0];
    assert_eq!(book.id, 1);
    assert_eq!(book.to_values(), dune());
}

#[test]
fn every_insert_gets_a_fresh_id() {
    let provider = provider();
    let books_uri = provider.books_uri();

    let mut seen = HashSet::new();
    for title in ["A", "B", "C", "D"] {
        let uri = provider
            .insert(&books_uri, &dune().with_title(title))
            .unwrap()
            .unwrap();
        assert!(seen.insert(uri.parse_id().unwrap()));
    }
}

#[test]
fn insert_with_negative_amounts_persists_nothing() {
    let provider = provider();
    let books_uri = provider.books_uri();

    for (values, expected) in [
        (dune().with_price(-1), BookValidationError::Price),
        (dune().with_quantity(-1), BookValidationError::Quantity),
    ] {
        let err = provider.insert(&books_uri, &values).unwrap_err();
        assert!(
            matches!(err, ProviderError::InvalidArgument(field) if field == expected),
            "{err}"
        );
    }
    assert!(fetch(&provider, &books_uri).is_empty());
}

#[test]
fn insert_requires_every_field() {
    let provider = provider();
    let values = BookValues {
        supplier_phone: None,
        ..dune()
    };

    let err = provider.insert(&provider.books_uri(), &values).unwrap_err();
    assert_eq!(err.to_string(), "Requires valid phone of supplier");
}

#[test]
fn insert_on_item_uri_is_unsupported() {
    let provider = provider();
    let item_uri = provider.book_uri(1);

    let err = provider.insert(&item_uri, &dune()).unwrap_err();
    assert!(matches!(
        err,
        ProviderError::UnsupportedUri {
            operation: ProviderOperation::Insert,
            ..
        }
    ));
    assert!(err.to_string().starts_with("Insertion is not supported for"));
}

#[test]
fn update_scenarios_follow_field_rules() {
    let provider = provider();
    let item_uri = provider
        .insert(&provider.books_uri(), &dune())
        .unwrap()
        .unwrap();

    let changed = provider
        .update(&item_uri, &BookValues::default().with_quantity(5), &BookFilter::all())
        .unwrap();
    assert_eq!(changed, 1);
    let book = fetch(&provider, &item_uri).remove(0);
    assert_eq!(book.quantity, 5);
    assert_eq!(book.title, "Dune");
    assert_eq!(book.price, 15);
    assert_eq!(book.supplier_phone, "555-1234");

    let err = provider
        .update(&item_uri, &BookValues::default().with_price(-5), &BookFilter::all())
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::InvalidArgument(BookValidationError::Price)
    ));
    assert_eq!(fetch(&provider, &item_uri)[0].price, 15);
}

#[test]
fn empty_update_returns_zero_for_any_uri() {
    let provider = provider();
    provider.insert(&provider.books_uri(), &dune()).unwrap();

    for uri in [provider.books_uri(), provider.book_uri(1), provider.book_uri(77)] {
        assert_eq!(
            provider
                .update(&uri, &BookValues::default(), &BookFilter::all())
                .unwrap(),
            0
        );
    }
    assert_eq!(fetch(&provider, &provider.book_uri(1))[0].to_values(), dune());
}

#[test]
fn update_on_collection_uses_caller_filter_and_item_uri_ignores_it() {
    let provider = provider();
    let books_uri = provider.books_uri();
    provider.insert(&books_uri, &dune()).unwrap();
    provider
        .insert(&books_uri, &dune().with_title("Emma").with_supplier_name("Penguin"))
        .unwrap();

    let ace_only = BookFilter::all().and(BookPredicate::SupplierNameEquals("Ace".to_string()));
    let changed = provider
        .update(&books_uri, &BookValues::default().with_price(9), &ace_only)
        .unwrap();
    assert_eq!(changed, 1);

    let penguin_filter =
        BookFilter::all().and(BookPredicate::SupplierNameEquals("Penguin".to_string()));
    let changed = provider
        .update(
            &provider.book_uri(1),
            &BookValues::default().with_quantity(0),
            &penguin_filter,
        )
        .unwrap();
    assert_eq!(changed, 1);

    let rows = fetch(&provider, &books_uri);
    assert_eq!((rows[0].price, rows[0].quantity), (9, 0));
    assert_eq!((rows[1].price, rows[1].quantity), (15, 3));
}

#[test]
fn update_missing_row_returns_zero() {
    let provider = provider();
    let changed = provider
        .update(
            &provider.book_uri(404),
            &BookValues::default().with_title("Ghost"),
            &BookFilter::all(),
        )
        .unwrap();
    assert_eq!(changed, 0);
}

#[test]
fn delete_item_then_fetch_returns_nothing() {
    let provider = provider();
    let item_uri = provider
        .insert(&provider.books_uri(), &dune())
        .unwrap()
        .unwrap();

    assert_eq!(provider.delete(&item_uri, &BookFilter::all()).unwrap(), 1);
    assert!(fetch(&provider, &item_uri).is_empty());
    assert_eq!(provider.delete(&item_uri, &BookFilter::all()).unwrap(), 0);
}

#[test]
fn delete_item_ignores_caller_filter() {
    let provider = provider();
    provider.insert(&provider.books_uri(), &dune()).unwrap();

    let unrelated = BookFilter::all().and(BookPredicate::TitleEquals("Nope".to_string()));
    assert_eq!(provider.delete(&provider.book_uri(1), &unrelated).unwrap(), 1);
}

#[test]
fn delete_collection_without_filter_removes_all_rows() {
    let provider = provider();
    let books_uri = provider.books_uri();
    for title in ["A", "B", "C"] {
        provider.insert(&books_uri, &dune().with_title(title)).unwrap();
    }
    let before = fetch(&provider, &books_uri).len();

    assert_eq!(provider.delete(&books_uri, &BookFilter::all()).unwrap(), before);
    assert!(fetch(&provider, &books_uri).is_empty());
}

#[test]
fn unknown_uris_fail_every_operation() {
    let provider = provider();
    let unknown: ContentUri = format!("content://{DEFAULT_AUTHORITY}/authors")
        .parse()
        .unwrap();
    let foreign = ContentUri::books("someone.else");

    for uri in [&unknown, &foreign] {
        assert!(matches!(
            provider.query(uri, &BookFilter::all(), None),
            Err(ProviderError::UnsupportedUri {
                operation: ProviderOperation::Query,
                ..
            })
        ));
        assert!(matches!(
            provider.update(uri, &BookValues::default().with_price(1), &BookFilter::all()),
            Err(ProviderError::UnsupportedUri {
                operation: ProviderOperation::Update,
                ..
            })
        ));
        assert!(matches!(
            provider.delete(uri, &BookFilter::all()),
            Err(ProviderError::UnsupportedUri {
                operation: ProviderOperation::Delete,
                ..
            })
        ));
        assert!(matches!(
            provider.get_type(uri),
            Err(ProviderError::UnknownUri(_))
        ));
    }
}

#[test]
fn get_type_reports_collection_and_item_kinds() {
    let provider = provider();
    assert_eq!(
        provider.get_type(&provider.books_uri()).unwrap(),
        format!("vnd.android.cursor.dir/{DEFAULT_AUTHORITY}/books")
    );
    assert_eq!(
        provider.get_type(&provider.book_uri(3)).unwrap(),
        format!("vnd.android.cursor.item/{DEFAULT_AUTHORITY}/books")
    );
}

#[test]
fn file_backed_provider_uses_configured_authority() {
    let dir = tempfile::tempdir().unwrap();
    let provider = BookStoreProvider::open(dir.path().join("shop.db"), "shop.local").unwrap();

    let uri = provider
        .insert(&ContentUri::books("shop.local"), &dune())
        .unwrap()
        .unwrap();
    assert_eq!(uri.to_string(), "content://shop.local/books/1");
    assert!(provider
        .insert(&ContentUri::books(DEFAULT_AUTHORITY), &dune())
        .is_err());
}

#[tokio::test]
async fn async_fetch_resolves_first_row_or_none() {
    let provider = Arc::new(provider());
    let item_uri = provider
        .insert(&provider.books_uri(), &dune())
        .unwrap()
        .unwrap();

    let book = Arc::clone(&provider)
        .fetch(item_uri)
        .await
        .unwrap()
        .expect("inserted book should be fetched");
    assert_eq!(book.title, "Dune");

    let missing = Arc::clone(&provider).fetch(provider.book_uri(99)).await.unwrap();
    assert!(missing.is_none());
}

#[test]
fn book_serializes_with_snake_case_fields() {
    let provider = provider();
    let uri = provider
        .insert(&provider.books_uri(), &dune())
        .unwrap()
        .unwrap();
    let book = fetch(&provider, &uri).remove(0);

    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["supplier_name"], "Ace");
    assert_eq!(json["price"], 15);
    assert_eq!(json["id"], 1);
}

#[test]
fn storage_failures_on_writes_recover_as_empty_results() {
    let unmigrated = rusqlite::Connection::open_in_memory().unwrap();
    let provider = BookStoreProvider::new(unmigrated, DEFAULT_AUTHORITY);
    let books_uri = provider.books_uri();
    let mut subscription = provider.subscribe(&books_uri);

    assert_eq!(provider.insert(&books_uri, &dune()).unwrap(), None);
    let restock = BookValues::default().with_quantity(5);
    assert_eq!(
        provider
            .update(&books_uri.with_appended_id(1), &restock, &BookFilter::all())
            .unwrap(),
        0
    );
    assert_eq!(provider.delete(&books_uri, &BookFilter::all()).unwrap(), 0);
    assert!(subscription.try_recv().is_none());

    assert!(matches!(
        provider.query(&books_uri, &BookFilter::all(), None),
        Err(ProviderError::Storage(_))
    ));
}
